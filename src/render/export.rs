use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{info, warn};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use super::chart::draw_figure;
use super::eps::EpsBackend;
use super::glyph::GlyphTextBackend;
use crate::error::{Error, Result};
use crate::figure::{Figure, FigureStyle};

/// Backend units per point on the vector page.
const EPS_UNITS_PER_POINT: f64 = 10.0;

/// Where the figure went.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub raster: PathBuf,
    pub raster_size: (u32, u32),
    pub vector: PathBuf,
}

/// Write `figure` as a PNG and an EPS file, then release it.
///
/// Both documents are rendered in memory first. When the second file cannot
/// be written the first one is removed again, so a failed export leaves
/// nothing behind.
pub fn export(figure: Figure, raster: &Path, vector: &Path, dpi: u32) -> Result<ExportReport> {
    let (png, raster_size) = render_png(&figure, dpi)?;
    let eps = render_eps(&figure)?;
    drop(figure);

    write_file(raster, &png)?;
    info!(
        "wrote {} ({}x{} px, {dpi} dpi)",
        raster.display(),
        raster_size.0,
        raster_size.1
    );
    if let Err(err) = write_file(vector, eps.as_bytes()) {
        if let Err(e) = std::fs::remove_file(raster) {
            warn!("could not remove {}: {e}", raster.display());
        }
        return Err(err);
    }
    info!("wrote {}", vector.display());

    Ok(ExportReport {
        raster: raster.to_path_buf(),
        raster_size,
        vector: vector.to_path_buf(),
    })
}

/// Pixel size of the raster page at `dpi`.
pub fn raster_size(style: &FigureStyle, dpi: u32) -> (u32, u32) {
    let px = |inches: f64| ((inches * dpi as f64).round() as u32).max(1);
    (px(style.width_in), px(style.height_in))
}

fn render_err<E>(err: DrawingAreaErrorKind<E>) -> Error
where
    E: std::error::Error + Send + Sync,
{
    Error::Render(err.to_string())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

/// Render `figure` to PNG bytes at `dpi`, recording the resolution in the
/// `pHYs` chunk.
pub fn render_png(figure: &Figure, dpi: u32) -> Result<(Vec<u8>, (u32, u32))> {
    let (w, h) = raster_size(figure.style(), dpi);
    let len = (w as usize)
        .checked_mul(h as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| Error::Render(format!("raster of {w}x{h} px is too large")))?;
    let mut buffer = vec![0u8; len];
    {
        let backend = BitMapBackend::with_buffer(&mut buffer, (w, h));
        let root = GlyphTextBackend::new(backend).into_drawing_area();
        draw_figure(&root, figure, dpi as f64 / 72.0).map_err(render_err)?;
        root.present().map_err(render_err)?;
    }

    let image = RgbImage::from_raw(w, h, buffer)
        .ok_or_else(|| Error::Render("raster buffer does not match the page size".to_string()))?;
    let bytes = encode_png(&image, dpi).map_err(|e| Error::Encode {
        format: "PNG",
        details: e.to_string(),
    })?;
    Ok((bytes, (w, h)))
}

fn encode_png(image: &RgbImage, dpi: u32) -> Result<Vec<u8>, png::EncodingError> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let per_metre = (dpi as f64 / 0.0254).round() as u32;
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: per_metre,
            yppu: per_metre,
            unit: png::Unit::Meter,
        }));

        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(bytes)
}

/// Render `figure` to a PNG file at `dpi`.
pub fn write_png(figure: &Figure, path: &Path, dpi: u32) -> Result<(u32, u32)> {
    let (bytes, size) = render_png(figure, dpi)?;
    write_file(path, &bytes)?;
    Ok(size)
}

/// Render `figure` to an EPS document sized in points from the figure style.
pub fn render_eps(figure: &Figure) -> Result<String> {
    let (w_pt, h_pt) = figure.style().size_points();
    let size = (
        (w_pt * EPS_UNITS_PER_POINT).round() as u32,
        (h_pt * EPS_UNITS_PER_POINT).round() as u32,
    );
    let mut doc = String::new();
    {
        let root = EpsBackend::with_buffer(&mut doc, size, EPS_UNITS_PER_POINT).into_drawing_area();
        draw_figure(&root, figure, EPS_UNITS_PER_POINT).map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(doc)
}

/// Render `figure` to an EPS file.
pub fn write_eps(figure: &Figure, path: &Path) -> Result<()> {
    write_file(path, render_eps(figure)?.as_bytes())
}
