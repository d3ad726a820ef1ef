use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};

use crate::figure::Figure;

// ---------------------------------------------------------------------------
// Overlap chart
// ---------------------------------------------------------------------------

/// Draw `figure` onto `root`.
///
/// `units_per_point` converts the figure's point-based geometry (font size,
/// margins, line widths) into backend units, so the same layout serves a
/// 600 dpi raster and a vector page.
pub fn draw_figure<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    units_per_point: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    let style = figure.style();
    let pt = |points: f64| ((points * units_per_point).round() as u32).max(1);
    let font = FontDesc::new(
        FontFamily::SansSerif,
        style.font_size * units_per_point,
        FontStyle::Normal,
    );
    let ext = style.extent;

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .margin(pt(6.0))
        .margin_right(pt(14.0))
        .x_label_area_size(pt(3.0 * style.font_size))
        .y_label_area_size(pt(4.4 * style.font_size))
        .build_cartesian_2d(
            (ext.x_min..ext.x_max).log_scale(),
            (ext.y_min..ext.y_max).log_scale(),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .x_label_formatter(&format_tick)
        .y_label_formatter(&format_tick)
        .label_style(font.clone())
        .axis_desc_style(font.clone())
        .axis_style(BLACK.stroke_width(pt(0.8)))
        .set_all_tick_mark_size(pt(3.5))
        .draw()?;

    let line_width = pt(1.5);
    for layer in figure.layers() {
        let color = layer.color;
        chart.draw_series(
            layer
                .lines
                .iter()
                .map(|line| PathElement::new(line.points.clone(), color.stroke_width(line_width))),
        )?;
    }

    // Contour lines have no legend entry of their own; bind a filled swatch
    // to each label through an empty series instead.
    let half = pt(0.35 * style.font_size) as i32;
    let swatch = pt(1.4 * style.font_size) as i32;
    for entry in figure.legend() {
        let color = entry.color;
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
            .label(entry.label.as_str())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - half), (x + swatch, y + half)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .margin(pt(6.0))
        .legend_area_size(pt(2.0 * style.font_size))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(font)
        .draw()?;

    Ok(())
}

/// Tick label for a logarithmic axis, e.g. `1e11`, `2e3`.
pub fn format_tick(v: &f64) -> String {
    if !(v.is_finite() && *v > 0.0) {
        return String::new();
    }
    format!("{v:.0e}")
}
