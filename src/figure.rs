use plotters::style::RGBColor;

use crate::config::{OutputConfig, PlotConfig};
use crate::contour::ContourLine;
use crate::grid::Extent;

// ---------------------------------------------------------------------------
// Figure – accumulated plot state
// ---------------------------------------------------------------------------

/// Contour lines of one dataset, drawn in one colour.
#[derive(Debug, Clone)]
pub struct ContourLayer {
    pub name: String,
    pub color: RGBColor,
    pub lines: Vec<ContourLine>,
}

/// Proxy legend entry: a filled swatch bound to a label.
///
/// Contour lines carry no legend entry of their own, so every layer gets one
/// of these built separately.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
}

/// Axis and page settings the renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureStyle {
    /// Axis range; both axes are logarithmic.
    pub extent: Extent,
    pub width_in: f64,
    pub height_in: f64,
    /// Text size in points.
    pub font_size: f64,
    pub x_label: String,
    pub y_label: String,
}

impl FigureStyle {
    pub fn from_config(config: &PlotConfig) -> Self {
        let OutputConfig {
            width_in,
            height_in,
            font_size,
            x_label,
            y_label,
            ..
        } = &config.output;
        Self {
            extent: config.range,
            width_in: *width_in,
            height_in: *height_in,
            font_size: *font_size,
            x_label: x_label.clone(),
            y_label: y_label.clone(),
        }
    }

    /// Page size in points (1/72 in).
    pub fn size_points(&self) -> (f64, f64) {
        (self.width_in * 72.0, self.height_in * 72.0)
    }
}

/// The composed overlay: one layer and one legend entry per dataset.
///
/// Created empty, filled one dataset at a time, then consumed by export.
#[derive(Debug, Clone)]
pub struct Figure {
    style: FigureStyle,
    layers: Vec<ContourLayer>,
    legend: Vec<LegendEntry>,
}

impl Figure {
    pub fn new(style: FigureStyle) -> Self {
        Self {
            style,
            layers: Vec::new(),
            legend: Vec::new(),
        }
    }

    pub fn style(&self) -> &FigureStyle {
        &self.style
    }

    pub fn layers(&self) -> &[ContourLayer] {
        &self.layers
    }

    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Add a dataset's contour lines and its legend swatch.
    pub fn add_layer(&mut self, name: &str, label: &str, color: RGBColor, lines: Vec<ContourLine>) {
        self.layers.push(ContourLayer {
            name: name.to_string(),
            color,
            lines,
        });
        self.legend.push(LegendEntry {
            label: label.to_string(),
            color,
        });
    }
}
