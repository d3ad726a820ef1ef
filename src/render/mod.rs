//! Figure rendering and export.
//!
//! ```text
//!   Figure ──► chart::draw_figure ──┬─► GlyphTextBackend<BitMapBackend> ──► PNG (pHYs = dpi)
//!                                   └─► EpsBackend ─────────────────────► EPS
//! ```

pub mod chart;
pub mod eps;
pub mod export;
pub mod glyph;

pub use export::{export, ExportReport};
