use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Colour parsing
// ---------------------------------------------------------------------------

/// Parse a CSS/SVG colour name (`"black"`, `"red"`) or a `#rrggbb` hex code.
pub fn parse_color(spec: &str) -> Result<RGBColor> {
    let spec = spec.trim();
    let name = spec.to_ascii_lowercase();
    if let Some(rgb) = palette::named::from_str(&name) {
        return Ok(RGBColor(rgb.red, rgb.green, rgb.blue));
    }
    spec.parse::<Srgb<u8>>()
        .map(|rgb| RGBColor(rgb.red, rgb.green, rgb.blue))
        .map_err(|_| Error::config(format!("'{spec}' is not a colour name or #rrggbb code")))
}

// ---------------------------------------------------------------------------
// Colour palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
///
/// Used when the configured palette is left empty.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            RGBColor(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ColorCycle – endless walk over a fixed palette
// ---------------------------------------------------------------------------

/// Hands out palette colours in order, wrapping around when exhausted.
///
/// Wrapping means two datasets share a colour; it is logged as a warning but
/// is not an error.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    colors: Vec<RGBColor>,
    next: usize,
}

impl ColorCycle {
    pub fn new(colors: Vec<RGBColor>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::config("colour palette is empty"));
        }
        Ok(Self { colors, next: 0 })
    }

    /// Number of distinct colours before the cycle repeats.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour for the next dataset.
    pub fn next_color(&mut self) -> RGBColor {
        let k = self.colors.len();
        let idx = self.next % k;
        if self.next >= k {
            log::warn!(
                "more datasets than palette colours ({k}); dataset {} reuses colour #{}",
                self.next + 1,
                idx + 1
            );
        }
        self.next += 1;
        self.colors[idx]
    }
}

impl Iterator for ColorCycle {
    type Item = RGBColor;

    fn next(&mut self) -> Option<RGBColor> {
        Some(self.next_color())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(parse_color("black").unwrap(), RGBColor(0, 0, 0));
        assert_eq!(parse_color("Red").unwrap(), RGBColor(255, 0, 0));
        assert_eq!(parse_color("blue").unwrap(), RGBColor(0, 0, 255));
        assert_eq!(parse_color("#1e90ff").unwrap(), RGBColor(30, 144, 255));
        assert!(parse_color("not-a-colour").is_err());
    }

    #[test]
    fn cycle_wraps_after_palette_is_exhausted() {
        let palette = vec![RGBColor(0, 0, 0), RGBColor(255, 0, 0), RGBColor(0, 0, 255)];
        let mut cycle = ColorCycle::new(palette.clone()).unwrap();
        let handed: Vec<RGBColor> = (0..7).map(|_| cycle.next_color()).collect();
        assert_eq!(&handed[..3], palette.as_slice());
        assert_eq!(handed[3], handed[0]);
        assert_eq!(handed[4], handed[1]);
        assert_eq!(handed[6], handed[0]);
    }

    #[test]
    fn single_colour_palette_repeats() {
        let cycle = ColorCycle::new(vec![RGBColor(1, 2, 3)]).unwrap();
        let handed: Vec<RGBColor> = cycle.take(3).collect();
        assert!(handed.iter().all(|c| *c == RGBColor(1, 2, 3)));
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(ColorCycle::new(Vec::new()).is_err());
    }

    #[test]
    fn generated_palette_is_distinct() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }
}
