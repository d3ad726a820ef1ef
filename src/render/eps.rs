//! Encapsulated PostScript drawing backend for plotters.
//!
//! Drawing happens in backend units (`units_per_point` per PostScript point)
//! so integer backend coordinates still resolve sub-point detail; the page
//! prologue scales them back. Text is set in the standard PostScript fonts
//! and aligned with `stringwidth`, so the printer's own metrics decide the
//! final placement.

use std::fmt::Write as _;

use plotters_backend::{
    text_anchor, BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontFamily, FontStyle, FontTransform,
};

pub struct EpsBackend<'a> {
    target: &'a mut String,
    size: (u32, u32),
    units_per_point: f64,
    body: String,
    saved: bool,
}

impl<'a> EpsBackend<'a> {
    /// A page of `size` backend units; `present` stores the finished
    /// document in `target`.
    pub fn with_buffer(target: &'a mut String, size: (u32, u32), units_per_point: f64) -> Self {
        Self {
            target,
            size,
            units_per_point,
            body: String::new(),
            saved: false,
        }
    }

    /// The complete EPS document for what has been drawn so far.
    pub fn document(&self) -> String {
        let (w, h) = self.size;
        let w_pt = w as f64 / self.units_per_point;
        let h_pt = h as f64 / self.units_per_point;
        let scale = 1.0 / self.units_per_point;

        let mut doc = String::with_capacity(self.body.len() + 512);
        doc.push_str("%!PS-Adobe-3.0 EPSF-3.0\n");
        let _ = writeln!(doc, "%%BoundingBox: 0 0 {} {}", w_pt.ceil(), h_pt.ceil());
        let _ = writeln!(doc, "%%HiResBoundingBox: 0 0 {w_pt:.3} {h_pt:.3}");
        let _ = writeln!(doc, "%%Creator: {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        doc.push_str("%%Title: contour overlap\n");
        doc.push_str("%%LanguageLevel: 2\n");
        doc.push_str("%%Pages: 1\n");
        doc.push_str("%%EndComments\n");
        doc.push_str("%%Page: 1 1\n");
        doc.push_str("gsave\n");
        let _ = writeln!(doc, "{scale:.6} {scale:.6} scale");
        doc.push_str("1 setlinejoin 1 setlinecap\n");
        doc.push_str(&self.body);
        doc.push_str("grestore\n");
        doc.push_str("showpage\n");
        doc.push_str("%%EOF\n");
        doc
    }

    /// PostScript y grows upwards.
    fn flip(&self, (x, y): BackendCoord) -> (i32, i32) {
        (x, self.size.1 as i32 - y)
    }

    /// `setrgbcolor` for `color` blended over a white page, or `None` when
    /// fully transparent.
    fn set_color(&mut self, color: BackendColor) -> bool {
        if color.alpha <= 0.0 {
            return false;
        }
        let a = color.alpha.min(1.0);
        let blend = |c: u8| (1.0 - a) + a * (c as f64 / 255.0);
        let (r, g, b) = color.rgb;
        let _ = writeln!(
            self.body,
            "{:.4} {:.4} {:.4} setrgbcolor",
            blend(r),
            blend(g),
            blend(b)
        );
        true
    }

    fn set_width(&mut self, width: u32) {
        let _ = writeln!(self.body, "{} setlinewidth", width.max(1));
    }

    fn path_ops<I: IntoIterator<Item = BackendCoord>>(&mut self, points: I) -> usize {
        let mut count = 0;
        self.body.push_str("newpath\n");
        for point in points {
            let (x, y) = self.flip(point);
            let op = if count == 0 { "moveto" } else { "lineto" };
            let _ = writeln!(self.body, "{x} {y} {op}");
            count += 1;
        }
        count
    }
}

fn ps_font(family: FontFamily<'_>, style: FontStyle) -> &'static str {
    let bold = matches!(style, FontStyle::Bold);
    let slanted = matches!(style, FontStyle::Italic | FontStyle::Oblique);
    match family {
        FontFamily::Serif => match (bold, slanted) {
            (true, _) => "Times-Bold",
            (false, true) => "Times-Italic",
            _ => "Times-Roman",
        },
        FontFamily::Monospace => match (bold, slanted) {
            (true, _) => "Courier-Bold",
            (false, true) => "Courier-Oblique",
            _ => "Courier",
        },
        _ => match (bold, slanted) {
            (true, _) => "Helvetica-Bold",
            (false, true) => "Helvetica-Oblique",
            _ => "Helvetica",
        },
    }
}

/// Escape `text` for a PostScript string literal; non-ASCII becomes `?`.
fn ps_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

/// Approximate Helvetica advance widths, in em.
fn char_width(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '\'' | '|' => 0.222,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'I' | 'f' | 't' | '/' => 0.278,
        '(' | ')' | '[' | ']' | '-' | 'r' => 0.333,
        'm' | 'M' => 0.833,
        'W' => 0.944,
        'w' => 0.722,
        '+' | '<' | '>' | '=' | '^' | '_' => 0.584,
        c if c.is_ascii_digit() => 0.556,
        c if c.is_ascii_uppercase() => 0.667,
        _ => 0.5,
    }
}

pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars().map(char_width).sum::<f64>() * size
}

impl DrawingBackend for EpsBackend<'_> {
    type ErrorType = std::io::Error;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        *self.target = self.document();
        self.saved = true;
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if self.set_color(color) {
            let (x, y) = self.flip(point);
            let _ = writeln!(self.body, "{x} {} 1 1 rectfill", y - 1);
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if self.set_color(style.color()) {
            self.set_width(style.stroke_width());
            self.path_ops([from, to]);
            self.body.push_str("stroke\n");
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if !self.set_color(style.color()) {
            return Ok(());
        }
        let (x0, y0) = self.flip(upper_left);
        let (x1, y1) = self.flip(bottom_right);
        let (x, y) = (x0.min(x1), y0.min(y1));
        let (w, h) = ((x1 - x0).abs(), (y1 - y0).abs());
        if fill {
            let _ = writeln!(self.body, "{x} {y} {w} {h} rectfill");
        } else {
            self.set_width(style.stroke_width());
            let _ = writeln!(self.body, "{x} {y} {w} {h} rectstroke");
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if self.set_color(style.color()) {
            self.set_width(style.stroke_width());
            if self.path_ops(path) > 1 {
                self.body.push_str("stroke\n");
            } else {
                self.body.push_str("newpath\n");
            }
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if self.set_color(style.color()) {
            let (x, y) = self.flip(center);
            let op = if fill { "fill" } else { "stroke" };
            if !fill {
                self.set_width(style.stroke_width());
            }
            let _ = writeln!(self.body, "newpath {x} {y} {radius} 0 360 arc closepath {op}");
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if self.set_color(style.color()) {
            if self.path_ops(vert) > 2 {
                self.body.push_str("closepath fill\n");
            } else {
                self.body.push_str("newpath\n");
            }
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if text.is_empty() || !self.set_color(style.color()) {
            return Ok(());
        }
        let size = style.size();
        let (x, y) = self.flip(pos);
        let angle = match style.transform() {
            FontTransform::None => 0,
            FontTransform::Rotate90 => -90,
            FontTransform::Rotate180 => 180,
            FontTransform::Rotate270 => 90,
        };
        let h_factor = match style.anchor().h_pos {
            text_anchor::HPos::Left => 0.0,
            text_anchor::HPos::Center => 0.5,
            text_anchor::HPos::Right => 1.0,
        };
        // Baseline offset from the anchor, cap height ~0.72 em.
        let baseline = match style.anchor().v_pos {
            text_anchor::VPos::Top => -0.72 * size,
            text_anchor::VPos::Center => -0.36 * size,
            text_anchor::VPos::Bottom => 0.21 * size,
        };
        let font = ps_font(style.family(), style.style());

        let _ = writeln!(
            self.body,
            "gsave {x} {y} translate {angle} rotate /{font} findfont {size:.2} scalefont setfont\n\
             {} dup stringwidth pop {h_factor} mul neg {baseline:.2} moveto show grestore",
            ps_string(text)
        );
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<std::io::Error>> {
        let size = style.size();
        Ok((text_width(text, size).ceil() as u32, size.ceil() as u32))
    }
}

impl Drop for EpsBackend<'_> {
    fn drop(&mut self) {
        if !self.saved && !self.body.is_empty() {
            log::warn!("EPS page dropped before it was presented");
        }
    }
}

#[cfg(test)]
mod tests {
    use plotters::prelude::*;

    use super::*;

    #[test]
    fn escapes_postscript_strings() {
        assert_eq!(ps_string("n_e (cm^-3)"), "(n_e \\(cm^-3\\))");
        assert_eq!(ps_string("a\\b"), "(a\\\\b)");
        assert_eq!(ps_string("µ"), "(?)");
    }

    #[test]
    fn font_names_follow_family_and_style() {
        use plotters_backend::{FontFamily as Family, FontStyle as Style};

        assert_eq!(ps_font(Family::SansSerif, Style::Normal), "Helvetica");
        assert_eq!(ps_font(Family::Serif, Style::Bold), "Times-Bold");
        assert_eq!(ps_font(Family::Monospace, Style::Italic), "Courier-Oblique");
    }

    #[test]
    fn document_has_header_bounding_box_and_trailer() {
        let mut doc = String::new();
        {
            let root = EpsBackend::with_buffer(&mut doc, (4608, 3456), 10.0).into_drawing_area();
            root.fill(&WHITE).unwrap();
            root.draw(&PathElement::new(
                vec![(100, 100), (200, 150), (300, 100)],
                Color::stroke_width(&RED, 15),
            ))
            .unwrap();
            root.draw(&Text::new("K9+", (50, 50), ("sans-serif", 150.0)))
                .unwrap();
            root.present().unwrap();
        }
        assert!(doc.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
        assert!(doc.contains("%%BoundingBox: 0 0 461 346\n"));
        assert!(doc.contains("0.100000 0.100000 scale"));
        assert!(doc.contains("1.0000 0.0000 0.0000 setrgbcolor"));
        assert!(doc.contains("15 setlinewidth"));
        // y is flipped: backend (100, 100) lands at 3456 - 100.
        assert!(doc.contains("100 3356 moveto"));
        assert!(doc.contains("(K9+) dup stringwidth pop"));
        assert!(doc.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn transparent_drawing_emits_nothing() {
        let mut doc = String::new();
        let mut backend = EpsBackend::with_buffer(&mut doc, (10, 10), 1.0);
        let clear = BackendColor {
            alpha: 0.0,
            rgb: (0, 0, 0),
        };
        backend.draw_pixel((1, 1), clear).unwrap();
        assert!(backend.body.is_empty());
    }
}
