//! Plotters drawing backend targeting a printpdf page layer.
//!
//! Charts are laid out in a pixel coordinate space (origin top-left) and
//! mapped onto the page in millimetres (origin bottom-left). Text uses the
//! built-in Helvetica font, so no font files are needed at runtime.

use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontTransform,
};
use printpdf::{
    Color, IndirectFontRef, Line, Mm, PdfLayerReference, Point, Polygon, Pt, Rgb,
    TextMatrix,
};
use printpdf::path::{PaintMode, WindingOrder};
use std::convert::Infallible;

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Average Helvetica glyph advance, as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.55;

/// Distance from the top of a line of text to its baseline.
const ASCENT: f64 = 0.75;

type DrawResult = Result<(), DrawingErrorKind<Infallible>>;

/// Approximate rendered size of `text` at `size` pixels.
pub fn text_extent(text: &str, size: f64) -> (f64, f64) {
    (text.chars().count() as f64 * size * GLYPH_ADVANCE, size)
}

/// Draws plotters output onto one PDF page.
pub struct PdfBackend {
    layer: PdfLayerReference,
    font: IndirectFontRef,
    size: (u32, u32),
    page_mm: (f32, f32),
}

impl PdfBackend {
    /// `size` is the pixel canvas; `page_mm` the physical page it is scaled onto.
    pub fn new(
        layer: PdfLayerReference,
        font: IndirectFontRef,
        size: (u32, u32),
        page_mm: (f32, f32),
    ) -> Self {
        Self {
            layer,
            font,
            size,
            page_mm,
        }
    }

    fn mm_per_px(&self) -> f32 {
        (self.page_mm.0 / self.size.0 as f32).min(self.page_mm.1 / self.size.1 as f32)
    }

    fn to_mm(&self, (x, y): (f64, f64)) -> (f32, f32) {
        let scale = self.mm_per_px();
        (x as f32 * scale, self.page_mm.1 - y as f32 * scale)
    }

    fn point(&self, coord: BackendCoord) -> Point {
        let (x, y) = self.to_mm((coord.0 as f64, coord.1 as f64));
        Point::new(Mm(x), Mm(y))
    }

    fn px_to_pt(&self, px: f64) -> f32 {
        px as f32 * self.mm_per_px() * PT_PER_MM
    }

    fn stroke<S: BackendStyle>(&self, style: &S) {
        self.layer.set_outline_color(pdf_color(style.color()));
        self.layer
            .set_outline_thickness(self.px_to_pt(style.stroke_width().max(1) as f64));
    }

    fn fill_shape<S: BackendStyle>(&self, vertices: Vec<BackendCoord>, style: &S) {
        if vertices.len() < 3 {
            return;
        }
        self.layer.set_fill_color(pdf_color(style.color()));
        self.layer.add_polygon(Polygon {
            rings: vec![vertices.into_iter().map(|v| (self.point(v), false)).collect()],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn outline(&self, vertices: Vec<BackendCoord>, closed: bool) {
        if vertices.len() < 2 {
            return;
        }
        self.layer.add_line(Line {
            points: vertices.into_iter().map(|v| (self.point(v), false)).collect(),
            is_closed: closed,
        });
    }
}

fn pdf_color(color: BackendColor) -> Color {
    let (r, g, b) = color.rgb;
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn invisible(color: &BackendColor) -> bool {
    color.alpha <= 0.0
}

/// Characters Windows-1252 adds over Latin-1 in the 0x80-0x9F range.
const WIN_ANSI_EXTRA: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// Whether the built-in (WinAnsi-encoded) fonts can draw `c`.
pub fn is_win_ansi(c: char) -> bool {
    ((c as u32) < 0x100 && !c.is_control()) || WIN_ANSI_EXTRA.contains(c)
}

/// Replace characters the built-in fonts cannot encode with '?'.
fn win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| if is_win_ansi(c) { c } else { '?' })
        .collect()
}

impl DrawingBackend for PdfBackend {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> DrawResult {
        Ok(())
    }

    fn present(&mut self) -> DrawResult {
        Ok(())
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> DrawResult {
        if invisible(&color) {
            return Ok(());
        }
        let (x, y) = point;
        self.fill_shape(vec![(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)], &color);
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> DrawResult {
        if invisible(&style.color()) {
            return Ok(());
        }
        self.stroke(style);
        self.outline(vec![from, to], false);
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        if invisible(&style.color()) {
            return Ok(());
        }
        let corners = vec![
            upper_left,
            (bottom_right.0, upper_left.1),
            bottom_right,
            (upper_left.0, bottom_right.1),
        ];
        if fill {
            self.fill_shape(corners, style);
        } else {
            self.stroke(style);
            self.outline(corners, true);
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> DrawResult {
        if invisible(&style.color()) {
            return Ok(());
        }
        self.stroke(style);
        self.outline(path.into_iter().collect(), false);
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> DrawResult {
        if invisible(&style.color()) {
            return Ok(());
        }
        self.fill_shape(vert.into_iter().collect(), style);
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> DrawResult {
        let color = style.color();
        if text.is_empty() || invisible(&color) {
            return Ok(());
        }

        let size = style.size();
        let (width, _) = text_extent(text, size);
        let anchor = style.anchor();

        // Offsets along the writing direction and towards the glyph tops.
        let along = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let down = match anchor.v_pos {
            VPos::Top => size * ASCENT,
            VPos::Center => size * ASCENT / 2.0,
            VPos::Bottom => 0.0,
        };

        // Screen-space advance and "down" unit vectors, plus the PDF angle.
        let ((ax, ay), (dx, dy), degrees) = match style.transform() {
            FontTransform::None => ((1.0, 0.0), (0.0, 1.0), 0.0),
            FontTransform::Rotate90 => ((0.0, 1.0), (-1.0, 0.0), 270.0),
            FontTransform::Rotate180 => ((-1.0, 0.0), (0.0, -1.0), 180.0),
            FontTransform::Rotate270 => ((0.0, -1.0), (1.0, 0.0), 90.0),
        };

        let origin = (
            pos.0 as f64 + ax * along + dx * down,
            pos.1 as f64 + ay * along + dy * down,
        );
        let (x_mm, y_mm) = self.to_mm(origin);
        let font_size = self.px_to_pt(size);

        self.layer.set_fill_color(pdf_color(color));
        self.layer.begin_text_section();
        self.layer.set_font(&self.font, font_size);
        self.layer.set_text_matrix(TextMatrix::TranslateRotate(
            Pt(x_mm * PT_PER_MM),
            Pt(y_mm * PT_PER_MM),
            degrees,
        ));
        self.layer.write_text(win_ansi(text), &self.font);
        self.layer.end_text_section();
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let (width, height) = text_extent(text, style.size());
        Ok((width.ceil() as u32, height.ceil() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_extent_scales_with_length_and_size() {
        let (w1, h1) = text_extent("abcd", 10.0);
        let (w2, h2) = text_extent("abcdabcd", 20.0);
        assert!((w2 - 4.0 * w1).abs() < 1e-9);
        assert_eq!(h1, 10.0);
        assert_eq!(h2, 20.0);
    }

    #[test]
    fn test_win_ansi_replaces_unsupported_characters() {
        assert_eq!(win_ansi("café"), "café");
        assert_eq!(win_ansi("rocket 🚀"), "rocket ?");
        assert_eq!(win_ansi("tab\there"), "tab?here");
        assert_eq!(win_ansi("привет"), "??????");
    }

    #[test]
    fn test_win_ansi_keeps_typographic_punctuation() {
        assert_eq!(win_ansi("it’s — “quoted” …"), "it’s — “quoted” …");
        assert_eq!(win_ansi("5 €"), "5 €");
        assert!(is_win_ansi('Œ'));
        assert!(!is_win_ansi('\u{85}'));
    }
}
