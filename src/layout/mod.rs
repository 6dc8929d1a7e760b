//! # Cursor Layout
//!
//! A statement page is not flowed. Every item is placed at an absolute
//! position derived from the item before it: measure the last text, step
//! the cursor by its width or height plus a fixed gap, draw the next thing
//! there. This module holds the pieces that make that work:
//!
//! - [`LayoutContext`]: current font, page geometry, spacing constants and
//!   the registered table columns for one rendering pass.
//! - [`align`]: the pure alignment helpers.
//! - [`table`]: the five-column row writer.
//! - [`Surface`]: the drawing capability, and [`LayoutPage`], the recorded
//!   result that the PDF writer serializes.

pub mod align;
pub mod table;

use crate::error::Result;
use crate::font::{FontSpec, TextMetrics};
use align::Measure;
pub use table::{write_row, ColumnLayout};

/// Gap added below a rule after the line spacing.
pub const RULE_TRAILING_GAP: f64 = 10.0;

/// Line width of horizontal rules.
pub const RULE_WIDTH: f64 = 1.0;

/// Fixed spacing constants shared by every alignment helper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Distance kept from any reference edge.
    pub margin: f64,
    /// Extra gap between consecutive lines.
    pub line_space: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            margin: 30.0,
            line_space: 3.0,
        }
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// One recorded drawing operation, in top-down page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text whose line box starts at `y`.
    Text {
        x: f64,
        y: f64,
        text: String,
        font: FontSpec,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
    },
    /// An image from the document's image store; `y` is its top edge.
    Image {
        image: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// A black filled rectangle (QR modules).
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// A fully composed page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl LayoutPage {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            width: geometry.width,
            height: geometry.height,
            ops: Vec::new(),
        }
    }

    /// All text ops as `(x, y, text)`, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = (f64, f64, &str)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
            _ => None,
        })
    }

    /// First text op whose content equals `needle`.
    pub fn find_text(&self, needle: &str) -> Option<(f64, f64)> {
        self.texts()
            .find(|(_, _, t)| *t == needle)
            .map(|(x, y, _)| (x, y))
    }

    /// Y positions of every horizontal rule, top to bottom in drawing order.
    pub fn rule_ys(&self) -> Vec<f64> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { y1, .. } => Some(*y1),
                _ => None,
            })
            .collect()
    }
}

/// The drawing capability the composer renders through.
pub trait Surface {
    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: FontSpec) -> Result<()>;
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64) -> Result<()>;
    /// Draw the image at `src` with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()>;
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()>;
}

/// Mutable layout state for one rendering pass.
///
/// Owns the current font and the registered column layout, and measures
/// text through the borrowed metrics capability.
pub struct LayoutContext<'m> {
    metrics: &'m dyn TextMetrics,
    geometry: PageGeometry,
    spacing: Spacing,
    font: FontSpec,
    columns: Option<ColumnLayout>,
}

impl<'m> LayoutContext<'m> {
    pub fn new(metrics: &'m dyn TextMetrics, geometry: PageGeometry, spacing: Spacing) -> Self {
        Self {
            metrics,
            geometry,
            spacing,
            font: FontSpec::default(),
            columns: None,
        }
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    pub fn font(&self) -> FontSpec {
        self.font
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Register the five column X positions used by [`write_row`].
    /// Calling again replaces the previous layout.
    pub fn set_columns(&mut self, xs: [f64; 5]) {
        self.columns = Some(ColumnLayout { xs });
    }

    pub fn columns(&self) -> Option<&ColumnLayout> {
        self.columns.as_ref()
    }

    pub fn align_right(&self, text: &str, right_edge: f64) -> Result<f64> {
        align::align_right(self, &self.spacing, text, right_edge)
    }

    pub fn align_bottom(&self, last_y: f64, last_height: f64, text: &str, extra: f64) -> Result<f64> {
        align::align_bottom(self, &self.spacing, last_y, last_height, text, extra)
    }

    pub fn next_x(&self, text: &str, gap: f64, start_x: f64) -> Result<f64> {
        align::next_x(self, text, gap, start_x)
    }

    pub fn next_y(&self, text: &str, start_y: f64) -> Result<f64> {
        align::next_y(self, &self.spacing, text, start_y)
    }
}

impl Measure for LayoutContext<'_> {
    fn width(&self, text: &str) -> Result<f64> {
        self.metrics.text_width(text, self.font)
    }

    fn height(&self, text: &str) -> Result<f64> {
        self.metrics.text_height(text, self.font)
    }
}

/// Draw `text` at `(x + dx, y + dy)` in the current font and return the
/// shifted coordinates.
pub fn write_text(
    ctx: &LayoutContext<'_>,
    surface: &mut dyn Surface,
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
    text: &str,
) -> Result<(f64, f64)> {
    let (x, y) = (x + dx, y + dy);
    surface.draw_text(x, y, text, ctx.font())?;
    Ok((x, y))
}

/// Draw a horizontal rule from `x` to the right margin and return the Y
/// below it.
///
/// The rule sits `line_space + addon` below `y`; the returned Y is a further
/// `line_space + RULE_TRAILING_GAP` below the rule.
pub fn draw_rule(ctx: &LayoutContext<'_>, surface: &mut dyn Surface, x: f64, y: f64, addon: f64) -> Result<f64> {
    let spacing = ctx.spacing();
    let y = y + spacing.line_space + addon;
    let right = ctx.align_right("", ctx.geometry().width)?;
    surface.draw_line(x, y, right, y, RULE_WIDTH)?;
    Ok(y + spacing.line_space + RULE_TRAILING_GAP)
}

/// A [`Surface`] that only records, for exercising layout without images.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct Recorder {
    pub ops: Vec<DrawOp>,
    pub images: Vec<String>,
}

#[cfg(test)]
impl Surface for Recorder {
    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: FontSpec) -> Result<()> {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font,
        });
        Ok(())
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64) -> Result<()> {
        self.ops.push(DrawOp::Line { x1, y1, x2, y2, width });
        Ok(())
    }

    fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.images.push(src.to_string());
        self.ops.push(DrawOp::Image {
            image: self.images.len() - 1,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.ops.push(DrawOp::Rect { x, y, width, height });
        Ok(())
    }
}

#[cfg(test)]
impl Recorder {
    pub fn page(&self) -> LayoutPage {
        LayoutPage {
            ops: self.ops.clone(),
            ..LayoutPage::new(PageGeometry::A4)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontContext, FontSize};

    #[test]
    fn test_context_measures_in_current_font() {
        let fonts = FontContext::new();
        let mut ctx = LayoutContext::new(&fonts, PageGeometry::A4, Spacing::default());
        ctx.set_font(FontSpec::regular(FontSize::Mid));
        let mid = ctx.width("Money out").unwrap();
        ctx.set_font(FontSpec::regular(FontSize::Large));
        let large = ctx.width("Money out").unwrap();
        assert!((large - mid * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_draw_rule_advances_around_line() {
        let fonts = FontContext::new();
        let ctx = LayoutContext::new(&fonts, PageGeometry::A4, Spacing::default());
        let mut rec = Recorder::default();
        let y = draw_rule(&ctx, &mut rec, 30.0, 100.0, 10.0).unwrap();
        assert_eq!(y, 100.0 + 3.0 + 10.0 + 3.0 + RULE_TRAILING_GAP);
        match &rec.ops[0] {
            DrawOp::Line { x1, y1, x2, y2, width } => {
                assert_eq!(*x1, 30.0);
                assert_eq!(*y1, 113.0);
                assert_eq!(*y2, 113.0);
                assert!((x2 - (595.28 - 30.0)).abs() < 1e-9);
                assert_eq!(*width, RULE_WIDTH);
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn test_write_text_offsets() {
        let fonts = FontContext::new();
        let ctx = LayoutContext::new(&fonts, PageGeometry::A4, Spacing::default());
        let mut rec = Recorder::default();
        let (x, y) = write_text(&ctx, &mut rec, 30.0, 60.0, 0.0, 50.0, "JANE DOE").unwrap();
        assert_eq!((x, y), (30.0, 110.0));
        assert_eq!(rec.page().find_text("JANE DOE"), Some((30.0, 110.0)));
    }
}
