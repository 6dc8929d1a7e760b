//! Five-column table rows.
//!
//! Tables on a statement have no grid and no cell boxes. A row is five
//! strings drawn at five registered X positions on one Y. A header cell can
//! spill onto a second line ("Closing" / "balance") via an optional sixth
//! value.

use super::{LayoutContext, Surface};
use crate::error::{LayoutError, Result};

/// X positions of the five columns of the table being written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub xs: [f64; 5],
}

/// Write one row at `y` against the registered column layout.
///
/// `values` holds exactly five cells, or five plus a continuation that is
/// drawn under the fifth cell. Returns `y` unchanged, or the continuation's
/// Y when one was drawn.
pub fn write_row<S: AsRef<str>>(
    ctx: &LayoutContext<'_>,
    surface: &mut dyn Surface,
    y: f64,
    values: &[S],
) -> Result<f64> {
    if !(5..=6).contains(&values.len()) {
        return Err(LayoutError::RowArity(values.len()).into());
    }
    let columns = ctx.columns().ok_or(LayoutError::ColumnsNotSet)?;
    let font = ctx.font();

    for (x, value) in columns.xs.iter().zip(values) {
        surface.draw_text(*x, y, value.as_ref(), font)?;
    }

    match values.get(5) {
        Some(continuation) => {
            let y = ctx.next_y(values[4].as_ref(), y)?;
            surface.draw_text(columns.xs[4], y, continuation.as_ref(), font)?;
            Ok(y)
        }
        None => Ok(y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatementError;
    use crate::font::{FontContext, FontSize, FontSpec, TextMetrics};
    use crate::layout::{PageGeometry, Recorder, Spacing};

    fn ctx(fonts: &FontContext) -> LayoutContext<'_> {
        let mut ctx = LayoutContext::new(fonts, PageGeometry::A4, Spacing::default());
        ctx.set_font(FontSpec::bold(FontSize::Mid));
        ctx.set_columns([30.0, 180.0, 300.0, 400.0, 500.0]);
        ctx
    }

    #[test]
    fn test_five_values_drawn_at_columns() {
        let fonts = FontContext::new();
        let ctx = ctx(&fonts);
        let mut rec = Recorder::default();
        let y = write_row(&ctx, &mut rec, 200.0, &["Date", "Description", "Money out", "Money in", "Balance"]).unwrap();
        assert_eq!(y, 200.0);
        let page = rec.page();
        assert_eq!(page.find_text("Date"), Some((30.0, 200.0)));
        assert_eq!(page.find_text("Description"), Some((180.0, 200.0)));
        assert_eq!(page.find_text("Money out"), Some((300.0, 200.0)));
        assert_eq!(page.find_text("Money in"), Some((400.0, 200.0)));
        assert_eq!(page.find_text("Balance"), Some((500.0, 200.0)));
    }

    #[test]
    fn test_continuation_drawn_below_fifth() {
        let fonts = FontContext::new();
        let ctx = ctx(&fonts);
        let mut rec = Recorder::default();
        let values = ["Product", "Opening balance", "Money out", "Money in", "Closing", "balance"];
        let y = write_row(&ctx, &mut rec, 200.0, &values).unwrap();

        let line_h = fonts.text_height("Closing", FontSpec::bold(FontSize::Mid)).unwrap();
        assert_eq!(y, 200.0 + line_h + 3.0);
        assert_eq!(rec.page().find_text("balance"), Some((500.0, y)));
        assert_eq!(rec.ops.len(), 6);
    }

    #[test]
    fn test_rejects_short_and_long_rows() {
        let fonts = FontContext::new();
        let ctx = ctx(&fonts);
        let mut rec = Recorder::default();
        for n in [0, 1, 4, 7] {
            let values = vec!["x"; n];
            let err = write_row(&ctx, &mut rec, 0.0, &values).unwrap_err();
            assert!(matches!(err, StatementError::Layout(LayoutError::RowArity(got)) if got == n));
        }
        assert!(rec.ops.is_empty(), "rejected rows must not draw");
    }

    #[test]
    fn test_requires_columns() {
        let fonts = FontContext::new();
        let ctx = LayoutContext::new(&fonts, PageGeometry::A4, Spacing::default());
        let mut rec = Recorder::default();
        let err = write_row(&ctx, &mut rec, 0.0, &["a", "b", "c", "d", "e"]).unwrap_err();
        assert!(matches!(err, StatementError::Layout(LayoutError::ColumnsNotSet)));
    }

    #[test]
    fn test_set_columns_replaces_layout() {
        let fonts = FontContext::new();
        let mut ctx = ctx(&fonts);
        ctx.set_columns([1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut rec = Recorder::default();
        write_row(&ctx, &mut rec, 10.0, &["a", "b", "c", "d", "e"]).unwrap();
        assert_eq!(rec.page().find_text("a"), Some((1.0, 10.0)));
        assert_eq!(rec.page().find_text("e"), Some((5.0, 10.0)));
    }

    #[test]
    fn test_wide_value_is_not_truncated() {
        let fonts = FontContext::new();
        let ctx = ctx(&fonts);
        let mut rec = Recorder::default();
        let long = "Card payment to a merchant with a very long descriptive name that overlaps";
        write_row(&ctx, &mut rec, 10.0, &["1 Feb", long, "€1", "€0", "€99"]).unwrap();
        assert_eq!(rec.page().find_text(long), Some((180.0, 10.0)));
    }
}
