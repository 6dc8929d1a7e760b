//! # Alignment Helpers
//!
//! Pure functions that turn a piece of text, its measured size and a
//! reference coordinate into the coordinate where something should be
//! drawn. They never draw and never touch cursor state.
//!
//! All coordinates are top-down: Y grows toward the bottom of the page and
//! a text item's Y is the top of its line box.

use super::Spacing;
use crate::error::Result;

/// Text measurement in whatever font is current for the caller.
pub trait Measure {
    fn width(&self, text: &str) -> Result<f64>;
    fn height(&self, text: &str) -> Result<f64>;
}

/// X at which `text` must start so its right edge sits `margin` inside
/// `right_edge`. Empty text gives `right_edge - margin`, the right end of a
/// full-width rule.
pub fn align_right<M: Measure + ?Sized>(
    m: &M,
    spacing: &Spacing,
    text: &str,
    right_edge: f64,
) -> Result<f64> {
    Ok(right_edge - m.width(text)? - spacing.margin)
}

/// Y of an element placed `margin` above `last_y`.
///
/// A nonzero `last_height` always wins over the height of `text`; pass `0.0`
/// to measure `text` instead. `extra` is subtracted on top.
pub fn align_bottom<M: Measure + ?Sized>(
    m: &M,
    spacing: &Spacing,
    last_y: f64,
    last_height: f64,
    text: &str,
    extra: f64,
) -> Result<f64> {
    let height = if last_height != 0.0 {
        last_height
    } else {
        m.height(text)?
    };
    Ok(last_y - spacing.margin - height - extra)
}

/// X where content continues on the same line after `text`.
pub fn next_x<M: Measure + ?Sized>(m: &M, text: &str, gap: f64, start_x: f64) -> Result<f64> {
    Ok(start_x + m.width(text)? + gap)
}

/// Y of the line below `text`.
pub fn next_y<M: Measure + ?Sized>(
    m: &M,
    spacing: &Spacing,
    text: &str,
    start_y: f64,
) -> Result<f64> {
    Ok(start_y + m.height(text)? + spacing.line_space)
}
