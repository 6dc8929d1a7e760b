//! # statement-pdf
//!
//! Renders a bank account statement to a single-page PDF.
//!
//! There is no flow layout here. Every label, value and rule sits at an
//! absolute position computed from the thing drawn before it: measure the
//! last text in the current font, step the cursor by its width or height
//! plus a fixed gap, draw. Right-aligned columns are found the same way from
//! the page edge.
//!
//! ## Architecture
//!
//! ```text
//! account_statement.json       report_config.json (optional)
//!       ↓                              ↓
//!   [model]                       [config]
//!       ↓                              ↓
//!   [compose]  : header/footer decorator + body sections
//!       ↓          drawing through [layout] (cursor, alignment, rows)
//!   [document] : page lifecycle, image store
//!       ↓
//!   [pdf]      : serialize to PDF bytes (top-down → PDF coordinates)
//! ```

pub mod compose;
pub mod config;
pub mod document;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;

use std::time::Instant;

pub use config::ReportConfig;
pub use error::{LayoutError, Result, StatementError};
pub use model::Statement;

use compose::{compose_statement, StatementDecorator};
use document::DocumentBuilder;

/// Render a statement to PDF bytes.
///
/// Fonts are resolved from `config` first; a missing font or image aborts
/// before any output is produced.
pub fn render(statement: &Statement, config: &ReportConfig) -> Result<Vec<u8>> {
    let start = Instant::now();
    let fonts = config.font_context()?;

    let decorator = StatementDecorator::new(statement, config);
    let mut doc = DocumentBuilder::new(config.geometry()).with_decorator(&decorator);
    let summary = compose_statement(statement, config, &fonts, &decorator, &mut doc)?;
    log::info!(
        "Composed {} product row(s) and {} transaction(s) in {:.1?}",
        summary.product_rows,
        summary.transaction_rows,
        start.elapsed()
    );

    let bytes = doc.finish(&fonts, &config.metadata())?;
    log::info!("Wrote {} bytes of PDF in {:.1?}", bytes.len(), start.elapsed());
    Ok(bytes)
}

/// Render a statement described as JSON to PDF bytes.
pub fn render_json(json: &str, config: &ReportConfig) -> Result<Vec<u8>> {
    let statement = Statement::from_json(json)?;
    render(&statement, config)
}
