//! # Statement Composition
//!
//! Turns a [`Statement`] into drawing calls. The page chrome (logo, title,
//! copyright, QR, contact lines) lives in [`decorator`] and is applied by the
//! document builder to every page it adds. This module draws the body, top
//! to bottom, in four sections that share one cursor:
//!
//! ```text
//! identity  ->  IBAN/BIC  ->  balance summary  ->  transactions
//! ```
//!
//! Each section starts from where the previous one left off and measures the
//! last text it drew to find the next line. The balance summary fixes the
//! three amount columns; the transactions table reuses them.

pub mod decorator;

use crate::config::ReportConfig;
use crate::document::DocumentBuilder;
use crate::error::Result;
use crate::font::{FontContext, FontSize, FontSpec};
use crate::layout::{draw_rule, write_row, write_text, LayoutContext, LayoutPage, Surface};
use crate::model::{BalanceTotals, Statement};
pub use decorator::StatementDecorator;

/// Offset of the account holder's name below the body start.
pub const NAME_TOP_OFFSET: f64 = 50.0;
/// Extra drop before the street line.
pub const STREET_OFFSET: f64 = 10.0;
/// Gap between the "IBAN"/"BIC" labels and their values.
pub const LABEL_GAP: f64 = 10.0;
/// Extra gap between consecutive IBAN entries.
pub const IBAN_ENTRY_GAP: f64 = 30.0;
/// Distance from the opening-balance column to the product column.
pub const OPENING_COLUMN_OFFSET: f64 = 150.0;
/// Distance from the description column to the date column.
pub const DESCRIPTION_COLUMN_OFFSET: f64 = 100.0;
/// Applied twice after a header label to place the next amount column.
pub const COLUMN_GAP: f64 = 20.0;
/// Gap between a section title and its table header.
pub const TITLE_GAP: f64 = 20.0;
/// Gap above the balance disclaimer.
pub const DISCLAIMER_OFFSET: f64 = 10.0;
/// Rule addon after every data row.
pub const ROW_RULE_ADDON: f64 = 10.0;

const IBAN_LABEL: &str = "IBAN";
const BIC_LABEL: &str = "BIC";
const BALANCE_TITLE: &str = "Balance summary";
const BALANCE_HEADER: [&str; 6] = ["Product", "Opening balance", "Money out", "Money in", "Closing", "balance"];
const TRANSACTIONS_HEADER: [&str; 5] = ["Date", "Description", "Money out", "Money in", "Balance"];

/// What the body composer did, for logging and inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeSummary {
    /// Cursor Y after the last transactions rule.
    pub final_y: f64,
    pub product_rows: usize,
    pub transaction_rows: usize,
    pub totals: BalanceTotals,
    /// True when the transactions table ran into the footer area.
    pub overflowed: bool,
}

/// Cursor shared by the body sections.
///
/// `last` is the most recent text used as a measuring reference for the next
/// line. It is not always the most recently drawn string: table rows leave it
/// pointing at the section title.
#[derive(Debug, Clone)]
struct Cursor {
    x: f64,
    y: f64,
    last: String,
}

/// X positions of the amount columns shared by both tables.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AmountColumns {
    money_out: f64,
    money_in: f64,
    closing: f64,
}

/// Draws the body of one statement.
pub struct StatementComposer<'a> {
    statement: &'a Statement,
    config: &'a ReportConfig,
}

impl<'a> StatementComposer<'a> {
    pub fn new(statement: &'a Statement, config: &'a ReportConfig) -> Self {
        Self { statement, config }
    }

    /// Draw every body section starting at `(x, y)`.
    ///
    /// `footer_top` is only used to detect a transactions table that runs
    /// into the footer; such rows are still drawn.
    pub fn compose_body(
        &self,
        ctx: &mut LayoutContext<'_>,
        surface: &mut dyn Surface,
        x: f64,
        y: f64,
        footer_top: f64,
    ) -> Result<ComposeSummary> {
        let mut cursor = Cursor {
            x,
            y,
            last: String::new(),
        };

        self.identity_block(ctx, surface, &mut cursor)?;
        log::debug!("Identity block ends at y={:.2}", cursor.y);

        self.iban_block(ctx, surface, &mut cursor)?;
        log::debug!("IBAN block ends at y={:.2}", cursor.y);

        let (columns, totals) = self.balance_summary(ctx, surface, &mut cursor)?;
        log::debug!("Balance summary ends at y={:.2}", cursor.y);

        self.transactions(ctx, surface, &mut cursor, columns)?;

        let overflowed = cursor.y > footer_top;
        if overflowed {
            log::warn!(
                "Transactions table ends at y={:.2}, past the footer at y={:.2}; rows overlap the footer",
                cursor.y,
                footer_top
            );
        }

        Ok(ComposeSummary {
            final_y: cursor.y,
            product_rows: self.statement.balance_summary.products.len(),
            transaction_rows: self.statement.transactions.len(),
            totals,
            overflowed,
        })
    }

    /// Uppercased name, then the postal address one line per field.
    fn identity_block(&self, ctx: &mut LayoutContext<'_>, surface: &mut dyn Surface, c: &mut Cursor) -> Result<()> {
        let address = &self.statement.address;

        ctx.set_font(FontSpec::bold(FontSize::Large));
        let name = self.statement.name.to_uppercase();
        let (x, y) = write_text(ctx, surface, c.x, c.y, 0.0, NAME_TOP_OFFSET, &name)?;

        ctx.set_font(FontSpec::bold(FontSize::Mid));
        let y = ctx.next_y(&name, y)?;
        let street = format!("{} {}", address.house_no, address.street);
        let (x, mut y) = write_text(ctx, surface, x, y, 0.0, STREET_OFFSET, &street)?;

        let mut last = street;
        for line in [&address.city, &address.state, &address.country] {
            y = ctx.next_y(&last, y)?;
            write_text(ctx, surface, x, y, 0.0, 0.0, line)?;
            last = line.clone();
        }

        c.x = x;
        c.y = y;
        c.last = last;
        Ok(())
    }

    /// Label/value pairs right-aligned against the IBAN disclaimer width.
    fn iban_block(&self, ctx: &mut LayoutContext<'_>, surface: &mut dyn Surface, c: &mut Cursor) -> Result<()> {
        let [first_note, second_note] = &self.config.iban_disclaimer;
        let page_width = ctx.geometry().width;

        // measured in the bold face the identity block left behind
        let value_x = ctx.align_right(first_note, page_width)?;
        let label_x = ctx.align_right(IBAN_LABEL, value_x)? - LABEL_GAP;

        for (i, entry) in self.statement.iban.iter().enumerate() {
            c.y = if i == 0 {
                ctx.next_y(" ", c.y)?
            } else {
                ctx.next_y(&c.last, c.y)? + IBAN_ENTRY_GAP
            };

            ctx.set_font(FontSpec::bold(FontSize::Mid));
            write_text(ctx, surface, label_x, c.y, 0.0, 0.0, IBAN_LABEL)?;
            ctx.set_font(FontSpec::regular(FontSize::Mid));
            write_text(ctx, surface, value_x, c.y, 0.0, 0.0, &entry.no)?;

            c.y = ctx.next_y(&entry.no, c.y)?;
            ctx.set_font(FontSpec::bold(FontSize::Mid));
            write_text(ctx, surface, label_x, c.y, 0.0, 0.0, BIC_LABEL)?;
            ctx.set_font(FontSpec::regular(FontSize::Mid));
            write_text(ctx, surface, value_x, c.y, 0.0, 0.0, &entry.bic)?;
            c.last = entry.bic.clone();

            if i > 0 {
                for note in [first_note, second_note] {
                    c.y = ctx.next_y(&c.last, c.y)?;
                    write_text(ctx, surface, value_x, c.y, 0.0, 0.0, note)?;
                    c.last = note.clone();
                }
            }
        }
        Ok(())
    }

    fn balance_summary(
        &self,
        ctx: &mut LayoutContext<'_>,
        surface: &mut dyn Surface,
        c: &mut Cursor,
    ) -> Result<(AmountColumns, BalanceTotals)> {
        let st = self.statement;
        let page_width = ctx.geometry().width;

        c.x = ctx.next_x("", 0.0, ctx.spacing().margin)?;
        c.y = ctx.next_y(&c.last, c.y)?;

        ctx.set_font(FontSpec::bold(FontSize::Large));
        c.y = ctx.next_y(&c.last, c.y)?;
        write_text(ctx, surface, c.x, c.y, 0.0, 0.0, BALANCE_TITLE)?;
        c.last = BALANCE_TITLE.to_string();

        ctx.set_font(FontSpec::bold(FontSize::Mid));
        let product_x = c.x;
        let opening_x = product_x + OPENING_COLUMN_OFFSET;
        let money_out = ctx.next_x(BALANCE_HEADER[1], COLUMN_GAP, opening_x)? + COLUMN_GAP;
        let money_in = ctx.next_x(BALANCE_HEADER[2], COLUMN_GAP, money_out)? + COLUMN_GAP;
        let closing = ctx.align_right(BALANCE_HEADER[4], page_width)?;
        let columns = AmountColumns {
            money_out,
            money_in,
            closing,
        };

        c.y = ctx.next_y(&c.last, c.y)? + TITLE_GAP;
        ctx.set_columns([product_x, opening_x, money_out, money_in, closing]);
        c.y = write_row(ctx, surface, c.y, &BALANCE_HEADER)?;
        c.y = draw_rule(ctx, surface, c.x, c.y, 0.0)?;

        ctx.set_font(FontSpec::regular(FontSize::Mid));
        let mut totals = BalanceTotals::default();
        for product in &st.balance_summary.products {
            let row = [
                product.product.clone(),
                st.amount(product.opening_balance),
                st.amount(product.money_out),
                st.amount(product.money_in),
                st.amount(product.closing_balance),
            ];
            c.y = write_row(ctx, surface, c.y, &row)?;
            totals.add(product);
            c.y = draw_rule(ctx, surface, c.x, c.y, ROW_RULE_ADDON)?;
        }

        let total_row = [
            "Total".to_string(),
            st.amount(totals.opening_balance),
            st.amount(totals.money_out),
            st.amount(totals.money_in),
            st.amount(totals.closing_balance),
        ];
        c.y = write_row(ctx, surface, c.y, &total_row)?;

        c.y = ctx.next_y(&c.last, c.y)? + DISCLAIMER_OFFSET;
        ctx.set_font(FontSpec::regular(FontSize::Small));
        let note = &self.config.balance_disclaimer;
        write_text(ctx, surface, c.x, c.y, 0.0, 0.0, note)?;
        c.last = note.clone();

        Ok((columns, totals))
    }

    fn transactions(
        &self,
        ctx: &mut LayoutContext<'_>,
        surface: &mut dyn Surface,
        c: &mut Cursor,
        columns: AmountColumns,
    ) -> Result<()> {
        let st = self.statement;

        ctx.set_font(FontSpec::bold(FontSize::Large));
        c.y = ctx.next_y(&c.last, c.y)? + TITLE_GAP;
        let title = transactions_title(st);
        write_text(ctx, surface, c.x, c.y, 0.0, 0.0, &title)?;
        c.last = title;

        ctx.set_font(FontSpec::bold(FontSize::Mid));
        let date_x = c.x;
        let description_x = date_x + DESCRIPTION_COLUMN_OFFSET;
        c.y = ctx.next_y(&c.last, c.y)? + TITLE_GAP;
        ctx.set_columns([date_x, description_x, columns.money_out, columns.money_in, columns.closing]);
        c.y = write_row(ctx, surface, c.y, &TRANSACTIONS_HEADER)?;
        c.y = draw_rule(ctx, surface, c.x, c.y, 0.0)?;

        ctx.set_font(FontSpec::regular(FontSize::Mid));
        for tx in &st.transactions {
            let row = [
                tx.date.clone(),
                tx.description.clone(),
                st.amount(tx.money_out),
                st.amount(tx.money_in),
                st.amount(tx.balance),
            ];
            c.y = write_row(ctx, surface, c.y, &row)?;
            c.y = draw_rule(ctx, surface, c.x, c.y, ROW_RULE_ADDON)?;
        }
        Ok(())
    }
}

/// "Account transactions from {first} to {last}", spanning the dates as
/// given in input order.
pub fn transactions_title(statement: &Statement) -> String {
    match (statement.transactions.first(), statement.transactions.last()) {
        (Some(first), Some(last)) => {
            format!("Account transactions from {} to {}", first.date, last.date)
        }
        _ => "Account transactions".to_string(),
    }
}

/// Lay out a whole statement into `doc`: one page with header and footer,
/// then the body.
pub fn compose_statement(
    statement: &Statement,
    config: &ReportConfig,
    fonts: &FontContext,
    decorator: &StatementDecorator<'_>,
    doc: &mut DocumentBuilder<'_>,
) -> Result<ComposeSummary> {
    let mut ctx = LayoutContext::new(fonts, config.geometry(), config.spacing());

    // body origin is measured in the body font before the page exists
    ctx.set_font(FontSpec::regular(FontSize::Mid));
    let x = ctx.next_x("", 0.0, config.margin)?;
    let y = ctx.next_y("", config.body_top())?;
    let footer_top = decorator.footer_top(&mut ctx)?;

    let mut canvas = doc.add_page(&mut ctx)?;
    StatementComposer::new(statement, config).compose_body(&mut ctx, &mut canvas, x, y, footer_top)
}

/// Compose without serializing, returning the recorded pages.
pub fn layout_statement(
    statement: &Statement,
    config: &ReportConfig,
    fonts: &FontContext,
) -> Result<(Vec<LayoutPage>, ComposeSummary)> {
    let decorator = StatementDecorator::new(statement, config);
    let mut doc = DocumentBuilder::new(config.geometry()).with_decorator(&decorator);
    let summary = compose_statement(statement, config, fonts, &decorator, &mut doc)?;
    Ok((doc.pages().to_vec(), summary))
}
