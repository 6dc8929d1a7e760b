//! Header and footer drawn on every physical page.

use crate::config::{QrSource, ReportConfig};
use crate::document::PageDecorator;
use crate::error::{Result, StatementError};
use crate::font::{FontSize, FontSpec};
use crate::layout::{write_text, LayoutContext, Surface};
use crate::model::Statement;

/// Side length of the footer QR square.
pub const QR_SIZE: f64 = 30.0;
/// Gap between the QR and the contact lines.
pub const QR_GAP: f64 = 3.0;
/// Explicit height handed to `align_bottom` when placing the QR above the
/// copyright line, so the QR top is `copyright_y - margin - 3`.
///
/// Not to be swapped for the text-height form
/// `align_bottom(copyright_y, 0, label, 3)`, which lands at
/// `copyright_y - margin - text_height - 3` and moves the whole contact
/// block up by one line height.
pub const QR_ROW_MARGIN: f64 = 3.0;
/// Pulls the page label left of the right margin.
pub const PAGE_LABEL_INSET: f64 = 5.0;
/// Gap between the first contact line and the disclaimer column.
pub const DISCLAIMER_GAP: f64 = 10.0;

pub struct StatementDecorator<'a> {
    statement: &'a Statement,
    config: &'a ReportConfig,
}

impl<'a> StatementDecorator<'a> {
    pub fn new(statement: &'a Statement, config: &'a ReportConfig) -> Self {
        Self { statement, config }
    }

    fn copyright(&self) -> String {
        format!("© {} {}", self.config.copyright_year, self.config.bank)
    }

    /// Y of the copyright line, measured in the footer font.
    fn copyright_y(&self, ctx: &LayoutContext<'_>) -> Result<f64> {
        ctx.align_bottom(ctx.geometry().height, 0.0, &self.copyright(), 0.0)
    }

    /// Top of the footer block (the QR's top edge). Leaves the current font
    /// untouched.
    pub fn footer_top(&self, ctx: &mut LayoutContext<'_>) -> Result<f64> {
        let saved = ctx.font();
        ctx.set_font(FontSpec::bold(FontSize::Mid));
        let top = self
            .copyright_y(ctx)
            .and_then(|y| ctx.align_bottom(y, QR_ROW_MARGIN, "", 0.0));
        ctx.set_font(saved);
        top
    }

    fn draw_qr(&self, surface: &mut dyn Surface, x: f64, y: f64) -> Result<()> {
        match &self.config.qr {
            QrSource::Image { src } => surface.draw_image(src, x, y, QR_SIZE, QR_SIZE),
            QrSource::Payload { data } => {
                let code = qrcode::QrCode::new(data.as_bytes())
                    .map_err(|e| StatementError::Qr(e.to_string()))?;
                let n = code.width();
                let module = QR_SIZE / n as f64;
                for (i, color) in code.to_colors().into_iter().enumerate() {
                    if color == qrcode::Color::Dark {
                        let (row, col) = ((i / n) as f64, (i % n) as f64);
                        surface.fill_rect(x + col * module, y + row * module, module, module)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl PageDecorator for StatementDecorator<'_> {
    fn render_header(&self, ctx: &mut LayoutContext<'_>, surface: &mut dyn Surface, _page_number: usize) -> Result<()> {
        let margin = ctx.spacing().margin;
        let right_edge = ctx.geometry().width;
        let logo = &self.config.logo;

        ctx.set_font(FontSpec::bold(FontSize::Large));
        surface.draw_image(&logo.src, margin, margin, logo.width, logo.height)?;

        let mut y = margin;
        let mut text = self.config.document_type.clone();
        surface.draw_text(ctx.align_right(&text, right_edge)?, y, &text, ctx.font())?;

        ctx.set_font(FontSpec::regular(FontSize::Mid));

        for next in [
            format!("Generated on {}", self.statement.created_at),
            self.config.bank.clone(),
        ] {
            y = ctx.next_y(&text, y)?;
            text = next;
            surface.draw_text(ctx.align_right(&text, right_edge)?, y, &text, ctx.font())?;
        }
        Ok(())
    }

    fn render_footer(&self, ctx: &mut LayoutContext<'_>, surface: &mut dyn Surface, page_number: usize) -> Result<()> {
        let margin = ctx.spacing().margin;

        ctx.set_font(FontSpec::bold(FontSize::Mid));

        let copyright = self.copyright();
        let y = self.copyright_y(ctx)?;
        write_text(ctx, surface, margin, y, 0.0, 0.0, &copyright)?;

        let label = format!("Page {} of {}", page_number, self.config.declared_page_count);
        let label_x = ctx.align_right(&label, ctx.geometry().width)? - PAGE_LABEL_INSET;
        write_text(ctx, surface, label_x, y, 0.0, 0.0, &label)?;

        let mut y = ctx.align_bottom(y, QR_ROW_MARGIN, "", 0.0)?;
        self.draw_qr(surface, margin, y)?;

        ctx.set_font(FontSpec::regular(FontSize::Small));

        let line_x = margin + QR_SIZE + QR_GAP;
        let disclaimer = &self.config.footer_disclaimer;
        let mut disclaimer_x = None;
        let mut previous: Option<&str> = None;

        for line in &self.config.contact_lines {
            if let Some(prev) = previous {
                y = ctx.next_y(prev, y)?;
            }
            write_text(ctx, surface, line_x, y, 0.0, 0.0, line)?;

            // Column set by the first line's width, reused below.
            let dx = match disclaimer_x {
                Some(dx) => dx,
                None => *disclaimer_x.insert(ctx.next_x(line, DISCLAIMER_GAP, line_x)?),
            };
            write_text(ctx, surface, dx, y, 0.0, 0.0, disclaimer)?;
            previous = Some(line.as_str());
        }
        Ok(())
    }
}
