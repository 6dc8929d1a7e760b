//! Report configuration.
//!
//! Everything about a statement that does not come from the account data:
//! page size, spacing constants, bank branding, fixed wording, image
//! sources and optional TrueType faces. Read from `report_config.json`
//! when present (camelCase keys, every key optional); otherwise the
//! defaults reproduce the stock statement layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatementError};
use crate::font::{FontContext, FontWeight};
use crate::layout::{PageGeometry, Spacing};
use crate::pdf::Metadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub page_size: PageSize,
    /// Distance kept from page edges and reference positions.
    pub margin: f64,
    /// Gap between consecutive lines.
    pub line_space: f64,
    /// Bold title in the top-right corner.
    pub document_type: String,
    pub bank: String,
    pub copyright_year: u32,
    /// The "N" of "Page X of N". Not computed from the document.
    pub declared_page_count: u32,
    pub logo: ImageAsset,
    pub qr: QrSource,
    /// Footer lines next to the QR. The first one sets the disclaimer column.
    pub contact_lines: Vec<String>,
    /// Printed to the right of every contact line.
    pub footer_disclaimer: String,
    /// Two lines printed under every IBAN entry but the first.
    pub iban_disclaimer: [String; 2],
    /// Small print under the balance summary table.
    pub balance_disclaimer: String,
    pub fonts: FontFiles,
    pub title: Option<String>,
    pub author: Option<String>,
    /// `/Subject` of the document info dictionary. Omitted when unset.
    pub subject: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: 30.0,
            line_space: 3.0,
            document_type: "EUR Statement".to_string(),
            bank: "Revolut Bank UAB".to_string(),
            copyright_year: 2023,
            declared_page_count: 1,
            logo: ImageAsset {
                src: "./assets/image/logo.jpg".to_string(),
                width: 90.0,
                height: 30.0,
            },
            qr: QrSource::Image {
                src: "./assets/image/randomqr.jpg".to_string(),
            },
            contact_lines: vec![
                "Report lost or stolen card".to_string(),
                "+325 612 799".to_string(),
                "Get help directly in the app".to_string(),
                "Scan the QR code".to_string(),
            ],
            footer_disclaimer: "Revolut Bank UAB is a credit institution licensed in the Republic of Lithuania with company code 304580906".to_string(),
            iban_disclaimer: [
                "(You cannot use this IBAN for bank transfers.".to_string(),
                "Please use the IBAN found in the app)".to_string(),
            ],
            balance_disclaimer: "The balance on your statement might differ from the balance shown in your app".to_string(),
            fonts: FontFiles::default(),
            title: None,
            author: None,
            subject: None,
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// An image drawn at a fixed size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// File path or `data:image/...;base64,` URI.
    pub src: String,
    pub width: f64,
    pub height: f64,
}

/// Where the footer QR comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum QrSource {
    /// A ready-made QR image.
    Image { src: String },
    /// Encode this payload and draw the modules as vector squares.
    Payload { data: String },
}

/// Optional TrueType replacements for the built-in Helvetica faces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFiles {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| StatementError::parse("report config", e))
    }

    /// Read `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No {} found, using default report config", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| StatementError::io(path.display().to_string(), e))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded report config from {}", path.display());
        Ok(config)
    }

    pub fn geometry(&self) -> PageGeometry {
        let (width, height) = self.page_size.dimensions();
        PageGeometry { width, height }
    }

    pub fn spacing(&self) -> Spacing {
        Spacing {
            margin: self.margin,
            line_space: self.line_space,
        }
    }

    /// Top of the body area: just below the logo.
    pub fn body_top(&self) -> f64 {
        self.margin + self.logo.height
    }

    /// Standard faces, with any configured TrueType files registered over them.
    pub fn font_context(&self) -> Result<FontContext> {
        let mut fonts = FontContext::new();
        if let Some(path) = &self.fonts.regular {
            fonts.load_ttf(FontWeight::Regular, path)?;
        }
        if let Some(path) = &self.fonts.bold {
            fonts.load_ttf(FontWeight::Bold, path)?;
        }
        Ok(fonts)
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            title: Some(self.title.clone().unwrap_or_else(|| self.document_type.clone())),
            author: Some(self.author.clone().unwrap_or_else(|| self.bank.clone())),
            subject: self.subject.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = ReportConfig::default();
        assert_eq!(c.geometry(), PageGeometry::A4);
        assert_eq!(c.spacing(), Spacing::default());
        assert_eq!(c.body_top(), 60.0);
        assert_eq!(c.contact_lines.len(), 4);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let c = ReportConfig::from_json(
            r#"{ "bank": "Acme Bank", "pageSize": "Letter", "qr": { "kind": "payload", "data": "https://example.com" } }"#,
        )
        .unwrap();
        assert_eq!(c.bank, "Acme Bank");
        assert_eq!(c.geometry().width, 612.0);
        assert_eq!(c.qr, QrSource::Payload { data: "https://example.com".to_string() });
        assert_eq!(c.document_type, "EUR Statement");
        assert_eq!(c.margin, 30.0);
    }

    #[test]
    fn test_custom_page_size() {
        let c = ReportConfig::from_json(r#"{ "pageSize": { "Custom": { "width": 400, "height": 600 } } }"#).unwrap();
        assert_eq!(c.page_size.dimensions(), (400.0, 600.0));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let c = ReportConfig::load_or_default("/nonexistent/report_config.json").unwrap();
        assert_eq!(c, ReportConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "documentType": "USD Statement", "declaredPageCount": 5 }}"#).unwrap();
        let c = ReportConfig::load_or_default(file.path()).unwrap();
        assert_eq!(c.document_type, "USD Statement");
        assert_eq!(c.declared_page_count, 5);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"margin\": }}").unwrap();
        let err = ReportConfig::load_or_default(file.path()).unwrap_err();
        assert!(matches!(err, StatementError::Parse { what: "report config", .. }));
    }

    #[test]
    fn test_metadata_falls_back_to_branding() {
        let m = ReportConfig::default().metadata();
        assert_eq!(m.title.as_deref(), Some("EUR Statement"));
        assert_eq!(m.author.as_deref(), Some("Revolut Bank UAB"));
        assert_eq!(m.subject, None);
    }

    #[test]
    fn test_metadata_subject_from_config() {
        let c = ReportConfig::from_json(r#"{ "subject": "Account statement for March 2023" }"#).unwrap();
        assert_eq!(c.metadata().subject.as_deref(), Some("Account statement for March 2023"));
    }

    #[test]
    fn test_missing_font_file_is_fatal() {
        let c = ReportConfig {
            fonts: FontFiles {
                regular: Some(PathBuf::from("/nonexistent/Arial_Unicode.ttf")),
                bold: None,
            },
            ..Default::default()
        };
        assert!(matches!(c.font_context(), Err(StatementError::Font(_))));
    }
}
