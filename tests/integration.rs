//! Integration tests for the statement rendering pipeline.
//!
//! These tests exercise the full path from statement JSON to PDF bytes.
//! They verify:
//! - Statement and config JSON load with defaults for missing fields
//! - Header, body and footer land where the cursor rules put them
//! - Balance totals match the product rows
//! - PDF output is structurally valid
//! - Missing inputs fail before anything is written

use base64::Engine;
use statement_pdf::compose::{layout_statement, transactions_title};
use statement_pdf::config::{FontFiles, ImageAsset, QrSource};
use statement_pdf::font::{FontContext, FontSize, FontSpec, TextMetrics};
use statement_pdf::layout::LayoutPage;
use statement_pdf::model::BalanceTotals;
use statement_pdf::{render, render_json, ReportConfig, Statement, StatementError};

// ─── Helpers ────────────────────────────────────────────────────

const STATEMENT_JSON: &str = r#"{
  "name": "Jane Doe",
  "currency": "EUR",
  "currency_symbol": "€",
  "created_at": "29 March 2023",
  "address": {
    "house_no": 7,
    "street": "Konstitucijos pr.",
    "city": "Vilnius",
    "state": "Vilnius County",
    "country": "Lithuania"
  },
  "iban": [
    { "no": "LT12 3250 0123 4567 8901", "bic": "REVOLT21" },
    { "no": "GB33 REVO 0099 7012 3456 78", "bic": "REVOGB21" }
  ],
  "balance_summary": {
    "products": [
      { "product": "Account (Current Account)", "opening_balance": 120.5, "money_out": 80, "money_in": 200, "closing_balance": 240.5 },
      { "product": "Savings", "opening_balance": 1000, "money_out": 0, "money_in": 50.25, "closing_balance": 1050.25 }
    ]
  },
  "transactions": [
    { "date": "Mar 1, 2023", "description": "Transfer from JOHN DOE", "money_out": 0, "money_in": 200, "balance": 320.5 },
    { "date": "Mar 4, 2023", "description": "Grocery store", "money_out": 45.2, "money_in": 0, "balance": 275.3 },
    { "date": "Mar 9, 2023", "description": "Train ticket", "money_out": 34.8, "money_in": 0, "balance": 240.5 }
  ]
}"#;

fn png_data_uri() -> String {
    let mut img = image::RgbaImage::new(2, 2);
    for p in img.pixels_mut() {
        *p = image::Rgba([10, 20, 30, 255]);
    }
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgba8).unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(buf)
    )
}

/// Default layout with images that do not depend on files on disk.
fn hermetic_config() -> ReportConfig {
    ReportConfig {
        logo: ImageAsset {
            src: png_data_uri(),
            width: 90.0,
            height: 30.0,
        },
        qr: QrSource::Payload {
            data: "https://example.com/help".to_string(),
        },
        ..Default::default()
    }
}

fn layout(statement: &Statement, config: &ReportConfig) -> LayoutPage {
    let fonts = FontContext::new();
    let (mut pages, _) = layout_statement(statement, config, &fonts).unwrap();
    assert_eq!(pages.len(), 1);
    pages.remove(0)
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn mid_line() -> f64 {
    FontContext::new()
        .text_height("", FontSpec::regular(FontSize::Mid))
        .unwrap()
        + 3.0
}

// ─── Full pipeline ──────────────────────────────────────────────

#[test]
fn test_render_json_produces_valid_pdf() {
    let bytes = render_json(STATEMENT_JSON, &hermetic_config()).unwrap();
    assert_valid_pdf(&bytes);

    let text = String::from_utf8_lossy(&bytes);
    assert_eq!(text.matches("/Type /Page ").count(), 1);
    assert!(text.contains("/Title (EUR Statement)"));
    assert!(text.contains("/Author (Revolut Bank UAB)"));
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
    assert!(text.contains("/XObject << /Im0"));
}

#[test]
fn test_empty_statement_still_renders() {
    let bytes = render(&Statement::default(), &hermetic_config()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_missing_logo_aborts() {
    let config = ReportConfig {
        logo: ImageAsset {
            src: "/nonexistent/logo.jpg".to_string(),
            width: 90.0,
            height: 30.0,
        },
        ..hermetic_config()
    };
    let err = render(&Statement::default(), &config).unwrap_err();
    assert!(matches!(err, StatementError::Image(_)));
}

#[test]
fn test_malformed_statement_is_parse_error() {
    let err = render_json(r#"{ "name": "Jane", }"#, &hermetic_config()).unwrap_err();
    assert!(matches!(err, StatementError::Parse { what: "statement", .. }));
    assert!(err.to_string().contains("Hint"));
}

#[test]
fn test_statement_file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("account_statement.json");
    std::fs::write(&path, STATEMENT_JSON).unwrap();

    let statement = Statement::load(&path).unwrap();
    assert_eq!(statement.iban.len(), 2);
    assert_eq!(statement.transactions.len(), 3);

    let bytes = render(&statement, &hermetic_config()).unwrap();
    let out = dir.path().join("result.pdf");
    std::fs::write(&out, &bytes).unwrap();
    assert_valid_pdf(&std::fs::read(out).unwrap());
}

// ─── Fonts ──────────────────────────────────────────────────────

/// A regular/bold pair of system TrueType faces. None if not installed.
fn system_font_files() -> Option<FontFiles> {
    let pairs = [
        (
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        ),
        ("/usr/share/fonts/TTF/DejaVuSans.ttf", "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
    ];
    pairs
        .iter()
        .find(|(regular, bold)| std::path::Path::new(regular).exists() && std::path::Path::new(bold).exists())
        .map(|(regular, bold)| FontFiles {
            regular: Some(regular.into()),
            bold: Some(bold.into()),
        })
}

fn lithuanian_statement() -> Statement {
    let mut statement = Statement::from_json(STATEMENT_JSON).unwrap();
    statement.name = "Jūratė Kazlauskienė".to_string();
    statement.address.city = "Šiauliai".to_string();
    statement
}

#[test]
fn test_text_outside_standard_encoding_aborts() {
    let err = render(&lithuanian_statement(), &hermetic_config()).unwrap_err();
    assert!(matches!(err, StatementError::Font(_)), "{err}");
    assert!(err.to_string().contains("U+016A"), "{err}");
}

#[test]
fn test_truetype_faces_embedded_as_subsets() {
    let Some(files) = system_font_files() else {
        eprintln!("Skipping: DejaVu fonts not installed");
        return;
    };
    let full_size = std::fs::metadata(files.regular.as_ref().unwrap()).unwrap().len()
        + std::fs::metadata(files.bold.as_ref().unwrap()).unwrap().len();
    let config = ReportConfig {
        fonts: files,
        ..hermetic_config()
    };

    let bytes = render(&lithuanian_statement(), &config).unwrap();
    assert_valid_pdf(&bytes);
    let text = String::from_utf8_lossy(&bytes);
    assert_eq!(text.matches("/Subtype /CIDFontType2").count(), 2);
    assert!(!text.contains("/Helvetica"));
    assert!(
        (bytes.len() as u64) < full_size / 10,
        "{} bytes for {} bytes of font files",
        bytes.len(),
        full_size
    );
}

// ─── Page layout ────────────────────────────────────────────────

#[test]
fn test_page_sections_in_reading_order() {
    let statement = Statement::from_json(STATEMENT_JSON).unwrap();
    let page = layout(&statement, &hermetic_config());

    let y_of = |t: &str| page.find_text(t).unwrap_or_else(|| panic!("missing {t:?}")).1;
    let order = [
        "EUR Statement",
        "Generated on 29 March 2023",
        "JANE DOE",
        "7 Konstitucijos pr.",
        "Lithuania",
        "REVOLT21",
        "REVOGB21",
        "Balance summary",
        "Savings",
        "Total",
        "Account transactions from Mar 1, 2023 to Mar 9, 2023",
        "Train ticket",
        "Scan the QR code",
        "© 2023 Revolut Bank UAB",
    ];
    for pair in order.windows(2) {
        assert!(y_of(pair[0]) < y_of(pair[1]), "{:?} should be above {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_body_starts_below_logo() {
    let statement = Statement::from_json(STATEMENT_JSON).unwrap();
    let page = layout(&statement, &hermetic_config());
    let (x, y) = page.find_text("JANE DOE").unwrap();
    assert_eq!(x, 30.0);
    assert!((y - (60.0 + mid_line() + 50.0)).abs() < 1e-9);
}

#[test]
fn test_totals_row_sums_products() {
    let statement = Statement::from_json(STATEMENT_JSON).unwrap();
    let fonts = FontContext::new();
    let (pages, summary) = layout_statement(&statement, &hermetic_config(), &fonts).unwrap();

    let expected = BalanceTotals {
        opening_balance: 1120.5,
        money_out: 80.0,
        money_in: 250.25,
        closing_balance: 1290.75,
    };
    assert_eq!(summary.totals, expected);
    assert_eq!(statement.totals(), expected);

    let (_, total_y) = pages[0].find_text("Total").unwrap();
    let cells: Vec<&str> = pages[0]
        .texts()
        .filter(|(_, y, _)| *y == total_y)
        .map(|(_, _, t)| t)
        .collect();
    assert_eq!(cells, vec!["Total", "€1120.5", "€80", "€250.25", "€1290.75"]);
}

#[test]
fn test_disclaimer_only_under_secondary_iban() {
    let statement = Statement::from_json(STATEMENT_JSON).unwrap();
    let config = hermetic_config();
    let page = layout(&statement, &config);

    let (_, note_y) = page.find_text(&config.iban_disclaimer[0]).unwrap();
    let (_, primary_bic_y) = page.find_text("REVOLT21").unwrap();
    let (_, secondary_bic_y) = page.find_text("REVOGB21").unwrap();
    assert!(note_y > secondary_bic_y);
    assert!(note_y > primary_bic_y);
    assert_eq!(
        page.texts().filter(|(_, _, t)| *t == config.iban_disclaimer[1]).count(),
        1
    );
}

#[test]
fn test_amount_columns_shared_between_tables() {
    let statement = Statement::from_json(STATEMENT_JSON).unwrap();
    let page = layout(&statement, &hermetic_config());

    let xs_of = |t: &str| -> Vec<f64> {
        page.texts().filter(|(_, _, s)| *s == t).map(|(x, _, _)| x).collect()
    };
    let money_out = xs_of("Money out");
    let money_in = xs_of("Money in");
    assert_eq!(money_out.len(), 2);
    assert_eq!(money_out[0], money_out[1]);
    assert_eq!(money_in[0], money_in[1]);

    let (closing_x, _) = page.find_text("Closing").unwrap();
    let (balance_x, _) = page.find_text("Balance").unwrap();
    assert_eq!(closing_x, balance_x);
}

#[test]
fn test_footer_sits_on_bottom_margin() {
    let statement = Statement::from_json(STATEMENT_JSON).unwrap();
    let page = layout(&statement, &hermetic_config());
    let fonts = FontContext::new();

    let h = fonts.text_height("", FontSpec::bold(FontSize::Mid)).unwrap();
    let (_, y) = page.find_text("© 2023 Revolut Bank UAB").unwrap();
    assert!((y - (841.89 - 30.0 - h)).abs() < 1e-9);
    assert_eq!(page.find_text("Page 1 of 1").map(|(_, py)| py), Some(y));
}

#[test]
fn test_config_overrides_branding() {
    let config = ReportConfig {
        bank: "Acme Bank".to_string(),
        document_type: "USD Statement".to_string(),
        declared_page_count: 2,
        ..hermetic_config()
    };
    let page = layout(&Statement::default(), &config);
    assert!(page.find_text("USD Statement").is_some());
    assert!(page.find_text("Acme Bank").is_some());
    assert!(page.find_text("© 2023 Acme Bank").is_some());
    assert!(page.find_text("Page 1 of 2").is_some());
}

#[test]
fn test_transactions_title_without_rows() {
    let statement = Statement::default();
    assert_eq!(transactions_title(&statement), "Account transactions");
    let page = layout(&statement, &hermetic_config());
    assert!(page.find_text("Account transactions").is_some());
    assert!(page.find_text("Date").is_some());
}

#[test]
fn test_demo_inputs_load() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let statement = Statement::load(dir.join("account_statement.json")).unwrap();
    assert_eq!(statement, Statement::from_json(STATEMENT_JSON).unwrap());

    let config = ReportConfig::load_or_default(dir.join("report_config.json")).unwrap();
    assert!(matches!(config.qr, QrSource::Payload { .. }));
    assert_eq!(config.logo.src, "./assets/logo.png");
}
