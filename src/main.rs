//! # statement-pdf CLI
//!
//! Reads `account_statement.json` (and `report_config.json` when present)
//! from the working directory and writes `result.pdf` next to them.
//!
//! `RUST_LOG=debug` shows per-section cursor positions.

use std::fs;

use statement_pdf::{ReportConfig, Statement, StatementError};

const STATEMENT_PATH: &str = "account_statement.json";
const CONFIG_PATH: &str = "report_config.json";
const OUTPUT_PATH: &str = "result.pdf";

fn main() {
    env_logger::init();

    println!("Generating PDF file...");

    match run() {
        Ok(len) => {
            log::info!("Written {} bytes to {}", len, OUTPUT_PATH);
            println!("Finished generating PDF file. Your file is ready!");
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<usize, StatementError> {
    let config = ReportConfig::load_or_default(CONFIG_PATH)?;
    let statement = Statement::load(STATEMENT_PATH)?;
    let bytes = statement_pdf::render(&statement, &config)?;
    fs::write(OUTPUT_PATH, &bytes).map_err(|e| StatementError::io(OUTPUT_PATH, e))?;
    Ok(bytes.len())
}
