//! # Statement Model
//!
//! The input representation for the renderer: one account statement as it
//! arrives in `account_statement.json`. Every field is optional on the wire.
//! Missing numbers load as zero and missing strings as empty, so loading
//! only fails on malformed JSON or a wrongly typed value.
//!
//! Nothing here is mutated during rendering. The composer borrows the
//! statement read-only and derives everything else (formatted amounts,
//! balance totals) on the fly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatementError};

/// A complete account statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statement {
    pub name: String,
    pub currency: String,
    pub currency_symbol: String,
    pub iban: Vec<Iban>,
    pub balance_summary: BalanceSummary,
    pub transactions: Vec<Transaction>,
    /// Free text, printed verbatim in the "Generated on" header line.
    pub created_at: String,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub house_no: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// One IBAN/BIC pair. The first entry of a statement is the primary account;
/// later entries are rendered with a "cannot be used for transfers" note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Iban {
    pub no: String,
    pub bic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSummary {
    pub products: Vec<Product>,
}

/// A row of the balance summary table.
///
/// The loader does not check that `closing = opening - out + in`; the
/// figures are printed as supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub product: String,
    pub opening_balance: f64,
    pub money_in: f64,
    pub money_out: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    /// Free text; never parsed as a calendar date.
    pub date: String,
    pub description: String,
    pub money_in: f64,
    pub money_out: f64,
    pub balance: f64,
}

/// Column sums of the balance summary table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BalanceTotals {
    pub opening_balance: f64,
    pub money_out: f64,
    pub money_in: f64,
    pub closing_balance: f64,
}

impl BalanceTotals {
    /// Sum every column across `products`, in input order.
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut acc, p| {
            acc.add(p);
            acc
        })
    }

    /// Fold one more product into the running sums.
    pub fn add(&mut self, product: &Product) {
        self.opening_balance += product.opening_balance;
        self.money_out += product.money_out;
        self.money_in += product.money_in;
        self.closing_balance += product.closing_balance;
    }
}

impl Statement {
    /// Parse a statement from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| StatementError::parse("statement", e))
    }

    /// Read and parse a statement file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StatementError::io(path.display().to_string(), e))?;
        Self::from_json(&json)
    }

    /// Format an amount the way every table cell shows it: the currency
    /// symbol glued to the shortest decimal form of the value.
    pub fn amount(&self, value: f64) -> String {
        format!("{}{}", self.currency_symbol, value)
    }

    pub fn totals(&self) -> BalanceTotals {
        BalanceTotals::from_products(&self.balance_summary.products)
    }
}
