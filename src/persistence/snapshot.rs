//! Serialized shapes of the three stored representations. Deserializing into
//! these typed structs is the schema check: anything that does not fit is a
//! parse failure and the loader moves on to the next source.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Bill, BillStatus, Category, DomainModel, HiddenCategories};

use super::keys::FORMAT_VERSION;

/// Full-fidelity representation stored under the primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimarySnapshot {
    #[serde(rename = "contas")]
    pub bills: Vec<Bill>,
    #[serde(rename = "cadastros", default)]
    pub categories: Vec<Category>,
    #[serde(rename = "categoriasOcultas", default)]
    pub hidden: Option<Vec<String>>,
    #[serde(rename = "temaEscuro", default)]
    pub dark_mode: bool,
    #[serde(rename = "ultimoSalvamento", default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(rename = "versao", default)]
    pub version: Option<String>,
}

impl PrimarySnapshot {
    pub fn from_model(model: &DomainModel, saved_at: DateTime<Utc>) -> Self {
        Self {
            bills: model.bills.clone(),
            categories: model.categories.clone(),
            hidden: Some(model.hidden.iter().map(str::to_string).collect()),
            dark_mode: model.dark_mode,
            saved_at: Some(saved_at),
            version: Some(FORMAT_VERSION.to_string()),
        }
    }
}

/// Space-optimized mirror stored under the backup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactBackup {
    pub c: Vec<CompactBill>,
    #[serde(default)]
    pub cad: Vec<Category>,
    #[serde(default)]
    pub ocultas: Option<Vec<String>>,
    /// Write time in epoch milliseconds.
    #[serde(default)]
    pub t: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactBill {
    pub cat: String,
    pub v: f64,
    pub d: NaiveDate,
    pub s: BillStatus,
}

impl From<&Bill> for CompactBill {
    fn from(bill: &Bill) -> Self {
        Self {
            cat: bill.category.clone(),
            v: bill.amount,
            d: bill.due_date,
            s: bill.status,
        }
    }
}

impl From<CompactBill> for Bill {
    fn from(compact: CompactBill) -> Self {
        Bill::new(compact.cat, compact.v, compact.d, compact.s)
    }
}

impl CompactBackup {
    pub fn from_model(model: &DomainModel, written_at: DateTime<Utc>) -> Self {
        Self {
            c: model.bills.iter().map(CompactBill::from).collect(),
            cad: model.categories.clone(),
            ocultas: Some(model.hidden.iter().map(str::to_string).collect()),
            t: Some(written_at.timestamp_millis()),
        }
    }
}

/// Reduced snapshot written only after a quota failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteSnapshot {
    #[serde(rename = "contas")]
    pub bills: Vec<Bill>,
    #[serde(rename = "cadastros")]
    pub categories: Vec<Category>,
    #[serde(rename = "categoriasOcultas")]
    pub hidden: HiddenCategories,
    #[serde(rename = "temaEscuro")]
    pub dark_mode: bool,
}

impl LiteSnapshot {
    /// Keeps the most recent `limit` bills, i.e. the tail of the list.
    pub fn from_model(model: &DomainModel, limit: usize) -> Self {
        let start = model.bills.len().saturating_sub(limit);
        Self {
            bills: model.bills[start..].to_vec(),
            categories: model.categories.clone(),
            hidden: model.hidden.clone(),
            dark_mode: model.dark_mode,
        }
    }
}
