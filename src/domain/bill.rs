//! Bill records ("contas").

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, NamedEntity};
use crate::utils::format::{format_amount, format_date};

/// A single expense entry. Bills have no identifier besides their position
/// and reference their category by label only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "data")]
    pub due_date: NaiveDate,
    pub status: BillStatus,
}

impl Bill {
    pub fn new(
        category: impl Into<String>,
        amount: f64,
        due_date: NaiveDate,
        status: BillStatus,
    ) -> Self {
        Self {
            category: category.into(),
            amount,
            due_date,
            status,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == BillStatus::Paid
    }

    /// `YYYY-MM` bucket used by month filters and the evolution series.
    pub fn month_key(&self) -> String {
        self.due_date.format("%Y-%m").to_string()
    }
}

impl NamedEntity for Bill {
    fn name(&self) -> &str {
        &self.category
    }
}

impl Displayable for Bill {
    fn display_label(&self) -> String {
        format!(
            "{} {} {} ({})",
            self.category,
            format_amount(self.amount),
            format_date(self.due_date),
            self.status
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BillStatus {
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Pago")]
    Paid,
}

impl BillStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pendente" | "pending" => Some(BillStatus::Pending),
            "pago" | "paid" => Some(BillStatus::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStatus::Pending => "Pendente",
            BillStatus::Paid => "Pago",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let bill = Bill::new(
            "INTERNET",
            89.9,
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            BillStatus::Pending,
        );
        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["categoria"], "INTERNET");
        assert_eq!(json["valor"], 89.9);
        assert_eq!(json["data"], "2025-01-05");
        assert_eq!(json["status"], "Pendente");
    }

    #[test]
    fn status_parses_both_vocabularies() {
        assert_eq!(BillStatus::parse("Pago"), Some(BillStatus::Paid));
        assert_eq!(BillStatus::parse("pending"), Some(BillStatus::Pending));
        assert_eq!(BillStatus::parse("late"), None);
    }
}
