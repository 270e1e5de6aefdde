use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::{
    bill::{Bill, BillStatus},
    common::NamedEntity,
    builtin::BUILTIN_CATEGORIES,
    category::Category,
    hidden::HiddenCategories,
};

/// The tracker's whole in-memory state. Owned by the application root and
/// handed by reference to every service that reads or mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainModel {
    pub bills: Vec<Bill>,
    pub categories: Vec<Category>,
    pub hidden: HiddenCategories,
    pub dark_mode: bool,
    pub last_saved: Option<DateTime<Utc>>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a model from already-validated or legacy parts without
    /// re-running category rules; loads tolerate what mutations would reject.
    pub fn from_parts(
        bills: Vec<Bill>,
        categories: Vec<Category>,
        hidden: HiddenCategories,
        dark_mode: bool,
    ) -> Self {
        Self {
            bills,
            categories,
            hidden,
            dark_mode,
            last_saved: None,
        }
    }

    /// Seed data for a first start: three bills in the current month and three
    /// category records.
    pub fn seeded(today: NaiveDate, now: DateTime<Utc>) -> Self {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(today.year(), today.month(), d).unwrap_or(today)
        };
        let bills = vec![
            Bill::new("INTERNET", 89.90, day(5), BillStatus::Pending),
            Bill::new("Mercado", 350.00, day(10), BillStatus::Paid),
            Bill::new("Academia", 120.00, day(15), BillStatus::Pending),
        ];
        let categories = ["Aluguel", "Transporte", "Lazer"]
            .into_iter()
            .map(|name| Category::created_at(name, now))
            .collect();
        Self::from_parts(bills, categories, HiddenCategories::new(), false)
    }

    pub fn bill(&self, index: usize) -> Option<&Bill> {
        self.bills.get(index)
    }

    pub fn category(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Number of bills whose label equals `name` exactly.
    pub fn bills_referencing(&self, name: &str) -> usize {
        self.bills.iter().filter(|bill| bill.name() == name).count()
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|category| category.name_matches(name))
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }

    /// Built-ins plus records, the figure shown next to backups.
    pub fn total_categories(&self) -> usize {
        self.categories.len() + BUILTIN_CATEGORIES.len()
    }
}
