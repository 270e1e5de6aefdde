//! Read-only aggregates over the bill list: table totals, due-date alerts,
//! calendar grouping and chart series.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::config::DEFAULT_DUE_SOON_DAYS;
use crate::domain::{Bill, BillStatus, DomainModel};

const BREAKDOWN_LIMIT: usize = 10;
const EVOLUTION_MONTHS: usize = 12;

/// Table filters. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillFilter {
    /// `YYYY-MM`
    pub month: Option<String>,
    pub category: Option<String>,
    pub status: Option<BillStatus>,
}

impl BillFilter {
    pub fn matches(&self, bill: &Bill) -> bool {
        self.month
            .as_deref()
            .map_or(true, |month| bill.month_key() == month)
            && self
                .category
                .as_deref()
                .map_or(true, |category| bill.category == category)
            && self.status.map_or(true, |status| bill.status == status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
    /// Pending bills that are overdue or due soon.
    pub alerts: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    Overdue,
    DueSoon,
    Upcoming,
    Settled,
}

impl DueState {
    pub fn needs_attention(self) -> bool {
        matches!(self, DueState::Overdue | DueState::DueSoon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Indices into the bill list.
    pub bills: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    /// Empty cells before day 1 in a Sunday-first grid.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPeriod {
    #[default]
    Month,
    Year,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    /// `YYYY-MM`
    pub month: String,
    /// `MM/YY`
    pub label: String,
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
}

pub struct SummaryService;

impl SummaryService {
    pub fn days_until_due(bill: &Bill, today: NaiveDate) -> i64 {
        (bill.due_date - today).num_days()
    }

    pub fn due_state(bill: &Bill, today: NaiveDate) -> DueState {
        Self::due_state_within(bill, today, DEFAULT_DUE_SOON_DAYS)
    }

    pub fn due_state_within(bill: &Bill, today: NaiveDate, due_soon_days: i64) -> DueState {
        if bill.is_paid() {
            return DueState::Settled;
        }
        match Self::days_until_due(bill, today) {
            days if days < 0 => DueState::Overdue,
            days if days <= due_soon_days => DueState::DueSoon,
            _ => DueState::Upcoming,
        }
    }

    pub fn totals(model: &DomainModel, filter: &BillFilter, today: NaiveDate) -> Totals {
        Self::totals_within(model, filter, today, DEFAULT_DUE_SOON_DAYS)
    }

    pub fn totals_within(
        model: &DomainModel,
        filter: &BillFilter,
        today: NaiveDate,
        due_soon_days: i64,
    ) -> Totals {
        model
            .bills
            .iter()
            .filter(|bill| filter.matches(bill))
            .fold(Totals::default(), |mut totals, bill| {
                totals.total += bill.amount;
                totals.count += 1;
                if bill.is_paid() {
                    totals.paid += bill.amount;
                } else {
                    totals.pending += bill.amount;
                }
                if Self::due_state_within(bill, today, due_soon_days).needs_attention() {
                    totals.alerts += 1;
                }
                totals
            })
    }

    /// Indices of bills due on `date`.
    pub fn bills_on(model: &DomainModel, date: NaiveDate) -> Vec<usize> {
        model
            .bills
            .iter()
            .enumerate()
            .filter(|(_, bill)| bill.due_date == date)
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns `None` for an invalid month.
    pub fn calendar(model: &DomainModel, year: i32, month: u32) -> Option<CalendarMonth> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let days = first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| CalendarDay {
                date,
                bills: Self::bills_on(model, date),
            })
            .collect();
        Some(CalendarMonth {
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }

    /// Sums per label over the period, largest first, at most ten entries.
    pub fn category_breakdown(
        model: &DomainModel,
        period: ChartPeriod,
        today: NaiveDate,
    ) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        let in_period = |bill: &&Bill| match period {
            ChartPeriod::Month => {
                bill.due_date.year() == today.year() && bill.due_date.month() == today.month()
            }
            ChartPeriod::Year => bill.due_date.year() == today.year(),
            ChartPeriod::All => true,
        };
        for bill in model.bills.iter().filter(in_period) {
            match totals.iter_mut().find(|entry| entry.category == bill.category) {
                Some(entry) => entry.amount += bill.amount,
                None => totals.push(CategoryTotal {
                    category: bill.category.clone(),
                    amount: bill.amount,
                }),
            }
        }
        totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        totals.truncate(BREAKDOWN_LIMIT);
        totals
    }

    /// Per-month totals for the latest twelve months that have bills.
    pub fn monthly_evolution(model: &DomainModel) -> Vec<MonthlyTotals> {
        let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for bill in &model.bills {
            let entry = months.entry(bill.month_key()).or_default();
            if bill.is_paid() {
                entry.0 += bill.amount;
            } else {
                entry.1 += bill.amount;
            }
        }
        let skip = months.len().saturating_sub(EVOLUTION_MONTHS);
        months
            .into_iter()
            .skip(skip)
            .map(|(month, (paid, pending))| {
                let label = match month.split_once('-') {
                    Some((year, mm)) => format!("{}/{}", mm, &year[year.len().saturating_sub(2)..]),
                    None => month.clone(),
                };
                MonthlyTotals {
                    month,
                    label,
                    total: paid + pending,
                    paid,
                    pending,
                }
            })
            .collect()
    }
}
