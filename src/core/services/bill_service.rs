use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Bill, BillStatus, DomainModel};
use crate::errors::TrackerError;

use super::ServiceResult;

/// A single-field change applied to an existing bill.
#[derive(Debug, Clone, PartialEq)]
pub enum BillEdit {
    Category(String),
    Amount(f64),
    DueDate(NaiveDate),
    Status(BillStatus),
}

/// Provides validated CRUD helpers for bills.
pub struct BillService;

impl BillService {
    /// Validates and appends a bill, returning its index.
    pub fn add(model: &mut DomainModel, mut bill: Bill) -> ServiceResult<usize> {
        bill.category = bill.category.trim().to_string();
        Self::validate(&bill)?;
        debug!(category = %bill.category, amount = bill.amount, "bill added");
        model.bills.push(bill);
        Ok(model.bills.len() - 1)
    }

    pub fn edit(model: &mut DomainModel, index: usize, edit: BillEdit) -> ServiceResult<()> {
        let current = model
            .bills
            .get(index)
            .ok_or(TrackerError::BillNotFound(index))?;
        let mut updated = current.clone();
        match edit {
            BillEdit::Category(category) => updated.category = category.trim().to_string(),
            BillEdit::Amount(amount) => updated.amount = amount,
            BillEdit::DueDate(date) => updated.due_date = date,
            BillEdit::Status(status) => updated.status = status,
        }
        Self::validate(&updated)?;
        model.bills[index] = updated;
        Ok(())
    }

    /// Flips between pending and paid.
    pub fn toggle_status(model: &mut DomainModel, index: usize) -> ServiceResult<BillStatus> {
        let bill = model
            .bills
            .get_mut(index)
            .ok_or(TrackerError::BillNotFound(index))?;
        bill.status = match bill.status {
            BillStatus::Pending => BillStatus::Paid,
            BillStatus::Paid => BillStatus::Pending,
        };
        Ok(bill.status)
    }

    pub fn remove(model: &mut DomainModel, index: usize) -> ServiceResult<Bill> {
        if index >= model.bills.len() {
            return Err(TrackerError::BillNotFound(index));
        }
        Ok(model.bills.remove(index))
    }

    pub fn validate(bill: &Bill) -> ServiceResult<()> {
        if bill.category.trim().is_empty() {
            return Err(TrackerError::InvalidBill("category is required".into()));
        }
        if !bill.amount.is_finite() || bill.amount <= 0.0 {
            return Err(TrackerError::InvalidBill(format!(
                "amount must be positive, got {}",
                bill.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn sample_bill() -> Bill {
        Bill::new(" CEMIG ", 210.35, date(8), BillStatus::Pending)
    }

    #[test]
    fn add_trims_category() {
        let mut model = DomainModel::new();
        let index = BillService::add(&mut model, sample_bill()).unwrap();
        assert_eq!(model.bills[index].category, "CEMIG");
    }

    #[test]
    fn add_rejects_non_positive_amounts() {
        let mut model = DomainModel::new();
        let mut bill = sample_bill();
        bill.amount = 0.0;
        let err = BillService::add(&mut model, bill).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidBill(_)));
        assert!(model.bills.is_empty());
    }

    #[test]
    fn add_rejects_nan() {
        let mut model = DomainModel::new();
        let mut bill = sample_bill();
        bill.amount = f64::NAN;
        assert!(BillService::add(&mut model, bill).is_err());
    }

    #[test]
    fn edit_keeps_bill_on_invalid_change() {
        let mut model = DomainModel::new();
        BillService::add(&mut model, sample_bill()).unwrap();
        let err = BillService::edit(&mut model, 0, BillEdit::Category("   ".into())).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidBill(_)));
        assert_eq!(model.bills[0].category, "CEMIG");

        BillService::edit(&mut model, 0, BillEdit::DueDate(date(20))).unwrap();
        assert_eq!(model.bills[0].due_date, date(20));
    }

    #[test]
    fn edit_fails_for_missing_bill() {
        let mut model = DomainModel::new();
        let err = BillService::edit(&mut model, 2, BillEdit::Amount(10.0)).unwrap_err();
        assert!(matches!(err, TrackerError::BillNotFound(2)));
    }

    #[test]
    fn toggle_and_remove() {
        let mut model = DomainModel::new();
        BillService::add(&mut model, sample_bill()).unwrap();
        assert_eq!(BillService::toggle_status(&mut model, 0).unwrap(), BillStatus::Paid);
        let removed = BillService::remove(&mut model, 0).unwrap();
        assert!(removed.is_paid());
        assert!(matches!(
            BillService::remove(&mut model, 0),
            Err(TrackerError::BillNotFound(0))
        ));
    }
}
