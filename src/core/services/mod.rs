pub mod bill_service;
pub mod category_service;
pub mod summary_service;

pub use bill_service::{BillEdit, BillService};
pub use category_service::{
    BuiltinFilter, BuiltinStatus, CategoryService, CategoryStats, DeleteReport, HideReport,
    RenameReport,
};
pub use summary_service::{
    BillFilter, CalendarDay, CalendarMonth, CategoryTotal, ChartPeriod, DueState, MonthlyTotals,
    SummaryService, Totals,
};

pub type ServiceResult<T> = crate::errors::Result<T>;
