pub mod bill;
pub mod builtin;
pub mod category;
pub mod common;
pub mod hidden;
pub mod model;

pub use bill::{Bill, BillStatus};
pub use builtin::{builtin_name, is_builtin, BUILTIN_CATEGORIES};
pub use category::Category;
pub use common::{names_match, Displayable, NamedEntity};
pub use hidden::HiddenCategories;
pub use model::DomainModel;
