//! Category lifecycle: records are created, renamed and deleted; built-ins
//! are only hidden and shown. Every check runs before the model is touched.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{
    builtin_name, category::DEFAULT_CATEGORY_KIND, category::USER_CREATOR, is_builtin, Category,
    DomainModel, NamedEntity, BUILTIN_CATEGORIES,
};
use crate::errors::TrackerError;

use super::ServiceResult;

const MIN_NAME_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameReport {
    pub old_name: String,
    pub new_name: String,
    /// Bills whose label was rewritten to the new name.
    pub cascaded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub name: String,
    pub categories_removed: usize,
    pub bills_removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideReport {
    pub changed: bool,
    /// Bills that keep pointing at the hidden name.
    pub bills_referencing: usize,
}

/// Filters for the built-in overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinFilter {
    #[default]
    All,
    Active,
    Hidden,
    InUse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinStatus {
    pub name: &'static str,
    pub hidden: bool,
    pub bills: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStats {
    /// Records plus built-ins.
    pub total: usize,
    pub visible_builtins: usize,
    pub hidden_builtins: usize,
    pub builtins_in_use: usize,
}

pub struct CategoryService;

impl CategoryService {
    /// Appends a user category and returns its index.
    pub fn create(model: &mut DomainModel, name: &str, kind: Option<&str>) -> ServiceResult<usize> {
        Self::create_at(model, name, kind, Utc::now())
    }

    pub fn create_at(
        model: &mut DomainModel,
        name: &str,
        kind: Option<&str>,
        now: DateTime<Utc>,
    ) -> ServiceResult<usize> {
        let name = Self::validate_name(model, None, name)?;
        let kind = kind
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_KIND);
        let category = Category::created_at(name, now)
            .with_kind(kind)
            .with_creator(USER_CREATOR);
        info!(name = %category.name, "category created");
        model.categories.push(category);
        Ok(model.categories.len() - 1)
    }

    /// Renames a record and rewrites every bill labelled with the old name.
    pub fn rename(
        model: &mut DomainModel,
        index: usize,
        new_name: &str,
    ) -> ServiceResult<RenameReport> {
        if index >= model.categories.len() {
            return Err(TrackerError::CategoryNotFound(index));
        }
        let new_name = Self::validate_name(model, Some(index), new_name)?;
        let old_name = std::mem::replace(&mut model.categories[index].name, new_name.clone());

        let mut cascaded = 0;
        for bill in model.bills.iter_mut().filter(|bill| bill.category == old_name) {
            bill.category = new_name.clone();
            cascaded += 1;
        }
        info!(%old_name, %new_name, cascaded, "category renamed");
        Ok(RenameReport {
            old_name,
            new_name,
            cascaded,
        })
    }

    /// Hides a built-in from menus. Bills keep their labels.
    pub fn hide(model: &mut DomainModel, name: &str) -> ServiceResult<HideReport> {
        Self::require_builtin(name)?;
        let changed = model.hidden.insert(name);
        Ok(HideReport {
            changed,
            bills_referencing: model.bills_referencing(name),
        })
    }

    /// Returns whether the name was hidden.
    pub fn show(model: &mut DomainModel, name: &str) -> bool {
        model.hidden.remove(name)
    }

    /// Removes a record together with every bill that references it.
    pub fn delete(model: &mut DomainModel, index: usize) -> ServiceResult<DeleteReport> {
        if index >= model.categories.len() {
            return Err(TrackerError::CategoryNotFound(index));
        }
        let category = model.categories.remove(index);
        let before = model.bills.len();
        model.bills.retain(|bill| bill.category != category.name);
        let bills_removed = before - model.bills.len();
        info!(name = %category.name, bills_removed, "category deleted");
        Ok(DeleteReport {
            name: category.name,
            categories_removed: 1,
            bills_removed,
        })
    }

    /// "Permanent" removal of a built-in: allowed only while no bill uses it,
    /// and then only clears the name from the hidden set. Returns whether it
    /// was hidden.
    pub fn remove_builtin(model: &mut DomainModel, name: &str) -> ServiceResult<bool> {
        Self::require_builtin(name)?;
        let bills = model.bills_referencing(name);
        if bills > 0 {
            return Err(TrackerError::InUse {
                name: name.to_string(),
                bills,
            });
        }
        Ok(model.hidden.remove(name))
    }

    /// Returns how many built-ins became hidden.
    pub fn hide_all(model: &mut DomainModel) -> usize {
        BUILTIN_CATEGORIES
            .iter()
            .filter(|name| model.hidden.insert(name))
            .count()
    }

    /// Returns how many built-ins became visible.
    pub fn show_all(model: &mut DomainModel) -> usize {
        let shown = model.hidden.len();
        model.hidden.clear();
        shown
    }

    /// Same as [`CategoryService::show_all`]; category records are untouched.
    pub fn restore_defaults(model: &mut DomainModel) -> usize {
        Self::show_all(model)
    }

    /// Names offered in selection menus: visible built-ins, then records.
    pub fn menu_categories(model: &DomainModel) -> Vec<&str> {
        BUILTIN_CATEGORIES
            .iter()
            .copied()
            .filter(|name| !model.is_hidden(name))
            .chain(model.categories.iter().map(|category| category.name.as_str()))
            .collect()
    }

    pub fn builtin_overview(model: &DomainModel, filter: BuiltinFilter) -> Vec<BuiltinStatus> {
        BUILTIN_CATEGORIES
            .iter()
            .map(|&name| BuiltinStatus {
                name,
                hidden: model.is_hidden(name),
                bills: model.bills_referencing(name),
            })
            .filter(|status| match filter {
                BuiltinFilter::All => true,
                BuiltinFilter::Active => !status.hidden,
                BuiltinFilter::Hidden => status.hidden,
                BuiltinFilter::InUse => status.bills > 0,
            })
            .collect()
    }

    pub fn stats(model: &DomainModel) -> CategoryStats {
        let overview = Self::builtin_overview(model, BuiltinFilter::All);
        CategoryStats {
            total: model.total_categories(),
            visible_builtins: overview.iter().filter(|status| !status.hidden).count(),
            hidden_builtins: model.hidden.len(),
            builtins_in_use: overview.iter().filter(|status| status.bills > 0).count(),
        }
    }

    /// Records paired with the number of bills using each.
    pub fn usage(model: &DomainModel) -> Vec<(&Category, usize)> {
        model
            .categories
            .iter()
            .map(|category| (category, model.bills_referencing(&category.name)))
            .collect()
    }

    /// Trims and checks a candidate name, ignoring the record at `exclude`.
    fn validate_name(
        model: &DomainModel,
        exclude: Option<usize>,
        candidate: &str,
    ) -> ServiceResult<String> {
        let trimmed = candidate.trim();
        if trimmed.chars().count() < MIN_NAME_CHARS {
            return Err(TrackerError::InvalidName(trimmed.to_string()));
        }
        let duplicate = model
            .categories
            .iter()
            .enumerate()
            .any(|(idx, category)| Some(idx) != exclude && category.name_matches(trimmed));
        if duplicate {
            return Err(TrackerError::DuplicateName(trimmed.to_string()));
        }
        if let Some(builtin) = builtin_name(trimmed) {
            return Err(TrackerError::ReservedName(builtin.to_string()));
        }
        Ok(trimmed.to_string())
    }

    fn require_builtin(name: &str) -> ServiceResult<()> {
        if is_builtin(name) {
            Ok(())
        } else {
            Err(TrackerError::UnknownBuiltin(name.to_string()))
        }
    }
}
