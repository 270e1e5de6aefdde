//! Dual-representation persistence: a full primary snapshot plus a compact
//! backup mirror, with a reduced "lite" snapshot as the last resort when the
//! store runs out of space.

pub mod keys;
pub mod snapshot;

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::DEFAULT_LITE_BILL_LIMIT,
    domain::{builtin_name, is_builtin, DomainModel, HiddenCategories},
    errors::{Result, TrackerError},
    storage::{KeyValueStore, StorageError},
};

use keys::*;
use snapshot::{CompactBackup, LiteSnapshot, PrimarySnapshot};

/// Which representation a load was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    Defaults,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub model: DomainModel,
    pub source: LoadSource,
    /// True when the load rewrote the primary key from another source.
    pub healed: bool,
    pub warnings: Vec<String>,
}

/// Result of a save that did not hit a hard storage error.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved {
        at: DateTime<Utc>,
        bills: usize,
    },
    /// The full write hit the quota; non-essential keys were pruned and a
    /// reduced snapshot was attempted under the lite key.
    Degraded {
        lite_written: bool,
        bills_kept: usize,
        pruned: usize,
    },
}

impl SaveOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SaveOutcome::Degraded { .. })
    }
}

/// Sole owner of the durable store.
pub struct PersistenceEngine {
    store: Box<dyn KeyValueStore>,
    lite_bill_limit: usize,
}

impl PersistenceEngine {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lite_bill_limit: DEFAULT_LITE_BILL_LIMIT,
        }
    }

    pub fn with_lite_bill_limit(mut self, limit: usize) -> Self {
        self.lite_bill_limit = limit;
        self
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn load(&self) -> LoadReport {
        self.load_at(Utc::now())
    }

    /// Primary first, then the compact backup (re-saving the primary on
    /// success), then seed defaults. Never fails: unreadable sources are
    /// reported as warnings and skipped.
    pub fn load_at(&self, now: DateTime<Utc>) -> LoadReport {
        let mut warnings = Vec::new();
        let initial_hidden = self.read_hidden_key(&mut warnings);

        let (mut model, source) = if let Some(model) =
            self.read_primary(&initial_hidden, &mut warnings)
        {
            info!(bills = model.bills.len(), "loaded primary snapshot");
            (model, LoadSource::Primary)
        } else if let Some(model) = self.read_backup(&initial_hidden, &mut warnings) {
            info!(bills = model.bills.len(), "restored from compact backup");
            (model, LoadSource::Backup)
        } else {
            info!("no usable snapshot, creating seed data");
            (DomainModel::seeded(now.date_naive(), now), LoadSource::Defaults)
        };

        match self.read_theme_key() {
            Ok(Some(dark_mode)) => model.dark_mode = dark_mode,
            Ok(None) => {}
            Err(err) => warnings.push(format!("theme flag unreadable: {err}")),
        }
        if model.last_saved.is_none() {
            model.last_saved = self.last_saved_at();
        }

        let mut healed = false;
        if source != LoadSource::Primary {
            match self.save_at(&model, now) {
                Ok(SaveOutcome::Saved { at, .. }) => {
                    model.last_saved = Some(at);
                    healed = true;
                    if source == LoadSource::Backup {
                        info!("primary snapshot rebuilt from backup");
                    }
                }
                Ok(outcome) => {
                    warn!(?outcome, "re-saving loaded data was degraded");
                    warnings.push("loaded data could only be saved in reduced form".into());
                }
                Err(err) => {
                    warn!(error = %err, "re-saving loaded data failed");
                    warnings.push(format!("loaded data could not be re-saved: {err}"));
                }
            }
        }

        warnings.extend(model_warnings(&model));
        LoadReport {
            model,
            source,
            healed,
            warnings,
        }
    }

    pub fn save(&self, model: &DomainModel) -> Result<SaveOutcome> {
        self.save_at(model, Utc::now())
    }

    /// Writes primary, backup, hidden set, theme flag, timestamp and the
    /// bill-count checkpoint, in that order. A quota failure at any step
    /// degrades to the lite snapshot instead of failing. If the primary was
    /// written before a later step failed, it stays valid on its own.
    pub fn save_at(&self, model: &DomainModel, now: DateTime<Utc>) -> Result<SaveOutcome> {
        match self.write_full(model, now) {
            Ok(()) => {
                debug!(bills = model.bills.len(), "saved snapshot and backup");
                Ok(SaveOutcome::Saved {
                    at: now,
                    bills: model.bills.len(),
                })
            }
            Err(TrackerError::Storage(err)) if err.is_quota() => {
                warn!(error = %err, "storage quota exceeded, saving essentials only");
                self.save_degraded(model)
            }
            Err(err) => Err(err),
        }
    }

    /// True when the bill count differs from the count checkpointed at the
    /// last successful save. In-place edits are not detected.
    pub fn has_pending_changes(&self, model: &DomainModel) -> bool {
        let checkpoint = self
            .store
            .get(BILL_COUNT_KEY)
            .ok()
            .flatten()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(0);
        model.bills.len() != checkpoint
    }

    /// Deletes every key outside the essential allow-list. Returns how many
    /// keys were removed.
    pub fn prune_non_essential_keys(&self) -> Result<usize> {
        let mut removed = 0;
        for key in self.store.keys()? {
            if is_essential(&key) {
                continue;
            }
            self.store.remove(&key)?;
            removed += 1;
        }
        info!(removed, "pruned non-essential storage keys");
        Ok(removed)
    }

    pub fn is_first_run(&self) -> bool {
        !self.store.contains(FIRST_RUN_KEY).unwrap_or(false)
    }

    pub fn mark_first_run(&self) -> Result<()> {
        self.store.set(FIRST_RUN_KEY, "true")?;
        Ok(())
    }

    /// Time of the last successful full save, from the timestamp key.
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get(LAST_UPDATE_KEY).ok().flatten()?;
        let millis = raw.trim().parse::<i64>().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    fn write_full(&self, model: &DomainModel, now: DateTime<Utc>) -> Result<()> {
        // Encode before the first write.
        let primary = to_json(&PrimarySnapshot::from_model(model, now))?;
        let backup = to_json(&CompactBackup::from_model(model, now))?;
        let hidden = to_json(&model.hidden)?;

        self.store.set(PRIMARY_KEY, &primary)?;
        self.store.set(BACKUP_KEY, &backup)?;
        self.store.set(HIDDEN_KEY, &hidden)?;
        self.store
            .set(THEME_KEY, if model.dark_mode { "true" } else { "false" })?;
        self.store
            .set(LAST_UPDATE_KEY, &now.timestamp_millis().to_string())?;
        self.store
            .set(BILL_COUNT_KEY, &model.bills.len().to_string())?;
        Ok(())
    }

    fn save_degraded(&self, model: &DomainModel) -> Result<SaveOutcome> {
        let pruned = self.prune_non_essential_keys()?;
        let lite = LiteSnapshot::from_model(model, self.lite_bill_limit);
        let bills_kept = lite.bills.len();
        let encoded = to_json(&lite)?;
        let lite_written = match self.store.set(LITE_KEY, &encoded) {
            Ok(()) => {
                info!(bills_kept, "essential data saved under lite key");
                true
            }
            Err(err) if err.is_quota() => {
                warn!(error = %err, "lite snapshot did not fit either");
                false
            }
            Err(err) => return Err(err.into()),
        };
        Ok(SaveOutcome::Degraded {
            lite_written,
            bills_kept,
            pruned,
        })
    }

    fn read_hidden_key(&self, warnings: &mut Vec<String>) -> HiddenCategories {
        let raw = match self.store.get(HIDDEN_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HiddenCategories::new(),
            Err(err) => {
                warnings.push(format!("hidden categories unreadable: {err}"));
                return HiddenCategories::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(names) => sanitize_hidden(names, warnings),
            Err(err) => {
                warnings.push(format!("hidden categories malformed: {err}"));
                HiddenCategories::new()
            }
        }
    }

    fn read_primary(
        &self,
        initial_hidden: &HiddenCategories,
        warnings: &mut Vec<String>,
    ) -> Option<DomainModel> {
        let raw = self.read_raw(PRIMARY_KEY, warnings)?;
        let snapshot = match serde_json::from_str::<PrimarySnapshot>(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "primary snapshot unreadable");
                warnings.push(format!("primary snapshot unreadable: {err}"));
                return None;
            }
        };
        if let Some(version) = snapshot.version.as_deref() {
            if version != FORMAT_VERSION {
                warnings.push(format!(
                    "primary snapshot has format version {version}, expected {FORMAT_VERSION}"
                ));
            }
        }
        let hidden = match snapshot.hidden {
            Some(names) => sanitize_hidden(names, warnings),
            None => initial_hidden.clone(),
        };
        let mut model = DomainModel::from_parts(
            snapshot.bills,
            snapshot.categories,
            hidden,
            snapshot.dark_mode,
        );
        model.last_saved = snapshot.saved_at;
        Some(model)
    }

    fn read_backup(
        &self,
        initial_hidden: &HiddenCategories,
        warnings: &mut Vec<String>,
    ) -> Option<DomainModel> {
        let raw = self.read_raw(BACKUP_KEY, warnings)?;
        let backup = match serde_json::from_str::<CompactBackup>(&raw) {
            Ok(backup) => backup,
            Err(err) => {
                warn!(error = %err, "compact backup unreadable");
                warnings.push(format!("compact backup unreadable: {err}"));
                return None;
            }
        };
        let hidden = match backup.ocultas {
            Some(names) => sanitize_hidden(names, warnings),
            None => initial_hidden.clone(),
        };
        let bills = backup.c.into_iter().map(Into::into).collect();
        Some(DomainModel::from_parts(bills, backup.cad, hidden, false))
    }

    fn read_raw(&self, key: &str, warnings: &mut Vec<String>) -> Option<String> {
        match self.store.get(key) {
            Ok(raw) => raw,
            Err(err) => {
                warnings.push(format!("`{key}` unreadable: {err}"));
                None
            }
        }
    }

    fn read_theme_key(&self) -> std::result::Result<Option<bool>, StorageError> {
        Ok(self
            .store
            .get(THEME_KEY)?
            .map(|raw| raw.trim() == "true"))
    }
}

fn sanitize_hidden(names: Vec<String>, warnings: &mut Vec<String>) -> HiddenCategories {
    let (hidden, rejected) = HiddenCategories::from_names(names);
    for name in rejected {
        warnings.push(format!("ignored hidden entry `{name}`: not a built-in category"));
    }
    hidden
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| TrackerError::Encode(err.to_string()))
}

/// Flags anomalies the loader tolerates but a user may want to know about.
pub fn model_warnings(model: &DomainModel) -> Vec<String> {
    let mut warnings = Vec::new();

    for (idx, bill) in model.bills.iter().enumerate() {
        if !(bill.amount > 0.0 && bill.amount.is_finite()) {
            warnings.push(format!("bill {} has non-positive amount {}", idx, bill.amount));
        }
    }

    let mut seen = HashSet::new();
    for category in &model.categories {
        if !seen.insert(category.name.trim().to_lowercase()) {
            warnings.push(format!("duplicate category record `{}`", category.name));
        }
        if builtin_name(&category.name).is_some() {
            warnings.push(format!(
                "category record `{}` shadows a built-in category",
                category.name
            ));
        }
    }

    let mut orphaned: Vec<&str> = model
        .bills
        .iter()
        .map(|bill| bill.category.as_str())
        .filter(|label| !is_builtin(label) && model.category_index(label).is_none())
        .collect();
    orphaned.sort_unstable();
    orphaned.dedup();
    for label in orphaned {
        warnings.push(format!("bills reference unknown category `{label}`"));
    }

    warnings
}
