use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::{ConfigManager, TrackerConfig};
use crate::core::services::{
    BillEdit, BillService, CategoryService, DeleteReport, HideReport, RenameReport,
};
use crate::domain::{Bill, BillStatus, DomainModel};
use crate::errors::Result;
use crate::persistence::{LoadSource, PersistenceEngine, SaveOutcome};
use crate::storage::FileStore;
use crate::transfer::{self, BackupExport, CategoryExport, ImportSummary};

/// Lifecycle events that force the model to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Periodic timer; only writes when the bill count moved since the last save.
    Autosave,
    /// The front end went to the background.
    Hidden,
    /// Connectivity came back.
    Reconnect,
    /// The process is about to exit.
    Teardown,
}

/// Figures shown next to the backup controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStatus {
    pub total_bills: usize,
    /// Records plus built-ins.
    pub total_categories: usize,
    pub last_saved: Option<DateTime<Utc>>,
}

/// Application root: exclusively owns the domain model and the persistence
/// engine. Every mutator stages its change on a copy of the model and swaps
/// it in only after the save succeeds.
pub struct Tracker {
    model: DomainModel,
    engine: PersistenceEngine,
    config: TrackerConfig,
    load_source: LoadSource,
    load_warnings: Vec<String>,
    first_run: bool,
    last_autosave: DateTime<Utc>,
    last_outcome: Option<SaveOutcome>,
}

impl Tracker {
    pub fn open(engine: PersistenceEngine, config: TrackerConfig) -> Self {
        Self::open_at(engine, config, Utc::now())
    }

    /// Loads the model (primary, backup, then seeds) and records the first
    /// start marker.
    pub fn open_at(engine: PersistenceEngine, config: TrackerConfig, now: DateTime<Utc>) -> Self {
        let engine = engine.with_lite_bill_limit(config.lite_bill_limit);
        let report = engine.load_at(now);
        let mut load_warnings = report.warnings;

        let first_run = engine.is_first_run();
        if first_run {
            if let Err(err) = engine.mark_first_run() {
                warn!(error = %err, "could not record first start");
                load_warnings.push(format!("first start marker not saved: {err}"));
            }
        }
        for warning in &load_warnings {
            warn!(%warning, "load warning");
        }
        info!(
            source = ?report.source,
            bills = report.model.bills.len(),
            categories = report.model.categories.len(),
            "tracker opened"
        );

        Self {
            model: report.model,
            engine,
            config,
            load_source: report.source,
            load_warnings,
            first_run,
            last_autosave: now,
            last_outcome: None,
        }
    }

    /// Opens the directory-backed store described by the manager's config.
    pub fn open_configured(manager: &ConfigManager) -> Result<Self> {
        let config = manager.load()?;
        let store = FileStore::with_quota(manager.store_dir(&config), config.quota_bytes)?;
        let engine = PersistenceEngine::new(Box::new(store));
        Ok(Self::open(engine, config))
    }

    pub fn model(&self) -> &DomainModel {
        &self.model
    }

    pub fn engine(&self) -> &PersistenceEngine {
        &self.engine
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    /// True when this open found no first-start marker.
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn last_outcome(&self) -> Option<&SaveOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn status(&self) -> StorageStatus {
        StorageStatus {
            total_bills: self.model.bills.len(),
            total_categories: self.model.total_categories(),
            last_saved: self.model.last_saved,
        }
    }

    pub fn add_bill(&mut self, bill: Bill) -> Result<usize> {
        self.apply(|model| BillService::add(model, bill))
    }

    pub fn edit_bill(&mut self, index: usize, edit: BillEdit) -> Result<()> {
        self.apply(|model| BillService::edit(model, index, edit))
    }

    pub fn toggle_bill_status(&mut self, index: usize) -> Result<BillStatus> {
        self.apply(|model| BillService::toggle_status(model, index))
    }

    pub fn remove_bill(&mut self, index: usize) -> Result<Bill> {
        self.apply(|model| BillService::remove(model, index))
    }

    pub fn create_category(&mut self, name: &str, kind: Option<&str>) -> Result<usize> {
        self.apply(|model| CategoryService::create(model, name, kind))
    }

    pub fn rename_category(&mut self, index: usize, new_name: &str) -> Result<RenameReport> {
        self.apply(|model| CategoryService::rename(model, index, new_name))
    }

    pub fn delete_category(&mut self, index: usize) -> Result<DeleteReport> {
        self.apply(|model| CategoryService::delete(model, index))
    }

    pub fn hide_category(&mut self, name: &str) -> Result<HideReport> {
        let mut staged = self.model.clone();
        let report = CategoryService::hide(&mut staged, name)?;
        if report.changed {
            self.commit(staged)?;
        }
        Ok(report)
    }

    pub fn show_category(&mut self, name: &str) -> Result<bool> {
        let mut staged = self.model.clone();
        let shown = CategoryService::show(&mut staged, name);
        if shown {
            self.commit(staged)?;
        }
        Ok(shown)
    }

    pub fn remove_builtin(&mut self, name: &str) -> Result<bool> {
        self.apply(|model| CategoryService::remove_builtin(model, name))
    }

    pub fn hide_all_categories(&mut self) -> Result<usize> {
        self.apply(|model| Ok(CategoryService::hide_all(model)))
    }

    pub fn show_all_categories(&mut self) -> Result<usize> {
        self.apply(|model| Ok(CategoryService::show_all(model)))
    }

    pub fn restore_default_categories(&mut self) -> Result<usize> {
        self.apply(|model| Ok(CategoryService::restore_defaults(model)))
    }

    /// Returns the new theme flag.
    pub fn toggle_theme(&mut self) -> Result<bool> {
        let dark_mode = !self.model.dark_mode;
        self.set_dark_mode(dark_mode)?;
        Ok(dark_mode)
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> Result<()> {
        self.apply(|model| {
            model.dark_mode = dark_mode;
            Ok(())
        })
    }

    pub fn export_categories(&self) -> CategoryExport {
        transfer::export_categories(&self.model, Utc::now())
    }

    pub fn import_categories(&mut self, text: &str) -> Result<ImportSummary> {
        self.apply(|model| transfer::import_categories(model, text, Utc::now()))
    }

    pub fn export_backup(&self) -> BackupExport {
        transfer::export_backup(&self.model, Utc::now())
    }

    /// Replaces the whole model with the document's contents and persists it
    /// immediately. The current theme is kept when the document has none.
    /// Returns the import warnings.
    pub fn import_backup(&mut self, text: &str) -> Result<Vec<String>> {
        let imported = transfer::import_backup(text)?;
        let mut staged = imported.model;
        staged.dark_mode = imported.dark_mode.unwrap_or(self.model.dark_mode);
        let bills = staged.bills.len();
        self.commit(staged)?;
        info!(bills, "backup imported");
        Ok(imported.warnings)
    }

    pub fn prune_storage(&self) -> Result<usize> {
        self.engine.prune_non_essential_keys()
    }

    /// Saves now. `Autosave` is skipped when nothing is pending and then
    /// returns `None`.
    pub fn flush(&mut self, trigger: FlushTrigger) -> Result<Option<SaveOutcome>> {
        if trigger == FlushTrigger::Autosave && !self.engine.has_pending_changes(&self.model) {
            debug!("autosave skipped, no pending changes");
            return Ok(None);
        }
        debug!(?trigger, "flushing");
        self.commit(self.model.clone()).map(Some)
    }

    pub fn autosave_due(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.last_autosave).num_seconds();
        u64::try_from(elapsed).map_or(false, |secs| secs >= self.config.autosave_interval_secs)
    }

    /// Runs the autosave if its interval elapsed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<Option<SaveOutcome>> {
        if !self.autosave_due(now) {
            return Ok(None);
        }
        self.last_autosave = now;
        self.flush(FlushTrigger::Autosave)
    }

    /// Runs `op` against a copy of the model and keeps the copy only once it
    /// has been saved.
    fn apply<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut DomainModel) -> Result<T>,
    {
        let mut staged = self.model.clone();
        let value = op(&mut staged)?;
        self.commit(staged)?;
        Ok(value)
    }

    /// Saves `staged` and, on success, makes it the live model. A storage
    /// error leaves the live model untouched.
    fn commit(&mut self, mut staged: DomainModel) -> Result<SaveOutcome> {
        let outcome = self.engine.save(&staged)?;
        match &outcome {
            SaveOutcome::Saved { at, .. } => staged.last_saved = Some(*at),
            SaveOutcome::Degraded { lite_written, .. } => {
                warn!(lite_written, "save degraded to essential data");
            }
        }
        self.model = staged;
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }
}
