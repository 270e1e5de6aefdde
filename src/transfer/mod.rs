//! JSON documents exchanged with the outside world: a category export and a
//! full backup. Both parse in two steps so that text which is not JSON at all
//! (`ParseFailure`) is told apart from JSON of the wrong shape
//! (`InvalidFormat`).

pub mod files;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::core::services::BillService;
use crate::domain::{
    builtin_name, category::DEFAULT_CATEGORY_KIND, Bill, Category, DomainModel, HiddenCategories,
};
use crate::errors::{Result, TrackerError};

pub use files::{
    default_backup_file_name, default_category_file_name, read_document, write_document,
};

pub const BACKUP_NOTICE: &str = "⚠ NÃO MARQUE \"Cookies e dados de sites\" AO LIMPAR HISTÓRICO";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryExport {
    #[serde(rename = "categorias")]
    pub categories: Vec<Category>,
    #[serde(rename = "categoriasOcultas")]
    pub hidden: HiddenCategories,
    #[serde(rename = "dataExportacao")]
    pub exported_at: DateTime<Utc>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupExport {
    #[serde(rename = "contas")]
    pub bills: Vec<Bill>,
    #[serde(rename = "cadastros")]
    pub categories: Vec<Category>,
    #[serde(rename = "categoriasOcultas")]
    pub hidden: HiddenCategories,
    #[serde(rename = "temaEscuro")]
    pub dark_mode: bool,
    #[serde(rename = "dataExportacao")]
    pub exported_at: DateTime<Utc>,
    #[serde(rename = "totalContas")]
    pub total_bills: usize,
    /// Records plus built-ins.
    #[serde(rename = "totalCategorias")]
    pub total_categories: usize,
    #[serde(rename = "aviso")]
    pub notice: String,
}

/// What a category import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Incoming names that collided with a record or a built-in, or were too short.
    pub skipped: Vec<String>,
    pub hidden_replaced: bool,
    pub warnings: Vec<String>,
}

/// A parsed backup, ready to replace the live model.
#[derive(Debug, Clone)]
pub struct BackupImport {
    pub model: DomainModel,
    /// `None` when the document carries no theme flag.
    pub dark_mode: Option<bool>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IncomingCategories {
    categorias: Vec<IncomingCategory>,
    #[serde(rename = "categoriasOcultas", default)]
    hidden: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct IncomingCategory {
    nome: String,
    #[serde(rename = "dataCriacao", default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(rename = "tipo", default)]
    kind: Option<String>,
    #[serde(rename = "criadoPor", default)]
    created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncomingBackup {
    #[serde(alias = "bills")]
    contas: Vec<Bill>,
    #[serde(default)]
    cadastros: Vec<Category>,
    #[serde(rename = "categoriasOcultas", default)]
    hidden: Option<Vec<String>>,
    #[serde(rename = "temaEscuro", default)]
    dark_mode: Option<bool>,
}

pub fn export_categories(model: &DomainModel, now: DateTime<Utc>) -> CategoryExport {
    CategoryExport {
        categories: model.categories.clone(),
        hidden: model.hidden.clone(),
        exported_at: now,
        total: model.categories.len(),
    }
}

/// Merges the categories of an export document into `model`. Nothing is
/// changed unless the whole document parses.
pub fn import_categories(
    model: &mut DomainModel,
    text: &str,
    now: DateTime<Utc>,
) -> Result<ImportSummary> {
    let incoming: IncomingCategories = parse_document(text, &["categorias"])?;
    let mut summary = ImportSummary::default();

    for category in incoming.categorias {
        let name = category.nome.trim();
        let collides = name.chars().count() < 2
            || model.category_index(name).is_some()
            || builtin_name(name).is_some();
        if collides {
            summary.skipped.push(category.nome);
            continue;
        }
        let kind = category
            .kind
            .filter(|kind| !kind.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY_KIND.to_string());
        let mut record =
            Category::created_at(name, category.created_at.unwrap_or(now)).with_kind(kind);
        record.created_by = category.created_by;
        model.categories.push(record);
        summary.imported += 1;
    }

    if let Some(names) = incoming.hidden {
        let (hidden, rejected) = HiddenCategories::from_names(names);
        summary
            .warnings
            .extend(rejected.into_iter().map(not_builtin_warning));
        model.hidden = hidden;
        summary.hidden_replaced = true;
    }

    info!(
        imported = summary.imported,
        skipped = summary.skipped.len(),
        "categories imported"
    );
    Ok(summary)
}

pub fn export_backup(model: &DomainModel, now: DateTime<Utc>) -> BackupExport {
    BackupExport {
        bills: model.bills.clone(),
        categories: model.categories.clone(),
        hidden: model.hidden.clone(),
        dark_mode: model.dark_mode,
        exported_at: now,
        total_bills: model.bills.len(),
        total_categories: model.total_categories(),
        notice: BACKUP_NOTICE.to_string(),
    }
}

/// Parses a backup document into a fresh model. Any invalid bill rejects the
/// document; duplicate or reserved category records are dropped with a
/// warning.
pub fn import_backup(text: &str) -> Result<BackupImport> {
    let incoming: IncomingBackup = parse_document(text, &["contas", "bills"])?;
    let mut warnings = Vec::new();

    for (idx, bill) in incoming.contas.iter().enumerate() {
        BillService::validate(bill)
            .map_err(|err| TrackerError::InvalidFormat(format!("bill {idx}: {err}")))?;
    }

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(incoming.cadastros.len());
    for category in incoming.cadastros {
        if let Some(builtin) = builtin_name(&category.name) {
            warnings.push(format!(
                "dropped category `{}`: collides with built-in `{builtin}`",
                category.name
            ));
        } else if !seen.insert(category.name.trim().to_lowercase()) {
            warnings.push(format!("dropped duplicate category `{}`", category.name));
        } else {
            categories.push(category);
        }
    }

    let (hidden, rejected) = HiddenCategories::from_names(incoming.hidden.unwrap_or_default());
    warnings.extend(rejected.into_iter().map(not_builtin_warning));

    let model = DomainModel::from_parts(
        incoming.contas,
        categories,
        hidden,
        incoming.dark_mode.unwrap_or(false),
    );
    info!(bills = model.bills.len(), "backup document parsed");
    Ok(BackupImport {
        model,
        dark_mode: incoming.dark_mode,
        warnings,
    })
}

/// Parses `text` as JSON, requires one of `required` to be present on the
/// top-level object, then deserializes into `T`.
fn parse_document<T: DeserializeOwned>(text: &str, required: &[&str]) -> Result<T> {
    let value: Value = serde_json::from_str(text)?;
    let object = value
        .as_object()
        .ok_or_else(|| TrackerError::InvalidFormat("document is not a JSON object".into()))?;
    if !required.iter().any(|field| object.contains_key(*field)) {
        return Err(TrackerError::InvalidFormat(format!(
            "missing `{}` field",
            required[0]
        )));
    }
    serde_json::from_value(value).map_err(|err| TrackerError::InvalidFormat(err.to_string()))
}

fn not_builtin_warning(name: String) -> String {
    format!("ignored hidden entry `{name}`: not a built-in category")
}
