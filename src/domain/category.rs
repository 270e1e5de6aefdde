//! User-created category records ("cadastros").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, NamedEntity};

pub const DEFAULT_CATEGORY_KIND: &str = "outros";
pub const USER_CREATOR: &str = "usuário";

/// A named bucket for bills. Bills point at it by `name`, so renames cascade
/// by label; `id` is a stable handle for callers that need one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "criadoPor", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self::created_at(name, Utc::now())
    }

    pub fn created_at(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at,
            kind: None,
            created_by: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.created_by = Some(creator.into());
        self
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        match &self.kind {
            Some(kind) => format!("{} ({})", self.name, kind),
            None => self.name.clone(),
        }
    }
}
