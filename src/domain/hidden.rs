use serde::{Deserialize, Serialize};

use super::builtin::is_builtin;

/// Built-in names currently suppressed from selection menus, kept in
/// insertion order. Stored as a plain array; decoding goes through
/// [`HiddenCategories::from_names`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct HiddenCategories(Vec<String>);

impl From<Vec<String>> for HiddenCategories {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names).0
    }
}

impl From<HiddenCategories> for Vec<String> {
    fn from(hidden: HiddenCategories) -> Self {
        hidden.0
    }
}

impl HiddenCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from arbitrary names, dropping duplicates and anything
    /// that is not a built-in. Returns the rejected names alongside.
    pub fn from_names<I, S>(names: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hidden = Self::new();
        let mut rejected = Vec::new();
        for name in names {
            let name = name.into();
            if is_builtin(&name) {
                hidden.insert(&name);
            } else {
                rejected.push(name);
            }
        }
        (hidden, rejected)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|entry| entry == name)
    }

    /// Returns `false` when the name was already present.
    pub(crate) fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|entry| entry != name);
        self.0.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn all_builtin(&self) -> bool {
        self.0.iter().all(|name| is_builtin(name))
    }
}
