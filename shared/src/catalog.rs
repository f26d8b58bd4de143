//! Branch directory and reference-data lists (academic units, departments,
//! modalities).

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// A campus / legal entity a case is filed against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Branch {
    pub legal_entity_code: String,
    pub display_name: String,
    pub establishment_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    pub code: String,
    pub label: String,
}

impl CatalogItem {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into().trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    AcademicUnits,
    Departments,
    Modalities,
}

impl CatalogKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AcademicUnits => "academic_units",
            Self::Departments => "departments",
            Self::Modalities => "modalities",
        }
    }
}

/// Observable state of one remote list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T> LoaderState<T> {
    /// Stale items are dropped before the new request resolves.
    pub fn begin(&mut self) {
        self.items.clear();
        self.error = None;
        self.loading = true;
    }

    pub fn succeed(&mut self, items: Vec<T>) {
        self.items = items;
        self.error = None;
        self.loading = false;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.items.clear();
        self.error = Some(message.into());
        self.loading = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Sort key approximating `localeCompare(.., 'es', { sensitivity: 'base' })`:
/// case and diacritics are ignored, except that `ñ` is its own letter
/// sorting right after `n`.
#[must_use]
pub fn collation_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c == 'ñ' {
            key.push('n');
            key.push('\u{7f}');
            continue;
        }
        key.extend(
            c.to_string()
                .nfd()
                .filter(|d| !unicode_normalization::char::is_combining_mark(*d)),
        );
    }
    key
}

pub fn prepare_branches(raw: Vec<Branch>) -> Vec<Branch> {
    let mut branches: Vec<Branch> = raw
        .into_iter()
        .filter(|b| !b.display_name.trim().is_empty())
        .collect();
    branches.sort_by_cached_key(|b| collation_key(&b.display_name));
    branches
}

pub fn prepare_items(raw: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut items: Vec<CatalogItem> = raw
        .into_iter()
        .filter(|item| !item.label.trim().is_empty())
        .collect();
    items.sort_by_cached_key(|item| collation_key(&item.label));
    items
}
