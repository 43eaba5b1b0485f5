//! Operator table
//!
//! Maps operator names in logic JSON to [`OperatorKind`]s. A table is
//! immutable once built and is handed to the loader (and the evaluation
//! engine) explicitly, so test suites can work with isolated tables that
//! disable or alias operators without touching process-wide state.

use crate::error::{LogicError, LogicResult};
use crate::operator::{ComparisonOp, OperatorKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static STANDARD: Lazy<OperatorTable> = Lazy::new(OperatorTable::build_standard);

/// Immutable name → operator table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    entries: HashMap<String, OperatorKind>,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl OperatorTable {
    /// The standard table: every operator under its canonical name, plus
    /// `===`/`!==` as strict-equality spellings and `not` for `!`.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Shared reference to the standard table
    pub fn standard_ref() -> &'static OperatorTable {
        &STANDARD
    }

    /// Start from the standard table
    pub fn builder() -> OperatorTableBuilder {
        OperatorTableBuilder {
            entries: STANDARD.entries.clone(),
        }
    }

    /// Start from an empty table
    pub fn empty_builder() -> OperatorTableBuilder {
        OperatorTableBuilder {
            entries: HashMap::new(),
        }
    }

    /// Resolve an operator name
    pub fn resolve(&self, name: &str) -> Option<OperatorKind> {
        self.entries.get(name).copied()
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build_standard() -> Self {
        let mut entries: HashMap<String, OperatorKind> = OperatorKind::all()
            .map(|kind| (kind.canonical_name().to_string(), kind))
            .collect();
        entries.insert("===".to_string(), OperatorKind::Compare(ComparisonOp::Equal));
        entries.insert("!==".to_string(), OperatorKind::Compare(ComparisonOp::NotEqual));
        entries.insert("not".to_string(), OperatorKind::Not);
        Self { entries }
    }
}

/// Builder for custom operator tables
#[derive(Debug, Clone)]
pub struct OperatorTableBuilder {
    entries: HashMap<String, OperatorKind>,
}

impl OperatorTableBuilder {
    /// Register a kind under a name. Fails if the name is taken.
    pub fn register(mut self, name: impl Into<String>, kind: OperatorKind) -> LogicResult<Self> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(LogicError::DuplicateOperator { name });
        }
        self.entries.insert(name, kind);
        Ok(self)
    }

    /// Register `alias` for whatever `target` currently resolves to
    pub fn alias(self, alias: impl Into<String>, target: &str) -> LogicResult<Self> {
        let kind = self
            .entries
            .get(target)
            .copied()
            .ok_or_else(|| LogicError::unknown_operator(target))?;
        self.register(alias, kind)
    }

    /// Remove a name, making logic that uses it fail to load
    pub fn remove(mut self, name: &str) -> Self {
        self.entries.remove(name);
        self
    }

    pub fn build(self) -> OperatorTable {
        OperatorTable {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_resolves_canonical_names() {
        let table = OperatorTable::standard();
        for kind in OperatorKind::all() {
            assert_eq!(table.resolve(kind.canonical_name()), Some(kind));
        }
        assert_eq!(
            table.resolve("==="),
            Some(OperatorKind::Compare(ComparisonOp::Equal))
        );
        assert_eq!(table.resolve("levenshtein"), None);
    }

    #[test]
    fn test_builder_is_isolated_from_standard() {
        let err = OperatorTable::builder()
            .remove("has_medication")
            .alias("on_med", "has_medication")
            .unwrap_err();
        assert_eq!(err, LogicError::unknown_operator("has_medication"));

        let custom = OperatorTable::builder()
            .alias("on_med", "has_medication")
            .unwrap()
            .remove("has_medication")
            .build();
        assert_eq!(custom.resolve("on_med"), Some(OperatorKind::HasMedication));
        assert!(!custom.contains("has_medication"));
        assert!(OperatorTable::standard().contains("has_medication"));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let err = OperatorTable::builder()
            .register("between", OperatorKind::AgeBetween)
            .unwrap_err();
        assert_eq!(
            err,
            LogicError::DuplicateOperator {
                name: "between".to_string()
            }
        );
    }

    #[test]
    fn test_empty_builder() {
        let table = OperatorTable::empty_builder()
            .register("gt", OperatorKind::Compare(ComparisonOp::Greater))
            .unwrap()
            .build();
        assert_eq!(table.len(), 1);
        assert_eq!(table.names(), vec!["gt"]);
    }
}
