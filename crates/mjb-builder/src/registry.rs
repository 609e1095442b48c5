//! Entries and modifications synthesized during one build.
//!
//! The ruleset database is shared and read-only. Everything the builder
//! learns while traversing (enumerator entries, numeric template constants,
//! primitive aliases, private enums, re-signed template modifications) goes
//! here and is consulted after the database.

use std::collections::HashMap;
use std::sync::Arc;

use mjb_typesystem::{EntryKind, FunctionModification, TypeEntry};

#[derive(Debug, Default)]
pub struct ScratchRegistry {
    entries: HashMap<String, Vec<Arc<TypeEntry>>>,
    function_modifications: HashMap<String, Vec<FunctionModification>>,
}

impl ScratchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: TypeEntry) -> Arc<TypeEntry> {
        let entry = Arc::new(entry);
        self.entries
            .entry(entry.name().to_string())
            .or_default()
            .push(Arc::clone(&entry));
        entry
    }

    #[must_use]
    pub fn find_types(&self, name: &str) -> Vec<Arc<TypeEntry>> {
        self.entries.get(name).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.entries.get(name).and_then(|v| v.first()).cloned()
    }

    /// The entry standing for a numeric non-type template argument,
    /// created on first use.
    pub fn constant_value(&mut self, value: &str) -> Arc<TypeEntry> {
        if let Some(existing) = self
            .entries
            .get(value)
            .and_then(|v| v.iter().find(|e| e.is_constant_value()))
        {
            return Arc::clone(existing);
        }
        self.add_entry(TypeEntry::new(value, EntryKind::ConstantValue))
    }

    pub fn add_function_modifications(
        &mut self,
        class_name: &str,
        modifications: impl IntoIterator<Item = FunctionModification>,
    ) {
        self.function_modifications
            .entry(class_name.to_string())
            .or_default()
            .extend(modifications);
    }

    #[must_use]
    pub fn function_modifications_for(
        &self,
        class_name: &str,
        signatures: &[String],
    ) -> Vec<FunctionModification> {
        self.function_modifications
            .get(class_name)
            .map(|mods| {
                mods.iter()
                    .filter(|m| signatures.iter().any(|s| m.matches(s)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
