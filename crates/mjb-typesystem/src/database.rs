//! The read-only ruleset handle queried by the builder.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entry::{CPP_PRIMITIVES, EntryKind, EntryType, TypeEntry};
use crate::modification::{AddedFunction, FunctionModification};
use crate::rejection::{RejectionMatch, TypeRejection};

/// Name-indexed directory of type entries plus the global rules.
///
/// Built once (from a [`crate::RulesetDocument`] or programmatically), then
/// shared read-only. Several entries may carry the same name; lookups that
/// return lists preserve declaration order.
#[derive(Debug, Clone)]
pub struct TypeDatabase {
    entries: Vec<Arc<TypeEntry>>,
    by_name: HashMap<String, Vec<usize>>,
    rejections: Vec<TypeRejection>,
    global_function_modifications: Vec<FunctionModification>,
    global_added_functions: Vec<Arc<AddedFunction>>,
}

impl Default for TypeDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDatabase {
    /// A database knowing only `void`, varargs and the C++ builtin types.
    #[must_use]
    pub fn new() -> Self {
        let mut db = Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            rejections: Vec::new(),
            global_function_modifications: Vec::new(),
            global_added_functions: Vec::new(),
        };
        db.push(TypeEntry::void());
        db.push(Arc::new(TypeEntry::new("...", EntryKind::Varargs)));
        for name in CPP_PRIMITIVES {
            db.push(Arc::new(TypeEntry::builtin_primitive(*name)));
        }
        db
    }

    fn push(&mut self, entry: Arc<TypeEntry>) {
        self.by_name
            .entry(entry.name().to_string())
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    /// Register an entry. A declared primitive replaces the builtin of the
    /// same name.
    pub fn add_entry(&mut self, entry: TypeEntry) -> Arc<TypeEntry> {
        let entry = Arc::new(entry);
        if entry.is_primitive() {
            if let Some(slot) = self
                .by_name
                .get(entry.name())
                .and_then(|indices| indices.iter().find(|&&i| self.entries[i].is_builtin()))
                .copied()
            {
                self.entries[slot] = Arc::clone(&entry);
                return entry;
            }
        }
        self.push(Arc::clone(&entry));
        entry
    }

    pub fn add_rejection(&mut self, rejection: TypeRejection) {
        self.rejections.push(rejection);
    }

    pub fn add_global_function_modification(&mut self, modification: FunctionModification) {
        self.global_function_modifications.push(modification);
    }

    pub fn add_global_added_function(&mut self, function: AddedFunction) {
        self.global_added_functions.push(Arc::new(function));
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<TypeEntry>> {
        self.entries.iter()
    }

    /// All entries named `name`.
    #[must_use]
    pub fn find_types(&self, name: &str) -> Vec<Arc<TypeEntry>> {
        self.by_name
            .get(name)
            .map(|indices| indices.iter().map(|&i| Arc::clone(&self.entries[i])).collect())
            .unwrap_or_default()
    }

    fn find_first(&self, name: &str, pred: impl Fn(&TypeEntry) -> bool) -> Option<Arc<TypeEntry>> {
        self.by_name.get(name).and_then(|indices| {
            indices
                .iter()
                .map(|&i| &self.entries[i])
                .find(|e| pred(e))
                .cloned()
        })
    }

    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_first(name, |_| true)
    }

    /// Entries usable as C++ types (no namespaces, no function entries).
    #[must_use]
    pub fn find_cpp_types(&self, name: &str) -> Vec<Arc<TypeEntry>> {
        self.find_types(name)
            .into_iter()
            .filter(|e| !matches!(e.entry_type(), EntryType::Namespace | EntryType::Function))
            .collect()
    }

    #[must_use]
    pub fn find_complex_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_first(name, TypeEntry::is_complex)
    }

    #[must_use]
    pub fn find_primitive_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_first(name, TypeEntry::is_primitive)
    }

    #[must_use]
    pub fn find_enum_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_first(name, TypeEntry::is_enum)
    }

    #[must_use]
    pub fn find_function_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_first(name, TypeEntry::is_function)
    }

    #[must_use]
    pub fn find_namespace_types(&self, name: &str) -> Vec<Arc<TypeEntry>> {
        self.find_types(name)
            .into_iter()
            .filter(|e| e.is_namespace())
            .collect()
    }

    /// Flags entries are indexed both by their own name and by the
    /// template spelling they stand for (`QFlags<NS::Color>`).
    #[must_use]
    pub fn find_flags_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.entries
            .iter()
            .find(|e| match e.kind() {
                EntryKind::Flags { original_name, .. } => e.name() == name || original_name == name,
                _ => false,
            })
            .cloned()
    }

    /// Container lookup by qualified or bare template name.
    #[must_use]
    pub fn find_container_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.entries
            .iter()
            .find(|e| e.is_container() && (e.name() == name || e.entry_name() == name))
            .cloned()
    }

    #[must_use]
    pub fn smart_pointer_types(&self) -> Vec<Arc<TypeEntry>> {
        self.entries
            .iter()
            .filter(|e| e.is_smart_pointer())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn typedef_types(&self) -> Vec<Arc<TypeEntry>> {
        self.entries
            .iter()
            .filter(|e| e.is_typedef())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn global_function_modifications(&self, signatures: &[String]) -> Vec<FunctionModification> {
        self.global_function_modifications
            .iter()
            .filter(|m| signatures.iter().any(|s| m.matches(s)))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn global_added_functions(&self) -> &[Arc<AddedFunction>] {
        &self.global_added_functions
    }

    fn rejection(&self, match_type: RejectionMatch, class_name: &str, member: &str) -> Option<String> {
        self.rejections
            .iter()
            .find(|r| r.rejects(match_type, class_name, member))
            .map(TypeRejection::describe)
    }

    /// Reason text when the class is rejected.
    #[must_use]
    pub fn is_class_rejected(&self, class_name: &str) -> Option<String> {
        self.rejection(RejectionMatch::Class, class_name, "")
    }

    /// Checked once with the bare name and once with the minimal signature.
    #[must_use]
    pub fn is_function_rejected(&self, class_name: &str, name_or_signature: &str) -> Option<String> {
        self.rejection(RejectionMatch::Function, class_name, name_or_signature)
    }

    #[must_use]
    pub fn is_field_rejected(&self, class_name: &str, field_name: &str) -> Option<String> {
        self.rejection(RejectionMatch::Field, class_name, field_name)
    }

    #[must_use]
    pub fn is_enum_rejected(&self, class_name: &str, enum_name: &str) -> Option<String> {
        self.rejection(RejectionMatch::Enum, class_name, enum_name)
    }

    #[must_use]
    pub fn is_argument_type_rejected(&self, class_name: &str, type_name: &str) -> Option<String> {
        self.rejection(RejectionMatch::ArgumentType, class_name, type_name)
    }

    #[must_use]
    pub fn is_return_type_rejected(&self, class_name: &str, type_name: &str) -> Option<String> {
        self.rejection(RejectionMatch::ReturnType, class_name, type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ComplexData, SmartPointerSpec};
    use crate::rejection::compile_pattern;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_present_and_replaceable() {
        let mut db = TypeDatabase::new();
        assert!(db.find_primitive_type("int").is_some_and(|e| e.is_builtin()));
        db.add_entry(TypeEntry::primitive("int"));
        let ints = db.find_types("int");
        assert_eq!(ints.len(), 1);
        assert!(!ints[0].is_builtin());
    }

    #[test]
    fn same_name_entries_are_all_returned() {
        let mut db = TypeDatabase::new();
        db.add_entry(TypeEntry::primitive("Foo"));
        db.add_entry(TypeEntry::new(
            "Foo",
            EntryKind::SmartPointer {
                spec: SmartPointerSpec::default(),
                complex: ComplexData::default(),
            },
        ));
        let kinds: Vec<EntryType> = db.find_cpp_types("Foo").iter().map(|e| e.entry_type()).collect();
        assert_eq!(kinds, vec![EntryType::Primitive, EntryType::SmartPointer]);
    }

    #[test]
    fn namespaces_are_not_cpp_types() {
        let mut db = TypeDatabase::new();
        db.add_entry(TypeEntry::new(
            "NS",
            EntryKind::Namespace {
                extends: None,
                complex: ComplexData::default(),
            },
        ));
        assert!(db.find_cpp_types("NS").is_empty());
        assert_eq!(db.find_namespace_types("NS").len(), 1);
    }

    #[test]
    fn flags_found_by_template_spelling() {
        let mut db = TypeDatabase::new();
        db.add_entry(TypeEntry::new(
            "NS::Colors",
            EntryKind::Flags {
                original_name: "QFlags<NS::Color>".to_string(),
                enum_name: "NS::Color".to_string(),
            },
        ));
        assert!(db.find_flags_type("QFlags<NS::Color>").is_some());
        assert!(db.find_flags_type("NS::Colors").is_some());
    }

    #[test]
    fn rejection_reports_reason() {
        let mut db = TypeDatabase::new();
        db.add_rejection(TypeRejection {
            match_type: RejectionMatch::Field,
            class_name: compile_pattern("Foo").expect("pattern"),
            pattern: Some(compile_pattern("d_ptr").expect("pattern")),
        });
        assert!(db.is_field_rejected("Foo", "d_ptr").is_some());
        assert!(db.is_field_rejected("Foo", "x").is_none());
    }
}
