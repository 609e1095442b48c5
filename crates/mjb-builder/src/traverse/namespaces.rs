use std::sync::Arc;

use mjb_codemodel::{NamespaceItem, NamespaceKind};
use mjb_meta::{ClassId, MetaClass};
use mjb_typesystem::EntryKind;

use crate::builder::MetaBuilder;
use crate::error::BuilderError;
use crate::reject::{RejectCategory, RejectReason};

impl MetaBuilder {
    /// Create (or reopen) the class standing for a namespace and traverse its
    /// enums, classes, typedefs and nested namespaces.
    pub(crate) fn traverse_namespace(&mut self, item: &NamespaceItem) -> Option<ClassId> {
        if item.kind == NamespaceKind::Anonymous || item.name.is_empty() {
            return None;
        }
        let qualified = self.qualify(&item.name);

        if let Some(reason) = self.db.is_class_rejected(&qualified) {
            self.reject(
                RejectCategory::Classes,
                RejectReason::GenerationDisabled,
                qualified,
                reason,
            );
            return None;
        }
        let Some(entry) = self.db.find_namespace_types(&qualified).into_iter().next() else {
            let message = format!("namespace '{qualified}' does not have a type entry");
            tracing::warn!(namespace = %qualified, location = %item.location, "{message}");
            self.reject(
                RejectCategory::Classes,
                RejectReason::GenerationDisabled,
                qualified,
                message,
            );
            return None;
        };

        if item.kind == NamespaceKind::Inline && !self.inline_namespaces.contains(&qualified) {
            self.inline_namespaces.push(qualified.clone());
        }

        let id = if let Some(&existing) = self.item_classes.get(&qualified) {
            existing
        } else {
            let mut class = MetaClass::new(Arc::clone(&entry));
            class.source_location = item.location.clone();
            class.enclosing_class = self.current_class;
            let id = self.alloc_class(class);
            self.item_classes.insert(qualified.clone(), id);
            self.add_meta_class(id);
            if let EntryKind::Namespace {
                extends: Some(extends),
                ..
            } = entry.kind()
            {
                match self.find_any_class(extends) {
                    Some(extended) => self.arena[id].extended_namespace = Some(extended),
                    None => tracing::warn!(
                        namespace = %qualified,
                        extends = %extends,
                        "extended namespace not found"
                    ),
                }
            }
            id
        };

        let previous = self.current_class.replace(id);
        self.push_scope(&item.name);
        for enum_item in &item.scope.enums {
            if let Some(meta_enum) = self.traverse_enum(enum_item, Some(id)) {
                self.arena[id].enums.push(meta_enum);
            }
        }
        for class_item in &item.scope.classes {
            if let Some(child) = self.traverse_class(class_item) {
                self.add_inner_class(id, child);
            }
        }
        for typedef in &item.scope.typedefs {
            if let Some(child) = self.traverse_typedef(typedef, Some(id)) {
                self.add_meta_class(child);
                self.add_inner_class(id, child);
            }
        }
        for nested in &item.namespaces {
            if let Some(child) = self.traverse_namespace(nested) {
                self.add_inner_class(id, child);
            }
        }
        self.pop_scope();
        self.current_class = previous;

        tracing::debug!(namespace = %qualified, "namespace traversed");
        Some(id)
    }

    pub(crate) fn traverse_namespace_members(
        &mut self,
        item: &NamespaceItem,
    ) -> Result<(), BuilderError> {
        if item.kind == NamespaceKind::Anonymous || item.name.is_empty() {
            return Ok(());
        }
        let qualified = self.qualify(&item.name);
        let Some(&id) = self.item_classes.get(&qualified) else {
            return Ok(());
        };

        let previous = self.current_class.replace(id);
        self.push_scope(&item.name);
        let result = self.traverse_scope_members(&item.scope, id).and_then(|()| {
            item.namespaces
                .iter()
                .try_for_each(|nested| self.traverse_namespace_members(nested))
        });
        self.pop_scope();
        self.current_class = previous;
        result
    }
}
