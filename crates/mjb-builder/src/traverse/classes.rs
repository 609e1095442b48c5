use std::sync::Arc;

use mjb_codemodel::{Access, ClassItem, ClassKind};
use mjb_meta::{ClassId, MetaClass};
use mjb_typesystem::{EntryKind, TypeEntry};

use crate::builder::MetaBuilder;
use crate::error::BuilderError;
use crate::reject::{RejectCategory, RejectReason};

impl MetaBuilder {
    /// Create the class for `item` with its enums, nested classes and
    /// typedefs. Members are traversed later by
    /// [`MetaBuilder::traverse_class_members`].
    pub(crate) fn traverse_class(&mut self, item: &ClassItem) -> Option<ClassId> {
        let class_name = self.qualify(item.base_name());

        if let Some(reason) = self.db.is_class_rejected(&class_name) {
            self.reject(
                RejectCategory::Classes,
                RejectReason::GenerationDisabled,
                class_name,
                reason,
            );
            return None;
        }

        let entry = match self.db.find_complex_type(&class_name) {
            Some(entry) if !entry.is_namespace() => entry,
            _ => {
                let reason = if self.db.find_type(&class_name).is_some() {
                    RejectReason::RedefinedToNotClass
                } else {
                    RejectReason::NotInTypeSystem
                };
                self.reject(RejectCategory::Classes, reason, class_name, "");
                return None;
            }
        };

        let mut class = MetaClass::new(Arc::clone(&entry));
        class.source_location = item.location.clone();
        class.enclosing_class = self.current_class;
        class.flags.is_struct = item.class_kind == ClassKind::Struct;
        class.flags.is_final_cpp = item.is_final;
        let complex = entry.complex();
        class.flags.is_abstract = item.is_abstract || complex.is_some_and(|c| c.force_abstract);
        class.flags.deprecated = complex.is_some_and(|c| c.deprecated);
        class.base_class_names = item
            .base_classes
            .iter()
            .filter(|base| base.access == Access::Public)
            .map(|base| base.name.clone())
            .collect();
        class.template_arguments = item
            .template_parameters
            .iter()
            .enumerate()
            .map(|(ordinal, name)| {
                Arc::new(TypeEntry::new(name.as_str(), EntryKind::TemplateArgument { ordinal }))
            })
            .collect();
        class.property_specs.clone_from(&item.property_declarations);

        let id = self.alloc_class(class);
        self.item_classes.insert(class_name.clone(), id);
        if !item.using_members.is_empty() {
            self.using_declarations.insert(id, item.using_members.clone());
        }

        let previous = self.current_class.replace(id);
        self.push_scope(item.base_name());
        for enum_item in &item.scope.enums {
            if let Some(meta_enum) = self.traverse_enum(enum_item, Some(id)) {
                self.arena[id].enums.push(meta_enum);
            }
        }
        for nested in &item.scope.classes {
            if let Some(child) = self.traverse_class(nested) {
                self.add_inner_class(id, child);
            }
        }
        for typedef in &item.scope.typedefs {
            if let Some(child) = self.traverse_typedef(typedef, Some(id)) {
                self.add_meta_class(child);
                self.add_inner_class(id, child);
            }
        }
        self.pop_scope();
        self.current_class = previous;

        self.add_meta_class(id);
        tracing::debug!(class = %class_name, "class traversed");
        Some(id)
    }

    pub(crate) fn traverse_class_members(&mut self, item: &ClassItem) -> Result<(), BuilderError> {
        let class_name = self.qualify(item.base_name());
        let Some(&id) = self.item_classes.get(&class_name) else {
            return Ok(());
        };

        let previous = self.current_class.replace(id);
        self.push_scope(item.base_name());
        let result = self.traverse_scope_members(&item.scope, id);
        self.pop_scope();
        self.current_class = previous;
        result
    }
}
