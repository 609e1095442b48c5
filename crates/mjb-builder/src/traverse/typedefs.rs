use std::sync::Arc;

use mjb_codemodel::{ReferenceType, TypeDefItem};
use mjb_meta::{ClassId, MetaClass};
use mjb_typesystem::{EntryKind, TypeEntry, is_cpp_primitive};

use crate::builder::{MetaBuilder, TypedefTarget};
use crate::error::BuilderError;

impl MetaBuilder {
    /// A source typedef becomes a class when the ruleset declares a complex
    /// type of that name, e.g. `typedef QList<Foo> FooList`.
    ///
    /// A global typedef of a C++ primitive registers a builtin primitive
    /// alias instead and produces no class.
    pub(crate) fn traverse_typedef(
        &mut self,
        item: &TypeDefItem,
        current: Option<ClassId>,
    ) -> Option<ClassId> {
        let qualified = self.qualify(&item.name);
        if self.db.find_primitive_type(&qualified).is_some() {
            return None;
        }

        let source = &item.type_info;
        let source_name = source.qualified_name_string();
        let plain = source.indirections.is_empty()
            && source.reference_type == ReferenceType::None
            && source.instantiations.is_empty();
        if current.is_none() && plain && is_cpp_primitive(&source_name) {
            if let Some(target) = self.db.find_primitive_type(&source_name) {
                self.registry.add_entry(TypeEntry::new(
                    qualified.as_str(),
                    EntryKind::Primitive {
                        referenced: Some(target),
                        builtin: true,
                    },
                ));
                tracing::trace!(alias = %qualified, target = %source_name, "primitive alias");
            }
            return None;
        }

        let entry = self.db.find_complex_type(&qualified)?;
        if entry.is_namespace() {
            return None;
        }
        let mut class = MetaClass::new(entry);
        class.flags.is_typedef = true;
        class.base_class_names = vec![source.to_string()];
        class.enclosing_class = current;
        class.source_location = item.location.clone();
        let id = self.alloc_class(class);
        self.item_classes.insert(qualified, id);
        Some(id)
    }

    /// Classes for the typedef entries declared only in the ruleset, plus
    /// the reverse mapping from their source instantiation.
    pub(crate) fn traverse_ruleset_typedefs(&mut self) -> Result<(), BuilderError> {
        for entry in self.db.typedef_types() {
            let EntryKind::Typedef { source_type, .. } = entry.kind() else {
                continue;
            };
            if self.item_classes.contains_key(entry.name()) {
                continue;
            }
            let source_type = source_type.clone();

            let mut class = MetaClass::new(Arc::clone(&entry));
            class.flags.is_typedef = true;
            class.base_class_names = vec![source_type.clone()];
            let id = self.alloc_class(class);
            self.item_classes.insert(entry.name().to_string(), id);
            self.add_meta_class(id);
            self.setup_inheritance(id);

            match self.translate_type_str(&source_type, None) {
                Ok(source) => self.typedef_targets.push(TypedefTarget { source, class: id }),
                Err(error) => tracing::warn!(
                    typedef = %entry.name(),
                    source_type = %source_type,
                    %error,
                    "unable to translate typedef source type"
                ),
            }
            self.fill_added_functions(id)?;
        }
        Ok(())
    }
}
