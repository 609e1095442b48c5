//! Base-class resolution and `using` declarations.

use std::sync::Arc;

use mjb_codemodel::TypeInfo;
use mjb_meta::{ClassId, UsingMember};
use mjb_typesystem::TypeEntry;

use crate::builder::MetaBuilder;

/// `scope` and each of its enclosing scopes, innermost first.
fn scope_prefixes(scope: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = scope;
    while !current.is_empty() {
        result.push(current.to_string());
        current = current.rsplit_once("::").map_or("", |(prefix, _)| prefix);
    }
    result
}

impl MetaBuilder {
    pub(crate) fn all_class_ids(&self) -> Vec<ClassId> {
        self.classes
            .iter()
            .chain(&self.templates)
            .chain(&self.smart_pointers)
            .copied()
            .collect()
    }

    /// Resolve the base names of `id` to classes, bases first. Returns
    /// `false` when any base could not be resolved; the class keeps the
    /// bases that could.
    pub(crate) fn setup_inheritance(&mut self, id: ClassId) -> bool {
        if self.arena[id].flags.inheritance_done {
            return true;
        }
        self.arena[id].flags.inheritance_done = true;

        let class_name = self.arena[id].name().to_string();
        if let Some(superclass) = self.arena[id]
            .type_entry
            .complex()
            .and_then(|c| c.default_superclass.clone())
        {
            match self.find_any_class(&superclass) {
                Some(found) => self.arena[id].default_superclass = Some(found),
                None => tracing::warn!(
                    class = %class_name,
                    default_superclass = %superclass,
                    "default superclass not found"
                ),
            }
        }

        let names = self.arena[id].base_class_names.clone();
        if let [only] = names.as_slice() {
            if only.contains('<') {
                return self.setup_template_base(id, only);
            }
        }

        let all = self.all_class_ids();
        let mut resolved = true;
        for base_name in &names {
            if self.db.is_class_rejected(base_name).is_some() {
                continue;
            }
            let Some(entry) = self.find_base_entry(id, base_name) else {
                tracing::warn!(class = %class_name, base = %base_name, "base class is not a known class type");
                resolved = false;
                continue;
            };
            let Some(base) = self.arena.find_by_entry(&all, &entry).filter(|b| *b != id) else {
                tracing::warn!(class = %class_name, base = %base_name, "base class not found");
                resolved = false;
                continue;
            };
            self.setup_inheritance(base);
            self.arena[id].add_base_class(base);
        }
        resolved
    }

    /// The complex entry named by `base_name` as seen from inside `id`.
    fn find_base_entry(&self, id: ClassId, base_name: &str) -> Option<Arc<TypeEntry>> {
        let scope = self.arena[id].type_entry.scope().to_string();
        scope_prefixes(&scope)
            .iter()
            .map(|prefix| format!("{prefix}::{base_name}"))
            .chain(std::iter::once(base_name.to_string()))
            .find_map(|name| self.db.find_complex_type(&name).filter(|e| !e.is_namespace()))
    }

    /// Inherit from a template instantiation: from the class template when
    /// one is known, otherwise from a container entry.
    fn setup_template_base(&mut self, id: ClassId, base_text: &str) -> bool {
        let class_name = self.arena[id].name().to_string();
        let info = match TypeInfo::parse(base_text) {
            Ok(info) => info,
            Err(error) => {
                tracing::warn!(class = %class_name, base = %base_text, %error, "unparsable template base");
                return false;
            }
        };
        let template_name = info.qualified_name_string();

        if let Some(template) = self.find_template_class(&template_name, id) {
            self.setup_inheritance(template);
            if !self.inherit_template(id, template, &info) {
                return false;
            }
            self.arena[id].flags.has_template_base = true;
            return true;
        }
        if let Some(container) = self.db.find_container_type(&template_name) {
            self.arena[id].base_container_type = Some(container);
            return true;
        }
        tracing::warn!(class = %class_name, base = %base_text, "template base class not found");
        false
    }

    /// Class template `name`, searched from the scope of `subclass`
    /// outwards.
    pub(crate) fn find_template_class(&self, name: &str, subclass: ClassId) -> Option<ClassId> {
        let sub = &self.arena[subclass];
        let mut candidates: Vec<String> = scope_prefixes(sub.type_entry.scope())
            .iter()
            .map(|prefix| format!("{prefix}::{name}"))
            .collect();
        if let Some(enclosing) = sub.enclosing_class {
            candidates.push(format!("{}::{name}", self.arena[enclosing].name()));
        }
        candidates.push(name.to_string());

        candidates.iter().find_map(|candidate| {
            self.templates
                .iter()
                .chain(&self.classes)
                .chain(&self.smart_pointers)
                .copied()
                .filter(|id| *id != subclass)
                .find(|id| self.arena[*id].name() == candidate)
        })
    }

    /// Resolve the `using Base::member;` declarations of `id` against its
    /// resolved bases.
    pub(crate) fn traverse_using_members(&mut self, id: ClassId) {
        let Some(declarations) = self.using_declarations.get(&id).cloned() else {
            return;
        };
        let class_name = self.arena[id].name().to_string();
        let mut bases = self.arena.all_base_classes(id);
        if let Some(template) = self.arena[id].template_base_class {
            bases.push(template);
        }

        for declaration in declarations {
            let base = bases.iter().copied().find(|b| {
                let base = &self.arena[*b];
                base.name() == declaration.class_name
                    || base.entry_name() == declaration.class_name
                    || base.name().ends_with(&format!("::{}", declaration.class_name))
            });
            let Some(base_class) = base else {
                tracing::warn!(
                    class = %class_name,
                    base = %declaration.class_name,
                    member = %declaration.member_name,
                    "base class of using declaration not found"
                );
                continue;
            };
            let member_name = declaration
                .member_name
                .rsplit("::")
                .next()
                .unwrap_or(&declaration.member_name)
                .to_string();
            self.arena[id].using_members.push(UsingMember {
                base_class,
                member_name,
                access: declaration.access,
            });
        }
    }
}
