//! Code-model traversal: one file per declaration kind.
//!
//! Classes, namespaces, enums and typedefs are created in a first pass;
//! fields and functions follow once every class exists, so member types can
//! resolve to classes declared later in the model.

mod added;
mod classes;
pub(crate) mod defaults;
mod enums;
mod fields;
mod functions;
mod namespaces;
mod operators;
mod typedefs;

use mjb_codemodel::ScopeItem;
use mjb_meta::ClassId;

use crate::builder::MetaBuilder;
use crate::error::BuilderError;

pub use defaults::resolve_scope_prefix;

impl MetaBuilder {
    /// Record `child` as nested in `parent` once.
    pub(crate) fn add_inner_class(&mut self, parent: ClassId, child: ClassId) {
        if parent == child {
            return;
        }
        let inner = &mut self.arena[parent].inner_classes;
        if !inner.contains(&child) {
            inner.push(child);
        }
    }

    /// Fields, functions and added functions of `id`, then the members of
    /// its nested classes.
    pub(crate) fn traverse_scope_members(
        &mut self,
        scope: &ScopeItem,
        id: ClassId,
    ) -> Result<(), BuilderError> {
        self.traverse_fields(scope, id);
        self.traverse_functions(scope, id);
        self.fill_added_functions(id)?;
        self.fill_typedef_added_functions(scope)?;
        for item in &scope.classes {
            self.traverse_class_members(item)?;
        }
        Ok(())
    }

    /// Added functions of the classes created for the typedefs of `scope`.
    pub(crate) fn fill_typedef_added_functions(
        &mut self,
        scope: &ScopeItem,
    ) -> Result<(), BuilderError> {
        for typedef in &scope.typedefs {
            let qualified = self.qualify(&typedef.name);
            if let Some(&id) = self.item_classes.get(&qualified) {
                self.fill_added_functions(id)?;
            }
        }
        Ok(())
    }
}
