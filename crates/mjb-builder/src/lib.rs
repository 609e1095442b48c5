//! # mjb-builder
//!
//! Turns a parsed [`mjb_codemodel::CodeModel`] plus a
//! [`mjb_typesystem::TypeDatabase`] into the meta model consumed by code
//! generators.
//!
//! The pipeline, driven by [`MetaBuilder::build`]:
//! - traverse namespaces, classes, enums, typedefs, fields and functions,
//!   resolving every type use through the ruleset
//! - resolve base classes and instantiate template bases
//! - merge inherited functions and apply ruleset modifications
//! - attach free operators to the classes they act on
//! - scaffold smart pointers and order classes by dependency
//!
//! Declarations the ruleset does not cover are recorded in a [`RejectLog`]
//! rather than failing the run.

mod builder;
mod checks;
mod error;
mod inheritance;
mod lookup;
mod merge;
mod modifications;
mod registry;
mod reject;
mod sequencer;
mod smart_pointers;
mod templates;
mod traverse;

#[cfg(test)]
mod tests;

pub use builder::MetaBuilder;
pub use error::{BuilderError, TranslateError};
pub use registry::ScratchRegistry;
pub use reject::{RejectCategory, RejectLog, RejectReason, Rejection};
pub use sequencer::{Dependency, SortResult, classes_topological_sorted};
pub use templates::inherit_template_type;
pub use traverse::resolve_scope_prefix;

use mjb_meta::{ClassArena, ClassId, MetaClass, MetaEnum, MetaFunction};

/// Everything a build produced, moved out of the builder.
#[derive(Debug, Clone, Default)]
pub struct MetaModel {
    pub arena: ClassArena,
    /// Classes and namespaces, dependencies first.
    pub classes: Vec<ClassId>,
    /// Container classes.
    pub templates: Vec<ClassId>,
    pub smart_pointers: Vec<ClassId>,
    pub global_functions: Vec<MetaFunction>,
    pub global_enums: Vec<MetaEnum>,
}

impl MetaModel {
    #[must_use]
    pub fn class(&self, id: ClassId) -> &MetaClass {
        &self.arena[id]
    }

    /// Class, template or smart pointer by qualified name.
    #[must_use]
    pub fn find_class(&self, name: &str) -> Option<&MetaClass> {
        [&self.classes, &self.templates, &self.smart_pointers]
            .into_iter()
            .find_map(|ids| self.arena.find_in(ids, name))
            .map(|id| &self.arena[id])
    }

    /// Names of the top-level class list, in output order.
    #[must_use]
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|id| self.arena[*id].name()).collect()
    }
}
