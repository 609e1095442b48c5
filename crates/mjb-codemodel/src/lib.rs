//! # mjb-codemodel
//!
//! The raw declaration tree consumed by the meta builder.
//!
//! An external front end parses C++ headers and produces a [`CodeModel`]: one
//! global namespace that recursively contains namespaces, classes, enums,
//! typedefs, template aliases, functions and variables. Every type use site is
//! a structural [`TypeInfo`] reference (qualified name, template arguments,
//! qualifiers) rather than source text.
//!
//! This crate also provides:
//! - [`TypeInfo::parse`] for the textual type spellings found in rulesets
//! - [`CodeModel::resolve_type`] to follow typedef chains relative to a scope

mod error;
mod items;
mod resolve;
mod type_info;
mod type_parser;

pub use error::CodeModelError;
pub use items::{
    Access, ArgumentItem, BaseClass, ClassItem, ClassKind, CodeModel, EnumItem, EnumKind,
    EnumeratorItem, FunctionItem, FunctionKind, NamespaceItem, NamespaceKind, ScopeItem,
    SourceLocation, TemplateTypeAliasItem, TypeDefItem, UsingMember, VariableItem,
};
pub use resolve::ItemRef;
pub use type_info::{Indirection, ReferenceType, TypeInfo};
