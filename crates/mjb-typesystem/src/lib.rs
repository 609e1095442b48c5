//! # mjb-typesystem
//!
//! The type-mapping ruleset consumed by the meta model builder.
//!
//! A ruleset declares which C++ types are exposed and how: primitives and
//! their aliases, enums and flags, object and value classes, containers,
//! smart pointers, typedef'd instantiations and global functions. Class-like
//! entries carry function and field modifications plus ruleset-added
//! functions. Rejection rules remove classes, functions, fields and enums
//! by pattern.
//!
//! The ruleset is read from a [`RulesetDocument`] (JSON or TOML) and turned
//! into an immutable [`TypeDatabase`], which the builder queries by name.

mod database;
mod document;
mod entry;
mod error;
mod modification;
mod rejection;
mod signature;

pub use database::TypeDatabase;
pub use document::{
    AddedFunctionDecl, ComplexRules, ComplexTypeDecl, ContainerTypeDecl, EnumTypeDecl,
    FunctionModificationDecl, FunctionTypeDecl, NamespaceDecl, PrimitiveTypeDecl, RejectionDecl,
    RulesetDocument, SmartPointerDecl, TypedefTypeDecl,
};
pub use entry::{
    CPP_PRIMITIVES, ComplexData, ContainerKind, EntryKind, EntryType, SmartPointerKind,
    SmartPointerSpec, TypeEntry, is_cpp_primitive,
};
pub use error::TypesystemError;
pub use modification::{
    AddedArgument, AddedFunction, ArgumentModification, ArgumentOwner, FieldModification,
    Finality, FunctionModification, Ownership, ReferenceCount, ReferenceCountAction,
    SignatureSpec,
};
pub use rejection::{RejectionMatch, TypeRejection, compile_pattern};
pub use signature::normalized_signature;
