//! # mjb-meta
//!
//! The normalized object model the builder produces from a code model and a
//! ruleset, ready for code generation.
//!
//! - [`MetaType`]: one resolved use of a type entry, with its [`UsagePattern`]
//! - [`MetaFunction`] and [`MetaArgument`]: callables with their three class
//!   roles and a per-class modification memo
//! - [`MetaClass`] in a [`ClassArena`], addressed by [`ClassId`]
//! - [`MetaField`], [`MetaEnum`]

mod class;
mod enums;
mod field;
mod function;
mod types;

pub use class::{ClassArena, ClassFlags, ClassId, MetaClass, UsingMember};
pub use enums::{MetaEnum, MetaEnumValue};
pub use field::MetaField;
pub use function::{
    ArgumentComparison, FunctionAttributes, FunctionFlags, FunctionType, MetaArgument,
    MetaFunction,
};
pub use types::{MetaType, UsagePattern};
