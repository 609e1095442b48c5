//! Data members.

use mjb_codemodel::{Access, ReferenceType, SourceLocation};

use crate::class::ClassId;
use crate::types::MetaType;

/// One field of a class or namespace.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MetaField {
    pub name: String,
    pub original_name: String,
    pub meta_type: MetaType,
    pub access: Access,
    pub is_static: bool,
    pub enclosing_class: Option<ClassId>,
    /// Removed by a field modification; kept for default-value lookups.
    pub removed: bool,
    pub readable: bool,
    pub writable: bool,
    pub source_location: SourceLocation,
}

impl MetaField {
    #[must_use]
    pub fn new(name: impl Into<String>, meta_type: MetaType) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            meta_type,
            access: Access::Public,
            is_static: false,
            enclosing_class: None,
            removed: false,
            readable: true,
            writable: true,
            source_location: SourceLocation::default(),
        }
    }

    /// Default-constructible without an initializer: not a reference and
    /// not a const value.
    #[must_use]
    pub fn is_default_constructible(&self) -> bool {
        self.is_static
            || (self.meta_type.reference_type() == ReferenceType::None
                && !(self.meta_type.indirections().is_empty() && self.meta_type.is_constant()))
    }

    /// Whether a by-value field makes its class depend on the field's type
    /// being fully declared first.
    #[must_use]
    pub fn is_value_dependency(&self) -> bool {
        !self.is_static
            && self.meta_type.indirections().is_empty()
            && self.meta_type.reference_type() == ReferenceType::None
    }
}
