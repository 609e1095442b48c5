//! Enums and their enumerators.

use std::sync::Arc;

use mjb_codemodel::{Access, EnumKind, SourceLocation};
use mjb_typesystem::TypeEntry;

use crate::class::ClassId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEnumValue {
    pub name: String,
    pub value: i64,
    /// The initializer as written, empty when implicit.
    pub string_value: String,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaEnum {
    pub type_entry: Arc<TypeEntry>,
    pub kind: EnumKind,
    pub access: Access,
    pub values: Vec<MetaEnumValue>,
    pub enclosing_class: Option<ClassId>,
    pub deprecated: bool,
    pub signed: bool,
    /// The enumerator whose value equals the entry's declared null value.
    pub null_value: Option<String>,
    pub source_location: SourceLocation,
}

impl MetaEnum {
    #[must_use]
    pub fn new(type_entry: Arc<TypeEntry>, kind: EnumKind) -> Self {
        Self {
            type_entry,
            kind,
            access: Access::Public,
            values: Vec::new(),
            enclosing_class: None,
            deprecated: false,
            signed: true,
            null_value: None,
            source_location: SourceLocation::default(),
        }
    }

    /// Qualified name of the enum type.
    #[must_use]
    pub fn name(&self) -> &str {
        self.type_entry.name()
    }

    #[must_use]
    pub fn find_value(&self, name: &str) -> Option<&MetaEnumValue> {
        self.values.iter().find(|v| v.name == name)
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.kind == EnumKind::Anonymous
    }

    /// `enum class`: values are addressed through the enum name.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.kind == EnumKind::EnumClass
    }

    /// Prefix used to qualify one of this enum's values in an expression.
    #[must_use]
    pub fn value_qualifier(&self) -> String {
        if self.is_scoped() {
            self.name().to_string()
        } else {
            self.type_entry.scope().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use mjb_typesystem::EntryKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn meta_enum(kind: EnumKind) -> MetaEnum {
        let entry = Arc::new(TypeEntry::new(
            "NS::Outer::Color",
            EntryKind::Enum {
                flags: None,
                null_value: None,
            },
        ));
        let mut e = MetaEnum::new(entry, kind);
        e.values.push(MetaEnumValue {
            name: "Red".to_string(),
            value: 0,
            string_value: String::new(),
            deprecated: false,
        });
        e
    }

    #[test]
    fn plain_enum_values_qualify_with_scope() {
        let e = meta_enum(EnumKind::CEnum);
        assert_eq!(e.value_qualifier(), "NS::Outer");
        assert!(e.find_value("Red").is_some());
        assert!(e.find_value("Blue").is_none());
    }

    #[test]
    fn scoped_enum_values_qualify_with_enum_name() {
        let e = meta_enum(EnumKind::EnumClass);
        assert_eq!(e.value_qualifier(), "NS::Outer::Color");
    }
}
