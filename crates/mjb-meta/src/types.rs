//! Resolved type occurrences.

use std::fmt;
use std::sync::Arc;

use mjb_codemodel::{Indirection, ReferenceType};
use mjb_typesystem::{TypeEntry, normalized_signature};

/// How a type is used at a given site; drives conversion code selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsagePattern {
    Primitive,
    Flags,
    Enum,
    Value,
    Object,
    ValuePointer,
    NativePointer,
    /// `int *` exposed as `int[]` by an argument modification.
    NativePointerAsArray,
    Container,
    SmartPointer,
    Varargs,
    Array,
    /// Plain `void`, no `void *` or similar.
    Void,
    TemplateArgument,
    NonTypeTemplateArgument,
}

impl UsagePattern {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Flags => "flags",
            Self::Enum => "enum",
            Self::Value => "value",
            Self::Object => "object",
            Self::ValuePointer => "value-pointer",
            Self::NativePointer => "native-pointer",
            Self::NativePointerAsArray => "native-pointer-as-array",
            Self::Container => "container",
            Self::SmartPointer => "smart-pointer",
            Self::Varargs => "varargs",
            Self::Array => "array",
            Self::Void => "void",
            Self::TemplateArgument => "template-argument",
            Self::NonTypeTemplateArgument => "non-type-template-argument",
        }
    }
}

impl fmt::Display for UsagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type entry at one use site, with its qualifiers and instantiations.
///
/// The usage pattern is computed from the entry, the qualifiers and the
/// instantiation list. Mutators do not recompute it: call
/// [`MetaType::decide_usage_pattern`] once the instantiations are final.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaType {
    type_entry: Arc<TypeEntry>,
    instantiations: Vec<MetaType>,
    indirections: Vec<Indirection>,
    reference_type: ReferenceType,
    is_constant: bool,
    is_volatile: bool,
    array_element_count: Option<usize>,
    array_element_type: Option<Box<MetaType>>,
    original_type_description: String,
    pattern: UsagePattern,
}

impl MetaType {
    /// An unqualified use of `entry`, with its pattern decided.
    #[must_use]
    pub fn new(type_entry: Arc<TypeEntry>) -> Self {
        let mut result = Self {
            type_entry,
            instantiations: Vec::new(),
            indirections: Vec::new(),
            reference_type: ReferenceType::None,
            is_constant: false,
            is_volatile: false,
            array_element_count: None,
            array_element_type: None,
            original_type_description: String::new(),
            pattern: UsagePattern::Void,
        };
        result.decide_usage_pattern();
        result
    }

    #[must_use]
    pub fn void() -> Self {
        Self::new(TypeEntry::void())
    }

    #[must_use]
    pub const fn type_entry(&self) -> &Arc<TypeEntry> {
        &self.type_entry
    }

    pub fn set_type_entry(&mut self, type_entry: Arc<TypeEntry>) {
        self.type_entry = type_entry;
    }

    /// Unqualified entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.type_entry.entry_name()
    }

    #[must_use]
    pub fn qualified_name(&self) -> &str {
        self.type_entry.name()
    }

    #[must_use]
    pub fn instantiations(&self) -> &[Self] {
        &self.instantiations
    }

    pub fn instantiations_mut(&mut self) -> &mut Vec<Self> {
        &mut self.instantiations
    }

    pub fn add_instantiation(&mut self, instantiation: Self) {
        self.instantiations.push(instantiation);
    }

    pub fn set_instantiations(&mut self, instantiations: Vec<Self>) {
        self.instantiations = instantiations;
    }

    #[must_use]
    pub fn has_instantiations(&self) -> bool {
        !self.instantiations.is_empty()
    }

    #[must_use]
    pub fn indirections(&self) -> &[Indirection] {
        &self.indirections
    }

    pub fn set_indirections(&mut self, indirections: Vec<Indirection>) {
        self.indirections = indirections;
    }

    pub fn add_indirection(&mut self, indirection: Indirection) {
        self.indirections.push(indirection);
    }

    pub fn clear_indirections(&mut self) {
        self.indirections.clear();
    }

    #[must_use]
    pub const fn reference_type(&self) -> ReferenceType {
        self.reference_type
    }

    pub const fn set_reference_type(&mut self, reference_type: ReferenceType) {
        self.reference_type = reference_type;
    }

    #[must_use]
    pub const fn is_constant(&self) -> bool {
        self.is_constant
    }

    pub const fn set_constant(&mut self, constant: bool) {
        self.is_constant = constant;
    }

    #[must_use]
    pub const fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    pub const fn set_volatile(&mut self, volatile: bool) {
        self.is_volatile = volatile;
    }

    /// `None` when the array size is unknown or not an array.
    #[must_use]
    pub const fn array_element_count(&self) -> Option<usize> {
        self.array_element_count
    }

    pub const fn set_array_element_count(&mut self, count: Option<usize>) {
        self.array_element_count = count;
    }

    #[must_use]
    pub fn array_element_type(&self) -> Option<&Self> {
        self.array_element_type.as_deref()
    }

    pub fn set_array_element_type(&mut self, element: Self) {
        self.array_element_type = Some(Box::new(element));
    }

    /// The spelling found in the source, before resolution.
    #[must_use]
    pub fn original_type_description(&self) -> &str {
        &self.original_type_description
    }

    pub fn set_original_type_description(&mut self, description: impl Into<String>) {
        self.original_type_description = description.into();
    }

    #[must_use]
    pub const fn usage_pattern(&self) -> UsagePattern {
        self.pattern
    }

    /// Override the decided pattern (array argument modifications).
    pub const fn set_usage_pattern(&mut self, pattern: UsagePattern) {
        self.pattern = pattern;
    }

    /// Pointer depth, counting an lvalue reference as one more level.
    #[must_use]
    pub fn actual_indirections(&self) -> usize {
        self.indirections.len() + usize::from(self.reference_type == ReferenceType::LValue)
    }

    /// `const T &`
    #[must_use]
    pub fn pass_by_const_ref(&self) -> bool {
        self.is_constant && self.reference_type == ReferenceType::LValue && self.indirections.is_empty()
    }

    #[must_use]
    pub fn pass_by_value(&self) -> bool {
        self.reference_type == ReferenceType::None && self.indirections.is_empty()
    }

    /// Recompute the usage pattern from the current state.
    pub fn decide_usage_pattern(&mut self) {
        self.pattern = self.determine_usage_pattern();
    }

    fn determine_usage_pattern(&self) -> UsagePattern {
        let entry = &self.type_entry;
        let by_value_or_const_ref = self.actual_indirections() == 0 || self.pass_by_const_ref();
        if entry.is_template_argument() {
            return UsagePattern::TemplateArgument;
        }
        if entry.is_constant_value() {
            return UsagePattern::NonTypeTemplateArgument;
        }
        if entry.is_primitive() && by_value_or_const_ref {
            return UsagePattern::Primitive;
        }
        if entry.is_void() {
            let plain = self.array_element_count.is_none()
                && self.reference_type == ReferenceType::None
                && self.indirections.is_empty()
                && !self.is_constant
                && !self.is_volatile;
            return if plain {
                UsagePattern::Void
            } else {
                UsagePattern::NativePointer
            };
        }
        if entry.is_varargs() {
            return UsagePattern::Varargs;
        }
        if entry.is_enum() && by_value_or_const_ref {
            return UsagePattern::Enum;
        }
        if entry.is_object() {
            return if self.pass_by_value() {
                UsagePattern::Value
            } else {
                UsagePattern::Object
            };
        }
        if entry.is_container() && self.indirections.is_empty() {
            return if self.instantiations.is_empty() {
                UsagePattern::Value
            } else {
                UsagePattern::Container
            };
        }
        if entry.is_smart_pointer() && self.indirections.is_empty() {
            return if self.instantiations.len() == 1 {
                UsagePattern::SmartPointer
            } else {
                UsagePattern::Value
            };
        }
        if entry.is_flags() && by_value_or_const_ref {
            return UsagePattern::Flags;
        }
        if entry.is_array() {
            return UsagePattern::Array;
        }
        if entry.is_value() {
            return if self.indirections.len() == 1 {
                UsagePattern::ValuePointer
            } else {
                UsagePattern::Value
            };
        }
        UsagePattern::NativePointer
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.pattern == UsagePattern::Void
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.pattern == UsagePattern::Primitive
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.pattern == UsagePattern::Enum
    }

    #[must_use]
    pub fn is_flags(&self) -> bool {
        self.pattern == UsagePattern::Flags
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.pattern == UsagePattern::Object
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        self.pattern == UsagePattern::Value
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.pattern == UsagePattern::Container
    }

    #[must_use]
    pub fn is_smart_pointer(&self) -> bool {
        self.pattern == UsagePattern::SmartPointer
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.pattern == UsagePattern::Array
    }

    #[must_use]
    pub fn is_native_pointer(&self) -> bool {
        self.pattern == UsagePattern::NativePointer
    }

    #[must_use]
    pub fn is_template_argument(&self) -> bool {
        self.pattern == UsagePattern::TemplateArgument
    }

    /// `const char *`
    #[must_use]
    pub fn is_c_string(&self) -> bool {
        self.type_entry.name() == "char"
            && self.is_constant
            && self.indirections.len() == 1
            && self.reference_type == ReferenceType::None
    }

    /// Whether `self` mentions a template argument anywhere.
    #[must_use]
    pub fn has_template_children(&self) -> bool {
        self.type_entry.is_template_argument()
            || self.instantiations.iter().any(Self::has_template_children)
            || self
                .array_element_type
                .as_deref()
                .is_some_and(Self::has_template_children)
    }

    /// C++ spelling, `const QList<NS::Foo *> &`.
    #[must_use]
    pub fn cpp_signature(&self) -> String {
        let mut result = String::new();
        if self.is_constant {
            result.push_str("const ");
        }
        if self.is_volatile {
            result.push_str("volatile ");
        }
        if let Some(element) = self.array_element_type.as_deref() {
            result.push_str(&element.cpp_signature());
            match self.array_element_count {
                Some(count) => result.push_str(&format!("[{count}]")),
                None => result.push_str("[]"),
            }
            return result;
        }
        result.push_str(self.type_entry.name());
        if !self.instantiations.is_empty() {
            let arguments: Vec<String> = self.instantiations.iter().map(Self::cpp_signature).collect();
            result.push('<');
            result.push_str(&arguments.join(", "));
            result.push('>');
        }
        if !self.indirections.is_empty() || self.reference_type != ReferenceType::None {
            result.push(' ');
        }
        for indirection in &self.indirections {
            result.push_str(indirection.keyword());
        }
        match self.reference_type {
            ReferenceType::None => {}
            ReferenceType::LValue => result.push('&'),
            ReferenceType::RValue => result.push_str("&&"),
        }
        result
    }

    /// Compact spelling used in function signatures, `const QList<NS::Foo*>&`.
    #[must_use]
    pub fn minimal_signature(&self) -> String {
        normalized_signature(&self.cpp_signature())
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cpp_signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mjb_typesystem::{ComplexData, ContainerKind, EntryKind};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(e: TypeEntry) -> Arc<TypeEntry> {
        Arc::new(e)
    }

    fn container() -> Arc<TypeEntry> {
        entry(TypeEntry::new(
            "QList",
            EntryKind::Container {
                container_kind: ContainerKind::List,
                complex: ComplexData::default(),
            },
        ))
    }

    #[test]
    fn pattern_must_be_redecided_after_instantiation() {
        let mut list = MetaType::new(container());
        assert_eq!(list.usage_pattern(), UsagePattern::Value);
        list.add_instantiation(MetaType::new(entry(TypeEntry::builtin_primitive("int"))));
        assert_eq!(list.usage_pattern(), UsagePattern::Value);
        list.decide_usage_pattern();
        assert_eq!(list.usage_pattern(), UsagePattern::Container);
    }

    #[rstest]
    #[case(Vec::new(), ReferenceType::None, false, UsagePattern::Value)]
    #[case(vec![Indirection::Pointer], ReferenceType::None, false, UsagePattern::Object)]
    #[case(Vec::new(), ReferenceType::LValue, true, UsagePattern::Object)]
    fn object_patterns(
        #[case] indirections: Vec<Indirection>,
        #[case] reference: ReferenceType,
        #[case] constant: bool,
        #[case] expected: UsagePattern,
    ) {
        let mut t = MetaType::new(entry(TypeEntry::object("QObject")));
        t.set_indirections(indirections);
        t.set_reference_type(reference);
        t.set_constant(constant);
        t.decide_usage_pattern();
        assert_eq!(t.usage_pattern(), expected);
    }

    #[test]
    fn primitive_by_const_ref_stays_primitive() {
        let mut t = MetaType::new(entry(TypeEntry::builtin_primitive("int")));
        t.set_constant(true);
        t.set_reference_type(ReferenceType::LValue);
        t.decide_usage_pattern();
        assert!(t.is_primitive());
        t.set_constant(false);
        t.decide_usage_pattern();
        assert!(t.is_native_pointer());
    }

    #[test]
    fn void_pointer_is_native_pointer() {
        let mut t = MetaType::void();
        assert!(t.is_void());
        t.add_indirection(Indirection::Pointer);
        t.decide_usage_pattern();
        assert!(t.is_native_pointer());
    }

    #[test]
    fn signatures_spell_qualifiers() {
        let mut inner = MetaType::new(entry(TypeEntry::object("NS::Foo")));
        inner.add_indirection(Indirection::Pointer);
        let mut list = MetaType::new(container());
        list.add_instantiation(inner);
        list.set_constant(true);
        list.set_reference_type(ReferenceType::LValue);
        assert_eq!(list.cpp_signature(), "const QList<NS::Foo *> &");
        assert_eq!(list.minimal_signature(), "const QList<NS::Foo*>&");
    }

    #[test]
    fn array_signature_uses_element() {
        let element = MetaType::new(entry(TypeEntry::builtin_primitive("int")));
        let mut array = MetaType::new(entry(TypeEntry::new(
            "int[]",
            EntryKind::Array {
                element: Arc::clone(element.type_entry()),
            },
        )));
        array.set_array_element_type(element);
        array.set_array_element_count(Some(3));
        array.decide_usage_pattern();
        assert!(array.is_array());
        assert_eq!(array.minimal_signature(), "int[3]");
    }
}
