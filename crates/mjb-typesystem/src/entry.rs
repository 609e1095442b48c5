//! Type entries: the ruleset's description of C++ types.
//!
//! Every entry has a closed [`EntryKind`]. Kinds that describe class-like
//! types (`Object`, `Value`, `Namespace`, `Container`, `SmartPointer`,
//! `Typedef`) carry a [`ComplexData`] block with the per-class rules.

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::modification::{AddedFunction, FieldModification, FunctionModification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    List,
    Set,
    Map,
    MultiMap,
    Pair,
    Span,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartPointerKind {
    #[default]
    Shared,
    Unique,
    Handle,
    ValueHandle,
}

/// Per-class rules shared by all class-like entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexData {
    pub function_modifications: Vec<FunctionModification>,
    pub field_modifications: Vec<FieldModification>,
    pub added_functions: Vec<Arc<AddedFunction>>,
    pub default_superclass: Option<String>,
    pub is_stream: bool,
    pub force_abstract: bool,
    pub deprecated: bool,
    /// Explicit copyability override; `None` means "infer".
    pub copyable: Option<bool>,
}

impl ComplexData {
    /// Modifications matching any of the accepted spellings of a signature.
    #[must_use]
    pub fn function_modifications_for(&self, signatures: &[String]) -> Vec<FunctionModification> {
        self.function_modifications
            .iter()
            .filter(|m| signatures.iter().any(|s| m.matches(s)))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn field_modification(&self, name: &str) -> Option<&FieldModification> {
        self.field_modifications.iter().find(|m| m.name == name)
    }
}

/// Smart-pointer accessor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartPointerSpec {
    pub kind: SmartPointerKind,
    pub getter: String,
    pub ref_count_method: Option<String>,
    pub value_check_method: Option<String>,
    pub null_check_method: Option<String>,
    pub reset_method: Option<String>,
    /// Pointee type names this entry is restricted to; empty means any.
    pub instantiations: Vec<String>,
}

/// Closed set of entry kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Primitive {
        /// The primitive this one is an alias of.
        referenced: Option<Arc<TypeEntry>>,
        builtin: bool,
    },
    Void,
    Varargs,
    Enum {
        flags: Option<String>,
        /// Enumerator name or integer designating the null value.
        null_value: Option<String>,
    },
    EnumValue {
        enum_name: String,
        value: String,
    },
    Flags {
        /// Spelling of the flags template use, `QFlags<NS::Color>`.
        original_name: String,
        enum_name: String,
    },
    Container {
        container_kind: ContainerKind,
        complex: ComplexData,
    },
    Object(ComplexData),
    Value(ComplexData),
    Namespace {
        extends: Option<String>,
        complex: ComplexData,
    },
    SmartPointer {
        spec: SmartPointerSpec,
        complex: ComplexData,
    },
    Typedef {
        source_type: String,
        complex: ComplexData,
    },
    Function {
        signatures: Vec<String>,
    },
    TemplateArgument {
        ordinal: usize,
    },
    Array {
        element: Arc<TypeEntry>,
    },
    ConstantValue,
}

/// Payload-free discriminant of [`EntryKind`], for kind comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Primitive,
    Void,
    Varargs,
    Enum,
    EnumValue,
    Flags,
    Container,
    Object,
    Value,
    Namespace,
    SmartPointer,
    Typedef,
    Function,
    TemplateArgument,
    Array,
    ConstantValue,
}

impl EntryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Void => "void",
            Self::Varargs => "varargs",
            Self::Enum => "enum",
            Self::EnumValue => "enum-value",
            Self::Flags => "flags",
            Self::Container => "container",
            Self::Object => "object",
            Self::Value => "value",
            Self::Namespace => "namespace",
            Self::SmartPointer => "smart-pointer",
            Self::Typedef => "typedef",
            Self::Function => "function",
            Self::TemplateArgument => "template-argument",
            Self::Array => "array",
            Self::ConstantValue => "constant-value",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named ruleset description of one C++ type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    name: String,
    kind: EntryKind,
    generate: bool,
}

static VOID_ENTRY: LazyLock<Arc<TypeEntry>> =
    LazyLock::new(|| Arc::new(TypeEntry::new("void", EntryKind::Void)));

impl TypeEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            generate: true,
        }
    }

    /// The shared `void` entry.
    #[must_use]
    pub fn void() -> Arc<Self> {
        Arc::clone(&VOID_ENTRY)
    }

    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Object(ComplexData::default()))
    }

    #[must_use]
    pub fn value(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Value(ComplexData::default()))
    }

    #[must_use]
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(
            name,
            EntryKind::Primitive {
                referenced: None,
                builtin: false,
            },
        )
    }

    #[must_use]
    pub fn builtin_primitive(name: impl Into<String>) -> Self {
        Self::new(
            name,
            EntryKind::Primitive {
                referenced: None,
                builtin: true,
            },
        )
    }

    #[must_use]
    pub const fn with_generate(mut self, generate: bool) -> Self {
        self.generate = generate;
        self
    }

    /// Fully qualified C++ name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last name segment, template suffix excluded.
    #[must_use]
    pub fn entry_name(&self) -> &str {
        let base = self.name.find('<').map_or(self.name.as_str(), |p| &self.name[..p]);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Qualifying scope (`NS::Outer` for `NS::Outer::Inner`), empty at global scope.
    #[must_use]
    pub fn scope(&self) -> &str {
        let base = self.name.find('<').map_or(self.name.as_str(), |p| &self.name[..p]);
        base.rfind("::").map_or("", |p| &base[..p])
    }

    #[must_use]
    pub const fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut EntryKind {
        &mut self.kind
    }

    #[must_use]
    pub const fn generate_code(&self) -> bool {
        self.generate
    }

    #[must_use]
    pub const fn entry_type(&self) -> EntryType {
        match &self.kind {
            EntryKind::Primitive { .. } => EntryType::Primitive,
            EntryKind::Void => EntryType::Void,
            EntryKind::Varargs => EntryType::Varargs,
            EntryKind::Enum { .. } => EntryType::Enum,
            EntryKind::EnumValue { .. } => EntryType::EnumValue,
            EntryKind::Flags { .. } => EntryType::Flags,
            EntryKind::Container { .. } => EntryType::Container,
            EntryKind::Object(_) => EntryType::Object,
            EntryKind::Value(_) => EntryType::Value,
            EntryKind::Namespace { .. } => EntryType::Namespace,
            EntryKind::SmartPointer { .. } => EntryType::SmartPointer,
            EntryKind::Typedef { .. } => EntryType::Typedef,
            EntryKind::Function { .. } => EntryType::Function,
            EntryKind::TemplateArgument { .. } => EntryType::TemplateArgument,
            EntryKind::Array { .. } => EntryType::Array,
            EntryKind::ConstantValue => EntryType::ConstantValue,
        }
    }

    /// Class-level rules, for class-like entries only.
    #[must_use]
    pub const fn complex(&self) -> Option<&ComplexData> {
        match &self.kind {
            EntryKind::Object(complex)
            | EntryKind::Value(complex)
            | EntryKind::Container { complex, .. }
            | EntryKind::Namespace { complex, .. }
            | EntryKind::SmartPointer { complex, .. }
            | EntryKind::Typedef { complex, .. } => Some(complex),
            _ => None,
        }
    }

    pub fn complex_mut(&mut self) -> Option<&mut ComplexData> {
        match &mut self.kind {
            EntryKind::Object(complex)
            | EntryKind::Value(complex)
            | EntryKind::Container { complex, .. }
            | EntryKind::Namespace { complex, .. }
            | EntryKind::SmartPointer { complex, .. }
            | EntryKind::Typedef { complex, .. } => Some(complex),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_complex(&self) -> bool {
        self.complex().is_some()
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self.kind, EntryKind::Primitive { .. })
    }

    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self.kind, EntryKind::Void)
    }

    #[must_use]
    pub const fn is_varargs(&self) -> bool {
        matches!(self.kind, EntryKind::Varargs)
    }

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, EntryKind::Enum { .. })
    }

    #[must_use]
    pub const fn is_enum_value(&self) -> bool {
        matches!(self.kind, EntryKind::EnumValue { .. })
    }

    #[must_use]
    pub const fn is_flags(&self) -> bool {
        matches!(self.kind, EntryKind::Flags { .. })
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.kind, EntryKind::Container { .. })
    }

    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self.kind, EntryKind::Object(_))
    }

    /// Value semantics: value types and typedef'd instantiations.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self.kind, EntryKind::Value(_) | EntryKind::Typedef { .. })
    }

    #[must_use]
    pub const fn is_namespace(&self) -> bool {
        matches!(self.kind, EntryKind::Namespace { .. })
    }

    #[must_use]
    pub const fn is_smart_pointer(&self) -> bool {
        matches!(self.kind, EntryKind::SmartPointer { .. })
    }

    #[must_use]
    pub const fn is_typedef(&self) -> bool {
        matches!(self.kind, EntryKind::Typedef { .. })
    }

    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self.kind, EntryKind::Function { .. })
    }

    #[must_use]
    pub const fn is_template_argument(&self) -> bool {
        matches!(self.kind, EntryKind::TemplateArgument { .. })
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.kind, EntryKind::Array { .. })
    }

    #[must_use]
    pub const fn is_constant_value(&self) -> bool {
        matches!(self.kind, EntryKind::ConstantValue)
    }

    /// Enum values and numeric constants only make sense as template
    /// arguments or default values, never as a declared type.
    #[must_use]
    pub const fn is_non_type_template_argument(&self) -> bool {
        matches!(self.kind, EntryKind::EnumValue { .. } | EntryKind::ConstantValue)
    }

    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        matches!(self.kind, EntryKind::Primitive { builtin: true, .. })
    }

    #[must_use]
    pub fn template_ordinal(&self) -> Option<usize> {
        match self.kind {
            EntryKind::TemplateArgument { ordinal } => Some(ordinal),
            _ => None,
        }
    }

    #[must_use]
    pub const fn smart_pointer_spec(&self) -> Option<&SmartPointerSpec> {
        match &self.kind {
            EntryKind::SmartPointer { spec, .. } => Some(spec),
            _ => None,
        }
    }

    /// Whether a smart-pointer entry accepts `pointee` as its instantiation.
    #[must_use]
    pub fn matches_instantiation(&self, pointee: &Self) -> bool {
        self.smart_pointer_spec().is_some_and(|spec| {
            spec.instantiations.is_empty() || spec.instantiations.iter().any(|i| i == pointee.name())
        })
    }

    /// For primitive aliases, the last non-builtin entry in the alias chain.
    #[must_use]
    pub fn basic_referenced_non_builtin(self: &Arc<Self>) -> Arc<Self> {
        let mut result = Arc::clone(self);
        loop {
            let next = match result.kind() {
                EntryKind::Primitive {
                    referenced: Some(referenced),
                    ..
                } if !referenced.is_builtin() => Arc::clone(referenced),
                _ => return result,
            };
            result = next;
        }
    }

    /// Enclosing enum name for enum values, `None` otherwise.
    #[must_use]
    pub fn parent_enum(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::EnumValue { enum_name, .. } | EntryKind::Flags { enum_name, .. } => {
                Some(enum_name)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.entry_type())
    }
}

/// Names of the C++ builtin types known without any ruleset declaration.
pub const CPP_PRIMITIVES: &[&str] = &[
    "bool",
    "char",
    "signed char",
    "unsigned char",
    "short",
    "unsigned short",
    "int",
    "unsigned int",
    "unsigned",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
    "float",
    "double",
    "long double",
    "wchar_t",
    "char16_t",
    "char32_t",
    "size_t",
    "std::size_t",
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
    "intptr_t",
    "uintptr_t",
    "ptrdiff_t",
    "std::nullptr_t",
];

#[must_use]
pub fn is_cpp_primitive(name: &str) -> bool {
    CPP_PRIMITIVES.contains(&name)
}
