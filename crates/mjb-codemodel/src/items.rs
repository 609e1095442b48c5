//! Declaration items of the code-model tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::type_info::TypeInfo;

/// Member access level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        };
        write!(f, "{s}")
    }
}

/// Where a declaration was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.file.is_empty()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The root of one parsed translation unit set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeModel {
    pub global: NamespaceItem,
}

/// Members shared by namespaces and classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeItem {
    pub classes: Vec<ClassItem>,
    pub enums: Vec<EnumItem>,
    pub typedefs: Vec<TypeDefItem>,
    pub template_type_aliases: Vec<TemplateTypeAliasItem>,
    pub functions: Vec<FunctionItem>,
    pub variables: Vec<VariableItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceKind {
    #[default]
    Normal,
    Inline,
    Anonymous,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceItem {
    pub name: String,
    pub kind: NamespaceKind,
    pub namespaces: Vec<NamespaceItem>,
    #[serde(flatten)]
    pub scope: ScopeItem,
    pub location: SourceLocation,
}

impl NamespaceItem {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Struct,
    Union,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseClass {
    pub name: String,
    pub access: Access,
}

/// `using Base::member;` inside a class body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsingMember {
    /// The base class the member is imported from.
    pub class_name: String,
    pub member_name: String,
    pub access: Access,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClassItem {
    /// Source name, possibly carrying a template suffix (`Foo<T>`).
    pub name: String,
    pub class_kind: ClassKind,
    pub base_classes: Vec<BaseClass>,
    pub template_parameters: Vec<String>,
    pub is_final: bool,
    pub is_abstract: bool,
    pub using_members: Vec<UsingMember>,
    pub property_declarations: Vec<String>,
    pub access: Access,
    #[serde(flatten)]
    pub scope: ScopeItem,
    pub location: SourceLocation,
}

impl ClassItem {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base(mut self, name: impl Into<String>, access: Access) -> Self {
        self.base_classes.push(BaseClass {
            name: name.into(),
            access,
        });
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: FunctionItem) -> Self {
        self.scope.functions.push(function);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: VariableItem) -> Self {
        self.scope.variables.push(field);
        self
    }

    /// Name without a template suffix.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name
            .find('<')
            .map_or(self.name.as_str(), |pos| self.name[..pos].trim_end())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumKind {
    #[default]
    CEnum,
    EnumClass,
    Anonymous,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumeratorItem {
    pub name: String,
    pub value: i64,
    /// Initializer as written, if any.
    pub string_value: String,
    pub is_deprecated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumItem {
    pub name: String,
    pub access: Access,
    pub kind: EnumKind,
    pub enumerators: Vec<EnumeratorItem>,
    pub is_deprecated: bool,
    pub is_signed: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDefItem {
    pub name: String,
    pub type_info: TypeInfo,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateTypeAliasItem {
    pub name: String,
    pub template_parameters: Vec<String>,
    pub type_info: TypeInfo,
}

/// Declaration kind as classified by the front end. Operator categories are
/// derived from the name by the builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    #[default]
    Normal,
    Constructor,
    CopyConstructor,
    MoveConstructor,
    Destructor,
    Signal,
    Slot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentItem {
    pub name: String,
    pub type_info: TypeInfo,
    /// Default value expression as written; empty when absent.
    pub default_value_expression: String,
}

impl ArgumentItem {
    #[must_use]
    pub fn new(name: impl Into<String>, type_info: TypeInfo) -> Self {
        Self {
            name: name.into(),
            type_info,
            default_value_expression: String::new(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_value_expression = expression.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FunctionItem {
    pub name: String,
    pub kind: FunctionKind,
    pub access: Access,
    #[serde(default = "TypeInfo::void")]
    pub return_type: TypeInfo,
    pub arguments: Vec<ArgumentItem>,
    pub is_constant: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_deleted: bool,
    pub is_deprecated: bool,
    pub is_friend: bool,
    pub is_explicit: bool,
    pub is_variadic: bool,
    /// Non-empty for function templates.
    pub template_parameters: Vec<String>,
    pub location: SourceLocation,
}

impl FunctionItem {
    /// A public normal function returning `void`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: TypeInfo::void(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: FunctionKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn returning(mut self, type_info: TypeInfo) -> Self {
        self.return_type = type_info;
        self
    }

    #[must_use]
    pub fn with_argument(mut self, argument: ArgumentItem) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub const fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub const fn virtual_(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    #[must_use]
    pub const fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    #[must_use]
    pub fn is_operator(&self) -> bool {
        self.name.starts_with("operator")
            && self
                .name
                .chars()
                .nth("operator".len())
                .is_some_and(|c| !c.is_alphanumeric() && c != '_')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableItem {
    pub name: String,
    pub type_info: TypeInfo,
    pub access: Access,
    pub is_static: bool,
    pub is_friend: bool,
    pub location: SourceLocation,
}

impl VariableItem {
    #[must_use]
    pub fn new(name: impl Into<String>, type_info: TypeInfo) -> Self {
        Self {
            name: name.into(),
            type_info,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub const fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }
}
