//! Declarative modification records attached to ruleset entries.

use std::fmt;

use mjb_codemodel::Access;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How a modification selects the functions it applies to.
#[derive(Debug, Clone)]
pub enum SignatureSpec {
    /// A normalized minimal signature, `foo(int,const QString&)`.
    Exact(String),
    /// An anchored regular expression over minimal signatures.
    Pattern(Regex),
}

impl SignatureSpec {
    #[must_use]
    pub fn matches(&self, signature: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == signature,
            Self::Pattern(pattern) => pattern.is_match(signature),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(exact) => exact,
            Self::Pattern(pattern) => pattern.as_str(),
        }
    }

    #[must_use]
    pub const fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern(_))
    }
}

impl PartialEq for SignatureSpec {
    fn eq(&self, other: &Self) -> bool {
        self.is_pattern() == other.is_pattern() && self.as_str() == other.as_str()
    }
}

impl fmt::Display for SignatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finality {
    Final,
    NonFinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceCountAction {
    Add,
    AddAll,
    Remove,
    Set,
    Ignore,
}

/// Reference-count annotation for the object-lifetime runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCount {
    pub action: ReferenceCountAction,
    #[serde(default)]
    pub variable_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    TargetLang,
    Cpp,
    Default,
}

/// Ownership transfer annotation for the object-lifetime runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentOwner {
    pub ownership: Ownership,
    /// Index of the owning argument, `-1` for `this`.
    #[serde(default)]
    pub index: i32,
}

/// A rule targeting one argument (index >= 1) or the return value (index 0).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentModification {
    pub index: usize,
    pub removed: bool,
    pub modified_type: Option<String>,
    pub remove_default_expression: bool,
    pub replaced_default_expression: Option<String>,
    pub rename_to: Option<String>,
    pub array: bool,
    pub reference_counts: Vec<ReferenceCount>,
    pub owner: Option<ArgumentOwner>,
}

impl ArgumentModification {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }
}

/// A rule targeting functions by signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionModification {
    pub signature: SignatureSpec,
    pub rename: Option<String>,
    pub access: Option<Access>,
    pub removed: bool,
    pub finality: Option<Finality>,
    pub deprecated: bool,
    pub argument_mods: Vec<ArgumentModification>,
}

impl FunctionModification {
    #[must_use]
    pub fn exact(signature: impl Into<String>) -> Self {
        Self {
            signature: SignatureSpec::Exact(signature.into()),
            rename: None,
            access: None,
            removed: false,
            finality: None,
            deprecated: false,
            argument_mods: Vec::new(),
        }
    }

    #[must_use]
    pub fn matches(&self, signature: &str) -> bool {
        self.signature.matches(signature)
    }

    #[must_use]
    pub const fn is_rename(&self) -> bool {
        self.rename.is_some()
    }

    #[must_use]
    pub fn renamed_to(&self) -> Option<&str> {
        self.rename.as_deref()
    }
}

/// A rule targeting a field by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldModification {
    pub name: String,
    pub removed: bool,
    pub rename: Option<String>,
    pub readable: bool,
    pub writable: bool,
}

impl Default for FieldModification {
    fn default() -> Self {
        Self {
            name: String::new(),
            removed: false,
            rename: None,
            readable: true,
            writable: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddedArgument {
    pub type_name: String,
    pub name: Option<String>,
    pub default_value: Option<String>,
}

/// A function injected by the ruleset with no source declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedFunction {
    pub name: String,
    /// `None` means `void`.
    pub return_type: Option<String>,
    pub arguments: Vec<AddedArgument>,
    pub is_static: bool,
    pub is_constant: bool,
    pub access: Access,
    /// Declared only, to make an existing function visible.
    pub is_declaration: bool,
    pub modifications: Vec<FunctionModification>,
}

impl AddedFunction {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            arguments: Vec::new(),
            is_static: false,
            is_constant: false,
            access: Access::Public,
            is_declaration: false,
            modifications: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_argument(mut self, type_name: &str, name: Option<&str>, default_value: Option<&str>) -> Self {
        self.arguments.push(AddedArgument {
            type_name: type_name.to_string(),
            name: name.map(str::to_string),
            default_value: default_value.map(str::to_string),
        });
        self
    }

    #[must_use]
    pub fn returning(mut self, type_name: &str) -> Self {
        self.return_type = Some(type_name.to_string());
        self
    }

    /// `name(type1,type2)` as used in diagnostics.
    #[must_use]
    pub fn signature(&self) -> String {
        let arguments: Vec<&str> = self.arguments.iter().map(|a| a.type_name.as_str()).collect();
        format!("{}({})", self.name, arguments.join(","))
    }
}
