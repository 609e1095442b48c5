//! Structural type references as produced by the front end.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One level of pointer indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indirection {
    /// `*`
    Pointer,
    /// `* const`
    ConstPointer,
}

impl Indirection {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Pointer => "*",
            Self::ConstPointer => "* const",
        }
    }
}

/// C++ reference kind of a type use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    #[default]
    None,
    LValue,
    RValue,
}

/// A type reference at a use site: `const QList<Foo *> &`, `int[2][3]`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeInfo {
    /// Name segments, e.g. `["std", "vector"]`.
    pub qualified_name: Vec<String>,
    /// Template arguments in declaration order.
    pub instantiations: Vec<TypeInfo>,
    pub indirections: Vec<Indirection>,
    pub reference_type: ReferenceType,
    pub is_constant: bool,
    pub is_volatile: bool,
    /// Array dimensions as written; an empty string is an unspecified size.
    pub array_elements: Vec<String>,
    pub is_function_pointer: bool,
    /// Parameter types of a function pointer.
    pub arguments: Vec<TypeInfo>,
}

impl TypeInfo {
    /// A plain, unqualified reference to `name` (which may contain `::`).
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            qualified_name: name.split("::").map(str::to_string).collect(),
            ..Self::default()
        }
    }

    /// The `void` type.
    #[must_use]
    pub fn void() -> Self {
        Self::named("void")
    }

    /// Exactly `void`, without any qualifier.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.qualified_name.len() == 1
            && self.qualified_name[0] == "void"
            && self.indirections.is_empty()
            && self.reference_type == ReferenceType::None
            && !self.is_constant
            && !self.is_volatile
            && self.array_elements.is_empty()
            && !self.is_function_pointer
    }

    /// `A::B::C`
    #[must_use]
    pub fn qualified_name_string(&self) -> String {
        self.qualified_name.join("::")
    }

    /// Last name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.qualified_name.last().map_or("", String::as_str)
    }

    #[must_use]
    pub fn with_instantiation(mut self, instantiation: Self) -> Self {
        self.instantiations.push(instantiation);
        self
    }

    #[must_use]
    pub fn with_pointer(mut self) -> Self {
        self.indirections.push(Indirection::Pointer);
        self
    }

    #[must_use]
    pub const fn with_reference(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = reference_type;
        self
    }

    #[must_use]
    pub const fn with_const(mut self) -> Self {
        self.is_constant = true;
        self
    }

    /// Compose a typedef target (`self`) with the qualifiers of the use site
    /// (`rhs`). Used when a typedef name is replaced by what it stands for.
    #[must_use]
    pub fn combine(&self, rhs: &Self) -> Self {
        let mut result = self.clone();
        result.is_constant |= rhs.is_constant;
        result.is_volatile |= rhs.is_volatile;
        if rhs.reference_type > result.reference_type {
            result.reference_type = rhs.reference_type;
        }
        result.indirections.extend(rhs.indirections.iter().copied());
        result
            .array_elements
            .extend(rhs.array_elements.iter().cloned());
        result
            .instantiations
            .extend(rhs.instantiations.iter().cloned());
        result
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant {
            f.write_str("const ")?;
        }
        if self.is_volatile {
            f.write_str("volatile ")?;
        }
        f.write_str(&self.qualified_name_string())?;
        if !self.instantiations.is_empty() {
            f.write_str("<")?;
            for (i, inst) in self.instantiations.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{inst}")?;
            }
            f.write_str(">")?;
        }
        if self.is_function_pointer {
            f.write_str(" (*)(")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(")")?;
        }
        if !self.indirections.is_empty() || self.reference_type != ReferenceType::None {
            f.write_str(" ")?;
        }
        for indirection in &self.indirections {
            f.write_str(indirection.keyword())?;
        }
        match self.reference_type {
            ReferenceType::None => {}
            ReferenceType::LValue => f.write_str("&")?,
            ReferenceType::RValue => f.write_str("&&")?,
        }
        for element in &self.array_elements {
            write!(f, "[{element}]")?;
        }
        Ok(())
    }
}
