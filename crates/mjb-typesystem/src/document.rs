//! Serde form of a ruleset file and its conversion into a [`TypeDatabase`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use mjb_codemodel::Access;
use serde::{Deserialize, Serialize};

use crate::database::TypeDatabase;
use crate::entry::{ComplexData, ContainerKind, EntryKind, SmartPointerKind, SmartPointerSpec, TypeEntry};
use crate::error::TypesystemError;
use crate::modification::{
    AddedArgument, AddedFunction, ArgumentModification, FieldModification, Finality,
    FunctionModification, SignatureSpec,
};
use crate::rejection::{RejectionMatch, TypeRejection, compile_pattern};
use crate::signature::normalized_signature;

const fn default_true() -> bool {
    true
}

/// Top-level ruleset document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesetDocument {
    pub primitive_types: Vec<PrimitiveTypeDecl>,
    pub enum_types: Vec<EnumTypeDecl>,
    pub object_types: Vec<ComplexTypeDecl>,
    pub value_types: Vec<ComplexTypeDecl>,
    pub namespaces: Vec<NamespaceDecl>,
    pub container_types: Vec<ContainerTypeDecl>,
    pub smart_pointer_types: Vec<SmartPointerDecl>,
    pub typedef_types: Vec<TypedefTypeDecl>,
    pub function_types: Vec<FunctionTypeDecl>,
    pub rejections: Vec<RejectionDecl>,
    pub global_modifications: Vec<FunctionModificationDecl>,
    pub global_added_functions: Vec<AddedFunctionDecl>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimitiveTypeDecl {
    pub name: String,
    /// Primitive this one is an alias of.
    #[serde(default)]
    pub references: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumTypeDecl {
    pub name: String,
    /// Name of the flags type wrapping this enum.
    #[serde(default)]
    pub flags: Option<String>,
    /// Enumerator name or integer standing for "no value".
    #[serde(default)]
    pub null_value: Option<String>,
    #[serde(default = "default_true")]
    pub generate: bool,
}

/// Rules shared by every class-like declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexRules {
    pub generate: bool,
    pub modifications: Vec<FunctionModificationDecl>,
    pub field_modifications: Vec<FieldModification>,
    pub added_functions: Vec<AddedFunctionDecl>,
    pub default_superclass: Option<String>,
    pub stream: bool,
    pub force_abstract: bool,
    pub deprecated: bool,
    pub copyable: Option<bool>,
}

impl Default for ComplexRules {
    fn default() -> Self {
        Self {
            generate: true,
            modifications: Vec::new(),
            field_modifications: Vec::new(),
            added_functions: Vec::new(),
            default_superclass: None,
            stream: false,
            force_abstract: false,
            deprecated: false,
            copyable: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplexTypeDecl {
    pub name: String,
    #[serde(flatten)]
    pub rules: ComplexRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    /// Target-language package this namespace extends instead of creating.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(flatten)]
    pub rules: ComplexRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerTypeDecl {
    pub name: String,
    pub kind: ContainerKind,
    #[serde(flatten)]
    pub rules: ComplexRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmartPointerDecl {
    pub name: String,
    #[serde(default)]
    pub kind: SmartPointerKind,
    pub getter: String,
    #[serde(default)]
    pub ref_count_method: Option<String>,
    #[serde(default)]
    pub value_check_method: Option<String>,
    #[serde(default)]
    pub null_check_method: Option<String>,
    #[serde(default)]
    pub reset_method: Option<String>,
    #[serde(default)]
    pub instantiations: Vec<String>,
    #[serde(flatten)]
    pub rules: ComplexRules,
}

/// Exposes an instantiation such as `std::vector<Foo>` as a named class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypedefTypeDecl {
    pub name: String,
    pub source: String,
    #[serde(flatten)]
    pub rules: ComplexRules,
}

/// Global functions to expose, by minimal signature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionTypeDecl {
    pub name: String,
    #[serde(default)]
    pub signatures: Vec<String>,
}

/// A rejection rule. With no member pattern set, the class itself is
/// rejected; otherwise one rule per member pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionDecl {
    pub class_name: String,
    pub function_name: Option<String>,
    pub field_name: Option<String>,
    pub enum_name: Option<String>,
    pub argument_type: Option<String>,
    pub return_type: Option<String>,
}

impl Default for RejectionDecl {
    fn default() -> Self {
        Self {
            class_name: "*".to_string(),
            function_name: None,
            field_name: None,
            enum_name: None,
            argument_type: None,
            return_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionModificationDecl {
    pub signature: Option<String>,
    pub signature_regex: Option<String>,
    pub rename: Option<String>,
    pub access: Option<Access>,
    pub remove: bool,
    pub finality: Option<Finality>,
    pub deprecated: bool,
    pub argument_modifications: Vec<ArgumentModification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AddedFunctionDecl {
    pub name: String,
    pub return_type: Option<String>,
    pub arguments: Vec<AddedArgument>,
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(rename = "const")]
    pub is_constant: bool,
    pub access: Access,
    pub declaration: bool,
    pub argument_modifications: Vec<ArgumentModification>,
}

impl Default for AddedFunctionDecl {
    fn default() -> Self {
        Self {
            name: String::new(),
            return_type: None,
            arguments: Vec::new(),
            is_static: false,
            is_constant: false,
            access: Access::Public,
            declaration: false,
            argument_modifications: Vec::new(),
        }
    }
}

impl FunctionModificationDecl {
    fn to_modification(&self, context: &str) -> Result<FunctionModification, TypesystemError> {
        let signature = match (&self.signature, &self.signature_regex) {
            (Some(exact), None) => SignatureSpec::Exact(normalized_signature(exact)),
            (None, Some(pattern)) => SignatureSpec::Pattern(compile_pattern(pattern)?),
            _ => {
                return Err(TypesystemError::MissingSignature {
                    context: context.to_string(),
                });
            }
        };
        Ok(FunctionModification {
            signature,
            rename: self.rename.clone(),
            access: self.access,
            removed: self.remove,
            finality: self.finality,
            deprecated: self.deprecated,
            argument_mods: self.argument_modifications.clone(),
        })
    }
}

impl AddedFunctionDecl {
    fn to_added_function(&self) -> AddedFunction {
        let mut function = AddedFunction::new(self.name.clone());
        function.return_type = self
            .return_type
            .clone()
            .filter(|t| !t.is_empty() && t != "void");
        function.arguments.clone_from(&self.arguments);
        function.is_static = self.is_static;
        function.is_constant = self.is_constant;
        function.access = self.access;
        function.is_declaration = self.declaration;
        if !self.argument_modifications.is_empty() {
            let mut modification = FunctionModification::exact(function.signature());
            modification.argument_mods.clone_from(&self.argument_modifications);
            function.modifications.push(modification);
        }
        function
    }
}

impl ComplexRules {
    fn to_complex_data(&self, context: &str) -> Result<ComplexData, TypesystemError> {
        Ok(ComplexData {
            function_modifications: self
                .modifications
                .iter()
                .map(|m| m.to_modification(context))
                .collect::<Result<_, _>>()?,
            field_modifications: self.field_modifications.clone(),
            added_functions: self
                .added_functions
                .iter()
                .map(|f| Arc::new(f.to_added_function()))
                .collect(),
            default_superclass: self.default_superclass.clone(),
            is_stream: self.stream,
            force_abstract: self.force_abstract,
            deprecated: self.deprecated,
            copyable: self.copyable,
        })
    }
}

impl RulesetDocument {
    /// # Errors
    ///
    /// Returns [`TypesystemError::Json`] when the text is not a valid document.
    pub fn from_json_str(text: &str) -> Result<Self, TypesystemError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns [`TypesystemError::Toml`] when the text is not a valid document.
    pub fn from_toml_str(text: &str) -> Result<Self, TypesystemError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a document, choosing the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown
    /// extension or does not parse.
    pub fn load(path: &Path) -> Result<Self, TypesystemError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            other => Err(TypesystemError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Tracks names per kind so redeclarations are reported.
struct Declared {
    kind: &'static str,
    names: HashSet<String>,
}

impl Declared {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            names: HashSet::new(),
        }
    }

    fn insert(&mut self, name: &str) -> Result<(), TypesystemError> {
        if self.names.insert(name.to_string()) {
            Ok(())
        } else {
            Err(TypesystemError::Duplicate {
                kind: self.kind,
                name: name.to_string(),
            })
        }
    }
}

impl TypeDatabase {
    /// Validate and index a ruleset document.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid patterns, primitives aliasing unknown
    /// types, modifications without a signature and duplicate declarations.
    pub fn from_document(document: &RulesetDocument) -> Result<Self, TypesystemError> {
        let mut db = Self::new();

        let mut primitives = Declared::new("primitive");
        for decl in &document.primitive_types {
            primitives.insert(&decl.name)?;
            let referenced = match &decl.references {
                Some(reference) => Some(db.find_primitive_type(reference).ok_or_else(|| {
                    TypesystemError::UnknownReference {
                        name: decl.name.clone(),
                        reference: reference.clone(),
                    }
                })?),
                None => None,
            };
            db.add_entry(TypeEntry::new(
                decl.name.clone(),
                EntryKind::Primitive {
                    referenced,
                    builtin: false,
                },
            ));
        }

        let mut enums = Declared::new("enum");
        for decl in &document.enum_types {
            enums.insert(&decl.name)?;
            db.add_entry(
                TypeEntry::new(
                    decl.name.clone(),
                    EntryKind::Enum {
                        flags: decl.flags.clone(),
                        null_value: decl.null_value.clone(),
                    },
                )
                .with_generate(decl.generate),
            );
            if let Some(flags) = &decl.flags {
                db.add_entry(TypeEntry::new(
                    flags.clone(),
                    EntryKind::Flags {
                        original_name: format!("QFlags<{}>", decl.name),
                        enum_name: decl.name.clone(),
                    },
                ));
            }
        }

        let mut complex = Declared::new("complex");
        for (decls, is_object) in [(&document.object_types, true), (&document.value_types, false)] {
            for decl in decls {
                complex.insert(&decl.name)?;
                let data = decl.rules.to_complex_data(&decl.name)?;
                let kind = if is_object {
                    EntryKind::Object(data)
                } else {
                    EntryKind::Value(data)
                };
                db.add_entry(TypeEntry::new(decl.name.clone(), kind).with_generate(decl.rules.generate));
            }
        }

        // Namespaces may be declared once per reopening; no duplicate check.
        for decl in &document.namespaces {
            let entry = TypeEntry::new(
                decl.name.clone(),
                EntryKind::Namespace {
                    extends: decl.extends.clone(),
                    complex: decl.rules.to_complex_data(&decl.name)?,
                },
            );
            db.add_entry(entry.with_generate(decl.rules.generate));
        }

        for decl in &document.container_types {
            complex.insert(&decl.name)?;
            let entry = TypeEntry::new(
                decl.name.clone(),
                EntryKind::Container {
                    container_kind: decl.kind,
                    complex: decl.rules.to_complex_data(&decl.name)?,
                },
            );
            db.add_entry(entry.with_generate(decl.rules.generate));
        }

        for decl in &document.smart_pointer_types {
            let spec = SmartPointerSpec {
                kind: decl.kind,
                getter: decl.getter.clone(),
                ref_count_method: decl.ref_count_method.clone(),
                value_check_method: decl.value_check_method.clone(),
                null_check_method: decl.null_check_method.clone(),
                reset_method: decl.reset_method.clone(),
                instantiations: decl.instantiations.clone(),
            };
            let entry = TypeEntry::new(
                decl.name.clone(),
                EntryKind::SmartPointer {
                    spec,
                    complex: decl.rules.to_complex_data(&decl.name)?,
                },
            );
            db.add_entry(entry.with_generate(decl.rules.generate));
        }

        for decl in &document.typedef_types {
            complex.insert(&decl.name)?;
            let entry = TypeEntry::new(
                decl.name.clone(),
                EntryKind::Typedef {
                    source_type: decl.source.clone(),
                    complex: decl.rules.to_complex_data(&decl.name)?,
                },
            );
            db.add_entry(entry.with_generate(decl.rules.generate));
        }

        let mut functions = Declared::new("function");
        for decl in &document.function_types {
            functions.insert(&decl.name)?;
            db.add_entry(TypeEntry::new(
                decl.name.clone(),
                EntryKind::Function {
                    signatures: decl.signatures.iter().map(|s| normalized_signature(s)).collect(),
                },
            ));
        }

        for decl in &document.rejections {
            for rejection in decl.to_rejections()? {
                db.add_rejection(rejection);
            }
        }

        for decl in &document.global_modifications {
            db.add_global_function_modification(decl.to_modification("<global>")?);
        }
        for decl in &document.global_added_functions {
            db.add_global_added_function(decl.to_added_function());
        }

        tracing::debug!(
            entries = db.entries().count(),
            "type database built from ruleset document"
        );
        Ok(db)
    }

    /// Load a ruleset file (`.json` or `.toml`).
    ///
    /// # Errors
    ///
    /// See [`RulesetDocument::load`] and [`TypeDatabase::from_document`].
    pub fn load(path: &Path) -> Result<Self, TypesystemError> {
        Self::from_document(&RulesetDocument::load(path)?)
    }
}

impl RejectionDecl {
    fn to_rejections(&self) -> Result<Vec<TypeRejection>, TypesystemError> {
        let members = [
            (RejectionMatch::Function, &self.function_name),
            (RejectionMatch::Field, &self.field_name),
            (RejectionMatch::Enum, &self.enum_name),
            (RejectionMatch::ArgumentType, &self.argument_type),
            (RejectionMatch::ReturnType, &self.return_type),
        ];
        let mut result = Vec::new();
        for (match_type, pattern) in members {
            if let Some(pattern) = pattern {
                result.push(TypeRejection {
                    match_type,
                    class_name: compile_pattern(&self.class_name)?,
                    pattern: Some(compile_pattern(pattern)?),
                });
            }
        }
        if result.is_empty() {
            result.push(TypeRejection {
                match_type: RejectionMatch::Class,
                class_name: compile_pattern(&self.class_name)?,
                pattern: None,
            });
        }
        Ok(result)
    }
}
