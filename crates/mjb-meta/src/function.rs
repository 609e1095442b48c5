//! Meta functions and their arguments.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use mjb_codemodel::{Access, ReferenceType, SourceLocation};
use mjb_typesystem::{AddedFunction, FunctionModification, TypeEntry, normalized_signature};

use crate::class::ClassId;
use crate::types::MetaType;

/// Closed set of function kinds. Operator kinds are derived from the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionType {
    Constructor,
    CopyConstructor,
    MoveConstructor,
    AssignmentOperator,
    MoveAssignmentOperator,
    Destructor,
    Normal,
    Signal,
    /// Private override kept only for vtable completeness; never callable.
    Empty,
    Slot,
    CallOperator,
    ConversionOperator,
    /// `operator*` without arguments.
    DereferenceOperator,
    /// `operator&` without arguments.
    ReferenceOperator,
    ArrowOperator,
    ArithmeticOperator,
    IncrementOperator,
    DecrementOperator,
    BitwiseOperator,
    LogicalOperator,
    ShiftOperator,
    SubscriptOperator,
    ComparisonOperator,
}

impl FunctionType {
    /// Classify an operator by name. `argument_count` distinguishes the
    /// unary `operator*`/`operator&` from their binary forms.
    #[must_use]
    pub fn from_operator_name(name: &str, argument_count: usize) -> Option<Self> {
        let kind = match name {
            "operator=" => Self::AssignmentOperator,
            "operator+" | "operator+=" | "operator-" | "operator-=" | "operator*" | "operator*="
            | "operator/" | "operator/=" | "operator%" | "operator%=" => Self::ArithmeticOperator,
            "operator++" => Self::IncrementOperator,
            "operator--" => Self::DecrementOperator,
            "operator&" | "operator&=" | "operator|" | "operator|=" | "operator^" | "operator^="
            | "operator~" => Self::BitwiseOperator,
            "operator<<" | "operator<<=" | "operator>>" | "operator>>=" => Self::ShiftOperator,
            "operator<" | "operator<=" | "operator>" | "operator>=" | "operator==" | "operator!="
            | "operator<=>" => Self::ComparisonOperator,
            "operator!" | "operator&&" | "operator||" => Self::LogicalOperator,
            "operator[]" => Self::SubscriptOperator,
            "operator()" => Self::CallOperator,
            "operator->" => Self::ArrowOperator,
            _ if name.starts_with("operator ") => Self::ConversionOperator,
            _ => return None,
        };
        if argument_count == 0 {
            if name == "operator*" {
                return Some(Self::DereferenceOperator);
            }
            if name == "operator&" {
                return Some(Self::ReferenceOperator);
            }
        }
        Some(kind)
    }

    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            Self::CallOperator
                | Self::ConversionOperator
                | Self::DereferenceOperator
                | Self::ReferenceOperator
                | Self::ArrowOperator
                | Self::ArithmeticOperator
                | Self::IncrementOperator
                | Self::DecrementOperator
                | Self::BitwiseOperator
                | Self::LogicalOperator
                | Self::ShiftOperator
                | Self::SubscriptOperator
                | Self::ComparisonOperator
        )
    }

    #[must_use]
    pub const fn is_constructor(self) -> bool {
        matches!(self, Self::Constructor | Self::CopyConstructor | Self::MoveConstructor)
    }

    /// Kinds that are never inherited into a subclass.
    #[must_use]
    pub const fn is_special_member(self) -> bool {
        matches!(
            self,
            Self::Constructor
                | Self::CopyConstructor
                | Self::MoveConstructor
                | Self::AssignmentOperator
                | Self::MoveAssignmentOperator
                | Self::Destructor
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FunctionAttributes {
    pub friendly: bool,
    pub is_abstract: bool,
    pub is_static: bool,
    pub class_method: bool,
    pub final_in_target_lang: bool,
    pub virtual_cpp: bool,
    pub overridden_cpp: bool,
    pub final_cpp: bool,
    /// Synthesized by the builder (implicit constructors, inherited methods).
    pub added_method: bool,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FunctionFlags {
    /// A signal whose trailing `QPrivateSignal` argument was stripped.
    pub private_signal: bool,
    pub inherited_from_template: bool,
    pub operator_leading_class_argument_removed: bool,
    pub operator_trailing_class_argument_removed: bool,
    pub operator_class_argument_by_value: bool,
}

/// Outcome of comparing two argument lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentComparison {
    /// Same length; differing positions are both defaulted.
    Equal,
    /// One list extends the other with defaulted arguments only.
    DefaultValueOverload,
    Different,
}

/// One parameter of a meta function.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaArgument {
    pub name: String,
    pub meta_type: MetaType,
    /// Replacement type from an argument modification.
    pub modified_type: Option<MetaType>,
    pub default_value_expression: String,
    /// Default value as written in the source, before any rewriting.
    pub original_default_value_expression: String,
    pub argument_index: usize,
    /// `false` when the name was synthesized (`arg__N`).
    pub has_name: bool,
    /// Logically deleted by a modification; indices are recomputed on demand.
    pub removed: bool,
}

impl MetaArgument {
    #[must_use]
    pub fn new(name: impl Into<String>, meta_type: MetaType, argument_index: usize) -> Self {
        let name = name.into();
        Self {
            has_name: !name.is_empty(),
            name,
            meta_type,
            modified_type: None,
            default_value_expression: String::new(),
            original_default_value_expression: String::new(),
            argument_index,
            removed: false,
        }
    }

    /// Sets both the current and the original default value.
    #[must_use]
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        self.original_default_value_expression.clone_from(&expression);
        self.default_value_expression = expression;
        self
    }

    #[must_use]
    pub fn has_default_value(&self) -> bool {
        !self.default_value_expression.is_empty()
    }

    #[must_use]
    pub fn has_original_default_value(&self) -> bool {
        !self.original_default_value_expression.is_empty()
    }

    /// The type as seen by the target language.
    #[must_use]
    pub fn effective_type(&self) -> &MetaType {
        self.modified_type.as_ref().unwrap_or(&self.meta_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CachedModifications {
    class: Option<ClassId>,
    modifications: Vec<FunctionModification>,
}

/// One callable: method, constructor, operator, signal or added function.
///
/// Three class roles are tracked separately: `owner_class` holds the
/// function in its list, `implementing_class` provides the code that runs
/// and `declaring_class` first introduced it in the hierarchy. Resolved
/// modifications are memoized per viewing class; changing the declaring or
/// implementing class clears the memo.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFunction {
    pub name: String,
    pub original_name: String,
    pub function_type: FunctionType,
    access: Access,
    original_access: Access,
    pub return_type: MetaType,
    /// Return type replaced by a ruleset type modification.
    pub modified_return_type: Option<MetaType>,
    pub arguments: Vec<MetaArgument>,
    pub attributes: FunctionAttributes,
    pub flags: FunctionFlags,
    pub is_constant: bool,
    pub is_explicit: bool,
    pub is_reverse_operator: bool,
    /// The stripped class operand of a free operator was a pointer.
    pub is_pointer_operator: bool,
    /// Signature as written in the source, before type resolution.
    pub unresolved_signature: String,
    pub added_function: Option<Arc<AddedFunction>>,
    /// The function entry of a ruleset-listed global function.
    pub type_entry: Option<Arc<TypeEntry>>,
    pub source_location: SourceLocation,
    owner_class: Option<ClassId>,
    implementing_class: Option<ClassId>,
    declaring_class: Option<ClassId>,
    modification_cache: RefCell<Vec<CachedModifications>>,
}

impl MetaFunction {
    #[must_use]
    pub fn new(name: impl Into<String>, function_type: FunctionType) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            function_type,
            access: Access::Public,
            original_access: Access::Public,
            return_type: MetaType::void(),
            modified_return_type: None,
            arguments: Vec::new(),
            attributes: FunctionAttributes::default(),
            flags: FunctionFlags::default(),
            is_constant: false,
            is_explicit: false,
            is_reverse_operator: false,
            is_pointer_operator: false,
            unresolved_signature: String::new(),
            added_function: None,
            type_entry: None,
            source_location: SourceLocation::default(),
            owner_class: None,
            implementing_class: None,
            declaring_class: None,
            modification_cache: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn access(&self) -> Access {
        self.access
    }

    /// Set the declared access; the pre-modification access follows.
    pub const fn set_access(&mut self, access: Access) {
        self.access = access;
        self.original_access = access;
    }

    /// Change the access from a modification, remembering the original.
    pub const fn modify_access(&mut self, access: Access) {
        self.access = access;
    }

    #[must_use]
    pub const fn original_access(&self) -> Access {
        self.original_access
    }

    #[must_use]
    pub fn was_public(&self) -> bool {
        self.original_access == Access::Public
    }

    #[must_use]
    pub fn was_protected(&self) -> bool {
        self.original_access == Access::Protected
    }

    #[must_use]
    pub fn was_private(&self) -> bool {
        self.original_access == Access::Private
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.access == Access::Private
    }

    #[must_use]
    pub const fn owner_class(&self) -> Option<ClassId> {
        self.owner_class
    }

    pub const fn set_owner_class(&mut self, class: Option<ClassId>) {
        self.owner_class = class;
    }

    #[must_use]
    pub const fn implementing_class(&self) -> Option<ClassId> {
        self.implementing_class
    }

    pub fn set_implementing_class(&mut self, class: Option<ClassId>) {
        if self.implementing_class != class {
            self.implementing_class = class;
            self.clear_modifications_cache();
        }
    }

    #[must_use]
    pub const fn declaring_class(&self) -> Option<ClassId> {
        self.declaring_class
    }

    pub fn set_declaring_class(&mut self, class: Option<ClassId>) {
        if self.declaring_class != class {
            self.declaring_class = class;
            self.clear_modifications_cache();
        }
    }

    /// Memoized modifications resolved against `class`, if any.
    #[must_use]
    pub fn cached_modifications(&self, class: Option<ClassId>) -> Option<Vec<FunctionModification>> {
        self.modification_cache
            .borrow()
            .iter()
            .find(|entry| entry.class == class)
            .map(|entry| entry.modifications.clone())
    }

    pub fn cache_modifications(&self, class: Option<ClassId>, modifications: Vec<FunctionModification>) {
        let mut cache = self.modification_cache.borrow_mut();
        cache.retain(|entry| entry.class != class);
        cache.push(CachedModifications { class, modifications });
    }

    pub fn clear_modifications_cache(&self) {
        self.modification_cache.borrow_mut().clear();
    }

    #[must_use]
    pub fn has_cached_modifications(&self) -> bool {
        !self.modification_cache.borrow().is_empty()
    }

    #[must_use]
    pub const fn is_in_global_scope(&self) -> bool {
        self.owner_class.is_none()
    }

    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        self.function_type.is_constructor()
    }

    /// A constructor callable without arguments.
    #[must_use]
    pub fn is_default_constructor(&self) -> bool {
        self.function_type == FunctionType::Constructor
            && self.arguments.first().is_none_or(MetaArgument::has_default_value)
    }

    #[must_use]
    pub fn is_copy_constructor(&self) -> bool {
        self.function_type == FunctionType::CopyConstructor
    }

    #[must_use]
    pub fn is_operator_overload(&self) -> bool {
        self.function_type.is_operator()
            || matches!(
                self.function_type,
                FunctionType::AssignmentOperator | FunctionType::MoveAssignmentOperator
            )
    }

    #[must_use]
    pub fn is_conversion_operator(&self) -> bool {
        self.function_type == FunctionType::ConversionOperator
    }

    #[must_use]
    pub fn is_comparison_operator(&self) -> bool {
        self.function_type == FunctionType::ComparisonOperator
    }

    #[must_use]
    pub fn is_signal(&self) -> bool {
        self.function_type == FunctionType::Signal
    }

    #[must_use]
    pub fn is_empty_function(&self) -> bool {
        self.function_type == FunctionType::Empty
    }

    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.attributes.virtual_cpp
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.attributes.is_abstract
    }

    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.attributes.is_static
    }

    #[must_use]
    pub const fn is_final_in_target_lang(&self) -> bool {
        self.attributes.final_in_target_lang
    }

    /// Injected by the ruleset.
    #[must_use]
    pub const fn is_user_added(&self) -> bool {
        self.added_function.is_some()
    }

    /// Declared by the ruleset to make an existing function visible.
    #[must_use]
    pub fn is_user_declared(&self) -> bool {
        self.added_function.as_ref().is_some_and(|f| f.is_declaration)
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.return_type.is_void()
    }

    #[must_use]
    pub fn uses_rvalue_references(&self) -> bool {
        matches!(
            self.function_type,
            FunctionType::MoveConstructor | FunctionType::MoveAssignmentOperator
        ) || self.return_type.reference_type() == ReferenceType::RValue
            || self
                .arguments
                .iter()
                .any(|a| a.meta_type.reference_type() == ReferenceType::RValue)
    }

    /// `originalName(type1,type2)const`, the key modifications match on.
    #[must_use]
    pub fn minimal_signature(&self) -> String {
        let arguments: Vec<String> = self
            .arguments
            .iter()
            .map(|a| a.meta_type.minimal_signature())
            .collect();
        let mut result = format!("{}({})", self.original_name, arguments.join(","));
        if self.is_constant {
            result.push_str("const");
        }
        normalized_signature(&result)
    }

    /// The resolved signature plus the as-written one when they differ.
    #[must_use]
    pub fn modification_signatures(&self) -> Vec<String> {
        let minimal = self.minimal_signature();
        let mut result = vec![minimal];
        if !self.unresolved_signature.is_empty() && self.unresolved_signature != result[0] {
            result.push(self.unresolved_signature.clone());
        }
        result
    }

    /// `name(const QString & text, int count)` with the current name.
    #[must_use]
    pub fn signature(&self) -> String {
        let arguments: Vec<String> = self
            .arguments
            .iter()
            .map(|a| {
                if a.name.is_empty() {
                    a.meta_type.cpp_signature()
                } else {
                    format!("{} {}", a.meta_type.cpp_signature(), a.name)
                }
            })
            .collect();
        let mut result = format!("{}({})", self.name, arguments.join(", "));
        if self.is_constant {
            result.push_str(" const");
        }
        result
    }

    /// Argument lists are equal when positions agree on the type name or
    /// both sides are defaulted, and extra trailing arguments are defaulted.
    #[must_use]
    pub fn compare_arguments(&self, other: &Self) -> ArgumentComparison {
        let (shorter, longer) = if self.arguments.len() < other.arguments.len() {
            (&self.arguments, &other.arguments)
        } else {
            (&other.arguments, &self.arguments)
        };
        for (i, long_arg) in longer.iter().enumerate() {
            let same = shorter.get(i).map_or_else(
                || long_arg.has_default_value(),
                |short_arg| {
                    short_arg.meta_type.name() == long_arg.meta_type.name()
                        || (short_arg.has_default_value() && long_arg.has_default_value())
                },
            );
            if !same {
                return ArgumentComparison::Different;
            }
        }
        if shorter.len() == longer.len() {
            ArgumentComparison::Equal
        } else {
            ArgumentComparison::DefaultValueOverload
        }
    }

    /// Arguments a caller must pass, not counting removed ones.
    #[must_use]
    pub fn actual_minimum_argument_count(&self) -> usize {
        let mut count = 0;
        for argument in &self.arguments {
            if argument.removed {
                continue;
            }
            if argument.has_default_value() {
                break;
            }
            count += 1;
        }
        count
    }

    /// Position of argument `index` among the non-removed arguments.
    #[must_use]
    pub fn actual_argument_index(&self, index: usize) -> usize {
        self.arguments
            .iter()
            .take(index)
            .filter(|a| !a.removed)
            .count()
    }

    /// Deep copy for inheritance into another class. The modification memo
    /// starts empty.
    #[must_use]
    pub fn copy(&self) -> Self {
        let copy = self.clone();
        copy.clear_modifications_cache();
        copy
    }
}

impl fmt::Display for MetaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.minimal_signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn int() -> MetaType {
        MetaType::new(Arc::new(TypeEntry::builtin_primitive("int")))
    }

    fn double() -> MetaType {
        MetaType::new(Arc::new(TypeEntry::builtin_primitive("double")))
    }

    fn function(name: &str, arguments: Vec<MetaArgument>) -> MetaFunction {
        let mut f = MetaFunction::new(name, FunctionType::Normal);
        f.arguments = arguments;
        f
    }

    #[rstest]
    #[case("operator+", 1, FunctionType::ArithmeticOperator)]
    #[case("operator*", 0, FunctionType::DereferenceOperator)]
    #[case("operator&", 0, FunctionType::ReferenceOperator)]
    #[case("operator&", 1, FunctionType::BitwiseOperator)]
    #[case("operator<<", 1, FunctionType::ShiftOperator)]
    #[case("operator==", 1, FunctionType::ComparisonOperator)]
    #[case("operator bool", 0, FunctionType::ConversionOperator)]
    fn operator_classification(#[case] name: &str, #[case] args: usize, #[case] expected: FunctionType) {
        assert_eq!(FunctionType::from_operator_name(name, args), Some(expected));
    }

    #[test]
    fn normal_names_are_not_operators() {
        assert_eq!(FunctionType::from_operator_name("operatorName", 0), None);
    }

    #[test]
    fn minimal_signature_uses_original_name_and_const() {
        let mut f = function("size", vec![MetaArgument::new("a", int(), 0)]);
        f.is_constant = true;
        f.name = "length".to_string();
        assert_eq!(f.minimal_signature(), "size(int)const");
    }

    #[test]
    fn equal_arguments_compare_equal() {
        let a = function("f", vec![MetaArgument::new("x", int(), 0)]);
        let b = function("f", vec![MetaArgument::new("y", int(), 0)]);
        assert_eq!(a.compare_arguments(&b), ArgumentComparison::Equal);
    }

    #[test]
    fn defaulted_trailing_argument_is_default_value_overload() {
        let a = function("f", vec![MetaArgument::new("x", int(), 0)]);
        let b = function(
            "f",
            vec![
                MetaArgument::new("x", int(), 0),
                MetaArgument::new("y", double(), 1).with_default("0.0"),
            ],
        );
        assert_eq!(a.compare_arguments(&b), ArgumentComparison::DefaultValueOverload);
        assert_eq!(b.compare_arguments(&a), ArgumentComparison::DefaultValueOverload);
    }

    #[test]
    fn differing_types_without_defaults_differ() {
        let a = function("f", vec![MetaArgument::new("x", int(), 0)]);
        let b = function("f", vec![MetaArgument::new("x", double(), 0)]);
        assert_eq!(a.compare_arguments(&b), ArgumentComparison::Different);
    }

    #[test]
    fn changing_class_roles_clears_memo() {
        let mut f = function("f", Vec::new());
        f.cache_modifications(Some(ClassId(0)), Vec::new());
        assert!(f.cached_modifications(Some(ClassId(0))).is_some());
        f.set_declaring_class(Some(ClassId(1)));
        assert!(f.cached_modifications(Some(ClassId(0))).is_none());

        f.cache_modifications(Some(ClassId(0)), Vec::new());
        f.set_implementing_class(Some(ClassId(2)));
        assert!(!f.has_cached_modifications());
    }

    #[test]
    fn removed_arguments_do_not_count() {
        let mut first = MetaArgument::new("a", int(), 0);
        first.removed = true;
        let f = function(
            "f",
            vec![
                first,
                MetaArgument::new("b", int(), 1),
                MetaArgument::new("c", int(), 2).with_default("1"),
            ],
        );
        assert_eq!(f.actual_argument_index(2), 1);
        assert_eq!(f.actual_minimum_argument_count(), 1);
    }

    #[test]
    fn modify_access_remembers_original() {
        let mut f = function("f", Vec::new());
        f.set_access(Access::Protected);
        f.modify_access(Access::Public);
        assert!(f.is_public());
        assert!(f.was_protected());
    }
}
