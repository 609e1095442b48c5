//! Member and global function traversal.

use mjb_codemodel::{Access, ArgumentItem, FunctionItem, FunctionKind, ReferenceType, ScopeItem};
use mjb_meta::{ClassId, FunctionType, MetaArgument, MetaFunction, MetaType};
use mjb_typesystem::{EntryKind, normalized_signature};

use crate::builder::MetaBuilder;
use crate::modifications::{
    apply_array_modifications, apply_default_value_modifications, fix_argument_names,
};
use crate::reject::{RejectCategory, RejectReason};

/// Helpers of enum-introspection macros at namespace or global scope.
const ENUM_HELPERS: [&str; 2] = ["qt_getEnumMetaObject", "qt_getEnumName"];

/// Name of the trailing marker argument of private signals.
const PRIVATE_SIGNAL_MARKER: &str = "QPrivateSignal";

fn function_type_of(item: &FunctionItem) -> FunctionType {
    match item.kind {
        FunctionKind::Constructor => FunctionType::Constructor,
        FunctionKind::CopyConstructor => FunctionType::CopyConstructor,
        FunctionKind::MoveConstructor => FunctionType::MoveConstructor,
        FunctionKind::Destructor => FunctionType::Destructor,
        FunctionKind::Signal => FunctionType::Signal,
        FunctionKind::Slot => FunctionType::Slot,
        FunctionKind::Normal if item.is_operator() => {
            FunctionType::from_operator_name(&item.name, item.arguments.len())
                .unwrap_or(FunctionType::Normal)
        }
        FunctionKind::Normal => FunctionType::Normal,
    }
}

const fn is_constructor_kind(kind: FunctionKind) -> bool {
    matches!(
        kind,
        FunctionKind::Constructor | FunctionKind::CopyConstructor | FunctionKind::MoveConstructor
    )
}

/// Callable without arguments.
fn is_default_constructor_item(item: &FunctionItem) -> bool {
    item.kind == FunctionKind::Constructor
        && item
            .arguments
            .iter()
            .all(|a| !a.default_value_expression.is_empty() || a.type_info.is_void())
}

/// `name(type1,type2)const` as written in the source.
fn unresolved_signature(item: &FunctionItem) -> String {
    let arguments: Vec<String> = item
        .arguments
        .iter()
        .map(|a| a.type_info.to_string())
        .collect();
    let constness = if item.is_constant { "const" } else { "" };
    normalized_signature(&format!("{}({}){constness}", item.name, arguments.join(",")))
}

impl MetaBuilder {
    /// Excluded under the event-system extension mode.
    fn is_extension_helper(&self, name: &str, current: Option<ClassId>) -> bool {
        if !self.config.builder.extension_mode {
            return false;
        }
        match current {
            None => ENUM_HELPERS.contains(&name),
            Some(id) => {
                let class = &self.arena[id];
                if class.is_namespace() && ENUM_HELPERS.contains(&name) {
                    return true;
                }
                name == "qt_check_for_QGADGET_macro"
                    || name.starts_with("qt_meta")
                    || (name == "metaObject" && class.name() != "QObject")
            }
        }
    }

    fn record_deleted_function(&mut self, item: &FunctionItem, current: Option<ClassId>) {
        let Some(id) = current else {
            return;
        };
        let flags = &mut self.arena[id].flags;
        match item.kind {
            FunctionKind::Constructor if is_default_constructor_item(item) => {
                flags.has_deleted_default_constructor = true;
            }
            FunctionKind::CopyConstructor => flags.has_deleted_copy_constructor = true,
            _ => {}
        }
    }

    /// Translate one declaration. `None` means it was skipped or rejected;
    /// rejections are logged.
    pub(crate) fn traverse_function(
        &mut self,
        item: &FunctionItem,
        current: Option<ClassId>,
    ) -> Option<MetaFunction> {
        if !item.template_parameters.is_empty() || item.is_friend {
            return None;
        }
        if self.is_extension_helper(&item.name, current) {
            return None;
        }
        if item.is_deleted {
            self.record_deleted_function(item, current);
            return None;
        }

        let class_name = self.class_name(current);
        let unresolved = unresolved_signature(item);
        let qualified_signature = if class_name.is_empty() {
            unresolved.clone()
        } else {
            format!("{class_name}::{unresolved}")
        };

        for candidate in [item.name.as_str(), unresolved.as_str()] {
            if let Some(reason) = self.db.is_function_rejected(&class_name, candidate) {
                self.reject(
                    RejectCategory::Functions,
                    RejectReason::GenerationDisabled,
                    qualified_signature,
                    reason,
                );
                return None;
            }
        }
        if self.config.builder.skip_deprecated && item.is_deprecated {
            self.reject(
                RejectCategory::Functions,
                RejectReason::Deprecated,
                qualified_signature,
                "",
            );
            return None;
        }

        let function_type = function_type_of(item);
        let mut function = MetaFunction::new(item.name.as_str(), function_type);
        function.unresolved_signature = unresolved;
        function.set_access(item.access);
        function.source_location = item.location.clone();
        function.is_constant = item.is_constant;
        function.is_explicit = item.is_explicit;
        function.attributes.virtual_cpp = item.is_virtual || item.is_override || item.is_abstract;
        function.attributes.overridden_cpp = item.is_override;
        function.attributes.final_cpp = item.is_final;
        function.attributes.is_abstract = item.is_abstract;
        function.attributes.is_static = item.is_static
            || current.is_some_and(|id| self.arena[id].is_namespace());
        function.attributes.deprecated = item.is_deprecated;

        if function_type == FunctionType::Destructor {
            return Some(function);
        }
        if function.is_constructor() {
            if let Some(id) = current {
                function.name = self.arena[id].entry_name().to_string();
            }
        } else if function_type == FunctionType::ConversionOperator {
            let target = item.name.trim_start_matches("operator").trim();
            match self.translate_type_str(target, current) {
                Ok(meta_type) => function.return_type = meta_type,
                Err(error) => {
                    self.reject(
                        RejectCategory::Functions,
                        RejectReason::UnmatchedReturnType,
                        qualified_signature,
                        error.to_string(),
                    );
                    return None;
                }
            }
        } else {
            let return_text = item.return_type.to_string();
            if let Some(reason) = self.db.is_return_type_rejected(&class_name, &return_text) {
                self.reject(
                    RejectCategory::Functions,
                    RejectReason::GenerationDisabled,
                    qualified_signature,
                    reason,
                );
                return None;
            }
            match self.translate_type(&item.return_type, current) {
                Ok(meta_type) => function.return_type = meta_type,
                Err(error) => {
                    self.reject(
                        RejectCategory::Functions,
                        RejectReason::UnmatchedReturnType,
                        qualified_signature,
                        format!("unmatched return type '{return_text}': {error}"),
                    );
                    return None;
                }
            }
        }

        let mut arguments: &[ArgumentItem] = &item.arguments;
        if let [only] = arguments {
            if only.type_info.is_void() {
                arguments = &[];
            }
        }
        if self.config.builder.extension_mode {
            if let Some((last, rest)) = arguments.split_last() {
                if last.type_info.name() == PRIVATE_SIGNAL_MARKER {
                    function.flags.private_signal = true;
                    arguments = rest;
                }
            }
        }

        for (index, argument) in arguments.iter().enumerate() {
            let type_text = argument.type_info.to_string();
            if let Some(reason) = self.db.is_argument_type_rejected(&class_name, &type_text) {
                self.reject(
                    RejectCategory::Functions,
                    RejectReason::GenerationDisabled,
                    qualified_signature,
                    reason,
                );
                return None;
            }
            match self.translate_type(&argument.type_info, current) {
                Ok(meta_type) => {
                    let mut meta_argument =
                        MetaArgument::new(argument.name.as_str(), meta_type, index);
                    meta_argument.has_name = !argument.name.is_empty();
                    meta_argument
                        .original_default_value_expression
                        .clone_from(&argument.default_value_expression);
                    meta_argument
                        .default_value_expression
                        .clone_from(&argument.default_value_expression);
                    function.arguments.push(meta_argument);
                }
                Err(error)
                    if !argument.default_value_expression.is_empty() && !item.is_virtual =>
                {
                    tracing::warn!(
                        function = %qualified_signature,
                        argument = index + 1,
                        type_name = %type_text,
                        %error,
                        "stripping argument with default value: unable to translate type"
                    );
                    break;
                }
                Err(error) => {
                    self.reject(
                        RejectCategory::Functions,
                        RejectReason::UnmatchedArgumentType,
                        qualified_signature,
                        format!("unmatched type '{type_text}' in parameter #{}: {error}", index + 1),
                    );
                    return None;
                }
            }
        }
        if item.is_variadic {
            if let Some(entry) = self.db.find_type("...").filter(|e| e.is_varargs()) {
                let index = function.arguments.len();
                function
                    .arguments
                    .push(MetaArgument::new("", MetaType::new(entry), index));
            }
        }

        if function_type == FunctionType::AssignmentOperator {
            let moves = function.arguments.first().is_some_and(|a| {
                a.meta_type.reference_type() == ReferenceType::RValue
                    && current.is_some_and(|id| {
                        a.meta_type.type_entry().name() == self.arena[id].name()
                    })
            });
            if moves {
                function.function_type = FunctionType::MoveAssignmentOperator;
            }
        }

        let modifications = self.function_modifications(&function, current);
        for argument in &mut function.arguments {
            if argument.default_value_expression.is_empty() {
                continue;
            }
            let fixed = self.fix_default_value(
                &argument.default_value_expression,
                &argument.meta_type,
                current,
            );
            argument.default_value_expression = fixed;
        }
        apply_default_value_modifications(&mut function, &modifications);
        fix_argument_names(&mut function, &modifications);
        apply_array_modifications(&mut function, &modifications);

        Some(function)
    }

    /// Functions of a class or namespace body. Destructors and constructors
    /// feed the class facts.
    pub(crate) fn traverse_functions(&mut self, scope: &ScopeItem, id: ClassId) {
        for item in &scope.functions {
            if item.is_friend {
                continue;
            }
            let Some(mut function) = self.traverse_function(item, Some(id)) else {
                if is_constructor_kind(item.kind) && !item.is_deleted && !item.is_friend {
                    let flags = &mut self.arena[id].flags;
                    flags.has_rejected_constructor = true;
                    if is_default_constructor_item(item) {
                        flags.has_rejected_default_constructor = true;
                    }
                }
                continue;
            };

            let class = &mut self.arena[id];
            if function.function_type == FunctionType::Destructor {
                match function.access() {
                    Access::Private => class.flags.has_private_destructor = true,
                    Access::Protected => class.flags.has_protected_destructor = true,
                    Access::Public => {}
                }
                if function.is_virtual() {
                    class.set_has_virtual_destructor(true);
                }
                if function.is_private() && !class.flags.has_non_private_constructor {
                    class.flags.final_in_target_lang = true;
                }
                continue;
            }

            if function.is_constructor() {
                if function.is_private() {
                    class.flags.has_private_constructor = true;
                    if function.function_type == FunctionType::CopyConstructor {
                        class.flags.has_private_copy_constructor = true;
                    }
                    if !class.flags.has_non_private_constructor {
                        class.flags.final_in_target_lang = true;
                    }
                } else {
                    class.flags.final_in_target_lang = false;
                }
            }

            self.apply_function_modifications(&mut function, Some(id));
            self.arena[id].add_function(function);
        }
    }

    /// Public non-operator functions at global scope that the ruleset lists
    /// by name and signature.
    pub(crate) fn traverse_global_functions(&mut self, functions: &[FunctionItem]) {
        for item in functions {
            if item.is_operator() || item.access != Access::Public {
                continue;
            }
            let Some(entry) = self.db.find_function_type(&item.name) else {
                continue;
            };
            if !entry.generate_code() {
                continue;
            }
            let Some(mut function) = self.traverse_function(item, None) else {
                continue;
            };
            let EntryKind::Function { signatures } = entry.kind() else {
                continue;
            };
            let minimal = function.minimal_signature();
            if !signatures.iter().any(|s| normalized_signature(s) == minimal) {
                tracing::debug!(function = %minimal, "global function signature not listed");
                continue;
            }
            function.type_entry = Some(entry);
            self.apply_function_modifications(&mut function, None);
            self.apply_type_modifications(&mut function, None);
            self.global_functions.push(function);
        }
    }
}
