//! Lookup and application of ruleset function modifications.
//!
//! Modifications are resolved per (function, viewing class) and memoized on
//! the function. The memo is dropped whenever the function's declaring or
//! implementing class changes, so the merge never sees stale rule sets.

use std::collections::HashSet;

use mjb_meta::{ClassId, MetaFunction, UsagePattern};
use mjb_typesystem::{ArgumentModification, Finality, FunctionModification};

use crate::builder::MetaBuilder;

/// Argument modifications of `modifications` targeting position `index`
/// (0 is the return value, arguments start at 1).
pub(crate) fn argument_modifications(
    modifications: &[FunctionModification],
    index: usize,
) -> impl Iterator<Item = &ArgumentModification> {
    modifications
        .iter()
        .flat_map(|m| m.argument_mods.iter())
        .filter(move |am| am.index == index)
}

impl MetaBuilder {
    /// Every modification matching `function` as seen from `implementor`
    /// (the owner when `None`).
    pub(crate) fn function_modifications(
        &self,
        function: &MetaFunction,
        implementor: Option<ClassId>,
    ) -> Vec<FunctionModification> {
        if let Some(added) = &function.added_function {
            return added.modifications.clone();
        }
        let key = implementor.or_else(|| function.owner_class());
        if let Some(cached) = function.cached_modifications(key) {
            return cached;
        }

        let signatures = function.modification_signatures();
        let result = match key {
            None => self.db.global_function_modifications(&signatures),
            Some(start) => {
                let mut result = Vec::new();
                let mut visited = HashSet::new();
                let mut class = Some(start);
                while let Some(id) = class {
                    if !visited.insert(id) {
                        break;
                    }
                    let meta_class = &self.arena[id];
                    if let Some(complex) = meta_class.type_entry.complex() {
                        result.extend(complex.function_modifications_for(&signatures));
                    }
                    result.extend(
                        self.registry
                            .function_modifications_for(meta_class.name(), &signatures),
                    );
                    if Some(id) == function.implementing_class() && !result.is_empty() {
                        break;
                    }
                    class = meta_class.base_class().filter(|next| *next != id);
                }
                result
            }
        };
        function.cache_modifications(key, result.clone());
        result
    }

    pub(crate) fn is_modified_removed(&self, function: &MetaFunction, class: Option<ClassId>) -> bool {
        self.function_modifications(function, class)
            .iter()
            .any(|m| m.removed)
    }

    /// Rename, access, finality and deprecation from the modifications.
    pub(crate) fn apply_function_modifications(&self, function: &mut MetaFunction, class: Option<ClassId>) {
        for modification in self.function_modifications(function, class) {
            if let Some(name) = modification.renamed_to() {
                function.name = name.to_string();
            }
            if let Some(access) = modification.access {
                function.modify_access(access);
            }
            match modification.finality {
                Some(Finality::Final) => function.attributes.final_in_target_lang = true,
                Some(Finality::NonFinal) => function.attributes.final_in_target_lang = false,
                None => {}
            }
            if modification.deprecated {
                function.attributes.deprecated = true;
            }
        }
    }

    /// Substitute the types named by argument modifications and mark
    /// removed arguments.
    pub(crate) fn apply_type_modifications(&mut self, function: &mut MetaFunction, class: Option<ClassId>) {
        let modifications = self.function_modifications(function, class);
        for am in modifications.iter().flat_map(|m| m.argument_mods.iter()) {
            if am.removed && am.index > 0 {
                if let Some(argument) = function.arguments.get_mut(am.index - 1) {
                    argument.removed = true;
                }
            }
            let Some(type_name) = &am.modified_type else {
                continue;
            };
            match self.translate_type_str(type_name, class) {
                Ok(meta_type) if am.index == 0 => function.modified_return_type = Some(meta_type),
                Ok(meta_type) => {
                    if let Some(argument) = function.arguments.get_mut(am.index - 1) {
                        argument.modified_type = Some(meta_type);
                    }
                }
                Err(error) => tracing::warn!(
                    function = %function.minimal_signature(),
                    index = am.index,
                    modified_type = %type_name,
                    %error,
                    "unable to translate modified type"
                ),
            }
        }
    }
}

/// Remove or replace default values as the modifications say.
pub(crate) fn apply_default_value_modifications(
    function: &mut MetaFunction,
    modifications: &[FunctionModification],
) {
    for argument in &mut function.arguments {
        for am in argument_modifications(modifications, argument.argument_index + 1) {
            if am.remove_default_expression {
                argument.default_value_expression.clear();
            }
            if let Some(replacement) = &am.replaced_default_expression {
                argument.default_value_expression.clone_from(replacement);
            }
        }
    }
}

/// Names from rename modifications, `arg__N` for unnamed arguments.
pub(crate) fn fix_argument_names(function: &mut MetaFunction, modifications: &[FunctionModification]) {
    for argument in &mut function.arguments {
        let index = argument.argument_index + 1;
        if let Some(name) = argument_modifications(modifications, index).find_map(|am| am.rename_to.clone()) {
            argument.name = name;
            argument.has_name = true;
        } else if argument.name.is_empty() {
            argument.name = format!("arg__{index}");
            argument.has_name = false;
        }
    }
}

/// Expose single-indirection pointer arguments marked as arrays.
pub(crate) fn apply_array_modifications(function: &mut MetaFunction, modifications: &[FunctionModification]) {
    let signature = function.minimal_signature();
    for am in modifications.iter().flat_map(|m| m.argument_mods.iter()) {
        if !am.array || am.index == 0 {
            continue;
        }
        let Some(argument) = function.arguments.get_mut(am.index - 1) else {
            continue;
        };
        if argument.meta_type.indirections().len() == 1 {
            argument.meta_type.set_usage_pattern(UsagePattern::NativePointerAsArray);
        } else {
            tracing::warn!(
                function = %signature,
                index = am.index,
                "array modification ignored: argument is not a single pointer"
            );
        }
    }
}
