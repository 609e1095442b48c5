//! Functions injected by the ruleset.

use std::sync::Arc;

use mjb_meta::{ClassId, FunctionType, MetaArgument, MetaFunction, MetaType};
use mjb_typesystem::AddedFunction;

use crate::builder::MetaBuilder;
use crate::error::BuilderError;
use crate::modifications::{apply_default_value_modifications, fix_argument_names};

impl MetaBuilder {
    /// Add the ruleset's functions to `id`. Runs once per class; a type
    /// that does not translate aborts the build.
    pub(crate) fn fill_added_functions(&mut self, id: ClassId) -> Result<(), BuilderError> {
        if !self.added_functions_filled.insert(id) {
            return Ok(());
        }
        let added: Vec<Arc<AddedFunction>> = self.arena[id]
            .type_entry
            .complex()
            .map(|c| c.added_functions.clone())
            .unwrap_or_default();

        for added_function in &added {
            let function = self.traverse_added_function(added_function, Some(id))?;
            let class = &self.arena[id];
            if function.is_constructor() && !class.can_add_constructors() {
                tracing::warn!(
                    class = %class.name(),
                    function = %added_function.signature(),
                    "class does not accept added constructors"
                );
                continue;
            }
            self.arena[id].add_function(function);
        }
        Ok(())
    }

    /// Global functions added by the ruleset. An untranslatable type here
    /// aborts the build.
    pub(crate) fn traverse_global_added_functions(&mut self) -> Result<(), BuilderError> {
        let added = self.db.global_added_functions().to_vec();
        for added_function in &added {
            let function = self.traverse_added_function(added_function, None)?;
            self.global_functions.push(function);
        }
        Ok(())
    }

    pub(crate) fn traverse_added_function(
        &mut self,
        added: &Arc<AddedFunction>,
        class: Option<ClassId>,
    ) -> Result<MetaFunction, BuilderError> {
        let signature = added.signature();
        let return_type = match &added.return_type {
            None => MetaType::void(),
            Some(type_name) => self.translate_type_str(type_name, class).map_err(|error| {
                BuilderError::AddedFunctionReturnType {
                    signature: signature.clone(),
                    type_name: type_name.clone(),
                    reason: error.to_string(),
                }
            })?,
        };

        let mut function = MetaFunction::new(added.name.as_str(), FunctionType::Normal);
        function.added_function = Some(Arc::clone(added));
        function.set_access(added.access);
        function.is_constant = added.is_constant;
        function.attributes.is_static = added.is_static;
        function.return_type = return_type;

        let arguments = match added.arguments.as_slice() {
            [only] if only.type_name.trim() == "void" => &[][..],
            all => all,
        };
        for (index, argument) in arguments.iter().enumerate() {
            let meta_type = self
                .translate_type_str(&argument.type_name, class)
                .map_err(|error| BuilderError::AddedFunctionArgumentType {
                    signature: signature.clone(),
                    index: index + 1,
                    type_name: argument.type_name.clone(),
                    reason: error.to_string(),
                })?;
            let mut meta_argument =
                MetaArgument::new(argument.name.clone().unwrap_or_default(), meta_type, index);
            meta_argument.has_name = argument.name.is_some();
            if let Some(default_value) = &argument.default_value {
                meta_argument.default_value_expression.clone_from(default_value);
                meta_argument
                    .original_default_value_expression
                    .clone_from(default_value);
            }
            function.arguments.push(meta_argument);
        }

        if let Some(id) = class {
            self.classify_added_member(&mut function, id);
        }

        let modifications = self.function_modifications(&function, class);
        for argument in &mut function.arguments {
            if argument.default_value_expression.is_empty() {
                continue;
            }
            let fixed =
                self.fix_default_value(&argument.default_value_expression, &argument.meta_type, class);
            argument.default_value_expression = fixed;
        }
        apply_default_value_modifications(&mut function, &modifications);
        fix_argument_names(&mut function, &modifications);
        self.apply_function_modifications(&mut function, class);
        Ok(function)
    }

    /// Constructor and operator kinds of a function added to `id`.
    fn classify_added_member(&self, function: &mut MetaFunction, id: ClassId) {
        let class = &self.arena[id];
        let class_entry = class.entry_name();

        if function.name == class_entry {
            let copies = function.arguments.len() == 1
                && function.arguments[0].meta_type.type_entry().entry_name() == class_entry;
            function.function_type = if copies {
                FunctionType::CopyConstructor
            } else {
                FunctionType::Constructor
            };
            function.return_type = MetaType::void();
        } else if let Some(kind) =
            FunctionType::from_operator_name(&function.name, function.arguments.len())
        {
            function.function_type = kind;
        }

        if class.is_namespace() {
            function.attributes.is_static = true;
        }

        if !function.is_operator_overload() || function.function_type == FunctionType::CallOperator {
            return;
        }
        match function.arguments.len() {
            0 | 1 => {}
            2 if function.arguments[1].meta_type.type_entry().name() == class.name() => {
                function.is_reverse_operator = true;
                function.flags.operator_trailing_class_argument_removed = true;
                function.arguments.truncate(1);
            }
            2 => tracing::warn!(
                class = %class.name(),
                function = %function.minimal_signature(),
                "operator with two arguments is only accepted as a reverse operator"
            ),
            _ => tracing::warn!(
                class = %class.name(),
                function = %function.minimal_signature(),
                "operator overload takes at most two arguments"
            ),
        }
    }
}
