//! Free operators: global, namespace-level and friend declarations are
//! attached to the class of one of their operands.

use mjb_codemodel::{Access, ClassItem, CodeModel, FunctionItem, NamespaceItem};
use mjb_meta::{ClassId, FunctionType, MetaFunction, MetaType};

use crate::builder::MetaBuilder;
use crate::reject::{RejectCategory, RejectReason};

/// An operator declaration and the class or namespace whose scope its types
/// resolve in.
struct OperatorSite {
    item: FunctionItem,
    scope: Option<ClassId>,
}

fn join_scope(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}::{name}")
    }
}

impl MetaBuilder {
    pub(crate) fn traverse_free_operators(&mut self, model: &CodeModel) {
        let mut sites = Vec::new();
        self.collect_namespace_operators(&model.global, "", None, &mut sites);

        for site in sites {
            let is_stream = matches!(site.item.name.as_str(), "operator<<" | "operator>>");
            if is_stream && self.traverse_stream_operator(&site.item, site.scope) {
                continue;
            }
            self.traverse_operator_function(&site.item, site.scope);
        }
    }

    fn collect_namespace_operators(
        &self,
        namespace: &NamespaceItem,
        prefix: &str,
        scope: Option<ClassId>,
        sites: &mut Vec<OperatorSite>,
    ) {
        sites.extend(
            namespace
                .scope
                .functions
                .iter()
                .filter(|f| f.is_operator() && f.access == Access::Public)
                .map(|f| OperatorSite {
                    item: f.clone(),
                    scope,
                }),
        );
        for class in &namespace.scope.classes {
            self.collect_friend_operators(class, prefix, sites);
        }
        for nested in &namespace.namespaces {
            if nested.name.is_empty() {
                continue;
            }
            let qualified = join_scope(prefix, &nested.name);
            let Some(&id) = self.item_classes.get(&qualified) else {
                continue;
            };
            self.collect_namespace_operators(nested, &qualified, Some(id), sites);
        }
    }

    fn collect_friend_operators(&self, class: &ClassItem, prefix: &str, sites: &mut Vec<OperatorSite>) {
        let qualified = join_scope(prefix, class.base_name());
        let Some(&id) = self.item_classes.get(&qualified) else {
            return;
        };
        sites.extend(
            class
                .scope
                .functions
                .iter()
                .filter(|f| f.is_friend && f.is_operator())
                .map(|f| OperatorSite {
                    item: f.clone(),
                    scope: Some(id),
                }),
        );
        for nested in &class.scope.classes {
            self.collect_friend_operators(nested, &qualified, sites);
        }
    }

    /// The class whose entry is the (pointer-stripped) type of `meta_type`.
    pub(crate) fn class_of_type(&self, meta_type: &MetaType) -> Option<ClassId> {
        let entry = meta_type.type_entry();
        self.classes
            .iter()
            .chain(&self.templates)
            .chain(&self.smart_pointers)
            .copied()
            .find(|id| self.arena[*id].type_entry.name() == entry.name())
    }

    fn traverse_free_function(&mut self, item: &FunctionItem, scope: Option<ClassId>) -> Option<MetaFunction> {
        let mut item = item.clone();
        item.is_friend = false;
        self.traverse_function(&item, scope)
    }

    /// `stream << value` / `stream >> value` with a stream class on the left.
    fn traverse_stream_operator(&mut self, item: &FunctionItem, scope: Option<ClassId>) -> bool {
        if item.arguments.len() != 2 {
            return false;
        }
        let Some(mut function) = self.traverse_free_function(item, scope) else {
            return false;
        };
        if function.arguments.len() != 2 {
            return false;
        }
        let Some(stream) = self.class_of_type(&function.arguments[0].meta_type) else {
            return false;
        };
        if !self.arena[stream].is_stream() {
            return false;
        }
        let Some(streamed) = self.class_of_type(&function.arguments[1].meta_type) else {
            return false;
        };

        let stream_generates = self.arena[stream].type_entry.generate_code();
        let owner = if stream_generates {
            function.arguments.remove(0);
            stream
        } else {
            function.arguments.pop();
            function.is_reverse_operator = true;
            streamed
        };
        reindex(&mut function);
        function.attributes.final_in_target_lang = true;
        function.attributes.is_static = false;
        function.set_access(Access::Public);

        tracing::debug!(
            class = %self.arena[owner].name(),
            operator = %function.minimal_signature(),
            "stream operator attached"
        );
        self.attach_operator(function, owner);
        true
    }

    fn traverse_operator_function(&mut self, item: &FunctionItem, scope: Option<ClassId>) {
        let Some(mut function) = self.traverse_free_function(item, scope) else {
            return;
        };
        if function.arguments.is_empty() {
            return;
        }

        let unary = function.arguments.len() == 1;
        let first = self.class_of_type(&function.arguments[0].meta_type);
        let second = function
            .arguments
            .get(1)
            .and_then(|a| self.class_of_type(&a.meta_type));
        let returned = self.class_of_type(&function.return_type);

        let first_usable = first.filter(|id| self.arena[*id].type_entry.generate_code());
        let (owner, reverse) = if unary {
            (first, false)
        } else if first_usable.is_none() {
            (second, true)
        } else if second.is_some() && returned == second && first != second {
            (second, true)
        } else {
            (first, false)
        };

        let Some(owner) = owner else {
            let signature = function.minimal_signature();
            self.reject(
                RejectCategory::Functions,
                RejectReason::UnmatchedOperator,
                signature,
                "unable to determine the class of the operator",
            );
            return;
        };

        let removed = if reverse {
            function.is_reverse_operator = true;
            function.flags.operator_trailing_class_argument_removed = true;
            function.arguments.remove(1)
        } else {
            function.flags.operator_leading_class_argument_removed = true;
            function.arguments.remove(0)
        };
        function.flags.operator_class_argument_by_value = removed.meta_type.pass_by_value();
        function.is_pointer_operator = !removed.meta_type.indirections().is_empty();
        reindex(&mut function);
        function.attributes.final_in_target_lang = true;
        function.attributes.is_static = false;
        function.set_access(Access::Public);

        self.attach_operator(function, owner);
    }

    fn attach_operator(&mut self, mut function: MetaFunction, owner: ClassId) {
        if function.function_type.is_operator() {
            if let Some(kind) =
                FunctionType::from_operator_name(&function.original_name, function.arguments.len())
            {
                function.function_type = kind;
            }
        }
        let signature = function.minimal_signature();
        let duplicate = self.arena[owner].functions().iter().any(|f| {
            f.minimal_signature() == signature && f.is_reverse_operator == function.is_reverse_operator
        });
        if duplicate {
            return;
        }
        self.apply_function_modifications(&mut function, Some(owner));
        self.arena[owner].add_function(function);
    }
}

fn reindex(function: &mut MetaFunction) {
    for (index, argument) in function.arguments.iter_mut().enumerate() {
        argument.argument_index = index;
    }
}
