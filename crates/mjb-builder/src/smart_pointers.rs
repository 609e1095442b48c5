//! Completing smart-pointer classes with the accessors their entries name.

use std::sync::Arc;

use mjb_codemodel::{Access, Indirection};
use mjb_meta::{ClassId, FunctionType, MetaArgument, MetaClass, MetaFunction, MetaType};
use mjb_typesystem::{EntryKind, SmartPointerSpec, TypeEntry};

use crate::builder::MetaBuilder;

const VALUE_CHECK_OPERATOR: &str = "operator bool";

impl MetaBuilder {
    /// Make sure every smart-pointer entry has a class carrying its
    /// constructors, reset, getter and check methods, synthesizing whatever
    /// the headers did not declare.
    pub(crate) fn fix_smart_pointers(&mut self) {
        for entry in self.db.smart_pointer_types() {
            let Some(spec) = entry.smart_pointer_spec().cloned() else {
                continue;
            };
            let id = match self.arena.find_by_entry(&self.smart_pointers, &entry) {
                Some(id) => id,
                None => self.synthesize_smart_pointer_class(&entry),
            };
            self.complete_smart_pointer(id, &spec);
        }
    }

    fn synthesize_smart_pointer_class(&mut self, entry: &Arc<TypeEntry>) -> ClassId {
        tracing::warn!(smart_pointer = %entry.name(), "synthesizing smart pointer class");
        let mut class = MetaClass::new(Arc::clone(entry));
        class.template_arguments = vec![Arc::new(TypeEntry::new(
            "T",
            EntryKind::TemplateArgument { ordinal: 0 },
        ))];
        class.flags.inheritance_done = true;
        class.flags.functions_fixed = true;
        let scope = entry.scope();
        if !scope.is_empty() {
            match self.find_any_class(scope) {
                Some(enclosing) => class.enclosing_class = Some(enclosing),
                None => tracing::warn!(
                    smart_pointer = %entry.name(),
                    scope = %scope,
                    "enclosing scope of smart pointer not found"
                ),
            }
        }
        let id = self.alloc_class(class);
        self.add_meta_class(id);
        if let Some(enclosing) = self.arena[id].enclosing_class {
            self.add_inner_class(enclosing, id);
        }
        id
    }

    fn primitive_type(&self, name: &str) -> MetaType {
        let entry = self
            .db
            .find_primitive_type(name)
            .unwrap_or_else(|| Arc::new(TypeEntry::builtin_primitive(name)));
        MetaType::new(entry)
    }

    fn complete_smart_pointer(&mut self, id: ClassId, spec: &SmartPointerSpec) {
        let pointee_entry = self.arena[id].template_arguments.first().cloned().unwrap_or_else(|| {
            Arc::new(TypeEntry::new("T", EntryKind::TemplateArgument { ordinal: 0 }))
        });
        let mut pointer = MetaType::new(pointee_entry);
        pointer.add_indirection(Indirection::Pointer);
        pointer.decide_usage_pattern();
        let class_entry_name = self.arena[id].entry_name().to_string();

        let class = &self.arena[id];
        let has_pointer_constructor = class
            .constructors()
            .any(|f| f.arguments.len() == 1 && f.arguments[0].meta_type.is_template_argument());
        let has_default_constructor = class.constructors().any(MetaFunction::is_default_constructor);

        if !has_pointer_constructor {
            let mut constructor = MetaFunction::new(class_entry_name.as_str(), FunctionType::Constructor);
            constructor
                .arguments
                .push(MetaArgument::new("pointee", pointer.clone(), 0));
            self.add_synthesized_method(id, constructor);
        }
        if !has_default_constructor {
            let constructor = MetaFunction::new(class_entry_name.as_str(), FunctionType::Constructor);
            self.add_synthesized_method(id, constructor);
        }

        if let Some(reset) = &spec.reset_method {
            let class = &self.arena[id];
            let has_pointer_reset = class.functions_named(reset).any(|f| f.arguments.len() == 1);
            let has_plain_reset = class.functions_named(reset).any(|f| f.arguments.is_empty());
            if !has_pointer_reset {
                let mut function = MetaFunction::new(reset.as_str(), FunctionType::Normal);
                function
                    .arguments
                    .push(MetaArgument::new("pointee", pointer.clone(), 0));
                self.add_synthesized_method(id, function);
            }
            if !has_plain_reset {
                self.add_synthesized_method(id, MetaFunction::new(reset.as_str(), FunctionType::Normal));
            }
        }

        if !spec.getter.is_empty() && !self.arena[id].has_function(&spec.getter) {
            let mut getter = MetaFunction::new(spec.getter.as_str(), FunctionType::Normal);
            getter.return_type = pointer;
            getter.is_constant = true;
            self.add_synthesized_method(id, getter);
        }

        if let Some(name) = &spec.ref_count_method {
            if !self.arena[id].has_function(name) {
                let mut function = MetaFunction::new(name.as_str(), FunctionType::Normal);
                function.return_type = self.primitive_type("int");
                function.is_constant = true;
                self.add_synthesized_method(id, function);
            }
        }

        for name in [&spec.value_check_method, &spec.null_check_method]
            .into_iter()
            .flatten()
        {
            if self.arena[id].has_function(name) {
                continue;
            }
            let function_type = if name == VALUE_CHECK_OPERATOR {
                FunctionType::ConversionOperator
            } else {
                FunctionType::Normal
            };
            let mut function = MetaFunction::new(name.as_str(), function_type);
            function.return_type = self.primitive_type("bool");
            function.is_constant = true;
            self.add_synthesized_method(id, function);
        }
    }

    fn add_synthesized_method(&mut self, id: ClassId, mut function: MetaFunction) {
        function.set_access(Access::Public);
        function.attributes.added_method = true;
        tracing::warn!(
            class = %self.arena[id].name(),
            function = %function.minimal_signature(),
            "Synthesizing method"
        );
        self.arena[id].add_function(function);
    }
}
