//! Merging inherited functions into each class.
//!
//! Runs bases first. A base function is copied into the subclass unless the
//! subclass already declares something under the same name; matching
//! declarations pick up override and finality facts from the base.

use mjb_meta::{ArgumentComparison, ClassId, FunctionType, MetaFunction};

use crate::builder::MetaBuilder;

impl MetaBuilder {
    pub(crate) fn fix_functions(&mut self, id: ClassId) {
        if self.arena[id].flags.functions_fixed {
            return;
        }
        self.arena[id].flags.functions_fixed = true;
        self.add_using_constructors(id);

        let class_name = self.arena[id].name().to_string();
        let mut functions = self.arena[id].take_functions();
        for function in &functions {
            function.clear_modifications_cache();
        }
        let kept: Vec<usize> = (0..functions.len())
            .filter(|&i| !self.is_modified_removed(&functions[i], Some(id)))
            .collect();

        let bases = if self.arena[id].flags.inheritance_done {
            self.arena[id].base_classes().to_vec()
        } else {
            Vec::new()
        };

        let mut to_add: Vec<MetaFunction> = Vec::new();
        for base in bases {
            if base == id {
                continue;
            }
            self.fix_functions(base);
            if self.arena[base].flags.final_in_target_lang {
                tracing::warn!(
                    class = %class_name,
                    base = %self.arena[base].name(),
                    "base class is final in the target language; making it non-final"
                );
                self.arena[base].flags.final_in_target_lang = false;
            }

            let inherited: Vec<MetaFunction> = self.arena[base]
                .inheritable_functions()
                .filter(|f| !f.is_comparison_operator())
                .cloned()
                .collect();
            for base_function in inherited {
                if self.is_modified_removed(&base_function, Some(base)) {
                    continue;
                }
                if base_function.is_user_added() && base_function.declaring_class() != Some(id) {
                    continue;
                }

                let mut add = !base_function.function_type.is_special_member();
                for &index in &kept {
                    let function = &mut functions[index];
                    if function.name == base_function.name {
                        add = false;
                        if function.compare_arguments(&base_function) == ArgumentComparison::Equal {
                            merge_matching(&class_name, function, &base_function);
                        }
                    }
                    if function.original_name == base_function.original_name
                        && !base_function.is_signal()
                    {
                        add = false;
                    }
                }

                if add {
                    let signature = base_function.minimal_signature();
                    if !to_add.iter().any(|f| f.minimal_signature() == signature) {
                        let mut copy = base_function.copy();
                        copy.attributes.added_method = true;
                        to_add.push(copy);
                    }
                }
            }
        }
        functions.extend(to_add);

        let mut has_private_constructor = false;
        let mut has_public_constructor = false;
        for function in &mut functions {
            let modifications = self.function_modifications(function, Some(id));
            if let Some(name) = modifications.iter().rev().find_map(|m| m.renamed_to()) {
                function.name = name.to_string();
            }
            self.apply_type_modifications(function, Some(id));

            if function.is_abstract() {
                let flags = &mut self.arena[id].flags;
                flags.is_abstract = true;
                flags.final_in_target_lang = false;
            }
            if function.is_constructor() {
                if function.is_private() {
                    has_private_constructor = true;
                } else {
                    has_public_constructor = true;
                }
            }
        }
        if has_private_constructor && !has_public_constructor {
            let flags = &mut self.arena[id].flags;
            flags.is_abstract = true;
            flags.final_in_target_lang = false;
        }

        tracing::trace!(class = %class_name, functions = functions.len(), "functions fixed");
        self.arena[id].set_functions(functions);
    }

    /// Constructors imported with `using Base::Base;` when the class declares
    /// none of its own.
    fn add_using_constructors(&mut self, id: ClassId) {
        let class = &self.arena[id];
        if class.has_constructors() || !class.has_using_members() {
            return;
        }
        let entry_name = class.entry_name().to_string();
        let imports: Vec<ClassId> = class
            .using_members
            .iter()
            .filter(|um| self.arena[um.base_class].entry_name() == um.member_name)
            .map(|um| um.base_class)
            .collect();

        for base in imports {
            let constructors: Vec<MetaFunction> = self.arena[base]
                .implemented_functions()
                .filter(|f| f.function_type == FunctionType::Constructor && !f.is_private())
                .cloned()
                .collect();
            for constructor in constructors {
                let mut copy = constructor.copy();
                copy.name.clone_from(&entry_name);
                copy.original_name.clone_from(&entry_name);
                copy.attributes.added_method = true;
                self.arena[id].add_function(copy);
            }
        }
    }
}

/// `function` redeclares `base_function` with the same arguments.
fn merge_matching(class_name: &str, function: &mut MetaFunction, base_function: &MetaFunction) {
    if base_function.is_virtual() && !function.attributes.overridden_cpp && !function.attributes.final_cpp {
        function.attributes.overridden_cpp = true;
        function.attributes.virtual_cpp = true;
    }
    if !base_function.is_final_in_target_lang() && function.is_final_in_target_lang() {
        function.attributes.final_in_target_lang = false;
    }
    if function.access() != base_function.access() {
        tracing::warn!(
            class = %class_name,
            function = %function.minimal_signature(),
            from = %base_function.access(),
            to = %function.access(),
            "visibility of function modified in class"
        );
        if function.is_private() {
            function.function_type = FunctionType::Empty;
            function.attributes.final_in_target_lang = true;
        }
    }
    if shadows_final_base(function, base_function) {
        tracing::warn!(
            class = %class_name,
            function = %function.minimal_signature(),
            "function shadows a final base function"
        );
    }
    function.set_declaring_class(base_function.declaring_class());
}

/// A redeclaration hiding a base function that is final in the target
/// language. Private and static members on either side are exempt.
fn shadows_final_base(function: &MetaFunction, base_function: &MetaFunction) -> bool {
    base_function.is_final_in_target_lang()
        && !base_function.is_private()
        && !function.is_private()
        && !base_function.is_static()
        && !function.is_static()
}
