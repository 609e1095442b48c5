//! Instantiating a class template's members into a subclass or typedef.

use mjb_codemodel::{Access, TypeInfo};
use mjb_meta::{ClassId, MetaType};
use mjb_typesystem::SignatureSpec;

use crate::builder::MetaBuilder;
use crate::lookup::TranslateFlags;

/// `template_type` with every template argument replaced by the matching
/// instantiation. `None` when a substitution is `void`, out of range, or
/// leaves a template argument behind.
pub fn inherit_template_type(instantiations: &[MetaType], template_type: &MetaType) -> Option<MetaType> {
    let mut result = template_type.clone();

    if let Some(ordinal) = template_type.type_entry().template_ordinal() {
        let substitute = instantiations.get(ordinal)?;
        if substitute.is_void() {
            return None;
        }
        result.set_type_entry(substitute.type_entry().clone());
        result.set_instantiations(substitute.instantiations().to_vec());
        let mut indirections = substitute.indirections().to_vec();
        indirections.extend_from_slice(template_type.indirections());
        result.set_indirections(indirections);
        if template_type.reference_type() < substitute.reference_type() {
            result.set_reference_type(substitute.reference_type());
        }
        result.set_constant(template_type.is_constant() || substitute.is_constant());
        result.decide_usage_pattern();
    }

    if result.has_instantiations() {
        let substituted = result
            .instantiations()
            .iter()
            .map(|inner| inherit_template_type(instantiations, inner))
            .collect::<Option<Vec<_>>>()?;
        result.set_instantiations(substituted);
        result.decide_usage_pattern();
    }

    if result.type_entry().is_template_argument() {
        return None;
    }
    Some(result)
}

impl MetaBuilder {
    /// Record `template` as the template base of `subclass` with the
    /// instantiation types of `info`; the subclass takes the template's
    /// bases.
    pub(crate) fn inherit_template(&mut self, subclass: ClassId, template: ClassId, info: &TypeInfo) -> bool {
        let sub_name = self.arena[subclass].name().to_string();
        let template_name = self.arena[template].name().to_string();
        let enclosing_name = self.arena[subclass]
            .enclosing_class
            .map(|id| self.arena[id].name().to_string());

        let mut instantiations = Vec::with_capacity(info.instantiations.len());
        for argument in &info.instantiations {
            let text = argument.qualified_name_string();
            if text.parse::<i64>().is_ok() {
                instantiations.push(MetaType::new(self.registry.constant_value(&text)));
                continue;
            }

            let mut candidates = vec![format!("{sub_name}::{text}"), format!("{template_name}::{text}")];
            if let Some(enclosing) = &enclosing_name {
                candidates.push(format!("{enclosing}::{text}"));
            }
            candidates.push(text.clone());
            let entry = candidates.iter().find_map(|name| {
                self.db
                    .find_type(name)
                    .or_else(|| self.registry.find_type(name))
                    .filter(|e| !e.is_namespace() && !e.is_function())
            });

            let meta_type = match entry {
                Some(entry) => {
                    let mut meta_type = MetaType::new(entry);
                    meta_type.set_indirections(argument.indirections.clone());
                    meta_type.set_reference_type(argument.reference_type);
                    meta_type.set_constant(argument.is_constant);
                    meta_type.decide_usage_pattern();
                    Ok(meta_type)
                }
                None => self.translate_type_with(
                    argument,
                    Some(subclass),
                    TranslateFlags {
                        template_argument: true,
                        ..TranslateFlags::default()
                    },
                ),
            };
            match meta_type {
                Ok(meta_type) => instantiations.push(meta_type),
                Err(error) => tracing::warn!(
                    class = %sub_name,
                    template = %template_name,
                    parameter = %text,
                    %error,
                    "ignoring template parameter: type not found in the type system"
                ),
            }
        }

        let bases = self.arena[template].base_classes().to_vec();
        let sub = &mut self.arena[subclass];
        sub.template_base_class = Some(template);
        sub.template_base_instantiations = instantiations;
        sub.set_base_classes(bases);
        true
    }

    /// Copy the template's functions and fields into `subclass`, with the
    /// template arguments substituted.
    pub(crate) fn inherit_template_functions(&mut self, subclass: ClassId) {
        let Some(template) = self.arena[subclass].template_base_class else {
            return;
        };
        let instantiations = self.arena[subclass].template_base_instantiations.clone();
        let is_typedef = self.arena[subclass].flags.is_typedef;
        let sub_name = self.arena[subclass].name().to_string();
        let sub_entry_name = self.arena[subclass].entry_name().to_string();

        if is_typedef {
            let template_flags = self.arena[template].flags;
            let flags = &mut self.arena[subclass].flags;
            flags.has_non_private_constructor = template_flags.has_non_private_constructor;
            flags.has_private_destructor = template_flags.has_private_destructor;
            flags.has_protected_destructor = template_flags.has_protected_destructor;
            if template_flags.has_virtual_destructor {
                self.arena[subclass].set_has_virtual_destructor(true);
            }
        }

        let template_functions = self.arena[template].functions().to_vec();
        for function in &template_functions {
            if function.is_constructor() && !is_typedef {
                continue;
            }
            if self.is_modified_removed(function, Some(template)) {
                continue;
            }
            let sub = &self.arena[subclass];
            if sub.has_function(&function.name)
                && !sub.is_using_member(template, &function.name, Access::Protected)
            {
                continue;
            }

            let Some(return_type) = inherit_template_type(&instantiations, &function.return_type) else {
                continue;
            };
            let mut copy = function.copy();
            copy.return_type = return_type;
            let mut substituted = true;
            for argument in &mut copy.arguments {
                match inherit_template_type(&instantiations, &argument.meta_type) {
                    Some(meta_type) => argument.meta_type = meta_type,
                    None => {
                        substituted = false;
                        break;
                    }
                }
            }
            if !substituted {
                continue;
            }
            copy.flags.inherited_from_template = true;
            if copy.is_constructor() {
                copy.name.clone_from(&sub_entry_name);
                copy.original_name.clone_from(&sub_entry_name);
            }

            let modifications = self.function_modifications(function, Some(template));
            if !modifications.is_empty() {
                let signature = copy.minimal_signature();
                self.registry.add_function_modifications(
                    &sub_name,
                    modifications.into_iter().map(|mut m| {
                        m.signature = SignatureSpec::Exact(signature.clone());
                        m
                    }),
                );
            }
            self.arena[subclass].add_function(copy);
        }

        let template_fields = self.arena[template].fields.clone();
        for field in template_fields {
            if field.removed || field.is_static || self.arena[subclass].field(&field.name).is_some() {
                continue;
            }
            let Some(meta_type) = inherit_template_type(&instantiations, &field.meta_type) else {
                continue;
            };
            let mut inherited = field;
            inherited.meta_type = meta_type;
            inherited.enclosing_class = Some(subclass);
            self.arena[subclass].fields.push(inherited);
        }
    }
}
