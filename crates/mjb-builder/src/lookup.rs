//! Type lookup: from a structural [`TypeInfo`] to a resolved [`MetaType`].

use std::collections::HashSet;
use std::sync::Arc;

use mjb_codemodel::{Indirection, TypeInfo};
use mjb_meta::{ClassId, MetaType};
use mjb_typesystem::{EntryKind, EntryType, TypeEntry};

use crate::builder::MetaBuilder;
use crate::error::TranslateError;

/// Options of one lookup.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TranslateFlags {
    /// Translate the reference as written; no typedef resolution.
    pub dont_resolve_type: bool,
    /// Skip the current class's scope chain and its bases.
    pub no_class_scope_lookup: bool,
    /// The reference is a template argument: enum values and numeric
    /// constants are acceptable.
    pub template_argument: bool,
}

impl MetaBuilder {
    pub(crate) fn translate_type(
        &mut self,
        info: &TypeInfo,
        current: Option<ClassId>,
    ) -> Result<MetaType, TranslateError> {
        self.translate_type_with(info, current, TranslateFlags::default())
    }

    /// Translate a type spelled as text, e.g. from a ruleset.
    pub(crate) fn translate_type_str(
        &mut self,
        text: &str,
        current: Option<ClassId>,
    ) -> Result<MetaType, TranslateError> {
        let info = TypeInfo::parse(text).map_err(|e| TranslateError::new(e.to_string()))?;
        self.translate_type(&info, current)
    }

    pub(crate) fn translate_type_with(
        &mut self,
        info: &TypeInfo,
        current: Option<ClassId>,
        flags: TranslateFlags,
    ) -> Result<MetaType, TranslateError> {
        if info.is_void() {
            return Ok(MetaType::void());
        }
        if flags.dont_resolve_type {
            return self.translate_unresolved(info, current, flags);
        }

        let as_written = TranslateFlags {
            dont_resolve_type: true,
            ..flags
        };
        let first_error = match self.translate_unresolved(info, current, as_written) {
            Ok(meta_type) => return Ok(meta_type),
            Err(error) => error,
        };
        let resolved = self.resolve_typedefs(info, current);
        if resolved == *info {
            return Err(first_error);
        }
        let resolved = self.resolve_typedefs(&resolved, current);
        self.translate_unresolved(&resolved, current, as_written)
            .or(Err(first_error))
    }

    /// Follow typedefs visible from the current class, innermost scope first.
    fn resolve_typedefs(&self, info: &TypeInfo, current: Option<ClassId>) -> TypeInfo {
        let Some(model) = self.code_model.as_deref() else {
            return info.clone();
        };
        let mut scopes: Vec<Vec<String>> = Vec::new();
        if let Some(id) = current {
            let segments: Vec<String> = self.arena[id].name().split("::").map(str::to_string).collect();
            for len in (1..=segments.len()).rev() {
                scopes.push(segments[..len].to_vec());
            }
        }
        for len in (1..=self.scope.len()).rev() {
            let prefix = self.scope[..len].to_vec();
            if !scopes.contains(&prefix) {
                scopes.push(prefix);
            }
        }
        scopes.push(Vec::new());

        for scope in &scopes {
            let resolved = model.resolve_type(info, scope);
            if resolved != *info {
                return resolved;
            }
        }
        info.clone()
    }

    fn translate_unresolved(
        &mut self,
        info: &TypeInfo,
        current: Option<ClassId>,
        flags: TranslateFlags,
    ) -> Result<MetaType, TranslateError> {
        if info.is_void() {
            return Ok(MetaType::void());
        }
        if info.is_function_pointer {
            return Err(TranslateError::new("Unsupported function pointer."));
        }

        let mut info = info.clone();
        let is_char = info.qualified_name.len() == 1 && info.qualified_name[0] == "char";
        if is_char
            && info.array_elements.len() == 1
            && info.array_elements[0].is_empty()
            && info.indirections.is_empty()
        {
            info.array_elements.clear();
            info.indirections.push(Indirection::Pointer);
        }

        if !info.array_elements.is_empty() {
            return self.translate_array(info, current, flags);
        }

        let qualified = info.qualified_name_string();
        let is_flags_template = qualified == "QFlags" && info.instantiations.len() == 1;
        if is_flags_template {
            let key = format!("QFlags<{}>", info.instantiations[0]);
            if let Some(entry) = self.find_flags_entry(&key, current) {
                let mut meta_type = MetaType::new(entry);
                apply_qualifiers(&mut meta_type, &info);
                return Ok(meta_type);
            }
        }

        let candidates = self.find_type_entries(&qualified, current, flags)?;

        let mut instantiations = Vec::with_capacity(info.instantiations.len());
        for argument in &info.instantiations {
            let argument_flags = TranslateFlags {
                template_argument: true,
                dont_resolve_type: false,
                ..flags
            };
            match self.translate_type_with(argument, current, argument_flags) {
                Ok(meta_type) => instantiations.push(meta_type),
                Err(error) => {
                    let text = argument.to_string();
                    if text.parse::<i64>().is_ok() {
                        let entry = self.registry.constant_value(&text);
                        instantiations.push(MetaType::new(entry));
                    } else {
                        return Err(TranslateError::new(format!(
                            "Unable to translate template argument \"{text}\" of \"{info}\": {error}"
                        )));
                    }
                }
            }
        }

        let entry = select_candidate(&candidates, &instantiations, &info)?;

        let mut meta_type = MetaType::new(entry);
        meta_type.set_instantiations(instantiations);
        apply_qualifiers(&mut meta_type, &info);
        self.apply_typedef_target(&mut meta_type);
        Ok(meta_type)
    }

    fn translate_array(
        &mut self,
        mut info: TypeInfo,
        current: Option<ClassId>,
        flags: TranslateFlags,
    ) -> Result<MetaType, TranslateError> {
        let dimensions = std::mem::take(&mut info.array_elements);
        let mut element = self.translate_unresolved(&info, current, flags)?;
        for dimension in dimensions.iter().rev() {
            let count = if dimension.is_empty() {
                None
            } else {
                self.find_out_value_from_string(dimension, current)
                    .and_then(|v| usize::try_from(v).ok())
            };
            let entry = Arc::new(TypeEntry::new(
                format!("{}[]", element.qualified_name()),
                EntryKind::Array {
                    element: Arc::clone(element.type_entry()),
                },
            ));
            let mut array = MetaType::new(entry);
            array.set_array_element_count(count);
            array.set_array_element_type(element);
            array.set_original_type_description(format!("{info}[{dimension}]"));
            array.decide_usage_pattern();
            element = array;
        }
        Ok(element)
    }

    /// Replace a `std::vector<Foo>` with the ruleset typedef class standing for it.
    fn apply_typedef_target(&self, meta_type: &mut MetaType) {
        if !meta_type.has_instantiations() {
            return;
        }
        if let Some(target) = self.typedef_targets.iter().find(|t| t.matches(meta_type)) {
            let entry = Arc::clone(&self.arena[target.class].type_entry);
            meta_type.set_type_entry(entry);
            meta_type.set_instantiations(Vec::new());
            meta_type.decide_usage_pattern();
        }
    }

    fn find_flags_entry(&self, key: &str, current: Option<ClassId>) -> Option<Arc<TypeEntry>> {
        if let Some(entry) = self.db.find_flags_type(key) {
            return Some(entry);
        }
        // `QFlags<Color>` inside `NS::Widget` is indexed as `QFlags<NS::Widget::Color>`.
        let inner = key.strip_prefix("QFlags<")?.strip_suffix('>')?;
        let mut scope = current.map(|id| self.arena[id].name().to_string());
        while let Some(prefix) = scope {
            if let Some(entry) = self.db.find_flags_type(&format!("QFlags<{prefix}::{inner}>")) {
                return Some(entry);
            }
            scope = prefix.rsplit_once("::").map(|(p, _)| p.to_string());
        }
        None
    }

    /// Ruleset and registry entries usable as C++ types.
    fn cpp_types_named(&self, name: &str) -> Vec<Arc<TypeEntry>> {
        let mut result = self.db.find_cpp_types(name);
        result.extend(
            self.registry
                .find_types(name)
                .into_iter()
                .filter(|e| !matches!(e.entry_type(), EntryType::Namespace | EntryType::Function)),
        );
        result
    }

    fn find_in_class_scope(&self, qualified: &str, id: ClassId) -> Vec<Arc<TypeEntry>> {
        let mut context = Some(id);
        let mut visited = HashSet::new();
        while let Some(class_id) = context {
            if !visited.insert(class_id) {
                break;
            }
            let class = &self.arena[class_id];
            let mut scope = Some(class.name().to_string());
            while let Some(prefix) = scope {
                let found = self.cpp_types_named(&format!("{prefix}::{qualified}"));
                if !found.is_empty() {
                    return found;
                }
                scope = prefix.rsplit_once("::").map(|(p, _)| p.to_string());
            }
            context = class.enclosing_class;
        }
        Vec::new()
    }

    fn find_in_base_scopes(&self, qualified: &str, id: ClassId) -> Vec<Arc<TypeEntry>> {
        for base in self.arena.all_base_classes(id) {
            let found = self.cpp_types_named(&format!("{}::{qualified}", self.arena[base].name()));
            if !found.is_empty() {
                return found;
            }
        }
        let class = &self.arena[id];
        if class.flags.inheritance_done {
            return Vec::new();
        }
        for base_name in &class.base_class_names {
            let found = self.cpp_types_named(&format!("{base_name}::{qualified}"));
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    fn find_in_inline_namespaces(&self, qualified: &str) -> Vec<Arc<TypeEntry>> {
        for namespace in &self.inline_namespaces {
            let candidate = match namespace.rsplit_once("::") {
                Some((parent, _)) => qualified
                    .strip_prefix(parent)
                    .and_then(|rest| rest.strip_prefix("::"))
                    .map(|rest| format!("{namespace}::{rest}")),
                None => Some(format!("{namespace}::{qualified}")),
            };
            if let Some(candidate) = candidate {
                let found = self.cpp_types_named(&candidate);
                if !found.is_empty() {
                    return found;
                }
            }
        }
        Vec::new()
    }

    fn find_type_entries_helper(
        &self,
        qualified: &str,
        current: Option<ClassId>,
        flags: TranslateFlags,
    ) -> Vec<Arc<TypeEntry>> {
        if let Some(id) = current.filter(|_| !flags.no_class_scope_lookup) {
            let found = self.find_in_class_scope(qualified, id);
            if !found.is_empty() {
                return found;
            }
            let found = self.find_in_base_scopes(qualified, id);
            if !found.is_empty() {
                return found;
            }
        }
        for len in (1..=self.scope.len()).rev() {
            let found = self.cpp_types_named(&format!("{}::{qualified}", self.scope[..len].join("::")));
            if !found.is_empty() {
                return found;
            }
        }

        let found = self.cpp_types_named(qualified);
        if !found.is_empty() {
            return found;
        }
        let found = self.find_in_inline_namespaces(qualified);
        if !found.is_empty() {
            return found;
        }
        if let Some(entry) = self.db.find_flags_type(qualified) {
            return vec![entry];
        }
        if let Some(entry) = self.db.find_container_type(qualified) {
            return vec![entry];
        }
        // Template parameters of the current class only when nothing else matches.
        current.map_or_else(Vec::new, |id| {
            self.arena[id]
                .template_arguments
                .iter()
                .filter(|t| t.entry_name() == qualified)
                .cloned()
                .collect()
        })
    }

    /// Candidate entries for `qualified`, after alias collapsing and the
    /// ambiguity check.
    pub(crate) fn find_type_entries(
        &self,
        qualified: &str,
        current: Option<ClassId>,
        flags: TranslateFlags,
    ) -> Result<Vec<Arc<TypeEntry>>, TranslateError> {
        let mut entries: Vec<Arc<TypeEntry>> = Vec::new();
        for entry in self.find_type_entries_helper(qualified, current, flags) {
            if !flags.template_argument && entry.is_non_type_template_argument() {
                continue;
            }
            let entry = if entry.is_primitive() {
                entry.basic_referenced_non_builtin()
            } else {
                entry
            };
            if !entries.iter().any(|e| Arc::ptr_eq(e, &entry)) {
                entries.push(entry);
            }
        }

        if entries.is_empty() {
            return Err(TranslateError::new(format!("Could not find type \"{qualified}\".")));
        }
        if entries.len() > 1 {
            let kinds: HashSet<EntryType> = entries.iter().map(|e| e.entry_type()).collect();
            let tolerated = match kinds.len() {
                1 => kinds.contains(&EntryType::Primitive) || kinds.contains(&EntryType::SmartPointer),
                2 => kinds.contains(&EntryType::Primitive) && kinds.contains(&EntryType::SmartPointer),
                _ => false,
            };
            if !tolerated {
                let names: Vec<String> = entries.iter().map(ToString::to_string).collect();
                return Err(TranslateError::new(format!(
                    "Ambiguous type \"{qualified}\": {}",
                    names.join(", ")
                )));
            }
        }
        Ok(entries)
    }
}

/// Pick the entry among same-named candidates. Smart pointers need exactly
/// one instantiation and are chosen by their declared pointee.
fn select_candidate(
    candidates: &[Arc<TypeEntry>],
    instantiations: &[MetaType],
    info: &TypeInfo,
) -> Result<Arc<TypeEntry>, TranslateError> {
    let smart_pointers: Vec<&Arc<TypeEntry>> =
        candidates.iter().filter(|e| e.is_smart_pointer()).collect();
    let wants_smart_pointer =
        !smart_pointers.is_empty() && (!info.instantiations.is_empty() || smart_pointers.len() == candidates.len());
    if !wants_smart_pointer {
        return candidates
            .iter()
            .find(|e| !e.is_smart_pointer())
            .or_else(|| candidates.first())
            .cloned()
            .ok_or_else(|| TranslateError::new(format!("Could not find type \"{info}\".")));
    }

    let [pointee] = instantiations else {
        return Err(TranslateError::new(format!(
            "Smart pointer \"{info}\" must have exactly one instantiation, found {}.",
            instantiations.len()
        )));
    };
    let pointee_entry = pointee.type_entry();
    if pointee_entry.is_template_argument() {
        return Ok(Arc::clone(smart_pointers[0]));
    }
    smart_pointers
        .iter()
        .find(|e| e.matches_instantiation(pointee_entry))
        .map(|e| Arc::clone(*e))
        .ok_or_else(|| {
            TranslateError::new(format!(
                "No smart pointer entry of \"{}\" accepts \"{}\".",
                info.qualified_name_string(),
                pointee_entry.name()
            ))
        })
}

fn apply_qualifiers(meta_type: &mut MetaType, info: &TypeInfo) {
    meta_type.set_indirections(info.indirections.clone());
    meta_type.set_reference_type(info.reference_type);
    meta_type.set_constant(info.is_constant);
    meta_type.set_volatile(info.is_volatile);
    meta_type.set_original_type_description(info.to_string());
    meta_type.decide_usage_pattern();
}
