//! The builder: owns all intermediate state of one run and drives the
//! pipeline from code model to finished meta model.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mjb_codemodel::{CodeModel, UsingMember as UsingDeclaration};
use mjb_config::BuilderConfig;
use mjb_meta::{ClassArena, ClassId, MetaClass, MetaEnum, MetaFunction, MetaType};
use mjb_typesystem::TypeDatabase;

use crate::error::BuilderError;
use crate::registry::ScratchRegistry;
use crate::reject::{RejectCategory, RejectLog, RejectReason, Rejection};
use crate::sequencer::Dependency;
use crate::MetaModel;

/// Reverse mapping from a template instantiation to the ruleset typedef
/// class standing for it (`std::vector<Foo>` to `FooList`).
#[derive(Debug, Clone)]
pub(crate) struct TypedefTarget {
    pub source: MetaType,
    pub class: ClassId,
}

impl TypedefTarget {
    pub fn matches(&self, candidate: &MetaType) -> bool {
        self.source.type_entry().name() == candidate.type_entry().name()
            && self.source.instantiations().len() == candidate.instantiations().len()
            && self
                .source
                .instantiations()
                .iter()
                .zip(candidate.instantiations())
                .all(|(a, b)| a.minimal_signature() == b.minimal_signature())
    }
}

/// Builds a [`MetaModel`] from a [`CodeModel`] and a [`TypeDatabase`].
///
/// One builder serves one run: call [`MetaBuilder::build`] once, then read
/// the results through the accessors or move them out with the `take_*`
/// methods or [`MetaBuilder::into_model`].
pub struct MetaBuilder {
    pub(crate) db: Arc<TypeDatabase>,
    pub(crate) config: BuilderConfig,
    pub(crate) registry: ScratchRegistry,
    pub(crate) arena: ClassArena,
    pub(crate) classes: Vec<ClassId>,
    pub(crate) templates: Vec<ClassId>,
    pub(crate) smart_pointers: Vec<ClassId>,
    pub(crate) global_functions: Vec<MetaFunction>,
    pub(crate) global_enums: Vec<MetaEnum>,
    pub(crate) rejects: RejectLog,
    /// Name segments of the namespace or class being traversed.
    pub(crate) scope: Vec<String>,
    pub(crate) current_class: Option<ClassId>,
    /// Qualified item name to the class it produced.
    pub(crate) item_classes: HashMap<String, ClassId>,
    pub(crate) using_declarations: HashMap<ClassId, Vec<UsingDeclaration>>,
    pub(crate) added_functions_filled: HashSet<ClassId>,
    pub(crate) inline_namespaces: Vec<String>,
    pub(crate) typedef_targets: Vec<TypedefTarget>,
    pub(crate) code_model: Option<Arc<CodeModel>>,
}

impl MetaBuilder {
    #[must_use]
    pub fn new(db: Arc<TypeDatabase>, config: BuilderConfig) -> Self {
        Self {
            db,
            config,
            registry: ScratchRegistry::new(),
            arena: ClassArena::new(),
            classes: Vec::new(),
            templates: Vec::new(),
            smart_pointers: Vec::new(),
            global_functions: Vec::new(),
            global_enums: Vec::new(),
            rejects: RejectLog::new(),
            scope: Vec::new(),
            current_class: None,
            item_classes: HashMap::new(),
            using_declarations: HashMap::new(),
            added_functions_filled: HashSet::new(),
            inline_namespaces: Vec::new(),
            typedef_targets: Vec::new(),
            code_model: None,
        }
    }

    /// Run the whole pipeline over `model`.
    ///
    /// Only an added function with an unresolvable type or a reject log
    /// that cannot be written aborts the run; every other problem is
    /// recorded as a rejection or a warning.
    pub fn build(&mut self, model: CodeModel) -> Result<(), BuilderError> {
        let model = Arc::new(model);
        self.code_model = Some(Arc::clone(&model));
        let result = self.traverse_dom(&model);
        if !self.config.builder.keep_code_model {
            self.code_model = None;
        }
        result
    }

    fn traverse_dom(&mut self, model: &CodeModel) -> Result<(), BuilderError> {
        let global = &model.global;

        for item in &global.scope.classes {
            self.traverse_class(item);
        }
        for item in &global.scope.enums {
            if let Some(meta_enum) = self.traverse_enum(item, None) {
                self.global_enums.push(meta_enum);
            }
        }
        for item in &global.namespaces {
            self.traverse_namespace(item);
        }
        for item in &global.scope.typedefs {
            if let Some(id) = self.traverse_typedef(item, None) {
                self.add_meta_class(id);
            }
        }
        self.traverse_ruleset_typedefs()?;

        self.fill_typedef_added_functions(&global.scope)?;
        for item in &global.scope.classes {
            self.traverse_class_members(item)?;
        }
        for item in &global.namespaces {
            self.traverse_namespace_members(item)?;
        }
        self.traverse_global_functions(&global.scope.functions);

        for id in self.classes.clone() {
            if !self.arena[id].needs_inheritance_setup() {
                continue;
            }
            self.setup_inheritance(id);
            self.traverse_using_members(id);
            if self.arena[id].template_base_class.is_some() {
                self.inherit_template_functions(id);
            }
            let class = &self.arena[id];
            let base_virtual_dtor = class
                .base_class()
                .is_some_and(|b| self.arena[b].flags.has_virtual_destructor);
            if !class.flags.has_virtual_destructor && base_virtual_dtor {
                self.arena[id].set_has_virtual_destructor(true);
            }
        }

        for id in self.classes.clone() {
            self.fix_functions(id);
            if self.arena.can_add_default_constructor(id) {
                tracing::debug!(class = %self.arena[id].name(), "synthesizing default constructor");
                self.arena[id].add_default_constructor();
            }
            if self.arena.can_add_default_copy_constructor(id) {
                tracing::debug!(class = %self.arena[id].name(), "synthesizing copy constructor");
                self.arena[id].add_default_copy_constructor();
            }
        }

        self.check_for_inconsistencies();
        self.traverse_free_operators(model);
        self.check_function_modifications();

        for id in self.classes.clone() {
            let class = &self.arena[id];
            if class.type_entry.generate_code() && class.inner_classes.len() >= 2 {
                let inner = class.inner_classes.clone();
                self.arena[id].inner_classes = self.sorted_classes(&inner, &[]);
            }
        }

        self.fix_smart_pointers();

        if self.config.output.write_reject_logs {
            self.rejects.write_logs(&self.config.output.log_directory)?;
        }
        self.sort_lists();
        self.traverse_global_added_functions()?;

        tracing::info!(
            classes = self.classes.len(),
            templates = self.templates.len(),
            smart_pointers = self.smart_pointers.len(),
            global_functions = self.global_functions.len(),
            global_enums = self.global_enums.len(),
            "meta model built"
        );
        Ok(())
    }

    fn sort_lists(&mut self) {
        let arena = &self.arena;
        self.classes.sort_by(|a, b| arena[*a].name().cmp(arena[*b].name()));

        let mut extra = Vec::new();
        if let (Some(meta_object), Some(object)) = (
            self.arena.find_in(&self.classes, "QMetaObject"),
            self.arena.find_in(&self.classes, "QObject"),
        ) {
            extra.push(Dependency {
                parent: meta_object,
                child: object,
            });
        }
        let classes = self.classes.clone();
        self.classes = self.sorted_classes(&classes, &extra);

        for id in self.classes.clone() {
            let functions = self.arena[id].take_functions();
            self.arena[id].set_functions(functions);
        }

        self.global_enums.sort_by(|a, b| a.name().cmp(b.name()));
        let arena = &self.arena;
        self.templates.sort_by(|a, b| arena[*a].name().cmp(arena[*b].name()));
        self.smart_pointers
            .sort_by(|a, b| arena[*a].name().cmp(arena[*b].name()));
        self.global_functions.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.minimal_signature().cmp(&b.minimal_signature()))
        });
    }

    // ── Bookkeeping helpers ────────────────────────────────────────────

    /// Route a class into the template, smart-pointer or class list.
    pub(crate) fn add_meta_class(&mut self, id: ClassId) {
        let entry = &self.arena[id].type_entry;
        let list = if entry.is_container() {
            &mut self.templates
        } else if entry.is_smart_pointer() {
            &mut self.smart_pointers
        } else {
            &mut self.classes
        };
        if !list.contains(&id) {
            list.push(id);
        }
    }

    pub(crate) fn alloc_class(&mut self, class: MetaClass) -> ClassId {
        self.arena.alloc(class)
    }

    pub(crate) fn reject(
        &mut self,
        category: RejectCategory,
        reason: RejectReason,
        signature: impl Into<String>,
        message: impl Into<String>,
    ) {
        let signature = signature.into();
        let sort_key = signature.clone();
        self.rejects
            .insert(category, Rejection::new(reason, signature, sort_key, message));
    }

    pub(crate) fn push_scope(&mut self, name: &str) {
        self.scope.push(name.to_string());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scope.pop();
    }

    /// `name` qualified with the current scope.
    pub(crate) fn qualify(&self, name: &str) -> String {
        if self.scope.is_empty() {
            name.to_string()
        } else {
            format!("{}::{name}", self.scope.join("::"))
        }
    }

    /// Class, template or smart pointer with this qualified name.
    pub(crate) fn find_any_class(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .chain(&self.templates)
            .chain(&self.smart_pointers)
            .copied()
            .find(|id| self.arena[*id].name() == name)
    }

    pub(crate) fn class_name(&self, id: Option<ClassId>) -> String {
        id.map(|id| self.arena[id].name().to_string()).unwrap_or_default()
    }

    // ── Results ────────────────────────────────────────────────────────

    #[must_use]
    pub const fn arena(&self) -> &ClassArena {
        &self.arena
    }

    #[must_use]
    pub fn classes(&self) -> &[ClassId] {
        &self.classes
    }

    #[must_use]
    pub fn templates(&self) -> &[ClassId] {
        &self.templates
    }

    #[must_use]
    pub fn smart_pointers(&self) -> &[ClassId] {
        &self.smart_pointers
    }

    #[must_use]
    pub fn global_functions(&self) -> &[MetaFunction] {
        &self.global_functions
    }

    #[must_use]
    pub fn global_enums(&self) -> &[MetaEnum] {
        &self.global_enums
    }

    #[must_use]
    pub const fn rejects(&self) -> &RejectLog {
        &self.rejects
    }

    #[must_use]
    pub const fn registry(&self) -> &ScratchRegistry {
        &self.registry
    }

    /// The input model, when kept after the run.
    #[must_use]
    pub fn code_model(&self) -> Option<&CodeModel> {
        self.code_model.as_deref()
    }

    /// Class in any output list with this qualified or unqualified name.
    #[must_use]
    pub fn find_class(&self, name: &str) -> Option<&MetaClass> {
        let all: Vec<ClassId> = self
            .classes
            .iter()
            .chain(&self.templates)
            .chain(&self.smart_pointers)
            .copied()
            .collect();
        self.arena.find_in(&all, name).map(|id| &self.arena[id])
    }

    pub fn take_classes(&mut self) -> Vec<ClassId> {
        std::mem::take(&mut self.classes)
    }

    pub fn take_templates(&mut self) -> Vec<ClassId> {
        std::mem::take(&mut self.templates)
    }

    pub fn take_smart_pointers(&mut self) -> Vec<ClassId> {
        std::mem::take(&mut self.smart_pointers)
    }

    pub fn take_global_functions(&mut self) -> Vec<MetaFunction> {
        std::mem::take(&mut self.global_functions)
    }

    pub fn take_global_enums(&mut self) -> Vec<MetaEnum> {
        std::mem::take(&mut self.global_enums)
    }

    pub fn take_arena(&mut self) -> ClassArena {
        std::mem::take(&mut self.arena)
    }

    /// Move every result out of the builder.
    #[must_use]
    pub fn into_model(mut self) -> MetaModel {
        MetaModel {
            classes: self.take_classes(),
            templates: self.take_templates(),
            smart_pointers: self.take_smart_pointers(),
            global_functions: self.take_global_functions(),
            global_enums: self.take_global_enums(),
            arena: self.take_arena(),
        }
    }
}
