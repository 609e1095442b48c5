//! Meta classes and the arena that owns them.
//!
//! Every class-to-class relation (base, enclosing, inner, template base,
//! default superclass, using-member source) is a [`ClassId`] into one
//! [`ClassArena`]. Constructibility questions walk the resolved base graph
//! iteratively with a visited set, so a class listing itself as a base
//! terminates.

use std::collections::HashSet;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use mjb_codemodel::{Access, ReferenceType, SourceLocation};
use mjb_typesystem::TypeEntry;

use crate::enums::MetaEnum;
use crate::field::MetaField;
use crate::function::{FunctionType, MetaArgument, MetaFunction};
use crate::types::{MetaType, UsagePattern};

/// Handle of a class inside a [`ClassArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub usize);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Derived facts, updated as functions are added and finalized by the merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClassFlags {
    pub has_virtuals: bool,
    pub is_polymorphic: bool,
    pub has_nonpublic: bool,
    pub has_non_private_constructor: bool,
    pub has_private_constructor: bool,
    pub has_private_copy_constructor: bool,
    pub has_deleted_default_constructor: bool,
    pub has_deleted_copy_constructor: bool,
    pub has_private_destructor: bool,
    pub has_protected_destructor: bool,
    pub has_virtual_destructor: bool,
    pub has_rejected_constructor: bool,
    pub has_rejected_default_constructor: bool,
    pub is_struct: bool,
    pub is_final_cpp: bool,
    pub is_abstract: bool,
    pub final_in_target_lang: bool,
    pub deprecated: bool,
    /// Synthesized from a ruleset typedef entry.
    pub is_typedef: bool,
    /// Inheritance was resolved through a template base.
    pub has_template_base: bool,
    pub inheritance_done: bool,
    pub functions_fixed: bool,
}

/// A base-class member imported with a using-declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingMember {
    pub base_class: ClassId,
    pub member_name: String,
    pub access: Access,
}

const fn access_rank(access: Access) -> u8 {
    match access {
        Access::Public => 0,
        Access::Protected => 1,
        Access::Private => 2,
    }
}

/// One class, struct, namespace or synthesized instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaClass {
    id: ClassId,
    pub type_entry: Arc<TypeEntry>,
    /// Public base names as written, before resolution.
    pub base_class_names: Vec<String>,
    base_classes: Vec<ClassId>,
    pub default_superclass: Option<ClassId>,
    /// For namespaces declared as extending another module's namespace.
    pub extended_namespace: Option<ClassId>,
    pub enclosing_class: Option<ClassId>,
    pub inner_classes: Vec<ClassId>,
    functions: Vec<MetaFunction>,
    pub fields: Vec<MetaField>,
    pub enums: Vec<MetaEnum>,
    pub property_specs: Vec<String>,
    pub using_members: Vec<UsingMember>,
    /// Template parameters, as template-argument entries in ordinal order.
    pub template_arguments: Vec<Arc<TypeEntry>>,
    pub template_base_class: Option<ClassId>,
    pub template_base_instantiations: Vec<MetaType>,
    /// Container named by a sole template base that is not a class.
    pub base_container_type: Option<Arc<TypeEntry>>,
    pub flags: ClassFlags,
    pub source_location: SourceLocation,
}

impl MetaClass {
    /// A detached class; [`ClassArena::alloc`] assigns its id.
    #[must_use]
    pub fn new(type_entry: Arc<TypeEntry>) -> Self {
        Self {
            id: ClassId(usize::MAX),
            type_entry,
            base_class_names: Vec::new(),
            base_classes: Vec::new(),
            default_superclass: None,
            extended_namespace: None,
            enclosing_class: None,
            inner_classes: Vec::new(),
            functions: Vec::new(),
            fields: Vec::new(),
            enums: Vec::new(),
            property_specs: Vec::new(),
            using_members: Vec::new(),
            template_arguments: Vec::new(),
            template_base_class: None,
            template_base_instantiations: Vec::new(),
            base_container_type: None,
            flags: ClassFlags::default(),
            source_location: SourceLocation::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ClassId {
        self.id
    }

    /// Qualified name of the class entry.
    #[must_use]
    pub fn name(&self) -> &str {
        self.type_entry.name()
    }

    /// Unqualified name, template suffix excluded.
    #[must_use]
    pub fn entry_name(&self) -> &str {
        self.type_entry.entry_name()
    }

    #[must_use]
    pub fn is_namespace(&self) -> bool {
        self.type_entry.is_namespace()
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.flags.is_abstract
    }

    #[must_use]
    pub const fn is_final_in_target_lang(&self) -> bool {
        self.flags.final_in_target_lang
    }

    #[must_use]
    pub fn is_stream(&self) -> bool {
        self.type_entry.complex().is_some_and(|c| c.is_stream)
    }

    /// Namespaces and smart pointers take no part in inheritance resolution.
    #[must_use]
    pub fn needs_inheritance_setup(&self) -> bool {
        !(self.type_entry.is_namespace() || self.type_entry.is_smart_pointer())
    }

    /// Resolved bases. Only meaningful once inheritance has been resolved.
    #[must_use]
    pub fn base_classes(&self) -> &[ClassId] {
        debug_assert!(
            self.flags.inheritance_done,
            "base classes of {} read before inheritance resolution",
            self.name()
        );
        &self.base_classes
    }

    /// First resolved base, if any. Safe to call while resolution is still
    /// in progress.
    #[must_use]
    pub fn base_class(&self) -> Option<ClassId> {
        self.base_classes.first().copied()
    }

    pub fn add_base_class(&mut self, base: ClassId) {
        if !self.base_classes.contains(&base) {
            self.base_classes.push(base);
        }
    }

    pub fn set_base_classes(&mut self, bases: Vec<ClassId>) {
        self.base_classes = bases;
    }

    pub const fn set_has_virtual_destructor(&mut self, value: bool) {
        self.flags.has_virtual_destructor = value;
        if value {
            self.flags.has_virtuals = true;
            self.flags.is_polymorphic = true;
        }
    }

    #[must_use]
    pub fn functions(&self) -> &[MetaFunction] {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut [MetaFunction] {
        &mut self.functions
    }

    /// Append a function owned, declared and implemented by this class.
    /// Destructors are class facts, never members of the list.
    pub fn add_function(&mut self, mut function: MetaFunction) {
        if function.function_type == FunctionType::Destructor {
            return;
        }
        function.set_owner_class(Some(self.id));
        function.set_declaring_class(Some(self.id));
        function.set_implementing_class(Some(self.id));

        self.flags.has_virtuals |= function.is_virtual();
        self.flags.is_polymorphic |= self.flags.has_virtuals;
        self.flags.has_nonpublic |= !function.is_public();
        self.flags.has_non_private_constructor |=
            !function.is_private() && function.function_type == FunctionType::Constructor;
        self.functions.push(function);
    }

    /// Replace the function list, sorted by pre-modification name, and
    /// recompute the aggregate flags.
    pub fn set_functions(&mut self, mut functions: Vec<MetaFunction>) {
        functions.sort_by(|a, b| {
            a.original_name
                .cmp(&b.original_name)
                .then_with(|| a.minimal_signature().cmp(&b.minimal_signature()))
        });
        self.flags.has_nonpublic = false;
        for function in &mut functions {
            function.set_owner_class(Some(self.id));
            self.flags.has_virtuals |= function.is_virtual();
            self.flags.is_polymorphic |= self.flags.has_virtuals;
            self.flags.has_nonpublic |= !function.is_public();
            self.flags.has_non_private_constructor |= !function.is_private()
                && function.function_type == FunctionType::Constructor;
        }
        self.functions = functions;
    }

    pub fn take_functions(&mut self) -> Vec<MetaFunction> {
        std::mem::take(&mut self.functions)
    }

    #[must_use]
    pub fn find_function(&self, name: &str) -> Option<&MetaFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MetaFunction> + 'a {
        self.functions.iter().filter(move |f| f.name == name)
    }

    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.find_function(name).is_some()
    }

    /// Functions whose code lives in this class.
    pub fn implemented_functions(&self) -> impl Iterator<Item = &MetaFunction> {
        self.functions
            .iter()
            .filter(|f| f.owner_class() == f.implementing_class())
    }

    /// Candidates for inheritance into a subclass: implemented here or
    /// virtual in C++.
    pub fn inheritable_functions(&self) -> impl Iterator<Item = &MetaFunction> {
        self.functions
            .iter()
            .filter(|f| f.owner_class() == f.implementing_class() || f.is_virtual())
    }

    /// Plain constructors implemented by this class.
    pub fn constructors(&self) -> impl Iterator<Item = &MetaFunction> {
        self.implemented_functions()
            .filter(|f| f.function_type == FunctionType::Constructor)
    }

    pub fn copy_constructors(&self) -> impl Iterator<Item = &MetaFunction> {
        self.implemented_functions()
            .filter(|f| f.function_type == FunctionType::CopyConstructor)
    }

    #[must_use]
    pub fn has_constructors(&self) -> bool {
        self.implemented_functions().any(MetaFunction::is_constructor)
    }

    #[must_use]
    pub fn has_copy_constructor(&self) -> bool {
        self.copy_constructors().next().is_some()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&MetaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn find_enum(&self, name: &str) -> Option<&MetaEnum> {
        self.enums
            .iter()
            .find(|e| e.name() == name || e.type_entry.entry_name() == name)
    }

    /// The enum of this class declaring an enumerator named `value`.
    #[must_use]
    pub fn find_enum_for_value(&self, value: &str) -> Option<&MetaEnum> {
        self.enums.iter().find(|e| e.find_value(value).is_some())
    }

    #[must_use]
    pub fn has_using_members(&self) -> bool {
        !self.using_members.is_empty()
    }

    /// Whether `member` of `base` is imported at `minimum_access` or wider.
    #[must_use]
    pub fn is_using_member(&self, base: ClassId, member: &str, minimum_access: Access) -> bool {
        self.using_members.iter().any(|um| {
            um.base_class == base
                && um.member_name == member
                && access_rank(um.access) <= access_rank(minimum_access)
        })
    }

    /// The ruleset may add constructors: not a namespace, no deleted default
    /// constructor, no rejected constructor and no private destructor.
    #[must_use]
    pub fn can_add_constructors(&self) -> bool {
        !self.is_namespace()
            && !self.flags.has_deleted_default_constructor
            && !self.flags.has_rejected_constructor
            && !self.flags.has_private_destructor
    }

    /// Add a public, argument-less constructor.
    pub fn add_default_constructor(&mut self) {
        let mut function = self.synthesized_constructor(FunctionType::Constructor);
        function.unresolved_signature = format!("{}()", self.entry_name());
        self.add_function(function);
    }

    /// Add a public `Class(const Class &)` constructor.
    pub fn add_default_copy_constructor(&mut self) {
        let mut function = self.synthesized_constructor(FunctionType::CopyConstructor);
        let mut arg_type = MetaType::new(Arc::clone(&self.type_entry));
        arg_type.set_constant(true);
        arg_type.set_reference_type(ReferenceType::LValue);
        arg_type.decide_usage_pattern();
        arg_type.set_usage_pattern(UsagePattern::Value);
        function
            .arguments
            .push(MetaArgument::new(self.entry_name().to_string(), arg_type, 0));
        self.add_function(function);
    }

    fn synthesized_constructor(&self, function_type: FunctionType) -> MetaFunction {
        let mut function = MetaFunction::new(self.entry_name().to_string(), function_type);
        function.set_access(Access::Public);
        function.attributes.final_in_target_lang = true;
        function.attributes.added_method = true;
        function.source_location = self.source_location.clone();
        function
    }
}

impl fmt::Display for MetaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one step of a base-class walk.
enum Walk {
    Reject,
    Accept,
    Descend,
}

/// Owner of every [`MetaClass`] of a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassArena {
    classes: Vec<MetaClass>,
}

impl ClassArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, mut class: MetaClass) -> ClassId {
        let id = ClassId(self.classes.len());
        class.id = id;
        for function in &mut class.functions {
            function.set_owner_class(Some(id));
            function.set_declaring_class(Some(id));
            function.set_implementing_class(Some(id));
        }
        self.classes.push(class);
        id
    }

    #[must_use]
    pub fn get(&self, id: ClassId) -> Option<&MetaClass> {
        self.classes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ClassId) -> Option<&mut MetaClass> {
        self.classes.get_mut(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaClass> {
        self.classes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId)
    }

    /// First class among `ids` whose qualified or unqualified name is `name`.
    #[must_use]
    pub fn find_in(&self, ids: &[ClassId], name: &str) -> Option<ClassId> {
        ids.iter()
            .copied()
            .find(|id| self[*id].name() == name)
            .or_else(|| ids.iter().copied().find(|id| self[*id].entry_name() == name))
    }

    /// Class whose entry is exactly `entry`.
    #[must_use]
    pub fn find_by_entry(&self, ids: &[ClassId], entry: &TypeEntry) -> Option<ClassId> {
        ids.iter()
            .copied()
            .find(|id| self[*id].type_entry.name() == entry.name())
    }

    /// All transitive bases of `id`, nearest first, each once.
    #[must_use]
    pub fn all_base_classes(&self, id: ClassId) -> Vec<ClassId> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut queue: std::collections::VecDeque<ClassId> =
            self[id].base_classes.iter().copied().collect();
        while let Some(base) = queue.pop_front() {
            if !visited.insert(base) {
                continue;
            }
            result.push(base);
            queue.extend(self[base].base_classes.iter().copied());
        }
        result
    }

    #[must_use]
    pub fn inherits_from(&self, id: ClassId, base: ClassId) -> bool {
        self.all_base_classes(id).contains(&base)
    }

    fn all_satisfy(&self, start: &[ClassId], step: impl Fn(&MetaClass) -> Walk) -> bool {
        let mut visited = HashSet::new();
        let mut work = start.to_vec();
        while let Some(id) = work.pop() {
            if !visited.insert(id) {
                continue;
            }
            let class = &self[id];
            match step(class) {
                Walk::Reject => return false,
                Walk::Accept => {}
                Walk::Descend => work.extend(class.base_classes.iter().copied()),
            }
        }
        true
    }

    fn default_constructible_step(class: &MetaClass) -> Walk {
        if class.flags.has_deleted_default_constructor || class.flags.has_private_constructor {
            return Walk::Reject;
        }
        if let Some(ctor) = class.constructors().find(|f| f.is_default_constructor()) {
            return if ctor.is_public() { Walk::Accept } else { Walk::Reject };
        }
        if class.constructors().next().is_some()
            || !class.fields.iter().all(MetaField::is_default_constructible)
        {
            return Walk::Reject;
        }
        Walk::Descend
    }

    fn copy_constructible_step(class: &MetaClass) -> Walk {
        if class.flags.has_deleted_copy_constructor || class.flags.has_private_copy_constructor {
            return Walk::Reject;
        }
        match class.copy_constructors().next() {
            Some(ctor) if ctor.is_public() => Walk::Accept,
            Some(_) => Walk::Reject,
            None => Walk::Descend,
        }
    }

    #[must_use]
    pub fn is_default_constructible(&self, id: ClassId) -> bool {
        self.all_satisfy(&[id], Self::default_constructible_step)
    }

    /// Fields need no initializer and every base is default-constructible.
    #[must_use]
    pub fn is_implicitly_default_constructible(&self, id: ClassId) -> bool {
        let class = &self[id];
        class.fields.iter().all(MetaField::is_default_constructible)
            && self.all_satisfy(&class.base_classes, Self::default_constructible_step)
    }

    #[must_use]
    pub fn can_add_default_constructor(&self, id: ClassId) -> bool {
        let class = &self[id];
        class.can_add_constructors()
            && !class.has_constructors()
            && !class.flags.has_private_constructor
            && self.is_implicitly_default_constructible(id)
    }

    #[must_use]
    pub fn is_copy_constructible(&self, id: ClassId) -> bool {
        self.all_satisfy(&[id], Self::copy_constructible_step)
    }

    #[must_use]
    pub fn is_implicitly_copy_constructible(&self, id: ClassId) -> bool {
        self.all_satisfy(&self[id].base_classes, Self::copy_constructible_step)
    }

    #[must_use]
    pub fn can_add_default_copy_constructor(&self, id: ClassId) -> bool {
        let class = &self[id];
        if !class.can_add_constructors()
            || !class.type_entry.is_value()
            || class.is_abstract()
            || class.flags.has_private_copy_constructor
            || class.has_copy_constructor()
        {
            return false;
        }
        self.is_implicitly_copy_constructible(id)
    }

    /// Consume the arena, yielding classes in id order.
    #[must_use]
    pub fn into_vec(self) -> Vec<MetaClass> {
        self.classes
    }
}

impl Index<ClassId> for ClassArena {
    type Output = MetaClass;

    fn index(&self, id: ClassId) -> &MetaClass {
        &self.classes[id.0]
    }
}

impl IndexMut<ClassId> for ClassArena {
    fn index_mut(&mut self, id: ClassId) -> &mut MetaClass {
        &mut self.classes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use mjb_typesystem::TypeEntry;
    use pretty_assertions::assert_eq;

    use super::*;

    fn value_class(arena: &mut ClassArena, name: &str) -> ClassId {
        let mut class = MetaClass::new(Arc::new(TypeEntry::value(name)));
        class.flags.inheritance_done = true;
        arena.alloc(class)
    }

    fn constructor(name: &str, access: Access) -> MetaFunction {
        let mut f = MetaFunction::new(name, FunctionType::Constructor);
        f.set_access(access);
        f
    }

    #[test]
    fn add_function_sets_roles_and_flags() {
        let mut arena = ClassArena::new();
        let id = value_class(&mut arena, "Foo");
        let mut method = MetaFunction::new("paint", FunctionType::Normal);
        method.attributes.virtual_cpp = true;
        method.set_access(Access::Protected);
        arena[id].add_function(method);

        let class = &arena[id];
        let f = &class.functions()[0];
        assert_eq!(f.owner_class(), Some(id));
        assert_eq!(f.declaring_class(), Some(id));
        assert_eq!(f.implementing_class(), Some(id));
        assert!(class.flags.has_virtuals && class.flags.is_polymorphic);
        assert!(class.flags.has_nonpublic);
    }

    #[test]
    fn destructors_are_not_listed() {
        let mut arena = ClassArena::new();
        let id = value_class(&mut arena, "Foo");
        arena[id].add_function(MetaFunction::new("~Foo", FunctionType::Destructor));
        assert!(arena[id].functions().is_empty());
    }

    #[test]
    fn virtual_destructor_makes_class_polymorphic() {
        let mut class = MetaClass::new(Arc::new(TypeEntry::object("Foo")));
        class.set_has_virtual_destructor(true);
        assert!(class.flags.has_virtuals);
        assert!(class.flags.is_polymorphic);
    }

    #[test]
    fn synthesized_copy_constructor_takes_const_ref() {
        let mut arena = ClassArena::new();
        let id = value_class(&mut arena, "NS::Point");
        arena[id].add_default_copy_constructor();
        let ctor = &arena[id].functions()[0];
        assert_eq!(ctor.function_type, FunctionType::CopyConstructor);
        assert!(ctor.attributes.added_method && ctor.attributes.final_in_target_lang);
        assert_eq!(ctor.minimal_signature(), "Point(const NS::Point&)");
        assert_eq!(ctor.arguments[0].meta_type.usage_pattern(), UsagePattern::Value);
    }

    #[test]
    fn default_constructibility_follows_bases() {
        let mut arena = ClassArena::new();
        let base = value_class(&mut arena, "Base");
        let derived = value_class(&mut arena, "Derived");
        arena[derived].add_base_class(base);
        assert!(arena.can_add_default_constructor(derived));

        let mut ctor = constructor("Base", Access::Public);
        let int = MetaType::new(Arc::new(TypeEntry::builtin_primitive("int")));
        ctor.arguments.push(MetaArgument::new("value", int, 0));
        arena[base].add_function(ctor);
        assert!(!arena.is_default_constructible(base));
        assert!(!arena.can_add_default_constructor(derived));
    }

    #[test]
    fn private_copy_constructor_blocks_synthesis() {
        let mut arena = ClassArena::new();
        let id = value_class(&mut arena, "Foo");
        assert!(arena.can_add_default_copy_constructor(id));
        arena[id].flags.has_private_copy_constructor = true;
        assert!(!arena.can_add_default_copy_constructor(id));
        assert!(!arena.is_copy_constructible(id));
    }

    #[test]
    fn self_referencing_base_terminates() {
        let mut arena = ClassArena::new();
        let id = value_class(&mut arena, "Loop");
        arena[id].add_base_class(id);
        assert!(arena.is_copy_constructible(id));
        assert_eq!(arena.all_base_classes(id), Vec::<ClassId>::new());
    }

    #[test]
    fn using_member_respects_access() {
        let mut class = MetaClass::new(Arc::new(TypeEntry::object("Derived")));
        class.using_members.push(UsingMember {
            base_class: ClassId(0),
            member_name: "Base".to_string(),
            access: Access::Protected,
        });
        assert!(class.is_using_member(ClassId(0), "Base", Access::Protected));
        assert!(class.is_using_member(ClassId(0), "Base", Access::Private));
        assert!(!class.is_using_member(ClassId(0), "Base", Access::Public));
    }
}
