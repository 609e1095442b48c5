use std::sync::Arc;

use mjb_codemodel::{
    Access, ArgumentItem, ClassItem, CodeModel, EnumItem, EnumKind, EnumeratorItem, FunctionItem,
    FunctionKind, NamespaceItem, ReferenceType, TypeInfo, VariableItem,
};
use mjb_config::BuilderConfig;
use mjb_meta::{ClassId, FunctionType, MetaClass, MetaFunction};
use mjb_typesystem::{
    AddedFunction, ComplexData, EntryKind, RejectionMatch, TypeDatabase, TypeEntry, TypeRejection,
    compile_pattern,
};

use super::*;

mod enum_tests;
mod lookup_tests;
mod modification_tests;
mod operator_tests;
mod smart_pointer_tests;
mod template_tests;
mod traversal_tests;

/// Builder options with reject logs disabled.
fn config() -> BuilderConfig {
    let mut config = BuilderConfig::default();
    config.output.write_reject_logs = false;
    config
}

fn build_with(db: TypeDatabase, model: CodeModel, config: BuilderConfig) -> MetaBuilder {
    let mut builder = MetaBuilder::new(Arc::new(db), config);
    builder.build(model).expect("build should succeed");
    builder
}

fn build(db: TypeDatabase, model: CodeModel) -> MetaBuilder {
    build_with(db, model, config())
}

fn model(classes: Vec<ClassItem>) -> CodeModel {
    let mut model = CodeModel::default();
    model.global.scope.classes = classes;
    model
}

fn namespace(name: &str, classes: Vec<ClassItem>) -> NamespaceItem {
    let mut namespace = NamespaceItem::new(name);
    namespace.scope.classes = classes;
    namespace
}

fn namespace_entry(name: &str) -> TypeEntry {
    TypeEntry::new(
        name,
        EntryKind::Namespace {
            extends: None,
            complex: ComplexData::default(),
        },
    )
}

fn enum_entry(name: &str) -> TypeEntry {
    TypeEntry::new(
        name,
        EntryKind::Enum {
            flags: None,
            null_value: None,
        },
    )
}

/// `entry` with its class rules edited by `edit`.
fn with_rules(mut entry: TypeEntry, edit: impl FnOnce(&mut ComplexData)) -> TypeEntry {
    if let Some(complex) = entry.complex_mut() {
        edit(complex);
    }
    entry
}

fn int() -> TypeInfo {
    TypeInfo::named("int")
}

fn const_ref(name: &str) -> TypeInfo {
    TypeInfo::named(name)
        .with_const()
        .with_reference(ReferenceType::LValue)
}

fn arg(name: &str, type_info: TypeInfo) -> ArgumentItem {
    ArgumentItem::new(name, type_info)
}

fn enumeration(name: &str, values: &[(&str, i64)]) -> EnumItem {
    EnumItem {
        name: name.to_string(),
        enumerators: values
            .iter()
            .map(|(value_name, value)| EnumeratorItem {
                name: (*value_name).to_string(),
                value: *value,
                ..EnumeratorItem::default()
            })
            .collect(),
        ..EnumItem::default()
    }
}

fn rejection(match_type: RejectionMatch, class: &str, pattern: Option<&str>) -> TypeRejection {
    TypeRejection {
        match_type,
        class_name: compile_pattern(class).expect("class pattern"),
        pattern: pattern.map(|p| compile_pattern(p).expect("member pattern")),
    }
}

fn class<'a>(builder: &'a MetaBuilder, name: &str) -> &'a MetaClass {
    builder.find_class(name).unwrap_or_else(|| {
        let known: Vec<&str> = builder.arena().iter().map(MetaClass::name).collect();
        panic!("missing class '{name}', available={known:?}")
    })
}

fn id_of(builder: &MetaBuilder, name: &str) -> ClassId {
    class(builder, name).id()
}

fn function<'a>(class: &'a MetaClass, name: &str) -> &'a MetaFunction {
    class.find_function(name).unwrap_or_else(|| {
        let names: Vec<&str> = class.functions().iter().map(|f| f.name.as_str()).collect();
        panic!("missing function '{name}' in {}, available={names:?}", class.name())
    })
}

fn position(order: &[ClassId], id: ClassId) -> usize {
    order
        .iter()
        .position(|candidate| *candidate == id)
        .unwrap_or_else(|| panic!("{id:?} missing from {order:?}"))
}
