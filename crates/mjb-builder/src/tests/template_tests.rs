use super::*;
use mjb_typesystem::ContainerKind;
use pretty_assertions::assert_eq;

// ════ 9. Template instantiation tests ════

fn container_template() -> ClassItem {
    let t = TypeInfo::named("T");
    let mut template = ClassItem::new("Container")
        .with_function(FunctionItem::new("value").returning(t.clone()).constant())
        .with_function(FunctionItem::new("set").with_argument(arg(
            "v",
            t.with_const().with_reference(ReferenceType::LValue),
        )));
    template.template_parameters = vec!["T".to_string()];
    template
}

#[test]
fn subclass_of_instantiation_gets_substituted_functions() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Container"));
    db.add_entry(TypeEntry::object("IntBox"));
    let int_box = ClassItem::new("IntBox").with_base("Container<int>", Access::Public);

    let builder = build(db, model(vec![container_template(), int_box]));

    let int_box = class(&builder, "IntBox");
    assert_eq!(int_box.template_base_class, Some(id_of(&builder, "Container")));

    let value = function(int_box, "value");
    assert_eq!(value.return_type.type_entry().name(), "int");
    assert!(value.flags.inherited_from_template);

    let set = function(int_box, "set");
    let argument = &set.arguments[0].meta_type;
    assert_eq!(argument.type_entry().name(), "int");
    assert!(argument.is_constant());
    assert_eq!(argument.reference_type(), ReferenceType::LValue);
}

#[test]
fn void_instantiation_drops_dependent_members() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Container"));
    db.add_entry(TypeEntry::object("Empty"));
    let template = container_template().with_function(FunctionItem::new("size").returning(int()).constant());
    let empty = ClassItem::new("Empty").with_base("Container<void>", Access::Public);

    let builder = build(db, model(vec![template, empty]));

    let empty = class(&builder, "Empty");
    assert!(!empty.has_function("value"));
    assert!(!empty.has_function("set"));
    let size = function(empty, "size");
    assert_eq!(size.return_type.type_entry().name(), "int");
}

#[test]
fn template_keeps_its_own_parameters() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Container"));

    let builder = build(db, model(vec![container_template()]));

    let value = function(class(&builder, "Container"), "value");
    assert!(value.return_type.is_template_argument());
    assert!(!value.flags.inherited_from_template);
}

#[test]
fn ruleset_typedef_of_container_replaces_instantiation() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::new(
        "QList",
        EntryKind::Container {
            container_kind: ContainerKind::List,
            complex: ComplexData::default(),
        },
    ));
    db.add_entry(TypeEntry::new(
        "IntList",
        EntryKind::Typedef {
            source_type: "QList<int>".to_string(),
            complex: ComplexData::default(),
        },
    ));
    db.add_entry(TypeEntry::object("Holder"));
    let holder = ClassItem::new("Holder").with_function(
        FunctionItem::new("values").returning(TypeInfo::named("QList").with_instantiation(int())),
    );

    let builder = build(db, model(vec![holder]));

    let int_list = class(&builder, "IntList");
    assert!(int_list.flags.is_typedef);
    assert_eq!(
        int_list.base_container_type.as_ref().map(|e| e.name()),
        Some("QList")
    );
    let values = function(class(&builder, "Holder"), "values");
    assert_eq!(values.return_type.type_entry().name(), "IntList");
    assert!(!values.return_type.has_instantiations());
}
