use super::*;
use mjb_codemodel::{Indirection, TypeDefItem};
use mjb_typesystem::SmartPointerSpec;
use pretty_assertions::assert_eq;

// ════ 4. Type lookup tests ════

fn builder_for(db: TypeDatabase) -> MetaBuilder {
    MetaBuilder::new(Arc::new(db), config())
}

fn shared_ptr_entry() -> TypeEntry {
    TypeEntry::new(
        "SharedPtr",
        EntryKind::SmartPointer {
            spec: SmartPointerSpec {
                getter: "get".to_string(),
                ..SmartPointerSpec::default()
            },
            complex: ComplexData::default(),
        },
    )
}

#[test]
fn builtin_primitive_resolves() {
    let mut builder = builder_for(TypeDatabase::new());

    let meta_type = builder.translate_type_str("int", None).expect("int");

    assert!(meta_type.is_primitive());
    assert_eq!(meta_type.type_entry().name(), "int");
}

#[test]
fn unknown_type_reports_name() {
    let mut builder = builder_for(TypeDatabase::new());

    let error = builder.translate_type_str("Nope", None).unwrap_err();

    assert_eq!(error.to_string(), "Could not find type \"Nope\".");
}

#[test]
fn same_name_object_and_value_are_ambiguous() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Foo"));
    db.add_entry(TypeEntry::value("Foo"));
    let mut builder = builder_for(db);

    let error = builder.translate_type_str("Foo", None).unwrap_err();

    assert!(error.to_string().starts_with("Ambiguous type \"Foo\""), "{error}");
}

#[test]
fn same_name_primitive_and_smart_pointer_are_tolerated() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::primitive("SharedPtr"));
    db.add_entry(shared_ptr_entry());
    let builder = builder_for(db);

    let entries = builder
        .find_type_entries("SharedPtr", None, crate::lookup::TranslateFlags::default())
        .expect("tolerated ambiguity");

    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|e| e.is_primitive()));
    assert!(entries.iter().any(|e| e.is_smart_pointer()));
}

#[test]
fn same_name_object_and_enum_are_ambiguous() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Foo"));
    db.add_entry(enum_entry("Foo"));
    let builder = builder_for(db);

    let error = builder
        .find_type_entries("Foo", None, crate::lookup::TranslateFlags::default())
        .unwrap_err();

    assert!(error.to_string().starts_with("Ambiguous type \"Foo\""), "{error}");
}

#[test]
fn qualifiers_are_kept() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Point"));
    let mut builder = builder_for(db);

    let meta_type = builder
        .translate_type(&const_ref("Point"), None)
        .expect("const Point &");

    assert!(meta_type.is_constant());
    assert_eq!(meta_type.reference_type(), ReferenceType::LValue);
    assert_eq!(meta_type.cpp_signature(), "const Point &");
}

#[test]
fn unsized_char_array_decays_to_pointer() {
    let mut builder = builder_for(TypeDatabase::new());
    let info = TypeInfo {
        array_elements: vec![String::new()],
        ..TypeInfo::named("char").with_const()
    };

    let meta_type = builder.translate_type(&info, None).expect("const char[]");

    assert!(!meta_type.is_array());
    assert_eq!(meta_type.indirections(), &[Indirection::Pointer]);
}

#[test]
fn sized_array_records_dimension() {
    let mut builder = builder_for(TypeDatabase::new());
    let info = TypeInfo {
        array_elements: vec!["3".to_string()],
        ..int()
    };

    let meta_type = builder.translate_type(&info, None).expect("int[3]");

    assert!(meta_type.is_array());
    assert_eq!(meta_type.array_element_count(), Some(3));
    assert_eq!(meta_type.cpp_signature(), "int[3]");
}

#[test]
fn function_pointer_is_unsupported() {
    let mut builder = builder_for(TypeDatabase::new());
    let info = TypeInfo {
        is_function_pointer: true,
        ..int()
    };

    let error = builder.translate_type(&info, None).unwrap_err();

    assert_eq!(error.to_string(), "Unsupported function pointer.");
}

#[test]
fn smart_pointer_takes_its_pointee() {
    let mut db = TypeDatabase::new();
    db.add_entry(shared_ptr_entry());
    db.add_entry(TypeEntry::object("Foo"));
    let mut builder = builder_for(db);

    let meta_type = builder.translate_type_str("SharedPtr<Foo>", None).expect("SharedPtr<Foo>");

    assert!(meta_type.is_smart_pointer());
    assert_eq!(meta_type.instantiations().len(), 1);
    assert_eq!(meta_type.instantiations()[0].type_entry().name(), "Foo");
}

#[test]
fn smart_pointer_without_instantiation_fails() {
    let mut db = TypeDatabase::new();
    db.add_entry(shared_ptr_entry());
    let mut builder = builder_for(db);

    let error = builder.translate_type_str("SharedPtr", None).unwrap_err();

    assert!(error.to_string().contains("exactly one instantiation"), "{error}");
}

#[test]
fn restricted_smart_pointer_rejects_other_pointees() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::new(
        "SharedPtr",
        EntryKind::SmartPointer {
            spec: SmartPointerSpec {
                getter: "get".to_string(),
                instantiations: vec!["Foo".to_string()],
                ..SmartPointerSpec::default()
            },
            complex: ComplexData::default(),
        },
    ));
    db.add_entry(TypeEntry::object("Foo"));
    db.add_entry(TypeEntry::object("Bar"));
    let mut builder = builder_for(db);

    assert!(builder.translate_type_str("SharedPtr<Foo>", None).is_ok());
    let error = builder.translate_type_str("SharedPtr<Bar>", None).unwrap_err();
    assert!(error.to_string().contains("\"Bar\""), "{error}");
}

#[test]
fn class_scope_is_searched_first() {
    let mut db = TypeDatabase::new();
    let outer_entry = db.add_entry(TypeEntry::object("Outer"));
    db.add_entry(TypeEntry::object("Outer::Inner"));
    let mut builder = builder_for(db);
    let outer = builder.alloc_class(MetaClass::new(outer_entry));

    let meta_type = builder.translate_type_str("Inner", Some(outer)).expect("Inner");

    assert_eq!(meta_type.type_entry().name(), "Outer::Inner");
}

#[test]
fn template_parameter_resolves_when_nothing_else_matches() {
    let mut db = TypeDatabase::new();
    let entry = db.add_entry(TypeEntry::object("Box"));
    let mut builder = builder_for(db);
    let mut template = MetaClass::new(entry);
    template.template_arguments = vec![Arc::new(TypeEntry::new(
        "T",
        EntryKind::TemplateArgument { ordinal: 0 },
    ))];
    let id = builder.alloc_class(template);

    let meta_type = builder.translate_type_str("T", Some(id)).expect("T");

    assert!(meta_type.is_template_argument());
}

#[test]
fn ruleset_type_shadows_template_parameter() {
    let mut db = TypeDatabase::new();
    let entry = db.add_entry(TypeEntry::object("Holder"));
    db.add_entry(TypeEntry::value("T"));
    let mut builder = builder_for(db);
    let mut template = MetaClass::new(entry);
    template.template_arguments = vec![Arc::new(TypeEntry::new(
        "T",
        EntryKind::TemplateArgument { ordinal: 0 },
    ))];
    let id = builder.alloc_class(template);

    let meta_type = builder.translate_type_str("T", Some(id)).expect("T");

    assert!(!meta_type.is_template_argument());
    assert!(meta_type.type_entry().is_value());
}

#[test]
fn typedef_from_code_model_is_followed() {
    let mut model = CodeModel::default();
    model.global.scope.typedefs.push(TypeDefItem {
        name: "Real".to_string(),
        type_info: TypeInfo::named("double"),
        ..TypeDefItem::default()
    });
    let mut builder = builder_for(TypeDatabase::new());
    builder.code_model = Some(Arc::new(model));

    let meta_type = builder.translate_type_str("Real", None).expect("Real");

    assert_eq!(meta_type.type_entry().name(), "double");
}

#[test]
fn flags_template_resolves_to_flags_entry() {
    let mut db = TypeDatabase::new();
    db.add_entry(enum_entry("Color"));
    db.add_entry(TypeEntry::new(
        "Colors",
        EntryKind::Flags {
            original_name: "QFlags<Color>".to_string(),
            enum_name: "Color".to_string(),
        },
    ));
    let mut builder = builder_for(db);

    let meta_type = builder.translate_type_str("QFlags<Color>", None).expect("flags");

    assert!(meta_type.is_flags());
    assert_eq!(meta_type.type_entry().name(), "Colors");
}

#[test]
fn container_instantiation_is_translated() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::new(
        "QList",
        EntryKind::Container {
            container_kind: mjb_typesystem::ContainerKind::List,
            complex: ComplexData::default(),
        },
    ));
    db.add_entry(TypeEntry::value("Point"));
    let mut builder = builder_for(db);

    let meta_type = builder.translate_type_str("QList<Point>", None).expect("QList<Point>");

    assert!(meta_type.is_container());
    assert_eq!(meta_type.cpp_signature(), "QList<Point>");
}
