use super::*;
use mjb_typesystem::SmartPointerSpec;
use pretty_assertions::assert_eq;

// ════ 10. Smart pointer tests ════

fn shared_ptr_db() -> TypeDatabase {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::new(
        "SharedPtr",
        EntryKind::SmartPointer {
            spec: SmartPointerSpec {
                getter: "get".to_string(),
                ref_count_method: Some("useCount".to_string()),
                null_check_method: Some("isNull".to_string()),
                reset_method: Some("reset".to_string()),
                ..SmartPointerSpec::default()
            },
            complex: ComplexData::default(),
        },
    ));
    db
}

#[test]
fn missing_class_is_synthesized_with_all_accessors() {
    let builder = build(shared_ptr_db(), CodeModel::default());

    assert_eq!(builder.smart_pointers().len(), 1);
    let pointer = class(&builder, "SharedPtr");
    let mut names: Vec<&str> = pointer.functions().iter().map(|f| f.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec!["SharedPtr", "SharedPtr", "get", "isNull", "reset", "reset", "useCount"]
    );
    assert!(pointer.functions().iter().all(|f| f.attributes.added_method));

    let get = function(pointer, "get");
    assert!(get.is_constant);
    assert!(get.return_type.type_entry().is_template_argument());

    let use_count = function(pointer, "useCount");
    assert_eq!(use_count.return_type.type_entry().name(), "int");
    assert_eq!(
        function(pointer, "isNull").return_type.type_entry().name(),
        "bool"
    );
}

#[test]
fn declared_accessors_are_not_duplicated() {
    let mut header = ClassItem::new("SharedPtr").with_function(
        FunctionItem::new("get")
            .returning(TypeInfo::named("T").with_pointer())
            .constant(),
    );
    header.template_parameters = vec!["T".to_string()];

    let builder = build(shared_ptr_db(), model(vec![header]));

    let pointer = class(&builder, "SharedPtr");
    assert_eq!(pointer.functions_named("get").count(), 1);
    assert!(!function(pointer, "get").attributes.added_method);
    assert_eq!(pointer.constructors().count(), 2);
}
