use super::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

// ════ 15. Enum traversal tests ════

fn widget_with_enum(db: TypeDatabase, item: EnumItem) -> MetaBuilder {
    let mut widget = ClassItem::new("Widget");
    widget.scope.enums.push(item);
    build(db, model(vec![widget]))
}

fn widget_db(enums: &[TypeEntry]) -> TypeDatabase {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    for entry in enums {
        db.add_entry(entry.clone());
    }
    db
}

#[test]
fn global_enum_registers_unqualified_values() {
    let mut db = TypeDatabase::new();
    db.add_entry(enum_entry("Color"));
    let mut model = CodeModel::default();
    model
        .global
        .scope
        .enums
        .push(enumeration("Color", &[("Red", 0), ("Blue", 1)]));

    let builder = build(db, model);

    let names: Vec<&str> = builder.global_enums().iter().map(MetaEnum::name).collect();
    assert_eq!(names, vec!["Color"]);
    let red = builder.registry().find_type("Red").expect("Red");
    assert!(red.is_enum_value());
}

#[test]
fn class_enum_values_are_scoped_by_class() {
    let builder = widget_with_enum(
        widget_db(&[enum_entry("Widget::State")]),
        enumeration("State", &[("Active", 0), ("Idle", 1)]),
    );

    let widget = class(&builder, "Widget");
    assert_eq!(widget.enums.len(), 1);
    assert_eq!(widget.enums[0].enclosing_class, Some(widget.id()));
    assert!(builder.registry().find_type("Widget::Active").is_some());
    assert!(builder.registry().find_type("Active").is_none());
}

#[test]
fn enum_without_entry_is_rejected() {
    let builder = widget_with_enum(widget_db(&[]), enumeration("Mood", &[("Happy", 0)]));

    assert!(class(&builder, "Widget").enums.is_empty());
    let rejected: Vec<(RejectReason, &str)> = builder
        .rejects()
        .entries(RejectCategory::Enums)
        .map(|r| (r.reason, r.signature.as_str()))
        .collect();
    assert_eq!(rejected, vec![(RejectReason::NotInTypeSystem, "Widget::Mood")]);
}

#[test]
fn rejected_enum_is_logged_as_disabled() {
    let mut db = widget_db(&[enum_entry("Widget::State")]);
    db.add_rejection(rejection(RejectionMatch::Enum, "Widget", Some("State")));

    let builder = widget_with_enum(db, enumeration("State", &[("Active", 0)]));

    assert!(class(&builder, "Widget").enums.is_empty());
    let reasons: Vec<RejectReason> = builder
        .rejects()
        .entries(RejectCategory::Enums)
        .map(|r| r.reason)
        .collect();
    assert_eq!(reasons, vec![RejectReason::GenerationDisabled]);
    assert!(builder.rejects().contains(RejectCategory::Enums, "Widget::State"));
}

#[test]
fn deprecated_enums_and_values_are_skipped_on_request() {
    let mut old = enumeration("Old", &[("Legacy", 0)]);
    old.is_deprecated = true;
    let mut state = enumeration("State", &[("Active", 0), ("Retired", 1)]);
    state.enumerators[1].is_deprecated = true;
    let mut widget = ClassItem::new("Widget");
    widget.scope.enums = vec![old, state];
    let mut config = config();
    config.builder.skip_deprecated = true;

    let builder = build_with(
        widget_db(&[enum_entry("Widget::Old"), enum_entry("Widget::State")]),
        model(vec![widget]),
        config,
    );

    let widget = class(&builder, "Widget");
    assert_eq!(widget.enums.len(), 1);
    let values: Vec<&str> = widget.enums[0].values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(values, vec!["Active"]);
    let reasons: Vec<RejectReason> = builder
        .rejects()
        .entries(RejectCategory::Enums)
        .map(|r| r.reason)
        .collect();
    assert_eq!(reasons, vec![RejectReason::Deprecated]);
}

#[rstest]
#[case("None")]
#[case("0")]
fn null_value_resolves_to_enumerator(#[case] declared: &str) {
    let entry = TypeEntry::new(
        "Widget::Mode",
        EntryKind::Enum {
            flags: None,
            null_value: Some(declared.to_string()),
        },
    );

    let builder = widget_with_enum(
        widget_db(&[entry]),
        enumeration("Mode", &[("None", 0), ("Fast", 1)]),
    );

    let mode = &class(&builder, "Widget").enums[0];
    assert_eq!(mode.null_value.as_deref(), Some("None"));
}

#[test]
fn anonymous_enum_is_found_through_a_value() {
    let mut anonymous = enumeration("", &[("MaxSize", 64)]);
    anonymous.kind = EnumKind::Anonymous;

    let builder = widget_with_enum(widget_db(&[enum_entry("Widget::MaxSize")]), anonymous);

    let widget = class(&builder, "Widget");
    assert_eq!(widget.enums.len(), 1);
    assert!(widget.enums[0].is_anonymous());
    assert_eq!(widget.enums[0].name(), "Widget::MaxSize");
}

#[test]
fn private_enum_gets_non_generating_entry() {
    let mut secret = enumeration("Secret", &[("Hidden", 0)]);
    secret.access = Access::Private;

    let builder = widget_with_enum(widget_db(&[]), secret);

    let entry = builder.registry().find_type("Widget::Secret").expect("registered");
    assert!(entry.is_enum());
    assert!(!entry.generate_code());
    assert_eq!(class(&builder, "Widget").enums.len(), 1);
}
