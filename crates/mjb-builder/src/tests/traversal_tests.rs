use super::*;
use pretty_assertions::assert_eq;

// ════ 1. Class and namespace traversal tests ════

#[test]
fn class_without_entry_is_rejected() {
    let builder = build(TypeDatabase::new(), model(vec![ClassItem::new("Unknown")]));

    assert!(builder.classes().is_empty());
    let rejected: Vec<&Rejection> = builder.rejects().entries(RejectCategory::Classes).collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].reason, RejectReason::NotInTypeSystem);
    assert_eq!(rejected[0].signature, "Unknown");
}

#[test]
fn class_redeclared_as_primitive_is_rejected() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::primitive("Handle"));

    let builder = build(db, model(vec![ClassItem::new("Handle")]));

    let reasons: Vec<RejectReason> = builder
        .rejects()
        .entries(RejectCategory::Classes)
        .map(|r| r.reason)
        .collect();
    assert_eq!(reasons, vec![RejectReason::RedefinedToNotClass]);
}

#[test]
fn rejected_class_is_generation_disabled() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Hidden"));
    db.add_rejection(rejection(RejectionMatch::Class, "Hidden", None));

    let builder = build(db, model(vec![ClassItem::new("Hidden")]));

    assert!(builder.find_class("Hidden").is_none());
    let rejected = builder
        .rejects()
        .entries(RejectCategory::Classes)
        .next()
        .expect("rejection");
    assert_eq!(rejected.reason, RejectReason::GenerationDisabled);
    assert_eq!(rejected.signature, "Hidden");
}

#[test]
fn namespace_classes_are_nested() {
    let mut db = TypeDatabase::new();
    db.add_entry(namespace_entry("NS"));
    db.add_entry(TypeEntry::object("NS::Widget"));
    let mut model = CodeModel::default();
    model
        .global
        .namespaces
        .push(namespace("NS", vec![ClassItem::new("Widget")]));

    let builder = build(db, model);

    let ns = id_of(&builder, "NS");
    let widget = class(&builder, "NS::Widget");
    assert_eq!(widget.enclosing_class, Some(ns));
    assert!(class(&builder, "NS").inner_classes.contains(&widget.id()));
    assert!(class(&builder, "NS").is_namespace());
}

#[test]
fn namespace_without_entry_is_rejected() {
    let mut model = CodeModel::default();
    model.global.namespaces.push(NamespaceItem::new("Detail"));

    let builder = build(TypeDatabase::new(), model);

    assert!(builder.rejects().contains(RejectCategory::Classes, "Detail"));
}

#[test]
fn nested_class_records_enclosing_class() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Outer"));
    db.add_entry(TypeEntry::object("Outer::Inner"));
    let mut outer = ClassItem::new("Outer");
    outer.scope.classes.push(ClassItem::new("Inner"));

    let builder = build(db, model(vec![outer]));

    let outer_id = id_of(&builder, "Outer");
    assert_eq!(class(&builder, "Outer::Inner").enclosing_class, Some(outer_id));
    assert_eq!(
        class(&builder, "Outer").inner_classes,
        vec![id_of(&builder, "Outer::Inner")]
    );
}

// ════ 2. Field traversal tests ════

#[test]
fn fields_skip_private_friend_and_untranslatable() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Point"));
    let mut friend_field = VariableItem::new("buddy", int());
    friend_field.is_friend = true;
    let point = ClassItem::new("Point")
        .with_field(VariableItem::new("x", int()))
        .with_field(VariableItem::new("y", int()))
        .with_field(VariableItem::new("secret", int()).with_access(Access::Private))
        .with_field(friend_field)
        .with_field(VariableItem::new("opaque", TypeInfo::named("Opaque")));

    let builder = build(db, model(vec![point]));

    let names: Vec<&str> = class(&builder, "Point")
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["x", "y"]);
}

#[test]
fn rejected_field_is_logged_with_type() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Point"));
    db.add_rejection(rejection(RejectionMatch::Field, "Point", Some("cache")));
    let point = ClassItem::new("Point").with_field(VariableItem::new("cache", int()));

    let builder = build(db, model(vec![point]));

    assert!(class(&builder, "Point").fields.is_empty());
    let rejected = builder
        .rejects()
        .entries(RejectCategory::Fields)
        .next()
        .expect("field rejection");
    assert_eq!(rejected.signature, "int Point::cache");
    assert_eq!(rejected.reason, RejectReason::GenerationDisabled);
}

#[test]
fn static_field_keeps_static_flag() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Counter"));
    let counter = ClassItem::new("Counter").with_field(VariableItem::new("total", int()).static_());

    let builder = build(db, model(vec![counter]));

    let field = class(&builder, "Counter").field("total").expect("field");
    assert!(field.is_static);
    assert_eq!(field.enclosing_class, Some(id_of(&builder, "Counter")));
}

// ════ 3. Function traversal tests ════

#[test]
fn unknown_argument_type_rejects_function() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    let widget = ClassItem::new("Widget")
        .with_function(FunctionItem::new("setHandle").with_argument(arg("h", TypeInfo::named("Handle").with_pointer())))
        .with_function(FunctionItem::new("show"));

    let builder = build(db, model(vec![widget]));

    let widget = class(&builder, "Widget");
    assert!(widget.has_function("show"));
    assert!(!widget.has_function("setHandle"));
    assert!(builder.rejects().entries(RejectCategory::Functions).any(|r| {
        r.reason == RejectReason::UnmatchedArgumentType && r.signature.starts_with("Widget::setHandle(")
    }));
}

#[test]
fn unknown_return_type_rejects_function() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    let widget = ClassItem::new("Widget").with_function(FunctionItem::new("style").returning(TypeInfo::named("Style")));

    let builder = build(db, model(vec![widget]));

    assert!(!class(&builder, "Widget").has_function("style"));
    assert!(builder
        .rejects()
        .entries(RejectCategory::Functions)
        .any(|r| r.reason == RejectReason::UnmatchedReturnType && r.signature == "Widget::style()"));
}

#[test]
fn rejected_function_is_generation_disabled() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    db.add_rejection(rejection(RejectionMatch::Function, "Widget", Some("secret")));
    let widget = ClassItem::new("Widget")
        .with_function(FunctionItem::new("secret"))
        .with_function(FunctionItem::new("visible"));

    let builder = build(db, model(vec![widget]));

    assert!(builder.rejects().contains(RejectCategory::Functions, "Widget::secret()"));
    assert!(class(&builder, "Widget").has_function("visible"));
}

#[test]
fn defaulted_argument_of_unknown_type_is_stripped() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    let widget = ClassItem::new("Widget").with_function(
        FunctionItem::new("resize")
            .with_argument(arg("w", int()))
            .with_argument(arg("hint", TypeInfo::named("Hint")).with_default("Hint()")),
    );

    let builder = build(db, model(vec![widget]));

    let resize = function(class(&builder, "Widget"), "resize");
    assert_eq!(resize.arguments.len(), 1);
    assert_eq!(resize.arguments[0].name, "w");
}

#[test]
fn deleted_default_constructor_blocks_synthesis() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    let mut deleted = FunctionItem::new("Widget").with_kind(FunctionKind::Constructor);
    deleted.is_deleted = true;

    let builder = build(db, model(vec![ClassItem::new("Widget").with_function(deleted)]));

    let widget = class(&builder, "Widget");
    assert!(widget.flags.has_deleted_default_constructor);
    assert!(!widget.has_constructors());
}

#[test]
fn private_destructor_makes_class_final() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Singleton"));
    let destructor = FunctionItem::new("~Singleton")
        .with_kind(FunctionKind::Destructor)
        .with_access(Access::Private);

    let builder = build(db, model(vec![ClassItem::new("Singleton").with_function(destructor)]));

    let singleton = class(&builder, "Singleton");
    assert!(singleton.flags.has_private_destructor);
    assert!(singleton.is_final_in_target_lang());
    assert!(!singleton.has_function("~Singleton"));
}

#[test]
fn constructor_is_named_after_class_entry() {
    let mut db = TypeDatabase::new();
    db.add_entry(namespace_entry("NS"));
    db.add_entry(TypeEntry::object("NS::Widget"));
    let widget = ClassItem::new("Widget")
        .with_function(FunctionItem::new("Widget").with_kind(FunctionKind::Constructor).with_argument(arg("size", int())));
    let mut model = CodeModel::default();
    model.global.namespaces.push(namespace("NS", vec![widget]));

    let builder = build(db, model);

    let widget = class(&builder, "NS::Widget");
    let constructors: Vec<&MetaFunction> = widget.constructors().collect();
    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].name, "Widget");
    assert_eq!(constructors[0].function_type, FunctionType::Constructor);
}

#[test]
fn namespace_functions_are_static() {
    let mut db = TypeDatabase::new();
    db.add_entry(namespace_entry("Util"));
    let mut util = NamespaceItem::new("Util");
    util.scope.functions.push(FunctionItem::new("reset"));
    let mut model = CodeModel::default();
    model.global.namespaces.push(util);

    let builder = build(db, model);

    assert!(function(class(&builder, "Util"), "reset").is_static());
}

#[test]
fn variadic_function_gets_varargs_argument() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Logger"));
    let mut log = FunctionItem::new("log").with_argument(arg("format", TypeInfo::named("char").with_const().with_pointer()));
    log.is_variadic = true;

    let builder = build(db, model(vec![ClassItem::new("Logger").with_function(log)]));

    let log = function(class(&builder, "Logger"), "log");
    assert_eq!(log.arguments.len(), 2);
    assert!(log.arguments[1].meta_type.type_entry().is_varargs());
}

#[test]
fn extension_mode_skips_meta_object_plumbing() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Emitter"));
    let emitter = ClassItem::new("Emitter")
        .with_function(FunctionItem::new("metaObject"))
        .with_function(FunctionItem::new("qt_metacall"))
        .with_function(
            FunctionItem::new("changed")
                .with_kind(FunctionKind::Signal)
                .with_argument(arg("", TypeInfo::named("QPrivateSignal"))),
        );
    let mut config = config();
    config.builder.extension_mode = true;

    let builder = build_with(db, model(vec![emitter]), config);

    let emitter = class(&builder, "Emitter");
    assert!(!emitter.has_function("metaObject"));
    assert!(!emitter.has_function("qt_metacall"));
    let changed = function(emitter, "changed");
    assert!(changed.arguments.is_empty());
    assert!(changed.flags.private_signal);
}

#[test]
fn deprecated_function_is_rejected_when_skipping() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    let mut old = FunctionItem::new("old");
    old.is_deprecated = true;
    let mut config = config();
    config.builder.skip_deprecated = true;

    let builder = build_with(db, model(vec![ClassItem::new("Widget").with_function(old)]), config);

    assert!(!class(&builder, "Widget").has_function("old"));
    assert!(builder
        .rejects()
        .entries(RejectCategory::Functions)
        .any(|r| r.reason == RejectReason::Deprecated && r.signature == "Widget::old()"));
}
