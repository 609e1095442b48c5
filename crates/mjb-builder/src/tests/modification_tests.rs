use super::*;
use mjb_typesystem::{ArgumentModification, FieldModification, Finality, FunctionModification};
use pretty_assertions::assert_eq;

// ════ 5. Ruleset modification tests ════

fn renamed(signature: &str, name: &str) -> FunctionModification {
    FunctionModification {
        rename: Some(name.to_string()),
        ..FunctionModification::exact(signature)
    }
}

fn removed(signature: &str) -> FunctionModification {
    FunctionModification {
        removed: true,
        ..FunctionModification::exact(signature)
    }
}

#[test]
fn rename_keeps_original_name() {
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::object("Box"), |rules| {
        rules.function_modifications.push(renamed("size()const", "length"));
    }));
    let item = ClassItem::new("Box").with_function(FunctionItem::new("size").returning(int()).constant());

    let builder = build(db, model(vec![item]));

    let boxed = class(&builder, "Box");
    assert!(!boxed.has_function("size"));
    let length = function(boxed, "length");
    assert_eq!(length.original_name, "size");
    assert_eq!(length.minimal_signature(), "size()const");
}

#[test]
fn removed_base_function_stays_in_base_but_is_not_inherited() {
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::object("Base"), |rules| {
        rules.function_modifications.push(removed("legacy()"));
    }));
    db.add_entry(TypeEntry::object("Derived"));
    let base = ClassItem::new("Base")
        .with_function(FunctionItem::new("legacy"))
        .with_function(FunctionItem::new("current"));
    let derived = ClassItem::new("Derived").with_base("Base", Access::Public);

    let builder = build(db, model(vec![base, derived]));

    assert!(class(&builder, "Base").has_function("legacy"));
    let derived = class(&builder, "Derived");
    assert!(derived.has_function("current"));
    assert!(!derived.has_function("legacy"));
}

#[test]
fn argument_rename_and_default_removal() {
    let mut argument = ArgumentModification::new(1);
    argument.rename_to = Some("width".to_string());
    argument.remove_default_expression = true;
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::object("Widget"), |rules| {
        rules.function_modifications.push(FunctionModification {
            argument_mods: vec![argument],
            ..FunctionModification::exact("resize(int)")
        });
    }));
    let item = ClassItem::new("Widget")
        .with_function(FunctionItem::new("resize").with_argument(arg("", int()).with_default("10")));

    let builder = build(db, model(vec![item]));

    let resize = function(class(&builder, "Widget"), "resize");
    let argument = &resize.arguments[0];
    assert_eq!(argument.name, "width");
    assert!(argument.has_name);
    assert_eq!(argument.default_value_expression, "");
    assert_eq!(argument.original_default_value_expression, "10");
}

#[test]
fn replaced_default_expression_wins() {
    let mut argument = ArgumentModification::new(1);
    argument.replaced_default_expression = Some("42".to_string());
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::object("Widget"), |rules| {
        rules.function_modifications.push(FunctionModification {
            argument_mods: vec![argument],
            ..FunctionModification::exact("resize(int)")
        });
    }));
    let item = ClassItem::new("Widget")
        .with_function(FunctionItem::new("resize").with_argument(arg("w", int()).with_default("10")));

    let builder = build(db, model(vec![item]));

    let resize = function(class(&builder, "Widget"), "resize");
    assert_eq!(resize.arguments[0].default_value_expression, "42");
}

#[test]
fn modified_argument_type_is_translated() {
    let mut argument = ArgumentModification::new(1);
    argument.modified_type = Some("double".to_string());
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::object("Widget"), |rules| {
        rules.function_modifications.push(FunctionModification {
            argument_mods: vec![argument],
            ..FunctionModification::exact("scale(int)")
        });
    }));
    let item = ClassItem::new("Widget").with_function(FunctionItem::new("scale").with_argument(arg("factor", int())));

    let builder = build(db, model(vec![item]));

    let scale = function(class(&builder, "Widget"), "scale");
    let modified = scale.arguments[0].modified_type.as_ref().expect("modified type");
    assert_eq!(modified.type_entry().name(), "double");
    assert_eq!(scale.arguments[0].meta_type.type_entry().name(), "int");
}

#[test]
fn access_and_finality_modifications_apply() {
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::object("Widget"), |rules| {
        rules.function_modifications.push(FunctionModification {
            access: Some(Access::Protected),
            finality: Some(Finality::Final),
            ..FunctionModification::exact("update()")
        });
    }));
    let item = ClassItem::new("Widget").with_function(FunctionItem::new("update").virtual_());

    let builder = build(db, model(vec![item]));

    let update = function(class(&builder, "Widget"), "update");
    assert_eq!(update.access(), Access::Protected);
    assert_eq!(update.original_access(), Access::Public);
    assert!(update.is_final_in_target_lang());
}

#[test]
fn field_modification_renames_and_locks() {
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::value("Point"), |rules| {
        rules.field_modifications.push(FieldModification {
            name: "x".to_string(),
            rename: Some("xPos".to_string()),
            writable: false,
            ..FieldModification::default()
        });
    }));
    let item = ClassItem::new("Point").with_field(VariableItem::new("x", int()));

    let builder = build(db, model(vec![item]));

    let field = class(&builder, "Point").field("xPos").expect("renamed field");
    assert_eq!(field.original_name, "x");
    assert!(field.readable);
    assert!(!field.writable);
}

#[test]
fn unmatched_modification_does_not_fail_build() {
    let mut db = TypeDatabase::new();
    db.add_entry(with_rules(TypeEntry::object("Widget"), |rules| {
        rules.function_modifications.push(removed("missing(int)"));
    }));
    let item = ClassItem::new("Widget").with_function(FunctionItem::new("missing"));

    let builder = build(db, model(vec![item]));

    assert!(class(&builder, "Widget").has_function("missing"));
}
