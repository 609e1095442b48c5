use super::*;
use pretty_assertions::assert_eq;

// ════ 7. Free operator tests ════

fn binary_operator(name: &str, returns: TypeInfo, left: TypeInfo, right: TypeInfo) -> FunctionItem {
    FunctionItem::new(name)
        .returning(returns)
        .with_argument(arg("lhs", left))
        .with_argument(arg("rhs", right))
}

fn point_db() -> TypeDatabase {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Point"));
    db
}

#[test]
fn global_comparison_attaches_to_left_operand_class() {
    let mut model = model(vec![ClassItem::new("Point")]);
    model.global.scope.functions.push(binary_operator(
        "operator==",
        TypeInfo::named("bool"),
        const_ref("Point"),
        const_ref("Point"),
    ));

    let builder = build(point_db(), model);

    let equals = function(class(&builder, "Point"), "operator==");
    assert_eq!(equals.arguments.len(), 1);
    assert!(equals.flags.operator_leading_class_argument_removed);
    assert!(!equals.is_reverse_operator);
    assert!(!equals.is_static());
}

#[test]
fn primitive_left_operand_gives_reverse_operator() {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Vector"));
    let mut model = model(vec![ClassItem::new("Vector")]);
    model.global.scope.functions.push(binary_operator(
        "operator*",
        TypeInfo::named("Vector"),
        TypeInfo::named("double"),
        const_ref("Vector"),
    ));

    let builder = build(db, model);

    let times = function(class(&builder, "Vector"), "operator*");
    assert!(times.is_reverse_operator);
    assert_eq!(times.arguments.len(), 1);
    assert_eq!(times.arguments[0].meta_type.type_entry().name(), "double");
}

#[test]
fn operator_without_class_operand_is_rejected() {
    let mut model = CodeModel::default();
    model
        .global
        .scope
        .functions
        .push(binary_operator("operator<", TypeInfo::named("bool"), int(), int()));

    let builder = build(TypeDatabase::new(), model);

    assert!(
        builder
            .rejects()
            .contains(RejectCategory::Functions, "operator<(int,int)")
    );
    let reasons: Vec<RejectReason> = builder
        .rejects()
        .entries(RejectCategory::Functions)
        .map(|r| r.reason)
        .collect();
    assert_eq!(reasons, vec![RejectReason::UnmatchedOperator]);
}

#[test]
fn stream_operator_attaches_to_stream_class() {
    let mut db = point_db();
    db.add_entry(with_rules(TypeEntry::object("QDataStream"), |rules| {
        rules.is_stream = true;
    }));
    let mut model = model(vec![ClassItem::new("QDataStream"), ClassItem::new("Point")]);
    model.global.scope.functions.push(binary_operator(
        "operator<<",
        TypeInfo::named("QDataStream").with_reference(ReferenceType::LValue),
        TypeInfo::named("QDataStream").with_reference(ReferenceType::LValue),
        const_ref("Point"),
    ));

    let builder = build(db, model);

    let shift = function(class(&builder, "QDataStream"), "operator<<");
    assert_eq!(shift.arguments.len(), 1);
    assert_eq!(shift.arguments[0].meta_type.type_entry().name(), "Point");
    assert!(!class(&builder, "Point").has_function("operator<<"));
}

#[test]
fn friend_operator_is_collected_from_class_body() {
    let mut friend = binary_operator(
        "operator!=",
        TypeInfo::named("bool"),
        const_ref("Point"),
        const_ref("Point"),
    );
    friend.is_friend = true;
    let point = ClassItem::new("Point").with_function(friend);

    let builder = build(point_db(), model(vec![point]));

    let differs = function(class(&builder, "Point"), "operator!=");
    assert_eq!(differs.arguments.len(), 1);
    assert_eq!(differs.arguments[0].argument_index, 0);
}
