//! Default-value expressions and constant evaluation.
//!
//! Default values are copied from the headers as written. Generated code
//! lives outside the class scope, so unqualified static fields, enumerators
//! and constructor calls are rewritten to their qualified form. This is a
//! textual rewrite; expressions are not parsed.

use std::sync::LazyLock;

use mjb_meta::{ClassId, MetaEnum, MetaType};
use regex::Regex;

use crate::builder::MetaBuilder;
use crate::lookup::TranslateFlags;

static QUALIFIED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(::)?[A-Za-z_]\w*(::[A-Za-z_]\w*)*$").expect("valid identifier pattern")
});

/// `Callee(inner)`, callee possibly qualified.
static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:::)?[A-Za-z_]\w*(?:::[A-Za-z_]\w*)*)\s*\((.*)\)$").expect("valid call pattern")
});

fn is_qualified_identifier(text: &str) -> bool {
    QUALIFIED_IDENTIFIER.is_match(text)
}

fn split_call(text: &str) -> Option<(&str, &str)> {
    let captures = CALL.captures(text)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    let digits = digits.trim_end_matches(['u', 'U', 'l', 'L']);
    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

/// `full` is `part` or ends with `::part`.
fn is_qualified_suffix(full: &str, part: &str) -> bool {
    full == part
        || full
            .strip_suffix(part)
            .is_some_and(|head| head.ends_with("::"))
}

/// Expressions that need no qualification.
#[must_use]
pub(crate) fn dont_fix_default_value(expression: &str) -> bool {
    let expression = expression.trim();
    expression.is_empty()
        || expression == "{}"
        || matches!(expression, "nullptr" | "NULL" | "true" | "false")
        || expression.starts_with('"')
        || expression.starts_with('\'')
        || parse_integer(expression).is_some()
        || expression.trim_end_matches(['f', 'F']).parse::<f64>().is_ok()
}

/// The scope prefix to put in front of `value` so that it is qualified by
/// `scope_parts`, reusing any scope segments `value` already spells out.
///
/// With scope `["NS", "Class"]`, `Class::Value` needs `NS::` and `Value`
/// needs `NS::Class::`.
#[must_use]
pub fn resolve_scope_prefix(scope_parts: &[&str], value: &str) -> String {
    let mut name = String::new();
    for part in scope_parts.iter().rev() {
        let prefix = format!("{part}::");
        if value.starts_with(&prefix) {
            name.clear();
        } else {
            name.insert_str(0, &prefix);
        }
    }
    name
}

fn qualify_with(meta_enum: &MetaEnum, value: &str) -> String {
    let qualifier = meta_enum.value_qualifier();
    if qualifier.is_empty() {
        return value.to_string();
    }
    let parts: Vec<&str> = qualifier.split("::").collect();
    format!("{}{value}", resolve_scope_prefix(&parts, value))
}

impl MetaBuilder {
    /// Class and its enclosing classes, innermost first.
    fn class_chain(&self, current: Option<ClassId>) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut context = current;
        while let Some(id) = context {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            context = self.arena[id].enclosing_class;
        }
        chain
    }

    /// The enum with this qualified name, class-scoped or global.
    pub(crate) fn find_meta_enum(&self, name: &str) -> Option<&MetaEnum> {
        self.global_enums
            .iter()
            .find(|e| e.name() == name)
            .or_else(|| self.arena.iter().flat_map(|c| c.enums.iter()).find(|e| e.name() == name))
    }

    /// `Class::field` for a static field of the current class chain.
    pub(crate) fn qualify_static_field(&self, name: &str, current: Option<ClassId>) -> Option<String> {
        if name.contains("::") {
            return None;
        }
        self.class_chain(current).into_iter().find_map(|id| {
            let class = &self.arena[id];
            class
                .fields
                .iter()
                .any(|f| f.is_static && f.original_name == name)
                .then(|| format!("{}::{name}", class.name()))
        })
    }

    fn qualify_enum_value(&self, value: &str, current: Option<ClassId>) -> Option<String> {
        let last = value.rsplit("::").next().unwrap_or(value);
        self.class_chain(current)
            .into_iter()
            .find_map(|id| self.arena[id].find_enum_for_value(last))
            .or_else(|| self.global_enums.iter().find(|e| e.find_value(last).is_some()))
            .map(|meta_enum| qualify_with(meta_enum, value))
    }

    fn qualify_identifier(&self, text: &str, current: Option<ClassId>) -> Option<String> {
        if !is_qualified_identifier(text) {
            return None;
        }
        self.qualify_static_field(text, current)
            .or_else(|| self.qualify_enum_value(text, current))
    }

    /// Rewrite a default-value expression of an argument of `meta_type`.
    pub(crate) fn fix_default_value(
        &self,
        expression: &str,
        meta_type: &MetaType,
        current: Option<ClassId>,
    ) -> String {
        let expression = expression.trim();
        if dont_fix_default_value(expression) {
            return expression.to_string();
        }
        if meta_type.is_enum() || meta_type.is_flags() {
            return self.fix_enum_default(expression, meta_type, current);
        }
        if meta_type.is_container() {
            if let Some(fixed) = self.fix_container_default(expression, current) {
                return fixed;
            }
        }
        if let Some(qualified) = self.qualify_identifier(expression, current) {
            return qualified;
        }
        if let Some((callee, inner)) = split_call(expression) {
            let inner = inner.trim();
            let inner = self
                .qualify_identifier(inner, current)
                .unwrap_or_else(|| inner.to_string());
            let type_name = meta_type.qualified_name();
            let callee = if is_qualified_suffix(type_name, callee) {
                type_name
            } else {
                callee
            };
            return format!("{callee}({inner})");
        }
        expression.to_string()
    }

    fn enum_of(&self, meta_type: &MetaType) -> Option<&MetaEnum> {
        let entry = meta_type.type_entry();
        let enum_name = entry.parent_enum().unwrap_or_else(|| entry.name());
        self.find_meta_enum(enum_name)
    }

    /// Qualify each operand of `A | B`, keeping casts like `Flags(A)`.
    pub(crate) fn fix_enum_default(
        &self,
        expression: &str,
        meta_type: &MetaType,
        current: Option<ClassId>,
    ) -> String {
        if parse_integer(expression).is_some() {
            return expression.to_string();
        }
        expression
            .split('|')
            .map(|operand| self.fix_enum_operand(operand.trim(), meta_type, current))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn fix_enum_operand(&self, operand: &str, meta_type: &MetaType, current: Option<ClassId>) -> String {
        if let Some((callee, inner)) = split_call(operand) {
            let inner = self.fix_enum_default(inner.trim(), meta_type, current);
            let type_name = meta_type.qualified_name();
            let callee = if is_qualified_suffix(type_name, callee) {
                type_name
            } else {
                callee
            };
            return format!("{callee}({inner})");
        }
        if parse_integer(operand).is_some() || !is_qualified_identifier(operand) {
            return operand.to_string();
        }
        let last = operand.rsplit("::").next().unwrap_or(operand);
        if let Some(meta_enum) = self.enum_of(meta_type).filter(|e| e.find_value(last).is_some()) {
            return qualify_with(meta_enum, operand);
        }
        self.qualify_identifier(operand, current)
            .unwrap_or_else(|| operand.to_string())
    }

    /// `QList<Inner>()` inside `Outer` becomes `QList<Outer::Inner>()`.
    fn fix_container_default(&self, expression: &str, current: Option<ClassId>) -> Option<String> {
        let open = expression.find('<')?;
        let close = expression.rfind('>')?;
        if close < open {
            return None;
        }
        let arguments: Vec<String> = expression[open + 1..close]
            .split(',')
            .map(|argument| {
                let argument = argument.trim();
                self.find_type_entries(argument, current, TranslateFlags::default())
                    .ok()
                    .and_then(|entries| entries.into_iter().next())
                    .filter(|entry| entry.is_complex() && is_qualified_suffix(entry.name(), argument))
                    .map_or_else(|| argument.to_string(), |entry| entry.name().to_string())
            })
            .collect();
        Some(format!(
            "{}<{}>{}",
            &expression[..open],
            arguments.join(", "),
            &expression[close + 1..]
        ))
    }

    /// Integer value of an array dimension or constant expression.
    ///
    /// Literals (decimal, hex, octal, `true`, `false`) evaluate directly;
    /// anything that is not an identifier evaluates to 0; identifiers are
    /// looked up as enumerators of the current class chain, of any class,
    /// then of the global enums.
    pub(crate) fn find_out_value_from_string(&self, text: &str, current: Option<ClassId>) -> Option<i64> {
        let text = text.trim();
        if let Some(value) = parse_integer(text) {
            return Some(value);
        }
        match text {
            "true" => return Some(1),
            "false" => return Some(0),
            _ => {}
        }
        if !is_qualified_identifier(text) {
            return Some(0);
        }
        let last = text.rsplit("::").next().unwrap_or(text);
        let value_of = |meta_enum: &MetaEnum| meta_enum.find_value(last).map(|v| v.value);

        self.class_chain(current)
            .into_iter()
            .find_map(|id| self.arena[id].enums.iter().find_map(value_of))
            .or_else(|| {
                self.arena
                    .iter()
                    .flat_map(|c| c.enums.iter())
                    .find_map(value_of)
            })
            .or_else(|| self.global_enums.iter().find_map(value_of))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&["NS", "Class"], "Value", "NS::Class::")]
    #[case(&["NS", "Class"], "Class::Value", "NS::")]
    #[case(&["NS", "Class"], "NS::Class::Value", "")]
    #[case(&[], "Value", "")]
    fn scope_prefix(#[case] scope: &[&str], #[case] value: &str, #[case] expected: &str) {
        assert_eq!(resolve_scope_prefix(scope, value), expected);
    }

    #[rstest]
    #[case("0", Some(0))]
    #[case("42", Some(42))]
    #[case("0x1F", Some(31))]
    #[case("010", Some(8))]
    #[case("-3", Some(-3))]
    #[case("10u", Some(10))]
    #[case("Red", None)]
    fn integer_literals(#[case] text: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_integer(text), expected);
    }

    #[rstest]
    #[case("nullptr", true)]
    #[case("\"text\"", true)]
    #[case("1.5", true)]
    #[case("{}", true)]
    #[case("Red", false)]
    #[case("QString()", false)]
    fn literal_defaults_are_left_alone(#[case] expression: &str, #[case] expected: bool) {
        assert_eq!(dont_fix_default_value(expression), expected);
    }

    #[test]
    fn call_splitting() {
        assert_eq!(split_call("Point(0, 0)"), Some(("Point", "0, 0")));
        assert_eq!(split_call("NS::Flags(A)"), Some(("NS::Flags", "A")));
        assert_eq!(split_call("a + b"), None);
    }

    #[test]
    fn qualified_suffix_requires_segment_boundary() {
        assert!(is_qualified_suffix("NS::Point", "Point"));
        assert!(is_qualified_suffix("Point", "Point"));
        assert!(!is_qualified_suffix("NS::MyPoint", "Point"));
    }
}
