//! Ruleset rejection rules.

use regex::Regex;

use crate::error::TypesystemError;

/// What a rejection rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionMatch {
    /// The whole class.
    Class,
    /// Functions, by name or by minimal signature.
    Function,
    Field,
    Enum,
    /// Functions taking an argument of the named type.
    ArgumentType,
    /// Functions returning the named type.
    ReturnType,
}

/// One `<rejection>`-style rule: a class pattern plus an optional member pattern.
#[derive(Debug, Clone)]
pub struct TypeRejection {
    pub match_type: RejectionMatch,
    pub class_name: Regex,
    pub pattern: Option<Regex>,
}

/// Compile a ruleset pattern. `*` means "anything", other text is an
/// anchored regular expression.
///
/// # Errors
///
/// Returns [`TypesystemError::InvalidPattern`] for malformed expressions.
pub fn compile_pattern(pattern: &str) -> Result<Regex, TypesystemError> {
    let source = if pattern == "*" {
        "^.*$".to_string()
    } else {
        format!("^(?:{pattern})$")
    };
    Regex::new(&source).map_err(|error| TypesystemError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: error.to_string(),
    })
}

impl TypeRejection {
    /// Whether this rule rejects `member` of `class_name` for `match_type`.
    #[must_use]
    pub fn rejects(&self, match_type: RejectionMatch, class_name: &str, member: &str) -> bool {
        if self.match_type != match_type || !self.class_name.is_match(class_name) {
            return false;
        }
        match (&self.pattern, match_type) {
            (_, RejectionMatch::Class) => true,
            (Some(pattern), _) => pattern.is_match(member),
            (None, _) => false,
        }
    }

    /// Human-readable reason for the reject log.
    #[must_use]
    pub fn describe(&self) -> String {
        let class = self.class_name.as_str();
        match &self.pattern {
            Some(pattern) => format!("rejected by pattern \"{}\" in class \"{class}\"", pattern.as_str()),
            None => format!("rejected by class pattern \"{class}\""),
        }
    }
}
