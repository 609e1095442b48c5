//! Canonical spelling of function signatures.

const fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Collapse whitespace so that equivalent spellings compare equal.
///
/// Whitespace survives only as a single space between two identifier
/// characters (`unsigned int`, `const QString`).
#[must_use]
pub fn normalized_signature(signature: &str) -> String {
    let mut result = String::with_capacity(signature.len());
    let mut pending_space = false;
    for c in signature.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space
            && is_identifier_char(c)
            && result.chars().last().is_some_and(is_identifier_char)
        {
            result.push(' ');
        }
        pending_space = false;
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo( const QString & , int )", "foo(const QString&,int)")]
    #[case("val() const", "val()const")]
    #[case("bar(unsigned   int)", "bar(unsigned int)")]
    #[case("baz(QList< int >)", "baz(QList<int>)")]
    fn whitespace_is_collapsed(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalized_signature(input), expected);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalized_signature("f(const Foo &, int * p)");
        assert_eq!(normalized_signature(&once), once);
    }
}
