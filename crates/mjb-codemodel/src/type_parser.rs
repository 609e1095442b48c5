//! Recursive-descent parser for textual C++ type spellings.
//!
//! Rulesets spell types as text (`const QList<Foo *> &`); the builder turns
//! them into [`TypeInfo`] with [`TypeInfo::parse`] before resolution. The
//! grammar covers qualified names, template arguments (including numeric
//! ones), east/west `const`, pointers, references, array dimensions and plain
//! function pointers. Multi-word builtins such as `unsigned int` become one
//! name segment.

use crate::error::CodeModelError;
use crate::type_info::{Indirection, ReferenceType, TypeInfo};

const BUILTIN_WORDS: &[&str] = &["unsigned", "signed", "short", "long", "int", "char", "double"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Scope,
    Less,
    Greater,
    Comma,
    Star,
    Amp,
    AmpAmp,
    LBracket,
    RBracket,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            ':' => {
                if chars.get(i + 1) != Some(&':') {
                    return Err(format!("stray ':' at {i}"));
                }
                tokens.push(Token::Scope);
                i += 2;
            }
            '<' => {
                tokens.push(Token::Less);
                i += 1;
            }
            '>' => {
                tokens.push(Token::Greater);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::AmpAmp);
                    i += 2;
                } else {
                    tokens.push(Token::Amp);
                    i += 1;
                }
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' => {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.next() {
            Some(ref t) if t == expected => Ok(()),
            Some(t) => Err(format!("expected {expected:?}, found {t:?}")),
            None => Err(format!("expected {expected:?}, found end of input")),
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Word(w)) if w == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeInfo, String> {
        let mut info = TypeInfo::default();
        loop {
            if self.eat_word("const") {
                info.is_constant = true;
            } else if self.eat_word("volatile") {
                info.is_volatile = true;
            } else {
                break;
            }
        }

        self.parse_name(&mut info)?;
        self.parse_declarator(&mut info)?;
        Ok(info)
    }

    fn parse_name(&mut self, info: &mut TypeInfo) -> Result<(), String> {
        // Leading `::` for the global scope.
        if self.peek() == Some(&Token::Scope) {
            self.pos += 1;
        }
        loop {
            let Some(Token::Word(word)) = self.next() else {
                return Err("expected a type name".to_string());
            };
            let mut segment = word;
            if BUILTIN_WORDS.contains(&segment.as_str()) {
                while let Some(Token::Word(w)) = self.peek() {
                    if !BUILTIN_WORDS.contains(&w.as_str()) {
                        break;
                    }
                    segment.push(' ');
                    segment.push_str(w);
                    self.pos += 1;
                }
            }
            info.qualified_name.push(segment);

            if self.peek() == Some(&Token::Less) {
                self.pos += 1;
                info.instantiations.clear();
                if self.peek() != Some(&Token::Greater) {
                    loop {
                        let arg = self.parse_type()?;
                        info.instantiations.push(arg);
                        match self.next() {
                            Some(Token::Comma) => {}
                            Some(Token::Greater) => break,
                            other => return Err(format!("unterminated template arguments near {other:?}")),
                        }
                    }
                } else {
                    self.pos += 1;
                }
            }

            if self.peek() == Some(&Token::Scope) {
                self.pos += 1;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_declarator(&mut self, info: &mut TypeInfo) -> Result<(), String> {
        loop {
            match self.peek() {
                Some(Token::Word(w)) if w == "const" => {
                    self.pos += 1;
                    match info.indirections.last_mut() {
                        Some(last) => *last = Indirection::ConstPointer,
                        None => info.is_constant = true,
                    }
                }
                Some(Token::Word(w)) if w == "volatile" => {
                    self.pos += 1;
                    info.is_volatile = true;
                }
                Some(Token::Star) => {
                    self.pos += 1;
                    info.indirections.push(Indirection::Pointer);
                }
                Some(Token::Amp) => {
                    self.pos += 1;
                    info.reference_type = ReferenceType::LValue;
                }
                Some(Token::AmpAmp) => {
                    self.pos += 1;
                    info.reference_type = ReferenceType::RValue;
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let mut dimension = String::new();
                    while let Some(token) = self.next() {
                        match token {
                            Token::RBracket => break,
                            Token::Word(w) => dimension.push_str(&w),
                            Token::Scope => dimension.push_str("::"),
                            other => return Err(format!("unexpected {other:?} in array dimension")),
                        }
                    }
                    info.array_elements.push(dimension);
                }
                Some(Token::LParen) => {
                    self.pos += 1;
                    self.expect(&Token::Star)?;
                    self.expect(&Token::RParen)?;
                    self.expect(&Token::LParen)?;
                    info.is_function_pointer = true;
                    if self.peek() == Some(&Token::RParen) {
                        self.pos += 1;
                    } else {
                        loop {
                            let arg = self.parse_type()?;
                            info.arguments.push(arg);
                            match self.next() {
                                Some(Token::Comma) => {}
                                Some(Token::RParen) => break,
                                other => return Err(format!("unterminated parameter list near {other:?}")),
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}

impl TypeInfo {
    /// Parse a C++ type spelling.
    ///
    /// # Errors
    ///
    /// Returns [`CodeModelError::TypeParse`] when the text is not a type.
    pub fn parse(text: &str) -> Result<Self, CodeModelError> {
        let fail = |reason: String| CodeModelError::TypeParse {
            text: text.to_string(),
            reason,
        };
        let tokens = tokenize(text).map_err(fail)?;
        if tokens.is_empty() {
            return Err(CodeModelError::TypeParse {
                text: text.to_string(),
                reason: "empty type".to_string(),
            });
        }
        let mut parser = Parser { tokens, pos: 0 };
        let info = parser.parse_type().map_err(fail)?;
        if let Some(rest) = parser.peek() {
            return Err(CodeModelError::TypeParse {
                text: text.to_string(),
                reason: format!("trailing input starting at {rest:?}"),
            });
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("int", "int")]
    #[case("unsigned int", "unsigned int")]
    #[case("const QString &", "const QString &")]
    #[case("QString const&", "const QString &")]
    #[case("QList<NS::Foo*>", "QList<NS::Foo *>")]
    #[case("Foo &&", "Foo &&")]
    #[case("char * const", "char * const")]
    #[case("QMap<QString, QList<int> >", "QMap<QString, QList<int>>")]
    #[case("Matrix<2,3>", "Matrix<2, 3>")]
    fn parses_and_respells(#[case] input: &str, #[case] expected: &str) {
        let info = TypeInfo::parse(input).expect("type should parse");
        assert_eq!(info.to_string(), expected);
    }

    #[test]
    fn array_dimensions_are_collected_in_order() {
        let info = TypeInfo::parse("int[2][N]").expect("array");
        assert_eq!(info.array_elements, vec!["2".to_string(), "N".to_string()]);
    }

    #[test]
    fn unsized_char_array_keeps_empty_dimension() {
        let info = TypeInfo::parse("const char[]").expect("array");
        assert!(info.is_constant);
        assert_eq!(info.array_elements, vec![String::new()]);
    }

    #[test]
    fn function_pointer_is_flagged() {
        let info = TypeInfo::parse("void (*)(int, double)").expect("function pointer");
        assert!(info.is_function_pointer);
        assert_eq!(info.arguments.len(), 2);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = TypeInfo::parse("QList<int").expect_err("should fail");
        assert!(err.to_string().contains("QList<int"));
    }
}
