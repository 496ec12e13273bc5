//! Recursive descent parser for the template surface language.
//!
//! The grammar is small enough to parse straight off the character stream:
//! an input starting with `@` (but not the `@@` escape or the `@{` opener)
//! is a single expression; anything else is a joined string of literal text
//! and `@{…}` enclosed expressions. Function-call arguments recurse back
//! into the expression production, and accessors fold left onto the call
//! they follow.

use crate::rules::{Rule, Segment, Template};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use weft_core::{EngineError, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{found}' at line {line}, col {col}; expected {expected}")]
    Unexpected {
        found: char,
        expected: String,
        line: usize,
        col: usize,
    },
    #[error("unexpected end of input; expected {expected}")]
    UnexpectedEof {
        expected: String,
        line: usize,
        col: usize,
    },
    #[error("invalid number '{text}' at line {line}, col {col}")]
    InvalidNumber {
        text: String,
        line: usize,
        col: usize,
    },
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        let (message, line, col) = match &err {
            ParseError::Unexpected {
                found,
                expected,
                line,
                col,
            } => (
                format!("unexpected character '{found}'; expected {expected}"),
                *line,
                *col,
            ),
            ParseError::UnexpectedEof {
                expected,
                line,
                col,
            } => (
                format!("unexpected end of input; expected {expected}"),
                *line,
                *col,
            ),
            ParseError::InvalidNumber { text, line, col } => {
                (format!("invalid number '{text}'"), *line, *col)
            }
        };
        EngineError::Parse { message, line, col }
    }
}

/// Characters that terminate a dot-accessor member name.
const MEMBER_STOP: &[char] = &['[', ']', '{', '}', '(', ')', '@', ',', '.', '?'];

/// Parse a template input into its rule tree.
pub fn parse(input: &str) -> Result<Template, ParseError> {
    let mut parser = Parser::new(input);
    // A leading '@' that is neither the '@@' escape nor the '@{' opener
    // commits the whole input to the expression production.
    if parser.current() == Some('@') && !matches!(parser.peek(), Some('@') | Some('{')) {
        parser.advance();
        let rule = parser.method()?;
        parser.expect_eof()?;
        return Ok(Template::Expression(rule));
    }
    let segments = parser.joined_string()?;
    Ok(Template::JoinedString(segments))
}

struct Parser {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(found) => ParseError::Unexpected {
                found,
                expected: expected.to_string(),
                line: self.line,
                col: self.col,
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
                line: self.line,
                col: self.col,
            },
        }
    }

    fn expect(&mut self, ch: char, expected: &str) -> Result<(), ParseError> {
        if self.current() == Some(ch) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        match self.current() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    fn skip_spaces(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    // -- joined string --

    fn joined_string(&mut self) -> Result<Vec<Segment>, ParseError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        while let Some(ch) = self.current() {
            if ch != '@' {
                literal.push(ch);
                self.advance();
                continue;
            }
            match self.peek() {
                // '@@' escapes to a literal '@'.
                Some('@') => {
                    self.advance();
                    self.advance();
                    literal.push('@');
                }
                Some('{') => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    self.advance();
                    self.advance();
                    let rule = self.method()?;
                    self.expect('}', "'}' closing the enclosed expression")?;
                    segments.push(Segment::Expression(rule));
                }
                // A lone '@' mid-text stays literal.
                _ => {
                    literal.push('@');
                    self.advance();
                }
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(segments)
    }

    // -- expressions --

    /// `method = function { accessor }`
    fn method(&mut self) -> Result<Rule, ParseError> {
        let name = self.function_name()?;
        let call = self.call_with_name(name)?;
        self.accessors(call)
    }

    fn function_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        match self.current() {
            Some(ch) if ch.is_ascii_alphabetic() => {
                name.push(ch);
                self.advance();
            }
            _ => return Err(self.unexpected("a function name")),
        }
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Ok(name)
    }

    fn call_with_name(&mut self, name: String) -> Result<Rule, ParseError> {
        self.expect('(', "'(' opening the argument list")?;
        self.skip_spaces();
        if self.current() == Some(')') {
            self.advance();
            return Ok(Rule::Call {
                name,
                args: Vec::new(),
            });
        }
        let mut args = Vec::new();
        loop {
            args.push(self.argument()?);
            self.skip_spaces();
            match self.current() {
                Some(',') => {
                    self.advance();
                    self.skip_spaces();
                }
                Some(')') => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')' in the argument list")),
            }
        }
        Ok(Rule::Call { name, args })
    }

    /// `argument = method | string_literal | number | boolean`
    fn argument(&mut self) -> Result<Rule, ParseError> {
        match self.current() {
            Some('\'') => self.string_literal(),
            Some(ch) if ch == '+' || ch == '-' || ch.is_ascii_digit() => self.number(),
            Some(ch) if ch.is_ascii_alphabetic() => {
                let name = self.function_name()?;
                if self.current() == Some('(') {
                    let call = self.call_with_name(name)?;
                    return self.accessors(call);
                }
                match name.as_str() {
                    "true" => Ok(Rule::Constant(Value::Bool(true))),
                    "false" => Ok(Rule::Constant(Value::Bool(false))),
                    _ => Err(self.unexpected("'(' opening the argument list")),
                }
            }
            _ => Err(self.unexpected("an argument")),
        }
    }

    /// Left-fold `?`-optional bracket and dot accessors onto `base`.
    fn accessors(&mut self, base: Rule) -> Result<Rule, ParseError> {
        let mut rule = base;
        loop {
            match self.current() {
                Some('?') if matches!(self.peek(), Some('[') | Some('.')) => {
                    self.advance();
                    rule = self.accessor(rule, true)?;
                }
                Some('[') | Some('.') => {
                    rule = self.accessor(rule, false)?;
                }
                _ => break,
            }
        }
        Ok(rule)
    }

    fn accessor(&mut self, base: Rule, nullable: bool) -> Result<Rule, ParseError> {
        match self.current() {
            Some('[') => {
                self.advance();
                let inner = self.bracket_key()?;
                self.expect(']', "']' closing the index")?;
                Ok(Rule::access(
                    base,
                    Rule::Index {
                        inner: Box::new(inner),
                        nullable,
                    },
                ))
            }
            Some('.') => {
                self.advance();
                let name = self.member_name()?;
                Ok(Rule::access(
                    base,
                    Rule::Index {
                        inner: Box::new(Rule::StringLiteral(Value::from(name))),
                        nullable,
                    },
                ))
            }
            _ => Err(self.unexpected("'[' or '.'")),
        }
    }

    /// `bracket_accessor` key: a nested call, a string literal, or an
    /// unsigned integer index.
    fn bracket_key(&mut self) -> Result<Rule, ParseError> {
        match self.current() {
            Some('\'') => self.string_literal(),
            Some(ch) if ch.is_ascii_digit() => self.integer(),
            Some(ch) if ch.is_ascii_alphabetic() => self.method(),
            _ => Err(self.unexpected("a key expression, string literal or integer index")),
        }
    }

    fn member_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        while let Some(ch) = self.current() {
            if MEMBER_STOP.contains(&ch) {
                break;
            }
            name.push(ch);
            self.advance();
        }
        if name.is_empty() {
            Err(self.unexpected("a member name"))
        } else {
            Ok(name)
        }
    }

    fn string_literal(&mut self) -> Result<Rule, ParseError> {
        self.expect('\'', "a string literal")?;
        let mut text = String::new();
        loop {
            match self.current() {
                Some('\'') => {
                    // '' escapes to a single quote.
                    if self.peek() == Some('\'') {
                        text.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "''' closing the string literal".to_string(),
                        line: self.line,
                        col: self.col,
                    })
                }
            }
        }
        Ok(Rule::StringLiteral(Value::from(text)))
    }

    /// Unsigned integer, used only inside index brackets.
    fn integer(&mut self) -> Result<Rule, ParseError> {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text.parse::<i64>()
            .map(|n| Rule::Constant(Value::Int(n)))
            .map_err(|_| ParseError::InvalidNumber { text, line, col })
    }

    /// Optionally signed integer or decimal literal.
    fn number(&mut self) -> Result<Rule, ParseError> {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();
        if let Some(sign @ ('+' | '-')) = self.current() {
            text.push(sign);
            self.advance();
        }
        let digits_start = text.len();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if text.len() == digits_start {
            return Err(self.unexpected("a digit"));
        }
        if self.current() == Some('.') {
            text.push('.');
            self.advance();
            let fraction_start = text.len();
            while let Some(ch) = self.current() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            if text.len() == fraction_start {
                return Err(ParseError::InvalidNumber { text, line, col });
            }
            return Decimal::from_str(&text)
                .map(|d| Rule::Constant(Value::Decimal(d)))
                .map_err(|_| ParseError::InvalidNumber { text, line, col });
        }
        text.parse::<i64>()
            .map(|n| Rule::Constant(Value::Int(n)))
            .map_err(|_| ParseError::InvalidNumber { text, line, col })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression(input: &str) -> Rule {
        match parse(input).expect("input should parse") {
            Template::Expression(rule) => rule,
            Template::JoinedString(segments) => {
                panic!("expected an expression, got segments {segments:?}")
            }
        }
    }

    fn segments(input: &str) -> Vec<Segment> {
        match parse(input).expect("input should parse") {
            Template::JoinedString(segments) => segments,
            Template::Expression(rule) => panic!("expected a joined string, got {rule:?}"),
        }
    }

    fn call(name: &str, args: Vec<Rule>) -> Rule {
        Rule::Call {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_call_with_string_arguments() {
        assert_eq!(
            expression("@concat('hello ', 'world')"),
            call(
                "concat",
                vec![
                    Rule::StringLiteral(Value::from("hello ")),
                    Rule::StringLiteral(Value::from("world")),
                ]
            )
        );
    }

    #[test]
    fn test_call_without_arguments() {
        assert_eq!(expression("@guid()"), call("guid", vec![]));
    }

    #[test]
    fn test_nested_calls_and_numbers() {
        assert_eq!(
            expression("@first(createArray(1,2,-3))"),
            call(
                "first",
                vec![call(
                    "createArray",
                    vec![
                        Rule::Constant(Value::Int(1)),
                        Rule::Constant(Value::Int(2)),
                        Rule::Constant(Value::Int(-3)),
                    ]
                )]
            )
        );
    }

    #[test]
    fn test_signed_decimal_argument() {
        assert_eq!(
            expression("@abs(-1.5)"),
            call(
                "abs",
                vec![Rule::Constant(Value::Decimal(
                    Decimal::from_str("-1.5").unwrap()
                ))]
            )
        );
    }

    #[test]
    fn test_boolean_arguments_fold_to_constants() {
        assert_eq!(
            expression("@and(true, false)"),
            call(
                "and",
                vec![
                    Rule::Constant(Value::Bool(true)),
                    Rule::Constant(Value::Bool(false)),
                ]
            )
        );
    }

    #[test]
    fn test_quote_escape_in_string_literal() {
        assert_eq!(
            expression("@concat('it''s')"),
            call("concat", vec![Rule::StringLiteral(Value::from("it's"))])
        );
    }

    #[test]
    fn test_accessors_fold_left() {
        let parsed = expression("@f()[1].name");
        let inner = Rule::access(
            call("f", vec![]),
            Rule::Index {
                inner: Box::new(Rule::Constant(Value::Int(1))),
                nullable: false,
            },
        );
        let expected = Rule::access(
            inner,
            Rule::Index {
                inner: Box::new(Rule::StringLiteral(Value::from("name"))),
                nullable: false,
            },
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_nullable_accessors() {
        let parsed = expression("@f()?['k']?.x");
        let inner = Rule::access(
            call("f", vec![]),
            Rule::Index {
                inner: Box::new(Rule::StringLiteral(Value::from("k"))),
                nullable: true,
            },
        );
        let expected = Rule::access(
            inner,
            Rule::Index {
                inner: Box::new(Rule::StringLiteral(Value::from("x"))),
                nullable: true,
            },
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_bracket_key_may_be_a_call() {
        let parsed = expression("@f()[last(g())]");
        let expected = Rule::access(
            call("f", vec![]),
            Rule::Index {
                inner: Box::new(call("last", vec![call("g", vec![])])),
                nullable: false,
            },
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_whitespace_tolerated_around_commas() {
        assert_eq!(
            expression("@f(1 , 2,  3)"),
            call(
                "f",
                vec![
                    Rule::Constant(Value::Int(1)),
                    Rule::Constant(Value::Int(2)),
                    Rule::Constant(Value::Int(3)),
                ]
            )
        );
    }

    #[test]
    fn test_plain_text_is_a_single_literal() {
        assert_eq!(
            segments("no at-sign here"),
            vec![Segment::Literal("no at-sign here".to_string())]
        );
    }

    #[test]
    fn test_at_escape_in_literal_text() {
        assert_eq!(
            segments("@@notACall"),
            vec![Segment::Literal("@notACall".to_string())]
        );
        assert_eq!(
            segments("a@@b@@c"),
            vec![Segment::Literal("a@b@c".to_string())]
        );
    }

    #[test]
    fn test_enclosed_expression_between_literals() {
        assert_eq!(
            segments("prefix@{toUpper('abc')}suffix"),
            vec![
                Segment::Literal("prefix".to_string()),
                Segment::Expression(call(
                    "toUpper",
                    vec![Rule::StringLiteral(Value::from("abc"))]
                )),
                Segment::Literal("suffix".to_string()),
            ]
        );
    }

    #[test]
    fn test_lone_at_stays_literal() {
        assert_eq!(
            segments("mail me @ home"),
            vec![Segment::Literal("mail me @ home".to_string())]
        );
    }

    #[test]
    fn test_empty_input_has_no_segments() {
        assert_eq!(segments(""), vec![]);
    }

    #[test]
    fn test_error_on_bare_at_with_garbage() {
        let err = parse("@1").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { found: '1', .. }));
    }

    #[test]
    fn test_error_on_unclosed_argument_list() {
        let err = parse("@f(1").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_error_on_trailing_input() {
        let err = parse("@f()x").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Unexpected {
                found: 'x',
                ..
            }
        ));
    }

    #[test]
    fn test_error_on_unclosed_enclosed_expression() {
        let err = parse("pre@{f()").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_error_on_unterminated_string() {
        let err = parse("@f('abc").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_error_position_is_tracked() {
        let err = parse("@f(%)").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                found: '%',
                expected: "an argument".to_string(),
                line: 1,
                col: 4,
            }
        );
    }

    #[test]
    fn test_error_on_fraction_without_digits() {
        let err = parse("@f(1.)").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }
}
