//! Selector tokenizer and grouper
//!
//! A deliberately small, Emmet-like selector grammar:
//!
//! ```text
//! div.class#id[attr="value"] span[data-x^="pre"]
//! └──────── group 0 ───────┘ └──── group 1 ────┘
//! ```
//!
//! The tokenizer is a single forward scan driven by an explicit state enum.
//! Input it does not understand is dropped, never reported.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute value comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// `=` exact match
    Equals,
    /// `*=` substring
    Contains,
    /// `^=` prefix
    StartsWith,
    /// `$=` suffix
    EndsWith,
    /// `~=` whole space-separated word
    ContainsWord,
    /// `|=` exact, or prefix followed by `-`
    DashMatch,
}

impl Comparator {
    /// Operator for a two-character form whose second character is `=`
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            '*' => Some(Comparator::Contains),
            '^' => Some(Comparator::StartsWith),
            '$' => Some(Comparator::EndsWith),
            '~' => Some(Comparator::ContainsWord),
            '|' => Some(Comparator::DashMatch),
            _ => None,
        }
    }

    /// Test a stored attribute value against the selector value
    pub fn matches(self, attr: &str, value: &str) -> bool {
        match self {
            Comparator::Equals => attr == value,
            Comparator::Contains => attr.contains(value),
            Comparator::StartsWith => attr.starts_with(value),
            Comparator::EndsWith => attr.ends_with(value),
            Comparator::ContainsWord => attr.split(' ').any(|word| word == value),
            Comparator::DashMatch => {
                attr == value
                    || attr
                        .strip_prefix(value)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Equals => "=",
            Comparator::Contains => "*=",
            Comparator::StartsWith => "^=",
            Comparator::EndsWith => "$=",
            Comparator::ContainsWord => "~=",
            Comparator::DashMatch => "|=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token from a selector string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorToken {
    Element(String),
    Class(String),
    Id(String),
    AttributeName(String),
    AttributeValue(String),
    AttributeCompare(Comparator),
    GroupSeparator,
}

/// Tokens of one space-separated compound clause
pub type TokenGroup = Vec<SelectorToken>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    Element,
    Class,
    Id,
    AttributeName,
    AttributeValue,
}

/// Emit the buffered text as a token of `state`, then clear the buffer
///
/// State `None` has no token kind; its buffer is discarded.
fn flush(tokens: &mut Vec<SelectorToken>, state: State, buffer: &mut String) {
    if buffer.is_empty() {
        return;
    }
    let value = std::mem::take(buffer);
    let token = match state {
        State::Element => SelectorToken::Element(value),
        State::Class => SelectorToken::Class(value),
        State::Id => SelectorToken::Id(value),
        State::AttributeName => SelectorToken::AttributeName(value),
        State::AttributeValue => SelectorToken::AttributeValue(value),
        State::None => return,
    };
    tokens.push(token);
}

/// Scan a selector into a flat token sequence
pub fn tokenize(selector: &str) -> Vec<SelectorToken> {
    let mut tokens = Vec::new();
    let mut state = State::Element;
    let mut buffer = String::new();
    let mut chars = selector.chars().peekable();

    while let Some(current) = chars.next() {
        match current {
            '.' => {
                flush(&mut tokens, state, &mut buffer);
                state = State::Class;
            }
            '#' => {
                flush(&mut tokens, state, &mut buffer);
                state = State::Id;
            }
            // spaces are legal inside attribute values
            ' ' if state != State::AttributeValue => {
                flush(&mut tokens, state, &mut buffer);
                tokens.push(SelectorToken::GroupSeparator);
                state = State::Element;
            }
            '[' => {
                flush(&mut tokens, state, &mut buffer);
                state = State::AttributeName;
            }
            '=' if state == State::AttributeName => {
                flush(&mut tokens, state, &mut buffer);
                tokens.push(SelectorToken::AttributeCompare(Comparator::Equals));
                state = State::AttributeValue;
            }
            c if state == State::AttributeName
                && chars.peek() == Some(&'=')
                && Comparator::from_prefix(c).is_some() =>
            {
                flush(&mut tokens, state, &mut buffer);
                chars.next();
                if let Some(comparator) = Comparator::from_prefix(c) {
                    tokens.push(SelectorToken::AttributeCompare(comparator));
                }
                state = State::AttributeValue;
            }
            '"' if state == State::AttributeValue => {}
            ']' if matches!(state, State::AttributeName | State::AttributeValue) => {
                flush(&mut tokens, state, &mut buffer);
                state = State::None;
            }
            c => buffer.push(c),
        }
    }

    flush(&mut tokens, state, &mut buffer);
    tokens
}

/// Split tokens into groups at separator boundaries
///
/// Empty spans (doubled, leading or trailing spaces) produce no group.
pub fn group(tokens: &[SelectorToken]) -> Vec<TokenGroup> {
    tokens
        .split(|token| *token == SelectorToken::GroupSeparator)
        .filter(|span| !span.is_empty())
        .map(<[SelectorToken]>::to_vec)
        .collect()
}

/// Tokenize and group in one step
pub fn parse(selector: &str) -> Vec<TokenGroup> {
    group(&tokenize(selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::SelectorToken::*;

    fn s(value: &str) -> String {
        value.to_string()
    }

    #[test]
    fn test_compound_selector() {
        assert_eq!(
            tokenize("p.class.test#main"),
            vec![Element(s("p")), Class(s("class")), Class(s("test")), Id(s("main"))]
        );
    }

    #[test]
    fn test_group_separator() {
        assert_eq!(
            tokenize("div.a span"),
            vec![Element(s("div")), Class(s("a")), GroupSeparator, Element(s("span"))]
        );
    }

    #[test]
    fn test_attribute_value_keeps_spaces_and_drops_quotes() {
        assert_eq!(
            tokenize("p[title=\"test title\"][disabled]"),
            vec![
                Element(s("p")),
                AttributeName(s("title")),
                AttributeCompare(Comparator::Equals),
                AttributeValue(s("test title")),
                AttributeName(s("disabled")),
            ]
        );
    }

    #[test]
    fn test_two_character_comparators() {
        let cases = [
            ("*=", Comparator::Contains),
            ("^=", Comparator::StartsWith),
            ("$=", Comparator::EndsWith),
            ("~=", Comparator::ContainsWord),
            ("|=", Comparator::DashMatch),
        ];
        for (op, comparator) in cases {
            let selector = format!("[data-test{op}\"needle\"]");
            assert_eq!(
                tokenize(&selector),
                vec![
                    AttributeName(s("data-test")),
                    AttributeCompare(comparator),
                    AttributeValue(s("needle")),
                ],
                "operator {op}"
            );
        }
    }

    #[test]
    fn test_comparator_chars_outside_attribute_are_text() {
        assert_eq!(tokenize("a*b"), vec![Element(s("a*b"))]);
    }

    #[test]
    fn test_text_after_closing_bracket_is_dropped() {
        assert_eq!(
            tokenize("[a]junk.b"),
            vec![AttributeName(s("a")), Class(s("b"))]
        );
    }

    #[test]
    fn test_unterminated_attribute_flushes_at_end() {
        assert_eq!(
            tokenize("div[data-x=\"half"),
            vec![
                Element(s("div")),
                AttributeName(s("data-x")),
                AttributeCompare(Comparator::Equals),
                AttributeValue(s("half")),
            ]
        );
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_group_skips_empty_spans() {
        let groups = parse(" div  span ");
        assert_eq!(groups, vec![vec![Element(s("div"))], vec![Element(s("span"))]]);
    }

    #[test]
    fn test_comparator_semantics() {
        assert!(Comparator::Equals.matches("find", "find"));
        assert!(!Comparator::Equals.matches("do not find", "find"));
        assert!(Comparator::Contains.matches("testneedletest", "needle"));
        assert!(Comparator::Contains.matches("testneedletest2", "needle"));
        assert!(!Comparator::Contains.matches("testtesttest", "needle"));
        assert!(Comparator::StartsWith.matches("testcorrect", "test"));
        assert!(!Comparator::StartsWith.matches("negativetest", "test"));
        assert!(Comparator::EndsWith.matches("testgood", "good"));
        assert!(!Comparator::EndsWith.matches("testbad", "good"));
        assert!(Comparator::ContainsWord.matches("test needle test", "needle"));
        assert!(!Comparator::ContainsWord.matches("testneedletest", "needle"));
        assert!(Comparator::DashMatch.matches("test", "test"));
        assert!(Comparator::DashMatch.matches("test-hyphen", "test"));
        assert!(!Comparator::DashMatch.matches("rest-test", "test"));
        assert!(!Comparator::DashMatch.matches("testing", "test"));
    }
}
