//! Identifier codec for stateless components.
//!
//! A component's custom ID carries both the routing key used to find its
//! handler and an ordered list of string arguments:
//!
//! ```text
//! identifier := key ['?' arg ('&' arg)*]
//! key, arg   := escaped text
//! ```
//!
//! The three reserved characters are escaped before they are embedded:
//!
//! | Literal | Token |
//! |---------|-------|
//! | `$`     | `$d;` |
//! | `&`     | `$a;` |
//! | `?`     | `$q;` |
//!
//! Every piece of text that ends up in an identifier must go through
//! [`encode`] first; [`compose`] does this for you.
//!
//! # Example
//!
//! ```rust
//! use sugar_core::custom_id::{compose, parse};
//!
//! let id = compose("pong", ["Al&ice"]);
//! assert_eq!(id, "pong?Al$a;ice");
//!
//! let (key, args) = parse(&id);
//! assert_eq!(key, "pong");
//! assert_eq!(args, vec!["Al&ice".to_string()]);
//! ```

use std::fmt;

/// Introduces an escape token.
pub const ESCAPE: char = '$';

/// Separates the routing key from the argument list.
pub const LIST_SEPARATOR: char = '?';

/// Separates two arguments.
pub const ARG_SEPARATOR: char = '&';

/// Terminates an escape token.
const TERMINATOR: char = ';';

/// A single substitution rule: literal character and its escape tag.
#[derive(Debug, Clone, Copy)]
struct EscapeRule {
    literal: char,
    tag: char,
}

const RULES: [EscapeRule; 3] = [
    EscapeRule {
        literal: ESCAPE,
        tag: 'd',
    },
    EscapeRule {
        literal: ARG_SEPARATOR,
        tag: 'a',
    },
    EscapeRule {
        literal: LIST_SEPARATOR,
        tag: 'q',
    },
];

fn rule_for_literal(ch: char) -> Option<&'static EscapeRule> {
    RULES.iter().find(|rule| rule.literal == ch)
}

fn rule_for_tag(ch: char) -> Option<&'static EscapeRule> {
    RULES.iter().find(|rule| rule.tag == ch)
}

/// Escapes every reserved character in `value`.
///
/// An absent value encodes to the empty string.
///
/// ```rust
/// use sugar_core::custom_id::encode;
///
/// assert_eq!(encode("a&b?c$"), "a$a;b$q;c$d;");
/// assert_eq!(encode(None), "");
/// ```
pub fn encode<'a>(value: impl Into<Option<&'a str>>) -> String {
    let Some(value) = value.into() else {
        return String::new();
    };

    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match rule_for_literal(ch) {
            Some(rule) => {
                out.push(ESCAPE);
                out.push(rule.tag);
                out.push(TERMINATOR);
            }
            None => out.push(ch),
        }
    }
    out
}

/// Restores the reserved characters escaped by [`encode`].
///
/// Tokens are recognised in a single left-to-right scan, so text produced
/// by `encode` is never re-interpreted: `decode(encode(s)) == s` for every
/// `s`. A `$` that does not start a token is copied through unchanged.
///
/// An absent value decodes to the empty string.
pub fn decode<'a>(value: impl Into<Option<&'a str>>) -> String {
    let Some(value) = value.into() else {
        return String::new();
    };

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find(ESCAPE) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + ESCAPE.len_utf8()..];
        let mut chars = tail.chars();
        match (chars.next().and_then(rule_for_tag), chars.next()) {
            (Some(rule), Some(TERMINATOR)) => {
                out.push(rule.literal);
                // tag and terminator are both ASCII
                rest = &tail[2..];
            }
            _ => {
                out.push(ESCAPE);
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Splits an identifier into its routing key and argument list.
///
/// Splitting happens on the raw, still-escaped string; each piece is decoded
/// afterwards. This never fails: stale or hand-written identifiers degrade
/// to whatever key and arguments can be read from them.
///
/// - `"key"` yields `("key", [])`.
/// - `"key?"` yields `("key", [""])`.
/// - `""` yields `("", [])`.
pub fn parse(identifier: &str) -> (String, Vec<String>) {
    match identifier.split_once(LIST_SEPARATOR) {
        None => (decode(identifier), Vec::new()),
        Some((key, rest)) => {
            let args = rest.split(ARG_SEPARATOR).map(decode).collect();
            (decode(key), args)
        }
    }
}

/// Builds an identifier from a routing key and arguments.
///
/// The key and every argument are encoded. With no arguments the result is
/// just the encoded key.
pub fn compose<I, S>(key: &str, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut id = encode(key);
    let mut args = args.into_iter().peekable();
    if args.peek().is_some() {
        id.push(LIST_SEPARATOR);
        for (i, arg) in args.enumerate() {
            if i > 0 {
                id.push(ARG_SEPARATOR);
            }
            id.push_str(&encode(arg.as_ref()));
        }
    }
    id
}

/// A decoded identifier: routing key plus arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CustomId {
    /// The routing key used for registry lookup.
    pub key: String,
    /// The arguments carried by the identifier, in order.
    pub args: Vec<String>,
}

impl CustomId {
    /// Creates an identifier with no arguments.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Parses a wire identifier.
    pub fn parse(identifier: &str) -> Self {
        let (key, args) = parse(identifier);
        Self { key, args }
    }

    /// Renders the wire identifier.
    pub fn encoded(&self) -> String {
        compose(&self.key, &self.args)
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded())
    }
}

impl From<&str> for CustomId {
    fn from(identifier: &str) -> Self {
        Self::parse(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode("$"), "$d;");
        assert_eq!(encode("&"), "$a;");
        assert_eq!(encode("?"), "$q;");
        assert_eq!(encode("plain text"), "plain text");
    }

    #[test]
    fn test_encode_decode_absent() {
        assert_eq!(encode(None), "");
        assert_eq!(decode(None), "");
        assert_eq!(encode(""), "");
    }

    #[test]
    fn test_round_trip_reserved_combinations() {
        let samples = [
            "",
            "$",
            "$$",
            "$d;",
            "$a;",
            "$q;",
            "$d",
            "a&b?c$d",
            "??&&$$",
            "&$q;?",
            "日本語?テキスト&です$",
            "trailing$",
        ];
        for s in samples {
            assert_eq!(decode(encode(s).as_str()), s, "round trip failed for {s:?}");
        }
    }

    #[test]
    fn test_decode_leaves_unknown_escape_alone() {
        assert_eq!(decode("$x;"), "$x;");
        assert_eq!(decode("$a"), "$a");
        assert_eq!(decode("cost: 5$"), "cost: 5$");
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse("ping"), ("ping".to_string(), vec![]));
        assert_eq!(parse(&encode("a?b")), ("a?b".to_string(), vec![]));
    }

    #[test]
    fn test_parse_empty_identifier() {
        assert_eq!(parse(""), (String::new(), vec![]));
    }

    #[test]
    fn test_parse_trailing_separator_yields_one_empty_arg() {
        assert_eq!(parse("key?"), ("key".to_string(), vec![String::new()]));
    }

    #[test]
    fn test_parse_empty_segments() {
        assert_eq!(
            parse("key?&"),
            ("key".to_string(), vec![String::new(), String::new()])
        );
        assert_eq!(
            parse("key?a&"),
            ("key".to_string(), vec!["a".to_string(), String::new()])
        );
    }

    #[test]
    fn test_parse_composed_args() {
        let key = "vote";
        let a1 = "yes & no";
        let a2 = "why?$";
        let id = format!("{key}?{}&{}", encode(a1), encode(a2));
        assert_eq!(
            parse(&id),
            (key.to_string(), vec![a1.to_string(), a2.to_string()])
        );
    }

    #[test]
    fn test_parse_pong_scenario() {
        let (key, args) = parse("pong?Al$a;ice");
        assert_eq!(key, "pong");
        assert_eq!(args, vec!["Al&ice"]);
    }

    #[test]
    fn test_parse_splits_only_once() {
        // a second raw `?` is never produced by `encode`
        let (key, args) = parse("k?a?b&c");
        assert_eq!(key, "k");
        assert_eq!(args, vec!["a?b", "c"]);
    }

    #[test]
    fn test_compose_without_args() {
        assert_eq!(compose("pong", Vec::<String>::new()), "pong");
        assert_eq!(compose("a&b", Vec::<&str>::new()), "a$a;b");
    }

    #[test]
    fn test_compose_is_lossless() {
        let cases: Vec<Vec<&str>> = vec![
            vec![],
            vec![""],
            vec!["", ""],
            vec!["x", "", "y"],
            vec!["$a;", "?", "&&"],
        ];
        for args in cases {
            let id = compose("k$?", &args);
            let (key, parsed) = parse(&id);
            assert_eq!(key, "k$?");
            assert_eq!(parsed, args, "lossy compose for {id:?}");
        }
    }

    #[test]
    fn test_custom_id_value() {
        let id = CustomId::new("menu").arg("a&b").arg("c");
        assert_eq!(id.to_string(), "menu?a$a;b&c");
        assert_eq!(CustomId::parse(&id.to_string()), id);
        assert_eq!(CustomId::from("menu"), CustomId::new("menu"));
    }
}
