//! Parser for the textual dump using chumsky.
//!
//! Role
//! - Read back what [`dump`](crate::value::pretty::dump) and `Display` write, and
//!   rebuild the tree through the constructors of a [`Language`].
//!
//! Two stages:
//! 1) Characters to a small syntax tree (calls, tuples, literals).
//! 2) Syntax tree to [`Value`], looking node types up by name. Construction
//!    goes through the language's checked constructors, so a well-formed text
//!    describing an ill-typed tree is rejected with a construction error.
//!
//! Accepted syntax:
//! - Nodes: `Name(field = value, ...)`, or positional `Name(value, ...)`; positional
//!   arguments may precede keyword ones.
//! - Sequences: `()`, `(v,)`, `(v1, v2)`; a parenthesized single value without a
//!   trailing comma is just that value.
//! - Literals: `1`, `-2`, `1.5`, `1e-7`, `inf`, `-inf`, `NaN`, `"text"`, `b"bytes"`,
//!   `true`, `false`, and `None` for absence.
//! - Pattern terms: `PatVar(id = "X")` (or `PatVar("X")`) and `Wildcard()`.
//!
//! Whitespace, including newlines, is free between tokens.
use chumsky::prelude::*;

use crate::error::{ConstructionError, ParseError};
use crate::lang::{Language, NodeType};
use crate::value::{Prim, Seq, Value};

#[derive(Debug, Clone, PartialEq)]
enum Syntax {
    Call { name: String, args: Vec<Arg> },
    Tuple(Vec<Syntax>),
    Literal(Prim),
    None,
}

#[derive(Debug, Clone, PartialEq)]
struct Arg {
    keyword: Option<String>,
    value: Syntax,
}

fn word<'src>() -> impl Parser<'src, &'src str, &'src str, extra::Err<Rich<'src, char>>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice()
}

fn number<'src>() -> impl Parser<'src, &'src str, Prim, extra::Err<Rich<'src, char>>> + Clone {
    let digits = any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1);
    let fractional_part = just('.').then(digits.clone()).or_not();
    let exponent_part = one_of("eE")
        .then(one_of("+-").or_not())
        .then(digits.clone())
        .or_not();

    just('-')
        .or_not()
        .then(digits)
        .then(fractional_part)
        .then(exponent_part)
        .to_slice()
        .try_map(|s: &str, span| {
            if s.contains(['.', 'e', 'E']) {
                s.parse::<f64>()
                    .map(Prim::from)
                    .map_err(|e| Rich::custom(span, format!("invalid float {s}: {e}")))
            } else {
                s.parse::<i64>()
                    .map(Prim::Int)
                    .map_err(|e| Rich::custom(span, format!("invalid integer {s}: {e}")))
            }
        })
        .labelled("number")
}

fn string<'src>() -> impl Parser<'src, &'src str, Prim, extra::Err<Rich<'src, char>>> + Clone {
    let unicode = just('u').ignore_then(
        any()
            .filter(|c: &char| c.is_ascii_hexdigit())
            .repeated()
            .at_least(1)
            .at_most(6)
            .to_slice()
            .delimited_by(just('{'), just('}'))
            .try_map(|s: &str, span| {
                u32::from_str_radix(s, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| Rich::custom(span, format!("invalid unicode escape {s}")))
            }),
    );
    let escape = just('\\').ignore_then(choice((
        just('\\'),
        just('"'),
        just('\''),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
        just('0').to('\0'),
        unicode,
    )));

    none_of("\\\"")
        .or(escape)
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'))
        .map(Prim::from)
        .labelled("string")
}

fn bytes<'src>() -> impl Parser<'src, &'src str, Prim, extra::Err<Rich<'src, char>>> + Clone {
    let hex = just('x').ignore_then(
        any()
            .filter(|c: &char| c.is_ascii_hexdigit())
            .repeated()
            .exactly(2)
            .to_slice()
            .try_map(|s: &str, span| {
                u8::from_str_radix(s, 16)
                    .map_err(|e| Rich::custom(span, format!("invalid byte escape {s}: {e}")))
            }),
    );
    let escape = just('\\').ignore_then(choice((
        just('\\').to(b'\\'),
        just('"').to(b'"'),
        just('\'').to(b'\''),
        just('n').to(b'\n'),
        just('r').to(b'\r'),
        just('t').to(b'\t'),
        just('0').to(b'\0'),
        hex,
    )));
    let plain = none_of("\\\"").try_map(|c: char, span| {
        if c.is_ascii() {
            Ok(c as u8)
        } else {
            Err(Rich::custom(span, "non-ASCII character in byte string"))
        }
    });

    just('b')
        .ignore_then(
            plain
                .or(escape)
                .repeated()
                .collect::<Vec<u8>>()
                .delimited_by(just('"'), just('"')),
        )
        .map(Prim::from)
        .labelled("byte string")
}

fn syntax<'src>() -> impl Parser<'src, &'src str, Syntax, extra::Err<Rich<'src, char>>> {
    recursive(|value| {
        let keyword_arg = word()
            .then_ignore(just('=').padded())
            .then(value.clone())
            .map(|(keyword, value): (&str, Syntax)| Arg {
                keyword: Some(keyword.to_string()),
                value,
            });
        let positional_arg = value.clone().map(|value| Arg {
            keyword: None,
            value,
        });
        let args = keyword_arg
            .or(positional_arg)
            .padded()
            .separated_by(just(','))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just('(').padded(), just(')').padded());

        // Identifiers are node names when followed by arguments, keywords otherwise.
        let call_or_keyword =
            word()
                .then(args.or_not())
                .try_map(|(name, args), span| match (name, args) {
                    (name, Some(args)) => Ok(Syntax::Call {
                        name: name.to_string(),
                        args,
                    }),
                    ("None", None) => Ok(Syntax::None),
                    ("true", None) => Ok(Syntax::Literal(Prim::Bool(true))),
                    ("false", None) => Ok(Syntax::Literal(Prim::Bool(false))),
                    ("inf", None) => Ok(Syntax::Literal(Prim::from(f64::INFINITY))),
                    ("NaN", None) => Ok(Syntax::Literal(Prim::from(f64::NAN))),
                    (name, None) => Err(Rich::custom(
                        span,
                        format!("expected a value, found identifier '{name}'"),
                    )),
                });

        let tuple = value
            .clone()
            .padded()
            .then(
                just(',')
                    .ignore_then(value.clone().padded())
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .then(just(',').padded().or_not())
            .or_not()
            .delimited_by(just('(').padded(), just(')'))
            .map(|items| match items {
                None => Syntax::Tuple(Vec::new()),
                Some(((first, rest), None)) if rest.is_empty() => first,
                Some(((first, rest), _)) => {
                    Syntax::Tuple(std::iter::once(first).chain(rest).collect())
                }
            });

        choice((
            just("-inf").to(Syntax::Literal(Prim::from(f64::NEG_INFINITY))),
            number().map(Syntax::Literal),
            string().map(Syntax::Literal),
            bytes().map(Syntax::Literal),
            call_or_keyword,
            tuple,
        ))
        .labelled("value")
    })
}

/// Parse `src` into a tree of `language`.
pub fn parse(language: &Language, src: &str) -> Result<Value, ParseError> {
    let syntax = syntax()
        .padded()
        .then_ignore(end())
        .parse(src)
        .into_result()
        .map_err(|errs| ParseError::Syntax {
            messages: errs.into_iter().map(|e| format!("parse error: {e}")).collect(),
        })?;
    build(language, syntax)
}

fn build(language: &Language, syntax: Syntax) -> Result<Value, ParseError> {
    match syntax {
        Syntax::Literal(prim) => Ok(Value::Prim(prim)),
        Syntax::None => Ok(Value::Absent),
        Syntax::Tuple(items) => items
            .into_iter()
            .map(|item| build(language, item))
            .collect::<Result<Seq, _>>()
            .map(Value::Seq),
        Syntax::Call { name, args } => match name.as_str() {
            "PatVar" => build_pattern_var(args),
            "Wildcard" if args.is_empty() => Ok(Value::wildcard()),
            "Wildcard" => Err(ParseError::MalformedPattern {
                text: "Wildcard takes no arguments".to_string(),
            }),
            _ => {
                let ty = language
                    .get(&name)
                    .ok_or_else(|| ParseError::UnknownType { name: name.clone() })?;
                build_node(language, ty, args)
            }
        },
    }
}

fn build_pattern_var(args: Vec<Arg>) -> Result<Value, ParseError> {
    match args.as_slice() {
        [Arg { keyword, value: Syntax::Literal(Prim::Str(id)) }]
            if keyword.as_deref().is_none_or(|k| k == "id") =>
        {
            Ok(Value::var(id))
        }
        _ => Err(ParseError::MalformedPattern {
            text: "PatVar expects a single string `id`".to_string(),
        }),
    }
}

fn build_node(language: &Language, ty: &NodeType, args: Vec<Arg>) -> Result<Value, ParseError> {
    let mut positional = Vec::with_capacity(args.len());
    let mut named: Vec<(String, Value)> = Vec::new();
    for arg in args {
        let value = build(language, arg.value)?;
        match arg.keyword {
            Some(keyword) => named.push((keyword, value)),
            None if named.is_empty() => positional.push(value),
            None => {
                return Err(ParseError::PositionalAfterKeyword {
                    ty: ty.name().to_string(),
                });
            }
        }
    }

    if named.is_empty() {
        return Ok(ty.construct(positional)?.into());
    }
    if positional.len() > ty.fields().len() {
        return Err(ConstructionError::FieldCount {
            ty: ty.name().to_string(),
            expected: ty.fields().len(),
            found: positional.len() + named.len(),
        }
        .into());
    }

    let pairs = ty
        .field_names()
        .zip(positional)
        .chain(named.iter().map(|(k, v)| (k.as_str(), v.clone())));
    Ok(ty.construct_named(pairs)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_of(src: &str) -> Syntax {
        syntax().padded().then_ignore(end()).parse(src).into_result().unwrap()
    }

    #[test]
    fn parenthesized_value_is_not_a_tuple() {
        assert_eq!(syntax_of("(5)"), Syntax::Literal(Prim::Int(5)));
        assert_eq!(
            syntax_of("(5,)"),
            Syntax::Tuple(vec![Syntax::Literal(Prim::Int(5))])
        );
        assert_eq!(syntax_of("( )"), Syntax::Tuple(vec![]));
    }

    #[test]
    fn literals() {
        assert_eq!(syntax_of("-12"), Syntax::Literal(Prim::Int(-12)));
        assert_eq!(syntax_of("1e-7"), Syntax::Literal(Prim::from(1e-7)));
        assert_eq!(syntax_of("-inf"), Syntax::Literal(Prim::from(f64::NEG_INFINITY)));
        assert_eq!(syntax_of(r#""a\n\u{1f600}""#), Syntax::Literal(Prim::from("a\n\u{1f600}")));
        assert_eq!(syntax_of(r#"b"\x00\"z""#), Syntax::Literal(Prim::from(&b"\0\"z"[..])));
        assert_eq!(syntax_of("None"), Syntax::None);
    }

    #[test]
    fn bare_identifier_is_rejected() {
        assert!(syntax().then_ignore(end()).parse("foo").into_result().is_err());
    }
}
