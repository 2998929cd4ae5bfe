//! Canonical text encoding for attribute values.
//!
//! The grammar is recursive and schema-driven: the domain decides how the
//! next tokens are interpreted. Malformed input fails with a byte-position
//! diagnostic; values are validated while writing so a non-conformant
//! value is rejected before any text is produced.
//!
//! Forms by domain: booleans as `t`/`f`, integers as optionally signed
//! decimals, doubles locale-independent, strings double-quoted with `\"`,
//! `\\` and `\uXXXX` escapes, enums as bare constant names, sets as
//! `{ v1 v2 }`, lists as `[ v1 v2 ]`, maps as `{ k1 - v1 k2 - v2 }` and
//! records as `( f1 f2 )` positional in declaration order. The null
//! literal `n` (legacy spelling `\null`) is accepted for every domain.

use crate::error::GraphError;
use crate::Result;

use super::domain::Domain;
use super::value::AttrValue;

/// Canonical null literal.
pub const NULL_LITERAL: &str = "n";
/// Accepted legacy null spelling.
pub const OLD_NULL_LITERAL: &str = "\\null";

/// Serializes `value` into the canonical text form for `domain`.
pub fn serialize(domain: &Domain, value: &AttrValue) -> Result<String> {
    let mut out = String::new();
    write_value(domain, value, &mut out)?;
    Ok(out)
}

/// Parses one value in the canonical text form for `domain`.
///
/// The whole input must be consumed; trailing tokens are an error.
pub fn parse(domain: &Domain, text: &str) -> Result<AttrValue> {
    let mut lx = Lexer::new(text);
    let value = parse_value(domain, &mut lx)?;
    if let Some((pos, _)) = lx.next()? {
        return Err(parse_err(pos, "trailing input after value"));
    }
    Ok(value)
}

fn parse_err(position: usize, message: impl Into<String>) -> GraphError {
    GraphError::Parse {
        position,
        message: message.into(),
    }
}

fn conformance_err(domain: &Domain, value: &AttrValue) -> GraphError {
    GraphError::NotConformant {
        domain: domain.to_string(),
        value: value.to_string(),
    }
}

fn write_value(domain: &Domain, value: &AttrValue, out: &mut String) -> Result<()> {
    if value.is_null() {
        out.push_str(NULL_LITERAL);
        return Ok(());
    }
    match (domain, value) {
        (Domain::Boolean, AttrValue::Bool(v)) => {
            out.push(if *v { 't' } else { 'f' });
        }
        (Domain::Integer, AttrValue::Int(v)) => {
            out.push_str(&v.to_string());
        }
        (Domain::Long, AttrValue::Long(v)) => {
            out.push_str(&v.to_string());
        }
        (Domain::Double, AttrValue::Double(v)) => {
            out.push_str(&v.to_string());
        }
        (Domain::String, AttrValue::Str(s)) => {
            write_quoted(s, out);
        }
        (Domain::Enumeration(decl), AttrValue::Enum(name)) => {
            if !decl.constants.iter().any(|c| c == name) {
                return Err(conformance_err(domain, value));
            }
            out.push_str(name);
        }
        (Domain::List(elem), AttrValue::List(items)) => {
            write_seq(elem, items, ('[', ']'), out)?;
        }
        (Domain::Set(elem), AttrValue::Set(items)) => {
            write_seq(elem, items, ('{', '}'), out)?;
        }
        (Domain::Map(key, val), AttrValue::Map(pairs)) => {
            if pairs.is_empty() {
                out.push_str("{}");
            } else {
                out.push('{');
                for (k, v) in pairs {
                    out.push(' ');
                    write_value(key, k, out)?;
                    out.push_str(" - ");
                    write_value(val, v, out)?;
                }
                out.push_str(" }");
            }
        }
        (Domain::Record(decl), AttrValue::Record(fields)) => {
            if fields.len() != decl.fields.len() {
                return Err(conformance_err(domain, value));
            }
            if fields.is_empty() {
                out.push_str("()");
            } else {
                out.push('(');
                for ((_, field_dom), field) in decl.fields.iter().zip(fields) {
                    out.push(' ');
                    write_value(field_dom, field, out)?;
                }
                out.push_str(" )");
            }
        }
        _ => return Err(conformance_err(domain, value)),
    }
    Ok(())
}

fn write_seq(
    elem: &Domain,
    items: &[AttrValue],
    brackets: (char, char),
    out: &mut String,
) -> Result<()> {
    if items.is_empty() {
        out.push(brackets.0);
        out.push(brackets.1);
        return Ok(());
    }
    out.push(brackets.0);
    for item in items {
        out.push(' ');
        write_value(elem, item, out)?;
    }
    out.push(' ');
    out.push(brackets.1);
    Ok(())
}

fn write_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii() && (c as u32) >= 0x20 => out.push(c),
            c => {
                // Non-ASCII and control characters as UTF-16 escapes,
                // surrogate pairs for supplementary-plane characters.
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
}

#[derive(Clone, Debug, PartialEq)]
enum Tok<'a> {
    LCurly,
    RCurly,
    LSquare,
    RSquare,
    LParen,
    RParen,
    Dash,
    Word(&'a str),
    Str(String),
}

impl Tok<'_> {
    fn describe(&self) -> String {
        match self {
            Tok::LCurly => "`{`".into(),
            Tok::RCurly => "`}`".into(),
            Tok::LSquare => "`[`".into(),
            Tok::RSquare => "`]`".into(),
            Tok::LParen => "`(`".into(),
            Tok::RParen => "`)`".into(),
            Tok::Dash => "`-`".into(),
            Tok::Word(w) => format!("`{w}`"),
            Tok::Str(_) => "string literal".into(),
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    peeked: Option<Option<(usize, Tok<'a>)>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<Option<(usize, Tok<'a>)>> {
        if let Some(tok) = self.peeked.take() {
            return Ok(tok);
        }
        self.lex()
    }

    fn peek(&mut self) -> Result<Option<&(usize, Tok<'a>)>> {
        if self.peeked.is_none() {
            let tok = self.lex()?;
            self.peeked = Some(tok);
        }
        Ok(self.peeked.as_ref().and_then(|t| t.as_ref()))
    }

    fn end_pos(&self) -> usize {
        self.src.len()
    }

    fn lex(&mut self) -> Result<Option<(usize, Tok<'a>)>> {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        let start = self.pos;
        let mut chars = trimmed.chars();
        let Some(first) = chars.next() else {
            return Ok(None);
        };
        let tok = match first {
            '{' => {
                self.pos += 1;
                Tok::LCurly
            }
            '}' => {
                self.pos += 1;
                Tok::RCurly
            }
            '[' => {
                self.pos += 1;
                Tok::LSquare
            }
            ']' => {
                self.pos += 1;
                Tok::RSquare
            }
            '(' => {
                self.pos += 1;
                Tok::LParen
            }
            ')' => {
                self.pos += 1;
                Tok::RParen
            }
            '"' => return self.lex_string(start).map(Some),
            '-' if !matches!(chars.next(), Some(c) if c.is_ascii_digit() || c == '.') => {
                self.pos += 1;
                Tok::Dash
            }
            _ => {
                let len = trimmed
                    .find(|c: char| c.is_whitespace() || "{}[]()\"".contains(c))
                    .unwrap_or(trimmed.len());
                self.pos += len;
                Tok::Word(&trimmed[..len])
            }
        };
        Ok(Some((start, tok)))
    }

    fn lex_string(&mut self, start: usize) -> Result<(usize, Tok<'a>)> {
        // Decode into UTF-16 code units so surrogate-pair escapes combine.
        let mut units: Vec<u16> = Vec::new();
        let mut chars = self.src[start + 1..].char_indices();
        loop {
            let Some((off, c)) = chars.next() else {
                return Err(parse_err(start, "unterminated string literal"));
            };
            match c {
                '"' => {
                    self.pos = start + 1 + off + 1;
                    let s = String::from_utf16(&units)
                        .map_err(|_| parse_err(start, "invalid surrogate in string literal"))?;
                    return Ok((start, Tok::Str(s)));
                }
                '\\' => {
                    let Some((esc_off, esc)) = chars.next() else {
                        return Err(parse_err(start, "unterminated escape in string literal"));
                    };
                    match esc {
                        '"' => units.push(u16::from(b'"')),
                        '\\' => units.push(u16::from(b'\\')),
                        'u' => {
                            let hex_start = start + 1 + esc_off + 1;
                            let hex = self
                                .src
                                .get(hex_start..hex_start + 4)
                                .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
                                .ok_or_else(|| {
                                    parse_err(hex_start, "expected four hex digits after \\u")
                                })?;
                            let unit = u16::from_str_radix(hex, 16)
                                .map_err(|_| parse_err(hex_start, "invalid \\u escape"))?;
                            units.push(unit);
                            for _ in 0..4 {
                                chars.next();
                            }
                        }
                        other => {
                            return Err(parse_err(
                                start + 1 + esc_off,
                                format!("unknown escape `\\{other}`"),
                            ));
                        }
                    }
                }
                c => units.extend_from_slice(c.encode_utf16(&mut [0u16; 2])),
            }
        }
    }
}

fn parse_value(domain: &Domain, lx: &mut Lexer<'_>) -> Result<AttrValue> {
    let end = lx.end_pos();
    let Some((pos, tok)) = lx.next()? else {
        return Err(parse_err(end, "unexpected end of input"));
    };
    if let Tok::Word(w) = tok {
        if w == NULL_LITERAL || w == OLD_NULL_LITERAL {
            return Ok(AttrValue::Null);
        }
    }
    match domain {
        Domain::Boolean => match tok {
            Tok::Word("t") => Ok(AttrValue::Bool(true)),
            Tok::Word("f") => Ok(AttrValue::Bool(false)),
            other => Err(parse_err(
                pos,
                format!("expected `t` or `f`, found {}", other.describe()),
            )),
        },
        Domain::Integer => match tok {
            Tok::Word(w) => w
                .parse::<i32>()
                .map(AttrValue::Int)
                .map_err(|_| parse_err(pos, format!("invalid integer `{w}`"))),
            other => Err(parse_err(
                pos,
                format!("expected integer, found {}", other.describe()),
            )),
        },
        Domain::Long => match tok {
            Tok::Word(w) => w
                .parse::<i64>()
                .map(AttrValue::Long)
                .map_err(|_| parse_err(pos, format!("invalid long `{w}`"))),
            other => Err(parse_err(
                pos,
                format!("expected long, found {}", other.describe()),
            )),
        },
        Domain::Double => match tok {
            Tok::Word(w) => w
                .parse::<f64>()
                .map(AttrValue::Double)
                .map_err(|_| parse_err(pos, format!("invalid double `{w}`"))),
            other => Err(parse_err(
                pos,
                format!("expected double, found {}", other.describe()),
            )),
        },
        Domain::String => match tok {
            Tok::Str(s) => Ok(AttrValue::Str(s)),
            other => Err(parse_err(
                pos,
                format!("expected string literal, found {}", other.describe()),
            )),
        },
        Domain::Enumeration(decl) => match tok {
            Tok::Word(w) if decl.constants.iter().any(|c| c == w) => {
                Ok(AttrValue::Enum(w.to_owned()))
            }
            Tok::Word(w) => Err(parse_err(
                pos,
                format!("unknown constant `{w}` for enumeration {}", decl.name),
            )),
            other => Err(parse_err(
                pos,
                format!("expected enumeration constant, found {}", other.describe()),
            )),
        },
        Domain::List(elem) => {
            expect(pos, &tok, &Tok::LSquare)?;
            let items = parse_seq(elem, lx, &Tok::RSquare)?;
            Ok(AttrValue::List(items))
        }
        Domain::Set(elem) => {
            expect(pos, &tok, &Tok::LCurly)?;
            let items = parse_seq(elem, lx, &Tok::RCurly)?;
            Ok(AttrValue::Set(items))
        }
        Domain::Map(key, val) => {
            expect(pos, &tok, &Tok::LCurly)?;
            let mut pairs = Vec::new();
            loop {
                if matches!(lx.peek()?, Some((_, Tok::RCurly))) {
                    lx.next()?;
                    return Ok(AttrValue::Map(pairs));
                }
                if lx.peek()?.is_none() {
                    return Err(parse_err(lx.end_pos(), "unterminated map"));
                }
                let k = parse_value(key, lx)?;
                match lx.next()? {
                    Some((_, Tok::Dash)) => {}
                    Some((p, other)) => {
                        return Err(parse_err(
                            p,
                            format!(
                                "expected `-` between map key and value, found {}",
                                other.describe()
                            ),
                        ));
                    }
                    None => return Err(parse_err(lx.end_pos(), "unterminated map")),
                }
                let v = parse_value(val, lx)?;
                pairs.push((k, v));
            }
        }
        Domain::Record(decl) => {
            expect(pos, &tok, &Tok::LParen)?;
            let mut fields = Vec::with_capacity(decl.fields.len());
            for (name, field_dom) in &decl.fields {
                match lx.peek()? {
                    Some((p, Tok::RParen)) => {
                        return Err(parse_err(
                            *p,
                            format!("missing value for record field `{name}`"),
                        ));
                    }
                    None => {
                        return Err(parse_err(
                            lx.end_pos(),
                            format!("missing value for record field `{name}`"),
                        ));
                    }
                    Some(_) => {}
                }
                fields.push(parse_value(field_dom, lx)?);
            }
            match lx.next()? {
                Some((_, Tok::RParen)) => Ok(AttrValue::Record(fields)),
                Some((p, _)) => Err(parse_err(
                    p,
                    format!("record {} has extra fields in text form", decl.name),
                )),
                None => Err(parse_err(lx.end_pos(), "unterminated record")),
            }
        }
    }
}

fn parse_seq(elem: &Domain, lx: &mut Lexer<'_>, close: &Tok<'_>) -> Result<Vec<AttrValue>> {
    let mut items = Vec::new();
    loop {
        match lx.peek()? {
            None => return Err(parse_err(lx.end_pos(), "unterminated collection")),
            Some((_, tok)) if tok == close => {}
            Some(_) => {
                items.push(parse_value(elem, lx)?);
                continue;
            }
        }
        lx.next()?;
        return Ok(items);
    }
}

fn expect(pos: usize, found: &Tok<'_>, wanted: &Tok<'_>) -> Result<()> {
    if found == wanted {
        Ok(())
    } else {
        Err(parse_err(
            pos,
            format!("expected {}, found {}", wanted.describe(), found.describe()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::domain::{EnumDomain, RecordDomain};
    use super::*;

    fn roundtrip(domain: &Domain, value: AttrValue) {
        let text = serialize(domain, &value).expect("serialize");
        let parsed = parse(domain, &text).expect(&text);
        assert_eq!(parsed, value, "text was `{text}`");
    }

    #[test]
    fn primitives_roundtrip() {
        roundtrip(&Domain::Boolean, AttrValue::Bool(true));
        roundtrip(&Domain::Boolean, AttrValue::Bool(false));
        roundtrip(&Domain::Integer, AttrValue::Int(-1000));
        roundtrip(&Domain::Long, AttrValue::Long(9876543210));
        roundtrip(&Domain::Double, AttrValue::Double(-2.5e-3));
        roundtrip(&Domain::String, AttrValue::Str("hello world".into()));
    }

    #[test]
    fn null_roundtrips_for_every_domain() {
        let list = Domain::List(Arc::new(Domain::Integer));
        for d in [&Domain::Boolean, &Domain::String, &list] {
            let text = serialize(d, &AttrValue::Null).unwrap();
            assert_eq!(text, "n");
            assert_eq!(parse(d, &text).unwrap(), AttrValue::Null);
        }
    }

    #[test]
    fn legacy_null_spelling_accepted() {
        assert_eq!(
            parse(&Domain::Integer, "\\null").unwrap(),
            AttrValue::Null
        );
    }

    #[test]
    fn string_escapes_roundtrip() {
        roundtrip(&Domain::String, AttrValue::Str("say \"hi\"".into()));
        roundtrip(&Domain::String, AttrValue::Str("back\\slash".into()));
        roundtrip(&Domain::String, AttrValue::Str("umlaut: äöü".into()));
        roundtrip(&Domain::String, AttrValue::Str("emoji: 🦀".into()));
        let text = serialize(&Domain::String, &AttrValue::Str("ä".into())).unwrap();
        assert_eq!(text, "\"\\u00e4\"");
    }

    #[test]
    fn collections_roundtrip() {
        let list = Domain::List(Arc::new(Domain::Integer));
        roundtrip(&list, AttrValue::List(vec![]));
        roundtrip(
            &list,
            AttrValue::List(vec![AttrValue::Int(1), AttrValue::Int(-2)]),
        );
        let set = Domain::Set(Arc::new(Domain::String));
        roundtrip(
            &set,
            AttrValue::Set(vec![AttrValue::Str("a".into()), AttrValue::Str("b".into())]),
        );
        let map = Domain::Map(Arc::new(Domain::String), Arc::new(Domain::Long));
        roundtrip(&map, AttrValue::Map(vec![]));
        roundtrip(
            &map,
            AttrValue::Map(vec![
                (AttrValue::Str("k1".into()), AttrValue::Long(1)),
                (AttrValue::Str("k2".into()), AttrValue::Long(-2)),
            ]),
        );
    }

    #[test]
    fn empty_collections_use_compact_form() {
        let set = Domain::Set(Arc::new(Domain::Integer));
        assert_eq!(serialize(&set, &AttrValue::Set(vec![])).unwrap(), "{}");
        let list = Domain::List(Arc::new(Domain::Integer));
        assert_eq!(serialize(&list, &AttrValue::List(vec![])).unwrap(), "[]");
    }

    #[test]
    fn negative_numbers_inside_maps_lex_as_values() {
        let map = Domain::Map(Arc::new(Domain::Integer), Arc::new(Domain::Integer));
        let value = AttrValue::Map(vec![(AttrValue::Int(-1), AttrValue::Int(-2))]);
        let text = serialize(&map, &value).unwrap();
        assert_eq!(text, "{ -1 - -2 }");
        assert_eq!(parse(&map, &text).unwrap(), value);
    }

    #[test]
    fn record_roundtrip_and_extra_field_rejection() {
        let rec = Domain::Record(Arc::new(RecordDomain {
            name: "Point".into(),
            fields: vec![("x".into(), Domain::Integer), ("y".into(), Domain::Integer)],
        }));
        roundtrip(
            &rec,
            AttrValue::Record(vec![AttrValue::Int(3), AttrValue::Int(4)]),
        );
        let err = parse(&rec, "( 1 2 3 )").unwrap_err();
        assert!(matches!(err, GraphError::Parse { .. }), "{err}");
        let err = parse(&rec, "( 1 )").unwrap_err();
        assert!(err.to_string().contains("missing value"), "{err}");
    }

    #[test]
    fn enum_roundtrip_and_unknown_constant() {
        let e = Domain::Enumeration(Arc::new(EnumDomain {
            name: "Weekday".into(),
            constants: vec!["FIRST".into(), "SECOND".into()],
        }));
        roundtrip(&e, AttrValue::Enum("SECOND".into()));
        let err = parse(&e, "THIRD").unwrap_err();
        assert!(err.to_string().contains("unknown constant"), "{err}");
    }

    #[test]
    fn parse_errors_carry_positions() {
        let err = parse(&Domain::Integer, "  abc").unwrap_err();
        match err {
            GraphError::Parse { position, .. } => assert_eq!(position, 2),
            other => panic!("unexpected error {other}"),
        }
        let err = parse(&Domain::Integer, "1 2").unwrap_err();
        match err {
            GraphError::Parse { position, message } => {
                assert_eq!(position, 2);
                assert!(message.contains("trailing"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn nested_composites_roundtrip() {
        let inner = Domain::List(Arc::new(Domain::Double));
        let map = Domain::Map(Arc::new(Domain::String), Arc::new(inner));
        roundtrip(
            &map,
            AttrValue::Map(vec![(
                AttrValue::Str("xs".into()),
                AttrValue::List(vec![AttrValue::Double(1.5), AttrValue::Null]),
            )]),
        );
    }
}
