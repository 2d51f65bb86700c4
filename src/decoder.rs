//! Line decoder and argument resolvers.
//!
//! A line is split into its leading token and the raw argument text. Arguments are only
//! resolved when the instruction that consumes them runs, since the same text means different
//! things to different instructions: `5` is an address to `copyto` but a literal to `init`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ErrorKind, Expected, HrmError};
use crate::value::Value;

lazy_static! {
    static ref LINE: Regex = Regex::new(
        r"^(?:(?P<comment>#.*)|(?::(?P<label>[A-Za-z_][0-9A-Za-z_]*)|(?P<mnemonic>[0-9A-Za-z_+\-]+))\s*(?P<args>.*))?$"
    )
    .unwrap();
    static ref MEMREF: Regex = Regex::new(
        r"^(?:(?P<addr>[0-9]+)|\[(?P<ind_addr>[0-9]+)\]|\$?(?P<name>[A-Za-z_][0-9A-Za-z_]*)|\[\$?(?P<ind_name>[A-Za-z_][0-9A-Za-z_]*)\])$"
    )
    .unwrap();
    static ref LITERAL: Regex = Regex::new(r"^(?:(?P<int>[+\-]?[0-9]+)|'(?P<char>.)')$").unwrap();
    static ref NAME: Regex = Regex::new(r"^\$?(?P<name>[A-Za-z_][0-9A-Za-z_]*)$").unwrap();
    static ref JUMP_LABEL: Regex = Regex::new(r"^:(?P<label>[A-Za-z_][0-9A-Za-z_]*)$").unwrap();
    static ref WORD: Regex = Regex::new(r"\S+").unwrap();
}

/// Leading token of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Instruction(&'a str),
    /// Label declaration, without the `:` marker.
    Label(&'a str),
    Comment,
    Empty,
}

/// A line split into its leading token and the unresolved text after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded<'a> {
    pub token: Token<'a>,
    pub args: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Address(i64),
    Name(String),
}

/// Designation of a memory cell, not yet checked against the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemRef {
    pub target: Target,
    /// The cell holds the address to use, rather than being used itself.
    pub indirect: bool,
}

impl MemRef {
    pub fn is_symbolic(&self) -> bool {
        matches!(self.target, Target::Name(_))
    }
}

/// Split a line into its leading token and its trimmed arguments.
///
/// `line` is 1-based and only used to tag the error.
pub fn decode_line(line: usize, text: &str) -> Result<Decoded<'_>, HrmError> {
    let text = text.trim();
    let Some(caps) = LINE.captures(text) else {
        return Err(HrmError::new(syntax(text, Expected::Line), line));
    };
    let token = if caps.name("comment").is_some() {
        Token::Comment
    } else if let Some(label) = caps.name("label") {
        Token::Label(label.as_str())
    } else if let Some(mnemonic) = caps.name("mnemonic") {
        Token::Instruction(mnemonic.as_str())
    } else {
        Token::Empty
    };
    let args = caps.name("args").map_or("", |args| args.as_str().trim());
    Ok(Decoded { token, args })
}

pub fn resolve_memref(raw: &str) -> Result<MemRef, ErrorKind> {
    let caps = MEMREF
        .captures(raw)
        .ok_or_else(|| syntax(raw, Expected::MemRef))?;
    // Too many digits for i64 is still an address, just one no memory can hold
    let address = |digits: &str| Target::Address(digits.parse().unwrap_or(i64::MAX));
    let memref = if let Some(addr) = caps.name("addr") {
        MemRef {
            target: address(addr.as_str()),
            indirect: false,
        }
    } else if let Some(addr) = caps.name("ind_addr") {
        MemRef {
            target: address(addr.as_str()),
            indirect: true,
        }
    } else if let Some(name) = caps.name("name") {
        MemRef {
            target: Target::Name(name.as_str().to_string()),
            indirect: false,
        }
    } else if let Some(name) = caps.name("ind_name") {
        MemRef {
            target: Target::Name(name.as_str().to_string()),
            indirect: true,
        }
    } else {
        unreachable!("memory reference regex matched without a group")
    };
    Ok(memref)
}

pub fn resolve_value(raw: &str) -> Result<Value, ErrorKind> {
    let caps = LITERAL
        .captures(raw)
        .ok_or_else(|| syntax(raw, Expected::Literal))?;
    if let Some(int) = caps.name("int") {
        // Out of range for i64
        int.as_str()
            .parse()
            .map(Value::Int)
            .map_err(|_| syntax(raw, Expected::Literal))
    } else {
        let ch = caps
            .name("char")
            .and_then(|ch| ch.as_str().chars().next())
            .ok_or_else(|| syntax(raw, Expected::Literal))?;
        Ok(Value::Char(ch))
    }
}

/// Whitespace-separated literals, as used by `data`.
pub fn resolve_values(raw: &str) -> Result<Vec<Value>, ErrorKind> {
    raw.split_whitespace().map(resolve_value).collect()
}

/// Names may be written with or without their `$` sigil; the sigil is not part of the name.
pub fn resolve_name(raw: &str) -> Result<String, ErrorKind> {
    NAME.captures(raw)
        .and_then(|caps| caps.name("name"))
        .map(|name| name.as_str().to_string())
        .ok_or_else(|| syntax(raw, Expected::Name))
}

/// Returns the label without its `:` marker.
pub fn resolve_jumplabel(raw: &str) -> Result<String, ErrorKind> {
    JUMP_LABEL
        .captures(raw)
        .and_then(|caps| caps.name("label"))
        .map(|label| label.as_str().to_string())
        .ok_or_else(|| syntax(raw, Expected::Label))
}

/// Split raw arguments, requiring exactly `expected` of them.
pub fn arguments<'a>(
    mnemonic: &str,
    args: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, ErrorKind> {
    let args: Vec<&str> = args.split_whitespace().collect();
    if args.len() != expected {
        return Err(ErrorKind::Arity {
            mnemonic: mnemonic.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(args)
}

/// Parse the contents of an input-data file.
///
/// Errors carry the line of the data file and a span over the offending literal.
pub fn parse_input(src: &str) -> Result<Vec<Value>, HrmError> {
    let mut values = Vec::new();
    let mut offset = 0;
    for (idx, line) in src.split_inclusive('\n').enumerate() {
        for word in WORD.find_iter(line) {
            let value = resolve_value(word.as_str()).map_err(|kind| {
                HrmError::new(kind, idx + 1).with_span((offset + word.start(), word.len()))
            })?;
            values.push(value);
        }
        offset += line.len();
    }
    Ok(values)
}

fn syntax(found: &str, expected: Expected) -> ErrorKind {
    ErrorKind::Syntax {
        found: found.to_string(),
        expected,
    }
}
