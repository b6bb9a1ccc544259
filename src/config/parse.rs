//! Reader for the sectioned definition text:
//!
//! ```text
//! # comment
//! [name="b0" type="box"]
//! x : real = 2.0
//! y : real as length = 2.0 mm
//! names : string[2] = "a" "b"
//! ```

use crate::error::ConfigError;
use crate::math::units::{kind_of, unit_value, UnitKind};

use super::{Properties, Value};

/// One `[name=... type=...]` section and its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub type_id: String,
    pub properties: Properties,
    /// 1-based line of the section header.
    pub line: usize,
}

fn syntax(line: usize, reason: impl Into<String>) -> ConfigError {
    ConfigError::Syntax {
        line,
        reason: reason.into(),
    }
}

/// Reads `"..."` from the front of `input`, returning the unescaped text and
/// the remainder.
fn take_quoted(input: &str, line: usize) -> Result<(String, &str), ConfigError> {
    let input = input.trim_start();
    let rest = input
        .strip_prefix('"')
        .ok_or_else(|| syntax(line, format!("expected a quoted string at '{input}'")))?;
    let mut out = String::new();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &rest[i + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => break,
            },
            _ => out.push(c),
        }
    }
    Err(syntax(line, "unterminated string"))
}

fn parse_header(body: &str, line: usize) -> Result<(String, String), ConfigError> {
    let mut name = None;
    let mut type_id = None;
    let mut rest = body.trim();
    while !rest.is_empty() {
        let (key, after) = rest
            .split_once('=')
            .ok_or_else(|| syntax(line, format!("expected key=\"value\" in section header at '{rest}'")))?;
        let (value, after) = take_quoted(after, line)?;
        match key.trim() {
            "name" => name = Some(value),
            "type" => type_id = Some(value),
            other => return Err(syntax(line, format!("unknown section attribute '{other}'"))),
        }
        rest = after.trim_start();
    }
    match (name, type_id) {
        (Some(name), Some(type_id)) if !name.is_empty() => Ok((name, type_id)),
        (None | Some(_), Some(_)) => Err(syntax(line, "section without a name")),
        (_, None) => Err(syntax(line, "section without a type")),
    }
}

fn parse_real(text: &str, kind: Option<UnitKind>, line: usize) -> Result<Value, ConfigError> {
    let mut words = text.split_whitespace();
    let number = words
        .next()
        .ok_or_else(|| syntax(line, "missing real value"))?;
    let value: f64 = number
        .parse()
        .map_err(|_| syntax(line, format!("invalid real value '{number}'")))?;
    let symbol = words.next();
    if let Some(extra) = words.next() {
        return Err(syntax(line, format!("unexpected trailing text '{extra}'")));
    }
    match (kind, symbol) {
        // No symbol: the section's `length_unit`/`angle_unit` applies on fetch.
        (_, None) => Ok(Value::Real { value, unit: None }),
        (kind, Some(symbol)) => {
            let kind = match kind.or_else(|| kind_of(symbol)) {
                Some(kind) => kind,
                None => {
                    return Err(ConfigError::UnknownUnit {
                        kind: "length or angle",
                        unit: symbol.to_string(),
                    })
                }
            };
            Ok(Value::Real {
                value: value * unit_value(kind, symbol)?,
                unit: Some(kind),
            })
        }
    }
}

fn parse_boolean(text: &str, line: usize) -> Result<Value, ConfigError> {
    match text {
        "true" | "1" => Ok(Value::Boolean(true)),
        "false" | "0" => Ok(Value::Boolean(false)),
        _ => Err(syntax(line, format!("invalid boolean value '{text}'"))),
    }
}

fn parse_text_list(text: &str, count: usize, line: usize) -> Result<Value, ConfigError> {
    let mut rest = text;
    let mut values = Vec::with_capacity(count);
    while !rest.trim().is_empty() {
        let (value, after) = take_quoted(rest, line)?;
        values.push(value);
        rest = after;
    }
    if values.len() != count {
        return Err(syntax(
            line,
            format!("expected {count} strings, found {}", values.len()),
        ));
    }
    Ok(Value::TextList(values))
}

/// Parses `type [as kind]` where `type` may carry an `[N]` array suffix.
fn parse_type(spec: &str, line: usize) -> Result<(String, Option<usize>, Option<UnitKind>), ConfigError> {
    let mut words = spec.split_whitespace();
    let base = words.next().ok_or_else(|| syntax(line, "missing property type"))?;
    let kind = match (words.next(), words.next()) {
        (None, _) => None,
        (Some("as"), Some(label)) => Some(
            UnitKind::from_label(label)
                .ok_or_else(|| syntax(line, format!("unknown dimension '{label}'")))?,
        ),
        _ => return Err(syntax(line, format!("invalid property type '{spec}'"))),
    };
    if words.next().is_some() {
        return Err(syntax(line, format!("invalid property type '{spec}'")));
    }
    match base.split_once('[') {
        Some((name, size)) => {
            let size = size
                .strip_suffix(']')
                .and_then(|s| s.parse::<usize>().ok())
                .ok_or_else(|| syntax(line, format!("invalid array size in '{base}'")))?;
            Ok((name.to_string(), Some(size), kind))
        }
        None => Ok((base.to_string(), None, kind)),
    }
}

fn parse_property(text: &str, line: usize) -> Result<(String, Value), ConfigError> {
    let (key, rest) = text
        .split_once(':')
        .ok_or_else(|| syntax(line, "expected 'key : type = value'"))?;
    let (type_spec, value_text) = rest
        .split_once('=')
        .ok_or_else(|| syntax(line, "expected '=' after the property type"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(syntax(line, "empty property key"));
    }
    let (type_name, size, kind) = parse_type(type_spec, line)?;
    let value_text = value_text.trim();

    let value = match (type_name.as_str(), size) {
        ("boolean", None) => parse_boolean(value_text, line)?,
        ("integer", None) => Value::Integer(
            value_text
                .parse()
                .map_err(|_| syntax(line, format!("invalid integer value '{value_text}'")))?,
        ),
        ("real", None) => parse_real(value_text, kind, line)?,
        ("string", None) => {
            let (s, trailing) = take_quoted(value_text, line)?;
            if !trailing.trim().is_empty() {
                return Err(syntax(line, format!("unexpected trailing text '{}'", trailing.trim())));
            }
            Value::Text(s)
        }
        ("string", Some(count)) => parse_text_list(value_text, count, line)?,
        _ => return Err(syntax(line, format!("unsupported property type '{}'", type_spec.trim()))),
    };
    Ok((key.to_string(), value))
}

/// Parses a definition text into its sections, in order of appearance.
///
/// # Errors
///
/// Returns [`ConfigError::Syntax`] (with the 1-based line) for malformed input
/// and [`ConfigError::UnknownUnit`] for unknown unit symbols.
pub fn parse_definitions(text: &str) -> Result<Vec<Declaration>, ConfigError> {
    let mut declarations: Vec<Declaration> = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(header) = trimmed.strip_prefix('[') {
            let body = header
                .strip_suffix(']')
                .ok_or_else(|| syntax(line, "unterminated section header"))?;
            let (name, type_id) = parse_header(body, line)?;
            declarations.push(Declaration {
                name,
                type_id,
                properties: Properties::new(),
                line,
            });
            continue;
        }
        let current = declarations
            .last_mut()
            .ok_or_else(|| syntax(line, "property outside of any section"))?;
        let (key, value) = parse_property(trimmed, line)?;
        current.properties.insert(key, value);
    }
    Ok(declarations)
}
