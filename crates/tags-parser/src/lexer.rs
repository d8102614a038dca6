//! Lexical pieces of the markup grammar.

use std::borrow::Cow;

use nom::{
    branch::alt,
    bytes::complete::{take_till, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::recognize,
    sequence::{delimited, pair, separated_pair, tuple},
    IResult,
};

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

/// Parse an element or attribute name.
pub fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char)))(input)
}

/// Parse a single- or double-quoted attribute value (raw, undecoded).
pub fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_till(|c| c == '\''), char('\'')),
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
    ))(input)
}

/// Parse `name = 'value'` with optional whitespace around `=`.
pub fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(name, tuple((multispace0, char('='), multispace0)), quoted)(input)
}

/// Text run up to the next `<`.
pub fn text_run(input: &str) -> IResult<&str, &str> {
    take_till(|c| c == '<')(input)
}

/// Replace predefined entities and numeric character references.
///
/// On failure the offending entity name is returned.
pub fn decode_entities(raw: &str) -> Result<Cow<'_, str>, String> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| after.chars().take(8).collect::<String>())?;
        let entity = &after[..end];
        let ch = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => numeric_reference(entity).ok_or_else(|| entity.to_string())?,
        };
        out.push(ch);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

fn numeric_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line as u32, column as u32)
}
