//! Small nom parsers used by the renderers.
//!
//! Two grammars live here:
//!
//! ```text
//! FOREIGN KEY (${foreignKey}) REFERENCES ${to} (${primaryKey}) ${on}
//! ───────┬─────  ─────┬─────
//!        │            └── Placeholder (substituted, or dropped when unset)
//!        └── Literal text
//!
//! created_at DESC
//! ────┬───── ─┬──
//!     │       └── Direction (ASC / DESC, any case)
//!     └── Field
//! ```

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_while1},
    character::complete::{anychar, char, multispace0, multispace1},
    combinator::{eof, map, not, peek, recognize},
    multi::{many0, many1, many_till},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::error::{SqlError, SqlResult};

/// A piece of a constraint template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied as-is.
    Literal(String),
    /// A `${name}` placeholder.
    Placeholder(String),
}

/// Parse a constraint template into its segments.
pub fn parse_template(input: &str) -> SqlResult<Vec<Segment>> {
    match many0(alt((placeholder, literal)))(input) {
        Ok(("", segments)) => Ok(segments),
        Ok((remaining, _)) => Err(SqlError::template(
            input.len() - remaining.len(),
            format!("Unterminated placeholder: '{}'", remaining),
        )),
        Err(e) => Err(SqlError::template(0, format!("Parse failed: {:?}", e))),
    }
}

/// Parse `${name}`.
fn placeholder(input: &str) -> IResult<&str, Segment> {
    map(
        delimited(
            tag("${"),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            char('}'),
        ),
        |name: &str| Segment::Placeholder(name.to_string()),
    )(input)
}

/// Parse literal text, including a `$` that doesn't open a placeholder.
fn literal(input: &str) -> IResult<&str, Segment> {
    map(
        recognize(many1(alt((
            is_not("$"),
            terminated(tag("$"), not(char('{'))),
        )))),
        |text: &str| Segment::Literal(text.to_string()),
    )(input)
}

/// Substitute `values` into parsed template segments.
///
/// Unset or empty placeholders are dropped along with the whitespace gap
/// they leave, so `UNIQUE ${index} (${column})` without an index renders as
/// `UNIQUE (...)`. Substituted values are copied verbatim.
pub fn fill_template<'a>(
    segments: &[Segment],
    values: impl Fn(&str) -> Option<&'a str>,
) -> String {
    let mut out = String::new();
    let mut dropped = false;
    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                if dropped && (out.is_empty() || out.ends_with(char::is_whitespace)) {
                    out.push_str(text.trim_start());
                } else {
                    out.push_str(text);
                }
                dropped = false;
            }
            Segment::Placeholder(name) => match values(name) {
                Some(value) if !value.is_empty() => {
                    out.push_str(value);
                    dropped = false;
                }
                _ => dropped = true,
            },
        }
    }
    out.trim().to_string()
}

/// Split an `ORDER BY` term into its field and direction.
///
/// Terms without a trailing `ASC`/`DESC` keyword are returned whole with no
/// direction.
pub fn parse_order(input: &str) -> (String, Option<String>) {
    let trimmed = input.trim();
    match order_term(trimmed) {
        Ok((_, (field, dir))) if !field.trim().is_empty() => {
            (field.trim().to_string(), Some(dir.to_string()))
        }
        _ => (trimmed.to_string(), None),
    }
}

fn order_term(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, field) = recognize(many_till(anychar, peek(direction_suffix)))(input)?;
    let (input, dir) = direction_suffix(input)?;
    Ok((input, (field, dir)))
}

fn direction_suffix(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace1,
        terminated(
            alt((tag_no_case("asc"), tag_no_case("desc"))),
            pair(multispace0, eof),
        ),
    )(input)
}
