//! Operator table and builders.

use std::str::FromStr;

use crate::error::SqlError;

/// Layout strategy for an operator and its rendered operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builder {
    /// `NAME(a, b)`; the operator text minus its trailing `()`.
    Function,
    /// `OP a`
    Prefix,
    /// `a OP (b, c)`
    List,
    /// `a OP b AND c`
    Between,
    /// `a OP b OP c`, used for set operators between queries.
    Set,
    /// `(a) OP b`
    Alias,
}

impl Builder {
    /// Lay out `parts` around the operator keyword.
    pub fn build(self, operator: &str, parts: &[String]) -> String {
        match self {
            Builder::Function => {
                let name = operator.strip_suffix("()").unwrap_or(operator);
                format!("{}({})", name.to_uppercase(), parts.join(", "))
            }
            Builder::Prefix => {
                format!("{} {}", operator, first(parts))
            }
            Builder::List => {
                let rest = parts.get(1..).unwrap_or_default();
                format!("{} {} ({})", first(parts), operator, rest.join(", "))
            }
            Builder::Between => {
                let low = parts.get(1).map(String::as_str).unwrap_or_default();
                let high = if parts.len() >= 2 {
                    parts.last().map(String::as_str).unwrap_or_default()
                } else {
                    ""
                };
                format!("{} {} {} AND {}", first(parts), operator, low, high)
            }
            Builder::Set => parts.join(&format!(" {} ", operator)),
            Builder::Alias => {
                let alias = parts.get(1).map(String::as_str).unwrap_or_default();
                format!("({}) {} {}", first(parts), operator, alias)
            }
        }
    }
}

fn first(parts: &[String]) -> &str {
    parts.first().map(String::as_str).unwrap_or_default()
}

impl FromStr for Builder {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "function" => Ok(Builder::Function),
            "prefix" => Ok(Builder::Prefix),
            "list" => Ok(Builder::List),
            "between" => Ok(Builder::Between),
            "set" => Ok(Builder::Set),
            "alias" => Ok(Builder::Alias),
            other => Err(SqlError::InvalidDescriptor(format!(
                "unknown operator builder '{}'",
                other
            ))),
        }
    }
}

/// How an operator is rendered.
///
/// With neither a builder nor a format, operands are joined with ` OP `.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operator {
    /// Operator used instead when the right operand renders as `NULL`.
    pub null: Option<String>,
    pub builder: Option<Builder>,
    /// `%s` template; a single `%s` receives all operands joined by `, `.
    pub format: Option<String>,
}

impl Operator {
    /// Plain infix operator.
    pub fn infix() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: Builder) -> Self {
        Self {
            builder: Some(builder),
            ..Self::default()
        }
    }

    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..Self::default()
        }
    }

    /// Set the `NULL` alternate.
    pub fn or_null(mut self, null: impl Into<String>) -> Self {
        self.null = Some(null.into());
        self
    }
}

/// Policy for unregistered `name()` tokens.
pub(crate) static FUNCTION: Operator = Operator {
    null: None,
    builder: Some(Builder::Function),
    format: None,
};

/// Fill a `%s` template.
pub(crate) fn apply_format(template: &str, parts: &[String]) -> String {
    let slots = template.matches("%s").count();
    if slots <= 1 {
        return template.replacen("%s", &parts.join(", "), 1);
    }
    let mut out = String::with_capacity(template.len());
    let mut parts = parts.iter();
    let mut pieces = template.split("%s").peekable();
    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_some() {
            if let Some(part) = parts.next() {
                out.push_str(part);
            }
        }
    }
    out
}

/// Value formatters usable as map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// Render as an identifier.
    Name,
    /// Render as a literal through the caster.
    Value,
    /// Emit verbatim.
    Plain,
}

impl Formatter {
    /// Match a formatter token, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            ":name" => Some(Formatter::Name),
            ":value" => Some(Formatter::Value),
            ":plain" => Some(Formatter::Plain),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Formatter::Name => ":name",
            Formatter::Value => ":value",
            Formatter::Plain => ":plain",
        }
    }
}

/// Operators shared by every dialect.
pub(crate) fn base_operators() -> Vec<(String, Operator)> {
    let mut ops = vec![
        ("=".to_string(), Operator::infix().or_null(":is")),
        ("!=".to_string(), Operator::infix().or_null(":is not")),
    ];
    let infix = [
        "<=>", "<", ">", "<=", ">=", "<>", "-", "+", "*", "/", "%", ">>", "<<", ":=", "&", "|",
        ":mod", ":div", ":like", ":not like", ":is", ":is not", ":and", ":or", ":xor",
    ];
    ops.extend(infix.iter().map(|op| (op.to_string(), Operator::infix())));

    let built: [(&[&str], Builder); 4] = [
        (&[":distinct", "~", ":not"], Builder::Prefix),
        (&[":between", ":not between"], Builder::Between),
        (
            &[":in", ":not in", ":exists", ":not exists", ":all", ":any", ":some"],
            Builder::List,
        ),
        (&[":as"], Builder::Alias),
    ];
    for (names, builder) in built {
        ops.extend(
            names
                .iter()
                .map(|op| (op.to_string(), Operator::with_builder(builder))),
        );
    }

    ops.push(("()".to_string(), Operator::with_format("(%s)")));
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builders() {
        assert_eq!(Builder::Function.build("concat()", &parts(&["a", "b"])), "CONCAT(a, b)");
        assert_eq!(Builder::Prefix.build("NOT", &parts(&["x"])), "NOT x");
        assert_eq!(
            Builder::List.build("IN", &parts(&["\"a\"", "1", "2"])),
            "\"a\" IN (1, 2)"
        );
        assert_eq!(
            Builder::Between.build("BETWEEN", &parts(&["\"a\"", "1", "9"])),
            "\"a\" BETWEEN 1 AND 9"
        );
        assert_eq!(
            Builder::Between.build("BETWEEN", &parts(&["\"a\"", "1"])),
            "\"a\" BETWEEN 1 AND 1"
        );
        assert_eq!(
            Builder::Set.build("UNION", &parts(&["q1", "q2", "q3"])),
            "q1 UNION q2 UNION q3"
        );
        assert_eq!(
            Builder::Alias.build("AS", &parts(&["SELECT 1", "\"t\""])),
            "(SELECT 1) AS \"t\""
        );
    }

    #[test]
    fn test_apply_format() {
        assert_eq!(apply_format("(%s)", &parts(&["1", "2"])), "(1, 2)");
        assert_eq!(apply_format("%s ^ %s", &parts(&["a", "b"])), "a ^ b");
        assert_eq!(apply_format("|/ %s", &parts(&["9"])), "|/ 9");
    }

    #[test]
    fn test_formatter_tokens() {
        assert_eq!(Formatter::from_token(":NAME"), Some(Formatter::Name));
        assert_eq!(Formatter::from_token(":plain"), Some(Formatter::Plain));
        assert_eq!(Formatter::from_token(":raw"), None);
    }

    #[test]
    fn test_base_table() {
        let ops = base_operators();
        let eq = ops.iter().find(|(name, _)| name == "=").map(|(_, op)| op);
        assert_eq!(eq.and_then(|op| op.null.as_deref()), Some(":is"));
        assert!(ops.iter().any(|(name, op)| name == ":in" && op.builder == Some(Builder::List)));
    }
}
