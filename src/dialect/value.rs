//! Literal rendering: quoting and value casting.

use serde_json::Value;

use super::state::RenderState;
use super::Dialect;

/// Replacement for the built-in string literal quoter.
pub trait Quoter: Send + Sync {
    fn quote(&self, text: &str) -> String;
}

impl<F> Quoter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn quote(&self, text: &str) -> String {
        self(text)
    }
}

/// Replacement for the built-in value caster.
///
/// Casters receive the dialect so they can fall back to
/// [`Dialect::default_cast`], and the state so they can see which field the
/// value belongs to.
pub trait Caster: Send + Sync {
    fn cast(&self, dialect: &Dialect, value: &Value, state: &RenderState<'_>) -> String;
}

impl<F> Caster for F
where
    F: Fn(&Dialect, &Value, &RenderState<'_>) -> String + Send + Sync,
{
    fn cast(&self, dialect: &Dialect, value: &Value, state: &RenderState<'_>) -> String {
        self(dialect, value, state)
    }
}

/// Caster that runs every value through the current field's schema first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaCaster;

impl Caster for SchemaCaster {
    fn cast(&self, dialect: &Dialect, value: &Value, state: &RenderState<'_>) -> String {
        dialect.default_cast(&state.coerce(value))
    }
}

impl Dialect {
    /// Quote `text` as a string literal.
    pub fn quote(&self, text: &str) -> String {
        match &self.quoter {
            Some(quoter) => quoter.quote(text),
            None => format!("'{}'", escape_literal(text)),
        }
    }

    /// Quote a composite literal; its inner double quotes stay bare.
    fn quote_composite(&self, literal: &str) -> String {
        match &self.quoter {
            Some(quoter) => quoter.quote(literal),
            None => format!("'{}'", literal.replace('\\', "\\\\").replace('\'', "\\'")),
        }
    }

    /// Render a value as a SQL literal, through the caster if one is set.
    pub fn value(&self, value: &Value, state: &RenderState<'_>) -> String {
        match &self.caster {
            Some(caster) => caster.cast(self, value, state),
            None => self.default_cast(value),
        }
    }

    /// The built-in literal rendering, ignoring any installed caster.
    pub fn default_cast(&self, value: &Value) -> String {
        match value {
            Value::Array(_) => self.quote_composite(&array_literal(value)),
            Value::String(text) => self.quote(text),
            Value::Object(_) => self.quote(&value.to_string()),
            scalar => scalar_literal(scalar),
        }
    }
}

fn scalar_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// `{a,"b",NULL}` composite literal, before outer quoting.
fn array_literal(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(array_literal).collect();
            format!("{{{}}}", inner.join(","))
        }
        Value::String(text) => {
            format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
        }
        Value::Object(_) => {
            let text = value.to_string();
            format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
        }
        scalar => scalar_literal(scalar),
    }
}

fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\x1a' => out.push_str("\\z"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' | '\'' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        let dialect = Dialect::ansi();
        let state = RenderState::new();
        assert_eq!(dialect.value(&json!(null), &state), "NULL");
        assert_eq!(dialect.value(&json!(true), &state), "TRUE");
        assert_eq!(dialect.value(&json!(false), &state), "FALSE");
        assert_eq!(dialect.value(&json!(12.5), &state), "12.5");
        assert_eq!(dialect.value(&json!("it's"), &state), r"'it\'s'");
    }

    #[test]
    fn test_quote_escapes_control_chars() {
        let dialect = Dialect::ansi();
        assert_eq!(dialect.quote("a\nb\t\"c\"\\"), r#"'a\nb\t\"c\"\\'"#);
        assert_eq!(dialect.quote("100%"), "'100%'");
        assert_eq!(dialect.quote("\0\x1a\r\x08"), r"'\0\z\r\b'");
    }

    #[test]
    fn test_arrays() {
        let dialect = Dialect::postgresql();
        let state = RenderState::new();
        assert_eq!(
            dialect.value(&json!([null, "text", true]), &state),
            r#"'{NULL,"text",TRUE}'"#
        );
        assert_eq!(
            dialect.value(&json!(["\\", "\""]), &state),
            r#"'{"\\\\","\\""}'"#
        );
        assert_eq!(dialect.value(&json!([[1, 2], [3]]), &state), "'{{1,2},{3}}'");
    }

    #[test]
    fn test_custom_quoter() {
        let mut dialect = Dialect::ansi();
        dialect.set_quoter(|text| format!("'{}'", text.replace('\'', "''")));
        assert_eq!(dialect.quote("it's"), "'it''s'");
        assert_eq!(dialect.value(&json!("it's"), &RenderState::new()), "'it''s'");
    }

    #[test]
    fn test_custom_caster() {
        let mut dialect = Dialect::ansi();
        dialect.set_caster(|d, value, state| match (state.name(), value) {
            (Some("secret"), _) => "'***'".to_string(),
            _ => d.default_cast(value),
        });
        let state = RenderState::new().with_current("secret", None);
        assert_eq!(dialect.value(&json!("hunter2"), &state), "'***'");
        assert_eq!(dialect.value(&json!(1), &RenderState::new()), "1");
    }
}
