//! Identifier escaping and name lists.

use serde_json::{Map, Value};

use super::operator::Formatter;
use super::state::{Aliases, RenderState};
use super::Dialect;
use crate::error::SqlResult;

/// Split a dotted name into `(prefix, leaf)` at the last dot.
///
/// ```
/// use sqltree::dialect::undot;
///
/// assert_eq!(undot("schema.table.col"), ("schema.table", "col"));
/// assert_eq!(undot("col"), ("", "col"));
/// ```
pub fn undot(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or(("", name))
}

impl Dialect {
    /// Quote a single identifier segment. `*` is left bare.
    pub fn escape(&self, name: &str) -> String {
        if name == "*" {
            return name.to_string();
        }
        let q = self.escape;
        let doubled = format!("{q}{q}");
        format!("{q}{}{q}", name.replace(q, &doubled))
    }

    /// Escape a possibly dotted name, resolving its prefix through `aliases`.
    pub fn name(&self, name: &str, aliases: Option<&Aliases>) -> String {
        let (prefix, leaf) = undot(name);
        if prefix.is_empty() {
            return self.escape(leaf);
        }
        let prefix = aliases
            .and_then(|aliases| aliases.get(prefix))
            .map(String::as_str)
            .unwrap_or(prefix);
        let mut escaped: Vec<String> = prefix.split('.').map(|part| self.escape(part)).collect();
        escaped.push(self.escape(leaf));
        escaped.join(".")
    }

    /// Render a list of names as a comma separated string.
    pub fn names(&self, fields: &Value, aliases: Option<&Aliases>) -> SqlResult<String> {
        Ok(self.escapes(fields, None, aliases)?.join(", "))
    }

    /// Render each entry of a (possibly nested) name list.
    ///
    /// Entries may be plain names, `{field: alias}` pairs, `{prefix: [...]}`
    /// groups, bare scalars (emitted as is), or operator and formatter
    /// expressions. Duplicates are dropped by rendered text and
    /// first-seen order is kept. When `prefix` is set, unqualified names are
    /// qualified with it before alias resolution.
    pub fn escapes(
        &self,
        fields: &Value,
        prefix: Option<&str>,
        aliases: Option<&Aliases>,
    ) -> SqlResult<Vec<String>> {
        let mut out = Vec::new();
        self.collect_escapes(fields, prefix, aliases, &mut out)?;
        Ok(out)
    }

    fn collect_escapes(
        &self,
        fields: &Value,
        prefix: Option<&str>,
        aliases: Option<&Aliases>,
        out: &mut Vec<String>,
    ) -> SqlResult<()> {
        match fields {
            Value::Array(items) => {
                for item in items {
                    self.collect_escapes(item, prefix, aliases, out)?;
                }
            }
            Value::Object(map) => {
                for (key, value) in map {
                    let rendered = if Formatter::from_token(key).is_some() || self.is_operator(key) {
                        let single = Value::Object(Map::from_iter([(key.clone(), value.clone())]));
                        let state = RenderState::scoped(aliases, None);
                        self.conditions_with_state(&single, ":and", &state)?
                    } else if value.is_array() {
                        self.collect_escapes(value, Some(key), aliases, out)?;
                        continue;
                    } else {
                        let alias = match value {
                            Value::String(alias) => alias.clone(),
                            other => other.to_string(),
                        };
                        format!(
                            "{} AS {}",
                            self.name(&qualify(key, prefix), aliases),
                            self.escape(&alias)
                        )
                    };
                    push_unique(out, rendered);
                }
            }
            Value::String(name) => {
                push_unique(out, self.name(&qualify(name, prefix), aliases));
            }
            Value::Null => {}
            other => push_unique(out, other.to_string()),
        }
        Ok(())
    }

    /// Qualify the names in `names` with `prefix`.
    ///
    /// Map keys that are plain names get qualified; under `:name` the value is
    /// qualified; under any other operator the operand list is walked with
    /// `prefix_values` off, so literal operands stay untouched. Bare scalars
    /// are qualified only when `prefix_values` is on.
    pub fn prefix(&self, names: &Value, prefix: &str, prefix_values: bool) -> Vec<Value> {
        let items: Vec<&Value> = match names {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        items
            .into_iter()
            .map(|item| self.prefix_one(item, prefix, prefix_values))
            .collect()
    }

    fn prefix_one(&self, item: &Value, prefix: &str, prefix_values: bool) -> Value {
        match item {
            Value::Object(map) => {
                let mut result = Map::new();
                for (key, value) in map {
                    if Formatter::from_token(key) == Some(Formatter::Name) {
                        result.insert(key.clone(), qualify_value(value, prefix));
                    } else if self.is_operator(key) {
                        let operands = match value {
                            Value::Array(_) => Value::Array(self.prefix(value, prefix, false)),
                            other => other.clone(),
                        };
                        result.insert(key.clone(), operands);
                    } else {
                        result.insert(qualify(key, Some(prefix)), value.clone());
                    }
                }
                Value::Object(result)
            }
            Value::Array(_) => Value::Array(self.prefix(item, prefix, prefix_values)),
            other if prefix_values => qualify_value(other, prefix),
            other => other.clone(),
        }
    }
}

fn qualify(name: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() && !name.contains('.') => {
            format!("{}.{}", prefix, name)
        }
        _ => name.to_string(),
    }
}

fn qualify_value(value: &Value, prefix: &str) -> Value {
    match value {
        Value::String(name) => Value::String(qualify(name, Some(prefix))),
        other => other.clone(),
    }
}

fn push_unique(out: &mut Vec<String>, rendered: String) {
    if !rendered.is_empty() && !out.contains(&rendered) {
        out.push(rendered);
    }
}
