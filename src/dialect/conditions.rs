//! The condition tree compiler.
//!
//! A tree is a JSON value:
//!
//! - arrays are operand lists; nested arrays are spliced in place;
//! - a map key that is a formatter (`:name`, `:value`, `:plain`) formats its
//!   payload;
//! - a map key that is an operator (registered, or any `:`-prefixed token)
//!   renders its payload as the operand list;
//! - any other map key is a field name, compared against its payload;
//! - scalars are literals.
//!
//! Maps with several keys render one operand per entry, in insertion order.

use serde_json::{json, Map, Value};
use tracing::trace;

use super::operator::{apply_format, Formatter, FUNCTION};
use super::state::{Aliases, RenderState, Schemas};
use super::{identifier::undot, Dialect};
use crate::error::{SqlError, SqlResult};

/// Options for a top-level [`Dialect::conditions`] call.
#[derive(Clone, Copy)]
pub struct ConditionOptions<'a> {
    prepend: Option<&'a str>,
    operator: &'a str,
    aliases: Option<&'a Aliases>,
    schemas: Option<&'a Schemas>,
}

impl Default for ConditionOptions<'_> {
    fn default() -> Self {
        Self {
            prepend: None,
            operator: ":and",
            aliases: None,
            schemas: None,
        }
    }
}

impl<'a> ConditionOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyword emitted before a non-empty result, e.g. `WHERE`.
    pub fn prepend(mut self, keyword: &'a str) -> Self {
        self.prepend = Some(keyword);
        self
    }

    /// Operator joining the top-level operands (default `:and`).
    pub fn operator(mut self, operator: &'a str) -> Self {
        self.operator = operator;
        self
    }

    pub fn aliases(mut self, aliases: &'a Aliases) -> Self {
        self.aliases = Some(aliases);
        self
    }

    pub fn aliases_opt(mut self, aliases: Option<&'a Aliases>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn schemas(mut self, schemas: &'a Schemas) -> Self {
        self.schemas = Some(schemas);
        self
    }

    pub fn schemas_opt(mut self, schemas: Option<&'a Schemas>) -> Self {
        self.schemas = schemas;
        self
    }
}

impl std::fmt::Debug for ConditionOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionOptions")
            .field("prepend", &self.prepend)
            .field("operator", &self.operator)
            .field("aliases", &self.aliases)
            .field("schemas", &self.schemas.map(|s| s.keys().collect::<Vec<_>>()))
            .finish()
    }
}

/// Whether a tree renders to nothing.
pub(crate) fn is_empty(tree: &Value) -> bool {
    match tree {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.iter().all(is_empty),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn operands(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

impl Dialect {
    /// Compile a condition tree.
    pub fn conditions(&self, tree: &Value, options: &ConditionOptions<'_>) -> SqlResult<String> {
        let state = RenderState::scoped(options.aliases, options.schemas);
        let sql = self.conditions_with_state(tree, options.operator, &state)?;
        trace!(%sql, "Compiled conditions");
        Ok(match options.prepend {
            Some(keyword) if !sql.is_empty() => format!("{} {}", keyword, sql),
            _ => sql,
        })
    }

    /// Compile a tree under an existing state, joining top-level operands
    /// with `operator`.
    pub fn conditions_with_state(
        &self,
        tree: &Value,
        operator: &str,
        state: &RenderState<'_>,
    ) -> SqlResult<String> {
        if is_empty(tree) {
            return Ok(String::new());
        }
        self.operator(&operator.to_lowercase(), tree, state)
    }

    /// Render one operator over its operand list.
    pub(crate) fn operator(
        &self,
        token: &str,
        operands_tree: &Value,
        state: &RenderState<'_>,
    ) -> SqlResult<String> {
        let policy = match self.operators.get(token) {
            Some(policy) => policy,
            None => match token.strip_suffix("()") {
                Some(inner) if self.operators.contains_key(inner) => {
                    let sql = self.operator(inner, operands_tree, state)?;
                    return Ok(format!("({})", sql));
                }
                Some(_) => &FUNCTION,
                None => return Err(SqlError::UnknownOperator(token.to_string())),
            },
        };

        trace!(operator = token, "Dispatching operator");
        let parts = self.compile_list(operands(operands_tree), state)?;

        let mut op = token;
        if parts.get(1).map(String::as_str) == Some("NULL") {
            if let Some(alternate) = policy.null.as_deref() {
                op = alternate;
            }
        }
        let keyword = match op.strip_prefix(':') {
            Some(rest) => rest.to_uppercase(),
            None => op.to_string(),
        };

        if let Some(builder) = policy.builder {
            return Ok(builder.build(&keyword, &parts));
        }
        if let Some(format) = &policy.format {
            return Ok(apply_format(format, &parts));
        }
        Ok(parts.join(&format!(" {} ", keyword)))
    }

    /// Render each operand. Scratch updates made while rendering one operand
    /// are visible to the next.
    fn compile_list(&self, items: &[Value], state: &RenderState<'_>) -> SqlResult<Vec<String>> {
        let mut local = state.clone();
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            self.compile_item(item, &mut local, &mut parts)?;
        }
        Ok(parts)
    }

    fn compile_item(
        &self,
        item: &Value,
        state: &mut RenderState<'_>,
        parts: &mut Vec<String>,
    ) -> SqlResult<()> {
        match item {
            Value::Array(items) => {
                for sub in items {
                    self.compile_item(sub, state, parts)?;
                }
            }
            Value::Object(map) => {
                for (key, payload) in map {
                    let token = key.to_lowercase();
                    let sql = if let Some(formatter) = Formatter::from_token(&token) {
                        self.format_with(formatter, payload, state)?
                    } else if self.is_operator(&token) {
                        self.operator(&token, payload, state)?
                    } else {
                        self.field_condition(key, payload, state)?
                    };
                    parts.push(sql);
                }
            }
            scalar => parts.push(self.value(scalar, state)),
        }
        Ok(())
    }

    /// `{field: payload}`.
    fn field_condition(
        &self,
        field: &str,
        payload: &Value,
        state: &RenderState<'_>,
    ) -> SqlResult<String> {
        let (prefix, leaf) = undot(field);
        let mut scoped = state.clone();
        scoped.set_current(prefix, leaf);
        let name_node = json!({ ":name": field });

        let map = match payload {
            Value::Object(map) if map.is_empty() => {
                return Err(SqlError::InvalidDescriptor(format!(
                    "empty condition map for field '{}'",
                    field
                )));
            }
            Value::Object(map) => map,
            Value::Array(_) => {
                let operands = Value::Array(vec![name_node, payload.clone()]);
                return self.operator(":in", &operands, &scoped);
            }
            scalar => {
                let operands = Value::Array(vec![name_node, scalar.clone()]);
                return self.operator("=", &operands, &scoped);
            }
        };

        let mut rendered = Vec::with_capacity(map.len());
        for (key, inner) in map {
            let token = key.to_lowercase();
            let sql = if let Some(formatter) = Formatter::from_token(&token) {
                let escaped = self.name(field, state.aliases());
                let mut local = scoped.clone();
                format!("{} = {}", escaped, self.format_with(formatter, inner, &mut local)?)
            } else if !self.operators.contains_key(&token) {
                let single = Value::Object(Map::from_iter([(key.clone(), inner.clone())]));
                let operands = Value::Array(vec![name_node.clone(), single]);
                self.operator(":in", &operands, &scoped)?
            } else {
                let mut list = vec![name_node.clone()];
                list.extend(operands(inner).iter().cloned());
                self.operator(&token, &Value::Array(list), &scoped)?
            };
            rendered.push(sql);
        }
        Ok(rendered.join(" AND "))
    }

    /// Apply a formatter by token.
    pub fn format(&self, token: &str, payload: &Value, state: &mut RenderState<'_>) -> SqlResult<String> {
        let formatter =
            Formatter::from_token(token).ok_or_else(|| SqlError::UnknownFormatter(token.to_string()))?;
        self.format_with(formatter, payload, state)
    }

    pub(crate) fn format_with(
        &self,
        formatter: Formatter,
        payload: &Value,
        state: &mut RenderState<'_>,
    ) -> SqlResult<String> {
        match formatter {
            Formatter::Name => match payload {
                Value::String(name) => {
                    let (prefix, leaf) = undot(name);
                    state.set_current(prefix, leaf);
                    Ok(self.name(name, state.aliases()))
                }
                other => self.names(other, state.aliases()),
            },
            Formatter::Value => Ok(self.value(payload, state)),
            Formatter::Plain => Ok(match payload {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            }),
        }
    }
}
