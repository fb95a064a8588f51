//! Table constraints and meta attributes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::conditions::ConditionOptions;
use super::state::RenderState;
use super::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::parser::{fill_template, parse_template};

/// A constraint template with its optional index keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintTemplate {
    /// Text with `${placeholder}` slots.
    pub template: String,
    /// Keyword substituted for `${index}` when the descriptor sets `key`.
    pub key: Option<String>,
    /// Keyword substituted for `${index}` when the descriptor sets `index`.
    pub index: Option<String>,
}

impl ConstraintTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            key: None,
            index: None,
        }
    }

    pub fn with_index_keywords(mut self, key: impl Into<String>, index: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self.index = Some(index.into());
        self
    }
}

/// Which meta table to look an attribute up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaScope {
    Table,
    Column,
}

/// Syntax for one meta attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaAttr {
    pub keyword: String,
    /// Render the value as a literal instead of verbatim.
    pub escape: bool,
    pub join: String,
    /// Accepted values; `None` accepts anything.
    pub options: Option<Vec<Value>>,
}

impl MetaAttr {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            escape: false,
            join: " ".into(),
            options: None,
        }
    }

    pub fn escaped(mut self) -> Self {
        self.escape = true;
        self
    }

    pub fn one_of(mut self, options: Vec<Value>) -> Self {
        self.options = Some(options);
        self
    }
}

/// One or several column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Columns {
    One(String),
    Many(Vec<String>),
}

impl Columns {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Columns::One(name) => std::slice::from_ref(name),
            Columns::Many(names) => names,
        }
    }
}

impl From<&str> for Columns {
    fn from(name: &str) -> Self {
        Columns::One(name.to_string())
    }
}

impl From<Vec<&str>> for Columns {
    fn from(names: Vec<&str>) -> Self {
        Columns::Many(names.into_iter().map(String::from).collect())
    }
}

/// A table constraint descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// Template name: `primary`, `unique`, `foreign key`, `check`, `index`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, alias = "columns", skip_serializing_if = "Option::is_none")]
    pub column: Option<Columns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Columns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<Columns>,
    /// Referenced table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Trailing action, e.g. `DELETE CASCADE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
    /// Condition tree for `CHECK`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<Value>,
    /// Name rendered as `CONSTRAINT name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Explicit name, replacing the one derived from the columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub index: bool,
}

impl Constraint {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn column(mut self, columns: impl Into<Columns>) -> Self {
        self.column = Some(columns.into());
        self
    }

    pub fn primary_key(mut self, columns: impl Into<Columns>) -> Self {
        self.primary_key = Some(columns.into());
        self
    }

    pub fn foreign_key(mut self, columns: impl Into<Columns>) -> Self {
        self.foreign_key = Some(columns.into());
        self
    }

    pub fn to(mut self, table: impl Into<String>) -> Self {
        self.to = Some(table.into());
        self
    }

    pub fn on(mut self, action: impl Into<String>) -> Self {
        self.on = Some(action.into());
        self
    }

    pub fn expr(mut self, tree: Value) -> Self {
        self.expr = Some(tree);
        self
    }

    pub fn constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint = Some(name.into());
        self
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn index(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn from_value(value: &Value) -> SqlResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    }
}

impl Dialect {
    /// Render meta attributes of `data` for a scope.
    ///
    /// Only keys listed in `names` are considered when given; otherwise every
    /// key of `data`. Falsy values and unknown or disallowed attributes are
    /// skipped.
    pub fn meta(&self, scope: MetaScope, data: &Map<String, Value>, names: Option<&[String]>) -> String {
        let table = match scope {
            MetaScope::Table => &self.table_meta,
            MetaScope::Column => &self.column_meta,
        };
        let keys: Vec<&str> = match names {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => data.keys().map(String::as_str).collect(),
        };

        let mut out = Vec::new();
        for key in keys {
            let (Some(value), Some(attr)) = (data.get(key), table.get(key)) else {
                continue;
            };
            if !truthy(value) {
                continue;
            }
            if attr.options.as_ref().is_some_and(|allowed| !allowed.contains(value)) {
                continue;
            }
            let rendered = if attr.escape {
                self.value(value, &RenderState::new())
            } else {
                match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                }
            };
            out.push(format!("{}{}{}", attr.keyword, attr.join, rendered).trim().to_string());
        }
        out.join(" ")
    }

    /// Render a table constraint through the named template.
    pub fn constraint(
        &self,
        kind: &str,
        constraint: &Constraint,
        options: &ConditionOptions<'_>,
    ) -> SqlResult<String> {
        let template = self
            .constraints
            .get(kind)
            .ok_or_else(|| SqlError::InvalidConstraintTemplate(kind.to_string()))?;
        let segments = parse_template(&template.template)?;

        let mut data: HashMap<&str, String> = HashMap::new();
        if constraint.key {
            if let Some(keyword) = &template.key {
                data.insert("index", keyword.clone());
            }
        } else if constraint.index {
            if let Some(keyword) = &template.index {
                data.insert("index", keyword.clone());
            }
        }
        if let Some(to) = &constraint.to {
            data.insert("to", self.name(to, None));
        }
        if let Some(on) = &constraint.on {
            data.insert("on", format!("ON {}", on));
        }
        if let Some(name) = &constraint.constraint {
            data.insert("constraint", format!("CONSTRAINT {}", self.name(name, None)));
        }
        if let Some(expr) = &constraint.expr {
            let tree = match expr {
                Value::Array(_) => expr.clone(),
                other => Value::Array(vec![other.clone()]),
            };
            data.insert("expr", self.conditions(&tree, options)?);
        }

        let column_sets = [
            ("column", &constraint.column),
            ("primaryKey", &constraint.primary_key),
            ("foreignKey", &constraint.foreign_key),
        ];
        for (placeholder, columns) in column_sets {
            if let Some(columns) = columns {
                let names = columns.as_slice();
                let escaped: Vec<String> = names.iter().map(|n| self.name(n, None)).collect();
                data.insert(placeholder, escaped.join(", "));
                data.insert("name", self.name(&names.join("_"), None));
            }
        }
        if let Some(name) = &constraint.name {
            data.insert("name", self.name(name, None));
        }

        Ok(fill_template(&segments, |name| {
            data.get(name).map(String::as_str)
        }))
    }
}
