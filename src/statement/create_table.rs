//! `CREATE TABLE`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::{chunk, flag, ToSql};
use crate::dialect::{ColumnDef, ConditionOptions, Constraint, Dialect, MetaScope, Schema, Schemas};
use crate::error::{SqlError, SqlResult};

#[derive(Debug, Clone, Default)]
pub struct CreateTable<'d> {
    dialect: Option<&'d Dialect>,
    if_not_exists: bool,
    table: Option<String>,
    columns: Vec<(String, ColumnDef)>,
    constraints: Vec<Constraint>,
    meta: Map<String, Value>,
}

impl<'d> CreateTable<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialect(mut self, dialect: &'d Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add or replace a column, keeping its original position.
    pub fn column(mut self, name: impl Into<String>, def: ColumnDef) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = def,
            None => self.columns.push((name, def)),
        }
        self
    }

    /// Add columns from `{name: descriptor}` maps, or an array of them.
    pub fn columns(mut self, columns: &Value) -> SqlResult<Self> {
        match columns {
            Value::Array(items) => {
                for item in items {
                    self = self.columns(item)?;
                }
            }
            Value::Object(map) => {
                for (name, def) in map {
                    self = self.column(name.as_str(), ColumnDef::from_value(def)?);
                }
            }
            Value::Null => {}
            other => {
                return Err(SqlError::InvalidDescriptor(format!(
                    "expected column descriptors, got {}",
                    other
                )))
            }
        }
        Ok(self)
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Replace the constraint list.
    pub fn constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Table meta such as `engine`, `charset` or `tablespace`.
    pub fn meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    /// Abstract type of a column, `string` when unknown or untyped.
    pub fn type_of(&self, name: &str) -> &str {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .and_then(|(_, def)| def.type_.as_deref())
            .unwrap_or("string")
    }

    fn column_types(&self) -> ColumnTypes {
        ColumnTypes(
            self.columns
                .iter()
                .map(|(name, _)| (name.clone(), self.type_of(name).to_string()))
                .collect(),
        )
    }

    fn build_definition(&self, dialect: &Dialect) -> SqlResult<String> {
        let mut primary = None;
        let mut result = Vec::with_capacity(self.columns.len() + self.constraints.len() + 1);

        for (name, def) in &self.columns {
            let def = ColumnDef {
                name: Some(name.clone()),
                ..def.clone()
            };
            if dialect.field(&def)?.serial {
                primary = Some(name.as_str());
            }
            result.push(dialect.column(&def)?);
        }

        let schemas: Schemas = [(String::new(), Arc::new(self.column_types()) as Arc<dyn Schema>)]
            .into_iter()
            .collect();
        let options = ConditionOptions::new().schemas(&schemas);
        for constraint in &self.constraints {
            let kind = constraint.kind.as_deref().ok_or(SqlError::MissingConstraintType)?;
            let sql = dialect.constraint(kind, constraint, &options)?;
            if !sql.is_empty() {
                result.push(sql);
            }
            if kind == "primary" {
                primary = None;
            }
        }

        if let Some(column) = primary {
            debug!(column, "Adding implicit primary key");
            result.push(dialect.constraint(
                "primary",
                &Constraint::new("primary").column(column),
                &ConditionOptions::new(),
            )?);
        }
        Ok(format!(" ({})", result.join(", ")))
    }
}

impl ToSql for CreateTable<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        let table = self
            .table
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SqlError::missing("CREATE TABLE", "TABLE"))?;
        if self.columns.is_empty() {
            return Err(SqlError::missing("CREATE TABLE", "COLUMNS"));
        }
        let dialect = self.dialect.ok_or(SqlError::MissingDialect)?;

        Ok([
            "CREATE TABLE".to_string(),
            flag("IF NOT EXISTS", self.if_not_exists),
            chunk(&dialect.name(table, None)),
            self.build_definition(dialect)?,
            chunk(&dialect.meta(MetaScope::Table, &self.meta, None)),
        ]
        .concat())
    }
}

/// Snapshot of the declared column types, used as the table schema for
/// `CHECK` expressions.
#[derive(Debug, Clone)]
struct ColumnTypes(HashMap<String, String>);

impl Schema for ColumnTypes {
    fn cast(&self, field: &str, value: &Value) -> Value {
        let kind = self.0.get(field).map(String::as_str).unwrap_or("string");
        let text = match value {
            Value::String(text) => text.trim(),
            _ => return value.clone(),
        };
        let cast = match kind {
            "id" | "serial" | "integer" => text.parse::<i64>().ok().map(Value::from),
            "float" | "decimal" => text.parse::<f64>().ok().map(Value::from),
            "boolean" => match text {
                "1" | "true" => Some(Value::Bool(true)),
                "0" | "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        };
        cast.unwrap_or_else(|| value.clone())
    }
}
