//! `INSERT`.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{clause, column_value, shared_clauses, Parts, TableSchema, ToSql};
use crate::dialect::{Dialect, RenderState, Schema};
use crate::error::{SqlError, SqlResult};

#[derive(Debug, Clone, Default)]
pub struct Insert<'d> {
    dialect: Option<&'d Dialect>,
    parts: Parts,
    into: Option<String>,
    rows: Vec<Map<String, Value>>,
    schema: Option<TableSchema>,
}

shared_clauses!(Insert);

impl<'d> Insert<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into(mut self, table: impl Into<String>) -> Self {
        self.into = Some(table.into());
        self
    }

    /// Add a row. The first row's keys name the columns; later rows missing
    /// one of them insert `NULL`.
    pub fn values(mut self, row: Value) -> SqlResult<Self> {
        match row {
            Value::Object(map) => {
                self.rows.push(map);
                Ok(self)
            }
            other => Err(SqlError::InvalidDescriptor(format!(
                "insert values must be a map, got {}",
                other
            ))),
        }
    }

    /// Cast function applied to each value, keyed by column.
    pub fn schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.schema = Some(TableSchema(schema));
        self
    }

    pub fn returning(mut self, fields: impl Into<Value>) -> Self {
        self.parts.add_returning(fields.into());
        self
    }
}

impl ToSql for Insert<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        let into = self
            .into
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SqlError::missing("INSERT", "INTO"))?;
        let first = self
            .rows
            .first()
            .ok_or_else(|| SqlError::missing("INSERT", "VALUES"))?;
        let dialect = self.require_dialect()?;

        let columns: Vec<&String> = first.keys().collect();
        let schema = self.schema.as_ref().map(|s| s.0.clone());

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut values = Vec::with_capacity(columns.len());
            for key in &columns {
                let value = row.get(key.as_str()).unwrap_or(&Value::Null);
                let mut state = RenderState::new().with_current(key.as_str(), schema.clone());
                values.push(column_value(dialect, value, &mut state)?);
            }
            rows.push(format!("({})", values.join(", ")));
        }

        Ok([
            self.parts.build_cte(),
            "INSERT".to_string(),
            self.parts.build_flags(),
            clause("INTO", &dialect.name(into, None)),
            format!(
                " ({})",
                columns.iter().map(|c| dialect.name(c, None)).collect::<Vec<_>>().join(", ")
            ),
            format!(" VALUES {}", rows.join(", ")),
            self.parts.build_returning(dialect)?,
        ]
        .concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::schema_fn;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_insert_rows() {
        let dialect = Dialect::ansi();
        let sql = dialect
            .insert()
            .into("table")
            .values(json!({"field1": "value1", "field2": "value2"}))
            .unwrap()
            .values(json!({"field1": "value3", "field2": "value4"}))
            .unwrap()
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"table\" (\"field1\", \"field2\") VALUES ('value1', 'value2'), ('value3', 'value4')"
        );
    }

    #[test]
    fn test_missing_into() {
        let err = Dialect::ansi()
            .insert()
            .values(json!({"a": 1}))
            .unwrap()
            .to_sql()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid `INSERT` statement, missing `INTO` clause.");
    }

    #[test]
    fn test_schema_reaches_caster() {
        let mut dialect = Dialect::ansi();
        dialect.set_caster(|d, value, state| {
            assert_eq!(state.name(), Some("field"));
            d.default_cast(&state.coerce(value))
        });
        let sql = dialect
            .insert()
            .into("table")
            .values(json!({"field": "value"}))
            .unwrap()
            .schema(schema_fn(|_, _| json!("casted")))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"table\" (\"field\") VALUES ('casted')");
    }
}
