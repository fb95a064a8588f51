//! `UPDATE`.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{chunk, clause, column_value, shared_clauses, Parts, TableSchema, ToSql};
use crate::dialect::{ConditionOptions, Dialect, RenderState, Schema};
use crate::error::{SqlError, SqlResult};

#[derive(Debug, Clone, Default)]
pub struct Update<'d> {
    dialect: Option<&'d Dialect>,
    parts: Parts,
    table: Option<String>,
    values: Map<String, Value>,
    schema: Option<TableSchema>,
}

shared_clauses!(Update, filtered);

impl<'d> Update<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Columns to set. Later calls add to (or overwrite) earlier ones.
    pub fn values(mut self, values: Value) -> SqlResult<Self> {
        match values {
            Value::Object(map) => {
                self.values.extend(map);
                Ok(self)
            }
            other => Err(SqlError::InvalidDescriptor(format!(
                "update values must be a map, got {}",
                other
            ))),
        }
    }

    pub fn schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.schema = Some(TableSchema(schema));
        self
    }

    pub fn returning(mut self, fields: impl Into<Value>) -> Self {
        self.parts.add_returning(fields.into());
        self
    }
}

impl ToSql for Update<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        let table = self
            .table
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SqlError::missing("UPDATE", "TABLE"))?;
        if self.values.is_empty() {
            return Err(SqlError::missing("UPDATE", "VALUES"));
        }
        let dialect = self.require_dialect()?;

        let schema = self.schema.as_ref().map(|s| s.0.clone());
        let mut assignments = Vec::with_capacity(self.values.len());
        for (key, value) in &self.values {
            let mut state = RenderState::new().with_current(key.clone(), schema.clone());
            assignments.push(format!(
                "{} = {}",
                dialect.name(key, None),
                column_value(dialect, value, &mut state)?
            ));
        }

        let schemas = TableSchema::as_default(self.schema.as_ref());
        let options = ConditionOptions::new().schemas(&schemas);

        Ok([
            self.parts.build_cte(),
            "UPDATE".to_string(),
            self.parts.build_flags(),
            chunk(&dialect.name(table, None)),
            clause("SET", &assignments.join(", ")),
            clause(
                "WHERE",
                &dialect.conditions(&Value::Array(self.parts.where_.clone()), &options)?,
            ),
            self.parts.build_order(dialect, None),
            self.parts.build_limit(),
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
    fn test_update() {
        let dialect = Dialect::ansi();
        let sql = dialect
            .update()
            .table("table")
            .values(json!({"field": "value"}))
            .unwrap()
            .where_clause(true)
            .order(json!(["field1", "field2 desc"]))
            .limit(50, Some(10))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"table\" SET \"field\" = 'value' WHERE TRUE ORDER BY \"field1\" ASC, \"field2\" DESC LIMIT 50 OFFSET 10"
        );
    }

    #[test]
    fn test_missing_clauses() {
        let dialect = Dialect::ansi();
        let err = dialect.update().values(json!({"a": 1})).unwrap().to_sql().unwrap_err();
        assert_eq!(err.to_string(), "Invalid `UPDATE` statement, missing `TABLE` clause.");
        let err = dialect.update().table("t").to_sql().unwrap_err();
        assert_eq!(err.to_string(), "Invalid `UPDATE` statement, missing `VALUES` clause.");
    }

    #[test]
    fn test_schema_applies_to_where() {
        let mut dialect = Dialect::ansi();
        dialect.set_caster(|d, value, state| d.default_cast(&state.coerce(value)));
        let sql = dialect
            .update()
            .table("table")
            .values(json!({"field": "value"}))
            .unwrap()
            .where_clause(json!({"field": "value"}))
            .schema(schema_fn(|_, _| json!("casted")))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"table\" SET \"field\" = 'casted' WHERE \"field\" = 'casted'"
        );
    }
}
