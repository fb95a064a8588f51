//! `DELETE`.

use std::sync::Arc;

use serde_json::Value;

use super::{clause, shared_clauses, Parts, TableSchema, ToSql};
use crate::dialect::{ConditionOptions, Dialect, Schema};
use crate::error::{SqlError, SqlResult};

#[derive(Debug, Clone, Default)]
pub struct Delete<'d> {
    dialect: Option<&'d Dialect>,
    parts: Parts,
    from: Option<Value>,
    schema: Option<TableSchema>,
}

shared_clauses!(Delete, filtered);

impl<'d> Delete<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, table: impl Into<Value>) -> Self {
        self.from = Some(table.into());
        self
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

impl ToSql for Delete<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        let from = self
            .from
            .as_ref()
            .filter(|t| !super::is_blank(t))
            .ok_or_else(|| SqlError::missing("DELETE", "FROM"))?;
        let dialect = self.require_dialect()?;

        let schemas = TableSchema::as_default(self.schema.as_ref());
        let options = ConditionOptions::new().schemas(&schemas);

        Ok([
            self.parts.build_cte(),
            "DELETE".to_string(),
            self.parts.build_flags(),
            clause("FROM", &dialect.names(from, None)?),
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
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_delete() {
        let sql = Dialect::ansi()
            .delete()
            .from("table")
            .where_clause(json!([{"field1": "value1"}, {"field2": {">": 3}}]))
            .order("field1 desc")
            .limit(5, None)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM \"table\" WHERE \"field1\" = 'value1' AND \"field2\" > 3 ORDER BY \"field1\" DESC LIMIT 5"
        );
    }

    #[test]
    fn test_missing_from() {
        let err = Dialect::ansi().delete().to_sql().unwrap_err();
        assert_eq!(err.to_string(), "Invalid `DELETE` statement, missing `FROM` clause.");
    }

    #[test]
    fn test_returning() {
        let sql = Dialect::postgresql()
            .delete()
            .from("table")
            .returning(json!(["id", "name"]))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM \"table\" RETURNING \"id\", \"name\"");
    }
}
