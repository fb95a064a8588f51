//! `DROP TABLE`.

use serde_json::Value;

use super::{chunk, flag, ToSql};
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};

#[derive(Debug, Clone, Default)]
pub struct DropTable<'d> {
    dialect: Option<&'d Dialect>,
    if_exists: bool,
    tables: Vec<Value>,
    cascade: bool,
    restrict: bool,
}

impl<'d> DropTable<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialect(mut self, dialect: &'d Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }

    /// Replace the list of tables to drop.
    pub fn table(mut self, tables: impl Into<Value>) -> Self {
        self.tables = match tables.into() {
            Value::Array(items) => items,
            other => vec![other],
        };
        self
    }

    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn restrict(mut self, restrict: bool) -> Self {
        self.restrict = restrict;
        self
    }
}

impl ToSql for DropTable<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        let dialect = self.dialect.ok_or(SqlError::MissingDialect)?;
        let names = dialect.names(&Value::Array(self.tables.clone()), None)?;
        if names.is_empty() {
            return Err(SqlError::missing("DROP TABLE", "TABLE"));
        }
        Ok([
            "DROP TABLE".to_string(),
            flag("IF EXISTS", self.if_exists),
            chunk(&names),
            flag("CASCADE", self.cascade),
            flag("RESTRICT", self.restrict),
        ]
        .concat())
    }
}
