//! `TRUNCATE`.

use serde_json::Value;

use super::{clause, ToSql};
use crate::dialect::{Dialect, TruncateStyle};
use crate::error::{SqlError, SqlResult};

#[derive(Debug, Clone, Default)]
pub struct Truncate<'d> {
    dialect: Option<&'d Dialect>,
    table: Option<Value>,
}

impl<'d> Truncate<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialect(mut self, dialect: &'d Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn table(mut self, table: impl Into<Value>) -> Self {
        self.table = Some(table.into());
        self
    }
}

impl ToSql for Truncate<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        let table = self
            .table
            .as_ref()
            .filter(|t| !super::is_blank(t))
            .ok_or_else(|| SqlError::missing("TRUNCATE", "TABLE"))?;
        let dialect = self.dialect.ok_or(SqlError::MissingDialect)?;
        let names = dialect.names(table, None)?;

        Ok(match dialect.truncate_style() {
            TruncateStyle::Truncate => format!("TRUNCATE{}", clause("TABLE", &names)),
            TruncateStyle::DeleteAndResetSequence => format!(
                "DELETE{};DELETE{} WHERE name={}",
                clause("FROM", &names),
                clause("FROM", &dialect.name("SQLITE_SEQUENCE", None)),
                names
            ),
        })
    }
}
