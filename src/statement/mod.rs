//! Statement builders.
//!
//! Each builder collects clauses and renders them through a [`Dialect`]:
//!
//! ```
//! use serde_json::json;
//! use sqltree::prelude::*;
//!
//! let dialect = Dialect::postgresql();
//! let sql = dialect
//!     .select()
//!     .fields(json!(["id", "name"]))
//!     .from("users")
//!     .where_clause(json!({"active": true}))
//!     .order("name desc")
//!     .limit(10, None)
//!     .to_sql()
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     r#"SELECT "id", "name" FROM "users" WHERE "active" = TRUE ORDER BY "name" DESC LIMIT 10"#
//! );
//! ```

mod create_table;
mod delete;
mod drop_table;
mod insert;
mod select;
mod truncate;
mod update;

pub mod flags;

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::dialect::{Aliases, Dialect, Formatter, RenderState, Schema, Schemas};
use crate::error::{SqlError, SqlResult};
use crate::parser::parse_order;

pub use create_table::CreateTable;
pub use delete::Delete;
pub use drop_table::DropTable;
pub use insert::Insert;
pub use select::{Join, Select};
pub use truncate::Truncate;
pub use update::Update;

/// Render a builder to SQL text.
pub trait ToSql {
    fn to_sql(&self) -> SqlResult<String>;

    /// Wrap the rendered SQL so it can be embedded in a condition tree.
    fn to_plain(&self) -> SqlResult<Value> {
        Ok(json!({ ":plain": self.to_sql()? }))
    }
}

/// Any statement the factory can build.
#[derive(Debug, Clone)]
pub enum Statement<'d> {
    Select(Select<'d>),
    Insert(Insert<'d>),
    Update(Update<'d>),
    Delete(Delete<'d>),
    Truncate(Truncate<'d>),
    CreateTable(CreateTable<'d>),
    DropTable(DropTable<'d>),
}

impl Statement<'_> {
    /// The factory name of this statement.
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Select(_) => "select",
            Statement::Insert(_) => "insert",
            Statement::Update(_) => "update",
            Statement::Delete(_) => "delete",
            Statement::Truncate(_) => "truncate",
            Statement::CreateTable(_) => "create table",
            Statement::DropTable(_) => "drop table",
        }
    }
}

impl ToSql for Statement<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        match self {
            Statement::Select(s) => s.to_sql(),
            Statement::Insert(s) => s.to_sql(),
            Statement::Update(s) => s.to_sql(),
            Statement::Delete(s) => s.to_sql(),
            Statement::Truncate(s) => s.to_sql(),
            Statement::CreateTable(s) => s.to_sql(),
            Statement::DropTable(s) => s.to_sql(),
        }
    }
}

impl Dialect {
    /// Build a statement by name.
    pub fn statement(&self, name: &str) -> SqlResult<Statement<'_>> {
        let statement = match name.trim().to_lowercase().as_str() {
            "select" => Statement::Select(self.select()),
            "insert" => Statement::Insert(self.insert()),
            "update" => Statement::Update(self.update()),
            "delete" => Statement::Delete(self.delete()),
            "truncate" => Statement::Truncate(self.truncate()),
            "create table" => Statement::CreateTable(self.create_table()),
            "drop table" => Statement::DropTable(self.drop_table()),
            _ => return Err(SqlError::UnsupportedStatement(name.to_string())),
        };
        Ok(statement)
    }

    pub fn select(&self) -> Select<'_> {
        Select::new().dialect(self)
    }

    pub fn insert(&self) -> Insert<'_> {
        Insert::new().dialect(self)
    }

    pub fn update(&self) -> Update<'_> {
        Update::new().dialect(self)
    }

    pub fn delete(&self) -> Delete<'_> {
        Delete::new().dialect(self)
    }

    pub fn truncate(&self) -> Truncate<'_> {
        Truncate::new().dialect(self)
    }

    pub fn create_table(&self) -> CreateTable<'_> {
        CreateTable::new().dialect(self)
    }

    pub fn drop_table(&self) -> DropTable<'_> {
        DropTable::new().dialect(self)
    }
}

/// Clauses shared by the DML builders.
#[derive(Debug, Clone, Default)]
pub(crate) struct Parts {
    pub flags: Vec<(String, bool)>,
    pub where_: Vec<Value>,
    pub with: Vec<(String, String)>,
    pub order: Vec<(String, String)>,
    pub limit: Option<String>,
    pub returning: Vec<Value>,
}

impl Parts {
    pub fn set_flag(&mut self, flag: &str, enable: bool) {
        match self.flags.iter_mut().find(|(name, _)| name == flag) {
            Some(entry) => entry.1 = enable,
            None => self.flags.push((flag.to_string(), enable)),
        }
    }

    pub fn flag(&self, flag: &str) -> Option<bool> {
        self.flags
            .iter()
            .find(|(name, _)| name == flag)
            .map(|(_, enabled)| *enabled)
    }

    pub fn add_where(&mut self, tree: Value) {
        if !is_blank(&tree) {
            self.where_.push(tree);
        }
    }

    pub fn add_with(&mut self, name: &str, sql: String) -> SqlResult<()> {
        if self.with.iter().any(|(existing, _)| existing == name) {
            return Err(SqlError::DuplicateNamedSubquery(name.to_string()));
        }
        self.with.push((name.to_string(), sql));
        Ok(())
    }

    /// Add `ORDER BY` terms: `"field dir"` strings, `{field: dir}` maps, or
    /// arrays of either. Re-ordering a field keeps its position.
    pub fn add_order(&mut self, terms: &Value) {
        match terms {
            Value::Array(items) => items.iter().for_each(|item| self.add_order(item)),
            Value::Object(map) => {
                for (field, dir) in map {
                    let dir = dir.as_str().unwrap_or("ASC");
                    self.set_order(field, dir);
                }
            }
            Value::String(term) if !term.trim().is_empty() => {
                let (field, dir) = parse_order(term);
                self.set_order(&field, dir.as_deref().unwrap_or("ASC"));
            }
            _ => {}
        }
    }

    fn set_order(&mut self, field: &str, dir: &str) {
        let dir = dir.to_uppercase();
        match self.order.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = dir,
            None => self.order.push((field.to_string(), dir)),
        }
    }

    pub fn set_limit(&mut self, limit: u64, offset: Option<u64>) {
        if limit == 0 {
            return;
        }
        self.limit = Some(match offset {
            Some(offset) if offset > 0 => format!("{} OFFSET {}", limit, offset),
            _ => limit.to_string(),
        });
    }

    pub fn add_returning(&mut self, fields: Value) {
        if !is_blank(&fields) {
            self.returning.push(fields);
        }
    }

    pub fn build_flags(&self) -> String {
        let enabled: Vec<&str> = self
            .flags
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| name.as_str())
            .collect();
        if enabled.is_empty() {
            String::new()
        } else {
            format!(" {}", enabled.join(" "))
        }
    }

    pub fn build_cte(&self) -> String {
        if self.with.is_empty() {
            return String::new();
        }
        let queries: Vec<String> = self
            .with
            .iter()
            .map(|(name, sql)| format!("{} AS ({})", name, sql))
            .collect();
        format!("WITH {} ", queries.join(", "))
    }

    pub fn build_order(&self, dialect: &Dialect, aliases: Option<&Aliases>) -> String {
        let terms: Vec<String> = self
            .order
            .iter()
            .map(|(field, dir)| format!("{} {}", dialect.name(field, aliases), dir))
            .collect();
        clause("ORDER BY", &terms.join(", "))
    }

    pub fn build_limit(&self) -> String {
        clause("LIMIT", self.limit.as_deref().unwrap_or_default())
    }

    pub fn build_returning(&self, dialect: &Dialect) -> SqlResult<String> {
        let fields = dialect.names(&Value::Array(self.returning.clone()), None)?;
        Ok(clause("RETURNING", &fields))
    }
}

/// Cast function attached to a DML builder for its table's columns.
#[derive(Clone)]
pub(crate) struct TableSchema(pub Arc<dyn Schema>);

impl TableSchema {
    /// The schema map used for `WHERE` rendering: the table is the `''` prefix.
    pub fn as_default(schema: Option<&TableSchema>) -> Schemas {
        schema
            .map(|s| (String::new(), s.0.clone()))
            .into_iter()
            .collect()
    }
}

impl fmt::Debug for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TableSchema")
    }
}

/// ` CLAUSE expr`, or nothing for an empty expression.
pub(crate) fn clause(name: &str, expr: &str) -> String {
    if expr.is_empty() {
        String::new()
    } else {
        format!(" {} {}", name, expr)
    }
}

pub(crate) fn flag(name: &str, enabled: bool) -> String {
    if enabled {
        format!(" {}", name)
    } else {
        String::new()
    }
}

pub(crate) fn chunk(sql: &str) -> String {
    if sql.is_empty() {
        String::new()
    } else {
        format!(" {}", sql)
    }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Render a column value: a single-entry formatter map is formatted,
/// anything else goes through the caster.
pub(crate) fn column_value(
    dialect: &Dialect,
    value: &Value,
    state: &mut RenderState<'_>,
) -> SqlResult<String> {
    if let Value::Object(map) = value {
        if let (1, Some((token, payload))) = (map.len(), map.iter().next()) {
            if Formatter::from_token(token).is_some() {
                return dialect.format(token, payload, state);
            }
        }
    }
    Ok(dialect.value(value, state))
}

/// Builder methods shared by the DML statements.
macro_rules! shared_clauses {
    ($builder:ident) => {
        impl<'d> $builder<'d> {
            /// Attach the dialect used for rendering.
            pub fn dialect(mut self, dialect: &'d $crate::dialect::Dialect) -> Self {
                self.dialect = Some(dialect);
                self
            }

            /// Enable or disable a vendor flag, e.g. `SQL_CALC_FOUND_ROWS`.
            pub fn flag(mut self, flag: &str, enable: bool) -> Self {
                self.parts.set_flag(flag, enable);
                self
            }

            pub fn get_flag(&self, flag: &str) -> Option<bool> {
                self.parts.flag(flag)
            }

            /// Add a common table expression rendered from `query`.
            pub fn with(
                mut self,
                name: &str,
                query: &impl $crate::statement::ToSql,
            ) -> $crate::error::SqlResult<Self> {
                let sql = query.to_sql()?;
                self.parts.add_with(name, sql)?;
                Ok(self)
            }

            fn require_dialect(&self) -> $crate::error::SqlResult<&'d $crate::dialect::Dialect> {
                self.dialect.ok_or($crate::error::SqlError::MissingDialect)
            }
        }
    };
    ($builder:ident, filtered) => {
        $crate::statement::shared_clauses!($builder);

        impl<'d> $builder<'d> {
            /// Add conditions, ANDed with any already set.
            pub fn where_clause(mut self, tree: impl Into<serde_json::Value>) -> Self {
                self.parts.add_where(tree.into());
                self
            }

            pub fn order(mut self, terms: impl Into<serde_json::Value>) -> Self {
                self.parts.add_order(&terms.into());
                self
            }

            /// `LIMIT n [OFFSET m]`; a zero limit is ignored.
            pub fn limit(mut self, limit: u64, offset: Option<u64>) -> Self {
                self.parts.set_limit(limit, offset);
                self
            }
        }
    };
}

pub(crate) use shared_clauses;
