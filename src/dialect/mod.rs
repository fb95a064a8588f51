//! SQL dialects.
//!
//! A [`Dialect`] owns everything vendor-specific about rendering: the
//! identifier escape character, the operator table, abstract column types
//! and native type mappings, constraint templates, meta-attribute tables
//! and the column/lock/truncate syntax. The four vendor dialects are plain
//! data ([`DialectSpec`]) fed through the same engine, so a custom dialect
//! is built the same way.
//!
//! ```
//! use serde_json::json;
//! use sqltree::dialect::{ConditionOptions, Dialect};
//!
//! let dialect = Dialect::postgresql();
//! let sql = dialect
//!     .conditions(&json!({"age": {">": 18}, "name": "bob"}), &ConditionOptions::new())
//!     .unwrap();
//! assert_eq!(sql, r#""age" > 18 AND "name" = 'bob'"#);
//! ```

mod ansi;
mod conditions;
mod constraint;
mod identifier;
mod mysql;
mod operator;
mod postgres;
mod sqlite;
mod state;
mod types;
mod value;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{SqlError, SqlResult};

pub use conditions::ConditionOptions;
pub use constraint::{Columns, Constraint, ConstraintTemplate, MetaAttr, MetaScope};
pub use identifier::undot;
pub use operator::{Builder, Formatter, Operator};
pub use state::{schema_fn, Aliases, RenderState, Schema, Schemas};
pub use types::{ColumnDef, Field, Mapping, TypeDef, UnmappedPolicy};
pub use value::{Caster, Quoter, SchemaCaster};

/// The vendor a dialect renders for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialectKind {
    #[default]
    Ansi,
    MySql,
    PostgreSql,
    Sqlite,
}

impl DialectKind {
    /// All vendors, in display order.
    pub const ALL: [DialectKind; 4] = [
        DialectKind::Ansi,
        DialectKind::MySql,
        DialectKind::PostgreSql,
        DialectKind::Sqlite,
    ];

    /// The lowercase identifier accepted by [`FromStr`].
    pub fn id(&self) -> &'static str {
        match self {
            DialectKind::Ansi => "ansi",
            DialectKind::MySql => "mysql",
            DialectKind::PostgreSql => "postgresql",
            DialectKind::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialectKind::Ansi => "ANSI",
            DialectKind::MySql => "MySQL",
            DialectKind::PostgreSql => "PostgreSQL",
            DialectKind::Sqlite => "SQLite",
        };
        f.write_str(name)
    }
}

impl FromStr for DialectKind {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ansi" | "sql" => Ok(DialectKind::Ansi),
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "postgresql" | "postgres" | "pg" => Ok(DialectKind::PostgreSql),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            _ => Err(SqlError::UnknownDialect(s.to_string())),
        }
    }
}

/// Row lock requested by `SELECT ... FOR ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    Update,
    Share,
    NoKeyUpdate,
    KeyShare,
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LockMode::Update => "update",
            LockMode::Share => "share",
            LockMode::NoKeyUpdate => "no key update",
            LockMode::KeyShare => "key share",
        })
    }
}

impl FromStr for LockMode {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "update" => Ok(LockMode::Update),
            "share" => Ok(LockMode::Share),
            "no key update" => Ok(LockMode::NoKeyUpdate),
            "key share" => Ok(LockMode::KeyShare),
            other => Err(SqlError::UnsupportedLockMode {
                mode: other.to_string(),
                dialect: "any".to_string(),
            }),
        }
    }
}

/// How `TRUNCATE` is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncateStyle {
    /// `TRUNCATE TABLE t`
    #[default]
    Truncate,
    /// `DELETE FROM t` followed by a reset of the autoincrement sequence.
    DeleteAndResetSequence,
}

/// Column syntax that differs between vendors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStyle {
    /// Emitted after a serial column instead of `NULL`/`DEFAULT`.
    pub serial: String,
    /// Native type used for `float` columns that carry a precision.
    pub exact_numeric: String,
    /// Native types that cannot carry a `DEFAULT` clause.
    pub no_default: Vec<String>,
    /// Column meta keys rendered right after the type.
    pub leading_meta: Vec<String>,
    /// Column meta keys rendered at the end of the definition.
    pub trailing_meta: Vec<String>,
}

impl Default for ColumnStyle {
    fn default() -> Self {
        Self {
            serial: "NOT NULL".into(),
            exact_numeric: "numeric".into(),
            no_default: Vec::new(),
            leading_meta: Vec::new(),
            trailing_meta: Vec::new(),
        }
    }
}

/// Everything that makes a vendor dialect, as data.
#[derive(Debug, Clone, Default)]
pub struct DialectSpec {
    pub kind: DialectKind,
    pub escape: char,
    /// Entries added on top of (or replacing) the base operators.
    pub operators: Vec<(String, Operator)>,
    pub types: Vec<(String, TypeDef)>,
    pub mappings: Vec<Mapping>,
    pub constraints: Vec<(String, ConstraintTemplate)>,
    pub column_meta: Vec<(String, MetaAttr)>,
    pub table_meta: Vec<(String, MetaAttr)>,
    pub locks: Vec<(LockMode, String)>,
    pub truncate: TruncateStyle,
    pub column: ColumnStyle,
}

/// A configured SQL dialect.
#[derive(Clone)]
pub struct Dialect {
    kind: DialectKind,
    escape: char,
    operators: HashMap<String, Operator>,
    types: BTreeMap<String, TypeDef>,
    maps: HashMap<String, Vec<Mapping>>,
    unmapped: UnmappedPolicy,
    constraints: HashMap<String, ConstraintTemplate>,
    column_meta: HashMap<String, MetaAttr>,
    table_meta: HashMap<String, MetaAttr>,
    locks: HashMap<LockMode, String>,
    truncate: TruncateStyle,
    column: ColumnStyle,
    quoter: Option<Arc<dyn Quoter>>,
    caster: Option<Arc<dyn Caster>>,
}

impl Dialect {
    /// Build a dialect from its spec.
    pub fn new(spec: DialectSpec) -> Self {
        let mut dialect = Self {
            kind: spec.kind,
            escape: spec.escape,
            operators: operator::base_operators().into_iter().collect(),
            types: BTreeMap::new(),
            maps: HashMap::new(),
            unmapped: UnmappedPolicy::default(),
            constraints: spec.constraints.into_iter().collect(),
            column_meta: spec.column_meta.into_iter().collect(),
            table_meta: spec.table_meta.into_iter().collect(),
            locks: spec.locks.into_iter().collect(),
            truncate: spec.truncate,
            column: spec.column,
            quoter: None,
            caster: None,
        };
        dialect
            .operators
            .extend(spec.operators.into_iter().map(|(name, op)| (name.to_lowercase(), op)));
        dialect.types.extend(spec.types);
        for mapping in spec.mappings {
            dialect.push_mapping(mapping);
        }
        debug!(
            dialect = %dialect.kind,
            operators = dialect.operators.len(),
            types = dialect.types.len(),
            "Dialect ready"
        );
        dialect
    }

    /// Build the stock dialect for a vendor.
    pub fn for_kind(kind: DialectKind) -> Self {
        match kind {
            DialectKind::Ansi => Self::ansi(),
            DialectKind::MySql => Self::mysql(),
            DialectKind::PostgreSql => Self::postgresql(),
            DialectKind::Sqlite => Self::sqlite(),
        }
    }

    pub fn ansi() -> Self {
        Self::new(ansi::spec())
    }

    pub fn mysql() -> Self {
        Self::new(mysql::spec())
    }

    pub fn postgresql() -> Self {
        Self::new(postgres::spec())
    }

    pub fn sqlite() -> Self {
        Self::new(sqlite::spec())
    }

    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    /// The identifier quote character.
    pub fn escape_char(&self) -> char {
        self.escape
    }

    /// Add or replace an operator.
    pub fn register_operator(&mut self, name: impl Into<String>, operator: Operator) -> &mut Self {
        let name = name.into().to_lowercase();
        debug!(dialect = %self.kind, operator = %name, "Registered operator");
        self.operators.insert(name, operator);
        self
    }

    /// The policy for a registered operator token.
    pub fn operator_policy(&self, name: &str) -> Option<&Operator> {
        self.operators.get(&name.to_lowercase())
    }

    /// Whether `token` is treated as an operator by the condition compiler.
    ///
    /// Any `:`-prefixed token qualifies, registered or not.
    pub fn is_operator(&self, token: &str) -> bool {
        token.starts_with(':') || self.operators.contains_key(&token.to_lowercase())
    }

    /// Replace the string literal quoter.
    pub fn set_quoter<F>(&mut self, quoter: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        debug!(dialect = %self.kind, "Installed custom quoter");
        self.quoter = Some(Arc::new(quoter));
        self
    }

    /// Replace the value caster with a closure.
    pub fn set_caster<F>(&mut self, caster: F) -> &mut Self
    where
        F: Fn(&Dialect, &Value, &RenderState<'_>) -> String + Send + Sync + 'static,
    {
        debug!(dialect = %self.kind, "Installed custom caster");
        self.caster = Some(Arc::new(caster));
        self
    }

    /// Replace the value caster with a shared strategy such as [`SchemaCaster`].
    pub fn set_caster_strategy(&mut self, caster: Arc<dyn Caster>) -> &mut Self {
        debug!(dialect = %self.kind, "Installed caster strategy");
        self.caster = Some(caster);
        self
    }

    /// Go back to the built-in quoter and caster.
    pub fn reset_hooks(&mut self) -> &mut Self {
        self.quoter = None;
        self.caster = None;
        self
    }

    /// What `mapped` does with a native type that has no mapping.
    pub fn set_unmapped_policy(&mut self, policy: UnmappedPolicy) -> &mut Self {
        self.unmapped = policy;
        self
    }

    pub fn unmapped_policy(&self) -> UnmappedPolicy {
        self.unmapped
    }

    /// The `SELECT` suffix for a lock mode.
    pub fn lock_clause(&self, mode: LockMode) -> SqlResult<&str> {
        self.locks
            .get(&mode)
            .map(String::as_str)
            .ok_or_else(|| SqlError::UnsupportedLockMode {
                mode: mode.to_string(),
                dialect: self.kind.to_string(),
            })
    }

    pub fn truncate_style(&self) -> TruncateStyle {
        self.truncate
    }

    pub fn column_style(&self) -> &ColumnStyle {
        &self.column
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::ansi()
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("kind", &self.kind)
            .field("escape", &self.escape)
            .field("operators", &self.operators.len())
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("quoter", &self.quoter.is_some())
            .field("caster", &self.caster.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_kind_from_str() {
        assert_eq!("MySQL".parse::<DialectKind>().unwrap(), DialectKind::MySql);
        assert_eq!("postgres".parse::<DialectKind>().unwrap(), DialectKind::PostgreSql);
        assert_eq!("sqlite3".parse::<DialectKind>().unwrap(), DialectKind::Sqlite);
        assert!(matches!(
            "oracle".parse::<DialectKind>(),
            Err(SqlError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_for_kind() {
        for kind in DialectKind::ALL {
            assert_eq!(Dialect::for_kind(kind).kind(), kind);
        }
        assert_eq!(Dialect::mysql().escape_char(), '`');
        assert_eq!(Dialect::sqlite().escape_char(), '"');
    }

    #[test]
    fn test_lock_clause() {
        let mysql = Dialect::mysql();
        assert_eq!(mysql.lock_clause(LockMode::Share).unwrap(), "LOCK IN SHARE MODE");
        let err = mysql.lock_clause(LockMode::KeyShare).unwrap_err();
        assert_eq!(err.to_string(), "Invalid MySQL lock mode `'key share'`.");
        assert!(Dialect::sqlite().lock_clause(LockMode::Update).is_err());
    }

    #[test]
    fn test_is_operator() {
        let dialect = Dialect::ansi();
        assert!(dialect.is_operator("="));
        assert!(dialect.is_operator(":anything"));
        assert!(dialect.is_operator(":AND"));
        assert!(!dialect.is_operator("name"));
    }
}
