//! `SELECT`.

use serde_json::Value;

use super::{chunk, clause, flag, is_blank, shared_clauses, Parts, ToSql};
use crate::dialect::{Aliases, ConditionOptions, Dialect, LockMode, Schemas};
use crate::error::{SqlError, SqlResult};

/// One `JOIN` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// A name list entry: a table, `{table: alias}`, or a plain subquery.
    pub table: Value,
    pub on: Vec<Value>,
    /// `LEFT`, `RIGHT`, `INNER`...
    pub kind: String,
}

#[derive(Debug, Clone, Default)]
pub struct Select<'d> {
    dialect: Option<&'d Dialect>,
    parts: Parts,
    fields: Vec<Value>,
    from: Vec<Value>,
    joins: Vec<Join>,
    group: Vec<String>,
    having: Vec<Value>,
    lock: Option<LockMode>,
    no_wait: bool,
    alias: Option<String>,
    blank_from: bool,
}

shared_clauses!(Select, filtered);

impl<'d> Select<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct(self, enable: bool) -> Self {
        self.flag("DISTINCT", enable)
    }

    /// Add selected fields: names, `{field: alias}` maps or expressions.
    pub fn fields(mut self, fields: impl Into<Value>) -> Self {
        push_flat(&mut self.fields, fields.into());
        self
    }

    /// Add tables; an empty table list fails at render time.
    pub fn from(mut self, tables: impl Into<Value>) -> Self {
        let tables = tables.into();
        if is_blank(&tables) {
            self.blank_from = true;
        }
        push_flat(&mut self.from, tables);
        self
    }

    /// `LEFT JOIN table ON ...`.
    pub fn join(self, table: impl Into<Value>, on: impl Into<Value>) -> Self {
        self.join_as(table, on, "LEFT")
    }

    /// A join of an explicit kind, e.g. `"inner"`.
    pub fn join_as(mut self, table: impl Into<Value>, on: impl Into<Value>, kind: &str) -> Self {
        let table = table.into();
        if is_blank(&table) {
            return self;
        }
        let on = match on.into() {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        self.joins.push(Join {
            table,
            on,
            kind: kind.to_uppercase(),
        });
        self
    }

    pub fn group(mut self, fields: impl Into<Value>) -> Self {
        let mut names = Vec::new();
        push_flat(&mut names, fields.into());
        for name in names {
            if let Value::String(name) = name {
                if !name.is_empty() && !self.group.contains(&name) {
                    self.group.push(name);
                }
            }
        }
        self
    }

    pub fn having(mut self, tree: impl Into<Value>) -> Self {
        let tree = tree.into();
        if !is_blank(&tree) {
            self.having.push(tree);
        }
        self
    }

    /// Row lock; validated against the dialect at render time.
    pub fn lock(mut self, mode: LockMode) -> Self {
        self.lock = Some(mode);
        self
    }

    pub fn unlock(mut self) -> Self {
        self.lock = None;
        self
    }

    pub fn no_wait(mut self, no_wait: bool) -> Self {
        self.no_wait = no_wait;
        self
    }

    /// Render as `(SELECT ...) AS alias`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn get_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Render with alias and schema maps for the conditions.
    pub fn to_sql_with(&self, aliases: Option<&Aliases>, schemas: Option<&Schemas>) -> SqlResult<String> {
        if self.blank_from {
            return Err(SqlError::missing("SELECT", "FROM"));
        }
        let dialect = self.require_dialect()?;
        let options = ConditionOptions::new()
            .aliases_opt(aliases)
            .schemas_opt(schemas);

        let fields = dialect.names(&Value::Array(self.fields.clone()), None)?;
        let from = dialect.names(&Value::Array(self.from.clone()), None)?;
        let group: Vec<String> = self.group.iter().map(|name| dialect.name(name, None)).collect();

        let mut sql = self.parts.build_cte();
        sql.push_str("SELECT");
        sql.push_str(&self.parts.build_flags());
        sql.push_str(&chunk(if fields.is_empty() { "*" } else { &fields }));
        sql.push_str(&clause("FROM", &from));
        sql.push_str(&self.build_joins(dialect, &options)?);
        sql.push_str(&clause(
            "WHERE",
            &dialect.conditions(&Value::Array(self.parts.where_.clone()), &options)?,
        ));
        sql.push_str(&clause("GROUP BY", &group.join(", ")));
        sql.push_str(&clause(
            "HAVING",
            &dialect.conditions(&Value::Array(self.having.clone()), &options)?,
        ));
        sql.push_str(&self.parts.build_order(dialect, aliases));
        sql.push_str(&self.parts.build_limit());
        if let Some(mode) = self.lock {
            sql.push_str(&chunk(dialect.lock_clause(mode)?));
            sql.push_str(&flag("NOWAIT", self.no_wait));
        }

        Ok(match &self.alias {
            Some(alias) => format!("({}) AS {}", sql, dialect.name(alias, None)),
            None => sql,
        })
    }

    fn build_joins(&self, dialect: &Dialect, options: &ConditionOptions<'_>) -> SqlResult<String> {
        let mut joins = Vec::with_capacity(self.joins.len());
        for join in &self.joins {
            let mut parts = vec![
                format!("{} JOIN", join.kind),
                dialect.names(&join.table, None)?,
            ];
            if !join.on.is_empty() {
                parts.push("ON".to_string());
                parts.push(dialect.conditions(&Value::Array(join.on.clone()), options)?);
            }
            joins.push(parts.join(" "));
        }
        Ok(chunk(&joins.join(" ")))
    }
}

impl ToSql for Select<'_> {
    fn to_sql(&self) -> SqlResult<String> {
        self.to_sql_with(None, None)
    }
}

fn push_flat(target: &mut Vec<Value>, value: Value) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|item| push_flat(target, item)),
        other if is_blank(&other) => {}
        other => target.push(other),
    }
}
