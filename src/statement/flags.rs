//! Vendor statement flags, for use with the builders' `flag` method.

/// MySQL `SELECT`/`INSERT`/`UPDATE`/`DELETE` modifiers.
pub mod mysql {
    pub const SQL_CALC_FOUND_ROWS: &str = "SQL_CALC_FOUND_ROWS";
    pub const SQL_CACHE: &str = "SQL_CACHE";
    pub const SQL_NO_CACHE: &str = "SQL_NO_CACHE";
    pub const STRAIGHT_JOIN: &str = "STRAIGHT_JOIN";
    pub const HIGH_PRIORITY: &str = "HIGH_PRIORITY";
    pub const SQL_SMALL_RESULT: &str = "SQL_SMALL_RESULT";
    pub const SQL_BIG_RESULT: &str = "SQL_BIG_RESULT";
    pub const SQL_BUFFER_RESULT: &str = "SQL_BUFFER_RESULT";
    pub const LOW_PRIORITY: &str = "LOW_PRIORITY";
    pub const IGNORE: &str = "IGNORE";
    pub const QUICK: &str = "QUICK";
    pub const DELAYED: &str = "DELAYED";
}

/// SQLite conflict clauses for `INSERT` and `UPDATE`.
pub mod sqlite {
    pub const OR_ABORT: &str = "OR ABORT";
    pub const OR_FAIL: &str = "OR FAIL";
    pub const OR_IGNORE: &str = "OR IGNORE";
    pub const OR_REPLACE: &str = "OR REPLACE";
    pub const OR_ROLLBACK: &str = "OR ROLLBACK";
}
