//! # sqltree
//!
//! Render nested, data-only condition trees into dialect-correct SQL.
//!
//! A condition tree is plain JSON: maps of `field → value`, operator tokens
//! such as `">"` or `":in"`, and the formatters `:name`, `:value` and
//! `:plain`. A [`Dialect`](dialect::Dialect) turns it into SQL text for
//! ANSI, MySQL, PostgreSQL or SQLite.
//!
//! ## Quick Example
//!
//! ```
//! use serde_json::json;
//! use sqltree::prelude::*;
//!
//! let dialect = Dialect::mysql();
//! let sql = dialect
//!     .conditions(
//!         &json!({"age": {">": 18}, "name": {":like": "A%"}}),
//!         &ConditionOptions::new(),
//!     )
//!     .unwrap();
//! assert_eq!(sql, "`age` > 18 AND `name` LIKE 'A%'");
//! ```
//!
//! ## Formatters
//!
//! | Token    | Renders                        |
//! |----------|--------------------------------|
//! | `:name`  | an escaped identifier          |
//! | `:value` | a literal, through the caster  |
//! | `:plain` | the payload verbatim           |

pub mod config;
pub mod dialect;
pub mod error;
pub mod parser;
pub mod statement;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::dialect::{
        ColumnDef, ConditionOptions, Constraint, Dialect, DialectKind, LockMode, MetaScope,
        RenderState, UnmappedPolicy,
    };
    pub use crate::error::{SqlError, SqlResult};
    pub use crate::statement::ToSql;
}
