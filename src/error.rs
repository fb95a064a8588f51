//! Error types for sqltree.

use thiserror::Error;

/// The main error type for sqltree operations.
///
/// Every error is raised before any SQL text is produced: a render call
/// either returns the complete statement or one of these.
#[derive(Debug, Error)]
pub enum SqlError {
    /// The statement factory was asked for a statement it doesn't know.
    #[error("Unsupported statement `'{0}'`.")]
    UnsupportedStatement(String),

    /// A statement builder was rendered without a dialect attached.
    #[error("Missing SQL dialect adapter.")]
    MissingDialect,

    /// A field descriptor without a `name`.
    #[error("Missing column name.")]
    MissingColumnName,

    /// An abstract column type that isn't registered on the dialect.
    #[error("Column type `'{0}'` does not exist.")]
    UnknownColumnType(String),

    /// An operator token that is neither registered nor a function call.
    #[error("Unexisting operator `'{0}'`.")]
    UnknownOperator(String),

    /// A formatter token other than `:name`, `:value` or `:plain`.
    #[error("Unexisting formatter `'{0}'`.")]
    UnknownFormatter(String),

    /// No constraint template registered under that name.
    #[error("Invalid constraint template `'{0}'`.")]
    InvalidConstraintTemplate(String),

    /// A table constraint descriptor without a `type`.
    #[error("Missing constraint type.")]
    MissingConstraintType,

    /// A statement is missing a clause it cannot be rendered without.
    #[error("Invalid `{statement}` statement, missing `{clause}` clause.")]
    MissingRequiredClause {
        statement: &'static str,
        clause: &'static str,
    },

    /// The same common table expression name was registered twice.
    #[error("Common table expression {0} specified more than once")]
    DuplicateNamedSubquery(String),

    /// A native type with no registered mapping, under the strict policy.
    #[error("Native column type `'{0}'` has no abstract type mapping.")]
    UnmappedType(String),

    /// A row lock mode the dialect has no syntax for.
    #[error("Invalid {dialect} lock mode `'{mode}'`.")]
    UnsupportedLockMode { mode: String, dialect: String },

    /// A dialect name that doesn't match any vendor.
    #[error("Unknown dialect: '{0}'. Expected: ansi, mysql, postgresql or sqlite")]
    UnknownDialect(String),

    /// A field or constraint descriptor that doesn't have the expected shape.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// A constraint template that can't be parsed.
    #[error("Template error at position {position}: {message}")]
    Template { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlError {
    /// Create a missing clause error.
    pub fn missing(statement: &'static str, clause: &'static str) -> Self {
        Self::MissingRequiredClause { statement, clause }
    }

    /// Create a template parse error at the given position.
    pub fn template(position: usize, message: impl Into<String>) -> Self {
        Self::Template {
            position,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SqlError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDescriptor(err.to_string())
    }
}

/// Result type alias for sqltree operations.
pub type SqlResult<T> = Result<T, SqlError>;
