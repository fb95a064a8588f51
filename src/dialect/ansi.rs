//! Standard SQL: base operators, `"` identifiers and SQL-standard types.

use super::{
    ColumnStyle, DialectKind, DialectSpec, LockMode, Mapping, TruncateStyle, TypeDef,
};

pub(super) fn spec() -> DialectSpec {
    DialectSpec {
        kind: DialectKind::Ansi,
        escape: '"',
        operators: Vec::new(),
        types: vec![
            ("id".into(), TypeDef::new("integer")),
            ("serial".into(), TypeDef::new("integer").serial()),
            ("string".into(), TypeDef::new("varchar").length(255)),
            ("text".into(), TypeDef::new("clob")),
            ("integer".into(), TypeDef::new("integer")),
            ("boolean".into(), TypeDef::new("boolean")),
            ("float".into(), TypeDef::new("real")),
            ("decimal".into(), TypeDef::new("numeric").precision(2)),
            ("date".into(), TypeDef::new("date")),
            ("time".into(), TypeDef::new("time")),
            ("datetime".into(), TypeDef::new("timestamp")),
            ("binary".into(), TypeDef::new("blob")),
        ],
        mappings: [
            ("bigint", "integer"),
            ("blob", "binary"),
            ("boolean", "boolean"),
            ("char", "string"),
            ("clob", "text"),
            ("date", "date"),
            ("double precision", "float"),
            ("integer", "integer"),
            ("numeric", "decimal"),
            ("real", "float"),
            ("smallint", "integer"),
            ("time", "time"),
            ("timestamp", "datetime"),
            ("varchar", "string"),
        ]
        .iter()
        .map(|(native, abstract_type)| Mapping::new(*native, *abstract_type))
        .collect(),
        constraints: super::postgres::standard_constraints(),
        column_meta: Vec::new(),
        table_meta: Vec::new(),
        locks: vec![(LockMode::Update, "FOR UPDATE".into())],
        truncate: TruncateStyle::Truncate,
        column: ColumnStyle {
            serial: "GENERATED BY DEFAULT AS IDENTITY".into(),
            ..ColumnStyle::default()
        },
    }
}
