//! SQLite.

use serde_json::json;

use super::{
    Builder, ColumnStyle, ConstraintTemplate, DialectKind, DialectSpec, Mapping, MetaAttr,
    Operator, TruncateStyle, TypeDef,
};

pub(super) fn spec() -> DialectSpec {
    DialectSpec {
        kind: DialectKind::Sqlite,
        escape: '"',
        operators: [":union", ":union all", ":except"]
            .iter()
            .map(|op| (op.to_string(), Operator::with_builder(Builder::Set)))
            .collect(),
        types: vec![
            ("id".into(), TypeDef::new("integer")),
            ("serial".into(), TypeDef::new("integer").serial()),
            ("string".into(), TypeDef::new("varchar").length(255)),
            ("text".into(), TypeDef::new("text")),
            ("integer".into(), TypeDef::new("integer")),
            ("boolean".into(), TypeDef::new("boolean")),
            ("float".into(), TypeDef::new("real")),
            ("decimal".into(), TypeDef::new("decimal").precision(2)),
            ("date".into(), TypeDef::new("date")),
            ("time".into(), TypeDef::new("time")),
            ("datetime".into(), TypeDef::new("timestamp")),
            ("binary".into(), TypeDef::new("blob")),
        ],
        mappings: vec![
            Mapping::new("boolean", "boolean"),
            Mapping::new("blob", "binary"),
            Mapping::new("date", "date"),
            Mapping::new("integer", "integer"),
            Mapping::new("decimal", "decimal").with("precision", json!(2)),
            Mapping::new("real", "float"),
            Mapping::new("text", "text"),
            Mapping::new("time", "time"),
            Mapping::new("timestamp", "datetime"),
            Mapping::new("varchar", "string"),
        ],
        constraints: super::postgres::standard_constraints(),
        column_meta: vec![("collate".into(), MetaAttr::new("COLLATE").escaped())],
        table_meta: Vec::new(),
        locks: Vec::new(),
        truncate: TruncateStyle::DeleteAndResetSequence,
        column: ColumnStyle {
            leading_meta: vec!["collate".into()],
            ..ColumnStyle::default()
        },
    }
}
