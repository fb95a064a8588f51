//! MySQL.

use serde_json::json;

use super::{
    Builder, ColumnStyle, ConstraintTemplate, DialectKind, DialectSpec, LockMode, Mapping,
    MetaAttr, Operator, TruncateStyle, TypeDef,
};

pub(super) fn spec() -> DialectSpec {
    DialectSpec {
        kind: DialectKind::MySql,
        escape: '`',
        operators: vec![
            ("#".into(), Operator::with_format("%s ^ %s")),
            (":regexp".into(), Operator::with_format("%s REGEXP %s")),
            (":union".into(), Operator::with_builder(Builder::Set)),
            (":union all".into(), Operator::with_builder(Builder::Set)),
            (":minus".into(), Operator::with_builder(Builder::Set)),
            (":except".into(), Operator::with_builder(Builder::Set)),
        ],
        types: vec![
            ("id".into(), TypeDef::new("int")),
            ("serial".into(), TypeDef::new("int").serial()),
            ("string".into(), TypeDef::new("varchar").length(255)),
            ("text".into(), TypeDef::new("text")),
            ("integer".into(), TypeDef::new("int")),
            ("boolean".into(), TypeDef::new("boolean")),
            ("float".into(), TypeDef::new("float")),
            ("decimal".into(), TypeDef::new("decimal").precision(2)),
            ("date".into(), TypeDef::new("date")),
            ("time".into(), TypeDef::new("time")),
            ("datetime".into(), TypeDef::new("datetime")),
            ("binary".into(), TypeDef::new("blob")),
        ],
        mappings: mappings(),
        constraints: vec![
            ("primary".into(), ConstraintTemplate::new("PRIMARY KEY (${column})")),
            (
                "foreign key".into(),
                ConstraintTemplate::new(
                    "FOREIGN KEY (${foreignKey}) REFERENCES ${to} (${primaryKey}) ${on}",
                ),
            ),
            ("index".into(), ConstraintTemplate::new("INDEX ${name} (${column})")),
            (
                "unique".into(),
                ConstraintTemplate::new("UNIQUE ${index} ${name} (${column})")
                    .with_index_keywords("KEY", "INDEX"),
            ),
            ("check".into(), ConstraintTemplate::new("${constraint} CHECK (${expr})")),
        ],
        column_meta: vec![
            ("charset".into(), MetaAttr::new("CHARACTER SET")),
            ("collate".into(), MetaAttr::new("COLLATE")),
            ("comment".into(), MetaAttr::new("COMMENT").escaped()),
        ],
        table_meta: vec![
            ("charset".into(), MetaAttr::new("DEFAULT CHARSET")),
            ("collate".into(), MetaAttr::new("COLLATE")),
            ("engine".into(), MetaAttr::new("ENGINE")),
            ("tablespace".into(), MetaAttr::new("TABLESPACE")),
        ],
        locks: vec![
            (LockMode::Update, "FOR UPDATE".into()),
            (LockMode::Share, "LOCK IN SHARE MODE".into()),
        ],
        truncate: TruncateStyle::Truncate,
        column: ColumnStyle {
            serial: "NOT NULL AUTO_INCREMENT".into(),
            exact_numeric: "decimal".into(),
            no_default: ["text", "blob", "geometry", "json"].map(String::from).to_vec(),
            leading_meta: vec!["charset".into(), "collate".into()],
            trailing_meta: vec!["comment".into()],
        },
    }
}

fn mappings() -> Vec<Mapping> {
    let plain = [
        ("bigint", "integer"),
        ("bit", "string"),
        ("blob", "string"),
        ("char", "string"),
        ("date", "date"),
        ("datetime", "datetime"),
        ("decimal", "decimal"),
        ("double", "float"),
        ("float", "float"),
        ("geometry", "string"),
        ("geometrycollection", "string"),
        ("int", "integer"),
        ("linestring", "string"),
        ("longblob", "string"),
        ("longtext", "string"),
        ("mediumblob", "string"),
        ("mediumint", "integer"),
        ("mediumtext", "string"),
        ("multilinestring", "string"),
        ("multipolygon", "string"),
        ("multipoint", "string"),
        ("point", "string"),
        ("polygon", "string"),
        ("smallint", "integer"),
        ("text", "string"),
        ("time", "string"),
        ("timestamp", "datetime"),
        ("tinyblob", "string"),
    ];
    let mut out: Vec<Mapping> = plain
        .iter()
        .map(|(native, abstract_type)| Mapping::new(*native, *abstract_type))
        .collect();
    out.push(Mapping::new("tinyint", "boolean").with("length", json!(1)));
    out.push(Mapping::new("tinyint", "integer"));
    out.extend(
        [("tinytext", "string"), ("varchar", "string"), ("year", "string")]
            .iter()
            .map(|(native, abstract_type)| Mapping::new(*native, *abstract_type)),
    );
    out
}
