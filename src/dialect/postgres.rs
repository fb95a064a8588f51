//! PostgreSQL.

use super::{
    Builder, ColumnStyle, ConstraintTemplate, DialectKind, DialectSpec, LockMode, Mapping,
    MetaAttr, Operator, TruncateStyle, TypeDef,
};

pub(super) fn spec() -> DialectSpec {
    let formats = [
        (":regexp", "%s ~ %s"),
        (":regexi", "%s ~* %s"),
        (":not regexp", "%s !~ %s"),
        (":not regexi", "%s !~* %s"),
        (":square root", "|/ %s"),
        (":cube root", "||/ %s"),
        (":fact", "!! %s"),
        ("|/", "|/ %s"),
        ("||/", "||/ %s"),
        ("!!", "!! %s"),
        (":concat", "%s || %s"),
        (":pow", "%s ^ %s"),
        ("@", "@ %s"),
    ];
    let sets = [
        ":union",
        ":union all",
        ":except",
        ":except all",
        ":intersect",
        ":intersect all",
    ];
    let mut operators: Vec<(String, Operator)> = formats
        .iter()
        .map(|(op, format)| (op.to_string(), Operator::with_format(*format)))
        .collect();
    operators.extend(
        sets.iter()
            .map(|op| (op.to_string(), Operator::with_builder(Builder::Set))),
    );

    DialectSpec {
        kind: DialectKind::PostgreSql,
        escape: '"',
        operators,
        types: vec![
            ("id".into(), TypeDef::new("integer")),
            ("serial".into(), TypeDef::new("serial").serial()),
            ("string".into(), TypeDef::new("varchar").length(255)),
            ("text".into(), TypeDef::new("text")),
            ("integer".into(), TypeDef::new("integer")),
            ("boolean".into(), TypeDef::new("boolean")),
            ("float".into(), TypeDef::new("real")),
            ("decimal".into(), TypeDef::new("numeric").precision(2)),
            ("date".into(), TypeDef::new("date")),
            ("time".into(), TypeDef::new("time")),
            ("datetime".into(), TypeDef::new("timestamp")),
            ("binary".into(), TypeDef::new("bytea")),
        ],
        mappings: mappings(),
        constraints: standard_constraints(),
        column_meta: Vec::new(),
        table_meta: vec![("tablespace".into(), MetaAttr::new("TABLESPACE"))],
        locks: vec![
            (LockMode::Update, "FOR UPDATE".into()),
            (LockMode::Share, "FOR SHARE".into()),
            (LockMode::NoKeyUpdate, "FOR NO KEY UPDATE".into()),
            (LockMode::KeyShare, "FOR KEY SHARE".into()),
        ],
        truncate: TruncateStyle::Truncate,
        column: ColumnStyle {
            trailing_meta: vec!["comment".into()],
            ..ColumnStyle::default()
        },
    }
}

/// Templates shared by the dialects that name unique constraints.
pub(super) fn standard_constraints() -> Vec<(String, ConstraintTemplate)> {
    vec![
        ("primary".into(), ConstraintTemplate::new("PRIMARY KEY (${column})")),
        (
            "foreign key".into(),
            ConstraintTemplate::new(
                "FOREIGN KEY (${foreignKey}) REFERENCES ${to} (${primaryKey}) ${on}",
            ),
        ),
        (
            "unique".into(),
            ConstraintTemplate::new("CONSTRAINT ${name} UNIQUE ${index} (${column})"),
        ),
        ("check".into(), ConstraintTemplate::new("${constraint} CHECK (${expr})")),
    ]
}

fn mappings() -> Vec<Mapping> {
    [
        ("bit", "string"),
        ("bool", "boolean"),
        ("boolean", "boolean"),
        ("box", "string"),
        ("bytea", "binary"),
        ("char", "string"),
        ("character", "string"),
        ("character varying", "string"),
        ("cidr", "string"),
        ("circle", "string"),
        ("date", "date"),
        ("decimal", "string"),
        ("float4", "float"),
        ("float8", "float"),
        ("inet", "string"),
        ("int2", "integer"),
        ("int4", "integer"),
        ("int8", "integer"),
        ("integer", "integer"),
        ("json", "string"),
        ("lseg", "string"),
        ("line", "string"),
        ("macaddr", "string"),
        ("numeric", "decimal"),
        ("path", "string"),
        ("polygon", "string"),
        ("real", "float"),
        ("serial", "serial"),
        ("string", "string"),
        ("text", "string"),
        ("time", "time"),
        ("time with time zone", "time"),
        ("time without time zone", "time"),
        ("timestamp", "datetime"),
        ("timestamp with time zone", "datetime"),
        ("timestamp without time zone", "datetime"),
        ("timestamptz", "datetime"),
        ("tsquery", "string"),
        ("tsvector", "string"),
        ("txid_snapshot", "string"),
        ("uuid", "string"),
        ("varbit", "string"),
        ("varchar", "string"),
        ("xml", "string"),
    ]
    .iter()
    .map(|(native, abstract_type)| Mapping::new(*native, *abstract_type))
    .collect()
}
