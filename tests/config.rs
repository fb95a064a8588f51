//! Building dialects from TOML configuration.

use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::json;
use sqltree::dialect::{TypeDef, UnmappedPolicy};
use sqltree::prelude::*;

const CONFIG: &str = r#"
dialect = "pg"
unmapped = "error"

[types.uuid]
use = "char"
length = 36

[[mappings]]
use = "uuid"
type = "uuid"

[[mappings]]
use = "citext"
type = "string"
options = { length = 255 }

[aliases]
"app.users" = "u"
"#;

#[test]
fn test_config_builds_dialect() {
    let config = Config::from_toml_str(CONFIG).unwrap();
    assert_eq!(config.kind().unwrap(), DialectKind::PostgreSql);
    assert_eq!(config.unmapped, UnmappedPolicy::Error);
    assert_eq!(config.aliases.get("app.users").map(String::as_str), Some("u"));

    let dialect = config.dialect().unwrap();
    assert_eq!(dialect.type_def("uuid").unwrap(), &TypeDef::new("char").length(36));
    assert_eq!(dialect.mapped(&json!("uuid")).unwrap(), "uuid");
    assert_eq!(dialect.mapped(&json!({"use": "citext", "length": 255})).unwrap(), "string");
    assert!(matches!(
        dialect.mapped(&json!("geometry")),
        Err(SqlError::UnmappedType(native)) if native == "geometry"
    ));

    let sql = dialect
        .column(&ColumnDef::named("token").of_type("uuid").null(false))
        .unwrap();
    assert_eq!(sql, r#""token" char(36) NOT NULL"#);
}

#[test]
fn test_config_aliases_in_conditions() {
    let config = Config::from_toml_str(CONFIG).unwrap();
    let dialect = config.dialect().unwrap();
    let sql = dialect
        .conditions(
            &json!({"app.users.id": 3}),
            &ConditionOptions::new().aliases(&config.aliases).prepend("WHERE"),
        )
        .unwrap();
    assert_eq!(sql, r#"WHERE "u"."id" = 3"#);
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("sqltree-config-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"dialect = \"mariadb\"\n").unwrap();
    drop(file);

    let config = Config::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.dialect().unwrap().kind(), DialectKind::MySql);
}

#[test]
fn test_invalid_toml() {
    let err = Config::from_toml_str("dialect = ").unwrap_err();
    assert!(matches!(err, SqlError::Config(_)));
}

#[test]
fn test_missing_file() {
    let err = Config::load("/nonexistent/sqltree.toml").unwrap_err();
    assert!(matches!(err, SqlError::Io(_)));
}
