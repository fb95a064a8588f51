//! Statement builders end to end.

use pretty_assertions::assert_eq;
use serde_json::json;
use sqltree::dialect::schema_fn;
use sqltree::prelude::*;
use sqltree::statement::{Select, Statement};

#[test]
fn test_factory_builds_each_statement() {
    let dialect = Dialect::postgresql();
    assert!(matches!(dialect.statement("select"), Ok(Statement::Select(_))));
    assert!(matches!(dialect.statement("CREATE TABLE"), Ok(Statement::CreateTable(_))));
    assert!(matches!(
        dialect.statement("upsert"),
        Err(SqlError::UnsupportedStatement(name)) if name == "upsert"
    ));
}

#[test]
fn test_select_full() {
    let dialect = Dialect::ansi();
    let sql = dialect
        .select()
        .fields(json!(["u.id", {"u.name": "name"}, {":count()": [{":name": "o.id"}]}]))
        .from(json!({"users": "u"}))
        .join_as(json!({"orders": "o"}), json!({"=": [{":name": "o.user_id"}, {":name": "u.id"}]}), "inner")
        .where_clause(json!({"u.active": true}))
        .group("u.id")
        .having(json!({">": [{":count()": [{":name": "o.id"}]}, 2]}))
        .order(json!({"name": "asc"}))
        .limit(10, Some(20))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "u"."id", "u"."name" AS "name", COUNT("o"."id") FROM "users" AS "u""#,
            r#" INNER JOIN "orders" AS "o" ON "o"."user_id" = "u"."id""#,
            r#" WHERE "u"."active" = TRUE GROUP BY "u"."id" HAVING COUNT("o"."id") > 2"#,
            r#" ORDER BY "name" ASC LIMIT 10 OFFSET 20"#
        )
    );
}

#[test]
fn test_select_with_cte() {
    let dialect = Dialect::postgresql();
    let recent = dialect
        .select()
        .from("posts")
        .where_clause(json!({"created": {">": {":plain": "NOW() - INTERVAL '1 day'"}}}));
    let sql = dialect
        .select()
        .with("recent", &recent)
        .unwrap()
        .from("recent")
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"WITH recent AS (SELECT * FROM "posts" WHERE "created" > NOW() - INTERVAL '1 day') SELECT * FROM "recent""#
    );
}

#[test]
fn test_select_aliases_and_schemas() {
    let dialect = Dialect::ansi();
    let aliases = [("logical".to_string(), "physical".to_string())].into();
    let sql = dialect
        .select()
        .from("physical")
        .where_clause(json!({"logical.id": 1}))
        .order("logical.id desc")
        .to_sql_with(Some(&aliases), None)
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT * FROM "physical" WHERE "physical"."id" = 1 ORDER BY "physical"."id" DESC"#
    );
}

#[test]
fn test_subquery_in_condition() {
    let dialect = Dialect::mysql();
    let inner = dialect.select().fields("user_id").from("bans");
    let sql = dialect
        .select()
        .from("users")
        .where_clause(json!({":not in": [{":name": "id"}, inner.to_plain().unwrap()]}))
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM `users` WHERE `id` NOT IN (SELECT `user_id` FROM `bans`)");
}

#[test]
fn test_update_schema_casts_values_and_conditions() {
    let dialect = {
        let mut dialect = Dialect::ansi();
        dialect.set_caster_strategy(std::sync::Arc::new(sqltree::dialect::SchemaCaster));
        dialect
    };
    let schema = schema_fn(|field, value| match (field, value.as_str()) {
        ("id" | "count", Some(text)) => text.parse::<i64>().map(Into::into).unwrap_or(value.clone()),
        _ => value.clone(),
    });
    let sql = dialect
        .update()
        .table("counters")
        .values(json!({"count": "5"}))
        .unwrap()
        .schema(schema)
        .where_clause(json!({"id": "7"}))
        .to_sql()
        .unwrap();
    assert_eq!(sql, r#"UPDATE "counters" SET "count" = 5 WHERE "id" = 7"#);
}

#[test]
fn test_update_requires_values() {
    let err = Dialect::ansi().update().table("t").to_sql().unwrap_err();
    assert_eq!(err.to_string(), "Invalid `UPDATE` statement, missing `VALUES` clause.");
    let err = Dialect::ansi()
        .update()
        .values(json!({"a": 1}))
        .unwrap()
        .to_sql()
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid `UPDATE` statement, missing `TABLE` clause.");
}

#[test]
fn test_insert_value_formatters() {
    let sql = Dialect::postgresql()
        .insert()
        .into("events")
        .values(json!({"name": "boot", "at": {":plain": "NOW()"}}))
        .unwrap()
        .values(json!({"name": "halt"}))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"INSERT INTO "events" ("name", "at") VALUES ('boot', NOW()), ('halt', NULL)"#
    );
}

#[test]
fn test_drop_table() {
    let sql = Dialect::mysql()
        .drop_table()
        .table("table1")
        .if_exists(true)
        .restrict(true)
        .to_sql()
        .unwrap();
    assert_eq!(sql, "DROP TABLE IF EXISTS `table1` RESTRICT");
}

#[test]
fn test_builder_without_dialect() {
    let err = Select::new().from("t").to_sql().unwrap_err();
    assert_eq!(err.to_string(), "Missing SQL dialect adapter.");
}

#[test]
fn test_statement_enum_renders() {
    let dialect = Dialect::sqlite();
    let statement = Statement::Truncate(dialect.truncate().table("logs"));
    assert_eq!(statement.name(), "truncate");
    assert_eq!(
        statement.to_sql().unwrap(),
        r#"DELETE FROM "logs";DELETE FROM "SQLITE_SEQUENCE" WHERE name="logs""#
    );
}
