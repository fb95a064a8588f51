//! Condition, name and value rendering against the ANSI dialect.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqltree::dialect::{schema_fn, Aliases, Schemas};
use sqltree::prelude::*;

fn conditions(tree: Value) -> String {
    Dialect::ansi()
        .conditions(&tree, &ConditionOptions::new())
        .unwrap()
}

fn names(fields: Value) -> String {
    Dialect::ansi().names(&fields, None).unwrap()
}

#[test]
fn test_quote() {
    let dialect = Dialect::ansi();
    assert_eq!(dialect.quote("abcdef0123456798%-"), "'abcdef0123456798%-'");
    assert_eq!(
        dialect.quote("\0\x08\x09\x1a\n\r\"'"),
        r#"'\0\b\t\z\n\r\"\''"#
    );
}

#[test]
fn test_names_with_prefixes() {
    assert_eq!(names(json!("schema.tablename")), r#""schema"."tablename""#);
    assert_eq!(names(json!({"tablename.fieldname": "F1"})), r#""tablename"."fieldname" AS "F1""#);
    assert_eq!(
        names(json!([
            {"name1": [{"field1": "F1"}, {"field2": "F2"}]},
            {"name2": [{"field3": "F3"}, {"field4": "F4"}]}
        ])),
        r#""name1"."field1" AS "F1", "name1"."field2" AS "F2", "name2"."field3" AS "F3", "name2"."field4" AS "F4""#
    );
}

#[test]
fn test_names_mixed_syntax() {
    let part = names(json!([
        "prefix.field1",
        {"prefix.field1": "F1"},
        {"prefix": ["field2", {"field3": "F3"}, [{"field3": "F33"}]]}
    ]));
    assert_eq!(
        part,
        r#""prefix"."field1", "prefix"."field1" AS "F1", "prefix"."field2", "prefix"."field3" AS "F3", "prefix"."field3" AS "F33""#
    );
}

#[test]
fn test_names_ignore_duplicates() {
    let part = names(json!([
        "prefix.field1",
        "prefix.field1",
        "prefix.field2",
        {"prefix": ["field1", "field2", {"field3": "F3"}, {"field3": "F5"}]}
    ]));
    assert_eq!(
        part,
        r#""prefix"."field1", "prefix"."field2", "prefix"."field3" AS "F3", "prefix"."field3" AS "F5""#
    );
}

#[test]
fn test_names_nested_arrays_and_star() {
    assert_eq!(names(json!([[[[{"tablename.fieldname": "F1"}]]]])), r#""tablename"."fieldname" AS "F1""#);
    assert_eq!(names(json!(["prefix.*"])), r#""prefix".*"#);
    assert_eq!(names(json!({"prefix": ["*"]})), r#""prefix".*"#);
}

#[test]
fn test_names_with_operators() {
    assert_eq!(
        names(json!({":count()": [{":distinct": [{":name": "table.firstname"}]}]})),
        r#"COUNT(DISTINCT "table"."firstname")"#
    );
    assert_eq!(names(json!({":plain": "COUNT(*)"})), "COUNT(*)");
}

#[test]
fn test_names_with_subquery() {
    let dialect = Dialect::ansi();
    let subquery = dialect.select().from("table2").alias("t2").to_plain().unwrap();
    let part = dialect
        .names(&json!([subquery, {"name2": [{"field2": "F2"}]}]), None)
        .unwrap();
    assert_eq!(part, r#"(SELECT * FROM "table2") AS "t2", "name2"."field2" AS "F2""#);
}

#[test]
fn test_names_custom_aliasing() {
    let dialect = Dialect::ansi();
    let aliases: Aliases = [("some.thing".to_string(), "alias".to_string())].into();
    assert_eq!(
        dialect.names(&json!("some.thing.fieldname"), Some(&aliases)).unwrap(),
        r#""alias"."fieldname""#
    );
    assert_eq!(
        dialect
            .names(&json!({"some.thing": ["field1", {"field1": "F1"}, {"field1": "F11"}]}), Some(&aliases))
            .unwrap(),
        r#""alias"."field1", "alias"."field1" AS "F1", "alias"."field1" AS "F11""#
    );
}

#[test]
fn test_values() {
    let dialect = Dialect::ansi();
    let state = RenderState::new();
    assert_eq!(dialect.value(&json!(null), &state), "NULL");
    assert_eq!(dialect.value(&json!(true), &state), "TRUE");
    assert_eq!(dialect.value(&json!("text"), &state), "'text'");
    assert_eq!(dialect.value(&json!(15.85), &state), "15.85");
    assert_eq!(dialect.value(&json!([null, "text", true]), &state), r#"'{NULL,"text",TRUE}'"#);
}

#[test]
fn test_format() {
    let dialect = Dialect::ansi();
    let aliases: Aliases = [("some.thing".to_string(), "alias".to_string())].into();
    let mut state = RenderState::scoped(Some(&aliases), None);
    assert_eq!(
        dialect.format(":name", &json!("some.thing.fieldname"), &mut state).unwrap(),
        r#""alias"."fieldname""#
    );
    assert_eq!(dialect.format(":value", &json!("value"), &mut state).unwrap(), "'value'");
    assert_eq!(dialect.format(":plain", &json!("plain"), &mut state).unwrap(), "plain");
    let err = dialect.format(":undefined", &json!("x"), &mut state).unwrap_err();
    assert_eq!(err.to_string(), "Unexisting formatter `':undefined'`.");
}

#[test]
fn test_equality_and_comparison() {
    assert_eq!(
        conditions(json!({"field1": "value", "field2": 10})),
        r#""field1" = 'value' AND "field2" = 10"#
    );
    assert_eq!(
        conditions(json!({"=": [{":name": "field1"}, {":name": "field2"}]})),
        r#""field1" = "field2""#
    );
    assert_eq!(
        conditions(json!([{"field": {">": 10, "<=": 15}}])),
        r#""field" > 10 AND "field" <= 15"#
    );
}

#[test]
fn test_between_is_and_in() {
    assert_eq!(
        conditions(json!({":between": [{":name": "score"}, 90, 100]})),
        r#""score" BETWEEN 90 AND 100"#
    );
    assert_eq!(
        conditions(json!({"score": {":not between": [90, 100]}})),
        r#""score" NOT BETWEEN 90 AND 100"#
    );
    assert_eq!(conditions(json!({"score": null})), r#""score" IS NULL"#);
    assert_eq!(
        conditions(json!({":is not": [{":name": "score"}, null]})),
        r#""score" IS NOT NULL"#
    );
    assert_eq!(conditions(json!({"score": [1, 2, 3, 4, 5]})), r#""score" IN (1, 2, 3, 4, 5)"#);
    assert_eq!(
        conditions(json!({"score": {":not in": [1, 2, 3, 4, 5]}})),
        r#""score" NOT IN (1, 2, 3, 4, 5)"#
    );
}

#[test]
fn test_subqueries_and_functions() {
    let dialect = Dialect::ansi();
    let subquery = dialect.select().fields("s1").from("t1").to_plain().unwrap();
    assert_eq!(
        conditions(json!({":any": [{":name": "score"}, subquery]})),
        r#""score" ANY (SELECT "s1" FROM "t1")"#
    );
    assert_eq!(
        conditions(json!({":concat()": [
            {":name": "table.firstname"},
            {":value": " "},
            {":name": "table.lastname"}
        ]})),
        r#"CONCAT("table"."firstname", ' ', "table"."lastname")"#
    );
}

#[test]
fn test_parentheses() {
    assert_eq!(conditions(json!({"*": [{"()": [{"+": [1, 2]}]}, 3]})), "(1 + 2) * 3");
    assert_eq!(conditions(json!({"()": [1, 2]})), "(1, 2)");
    assert_eq!(
        conditions(json!([
            {":or()": [
                {"!=": [{":name": "value"}, 789]},
                {"!=": [{":name": "value"}, 0]}
            ]},
            {":and()": [
                {"<": [{":name": "Table1.min"}, 123]},
                {">": [{":name": "Table2.max"}, 456]}
            ]}
        ])),
        r#"("value" != 789 OR "value" != 0) AND ("Table1"."min" < 123 AND "Table2"."max" > 456)"#
    );
}

#[test]
fn test_casting_through_aliased_schemas() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut dialect = Dialect::ansi();
    dialect.set_caster(move |dialect: &Dialect, value: &Value, state: &RenderState<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
        dialect.default_cast(&state.coerce(value))
    });

    let schemas: Schemas = [
        ("".to_string(), schema_fn(|_, v| v.clone())),
        ("Table1".to_string(), schema_fn(|_, v| json!(v.as_i64().unwrap_or(0) - 2))),
        ("Table2".to_string(), schema_fn(|_, v| json!(v.as_i64().unwrap_or(0) + 2))),
    ]
    .into_iter()
    .collect();
    let aliases: Aliases = [
        ("table1".to_string(), "Table1".to_string()),
        ("table2".to_string(), "Table2".to_string()),
    ]
    .into();

    let sql = dialect
        .conditions(
            &json!([
                {"!=": [{":name": "value"}, 789]},
                {":or": [
                    {"<": [{":name": "table1.min"}, 123]},
                    {">": [{":name": "table2.max"}, 456]}
                ]},
                {"!=": [{":name": "value"}, 0]}
            ]),
            &ConditionOptions::new().schemas(&schemas).aliases(&aliases),
        )
        .unwrap();
    assert_eq!(
        sql,
        r#""value" != 789 AND "Table1"."min" < 121 OR "Table2"."max" > 458 AND "value" != 0"#
    );
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_unknown_operator() {
    let err = Dialect::ansi()
        .conditions(&json!({":undefined": ["one", "two"]}), &ConditionOptions::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "Unexisting operator `':undefined'`.");
}

#[test]
fn test_conditions_custom_aliasing() {
    let aliases: Aliases = [("some.thing".to_string(), "alias".to_string())].into();
    let sql = Dialect::ansi()
        .conditions(
            &json!({"some.thing.field1": "value"}),
            &ConditionOptions::new().aliases(&aliases),
        )
        .unwrap();
    assert_eq!(sql, r#""alias"."field1" = 'value'"#);
}

#[test]
fn test_prefix() {
    let dialect = Dialect::ansi();
    assert_eq!(
        dialect.prefix(&json!(["field1", "field2", "prefix.field3"]), "prefix", true),
        vec![json!("prefix.field1"), json!("prefix.field2"), json!("prefix.field3")]
    );
    let tree = Value::Array(dialect.prefix(&json!([{"field1": "value"}, {"field2": 10}]), "prefix", false));
    assert_eq!(conditions(tree), r#""prefix"."field1" = 'value' AND "prefix"."field2" = 10"#);

    let tree = Value::Array(dialect.prefix(&json!(["value1", "value2"]), "prefix", false));
    assert_eq!(conditions(tree), "'value1' AND 'value2'");

    let tree = Value::Array(dialect.prefix(
        &json!([
            {"=": [{":name": "field1"}, {":name": "field2"}]},
            {"=": [{":name": "field3"}, {":name": "field4"}]}
        ]),
        "prefix",
        true,
    ));
    assert_eq!(
        conditions(tree),
        r#""prefix"."field1" = "prefix"."field2" AND "prefix"."field3" = "prefix"."field4""#
    );
}

#[test]
fn test_mapped_defaults() {
    let mut dialect = Dialect::ansi();
    assert_eq!(dialect.mapped(&json!("unknown_native")).unwrap(), "string");
    dialect.map("real", "float", Default::default());
    assert_eq!(dialect.mapped(&json!("real")).unwrap(), "float");
}
