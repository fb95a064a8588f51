//! Abstract column types, native type mappings and column definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::state::RenderState;
use super::{Dialect, MetaScope};
use crate::error::{SqlError, SqlResult};

/// Native rendering of an abstract column type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(rename = "use")]
    pub use_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default)]
    pub serial: bool,
}

impl TypeDef {
    pub fn new(native: impl Into<String>) -> Self {
        Self {
            use_: native.into(),
            ..Self::default()
        }
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn serial(mut self) -> Self {
        self.serial = true;
        self
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&native_type(&self.use_, self.length, self.precision))?;
        if self.serial {
            f.write_str(" serial")?;
        }
        Ok(())
    }
}

/// `native(length,precision)`, omitting the parentheses when both are unset.
pub(crate) fn native_type(native: &str, length: Option<u32>, precision: Option<u32>) -> String {
    let size: Vec<String> = [length, precision]
        .into_iter()
        .flatten()
        .map(|n| n.to_string())
        .collect();
    if size.is_empty() {
        native.to_string()
    } else {
        format!("{}({})", native, size.join(","))
    }
}

/// A native type → abstract type mapping candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Native type name, e.g. `tinyint`.
    #[serde(rename = "use")]
    pub native: String,
    /// Abstract type name, e.g. `boolean`.
    #[serde(rename = "type")]
    pub abstract_type: String,
    /// Column attributes that make this candidate a better match.
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl Mapping {
    pub fn new(native: impl Into<String>, abstract_type: impl Into<String>) -> Self {
        Self {
            native: native.into(),
            abstract_type: abstract_type.into(),
            options: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn score(&self, column: &Map<String, Value>) -> i32 {
        self.options
            .iter()
            .map(|(key, expected)| if column.get(key) == Some(expected) { 1 } else { -1 })
            .sum()
    }
}

/// What to do with a native type that has no mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnmappedPolicy {
    /// Report it as `string`.
    #[default]
    #[serde(rename = "string")]
    Fallback,
    /// Fail with [`SqlError::UnmappedType`].
    #[serde(rename = "error")]
    Error,
}

/// A partial column descriptor, as written by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null: Option<bool>,
    /// Vendor attributes such as `charset`, `collate` or `comment`.
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl ColumnDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the abstract type.
    pub fn of_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Set the native type, bypassing the type table.
    pub fn using(mut self, native: impl Into<String>) -> Self {
        self.use_ = Some(native.into());
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn serial(mut self, serial: bool) -> Self {
        self.serial = Some(serial);
        self
    }

    pub fn null(mut self, null: bool) -> Self {
        self.null = Some(null);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Parse a descriptor from a JSON map.
    pub fn from_value(value: &Value) -> SqlResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// A normalized column definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(rename = "use")]
    pub use_: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub serial: bool,
    pub default: Option<Value>,
    pub null: Option<bool>,
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

const NUMERIC_TYPES: [&str; 4] = ["integer", "float", "decimal", "boolean"];

impl Field {
    fn is_numeric(&self) -> bool {
        self.type_
            .as_deref()
            .is_some_and(|t| NUMERIC_TYPES.iter().any(|n| t.starts_with(n)))
    }
}

impl Dialect {
    /// Register (or replace) an abstract type.
    pub fn register_type(&mut self, name: impl Into<String>, def: TypeDef) -> &mut Self {
        let name = name.into();
        debug!(dialect = %self.kind, name = %name, native = %def, "Registered column type");
        self.types.insert(name, def);
        self
    }

    /// Look up an abstract type.
    pub fn type_def(&self, name: &str) -> SqlResult<&TypeDef> {
        self.types
            .get(name)
            .ok_or_else(|| SqlError::UnknownColumnType(name.to_string()))
    }

    /// Registered abstract types, sorted by name.
    pub fn types(&self) -> impl Iterator<Item = (&str, &TypeDef)> {
        self.types.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Register a native → abstract mapping candidate.
    ///
    /// Re-mapping an existing pair keeps its original options.
    pub fn map(
        &mut self,
        native: impl Into<String>,
        abstract_type: impl Into<String>,
        options: Map<String, Value>,
    ) -> &mut Self {
        let mapping = Mapping {
            native: native.into(),
            abstract_type: abstract_type.into(),
            options,
        };
        debug!(
            dialect = %self.kind,
            native = %mapping.native,
            abstract_type = %mapping.abstract_type,
            "Registering type mapping"
        );
        self.push_mapping(mapping);
        self
    }

    /// Register a mapping ranked ahead of the existing candidates, so it wins
    /// ties against them. A higher-scoring candidate still wins.
    pub fn map_preferred(
        &mut self,
        native: impl Into<String>,
        abstract_type: impl Into<String>,
        options: Map<String, Value>,
    ) -> &mut Self {
        let native = native.into().to_lowercase();
        let abstract_type = abstract_type.into();
        debug!(
            dialect = %self.kind,
            native = %native,
            abstract_type = %abstract_type,
            "Registering preferred type mapping"
        );
        let candidates = self.maps.entry(native.clone()).or_default();
        candidates.retain(|m| m.abstract_type != abstract_type);
        candidates.insert(
            0,
            Mapping {
                native,
                abstract_type,
                options,
            },
        );
        self
    }

    /// Append a candidate unless the pair is already mapped.
    pub(crate) fn push_mapping(&mut self, mut mapping: Mapping) {
        mapping.native = mapping.native.to_lowercase();
        let candidates = self.maps.entry(mapping.native.clone()).or_default();
        if !candidates.iter().any(|m| m.abstract_type == mapping.abstract_type) {
            candidates.push(mapping);
        }
    }

    /// Mapping candidates for a native type, in registration order.
    pub fn mappings(&self, native: &str) -> &[Mapping] {
        self.maps
            .get(&native.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve a native column type (a bare name or a column map with
    /// `use` and attributes) to its best abstract type.
    ///
    /// Each candidate scores +1 per matching option and -1 per mismatch.
    /// The highest non-negative score wins; ties go to the first registered.
    pub fn mapped(&self, column: &Value) -> SqlResult<String> {
        let empty = Map::new();
        let (native, attrs) = match column {
            Value::String(native) => (native.as_str(), &empty),
            Value::Object(map) => match map.get("use").and_then(Value::as_str) {
                Some(native) => (native, map),
                None => return Err(SqlError::InvalidDescriptor("column has no `use`".into())),
            },
            other => {
                return Err(SqlError::InvalidDescriptor(format!(
                    "expected a native type, got {}",
                    other
                )))
            }
        };

        let mut best: Option<(i32, &Mapping)> = None;
        for candidate in self.mappings(native) {
            let score = candidate.score(attrs);
            if score < 0 {
                continue;
            }
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((_, mapping)) => Ok(mapping.abstract_type.clone()),
            None => match self.unmapped {
                UnmappedPolicy::Fallback => {
                    warn!(native, dialect = %self.kind, "No type mapping, falling back to string");
                    Ok("string".to_string())
                }
                UnmappedPolicy::Error => Err(SqlError::UnmappedType(native.to_string())),
            },
        }
    }

    /// Normalize a partial descriptor, filling it from the type table
    /// unless it names a native type directly.
    pub fn field(&self, def: &ColumnDef) -> SqlResult<Field> {
        let name = def.name.clone().ok_or(SqlError::MissingColumnName)?;
        let base = match &def.use_ {
            Some(_) => TypeDef::default(),
            None => self
                .type_def(def.type_.as_deref().unwrap_or("string"))?
                .clone(),
        };
        Ok(Field {
            name,
            type_: def.type_.clone(),
            use_: def.use_.clone().unwrap_or(base.use_),
            length: def.length.or(base.length),
            precision: def.precision.or(base.precision),
            serial: def.serial.unwrap_or(base.serial),
            default: def.default.clone().filter(|v| !v.is_null()),
            null: def.null,
            meta: def.meta.clone(),
        })
    }

    /// Render one column definition.
    pub fn column(&self, def: &ColumnDef) -> SqlResult<String> {
        let mut field = self.field(def)?;
        if field.is_numeric() && field.default.as_ref().and_then(Value::as_str) == Some("") {
            field.null = Some(true);
            field.default = None;
        }
        field.use_ = field.use_.to_lowercase();
        let sql = self.render_column(&field)?;
        debug!(column = %field.name, %sql, "Rendered column");
        Ok(sql)
    }

    fn render_column(&self, field: &Field) -> SqlResult<String> {
        let style = &self.column;
        let native = if field.type_.as_deref() == Some("float") && field.precision.is_some() {
            style.exact_numeric.as_str()
        } else {
            field.use_.as_str()
        };

        let mut parts = vec![
            format!(
                "{} {}",
                self.name(&field.name, None),
                native_type(native, field.length, field.precision)
            ),
            self.meta(MetaScope::Column, &field.meta, Some(style.leading_meta.as_slice())),
        ];

        if field.serial {
            parts.push(style.serial.clone());
        } else {
            parts.push(
                match field.null {
                    Some(true) => "NULL",
                    Some(false) => "NOT NULL",
                    None => "",
                }
                .to_string(),
            );
            if let Some(default) = &field.default {
                if !style.no_default.iter().any(|t| t == native) {
                    parts.push(format!("DEFAULT {}", self.default_value(field, default)?));
                }
            }
        }

        parts.push(self.meta(MetaScope::Column, &field.meta, Some(style.trailing_meta.as_slice())));
        parts.retain(|part| !part.is_empty());
        Ok(parts.join(" "))
    }

    /// A default is a literal, or a single-entry formatter map such as
    /// `{":plain": "CURRENT_TIMESTAMP"}`.
    fn default_value(&self, field: &Field, default: &Value) -> SqlResult<String> {
        let mut state = RenderState::for_field(field);
        if let Value::Object(map) = default {
            if let (1, Some((token, payload))) = (map.len(), map.iter().next()) {
                return self.format(token, payload, &mut state);
            }
        }
        self.format(":value", default, &mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_field_requires_name() {
        let err = Dialect::mysql().field(&ColumnDef::default()).unwrap_err();
        assert!(matches!(err, SqlError::MissingColumnName));
    }

    #[test]
    fn test_field_merges_type() {
        let dialect = Dialect::mysql();
        let field = dialect.field(&ColumnDef::named("title").length(32)).unwrap();
        assert_eq!(field.use_, "varchar");
        assert_eq!(field.length, Some(32));
        assert!(!field.serial);

        let serial = dialect.field(&ColumnDef::named("id").of_type("serial")).unwrap();
        assert!(serial.serial);
    }

    #[test]
    fn test_field_with_use_skips_type_table() {
        let field = Dialect::mysql()
            .field(&ColumnDef::named("x").of_type("invalid").using("text"))
            .unwrap();
        assert_eq!(field.use_, "text");
        assert_eq!(field.length, None);
    }

    #[test]
    fn test_unknown_type() {
        let err = Dialect::mysql()
            .field(&ColumnDef::named("x").of_type("invalid"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Column type `'invalid'` does not exist.");
    }

    #[test]
    fn test_mapped_scoring() {
        let dialect = Dialect::mysql();
        assert_eq!(dialect.mapped(&json!({"use": "tinyint", "length": 1})).unwrap(), "boolean");
        assert_eq!(dialect.mapped(&json!({"use": "tinyint", "length": 4})).unwrap(), "integer");
        assert_eq!(dialect.mapped(&json!("tinyint")).unwrap(), "integer");
        assert_eq!(dialect.mapped(&json!("geometry")).unwrap(), "string");
    }

    #[test]
    fn test_mapped_ignores_unscored_attributes() {
        let dialect = Dialect::mysql();
        let flag = json!({"use": "tinyint", "length": 1, "default": true});
        assert_eq!(dialect.mapped(&flag).unwrap(), "boolean");
        let counter = json!({"use": "tinyint", "default": 1});
        assert_eq!(dialect.mapped(&counter).unwrap(), "integer");
    }

    #[test]
    fn test_map_preferred_wins_ties_only() {
        let mut dialect = Dialect::mysql();
        dialect.map_preferred("tinyint", "flag", Map::new());
        assert_eq!(dialect.mapped(&json!("tinyint")).unwrap(), "flag");
        assert_eq!(dialect.mapped(&json!({"use": "tinyint", "length": 1})).unwrap(), "boolean");

        dialect.map_preferred("TINYINT", "integer", Map::new());
        let order: Vec<&str> = dialect
            .mappings("tinyint")
            .iter()
            .map(|m| m.abstract_type.as_str())
            .collect();
        assert_eq!(order, vec!["integer", "flag", "boolean"]);
    }

    #[test]
    fn test_map_keeps_first_registration() {
        let mut dialect = Dialect::ansi();
        dialect.map("jsonb", "object", Map::new());
        dialect.map("jsonb", "object", Map::from_iter([("length".into(), json!(9))]));
        assert_eq!(dialect.mappings("JSONB").len(), 1);
        assert!(dialect.mappings("jsonb")[0].options.is_empty());
    }

    #[test]
    fn test_unmapped_error_policy() {
        let mut dialect = Dialect::sqlite();
        dialect.set_unmapped_policy(UnmappedPolicy::Error);
        let err = dialect.mapped(&json!("geometry")).unwrap_err();
        assert!(matches!(err, SqlError::UnmappedType(t) if t == "geometry"));
    }

    #[test]
    fn test_column_default_formatter() {
        let sql = Dialect::postgresql()
            .column(
                &ColumnDef::named("created")
                    .of_type("datetime")
                    .default_value(json!({":plain": "CURRENT_TIMESTAMP"})),
            )
            .unwrap();
        assert_eq!(sql, "\"created\" timestamp DEFAULT CURRENT_TIMESTAMP");
    }
}
