//! Per-call rendering context.
//!
//! A [`RenderState`] is created by every top-level render call and passed
//! down the compiler by reference. The "current field" slots (`name`,
//! `schema`) are set when a field name is rendered so that a custom caster
//! can see which column a value is destined for. Updates flow forward to
//! the following operands of the same list and down into nested lists;
//! they never leak back to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::types::Field;

/// Logical table/schema name → physical alias.
pub type Aliases = HashMap<String, String>;

/// Alias → per-field cast function.
pub type Schemas = HashMap<String, Arc<dyn Schema>>;

/// Per-alias cast function handed to custom casters through the state.
pub trait Schema: Send + Sync {
    /// Coerce `value` for the column `field`.
    fn cast(&self, field: &str, value: &Value) -> Value;
}

impl<F> Schema for F
where
    F: Fn(&str, &Value) -> Value + Send + Sync,
{
    fn cast(&self, field: &str, value: &Value) -> Value {
        self(field, value)
    }
}

/// Wrap a closure as a shareable [`Schema`].
pub fn schema_fn<F>(f: F) -> Arc<dyn Schema>
where
    F: Fn(&str, &Value) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The rendering context threaded through one render call.
#[derive(Clone, Default)]
pub struct RenderState<'a> {
    aliases: Option<&'a Aliases>,
    schemas: Option<&'a Schemas>,
    field: Option<&'a Field>,
    name: Option<String>,
    schema: Option<Arc<dyn Schema>>,
}

impl<'a> RenderState<'a> {
    /// An empty state: no aliases, no schemas, no current field.
    pub fn new() -> Self {
        Self::default()
    }

    /// A state scoped to the given alias and schema maps.
    pub fn scoped(aliases: Option<&'a Aliases>, schemas: Option<&'a Schemas>) -> Self {
        Self {
            aliases,
            schemas,
            ..Self::default()
        }
    }

    /// A state for rendering the default value of `field`.
    pub fn for_field(field: &'a Field) -> Self {
        Self {
            field: Some(field),
            name: Some(field.name.clone()),
            ..Self::default()
        }
    }

    /// Set the current field and its cast function.
    pub fn with_current(mut self, name: impl Into<String>, schema: Option<Arc<dyn Schema>>) -> Self {
        self.name = Some(name.into());
        self.schema = schema;
        self
    }

    pub fn aliases(&self) -> Option<&'a Aliases> {
        self.aliases
    }

    pub fn schemas(&self) -> Option<&'a Schemas> {
        self.schemas
    }

    /// The column descriptor whose default value is being rendered.
    pub fn field(&self) -> Option<&'a Field> {
        self.field
    }

    /// Leaf name of the field the next value belongs to.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Cast function registered for the current field's table.
    pub fn schema(&self) -> Option<&Arc<dyn Schema>> {
        self.schema.as_ref()
    }

    /// Apply the current schema to `value`, or return it unchanged.
    pub fn coerce(&self, value: &Value) -> Value {
        match (&self.schema, &self.name) {
            (Some(schema), Some(name)) => schema.cast(name, value),
            (Some(schema), None) => schema.cast("", value),
            _ => value.clone(),
        }
    }

    /// Resolve a logical prefix through the alias map.
    pub(crate) fn alias<'p>(&self, prefix: &'p str) -> &'p str
    where
        'a: 'p,
    {
        self.aliases
            .and_then(|aliases| aliases.get(prefix))
            .map(String::as_str)
            .unwrap_or(prefix)
    }

    /// Look up the cast function for an (already aliased) prefix.
    pub(crate) fn schema_for(&self, prefix: &str) -> Option<Arc<dyn Schema>> {
        self.schemas.and_then(|schemas| schemas.get(prefix)).cloned()
    }

    /// Record `(leaf, schema of prefix)` as the current field.
    pub(crate) fn set_current(&mut self, prefix: &str, leaf: &str) {
        let aliased = self.alias(prefix).to_string();
        self.schema = self.schema_for(&aliased);
        self.name = Some(leaf.to_string());
    }
}

impl std::fmt::Debug for RenderState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderState")
            .field("aliases", &self.aliases)
            .field("schemas", &self.schemas.map(|s| s.keys().collect::<Vec<_>>()))
            .field("name", &self.name)
            .field("schema", &self.schema.is_some())
            .finish()
    }
}
