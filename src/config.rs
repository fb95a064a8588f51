//! `sqltree.toml` configuration.
//!
//! A config names the dialect to build and layers extra types, mappings and
//! a default alias map on top of the vendor tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialect::{Aliases, Dialect, DialectKind, Mapping, TypeDef, UnmappedPolicy};
use crate::error::{SqlError, SqlResult};

pub const CONFIG_FILE: &str = "sqltree.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dialect name; any alias accepted by [`DialectKind`]'s `FromStr`.
    #[serde(default)]
    pub dialect: Option<String>,
    #[serde(default)]
    pub unmapped: UnmappedPolicy,
    #[serde(default)]
    pub types: BTreeMap<String, TypeDef>,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default)]
    pub aliases: Aliases,
}

impl Config {
    pub fn from_toml_str(content: &str) -> SqlResult<Self> {
        toml::from_str(content).map_err(|e| SqlError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loading config");
        Self::from_toml_str(&content)
    }

    /// `./sqltree.toml`, then `<config dir>/sqltree/config.toml`, else
    /// defaults.
    pub fn discover() -> SqlResult<Self> {
        match Self::candidates().into_iter().find(|path| path.is_file()) {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqltree").join("config.toml"));
        }
        paths
    }

    pub fn kind(&self) -> SqlResult<DialectKind> {
        match &self.dialect {
            Some(name) => name.parse(),
            None => Ok(DialectKind::default()),
        }
    }

    /// Build the configured dialect with every extra type and mapping
    /// registered.
    pub fn dialect(&self) -> SqlResult<Dialect> {
        let mut dialect = Dialect::for_kind(self.kind()?);
        dialect.set_unmapped_policy(self.unmapped);
        for (name, def) in &self.types {
            dialect.register_type(name.as_str(), def.clone());
        }
        // Reversed so the file order survives front insertion.
        for mapping in self.mappings.iter().rev() {
            dialect.map_preferred(
                mapping.native.as_str(),
                mapping.abstract_type.as_str(),
                mapping.options.clone(),
            );
        }
        debug!(
            dialect = %dialect.kind(),
            types = self.types.len(),
            mappings = self.mappings.len(),
            "Built dialect from config"
        );
        Ok(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_ansi() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dialect().unwrap().kind(), DialectKind::Ansi);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, SqlError::Config(_)));
    }

    #[test]
    fn test_bad_dialect() {
        let config = Config::from_toml_str("dialect = \"oracle\"").unwrap();
        assert!(matches!(config.dialect(), Err(SqlError::UnknownDialect(_))));
    }
}
