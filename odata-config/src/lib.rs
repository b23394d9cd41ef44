//! Declarative `$format` mappings for OData content negotiation.
//!
//! Services often need extra representations (CSV exports, a vendor JSON
//! flavour, ...) without writing a handler hook by hand. A
//! [`NegotiationConfig`] lists them in a file or in the environment and is
//! itself a [`CustomContentTypeSupport`] hook.
//!
//! ```toml
//! [[mappings]]
//! alias = "csv"
//! content_type = "text/csv;charset=utf-8"
//! resource_kinds = ["entity_collection"]
//!
//! [[mappings]]
//! alias = "full"
//! content_type = "application/json;odata.metadata=full"
//! ```
//!
//! or `ODATA_FORMAT_CSV=text/csv;charset=utf-8` in the environment.
//!
//! ```
//! use odata_config::{FormatMappingEntry, NegotiationConfig};
//! use odata_core::{negotiate, ContentType, ResourceKind};
//!
//! let config = NegotiationConfig::builder()
//!     .add_mapping(FormatMappingEntry::new("atom", ContentType::application_atom_xml()))
//!     .build()
//!     .unwrap();
//!
//! let ct = negotiate(ResourceKind::Entity, Some("atom"), &[], &config).unwrap();
//! assert_eq!(ct.render(), "application/atom+xml");
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{EnvLoader, DEFAULT_PREFIX};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use odata_core::{ContentType, CustomContentTypeSupport, FormatContentTypeMapping, ResourceKind};
use odata_log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One configured `$format` alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatMappingEntry {
    pub alias: String,
    pub content_type: ContentType,
    /// Kinds the alias is offered for; every kind when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_kinds: Option<Vec<ResourceKind>>,
}

impl FormatMappingEntry {
    pub fn new(alias: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            alias: alias.into(),
            content_type,
            resource_kinds: None,
        }
    }

    /// Restrict the entry to some resource kinds.
    pub fn for_kinds(mut self, kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        self.resource_kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn applies_to(&self, kind: ResourceKind) -> bool {
        self.resource_kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&kind))
    }

    pub fn to_mapping(&self) -> FormatContentTypeMapping {
        FormatContentTypeMapping::new(&self.alias, self.content_type.clone())
    }
}

impl Validate for FormatMappingEntry {
    fn validate(&self) -> Result<()> {
        ConfigValidator::alias(&self.alias, "alias")?;
        ConfigValidator::non_empty_list(self.resource_kinds.as_deref(), "resource_kinds")
    }
}

/// Custom format mappings, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NegotiationConfig {
    #[serde(default)]
    pub mappings: Vec<FormatMappingEntry>,
}

impl NegotiationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> NegotiationConfigBuilder {
        NegotiationConfigBuilder::new()
    }

    /// Load and validate a JSON, TOML or `.env` file.
    ///
    /// `.env` files are read with the default `ODATA` prefix.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_prefix(path, DEFAULT_PREFIX)
    }

    fn from_file_with_prefix(path: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let loader = ConfigLoader::auto(&path)?;
        let value = loader.load_file(&path)?;
        Self::from_value(value, loader.format(), prefix)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        let value = ConfigLoader::new(format).parse(content)?;
        Self::from_value(value, format, DEFAULT_PREFIX)
    }

    fn from_value(value: serde_json::Value, format: FileFormat, prefix: &str) -> Result<Self> {
        let config = match (format, value) {
            (FileFormat::Env, serde_json::Value::Object(map)) => {
                let pairs = map
                    .into_iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k, v.to_string())));
                Self {
                    mappings: EnvLoader::new(prefix).mappings_from_pairs(pairs)?,
                }
            }
            (_, value) => serde_json::from_value(value)
                .map_err(|e| ConfigError::DeserializationError(e.to_string()))?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn add(&mut self, entry: FormatMappingEntry) {
        self.mappings.push(entry);
    }

    /// Append another configuration's entries after this one's.
    pub fn merge(&mut self, other: NegotiationConfig) {
        self.mappings.extend(other.mappings);
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// The mappings offered for a resource kind, in declaration order.
    pub fn mappings_for(&self, kind: ResourceKind) -> Vec<FormatContentTypeMapping> {
        self.mappings
            .iter()
            .filter(|entry| entry.applies_to(kind))
            .map(FormatMappingEntry::to_mapping)
            .collect()
    }
}

impl Validate for NegotiationConfig {
    fn validate(&self) -> Result<()> {
        self.mappings.iter().try_for_each(Validate::validate)
    }
}

impl CustomContentTypeSupport for NegotiationConfig {
    fn modify_supported_content_types(
        &self,
        mut supported: Vec<FormatContentTypeMapping>,
        kind: ResourceKind,
    ) -> Vec<FormatContentTypeMapping> {
        supported.extend(self.mappings_for(kind));
        supported
    }
}

/// Builder for [`NegotiationConfig`].
///
/// Sources are read in a fixed order: `.env` file, environment, files in
/// the order added, then entries added directly. Since the first alias wins
/// during negotiation, the environment overrides files.
pub struct NegotiationConfigBuilder {
    prefix: String,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<String>,
    config_files: Vec<String>,
    entries: Vec<FormatMappingEntry>,
}

impl NegotiationConfigBuilder {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
            config_files: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Read `<PREFIX>_FORMAT_*` variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Load a `.env` file into the environment first; implies `load_env`.
    /// A missing default `.env` is ignored, a missing explicit path is an error.
    pub fn load_dotenv(mut self, path: Option<String>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Add configuration file to load
    pub fn add_file(mut self, path: impl Into<String>) -> Self {
        self.config_files.push(path.into());
        self
    }

    pub fn add_mapping(mut self, entry: FormatMappingEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> Result<NegotiationConfig> {
        let mut config = NegotiationConfig::new();

        if self.load_dotenv {
            match &self.dotenv_path {
                Some(path) => {
                    dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
                }
                None => {
                    dotenvy::dotenv().ok();
                }
            }
        }

        if self.load_env || self.load_dotenv {
            config.mappings = EnvLoader::new(self.prefix.as_str()).format_mappings()?;
        }

        for path in &self.config_files {
            config.merge(NegotiationConfig::from_file_with_prefix(path, &self.prefix)?);
        }

        config.mappings.extend(self.entries);
        config.validate()?;

        info!(
            target: "odata::config",
            "loaded {} custom format mapping(s)",
            config.mappings.len()
        );

        Ok(config)
    }
}

impl Default for NegotiationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
