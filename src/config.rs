//! Configuration management for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (libsonnet-gen.toml)
//! - Environment variables (LIBSONNET_GEN_*)
//!
//! ## Example config file (libsonnet-gen.toml):
//! ```toml
//! [naming]
//! acronyms = ["API", "IP", "URL"]
//! fold_acronyms = false
//! type_alias_suffix = "Type"
//!
//! [output]
//! library_revision = "3f1c2a9"
//! schema_revision = "v1.8.0"
//! customizations = "customizations.toml"
//! ```
//!
//! Customization tables (constructors, blacklists, identifier rewrites) are
//! keyed by case-sensitive schema paths and live in their own TOML file,
//! see [`crate::customize`].

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::customize::CustomizationTable;
use crate::naming::JsonnetNaming;

/// Main configuration for the generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenConfig {
    /// Naming settings
    #[serde(default)]
    pub naming: NamingConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Acronyms folded to Capitalized form when `fold_acronyms` is set
    #[serde(default = "default_acronyms")]
    pub acronyms: BTreeSet<String>,

    /// Whether to fold acronyms inside field identifiers (`podIP` -> `podIp`)
    #[serde(default)]
    pub fold_acronyms: bool,

    /// Suffix appended to a field identifier to name its type alias
    #[serde(default = "default_type_alias_suffix")]
    pub type_alias_suffix: String,

    /// Per-release identifier rewrites: release -> raw name -> identifier.
    /// Filled from the customization file.
    #[serde(skip)]
    pub rewrites: BTreeMap<String, BTreeMap<String, String>>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Library revision stamped into the header
    #[serde(default)]
    pub library_revision: Option<String>,

    /// Schema revision stamped into the header
    #[serde(default)]
    pub schema_revision: Option<String>,

    /// Path to the customization tables file
    #[serde(default)]
    pub customizations: Option<PathBuf>,
}

// Default value functions
fn default_acronyms() -> BTreeSet<String> {
    [
        "API", "CIDR", "DNS", "HTTP", "ID", "IO", "IP", "IPC", "JSON", "PID", "TCP", "TLS", "UDP",
        "UI", "URI", "URL", "UUID",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_type_alias_suffix() -> String {
    "Type".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            acronyms: default_acronyms(),
            fold_acronyms: false,
            type_alias_suffix: default_type_alias_suffix(),
            rewrites: BTreeMap::new(),
        }
    }
}

impl GenConfig {
    /// Load configuration from the default locations, adding a specific
    /// file that must exist
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "libsonnet-gen.toml",
            ".libsonnet-gen.toml",
            "config/libsonnet-gen.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "libsonnet", "libsonnet-gen") {
            let xdg_config = config_dir.config_dir().join("libsonnet-gen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("LIBSONNET_GEN")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the customization tables named by `output.customizations`
    pub fn customizations(&self) -> crate::Result<CustomizationTable> {
        match &self.output.customizations {
            Some(path) => CustomizationTable::from_path(path),
            None => Ok(CustomizationTable::default()),
        }
    }

    /// Build the naming policy, merging rewrites from the customization tables
    pub fn naming_policy(&self, customizations: &CustomizationTable) -> JsonnetNaming {
        let mut naming = self.naming.clone();
        for (release, rewrites) in customizations.rewrites() {
            naming
                .rewrites
                .entry(release.clone())
                .or_default()
                .extend(rewrites.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        JsonnetNaming::new(naming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NamingPolicy;

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert_eq!(config.naming.type_alias_suffix, "Type");
        assert!(config.naming.acronyms.contains("API"));
        assert!(config.output.library_revision.is_none());
    }

    #[test]
    fn test_serialize_config() {
        let config = GenConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[naming]"));
        assert!(toml_str.contains("type_alias_suffix"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.toml");
        std::fs::write(
            &path,
            "[naming]\ntype_alias_suffix = \"Kind\"\n\n[output]\nlibrary_revision = \"abc123\"\n",
        )
        .unwrap();

        let config = GenConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.naming.type_alias_suffix, "Kind");
        assert_eq!(config.output.library_revision.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = GenConfig::default();
        config.naming.fold_acronyms = true;
        config.output.schema_revision = Some("v1.8.0".to_string());
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = GenConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert!(loaded.naming.fold_acronyms);
        assert_eq!(loaded.output.schema_revision.as_deref(), Some("v1.8.0"));
        assert_eq!(loaded.naming.acronyms, config.naming.acronyms);
    }

    #[test]
    fn test_naming_policy_merges_rewrites() {
        let table: CustomizationTable = toml::from_str(
            "[releases.\"v1.8.0\".rewrites]\nexternalIPs = \"externalIps\"\n",
        )
        .unwrap();
        let naming = GenConfig::default().naming_policy(&table);
        assert_eq!(naming.rewrite_identifier("v1.8.0", "externalIPs"), "externalIps");
    }
}
