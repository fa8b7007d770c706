use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    effects::{EffectCatalog, EffectSpec},
    error::{ConfigError, Result},
    fields::FieldSchema,
};

/// Main configuration for magick-batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool settings
    pub imagemagick: ImageMagickConfig,

    /// Default field values, keyed by field label
    pub defaults: BTreeMap<String, String>,

    /// Batch processing settings
    pub batch: BatchConfig,

    /// Additional effects registered next to the built-in ones
    pub effects: Vec<CustomEffect>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.imagemagick.validate()?;
        self.batch.validate()?;
        let catalog = self.build_catalog()?;
        self.build_schema(&catalog)?;
        Ok(())
    }

    /// Built-in effects plus the configured custom ones
    pub fn build_catalog(&self) -> Result<EffectCatalog> {
        let mut catalog = EffectCatalog::new()?;
        for effect in &self.effects {
            catalog.register(effect.to_spec()?)?;
        }
        Ok(catalog)
    }

    /// Field schema for `catalog`, with configured defaults applied
    pub fn build_schema(&self, catalog: &EffectCatalog) -> Result<FieldSchema> {
        let schema = FieldSchema::new(catalog.names()).with_defaults(&self.defaults)?;
        catalog.check_fields(&schema)?;
        Ok(schema)
    }
}

/// External tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageMagickConfig {
    /// Executable name looked up on PATH, or an explicit path
    pub executable: String,
}

impl Default for ImageMagickConfig {
    fn default() -> Self {
        Self {
            executable: "convert".to_string(),
        }
    }
}

impl ImageMagickConfig {
    fn validate(&self) -> Result<()> {
        if self.executable.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "imagemagick.executable".to_string(),
                value: self.executable.clone()
            }.into());
        }
        Ok(())
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of photos processed in parallel
    pub threads: usize,

    /// Directory receiving the processed photos
    pub output_dir: PathBuf,

    /// Extension, and thereby format, of the output files
    pub extension: String,

    /// Replace outputs that already exist
    pub overwrite: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            output_dir: PathBuf::from("out"),
            extension: "png".to_string(),
            overwrite: false,
        }
    }
}

impl BatchConfig {
    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch.threads".to_string(),
                value: self.threads.to_string()
            }.into());
        }

        let extension = self.extension.trim();
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "batch.extension".to_string(),
                value: self.extension.clone()
            }.into());
        }

        Ok(())
    }
}

/// A user-defined effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEffect {
    pub name: String,
    pub template: String,

    /// Labels of the schema fields the template reads
    #[serde(default)]
    pub fields: Vec<String>,
}

impl CustomEffect {
    pub fn to_spec(&self) -> Result<EffectSpec> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "effects.name".to_string(),
                value: self.name.clone()
            }.into());
        }
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        EffectSpec::new(&self.name, &self.template, &fields)
    }
}
