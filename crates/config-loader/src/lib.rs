use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

const GOVERNOR_SCHEMA_SOURCE: &str =
    include_str!("../../../contracts/config/governor-config.v1.json");

static GOVERNOR_SCHEMA: Lazy<Result<Value, String>> =
    Lazy::new(|| serde_json::from_str(GOVERNOR_SCHEMA_SOURCE).map_err(|e| e.to_string()));

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    ConfigFileNotFound { path: String },

    #[error("Schema compilation failed: {message}")]
    SchemaCompilationFailed { message: String },

    #[error("Config validation failed: {}", summarize(.errors))]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("JSON parsing failed: {message}")]
    JsonParsingFailed { message: String },

    #[error("YAML parsing failed: {message}")]
    YamlParsingFailed { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub json_pointer: String,
    pub message: String,
    pub schema_path: String,
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| {
            if e.json_pointer.is_empty() {
                e.message.clone()
            } else {
                format!("{}: {}", e.json_pointer, e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// The governor config schema embedded at build time.
pub fn governor_schema() -> Result<Value, ConfigError> {
    (*GOVERNOR_SCHEMA)
        .clone()
        .map_err(|message| ConfigError::JsonParsingFailed { message })
}

/// Loads config files and validates them against a Draft 7 JSON Schema.
pub struct ConfigManager {
    schema_value: Value,
    schema: JSONSchema,
}

impl ConfigManager {
    /// Manager for the governor's own config file format.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_schema(governor_schema()?)
    }

    pub fn with_schema(schema_value: Value) -> Result<Self, ConfigError> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_value)
            .map_err(|e| ConfigError::SchemaCompilationFailed {
                message: e.to_string(),
            })?;
        Ok(Self {
            schema_value,
            schema,
        })
    }

    /// Reads, validates and deserializes `path`. Files ending in `.yaml` or
    /// `.yml` are parsed as YAML, everything else as JSON.
    #[instrument(skip(self))]
    pub fn load_file<T: DeserializeOwned>(&self, path: &Path) -> Result<T, ConfigError> {
        let value = self.read_file(path)?;
        self.validate_value(&value)?;
        deserialize(value)
    }

    /// Like [`load_file`](Self::load_file), but falls back to the schema
    /// defaults when no path is given.
    pub fn load_or_default<T: DeserializeOwned>(
        &self,
        path: Option<&Path>,
    ) -> Result<T, ConfigError> {
        match path {
            Some(p) => self.load_file(p),
            None => {
                let value = self.default_value();
                self.validate_value(&value)?;
                deserialize(value)
            }
        }
    }

    #[instrument(skip(self))]
    pub fn validate_file(&self, path: &Path) -> Result<(), ConfigError> {
        let value = self.read_file(path)?;
        self.validate_value(&value)
    }

    pub fn validate_value(&self, config: &Value) -> Result<(), ConfigError> {
        if let Err(errors) = self.schema.validate(config) {
            let validation_errors: Vec<ValidationError> = errors
                .map(|error| ValidationError {
                    json_pointer: error.instance_path.to_string(),
                    message: error.to_string(),
                    schema_path: error.schema_path.to_string(),
                })
                .collect();

            return Err(ConfigError::ValidationFailed {
                errors: validation_errors,
            });
        }
        Ok(())
    }

    /// Object built from every top-level property's `default`.
    pub fn default_value(&self) -> Value {
        let mut defaults = serde_json::Map::new();
        if let Some(properties) = self
            .schema_value
            .get("properties")
            .and_then(|p| p.as_object())
        {
            for (key, property) in properties {
                if let Some(default_value) = property.get("default") {
                    defaults.insert(key.clone(), default_value.clone());
                }
            }
        }
        debug!("Built default config from schema: {:?}", defaults);
        Value::Object(defaults)
    }

    fn read_file(&self, path: &Path) -> Result<Value, ConfigError> {
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParsingFailed {
                message: e.to_string(),
            })
        } else {
            serde_json::from_str(&content).map_err(|e| ConfigError::JsonParsingFailed {
                message: e.to_string(),
            })
        }
    }
}

fn deserialize<T: DeserializeOwned>(value: Value) -> Result<T, ConfigError> {
    serde_json::from_value(value).map_err(|e| ConfigError::JsonParsingFailed {
        message: e.to_string(),
    })
}
