use std::path::PathBuf;
use thiserror::Error;

/// The error type for container registration, resolution and loading.
#[derive(Debug, Error)]
pub enum Error {
  #[error("You have requested a non-existent parameter \"{0}\".")]
  ParameterNotFound(String),

  #[error("You have requested a non-existent service \"{0}\".")]
  ServiceNotFound(String),

  #[error("Service \"{id}\" cannot be resolved as {requested}: it was registered with another type.")]
  TypeMismatch { id: String, requested: &'static str },

  #[error("Circular reference detected for service \"{id}\", path: \"{path}\".")]
  CircularReference { id: String, path: String },

  #[error("Circular reference detected for parameter \"{name}\", path: \"{path}\".")]
  CircularParameter { name: String, path: String },

  #[error("Parameter \"{name}\" of type {kind} cannot be embedded in string \"{value}\".")]
  NonScalarParameter {
    name: String,
    kind: &'static str,
    value: String,
  },

  #[error("The container is compiled; service or parameter \"{0}\" cannot be modified.")]
  Frozen(String),

  #[error("Environment variable not found: \"{0}\".")]
  EnvNotFound(String),

  #[error("Unsupported env var prefix \"{prefix}\" in \"env({expression})\".")]
  UnknownEnvProcessor { prefix: String, expression: String },

  #[error("Invalid value for \"env({expression})\" with processor \"{processor}\": {message}")]
  EnvProcessor {
    expression: String,
    processor: String,
    message: String,
  },

  #[error("Alias \"{alias}\" points to non-existent service \"{target}\".")]
  InvalidAlias { alias: String, target: String },

  #[error("Parameter \"{name}\" cannot be converted to {target}: {source}")]
  ParameterConversion {
    name: String,
    target: &'static str,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Failed to read configuration file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse configuration file {path}: {source}")]
  Yaml {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Invalid configuration in {path}: {message}")]
  InvalidConfig { path: PathBuf, message: String },

  #[error("Factory for service \"{id}\" failed: {message}")]
  Factory { id: String, message: String },
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
