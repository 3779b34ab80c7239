use std::path::PathBuf;
use thiserror::Error;

/// The main error type for `config_bridge`.
#[derive(Debug, Error)]
pub enum Error {
  /// No container was set, or it was reset. Never set and reset look the same.
  #[error("Container has not been set yet.")]
  NotInitialized,

  #[error("Service \"{service}\" required by {target}::{field} is not registered in the container.")]
  UnresolvedService {
    target: &'static str,
    field: &'static str,
    service: String,
  },

  #[error("Auto injection is not enabled. Call ConfigBridge::boot() first.")]
  InjectionDisabled,

  #[error("Directory {} is not available.", .0.display())]
  MissingDirectory(PathBuf),

  #[error("File {} is not available.", .0.display())]
  MissingEnvFile(PathBuf),

  #[error("Failed to load environment file {}: {source}", .path.display())]
  Env {
    path: PathBuf,
    #[source]
    source: dotenvy::Error,
  },

  /// Errors raised by the container are passed through unchanged.
  #[error(transparent)]
  Container(#[from] config_bridge_ioc::Error),
}

/// A specialized `Result` type for `config_bridge` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
