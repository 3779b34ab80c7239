//! The `ConfigBridge` facade: env files, YAML config, compile, then wiring.

use crate::env::Dotenv;
use crate::error::{Error, Result};
use crate::injector::{injector, Injectable};
use crate::locator::locator;
use config_bridge_ioc::{Container, YamlFileLoader};
use std::any::{type_name, Any};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Tag attached to every service registered through [`ConfigBridge::add_configuration`].
pub const CONFIG_TAG: &str = "config_bridge.config";

const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_ENV_FILE: &str = ".env";

/// Options for [`ConfigBridge::boot_with`].
#[derive(Debug, Clone)]
pub struct BootOptions {
  config_dir: String,
  enable_auto_injection: bool,
  register_locator: bool,
  env_paths: Vec<PathBuf>,
}

impl Default for BootOptions {
  fn default() -> Self {
    Self {
      config_dir: DEFAULT_CONFIG_DIR.to_owned(),
      enable_auto_injection: true,
      register_locator: true,
      env_paths: Vec::new(),
    }
  }
}

impl BootOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Configuration directory, relative to the base path (`config` by default).
  pub fn config_dir(mut self, dir: impl Into<String>) -> Self {
    self.config_dir = dir.into();
    self
  }

  /// Hand the compiled container to the global injector (on by default).
  pub fn enable_auto_injection(mut self, enabled: bool) -> Self {
    self.enable_auto_injection = enabled;
    self
  }

  /// Hand the compiled container to the global service locator (on by default).
  pub fn register_locator(mut self, enabled: bool) -> Self {
    self.register_locator = enabled;
    self
  }

  /// Additional env files loaded after the base `.env`, in order. Each must exist.
  pub fn env_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.env_paths.push(path.into());
    self
  }
}

/// Builds and owns the application container.
pub struct ConfigBridge {
  base_path: PathBuf,
  container: Arc<Container>,
}

impl ConfigBridge {
  /// Creates a bridge with an empty container. Nothing is loaded.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
      container: Arc::new(Container::new()),
    }
  }

  /// Boots with the default [`BootOptions`].
  pub fn boot(base_path: impl AsRef<Path>) -> Result<Self> {
    Self::boot_with(base_path, BootOptions::default())
  }

  /// Loads env files and YAML configuration, compiles the container, then
  /// wires it into the global injector and service locator.
  pub fn boot_with(base_path: impl AsRef<Path>, options: BootOptions) -> Result<Self> {
    let base_path = base_path.as_ref();
    let config_dir = base_path.join(&options.config_dir);
    if !base_path.is_dir() || !config_dir.is_dir() {
      return Err(Error::MissingDirectory(config_dir));
    }

    let bridge = Self::new(base_path);
    bridge.load_env(None)?;
    for env_path in &options.env_paths {
      if !env_path.is_file() {
        return Err(Error::MissingEnvFile(env_path.clone()));
      }
      bridge.load_env(Some(env_path))?;
    }

    bridge.load_config(&config_dir)?;
    bridge.container.compile()?;

    if options.enable_auto_injection {
      injector().set_container(Arc::clone(&bridge.container));
    }
    if options.register_locator {
      locator().set_container(Arc::clone(&bridge.container));
    }

    info!(
      base_path = %base_path.display(),
      auto_injection = options.enable_auto_injection,
      locator = options.register_locator,
      "config bridge booted"
    );
    Ok(bridge)
  }

  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  /// Loads an env file with its cascade. Defaults to `<base_path>/.env`.
  ///
  /// A missing file is skipped.
  pub fn load_env(&self, path: Option<&Path>) -> Result<()> {
    let path = path.map_or_else(|| self.base_path.join(DEFAULT_ENV_FILE), Path::to_path_buf);
    if path.is_file() {
      Dotenv::new().load_env(&path)?;
    } else {
      debug!(path = %path.display(), "env file not found, skipping");
    }
    Ok(())
  }

  /// Loads every `*.yaml` file of `config_dir` in file name order.
  pub fn load_config(&self, config_dir: impl AsRef<Path>) -> Result<()> {
    let files = YamlFileLoader::new(&self.container, config_dir.as_ref()).load_directory()?;
    debug!(files = files.len(), "configuration loaded");
    Ok(())
  }

  /// Registers a configuration object as a shared service tagged [`CONFIG_TAG`].
  ///
  /// The id defaults to the configuration's type name.
  pub fn add_configuration<C: Any + Send + Sync>(&self, configuration: C, id: Option<&str>) -> Result<()> {
    let id = id.unwrap_or_else(|| type_name::<C>());
    self.container.add_instance(id, configuration)?;
    self.container.tag(id, CONFIG_TAG)?;
    Ok(())
  }

  /// Compiles the container and registers it with the global service locator.
  pub fn compile(&self) -> Result<Arc<Container>> {
    self.container.compile()?;
    locator().set_container(Arc::clone(&self.container));
    Ok(Arc::clone(&self.container))
  }

  /// Resolves a service, `Ok(None)` when nothing is registered under `id`.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Option<Arc<T>>> {
    if !self.container.has(id) {
      return Ok(None);
    }
    Ok(self.container.get::<T>(id)?)
  }

  pub fn has(&self, id: &str) -> bool {
    self.container.has(id)
  }

  pub fn container(&self) -> &Arc<Container> {
    &self.container
  }

  /// Default-constructs a `T` and injects its marked fields.
  ///
  /// Fails with [`Error::InjectionDisabled`] until a boot enabled auto injection.
  pub fn make<T: Injectable + Default>() -> Result<T> {
    if !Self::is_injection_enabled() {
      return Err(Error::InjectionDisabled);
    }
    injector().make::<T>()
  }

  pub fn is_injection_enabled() -> bool {
    injector().is_enabled()
  }
}
