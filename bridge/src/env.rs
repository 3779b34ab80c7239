//! Loading `.env` files into the process environment.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_ENV_KEY: &str = "APP_ENV";
const DEFAULT_ENV: &str = "dev";
const TEST_ENV: &str = "test";
const LOCAL_ENV: &str = "local";

// Names of the variables written by any `Dotenv` in this process. Those may be
// overridden by later files; variables that came from the real environment may not.
static LOADED_VARS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Populates the process environment from dotenv files.
#[derive(Debug, Clone)]
pub struct Dotenv {
  env_key: String,
  default_env: String,
}

impl Default for Dotenv {
  fn default() -> Self {
    Self {
      env_key: DEFAULT_ENV_KEY.to_owned(),
      default_env: DEFAULT_ENV.to_owned(),
    }
  }
}

impl Dotenv {
  pub fn new() -> Self {
    Self::default()
  }

  /// The variable holding the environment name (`APP_ENV` by default).
  pub fn env_key(mut self, key: impl Into<String>) -> Self {
    self.env_key = key.into();
    self
  }

  /// The environment used when the env key is unset (`dev` by default).
  pub fn default_env(mut self, env: impl Into<String>) -> Self {
    self.default_env = env.into();
    self
  }

  /// Loads a single file.
  ///
  /// Returns the names of the variables that were set.
  pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let iter = dotenvy::from_path_iter(path).map_err(|source| Error::Env {
      path: path.to_path_buf(),
      source,
    })?;

    let mut values = Vec::new();
    for item in iter {
      let (name, value) = item.map_err(|source| Error::Env {
        path: path.to_path_buf(),
        source,
      })?;
      values.push((name, value));
    }
    let set = populate(values);
    debug!(path = %path.display(), variables = set.len(), "loaded env file");
    Ok(set)
  }

  /// Loads `path` followed by its environment specific companions.
  ///
  /// The cascade is `path`, `path.local` (skipped in the `test` environment),
  /// then `path.<env>` and `path.<env>.local` (skipped when the environment is
  /// `local`). Missing files are skipped. The environment name is read after
  /// `path` is loaded, so `.env` may define it.
  ///
  /// Returns the files that were loaded.
  pub fn load_env(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let mut loaded = Vec::new();

    self.load_if_exists(path.to_path_buf(), &mut loaded)?;

    let env_name = env::var(&self.env_key).unwrap_or_else(|_| self.default_env.clone());
    if env_name != TEST_ENV {
      self.load_if_exists(with_suffix(path, LOCAL_ENV), &mut loaded)?;
    }
    if env_name == LOCAL_ENV {
      return Ok(loaded);
    }
    self.load_if_exists(with_suffix(path, &env_name), &mut loaded)?;
    self.load_if_exists(with_suffix(path, &format!("{env_name}.{LOCAL_ENV}")), &mut loaded)?;
    Ok(loaded)
  }

  fn load_if_exists(&self, path: PathBuf, loaded: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_file() {
      self.load(&path)?;
      loaded.push(path);
    }
    Ok(())
  }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut name: OsString = path.as_os_str().to_owned();
  name.push(".");
  name.push(suffix);
  PathBuf::from(name)
}

fn populate(values: Vec<(String, String)>) -> Vec<String> {
  let mut loaded = LOADED_VARS.lock();
  let mut set = Vec::with_capacity(values.len());
  for (name, value) in values {
    if env::var_os(&name).is_some() && !loaded.contains(&name) {
      continue;
    }
    env::set_var(&name, &value);
    loaded.insert(name.clone());
    set.push(name);
  }
  set
}
