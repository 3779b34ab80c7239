//! Loads parameters and service aliases from YAML files into a [`Container`].
//!
//! A configuration file has up to three top-level sections:
//!
//! ```yaml
//! imports:
//!   - { resource: database.yaml }
//!
//! parameters:
//!   app.env: '%env(APP_ENV)%'
//!   app.debug: '%env(bool:APP_DEBUG)%'
//!
//! services:
//!   mailer: '@app.mailer'
//!   logger: { alias: app.logger }
//! ```

use crate::container::Container;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const YAML_EXTENSION: &str = "yaml";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFileRaw {
  #[serde(default)]
  imports: Option<Vec<ImportRaw>>,
  #[serde(default)]
  parameters: Option<Mapping>,
  #[serde(default)]
  services: Option<BTreeMap<String, ServiceRaw>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportRaw {
  Path(String),
  Resource(ResourceRaw),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceRaw {
  resource: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceRaw {
  Reference(String),
  Alias(AliasRaw),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AliasRaw {
  alias: String,
}

/// Reads YAML configuration files relative to a base directory.
pub struct YamlFileLoader<'a> {
  container: &'a Container,
  directory: PathBuf,
  loading: Vec<PathBuf>,
}

impl<'a> YamlFileLoader<'a> {
  pub fn new(container: &'a Container, directory: impl Into<PathBuf>) -> Self {
    Self {
      container,
      directory: directory.into(),
      loading: Vec::new(),
    }
  }

  /// Loads one file. Relative paths are taken from the loader's directory.
  pub fn load(&mut self, resource: impl AsRef<Path>) -> Result<()> {
    let path = self.directory.join(resource.as_ref());
    self.load_file(&path)
  }

  /// Loads every `*.yaml` file of the loader's directory in file name order.
  /// Hidden files (names starting with `.`) are skipped.
  ///
  /// Returns the files that were loaded.
  pub fn load_directory(&mut self) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(&self.directory).map_err(|source| Error::Io {
      path: self.directory.clone(),
      source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|source| Error::Io {
        path: self.directory.clone(),
        source,
      })?;
      let path = entry.path();
      let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with('.'));
      if !hidden && path.is_file() && path.extension().map_or(false, |ext| ext == YAML_EXTENSION) {
        files.push(path);
      }
    }
    files.sort();

    for file in &files {
      self.load_file(file)?;
    }
    Ok(files)
  }

  fn load_file(&mut self, path: &Path) -> Result<()> {
    let canonical = fs::canonicalize(path).map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    if self.loading.contains(&canonical) {
      warn!(path = %canonical.display(), "skipping circular import");
      return Ok(());
    }

    let text = fs::read_to_string(&canonical).map_err(|source| Error::Io {
      path: canonical.clone(),
      source,
    })?;
    let raw: Option<ConfigFileRaw> = serde_yaml::from_str(&text).map_err(|source| Error::Yaml {
      path: canonical.clone(),
      source,
    })?;
    let raw = raw.unwrap_or_default();

    debug!(path = %canonical.display(), "loading configuration file");
    self.loading.push(canonical.clone());
    let result = self.apply(&canonical, raw);
    self.loading.pop();
    result
  }

  fn apply(&mut self, path: &Path, raw: ConfigFileRaw) -> Result<()> {
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();

    for import in raw.imports.unwrap_or_default() {
      let resource = match import {
        ImportRaw::Path(resource) | ImportRaw::Resource(ResourceRaw { resource }) => resource,
      };
      self.load_file(&base.join(resource))?;
    }

    for (key, value) in raw.parameters.unwrap_or_default() {
      let name = match key {
        Value::String(name) => name,
        other => {
          return Err(Error::InvalidConfig {
            path: path.to_path_buf(),
            message: format!("parameter names must be strings, found {other:?}"),
          })
        }
      };
      self.container.set_parameter(&name, value)?;
    }

    for (id, service) in raw.services.unwrap_or_default() {
      let target = match service {
        ServiceRaw::Alias(AliasRaw { alias }) => alias,
        ServiceRaw::Reference(reference) => match reference.strip_prefix('@') {
          Some(target) => target.to_owned(),
          None => {
            return Err(Error::InvalidConfig {
              path: path.to_path_buf(),
              message: format!(
                "service \"{id}\" must be a reference ('@target') or a mapping with an \"alias\" key"
              ),
            })
          }
        },
      };
      self.container.set_alias(&id, &target)?;
    }
    Ok(())
  }
}
