//! The main `Container` struct and its associated methods.

use crate::core::{ErasedFactory, ErasedService, Provider, ResolutionGuard};
use crate::error::{Error, Result};
use crate::parameters;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

// Longest alias chain followed before giving up.
const MAX_ALIAS_DEPTH: usize = 32;

/// The Inversion of Control (IoC) container.
///
/// Services and parameters are keyed by string ids. Registration goes through
/// `&self`, so a container can be shared behind an `Arc` while it is being
/// filled. Once [`compile`](Container::compile) has run, parameter
/// placeholders are resolved and the container is frozen: lookups keep
/// working, registrations fail with [`Error::Frozen`].
#[derive(Default)]
pub struct Container {
  services: DashMap<String, Arc<Provider>>,
  aliases: DashMap<String, String>,
  tags: DashMap<String, Vec<String>>,
  parameters: DashMap<String, Value>,
  compiled: AtomicBool,
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("services", &self.service_ids())
      .field("parameters", &self.parameter_names())
      .field("compiled", &self.is_compiled())
      .finish()
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn ensure_mutable(&self, id: &str) -> Result<()> {
    if self.is_compiled() {
      return Err(Error::Frozen(id.to_owned()));
    }
    Ok(())
  }

  fn register(&self, id: &str, provider: Provider) -> Result<()> {
    self.ensure_mutable(id)?;
    debug!(id, kind = provider.kind(), "registering service");
    self.aliases.remove(id);
    self.services.insert(id.to_owned(), Arc::new(provider));
    Ok(())
  }

  fn erase<T: Any + Send + Sync>(
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> ErasedFactory {
    Box::new(move |container| {
      factory(container).map(|value| Box::new(Arc::new(value)) as ErasedService)
    })
  }

  /// Follows aliases until a registered service id is reached.
  fn resolve_id(&self, id: &str) -> Option<String> {
    let mut current = id.to_owned();
    for _ in 0..MAX_ALIAS_DEPTH {
      if self.services.contains_key(&current) {
        return Some(current);
      }
      let next = self.aliases.get(&current)?.value().clone();
      current = next;
    }
    None
  }

  // --- PUBLIC API ---

  // --- Service Registration ---

  /// Registers an already constructed value as a shared service.
  pub fn add_instance<T: Any + Send + Sync>(&self, id: &str, instance: T) -> Result<()> {
    self.add_shared(id, Arc::new(instance))
  }

  /// Registers a shared value that is already behind an `Arc`, including trait objects.
  pub fn add_shared<I: ?Sized + Any + Send + Sync>(&self, id: &str, shared: Arc<I>) -> Result<()> {
    self.register(id, Provider::instance(Box::new(shared)))
  }

  /// Registers a lazily created shared service. The factory runs at most once.
  pub fn add_singleton<T: Any + Send + Sync>(
    &self,
    id: &str,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Result<()> {
    self.register(id, Provider::singleton(Self::erase(factory)))
  }

  /// Registers a service whose factory runs on every lookup.
  pub fn add_transient<T: Any + Send + Sync>(
    &self,
    id: &str,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Result<()> {
    self.register(id, Provider::transient(Self::erase(factory)))
  }

  /// Registers a lazily created shared service resolved as the trait object `I`.
  pub fn add_singleton_trait<I: ?Sized + Any + Send + Sync>(
    &self,
    id: &str,
    factory: impl Fn(&Container) -> Result<Arc<I>> + Send + Sync + 'static,
  ) -> Result<()> {
    let factory: ErasedFactory =
      Box::new(move |container| factory(container).map(|shared| Box::new(shared) as ErasedService));
    self.register(id, Provider::singleton(factory))
  }

  /// Makes `alias` resolve to whatever `target` resolves to.
  pub fn set_alias(&self, alias: &str, target: &str) -> Result<()> {
    self.ensure_mutable(alias)?;
    debug!(alias, target, "registering alias");
    self.services.remove(alias);
    self.aliases.insert(alias.to_owned(), target.to_owned());
    Ok(())
  }

  /// Attaches `tag` to the service `id`. Tagging twice is a no-op.
  pub fn tag(&self, id: &str, tag: &str) -> Result<()> {
    self.ensure_mutable(id)?;
    let mut tags = self.tags.entry(id.to_owned()).or_default();
    if !tags.iter().any(|t| t == tag) {
      tags.push(tag.to_owned());
    }
    Ok(())
  }

  /// Returns the ids of all registered services carrying `tag`, sorted.
  pub fn find_tagged_service_ids(&self, tag: &str) -> Vec<String> {
    let mut ids: Vec<String> = self
      .tags
      .iter()
      .filter(|entry| entry.value().iter().any(|t| t == tag))
      .map(|entry| entry.key().clone())
      .filter(|id| self.services.contains_key(id))
      .collect();
    ids.sort();
    ids
  }

  /// Returns the ids of all registered services (aliases excluded), sorted.
  pub fn service_ids(&self) -> Vec<String> {
    let mut ids: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
    ids.sort();
    ids
  }

  // --- Parameters ---

  /// Sets a parameter. Placeholders in string values are resolved on compile.
  pub fn set_parameter(&self, name: &str, value: impl Into<Value>) -> Result<()> {
    self.ensure_mutable(name)?;
    self.parameters.insert(name.to_owned(), value.into());
    Ok(())
  }

  pub fn has_parameter(&self, name: &str) -> bool {
    self.parameters.contains_key(name)
  }

  /// Returns a parameter value.
  ///
  /// Before compilation the raw, unresolved value is returned.
  pub fn get_parameter(&self, name: &str) -> Result<Value> {
    self
      .parameters
      .get(name)
      .map(|entry| entry.value().clone())
      .ok_or_else(|| Error::ParameterNotFound(name.to_owned()))
  }

  /// Returns a parameter deserialized into `T`.
  pub fn parameter<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
    let value = self.get_parameter(name)?;
    serde_yaml::from_value(value).map_err(|source| Error::ParameterConversion {
      name: name.to_owned(),
      target: type_name::<T>(),
      source,
    })
  }

  pub fn parameter_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.parameters.iter().map(|e| e.key().clone()).collect();
    names.sort();
    names
  }

  // --- Compilation ---

  pub fn is_compiled(&self) -> bool {
    self.compiled.load(Ordering::Acquire)
  }

  /// Resolves parameter placeholders, validates aliases and freezes the container.
  ///
  /// Compiling an already compiled container does nothing.
  pub fn compile(&self) -> Result<()> {
    if self.is_compiled() {
      debug!("container already compiled");
      return Ok(());
    }

    let raw: HashMap<String, Value> = self
      .parameters
      .iter()
      .map(|entry| (entry.key().clone(), entry.value().clone()))
      .collect();
    let resolved = parameters::resolve_all(&raw, &parameters::process_env)?;

    let aliases: Vec<(String, String)> = self
      .aliases
      .iter()
      .map(|entry| (entry.key().clone(), entry.value().clone()))
      .collect();
    for (alias, target) in aliases {
      if self.resolve_id(&alias).is_none() {
        return Err(Error::InvalidAlias { alias, target });
      }
    }

    for (name, value) in resolved {
      self.parameters.insert(name, value);
    }
    self.compiled.store(true, Ordering::Release);

    info!(
      services = self.services.len(),
      aliases = self.aliases.len(),
      parameters = self.parameters.len(),
      "container compiled"
    );
    Ok(())
  }

  // --- Resolution ---

  /// Returns `true` if `id` names a registered service or alias.
  pub fn has(&self, id: &str) -> bool {
    self.resolve_id(id).is_some()
  }

  /// Resolves a service from the container.
  ///
  /// Returns `Ok(None)` if nothing is registered under `id`. Asking for a
  /// different type than the one registered is an [`Error::TypeMismatch`];
  /// a factory that ends up requiring itself is an [`Error::CircularReference`].
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Option<Arc<T>>> {
    let Some(service_id) = self.resolve_id(id) else {
      return Ok(None);
    };
    // Clone the provider out so no map guard is held while factories run.
    let Some(provider) = self.services.get(&service_id).map(|e| Arc::clone(e.value())) else {
      return Ok(None);
    };

    let _guard = ResolutionGuard::enter(self as *const Container as usize, &service_id)?;
    let mismatch = || Error::TypeMismatch {
      id: service_id.clone(),
      requested: type_name::<Arc<T>>(),
    };

    match provider.as_ref() {
      Provider::Singleton { cell, factory } => {
        let service = cell.get_or_try_init(|| match factory {
          Some(factory) => factory(self),
          None => Err(Error::Factory {
            id: service_id.clone(),
            message: "shared instance is missing".to_owned(),
          }),
        })?;
        service
          .downcast_ref::<Arc<T>>()
          .cloned()
          .map(Some)
          .ok_or_else(mismatch)
      }
      Provider::Transient { factory } => factory(self)?
        .downcast::<Arc<T>>()
        .map(|boxed| Some(*boxed))
        .map_err(|_| mismatch()),
    }
  }

  /// Like [`get`](Container::get), but an absent service is an [`Error::ServiceNotFound`].
  pub fn require<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    self
      .get::<T>(id)?
      .ok_or_else(|| Error::ServiceNotFound(id.to_owned()))
  }
}
