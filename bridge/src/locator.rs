//! The process-wide service locator.

use crate::error::Result;
use crate::slot::ContainerSlot;
use config_bridge_ioc::{Container, Value};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

// The one and only global locator instance.
static GLOBAL_LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);

/// Provides a reference to the global service locator.
///
/// The locator gives code that cannot receive the container as a parameter
/// read access to the one compiled container. It is meant to be set once at
/// startup (see `ConfigBridge::boot`); later `set_container` calls replace
/// the reference and exist for test teardown.
///
/// # Examples
///
/// ```
/// use config_bridge::{locator, Container};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.set_parameter("app.env", "test").unwrap();
/// container.compile().unwrap();
///
/// locator().set_container(Arc::new(container));
/// assert!(locator().has_parameter("app.env").unwrap());
/// # locator().reset();
/// ```
pub fn locator() -> &'static ServiceLocator {
  &GLOBAL_LOCATOR
}

/// Read access to a container stored in a [`ContainerSlot`].
///
/// Every method except [`set_container`](Self::set_container),
/// [`reset`](Self::reset) and [`is_initialized`](Self::is_initialized) fails
/// with [`Error::NotInitialized`](crate::Error::NotInitialized) until a
/// container has been set.
#[derive(Default)]
pub struct ServiceLocator {
  slot: ContainerSlot,
}

impl ServiceLocator {
  /// Creates a locator with an empty slot, independent of the global one.
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores `container`, replacing any previous one.
  pub fn set_container(&self, container: Arc<Container>) {
    if self.slot.set(container).is_some() {
      debug!("service locator container replaced");
    } else {
      debug!("service locator container set");
    }
  }

  /// Returns the stored container (the same `Arc`, not a copy).
  pub fn container(&self) -> Result<Arc<Container>> {
    self.slot.get()
  }

  /// Resolves a service. `Ok(None)` exactly when the container has nothing under `id`.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Option<Arc<T>>> {
    Ok(self.container()?.get::<T>(id)?)
  }

  /// Resolves a service that must exist.
  pub fn require<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    Ok(self.container()?.require::<T>(id)?)
  }

  pub fn has(&self, id: &str) -> Result<bool> {
    Ok(self.container()?.has(id))
  }

  pub fn get_parameter(&self, name: &str) -> Result<Value> {
    Ok(self.container()?.get_parameter(name)?)
  }

  /// Returns a parameter deserialized into `T`.
  pub fn parameter<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
    Ok(self.container()?.parameter::<T>(name)?)
  }

  pub fn has_parameter(&self, name: &str) -> Result<bool> {
    Ok(self.container()?.has_parameter(name))
  }

  pub fn is_initialized(&self) -> bool {
    self.slot.is_set()
  }

  /// Clears the stored container. Intended for test teardown.
  pub fn reset(&self) {
    if self.slot.reset().is_some() {
      debug!("service locator reset");
    }
  }
}
