//! A guarded, replaceable reference to a compiled container.

use crate::error::{Error, Result};
use config_bridge_ioc::Container;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds at most one container reference.
///
/// Setting replaces the previous reference (last write wins). Readers get a
/// clone of the `Arc`, never a copy of the container.
#[derive(Default)]
pub struct ContainerSlot {
  inner: RwLock<Option<Arc<Container>>>,
}

impl ContainerSlot {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores `container`, returning the reference it replaced.
  pub fn set(&self, container: Arc<Container>) -> Option<Arc<Container>> {
    self.inner.write().replace(container)
  }

  pub fn get(&self) -> Result<Arc<Container>> {
    self.inner.read().clone().ok_or(Error::NotInitialized)
  }

  /// Empties the slot, returning the reference it held.
  pub fn reset(&self) -> Option<Arc<Container>> {
    self.inner.write().take()
  }

  pub fn is_set(&self) -> bool {
    self.inner.read().is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_slot_is_not_initialized() {
    let slot = ContainerSlot::new();
    assert!(!slot.is_set());
    assert!(matches!(slot.get(), Err(Error::NotInitialized)));
  }

  #[test]
  fn set_replaces_and_reset_clears() {
    let slot = ContainerSlot::new();
    let first = Arc::new(Container::new());
    let second = Arc::new(Container::new());

    assert!(slot.set(first.clone()).is_none());
    let replaced = slot.set(second.clone()).unwrap();
    assert!(Arc::ptr_eq(&replaced, &first));
    assert!(Arc::ptr_eq(&slot.get().unwrap(), &second));

    let cleared = slot.reset().unwrap();
    assert!(Arc::ptr_eq(&cleared, &second));
    assert!(matches!(slot.get(), Err(Error::NotInitialized)));
  }
}
