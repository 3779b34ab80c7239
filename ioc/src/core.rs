//! Core, non-public data structures for the IoC container.

use crate::container::Container;
use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::cell::RefCell;

thread_local! {
  // The services currently being resolved on this thread, in resolution order,
  // keyed by the resolving container's address and the service id. A repeated
  // key means a factory (indirectly) asked its own container for itself.
  static RESOLVING_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard to detect circular dependencies.
///
/// Entering pushes `(owner, id)` onto the thread-local resolution stack and
/// fails if that pair is already there. The same id resolved through another
/// container is not a cycle. Dropping the guard pops the entry again.
pub(crate) struct ResolutionGuard {
  owner: usize,
  id: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(owner: usize, id: &str) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if stack.iter().any(|(o, resolving)| *o == owner && resolving == id) {
        let mut path: Vec<&str> = stack.iter().map(|(_, resolving)| resolving.as_str()).collect();
        path.push(id);
        return Err(Error::CircularReference {
          id: id.to_owned(),
          path: path.join(" -> "),
        });
      }
      stack.push((owner, id.to_owned()));
      Ok(())
    })?;
    Ok(Self {
      owner,
      id: id.to_owned(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(pos) = stack
        .iter()
        .rposition(|(owner, resolving)| *owner == self.owner && *resolving == self.id)
      {
        stack.remove(pos);
      }
    });
  }
}

/// A type-erased service. The box always holds an `Arc<T>` so that both sized
/// types and trait objects can be downcast back out.
pub(crate) type ErasedService = Box<dyn Any + Send + Sync>;

pub(crate) type ErasedFactory = Box<dyn Fn(&Container) -> Result<ErasedService> + Send + Sync>;

pub(crate) enum Provider {
  Singleton {
    cell: OnceCell<ErasedService>,
    factory: Option<ErasedFactory>,
  },
  Transient {
    factory: ErasedFactory,
  },
}

impl Provider {
  pub(crate) fn instance(service: ErasedService) -> Self {
    Provider::Singleton {
      cell: OnceCell::with_value(service),
      factory: None,
    }
  }

  pub(crate) fn singleton(factory: ErasedFactory) -> Self {
    Provider::Singleton {
      cell: OnceCell::new(),
      factory: Some(factory),
    }
  }

  pub(crate) fn transient(factory: ErasedFactory) -> Self {
    Provider::Transient { factory }
  }

  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Provider::Singleton { .. } => "singleton",
      Provider::Transient { .. } => "transient",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn guard_rejects_reentry_and_reports_path() {
    let _outer = ResolutionGuard::enter(1, "a").unwrap();
    let _inner = ResolutionGuard::enter(1, "b").unwrap();

    match ResolutionGuard::enter(1, "a") {
      Err(Error::CircularReference { id, path }) => {
        assert_eq!(id, "a");
        assert_eq!(path, "a -> b -> a");
      }
      Err(other) => panic!("unexpected error: {other}"),
      Ok(_) => panic!("re-entering `a` must fail"),
    }
  }

  #[test]
  fn guard_pops_on_drop() {
    {
      let _guard = ResolutionGuard::enter(1, "transient.id").unwrap();
    }
    assert!(ResolutionGuard::enter(1, "transient.id").is_ok());
  }

  #[test]
  fn guard_allows_same_id_from_another_owner() {
    let _outer = ResolutionGuard::enter(1, "logger").unwrap();
    assert!(ResolutionGuard::enter(2, "logger").is_ok());
    assert!(matches!(
      ResolutionGuard::enter(1, "logger"),
      Err(Error::CircularReference { .. })
    ));
  }
}
