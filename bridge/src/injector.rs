//! Attribute-driven field injection.
//!
//! A type opts in by implementing [`Injectable`], normally through
//! `#[derive(Injectable)]`. The derive reads the `#[inject("service.id")]`
//! markers on its fields and generates:
//!
//! - a static list of [`InjectionPoint`]s, the per-type resolution plan, and
//! - one setter per marked field, dispatched by [`Injectable::inject_point`].
//!
//! The [`Injector`] walks the plan and resolves every point from the container
//! it holds. Its container reference is separate from the service locator's.

use crate::error::{Error, Result};
use crate::slot::ContainerSlot;
use config_bridge_ioc::Container;
use once_cell::sync::Lazy;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, trace};

// The one and only global injector instance.
static GLOBAL_INJECTOR: Lazy<Injector> = Lazy::new(Injector::new);

/// Provides a reference to the global injector.
pub fn injector() -> &'static Injector {
  &GLOBAL_INJECTOR
}

/// A marked field and the service it is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionPoint {
  field: &'static str,
  service: &'static str,
}

impl InjectionPoint {
  pub const fn new(field: &'static str, service: &'static str) -> Self {
    Self { field, service }
  }

  pub fn field(&self) -> &'static str {
    self.field
  }

  pub fn service(&self) -> &'static str {
    self.service
  }
}

/// A type whose marked fields can be filled from a container.
pub trait Injectable {
  /// The marked fields of this type, in declaration order.
  fn injection_points() -> &'static [InjectionPoint];

  /// Resolves `point` from `container` and writes it into the matching field.
  ///
  /// Points that do not name a marked field are ignored.
  fn inject_point(&mut self, point: &InjectionPoint, container: &Container) -> Result<()>;
}

/// A field type the injector can write a resolved service into.
pub trait Slot {
  fn fill(
    &mut self,
    container: &Container,
    target: &'static str,
    point: &InjectionPoint,
  ) -> Result<()>;
}

fn resolve<T: ?Sized + Any + Send + Sync>(
  container: &Container,
  target: &'static str,
  point: &InjectionPoint,
) -> Result<Arc<T>> {
  container
    .get::<T>(point.service)?
    .ok_or_else(|| Error::UnresolvedService {
      target,
      field: point.field,
      service: point.service.to_owned(),
    })
}

impl<T: ?Sized + Any + Send + Sync> Slot for Option<Arc<T>> {
  fn fill(
    &mut self,
    container: &Container,
    target: &'static str,
    point: &InjectionPoint,
  ) -> Result<()> {
    *self = Some(resolve::<T>(container, target, point)?);
    Ok(())
  }
}

impl<T: ?Sized + Any + Send + Sync> Slot for Arc<T> {
  fn fill(
    &mut self,
    container: &Container,
    target: &'static str,
    point: &InjectionPoint,
  ) -> Result<()> {
    *self = resolve::<T>(container, target, point)?;
    Ok(())
  }
}

/// Fills [`Injectable`] targets from the container it holds.
#[derive(Default)]
pub struct Injector {
  slot: ContainerSlot,
}

impl Injector {
  /// Creates an injector with no container, independent of the global one.
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores the container used by later `inject` calls, replacing any previous one.
  pub fn set_container(&self, container: Arc<Container>) {
    self.slot.set(container);
    debug!("injector container set");
  }

  /// Resolves every marked field of `target`.
  ///
  /// Nothing is cached between calls, so each call reflects the current
  /// container. When a service is missing the call stops with
  /// [`Error::UnresolvedService`]; fields assigned before the failing one
  /// keep their new values.
  pub fn inject<T: Injectable>(&self, target: &mut T) -> Result<()> {
    let container = self.slot.get()?;
    for point in T::injection_points() {
      trace!(field = point.field, service = point.service, "injecting field");
      target.inject_point(point, &container)?;
    }
    Ok(())
  }

  /// Default-constructs a `T` and injects it.
  pub fn make<T: Injectable + Default>(&self) -> Result<T> {
    let mut instance = T::default();
    self.inject(&mut instance)?;
    Ok(instance)
  }

  /// Returns `true` once a container has been set.
  pub fn is_enabled(&self) -> bool {
    self.slot.is_set()
  }

  /// Clears the stored container. Intended for test teardown.
  pub fn reset(&self) {
    self.slot.reset();
  }
}
