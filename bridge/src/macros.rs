//! Public macros for ergonomic service resolution.

/// Resolves a service from the global service locator.
///
/// This macro is meant for call sites that cannot receive the container as a
/// parameter and treat a missing service as a programming error.
///
/// # Panics
///
/// Panics if the locator has no container, if nothing is registered under the
/// id, or if the service has another type. For a non-panicking version, use
/// `locator().get(...)` directly.
///
/// # Examples
///
/// ```
/// use config_bridge::{locate, locator, Container};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let container = Container::new();
/// container.add_instance("message", String::from("hello")).unwrap();
/// container.add_singleton_trait::<dyn Greeter>("greeter", |_| Ok(Arc::new(EnglishGreeter))).unwrap();
/// locator().set_container(Arc::new(container));
///
/// let message = locate!(String, "message");
/// assert_eq!(*message, "hello");
///
/// let greeter = locate!(trait Greeter, "greeter");
/// assert_eq!(greeter.greet(), "Hello!");
/// # locator().reset();
/// ```
#[macro_export]
macro_rules! locate {
    // Arm for resolving a trait object: locate!(trait MyTrait, "id")
    // `:ident` captures the trait's name so `dyn` can be prepended here.
    (trait $trait_ident:ident, $id:expr) => {
        $crate::locator()
            .require::<dyn $trait_ident>($id)
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to locate required trait service '{}' ({}): {}",
                    $id,
                    std::any::type_name::<dyn $trait_ident>(),
                    err
                )
            })
    };

    // Arm for resolving a concrete type: locate!(MyService, "id")
    ($type:ty, $id:expr) => {
        $crate::locator()
            .require::<$type>($id)
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to locate required service '{}' ({}): {}",
                    $id,
                    std::any::type_name::<$type>(),
                    err
                )
            })
    };
}
