//! # config_bridge_ioc
//!
//! A thread-safe, string-keyed Inversion of Control container that is filled
//! once and then compiled.
//!
//! ## Core Concepts
//!
//! - **Container**: the registry of services and parameters, keyed by id.
//! - **Providers**: services are registered as instances, lazy singletons,
//!   transients or trait-object singletons. Factories receive the container
//!   and may resolve their own dependencies.
//! - **Parameters**: YAML values that may reference other parameters
//!   (`%name%`) or environment variables (`%env(bool:APP_DEBUG)%`).
//! - **Compilation**: resolves every placeholder, validates aliases and
//!   freezes the container.
//!
//! ## Quick Start
//!
//! ```
//! use config_bridge_ioc::{Container, Result};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!   fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!   message: String,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!   fn greet(&self) -> String {
//!     self.message.clone()
//!   }
//! }
//!
//! fn main() -> Result<()> {
//!   let container = Container::new();
//!   container.set_parameter("greeting", "Hello, %name%!")?;
//!   container.set_parameter("name", "World")?;
//!
//!   container.add_singleton_trait::<dyn Greeter>("greeter", |c| {
//!     let message: String = c.parameter("greeting")?;
//!     Ok(Arc::new(EnglishGreeter { message }))
//!   })?;
//!   container.compile()?;
//!
//!   let greeter = container.require::<dyn Greeter>("greeter")?;
//!   assert_eq!(greeter.greet(), "Hello, World!");
//!   Ok(())
//! }
//! ```

mod container;
mod core;
mod error;
mod loader;
mod parameters;

pub use container::Container;
pub use error::{Error, Result};
pub use loader::YamlFileLoader;
pub use serde_yaml::Value;
