//! # config_bridge
//!
//! Boots a compiled IoC container from `.env` files and YAML configuration,
//! then exposes it in two ways:
//!
//! - **Service locator**: `locator()` gives process-wide read access to the
//!   container for code that cannot receive it as a parameter.
//! - **Attribute injector**: `injector()` fills the `#[inject("id")]` fields
//!   of any `#[derive(Injectable)]` type from the container it holds.
//!
//! Both hold their own reference; `ConfigBridge::boot` wires both to the same
//! compiled container.
//!
//! ## Quick Start
//!
//! ```no_run
//! use config_bridge::{ConfigBridge, Injectable};
//! use std::sync::Arc;
//!
//! #[derive(Default, Injectable)]
//! struct Report {
//!   #[inject("app.title")]
//!   title: Option<Arc<String>>,
//! }
//!
//! fn main() -> config_bridge::Result<()> {
//!   // Loads ./.env and ./config/*.yaml, compiles, enables injection.
//!   let bridge = ConfigBridge::boot(".")?;
//!   let env: String = bridge.container().parameter("app.env")?;
//!   println!("running in {env}");
//!
//!   let report: Report = ConfigBridge::make()?;
//!   println!("{:?}", report.title);
//!   Ok(())
//! }
//! ```

// Lets the derive's `::config_bridge::` paths resolve inside this crate too.
extern crate self as config_bridge;

mod bridge;
pub mod env;
mod error;
mod injector;
mod locator;
mod macros;
mod slot;

pub use bridge::{BootOptions, ConfigBridge, CONFIG_TAG};
pub use config_bridge_ioc::{Container, Value, YamlFileLoader};
pub use config_bridge_macros::Injectable;
pub use env::Dotenv;
pub use error::{Error, Result};
pub use injector::{injector, Injectable, InjectionPoint, Injector, Slot};
pub use locator::{locator, ServiceLocator};
pub use slot::ContainerSlot;

/// The container's own error type, surfaced through [`Error::Container`].
pub use config_bridge_ioc::Error as ContainerError;
