//! End-to-end flows: env files and YAML through to the locator and injector.

use config_bridge::{injector, locate, locator, ConfigBridge, Injectable, Value};
use serial_test::serial;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Debug, PartialEq)]
struct AppConfig {
  env: String,
  debug: bool,
}

#[derive(Default, Injectable)]
struct Dashboard {
  #[inject("app.config")]
  config: Option<Arc<AppConfig>>,
}

struct ResetGlobals;
impl Drop for ResetGlobals {
  fn drop(&mut self) {
    locator().reset();
    injector().reset();
  }
}

fn project() -> TempDir {
  let dir = TempDir::new().unwrap();
  fs::create_dir(dir.path().join("config")).unwrap();
  fs::write(
    dir.path().join(".env"),
    "INTEGRATION_APP_ENV=production\nINTEGRATION_APP_DEBUG=false\n",
  )
  .unwrap();
  fs::write(
    dir.path().join("config/services.yaml"),
    "parameters:\n  app.env: '%env(INTEGRATION_APP_ENV)%'\n  app.debug: '%env(bool:INTEGRATION_APP_DEBUG)%'\n",
  )
  .unwrap();
  dir
}

#[test]
#[serial]
fn test_full_integration_with_boot() {
  let _reset = ResetGlobals;
  let dir = project();

  let bridge = ConfigBridge::boot(dir.path()).unwrap();

  // Container parameters.
  assert_eq!(
    bridge.container().get_parameter("app.env").unwrap(),
    Value::from("production")
  );
  assert_eq!(
    bridge.container().get_parameter("app.debug").unwrap(),
    Value::Bool(false)
  );

  // The locator sees the same values.
  assert_eq!(locator().parameter::<String>("app.env").unwrap(), "production");
  assert!(!locator().parameter::<bool>("app.debug").unwrap());
}

#[test]
#[serial]
fn test_manual_configuration_flow() {
  let _reset = ResetGlobals;
  let dir = project();

  let bridge = ConfigBridge::new(dir.path());
  bridge.load_env(None).unwrap();
  bridge.load_config(dir.path().join("config")).unwrap();
  bridge
    .add_configuration(
      AppConfig {
        env: std::env::var("INTEGRATION_APP_ENV").unwrap(),
        debug: false,
      },
      Some("app.config"),
    )
    .unwrap();
  bridge.compile().unwrap();

  // Environment variables.
  assert_eq!(std::env::var("INTEGRATION_APP_ENV").unwrap(), "production");
  assert_eq!(std::env::var("INTEGRATION_APP_DEBUG").unwrap(), "false");

  // The configuration object.
  let config = bridge.get::<AppConfig>("app.config").unwrap().unwrap();
  assert_eq!(config.env, "production");

  // The locator, registered by compile().
  assert!(locator().has("app.config").unwrap());
  let located = locate!(AppConfig, "app.config");
  assert!(Arc::ptr_eq(&config, &located));
}

#[test]
#[serial]
fn test_boot_then_inject_from_factory() {
  let _reset = ResetGlobals;
  let dir = project();

  // Register a factory-built service before compiling, then wire the globals by hand.
  let bridge = ConfigBridge::new(dir.path());
  bridge.load_env(None).unwrap();
  bridge.load_config(dir.path().join("config")).unwrap();
  bridge
    .container()
    .add_singleton("app.config", |c| {
      Ok(AppConfig {
        env: c.parameter("app.env")?,
        debug: c.parameter("app.debug")?,
      })
    })
    .unwrap();
  let compiled = bridge.compile().unwrap();
  injector().set_container(compiled);

  let dashboard: Dashboard = ConfigBridge::make().unwrap();

  assert_eq!(
    dashboard.config.as_deref(),
    Some(&AppConfig {
      env: "production".to_string(),
      debug: false,
    })
  );
}
