//! Boots a small project tree: `.env`, `config/*.yaml`, then reads it back
//! through the service locator.

use config_bridge::{locator, ConfigBridge};
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  let project = tempfile::tempdir()?;
  fs::create_dir(project.path().join("config"))?;
  fs::write(
    project.path().join(".env"),
    "DEMO_DATABASE_HOST=db.internal\nDEMO_DATABASE_PORT=5432\nDEMO_DEBUG=off\n",
  )?;
  fs::write(
    project.path().join("config/parameters.yaml"),
    r#"
parameters:
  database.host: '%env(DEMO_DATABASE_HOST)%'
  database.port: '%env(int:DEMO_DATABASE_PORT)%'
  database.url: 'postgres://%database.host%:%database.port%/app'
  app.debug: '%env(bool:DEMO_DEBUG)%'
"#,
  )?;

  let bridge = ConfigBridge::boot(project.path())?;
  println!("compiled parameters: {:?}", bridge.container().parameter_names());

  // Anywhere else in the program:
  let url: String = locator().parameter("database.url")?;
  let debug: bool = locator().parameter("app.debug")?;
  println!("database.url = {url}");
  println!("app.debug    = {debug}");
  Ok(())
}
