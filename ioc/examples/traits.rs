use config_bridge_ioc::{Container, Result};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() -> Result<()> {
  let container = Container::new();

  // The container stores Arc<ConsoleLogger> but serves it as Arc<dyn Logger>.
  container.add_singleton_trait::<dyn Logger>("app.logger", |_| Ok(Arc::new(ConsoleLogger)))?;
  container.set_alias("logger", "app.logger")?;

  // The factory resolves its own dependency through the alias.
  container.add_singleton("report_service", |c| {
    Ok(ReportService {
      logger: c.require::<dyn Logger>("logger")?,
    })
  })?;
  container.compile()?;

  let report_service = container.require::<ReportService>("report_service")?;
  report_service.generate_report();
  Ok(())
}
