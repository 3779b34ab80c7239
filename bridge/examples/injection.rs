//! Field injection with `#[derive(Injectable)]`.

use config_bridge::{injector, Container, Injectable};
use std::sync::Arc;

trait Mailer: Send + Sync {
  fn send(&self, to: &str, body: &str) -> String;
}

struct SmtpMailer {
  host: String,
}

impl Mailer for SmtpMailer {
  fn send(&self, to: &str, body: &str) -> String {
    format!("[{}] to {}: {}", self.host, to, body)
  }
}

#[derive(Default, Injectable)]
struct WelcomeFlow {
  #[inject("app.mailer")]
  mailer: Option<Arc<dyn Mailer>>,
  // Not marked: the injector leaves it alone.
  sent: usize,
}

impl WelcomeFlow {
  fn run(&mut self, user: &str) -> Option<String> {
    let receipt = self.mailer.as_ref()?.send(user, "welcome aboard");
    self.sent += 1;
    Some(receipt)
  }
}

fn main() -> config_bridge::Result<()> {
  let container = Container::new();
  container.set_parameter("mailer.host", "smtp.example.com")?;
  container.add_singleton_trait::<dyn Mailer>("app.mailer", |c| {
    Ok(Arc::new(SmtpMailer {
      host: c.parameter("mailer.host")?,
    }))
  })?;
  container.compile()?;
  injector().set_container(Arc::new(container));

  for point in WelcomeFlow::injection_points() {
    println!("{} <- {}", point.field(), point.service());
  }

  let mut flow: WelcomeFlow = injector().make()?;
  if let Some(receipt) = flow.run("ada@example.com") {
    println!("{receipt}");
  }
  println!("sent {} message(s)", flow.sent);
  Ok(())
}
