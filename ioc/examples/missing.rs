use config_bridge_ioc::{Container, Error};

struct UnregisteredService;

fn main() {
  let container = Container::new();

  // `get` reports absence as `Ok(None)`.
  match container.get::<UnregisteredService>("unregistered") {
    Ok(None) => println!("Correctly received `None` for the missing service."),
    Ok(Some(_)) => panic!("Should not have found the service!"),
    Err(err) => panic!("Unexpected error: {err}"),
  }

  // `require` turns absence into an error.
  match container.require::<UnregisteredService>("unregistered") {
    Err(Error::ServiceNotFound(id)) => println!("`require` failed as expected for \"{id}\"."),
    Err(err) => panic!("Unexpected error: {err}"),
    Ok(_) => panic!("Should not have found the service!"),
  }

  // Parameters behave the same way.
  if let Err(err) = container.get_parameter("app.secret") {
    println!("{err}");
  }
}
