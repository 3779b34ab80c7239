use config_bridge::{locate, locator, Container, ContainerError, Error, ServiceLocator, Value};
use serial_test::serial;
use std::sync::Arc;

// --- Test Fixtures ---

struct TestService {
  name: &'static str,
}

fn compiled_container() -> Arc<Container> {
  let container = Container::new();
  container.set_parameter("test.param", "test_value").unwrap();
  container
    .add_singleton("test.service", |_| Ok(TestService { name: "svc" }))
    .unwrap();
  container.compile().unwrap();
  Arc::new(container)
}

// Resets the global locator even if the test body panics.
struct ResetLocator;
impl Drop for ResetLocator {
  fn drop(&mut self) {
    locator().reset();
  }
}

// --- Tests ---

#[test]
#[serial]
fn test_set_container_returns_same_instance() {
  let _reset = ResetLocator;
  let container = compiled_container();

  locator().set_container(container.clone());

  assert!(Arc::ptr_eq(&container, &locator().container().unwrap()));
}

#[test]
#[serial]
fn test_every_method_fails_before_set() {
  let _reset = ResetLocator;

  assert!(!locator().is_initialized());
  assert!(matches!(locator().container(), Err(Error::NotInitialized)));
  assert!(matches!(locator().get::<TestService>("test.service"), Err(Error::NotInitialized)));
  assert!(matches!(locator().has("test.service"), Err(Error::NotInitialized)));
  assert!(matches!(locator().get_parameter("test.param"), Err(Error::NotInitialized)));
  assert!(matches!(locator().has_parameter("test.param"), Err(Error::NotInitialized)));
  match locator().container() {
    Err(err) => assert_eq!(err.to_string(), "Container has not been set yet."),
    Ok(_) => panic!("an unset locator must not hand out a container"),
  }
}

#[test]
#[serial]
fn test_get_and_has_pass_through() {
  let _reset = ResetLocator;
  let container = compiled_container();
  locator().set_container(container.clone());

  let service = locator().get::<TestService>("test.service").unwrap().unwrap();
  assert_eq!(service.name, "svc");
  let direct = container.get::<TestService>("test.service").unwrap().unwrap();
  assert!(Arc::ptr_eq(&service, &direct));

  assert!(locator().has("test.service").unwrap());
  assert!(!locator().has("non.existent").unwrap());
  assert!(locator().get::<TestService>("non.existent").unwrap().is_none());
}

#[test]
#[serial]
fn test_parameters_pass_through() {
  let _reset = ResetLocator;
  locator().set_container(compiled_container());

  assert_eq!(
    locator().get_parameter("test.param").unwrap(),
    Value::from("test_value")
  );
  assert_eq!(locator().parameter::<String>("test.param").unwrap(), "test_value");
  assert!(locator().has_parameter("test.param").unwrap());
  assert!(!locator().has_parameter("non.existent").unwrap());

  // The container's own error is propagated unchanged.
  assert!(matches!(
    locator().get_parameter("non.existent"),
    Err(Error::Container(ContainerError::ParameterNotFound(name))) if name == "non.existent"
  ));
}

#[test]
#[serial]
fn test_reset_clears_state() {
  let _reset = ResetLocator;
  locator().set_container(compiled_container());
  assert!(locator().is_initialized());

  locator().reset();

  assert!(!locator().is_initialized());
  assert!(matches!(locator().get::<TestService>("test.service"), Err(Error::NotInitialized)));
  assert!(matches!(locator().has_parameter("test.param"), Err(Error::NotInitialized)));
}

#[test]
#[serial]
fn test_second_set_replaces_first() {
  let _reset = ResetLocator;
  let first = compiled_container();
  let second = Arc::new(Container::new());
  second.set_parameter("test.param", "second").unwrap();
  second.compile().unwrap();

  locator().set_container(first);
  locator().set_container(second.clone());

  assert!(Arc::ptr_eq(&second, &locator().container().unwrap()));
  assert_eq!(locator().parameter::<String>("test.param").unwrap(), "second");
  // Nothing from the first container survives.
  assert!(!locator().has("test.service").unwrap());
}

#[test]
#[serial]
fn test_locate_macro() {
  let _reset = ResetLocator;
  locator().set_container(compiled_container());

  let service = locate!(TestService, "test.service");
  assert_eq!(service.name, "svc");

  let missing = std::panic::catch_unwind(|| {
    let _service = locate!(TestService, "non.existent");
  });
  assert!(missing.is_err(), "locate! should have panicked");
}

#[test]
#[serial]
fn test_local_locator_is_isolated_from_global() {
  let _reset = ResetLocator;
  let local = ServiceLocator::new();
  local.set_container(compiled_container());

  assert!(local.is_initialized());
  assert!(local.has("test.service").unwrap());
  assert!(!locator().is_initialized());
}
