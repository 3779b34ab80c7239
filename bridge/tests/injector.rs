use config_bridge::{injector, Container, ContainerError, Error, Injectable, InjectionPoint, Injector};
use serial_test::serial;
use std::sync::Arc;

// --- Test Fixtures ---

trait Mailer: Send + Sync {
  fn transport(&self) -> &'static str;
}

struct SmtpMailer;
impl Mailer for SmtpMailer {
  fn transport(&self) -> &'static str {
    "smtp"
  }
}

#[derive(Debug)]
struct Instance(&'static str);

#[derive(Default, Injectable)]
struct Target {
  #[inject("svc.a")]
  a: Option<Arc<Instance>>,
  b: Option<Arc<Instance>>,
}

#[derive(Default, Injectable)]
struct Newsletter {
  #[inject(service = "app.mailer")]
  mailer: Option<Arc<dyn Mailer>>,
  #[inject("app.sender")]
  sender: Option<Arc<String>>,
  sent: usize,
}

#[derive(Default, Injectable)]
struct MissingDependency {
  #[inject("svc.a")]
  first: Option<Arc<Instance>>,
  #[inject("svc.missing")]
  second: Option<Arc<Instance>>,
}

#[derive(Injectable)]
struct ArcSlot {
  #[inject("app.sender")]
  sender: Arc<String>,
}

#[derive(Default, Injectable)]
struct RawIdentifier {
  #[inject("svc.a")]
  r#type: Option<Arc<Instance>>,
}

#[derive(Default, Injectable)]
struct Generic<T: Send + Sync + 'static> {
  #[inject("svc.a")]
  a: Option<Arc<Instance>>,
  payload: Option<T>,
}

#[derive(Default, Injectable)]
#[allow(dead_code)]
struct NoMarkers {
  value: u32,
}

fn container_with(a: &'static str) -> Arc<Container> {
  let container = Container::new();
  container.add_instance("svc.a", Instance(a)).unwrap();
  container
    .add_singleton_trait::<dyn Mailer>("app.mailer", |_| Ok(Arc::new(SmtpMailer)))
    .unwrap();
  container
    .add_instance("app.sender", String::from("news@example.com"))
    .unwrap();
  container.compile().unwrap();
  Arc::new(container)
}

// --- Tests ---

#[test]
fn test_derive_builds_injection_plan() {
  assert_eq!(Target::injection_points(), &[InjectionPoint::new("a", "svc.a")]);
  assert_eq!(
    Newsletter::injection_points(),
    &[
      InjectionPoint::new("mailer", "app.mailer"),
      InjectionPoint::new("sender", "app.sender"),
    ]
  );
  assert_eq!(RawIdentifier::injection_points()[0].field(), "type");
  assert!(NoMarkers::injection_points().is_empty());
}

#[test]
fn test_marked_field_is_injected_and_unmarked_is_untouched() {
  let injector = Injector::new();
  let container = container_with("X");
  injector.set_container(container.clone());

  let untouched = Arc::new(Instance("original"));
  let mut target = Target {
    a: None,
    b: Some(untouched.clone()),
  };
  injector.inject(&mut target).unwrap();

  let expected = container.require::<Instance>("svc.a").unwrap();
  assert!(Arc::ptr_eq(target.a.as_ref().unwrap(), &expected));
  assert!(Arc::ptr_eq(target.b.as_ref().unwrap(), &untouched));
}

#[test]
fn test_trait_objects_and_private_fields() {
  let injector = Injector::new();
  injector.set_container(container_with("X"));

  let newsletter: Newsletter = injector.make().unwrap();

  assert_eq!(newsletter.mailer.as_ref().unwrap().transport(), "smtp");
  assert_eq!(newsletter.sender.as_deref().map(String::as_str), Some("news@example.com"));
  assert_eq!(newsletter.sent, 0);
}

#[test]
fn test_missing_service_fails_without_rollback() {
  let injector = Injector::new();
  injector.set_container(container_with("X"));

  let mut target = MissingDependency::default();
  let err = injector.inject(&mut target).unwrap_err();

  match err {
    Error::UnresolvedService { field, service, .. } => {
      assert_eq!(field, "second");
      assert_eq!(service, "svc.missing");
    }
    other => panic!("unexpected error: {other}"),
  }
  // The earlier field keeps its value; the failing one was not silently left empty.
  assert_eq!(target.first.as_ref().unwrap().0, "X");
  assert!(target.second.is_none());
}

#[test]
fn test_wrong_type_is_a_container_error() {
  let container = Container::new();
  container.add_instance("svc.a", 42_u32).unwrap();
  let injector = Injector::new();
  injector.set_container(Arc::new(container));

  assert!(matches!(
    injector.make::<Target>(),
    Err(Error::Container(ContainerError::TypeMismatch { .. }))
  ));
}

#[test]
fn test_second_container_wins_on_reinjection() {
  let injector = Injector::new();
  let mut target = Target::default();

  injector.set_container(container_with("first"));
  injector.inject(&mut target).unwrap();
  assert_eq!(target.a.as_ref().unwrap().0, "first");

  injector.set_container(container_with("second"));
  injector.inject(&mut target).unwrap();
  assert_eq!(target.a.as_ref().unwrap().0, "second");
}

#[test]
fn test_arc_slot_is_replaced() {
  let injector = Injector::new();
  injector.set_container(container_with("X"));

  let mut target = ArcSlot {
    sender: Arc::new(String::from("placeholder")),
  };
  injector.inject(&mut target).unwrap();

  assert_eq!(*target.sender, "news@example.com");
}

#[test]
fn test_raw_identifiers_and_generics() {
  let injector = Injector::new();
  injector.set_container(container_with("X"));

  let raw: RawIdentifier = injector.make().unwrap();
  assert_eq!(raw.r#type.as_ref().unwrap().0, "X");

  let generic: Generic<u8> = injector.make().unwrap();
  assert_eq!(generic.a.as_ref().unwrap().0, "X");
  assert!(generic.payload.is_none());
}

#[test]
fn test_transients_are_resolved_on_every_call() {
  let container = Container::new();
  container
    .add_transient("svc.a", |_| Ok(Instance("fresh")))
    .unwrap();
  let injector = Injector::new();
  injector.set_container(Arc::new(container));

  let mut target = Target::default();
  injector.inject(&mut target).unwrap();
  let first = target.a.clone().unwrap();
  injector.inject(&mut target).unwrap();

  assert!(!Arc::ptr_eq(&first, target.a.as_ref().unwrap()));
}

#[test]
#[serial]
fn test_global_injector_lifecycle() {
  injector().reset();
  assert!(!injector().is_enabled());
  assert!(matches!(
    injector().make::<Target>(),
    Err(Error::NotInitialized)
  ));

  injector().set_container(container_with("global"));
  let target: Target = injector().make().unwrap();
  assert_eq!(target.a.as_ref().unwrap().0, "global");

  injector().reset();
  assert!(matches!(
    injector().inject(&mut Target::default()),
    Err(Error::NotInitialized)
  ));
}

#[test]
#[serial]
fn test_injector_and_locator_are_independent() {
  use config_bridge::locator;

  injector().reset();
  locator().reset();

  locator().set_container(container_with("locator only"));
  assert!(!injector().is_enabled());
  assert!(matches!(injector().make::<Target>(), Err(Error::NotInitialized)));

  injector().set_container(container_with("injector"));
  locator().reset();
  assert!(injector().is_enabled());
  assert_eq!(injector().make::<Target>().unwrap().a.unwrap().0, "injector");

  injector().reset();
}
