mod common;

use common::{Car, Hub, Wheel};
use fibre_factory::{
  default_registry, register_model, Error, Factory, Model, ModelRegistry, Scope, Shape,
  ShapeBuilder,
};
use std::sync::Arc;

#[test]
fn test_lookup_by_canonical_name_and_alias() {
  let registry = ModelRegistry::new();
  registry.register_model::<Wheel>(&["wheel", "tyre"]).unwrap();

  let canonical = std::any::type_name::<Wheel>();
  for name in [canonical, "wheel", "tyre"] {
    let shape = registry.get(name).unwrap();
    assert_eq!(shape.type_name(), canonical);
    assert!(shape.is_struct());
    assert!(registry.contains(name));
  }
  assert!(registry.get("hub").is_none());
  assert_eq!(registry.model_names(), vec![canonical.to_string()]);
}

#[test]
fn test_pointer_and_value_share_one_model() {
  let registry = ModelRegistry::new();
  registry.register(Shape::pointer_to::<Hub>(), &["hub"]).unwrap();

  let shape = registry.get("hub").unwrap();
  assert!(!shape.is_pointer());

  let err = registry.register(Shape::of::<Hub>(), &[]).unwrap_err();
  match err {
    Error::ModelAlreadyRegistered { name, .. } => assert_eq!(name, std::any::type_name::<Hub>()),
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_alias_bound_to_other_model_fails_atomically() {
  let registry = ModelRegistry::new();
  registry.register_model::<Hub>(&["part"]).unwrap();

  let err = registry.register_model::<Wheel>(&["wheel", "part"]).unwrap_err();
  match err {
    Error::ModelAliasAlreadyExist { alias, original, new } => {
      assert_eq!(alias, "part");
      assert_eq!(original, std::any::type_name::<Hub>());
      assert_eq!(new, std::any::type_name::<Wheel>());
    }
    other => panic!("unexpected error: {other}"),
  }

  // Nothing from the failed registration is visible.
  assert!(registry.get("wheel").is_none());
  assert!(registry.get(std::any::type_name::<Wheel>()).is_none());
  assert_eq!(registry.get("part").unwrap().type_name(), std::any::type_name::<Hub>());

  // The model can still be registered once the conflict is gone.
  registry.register_model::<Wheel>(&["wheel"]).unwrap();
  assert!(registry.contains("wheel"));
}

#[test]
fn test_define_resolves_model_names() {
  let registry = common::car_registry();
  registry.register(Shape::opaque::<String>(), &["text"]).unwrap();
  let factory = Factory::with_registry(registry);

  let err = factory.define("car", Scope::Prototype, "  ", []).unwrap_err();
  assert!(matches!(err, Error::EmptyModelName));

  let err = factory.define(" ", Scope::Prototype, "car", []).unwrap_err();
  assert!(matches!(err, Error::EmptyObjectDefinitionName));

  let err = factory.define("bike", Scope::Prototype, "bike", []).unwrap_err();
  assert!(matches!(err, Error::ModelNotExist { ref name } if name == "bike"));

  let err = factory.define("label", Scope::Prototype, "text", []).unwrap_err();
  assert!(matches!(err, Error::ObjectMustBeStruct { .. }));

  factory.define("car", Scope::Prototype, "car", []).unwrap();
  assert!(factory.is_type_match("car", &Shape::of::<Car>()));
  assert!(!factory.contains_object("label"));
}

// --- Default registry ---

#[derive(Default)]
struct Beacon {
  _range: u32,
}

impl Model for Beacon {
  fn describe(shape: &mut ShapeBuilder<Self>) {
    shape.field("Range");
  }
}

#[test]
fn test_default_registry_backs_new_factories() {
  register_model::<Beacon>(&["test_default_registry_beacon"]).unwrap();
  assert!(default_registry().contains("test_default_registry_beacon"));

  let factory = Factory::new();
  assert!(Arc::ptr_eq(factory.registry(), &default_registry()));
  factory
    .define("beacon", Scope::Singleton, "test_default_registry_beacon", [])
    .unwrap();
  assert!(factory.get::<Beacon>("beacon").is_ok());

  // An explicit registry does not see the default registry's models.
  let isolated = Factory::with_registry(Arc::new(ModelRegistry::new()));
  let err = isolated
    .define("beacon", Scope::Singleton, "test_default_registry_beacon", [])
    .unwrap_err();
  assert!(matches!(err, Error::ModelNotExist { .. }));
}
