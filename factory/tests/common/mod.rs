#![allow(dead_code)]

use fibre_factory::{DefinitionOption, Model, ModelRegistry, Options, ShapeBuilder};
use std::sync::Arc;

// --- Shared Fixtures ---

#[derive(Debug, Default)]
pub struct Hub {
  pub id: String,
}

impl Model for Hub {
  fn describe(shape: &mut ShapeBuilder<Self>) {
    shape.field("Id");
  }
}

#[derive(Debug, Default)]
pub struct Wheel {
  pub id: String,
  pub hub: Option<Arc<Hub>>,
}

impl Model for Wheel {
  fn describe(shape: &mut ShapeBuilder<Self>) {
    shape.field("Id").pointer("Hub", |wheel| &mut wheel.hub);
  }
}

#[derive(Debug, Default)]
pub struct Car {
  pub name: String,
  pub wheel1: Option<Arc<Wheel>>,
  pub wheel2: Option<Arc<Wheel>>,
  pub wheel3: Option<Arc<Wheel>>,
  pub wheel4: Option<Arc<Wheel>>,
}

impl Model for Car {
  fn describe(shape: &mut ShapeBuilder<Self>) {
    shape
      .field("Name")
      .pointer("Wheel1", |car| &mut car.wheel1)
      .pointer("Wheel2", |car| &mut car.wheel2)
      .pointer("Wheel3", |car| &mut car.wheel3)
      .pointer("Wheel4", |car| &mut car.wheel4);
  }
}

impl Car {
  pub fn wheels(&self) -> [&Arc<Wheel>; 4] {
    [
      self.wheel1.as_ref().unwrap(),
      self.wheel2.as_ref().unwrap(),
      self.wheel3.as_ref().unwrap(),
      self.wheel4.as_ref().unwrap(),
    ]
  }
}

/// A registry holding the car, wheel and hub models under short aliases.
pub fn car_registry() -> Arc<ModelRegistry> {
  let registry = Arc::new(ModelRegistry::new());
  registry.register_model::<Hub>(&["hub"]).unwrap();
  registry.register_model::<Wheel>(&["wheel"]).unwrap();
  registry.register_model::<Car>(&["car"]).unwrap();
  registry
}

pub fn new_hub() -> DefinitionOption {
  DefinitionOption::constructor(|options: &Options| {
    let id = options.get::<String>("id")?.unwrap_or_default();
    Ok::<_, fibre_factory::Error>(Hub { id })
  })
}

pub fn new_wheel() -> DefinitionOption {
  DefinitionOption::constructor(|options: &Options| {
    let id = options.get::<String>("id")?.unwrap_or_default();
    Ok::<_, fibre_factory::Error>(Wheel { id, hub: None })
  })
}

pub fn id(value: &str) -> Options {
  Options::new().with("id", value)
}
