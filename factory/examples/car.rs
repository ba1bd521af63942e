use fibre_factory::{
  register_model, require, DefinitionOption, Factory, Model, Options, Scope, ShapeBuilder,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// --- Models ---
#[derive(Default)]
struct Hub {
  id: String,
}

impl Model for Hub {
  fn describe(shape: &mut ShapeBuilder<Self>) {
    shape.field("Id");
  }
}

#[derive(Default)]
struct Wheel {
  id: String,
  hub: Option<Arc<Hub>>,
}

impl Model for Wheel {
  fn describe(shape: &mut ShapeBuilder<Self>) {
    shape.field("Id").pointer("Hub", |wheel| &mut wheel.hub);
  }
}

#[derive(Default)]
struct Car {
  wheels: [Option<Arc<Wheel>>; 4],
}

impl Model for Car {
  fn describe(shape: &mut ShapeBuilder<Self>) {
    shape
      .pointer("Wheel1", |car| &mut car.wheels[0])
      .pointer("Wheel2", |car| &mut car.wheels[1])
      .pointer("Wheel3", |car| &mut car.wheels[2])
      .pointer("Wheel4", |car| &mut car.wheels[3]);
  }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  // Run with RUST_LOG=fibre_factory=trace to follow resolution.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  register_model::<Hub>(&["hub"])?;
  register_model::<Wheel>(&["wheel"])?;
  register_model::<Car>(&["car"])?;

  let factory = Factory::new();
  factory.define(
    "hub",
    Scope::Prototype,
    "hub",
    [DefinitionOption::constructor(|options: &Options| {
      let id = options.get::<String>("id")?.unwrap_or_default();
      Ok::<_, fibre_factory::Error>(Hub { id })
    })],
  )?;
  factory.define(
    "wheel",
    Scope::Prototype,
    "wheel",
    [DefinitionOption::constructor(|options: &Options| {
      let id = options.get::<String>("id")?.unwrap_or_default();
      Ok::<_, fibre_factory::Error>(Wheel { id, hub: None })
    })],
  )?;

  // Wheels first, then the hub inside each wheel.
  let mut references = Vec::new();
  for i in 1..=4 {
    references.push(DefinitionOption::reference_with_options(
      format!("Wheel{i}"),
      "wheel",
      Options::new().with("id", i.to_string()),
    ));
  }
  for i in 1..=4 {
    references.push(DefinitionOption::reference_with_options(
      format!("Wheel{i}.Hub"),
      "hub",
      Options::new().with("id", format!("HUB0{i}")),
    ));
  }
  factory.define("car", Scope::Prototype, "car", references)?;
  factory.validate()?;

  let car = require!(factory, Car, "car");
  for wheel in car.wheels.iter().flatten() {
    let hub = wheel.hub.as_deref().map_or("-", |hub| hub.id.as_str());
    println!("wheel {} on hub {}", wheel.id, hub);
  }

  Ok(())
}
