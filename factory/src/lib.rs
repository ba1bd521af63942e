//! # Fibre Factory
//!
//! A thread-safe object factory that builds named objects from declarative
//! definitions and wires references between them.
//!
//! A definition names a struct shape, a lifecycle scope, an optional
//! constructor, and an ordered list of references. Each reference injects
//! another definition's object into a field of this one, possibly through a
//! nested field path such as `"Wheel1.Hub"`.
//!
//! ## Core Concepts
//!
//! - **Model**: a struct implementing [`Model`], whose description lists its
//!   fields. Pointer fields (`Option<Arc<T>>`) can receive references.
//! - **Model Registry**: maps logical model names and aliases to shapes; a
//!   process-wide default is available via [`default_registry`].
//! - **Definition**: a named [`ObjectDefinition`], built from
//!   [`DefinitionOption`]s and validated against its shape once.
//! - **Scope**: [`Scope::Singleton`] objects are built once and shared;
//!   [`Scope::Prototype`] objects are built fresh on every request.
//! - **Factory**: owns definitions and the singleton cache, and resolves
//!   the reference graph on [`Factory::get_object`].
//!
//! ## Quick Start
//!
//! ```
//! use fibre_factory::{
//!   DefinitionOption, Factory, Model, ModelRegistry, Options, Scope, ShapeBuilder,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Engine {
//!   power: u32,
//! }
//!
//! impl Model for Engine {
//!   fn describe(shape: &mut ShapeBuilder<Self>) {
//!     shape.field("Power");
//!   }
//! }
//!
//! #[derive(Default)]
//! struct Car {
//!   engine: Option<Arc<Engine>>,
//! }
//!
//! impl Model for Car {
//!   fn describe(shape: &mut ShapeBuilder<Self>) {
//!     shape.pointer("Engine", |car| &mut car.engine);
//!   }
//! }
//!
//! let registry = Arc::new(ModelRegistry::new());
//! registry.register_model::<Engine>(&["engine"]).unwrap();
//! registry.register_model::<Car>(&["car"]).unwrap();
//!
//! let factory = Factory::with_registry(registry);
//! factory
//!   .define(
//!     "engine",
//!     Scope::Singleton,
//!     "engine",
//!     [DefinitionOption::constructor(|options: &Options| {
//!       let power = options.get::<u32>("power")?.unwrap_or(90);
//!       Ok::<_, fibre_factory::Error>(Engine { power })
//!     })],
//!   )
//!   .unwrap();
//! factory
//!   .define("car", Scope::Prototype, "car", [DefinitionOption::reference("Engine", "engine")])
//!   .unwrap();
//!
//! let first = factory.get::<Car>("car").unwrap();
//! let second = factory.get::<Car>("car").unwrap();
//!
//! // Two cars, one shared engine.
//! assert!(!Arc::ptr_eq(&first, &second));
//! assert!(Arc::ptr_eq(
//!   first.engine.as_ref().unwrap(),
//!   second.engine.as_ref().unwrap()
//! ));
//! assert_eq!(first.engine.as_ref().unwrap().power, 90);
//! ```

mod core;
mod definition;
mod error;
mod factory;
mod global;
mod instance;
mod macros;
mod options;
mod registry;
mod shape;

pub use definition::{DefinitionOption, FieldPath, NewObjectFn, ObjectDefinition, Reference, Scope};
pub use error::{BoxError, Error, Result};
pub use factory::Factory;
pub use global::{default_registry, register_model};
pub use instance::ObjectInstance;
pub use options::Options;
pub use registry::ModelRegistry;
pub use shape::{Addressing, AnyObject, Field, Model, Object, Shape, ShapeBuilder};
