//! Public macros for ergonomic object lookup.

/// Gets a typed object from a factory, panicking if it cannot be built.
///
/// This is intended for wiring code where a missing or malformed definition
/// is a programming error. For a non-panicking version, use
/// [`Factory::get`](crate::Factory::get) directly.
///
/// # Panics
///
/// Panics with the underlying error if the object cannot be resolved or is
/// not of the requested type.
///
/// # Examples
///
/// ```
/// use fibre_factory::{require, Factory, Model, ModelRegistry, Options, Scope, ShapeBuilder};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Clock;
/// impl Model for Clock {
///   fn describe(_: &mut ShapeBuilder<Self>) {}
/// }
///
/// let registry = Arc::new(ModelRegistry::new());
/// registry.register_model::<Clock>(&["clock"]).unwrap();
/// let factory = Factory::with_registry(registry);
/// factory.define("clock", Scope::Singleton, "clock", []).unwrap();
///
/// let a = require!(factory, Clock, "clock");
/// let b = require!(factory, Clock, "clock", &Options::new().with("ignored", true));
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[macro_export]
macro_rules! require {
  // Arm for a plain lookup: require!(factory, Type, "name")
  ($factory:expr, $type:ty, $name:expr) => {
    $factory.get::<$type>($name).unwrap_or_else(|err| {
      panic!(
        "Failed to get required object '{}' as {}: {}",
        $name,
        std::any::type_name::<$type>(),
        err
      )
    })
  };

  // Arm for a lookup with options: require!(factory, Type, "name", &options)
  ($factory:expr, $type:ty, $name:expr, $options:expr) => {
    $factory
      .get_with_options::<$type>($name, $options)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to get required object '{}' as {}: {}",
          $name,
          std::any::type_name::<$type>(),
          err
        )
      })
  };
}
