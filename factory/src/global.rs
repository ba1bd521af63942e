//! The process-wide default model registry.

use crate::error::Result;
use crate::registry::ModelRegistry;
use crate::shape::Model;
use once_cell::sync::Lazy;
use std::sync::Arc;

// Created on first access; backs every `Factory::new()`.
static DEFAULT_REGISTRY: Lazy<Arc<ModelRegistry>> = Lazy::new(|| Arc::new(ModelRegistry::new()));

/// Provides the default model registry.
///
/// Factories built with [`Factory::new`](crate::Factory::new) resolve model
/// names here. Pass an explicit registry to
/// [`Factory::with_registry`](crate::Factory::with_registry) to keep model
/// sets isolated.
pub fn default_registry() -> Arc<ModelRegistry> {
  Arc::clone(&DEFAULT_REGISTRY)
}

/// Registers the struct `T` in the default registry.
///
/// # Examples
///
/// ```
/// use fibre_factory::{register_model, Factory, Model, Scope, ShapeBuilder};
///
/// #[derive(Default)]
/// struct Engine;
///
/// impl Model for Engine {
///   fn describe(_: &mut ShapeBuilder<Self>) {}
/// }
///
/// register_model::<Engine>(&["engine"]).unwrap();
///
/// let factory = Factory::new();
/// factory.define("engine", Scope::Singleton, "engine", []).unwrap();
/// assert!(factory.get::<Engine>("engine").is_ok());
/// ```
pub fn register_model<T: Model>(aliases: &[&str]) -> Result<()> {
  DEFAULT_REGISTRY.register_model::<T>(aliases)
}
