//! Logical model names bound to shapes.

use crate::error::{Error, Result};
use crate::shape::{Model, Shape};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Maps model names and their aliases to [`Shape`]s.
///
/// A model's canonical name is the `std::any::type_name` of its element
/// type; pointer and value shapes of the same struct share one entry.
#[derive(Default)]
pub struct ModelRegistry {
  inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
  models: HashMap<String, Shape>,
  // alias (canonical names included) -> canonical name
  aliases: HashMap<String, String>,
}

impl ModelRegistry {
  /// Creates a new, empty `ModelRegistry`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers the struct `T` under its canonical name and `aliases`.
  pub fn register_model<T: Model>(&self, aliases: &[&str]) -> Result<()> {
    self.register(Shape::of::<T>(), aliases)
  }

  /// Registers `shape` under its canonical name and each of `aliases`.
  ///
  /// Fails if the canonical name is taken, or if an alias is already bound
  /// to a different model. Nothing is recorded on failure.
  pub fn register(&self, shape: Shape, aliases: &[&str]) -> Result<()> {
    let shape = shape.by_value();
    let canonical = shape.type_name().to_owned();

    let mut inner = self.inner.write();

    if let Some(existing) = inner.models.get(&canonical) {
      return Err(Error::ModelAlreadyRegistered {
        name: canonical,
        type_name: existing.type_name().to_owned(),
      });
    }

    let mut bound = Vec::with_capacity(aliases.len());
    for alias in aliases {
      let alias = alias.trim();
      if alias.is_empty() {
        return Err(Error::EmptyModelName);
      }
      if let Some(original) = inner.aliases.get(alias) {
        if *original != canonical {
          return Err(Error::ModelAliasAlreadyExist {
            alias: alias.to_owned(),
            original: original.clone(),
            new: canonical,
          });
        }
      }
      bound.push(alias.to_owned());
    }

    for alias in bound {
      inner.aliases.insert(alias, canonical.clone());
    }
    inner.aliases.insert(canonical.clone(), canonical.clone());
    inner.models.insert(canonical.clone(), shape);

    debug!(model = %canonical, aliases = ?aliases, "registered model");
    Ok(())
  }

  /// Looks up a model by canonical name or alias.
  pub fn get(&self, name: &str) -> Option<Shape> {
    let inner = self.inner.read();
    inner
      .aliases
      .get(name)
      .and_then(|canonical| inner.models.get(canonical))
      .cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.inner.read().aliases.contains_key(name)
  }

  /// Canonical names of all registered models.
  pub fn model_names(&self) -> Vec<String> {
    self.inner.read().models.keys().cloned().collect()
  }
}
