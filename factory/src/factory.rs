//! The `Factory`: registration, graph resolution and introspection.

use crate::core::ResolutionGuard;
use crate::definition::{DefinitionOption, ObjectDefinition, Scope};
use crate::error::{Error, Result};
use crate::global::default_registry;
use crate::instance::ObjectInstance;
use crate::options::Options;
use crate::registry::ModelRegistry;
use crate::shape::{AnyObject, Object, Shape};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

static NEXT_FACTORY_ID: AtomicUsize = AtomicUsize::new(0);

// A registered definition and, for singletons, its one-shot instance cell.
struct Entry {
  definition: Arc<ObjectDefinition>,
  instance: OnceCell<Arc<ObjectInstance>>,
}

/// Builds named objects from registered definitions and wires their
/// references.
///
/// The factory is thread-safe. Definitions may be registered at any time;
/// each name may be registered once. Singletons are built at most once, on
/// first request, and become visible to other callers only after
/// construction and injection both succeed.
///
/// # Examples
///
/// ```
/// use fibre_factory::{
///   DefinitionOption, Factory, Model, ModelRegistry, Options, Scope, ShapeBuilder,
/// };
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Hub {
///   id: String,
/// }
/// impl Model for Hub {
///   fn describe(shape: &mut ShapeBuilder<Self>) {
///     shape.field("Id");
///   }
/// }
///
/// #[derive(Default)]
/// struct Wheel {
///   hub: Option<Arc<Hub>>,
/// }
/// impl Model for Wheel {
///   fn describe(shape: &mut ShapeBuilder<Self>) {
///     shape.pointer("Hub", |wheel| &mut wheel.hub);
///   }
/// }
///
/// let registry = Arc::new(ModelRegistry::new());
/// registry.register_model::<Hub>(&["hub"]).unwrap();
/// registry.register_model::<Wheel>(&["wheel"]).unwrap();
///
/// let factory = Factory::with_registry(registry);
/// factory
///   .define(
///     "hub",
///     Scope::Prototype,
///     "hub",
///     [DefinitionOption::constructor(|options: &Options| {
///       let id = options.get::<String>("id")?.unwrap_or_default();
///       Ok::<_, fibre_factory::Error>(Hub { id })
///     })],
///   )
///   .unwrap();
/// factory
///   .define(
///     "wheel",
///     Scope::Prototype,
///     "wheel",
///     [DefinitionOption::reference_with_options(
///       "Hub",
///       "hub",
///       Options::new().with("id", "HUB01"),
///     )],
///   )
///   .unwrap();
///
/// let wheel = factory.get::<Wheel>("wheel").unwrap();
/// assert_eq!(wheel.hub.as_ref().unwrap().id, "HUB01");
/// ```
pub struct Factory {
  id: usize,
  registry: Arc<ModelRegistry>,
  definitions: DashMap<String, Arc<Entry>>,
  // alias -> canonical definition name
  aliases: DashMap<String, String>,
  // Serializes registration so duplicate checks and inserts are atomic.
  write_lock: Mutex<()>,
}

impl Default for Factory {
  fn default() -> Self {
    Self::new()
  }
}

impl Factory {
  /// Creates a new, empty `Factory` backed by the default model registry.
  pub fn new() -> Self {
    Self::with_registry(default_registry())
  }

  /// Creates a new, empty `Factory` that resolves model names in `registry`.
  pub fn with_registry(registry: Arc<ModelRegistry>) -> Self {
    Self {
      id: NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed),
      registry,
      definitions: DashMap::new(),
      aliases: DashMap::new(),
      write_lock: Mutex::new(()),
    }
  }

  pub fn registry(&self) -> &Arc<ModelRegistry> {
    &self.registry
  }

  // --- Registration ---

  /// Defines and registers an object built from the model `model_name`.
  pub fn define<I>(&self, name: &str, scope: Scope, model_name: &str, options: I) -> Result<()>
  where
    I: IntoIterator<Item = DefinitionOption>,
  {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptyObjectDefinitionName);
    }
    let model_name = model_name.trim();
    if model_name.is_empty() {
      return Err(Error::EmptyModelName);
    }

    let shape = self
      .registry
      .get(model_name)
      .ok_or_else(|| Error::ModelNotExist {
        name: model_name.to_owned(),
      })?;

    let definition = ObjectDefinition::new(name, scope, shape, options)?;
    self.register_object_definition(definition)
  }

  /// Registers a prepared definition.
  ///
  /// Fails without changing the factory if the name, or one of the
  /// definition's aliases, is already taken.
  pub fn register_object_definition(&self, definition: ObjectDefinition) -> Result<()> {
    let _lock = self.write_lock.lock();

    let name = definition.name();
    if self.definitions.contains_key(name) || self.aliases.contains_key(name) {
      return Err(Error::ObjectDefinitionAlreadyRegistered {
        name: name.to_owned(),
        type_name: definition.shape().to_string(),
      });
    }
    for alias in definition.aliases() {
      if self.definitions.contains_key(alias) {
        return Err(Error::AliasAlreadyRegistered {
          alias: alias.clone(),
          bound_to: alias.clone(),
        });
      }
      if let Some(bound_to) = self.aliases.get(alias) {
        return Err(Error::AliasAlreadyRegistered {
          alias: alias.clone(),
          bound_to: bound_to.value().clone(),
        });
      }
    }

    let name = name.to_owned();
    for alias in definition.aliases() {
      self.aliases.insert(alias.clone(), name.clone());
    }
    debug!(
      name = %name,
      scope = ?definition.scope(),
      type_name = %definition.shape(),
      references = definition.references().len(),
      "registered object definition"
    );
    self.definitions.insert(
      name,
      Arc::new(Entry {
        definition: Arc::new(definition),
        instance: OnceCell::new(),
      }),
    );
    Ok(())
  }

  // --- Resolution ---

  /// Returns the fully wired object registered as `name`.
  pub fn get_object(&self, name: &str) -> Result<Object> {
    self.get_object_with_options(name, &Options::new())
  }

  /// Returns the fully wired object registered as `name`, building it with
  /// `options` if a new instance is needed.
  ///
  /// Options are ignored when a singleton has already been built.
  pub fn get_object_with_options(&self, name: &str, options: &Options) -> Result<Object> {
    let entry = self.entry(name)?;
    self.resolve(&entry, options)
  }

  /// Like [`get_object`](Self::get_object), downcast to `T`.
  pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.get_with_options(name, &Options::new())
  }

  /// Like [`get_object_with_options`](Self::get_object_with_options), downcast to `T`.
  pub fn get_with_options<T: Any + Send + Sync>(
    &self,
    name: &str,
    options: &Options,
  ) -> Result<Arc<T>> {
    self
      .get_object_with_options(name, options)?
      .downcast::<T>()
      .map_err(|_| Error::ObjectTypeMismatch {
        name: name.to_owned(),
        expected: std::any::type_name::<T>().to_owned(),
      })
  }

  fn entry(&self, name: &str) -> Result<Arc<Entry>> {
    if let Some(entry) = self.definitions.get(name) {
      return Ok(Arc::clone(entry.value()));
    }
    let canonical = self.aliases.get(name).map(|canonical| canonical.value().clone());
    canonical
      .and_then(|canonical| self.definitions.get(&canonical).map(|entry| Arc::clone(entry.value())))
      .ok_or_else(|| Error::ObjectDefinitionNotExist {
        name: name.to_owned(),
      })
  }

  fn resolve(&self, entry: &Entry, options: &Options) -> Result<Object> {
    let definition = &entry.definition;

    match definition.scope() {
      Scope::Singleton => {
        if let Some(instance) = entry.instance.get() {
          return Ok(Arc::clone(instance.object()));
        }

        let _guard = ResolutionGuard::enter(self.id, definition.name())?;
        // `get_or_try_init` leaves the cell empty when building fails, so a
        // half-wired object is never published.
        let instance = entry.instance.get_or_try_init(|| {
          let object = self.build(definition, options)?;
          let instance = ObjectInstance::new(object, options.clone(), Arc::clone(definition));
          debug!(name = %definition.name(), id = %instance.id(), "published singleton instance");
          Ok::<_, Error>(Arc::new(instance))
        })?;
        Ok(Arc::clone(instance.object()))
      }
      Scope::Prototype => {
        let _guard = ResolutionGuard::enter(self.id, definition.name())?;
        self.build(definition, options)
      }
    }
  }

  fn build(&self, definition: &ObjectDefinition, options: &Options) -> Result<Object> {
    trace!(name = %definition.name(), scope = ?definition.scope(), "building object");

    let mut object = match definition.constructor() {
      Some(constructor) => constructor(options).map_err(Error::Constructor)?,
      None => definition
        .shape()
        .zero()
        .ok_or_else(|| Error::ObjectMustBeStruct {
          name: definition.shape().type_name().to_owned(),
        })?,
    };

    if Any::type_id(&*object) != definition.shape().type_id() {
      return Err(Error::ObjectTypeMismatch {
        name: definition.name().to_owned(),
        expected: definition.shape().type_name().to_owned(),
      });
    }

    self.inject(definition, &mut *object, options)?;
    Ok(Object::from(object))
  }

  fn inject(
    &self,
    definition: &ObjectDefinition,
    object: &mut AnyObject,
    options: &Options,
  ) -> Result<()> {
    if definition.references().is_empty() {
      return Ok(());
    }
    if definition.shape().fields().is_empty() {
      return Err(Error::CannotSetZeroFieldObject {
        field: definition.references()[0].field_path().to_string(),
      });
    }

    for field_path in definition.resolution_order() {
      let reference = definition
        .reference(field_path)
        .ok_or_else(|| Error::RefOrderContainsNonExistentRef {
          field: field_path.to_owned(),
        })?;
      let target = self.entry(reference.target())?;
      let value = self.resolve(&target, reference.options().unwrap_or(options))?;

      trace!(
        name = %definition.name(),
        field = %field_path,
        target = %reference.target(),
        "injecting reference"
      );
      reference.field_path().inject(&mut *object, value)?;
    }
    Ok(())
  }

  // --- Introspection ---

  pub fn contains_object(&self, name: &str) -> bool {
    self.entry(name).is_ok()
  }

  /// The definition's aliases, plus its canonical name when `name` is an alias.
  pub fn get_aliases(&self, name: &str) -> Result<Vec<String>> {
    let entry = self.entry(name)?;
    let definition = &entry.definition;
    let mut aliases = definition.aliases().to_vec();
    if name != definition.name() {
      aliases.push(definition.name().to_owned());
    }
    Ok(aliases)
  }

  pub fn get_type(&self, name: &str) -> Result<Shape> {
    Ok(self.entry(name)?.definition.shape().clone())
  }

  pub fn get_definition(&self, name: &str) -> Result<Arc<ObjectDefinition>> {
    Ok(Arc::clone(&self.entry(name)?.definition))
  }

  /// The published instance of a singleton, if it has been built.
  pub fn get_instance(&self, name: &str) -> Option<Arc<ObjectInstance>> {
    self.entry(name).ok()?.instance.get().cloned()
  }

  pub fn is_prototype(&self, name: &str) -> bool {
    self
      .entry(name)
      .map(|entry| entry.definition.scope() == Scope::Prototype)
      .unwrap_or(false)
  }

  pub fn is_singleton(&self, name: &str) -> bool {
    self
      .entry(name)
      .map(|entry| entry.definition.scope() == Scope::Singleton)
      .unwrap_or(false)
  }

  /// Whether `shape` describes the type of `name`, pointer or not.
  pub fn is_type_match(&self, name: &str, shape: &Shape) -> bool {
    self
      .entry(name)
      .map(|entry| entry.definition.is_type_match(shape))
      .unwrap_or(false)
  }

  /// Canonical names of all registered definitions.
  pub fn definition_names(&self) -> Vec<String> {
    self.definitions.iter().map(|entry| entry.key().clone()).collect()
  }

  // --- Validation ---

  /// Checks that every reference target exists and that the reference
  /// graph has no cycles.
  pub fn validate(&self) -> Result<()> {
    let mut names = self.definition_names();
    names.sort();

    let mut visited = HashSet::new();
    let mut visiting = Vec::new();
    for name in &names {
      self.visit(name, &mut visited, &mut visiting)?;
    }
    Ok(())
  }

  fn visit(
    &self,
    name: &str,
    visited: &mut HashSet<String>,
    visiting: &mut Vec<String>,
  ) -> Result<()> {
    if let Some(start) = visiting.iter().position(|entry| entry == name) {
      let chain = visiting[start..]
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join(" -> ");
      return Err(Error::CircularReference { chain });
    }
    if visited.contains(name) {
      return Ok(());
    }

    let definition = self.get_definition(name)?;
    visiting.push(definition.name().to_owned());
    for reference in definition.references() {
      let target = self.get_definition(reference.target())?;
      self.visit(target.name(), visited, visiting)?;
    }
    visiting.pop();
    visited.insert(definition.name().to_owned());
    Ok(())
  }
}
