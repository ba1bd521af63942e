//! Object definitions: how to build one named object and what to wire into it.

use crate::error::{BoxError, Error, Result};
use crate::options::Options;
use crate::shape::{AnyObject, Object, Shape, Slot, SlotError};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// The lifecycle of objects built from a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
  /// One shared instance per factory, built on first request.
  #[default]
  Singleton,
  /// A fresh instance on every request.
  Prototype,
}

/// A type-erased object constructor.
pub type NewObjectFn = Arc<dyn Fn(&Options) -> Result<Box<AnyObject>, BoxError> + Send + Sync>;

/// A directive applied, in order, while building an [`ObjectDefinition`].
pub enum DefinitionOption {
  /// Builds objects with this function instead of the shape's zero value.
  Constructor(NewObjectFn),
  /// Injects the object named `target` into the field at `field_path`.
  Reference {
    field_path: String,
    target: String,
    options: Option<Options>,
  },
  /// Replaces the resolution order of references. When `checked`, `order`
  /// must name every declared field path exactly once.
  RefOrder { checked: bool, order: Vec<String> },
  /// Records an initializer hook name. The factory does not invoke it.
  Initializer(String),
  /// Registers an additional lookup name for the definition.
  Alias(String),
}

impl DefinitionOption {
  /// Wraps a typed constructor.
  pub fn constructor<T, E, F>(f: F) -> Self
  where
    T: Any + Send + Sync,
    E: Into<BoxError>,
    F: Fn(&Options) -> Result<T, E> + Send + Sync + 'static,
  {
    let erased: NewObjectFn =
      Arc::new(move |options: &Options| -> Result<Box<AnyObject>, BoxError> {
        f(options)
          .map(|object| Box::new(object) as Box<AnyObject>)
          .map_err(Into::into)
      });
    DefinitionOption::Constructor(erased)
  }

  pub fn reference(field_path: impl Into<String>, target: impl Into<String>) -> Self {
    DefinitionOption::Reference {
      field_path: field_path.into(),
      target: target.into(),
      options: None,
    }
  }

  pub fn reference_with_options(
    field_path: impl Into<String>,
    target: impl Into<String>,
    options: Options,
  ) -> Self {
    DefinitionOption::Reference {
      field_path: field_path.into(),
      target: target.into(),
      options: Some(options),
    }
  }

  pub fn ref_order<I, S>(checked: bool, order: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    DefinitionOption::RefOrder {
      checked,
      order: order.into_iter().map(Into::into).collect(),
    }
  }

  pub fn initializer(name: impl Into<String>) -> Self {
    DefinitionOption::Initializer(name.into())
  }

  pub fn alias(name: impl Into<String>) -> Self {
    DefinitionOption::Alias(name.into())
  }

  fn apply(self, definition: &mut ObjectDefinition) -> Result<()> {
    match self {
      DefinitionOption::Constructor(constructor) => {
        definition.constructor = Some(constructor);
        Ok(())
      }
      DefinitionOption::Reference {
        field_path,
        target,
        options,
      } => definition.add_reference(&field_path, &target, options),
      DefinitionOption::RefOrder { checked, order } => definition.set_order(checked, order),
      DefinitionOption::Initializer(name) => {
        definition.initializer = Some(name);
        Ok(())
      }
      DefinitionOption::Alias(alias) => definition.add_alias(&alias),
    }
  }
}

impl fmt::Debug for DefinitionOption {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DefinitionOption::Constructor(_) => f.write_str("Constructor(<function>)"),
      DefinitionOption::Reference {
        field_path,
        target,
        options,
      } => f
        .debug_struct("Reference")
        .field("field_path", field_path)
        .field("target", target)
        .field("options", options)
        .finish(),
      DefinitionOption::RefOrder { checked, order } => f
        .debug_struct("RefOrder")
        .field("checked", checked)
        .field("order", order)
        .finish(),
      DefinitionOption::Initializer(name) => f.debug_tuple("Initializer").field(name).finish(),
      DefinitionOption::Alias(name) => f.debug_tuple("Alias").field(name).finish(),
    }
  }
}

/// A dotted field path resolved against a shape into a chain of field slots.
#[derive(Clone)]
pub struct FieldPath {
  raw: String,
  segments: Vec<Segment>,
}

#[derive(Clone)]
struct Segment {
  name: &'static str,
  slot: Arc<dyn Slot>,
}

impl FieldPath {
  /// Resolves `raw` against `shape`. Every segment must name a pointer field.
  pub(crate) fn resolve(shape: &Shape, raw: &str) -> Result<Self> {
    let names: Vec<&str> = raw.split('.').map(str::trim).collect();
    if names.iter().any(|name| name.is_empty()) {
      return Err(Error::BadFieldName {
        field: raw.to_owned(),
      });
    }

    let mut segments = Vec::with_capacity(names.len());
    let mut current = shape.clone();
    for (i, name) in names.iter().enumerate() {
      let field = current.field(name).ok_or_else(|| Error::FieldNotExist {
        field: raw.to_owned(),
        type_name: current.type_name().to_owned(),
      })?;
      let slot = field
        .slot()
        .cloned()
        .ok_or_else(|| Error::RefFieldShouldBePtr {
          field: raw.to_owned(),
        })?;
      let field_name = field.name();
      if i + 1 < names.len() {
        current = slot.target();
      }
      segments.push(Segment {
        name: field_name,
        slot,
      });
    }

    Ok(Self {
      raw: names.join("."),
      segments,
    })
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// The field names along the path.
  pub fn segments(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.segments.iter().map(|segment| segment.name)
  }

  pub fn depth(&self) -> usize {
    self.segments.len()
  }

  /// Walks `root` along the path and stores `value` in the terminal field.
  ///
  /// Every intermediate pointer must already be populated and exclusively
  /// owned by its parent.
  pub(crate) fn inject(&self, root: &mut AnyObject, value: Object) -> Result<()> {
    let Some((terminal, intermediate)) = self.segments.split_last() else {
      return Err(Error::EmptyFieldName);
    };

    let mut cursor = root;
    for (depth, segment) in intermediate.iter().enumerate() {
      cursor = segment
        .slot
        .descend(cursor)
        .map_err(|err| self.slot_error(depth, err))?;
    }
    terminal
      .slot
      .assign(cursor, value)
      .map_err(|err| self.slot_error(self.segments.len() - 1, err))
  }

  fn slot_error(&self, depth: usize, err: SlotError) -> Error {
    let field = self.segments[..=depth]
      .iter()
      .map(|segment| segment.name)
      .collect::<Vec<_>>()
      .join(".");
    match err {
      SlotError::ParentMismatch => Error::CannotSetFieldOfNilObject { field: self.raw.clone() },
      SlotError::Empty => Error::FieldIsZeroValue {
        field,
        path: self.raw.clone(),
      },
      SlotError::Shared => Error::FieldIsShared {
        field,
        path: self.raw.clone(),
      },
      SlotError::ValueMismatch => Error::RefTypeMismatch {
        field: self.raw.clone(),
        expected: self.segments[depth].slot.target_name().to_owned(),
      },
    }
  }
}

// Trims every segment of a dotted path, matching how `FieldPath` stores it.
fn normalize_path(raw: &str) -> String {
  raw.split('.').map(str::trim).collect::<Vec<_>>().join(".")
}

impl fmt::Display for FieldPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}

impl fmt::Debug for FieldPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("FieldPath").field(&self.raw).finish()
  }
}

/// A declared dependency from a field path to another definition.
#[derive(Debug, Clone)]
pub struct Reference {
  field_path: FieldPath,
  target: String,
  options: Option<Options>,
}

impl Reference {
  pub fn field_path(&self) -> &FieldPath {
    &self.field_path
  }

  /// The name of the referenced definition.
  pub fn target(&self) -> &str {
    &self.target
  }

  /// Options used to resolve the target, if declared.
  pub fn options(&self) -> Option<&Options> {
    self.options.as_ref()
  }
}

/// Describes how to build and wire one named object.
///
/// Immutable once built; the factory owns registered definitions for its
/// whole lifetime.
#[derive(Clone)]
pub struct ObjectDefinition {
  name: String,
  aliases: Vec<String>,
  scope: Scope,
  shape: Shape,
  constructor: Option<NewObjectFn>,
  initializer: Option<String>,
  references: Vec<Reference>,
  order: Vec<String>,
}

impl ObjectDefinition {
  /// Builds a definition of `shape` and applies `options` in order.
  ///
  /// ```
  /// use fibre_factory::{DefinitionOption, Model, ObjectDefinition, Scope, Shape, ShapeBuilder};
  /// use std::sync::Arc;
  ///
  /// #[derive(Default)]
  /// struct Hub;
  /// impl Model for Hub {
  ///   fn describe(_: &mut ShapeBuilder<Self>) {}
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
  /// let definition = ObjectDefinition::new(
  ///   "wheel",
  ///   Scope::Prototype,
  ///   Shape::of::<Wheel>(),
  ///   [DefinitionOption::reference("Hub", "hub")],
  /// )
  /// .unwrap();
  /// assert_eq!(definition.resolution_order().collect::<Vec<_>>(), ["Hub"]);
  /// ```
  pub fn new<I>(name: impl Into<String>, scope: Scope, shape: Shape, options: I) -> Result<Self>
  where
    I: IntoIterator<Item = DefinitionOption>,
  {
    let name = name.into().trim().to_owned();
    if name.is_empty() {
      return Err(Error::EmptyObjectDefinitionName);
    }
    if !shape.is_struct() {
      return Err(Error::ObjectMustBeStruct {
        name: shape.type_name().to_owned(),
      });
    }

    let mut definition = Self {
      name,
      aliases: Vec::new(),
      scope,
      shape,
      constructor: None,
      initializer: None,
      references: Vec::new(),
      order: Vec::new(),
    };
    for option in options {
      option.apply(&mut definition)?;
    }
    Ok(definition)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn aliases(&self) -> &[String] {
    &self.aliases
  }

  pub fn scope(&self) -> Scope {
    self.scope
  }

  pub fn shape(&self) -> &Shape {
    &self.shape
  }

  pub fn constructor(&self) -> Option<&NewObjectFn> {
    self.constructor.as_ref()
  }

  pub fn initializer(&self) -> Option<&str> {
    self.initializer.as_deref()
  }

  /// References in declaration order.
  pub fn references(&self) -> &[Reference] {
    &self.references
  }

  pub fn reference(&self, field_path: &str) -> Option<&Reference> {
    self
      .references
      .iter()
      .find(|reference| reference.field_path.as_str() == field_path)
  }

  /// Field paths in the order references are resolved and injected.
  pub fn resolution_order(&self) -> impl Iterator<Item = &str> + '_ {
    self.order.iter().map(String::as_str)
  }

  /// Whether `shape` describes this definition's type, pointer or not.
  pub fn is_type_match(&self, shape: &Shape) -> bool {
    self.shape.matches(shape)
  }

  fn add_reference(
    &mut self,
    field_path: &str,
    target: &str,
    options: Option<Options>,
  ) -> Result<()> {
    let field_path = field_path.trim();
    if field_path.is_empty() {
      return Err(Error::EmptyFieldName);
    }
    let target = target.trim();
    if target.is_empty() {
      return Err(Error::EmptyRefDefinitionName {
        field: field_path.to_owned(),
      });
    }

    let path = FieldPath::resolve(&self.shape, field_path)?;

    if let Some(existing) = self
      .references
      .iter_mut()
      .find(|reference| reference.field_path.raw == path.raw)
    {
      if existing.target != target {
        return Err(Error::FieldAlreadyReferenced {
          field: path.raw,
          original: existing.target.clone(),
        });
      }
      if options.is_some() {
        existing.options = options;
      }
      return Ok(());
    }

    // An explicit order applied earlier may already list this path.
    if !self.order.contains(&path.raw) {
      self.order.push(path.raw.clone());
    }
    self.references.push(Reference {
      field_path: path,
      target: target.to_owned(),
      options,
    });
    Ok(())
  }

  fn set_order(&mut self, checked: bool, order: Vec<String>) -> Result<()> {
    let mut seen = HashSet::new();
    let order: Vec<String> = order
      .into_iter()
      .map(|field| normalize_path(&field))
      .filter(|field| seen.insert(field.clone()))
      .collect();

    if checked {
      if order.len() != self.references.len() {
        return Err(Error::BadRefOrderLength {
          expected: self.references.len(),
          actual: order.len(),
        });
      }
      if let Some(unknown) = order.iter().find(|field| self.reference(field).is_none()) {
        return Err(Error::RefOrderContainsNonExistentRef {
          field: unknown.clone(),
        });
      }
    }

    self.order = order;
    Ok(())
  }

  fn add_alias(&mut self, alias: &str) -> Result<()> {
    let alias = alias.trim();
    if alias.is_empty() {
      return Err(Error::EmptyAlias {
        name: self.name.clone(),
      });
    }
    if alias != self.name && !self.aliases.iter().any(|existing| existing == alias) {
      self.aliases.push(alias.to_owned());
    }
    Ok(())
  }
}

impl fmt::Display for ObjectDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

impl fmt::Debug for ObjectDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ObjectDefinition")
      .field("name", &self.name)
      .field("aliases", &self.aliases)
      .field("scope", &self.scope)
      .field("shape", &self.shape.to_string())
      .field("constructor", &self.constructor.as_ref().map(|_| "<function>"))
      .field("initializer", &self.initializer)
      .field("references", &self.references)
      .field("order", &self.order)
      .finish()
  }
}
