//! Published singleton instances.

use crate::definition::ObjectDefinition;
use crate::options::Options;
use crate::shape::Object;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A fully built singleton together with the metadata it was built from.
///
/// Created once, the first time a singleton definition is resolved, and
/// never replaced afterwards.
pub struct ObjectInstance {
  id: String,
  object: Object,
  options: Options,
  definition: Arc<ObjectDefinition>,
}

impl ObjectInstance {
  pub(crate) fn new(object: Object, options: Options, definition: Arc<ObjectDefinition>) -> Self {
    Self {
      id: Uuid::new_v4().simple().to_string(),
      object,
      options,
      definition,
    }
  }

  /// A unique identifier generated at creation.
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn object(&self) -> &Object {
    &self.object
  }

  /// The options the object was built with.
  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn definition(&self) -> &ObjectDefinition {
    &self.definition
  }
}

impl fmt::Display for ObjectInstance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<name: {}, id: {}, type: {}>",
      self.definition.name(),
      self.id,
      self.definition.shape()
    )
  }
}

impl fmt::Debug for ObjectInstance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ObjectInstance")
      .field("id", &self.id)
      .field("name", &self.definition.name())
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}
