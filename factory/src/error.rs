use thiserror::Error;

/// A boxed error returned by object constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for the `fibre_factory` library.
#[derive(Debug, Error)]
pub enum Error {
  // --- Naming ---
  #[error("empty object definition name")]
  EmptyObjectDefinitionName,

  #[error("model name is empty")]
  EmptyModelName,

  #[error("empty field name")]
  EmptyFieldName,

  #[error("bad field name, field name: {field}")]
  BadFieldName { field: String },

  #[error("ref definition name is empty, field: {field}")]
  EmptyRefDefinitionName { field: String },

  #[error("empty alias, definition: {name}")]
  EmptyAlias { name: String },

  // --- Model registry ---
  #[error("model already registered, name: {name}, type: {type_name}")]
  ModelAlreadyRegistered { name: String, type_name: String },

  #[error("model alias already exist and model name not match, alias: {alias}, original name: {original}, new name: {new}")]
  ModelAliasAlreadyExist {
    alias: String,
    original: String,
    new: String,
  },

  #[error("model of {name} not exist")]
  ModelNotExist { name: String },

  #[error("object must be struct, name: {name}")]
  ObjectMustBeStruct { name: String },

  // --- Registration and lookup ---
  #[error("object definition already registered, name: {name}, type: {type_name}")]
  ObjectDefinitionAlreadyRegistered { name: String, type_name: String },

  #[error("alias already registered, alias: {alias}, bound to: {bound_to}")]
  AliasAlreadyRegistered { alias: String, bound_to: String },

  #[error("object definition not exist, name: {name}")]
  ObjectDefinitionNotExist { name: String },

  // --- Reference declaration ---
  #[error("struct field not exist, field name: {field}, type: {type_name}")]
  FieldNotExist { field: String, type_name: String },

  #[error("ref field should be ptr, field name: {field}")]
  RefFieldShouldBePtr { field: String },

  #[error("field already ref others definition, field: {field}, original ref definition name: {original}")]
  FieldAlreadyReferenced { field: String, original: String },

  #[error("ref order does not equal definition refs, expected {expected}, got {actual}")]
  BadRefOrderLength { expected: usize, actual: usize },

  #[error("ref order contain non exist def ref, name: {field}")]
  RefOrderContainsNonExistentRef { field: String },

  // --- Resolution and injection ---
  #[error("field is zero value, field name: {field}, path: {path}")]
  FieldIsZeroValue { field: String, path: String },

  #[error("field points to a shared object and cannot be descended into, field name: {field}, path: {path}")]
  FieldIsShared { field: String, path: String },

  #[error("object is nil, could not inject field value, field: {field}")]
  CannotSetFieldOfNilObject { field: String },

  #[error("field number is zero, could not inject field value, field: {field}")]
  CannotSetZeroFieldObject { field: String },

  #[error("ref object type does not match field, field: {field}, expected: {expected}")]
  RefTypeMismatch { field: String, expected: String },

  #[error("object type does not match, name: {name}, expected: {expected}")]
  ObjectTypeMismatch { name: String, expected: String },

  #[error("circular reference detected: {chain}")]
  CircularReference { chain: String },

  // --- Options ---
  #[error("option '{key}' could not be converted: {source}")]
  OptionType {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  /// An object constructor failed. Display and source are the constructor's own.
  #[error(transparent)]
  Constructor(BoxError),
}

/// A specialized `Result` type for `fibre_factory` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
