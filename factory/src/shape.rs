//! Structural type descriptors and the field slots used for injection.
//!
//! A [`Shape`] is built once per type from its [`Model`] description and
//! carries, for every pointer field, a type-erased slot that can descend into
//! the pointee or assign a new pointee. Field paths are resolved against a
//! shape at definition time, so injection never looks fields up by name.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A type-erased object owned by the factory.
pub type AnyObject = dyn Any + Send + Sync;

/// A shared, type-erased object as returned by the factory.
pub type Object = Arc<AnyObject>;

/// A struct the factory can allocate and inject references into.
///
/// `Default` provides the zero-valued instance used when a definition has no
/// constructor. Reference-carrying fields are declared as `Option<Arc<C>>`
/// and listed with [`ShapeBuilder::pointer`].
///
/// ```
/// use fibre_factory::{Model, ShapeBuilder};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Hub {
///   id: String,
/// }
///
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
///
/// impl Model for Wheel {
///   fn describe(shape: &mut ShapeBuilder<Self>) {
///     shape.pointer("Hub", |wheel| &mut wheel.hub);
///   }
/// }
/// ```
pub trait Model: Any + Send + Sync + Default {
  /// Lists the fields of this struct, in declaration order.
  fn describe(shape: &mut ShapeBuilder<Self>);
}

/// Whether a shape denotes the struct itself or a pointer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
  Value,
  Pointer,
}

/// A structural descriptor of a type.
#[derive(Clone)]
pub struct Shape {
  inner: Arc<ShapeInner>,
  addressing: Addressing,
}

struct ShapeInner {
  type_id: TypeId,
  type_name: &'static str,
  layout: Layout,
}

enum Layout {
  Struct {
    fields: Vec<Field>,
    zero: fn() -> Box<AnyObject>,
  },
  Opaque,
}

impl Shape {
  /// The shape of the struct `T`, addressed by value.
  pub fn of<T: Model>() -> Self {
    let mut builder = ShapeBuilder::<T> {
      fields: Vec::new(),
      _marker: PhantomData,
    };
    T::describe(&mut builder);
    Self {
      inner: Arc::new(ShapeInner {
        type_id: TypeId::of::<T>(),
        type_name: std::any::type_name::<T>(),
        layout: Layout::Struct {
          fields: builder.fields,
          zero: zero_of::<T>,
        },
      }),
      addressing: Addressing::Value,
    }
  }

  /// The shape of a pointer to the struct `T`.
  pub fn pointer_to<T: Model>() -> Self {
    Self::of::<T>().by_ref()
  }

  /// The shape of a type that is not a struct the factory can build.
  pub fn opaque<T: Any + Send + Sync>() -> Self {
    Self {
      inner: Arc::new(ShapeInner {
        type_id: TypeId::of::<T>(),
        type_name: std::any::type_name::<T>(),
        layout: Layout::Opaque,
      }),
      addressing: Addressing::Value,
    }
  }

  /// The same shape, addressed by pointer.
  pub fn by_ref(mut self) -> Self {
    self.addressing = Addressing::Pointer;
    self
  }

  /// The same shape, addressed by value.
  pub fn by_value(mut self) -> Self {
    self.addressing = Addressing::Value;
    self
  }

  /// The `TypeId` of the described element type.
  pub fn type_id(&self) -> TypeId {
    self.inner.type_id
  }

  pub fn type_name(&self) -> &'static str {
    self.inner.type_name
  }

  pub fn addressing(&self) -> Addressing {
    self.addressing
  }

  pub fn is_pointer(&self) -> bool {
    self.addressing == Addressing::Pointer
  }

  pub fn is_struct(&self) -> bool {
    matches!(self.inner.layout, Layout::Struct { .. })
  }

  /// The fields of the struct, or an empty slice for opaque shapes.
  pub fn fields(&self) -> &[Field] {
    match &self.inner.layout {
      Layout::Struct { fields, .. } => fields,
      Layout::Opaque => &[],
    }
  }

  pub fn field(&self, name: &str) -> Option<&Field> {
    self.fields().iter().find(|field| field.name == name)
  }

  /// Compares element types, ignoring whether either side is a pointer.
  pub fn matches(&self, other: &Shape) -> bool {
    self.inner.type_id == other.inner.type_id
  }

  /// Allocates a zero-valued instance, or `None` for opaque shapes.
  pub fn zero(&self) -> Option<Box<AnyObject>> {
    match &self.inner.layout {
      Layout::Struct { zero, .. } => Some(zero()),
      Layout::Opaque => None,
    }
  }
}

fn zero_of<T: Model>() -> Box<AnyObject> {
  Box::new(T::default())
}

impl PartialEq for Shape {
  fn eq(&self, other: &Self) -> bool {
    self.inner.type_id == other.inner.type_id && self.addressing == other.addressing
  }
}

impl Eq for Shape {}

impl fmt::Display for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.addressing {
      Addressing::Value => f.write_str(self.inner.type_name),
      Addressing::Pointer => write!(f, "&{}", self.inner.type_name),
    }
  }
}

impl fmt::Debug for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Shape")
      .field("type", &self.inner.type_name)
      .field("addressing", &self.addressing)
      .field("fields", &self.fields())
      .finish()
  }
}

/// A named field of a struct shape.
#[derive(Clone)]
pub struct Field {
  name: &'static str,
  kind: FieldKind,
}

#[derive(Clone)]
pub(crate) enum FieldKind {
  Pointer(Arc<dyn Slot>),
  Plain,
}

impl Field {
  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn is_pointer(&self) -> bool {
    matches!(self.kind, FieldKind::Pointer(_))
  }

  /// The shape of the pointee for pointer fields.
  pub fn target(&self) -> Option<Shape> {
    match &self.kind {
      FieldKind::Pointer(slot) => Some(slot.target()),
      FieldKind::Plain => None,
    }
  }

  pub(crate) fn slot(&self) -> Option<&Arc<dyn Slot>> {
    match &self.kind {
      FieldKind::Pointer(slot) => Some(slot),
      FieldKind::Plain => None,
    }
  }
}

impl fmt::Debug for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      FieldKind::Pointer(slot) => write!(f, "{}: &{}", self.name, slot.target_name()),
      FieldKind::Plain => f.write_str(self.name),
    }
  }
}

/// Collects the field list of a [`Model`].
pub struct ShapeBuilder<T> {
  fields: Vec<Field>,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Model> ShapeBuilder<T> {
  /// Declares a pointer field that references can be injected into and
  /// descended through.
  pub fn pointer<C: Model>(
    &mut self,
    name: &'static str,
    access: fn(&mut T) -> &mut Option<Arc<C>>,
  ) -> &mut Self {
    self.fields.push(Field {
      name,
      kind: FieldKind::Pointer(Arc::new(PointerSlot { access })),
    });
    self
  }

  /// Declares a plain field. Plain fields cannot receive references.
  pub fn field(&mut self, name: &'static str) -> &mut Self {
    self.fields.push(Field {
      name,
      kind: FieldKind::Plain,
    });
    self
  }
}

/// Why a slot operation failed. Mapped to an [`Error`](crate::Error) by the
/// caller, which knows the field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotError {
  /// The parent is not the struct this slot belongs to.
  ParentMismatch,
  /// The pointer is `None`.
  Empty,
  /// The pointee is shared and cannot be borrowed mutably.
  Shared,
  /// The value is not of the pointee type.
  ValueMismatch,
}

/// Accessor and mutator for one pointer field of a struct.
pub(crate) trait Slot: Send + Sync {
  fn target(&self) -> Shape;

  fn target_name(&self) -> &'static str;

  /// Borrows the pointee of this field mutably.
  fn descend<'a>(&self, parent: &'a mut AnyObject) -> Result<&'a mut AnyObject, SlotError>;

  /// Stores `value` into this field.
  fn assign(&self, parent: &mut AnyObject, value: Object) -> Result<(), SlotError>;
}

struct PointerSlot<P, C> {
  access: fn(&mut P) -> &mut Option<Arc<C>>,
}

impl<P: Model, C: Model> Slot for PointerSlot<P, C> {
  fn target(&self) -> Shape {
    Shape::of::<C>()
  }

  fn target_name(&self) -> &'static str {
    std::any::type_name::<C>()
  }

  fn descend<'a>(&self, parent: &'a mut AnyObject) -> Result<&'a mut AnyObject, SlotError> {
    let parent = parent
      .downcast_mut::<P>()
      .ok_or(SlotError::ParentMismatch)?;
    match (self.access)(parent) {
      None => Err(SlotError::Empty),
      Some(child) => match Arc::get_mut(child) {
        Some(child) => Ok(child as &mut AnyObject),
        None => Err(SlotError::Shared),
      },
    }
  }

  fn assign(&self, parent: &mut AnyObject, value: Object) -> Result<(), SlotError> {
    let parent = parent
      .downcast_mut::<P>()
      .ok_or(SlotError::ParentMismatch)?;
    let value = value
      .downcast::<C>()
      .map_err(|_| SlotError::ValueMismatch)?;
    *(self.access)(parent) = Some(value);
    Ok(())
  }
}
