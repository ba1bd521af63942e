mod common;

use common::{Car, Hub, Wheel};
use fibre_factory::{DefinitionOption, Error, ObjectDefinition, Scope, Shape};
use pretty_assertions::assert_eq;

fn car_definition(options: Vec<DefinitionOption>) -> Result<ObjectDefinition, Error> {
  ObjectDefinition::new("car", Scope::Prototype, Shape::of::<Car>(), options)
}

#[test]
fn test_name_is_trimmed_and_required() {
  let definition =
    ObjectDefinition::new("  car ", Scope::Singleton, Shape::of::<Car>(), []).unwrap();
  assert_eq!(definition.name(), "car");
  assert_eq!(definition.scope(), Scope::Singleton);

  let err = ObjectDefinition::new("   ", Scope::Singleton, Shape::of::<Car>(), []).unwrap_err();
  assert!(matches!(err, Error::EmptyObjectDefinitionName));
}

#[test]
fn test_shape_must_be_struct() {
  let err =
    ObjectDefinition::new("text", Scope::Prototype, Shape::opaque::<String>(), []).unwrap_err();
  match err {
    Error::ObjectMustBeStruct { name } => assert_eq!(name, std::any::type_name::<String>()),
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_references_keep_declaration_order() {
  let definition = car_definition(vec![
    DefinitionOption::reference("Wheel2", "wheel"),
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference(" Wheel1 . Hub ", "hub"),
  ])
  .unwrap();

  let order: Vec<&str> = definition.resolution_order().collect();
  assert_eq!(order, vec!["Wheel2", "Wheel1", "Wheel1.Hub"]);

  let nested = definition.reference("Wheel1.Hub").unwrap();
  assert_eq!(nested.target(), "hub");
  assert_eq!(nested.field_path().depth(), 2);
  assert_eq!(nested.field_path().segments().collect::<Vec<_>>(), vec!["Wheel1", "Hub"]);
}

#[test]
fn test_unknown_field_is_rejected() {
  let err = car_definition(vec![DefinitionOption::reference("Wheel5", "wheel")]).unwrap_err();
  match err {
    Error::FieldNotExist { field, type_name } => {
      assert_eq!(field, "Wheel5");
      assert_eq!(type_name, std::any::type_name::<Car>());
    }
    other => panic!("unexpected error: {other}"),
  }

  let err = car_definition(vec![DefinitionOption::reference("Wheel1.Rim", "rim")]).unwrap_err();
  match err {
    Error::FieldNotExist { field, type_name } => {
      assert_eq!(field, "Wheel1.Rim");
      assert_eq!(type_name, std::any::type_name::<Wheel>());
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_plain_fields_cannot_hold_references() {
  // Terminal segment is a plain field.
  let err = car_definition(vec![DefinitionOption::reference("Name", "name")]).unwrap_err();
  assert!(matches!(err, Error::RefFieldShouldBePtr { ref field } if field == "Name"));

  // Intermediate segment is a plain field.
  let err = car_definition(vec![DefinitionOption::reference("Name.Len", "len")]).unwrap_err();
  assert!(matches!(err, Error::RefFieldShouldBePtr { ref field } if field == "Name.Len"));

  // Terminal segment below a pointer is a plain field.
  let err = car_definition(vec![DefinitionOption::reference("Wheel1.Hub.Id", "id")]).unwrap_err();
  assert!(matches!(err, Error::RefFieldShouldBePtr { ref field } if field == "Wheel1.Hub.Id"));
}

#[test]
fn test_malformed_paths_and_targets() {
  let err = car_definition(vec![DefinitionOption::reference("  ", "wheel")]).unwrap_err();
  assert!(matches!(err, Error::EmptyFieldName));

  let err = car_definition(vec![DefinitionOption::reference("Wheel1..Hub", "hub")]).unwrap_err();
  assert!(matches!(err, Error::BadFieldName { ref field } if field == "Wheel1..Hub"));

  let err = car_definition(vec![DefinitionOption::reference("Wheel1", " ")]).unwrap_err();
  assert!(matches!(err, Error::EmptyRefDefinitionName { ref field } if field == "Wheel1"));
}

#[test]
fn test_conflicting_redeclaration_fails() {
  let err = car_definition(vec![
    DefinitionOption::reference("Wheel1", "front_wheel"),
    DefinitionOption::reference("Wheel1", "rear_wheel"),
  ])
  .unwrap_err();

  match err {
    Error::FieldAlreadyReferenced { field, original } => {
      assert_eq!(field, "Wheel1");
      assert_eq!(original, "front_wheel");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_identical_redeclaration_is_merged() {
  let definition = car_definition(vec![
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference_with_options("Wheel1", "wheel", common::id("7")),
  ])
  .unwrap();

  assert_eq!(definition.references().len(), 1);
  assert_eq!(definition.resolution_order().count(), 1);
  let options = definition.reference("Wheel1").unwrap().options().unwrap();
  assert_eq!(options.get::<String>("id").unwrap().as_deref(), Some("7"));
}

#[test]
fn test_checked_ref_order_is_a_permutation() {
  let definition = car_definition(vec![
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference("Wheel1.Hub", "hub"),
    DefinitionOption::reference("Wheel2", "wheel"),
    DefinitionOption::ref_order(true, ["Wheel2", "Wheel1", "Wheel1.Hub", "Wheel2"]),
  ])
  .unwrap();
  assert_eq!(
    definition.resolution_order().collect::<Vec<_>>(),
    vec!["Wheel2", "Wheel1", "Wheel1.Hub"]
  );

  let err = car_definition(vec![
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference("Wheel2", "wheel"),
    DefinitionOption::ref_order(true, ["Wheel1"]),
  ])
  .unwrap_err();
  assert!(matches!(err, Error::BadRefOrderLength { expected: 2, actual: 1 }));

  let err = car_definition(vec![
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference("Wheel2", "wheel"),
    DefinitionOption::ref_order(true, ["Wheel1", "Wheel3"]),
  ])
  .unwrap_err();
  assert!(matches!(err, Error::RefOrderContainsNonExistentRef { ref field } if field == "Wheel3"));
}

#[test]
fn test_unchecked_ref_order_is_taken_verbatim() {
  let definition = car_definition(vec![
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference("Wheel2", "wheel"),
    DefinitionOption::ref_order(false, ["Wheel2"]),
  ])
  .unwrap();
  assert_eq!(definition.resolution_order().collect::<Vec<_>>(), vec!["Wheel2"]);
  assert_eq!(definition.references().len(), 2);
}

#[test]
fn test_order_declared_before_references_lists_each_path_once() {
  let definition = car_definition(vec![
    DefinitionOption::ref_order(false, ["Wheel1.Hub", "Wheel1"]),
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference("Wheel1.Hub", "hub"),
    DefinitionOption::reference("Wheel2", "wheel"),
  ])
  .unwrap();
  assert_eq!(
    definition.resolution_order().collect::<Vec<_>>(),
    vec!["Wheel1.Hub", "Wheel1", "Wheel2"]
  );
}

#[test]
fn test_order_entries_are_trimmed_per_segment() {
  let definition = car_definition(vec![
    DefinitionOption::reference("Wheel1", "wheel"),
    DefinitionOption::reference("Wheel1 . Hub", "hub"),
    DefinitionOption::ref_order(true, [" Wheel1", "Wheel1 . Hub"]),
  ])
  .unwrap();
  assert_eq!(
    definition.resolution_order().collect::<Vec<_>>(),
    vec!["Wheel1", "Wheel1.Hub"]
  );
  assert!(definition.reference("Wheel1.Hub").is_some());
}

#[test]
fn test_initializer_and_aliases_are_recorded() {
  let definition = car_definition(vec![
    DefinitionOption::initializer("start"),
    DefinitionOption::alias("auto"),
    DefinitionOption::alias("auto"),
    DefinitionOption::alias("car"),
    DefinitionOption::alias("vehicle"),
  ])
  .unwrap();

  assert_eq!(definition.initializer(), Some("start"));
  assert_eq!(definition.aliases(), ["auto".to_string(), "vehicle".to_string()]);

  let err = car_definition(vec![DefinitionOption::alias(" ")]).unwrap_err();
  assert!(matches!(err, Error::EmptyAlias { ref name } if name == "car"));
}

#[test]
fn test_type_match_ignores_addressing() {
  let by_value = ObjectDefinition::new("hub", Scope::Prototype, Shape::of::<Hub>(), []).unwrap();
  let by_ref =
    ObjectDefinition::new("hub", Scope::Prototype, Shape::pointer_to::<Hub>(), []).unwrap();

  for definition in [&by_value, &by_ref] {
    assert!(definition.is_type_match(&Shape::of::<Hub>()));
    assert!(definition.is_type_match(&Shape::pointer_to::<Hub>()));
    assert!(!definition.is_type_match(&Shape::of::<Wheel>()));
  }
  assert!(by_ref.shape().is_pointer());
  assert!(!by_value.shape().is_pointer());
}
