//! The strict single-property operations.

use graft::{Bean, BeansError, CopyOptions, Mapper, ScalarType, Value};

#[derive(Bean, Clone, Debug, Default)]
struct Engine {
    power: Option<i32>,
}

#[derive(Bean, Clone, Debug, Default)]
struct Car {
    model: Option<String>,
    engine: Option<Engine>,
    seats: Vec<Option<String>>,
}

fn sample() -> Car {
    Car {
        model: Some("GT".into()),
        engine: Some(Engine { power: Some(150) }),
        seats: vec![Some("leather".into()), Some("cloth".into())],
    }
}

#[test]
fn reads_leaf_nested_and_indexed_paths() {
    let mapper = Mapper::new();
    let car = sample();
    assert_eq!(
        mapper.get_property(&car, "model").unwrap(),
        Value::Str("GT".into())
    );
    assert_eq!(
        mapper.get_property(&car, "engine.power").unwrap(),
        Value::I32(150)
    );
    assert_eq!(
        mapper.get_property(&car, "seats[1]").unwrap(),
        Value::Str("cloth".into())
    );
}

#[test]
fn reads_convert_on_request() {
    let mapper = Mapper::new();
    let car = sample();
    assert_eq!(
        mapper
            .get_property_as(&car, "engine.power", ScalarType::Str)
            .unwrap(),
        Value::Str("150".into())
    );
}

#[test]
fn reading_through_a_null_intermediate_is_an_error() {
    let mapper = Mapper::new();
    let car = Car::default();
    let err = mapper.get_property(&car, "engine.power").unwrap_err();
    assert!(matches!(err, BeansError::StructureMismatch { .. }));
}

#[test]
fn reading_an_unknown_property_is_an_error() {
    let mapper = Mapper::new();
    let err = mapper.get_property(&sample(), "wheels").unwrap_err();
    assert!(matches!(err, BeansError::UnknownProperty { .. }));
}

#[test]
fn reading_past_the_end_of_a_list_is_an_error() {
    let mapper = Mapper::new();
    let err = mapper.get_property(&sample(), "seats[9]").unwrap_err();
    assert!(matches!(err, BeansError::StructureMismatch { .. }));
}

#[test]
fn an_empty_path_is_invalid() {
    let mapper = Mapper::new();
    let err = mapper.get_property(&sample(), "").unwrap_err();
    assert!(matches!(err, BeansError::InvalidPath { .. }));
}

#[test]
fn writes_create_intermediate_structure() {
    let mapper = Mapper::new();
    let mut car = Car::default();
    mapper
        .set_property(&mut car, "engine.power", Value::Str("150".into()))
        .unwrap();
    assert_eq!(car.engine.unwrap().power, Some(150));
}

#[test]
fn writes_grow_lists_and_convert() {
    let mapper = Mapper::new();
    let mut car = Car::default();
    mapper
        .set_property(&mut car, "seats[2]", Value::Str("leather".into()))
        .unwrap();
    assert_eq!(car.seats.len(), 3);
    assert_eq!(car.seats[2].as_deref(), Some("leather"));
}

#[test]
fn a_failed_write_raises() {
    let mapper = Mapper::new();
    let mut car = Car::default();
    let err = mapper
        .set_property(&mut car, "engine.power", Value::Str("lots".into()))
        .unwrap_err();
    assert!(matches!(err, BeansError::Conversion(_)));
}

#[test]
fn indexing_a_scalar_property_is_an_error() {
    let mapper = Mapper::new();
    let mut car = Car::default();
    let err = mapper
        .set_property(&mut car, "model[0]", Value::Str("GT".into()))
        .unwrap_err();
    assert!(matches!(err, BeansError::StructureMismatch { .. }));
}

#[test]
fn global_options_apply_to_every_operation() {
    let mapper = Mapper::new().with_global_options(
        CopyOptions::builder().number_pattern("#,###").build(),
    );
    let mut car = Car::default();
    mapper
        .set_property(&mut car, "engine.power", Value::Str("1,500".into()))
        .unwrap();
    assert_eq!(car.engine.unwrap().power, Some(1500));
}
