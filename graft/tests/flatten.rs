//! Flattening typed graphs into dotted-key maps.

use graft::{Bean, CopyOptions, Mapper, Value};

#[derive(Bean, Clone, Debug, Default)]
struct Address {
    street: Option<String>,
    zip: Option<String>,
}

#[derive(Bean, Clone, Debug, Default)]
struct Person {
    name: Option<String>,
    age: Option<i32>,
    address: Option<Address>,
    tags: Vec<Option<String>>,
}

fn sample() -> Person {
    Person {
        name: Some("Ada".into()),
        age: Some(36),
        address: Some(Address {
            street: Some("Main St".into()),
            zip: Some("10115".into()),
        }),
        tags: vec![Some("vip".into()), None],
    }
}

#[test]
fn scalars_keep_their_typed_values() {
    let mapper = Mapper::new();
    let map = mapper
        .create_map_and_copy(&sample(), &CopyOptions::empty())
        .unwrap();
    assert_eq!(map.get("name"), Some(&Value::Str("Ada".into())));
    assert_eq!(map.get("age"), Some(&Value::I32(36)));
}

#[test]
fn nested_nodes_flatten_to_dotted_keys() {
    let mapper = Mapper::new();
    let map = mapper
        .create_map_and_copy(&sample(), &CopyOptions::empty())
        .unwrap();
    assert_eq!(map.get("address.street"), Some(&Value::Str("Main St".into())));
    assert_eq!(map.get("address.zip"), Some(&Value::Str("10115".into())));
    assert!(!map.contains_key("address"));
}

#[test]
fn a_null_nested_node_flattens_to_a_null_entry() {
    let mapper = Mapper::new();
    let person = Person {
        address: None,
        ..sample()
    };
    let map = mapper
        .create_map_and_copy(&person, &CopyOptions::empty())
        .unwrap();
    assert_eq!(map.get("address"), Some(&Value::Null));
    assert!(!map.contains_key("address.zip"));
}

#[test]
fn lists_are_stored_whole() {
    let mapper = Mapper::new();
    let map = mapper
        .create_map_and_copy(&sample(), &CopyOptions::empty())
        .unwrap();
    assert_eq!(
        map.get("tags"),
        Some(&Value::List(vec![Value::Str("vip".into()), Value::Null]))
    );
}

#[test]
fn includes_select_per_level_names_and_recurse_whole() {
    let mapper = Mapper::new();
    let map = mapper
        .create_map_and_copy_includes(&sample(), &["address"])
        .unwrap();
    assert!(!map.contains_key("name"));
    assert!(!map.contains_key("age"));
    // the include filter does not narrow the inside of a selected node
    assert_eq!(map.get("address.street"), Some(&Value::Str("Main St".into())));
    assert_eq!(map.get("address.zip"), Some(&Value::Str("10115".into())));
}

#[test]
fn excludes_apply_at_every_level() {
    let mapper = Mapper::new();
    let map = mapper
        .create_map_and_copy_excludes(&sample(), &["zip", "age"])
        .unwrap();
    assert!(map.contains_key("name"));
    assert!(!map.contains_key("age"));
    assert!(map.contains_key("address.street"));
    assert!(!map.contains_key("address.zip"));
}

#[test]
fn a_flattened_map_rebuilds_the_graph() {
    let mapper = Mapper::new();
    let map = mapper
        .create_map_and_copy(&sample(), &CopyOptions::empty())
        .unwrap();
    let rebuilt: Person = mapper
        .create_and_copy_from_map(Some(&map), &CopyOptions::empty())
        .unwrap();
    assert_eq!(rebuilt.name.as_deref(), Some("Ada"));
    assert_eq!(rebuilt.age, Some(36));
    assert_eq!(rebuilt.address.unwrap().zip.as_deref(), Some("10115"));
    assert_eq!(rebuilt.tags.len(), 2);
    assert_eq!(rebuilt.tags[0].as_deref(), Some("vip"));
    assert_eq!(rebuilt.tags[1], None);
}
