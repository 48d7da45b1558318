//! Building immutable records bottom-up.

use std::collections::HashMap;
use std::sync::Arc;

use graft::{Bean, BeansError, CopyOptions, Mapper, Record, RecordingDiagnostics, Value};
use rust_decimal::Decimal;

#[derive(Record, Clone, Debug)]
struct Money {
    amount: Option<Decimal>,
    currency: Option<String>,
}

#[derive(Record, Clone, Debug)]
struct LineItem {
    product: Option<String>,
    quantity: Option<i32>,
    price: Option<Money>,
}

#[derive(Record, Clone, Debug)]
struct Order {
    id: Option<i64>,
    items: Vec<Option<LineItem>>,
}

fn map(entries: &[(&str, &str)]) -> HashMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::Str((*v).to_owned())))
        .collect()
}

#[test]
fn a_flat_record_builds_from_a_map() {
    let mapper = Mapper::new();
    let money: Money = mapper
        .create_and_copy_from_map(
            Some(&map(&[("amount", "19.90"), ("currency", "EUR")])),
            &CopyOptions::empty(),
        )
        .unwrap();
    assert_eq!(money.amount, Some("19.90".parse().unwrap()));
    assert_eq!(money.currency.as_deref(), Some("EUR"));
}

#[test]
fn nested_records_build_from_dotted_keys() {
    let mapper = Mapper::new();
    let item: LineItem = mapper
        .create_and_copy_from_map(
            Some(&map(&[
                ("product", "widget"),
                ("quantity", "3"),
                ("price.amount", "4.50"),
                ("price.currency", "EUR"),
            ])),
            &CopyOptions::empty(),
        )
        .unwrap();
    assert_eq!(item.product.as_deref(), Some("widget"));
    assert_eq!(item.quantity, Some(3));
    let price = item.price.unwrap();
    assert_eq!(price.amount, Some("4.50".parse().unwrap()));
    assert_eq!(price.currency.as_deref(), Some("EUR"));
}

#[test]
fn a_partially_addressed_nested_record_leaves_the_rest_null() {
    let mapper = Mapper::new();
    let item: LineItem = mapper
        .create_and_copy_from_map(
            Some(&map(&[("price.amount", "4.50")])),
            &CopyOptions::empty(),
        )
        .unwrap();
    let price = item.price.unwrap();
    assert_eq!(price.amount, Some("4.50".parse().unwrap()));
    assert!(price.currency.is_none());
}

#[test]
fn unaddressed_nested_records_stay_none() {
    let mapper = Mapper::new();
    let item: LineItem = mapper
        .create_and_copy_from_map(Some(&map(&[("product", "widget")])), &CopyOptions::empty())
        .unwrap();
    assert!(item.price.is_none());
}

#[test]
fn record_lists_build_from_indexed_keys_with_gaps() {
    let mapper = Mapper::new();
    let order: Order = mapper
        .create_and_copy_from_map(
            Some(&map(&[
                ("id", "42"),
                ("items[0].product", "widget"),
                ("items[2].product", "gadget"),
                ("items[2].quantity", "1"),
            ])),
            &CopyOptions::empty(),
        )
        .unwrap();
    assert_eq!(order.id, Some(42));
    assert_eq!(order.items.len(), 3);
    assert_eq!(
        order.items[0].as_ref().unwrap().product.as_deref(),
        Some("widget")
    );
    assert!(order.items[1].is_none());
    assert_eq!(order.items[2].as_ref().unwrap().quantity, Some(1));
}

#[test]
fn no_source_yields_an_all_null_record() {
    let mapper = Mapper::new();
    let money: Money = mapper
        .create_and_copy_from_map(None, &CopyOptions::empty())
        .unwrap();
    assert!(money.amount.is_none());
    assert!(money.currency.is_none());
}

#[test]
fn a_bad_component_stays_null_and_is_reported() {
    let recorder = Arc::new(RecordingDiagnostics::new());
    let mapper = Mapper::new().with_diagnostics(recorder.clone());
    let item: LineItem = mapper
        .create_and_copy_from_map(
            Some(&map(&[("product", "widget"), ("quantity", "lots")])),
            &CopyOptions::empty(),
        )
        .unwrap();
    assert_eq!(item.product.as_deref(), Some("widget"));
    assert!(item.quantity.is_none());
    assert_eq!(recorder.skipped(), vec!["quantity".to_owned()]);
}

#[test]
fn records_reject_in_place_population() {
    let mapper = Mapper::new();
    let mut money: Money = mapper
        .create_and_copy_from_map(None, &CopyOptions::empty())
        .unwrap();
    let err = mapper
        .copy_from_map(&mut money, &map(&[("currency", "EUR")]), &CopyOptions::empty())
        .unwrap_err();
    assert!(matches!(err, BeansError::ImmutableTarget { .. }));
}

#[test]
fn records_reject_set_property() {
    let mapper = Mapper::new();
    let mut money: Money = mapper
        .create_and_copy_from_map(None, &CopyOptions::empty())
        .unwrap();
    let err = mapper
        .set_property(&mut money, "currency", Value::Str("EUR".into()))
        .unwrap_err();
    assert!(matches!(err, BeansError::ImmutableTarget { .. }));
}

#[derive(Bean, Clone, Debug, Default)]
struct Cart {
    owner: Option<String>,
    total: Option<Money>,
}

#[test]
fn a_record_inside_a_bean_builds_once_and_is_not_rebuilt() {
    let mapper = Mapper::new();
    let mut cart = Cart::default();
    mapper
        .copy_from_map(
            &mut cart,
            &map(&[("total.amount", "10"), ("total.currency", "EUR")]),
            &CopyOptions::empty(),
        )
        .unwrap();
    let total = cart.total.clone().unwrap();
    assert_eq!(total.amount, Some(Decimal::from(10)));
    assert_eq!(total.currency.as_deref(), Some("EUR"));

    // once present, the record field is left alone
    mapper
        .copy_from_map(
            &mut cart,
            &map(&[("total.currency", "USD")]),
            &CopyOptions::empty(),
        )
        .unwrap();
    assert_eq!(cart.total.unwrap().currency.as_deref(), Some("EUR"));
}
