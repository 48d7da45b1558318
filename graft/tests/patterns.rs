//! Format patterns: declarative field attributes, call-site options and
//! their precedence.

use std::collections::HashMap;

use chrono::NaiveDate;
use graft::{Bean, CopyOptions, Mapper, ScalarType, Value};

#[derive(Bean, Clone, Debug, Default)]
struct Invoice {
    #[graft(date_pattern = "%Y/%m/%d")]
    issued: Option<NaiveDate>,
    #[graft(number_pattern = "#,###")]
    total: Option<i64>,
    note: Option<String>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn map(entries: &[(&str, &str)]) -> HashMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::Str((*v).to_owned())))
        .collect()
}

#[test]
fn field_attributes_drive_parsing() {
    let mapper = Mapper::new();
    let invoice: Invoice = mapper
        .create_and_copy_from_map(
            Some(&map(&[("issued", "2024/03/09"), ("total", "1,234,567")])),
            &CopyOptions::empty(),
        )
        .unwrap();
    assert_eq!(invoice.issued, Some(date(2024, 3, 9)));
    assert_eq!(invoice.total, Some(1_234_567));
}

#[test]
fn field_attributes_scope_to_their_field() {
    let mapper = Mapper::new();
    let mut invoice = Invoice::default();
    // the attribute replaces the default ISO pattern for its field
    let err = mapper.copy_from_map(
        &mut invoice,
        &map(&[("issued", "2024-03-09")]),
        &CopyOptions::empty(),
    );
    assert!(err.is_ok());
    assert!(invoice.issued.is_none());
}

#[test]
fn call_site_patterns_override_field_attributes() {
    let mapper = Mapper::new();
    let options = CopyOptions::builder()
        .date_pattern_by_name("issued", "%d.%m.%Y")
        .build();
    let invoice: Invoice = mapper
        .create_and_copy_from_map(Some(&map(&[("issued", "09.03.2024")])), &options)
        .unwrap();
    assert_eq!(invoice.issued, Some(date(2024, 3, 9)));
}

#[test]
fn reads_and_flattening_stay_raw() {
    let mapper = Mapper::new();
    let invoice = Invoice {
        issued: Some(date(2024, 3, 9)),
        total: Some(1_234_567),
        note: None,
    };
    assert_eq!(
        mapper
            .get_property_as(&invoice, "issued", ScalarType::Str)
            .unwrap(),
        Value::Str("2024-03-09".into())
    );
    let flat = mapper
        .create_map_and_copy(&invoice, &CopyOptions::empty())
        .unwrap();
    assert_eq!(flat.get("issued"), Some(&Value::Date(date(2024, 3, 9))));
}

#[test]
fn source_attributes_apply_when_copying_between_types() {
    #[derive(Bean, Clone, Debug, Default)]
    struct Source {
        #[graft(date_pattern = "%d.%m.%Y")]
        born: Option<NaiveDate>,
    }

    #[derive(Bean, Clone, Debug, Default)]
    struct Target {
        born: Option<String>,
    }

    let mapper = Mapper::new();
    let source = Source {
        born: Some(date(2024, 3, 9)),
    };

    let mut target = Target::default();
    mapper.copy(&source, &mut target, &CopyOptions::empty()).unwrap();
    assert_eq!(target.born.as_deref(), Some("09.03.2024"));

    let created: Target = mapper
        .create_and_copy(Some(&source), &CopyOptions::empty())
        .unwrap();
    assert_eq!(created.born.as_deref(), Some("09.03.2024"));
}

#[test]
fn destination_attributes_win_over_source_attributes() {
    #[derive(Bean, Clone, Debug, Default)]
    struct Source {
        #[graft(date_pattern = "%d.%m.%Y")]
        born: Option<NaiveDate>,
    }

    #[derive(Bean, Clone, Debug, Default)]
    struct Target {
        #[graft(date_pattern = "%Y/%m/%d")]
        born: Option<String>,
    }

    let mapper = Mapper::new();
    let source = Source {
        born: Some(date(2024, 3, 9)),
    };
    let mut target = Target::default();
    mapper.copy(&source, &mut target, &CopyOptions::empty()).unwrap();
    assert_eq!(target.born.as_deref(), Some("2024/03/09"));
}

#[test]
fn nested_call_site_patterns_reach_nested_fields() {
    #[derive(Bean, Clone, Debug, Default)]
    struct Wrapper {
        invoice: Option<Invoice>,
    }

    let mapper = Mapper::new();
    let options = CopyOptions::builder()
        .number_pattern_by_name("invoice.total", "#,###")
        .build();
    let wrapper: Wrapper = mapper
        .create_and_copy_from_map(Some(&map(&[("invoice.total", "2,500")])), &options)
        .unwrap();
    assert_eq!(wrapper.invoice.unwrap().total, Some(2500));
}
