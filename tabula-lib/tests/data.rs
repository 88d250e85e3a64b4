use std::collections::HashMap;

use tabula_lib::error::FieldError;
use tabula_lib::model::{
    Data, FieldType, Filter, FilterMode, Filters, RawRecord, Record, Sorter, Value,
};

fn raw(pairs: &[(&str, Value)]) -> RawRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn people() -> Data {
    let rows = vec![
        raw(&[("id", 1.into()), ("name", "Bob".into()), ("age", "30".into()), ("team", "b".into())]),
        raw(&[("id", 2.into()), ("name", "Ann".into()), ("age", "25".into()), ("team", "a".into())]),
        raw(&[("id", 3.into()), ("name", "Cid".into()), ("age", "41".into()), ("team", "a".into())]),
        raw(&[("id", 4.into()), ("name", "Dee".into()), ("age", "25".into()), ("team", "b".into())]),
    ];
    let types = HashMap::from([("age".to_string(), FieldType::Int)]);
    Data::new(rows, types, vec!["id".to_string()])
}

fn names(data: &Data) -> Vec<String> {
    data.records()
        .iter()
        .map(|r| r.value("name").to_string())
        .collect()
}

#[test]
fn test_coerces_declared_fields_only() {
    let data = people();
    let first = data.get(0).unwrap();
    assert_eq!(first.get_i64("age").unwrap(), Some(30));
    assert_eq!(first.get_str("name").unwrap(), Some("Bob"));
    assert_eq!(first.get_i64("id").unwrap(), Some(1));
}

#[test]
fn test_typed_getter_errors_name_the_record() {
    let record = Record::new(["id", "org"])
        .set("id", 7)
        .set("org", "x")
        .set("age", "old");

    assert_eq!(record.key_label(), "id=7,org=x");
    assert_eq!(
        record.get_i64("age").unwrap_err(),
        FieldError::WrongType {
            record: "id=7,org=x".into(),
            field: "age".into(),
            expected: FieldType::Int,
            found: "string",
        }
    );

    let missing = record.get_bool("active").unwrap_err();
    assert_eq!(missing.field(), "active");
    assert_eq!(missing.record(), "id=7,org=x");
    assert_eq!(missing.to_string(), "Record [id=7,org=x] has no field 'active'");
}

#[test]
fn test_identity_ignores_non_key_fields() {
    let a = Record::new(["id", "org"])
        .set("id", 7)
        .set("org", "x")
        .set("name", "Ann");
    let b = Record::new(["org", "id"])
        .set("org", "x")
        .set("id", 7)
        .set("name", "Someone else");
    assert!(a.is_equal(&b));
    assert_eq!(a.hash(), b.hash());

    let c = Record::new(["id", "org"]).set("id", 8).set("org", "x");
    assert!(!a.is_equal(&c));
    assert_ne!(a.hash(), c.hash());
}

#[test]
fn test_is_equal_false_when_key_missing_on_other() {
    let a = Record::new(["id"]).set("id", 1);
    let b = Record::new(["id"]).set("name", "no id");
    assert!(!a.is_equal(&b));
}

#[test]
fn test_identity_defaults_to_all_fields() {
    let a = Record::new(Vec::<String>::new()).set("x", 1).set("y", 2);
    let b = Record::new(Vec::<String>::new()).set("y", 2).set("x", 1);
    let c = Record::new(Vec::<String>::new()).set("x", 1).set("y", 3);
    assert!(a.is_equal(&b));
    assert_eq!(a.hash(), b.hash());
    assert!(!a.is_equal(&c));
}

#[test]
fn test_multi_key_sort_respects_secondary_direction() {
    let data = people();
    assert!(data.sort(&[Sorter::asc("age"), Sorter::desc("name")], true));
    assert_eq!(names(&data), vec!["Dee", "Ann", "Bob", "Cid"]);
}

#[test]
fn test_sort_without_execute_keeps_order() {
    let data = people();
    assert!(data.sort(&[Sorter::asc("name")], false));
    assert_eq!(names(&data), vec!["Bob", "Ann", "Cid", "Dee"]);
    assert_eq!(data.sorters(), vec![Sorter::asc("name")]);
}

#[test]
fn test_filter_none_restores_origin_order() {
    let data = people();
    data.sort(&[Sorter::desc("age")], true);
    let filters = Filters::new().with(Filter::new("team", "=", "a"));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(names(&data), vec!["Ann", "Cid"]);

    data.filter(None, FilterMode::And, true);
    assert_eq!(names(&data), vec!["Bob", "Ann", "Cid", "Dee"]);
    assert!(data.sorters().is_empty());
}

#[test]
fn test_filter_greater_or_equal() {
    let data = people();
    let filters = Filters::new().with(Filter::new("age", ">=", 28));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(names(&data), vec!["Bob", "Cid"]);
}

#[test]
fn test_filter_and_or_modes() {
    let filters = Filters::new()
        .with(Filter::new("team", "=", "a"))
        .with(Filter::new("age", "<", 30));

    let data = people();
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(names(&data), vec!["Ann"]);

    data.filter(Some(&filters), FilterMode::Or, true);
    assert_eq!(names(&data), vec!["Ann", "Cid", "Dee"]);
}

#[test]
fn test_filter_set_operators() {
    let data = people();
    let filters = Filters::new().with(Filter::new("name", "in", vec!["Ann", "Dee"]));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(names(&data), vec!["Ann", "Dee"]);

    let filters = Filters::new().with(Filter::new("name", "in", "Bob, Cid"));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(names(&data), vec!["Bob", "Cid"]);
}

#[test]
fn test_filter_inset_matches_set_valued_fields() {
    let rows = vec![
        raw(&[("id", 1.into()), ("tags", "red,green".into())]),
        raw(&[("id", 2.into()), ("tags", Value::from(vec!["blue"]))]),
        raw(&[("id", 3.into()), ("tags", Value::Null)]),
    ];
    let data = Data::new(rows, HashMap::new(), vec!["id".into()]);
    let filters = Filters::new().with(Filter::new("tags", "inset", "green"));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(data.len(), 1);

    let filters = Filters::new().with(Filter::new("tags", "inset", vec!["blue", "red"]));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(data.len(), 2);
}

#[test]
fn test_like_and_likecode() {
    let data = people();
    let filters = Filters::new().with(Filter::new("name", "like", "AN"));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(names(&data), vec!["Ann"]);

    // "фт" is typed on the same keys as "an".
    let filters = Filters::new().with(Filter::new("name", "likecode", "фт"));
    data.filter(Some(&filters), FilterMode::And, true);
    assert_eq!(names(&data), vec!["Ann"]);
}

#[test]
fn test_unknown_operator_fails_closed() {
    let data = people();
    let filters = Filters::new().with(Filter::new("name", "~=", "Ann"));
    data.filter(Some(&filters), FilterMode::And, true);
    assert!(data.is_empty());
}

#[test]
fn test_add_reaches_view_only() {
    let data = people();
    data.add(vec![raw(&[("id", 5.into()), ("name", "Eve".into()), ("age", "19".into())])]);
    assert_eq!(data.len(), 5);
    assert_eq!(data.origin_records().len(), 4);
    assert_eq!(data.get(4).unwrap().get_i64("age").unwrap(), Some(19));

    data.filter(None, FilterMode::And, true);
    assert_eq!(data.len(), 4);
}
