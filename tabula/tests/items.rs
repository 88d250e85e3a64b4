use tabula::items::Items;

fn items(values: &[&'static str]) -> Items<&'static str> {
    values.iter().copied().collect()
}

#[test]
fn test_insert_without_position_appends() {
    let mut list = items(&["a", "b"]);
    assert_eq!(list.insert("c", None), 2);
    assert_eq!(list.as_slice(), &["a", "b", "c"]);
}

#[test]
fn test_insert_at_index() {
    let mut list = items(&["a", "c"]);
    assert_eq!(list.insert("b", Some(1)), 1);
    assert_eq!(list.as_slice(), &["a", "b", "c"]);
}

#[test]
fn test_insert_past_end_appends() {
    let mut list = items(&["a"]);
    assert_eq!(list.insert("z", Some(10)), 1);
    assert_eq!(list.as_slice(), &["a", "z"]);
}

#[test]
fn test_negative_position_counts_from_end() {
    let mut list = items(&["a", "b", "d"]);
    assert_eq!(list.insert("c", Some(-1)), 2);
    assert_eq!(list.as_slice(), &["a", "b", "c", "d"]);
}

#[test]
fn test_negative_beyond_length_prepends() {
    let mut list = items(&["b", "c"]);
    assert_eq!(list.insert("a", Some(-5)), 0);
    assert_eq!(list.as_slice(), &["a", "b", "c"]);
}

#[test]
fn test_remove_and_lookup() {
    let mut list = items(&["a", "b", "c"]);
    assert_eq!(list.position(|i| *i == "b"), Some(1));
    assert_eq!(list.remove(1), Some("b"));
    assert_eq!(list.remove(5), None);
    assert_eq!(list.len(), 2);
    assert_eq!(list.get(1), Some(&"c"));

    list.clear();
    assert!(list.is_empty());
}
