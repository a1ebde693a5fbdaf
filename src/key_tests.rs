use super::*;
use KeyKind as K;

fn leaf_with(id: &str, value: Value) -> Key {
    let mut key = Key::new(K::KeyLeaf, String::from(id));
    key.value = Some(value);
    key
}

// ── redefinition matrix ─────────────────────────────────────────

#[test]
fn redefinition_matrix() {
    // (existing, incoming) → allowed
    let expected = [
        (K::Key, K::Key, true),
        (K::Key, K::Table, true),
        (K::Key, K::KeyLeaf, false),
        (K::Key, K::TableLeaf, false),
        (K::Key, K::ArrayTable, false),
        (K::Table, K::Key, true),
        (K::Table, K::Table, true),
        (K::Table, K::KeyLeaf, false),
        (K::Table, K::TableLeaf, true),
        (K::Table, K::ArrayTable, false),
        (K::KeyLeaf, K::Key, false),
        (K::KeyLeaf, K::Table, false),
        (K::KeyLeaf, K::KeyLeaf, false),
        (K::KeyLeaf, K::TableLeaf, false),
        (K::KeyLeaf, K::ArrayTable, false),
        (K::TableLeaf, K::Key, true),
        (K::TableLeaf, K::Table, true),
        (K::TableLeaf, K::KeyLeaf, false),
        (K::TableLeaf, K::TableLeaf, false),
        (K::TableLeaf, K::ArrayTable, false),
        (K::ArrayTable, K::Key, false),
        (K::ArrayTable, K::Table, true),
        (K::ArrayTable, K::KeyLeaf, false),
        (K::ArrayTable, K::TableLeaf, false),
        (K::ArrayTable, K::ArrayTable, true),
    ];
    for (existing, incoming, allowed) in expected {
        assert_eq!(
            compatible(existing, incoming),
            allowed,
            "({existing:?}, {incoming:?})"
        );
    }
}

#[test]
fn table_claimed_by_header_only_once() {
    let mut parent = Key::new(K::Table, String::from("root"));
    parent
        .add_subkey(Key::new(K::Table, String::from("a")), 64)
        .ok()
        .unwrap();

    // [a] lands on the implicit table and claims it
    let claimed = parent
        .add_subkey(Key::new(K::TableLeaf, String::from("a")), 64)
        .ok()
        .unwrap();
    assert_eq!(claimed.kind(), K::TableLeaf);

    // a second [a] is a duplicate
    assert!(
        parent
            .add_subkey(Key::new(K::TableLeaf, String::from("a")), 64)
            .is_err()
    );
}

#[test]
fn key_leaf_is_never_redefinable() {
    let mut parent = Key::new(K::Table, String::from("root"));
    parent
        .add_subkey(leaf_with("a", Value::Integer(1.0)), 64)
        .ok()
        .unwrap();
    for kind in [K::Key, K::Table, K::KeyLeaf, K::TableLeaf, K::ArrayTable] {
        assert!(
            parent
                .add_subkey(Key::new(kind, String::from("a")), 64)
                .is_err(),
            "{kind:?} over KeyLeaf"
        );
    }
}

// ── array-table dispatch ────────────────────────────────────────

fn array_table(id: &str) -> Key {
    let mut at = Key::new(K::ArrayTable, String::from(id));
    at.value = Some(Value::Array(vec![Value::InlineTable(Box::new(Key::new(
        K::Key,
        String::new(),
    )))]));
    at.idx = Some(0);
    at
}

#[test]
fn array_table_attaches_children_to_current_entry() {
    let mut at = array_table("t");
    at.add_subkey(leaf_with("x", Value::Integer(1.0)), 64)
        .ok()
        .unwrap();

    // the array-table key itself stays childless
    assert!(at.is_empty());
    let entry = match at.value.as_ref().unwrap() {
        Value::Array(items) => items[0].as_table().unwrap(),
        other => panic!("expected entry array, got {other:?}"),
    };
    assert_eq!(entry.get_key("x").and_then(|k| k.get_int()), Some(1.0));
}

#[test]
fn array_table_second_entry_starts_fresh() {
    let mut at = array_table("t");
    at.add_subkey(leaf_with("x", Value::Integer(1.0)), 64)
        .ok()
        .unwrap();

    // open a second entry and re-add the same key
    if let Some(Value::Array(items)) = at.value.as_mut() {
        items.push(Value::InlineTable(Box::new(Key::new(K::Key, String::new()))));
    }
    at.idx = Some(1);
    at.add_subkey(leaf_with("x", Value::Integer(2.0)), 64)
        .ok()
        .unwrap();

    let entries = at.get_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[1]
            .as_table()
            .unwrap()
            .get_key("x")
            .unwrap()
            .get_int(),
        Some(2.0)
    );
}

// ── caps ────────────────────────────────────────────────────────

#[test]
fn subkey_cap_is_exact() {
    let mut parent = Key::new(K::Table, String::from("root"));
    for i in 0..4 {
        parent
            .add_subkey(Key::new(K::Table, format!("k{i}")), 4)
            .ok()
            .unwrap();
    }
    assert_eq!(parent.len(), 4);
    let err = parent.add_subkey(Key::new(K::Table, String::from("k4")), 4);
    assert!(matches!(err, Err(AddError::TooManySubkeys)));
}

// ── lookup surface ──────────────────────────────────────────────

#[test]
fn get_key_matches_self_and_children() {
    let mut root = Key::new(K::Table, String::from("root"));
    root.add_subkey(leaf_with("a", Value::Boolean(true)), 64)
        .ok()
        .unwrap();

    assert_eq!(root.get_key("root").unwrap().id(), "root");
    assert_eq!(root.get_key("a").unwrap().kind(), K::KeyLeaf);
    assert!(root.get_key("missing").is_none());
}

#[test]
fn typed_getters_check_the_tag() {
    let mut root = Key::new(K::Table, String::from("root"));
    root.add_subkey(leaf_with("n", Value::Integer(42.0)), 64)
        .ok()
        .unwrap();
    root.add_subkey(leaf_with("s", Value::String(String::from("hi"))), 64)
        .ok()
        .unwrap();
    root.add_subkey(
        leaf_with(
            "f",
            Value::Float {
                value: 2.5,
                precision: 1,
                scientific: false,
            },
        ),
        64,
    )
    .ok()
    .unwrap();
    root.add_subkey(
        leaf_with("arr", Value::Array(vec![Value::Boolean(false)])),
        64,
    )
    .ok()
    .unwrap();

    let n = root.get_key("n").unwrap();
    assert_eq!(n.get_int(), Some(42.0));
    assert_eq!(n.get_string(), None);
    assert_eq!(n.get_float(), None);
    assert_eq!(n.get_bool(), None);
    assert_eq!(n.get_datetime(), None);

    assert_eq!(root.get_key("s").unwrap().get_string(), Some("hi"));
    assert_eq!(root.get_key("f").unwrap().get_float(), Some(2.5));
    assert_eq!(root.get_key("arr").unwrap().get_array().unwrap().len(), 1);
    // a table key holds no value at all
    assert_eq!(root.get_int(), None);
}
