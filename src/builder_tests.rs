use crate::{Key, Value, ser};

#[test]
fn built_trees_dump_like_parsed_ones() {
    let mut root = Key::root();
    root.insert_value("title", Value::string("TOML Example"));
    assert_eq!(
        ser::dumps(&root),
        r#"{"title": {"type": "string", "value": "TOML Example"}}"#
    );

    let parsed = crate::parse("title = \"TOML Example\"\n").unwrap();
    assert_eq!(ser::dumps(&root), ser::dumps(&parsed));
}

#[test]
fn scalar_constructors() {
    assert_eq!(
        ser::dump_value(&Value::integer(31)),
        r#"{"type": "integer", "value": "31"}"#
    );
    assert_eq!(
        ser::dump_value(&Value::boolean(true)),
        r#"{"type": "bool", "value": "true"}"#
    );
    assert_eq!(
        ser::dump_value(&Value::float(3.14)),
        r#"{"type": "float", "value": "3.14"}"#
    );
    // whole-number floats keep one fractional digit
    assert_eq!(
        ser::dump_value(&Value::float(2.0)),
        r#"{"type": "float", "value": "2.0"}"#
    );
    assert_eq!(
        ser::dump_value(&Value::array(vec![Value::integer(1), Value::integer(2)])),
        r#"[{"type": "integer", "value": "1"}, {"type": "integer", "value": "2"}]"#
    );
}

#[test]
fn nested_construction() {
    let mut root = Key::root();
    let server = root.insert_table("server");
    server.insert_value("port", Value::integer(8080));
    server.insert_value("active", Value::boolean(true));

    assert_eq!(
        root.get_key("server")
            .unwrap()
            .get_key("port")
            .unwrap()
            .get_int(),
        Some(8080.0)
    );

    let mut extras = Key::table("extras");
    extras.insert_value("note", Value::string("hi"));
    root.insert_key(extras);
    assert_eq!(
        root.get_key("extras")
            .unwrap()
            .get_key("note")
            .unwrap()
            .get_string(),
        Some("hi")
    );
}

#[test]
fn insert_replaces_and_remove_drops() {
    let mut root = Key::root();
    root.insert_value("a", Value::integer(1));
    root.insert_value("a", Value::integer(2));
    assert_eq!(root.len(), 1);
    assert_eq!(root.get_key("a").unwrap().get_int(), Some(2.0));

    let removed = root.remove("a").unwrap();
    assert_eq!(removed.get_int(), Some(2.0));
    assert!(root.is_empty());
    assert!(root.remove("a").is_none());
}

#[test]
fn pretty_print_indents() {
    let mut root = Key::root();
    let server = root.insert_table("server");
    server.insert_value("port", Value::integer(8080));

    let text = root.pretty().to_string();
    assert!(text.starts_with("{\n"));
    assert!(text.ends_with('}'));
    assert!(text.contains("server = {\n"));
    assert!(text.contains("    port = 8080\n"));
}

#[test]
fn pretty_print_values() {
    let mut root = Key::root();
    root.insert_value("s", Value::string("x"));
    let text = root.pretty().to_string();
    assert!(text.contains("s = \"x\""));

    let mut root = Key::root();
    root.insert_value("list", Value::array(vec![Value::integer(1)]));
    let text = root.pretty().to_string();
    assert!(text.contains("list = [\n"));
    assert!(text.contains("    1\n"));
}
