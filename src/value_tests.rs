use super::*;
use crate::key::KeyKind;

fn float(value: f64) -> Value {
    Value::Float {
        value,
        precision: 1,
        scientific: false,
    }
}

#[test]
fn type_strings() {
    assert_eq!(Value::Integer(1.0).type_str(), "integer");
    assert_eq!(float(1.5).type_str(), "float");
    assert_eq!(Value::Boolean(true).type_str(), "boolean");
    assert_eq!(Value::String(String::new()).type_str(), "string");
    assert_eq!(Value::Array(Vec::new()).type_str(), "array");
    assert_eq!(
        Value::InlineTable(Box::new(Key::new(KeyKind::Table, String::new()))).type_str(),
        "table"
    );
}

#[test]
fn accessors_match_tags() {
    let int = Value::Integer(31.0);
    assert_eq!(int.as_integer(), Some(31.0));
    assert_eq!(int.as_float(), None);
    assert_eq!(int.as_str(), None);
    assert_eq!(int.as_bool(), None);

    let f = float(2.5);
    assert_eq!(f.as_float(), Some(2.5));
    assert_eq!(f.as_integer(), None);

    let s = Value::String(String::from("abc"));
    assert_eq!(s.as_str(), Some("abc"));
    assert!(s.as_array().is_none());

    let arr = Value::Array(vec![Value::Boolean(true), Value::Integer(2.0)]);
    assert_eq!(arr.as_array().unwrap().len(), 2);
    assert!(arr.as_table().is_none());

    let table = Value::InlineTable(Box::new(Key::new(KeyKind::Table, String::new())));
    assert!(table.as_table().is_some());
    assert!(table.as_datetime().is_none());
}

#[test]
fn display_uses_typed_json() {
    assert_eq!(
        Value::Integer(7.0).to_string(),
        r#"{"type": "integer", "value": "7"}"#
    );
    assert_eq!(
        Value::Boolean(false).to_string(),
        r#"{"type": "bool", "value": "false"}"#
    );
}
