use super::*;

#[test]
fn whitespace_and_digits() {
    assert!(is_whitespace(b' '));
    assert!(is_whitespace(b'\t'));
    assert!(!is_whitespace(b'\n'));
    assert!(!is_whitespace(b'a'));

    for b in b'0'..=b'9' {
        assert!(is_digit(b));
        assert!(is_hex_digit(b));
    }
    assert!(!is_digit(b'a'));
    assert!(is_hex_digit(b'a'));
    assert!(is_hex_digit(b'F'));
    assert!(!is_hex_digit(b'g'));
}

#[test]
fn bare_key_bytes() {
    for b in [b'a', b'Z', b'0', b'9', b'-', b'_'] {
        assert!(is_bare_key_byte(b));
    }
    for b in [b'.', b' ', b'=', b'[', b'"', b'\'', 0x80] {
        assert!(!is_bare_key_byte(b), "{b:#x}");
    }
}

#[test]
fn number_start() {
    assert!(is_number_start(b'+'));
    assert!(is_number_start(b'-'));
    assert!(is_number_start(b'7'));
    assert!(!is_number_start(b'.'));
    assert!(!is_number_start(b'e'));
}

#[test]
fn control_sets() {
    // single-line basic: tab passes, newline and DEL do not
    assert!(!is_control(0x09));
    assert!(is_control(0x0A));
    assert!(is_control(0x0D));
    assert!(is_control(0x00));
    assert!(is_control(0x7F));
    assert!(!is_control(b'a'));
    assert!(!is_control(0x80));

    // multi-line basic: tab, LF and CR all pass
    assert!(!is_control_multi(0x09));
    assert!(!is_control_multi(0x0A));
    assert!(!is_control_multi(0x0D));
    assert!(is_control_multi(0x0B));
    assert!(is_control_multi(0x0C));
    assert!(is_control_multi(0x7F));

    // literal: tab and LF pass, a lone CR does not
    assert!(!is_control_literal(0x09));
    assert!(!is_control_literal(0x0A));
    assert!(is_control_literal(0x0D));
    assert!(is_control_literal(0x1F));
    assert!(is_control_literal(0x7F));
    assert!(!is_control_literal(b' '));
}

#[test]
fn number_end_sets() {
    for b in [b'#', b' ', b'\n'] {
        assert!(is_number_end(b, STATEMENT_END));
    }
    assert!(!is_number_end(b',', STATEMENT_END));

    for b in [b'#', b',', b']', b' ', b'\n'] {
        assert!(is_number_end(b, ARRAY_END));
    }

    for b in [b',', b' ', b'}'] {
        assert!(is_number_end(b, INLINE_TABLE_END));
    }
    assert!(!is_number_end(b'\n', INLINE_TABLE_END));
    assert!(!is_number_end(b'#', INLINE_TABLE_END));
}

#[test]
fn hex_values() {
    assert_eq!(hex_value(b'0'), 0);
    assert_eq!(hex_value(b'9'), 9);
    assert_eq!(hex_value(b'a'), 10);
    assert_eq!(hex_value(b'F'), 15);
    assert_eq!(hex_value(b'g'), -1);
    assert_eq!(hex_value(b' '), -1);
}

#[test]
fn descriptions() {
    assert_eq!(describe(b'='), "an equals");
    assert_eq!(describe(b'x'), "an identifier");
    assert_eq!(describe(b'"'), "a string");
    assert_eq!(describe(b'\''), "a string");
    assert_eq!(describe(0x01), "a character");
}
