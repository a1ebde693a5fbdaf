use super::*;

#[test]
fn construction() {
    let span = Span::new(3, 9);
    assert_eq!(span.start, 3);
    assert_eq!(span.end, 9);
    assert_eq!(span.len(), 6);
    assert!(!span.is_empty());
    assert!(Span::new(0, 0).is_empty());
    assert!(Span::default().is_empty());
}

#[test]
fn range_conversions() {
    let span = Span::from(4u32..11u32);
    assert_eq!(span, Span::new(4, 11));

    let range: std::ops::Range<u32> = span.into();
    assert_eq!(range, 4..11);

    let range: std::ops::Range<usize> = span.into();
    assert_eq!(range, 4..11);
}

#[test]
fn inverted_spans_have_no_length() {
    assert_eq!(Span::new(9, 3).len(), 0);
}
