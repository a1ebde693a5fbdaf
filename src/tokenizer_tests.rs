use super::*;

fn tok(text: &str) -> Tokenizer {
    Tokenizer::new(text.as_bytes().to_vec().into_boxed_slice(), 1 << 24)
        .expect("line cap not reached")
}

// ── advancing ───────────────────────────────────────────────────

#[test]
fn empty_input_is_exhausted() {
    let t = tok("");
    assert!(!t.has_token());
}

#[test]
fn advance_shifts_lookback() {
    let mut t = tok("abc");
    assert_eq!(t.current(), b'a');
    assert_eq!(t.prev(), 0);
    assert_eq!(t.prev_prev(), 0);

    assert!(t.advance());
    assert_eq!(t.current(), b'b');
    assert_eq!(t.prev(), b'a');
    assert_eq!(t.prev_prev(), 0);

    assert!(t.advance());
    assert_eq!(t.current(), b'c');
    assert_eq!(t.prev(), b'b');
    assert_eq!(t.prev_prev(), b'a');
}

#[test]
fn first_read_past_end_still_counts() {
    let mut t = tok("x");
    assert!(t.has_token());
    // the read that runs off the end succeeds once
    assert!(t.advance());
    assert!(!t.has_token());
    // after exhaustion advances report failure
    assert!(!t.advance());
    assert!(!t.advance());
}

// ── line and column tracking ────────────────────────────────────

#[test]
fn line_and_column() {
    let mut t = tok("ab\ncd");
    assert_eq!((t.line(), t.col()), (1, 1));
    t.advance();
    assert_eq!((t.line(), t.col()), (1, 2));
    t.advance(); // '\n'
    assert_eq!((t.line(), t.col()), (1, 3));
    t.advance(); // 'c'
    assert_eq!((t.line(), t.col()), (2, 1));
    t.advance(); // 'd'
    assert_eq!((t.line(), t.col()), (2, 2));
}

#[test]
fn line_cap() {
    let text = "a\nb\nc\n";
    assert!(Tokenizer::new(text.as_bytes().to_vec().into_boxed_slice(), 2).is_none());
    assert!(Tokenizer::new(text.as_bytes().to_vec().into_boxed_slice(), 4).is_some());
}

#[test]
fn fresh_line_flag() {
    let mut t = tok("  a\n  b");
    assert!(t.fresh_line());
    t.advance();
    t.advance(); // onto 'a', only whitespace consumed
    assert!(t.fresh_line());
    t.advance(); // 'a' consumed
    assert!(!t.fresh_line());
    t.advance(); // newline consumed
    assert!(t.fresh_line());
    t.advance();
    t.advance(); // onto 'b'
    assert!(t.fresh_line());
    t.advance();
    assert!(!t.fresh_line());
}

// ── backtrack ───────────────────────────────────────────────────

#[test]
fn backtrack_restores_lookback_pair() {
    let mut t = tok("abcdef");
    for _ in 0..5 {
        t.advance();
    }
    assert_eq!(t.current(), b'f');

    t.backtrack(2);
    assert_eq!(t.current(), b'd');
    assert_eq!(t.prev(), b'c');
    assert_eq!(t.prev_prev(), b'b');
}

#[test]
fn backtrack_near_start() {
    let mut t = tok("abc");
    t.advance();
    t.advance(); // on 'c'
    t.backtrack(2);
    assert_eq!(t.current(), b'a');
    assert_eq!(t.prev(), 0);
    assert_eq!(t.prev_prev(), 0);

    t.advance();
    t.backtrack(1);
    assert_eq!(t.current(), b'a');
    assert_eq!(t.prev(), 0);
}

#[test]
fn backtrack_from_exhausted() {
    let mut t = tok("xy");
    t.advance();
    t.advance();
    assert!(!t.has_token());

    t.backtrack(1);
    assert!(t.has_token());
    assert_eq!(t.current(), b'y');
    assert_eq!(t.prev(), b'x');
}

#[test]
fn backtrack_across_newline_reseats_position() {
    let mut t = tok("a\nbc");
    for _ in 0..3 {
        t.advance();
    }
    assert_eq!((t.line(), t.col()), (2, 2)); // on 'c'

    t.backtrack(3);
    assert_eq!(t.current(), b'a');
    assert_eq!((t.line(), t.col()), (1, 1));
    assert!(t.fresh_line());
}

#[test]
fn randomized_backtrack_matches_history() {
    let text = "key = \"value\"\nnums = [1, 2, 3]\n# note\n[table]\nx = 1979-05-27\n";
    let mut rng = oorandom::Rand32::new(7);

    for _ in 0..2000 {
        let mut t = tok(text);
        // (pos, current, prev, prev_prev, line, col) at every step
        let mut history = vec![(
            t.pos(),
            t.current(),
            t.prev(),
            t.prev_prev(),
            t.line(),
            t.col(),
        )];
        let steps = 2 + (rng.rand_u32() as usize % (text.len() - 2));
        for _ in 0..steps {
            t.advance();
            history.push((
                t.pos(),
                t.current(),
                t.prev(),
                t.prev_prev(),
                t.line(),
                t.col(),
            ));
        }
        let back = 1 + (rng.rand_u32() as usize % steps.min(text.len() - 1));
        t.backtrack(back);
        let expected = history[steps - back];
        let got = (
            t.pos(),
            t.current(),
            t.prev(),
            t.prev_prev(),
            t.line(),
            t.col(),
        );
        assert_eq!(got, expected, "steps={steps} back={back}");
    }
}
