use crate::syntax::project_onto_parse;
use crate::{
    AnnotationError, ErrorKind, MinimalTreeBuilder, OffsetRange, Parse, ParseSpanConstraint, Token,
    TokenSequence, TokenSpan,
};
use proptest::prelude::*;

fn the_boy_ran() -> TokenSequence {
    TokenSequence::from_text("The boy ran.", 0).unwrap()
}

fn build(spans: &[ParseSpanConstraint]) -> Result<Parse, AnnotationError> {
    MinimalTreeBuilder::new().build(&the_boy_ran(), spans)
}

#[test]
fn nested_spans_nest_bottom_up() {
    let parse = build(&[ParseSpanConstraint::new(4, 10), ParseSpanConstraint::new(0, 10)]).unwrap();

    insta::assert_snapshot!(parse, @"(S (X The (X boy ran)) .)");
    assert_eq!(parse.root().children().len(), 2);
}

#[test]
fn input_order_does_not_matter() {
    let forward = build(&[ParseSpanConstraint::new(4, 10), ParseSpanConstraint::new(0, 10)]).unwrap();
    let backward = build(&[ParseSpanConstraint::new(0, 10), ParseSpanConstraint::new(4, 10)]).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn no_constraints_gives_flat_tree_headed_by_first_token() {
    let parse = build(&[]).unwrap();

    insta::assert_snapshot!(parse, @"(S The boy ran .)");
    let root = parse.root();
    assert_eq!(root.head_index(), Some(0));
    assert!(root.children().iter().all(|child| child.is_terminal()));
}

#[test]
fn single_token_span_is_a_no_op() {
    let parse = build(&[ParseSpanConstraint::labeled(4, 6, "NN")]).unwrap();
    assert_eq!(parse, build(&[]).unwrap());
}

#[test]
fn duplicate_spans_do_not_double_wrap() {
    let once = build(&[ParseSpanConstraint::new(4, 10)]).unwrap();
    let twice = build(&[ParseSpanConstraint::new(4, 10), ParseSpanConstraint::new(4, 10)]).unwrap();

    insta::assert_snapshot!(once, @"(S The (X boy ran) .)");
    assert_eq!(once, twice);
}

#[test]
fn labels_and_heads_follow_convention() {
    let parse = build(&[
        ParseSpanConstraint::labeled(0, 6, "NP"),
        ParseSpanConstraint::labeled(8, 11, "VP"),
    ])
    .unwrap();

    insta::assert_snapshot!(parse, @"(S (NP The boy) (VP ran .))");
    let np = &parse.root().children()[0];
    assert_eq!(np.head().unwrap().label(), "The");
    assert_eq!(parse.root().head().unwrap().label(), "NP");
}

#[test]
fn whole_sentence_span_becomes_the_root() {
    let parse = build(&[
        ParseSpanConstraint::labeled(0, 11, "FRAG"),
        ParseSpanConstraint::labeled(4, 10, "VP"),
    ])
    .unwrap();

    insta::assert_snapshot!(parse, @"(FRAG The (VP boy ran) .)");
    assert_eq!(parse.root().span(), TokenSpan::new(0, 3));
}

#[test]
fn crossing_spans_are_a_structural_violation() {
    let err = build(&[ParseSpanConstraint::new(0, 6), ParseSpanConstraint::new(4, 10)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralInvariantViolation);
}

#[test]
fn span_splitting_a_token_crosses_it() {
    let err = build(&[ParseSpanConstraint::new(5, 10)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralInvariantViolation);
}

#[test]
fn spans_outside_the_sentence_or_between_tokens_are_malformed() {
    let outside = build(&[ParseSpanConstraint::new(0, 20)]).unwrap_err();
    assert!(matches!(outside, AnnotationError::MalformedConstraint { .. }));

    let whitespace = build(&[ParseSpanConstraint::new(3, 3)]).unwrap_err();
    assert!(matches!(whitespace, AnnotationError::MalformedConstraint { .. }));
}

#[test]
fn whitespace_padded_spans_are_malformed() {
    // The space before "boy" is not part of any token.
    let padded = build(&[ParseSpanConstraint::new(4, 10), ParseSpanConstraint::new(3, 10)]).unwrap_err();
    assert!(matches!(padded, AnnotationError::MalformedConstraint { .. }));

    let tokens = TokenSequence::new(vec![
        Token::new("A", 0, 0),
        Token::new("b", 10, 10),
        Token::new("c", 12, 12),
    ])
    .unwrap();
    let builder = MinimalTreeBuilder::new();
    let err = builder
        .build(&tokens, &[ParseSpanConstraint::new(1, 10), ParseSpanConstraint::new(10, 12)])
        .unwrap_err();
    assert!(matches!(err, AnnotationError::MalformedConstraint { .. }));

    let aligned = builder.build(&tokens, &[ParseSpanConstraint::new(10, 12)]).unwrap();
    insta::assert_snapshot!(aligned, @"(S A (X b c))");
}

#[test]
fn inverted_span_is_malformed() {
    let inverted = ParseSpanConstraint {
        range: OffsetRange { start: 9, end: 5 },
        label: None,
        external_id: None,
    };
    let err = build(&[ParseSpanConstraint::new(4, 10), inverted]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn single_token_sentence() {
    let tokens = TokenSequence::from_text("Stop", 0).unwrap();
    let parse = MinimalTreeBuilder::new()
        .with_labels("FRAG", "X")
        .build(&tokens, &[])
        .unwrap();
    insta::assert_snapshot!(parse, @"(FRAG Stop)");
}

// Sentences of `n` two-letter words: token `i` covers characters [3i, 3i+1].
fn uniform_tokens(n: usize) -> TokenSequence {
    TokenSequence::from_text(&vec!["ab"; n].join(" "), 0).unwrap()
}

fn char_range(start_token: usize, end_token: usize) -> OffsetRange {
    OffsetRange::new(3 * start_token, 3 * end_token + 1)
}

fn spans_for(pairs: &[(usize, usize)]) -> Vec<ParseSpanConstraint> {
    pairs
        .iter()
        .map(|&(s, e)| {
            let range = char_range(s, e);
            ParseSpanConstraint::new(range.start, range.end)
        })
        .collect()
}

fn token_pairs_cross(a: (usize, usize), b: (usize, usize)) -> bool {
    (a.0 < b.0 && b.0 <= a.1 && a.1 < b.1) || (b.0 < a.0 && a.0 <= b.1 && b.1 < a.1)
}

/// A sentence length plus a random set of pairwise non-crossing token spans.
fn bracketing() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12)
        .prop_flat_map(|n| {
            let span = (0..n, 0..n).prop_map(|(x, y)| (x.min(y), x.max(y)));
            (Just(n), prop::collection::vec(span, 0..12))
        })
        .prop_map(|(n, raw)| {
            let mut kept: Vec<(usize, usize)> = Vec::new();
            for span in raw {
                if !kept.iter().any(|&other| token_pairs_cross(span, other)) {
                    kept.push(span);
                }
            }
            (n, kept)
        })
}

/// A sentence length plus two token spans `[a, c]` and `[b, d]` with `a < b <= c < d`.
fn crossing_pair() -> impl Strategy<Value = (usize, (usize, usize), (usize, usize))> {
    (3usize..10).prop_flat_map(|n| {
        (0..n - 2).prop_flat_map(move |a| {
            ((a + 1)..(n - 1)).prop_flat_map(move |b| {
                (b..(n - 1)).prop_flat_map(move |c| {
                    ((c + 1)..n).prop_map(move |d| (n, (a, c), (b, d)))
                })
            })
        })
    })
}

proptest! {
    #[test]
    fn every_non_crossing_span_is_realised((n, pairs) in bracketing()) {
        let tokens = uniform_tokens(n);
        let parse = MinimalTreeBuilder::new().build(&tokens, &spans_for(&pairs)).unwrap();

        prop_assert_eq!(parse.root().span(), TokenSpan::new(0, n - 1));
        for &(s, e) in &pairs {
            let node = project_onto_parse(&parse, char_range(s, e)).unwrap();
            prop_assert_eq!(node.span(), TokenSpan::new(s, e));
        }
    }

    #[test]
    fn repeating_a_realised_span_changes_nothing((n, pairs) in bracketing()) {
        prop_assume!(!pairs.is_empty());
        let tokens = uniform_tokens(n);
        let spans = spans_for(&pairs);
        let first = MinimalTreeBuilder::new().build(&tokens, &spans).unwrap();

        let mut with_duplicate = spans.clone();
        with_duplicate.push(spans[0].clone());
        let second = MinimalTreeBuilder::new().build(&tokens, &with_duplicate).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn any_crossing_pair_is_rejected((n, left, right) in crossing_pair()) {
        let tokens = uniform_tokens(n);
        let err = MinimalTreeBuilder::new()
            .build(&tokens, &spans_for(&[left, right]))
            .unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::StructuralInvariantViolation);
    }
}
