use std::time::Duration;

use symbolic_automata::{
    algebra::interval::{CharIntervalAlgebra, CharPred},
    automaton::{Move, Sfa, StateId},
    budget::Budget,
    error::SfaError,
    validation::{
        random::{random_sfa, RandomSfaOptions},
        same_language::{assert_inverse_language, assert_same_language},
    },
};

fn word(input: &str) -> Vec<char> {
    input.chars().collect()
}

/// Accepts exactly the one-character string `c`.
fn single(c: char, ba: &CharIntervalAlgebra) -> Sfa<CharPred> {
    Sfa::build(vec![Move::guarded(0, 1, CharPred::char(c))], 0, [1], ba).unwrap()
}

/// Accepts every string over `pred`.
fn all_of(pred: CharPred, ba: &CharIntervalAlgebra) -> Sfa<CharPred> {
    Sfa::build(vec![Move::guarded(0, 0, pred)], 0, [0], ba).unwrap()
}

fn ab_star(ba: &CharIntervalAlgebra) -> Sfa<CharPred> {
    Sfa::build(
        vec![
            Move::guarded(0, 1, CharPred::char('a')),
            Move::guarded(1, 1, CharPred::char('b')),
        ],
        0,
        [1],
        ba,
    )
    .unwrap()
}

#[test]
fn test_union_of_single_characters() {
    let ba = CharIntervalAlgebra;
    let union = single('a', &ba).union_with(&single('b', &ba), &ba).unwrap();

    assert!(union.accepts(&word("a"), &ba).unwrap());
    assert!(union.accepts(&word("b"), &ba).unwrap());
    assert!(!union.accepts(&word("ab"), &ba).unwrap());
    assert!(!union.accepts(&word("c"), &ba).unwrap());
    assert!(!union.accepts(&word(""), &ba).unwrap());

    // the copies do not overlap
    assert_eq!(union.state_count(), 5);
    assert!(!union.is_epsilon_free());
}

#[test]
fn test_union_is_commutative_and_associative() {
    let ba = CharIntervalAlgebra;
    let a = ab_star(&ba);
    let b = all_of(CharPred::num(), &ba);
    let c = single('z', &ba);

    let ab = a.union_with(&b, &ba).unwrap();
    let b_or_a = b.union_with(&a, &ba).unwrap();
    assert!(ab.is_equivalent_to(&b_or_a, &ba).unwrap());

    let left = ab.union_with(&c, &ba).unwrap();
    let right = a.union_with(&b.union_with(&c, &ba).unwrap(), &ba).unwrap();
    assert!(left.is_equivalent_to(&right, &ba).unwrap());
}

#[test]
fn test_union_with_empty() {
    let ba = CharIntervalAlgebra;
    let empty = Sfa::empty(&ba);

    assert!(empty.union_with(&empty, &ba).unwrap().is_empty());

    let a = ab_star(&ba);
    let union = a.union_with(&empty, &ba).unwrap();
    assert!(union.is_equivalent_to(&a, &ba).unwrap());
}

#[test]
fn test_intersection() {
    let ba = CharIntervalAlgebra;

    let lower = all_of(CharPred::lower_alpha(), &ba);
    let digits_or_a = all_of(CharPred::of_ranges([('0', '9'), ('a', 'a')]), &ba);

    let intersection = lower.intersection_with(&digits_or_a, &ba).unwrap();

    assert!(intersection.accepts(&word(""), &ba).unwrap());
    assert!(intersection.accepts(&word("aaa"), &ba).unwrap());
    assert!(!intersection.accepts(&word("b"), &ba).unwrap());
    assert!(!intersection.accepts(&word("1"), &ba).unwrap());

    let a_star = all_of(CharPred::char('a'), &ba);
    assert!(intersection.is_equivalent_to(&a_star, &ba).unwrap());
}

#[test]
fn test_intersection_with_epsilon_moves() {
    let ba = CharIntervalAlgebra;

    // a ε b* with an epsilon move in the middle
    let left = Sfa::build(
        vec![
            Move::guarded(0, 1, CharPred::char('a')),
            Move::epsilon(1, 2),
            Move::guarded(2, 2, CharPred::char('b')),
        ],
        0,
        [2],
        &ba,
    )
    .unwrap();

    let intersection = left.intersection_with(&ab_star(&ba), &ba).unwrap();

    assert!(intersection.is_epsilon_free());
    assert_same_language(&intersection, &ab_star(&ba), &ba, 4);
}

#[test]
fn test_intersection_with_complement_is_empty() {
    let ba = CharIntervalAlgebra;
    let a = ab_star(&ba);

    let complement = a.complement(&ba).unwrap();
    let intersection = a.intersection_with(&complement, &ba).unwrap();

    assert!(intersection.is_empty());
    assert_eq!(intersection.state_count(), 1);
    assert!(intersection.finals().is_empty());
}

#[test]
fn test_complement() {
    let ba = CharIntervalAlgebra;
    let a = ab_star(&ba);
    let complement = a.complement(&ba).unwrap();

    assert!(complement.is_deterministic(&ba).unwrap());
    assert!(complement.is_total(&ba).unwrap());

    for input in ["", "b", "aa", "aba", "c"] {
        assert!(complement.accepts(&word(input), &ba).unwrap(), "{input}");
    }
    for input in ["a", "ab", "abbb"] {
        assert!(!complement.accepts(&word(input), &ba).unwrap(), "{input}");
    }

    assert_inverse_language(&a, &complement, &ba, 4);

    let twice = complement.complement(&ba).unwrap();
    assert!(twice.is_equivalent_to(&a, &ba).unwrap());
}

#[test]
fn test_complement_of_empty_and_full() {
    let ba = CharIntervalAlgebra;

    let full = Sfa::empty(&ba).complement(&ba).unwrap();
    assert!(full.accepts(&word(""), &ba).unwrap());
    assert!(full.accepts(&word("xyz"), &ba).unwrap());

    let empty = Sfa::full(&ba).complement(&ba).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_totalize() {
    let ba = CharIntervalAlgebra;
    let a = ab_star(&ba);
    assert!(!a.is_total(&ba).unwrap());

    let total = a.totalize(&ba).unwrap();
    assert!(total.is_total(&ba).unwrap());
    // one sink state added
    assert_eq!(total.state_count(), 3);
    assert_eq!(total.max_state_id(), 2);
    assert_same_language(&a, &total, &ba, 4);

    let again = total.totalize(&ba).unwrap();
    assert_eq!(again.state_count(), 3);
}

#[test]
fn test_concatenation() {
    let ba = CharIntervalAlgebra;
    let ab = single('a', &ba).concatenate_with(&single('b', &ba), &ba).unwrap();

    assert!(ab.accepts(&word("ab"), &ba).unwrap());
    assert!(!ab.accepts(&word("a"), &ba).unwrap());
    assert!(!ab.accepts(&word("b"), &ba).unwrap());
    assert!(!ab.accepts(&word("abb"), &ba).unwrap());

    let b_star = all_of(CharPred::char('b'), &ba);
    let a_b_star = single('a', &ba).concatenate_with(&b_star, &ba).unwrap();
    assert!(a_b_star.is_equivalent_to(&ab_star(&ba), &ba).unwrap());

    let empty = Sfa::empty(&ba);
    assert!(ab.concatenate_with(&empty, &ba).unwrap().is_empty());
    assert!(empty.concatenate_with(&ab, &ba).unwrap().is_empty());
}

#[test]
fn test_star() {
    let ba = CharIntervalAlgebra;
    let ab = single('a', &ba).concatenate_with(&single('b', &ba), &ba).unwrap();
    let star = ab.star(&ba).unwrap();

    for input in ["", "ab", "abab", "ababab"] {
        assert!(star.accepts(&word(input), &ba).unwrap(), "{input}");
    }
    for input in ["a", "aba", "ba", "abb"] {
        assert!(!star.accepts(&word(input), &ba).unwrap(), "{input}");
    }

    let empty_star = Sfa::empty(&ba).star(&ba).unwrap();
    assert!(empty_star.accepts(&word(""), &ba).unwrap());
    assert!(!empty_star.accepts(&word("a"), &ba).unwrap());
}

#[test]
fn test_minus() {
    let ba = CharIntervalAlgebra;
    let lower = all_of(CharPred::lower_alpha(), &ba);
    let a_star = all_of(CharPred::char('a'), &ba);

    let difference = lower.minus(&a_star, &ba).unwrap();

    assert!(difference.accepts(&word("b"), &ba).unwrap());
    assert!(difference.accepts(&word("ab"), &ba).unwrap());
    assert!(!difference.accepts(&word(""), &ba).unwrap());
    assert!(!difference.accepts(&word("aa"), &ba).unwrap());
    assert!(!difference.accepts(&word("B"), &ba).unwrap());

    assert!(a_star.minus(&lower, &ba).unwrap().is_empty());
}

/// a, ending in the largest possible state id
fn a_to_max_id(ba: &CharIntervalAlgebra) -> Sfa<CharPred> {
    Sfa::build(
        vec![Move::guarded(0, StateId::MAX, CharPred::char('a'))],
        0,
        [StateId::MAX],
        ba,
    )
    .unwrap()
}

#[test]
fn test_combinators_with_large_state_ids() {
    let ba = CharIntervalAlgebra;
    let a = a_to_max_id(&ba);
    assert_eq!(a.max_state_id(), StateId::MAX);

    let ab = a.concatenate_with(&single('b', &ba), &ba).unwrap();
    assert!(ab.accepts(&word("ab"), &ba).unwrap());
    assert!(!ab.accepts(&word("b"), &ba).unwrap());
    assert!(!ab.accepts(&word("aab"), &ba).unwrap());

    let union = a.union_with(&a_to_max_id(&ba), &ba).unwrap();
    assert_eq!(union.state_count(), 5);
    assert!(union.accepts(&word("a"), &ba).unwrap());
    assert!(!union.accepts(&word("aa"), &ba).unwrap());

    let b_or_a = single('b', &ba).union_with(&a, &ba).unwrap();
    assert!(b_or_a.accepts(&word("a"), &ba).unwrap());
    assert!(b_or_a.accepts(&word("b"), &ba).unwrap());

    let star = a.star(&ba).unwrap();
    assert!(star.accepts(&word(""), &ba).unwrap());
    assert!(star.accepts(&word("aaa"), &ba).unwrap());
    assert!(!star.accepts(&word("b"), &ba).unwrap());

    // the sink takes the smallest free id
    let total = a.totalize(&ba).unwrap();
    assert_eq!(total.state_count(), 3);
    assert!(total.states().contains(&1));
    assert_same_language(&a, &total, &ba, 3);

    let complement = a.complement(&ba).unwrap();
    assert_inverse_language(&a, &complement, &ba, 3);
}

#[test]
fn test_boolean_laws_random() {
    let ba = CharIntervalAlgebra;

    for seed in 0..15 {
        let options = RandomSfaOptions::default().with_seed(seed);
        let a = random_sfa(&options, &ba).unwrap();
        let b = random_sfa(&options.clone().with_seed(seed + 100), &ba).unwrap();
        let c = random_sfa(
            &options
                .with_seed(seed + 200)
                .with_epsilon_probability(0.3)
                .with_guards(vec![CharPred::char('a'), CharPred::range('a', 'c')]),
            &ba,
        )
        .unwrap();

        let complement = a.complement(&ba).unwrap();
        assert_inverse_language(&a, &complement, &ba, 3);

        let twice = complement.complement(&ba).unwrap();
        assert!(twice.is_equivalent_to(&a, &ba).unwrap(), "seed {seed}");

        let nothing = a.intersection_with(&complement, &ba).unwrap();
        assert!(nothing.is_empty(), "seed {seed}");
        assert_eq!(nothing.state_count(), 1, "seed {seed}");

        let ab = a.union_with(&b, &ba).unwrap();
        let b_or_a = b.union_with(&a, &ba).unwrap();
        assert!(ab.is_equivalent_to(&b_or_a, &ba).unwrap(), "seed {seed}");

        let left = ab.union_with(&c, &ba).unwrap();
        let right = a.union_with(&b.union_with(&c, &ba).unwrap(), &ba).unwrap();
        assert!(left.is_equivalent_to(&right, &ba).unwrap(), "seed {seed}");
    }
}

#[test]
fn test_intersection_timeout() {
    let ba = CharIntervalAlgebra;
    let budget = Budget::with_time_limit(Duration::ZERO);

    let result = ab_star(&ba).intersection_with_within(&all_of(CharPred::lower_alpha(), &ba), &ba, &budget);

    assert_eq!(result.unwrap_err(), SfaError::Timeout(Duration::ZERO));
}
