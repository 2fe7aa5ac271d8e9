use itertools::{repeat_n, Itertools};
use rand::Rng;

use crate::{
    algebra::BooleanAlgebra,
    automaton::{algorithms::witness_of, Sfa},
    budget::Budget,
    error::SfaResult,
    validation::random::random_walk,
};

/// One symbol per minterm of all guards of `a` and `b`. Two symbols of the
/// same minterm are treated identically by both automata, so words over this
/// alphabet cover every behavior up to a given length.
pub fn representative_alphabet<A: BooleanAlgebra>(
    a: &Sfa<A::Pred>,
    b: &Sfa<A::Pred>,
    ba: &A,
) -> SfaResult<Vec<A::Symbol>> {
    let guards = a
        .moves()
        .iter()
        .chain(b.moves())
        .filter_map(|mv| mv.guard())
        .cloned()
        .collect_vec();

    ba.minterms(&guards, &Budget::unlimited())?
        .iter()
        .map(|minterm| witness_of(ba, &minterm.guard))
        .collect()
}

/// Returns the first word (shortest first) up to `max_word_length` on which
/// `a` and `b` disagree, together with whether `a` accepts it.
pub fn first_difference<A: BooleanAlgebra>(
    a: &Sfa<A::Pred>,
    b: &Sfa<A::Pred>,
    ba: &A,
    max_word_length: usize,
) -> SfaResult<Option<(Vec<A::Symbol>, bool)>> {
    let alphabet = representative_alphabet(a, b, ba)?;

    for i in 0..=max_word_length {
        let combinations = repeat_n(alphabet.iter(), i).multi_cartesian_product();

        for word in combinations {
            let word: Vec<A::Symbol> = word.into_iter().cloned().collect_vec();
            let accepted_by_a = a.accepts(&word, ba)?;
            if accepted_by_a != b.accepts(&word, ba)? {
                return Ok(Some((word, accepted_by_a)));
            }
        }
    }

    Ok(None)
}

/// Checks if two automata accept the same words up to a certain length.
pub fn same_language<A: BooleanAlgebra>(
    a: &Sfa<A::Pred>,
    b: &Sfa<A::Pred>,
    ba: &A,
    max_word_length: usize,
) -> SfaResult<bool> {
    Ok(first_difference(a, b, ba, max_word_length)?.is_none())
}

pub fn assert_same_language<A: BooleanAlgebra>(
    a: &Sfa<A::Pred>,
    b: &Sfa<A::Pred>,
    ba: &A,
    max_word_length: usize,
) {
    match first_difference(a, b, ba, max_word_length) {
        Ok(None) => {}
        Ok(Some((word, true))) => panic!(
            "{:?} is accepted by automaton `a` but not by automaton `b`. Thus their languages are not equal.",
            word
        ),
        Ok(Some((word, false))) => panic!(
            "{:?} is accepted by automaton `b` but not by automaton `a`. Thus their languages are not equal.",
            word
        ),
        Err(e) => panic!("could not compare languages: {e}"),
    }
}

/// Assert that the language accepted by automaton `a` is the inverse of the
/// language accepted by automaton `b`. Meaning no word is accepted by both and
/// no word is accepted by none.
pub fn assert_inverse_language<A: BooleanAlgebra>(
    a: &Sfa<A::Pred>,
    b: &Sfa<A::Pred>,
    ba: &A,
    max_word_length: usize,
) {
    let alphabet = representative_alphabet(a, b, ba).unwrap_or_else(|e| panic!("could not compute an alphabet: {e}"));

    for i in 0..=max_word_length {
        for word in repeat_n(alphabet.iter(), i).multi_cartesian_product() {
            let word: Vec<A::Symbol> = word.into_iter().cloned().collect_vec();
            match (accepts_or_panic(a, &word, ba), accepts_or_panic(b, &word, ba)) {
                (true, true) => panic!(
                    "{:?} is accepted by automaton `a` and by automaton `b`. Thus their languages are not inverse.",
                    word
                ),
                (false, false) => panic!(
                    "{:?} is accepted by neither automaton `a` nor automaton `b`. Thus their languages are not inverse.",
                    word
                ),
                _ => {}
            }
        }
    }
}

/// Assert that the language accepted by automaton `a` is a subset of the
/// language accepted by automaton `b`.
pub fn assert_subset_language<A: BooleanAlgebra>(
    a: &Sfa<A::Pred>,
    b: &Sfa<A::Pred>,
    ba: &A,
    max_word_length: usize,
) {
    let alphabet = representative_alphabet(a, b, ba).unwrap_or_else(|e| panic!("could not compute an alphabet: {e}"));

    for i in 0..=max_word_length {
        for word in repeat_n(alphabet.iter(), i).multi_cartesian_product() {
            let word: Vec<A::Symbol> = word.into_iter().cloned().collect_vec();
            if accepts_or_panic(a, &word, ba) && !accepts_or_panic(b, &word, ba) {
                panic!(
                    "{:?} is accepted by automaton `a` but not by automaton `b`. Thus the language of `a` is not a subset of `b`.",
                    word
                );
            }
        }
    }
}

/// Samples accepted words of each automaton by random walks and asserts that
/// the other automaton accepts them too.
pub fn assert_same_language_sampled<A: BooleanAlgebra, R: Rng>(
    a: &Sfa<A::Pred>,
    b: &Sfa<A::Pred>,
    ba: &A,
    rng: &mut R,
    samples: usize,
    max_word_length: usize,
) {
    for (name, from, to) in [("a", a, b), ("b", b, a)] {
        for _ in 0..samples {
            let Some(word) = random_walk(from, ba, rng, max_word_length)
                .unwrap_or_else(|e| panic!("random walk failed: {e}"))
            else {
                continue;
            };

            assert!(
                accepts_or_panic(to, &word, ba),
                "{:?} was sampled from automaton `{}` but is rejected by the other automaton",
                word,
                name
            );
        }
    }
}

fn accepts_or_panic<A: BooleanAlgebra>(sfa: &Sfa<A::Pred>, word: &[A::Symbol], ba: &A) -> bool {
    sfa.accepts(word, ba)
        .unwrap_or_else(|e| panic!("could not run automaton on {:?}: {e}", word))
}
