use symbolic_automata::{
    algebra::{
        interval::{CharIntervalAlgebra, CharPred},
        BooleanAlgebra,
    },
    automaton::{BuildOptions, Move, Sfa},
};

fn word(input: &str) -> Vec<char> {
    input.chars().collect()
}

/// a b*
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
fn test_ab_star() {
    let ba = CharIntervalAlgebra;
    let sfa = ab_star(&ba);

    assert!(sfa.accepts(&word("a"), &ba).unwrap());
    assert!(sfa.accepts(&word("ab"), &ba).unwrap());
    assert!(sfa.accepts(&word("abbbb"), &ba).unwrap());

    assert!(!sfa.accepts(&word("b"), &ba).unwrap());
    assert!(!sfa.accepts(&word(""), &ba).unwrap());
    assert!(!sfa.accepts(&word("aba"), &ba).unwrap());

    assert_eq!(sfa.state_count(), 2);
    assert_eq!(sfa.transition_count(), 2);
    assert!(sfa.is_deterministic(&ba).unwrap());
    assert!(!sfa.is_total(&ba).unwrap());
    assert!(!sfa.is_empty());
}

#[test]
fn test_empty_and_full() {
    let ba = CharIntervalAlgebra;

    let empty = Sfa::empty(&ba);
    assert!(empty.is_empty());
    assert_eq!(empty.state_count(), 1);
    assert!(empty.finals().is_empty());
    assert!(empty.is_deterministic(&ba).unwrap());
    assert!(empty.is_total(&ba).unwrap());
    assert!(empty.is_epsilon_free());
    assert!(!empty.accepts(&word(""), &ba).unwrap());
    assert!(!empty.accepts(&word("abc"), &ba).unwrap());

    let full = Sfa::full(&ba);
    assert!(!full.is_empty());
    assert!(full.accepts(&word(""), &ba).unwrap());
    assert!(full.accepts(&word("any string at all"), &ba).unwrap());
}

#[test]
fn test_build_without_finals_is_empty() {
    let ba = CharIntervalAlgebra;

    let sfa = Sfa::build(vec![Move::guarded(0, 1, CharPred::char('a'))], 0, [], &ba).unwrap();

    assert!(sfa.is_empty());
    assert_eq!(sfa.state_count(), 1);
    assert_eq!(sfa.initial(), 0);
}

#[test]
fn test_build_drops_unsatisfiable_guards() {
    let ba = CharIntervalAlgebra;

    let sfa = Sfa::build(
        vec![
            Move::guarded(0, 1, CharPred::char('a')),
            Move::guarded(0, 1, CharPred::empty()),
            Move::guarded(1, 2, CharPred::range('z', 'a')),
        ],
        0,
        [1, 2],
        &ba,
    )
    .unwrap();

    assert_eq!(sfa.transition_count(), 1);
    // state 2 became unreachable
    assert_eq!(sfa.states().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(sfa.finals().iter().copied().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_build_merges_parallel_moves() {
    let ba = CharIntervalAlgebra;

    let sfa = Sfa::build(
        vec![
            Move::guarded(0, 1, CharPred::char('a')),
            Move::guarded(0, 1, CharPred::char('b')),
            Move::epsilon(1, 0),
            Move::epsilon(1, 0),
            Move::epsilon(1, 1),
        ],
        0,
        [1],
        &ba,
    )
    .unwrap();

    assert_eq!(sfa.transition_count(), 2);
    let guards: Vec<_> = sfa.guarded_moves_from(0).collect();
    assert_eq!(guards, vec![(1, &CharPred::range('a', 'b'))]);
    assert_eq!(sfa.epsilon_moves_from(1).collect::<Vec<_>>(), vec![0]);

    let raw = Sfa::build_with(
        vec![
            Move::guarded(0, 1, CharPred::char('a')),
            Move::guarded(0, 1, CharPred::char('b')),
        ],
        0,
        [1],
        &ba,
        BuildOptions::raw(),
    )
    .unwrap();
    assert_eq!(raw.transition_count(), 2);

    let normalized = raw.normalize(&ba).unwrap();
    assert_eq!(normalized.transition_count(), 1);
}

#[test]
fn test_build_removes_dead_states() {
    let ba = CharIntervalAlgebra;

    let moves = vec![
        Move::guarded(0, 1, CharPred::char('a')),
        // 2 cannot reach a final state
        Move::guarded(0, 2, CharPred::char('b')),
        Move::guarded(2, 2, CharPred::char('b')),
        // 3 is unreachable
        Move::guarded(3, 1, CharPred::char('c')),
    ];

    let trimmed = Sfa::build(moves.clone(), 0, [1], &ba).unwrap();
    assert_eq!(trimmed.states().iter().copied().collect::<Vec<_>>(), vec![0, 1]);

    let kept = Sfa::build_with(moves, 0, [1], &ba, BuildOptions::keep_unreachable()).unwrap();
    assert_eq!(kept.state_count(), 4);
    assert_eq!(kept.max_state_id(), 3);
    assert_eq!(
        kept.alive_states().into_iter().collect::<Vec<_>>(),
        vec![0, 1]
    );

    let trimmed_later = kept.trim(&ba);
    assert_eq!(trimmed_later.state_count(), 2);
    assert_eq!(trimmed_later.transition_count(), 1);
}

#[test]
fn test_language_empty_without_cleanup() {
    let ba = CharIntervalAlgebra;

    // the final state exists but cannot be reached
    let sfa = Sfa::build_with(
        vec![Move::guarded(1, 2, CharPred::char('a'))],
        0,
        [2],
        &ba,
        BuildOptions::keep_unreachable(),
    )
    .unwrap();

    assert_eq!(sfa.state_count(), 3);
    assert!(sfa.is_empty());
    assert_eq!(sfa.witness(&ba).unwrap(), None);
}

#[test]
fn test_epsilon_closure() {
    let ba = CharIntervalAlgebra;

    let sfa = Sfa::build(
        vec![
            Move::epsilon(0, 1),
            Move::epsilon(1, 2),
            Move::epsilon(2, 0),
            Move::epsilon(3, 0),
            Move::guarded(2, 3, CharPred::char('a')),
        ],
        0,
        [3],
        &ba,
    )
    .unwrap();

    assert!(!sfa.is_epsilon_free());
    assert_eq!(
        sfa.epsilon_closure([0]).into_iter().collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(
        sfa.epsilon_closure([3]).into_iter().collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

#[test]
fn test_remove_epsilon_moves() {
    let ba = CharIntervalAlgebra;

    // [a-z]* where the initial state can silently move to a second final state
    let sfa = Sfa::build(
        vec![
            Move::epsilon(0, 1),
            Move::guarded(0, 0, CharPred::lower_alpha()),
        ],
        0,
        [0, 1],
        &ba,
    )
    .unwrap();

    let epsilon_free = sfa.remove_epsilon_moves(&ba).unwrap();
    assert!(epsilon_free.is_epsilon_free());
    assert!(epsilon_free.state_count() <= sfa.state_count());

    for input in ["", "a", "az", "hello"] {
        assert!(epsilon_free.accepts(&word(input), &ba).unwrap());
        assert!(sfa.accepts(&word(input), &ba).unwrap());
    }
    for input in ["A", "a3", "44"] {
        assert!(!epsilon_free.accepts(&word(input), &ba).unwrap());
        assert!(!sfa.accepts(&word(input), &ba).unwrap());
    }
}

#[test]
fn test_accepts_with_epsilon_moves() {
    let ba = CharIntervalAlgebra;

    // a ε b
    let sfa = Sfa::build(
        vec![
            Move::guarded(0, 1, CharPred::char('a')),
            Move::epsilon(1, 2),
            Move::guarded(2, 3, CharPred::char('b')),
        ],
        0,
        [3],
        &ba,
    )
    .unwrap();

    assert!(sfa.accepts(&word("ab"), &ba).unwrap());
    assert!(!sfa.accepts(&word("a"), &ba).unwrap());
    assert!(!sfa.accepts(&word("abb"), &ba).unwrap());
}

#[test]
fn test_witness() {
    let ba = CharIntervalAlgebra;

    let sfa = Sfa::build(
        vec![
            Move::guarded(0, 1, CharPred::num()),
            Move::epsilon(1, 2),
            Move::guarded(2, 3, CharPred::upper_alpha()),
            Move::guarded(0, 3, CharPred::spaces()),
        ],
        0,
        [3],
        &ba,
    )
    .unwrap();

    let witness = sfa.witness(&ba).unwrap().unwrap();
    assert!(sfa.accepts(&witness, &ba).unwrap());
    // the shortest path is the single space move
    assert_eq!(witness.len(), 1);
    assert!(ba.has_model(&CharPred::spaces(), &witness[0]).unwrap());

    assert_eq!(Sfa::empty(&ba).witness(&ba).unwrap(), None);
    assert_eq!(Sfa::full(&ba).witness(&ba).unwrap(), Some(vec![]));
}

#[test]
fn test_clone_is_independent() {
    let ba = CharIntervalAlgebra;
    let sfa = ab_star(&ba);

    let copy = sfa.clone();
    drop(sfa);

    assert_eq!(copy.state_count(), 2);
    assert!(copy.accepts(&word("abb"), &ba).unwrap());
    assert!(copy.is_deterministic(&ba).unwrap());
}

#[test]
fn test_graphviz() {
    let ba = CharIntervalAlgebra;
    let sfa = ab_star(&ba).union_with(&ab_star(&ba), &ba).unwrap();

    let dot = sfa.to_graphviz();
    assert!(dot.starts_with("digraph finite_state_machine {"));
    assert!(dot.contains("doublecircle"));
    assert!(dot.contains(&format!("START -> {};", sfa.initial())));
    assert!(dot.contains("label = \"[a]\""));
    assert!(dot.contains("label = \"ε\""));
}
