use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    algebra::{interval::CharPred, BooleanAlgebra},
    automaton::{algorithms::witness_of, BuildOptions, Move, Sfa, StateId},
    error::SfaResult,
};

/// Options for [`random_sfa`]. The same options always produce the same
/// automaton.
#[derive(Debug, Clone)]
pub struct RandomSfaOptions {
    seed: u64,
    state_count: u32,
    transition_count: usize,
    epsilon_probability: f64,
    final_probability: f64,
    guards: Vec<CharPred>,
}

impl Default for RandomSfaOptions {
    fn default() -> Self {
        RandomSfaOptions {
            seed: 0,
            state_count: 5,
            transition_count: 10,
            epsilon_probability: 0.1,
            final_probability: 0.3,
            // overlapping guards so that random automata are nondeterministic
            guards: vec![
                CharPred::char('a'),
                CharPred::char('b'),
                CharPred::range('a', 'b'),
                CharPred::range('b', 'd'),
                CharPred::lower_alpha(),
                CharPred::num(),
            ],
        }
    }
}

impl RandomSfaOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_state_count(mut self, state_count: u32) -> Self {
        self.state_count = state_count.max(1);
        self
    }

    pub fn with_transition_count(mut self, transition_count: usize) -> Self {
        self.transition_count = transition_count;
        self
    }

    pub fn with_epsilon_probability(mut self, epsilon_probability: f64) -> Self {
        self.epsilon_probability = epsilon_probability;
        self
    }

    pub fn with_final_probability(mut self, final_probability: f64) -> Self {
        self.final_probability = final_probability;
        self
    }

    pub fn with_guards(mut self, guards: Vec<CharPred>) -> Self {
        assert!(!guards.is_empty(), "random automata need at least one guard");
        self.guards = guards;
        self
    }
}

/// Generates a random automaton over characters. The result is built without
/// cleanup, so it may contain dead states.
pub fn random_sfa<A: BooleanAlgebra<Pred = CharPred>>(
    options: &RandomSfaOptions,
    ba: &A,
) -> SfaResult<Sfa<CharPred>> {
    let mut r = StdRng::seed_from_u64(options.seed);

    let mut moves = vec![];
    for _ in 0..options.transition_count {
        let from = r.gen_range(0..options.state_count);
        let to = r.gen_range(0..options.state_count);

        if r.gen_bool(options.epsilon_probability) {
            moves.push(Move::epsilon(from, to));
        } else {
            let guard = options.guards[r.gen_range(0..options.guards.len())].clone();
            moves.push(Move::guarded(from, to, guard));
        }
    }

    let mut finals: Vec<StateId> = (0..options.state_count)
        .filter(|_| r.gen_bool(options.final_probability))
        .collect();
    if finals.is_empty() {
        finals.push(r.gen_range(0..options.state_count));
    }

    Sfa::build_with(moves, 0, finals, ba, BuildOptions::keep_unreachable())
}

/// Follows random moves from the initial state and returns the consumed
/// symbols once it decides to stop in a final state. Returns `None` if the
/// walk gets stuck or exceeds `max_length` steps outside a final state.
pub fn random_walk<A: BooleanAlgebra, R: Rng>(
    sfa: &Sfa<A::Pred>,
    ba: &A,
    rng: &mut R,
    max_length: usize,
) -> SfaResult<Option<Vec<A::Symbol>>> {
    let mut word = vec![];
    let mut state = sfa.initial();

    // epsilon moves do not consume input, so bound the number of steps as well
    for _ in 0..=(2 * max_length) {
        if sfa.is_final(state) && (word.len() >= max_length || rng.gen_bool(0.3)) {
            return Ok(Some(word));
        }

        let moves: Vec<&Move<A::Pred>> = sfa
            .moves_from(state)
            .filter(|mv| mv.is_epsilon() || word.len() < max_length)
            .collect();

        let Some(mv) = moves.choose(rng) else {
            break;
        };

        if let Some(guard) = mv.guard() {
            word.push(witness_of(ba, guard)?);
        }
        state = mv.to();
    }

    Ok(sfa.is_final(state).then_some(word))
}
