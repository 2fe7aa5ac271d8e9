use std::{collections::BTreeSet, fmt::Debug};

use hashbrown::{HashMap, HashSet};

use crate::{
    algebra::BooleanAlgebra,
    automaton::{Move, Sfa, StateId},
    error::SfaResult,
};

/// Post-processing applied by [`Sfa::build_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    remove_unreachable: bool,
    normalize: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            remove_unreachable: true,
            normalize: true,
        }
    }
}

impl BuildOptions {
    /// Neither normalization nor cleanup.
    pub fn raw() -> Self {
        BuildOptions {
            remove_unreachable: false,
            normalize: false,
        }
    }

    /// Keep every state, e.g. sink states that a later step relies on.
    pub fn keep_unreachable() -> Self {
        BuildOptions::default().with_remove_unreachable(false)
    }

    pub fn with_remove_unreachable(mut self, remove_unreachable: bool) -> Self {
        self.remove_unreachable = remove_unreachable;
        self
    }

    pub fn get_remove_unreachable(&self) -> bool {
        self.remove_unreachable
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn get_normalize(&self) -> bool {
        self.normalize
    }
}

impl<P: Clone + Debug> Sfa<P> {
    /// The automaton accepting no string: a single non-final state with a
    /// `top` self-loop.
    pub fn empty<A: BooleanAlgebra<Pred = P>>(ba: &A) -> Self {
        let mut sfa = Sfa::with_initial(0);
        sfa.push_move(Move::guarded(0, 0, ba.top()));

        sfa.flags().seed_deterministic(true);
        sfa.flags().seed_total(true);
        sfa.flags().seed_empty(true);
        sfa
    }

    /// The automaton accepting every string.
    pub fn full<A: BooleanAlgebra<Pred = P>>(ba: &A) -> Self {
        let mut sfa = Sfa::with_initial(0);
        sfa.insert_final(0);
        sfa.push_move(Move::guarded(0, 0, ba.top()));

        sfa.flags().seed_deterministic(true);
        sfa.flags().seed_total(true);
        sfa.flags().seed_empty(false);
        sfa
    }

    /// Builds an automaton, dropping moves with unsatisfiable guards, merging
    /// parallel moves and removing states that are unreachable or cannot reach
    /// a final state.
    pub fn build<A: BooleanAlgebra<Pred = P>>(
        moves: impl IntoIterator<Item = Move<P>>,
        initial: StateId,
        finals: impl IntoIterator<Item = StateId>,
        ba: &A,
    ) -> SfaResult<Self> {
        Self::build_with(moves, initial, finals, ba, BuildOptions::default())
    }

    pub fn build_with<A: BooleanAlgebra<Pred = P>>(
        moves: impl IntoIterator<Item = Move<P>>,
        initial: StateId,
        finals: impl IntoIterator<Item = StateId>,
        ba: &A,
        options: BuildOptions,
    ) -> SfaResult<Self> {
        Self::assemble(moves, initial, finals, ba, options, false)
    }

    /// Shared constructor of every operation. With `skip_sat` the caller
    /// guarantees that all guards are satisfiable.
    pub(crate) fn assemble<A: BooleanAlgebra<Pred = P>>(
        moves: impl IntoIterator<Item = Move<P>>,
        initial: StateId,
        finals: impl IntoIterator<Item = StateId>,
        ba: &A,
        options: BuildOptions,
        skip_sat: bool,
    ) -> SfaResult<Self> {
        let finals: BTreeSet<StateId> = finals.into_iter().collect();
        if finals.is_empty() {
            return Ok(Sfa::empty(ba));
        }

        let mut sfa = Sfa::with_initial(initial);
        for state in finals {
            sfa.insert_final(state);
        }

        let mut kept = vec![];
        for mv in moves {
            if keep_move(&mv, ba, skip_sat)? {
                kept.push(mv);
            }
        }

        if options.normalize {
            kept = merge_parallel_moves(kept, ba)?;
        }

        for mv in kept {
            sfa.push_move(mv);
        }

        if options.remove_unreachable {
            return Ok(sfa.trim(ba));
        }

        Ok(sfa)
    }

    /// Merges all guarded moves between the same pair of states into one move
    /// guarded by their disjunction and removes duplicate epsilon moves.
    pub fn normalize<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Self> {
        let normalized = Sfa::assemble(
            self.moves.iter().cloned(),
            self.initial,
            self.finals.iter().copied(),
            ba,
            BuildOptions::keep_unreachable(),
            true,
        )?;

        if self.flags().known_deterministic() {
            normalized.flags().seed_deterministic(true);
        }
        Ok(normalized)
    }

    /// Restricts the automaton to its alive states, i.e. the states that are
    /// reachable from the initial state and can reach a final state.
    pub fn trim<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> Self {
        let alive = self.alive_states();
        if alive.is_empty() {
            return Sfa::empty(ba);
        }

        let mut sfa = Sfa::with_initial(self.initial);
        for state in &alive {
            sfa.insert_state(*state);
            if self.is_final(*state) {
                sfa.finals.insert(*state);
            }
        }

        for mv in &self.moves {
            if alive.contains(&mv.from()) && alive.contains(&mv.to()) {
                sfa.push_move(mv.clone());
            }
        }

        sfa.flags().seed_empty(false);
        if self.flags().known_deterministic() {
            sfa.flags().seed_deterministic(true);
        }

        tracing::trace!(
            "removed {} dead or unreachable states",
            self.state_count() - sfa.state_count()
        );

        sfa
    }
}

fn keep_move<A: BooleanAlgebra>(mv: &Move<A::Pred>, ba: &A, skip_sat: bool) -> SfaResult<bool> {
    match mv {
        Move::Epsilon { from, to } => Ok(from != to),
        Move::Guarded { from, to, guard } => {
            if skip_sat {
                if cfg!(debug_assertions) {
                    assert!(
                        ba.is_satisfiable(guard)?,
                        "guard {:?} of move {} -> {} must be satisfiable",
                        guard,
                        from,
                        to
                    );
                }

                return Ok(true);
            }

            ba.is_satisfiable(guard)
        }
    }
}

fn merge_parallel_moves<A: BooleanAlgebra>(
    moves: Vec<Move<A::Pred>>,
    ba: &A,
) -> SfaResult<Vec<Move<A::Pred>>> {
    let mut guarded: Vec<Move<A::Pred>> = vec![];
    let mut guarded_index: HashMap<(StateId, StateId), usize> = HashMap::new();
    let mut epsilons = vec![];
    let mut seen_epsilons = HashSet::new();

    for mv in moves {
        match mv {
            Move::Guarded { from, to, guard } => match guarded_index.get(&(from, to)) {
                Some(index) => {
                    if let Move::Guarded { guard: existing, .. } = &mut guarded[*index] {
                        *existing = ba.or(existing, &guard)?;
                    }
                }
                None => {
                    guarded_index.insert((from, to), guarded.len());
                    guarded.push(Move::Guarded { from, to, guard });
                }
            },
            Move::Epsilon { from, to } => {
                if seen_epsilons.insert((from, to)) {
                    epsilons.push(Move::Epsilon { from, to });
                }
            }
        }
    }

    guarded.extend(epsilons);
    Ok(guarded)
}
