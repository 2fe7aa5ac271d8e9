use std::fmt::Debug;

use itertools::Itertools;

use crate::{
    algebra::BooleanAlgebra,
    automaton::{state_map::StateMap, BuildOptions, Move, Sfa, StateId},
    budget::Budget,
    error::SfaResult,
};

impl<P: Clone + Debug> Sfa<P> {
    pub fn intersection_with<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
    ) -> SfaResult<Self> {
        self.intersection_with_within(other, ba, &Budget::unlimited())
    }

    /// Product construction over pairs of states. Epsilon moves are followed
    /// on each side independently, a pair is final iff both epsilon closures
    /// contain a final state.
    pub fn intersection_with_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(Sfa::empty(ba));
        }

        let mut state_map: StateMap<(StateId, StateId)> = StateMap::new();
        state_map.get_or_insert((self.initial, other.initial));

        let mut moves = vec![];
        let mut finals = vec![];

        while let Some(((left, right), id)) = state_map.pop() {
            budget.check()?;

            let left_closure = self.epsilon_closure([left]);
            let right_closure = other.epsilon_closure([right]);

            if left_closure.iter().any(|s| self.is_final(*s))
                && right_closure.iter().any(|s| other.is_final(*s))
            {
                finals.push(id);
            }

            let left_moves = left_closure
                .iter()
                .flat_map(|s| self.guarded_moves_from(*s))
                .collect_vec();
            let right_moves = right_closure
                .iter()
                .flat_map(|s| other.guarded_moves_from(*s))
                .collect_vec();

            for (left_to, left_guard) in &left_moves {
                for (right_to, right_guard) in &right_moves {
                    let guard = ba.and(left_guard, right_guard)?;
                    if ba.is_satisfiable(&guard)? {
                        let target = state_map.get_or_insert((*left_to, *right_to));
                        moves.push(Move::guarded(id, target, guard));
                    }
                }
            }
        }

        Sfa::assemble(moves, 0, finals, ba, BuildOptions::default(), true)
    }

    pub fn minus<A: BooleanAlgebra<Pred = P>>(&self, other: &Sfa<P>, ba: &A) -> SfaResult<Self> {
        self.minus_within(other, ba, &Budget::unlimited())
    }

    /// The strings accepted by `self` but not by `other`.
    pub fn minus_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Self> {
        let complement = other.complement_within(ba, budget)?;
        self.intersection_with_within(&complement, ba, budget)
    }

    /// Accepts the strings accepted by either automaton. Both automata are
    /// renumbered densely into disjoint ranges and a fresh initial state
    /// moves to both initial states on epsilon.
    pub fn union_with<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
    ) -> SfaResult<Self> {
        if self.is_empty() && other.is_empty() {
            return Ok(Sfa::empty(ba));
        }

        let (left_moves, left_initial, left_finals) = self.renumbered(0);
        let (right_moves, right_initial, right_finals) = other.renumbered(offset_after(self));
        let initial = offset_after(self)
            .checked_add(offset_after(other))
            .expect("the union must fit into the state id range");

        let moves = left_moves.into_iter().chain(right_moves).chain([
            Move::epsilon(initial, left_initial),
            Move::epsilon(initial, right_initial),
        ]);
        let finals = left_finals.into_iter().chain(right_finals);

        Sfa::assemble(moves, initial, finals, ba, BuildOptions::keep_unreachable(), true)
    }

    /// Accepts the strings `uv` where `self` accepts `u` and `other` accepts
    /// `v`.
    pub fn concatenate_with<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
    ) -> SfaResult<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(Sfa::empty(ba));
        }

        let (left_moves, left_initial, left_finals) = self.renumbered(0);
        let (right_moves, right_initial, right_finals) = other.renumbered(offset_after(self));

        let moves = left_moves.into_iter().chain(right_moves).chain(
            left_finals
                .into_iter()
                .map(|state| Move::epsilon(state, right_initial)),
        );

        Sfa::assemble(
            moves,
            left_initial,
            right_finals,
            ba,
            BuildOptions::keep_unreachable(),
            true,
        )
    }

    /// Kleene star. A fresh initial state is the only final state.
    pub fn star<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Self> {
        let initial = self.fresh_state_id();

        let moves = self
            .moves
            .iter()
            .cloned()
            .chain([Move::epsilon(initial, self.initial)])
            .chain(self.finals.iter().map(|state| Move::epsilon(*state, initial)));

        Sfa::assemble(
            moves,
            initial,
            [initial],
            ba,
            BuildOptions::keep_unreachable(),
            true,
        )
    }
}

/// First id after the states of `sfa` once it is renumbered from 0.
fn offset_after<P>(sfa: &Sfa<P>) -> StateId {
    StateId::try_from(sfa.states.len()).expect("state count must fit into a state id")
}
