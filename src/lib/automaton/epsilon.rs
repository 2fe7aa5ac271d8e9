use std::{collections::BTreeSet, fmt::Debug};

use crate::{
    algebra::BooleanAlgebra,
    automaton::{state_map::StateMap, BuildOptions, Move, Sfa, StateId},
    budget::Budget,
    error::SfaResult,
};

impl<P: Clone + Debug> Sfa<P> {
    /// All states reachable from `states` using only epsilon moves, including
    /// `states` themselves.
    pub fn epsilon_closure(&self, states: impl IntoIterator<Item = StateId>) -> BTreeSet<StateId> {
        let mut closure = BTreeSet::new();
        let mut stack = vec![];

        for state in states {
            if closure.insert(state) {
                stack.push(state);
            }
        }

        while let Some(state) = stack.pop() {
            for to in self.epsilon_moves_from(state) {
                if closure.insert(to) {
                    stack.push(to);
                }
            }
        }

        closure
    }

    /// An equivalent automaton without epsilon moves.
    pub fn remove_epsilon_moves<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Self> {
        self.remove_epsilon_moves_within(ba, &Budget::unlimited())
    }

    /// Subset construction over epsilon closures: every state of the result
    /// stands for the closure of the initial state or of the target of a
    /// guarded move.
    pub fn remove_epsilon_moves_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Self> {
        if self.is_epsilon_free() {
            return Ok(self.clone());
        }

        let mut state_map = StateMap::new();
        state_map.get_or_insert(self.epsilon_closure([self.initial]));

        let mut moves = vec![];
        let mut finals = vec![];

        while let Some((closure, id)) = state_map.pop() {
            budget.check()?;

            if closure.iter().any(|state| self.is_final(*state)) {
                finals.push(id);
            }

            for state in &closure {
                for (to, guard) in self.guarded_moves_from(*state) {
                    let target = state_map.get_or_insert(self.epsilon_closure([to]));
                    moves.push(Move::guarded(id, target, guard.clone()));
                }
            }
        }

        tracing::trace!(
            "removed epsilon moves: {} states became {}",
            self.state_count(),
            state_map.len()
        );

        Sfa::assemble(moves, 0, finals, ba, BuildOptions::keep_unreachable(), true)
    }
}
