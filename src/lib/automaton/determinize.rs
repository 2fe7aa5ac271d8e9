use std::{borrow::Cow, collections::BTreeSet, fmt::Debug};

use itertools::Itertools;

use crate::{
    algebra::BooleanAlgebra,
    automaton::{state_map::StateMap, BuildOptions, Move, Sfa, StateId},
    budget::Budget,
    error::SfaResult,
};

impl<P: Clone + Debug> Sfa<P> {
    /// Whether the automaton has no epsilon moves and the guards leaving each
    /// state are pairwise disjoint.
    pub fn is_deterministic<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<bool> {
        self.is_deterministic_within(ba, &Budget::unlimited())
    }

    pub fn is_deterministic_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<bool> {
        if let Some(deterministic) = self.flags().deterministic.get() {
            return Ok(*deterministic);
        }

        let deterministic = self.check_deterministic(ba, budget)?;
        self.flags().seed_deterministic(deterministic);
        Ok(deterministic)
    }

    fn check_deterministic<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<bool> {
        if !self.is_epsilon_free() {
            return Ok(false);
        }

        for state in &self.states {
            budget.check()?;

            let guards = self
                .guarded_moves_from(*state)
                .map(|(_, guard)| guard)
                .collect_vec();

            for (a, b) in guards.iter().tuple_combinations() {
                budget.check()?;
                if ba.is_satisfiable(&ba.and(a, b)?)? {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    pub fn determinize<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Self> {
        self.determinize_within(ba, &Budget::unlimited())
    }

    /// Subset construction restricted to minterms: for every subset, the
    /// guards of all moves leaving it are split into minterms and each
    /// minterm leads to the subset of targets of the moves it implies.
    pub fn determinize_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Self> {
        if self.is_deterministic_within(ba, budget)? {
            return Ok(self.clone());
        }

        let _span = tracing::debug_span!("determinize").entered();

        let aut = if self.is_epsilon_free() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.remove_epsilon_moves_within(ba, budget)?)
        };

        let mut state_map: StateMap<BTreeSet<StateId>> = StateMap::new();
        state_map.get_or_insert(aut.epsilon_closure([aut.initial]));

        let mut moves = vec![];
        let mut finals = vec![];

        while let Some((subset, id)) = state_map.pop() {
            budget.check()?;

            if subset.iter().any(|state| aut.is_final(*state)) {
                finals.push(id);
            }

            let outgoing = subset
                .iter()
                .flat_map(|state| aut.guarded_moves_from(*state))
                .collect_vec();
            let guards = outgoing
                .iter()
                .map(|(_, guard)| (*guard).clone())
                .collect_vec();

            for minterm in ba.minterms(&guards, budget)? {
                let target: BTreeSet<StateId> = minterm.implied().map(|i| outgoing[i].0).collect();
                if target.is_empty() {
                    continue;
                }

                let target_id = state_map.get_or_insert(target);
                moves.push(Move::guarded(id, target_id, minterm.guard));
            }
        }

        let dfa = Sfa::assemble(moves, 0, finals, ba, BuildOptions::keep_unreachable(), true)?;
        dfa.flags().seed_deterministic(true);

        tracing::debug!(
            "determinized {} states into {} states",
            self.state_count(),
            dfa.state_count()
        );

        Ok(dfa)
    }
}
