use std::fmt::Debug;

use crate::{
    algebra::BooleanAlgebra,
    automaton::{BuildOptions, Move, Sfa},
    budget::Budget,
    error::SfaResult,
};

impl<P: Clone + Debug> Sfa<P> {
    /// Whether the automaton is deterministic and every state has a move for
    /// every symbol.
    pub fn is_total<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<bool> {
        self.is_total_within(ba, &Budget::unlimited())
    }

    pub fn is_total_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<bool> {
        if let Some(total) = self.flags().total.get() {
            return Ok(*total);
        }

        let total = self.check_total(ba, budget)?;
        self.flags().seed_total(total);
        Ok(total)
    }

    fn check_total<A: BooleanAlgebra<Pred = P>>(&self, ba: &A, budget: &Budget) -> SfaResult<bool> {
        if !self.is_deterministic_within(ba, budget)? {
            return Ok(false);
        }

        for state in &self.states {
            budget.check()?;

            let covered = ba.or_all(self.guarded_moves_from(*state).map(|(_, guard)| guard))?;
            if ba.is_satisfiable(&ba.not(&covered)?)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    pub fn totalize<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Self> {
        self.totalize_within(ba, &Budget::unlimited())
    }

    /// Determinizes the automaton and sends every symbol a state has no move
    /// for to a non-final sink state.
    pub fn totalize_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Self> {
        if self.flags().known_total() {
            return Ok(self.clone());
        }

        let dfa = self.determinize_within(ba, budget)?;
        let sink = dfa.fresh_state_id();

        let mut moves = dfa.moves.clone();
        let mut needs_sink = false;

        for state in &dfa.states {
            budget.check()?;

            let uncovered = dfa
                .guarded_moves_from(*state)
                .map(|(_, guard)| ba.not(guard))
                .collect::<SfaResult<Vec<_>>>()?;
            let rest = ba.and_all(&uncovered)?;

            if ba.is_satisfiable(&rest)? {
                moves.push(Move::guarded(*state, sink, rest));
                needs_sink = true;
            }
        }

        if needs_sink {
            moves.push(Move::guarded(sink, sink, ba.top()));
        }

        let total = Sfa::assemble(
            moves,
            dfa.initial,
            dfa.finals.iter().copied(),
            ba,
            BuildOptions::raw(),
            true,
        )?;
        total.flags().seed_deterministic(true);
        total.flags().seed_total(true);

        Ok(total)
    }

    pub fn complement<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Self> {
        self.complement_within(ba, &Budget::unlimited())
    }

    /// Totalizes the automaton and swaps final and non-final states.
    pub fn complement_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Self> {
        let total = self.totalize_within(ba, budget)?;

        let complement = Sfa::assemble(
            total.moves.iter().cloned(),
            total.initial,
            total.non_final_states(),
            ba,
            BuildOptions::raw(),
            true,
        )?;
        complement.flags().seed_deterministic(true);
        complement.flags().seed_total(true);

        Ok(complement)
    }
}
