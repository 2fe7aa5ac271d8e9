use std::{collections::VecDeque, fmt::Debug};

use hashbrown::HashMap;
use itertools::Itertools;

use crate::{
    algebra::BooleanAlgebra,
    automaton::{algorithms::witness_of, state_map::StateMap, BuildOptions, Move, Sfa, StateId},
    budget::Budget,
    error::SfaResult,
};

/// Which of the two compared automata a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    Left,
    Right,
}

type SidedState = (Side, StateId);

/// Union-find over the states of both automata, used to merge states assumed
/// equivalent.
#[derive(Debug, Clone, Default)]
struct UnionFind {
    parent: HashMap<SidedState, SidedState>,
}

impl UnionFind {
    fn find(&mut self, state: SidedState) -> SidedState {
        let mut root = state;
        while let Some(parent) = self.parent.get(&root) {
            if *parent == root {
                break;
            }
            root = *parent;
        }

        // path compression
        let mut current = state;
        while current != root {
            let next = self.parent[&current];
            self.parent.insert(current, root);
            current = next;
        }

        root
    }

    fn union(&mut self, a: SidedState, b: SidedState) {
        let a = self.find(a);
        let b = self.find(b);
        if a != b {
            self.parent.insert(a, b);
        }
    }
}

impl<P: Clone + Debug> Sfa<P> {
    pub fn is_equivalent_to<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
    ) -> SfaResult<bool> {
        self.is_equivalent_to_within(other, ba, &Budget::unlimited())
    }

    /// Two automata are equivalent iff both differences are empty.
    pub fn is_equivalent_to_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<bool> {
        if !self.minus_within(other, ba, budget)?.is_empty() {
            return Ok(false);
        }

        Ok(other.minus_within(self, ba, budget)?.is_empty())
    }

    /// Whether every string accepted by `self` is accepted by `other`.
    pub fn is_included_in<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
    ) -> SfaResult<bool> {
        Ok(self.minus(other, ba)?.is_empty())
    }

    pub fn find_counterexample<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
    ) -> SfaResult<Option<Vec<A::Symbol>>> {
        self.find_counterexample_within(other, ba, &Budget::unlimited())
    }

    /// Hopcroft-Karp equivalence check on the totalized automata.
    ///
    /// Pairs of states reached by the same string are merged in a union-find
    /// structure. Returns a string accepted by exactly one of the automata, or
    /// `None` if they are equivalent.
    pub fn find_counterexample_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        other: &Sfa<P>,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Option<Vec<A::Symbol>>> {
        let left = self.totalize_within(ba, budget)?;
        let right = other.totalize_within(ba, budget)?;

        if left.is_final(left.initial) != right.is_final(right.initial) {
            return Ok(Some(vec![]));
        }

        let mut classes = UnionFind::default();
        classes.union((Side::Left, left.initial), (Side::Right, right.initial));

        let mut queue = VecDeque::from([(left.initial, right.initial, vec![])]);

        while let Some((p, q, word)) = queue.pop_front() {
            budget.check()?;

            for (p_to, p_guard) in left.guarded_moves_from(p) {
                for (q_to, q_guard) in right.guarded_moves_from(q) {
                    let guard = ba.and(p_guard, q_guard)?;
                    if !ba.is_satisfiable(&guard)? {
                        continue;
                    }

                    if classes.find((Side::Left, p_to)) == classes.find((Side::Right, q_to)) {
                        continue;
                    }

                    let mut next_word = word.clone();
                    next_word.push(witness_of(ba, &guard)?);

                    if left.is_final(p_to) != right.is_final(q_to) {
                        return Ok(Some(next_word));
                    }

                    classes.union((Side::Left, p_to), (Side::Right, q_to));
                    queue.push_back((p_to, q_to, next_word));
                }
            }
        }

        Ok(None)
    }

    pub fn ambiguous_input<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
    ) -> SfaResult<Option<Vec<A::Symbol>>> {
        self.ambiguous_input_within(ba, &Budget::unlimited())
    }

    /// A string with two different accepting runs, or `None` if the automaton
    /// is unambiguous.
    ///
    /// Builds the product of the automaton with itself. Pairs are stored with
    /// the larger state first since `(p, q)` and `(q, p)` behave the same.
    /// Epsilon moves are only expanded from pairs that were entered by a
    /// guarded move, so two runs that only differ in when they take the same
    /// epsilon moves do not count as different. As a consequence, two runs
    /// that reach the same state through different epsilon paths are not
    /// told apart.
    pub fn ambiguous_input_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Option<Vec<A::Symbol>>> {
        let ordered = |a: StateId, b: StateId| if a >= b { (a, b) } else { (b, a) };

        // (state of the first run, state of the second run, entered by a guarded move)
        let mut state_map: StateMap<(StateId, StateId, bool)> = StateMap::new();
        state_map.get_or_insert((self.initial, self.initial, true));

        let mut moves = vec![];
        let mut finals = vec![];

        while let Some(((p, q, input_reached), id)) = state_map.pop() {
            budget.check()?;

            if self.is_final(p) && self.is_final(q) {
                finals.push(id);
            }

            let p_moves = self.guarded_moves_from(p).collect_vec();
            let q_moves = self.guarded_moves_from(q).collect_vec();

            for (p_to, p_guard) in &p_moves {
                for (q_to, q_guard) in &q_moves {
                    let guard = ba.and(p_guard, q_guard)?;
                    if ba.is_satisfiable(&guard)? {
                        let (a, b) = ordered(*p_to, *q_to);
                        let target = state_map.get_or_insert((a, b, true));
                        moves.push(Move::guarded(id, target, guard));
                    }
                }
            }

            if input_reached {
                let p_closure = self.epsilon_closure([p]);
                let q_closure = self.epsilon_closure([q]);

                for (a, b) in p_closure
                    .iter()
                    .cartesian_product(q_closure.iter())
                    .map(|(a, b)| ordered(*a, *b))
                    .unique()
                {
                    if (a, b) != (p, q) {
                        let target = state_map.get_or_insert((a, b, false));
                        moves.push(Move::epsilon(id, target));
                    }
                }
            }
        }

        let product = Sfa::assemble(moves, 0, finals, ba, BuildOptions::raw(), true)?.trim(ba);

        let Some(split) = product.states.iter().copied().find(|id| {
            let (p, q, _) = state_map.key(*id);
            p != q
        }) else {
            return Ok(None);
        };

        // a path into the diverging pair followed by a path to acceptance
        let prefix = product
            .find_path(product.initial, |state| state == split)
            .expect("alive states are reachable");
        let suffix = product
            .find_path(split, |state| product.is_final(state))
            .expect("alive states reach a final state");

        let word = prefix
            .into_iter()
            .chain(suffix)
            .map(|guard| witness_of(ba, guard))
            .collect::<SfaResult<Vec<_>>>()?;

        Ok(Some(word))
    }
}
