use std::{collections::BTreeSet, fmt::Debug};

use hashbrown::HashMap;
use itertools::Itertools;

use crate::{
    algebra::BooleanAlgebra,
    automaton::{BuildOptions, Move, Sfa, StateId},
    budget::Budget,
    error::SfaResult,
};

/// Partition of the states of an automaton into blocks of states that are
/// not (yet) known to be distinguishable. Blocks are never empty.
#[derive(Debug, Clone, Default)]
struct Partition {
    blocks: Vec<BTreeSet<StateId>>,
    block_of: HashMap<StateId, usize>,
}

impl Partition {
    fn add_block(&mut self, states: BTreeSet<StateId>) -> usize {
        let block = self.blocks.len();
        for state in &states {
            self.block_of.insert(*state, block);
        }
        self.blocks.push(states);
        block
    }

    /// Moves `states` out of `block` into a new block and returns its id.
    fn split(&mut self, block: usize, states: BTreeSet<StateId>) -> usize {
        assert!(
            !states.is_empty() && states.len() < self.blocks[block].len(),
            "a split must leave both parts non-empty"
        );

        for state in &states {
            self.blocks[block].remove(state);
        }
        self.add_block(states)
    }

    fn block_of(&self, state: StateId) -> usize {
        self.block_of[&state]
    }

    fn size(&self, block: usize) -> usize {
        self.blocks[block].len()
    }

    /// Pushes the part of a freshly split block that still has to be used as
    /// a splitter.
    fn push_splitter(&self, stack: &mut Vec<usize>, block: usize, split_block: usize) {
        if stack.contains(&block) || self.size(split_block) < self.size(block) {
            stack.push(split_block);
        } else {
            stack.push(block);
        }
    }
}

impl<P: Clone + Debug> Sfa<P> {
    pub fn minimize<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Self> {
        self.minimize_within(ba, &Budget::unlimited())
    }

    /// Symbolic Hopcroft minimization.
    ///
    /// The automaton is made total and deterministic first. Blocks are split
    /// with respect to a splitter block `R` using, for every state `q`, the
    /// predicate `pre(q)` of all symbols leading from `q` into `R`. States
    /// that have a move into `R` are separated from those that do not, then
    /// blocks are refined further by locally computed predicates that tell
    /// their `pre` apart. The sink state of the total automaton is removed
    /// again at the end, so the result is the minimal trimmed automaton.
    pub fn minimize_within<A: BooleanAlgebra<Pred = P>>(
        &self,
        ba: &A,
        budget: &Budget,
    ) -> SfaResult<Self> {
        if self.is_empty() {
            return Ok(Sfa::empty(ba));
        }

        let _span = tracing::debug_span!("minimize").entered();

        let total = self.totalize_within(ba, budget)?;

        let mut partition = Partition::default();
        let finals = total.finals.clone();
        let non_finals: BTreeSet<StateId> = total.non_final_states().collect();

        let mut stack = vec![];
        match (finals.is_empty(), non_finals.is_empty()) {
            (false, false) => {
                let smaller_first = finals.len() <= non_finals.len();
                let final_block = partition.add_block(finals);
                let non_final_block = partition.add_block(non_finals);
                stack.push(if smaller_first {
                    final_block
                } else {
                    non_final_block
                });
            }
            (false, true) => stack.push(partition.add_block(finals)),
            (true, false) => stack.push(partition.add_block(non_finals)),
            (true, true) => unreachable!("an automaton always has an initial state"),
        }

        while let Some(splitter) = stack.pop() {
            budget.check()?;

            // pre[q] = symbols leading from q into the splitter
            let mut pre: HashMap<StateId, P> = HashMap::new();
            for state in &partition.blocks[splitter] {
                for (from, guard) in total.guarded_moves_to(*state) {
                    let guard = match pre.remove(&from) {
                        Some(existing) => ba.or(&existing, guard)?,
                        None => guard.clone(),
                    };
                    pre.insert(from, guard);
                }
            }

            let relevant: BTreeSet<usize> = pre.keys().map(|q| partition.block_of(*q)).collect();
            for block in relevant {
                let split: BTreeSet<StateId> = partition.blocks[block]
                    .iter()
                    .filter(|q| pre.contains_key(*q))
                    .copied()
                    .collect();

                if split.len() < partition.size(block) {
                    let split_block = partition.split(block, split);
                    partition.push_splitter(&mut stack, block, split_block);
                }
            }

            // every state of a relevant block now has a pre predicate
            let mut iterate = true;
            while iterate {
                budget.check()?;
                iterate = false;

                let relevant: BTreeSet<usize> =
                    pre.keys().map(|q| partition.block_of(*q)).collect();

                for block in relevant {
                    let states = partition.blocks[block].iter().copied().collect_vec();

                    let mut split = BTreeSet::from([states[0]]);
                    let mut psi = pre[&states[0]].clone();
                    let mut split_found = false;

                    for q in states.iter().skip(1) {
                        let phi = &pre[q];

                        if split_found {
                            let both = ba.and(&psi, phi)?;
                            if ba.is_satisfiable(&both)? {
                                split.insert(*q);
                                psi = both;
                            }
                            continue;
                        }

                        let psi_not_phi = ba.and(&psi, &ba.not(phi)?)?;
                        if ba.is_satisfiable(&psi_not_phi)? {
                            psi = psi_not_phi;
                            split_found = true;
                            continue;
                        }

                        let phi_not_psi = ba.and(phi, &ba.not(&psi)?)?;
                        if ba.is_satisfiable(&phi_not_psi)? {
                            split.clear();
                            split.insert(*q);
                            psi = phi_not_psi;
                            split_found = true;
                        } else {
                            // phi and psi are equivalent
                            split.insert(*q);
                        }
                    }

                    if split.len() < states.len() {
                        iterate = iterate || states.len() > 2;
                        let split_block = partition.split(block, split);
                        partition.push_splitter(&mut stack, block, split_block);
                    }
                }
            }
        }

        // number the blocks in order of their smallest state
        let mut class_of_block: HashMap<usize, StateId> = HashMap::new();
        for state in &total.states {
            let block = partition.block_of(*state);
            let next = class_of_block.len() as StateId;
            class_of_block.entry(block).or_insert(next);
        }
        let class_of = |state: StateId| class_of_block[&partition.block_of(state)];

        // states in one block behave the same, so one representative suffices
        let mut moves = vec![];
        for (block, states) in partition.blocks.iter().enumerate() {
            let Some(representative) = states.first() else {
                continue;
            };
            for (to, guard) in total.guarded_moves_from(*representative) {
                moves.push(Move::guarded(
                    class_of_block[&block],
                    class_of(to),
                    guard.clone(),
                ));
            }
        }
        let finals = total.finals.iter().map(|state| class_of(*state));

        let minimal = Sfa::assemble(
            moves,
            class_of(total.initial),
            finals,
            ba,
            BuildOptions::default(),
            true,
        )?;
        minimal.flags().seed_deterministic(true);

        tracing::debug!(
            "minimized {} states into {} states",
            self.state_count(),
            minimal.state_count()
        );

        Ok(minimal)
    }
}
