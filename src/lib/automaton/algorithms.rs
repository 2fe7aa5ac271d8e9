use std::{
    collections::{BTreeSet, VecDeque},
    fmt::{Debug, Display},
};

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use petgraph::{
    graphmap::DiGraphMap,
    visit::{Dfs, Reversed, Walker},
};

use crate::{
    algebra::BooleanAlgebra,
    automaton::{Move, Sfa, StateId},
    error::SfaResult,
};

/// A symbol satisfying `guard`. The guard must be satisfiable.
pub(crate) fn witness_of<A: BooleanAlgebra>(ba: &A, guard: &A::Pred) -> SfaResult<A::Symbol> {
    Ok(ba
        .generate_witness(guard)?
        .expect("a satisfiable guard always has a witness"))
}

impl<P: Clone + Debug> Sfa<P> {
    /// The transition structure without guards, used for plain graph
    /// traversals.
    fn skeleton(&self) -> DiGraphMap<StateId, ()> {
        let mut graph = DiGraphMap::with_capacity(self.states.len(), self.moves.len());

        for state in &self.states {
            graph.add_node(*state);
        }
        for mv in &self.moves {
            graph.add_edge(mv.from(), mv.to(), ());
        }

        graph
    }

    pub fn reachable_states(&self) -> HashSet<StateId> {
        let graph = self.skeleton();
        Dfs::new(&graph, self.initial).iter(&graph).collect()
    }

    /// States from which some final state is reachable.
    pub fn coreachable_states(&self) -> HashSet<StateId> {
        let graph = self.skeleton();
        let reversed = Reversed(&graph);

        let mut result = HashSet::new();
        let mut dfs = Dfs::empty(reversed);
        for state in &self.finals {
            dfs.move_to(*state);
            while let Some(node) = dfs.next(reversed) {
                result.insert(node);
            }
        }

        result
    }

    /// States that lie on some path from the initial state to a final state.
    pub fn alive_states(&self) -> BTreeSet<StateId> {
        let reachable = self.reachable_states();
        let coreachable = self.coreachable_states();

        self.states
            .iter()
            .filter(|state| reachable.contains(*state) && coreachable.contains(*state))
            .copied()
            .collect()
    }

    /// Breadth-first search from `start` to the first state satisfying
    /// `is_target`. Returns the guards along the path, epsilon moves are
    /// skipped.
    pub(crate) fn find_path(
        &self,
        start: StateId,
        is_target: impl Fn(StateId) -> bool,
    ) -> Option<Vec<&P>> {
        let mut parents: HashMap<StateId, (StateId, Option<&P>)> = HashMap::new();
        let mut visited: HashSet<StateId> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(state) = queue.pop_front() {
            if is_target(state) {
                let mut guards = vec![];
                let mut current = state;
                while current != start {
                    let (parent, guard) = parents[&current];
                    guards.extend(guard);
                    current = parent;
                }
                guards.reverse();
                return Some(guards);
            }

            for mv in self.moves_from(state) {
                if visited.insert(mv.to()) {
                    parents.insert(mv.to(), (state, mv.guard()));
                    queue.push_back(mv.to());
                }
            }
        }

        None
    }

    /// Some string accepted by the automaton, or `None` if its language is
    /// empty.
    pub fn witness<A: BooleanAlgebra<Pred = P>>(&self, ba: &A) -> SfaResult<Option<Vec<A::Symbol>>> {
        match self.find_path(self.initial, |state| self.is_final(state)) {
            Some(guards) => Ok(Some(
                guards
                    .into_iter()
                    .map(|guard| witness_of(ba, guard))
                    .collect::<SfaResult<Vec<_>>>()?,
            )),
            None => Ok(None),
        }
    }

    pub fn to_graphviz(&self) -> String
    where
        P: Display,
    {
        let mut dot = String::new();
        dot.push_str("digraph finite_state_machine {\n");
        dot.push_str("fontname=\"Helvetica,Arial,sans-serif\"\n");
        dot.push_str("node [fontname=\"Helvetica,Arial,sans-serif\"]\n");
        dot.push_str("edge [fontname=\"Helvetica,Arial,sans-serif\"]\n");
        dot.push_str("rankdir=LR;\n");
        dot.push_str("node [shape=point,label=\"\"]START\n");

        if !self.finals.is_empty() {
            dot.push_str(&format!(
                "node [shape = doublecircle]; {};\n",
                self.finals.iter().join(" ")
            ));
        }
        dot.push_str("node [shape = circle];\n");
        dot.push_str(&format!("START -> {};\n", self.initial));

        for mv in &self.moves {
            let label = match mv {
                Move::Guarded { guard, .. } => guard.to_string().replace('\\', "\\\\").replace('"', "\\\""),
                Move::Epsilon { .. } => "ε".to_string(),
            };
            dot.push_str(&format!(
                "{} -> {} [ label = \"{}\" ];\n",
                mv.from(),
                mv.to(),
                label
            ));
        }

        dot.push_str("}\n");

        dot
    }
}
