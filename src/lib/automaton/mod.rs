use std::{collections::BTreeSet, fmt::Debug, sync::OnceLock};

use hashbrown::HashMap;

use crate::{algebra::BooleanAlgebra, error::SfaResult};

pub mod algorithms;
pub mod build;
pub mod combinators;
pub mod complement;
pub mod determinize;
pub mod epsilon;
pub mod equivalence;
pub mod minimization;
pub mod state_map;

pub use build::BuildOptions;

pub type StateId = u32;

/// A transition of a symbolic automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Move<P> {
    /// Consumes one symbol satisfying `guard`.
    Guarded { from: StateId, to: StateId, guard: P },
    /// Consumes no input.
    Epsilon { from: StateId, to: StateId },
}

impl<P> Move<P> {
    pub fn guarded(from: StateId, to: StateId, guard: P) -> Self {
        Move::Guarded { from, to, guard }
    }

    pub fn epsilon(from: StateId, to: StateId) -> Self {
        Move::Epsilon { from, to }
    }

    pub fn from(&self) -> StateId {
        match self {
            Move::Guarded { from, .. } | Move::Epsilon { from, .. } => *from,
        }
    }

    pub fn to(&self) -> StateId {
        match self {
            Move::Guarded { to, .. } | Move::Epsilon { to, .. } => *to,
        }
    }

    pub fn guard(&self) -> Option<&P> {
        match self {
            Move::Guarded { guard, .. } => Some(guard),
            Move::Epsilon { .. } => None,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Move::Epsilon { .. })
    }

    /// The same move with both endpoints renamed by `rename`.
    pub fn renamed(self, rename: impl Fn(StateId) -> StateId) -> Self {
        match self {
            Move::Guarded { from, to, guard } => Move::Guarded {
                from: rename(from),
                to: rename(to),
                guard,
            },
            Move::Epsilon { from, to } => Move::Epsilon {
                from: rename(from),
                to: rename(to),
            },
        }
    }
}

/// Structural properties that are expensive to compute. Each is computed at
/// most once per automaton, or seeded by the operation that created it.
#[derive(Debug, Clone, Default)]
pub(crate) struct SfaFlags {
    deterministic: OnceLock<bool>,
    total: OnceLock<bool>,
    empty: OnceLock<bool>,
}

impl SfaFlags {
    pub(crate) fn seed_deterministic(&self, value: bool) {
        let _ = self.deterministic.set(value);
    }

    pub(crate) fn seed_total(&self, value: bool) {
        let _ = self.total.set(value);
    }

    pub(crate) fn seed_empty(&self, value: bool) {
        let _ = self.empty.set(value);
    }

    pub(crate) fn known_deterministic(&self) -> bool {
        self.deterministic.get() == Some(&true)
    }

    pub(crate) fn known_total(&self) -> bool {
        self.total.get() == Some(&true)
    }
}

/// A symbolic finite automaton whose moves are guarded by predicates of type
/// `P`.
///
/// Automata are immutable values: every operation returns a new automaton.
/// Moves live in one arena and are indexed by source and target state.
#[derive(Debug, Clone)]
pub struct Sfa<P> {
    states: BTreeSet<StateId>,
    initial: StateId,
    finals: BTreeSet<StateId>,
    moves: Vec<Move<P>>,
    moves_from: HashMap<StateId, Vec<usize>>,
    moves_to: HashMap<StateId, Vec<usize>>,
    max_state_id: StateId,
    epsilon_count: usize,
    flags: SfaFlags,
}

impl<P: Clone + Debug> Sfa<P> {
    /// An automaton with only the initial state and nothing else.
    pub(crate) fn with_initial(initial: StateId) -> Self {
        Sfa {
            states: BTreeSet::from([initial]),
            initial,
            finals: BTreeSet::new(),
            moves: vec![],
            moves_from: HashMap::new(),
            moves_to: HashMap::new(),
            max_state_id: initial,
            epsilon_count: 0,
            flags: SfaFlags::default(),
        }
    }

    pub(crate) fn insert_state(&mut self, state: StateId) {
        self.states.insert(state);
        self.max_state_id = self.max_state_id.max(state);
    }

    pub(crate) fn insert_final(&mut self, state: StateId) {
        self.insert_state(state);
        self.finals.insert(state);
    }

    /// Stores `mv` without any check.
    pub(crate) fn push_move(&mut self, mv: Move<P>) {
        let index = self.moves.len();
        let (from, to) = (mv.from(), mv.to());

        self.insert_state(from);
        self.insert_state(to);
        if mv.is_epsilon() {
            self.epsilon_count += 1;
        }

        self.moves_from.entry(from).or_default().push(index);
        self.moves_to.entry(to).or_default().push(index);
        self.moves.push(mv);
    }

    /// An id no state uses: one past the largest id, or the smallest free id
    /// if that would overflow.
    pub(crate) fn fresh_state_id(&self) -> StateId {
        match self.max_state_id.checked_add(1) {
            Some(id) => id,
            None => (0..StateId::MAX)
                .find(|id| !self.states.contains(id))
                .expect("an automaton cannot use every state id"),
        }
    }

    /// Renames the states to `offset, offset + 1, ...` in increasing order of
    /// their ids. Returns the renamed moves, initial state and final states.
    pub(crate) fn renumbered(&self, offset: StateId) -> (Vec<Move<P>>, StateId, Vec<StateId>) {
        let ids: HashMap<StateId, StateId> = self
            .states
            .iter()
            .enumerate()
            .map(|(i, state)| {
                let id = StateId::try_from(i)
                    .ok()
                    .and_then(|i| i.checked_add(offset))
                    .expect("renumbered state ids must fit into a state id");
                (*state, id)
            })
            .collect();
        let rename = |state: StateId| ids[&state];

        let moves = self.moves.iter().cloned().map(|mv| mv.renamed(rename)).collect();
        let finals = self.finals.iter().map(|state| rename(*state)).collect();

        (moves, rename(self.initial), finals)
    }

    pub(crate) fn flags(&self) -> &SfaFlags {
        &self.flags
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    pub fn finals(&self) -> &BTreeSet<StateId> {
        &self.finals
    }

    pub fn non_final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.difference(&self.finals).copied()
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of moves, guarded and epsilon.
    pub fn transition_count(&self) -> usize {
        self.moves.len()
    }

    pub fn max_state_id(&self) -> StateId {
        self.max_state_id
    }

    pub fn moves(&self) -> &[Move<P>] {
        &self.moves
    }

    pub fn moves_from(&self, state: StateId) -> impl Iterator<Item = &Move<P>> + '_ {
        self.moves_from
            .get(&state)
            .into_iter()
            .flatten()
            .map(|index| &self.moves[*index])
    }

    pub fn moves_to(&self, state: StateId) -> impl Iterator<Item = &Move<P>> + '_ {
        self.moves_to
            .get(&state)
            .into_iter()
            .flatten()
            .map(|index| &self.moves[*index])
    }

    /// Targets and guards of the guarded moves leaving `state`.
    pub fn guarded_moves_from(&self, state: StateId) -> impl Iterator<Item = (StateId, &P)> + '_ {
        self.moves_from(state).filter_map(|mv| match mv {
            Move::Guarded { to, guard, .. } => Some((*to, guard)),
            Move::Epsilon { .. } => None,
        })
    }

    /// Sources and guards of the guarded moves entering `state`.
    pub fn guarded_moves_to(&self, state: StateId) -> impl Iterator<Item = (StateId, &P)> + '_ {
        self.moves_to(state).filter_map(|mv| match mv {
            Move::Guarded { from, guard, .. } => Some((*from, guard)),
            Move::Epsilon { .. } => None,
        })
    }

    pub fn epsilon_moves_from(&self, state: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.moves_from(state).filter_map(|mv| match mv {
            Move::Epsilon { to, .. } => Some(*to),
            Move::Guarded { .. } => None,
        })
    }

    pub fn epsilon_moves_to(&self, state: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.moves_to(state).filter_map(|mv| match mv {
            Move::Epsilon { from, .. } => Some(*from),
            Move::Guarded { .. } => None,
        })
    }

    pub fn is_epsilon_free(&self) -> bool {
        self.epsilon_count == 0
    }

    /// Whether the automaton accepts no string at all.
    pub fn is_empty(&self) -> bool {
        *self
            .flags
            .empty
            .get_or_init(|| self.alive_states().is_empty())
    }

    /// Runs the automaton on `input`, tracking every state a run could be in.
    pub fn accepts<'a, A>(
        &self,
        input: impl IntoIterator<Item = &'a A::Symbol>,
        ba: &A,
    ) -> SfaResult<bool>
    where
        A: BooleanAlgebra<Pred = P>,
        A::Symbol: 'a,
    {
        let mut current = self.epsilon_closure([self.initial]);

        for symbol in input {
            let mut next = BTreeSet::new();

            for state in &current {
                for (to, guard) in self.guarded_moves_from(*state) {
                    if ba.has_model(guard, symbol)? {
                        next.insert(to);
                    }
                }
            }

            if next.is_empty() {
                return Ok(false);
            }

            current = self.epsilon_closure(next);
        }

        Ok(current.iter().any(|state| self.is_final(*state)))
    }
}
