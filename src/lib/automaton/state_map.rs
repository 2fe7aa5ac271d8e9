use std::{collections::VecDeque, hash::Hash};

use hashbrown::HashMap;

use crate::automaton::StateId;

/// Assigns dense state ids to the states of an automaton under construction
/// (subsets, pairs, ...) and keeps a queue of the ones not yet explored.
///
/// Ids are handed out in discovery order, starting at 0.
#[derive(Debug, Clone)]
pub struct StateMap<K> {
    ids: HashMap<K, StateId>,
    keys: Vec<K>,
    queue: VecDeque<StateId>,
}

impl<K: Hash + Eq + Clone> StateMap<K> {
    pub fn new() -> Self {
        StateMap {
            ids: HashMap::new(),
            keys: vec![],
            queue: VecDeque::new(),
        }
    }

    /// Returns the id of `key`, registering and queueing it if it is new.
    pub fn get_or_insert(&mut self, key: K) -> StateId {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }

        let id = self.keys.len() as StateId;
        self.ids.insert(key.clone(), id);
        self.keys.push(key);
        self.queue.push_back(id);
        id
    }

    /// Next unexplored state in breadth-first order.
    pub fn pop(&mut self) -> Option<(K, StateId)> {
        self.queue
            .pop_front()
            .map(|id| (self.keys[id as usize].clone(), id))
    }

    pub fn key(&self, id: StateId) -> &K {
        &self.keys[id as usize]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Hash + Eq + Clone> Default for StateMap<K> {
    fn default() -> Self {
        Self::new()
    }
}
