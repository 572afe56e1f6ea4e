// Copyright (c) 2018 Fabian Schuiki

//! Construction of the canonical collection of LR(1) item sets.
//!
//! Starting from the closure of `S' -> . S $`, the goto of every state over
//! every symbol after a marker is computed. Sets with identical content
//! (rules, markers and lookaheads) are the same state; anything else becomes
//! a new state. Since lookaheads are part of a state's identity, states that
//! merely share their cores are kept apart, as canonical LR(1) requires.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;

use crate::error::AnalysisError;
use crate::first::FirstSets;
use crate::grammar::{Grammar, Symbol};
use crate::item_set::{ItemSet, ItemSetKey};
use crate::Pretty;

/// The default upper bound on the number of states.
pub const DEFAULT_STATE_LIMIT: usize = 10_000;

/// The states of the LR(1) automaton.
#[derive(Debug, Clone)]
pub struct ItemSets {
    states: Vec<State>,
}

/// A state of the automaton.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    items: ItemSet,
    transitions: IndexMap<Symbol, StateId>,
}

/// A unique state identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl ItemSets {
    /// Construct the item sets for a grammar.
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Result<ItemSets, AnalysisError> {
        ItemSets::compute_with_limit(grammar, first, DEFAULT_STATE_LIMIT)
    }

    /// Construct the item sets for a grammar, failing if more than `limit`
    /// states would be needed.
    pub fn compute_with_limit(
        grammar: &Grammar,
        first: &FirstSets,
        limit: usize,
    ) -> Result<ItemSets, AnalysisError> {
        let mut initial = ItemSet::initial();
        initial.closure(grammar, first);

        let mut known: HashMap<ItemSetKey, StateId> = HashMap::new();
        known.insert(initial.key(), StateId(0));
        let mut states = vec![State {
            id: StateId(0),
            items: initial,
            transitions: IndexMap::new(),
        }];
        let mut todo = VecDeque::new();
        todo.push_back(StateId(0));

        while let Some(id) = todo.pop_front() {
            let targets: Vec<(Symbol, ItemSet)> = {
                let items = &states[id.0].items;
                items
                    .transition_symbols(grammar)
                    .into_iter()
                    .filter_map(|symbol| {
                        items
                            .goto(grammar, first, symbol)
                            .map(|set| (symbol, set))
                    })
                    .collect()
            };

            for (symbol, set) in targets {
                let key = set.key();
                let target = match known.get(&key) {
                    Some(&target) => target,
                    None => {
                        if states.len() >= limit {
                            return Err(AnalysisError::TooManyStates { limit: limit });
                        }
                        let target = StateId(states.len());
                        trace!(
                            "state {} on {} -> new state {}",
                            id,
                            symbol.pretty(grammar),
                            target
                        );
                        known.insert(key, target);
                        states.push(State {
                            id: target,
                            items: set,
                            transitions: IndexMap::new(),
                        });
                        todo.push_back(target);
                        target
                    }
                };
                states[id.0].transitions.insert(symbol, target);
            }
        }
        debug!("constructed {} LR(1) states", states.len());

        Ok(ItemSets { states: states })
    }

    /// All states of the automaton. State 0 is the initial state.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether there are no states. Never the case for a computed automaton.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get a pretty printer for these item sets.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Index<StateId> for ItemSets {
    type Output = State;

    fn index(&self, index: StateId) -> &State {
        &self.states[index.0]
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSets> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, state) in self.item.states.iter().enumerate() {
            if index > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "state {}:\n{}", state.id, state.items.pretty(self.ctx))?;
            for (symbol, target) in &state.transitions {
                write!(f, "\n  {} -> {}", symbol.pretty(self.ctx), target)?;
            }
        }
        Ok(())
    }
}

impl State {
    /// Get the unique identifier of this state.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Get the closed item set of this state.
    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    /// The outgoing transitions, in the order they were discovered.
    pub fn transitions(&self) -> &IndexMap<Symbol, StateId> {
        &self.transitions
    }

    /// The state reached over a symbol, if any.
    pub fn goto(&self, symbol: Symbol) -> Option<StateId> {
        self.transitions.get(&symbol).cloned()
    }
}

impl StateId {
    /// Create a state id from a usize.
    pub fn from_usize(id: usize) -> StateId {
        StateId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
