// Copyright (c) 2018 Fabian Schuiki

//! First set computation.
//!
//! This module implements computation of the first sets for a grammar. The
//! first set of a nonterminal states all terminals that can appear as the
//! first symbol of something derived from it. Since rules may refer to each
//! other recursively and may derive epsilon, the sets are computed as a fixed
//! point over all nonterminals at once: a worklist of nonterminals whose sets
//! may still grow is processed until it runs dry.

use std::fmt;
use std::iter::repeat;
use std::mem::swap;
use std::ops::Index;

use bit_set::BitSet;

use crate::error::AnalysisError;
use crate::grammar::{Grammar, NonterminalId, Symbol, TerminalId, EPSILON_NAME};
use crate::Pretty;

/// All first sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets(Vec<FirstSet>);

/// The first set of a nonterminal or a sequence of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSet {
    /// The first symbols.
    symbols: BitSet,
    /// Whether the empty string can be derived.
    has_epsilon: bool,
}

impl FirstSets {
    /// Compute the first sets of a grammar.
    pub fn compute(grammar: &Grammar) -> Result<FirstSets, AnalysisError> {
        compute(grammar)
    }

    /// Whether a nonterminal can derive the empty string.
    pub fn is_nullable(&self, id: NonterminalId) -> bool {
        self.0[id.as_usize()].has_epsilon
    }

    /// Compute the first set of a sequence of symbols.
    ///
    /// The empty sequence has an empty first set. Otherwise epsilon is in the
    /// result iff every symbol of the sequence is nullable.
    pub fn first_of(&self, symbols: &[Symbol]) -> FirstSet {
        let mut result = FirstSet::new(0);
        let tight = self.collect(symbols, &mut result.symbols);
        result.has_epsilon = !tight && !symbols.is_empty();
        result
    }

    /// Compute the terminals that can begin `symbols` followed by any of the
    /// terminals in `lookahead`.
    ///
    /// This is `FIRST(symbols a)` for every `a` in `lookahead`, with epsilon
    /// removed. Used to derive the lookaheads of closure items.
    pub fn first_of_with(&self, symbols: &[Symbol], lookahead: &BitSet) -> BitSet {
        let mut result = BitSet::new();
        if !self.collect(symbols, &mut result) {
            result.union_with(lookahead);
        }
        result
    }

    /// Add the first terminals of a sequence to `into`. Returns `true` if the
    /// sequence is *tight*, that is, it cannot derive epsilon.
    fn collect(&self, symbols: &[Symbol], into: &mut BitSet) -> bool {
        for symbol in symbols {
            match *symbol {
                Symbol::Terminal(id) => {
                    into.insert(id.as_usize());
                    return true;
                }
                Symbol::Nonterminal(id) => {
                    let fs = &self.0[id.as_usize()];
                    into.union_with(&fs.symbols);
                    if !fs.has_epsilon {
                        return true;
                    }
                }
            }
        }
        false
    }
}

impl Index<NonterminalId> for FirstSets {
    type Output = FirstSet;

    fn index(&self, id: NonterminalId) -> &FirstSet {
        &self.0[id.as_usize()]
    }
}

impl FirstSet {
    fn new(num_term: usize) -> FirstSet {
        FirstSet {
            symbols: BitSet::with_capacity(num_term),
            has_epsilon: false,
        }
    }

    /// Whether epsilon is in the set.
    pub fn has_epsilon(&self) -> bool {
        self.has_epsilon
    }

    /// Whether a terminal is in the set.
    pub fn contains(&self, id: TerminalId) -> bool {
        self.symbols.contains(id.as_usize())
    }

    /// The terminals in the set, in ascending id order.
    pub fn terminals<'a>(&'a self) -> impl Iterator<Item = TerminalId> + 'a {
        self.symbols.iter().map(TerminalId::from_usize)
    }

    /// The terminals in the set as a bit set over terminal ids.
    pub fn as_bit_set(&self) -> &BitSet {
        &self.symbols
    }

    /// Get a pretty printer for this set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FirstSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        let mut sep = "";
        for id in self.item.terminals() {
            write!(f, "{}{}", sep, id.pretty(self.ctx))?;
            sep = ", ";
        }
        if self.item.has_epsilon {
            write!(f, "{}{}", sep, EPSILON_NAME)?;
        }
        write!(f, "}}")
    }
}

/// The meat of this module. Computes the first set for each nonterminal in a
/// grammar.
fn compute(grammar: &Grammar) -> Result<FirstSets, AnalysisError> {
    let num_term = grammar.terminal_id_bound();
    let num_nonterm = grammar.nonterminal_id_bound();

    // Determine the sets of nonterminals to be updated.
    let mut update = BitSet::with_capacity(num_nonterm);
    let mut next_update = BitSet::with_capacity(num_nonterm);
    for rule in grammar.rules() {
        update.insert(rule.name().as_usize());
    }

    // Create the initial empty first sets. These will be populated in the main
    // loop.
    let mut fs = FirstSets(repeat(FirstSet::new(num_term)).take(num_nonterm).collect());

    // Create a list to keep track of dependencies between the nonterminals.
    let mut deps: Vec<BitSet> = repeat(BitSet::with_capacity(num_nonterm))
        .take(num_nonterm)
        .collect();

    // Every productive round adds at least one element to some set.
    let limit = num_nonterm * (num_term + 1) + 2;
    let mut rounds = 0;

    // This is the main update loop which processes nonterminals in sets.
    while !update.is_empty() {
        rounds += 1;
        if rounds > limit {
            return Err(AnalysisError::NoFixedPoint {
                what: "first sets",
                rounds: rounds,
            });
        }
        for current in update.iter() {
            let mut new_fs = fs.0[current].clone();

            // Update the first set and dependencies.
            for &rule_id in grammar.rules_for_nonterminal(NonterminalId::from_usize(current)) {
                let mut tight = false;
                for symbol in grammar[rule_id].symbols() {
                    tight = match *symbol {
                        Symbol::Terminal(id) => {
                            new_fs.symbols.insert(id.as_usize());
                            true
                        }
                        Symbol::Nonterminal(id) => {
                            deps[id.as_usize()].insert(current);
                            let other = &fs.0[id.as_usize()];
                            new_fs.symbols.union_with(&other.symbols);
                            !other.has_epsilon
                        }
                    };
                    if tight {
                        break;
                    }
                }
                new_fs.has_epsilon |= !tight;
            }

            // If the first set has grown, trigger an update of everything
            // that depends on us.
            let old = &fs.0[current];
            if new_fs.symbols.len() != old.symbols.len() || new_fs.has_epsilon != old.has_epsilon {
                fs.0[current] = new_fs;
                next_update.union_with(&deps[current]);
            }
        }

        // If we've cleared the update set, swap in the next update set.
        swap(&mut update, &mut next_update);
        next_update.clear();
    }
    debug!("first sets settled after {} rounds", rounds);

    Ok(fs)
}
