// Copyright (c) 2018 Fabian Schuiki

//! Follow set computation.
//!
//! The follow set of a nonterminal contains every terminal that can appear
//! immediately after it in some derivation from the augmented root. The sets
//! are seeded from the first sets of whatever follows each use of a
//! nonterminal, and then the follow set of each rule's LHS is pushed into the
//! trailing symbols of that rule until nothing changes anymore.

use std::fmt;
use std::iter::repeat;
use std::ops::Index;

use bit_set::BitSet;

use crate::error::AnalysisError;
use crate::first::FirstSets;
use crate::grammar::{Grammar, NonterminalId, Symbol, TerminalId, END, ROOT};
use crate::Pretty;

/// All follow sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets(Vec<FollowSet>);

/// The follow set of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSet {
    symbols: BitSet,
}

impl FollowSets {
    /// Compute the follow sets of a grammar.
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Result<FollowSets, AnalysisError> {
        let num_term = grammar.terminal_id_bound();
        let num_nonterm = grammar.nonterminal_id_bound();
        let mut sets: Vec<BitSet> = repeat(BitSet::with_capacity(num_term))
            .take(num_nonterm)
            .collect();
        sets[ROOT.as_usize()].insert(END.as_usize());

        // Whatever can begin the remainder of a rule after a nonterminal
        // follows that nonterminal.
        for nt in grammar.nonterminals() {
            for &(rule, pos) in grammar.uses_of_nonterminal(nt) {
                let rest = &grammar[rule].symbols()[pos + 1..];
                let fs = first.first_of(rest);
                sets[nt.as_usize()].union_with(fs.as_bit_set());
            }
        }

        // Propagate the LHS's follow set leftwards across the trailing
        // symbols of each rule, as long as everything to their right is
        // nullable.
        let limit = num_nonterm * num_term + 2;
        let mut rounds = 0;
        loop {
            rounds += 1;
            if rounds > limit {
                return Err(AnalysisError::NoFixedPoint {
                    what: "follow sets",
                    rounds: rounds,
                });
            }
            let mut changed = false;
            for rule in grammar.rules() {
                let lhs = rule.name().as_usize();
                for symbol in rule.symbols().iter().rev() {
                    let id = match *symbol {
                        Symbol::Terminal(_) => break,
                        Symbol::Nonterminal(id) => id,
                    };
                    if id.as_usize() != lhs {
                        let from = sets[lhs].clone();
                        let into = &mut sets[id.as_usize()];
                        let before = into.len();
                        into.union_with(&from);
                        changed |= into.len() != before;
                    }
                    if !first.is_nullable(id) {
                        break;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        debug!("follow sets settled after {} rounds", rounds);

        Ok(FollowSets(
            sets.into_iter().map(|s| FollowSet { symbols: s }).collect(),
        ))
    }
}

impl Index<NonterminalId> for FollowSets {
    type Output = FollowSet;

    fn index(&self, id: NonterminalId) -> &FollowSet {
        &self.0[id.as_usize()]
    }
}

impl FollowSet {
    /// Whether a terminal is in the set.
    pub fn contains(&self, id: TerminalId) -> bool {
        self.symbols.contains(id.as_usize())
    }

    /// The terminals in the set, in ascending id order.
    pub fn terminals<'a>(&'a self) -> impl Iterator<Item = TerminalId> + 'a {
        self.symbols.iter().map(TerminalId::from_usize)
    }

    /// Get a pretty printer for this set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FollowSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.item.terminals().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id.pretty(self.ctx))?;
        }
        write!(f, "}}")
    }
}
