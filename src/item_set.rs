// Copyright (c) 2018 Fabian Schuiki

//! LR(1) items and item sets derived from a grammar.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use bit_set::BitSet;
use indexmap::IndexSet;

use crate::first::FirstSets;
use crate::grammar::{self, Grammar, RuleId, Symbol, TerminalId};
use crate::Pretty;

/// An item set.
///
/// The kernel items come first, followed by the items added by the closure.
/// No two items share the same rule and marker position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSet {
    /// The items in the set.
    pub(crate) items: Vec<Item>,
    /// The number of kernel items.
    pub(crate) kernel: usize,
}

/// The content of an item set, independent of the order of its items.
pub(crate) type ItemSetKey = Vec<(RuleId, usize, Vec<usize>)>;

impl ItemSet {
    /// Create an item set from its kernel items. The closure is not computed.
    pub fn with_kernel(items: Vec<Item>) -> ItemSet {
        ItemSet {
            kernel: items.len(),
            items: items,
        }
    }

    /// The initial item set `S' -> . S $` with an empty lookahead, not yet
    /// closed.
    pub fn initial() -> ItemSet {
        ItemSet::with_kernel(vec![Item {
            rule: grammar::ACCEPT,
            marker: 0,
            lookahead: BitSet::new(),
        }])
    }

    /// Get the items in the set.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get the kernel items of the set.
    pub fn kernel(&self) -> &[Item] {
        &self.items[0..self.kernel]
    }

    /// Add the closure items to the set.
    ///
    /// For every item `A -> α . B β, L` and every rule `B -> γ` this adds
    /// `B -> . γ, FIRST(β L)`. An item for the same rule and marker that is
    /// already present has its lookahead extended instead, and is revisited
    /// if that extension added anything.
    pub fn closure(&mut self, grammar: &Grammar, first: &FirstSets) {
        let mut index: HashMap<(RuleId, usize), usize> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| ((item.rule, item.marker), i))
            .collect();
        let mut todo: VecDeque<usize> = (0..self.items.len()).collect();

        while let Some(i) = todo.pop_front() {
            let symbols = grammar[self.items[i].rule].symbols();
            let marker = self.items[i].marker;
            let nt = match symbols.get(marker) {
                Some(&Symbol::Nonterminal(nt)) => nt,
                _ => continue,
            };
            let lookahead = first.first_of_with(&symbols[marker + 1..], &self.items[i].lookahead);

            for &rule in grammar.rules_for_nonterminal(nt) {
                match index.get(&(rule, 0)) {
                    Some(&j) => {
                        let existing = &mut self.items[j].lookahead;
                        let before = existing.len();
                        existing.union_with(&lookahead);
                        if existing.len() != before {
                            todo.push_back(j);
                        }
                    }
                    None => {
                        let j = self.items.len();
                        self.items.push(Item {
                            rule: rule,
                            marker: 0,
                            lookahead: lookahead.clone(),
                        });
                        index.insert((rule, 0), j);
                        todo.push_back(j);
                    }
                }
            }
        }
    }

    /// Compute the closed item set reached by advancing over `symbol`.
    ///
    /// Returns `None` if no item has `symbol` after its marker.
    pub fn goto(&self, grammar: &Grammar, first: &FirstSets, symbol: Symbol) -> Option<ItemSet> {
        let kernel: Vec<Item> = self
            .items
            .iter()
            .filter(|item| item.next_symbol(grammar) == Some(symbol))
            .map(|item| Item {
                rule: item.rule,
                marker: item.marker + 1,
                lookahead: item.lookahead.clone(),
            })
            .collect();
        if kernel.is_empty() {
            return None;
        }
        let mut set = ItemSet::with_kernel(kernel);
        set.closure(grammar, first);
        Some(set)
    }

    /// The symbols after the markers of the items, in order of appearance.
    ///
    /// The end of input marker is never part of this, since the parser accepts
    /// instead of shifting it.
    pub fn transition_symbols(&self, grammar: &Grammar) -> IndexSet<Symbol> {
        self.items
            .iter()
            .filter_map(|item| item.next_symbol(grammar))
            .filter(|&symbol| symbol != Symbol::Terminal(grammar::END))
            .collect()
    }

    /// The content of the set, for comparing sets regardless of item order.
    pub(crate) fn key(&self) -> ItemSetKey {
        let mut key: ItemSetKey = self
            .items
            .iter()
            .map(|item| (item.rule, item.marker, item.lookahead.iter().collect()))
            .collect();
        key.sort();
        key
    }

    /// Get a pretty printer for this item set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, item) in self.item.items.iter().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            let mark = if index < self.item.kernel { "*" } else { " " };
            write!(f, "{}{} {}", mark, index, item.pretty(self.ctx))?;
        }
        if self.item.items.is_empty() {
            write!(f, "<empty>")?;
        }
        Ok(())
    }
}

/// A single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The rule of the item.
    pub(crate) rule: RuleId,
    /// The position of the marker within the rule.
    pub(crate) marker: usize,
    /// The lookahead terminals.
    pub(crate) lookahead: BitSet,
}

impl Item {
    /// Get the rule this item represents.
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// Get the position of the marker within the rule.
    pub fn marker(&self) -> usize {
        self.marker
    }

    /// Get the lookahead terminals of this item.
    pub fn lookahead<'a>(&'a self) -> impl Iterator<Item = TerminalId> + 'a {
        self.lookahead.iter().map(TerminalId::from_usize)
    }

    /// The symbol after the marker, if any.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar[self.rule].symbols().get(self.marker).cloned()
    }

    /// Whether the marker is at the end of the rule.
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.marker == grammar[self.rule].symbols().len()
    }

    /// Get a pretty printer for this item.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Item> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = self.ctx.rule(self.item.rule);
        write!(f, "[{} ->", rule.name().pretty(self.ctx))?;
        let symbols = rule.symbols();
        for symbol in &symbols[0..self.item.marker] {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        write!(f, " .")?;
        for symbol in &symbols[self.item.marker..] {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        write!(f, ", {{")?;
        for (i, t) in self.item.lookahead().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", t.pretty(self.ctx))?;
        }
        write!(f, "}}]")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(src: &str) -> (Grammar, FirstSets) {
        let g: Grammar = src.parse().unwrap();
        let fs = FirstSets::compute(&g).unwrap();
        (g, fs)
    }

    fn lines(g: &Grammar, set: &ItemSet) -> Vec<String> {
        set.items().iter().map(|i| format!("{}", i.pretty(g))).collect()
    }

    #[test]
    fn initial_closure() {
        let (g, fs) = setup("E -> E + T\nE -> T\nT -> id");
        let mut set = ItemSet::initial();
        set.closure(&g, &fs);
        assert_eq!(
            lines(&g, &set),
            vec![
                "[E' -> . E $, {}]",
                "[E -> . E + T, {$, +}]",
                "[E -> . T, {$, +}]",
                "[T -> . id, {$, +}]",
            ]
        );
        assert_eq!(set.kernel().len(), 1);
    }

    #[test]
    fn goto_advances() {
        let (g, fs) = setup("E -> E + T\nE -> T\nT -> id");
        let mut set = ItemSet::initial();
        set.closure(&g, &fs);
        let e = Symbol::Nonterminal(g.nonterminal("E").unwrap());
        let next = set.goto(&g, &fs, e).unwrap();
        assert_eq!(
            lines(&g, &next),
            vec!["[E' -> E . $, {}]", "[E -> E . + T, {$, +}]"]
        );
        let plus = Symbol::Terminal(g.terminal("+").unwrap());
        assert!(set.goto(&g, &fs, plus).is_none());
    }

    #[test]
    fn epsilon_lookahead() {
        // `A` is nullable, so the lookahead of the item that introduced it
        // flows through to the closure items of `A`.
        let (g, fs) = setup("S -> B A\nB -> b\nA -> ''\nA -> a");
        let b = Symbol::Nonterminal(g.nonterminal("B").unwrap());
        let mut set = ItemSet::initial();
        set.closure(&g, &fs);
        let next = set.goto(&g, &fs, b).unwrap();
        assert_eq!(
            lines(&g, &next),
            vec!["[S -> B . A, {$}]", "[A -> ., {$}]", "[A -> . a, {$}]"]
        );
        assert!(next.items()[1].is_complete(&g));
    }

    #[test]
    fn transition_symbols_skip_end() {
        let (g, fs) = setup("E -> E + T\nE -> T\nT -> id");
        let mut set = ItemSet::initial();
        set.closure(&g, &fs);
        let e = Symbol::Nonterminal(g.nonterminal("E").unwrap());
        let next = set.goto(&g, &fs, e).unwrap();
        let syms: Vec<_> = next.transition_symbols(&g).into_iter().collect();
        assert_eq!(syms, vec![Symbol::Terminal(g.terminal("+").unwrap())]);
    }

    #[test]
    fn key_ignores_order() {
        let (g, fs) = setup("E -> E + T\nE -> T\nT -> id");
        let mut set = ItemSet::initial();
        set.closure(&g, &fs);
        let mut shuffled = set.clone();
        shuffled.items.reverse();
        assert_eq!(set.key(), shuffled.key());
    }
}
