// Copyright (c) 2018 Fabian Schuiki

//! The ACTION and GOTO tables derived from the LR(1) automaton.
//!
//! A cell of the ACTION table holds every action derived for it, in the order
//! the actions were found. Cells with more than one action are conflicts;
//! they are reported rather than resolved here, and a [`ConflictResolution`]
//! picks one of the candidates when the table is consulted.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::grammar::{self, Grammar, NonterminalId, RuleId, Symbol, TerminalId};
use crate::lr1::{ItemSets, StateId};
use crate::Pretty;

/// An action to be taken upon encountering a terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Shift the terminal and go to the given state.
    Shift(StateId),
    /// Reduce with the given rule.
    Reduce(RuleId),
    /// Accept the input.
    Accept,
    /// Reject the input.
    Error,
}

/// How to pick one action from a cell that holds several.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConflictResolution {
    /// Take the action that was recorded first.
    FirstFound,
    /// Take the first shift if there is one, otherwise the first action.
    PreferShift,
    /// Take the first reduce if there is one, otherwise the first action.
    PreferReduce,
}

/// The kind of a conflict.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// A shift competes with at least one reduction.
    ShiftReduce,
    /// Multiple reductions (or a reduction and accept) compete.
    ReduceReduce,
}

/// A cell of the ACTION table with more than one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The state of the cell.
    pub state: StateId,
    /// The terminal of the cell.
    pub terminal: TerminalId,
    /// The competing actions, in the order they were found.
    pub actions: Vec<Action>,
}

/// The ACTION and GOTO tables of a grammar.
#[derive(Debug, Clone)]
pub struct ParseTable {
    actions: Vec<IndexMap<TerminalId, Vec<Action>>>,
    gotos: Vec<IndexMap<NonterminalId, StateId>>,
}

impl ParseTable {
    /// Derive the tables from the automaton of a grammar.
    pub fn compute(grammar: &Grammar, item_sets: &ItemSets) -> ParseTable {
        let mut actions = Vec::with_capacity(item_sets.len());
        let mut gotos = Vec::with_capacity(item_sets.len());

        for state in item_sets.states() {
            let mut row: IndexMap<TerminalId, Vec<Action>> = IndexMap::new();
            let mut record = |terminal: TerminalId, action: Action| {
                let cell = row.entry(terminal).or_insert_with(Vec::new);
                if !cell.contains(&action) {
                    cell.push(action);
                }
            };

            for item in state.items().items() {
                let next = item.next_symbol(grammar);
                if item.rule() == grammar::ACCEPT {
                    // `S' -> S . $` accepts on the end of input rather than
                    // shifting it.
                    if next == Some(Symbol::Terminal(grammar::END)) || next.is_none() {
                        record(grammar::END, Action::Accept);
                    }
                    continue;
                }
                match next {
                    None => {
                        for la in item.lookahead() {
                            record(la, Action::Reduce(item.rule()));
                        }
                    }
                    Some(Symbol::Terminal(t)) => {
                        if let Some(target) = state.goto(Symbol::Terminal(t)) {
                            record(t, Action::Shift(target));
                        }
                    }
                    Some(Symbol::Nonterminal(_)) => (),
                }
            }

            let goto_row = state
                .transitions()
                .iter()
                .filter_map(|(&symbol, &target)| match symbol {
                    Symbol::Nonterminal(nt) => Some((nt, target)),
                    Symbol::Terminal(_) => None,
                })
                .collect();

            actions.push(row);
            gotos.push(goto_row);
        }

        let table = ParseTable { actions, gotos };
        for conflict in table.conflicts() {
            warn!("{}", conflict.pretty(grammar));
        }
        debug!("parse table has {} states", table.actions.len());
        table
    }

    /// The number of states (rows) in the table.
    pub fn num_states(&self) -> usize {
        self.actions.len()
    }

    /// All actions recorded for a state and terminal, in the order they were
    /// found. Empty if the input is to be rejected.
    pub fn actions(&self, state: StateId, terminal: TerminalId) -> &[Action] {
        self.actions[state.as_usize()]
            .get(&terminal)
            .map(|cell| cell.as_slice())
            .unwrap_or(&[])
    }

    /// The action for a state and terminal, picking one candidate via
    /// `resolution` if there are several.
    pub fn action(
        &self,
        state: StateId,
        terminal: TerminalId,
        resolution: ConflictResolution,
    ) -> Action {
        resolution.select(self.actions(state, terminal))
    }

    /// The state to go to after reducing to a nonterminal.
    pub fn goto(&self, state: StateId, nonterminal: NonterminalId) -> Option<StateId> {
        self.gotos[state.as_usize()].get(&nonterminal).cloned()
    }

    /// The terminals for which a state has an action.
    pub fn expected(&self, state: StateId) -> Vec<TerminalId> {
        let mut terms: Vec<TerminalId> = self.actions[state.as_usize()].keys().cloned().collect();
        terms.sort();
        terms
    }

    /// All cells with more than one action, ordered by state.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for (index, row) in self.actions.iter().enumerate() {
            for (&terminal, cell) in row {
                if cell.len() > 1 {
                    conflicts.push(Conflict {
                        state: StateId::from_usize(index),
                        terminal: terminal,
                        actions: cell.clone(),
                    });
                }
            }
        }
        conflicts
    }

    /// Get a pretty printer for this table.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ParseTable> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, (row, gotos)) in self.item.actions.iter().zip(&self.item.gotos).enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "{:4}:", index)?;
            let mut terms: Vec<_> = row.iter().collect();
            terms.sort_by_key(|&(&t, _)| t);
            for (&terminal, cell) in terms {
                write!(f, "  {}=", terminal.pretty(self.ctx))?;
                for (i, action) in cell.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{}", action)?;
                }
            }
            let mut nts: Vec<_> = gotos.iter().collect();
            nts.sort_by_key(|&(&nt, _)| nt);
            for (&nt, &target) in nts {
                write!(f, "  {}:{}", nt.pretty(self.ctx), target)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Action::Shift(s) => write!(f, "s{}", s),
            Action::Reduce(r) => write!(f, "r{}", r.as_usize()),
            Action::Accept => write!(f, "acc"),
            Action::Error => write!(f, "err"),
        }
    }
}

impl ConflictResolution {
    /// Pick one action out of a cell.
    pub fn select(self, actions: &[Action]) -> Action {
        let preferred = match self {
            ConflictResolution::FirstFound => None,
            ConflictResolution::PreferShift => actions.iter().find(|a| match **a {
                Action::Shift(_) => true,
                _ => false,
            }),
            ConflictResolution::PreferReduce => actions.iter().find(|a| match **a {
                Action::Reduce(_) => true,
                _ => false,
            }),
        };
        preferred
            .or_else(|| actions.first())
            .cloned()
            .unwrap_or(Action::Error)
    }
}

impl Default for ConflictResolution {
    fn default() -> ConflictResolution {
        ConflictResolution::FirstFound
    }
}

impl FromStr for ConflictResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<ConflictResolution, String> {
        match s {
            "first-found" => Ok(ConflictResolution::FirstFound),
            "prefer-shift" => Ok(ConflictResolution::PreferShift),
            "prefer-reduce" => Ok(ConflictResolution::PreferReduce),
            _ => Err(format!("unknown conflict resolution `{}`", s)),
        }
    }
}

impl Conflict {
    /// Classify the conflict.
    pub fn kind(&self) -> ConflictKind {
        if self.actions.iter().any(|a| match *a {
            Action::Shift(_) => true,
            _ => false,
        }) {
            ConflictKind::ShiftReduce
        } else {
            ConflictKind::ReduceReduce
        }
    }

    /// Get a pretty printer for this conflict.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Conflict> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.item.kind() {
            ConflictKind::ShiftReduce => "shift-reduce",
            ConflictKind::ReduceReduce => "reduce-reduce",
        };
        write!(
            f,
            "{} conflict in state {} on `{}`:",
            kind,
            self.item.state,
            self.item.terminal.pretty(self.ctx)
        )?;
        for action in &self.item.actions {
            match *action {
                Action::Reduce(r) => write!(f, " [reduce {}]", self.ctx[r].pretty(self.ctx))?,
                Action::Shift(s) => write!(f, " [shift {}]", s)?,
                Action::Accept => write!(f, " [accept]")?,
                Action::Error => write!(f, " [error]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::FirstSets;

    fn build(src: &str) -> (Grammar, ItemSets, ParseTable) {
        let g: Grammar = src.parse().unwrap();
        let fs = FirstSets::compute(&g).unwrap();
        let is = ItemSets::compute(&g, &fs).unwrap();
        let table = ParseTable::compute(&g, &is);
        (g, is, table)
    }

    #[test]
    fn expression_table() {
        let (g, is, table) = build("E -> E + T\nE -> T\nT -> id");
        assert!(table.conflicts().is_empty());
        let s0 = StateId::from_usize(0);
        let id = g.terminal("id").unwrap();
        let plus = g.terminal("+").unwrap();
        let e = g.nonterminal("E").unwrap();

        let s_id = match table.actions(s0, id) {
            &[Action::Shift(s)] => s,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(s_id, is[s0].goto(Symbol::Terminal(id)).unwrap());
        assert_eq!(table.actions(s_id, plus), &[Action::Reduce(RuleId::from_usize(3))]);
        assert_eq!(table.actions(s_id, grammar::END), &[Action::Reduce(RuleId::from_usize(3))]);
        assert!(table.actions(s0, plus).is_empty());
        assert_eq!(table.action(s0, plus, ConflictResolution::FirstFound), Action::Error);

        let s_e = table.goto(s0, e).unwrap();
        assert_eq!(table.actions(s_e, grammar::END), &[Action::Accept]);
        assert_eq!(table.expected(s_e), vec![grammar::END, plus]);
        assert_eq!(table.goto(s_e, e), None);
    }

    #[test]
    fn dangling_else() {
        let src = "S -> if E then S\nS -> if E then S else S\nS -> x\nE -> c";
        let (g, _, table) = build(src);
        let conflicts = table.conflicts();
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.terminal, g.terminal("else").unwrap());
        assert_eq!(c.kind(), ConflictKind::ShiftReduce);
        assert_eq!(c.actions.len(), 2);

        // The same grammar yields the same cell contents every time.
        let (_, _, again) = build(src);
        assert_eq!(again.conflicts(), conflicts);
    }

    #[test]
    fn reduce_reduce() {
        let (_, _, table) = build("S -> A\nS -> B\nA -> x\nB -> x");
        let conflicts = table.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind(), ConflictKind::ReduceReduce);
        assert_eq!(conflicts[0].terminal, grammar::END);
    }

    #[test]
    fn resolution() {
        let shift = Action::Shift(StateId::from_usize(4));
        let reduce = Action::Reduce(RuleId::from_usize(2));
        let cell = [reduce, shift];
        assert_eq!(ConflictResolution::FirstFound.select(&cell), reduce);
        assert_eq!(ConflictResolution::PreferShift.select(&cell), shift);
        assert_eq!(ConflictResolution::PreferReduce.select(&[shift, reduce]), reduce);
        assert_eq!(ConflictResolution::PreferShift.select(&[reduce]), reduce);
        assert_eq!(ConflictResolution::default().select(&[]), Action::Error);
        assert_eq!(
            "prefer-shift".parse::<ConflictResolution>(),
            Ok(ConflictResolution::PreferShift)
        );
        assert!("whatever".parse::<ConflictResolution>().is_err());
    }
}
