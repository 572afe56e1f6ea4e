// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a grammar.
//!
//! A grammar is built once from an ordered list of productions and is
//! immutable afterwards. Construction augments it with the synthetic rule
//! `S' -> S $` at index 0, such that rule indices of the user's productions
//! start at 1 and stay stable for the lifetime of the grammar.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;

use crate::error::GrammarError;
use crate::Pretty;

/// A grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    nonterms: HashMap<String, NonterminalId>,
    terms: HashMap<String, TerminalId>,
    nonterm_names: Vec<String>,
    nonterm_rules: Vec<Vec<RuleId>>,
    nonterm_uses: Vec<Vec<(RuleId, usize)>>,
    term_names: Vec<String>,
    start: NonterminalId,
}

/// A production as written by the user, before symbols are resolved.
///
/// An empty `rhs` denotes an epsilon production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    /// The name of the nonterminal being defined.
    pub lhs: String,
    /// The names of the symbols the nonterminal expands to.
    pub rhs: Vec<String>,
}

/// A single rule within a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: NonterminalId,
    symbols: Vec<Symbol>,
}

/// A symbol of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A terminal.
    Terminal(TerminalId),
    /// A nonterminal.
    Nonterminal(NonterminalId),
}

/// A unique nonterminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(usize);

/// A unique terminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(usize);

/// A unique rule identifier, i.e. the production number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

/// The augmenting rule `S' -> S $`.
pub const ACCEPT: RuleId = RuleId(0);

/// The augmented start symbol `S'`.
pub const ROOT: NonterminalId = NonterminalId(0);

/// The special end of input terminal `$`.
pub const END: TerminalId = TerminalId(0);

/// The name of the end of input terminal.
pub const END_NAME: &str = "$";

/// How an empty right-hand side is displayed.
pub const EPSILON_NAME: &str = "ϵ";

/// An iterator over the rules of a grammar.
pub type RulesIter<'a> = std::slice::Iter<'a, Rule>;

/// An iterator over the rule IDs of a grammar.
pub type RuleIdsIter<'a> = std::slice::Iter<'a, RuleId>;

impl Grammar {
    /// Build the augmented grammar from a list of productions.
    ///
    /// The start symbol is `start` if given, or the LHS of the first
    /// production otherwise. Every symbol that appears as a LHS is a
    /// nonterminal; all others are terminals. The name `$` is reserved for
    /// the end of input terminal and may not appear in any production.
    pub fn from_productions(
        productions: &[Production],
        start: Option<&str>,
    ) -> Result<Grammar, GrammarError> {
        let start_name = match (start, productions.first()) {
            (_, None) => return Err(GrammarError::Empty),
            (Some(name), _) => name,
            (None, Some(first)) => first.lhs.as_str(),
        };
        if !productions.iter().any(|p| p.lhs == start_name) {
            return Err(GrammarError::MissingStart(start_name.to_string()));
        }

        if let Some(p) = productions
            .iter()
            .find(|p| p.lhs == END_NAME || p.rhs.iter().any(|s| s == END_NAME))
        {
            return Err(GrammarError::ReservedSymbol(p.lhs.clone()));
        }

        // Pick a root name that cannot clash with anything the user wrote.
        let used: HashSet<&str> = productions
            .iter()
            .flat_map(|p| Some(p.lhs.as_str()).into_iter().chain(p.rhs.iter().map(|s| s.as_str())))
            .collect();
        let mut root_name = format!("{}'", start_name);
        while used.contains(root_name.as_str()) {
            root_name.push('\'');
        }

        let mut g = Grammar {
            rules: Vec::new(),
            nonterms: HashMap::new(),
            terms: HashMap::new(),
            nonterm_names: Vec::new(),
            nonterm_rules: Vec::new(),
            nonterm_uses: Vec::new(),
            term_names: Vec::new(),
            start: ROOT,
        };
        g.add_nonterminal(root_name);
        g.add_terminal(END_NAME);

        // Every LHS is a nonterminal, which must be known before any RHS is
        // resolved.
        for p in productions {
            g.add_nonterminal(p.lhs.as_str());
        }
        g.start = g.nonterms[start_name];

        g.add_rule(Rule::new(ROOT, vec![g.start.into(), END.into()]));
        for p in productions {
            let name = g.nonterms[p.lhs.as_str()];
            let mut symbols = Vec::with_capacity(p.rhs.len());
            for s in &p.rhs {
                symbols.push(match g.nonterminal(s) {
                    Some(id) => id.into(),
                    None => g.add_terminal(s.as_str()).into(),
                });
            }
            g.add_rule(Rule::new(name, symbols));
        }

        // Second pass: record where each nonterminal is used.
        for (index, rule) in g.rules.iter().enumerate() {
            for (pos, symbol) in rule.symbols.iter().enumerate() {
                if let Symbol::Nonterminal(id) = *symbol {
                    g.nonterm_uses[id.as_usize()].push((RuleId(index), pos));
                }
            }
        }

        debug!(
            "grammar has {} rules, {} nonterminals, {} terminals",
            g.rules.len(),
            g.nonterm_names.len(),
            g.term_names.len()
        );
        Ok(g)
    }

    fn add_nonterminal<S: Into<String>>(&mut self, name: S) -> NonterminalId {
        let name = name.into();
        let next_id = NonterminalId(self.nonterm_names.len());
        if let Some(&id) = self.nonterms.get(&name) {
            id
        } else {
            self.nonterms.insert(name.clone(), next_id);
            self.nonterm_names.push(name);
            self.nonterm_rules.push(Vec::new());
            self.nonterm_uses.push(Vec::new());
            next_id
        }
    }

    fn add_terminal<S: Into<String>>(&mut self, name: S) -> TerminalId {
        let name = name.into();
        let next_id = TerminalId(self.term_names.len());
        if let Some(&id) = self.terms.get(&name) {
            id
        } else {
            self.terms.insert(name.clone(), next_id);
            self.term_names.push(name);
            next_id
        }
    }

    fn add_rule(&mut self, rule: Rule) {
        self.nonterm_rules[rule.name().as_usize()].push(RuleId::from_usize(self.rules.len()));
        self.rules.push(rule);
    }

    /// The user's start symbol `S` of the augmenting rule `S' -> S $`.
    pub fn start(&self) -> NonterminalId {
        self.start
    }

    /// Get the name of a nonterminal.
    pub fn nonterminal_name(&self, id: NonterminalId) -> &str {
        &self.nonterm_names[id.as_usize()]
    }

    /// Get the name of a terminal.
    pub fn terminal_name(&self, id: TerminalId) -> &str {
        &self.term_names[id.as_usize()]
    }

    /// Look up a nonterminal by name.
    pub fn nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.nonterms.get(name).cloned()
    }

    /// Look up a terminal by name.
    pub fn terminal(&self, name: &str) -> Option<TerminalId> {
        self.terms.get(name).cloned()
    }

    /// Look up a symbol by name.
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.nonterminal(name)
            .map(Symbol::Nonterminal)
            .or_else(|| self.terminal(name).map(Symbol::Terminal))
    }

    /// The upper bound on nonterminal IDs.
    ///
    /// Basically returns the largest nonterminal ID + 1. Can be used as
    /// capacity for containers that will hold nonterminals.
    pub fn nonterminal_id_bound(&self) -> usize {
        self.nonterm_names.len()
    }

    /// The upper bound on terminal IDs.
    ///
    /// Basically returns the largest terminal ID + 1. Can be used as capacity
    /// for containers that will hold terminals.
    pub fn terminal_id_bound(&self) -> usize {
        self.term_names.len()
    }

    /// All nonterminals, the augmented root first.
    pub fn nonterminals(&self) -> impl Iterator<Item = NonterminalId> {
        (0..self.nonterm_names.len()).map(NonterminalId)
    }

    /// All terminals, the end of input marker first.
    pub fn terminals(&self) -> impl Iterator<Item = TerminalId> {
        (0..self.term_names.len()).map(TerminalId)
    }

    /// The rules in this grammar, the augmenting rule first.
    pub fn rules(&self) -> RulesIter {
        self.rules.iter()
    }

    /// The rules for a specific nonterminal in the grammar.
    pub fn rules_for_nonterminal(&self, id: NonterminalId) -> RuleIdsIter {
        self.nonterm_rules[id.as_usize()].iter()
    }

    /// The places where a nonterminal appears on a right-hand side, as
    /// `(rule, position)` pairs.
    pub fn uses_of_nonterminal(&self, id: NonterminalId) -> &[(RuleId, usize)] {
        &self.nonterm_uses[id.as_usize()]
    }

    /// Access a single rule of this grammar.
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.as_usize()]
    }
}

impl Index<RuleId> for Grammar {
    type Output = Rule;

    fn index(&self, index: RuleId) -> &Rule {
        self.rule(index)
    }
}

impl Production {
    /// Create a new production.
    pub fn new<S: Into<String>>(lhs: S, rhs: Vec<String>) -> Production {
        Production {
            lhs: lhs.into(),
            rhs: rhs,
        }
    }
}

impl Rule {
    /// Create a new rule.
    pub fn new(name: NonterminalId, symbols: Vec<Symbol>) -> Rule {
        Rule {
            name: name,
            symbols: symbols,
        }
    }

    /// The name of this rule.
    pub fn name(&self) -> NonterminalId {
        self.name
    }

    /// The symbols in this production.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Whether this rule derives the empty string directly.
    pub fn is_epsilon(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Get a pretty printer for this rule.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Rule> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.item.name.pretty(self.ctx))?;
        if self.item.symbols.is_empty() {
            write!(f, " {}", EPSILON_NAME)?;
        }
        for symbol in &self.item.symbols {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl Symbol {
    /// Get a pretty printer for this symbol.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl From<TerminalId> for Symbol {
    fn from(id: TerminalId) -> Symbol {
        Symbol::Terminal(id)
    }
}

impl From<NonterminalId> for Symbol {
    fn from(id: NonterminalId) -> Symbol {
        Symbol::Nonterminal(id)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Symbol> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            Symbol::Terminal(id) => write!(f, "{}", id.pretty(self.ctx)),
            Symbol::Nonterminal(id) => write!(f, "{}", id.pretty(self.ctx)),
        }
    }
}

impl NonterminalId {
    /// Create a nonterminal id from a usize.
    pub fn from_usize(id: usize) -> NonterminalId {
        NonterminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this nonterminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, NonterminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.nonterminal_name(self.item))
    }
}

impl TerminalId {
    /// Create a terminal id from a usize.
    pub fn from_usize(id: usize) -> TerminalId {
        TerminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this terminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, TerminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.terminal_name(self.item))
    }
}

impl RuleId {
    /// Create a rule id from a usize.
    pub fn from_usize(id: usize) -> RuleId {
        RuleId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
