// Copyright (c) 2018 Fabian Schuiki

//! A table-driven shift-reduce parser.
//!
//! The parser keeps a stack of automaton states and a parallel stack of
//! syntax tree nodes, such that the node at index `i` sits between states `i`
//! and `i + 1`. Shifting pushes a leaf and a state. Reducing by a rule with
//! `n` symbols moves the top `n` nodes into a new parent node, pops `n`
//! states, and pushes the goto state of the exposed state.

use std::collections::HashSet;
use std::fmt;

use crate::error::ParseError;
use crate::grammar::{self, Grammar, Symbol, TerminalId};
use crate::lr1::StateId;
use crate::table::{Action, ConflictResolution, ParseTable};
use crate::tree::{Node, NodeId};
use crate::Pretty;

/// A parser driven by a parse table.
///
/// The parser only borrows the grammar and table, which are never modified.
/// Each call to one of the parse functions has its own stack and tree.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    grammar: &'a Grammar,
    table: &'a ParseTable,
    resolution: ConflictResolution,
}

/// A snapshot of the parser after it performed an action.
#[derive(Debug, Clone, Copy)]
pub struct Step<'s> {
    /// The action that was performed.
    pub action: Action,
    /// The lookahead terminal that selected the action.
    pub lookahead: TerminalId,
    /// The index of the lookahead in the input.
    pub position: usize,
    /// The state stack, bottom first.
    pub states: &'s [StateId],
    /// The node stack, bottom first.
    pub nodes: &'s [Node],
    /// The node created by the action. For accept this is the result.
    pub node: Option<&'s Node>,
}

/// Something that wants to watch the parser work.
pub trait StepObserver {
    /// Called after every shift and reduce, and upon accept.
    fn step(&mut self, step: &Step);
}

impl<F: FnMut(&Step)> StepObserver for F {
    fn step(&mut self, step: &Step) {
        self(step)
    }
}

impl<'a> Parser<'a> {
    /// Create a parser that resolves conflicts by taking the first action.
    pub fn new(grammar: &'a Grammar, table: &'a ParseTable) -> Parser<'a> {
        Parser {
            grammar: grammar,
            table: table,
            resolution: ConflictResolution::default(),
        }
    }

    /// Change how the parser picks an action from a conflicting cell.
    pub fn with_resolution(mut self, resolution: ConflictResolution) -> Parser<'a> {
        self.resolution = resolution;
        self
    }

    /// Map whitespace-separated terminal names to terminals.
    pub fn tokenize(&self, input: &str) -> Result<Vec<TerminalId>, ParseError> {
        input
            .split_whitespace()
            .enumerate()
            .map(|(position, name)| {
                self.grammar
                    .terminal(name)
                    .ok_or_else(|| ParseError::UnknownTerminal {
                        name: name.to_string(),
                        position: position,
                    })
            })
            .collect()
    }

    /// Parse whitespace-separated terminal names.
    pub fn parse_str(&self, input: &str) -> Result<Node, ParseError> {
        let tokens = self.tokenize(input)?;
        self.parse(tokens)
    }

    /// Parse a sequence of terminals into a syntax tree.
    ///
    /// The end of input marker is appended unless the sequence already ends
    /// with it. An end marker anywhere else is an unexpected token.
    pub fn parse<I>(&self, tokens: I) -> Result<Node, ParseError>
    where
        I: IntoIterator<Item = TerminalId>,
    {
        self.parse_observed(tokens, &mut |_: &Step| ())
    }

    /// Parse a sequence of terminals, notifying `observer` after every step.
    pub fn parse_observed<I, O>(&self, tokens: I, observer: &mut O) -> Result<Node, ParseError>
    where
        I: IntoIterator<Item = TerminalId>,
        O: StepObserver + ?Sized,
    {
        let mut input: Vec<TerminalId> = tokens.into_iter().collect();
        if input.last() != Some(&grammar::END) {
            input.push(grammar::END);
        }

        let mut states = vec![StateId::from_usize(0)];
        let mut nodes: Vec<Node> = Vec::new();
        let mut next_id = 0;
        let mut position = 0;
        let mut reductions = 0;

        // Between two shifts the lookahead is fixed, so the engine is a
        // deterministic function of the stack. States below `floor` have not
        // been touched since the last shift. A stack segment above `floor`
        // that recurs, or a state pushed twice above `floor`, therefore
        // repeats forever without consuming input.
        let mut floor = states.len();
        let mut seen: HashSet<Vec<StateId>> = HashSet::new();

        loop {
            let top = states[states.len() - 1];
            let lookahead = input[position];
            let action = self.table.action(top, lookahead, self.resolution);
            trace!(
                "state {}, lookahead {}: {}",
                top,
                lookahead.pretty(self.grammar),
                action
            );

            match action {
                Action::Error => {
                    return Err(self.unexpected(top, lookahead, position, true));
                }
                Action::Shift(target) => {
                    nodes.push(Node::terminal(NodeId::from_usize(next_id), lookahead));
                    next_id += 1;
                    states.push(target);
                    position += 1;
                    reductions = 0;
                    floor = states.len();
                    seen.clear();
                }
                Action::Reduce(rule_id) => {
                    reductions += 1;
                    let rule = &self.grammar[rule_id];
                    let length = rule.symbols().len();
                    if nodes.len() < length {
                        return Err(ParseError::StackUnderflow {
                            rule: rule.pretty(self.grammar).to_string(),
                            needed: length,
                            available: nodes.len(),
                        });
                    }

                    let id = NodeId::from_usize(next_id);
                    next_id += 1;
                    let children = if rule.is_epsilon() {
                        let epsilon = Node::epsilon(NodeId::from_usize(next_id));
                        next_id += 1;
                        vec![epsilon]
                    } else {
                        let at = nodes.len() - length;
                        nodes.split_off(at)
                    };
                    let keep = states.len() - length;
                    states.truncate(keep);
                    if keep < floor {
                        floor = keep;
                        seen.clear();
                    }

                    let exposed = states[states.len() - 1];
                    let target = match self.table.goto(exposed, rule.name()) {
                        Some(target) => target,
                        None => {
                            return Err(ParseError::InvalidGoto {
                                state: exposed.as_usize(),
                                nonterminal: self.grammar.nonterminal_name(rule.name()).to_string(),
                            })
                        }
                    };
                    nodes.push(Node::reduction(id, rule.name(), rule_id, children));
                    let pumped = states[floor..].contains(&target);
                    states.push(target);
                    if pumped || !seen.insert(states[floor..].to_vec()) {
                        return Err(ParseError::NoProgress {
                            state: target.as_usize(),
                            steps: reductions,
                        });
                    }
                }
                // A `$` inside the input is not the end of it.
                Action::Accept if position + 1 != input.len() => {
                    return Err(self.unexpected(top, lookahead, position, false));
                }
                Action::Accept => {
                    debug_assert_eq!(
                        self.grammar[grammar::ACCEPT].symbols().last(),
                        Some(&Symbol::Terminal(grammar::END))
                    );
                    observer.step(&Step {
                        action: action,
                        lookahead: lookahead,
                        position: position,
                        states: &states,
                        nodes: &nodes,
                        node: nodes.last(),
                    });
                    return match nodes.pop() {
                        Some(root) => Ok(root),
                        None => Err(ParseError::StackUnderflow {
                            rule: self.grammar[grammar::ACCEPT].pretty(self.grammar).to_string(),
                            needed: 1,
                            available: 0,
                        }),
                    };
                }
            }

            observer.step(&Step {
                action: action,
                lookahead: lookahead,
                position: position,
                states: &states,
                nodes: &nodes,
                node: nodes.last(),
            });
        }
    }

    fn unexpected(
        &self,
        state: StateId,
        token: TerminalId,
        position: usize,
        end_allowed: bool,
    ) -> ParseError {
        ParseError::UnexpectedToken {
            state: state.as_usize(),
            token: self.grammar.terminal_name(token).to_string(),
            position: position,
            expected: self
                .table
                .expected(state)
                .into_iter()
                .filter(|&t| end_allowed || t != grammar::END)
                .map(|t| self.grammar.terminal_name(t).to_string())
                .collect(),
        }
    }
}

impl<'s> Step<'s> {
    /// Get a pretty printer for this step.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a, 's> fmt::Display for Pretty<&'a Grammar, &'a Step<'s>> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let step = self.item;
        match step.action {
            Action::Shift(s) => write!(f, "shift {} -> {}", step.lookahead.pretty(self.ctx), s)?,
            Action::Reduce(r) => write!(f, "reduce {}", self.ctx[r].pretty(self.ctx))?,
            Action::Accept => write!(f, "accept")?,
            Action::Error => write!(f, "error")?,
        }
        write!(f, "  [{}", step.states[0])?;
        for (node, state) in step.nodes.iter().zip(&step.states[1..]) {
            write!(f, " {} {}", node.label().pretty(self.ctx), state)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::FirstSets;
    use crate::grammar::RuleId;
    use crate::lr1::ItemSets;
    use crate::tree::Label;

    fn build(src: &str) -> (Grammar, ParseTable) {
        let g: Grammar = src.parse().unwrap();
        let fs = FirstSets::compute(&g).unwrap();
        let is = ItemSets::compute(&g, &fs).unwrap();
        let table = ParseTable::compute(&g, &is);
        (g, table)
    }

    #[test]
    fn expression_steps() {
        let (g, table) = build("E -> E + T\nE -> T\nT -> id");
        let parser = Parser::new(&g, &table);
        let mut trace = Vec::new();
        let tree = parser
            .parse_observed(parser.tokenize("id + id").unwrap(), &mut |step: &Step| {
                trace.push(step.action)
            })
            .unwrap();

        let r = RuleId::from_usize;
        let kinds: Vec<String> = trace
            .iter()
            .map(|a| match *a {
                Action::Shift(_) => "s".to_string(),
                Action::Reduce(rule) => format!("r{}", rule.as_usize()),
                Action::Accept => "acc".to_string(),
                Action::Error => "err".to_string(),
            })
            .collect();
        assert_eq!(kinds, vec!["s", "r3", "r2", "s", "s", "r3", "r1", "acc"]);

        assert_eq!(tree.label(), Label::Nonterminal(g.nonterminal("E").unwrap()));
        assert_eq!(tree.rule(), Some(r(1)));
        let labels: Vec<_> = tree.children().iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                Label::Nonterminal(g.nonterminal("E").unwrap()),
                Label::Terminal(g.terminal("+").unwrap()),
                Label::Nonterminal(g.nonterminal("T").unwrap()),
            ]
        );
        assert_eq!(tree.children()[0].rule(), Some(r(2)));
        assert_eq!(tree.children()[2].rule(), Some(r(3)));
        assert_eq!(tree.leaves(), parser.tokenize("id + id").unwrap());
    }

    #[test]
    fn node_ids_increase() {
        let (g, table) = build("E -> E + T\nE -> T\nT -> id");
        let tree = Parser::new(&g, &table).parse_str("id + id").unwrap();
        // The root is created last.
        assert_eq!(tree.id().as_usize(), tree.size() - 1);
        assert!(tree.children()[0].id() < tree.children()[2].id());
    }

    #[test]
    fn unexpected_token() {
        let (g, table) = build("E -> E + T\nE -> T\nT -> id");
        let err = Parser::new(&g, &table).parse_str("id id").unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                ref token,
                position,
                ref expected,
                ..
            } => {
                assert_eq!(token, "id");
                assert_eq!(position, 1);
                assert_eq!(expected, &vec!["$".to_string(), "+".to_string()]);
            }
            ref x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn unknown_terminal() {
        let (g, table) = build("E -> E + T\nE -> T\nT -> id");
        assert_eq!(
            Parser::new(&g, &table).parse_str("id * id").unwrap_err(),
            ParseError::UnknownTerminal {
                name: "*".into(),
                position: 1,
            }
        );
    }

    #[test]
    fn explicit_end_marker() {
        let (g, table) = build("E -> E + T\nE -> T\nT -> id");
        let tree = Parser::new(&g, &table).parse_str("id $").unwrap();
        assert_eq!(tree.leaves(), vec![g.terminal("id").unwrap()]);
    }

    #[test]
    fn embedded_end_marker() {
        let (g, table) = build("E -> E + T\nE -> T\nT -> id");
        let parser = Parser::new(&g, &table);
        assert_eq!(
            parser.parse_str("id $ + id").unwrap_err(),
            ParseError::UnexpectedToken {
                state: 1,
                token: "$".into(),
                position: 1,
                expected: vec!["+".into()],
            }
        );
        match parser.parse_str("id + $ id") {
            Err(ParseError::UnexpectedToken { position: 2, .. }) => (),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn nested_epsilon() {
        // Thirty empty reductions happen before `x` is shifted.
        let (g, table) = build("S -> B B B B B x\nB -> C C C C C\nC -> ''");
        assert!(table.conflicts().is_empty());
        let mut reductions = 0;
        let tree = Parser::new(&g, &table)
            .parse_observed(g.terminal("x"), &mut |step: &Step| {
                if let Action::Reduce(_) = step.action {
                    reductions += 1;
                }
            })
            .unwrap();
        assert_eq!(reductions, 31);
        assert_eq!(tree.children().len(), 6);
        assert_eq!(tree.size(), 57);
        assert_eq!(tree.leaves(), vec![g.terminal("x").unwrap()]);
    }

    #[test]
    fn epsilon_child() {
        let (g, table) = build("B -> A c\nA -> ''");
        let tree = Parser::new(&g, &table).parse_str("c").unwrap();
        let a = &tree.children()[0];
        assert_eq!(a.label(), Label::Nonterminal(g.nonterminal("A").unwrap()));
        assert_eq!(a.children().len(), 1);
        assert_eq!(a.children()[0].label(), Label::Epsilon);
        assert_eq!(tree.leaves(), vec![g.terminal("c").unwrap()]);
    }

    #[test]
    fn cyclic_grammar_fails() {
        // Preferring `A -> A` over accepting reduces forever without
        // consuming input.
        let (g, table) = build("A -> A\nA -> a");
        assert!(!table.conflicts().is_empty());
        let parser = Parser::new(&g, &table).with_resolution(ConflictResolution::PreferReduce);
        match parser.parse_str("a") {
            Err(ParseError::NoProgress { .. }) => (),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn growing_cycle_fails() {
        // Reducing `B -> ''` in front of `a` pushes the same state over and
        // over again.
        let (g, table) = build("A -> B A\nA -> a\nB -> ''");
        assert!(!table.conflicts().is_empty());
        assert!(Parser::new(&g, &table).parse_str("a").is_ok());
        let parser = Parser::new(&g, &table).with_resolution(ConflictResolution::PreferReduce);
        match parser.parse_str("a") {
            Err(ParseError::NoProgress { steps: 2, .. }) => (),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn step_display() {
        let (g, table) = build("E -> E + T\nE -> T\nT -> id");
        let parser = Parser::new(&g, &table);
        let mut lines = Vec::new();
        parser
            .parse_observed(parser.tokenize("id").unwrap(), &mut |step: &Step| {
                lines.push(format!("{}", step.pretty(&g)))
            })
            .unwrap();
        assert_eq!(lines[0], "shift id -> 3  [0 id 3]");
        assert_eq!(lines[1], "reduce T -> id  [0 T 2]");
        assert_eq!(lines.last().unwrap(), "accept  [0 E 1]");
    }
}
