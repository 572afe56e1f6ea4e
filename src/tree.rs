// Copyright (c) 2018 Fabian Schuiki

//! Concrete syntax trees built by the parser.
//!
//! Every node owns its children. Leaves are either terminals that were
//! shifted or the single epsilon child of an empty reduction.

use std::fmt;

use crate::grammar::{Grammar, NonterminalId, RuleId, TerminalId, EPSILON_NAME};
use crate::Pretty;

/// A unique node identifier, assigned in creation order during a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// A shifted terminal.
    Terminal(TerminalId),
    /// A reduced nonterminal.
    Nonterminal(NonterminalId),
    /// The empty string derived by an epsilon rule.
    Epsilon,
}

/// A node of a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    label: Label,
    rule: Option<RuleId>,
    children: Vec<Node>,
}

impl Node {
    /// Create a leaf for a shifted terminal.
    pub fn terminal(id: NodeId, terminal: TerminalId) -> Node {
        Node {
            id: id,
            label: Label::Terminal(terminal),
            rule: None,
            children: Vec::new(),
        }
    }

    /// Create the leaf standing in for an empty right-hand side.
    pub fn epsilon(id: NodeId) -> Node {
        Node {
            id: id,
            label: Label::Epsilon,
            rule: None,
            children: Vec::new(),
        }
    }

    /// Create the node for a reduction, taking ownership of its children.
    pub fn reduction(
        id: NodeId,
        nonterminal: NonterminalId,
        rule: RuleId,
        children: Vec<Node>,
    ) -> Node {
        Node {
            id: id,
            label: Label::Nonterminal(nonterminal),
            rule: Some(rule),
            children: children,
        }
    }

    /// The node's identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's label.
    pub fn label(&self) -> Label {
        self.label
    }

    /// The rule that created this node, if it was created by a reduction.
    pub fn rule(&self) -> Option<RuleId> {
        self.rule
    }

    /// The children of this node, left to right.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The terminals at the leaves of the tree, left to right. Epsilon leaves
    /// are skipped.
    pub fn leaves(&self) -> Vec<TerminalId> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves(&self, into: &mut Vec<TerminalId>) {
        if let Label::Terminal(t) = self.label {
            into.push(t);
        }
        for child in &self.children {
            child.collect_leaves(into);
        }
    }

    /// The number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }

    /// Get a pretty printer for this tree.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Label {
    /// Get a pretty printer for this label.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, Label> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.item {
            Label::Terminal(t) => write!(f, "{}", t.pretty(self.ctx)),
            Label::Nonterminal(nt) => write!(f, "{}", nt.pretty(self.ctx)),
            Label::Epsilon => write!(f, "{}", EPSILON_NAME),
        }
    }
}

fn fmt_node(node: &Node, grammar: &Grammar, depth: usize, f: &mut fmt::Formatter) -> fmt::Result {
    if depth > 0 {
        write!(f, "\n")?;
    }
    write!(f, "{:width$}{}", "", node.label.pretty(grammar), width = depth * 2)?;
    if let Some(rule) = node.rule {
        write!(f, " ({})", rule)?;
    }
    for child in &node.children {
        fmt_node(child, grammar, depth + 1, f)?;
    }
    Ok(())
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Node> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_node(self.item, self.ctx, 0, f)
    }
}

impl NodeId {
    /// Create a node id from a usize.
    pub fn from_usize(id: usize) -> NodeId {
        NodeId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_skip_epsilon() {
        let g: Grammar = "B -> A c\nA -> ''".parse().unwrap();
        let a = g.nonterminal("A").unwrap();
        let b = g.nonterminal("B").unwrap();
        let c = g.terminal("c").unwrap();
        let tree = Node::reduction(
            NodeId(2),
            b,
            RuleId::from_usize(1),
            vec![
                Node::reduction(NodeId(0), a, RuleId::from_usize(2), vec![Node::epsilon(NodeId(1))]),
                Node::terminal(NodeId(3), c),
            ],
        );
        assert_eq!(tree.leaves(), vec![c]);
        assert_eq!(tree.size(), 4);
        assert_eq!(
            format!("{}", tree.pretty(&g)),
            "B (r1)\n  A (r2)\n    ϵ\n  c"
        );
    }
}
