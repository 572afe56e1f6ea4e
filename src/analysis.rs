// Copyright (c) 2018 Fabian Schuiki

//! The static analysis of a grammar, viewed per nonterminal.

use std::fmt;

use crate::error::AnalysisError;
use crate::first::{FirstSet, FirstSets};
use crate::follow::{FollowSet, FollowSets};
use crate::grammar::{Grammar, NonterminalId, RuleId};
use crate::Pretty;

/// The first and follow sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    first: FirstSets,
    follow: FollowSets,
}

/// The kind of set listed by [`Analysis::pretty_sets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sets {
    /// The first sets.
    First,
    /// The follow sets.
    Follow,
}

/// Everything known about a single nonterminal.
#[derive(Debug, Clone, Copy)]
pub struct NonterminalInfo<'a> {
    /// The nonterminal.
    pub id: NonterminalId,
    /// The name of the nonterminal.
    pub name: &'a str,
    /// The rules this nonterminal is the LHS of.
    pub rules: &'a [RuleId],
    /// The `(rule, position)` pairs where it appears on a RHS.
    pub uses: &'a [(RuleId, usize)],
    /// Its first set.
    pub first: &'a FirstSet,
    /// Its follow set.
    pub follow: &'a FollowSet,
    /// Whether it derives the empty string.
    pub nullable: bool,
}

impl Analysis {
    /// Analyze a grammar.
    pub fn compute(grammar: &Grammar) -> Result<Analysis, AnalysisError> {
        let first = FirstSets::compute(grammar)?;
        let follow = FollowSets::compute(grammar, &first)?;
        Ok(Analysis { first, follow })
    }

    /// The first sets.
    pub fn first(&self) -> &FirstSets {
        &self.first
    }

    /// The follow sets.
    pub fn follow(&self) -> &FollowSets {
        &self.follow
    }

    /// Collect the information about a nonterminal.
    pub fn nonterminal<'a>(&'a self, grammar: &'a Grammar, id: NonterminalId) -> NonterminalInfo<'a> {
        NonterminalInfo {
            id: id,
            name: grammar.nonterminal_name(id),
            rules: grammar.rules_for_nonterminal(id).as_slice(),
            uses: grammar.uses_of_nonterminal(id),
            first: &self.first[id],
            follow: &self.follow[id],
            nullable: self.first.is_nullable(id),
        }
    }

    /// Collect the information about all nonterminals, the root first.
    pub fn nonterminals<'a>(
        &'a self,
        grammar: &'a Grammar,
    ) -> impl Iterator<Item = NonterminalInfo<'a>> + 'a {
        grammar.nonterminals().map(move |id| self.nonterminal(grammar, id))
    }

    /// Get a pretty printer that lists one kind of set per nonterminal.
    pub fn pretty_sets<'a>(
        &'a self,
        grammar: &'a Grammar,
        sets: Sets,
    ) -> Pretty<&'a Grammar, (&'a Self, Sets)> {
        Pretty::new(grammar, (self, sets))
    }

    /// Get a pretty printer for this analysis.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Analysis> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "productions:")?;
        for (index, rule) in self.ctx.rules().enumerate() {
            writeln!(f, "  {:3}  {}", index, rule.pretty(self.ctx))?;
        }
        writeln!(f, "nonterminals:")?;
        for info in self.item.nonterminals(self.ctx) {
            writeln!(
                f,
                "  {}{}\n    first  = {}\n    follow = {}",
                info.name,
                if info.nullable { " (nullable)" } else { "" },
                info.first.pretty(self.ctx),
                info.follow.pretty(self.ctx),
            )?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, (&'a Analysis, Sets)> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (analysis, sets) = self.item;
        match sets {
            Sets::First => writeln!(f, "first sets:")?,
            Sets::Follow => writeln!(f, "follow sets:")?,
        }
        for info in analysis.nonterminals(self.ctx) {
            match sets {
                Sets::First => writeln!(f, "  {} = {}", info.name, info.first.pretty(self.ctx))?,
                Sets::Follow => writeln!(f, "  {} = {}", info.name, info.follow.pretty(self.ctx))?,
            }
        }
        Ok(())
    }
}
