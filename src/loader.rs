// Copyright (c) 2018 Fabian Schuiki

//! A loader for line-based grammar descriptions.
//!
//! Each non-blank line holds one production of the form `LHS -> s1 s2 ...`,
//! with symbols separated by whitespace. The two-character token `''`
//! stands for epsilon. Lines starting with `#` are comments.

use std::str::FromStr;

use crate::error::GrammarError;
use crate::grammar::{Grammar, Production};

/// The token that denotes an empty right-hand side.
pub const EPSILON_TOKEN: &str = "''";

/// The arrow separating the two sides of a production.
pub const ARROW: &str = "->";

/// Split a grammar description into its productions.
pub fn parse_productions(input: &str) -> Result<Vec<Production>, GrammarError> {
    let mut productions = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let malformed = |reason| GrammarError::Malformed {
            line: index + 1,
            text: line.to_string(),
            reason: reason,
        };

        let mut parts = trimmed.split(ARROW);
        let (lhs, rhs) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lhs), Some(rhs), None) => (lhs.trim(), rhs),
            (_, None, _) => return Err(malformed("missing `->`")),
            _ => return Err(malformed("more than one `->`")),
        };
        if lhs.is_empty() {
            return Err(malformed("empty left-hand side"));
        }
        if lhs.split_whitespace().count() != 1 {
            return Err(malformed("left-hand side must be a single symbol"));
        }

        let symbols: Vec<&str> = rhs.split_whitespace().collect();
        if symbols.is_empty() {
            return Err(malformed("empty right-hand side, write `''` for epsilon"));
        }
        // Epsilon derives nothing, so it simply vanishes from the sequence.
        let rhs = symbols
            .into_iter()
            .filter(|&s| s != EPSILON_TOKEN)
            .map(String::from)
            .collect();
        productions.push(Production::new(lhs, rhs));
    }
    if productions.is_empty() {
        return Err(GrammarError::Empty);
    }
    Ok(productions)
}

/// Load a grammar from its description, with an optional start symbol.
pub fn load(input: &str, start: Option<&str>) -> Result<Grammar, GrammarError> {
    let productions = parse_productions(input)?;
    Grammar::from_productions(&productions, start)
}

impl FromStr for Grammar {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Grammar, GrammarError> {
        load(s, None)
    }
}
