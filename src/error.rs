// Copyright (c) 2018 Fabian Schuiki

//! Errors produced while loading, analyzing, and parsing with a grammar.

use thiserror::Error;

/// A grammar description that cannot be turned into productions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A line that does not have the form `LHS -> RHS`.
    #[error("line {line}: {reason}: `{text}`")]
    Malformed {
        /// The 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
        /// What is wrong with the line.
        reason: &'static str,
    },
    /// The grammar has no productions at all.
    #[error("grammar has no productions")]
    Empty,
    /// A production uses the end of input marker `$`.
    #[error("`$` is reserved for the end of input, used in production of `{0}`")]
    ReservedSymbol(String),
    /// The requested start symbol is not the LHS of any production.
    #[error("start symbol `{0}` has no productions")]
    MissingStart(String),
}

/// A fixed point or construction that did not settle within its limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A set computation kept growing past the number of possible elements.
    #[error("{what} did not reach a fixed point after {rounds} rounds")]
    NoFixedPoint {
        /// The computation that failed.
        what: &'static str,
        /// The number of rounds performed.
        rounds: usize,
    },
    /// The automaton grew past the configured state limit.
    #[error("automaton exceeds the limit of {limit} states")]
    TooManyStates {
        /// The configured limit.
        limit: usize,
    },
}

/// A failure while running the parse engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The table has no action for the lookahead in the current state.
    #[error("unexpected `{token}` at position {position} in state {state}, expected one of: {}", .expected.join(", "))]
    UnexpectedToken {
        /// The state on top of the stack.
        state: usize,
        /// The offending terminal.
        token: String,
        /// Index of the terminal in the input.
        position: usize,
        /// The terminals the state would have accepted.
        expected: Vec<String>,
    },
    /// A reduction needs more stack entries than there are.
    #[error("reduction by {rule} needs {needed} stack entries, only {available} present")]
    StackUnderflow {
        /// The production being reduced.
        rule: String,
        /// The RHS length.
        needed: usize,
        /// The number of entries on the stack.
        available: usize,
    },
    /// No goto entry after a reduction.
    #[error("no goto on `{nonterminal}` from state {state}")]
    InvalidGoto {
        /// The state exposed after popping.
        state: usize,
        /// The LHS of the reduced production.
        nonterminal: String,
    },
    /// An input symbol that is not a terminal of the grammar.
    #[error("`{name}` at position {position} is not a terminal of the grammar")]
    UnknownTerminal {
        /// The input symbol.
        name: String,
        /// Index of the symbol in the input.
        position: usize,
    },
    /// Reductions kept going without consuming input.
    #[error("no progress after {steps} reductions in state {state}")]
    NoProgress {
        /// The state on top of the stack.
        state: usize,
        /// The number of consecutive reductions.
        steps: usize,
    },
}
