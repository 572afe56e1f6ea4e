// Copyright (c) 2018 Fabian Schuiki

//! A grammar analyzer and canonical LR(1) parser.
//!
//! The pipeline runs one way: a [`grammar::Grammar`] is analyzed into
//! [`first::FirstSets`] and [`follow::FollowSets`], the canonical collection
//! of LR(1) item sets is built as [`lr1::ItemSets`], which is turned into a
//! [`table::ParseTable`], which finally drives the [`parser::Parser`].

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;

pub mod analysis;
pub mod error;
pub mod first;
pub mod follow;
pub mod grammar;
pub mod item_set;
pub mod loader;
pub mod lr1;
pub mod parser;
pub mod table;
pub mod tree;

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
