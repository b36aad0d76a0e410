//! lexico: a small query language for JSON records.
//!
//! Queries such as `mission_name:heavy !dragon year:>2010` are compiled by `lexico-query` and
//! evaluated by `lexico-engine`, either as exact case-insensitive filters or as fuzzy rankings
//! by edit-distance similarity. This crate holds the `lexico` command-line interface.

#![warn(missing_docs)]

pub mod cli;
