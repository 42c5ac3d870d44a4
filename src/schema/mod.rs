//! Schema input: text parsing, AST construction and JSON-pointer helpers.
//!
//! Everything here feeds the graph pipeline in [`crate::graph`]. The AST is a
//! flat table of subschemas keyed by their `base#/json/pointer` URI, with every
//! keyword already classified into a [`KeywordValue`] variant.

mod ast;
mod compile;
mod parse;
pub mod pointer;

pub use ast::{AstNode, KeywordClass, KeywordEntry, KeywordValue, SchemaAst};
pub use compile::{DEFAULT_BASE_URI, compile_schema};
pub use parse::{SchemaFormat, parse_schema};
