//! Lexer and parser for a permissive multi-dialect SQL grammar.
//!
//! Hand-written byte-oriented lexer plus recursive descent parsing, with
//! precedence climbing for expressions. Produces trees of `omnisql-ast`
//! nodes. The accepted grammar is the union of MySQL, PostgreSQL, SQLite,
//! SQL Server, and Oracle syntax; no dialect conformance is enforced.

pub mod expr;
pub mod keyword;
pub mod lexer;
pub mod parser;
pub mod token;

pub use keyword::{is_keyword, lookup_ident, MAX_KEYWORD_LEN};
pub use lexer::Lexer;
pub use parser::{
    parse_metrics_snapshot, reset_parse_metrics, ParseError, ParseMetricsSnapshot, Parser,
    MAX_PARSE_DEPTH,
};
pub use token::{Token, TokenKind};
