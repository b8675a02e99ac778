//! omnisql is a dialect-agnostic SQL parser and pretty-printer.
//!
//! It accepts a permissive superset of MySQL, PostgreSQL, SQLite,
//! SQL Server, and Oracle syntax, builds a typed syntax tree, and renders
//! any tree back to canonical SQL. It is meant for query analyzers,
//! proxies, linters, and rewriters; it does not execute anything.
//!
//! Basic usage:
//!
//! ```
//! let stmt = omnisql::parse("SELECT * FROM users WHERE id = 1")
//!     .expect("parse")
//!     .expect("non-empty input");
//! assert_eq!(omnisql::to_sql(&stmt), "SELECT * FROM users WHERE id = 1");
//! ```
//!
//! Walking the tree:
//!
//! ```
//! use omnisql::Node;
//!
//! let stmt = omnisql::parse("SELECT a, b FROM t").unwrap().unwrap();
//! let mut columns = Vec::new();
//! omnisql::walk(&stmt, &mut |node| {
//!     if let Node::ColumnRef(col) = node {
//!         columns.push(col.name().to_owned());
//!     }
//!     true
//! });
//! assert_eq!(columns, ["a", "b"]);
//! ```

pub use omnisql_ast as ast;
pub use omnisql_ast::visit::{rewrite, walk, Node, Rewriter};
pub use omnisql_ast::{Expr, Pos, SelectItem, Statement, TableExpr};
pub use omnisql_format::{expr_to_sql, to_sql, to_sql_with, Formatter, Options};
pub use omnisql_parser::{
    is_keyword, parse_metrics_snapshot, reset_parse_metrics, Lexer, ParseError,
    ParseMetricsSnapshot, Parser, Token, TokenKind,
};

/// Parse a single SQL statement.
///
/// Trailing semicolons and comments are tolerated; any other trailing
/// input is an error. Empty (or comment-only) input yields `Ok(None)`.
pub fn parse(sql: &str) -> Result<Option<Statement>, ParseError> {
    Parser::new(sql).parse_one()
}

/// Parse zero or more semicolon-separated statements.
///
/// Returns the first error encountered, if any; statements are otherwise
/// returned in source order.
pub fn parse_all(sql: &str) -> Result<Vec<Statement>, ParseError> {
    let (stmts, mut errors) = Parser::new(sql).parse_all();
    if errors.is_empty() {
        Ok(stmts)
    } else {
        Err(errors.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let stmt = parse("select id, name from users where status = 'active'")
            .expect("parse")
            .expect("statement");
        assert_eq!(
            to_sql(&stmt),
            "SELECT id, name FROM users WHERE status = 'active'"
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").expect("no error").is_none());
        assert!(parse(" ;; ; ").expect("no error").is_none());
    }

    #[test]
    fn test_parse_all_multiple() {
        let stmts = parse_all("select 1 from t; select 2 from u;").expect("parse");
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn test_parse_all_surfaces_first_error() {
        let err = parse_all("select 1 from t; nonsense;").expect_err("should fail");
        assert!(!err.message.is_empty());
    }
}
