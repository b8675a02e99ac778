//! Statement-level recursive descent parser.
//!
//! The parser owns the lexer and a single current-token buffer; one extra
//! token of lookahead comes from [`Lexer::peek`]. Statements are parsed by
//! recursive descent, expressions by precedence climbing (see `expr.rs`).
//! The grammar is a permissive union of the supported dialects: it accepts
//! any statement that is valid in at least one of them and never validates
//! dialect membership.
//!
//! The parser never panics. Malformed input surfaces as a [`ParseError`]
//! carrying the offending position, and a recursion-depth guard keeps
//! pathologically nested input from overflowing the stack.

use std::sync::atomic::{AtomicU64, Ordering};

use omnisql_ast::{
    AliasedTable, AlterAction, AlterTableStatement, Assignment, ColumnConstraint,
    ColumnConstraintKind, ColumnDef, ColumnRef, ConflictAction, CreateIndexStatement,
    CreateTableStatement, Cte, DataType, DeleteStatement, DropIndexStatement, DropTableStatement,
    Expr, ExplainStatement, ForeignKeyRef, IndexColumn, IndexHint, IndexHintKind, IndexHintScope,
    IndexKey, InsertSource, InsertStatement, JoinExpr, JoinKind, LimitClause, Literal,
    LiteralKind, LockClause, LockMode, LockWait, ModifyColumn, OnConflict, OrderingTerm,
    ParenTable, Pos, RefAction, SelectInto, SelectItem, SelectStatement, SetOpKind,
    SetOpStatement, StarExpr, Statement, Subquery, TableConstraint, TableConstraintKind,
    TableExpr, TableOption, TableRef, TruncateStatement, UpdateStatement, ValuesStatement,
    WindowDef, WithClause,
};
use thiserror::Error;

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Parse metrics
// ---------------------------------------------------------------------------

/// Monotonic counter of successfully parsed statements.
static OMNISQL_PARSE_STATEMENTS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time parse metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseMetricsSnapshot {
    /// Total statements successfully parsed by this process.
    pub statements_total: u64,
}

/// Take a point-in-time snapshot of parse metrics.
#[must_use]
pub fn parse_metrics_snapshot() -> ParseMetricsSnapshot {
    ParseMetricsSnapshot {
        statements_total: OMNISQL_PARSE_STATEMENTS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset parse metrics (used by tests and diagnostics).
pub fn reset_parse_metrics() {
    OMNISQL_PARSE_STATEMENTS_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A parse error with the position it occurred at.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {}, column {}: {}", .pos.line, .pos.column, .message)]
pub struct ParseError {
    pub pos: Pos,
    pub message: String,
}

/// Nesting bound for expressions, parenthesized statements, and table
/// expressions. Deeper input yields a parse error instead of exhausting
/// the stack.
pub const MAX_PARSE_DEPTH: u32 = 200;

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    pub(crate) cur: Token<'a>,
    errors: Vec<ParseError>,
    depth: u32,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(sql: &'a str) -> Self {
        let mut p = Self {
            lexer: Lexer::new(sql),
            cur: Token::new(TokenKind::Eof, "", Pos::NONE),
            errors: Vec::new(),
            depth: 0,
        };
        p.advance();
        p
    }

    /// Parse a single statement, tolerating trailing semicolons and
    /// comments. Empty input yields `Ok(None)`.
    pub fn parse_one(&mut self) -> Result<Option<Statement>, ParseError> {
        while self.cur_is(TokenKind::Semicolon) {
            self.advance();
        }
        if self.cur_is(TokenKind::Eof) {
            return Ok(None);
        }
        let stmt = self.parse_statement()?;
        OMNISQL_PARSE_STATEMENTS_TOTAL.fetch_add(1, Ordering::Relaxed);
        while self.cur_is(TokenKind::Semicolon) {
            self.advance();
        }
        if !self.cur_is(TokenKind::Eof) {
            return Err(self.err_msg(format!(
                "unexpected token {} after statement",
                self.cur.kind
            )));
        }
        Ok(Some(stmt))
    }

    /// Parse zero or more semicolon-separated statements.
    ///
    /// Malformed statements are skipped to the next statement boundary;
    /// every error is collected and the survivors are returned alongside.
    pub fn parse_all(&mut self) -> (Vec<Statement>, Vec<ParseError>) {
        let span = tracing::debug_span!(
            target: "omnisql.parse",
            "parse",
            statements = tracing::field::Empty,
            parse_errors = tracing::field::Empty,
        );
        let _guard = span.enter();

        let mut stmts = Vec::new();
        while !self.cur_is(TokenKind::Eof) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Ok(s) => {
                    OMNISQL_PARSE_STATEMENTS_TOTAL.fetch_add(1, Ordering::Relaxed);
                    stmts.push(s);
                }
                Err(e) => {
                    tracing::warn!(
                        target: "omnisql.parse",
                        error = %e,
                        "parse recovery: skipping malformed statement"
                    );
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        let errors = std::mem::take(&mut self.errors);
        span.record("statements", stmts.len() as u64);
        span.record("parse_errors", errors.len() as u64);
        (stmts, errors)
    }

    /// Skip to the next plausible statement boundary after an error.
    fn synchronize(&mut self) {
        loop {
            match self.cur.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                k if k.is_statement_start() => return,
                _ => self.advance(),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Token navigation
    // -----------------------------------------------------------------------

    /// Move to the next token. Comment tokens are skipped; the lexer emits
    /// them so callers *could* retain them, but this parser does not.
    pub(crate) fn advance(&mut self) {
        loop {
            self.cur = self.lexer.next();
            if self.cur.kind != TokenKind::Comment {
                break;
            }
        }
    }

    pub(crate) fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    /// Raw one-token lookahead (does not skip comments).
    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.lexer.peek().kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.cur.kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.cur.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.err_expected(&kind.to_string()))
        }
    }

    /// True when the current token can serve as an identifier; keywords
    /// double as identifiers in most name positions.
    pub(crate) fn cur_is_ident_like(&self) -> bool {
        self.cur.kind == TokenKind::Ident || self.cur.kind.is_keyword()
    }

    pub(crate) fn err_expected(&self, what: &str) -> ParseError {
        ParseError {
            pos: self.cur.pos,
            message: format!("expected {what}, got {}", self.cur.kind),
        }
    }

    pub(crate) fn err_msg(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            pos: self.cur.pos,
            message: message.into(),
        }
    }

    pub(crate) fn enter_recursion(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(self.err_msg(format!(
                "statement is nested too deeply (maximum depth {MAX_PARSE_DEPTH})"
            )));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Statement dispatch
    // -----------------------------------------------------------------------

    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.enter_recursion()?;
        let result = self.parse_statement_inner();
        self.leave_recursion();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<Statement, ParseError> {
        match self.cur.kind {
            TokenKind::KwSelect => self.parse_select(),
            TokenKind::KwInsert | TokenKind::KwReplace => self.parse_insert(None),
            TokenKind::KwUpdate => self.parse_update(None),
            TokenKind::KwDelete => self.parse_delete(None),
            TokenKind::KwCreate => self.parse_create(),
            TokenKind::KwAlter => self.parse_alter(),
            TokenKind::KwDrop => self.parse_drop(),
            TokenKind::KwWith => self.parse_with(),
            TokenKind::KwTruncate => self.parse_truncate(),
            TokenKind::KwExplain | TokenKind::KwAnalyze => self.parse_explain(),
            TokenKind::KwValues => Ok(Statement::Values(self.parse_values_statement()?)),
            TokenKind::LParen => self.parse_paren_statement(),
            _ => Err(self.err_msg(format!(
                "unexpected token {} at start of statement",
                self.cur.kind
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // WITH
    // -----------------------------------------------------------------------

    fn parse_with(&mut self) -> Result<Statement, ParseError> {
        let with = self.parse_with_clause()?;
        match self.cur.kind {
            TokenKind::KwSelect | TokenKind::LParen => {
                let stmt = if self.cur_is(TokenKind::LParen) {
                    self.parse_paren_statement()?
                } else {
                    self.parse_select()?
                };
                Ok(attach_with(stmt, with))
            }
            TokenKind::KwInsert | TokenKind::KwReplace => self.parse_insert(Some(with)),
            TokenKind::KwUpdate => self.parse_update(Some(with)),
            TokenKind::KwDelete => self.parse_delete(Some(with)),
            _ => Err(self.err_msg("expected SELECT, INSERT, UPDATE, or DELETE after WITH")),
        }
    }

    fn parse_with_clause(&mut self) -> Result<WithClause, ParseError> {
        self.advance(); // WITH
        let recursive = self.eat(TokenKind::KwRecursive);
        let mut ctes = Vec::new();
        loop {
            ctes.push(self.parse_cte()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(WithClause { recursive, ctes })
    }

    fn parse_cte(&mut self) -> Result<Cte, ParseError> {
        if !self.cur_is(TokenKind::Ident) {
            return Err(self.err_expected("common table expression name"));
        }
        let name = self.cur.text.to_string();
        self.advance();

        let columns = if self.cur_is(TokenKind::LParen) {
            self.parse_column_name_list()?
        } else {
            Vec::new()
        };

        self.expect(TokenKind::KwAs)?;
        self.expect(TokenKind::LParen)?;
        let query = Box::new(self.parse_statement()?);
        self.expect(TokenKind::RParen)?;

        Ok(Cte {
            name,
            columns,
            query,
        })
    }

    /// Parse `(name, name, ...)`; the opening paren is the current token.
    pub(crate) fn parse_column_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut names = Vec::new();
        while self.cur_is(TokenKind::Ident) {
            names.push(self.cur.text.to_string());
            self.advance();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(names)
    }

    // -----------------------------------------------------------------------
    // SELECT
    // -----------------------------------------------------------------------

    /// A SELECT statement, wrapped in left-associative set-operation nodes
    /// when a UNION / INTERSECT / EXCEPT chain follows.
    fn parse_select(&mut self) -> Result<Statement, ParseError> {
        let core = self.parse_select_core()?;
        self.parse_set_op_chain(Statement::Select(core))
    }

    fn parse_select_core(&mut self) -> Result<Box<SelectStatement>, ParseError> {
        let pos = self.cur.pos;
        self.expect(TokenKind::KwSelect)?;

        let mut stmt = Box::new(SelectStatement {
            pos,
            ..SelectStatement::default()
        });

        // MySQL result-set hints are consumed and dropped.
        while matches!(
            self.cur.kind,
            TokenKind::KwSqlCalcFoundRows
                | TokenKind::KwSqlSmallResult
                | TokenKind::KwSqlBigResult
                | TokenKind::KwSqlBufferResult
                | TokenKind::KwHighPriority
                | TokenKind::KwStraightJoin
        ) {
            self.advance();
        }

        if self.eat(TokenKind::KwDistinct) {
            stmt.distinct = true;
        } else {
            let _ = self.eat(TokenKind::KwAll);
        }

        loop {
            stmt.columns.push(self.parse_select_item()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        if self.cur_is(TokenKind::KwInto) {
            stmt.into = Some(self.parse_select_into()?);
        }

        if self.eat(TokenKind::KwFrom) {
            stmt.from = Some(self.parse_table_expr()?);
        }

        if self.eat(TokenKind::KwWhere) {
            stmt.where_clause = Some(self.parse_expr()?);
        }

        if self.eat(TokenKind::KwGroup) {
            self.expect(TokenKind::KwBy)?;
            stmt.group_by = self.parse_expr_list()?;
        }

        if self.eat(TokenKind::KwHaving) {
            stmt.having = Some(self.parse_expr()?);
        }

        if self.cur_is(TokenKind::KwWindow) {
            stmt.windows = self.parse_window_defs()?;
        }

        if self.cur_is(TokenKind::KwOrder) {
            stmt.order_by = self.parse_order_by()?;
        }

        if self.cur_is(TokenKind::KwLimit) {
            stmt.limit = Some(self.parse_limit()?);
        }

        // PostgreSQL allows OFFSET with no LIMIT.
        if self.cur_is(TokenKind::KwOffset) && stmt.limit.is_none() {
            let pos = self.cur.pos;
            self.advance();
            stmt.limit = Some(LimitClause {
                pos,
                count: None,
                offset: Some(self.parse_expr()?),
            });
        }

        // FETCH FIRST n ROWS ONLY normalizes into the limit clause.
        if self.cur_is(TokenKind::KwFetch) {
            let pos = self.cur.pos;
            self.advance();
            if !self.eat(TokenKind::KwFirst) {
                let _ = self.eat(TokenKind::KwNext);
            }
            let count = self.parse_expr()?;
            if !self.eat(TokenKind::KwRow) {
                let _ = self.eat(TokenKind::KwRows);
            }
            let _ = self.eat(TokenKind::KwOnly);
            match &mut stmt.limit {
                Some(limit) => limit.count = Some(count),
                None => {
                    stmt.limit = Some(LimitClause {
                        pos,
                        count: Some(count),
                        offset: None,
                    });
                }
            }
        }

        if self.cur_is(TokenKind::KwFor) {
            stmt.lock = Some(self.parse_lock_clause()?);
        }

        Ok(stmt)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        let pos = self.cur.pos;

        if self.cur_is(TokenKind::Star) {
            self.advance();
            return Ok(SelectItem::Star(StarExpr {
                pos,
                qualifier: None,
            }));
        }

        let expr = self.parse_expr()?;
        if let Expr::Star(star) = expr {
            return Ok(SelectItem::Star(star));
        }

        let alias = if self.eat(TokenKind::KwAs) {
            if !matches!(self.cur.kind, TokenKind::Ident | TokenKind::Str) {
                return Err(self.err_expected("alias after AS"));
            }
            let a = self.cur.text.to_string();
            self.advance();
            Some(a)
        } else if self.cur_is(TokenKind::Ident) {
            let a = self.cur.text.to_string();
            self.advance();
            Some(a)
        } else {
            None
        };

        Ok(SelectItem::Expr(omnisql_ast::AliasedExpr {
            pos,
            expr,
            alias,
        }))
    }

    fn parse_select_into(&mut self) -> Result<SelectInto, ParseError> {
        self.advance(); // INTO

        if self.eat(TokenKind::KwOutfile) {
            if !self.cur_is(TokenKind::Str) {
                return Err(self.err_expected("file name after OUTFILE"));
            }
            let f = self.cur.text.to_string();
            self.advance();
            return Ok(SelectInto::Outfile(f));
        }

        if self.cur_is(TokenKind::Ident) && self.cur.text.eq_ignore_ascii_case("DUMPFILE") {
            self.advance();
            if !self.cur_is(TokenKind::Str) {
                return Err(self.err_expected("file name after DUMPFILE"));
            }
            let f = self.cur.text.to_string();
            self.advance();
            return Ok(SelectInto::Dumpfile(f));
        }

        let mut vars = Vec::new();
        while matches!(self.cur.kind, TokenKind::Param | TokenKind::Ident) {
            vars.push(self.cur.text.to_string());
            self.advance();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if vars.is_empty() {
            return Err(self.err_expected("INTO target"));
        }
        Ok(SelectInto::Vars(vars))
    }

    fn parse_lock_clause(&mut self) -> Result<LockClause, ParseError> {
        self.advance(); // FOR

        let mode = if self.eat(TokenKind::KwUpdate) {
            LockMode::Update
        } else if self.eat(TokenKind::KwShare) {
            LockMode::Share
        } else {
            return Err(self.err_expected("UPDATE or SHARE after FOR"));
        };

        let wait = if self.eat(TokenKind::KwNowait) {
            LockWait::Nowait
        } else if self.eat(TokenKind::KwSkip) {
            self.expect(TokenKind::KwLocked)?;
            LockWait::SkipLocked
        } else {
            LockWait::Default
        };

        Ok(LockClause { mode, wait })
    }

    fn parse_window_defs(&mut self) -> Result<Vec<WindowDef>, ParseError> {
        self.advance(); // WINDOW
        let mut defs = Vec::new();
        loop {
            if !self.cur_is(TokenKind::Ident) {
                return Err(self.err_expected("window name"));
            }
            let name = self.cur.text.to_string();
            self.advance();
            self.expect(TokenKind::KwAs)?;
            let spec = self.parse_window_spec()?;
            defs.push(WindowDef { name, spec });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(defs)
    }

    pub(crate) fn parse_order_by(&mut self) -> Result<Vec<OrderingTerm>, ParseError> {
        self.advance(); // ORDER
        self.expect(TokenKind::KwBy)?;

        let mut items = Vec::new();
        loop {
            let pos = self.cur.pos;
            let expr = self.parse_expr()?;
            let mut term = OrderingTerm {
                pos,
                expr,
                desc: false,
                nulls_first: None,
            };
            if self.eat(TokenKind::KwDesc) {
                term.desc = true;
            } else {
                let _ = self.eat(TokenKind::KwAsc);
            }
            if self.eat(TokenKind::KwNulls) {
                if self.eat(TokenKind::KwFirst) {
                    term.nulls_first = Some(true);
                } else if self.eat(TokenKind::KwLast) {
                    term.nulls_first = Some(false);
                } else {
                    return Err(self.err_expected("FIRST or LAST after NULLS"));
                }
            }
            items.push(term);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_limit(&mut self) -> Result<LimitClause, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // LIMIT

        let mut limit = LimitClause {
            pos,
            count: Some(self.parse_expr()?),
            offset: None,
        };

        if self.eat(TokenKind::KwOffset) {
            limit.offset = Some(self.parse_expr()?);
        } else if self.eat(TokenKind::Comma) {
            // MySQL `LIMIT offset, count`.
            limit.offset = limit.count.take();
            limit.count = Some(self.parse_expr()?);
        }
        Ok(limit)
    }

    // -----------------------------------------------------------------------
    // Set operations
    // -----------------------------------------------------------------------

    /// Fold a trailing UNION / INTERSECT / EXCEPT chain onto `left`,
    /// associating to the left.
    fn parse_set_op_chain(&mut self, left: Statement) -> Result<Statement, ParseError> {
        let mut left = left;
        while let Some(op) = self.set_op_kind() {
            let pos = left.pos();
            self.advance();
            let all = self.eat(TokenKind::KwAll);
            if !all {
                let _ = self.eat(TokenKind::KwDistinct);
            }

            let right = if self.cur_is(TokenKind::LParen) {
                self.advance();
                let inner = self.parse_statement()?;
                self.expect(TokenKind::RParen)?;
                inner
            } else if self.cur_is(TokenKind::KwSelect) {
                Statement::Select(self.parse_select_core()?)
            } else if self.cur_is(TokenKind::KwValues) {
                Statement::Values(self.parse_values_statement()?)
            } else {
                return Err(self.err_expected("SELECT after set operator"));
            };

            left = Statement::SetOp(Box::new(SetOpStatement {
                pos,
                op,
                all,
                left,
                right,
                order_by: Vec::new(),
                limit: None,
            }));
        }

        // A trailing ORDER BY / LIMIT after a parenthesized operand applies
        // to the whole compound.
        if let Statement::SetOp(s) = &mut left {
            if self.cur_is(TokenKind::KwOrder) {
                s.order_by = self.parse_order_by()?;
            }
            if self.cur_is(TokenKind::KwLimit) {
                s.limit = Some(self.parse_limit()?);
            }
        }

        Ok(left)
    }

    fn set_op_kind(&self) -> Option<SetOpKind> {
        match self.cur.kind {
            TokenKind::KwUnion => Some(SetOpKind::Union),
            TokenKind::KwIntersect => Some(SetOpKind::Intersect),
            TokenKind::KwExcept => Some(SetOpKind::Except),
            _ => None,
        }
    }

    /// `(SELECT ..)` at statement level, enabling
    /// `(SELECT ..) UNION (SELECT ..)` and trailing ORDER BY / LIMIT on a
    /// parenthesized query.
    fn parse_paren_statement(&mut self) -> Result<Statement, ParseError> {
        self.advance(); // (
        let inner = self.parse_statement()?;
        self.expect(TokenKind::RParen)?;

        if self.set_op_kind().is_some() {
            return self.parse_set_op_chain(inner);
        }

        match inner {
            Statement::Select(mut sel) => {
                if self.cur_is(TokenKind::KwOrder) {
                    sel.order_by = self.parse_order_by()?;
                }
                if self.cur_is(TokenKind::KwLimit) {
                    sel.limit = Some(self.parse_limit()?);
                }
                Ok(Statement::Select(sel))
            }
            other => Ok(other),
        }
    }

    // -----------------------------------------------------------------------
    // Table expressions
    // -----------------------------------------------------------------------

    pub(crate) fn parse_table_expr(&mut self) -> Result<TableExpr, ParseError> {
        self.enter_recursion()?;
        let result = self.parse_table_expr_inner();
        self.leave_recursion();
        result
    }

    fn parse_table_expr_inner(&mut self) -> Result<TableExpr, ParseError> {
        let mut left = self.parse_table_primary()?;

        while let Some((kind, natural)) = self.parse_join_kind() {
            let pos = left.pos();
            let lateral = self.eat(TokenKind::KwLateral);
            let right = self.parse_table_primary()?;

            let mut join = JoinExpr {
                pos,
                kind,
                natural,
                lateral,
                left,
                right,
                on: None,
                using: Vec::new(),
            };

            // CROSS and NATURAL joins take neither ON nor USING.
            if kind != JoinKind::Cross && !natural {
                if self.eat(TokenKind::KwOn) {
                    join.on = Some(self.parse_expr()?);
                } else if self.eat(TokenKind::KwUsing) {
                    join.using = self.parse_column_name_list()?;
                }
            }

            left = TableExpr::Join(Box::new(join));
        }

        Ok(left)
    }

    /// Identify and consume the join keywords at the cursor. Returns the
    /// join kind and the NATURAL flag, or `None` when no join follows.
    fn parse_join_kind(&mut self) -> Option<(JoinKind, bool)> {
        let natural = self.cur_is(TokenKind::KwNatural);
        if natural {
            self.advance();
        }
        let kind = match self.cur.kind {
            TokenKind::Comma if !natural => {
                self.advance();
                return Some((JoinKind::Cross, false));
            }
            TokenKind::KwJoin | TokenKind::KwInner | TokenKind::KwStraightJoin => JoinKind::Inner,
            TokenKind::KwLeft => JoinKind::Left,
            TokenKind::KwRight => JoinKind::Right,
            TokenKind::KwFull => JoinKind::Full,
            TokenKind::KwCross => JoinKind::Cross,
            _ if natural => JoinKind::Inner,
            _ => return None,
        };
        self.consume_join_keywords();
        Some((kind, natural))
    }

    fn consume_join_keywords(&mut self) {
        while matches!(
            self.cur.kind,
            TokenKind::KwInner
                | TokenKind::KwLeft
                | TokenKind::KwRight
                | TokenKind::KwFull
                | TokenKind::KwOuter
                | TokenKind::KwCross
                | TokenKind::KwJoin
                | TokenKind::KwStraightJoin
        ) {
            self.advance();
        }
    }

    fn parse_table_primary(&mut self) -> Result<TableExpr, ParseError> {
        // Leading LATERAL on a bare primary is accepted and dropped;
        // LATERAL on a join operand is kept on the join node.
        let _ = self.eat(TokenKind::KwLateral);

        let pos = self.cur.pos;
        let expr = if self.cur_is(TokenKind::LParen) {
            self.advance();
            if matches!(self.cur.kind, TokenKind::KwSelect | TokenKind::KwWith) {
                let stmt = if self.cur_is(TokenKind::KwWith) {
                    self.parse_with()?
                } else {
                    self.parse_select()?
                };
                self.expect(TokenKind::RParen)?;
                TableExpr::Subquery(Box::new(Subquery { pos, query: stmt }))
            } else {
                let inner = self.parse_table_expr()?;
                self.expect(TokenKind::RParen)?;
                TableExpr::Paren(Box::new(ParenTable { pos, expr: inner }))
            }
        } else if self.cur_is(TokenKind::KwValues) {
            TableExpr::Values(self.parse_values_statement()?)
        } else if self.cur_is_ident_like() {
            TableExpr::Table(self.parse_table_name()?)
        } else {
            return Err(self.err_expected("table name or subquery"));
        };

        // Optional alias, derived-table column aliases, and index hints.
        let explicit_as = self.eat(TokenKind::KwAs);
        let alias = if self.cur_is(TokenKind::Ident) {
            let a = self.cur.text.to_string();
            self.advance();
            Some(a)
        } else if explicit_as {
            return Err(self.err_expected("alias after AS"));
        } else {
            None
        };

        let column_aliases = if self.cur_is(TokenKind::LParen) {
            self.parse_column_name_list()?
        } else {
            Vec::new()
        };

        let mut hints = Vec::new();
        while matches!(
            self.cur.kind,
            TokenKind::KwUse | TokenKind::KwForce | TokenKind::KwIgnore
        ) {
            hints.push(self.parse_index_hint()?);
        }

        if alias.is_some() || !column_aliases.is_empty() || !hints.is_empty() {
            return Ok(TableExpr::Aliased(Box::new(AliasedTable {
                pos,
                expr,
                alias,
                column_aliases,
                hints,
            })));
        }
        Ok(expr)
    }

    fn parse_index_hint(&mut self) -> Result<IndexHint, ParseError> {
        let kind = match self.cur.kind {
            TokenKind::KwUse => IndexHintKind::Use,
            TokenKind::KwForce => IndexHintKind::Force,
            _ => IndexHintKind::Ignore,
        };
        self.advance();

        if !self.eat(TokenKind::KwIndex) {
            let _ = self.eat(TokenKind::KwKey);
        }

        let mut scope = IndexHintScope::All;
        if self.eat(TokenKind::KwFor) {
            scope = match self.cur.kind {
                TokenKind::KwJoin => {
                    self.advance();
                    IndexHintScope::Join
                }
                TokenKind::KwOrder => {
                    self.advance();
                    self.expect(TokenKind::KwBy)?;
                    IndexHintScope::OrderBy
                }
                TokenKind::KwGroup => {
                    self.advance();
                    self.expect(TokenKind::KwBy)?;
                    IndexHintScope::GroupBy
                }
                _ => return Err(self.err_expected("JOIN, ORDER BY, or GROUP BY")),
            };
        }

        let mut indexes = Vec::new();
        self.expect(TokenKind::LParen)?;
        while matches!(self.cur.kind, TokenKind::Ident | TokenKind::KwPrimary) {
            indexes.push(self.cur.text.to_string());
            self.advance();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(IndexHint {
            kind,
            scope,
            indexes,
        })
    }

    pub(crate) fn parse_table_name(&mut self) -> Result<TableRef, ParseError> {
        if !self.cur_is_ident_like() {
            return Err(self.err_expected("table name"));
        }
        let pos = self.cur.pos;
        let mut parts = omnisql_ast::NameParts::new();
        parts.push(self.cur.text.to_string());
        self.advance();

        while self.eat(TokenKind::Dot) {
            if !self.cur_is_ident_like() {
                return Err(self.err_expected("identifier after '.'"));
            }
            parts.push(self.cur.text.to_string());
            self.advance();
        }

        Ok(TableRef { pos, parts })
    }

    pub(crate) fn parse_values_statement(&mut self) -> Result<ValuesStatement, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // VALUES
        let rows = self.parse_values_rows()?;
        Ok(ValuesStatement { pos, rows })
    }

    fn parse_values_rows(&mut self) -> Result<Vec<Vec<Expr>>, ParseError> {
        let mut rows = Vec::new();
        loop {
            self.expect(TokenKind::LParen)?;
            let mut row = Vec::new();
            if !self.cur_is(TokenKind::RParen) {
                loop {
                    if self.cur_is(TokenKind::KwDefault) {
                        row.push(Expr::Literal(Literal {
                            pos: self.cur.pos,
                            kind: LiteralKind::Null,
                            text: "DEFAULT".to_owned(),
                        }));
                        self.advance();
                    } else {
                        row.push(self.parse_expr()?);
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen)?;
            rows.push(row);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(rows)
    }

    // -----------------------------------------------------------------------
    // INSERT
    // -----------------------------------------------------------------------

    fn parse_insert(&mut self, with: Option<WithClause>) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        let replace = self.cur_is(TokenKind::KwReplace);
        self.advance(); // INSERT or REPLACE

        let ignore = self.eat(TokenKind::KwIgnore);
        self.expect(TokenKind::KwInto)?;
        let table = self.parse_table_name()?;

        let mut columns = Vec::new();
        if self.cur_is(TokenKind::LParen) && self.peek_kind() != TokenKind::KwSelect {
            self.advance();
            while self.cur_is(TokenKind::Ident) {
                columns.push(ColumnRef {
                    pos: self.cur.pos,
                    parts: std::iter::once(self.cur.text.to_string()).collect(),
                });
                self.advance();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        let source = match self.cur.kind {
            TokenKind::KwValues | TokenKind::KwValue => {
                self.advance();
                InsertSource::Values(self.parse_values_rows()?)
            }
            TokenKind::KwSelect | TokenKind::KwWith | TokenKind::LParen => {
                let stmt = match self.cur.kind {
                    TokenKind::KwWith => self.parse_with()?,
                    TokenKind::LParen => self.parse_paren_statement()?,
                    _ => self.parse_select()?,
                };
                InsertSource::Select(Box::new(stmt))
            }
            TokenKind::KwSet => {
                // MySQL `INSERT INTO t SET a = 1, b = 2` normalizes to a
                // column list plus a single values row.
                self.advance();
                let assignments = self.parse_assignments()?;
                let mut row = Vec::with_capacity(assignments.len());
                for a in assignments {
                    columns.push(a.column);
                    row.push(a.value);
                }
                InsertSource::Values(vec![row])
            }
            TokenKind::KwDefault => {
                self.advance();
                self.expect(TokenKind::KwValues)?;
                InsertSource::DefaultValues
            }
            _ => return Err(self.err_expected("VALUES, SELECT, SET, or DEFAULT VALUES")),
        };

        let mut stmt = InsertStatement {
            pos,
            with,
            replace,
            ignore,
            table,
            columns,
            source,
            on_duplicate: Vec::new(),
            on_conflict: None,
            returning: Vec::new(),
        };

        if self.eat(TokenKind::KwOn) {
            if self.eat(TokenKind::KwDuplicate) {
                self.expect(TokenKind::KwKey)?;
                self.expect(TokenKind::KwUpdate)?;
                stmt.on_duplicate = self.parse_assignments()?;
            } else if self.cur_is(TokenKind::KwConflict) {
                stmt.on_conflict = Some(self.parse_on_conflict()?);
            } else {
                return Err(self.err_expected("DUPLICATE or CONFLICT after ON"));
            }
        }

        if self.eat(TokenKind::KwReturning) {
            stmt.returning = self.parse_select_items()?;
        }

        Ok(Statement::Insert(Box::new(stmt)))
    }

    fn parse_on_conflict(&mut self) -> Result<OnConflict, ParseError> {
        self.advance(); // CONFLICT

        let mut conflict = OnConflict {
            columns: Vec::new(),
            where_clause: None,
            action: ConflictAction::DoNothing,
        };

        if self.cur_is(TokenKind::LParen) {
            conflict.columns = self.parse_column_name_list()?;
        }
        if self.eat(TokenKind::KwWhere) {
            conflict.where_clause = Some(self.parse_expr()?);
        }

        self.expect(TokenKind::KwDo)?;
        if self.eat(TokenKind::KwNothing) {
            conflict.action = ConflictAction::DoNothing;
        } else if self.eat(TokenKind::KwUpdate) {
            self.expect(TokenKind::KwSet)?;
            conflict.action = ConflictAction::DoUpdate(self.parse_assignments()?);
        } else {
            return Err(self.err_expected("NOTHING or UPDATE after DO"));
        }

        Ok(conflict)
    }

    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            items.push(self.parse_select_item()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_assignments(&mut self) -> Result<Vec<Assignment>, ParseError> {
        let mut assignments = Vec::new();
        loop {
            if !self.cur_is(TokenKind::Ident) {
                if assignments.is_empty() {
                    return Err(self.err_expected("column name"));
                }
                break;
            }
            let pos = self.cur.pos;
            let mut parts = omnisql_ast::NameParts::new();
            parts.push(self.cur.text.to_string());
            self.advance();
            while self.eat(TokenKind::Dot) {
                if !self.cur_is(TokenKind::Ident) {
                    return Err(self.err_expected("identifier after '.'"));
                }
                parts.push(self.cur.text.to_string());
                self.advance();
            }

            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            assignments.push(Assignment {
                column: ColumnRef { pos, parts },
                value,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(assignments)
    }

    // -----------------------------------------------------------------------
    // UPDATE / DELETE
    // -----------------------------------------------------------------------

    fn parse_update(&mut self, with: Option<WithClause>) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // UPDATE

        let table = self.parse_table_expr()?;
        self.expect(TokenKind::KwSet)?;
        let set = self.parse_assignments()?;

        let mut stmt = UpdateStatement {
            pos,
            with,
            table,
            set,
            from: None,
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            returning: Vec::new(),
        };

        if self.eat(TokenKind::KwFrom) {
            stmt.from = Some(self.parse_table_expr()?);
        }
        if self.eat(TokenKind::KwWhere) {
            stmt.where_clause = Some(self.parse_expr()?);
        }
        if self.cur_is(TokenKind::KwOrder) {
            stmt.order_by = self.parse_order_by()?;
        }
        if self.cur_is(TokenKind::KwLimit) {
            stmt.limit = Some(self.parse_limit()?);
        }
        if self.eat(TokenKind::KwReturning) {
            stmt.returning = self.parse_select_items()?;
        }

        Ok(Statement::Update(Box::new(stmt)))
    }

    fn parse_delete(&mut self, with: Option<WithClause>) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // DELETE
        let _ = self.eat(TokenKind::KwFrom);

        let table = self.parse_table_expr()?;

        let mut stmt = DeleteStatement {
            pos,
            with,
            table,
            using: None,
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            returning: Vec::new(),
        };

        if self.eat(TokenKind::KwUsing) {
            stmt.using = Some(self.parse_table_expr()?);
        }
        if self.eat(TokenKind::KwWhere) {
            stmt.where_clause = Some(self.parse_expr()?);
        }
        if self.cur_is(TokenKind::KwOrder) {
            stmt.order_by = self.parse_order_by()?;
        }
        if self.cur_is(TokenKind::KwLimit) {
            stmt.limit = Some(self.parse_limit()?);
        }
        if self.eat(TokenKind::KwReturning) {
            stmt.returning = self.parse_select_items()?;
        }

        Ok(Statement::Delete(Box::new(stmt)))
    }

    // -----------------------------------------------------------------------
    // CREATE / ALTER / DROP / TRUNCATE / EXPLAIN
    // -----------------------------------------------------------------------

    fn parse_create(&mut self) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // CREATE

        let temporary =
            self.eat(TokenKind::KwTemporary) || self.eat(TokenKind::KwTemp);

        match self.cur.kind {
            TokenKind::KwTable => self.parse_create_table(pos, temporary),
            TokenKind::KwIndex | TokenKind::KwUnique => self.parse_create_index(pos),
            _ => Err(self.err_expected("TABLE or INDEX after CREATE")),
        }
    }

    fn parse_if_not_exists(&mut self) -> Result<bool, ParseError> {
        if self.eat(TokenKind::KwIf) {
            self.expect(TokenKind::KwNot)?;
            self.expect(TokenKind::KwExists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_if_exists(&mut self) -> Result<bool, ParseError> {
        if self.eat(TokenKind::KwIf) {
            self.expect(TokenKind::KwExists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_create_table(&mut self, pos: Pos, temporary: bool) -> Result<Statement, ParseError> {
        self.advance(); // TABLE
        let if_not_exists = self.parse_if_not_exists()?;
        let table = self.parse_table_name()?;

        let mut stmt = CreateTableStatement {
            pos,
            temporary,
            if_not_exists,
            table,
            columns: Vec::new(),
            constraints: Vec::new(),
            options: Vec::new(),
            as_select: None,
        };

        if self.eat(TokenKind::KwAs) {
            let query = if self.cur_is(TokenKind::KwWith) {
                self.parse_with()?
            } else {
                self.parse_select()?
            };
            stmt.as_select = Some(Box::new(query));
            return Ok(Statement::CreateTable(Box::new(stmt)));
        }

        self.expect(TokenKind::LParen)?;
        while !self.cur_is(TokenKind::RParen) && !self.cur_is(TokenKind::Eof) {
            if matches!(
                self.cur.kind,
                TokenKind::KwPrimary
                    | TokenKind::KwForeign
                    | TokenKind::KwUnique
                    | TokenKind::KwCheck
                    | TokenKind::KwConstraint
            ) {
                stmt.constraints.push(self.parse_table_constraint()?);
            } else {
                stmt.columns.push(self.parse_column_def()?);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        stmt.options = self.parse_table_options()?;
        Ok(Statement::CreateTable(Box::new(stmt)))
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        if !self.cur_is(TokenKind::Ident) {
            return Err(self.err_expected("column name"));
        }
        let name = self.cur.text.to_string();
        self.advance();

        let data_type = self.parse_data_type()?;
        let constraints = self.parse_column_constraints()?;

        Ok(ColumnDef {
            name,
            data_type,
            constraints,
        })
    }

    pub(crate) fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        if !self.cur_is_ident_like() {
            return Err(self.err_expected("data type"));
        }
        let mut dt = DataType {
            name: self.cur.text.to_string(),
            ..DataType::default()
        };
        self.advance();

        // Two-word forms: DOUBLE PRECISION, CHARACTER VARYING.
        if matches!(self.cur.kind, TokenKind::KwPrecision | TokenKind::KwVarying) {
            dt.name.push(' ');
            dt.name.push_str(&self.cur.text);
            self.advance();
        }

        if self.eat(TokenKind::LParen) {
            if self.cur_is(TokenKind::Int) {
                dt.length = Some(parse_u32(&self.cur.text));
                self.advance();
                if self.eat(TokenKind::Comma) {
                    if !self.cur_is(TokenKind::Int) {
                        return Err(self.err_expected("scale"));
                    }
                    dt.scale = Some(parse_u32(&self.cur.text));
                    self.advance();
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        loop {
            let is_character_set =
                self.cur.kind == TokenKind::KwCharacter && self.peek_kind() == TokenKind::KwSet;
            match self.cur.kind {
                TokenKind::KwUnsigned => {
                    dt.unsigned = true;
                    self.advance();
                }
                TokenKind::KwSigned | TokenKind::KwZerofill => self.advance(),
                TokenKind::KwCharacter if is_character_set => {
                    self.advance();
                    self.advance();
                    dt.charset = Some(self.parse_name_or_string()?);
                }
                TokenKind::KwCharset => {
                    self.advance();
                    dt.charset = Some(self.parse_name_or_string()?);
                }
                TokenKind::KwCollate => {
                    self.advance();
                    dt.collation = Some(self.parse_name_or_string()?);
                }
                TokenKind::KwArray => {
                    dt.array = true;
                    self.advance();
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.expect(TokenKind::RBracket)?;
                    dt.array = true;
                }
                _ => break,
            }
        }

        Ok(dt)
    }

    fn parse_name_or_string(&mut self) -> Result<String, ParseError> {
        if matches!(self.cur.kind, TokenKind::Ident | TokenKind::Str) {
            let s = self.cur.text.to_string();
            self.advance();
            Ok(s)
        } else {
            Err(self.err_expected("name"))
        }
    }

    fn parse_column_constraints(&mut self) -> Result<Vec<ColumnConstraint>, ParseError> {
        let mut constraints = Vec::new();
        loop {
            let name = if self.eat(TokenKind::KwConstraint) {
                if !self.cur_is(TokenKind::Ident) {
                    return Err(self.err_expected("constraint name"));
                }
                let n = self.cur.text.to_string();
                self.advance();
                Some(n)
            } else {
                None
            };

            let kind = match self.cur.kind {
                TokenKind::KwNot => {
                    self.advance();
                    self.expect(TokenKind::KwNull)?;
                    Some(ColumnConstraintKind::NotNull)
                }
                TokenKind::KwNull => {
                    // Explicit NULL is the default; nothing to record.
                    self.advance();
                    None
                }
                TokenKind::KwPrimary => {
                    self.advance();
                    self.expect(TokenKind::KwKey)?;
                    Some(ColumnConstraintKind::PrimaryKey)
                }
                TokenKind::KwUnique => {
                    self.advance();
                    Some(ColumnConstraintKind::Unique)
                }
                TokenKind::KwDefault => {
                    self.advance();
                    Some(ColumnConstraintKind::Default(self.parse_expr()?))
                }
                TokenKind::KwCheck => {
                    self.advance();
                    self.expect(TokenKind::LParen)?;
                    let e = self.parse_expr()?;
                    self.expect(TokenKind::RParen)?;
                    Some(ColumnConstraintKind::Check(e))
                }
                TokenKind::KwReferences => {
                    self.advance();
                    Some(ColumnConstraintKind::References(self.parse_fk_ref()?))
                }
                TokenKind::KwAutoIncrement | TokenKind::KwAutoincrement => {
                    // Accepted as a column property with no AST footprint.
                    self.advance();
                    None
                }
                TokenKind::KwGenerated => {
                    self.advance();
                    let _ = self.eat(TokenKind::KwAlways);
                    let _ = self.eat(TokenKind::KwAs);
                    self.expect(TokenKind::LParen)?;
                    let expr = self.parse_expr()?;
                    self.expect(TokenKind::RParen)?;
                    let stored = self.eat(TokenKind::KwStored);
                    if !stored {
                        let _ = self.eat(TokenKind::KwVirtual);
                    }
                    Some(ColumnConstraintKind::Generated { expr, stored })
                }
                _ => {
                    if name.is_some() {
                        return Err(self.err_expected("constraint after CONSTRAINT name"));
                    }
                    return Ok(constraints);
                }
            };

            if let Some(kind) = kind {
                constraints.push(ColumnConstraint { name, kind });
            }
        }
    }

    fn parse_fk_ref(&mut self) -> Result<ForeignKeyRef, ParseError> {
        let table = self.parse_table_name()?;
        let columns = if self.cur_is(TokenKind::LParen) {
            self.parse_column_name_list()?
        } else {
            Vec::new()
        };

        let mut fk = ForeignKeyRef {
            table,
            columns,
            on_delete: None,
            on_update: None,
        };

        while self.cur_is(TokenKind::KwOn) {
            self.advance();
            if self.eat(TokenKind::KwDelete) {
                fk.on_delete = Some(self.parse_ref_action()?);
            } else if self.eat(TokenKind::KwUpdate) {
                fk.on_update = Some(self.parse_ref_action()?);
            } else {
                return Err(self.err_expected("DELETE or UPDATE after ON"));
            }
        }

        Ok(fk)
    }

    fn parse_ref_action(&mut self) -> Result<RefAction, ParseError> {
        match self.cur.kind {
            TokenKind::KwCascade => {
                self.advance();
                Ok(RefAction::Cascade)
            }
            TokenKind::KwRestrict => {
                self.advance();
                Ok(RefAction::Restrict)
            }
            TokenKind::KwSet => {
                self.advance();
                if self.eat(TokenKind::KwNull) {
                    Ok(RefAction::SetNull)
                } else if self.eat(TokenKind::KwDefault) {
                    Ok(RefAction::SetDefault)
                } else {
                    Err(self.err_expected("NULL or DEFAULT after SET"))
                }
            }
            TokenKind::KwNo => {
                self.advance();
                self.expect(TokenKind::KwAction)?;
                Ok(RefAction::NoAction)
            }
            _ => Err(self.err_expected("referential action")),
        }
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint, ParseError> {
        let name = if self.eat(TokenKind::KwConstraint) {
            if !self.cur_is(TokenKind::Ident) {
                return Err(self.err_expected("constraint name"));
            }
            let n = self.cur.text.to_string();
            self.advance();
            Some(n)
        } else {
            None
        };

        let kind = match self.cur.kind {
            TokenKind::KwPrimary => {
                self.advance();
                self.expect(TokenKind::KwKey)?;
                TableConstraintKind::PrimaryKey(self.parse_column_name_list()?)
            }
            TokenKind::KwUnique => {
                self.advance();
                let _ = self.eat(TokenKind::KwKey);
                TableConstraintKind::Unique(self.parse_column_name_list()?)
            }
            TokenKind::KwForeign => {
                self.advance();
                self.expect(TokenKind::KwKey)?;
                let columns = self.parse_column_name_list()?;
                self.expect(TokenKind::KwReferences)?;
                TableConstraintKind::ForeignKey {
                    columns,
                    reference: self.parse_fk_ref()?,
                }
            }
            TokenKind::KwCheck => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                TableConstraintKind::Check(e)
            }
            _ => return Err(self.err_expected("table constraint")),
        };

        Ok(TableConstraint { name, kind })
    }

    fn parse_table_options(&mut self) -> Result<Vec<TableOption>, ParseError> {
        let mut opts = Vec::new();
        loop {
            let name = match self.cur.kind {
                TokenKind::KwEngine => "ENGINE",
                TokenKind::KwCharset => "CHARSET",
                TokenKind::KwCharacter => {
                    if self.peek_kind() != TokenKind::KwSet {
                        return Ok(opts);
                    }
                    self.advance(); // extra SET consumed below
                    "CHARSET"
                }
                TokenKind::KwCollate => "COLLATE",
                TokenKind::KwComment => "COMMENT",
                TokenKind::KwAutoIncrement => "AUTO_INCREMENT",
                _ => return Ok(opts),
            };
            self.advance();
            let _ = self.eat(TokenKind::Eq);
            if !matches!(
                self.cur.kind,
                TokenKind::Ident | TokenKind::Str | TokenKind::Int
            ) {
                return Err(self.err_expected("table option value"));
            }
            opts.push(TableOption {
                name: name.to_owned(),
                value: self.cur.text.to_string(),
            });
            self.advance();
        }
    }

    fn parse_create_index(&mut self, pos: Pos) -> Result<Statement, ParseError> {
        let unique = self.eat(TokenKind::KwUnique);
        self.expect(TokenKind::KwIndex)?;
        let concurrently = self.eat(TokenKind::KwConcurrently);
        let if_not_exists = self.parse_if_not_exists()?;

        let name = if self.cur_is(TokenKind::Ident) {
            let n = self.cur.text.to_string();
            self.advance();
            Some(n)
        } else {
            None
        };

        self.expect(TokenKind::KwOn)?;
        let table = self.parse_table_name()?;

        let using = if self.eat(TokenKind::KwUsing) {
            if !self.cur_is_ident_like() {
                return Err(self.err_expected("index method"));
            }
            let m = self.cur.text.to_string();
            self.advance();
            Some(m)
        } else {
            None
        };

        let mut stmt = CreateIndexStatement {
            pos,
            unique,
            concurrently,
            if_not_exists,
            name,
            table,
            using,
            columns: Vec::new(),
            where_clause: None,
        };

        self.expect(TokenKind::LParen)?;
        while !self.cur_is(TokenKind::RParen) && !self.cur_is(TokenKind::Eof) {
            let key = if self.cur_is(TokenKind::LParen) {
                IndexKey::Expr(self.parse_expr()?)
            } else if self.cur_is_ident_like() {
                let k = IndexKey::Named(self.cur.text.to_string());
                self.advance();
                k
            } else {
                return Err(self.err_expected("column name or expression"));
            };

            let mut col = IndexColumn {
                key,
                desc: false,
                nulls_first: None,
            };
            if self.eat(TokenKind::KwDesc) {
                col.desc = true;
            } else {
                let _ = self.eat(TokenKind::KwAsc);
            }
            if self.eat(TokenKind::KwNulls) {
                if self.eat(TokenKind::KwFirst) {
                    col.nulls_first = Some(true);
                } else if self.eat(TokenKind::KwLast) {
                    col.nulls_first = Some(false);
                } else {
                    return Err(self.err_expected("FIRST or LAST after NULLS"));
                }
            }
            stmt.columns.push(col);

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        if self.eat(TokenKind::KwWhere) {
            stmt.where_clause = Some(self.parse_expr()?);
        }

        Ok(Statement::CreateIndex(Box::new(stmt)))
    }

    fn parse_alter(&mut self) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // ALTER
        self.expect(TokenKind::KwTable)?;
        let table = self.parse_table_name()?;

        let mut actions = Vec::new();
        loop {
            actions.push(self.parse_alter_action()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        Ok(Statement::AlterTable(Box::new(AlterTableStatement {
            pos,
            table,
            actions,
        })))
    }

    fn parse_alter_action(&mut self) -> Result<AlterAction, ParseError> {
        match self.cur.kind {
            TokenKind::KwAdd => {
                self.advance();
                let _ = self.eat(TokenKind::KwColumn);
                if matches!(
                    self.cur.kind,
                    TokenKind::KwConstraint
                        | TokenKind::KwPrimary
                        | TokenKind::KwForeign
                        | TokenKind::KwUnique
                        | TokenKind::KwCheck
                ) {
                    Ok(AlterAction::AddConstraint(self.parse_table_constraint()?))
                } else {
                    Ok(AlterAction::AddColumn(self.parse_column_def()?))
                }
            }

            TokenKind::KwDrop => {
                self.advance();
                if self.eat(TokenKind::KwColumn) {
                    let if_exists = self.parse_if_exists()?;
                    let name = self.parse_bare_name()?;
                    let cascade = self.eat(TokenKind::KwCascade);
                    Ok(AlterAction::DropColumn {
                        name,
                        if_exists,
                        cascade,
                    })
                } else if self.eat(TokenKind::KwConstraint) {
                    let if_exists = self.parse_if_exists()?;
                    let name = self.parse_bare_name()?;
                    let cascade = self.eat(TokenKind::KwCascade);
                    Ok(AlterAction::DropConstraint {
                        name,
                        if_exists,
                        cascade,
                    })
                } else {
                    Err(self.err_expected("COLUMN or CONSTRAINT after DROP"))
                }
            }

            TokenKind::KwRename => {
                self.advance();
                if self.eat(TokenKind::KwColumn) {
                    let old_name = self.parse_bare_name()?;
                    self.expect(TokenKind::KwTo)?;
                    let new_name = self.parse_bare_name()?;
                    Ok(AlterAction::RenameColumn { old_name, new_name })
                } else if self.eat(TokenKind::KwTo) {
                    Ok(AlterAction::RenameTable(self.parse_table_name()?))
                } else {
                    Err(self.err_expected("COLUMN or TO after RENAME"))
                }
            }

            TokenKind::KwModify | TokenKind::KwAlter => {
                self.advance();
                let _ = self.eat(TokenKind::KwColumn);
                let name = self.parse_bare_name()?;

                let mut action = ModifyColumn {
                    name,
                    ..ModifyColumn::default()
                };

                if self.eat(TokenKind::KwSet) {
                    if self.eat(TokenKind::KwNot) {
                        self.expect(TokenKind::KwNull)?;
                        action.set_not_null = true;
                    } else if self.eat(TokenKind::KwDefault) {
                        action.set_default = Some(self.parse_expr()?);
                    } else {
                        return Err(self.err_expected("NOT NULL or DEFAULT after SET"));
                    }
                } else if self.eat(TokenKind::KwDrop) {
                    if self.eat(TokenKind::KwNot) {
                        self.expect(TokenKind::KwNull)?;
                        action.drop_not_null = true;
                    } else if self.eat(TokenKind::KwDefault) {
                        action.drop_default = true;
                    } else {
                        return Err(self.err_expected("NOT NULL or DEFAULT after DROP"));
                    }
                } else {
                    // MySQL MODIFY COLUMN name <type> <constraints>.
                    let data_type = self.parse_data_type()?;
                    let constraints = self.parse_column_constraints()?;
                    action.new_def = Some(ColumnDef {
                        name: action.name.clone(),
                        data_type,
                        constraints,
                    });
                }
                Ok(AlterAction::ModifyColumn(action))
            }

            _ => Err(self.err_expected("ALTER TABLE action")),
        }
    }

    /// An identifier in a name position; keywords are acceptable.
    fn parse_bare_name(&mut self) -> Result<String, ParseError> {
        if !self.cur_is_ident_like() {
            return Err(self.err_expected("identifier"));
        }
        let name = self.cur.text.to_string();
        self.advance();
        Ok(name)
    }

    fn parse_drop(&mut self) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // DROP

        match self.cur.kind {
            TokenKind::KwTable => {
                self.advance();
                let if_exists = self.parse_if_exists()?;
                let mut tables = Vec::new();
                loop {
                    tables.push(self.parse_table_name()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                let cascade = self.eat(TokenKind::KwCascade);
                Ok(Statement::DropTable(DropTableStatement {
                    pos,
                    if_exists,
                    tables,
                    cascade,
                }))
            }
            TokenKind::KwIndex => {
                self.advance();
                let concurrently = self.eat(TokenKind::KwConcurrently);
                let if_exists = self.parse_if_exists()?;
                let name = self.parse_bare_name()?;
                let table = if self.eat(TokenKind::KwOn) {
                    Some(self.parse_table_name()?)
                } else {
                    None
                };
                let cascade = self.eat(TokenKind::KwCascade);
                Ok(Statement::DropIndex(DropIndexStatement {
                    pos,
                    concurrently,
                    if_exists,
                    name,
                    table,
                    cascade,
                }))
            }
            _ => Err(self.err_expected("TABLE or INDEX after DROP")),
        }
    }

    fn parse_truncate(&mut self) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // TRUNCATE
        let _ = self.eat(TokenKind::KwTable);

        let mut tables = Vec::new();
        loop {
            tables.push(self.parse_table_name()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let cascade = self.eat(TokenKind::KwCascade);

        Ok(Statement::Truncate(TruncateStatement {
            pos,
            tables,
            cascade,
        }))
    }

    fn parse_explain(&mut self) -> Result<Statement, ParseError> {
        let pos = self.cur.pos;
        let _ = self.eat(TokenKind::KwExplain);

        let mut analyze = false;
        let mut verbose = false;
        let mut format = None;

        loop {
            match self.cur.kind {
                TokenKind::KwAnalyze => {
                    analyze = true;
                    self.advance();
                }
                TokenKind::KwVerbose => {
                    verbose = true;
                    self.advance();
                }
                TokenKind::KwFormat => {
                    self.advance();
                    if !self.cur_is(TokenKind::Ident) {
                        return Err(self.err_expected("format name"));
                    }
                    format = Some(self.cur.text.to_string());
                    self.advance();
                }
                TokenKind::LParen => {
                    // PostgreSQL option list: EXPLAIN (ANALYZE, VERBOSE, ..).
                    self.advance();
                    while !self.cur_is(TokenKind::RParen) && !self.cur_is(TokenKind::Eof) {
                        match self.cur.kind {
                            TokenKind::KwAnalyze => analyze = true,
                            TokenKind::KwVerbose => verbose = true,
                            TokenKind::KwFormat => {
                                self.advance();
                                if self.cur_is(TokenKind::Ident) {
                                    format = Some(self.cur.text.to_string());
                                }
                            }
                            _ => {}
                        }
                        self.advance();
                        let _ = self.eat(TokenKind::Comma);
                    }
                    self.expect(TokenKind::RParen)?;
                }
                _ => break,
            }
        }

        let stmt = self.parse_statement()?;
        Ok(Statement::Explain(Box::new(ExplainStatement {
            pos,
            analyze,
            verbose,
            format,
            stmt,
        })))
    }
}

/// Hang a WITH clause on the statement it prefixes. For a compound, the
/// clause lands on the leftmost simple SELECT.
fn attach_with(stmt: Statement, with: WithClause) -> Statement {
    match stmt {
        Statement::Select(mut s) => {
            s.with = Some(with);
            Statement::Select(s)
        }
        Statement::SetOp(mut s) => {
            s.left = attach_with(s.left, with);
            Statement::SetOp(s)
        }
        other => other,
    }
}

fn parse_u32(text: &str) -> u32 {
    text.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Statement {
        let mut p = Parser::new(sql);
        match p.parse_one() {
            Ok(Some(stmt)) => stmt,
            Ok(None) => panic!("no statement parsed from `{sql}`"),
            Err(e) => panic!("parse error for `{sql}`: {e}"),
        }
    }

    fn parse_err(sql: &str) -> ParseError {
        let mut p = Parser::new(sql);
        match p.parse_one() {
            Err(e) => e,
            Ok(s) => panic!("expected error for `{sql}`, got {s:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_none() {
        assert!(matches!(Parser::new("").parse_one(), Ok(None)));
        assert!(matches!(Parser::new("   \n\t ").parse_one(), Ok(None)));
        assert!(matches!(Parser::new("-- only comments").parse_one(), Ok(None)));
    }

    #[test]
    fn test_parse_all_of_bare_semicolons() {
        let (stmts, errors) = Parser::new(";;;").parse_all();
        assert!(stmts.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_simple_select() {
        let stmt = parse("select 1 from t");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(sel.columns.len(), 1);
        assert!(matches!(sel.from, Some(TableExpr::Table(_))));
    }

    #[test]
    fn test_select_clause_inventory() {
        let stmt = parse(
            "select distinct a, b cnt from t where a > 1 group by a, b \
             having count(a) > 2 order by a desc nulls last limit 5 offset 2 \
             for update skip locked",
        );
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        assert!(sel.distinct);
        assert_eq!(sel.columns.len(), 2);
        assert!(sel.where_clause.is_some());
        assert_eq!(sel.group_by.len(), 2);
        assert!(sel.having.is_some());
        assert_eq!(sel.order_by.len(), 1);
        assert!(sel.order_by[0].desc);
        assert_eq!(sel.order_by[0].nulls_first, Some(false));
        let limit = sel.limit.expect("limit");
        assert!(limit.count.is_some() && limit.offset.is_some());
        let lock = sel.lock.expect("lock");
        assert_eq!(lock.mode, LockMode::Update);
        assert_eq!(lock.wait, LockWait::SkipLocked);
    }

    #[test]
    fn test_alias_does_not_swallow_clause_keywords() {
        let stmt = parse("select a from t");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let SelectItem::Expr(item) = &sel.columns[0] else {
            panic!("expected expression item");
        };
        assert_eq!(item.alias, None);
        assert!(sel.from.is_some());
    }

    #[test]
    fn test_mysql_limit_comma_normalizes() {
        let stmt = parse("select * from t limit 20, 10");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let limit = sel.limit.expect("limit");
        let Some(Expr::Literal(count)) = limit.count else {
            panic!("count");
        };
        let Some(Expr::Literal(offset)) = limit.offset else {
            panic!("offset");
        };
        assert_eq!(count.text, "10");
        assert_eq!(offset.text, "20");
    }

    #[test]
    fn test_union_is_left_associative() {
        let stmt = parse("select 1 from t union select 2 from t union select 3 from t");
        let Statement::SetOp(outer) = stmt else {
            panic!("expected SetOp");
        };
        assert_eq!(outer.op, SetOpKind::Union);
        assert!(matches!(outer.left, Statement::SetOp(_)));
        assert!(matches!(outer.right, Statement::Select(_)));
    }

    #[test]
    fn test_union_all_flag() {
        let stmt = parse("select 1 from t union all select 2 from t");
        let Statement::SetOp(s) = stmt else {
            panic!("expected SetOp");
        };
        assert!(s.all);
    }

    #[test]
    fn test_parenthesized_union() {
        let stmt = parse("(select 1 from t) union (select 2 from t) order by 1");
        let Statement::SetOp(s) = stmt else {
            panic!("expected SetOp");
        };
        assert_eq!(s.order_by.len(), 1);
    }

    #[test]
    fn test_join_chain_order() {
        let stmt = parse("select * from a left join b on a.x = b.x right join c on b.y = c.y");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let Some(TableExpr::Join(outer)) = sel.from else {
            panic!("expected join");
        };
        assert_eq!(outer.kind, JoinKind::Right);
        let TableExpr::Join(inner) = outer.left else {
            panic!("expected nested join");
        };
        assert_eq!(inner.kind, JoinKind::Left);
    }

    #[test]
    fn test_cross_and_natural_joins_take_no_condition() {
        let stmt = parse("select * from a cross join b");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let Some(TableExpr::Join(j)) = sel.from else {
            panic!("expected join");
        };
        assert_eq!(j.kind, JoinKind::Cross);
        assert!(j.on.is_none() && j.using.is_empty());

        let stmt = parse("select * from a natural join b");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let Some(TableExpr::Join(j)) = sel.from else {
            panic!("expected join");
        };
        assert!(j.natural);
    }

    #[test]
    fn test_comma_is_implicit_cross_join() {
        let stmt = parse("select 1 from t1, t2");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let Some(TableExpr::Join(j)) = sel.from else {
            panic!("expected join");
        };
        assert_eq!(j.kind, JoinKind::Cross);
    }

    #[test]
    fn test_derived_table_column_aliases_are_stored() {
        let stmt = parse("select * from (select 1, 2 from t) as x (a, b)");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let Some(TableExpr::Aliased(a)) = sel.from else {
            panic!("expected aliased table");
        };
        assert_eq!(a.alias.as_deref(), Some("x"));
        assert_eq!(a.column_aliases, vec!["a", "b"]);
    }

    #[test]
    fn test_index_hints_are_retained() {
        let stmt = parse("select * from t use index for order by (i1, i2)");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let Some(TableExpr::Aliased(a)) = sel.from else {
            panic!("expected aliased table");
        };
        assert_eq!(a.hints.len(), 1);
        assert_eq!(a.hints[0].kind, IndexHintKind::Use);
        assert_eq!(a.hints[0].scope, IndexHintScope::OrderBy);
        assert_eq!(a.hints[0].indexes, vec!["i1", "i2"]);
    }

    #[test]
    fn test_cte_and_recursive_cte() {
        let stmt = parse("with cte (a) as (select 1 from t) select * from cte");
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        let with = sel.with.expect("with clause");
        assert!(!with.recursive);
        assert_eq!(with.ctes.len(), 1);
        assert_eq!(with.ctes[0].name, "cte");
        assert_eq!(with.ctes[0].columns, vec!["a"]);

        let stmt = parse(
            "with recursive r (n) as (select 1 union all select n + 1 from r where n < 5) \
             select * from r",
        );
        let Statement::Select(sel) = stmt else {
            panic!("expected SELECT");
        };
        assert!(sel.with.expect("with").recursive);
    }

    #[test]
    fn test_insert_values_rows() {
        let stmt = parse("insert into t (a, b) values (1, 2), (3, 4)");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(ins.columns.len(), 2);
        let InsertSource::Values(rows) = &ins.source else {
            panic!("expected VALUES");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn test_insert_select_and_default_values() {
        let stmt = parse("insert into t select a from s");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert!(matches!(ins.source, InsertSource::Select(_)));

        let stmt = parse("insert into t default values");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert!(matches!(ins.source, InsertSource::DefaultValues));
    }

    #[test]
    fn test_insert_set_normalizes() {
        let stmt = parse("insert into t set a = 1, b = 2");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(ins.columns.len(), 2);
        let InsertSource::Values(rows) = &ins.source else {
            panic!("expected VALUES");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn test_insert_conflict_clauses() {
        let stmt = parse("insert into t (a) values (1) on duplicate key update a = 2");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(ins.on_duplicate.len(), 1);

        let stmt =
            parse("insert into t (a) values (1) on conflict (a) do update set a = 2 returning a");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        let conflict = ins.on_conflict.expect("on conflict");
        assert_eq!(conflict.columns, vec!["a"]);
        assert!(matches!(conflict.action, ConflictAction::DoUpdate(_)));
        assert_eq!(ins.returning.len(), 1);

        let stmt = parse("insert into t (a) values (1) on conflict do nothing");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert!(matches!(
            ins.on_conflict.expect("on conflict").action,
            ConflictAction::DoNothing
        ));
    }

    #[test]
    fn test_insert_default_in_row() {
        let stmt = parse("insert into t (a, b) values (default, 1)");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        let InsertSource::Values(rows) = &ins.source else {
            panic!("expected VALUES");
        };
        let Expr::Literal(lit) = &rows[0][0] else {
            panic!("expected literal");
        };
        assert_eq!(lit.text, "DEFAULT");
    }

    #[test]
    fn test_replace_and_ignore() {
        let stmt = parse("replace into t (a) values (1)");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert!(ins.replace);

        let stmt = parse("insert ignore into t (a) values (1)");
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert!(ins.ignore);
    }

    #[test]
    fn test_update_with_extensions() {
        let stmt = parse(
            "update t set a = 1, b.c = 2 from u where t.id = u.id order by a limit 3 returning a",
        );
        let Statement::Update(up) = stmt else {
            panic!("expected UPDATE");
        };
        assert_eq!(up.set.len(), 2);
        assert_eq!(up.set[1].column.parts.len(), 2);
        assert!(up.from.is_some());
        assert!(up.where_clause.is_some());
        assert_eq!(up.order_by.len(), 1);
        assert!(up.limit.is_some());
        assert_eq!(up.returning.len(), 1);
    }

    #[test]
    fn test_delete_with_using() {
        let stmt = parse("delete from t using u where t.id = u.id returning t.id");
        let Statement::Delete(del) = stmt else {
            panic!("expected DELETE");
        };
        assert!(del.using.is_some());
        assert!(del.where_clause.is_some());
        assert_eq!(del.returning.len(), 1);
    }

    #[test]
    fn test_create_table_with_constraints() {
        let stmt = parse(
            "create table if not exists t (\
             id int primary key, \
             name varchar(255) not null default 'x', \
             price decimal(10, 2) check (price > 0), \
             owner int references u (id) on delete cascade, \
             constraint uq unique (name), \
             foreign key (owner) references u (id)\
             ) engine = innodb",
        );
        let Statement::CreateTable(ct) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert!(ct.if_not_exists);
        assert_eq!(ct.columns.len(), 4);
        assert_eq!(ct.constraints.len(), 2);
        assert_eq!(ct.options.len(), 1);
        assert_eq!(ct.options[0].name, "ENGINE");

        let price = &ct.columns[2];
        assert_eq!(price.data_type.length, Some(10));
        assert_eq!(price.data_type.scale, Some(2));
    }

    #[test]
    fn test_create_table_as_select() {
        let stmt = parse("create temporary table t as select * from u");
        let Statement::CreateTable(ct) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert!(ct.temporary);
        assert!(ct.as_select.is_some());
    }

    #[test]
    fn test_create_index_variants() {
        let stmt = parse(
            "create unique index concurrently if not exists idx on t using btree \
             (a desc, (b + c), d nulls first) where a > 0",
        );
        let Statement::CreateIndex(ci) = stmt else {
            panic!("expected CREATE INDEX");
        };
        assert!(ci.unique && ci.concurrently && ci.if_not_exists);
        assert_eq!(ci.name.as_deref(), Some("idx"));
        assert_eq!(ci.using.as_deref(), Some("btree"));
        assert_eq!(ci.columns.len(), 3);
        assert!(ci.columns[0].desc);
        assert!(matches!(ci.columns[1].key, IndexKey::Expr(_)));
        assert_eq!(ci.columns[2].nulls_first, Some(true));
        assert!(ci.where_clause.is_some());
    }

    #[test]
    fn test_alter_table_actions() {
        let stmt = parse(
            "alter table t add column x int, drop column if exists y cascade, \
             rename column a to b, rename to t2, modify column c varchar(10) not null, \
             add constraint ck check (x > 0), drop constraint ck2",
        );
        let Statement::AlterTable(at) = stmt else {
            panic!("expected ALTER TABLE");
        };
        assert_eq!(at.actions.len(), 7);
        assert!(matches!(at.actions[0], AlterAction::AddColumn(_)));
        assert!(matches!(
            at.actions[1],
            AlterAction::DropColumn {
                if_exists: true,
                cascade: true,
                ..
            }
        ));
        assert!(matches!(at.actions[3], AlterAction::RenameTable(_)));
        assert!(matches!(at.actions[6], AlterAction::DropConstraint { .. }));
    }

    #[test]
    fn test_drop_statements() {
        let stmt = parse("drop table if exists a, b cascade");
        let Statement::DropTable(dt) = stmt else {
            panic!("expected DROP TABLE");
        };
        assert!(dt.if_exists && dt.cascade);
        assert_eq!(dt.tables.len(), 2);

        let stmt = parse("drop index idx on t");
        let Statement::DropIndex(di) = stmt else {
            panic!("expected DROP INDEX");
        };
        assert_eq!(di.name, "idx");
        assert!(di.table.is_some());
    }

    #[test]
    fn test_truncate() {
        let stmt = parse("truncate table logs");
        let Statement::Truncate(t) = stmt else {
            panic!("expected TRUNCATE");
        };
        assert_eq!(t.tables.len(), 1);
    }

    #[test]
    fn test_explain_variants() {
        let stmt = parse("explain analyze verbose select 1 from t");
        let Statement::Explain(ex) = stmt else {
            panic!("expected EXPLAIN");
        };
        assert!(ex.analyze && ex.verbose);

        let stmt = parse("explain (analyze, format json) select 1 from t");
        let Statement::Explain(ex) = stmt else {
            panic!("expected EXPLAIN");
        };
        assert!(ex.analyze);
        assert_eq!(ex.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_values_statement() {
        let stmt = parse("values (1, 2), (3, 4)");
        let Statement::Values(v) = stmt else {
            panic!("expected VALUES");
        };
        assert_eq!(v.rows.len(), 2);
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        let e = parse_err("select 1 from t bogus extra +");
        assert!(e.message.contains("unexpected token"), "{}", e.message);
    }

    #[test]
    fn test_error_positions_are_reported() {
        let e = parse_err("select 1 from");
        assert!(e.pos.line >= 1);
        assert!(!e.message.is_empty());

        let e = parse_err("select 1 from\n  +");
        assert_eq!(e.pos.line, 2);
    }

    #[test]
    fn test_parse_all_recovers_per_statement() {
        let (stmts, errors) =
            Parser::new("select 1 from t; bogus; select 2 from u").parse_all();
        assert_eq!(stmts.len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_deep_nesting_is_an_error_not_a_crash() {
        let mut sql = String::from("select ");
        for _ in 0..MAX_PARSE_DEPTH + 50 {
            sql.push('(');
        }
        sql.push('1');
        for _ in 0..MAX_PARSE_DEPTH + 50 {
            sql.push(')');
        }
        let mut p = Parser::new(&sql);
        assert!(p.parse_one().is_err());
    }

    #[test]
    fn test_fuzz_regressions_do_not_panic() {
        // Edge cases lifted from fuzzing sessions; the only requirement is
        // a clean Ok/Err result.
        let cases = [
            "SELECT A(*IN",
            "SELECT A(*IS",
            "SELECT A(*BETWEEN",
            "SELECT A(*LIKE",
            "SELECT A(*SIMILAR",
            "SELECT 0[[",
            "SELECT 0[[0",
            "SELECT 0::``",
            "SELECT A(::",
            "SELECT - -0",
            "SELECT --0",
            "SELECT $$'''$$",
            "SELECT $$\\$$0",
            "SELECT\"\".*%0",
            "INSERT INTO t VALUES",
            "WITH",
            "((((",
            ")",
        ];
        for sql in cases {
            let _ = Parser::new(sql).parse_one();
        }
    }

    #[test]
    fn test_metrics_counter_increments() {
        reset_parse_metrics();
        let before = parse_metrics_snapshot().statements_total;
        let _ = parse("select 1 from t");
        let after = parse_metrics_snapshot().statements_total;
        assert!(after > before);
    }
}
