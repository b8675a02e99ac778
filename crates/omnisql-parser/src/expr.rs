//! Expression parsing via precedence climbing.
//!
//! Precedence levels, lowest to highest:
//!
//!   OR
//!   XOR
//!   AND
//!   NOT (prefix)
//!   = <> < > <= >=  and the n-ary postfix family
//!     IS, [NOT] IN, [NOT] BETWEEN, [NOT] LIKE/ILIKE, [NOT] SIMILAR TO
//!   |
//!   ^
//!   &
//!   << >>
//!   + - ||
//!   * / %
//!   - ~ (prefix)
//!   COLLATE, ::type, [subscript]  (postfix)
//!
//! Binary operators are left-associative. The comparison family loops at
//! the top of the climb, so `a = b = c` parses as `(a = b) = c` and a
//! BETWEEN bound never swallows the separating AND.

use omnisql_ast::{
    BetweenExpr, BinaryOp, CaseExpr, ColumnRef, Expr, FrameBound, FrameKind, FuncExpr, InExpr,
    InSet, IsTest, LikeExpr, Literal, LiteralKind, Param, ParamKind, StarExpr, Subquery,
    SubstringExpr, TrimDirection, TrimExpr, UnaryOp, When, WindowFrame, WindowSpec,
};

use crate::parser::{ParseError, Parser};
use crate::token::TokenKind;

// Precedence levels; higher binds tighter.
pub(crate) mod prec {
    pub const LOWEST: u8 = 0;
    pub const OR: u8 = 1;
    pub const XOR: u8 = 2;
    pub const AND: u8 = 3;
    pub const NOT: u8 = 4;
    pub const COMPARISON: u8 = 5;
    pub const BIT_OR: u8 = 6;
    pub const BIT_XOR: u8 = 7;
    pub const BIT_AND: u8 = 8;
    pub const SHIFT: u8 = 9;
    pub const ADDITIVE: u8 = 10;
    pub const MULTIPLICATIVE: u8 = 11;
    pub const UNARY: u8 = 12;
}

/// Date/time unit keywords accepted after `INTERVAL <expr>`.
fn is_interval_unit(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KwYear
            | TokenKind::KwQuarter
            | TokenKind::KwMonth
            | TokenKind::KwWeek
            | TokenKind::KwDay
            | TokenKind::KwHour
            | TokenKind::KwMinute
            | TokenKind::KwSecond
            | TokenKind::KwMicrosecond
            | TokenKind::KwEpoch
            | TokenKind::KwCentury
            | TokenKind::KwDecade
            | TokenKind::KwMillennium
    )
}

/// Binary operator and its precedence level for a token kind.
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let pair = match kind {
        TokenKind::KwOr => (BinaryOp::Or, prec::OR),
        TokenKind::KwXor => (BinaryOp::Xor, prec::XOR),
        TokenKind::KwAnd => (BinaryOp::And, prec::AND),
        TokenKind::Eq => (BinaryOp::Eq, prec::COMPARISON),
        TokenKind::Ne => (BinaryOp::Ne, prec::COMPARISON),
        TokenKind::Lt => (BinaryOp::Lt, prec::COMPARISON),
        TokenKind::Gt => (BinaryOp::Gt, prec::COMPARISON),
        TokenKind::Le => (BinaryOp::Le, prec::COMPARISON),
        TokenKind::Ge => (BinaryOp::Ge, prec::COMPARISON),
        TokenKind::BitOr => (BinaryOp::BitOr, prec::BIT_OR),
        TokenKind::BitXor => (BinaryOp::BitXor, prec::BIT_XOR),
        TokenKind::BitAnd => (BinaryOp::BitAnd, prec::BIT_AND),
        TokenKind::ShiftLeft => (BinaryOp::ShiftLeft, prec::SHIFT),
        TokenKind::ShiftRight => (BinaryOp::ShiftRight, prec::SHIFT),
        TokenKind::Plus => (BinaryOp::Add, prec::ADDITIVE),
        TokenKind::Minus => (BinaryOp::Subtract, prec::ADDITIVE),
        TokenKind::Concat => (BinaryOp::Concat, prec::ADDITIVE),
        TokenKind::Star => (BinaryOp::Multiply, prec::MULTIPLICATIVE),
        TokenKind::Slash => (BinaryOp::Divide, prec::MULTIPLICATIVE),
        TokenKind::Percent => (BinaryOp::Modulo, prec::MULTIPLICATIVE),
        _ => return None,
    };
    Some(pair)
}

impl<'a> Parser<'a> {
    /// Parse a full expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_prec(prec::LOWEST)
    }

    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = Vec::new();
        loop {
            exprs.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    pub(crate) fn parse_expr_prec(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        self.enter_recursion()?;
        let result = self.parse_expr_prec_inner(min_prec);
        self.leave_recursion();
        result
    }

    fn parse_expr_prec_inner(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;

        loop {
            match self.cur.kind {
                // The n-ary comparison family.
                TokenKind::KwIs if min_prec <= prec::COMPARISON => {
                    left = self.parse_is(left)?;
                }
                TokenKind::KwIn if min_prec <= prec::COMPARISON => {
                    left = self.parse_in(left, false)?;
                }
                TokenKind::KwBetween if min_prec <= prec::COMPARISON => {
                    left = self.parse_between(left, false)?;
                }
                TokenKind::KwLike | TokenKind::KwIlike if min_prec <= prec::COMPARISON => {
                    left = self.parse_like(left, false)?;
                }
                TokenKind::KwSimilar if min_prec <= prec::COMPARISON => {
                    left = self.parse_similar(left, false)?;
                }
                TokenKind::KwNot if min_prec <= prec::COMPARISON => {
                    match self.peek_kind() {
                        TokenKind::KwIn => {
                            self.advance();
                            left = self.parse_in(left, true)?;
                        }
                        TokenKind::KwBetween => {
                            self.advance();
                            left = self.parse_between(left, true)?;
                        }
                        TokenKind::KwLike | TokenKind::KwIlike => {
                            self.advance();
                            left = self.parse_like(left, true)?;
                        }
                        TokenKind::KwSimilar => {
                            self.advance();
                            left = self.parse_similar(left, true)?;
                        }
                        _ => break,
                    }
                }

                // Postfix operators bind tightest and always apply.
                TokenKind::KwCollate => {
                    left = self.parse_collate(left)?;
                }
                TokenKind::DoubleColon => {
                    left = self.parse_pg_cast(left)?;
                }
                TokenKind::LBracket => {
                    left = self.parse_subscript(left)?;
                }

                _ => {
                    let Some((op, op_prec)) = binary_op(self.cur.kind) else {
                        break;
                    };
                    if op_prec < min_prec {
                        break;
                    }
                    let pos = left.pos();
                    self.advance();
                    let right = self.parse_expr_prec(op_prec + 1)?;
                    left = Expr::Binary {
                        pos,
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                }
            }
        }

        Ok(left)
    }

    // -----------------------------------------------------------------------
    // Primary expressions
    // -----------------------------------------------------------------------

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        match self.cur.kind {
            TokenKind::Int => Ok(self.take_literal(LiteralKind::Int)),
            TokenKind::Float => Ok(self.take_literal(LiteralKind::Float)),
            TokenKind::Str => Ok(self.take_literal(LiteralKind::Str)),
            TokenKind::Blob => Ok(self.take_literal(LiteralKind::Blob)),
            TokenKind::KwNull => Ok(self.keyword_literal(LiteralKind::Null, "NULL")),
            TokenKind::KwTrue => Ok(self.keyword_literal(LiteralKind::Bool, "TRUE")),
            TokenKind::KwFalse => Ok(self.keyword_literal(LiteralKind::Bool, "FALSE")),
            TokenKind::KwDefault => Ok(self.keyword_literal(LiteralKind::Null, "DEFAULT")),
            TokenKind::Param => self.parse_param(),
            TokenKind::Ident => self.parse_ident_or_func(),
            TokenKind::LParen => self.parse_paren_or_subquery(),
            TokenKind::KwNot => {
                self.advance();
                Ok(Expr::Unary {
                    pos,
                    op: UnaryOp::Not,
                    operand: Box::new(self.parse_expr_prec(prec::NOT)?),
                })
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary {
                    pos,
                    op: UnaryOp::Negate,
                    operand: Box::new(self.parse_expr_prec(prec::UNARY)?),
                })
            }
            TokenKind::BitNot => {
                self.advance();
                Ok(Expr::Unary {
                    pos,
                    op: UnaryOp::BitNot,
                    operand: Box::new(self.parse_expr_prec(prec::UNARY)?),
                })
            }
            TokenKind::KwExists => self.parse_exists(),
            TokenKind::KwCase => self.parse_case(),
            TokenKind::KwCast => self.parse_cast(),
            TokenKind::KwInterval => self.parse_interval(),
            TokenKind::KwExtract => self.parse_extract(),
            TokenKind::KwTrim => self.parse_trim(),
            TokenKind::KwSubstring => self.parse_substring(),
            TokenKind::KwPosition => self.parse_position(),
            TokenKind::KwArray => self.parse_array(),
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Star(StarExpr {
                    pos,
                    qualifier: None,
                }))
            }
            k if k.is_keyword() => self.parse_ident_or_func(),
            _ => Err(self.err_msg(format!(
                "unexpected token {} in expression",
                self.cur.kind
            ))),
        }
    }

    fn take_literal(&mut self, kind: LiteralKind) -> Expr {
        let lit = Literal {
            pos: self.cur.pos,
            kind,
            text: self.cur.text.to_string(),
        };
        self.advance();
        Expr::Literal(lit)
    }

    /// NULL / TRUE / FALSE / DEFAULT keep a canonical uppercase spelling.
    fn keyword_literal(&mut self, kind: LiteralKind, text: &str) -> Expr {
        let lit = Literal {
            pos: self.cur.pos,
            kind,
            text: text.to_owned(),
        };
        self.advance();
        Expr::Literal(lit)
    }

    fn parse_param(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        let text = self.cur.text.to_string();
        let kind = match text.as_bytes().first() {
            Some(b'$') => ParamKind::Numbered(text[1..].parse().unwrap_or(0)),
            Some(b':') => ParamKind::Colon(text[1..].to_owned()),
            Some(b'@') => ParamKind::At(text[1..].to_owned()),
            _ => ParamKind::Anonymous,
        };
        self.advance();
        Ok(Expr::Param(Param { pos, kind }))
    }

    /// An identifier: a column reference (possibly dotted, possibly ending
    /// in a qualified star) or a function call.
    fn parse_ident_or_func(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        let name = self.cur.text.to_string();
        self.advance();

        if self.cur_is(TokenKind::LParen) {
            return self.parse_func_call(pos, name);
        }

        let mut parts = omnisql_ast::NameParts::new();
        parts.push(name);

        while self.eat(TokenKind::Dot) {
            // A dotted trail ending in `*` is a qualified star; the star
            // keeps only its immediate qualifier.
            if self.cur_is(TokenKind::Star) {
                self.advance();
                let qualifier = parts.last().cloned().unwrap_or_default();
                return Ok(Expr::Star(StarExpr {
                    pos,
                    qualifier: Some(qualifier),
                }));
            }
            if !self.cur_is_ident_like() {
                return Err(self.err_expected("identifier after '.'"));
            }
            parts.push(self.cur.text.to_string());
            self.advance();
        }

        Ok(Expr::Column(ColumnRef { pos, parts }))
    }

    fn parse_func_call(&mut self, pos: omnisql_ast::Pos, name: String) -> Result<Expr, ParseError> {
        self.advance(); // (

        let mut func = FuncExpr {
            pos,
            name,
            distinct: false,
            args: Vec::new(),
            filter: None,
            over: None,
        };

        if self.eat(TokenKind::KwDistinct) {
            func.distinct = true;
        }

        if !self.cur_is(TokenKind::RParen) {
            if self.cur_is(TokenKind::Star) {
                // COUNT(*)
                func.args.push(Expr::Star(StarExpr {
                    pos: self.cur.pos,
                    qualifier: None,
                }));
                self.advance();
            } else {
                loop {
                    func.args.push(self.parse_expr()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        if self.eat(TokenKind::KwFilter) {
            self.expect(TokenKind::LParen)?;
            self.expect(TokenKind::KwWhere)?;
            func.filter = Some(self.parse_expr()?);
            self.expect(TokenKind::RParen)?;
        }

        if self.eat(TokenKind::KwOver) {
            func.over = Some(self.parse_window_spec()?);
        }

        Ok(Expr::Func(Box::new(func)))
    }

    /// Window specification: a bare window name or a parenthesized body.
    /// The OVER (or AS, in a WINDOW clause) has already been consumed.
    pub(crate) fn parse_window_spec(&mut self) -> Result<WindowSpec, ParseError> {
        let pos = self.cur.pos;
        let mut spec = WindowSpec {
            pos,
            ..WindowSpec::default()
        };

        if self.cur_is(TokenKind::Ident) {
            spec.name = Some(self.cur.text.to_string());
            self.advance();
            return Ok(spec);
        }

        self.expect(TokenKind::LParen)?;

        // Optional base window name.
        if self.cur_is(TokenKind::Ident) && self.peek_kind() != TokenKind::KwBy {
            spec.name = Some(self.cur.text.to_string());
            self.advance();
        }

        if self.eat(TokenKind::KwPartition) {
            self.expect(TokenKind::KwBy)?;
            spec.partition_by = self.parse_expr_list()?;
        }

        if self.cur_is(TokenKind::KwOrder) {
            spec.order_by = self.parse_order_by()?;
        }

        if matches!(
            self.cur.kind,
            TokenKind::KwRows | TokenKind::KwRange | TokenKind::KwGroups
        ) {
            spec.frame = Some(self.parse_window_frame()?);
        }

        self.expect(TokenKind::RParen)?;
        Ok(spec)
    }

    fn parse_window_frame(&mut self) -> Result<WindowFrame, ParseError> {
        let kind = match self.cur.kind {
            TokenKind::KwRows => FrameKind::Rows,
            TokenKind::KwRange => FrameKind::Range,
            _ => FrameKind::Groups,
        };
        self.advance();

        if self.eat(TokenKind::KwBetween) {
            let start = self.parse_frame_bound()?;
            self.expect(TokenKind::KwAnd)?;
            let end = self.parse_frame_bound()?;
            Ok(WindowFrame {
                kind,
                start,
                end: Some(end),
            })
        } else {
            Ok(WindowFrame {
                kind,
                start: self.parse_frame_bound()?,
                end: None,
            })
        }
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound, ParseError> {
        if self.eat(TokenKind::KwCurrent) {
            self.expect(TokenKind::KwRow)?;
            return Ok(FrameBound::CurrentRow);
        }
        if self.eat(TokenKind::KwUnbounded) {
            if self.eat(TokenKind::KwPreceding) {
                return Ok(FrameBound::UnboundedPreceding);
            }
            if self.eat(TokenKind::KwFollowing) {
                return Ok(FrameBound::UnboundedFollowing);
            }
            return Err(self.err_expected("PRECEDING or FOLLOWING after UNBOUNDED"));
        }
        let offset = self.parse_expr()?;
        if self.eat(TokenKind::KwPreceding) {
            Ok(FrameBound::Preceding(offset))
        } else if self.eat(TokenKind::KwFollowing) {
            Ok(FrameBound::Following(offset))
        } else {
            Err(self.err_expected("PRECEDING or FOLLOWING"))
        }
    }

    /// `(` starts either a subquery or a parenthesized expression; one
    /// peek at SELECT / WITH decides which.
    fn parse_paren_or_subquery(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // (

        if matches!(self.cur.kind, TokenKind::KwSelect | TokenKind::KwWith) {
            let query = self.parse_select_or_with()?;
            self.expect(TokenKind::RParen)?;
            return Ok(Expr::Subquery(Box::new(Subquery { pos, query })));
        }

        let expr = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Paren {
            pos,
            expr: Box::new(expr),
        })
    }

    fn parse_select_or_with(&mut self) -> Result<omnisql_ast::Statement, ParseError> {
        self.parse_statement()
    }

    fn parse_exists(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // EXISTS
        self.expect(TokenKind::LParen)?;
        if !matches!(self.cur.kind, TokenKind::KwSelect | TokenKind::KwWith) {
            return Err(self.err_expected("SELECT in EXISTS subquery"));
        }
        let query = self.parse_select_or_with()?;
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Exists {
            pos,
            not: false,
            subquery: Box::new(Subquery { pos, query }),
        })
    }

    fn parse_case(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // CASE

        let operand = if self.cur_is(TokenKind::KwWhen) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        let mut whens = Vec::new();
        while self.eat(TokenKind::KwWhen) {
            let cond = self.parse_expr()?;
            self.expect(TokenKind::KwThen)?;
            let result = self.parse_expr()?;
            whens.push(When { cond, result });
        }
        if whens.is_empty() {
            return Err(self.err_expected("WHEN clause in CASE expression"));
        }

        let else_expr = if self.eat(TokenKind::KwElse) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(TokenKind::KwEnd)?;
        Ok(Expr::Case(Box::new(CaseExpr {
            pos,
            operand,
            whens,
            else_expr,
        })))
    }

    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // CAST
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::KwAs)?;
        let data_type = self.parse_data_type()?;
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Cast {
            pos,
            expr: Box::new(expr),
            data_type,
        })
    }

    /// PostgreSQL `expr::type`.
    fn parse_pg_cast(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let pos = left.pos();
        self.advance(); // ::
        let data_type = self.parse_data_type()?;
        Ok(Expr::Cast {
            pos,
            expr: Box::new(left),
            data_type,
        })
    }

    fn parse_interval(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // INTERVAL
        let value = self.parse_expr()?;
        let unit = if is_interval_unit(self.cur.kind) {
            let u = self.cur.text.to_string();
            self.advance();
            Some(u)
        } else {
            None
        };
        Ok(Expr::Interval {
            pos,
            value: Box::new(value),
            unit,
        })
    }

    fn parse_extract(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // EXTRACT
        self.expect(TokenKind::LParen)?;
        if !self.cur_is_ident_like() {
            return Err(self.err_expected("datetime field"));
        }
        let field = self.cur.text.to_string();
        self.advance();
        self.expect(TokenKind::KwFrom)?;
        let source = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Extract {
            pos,
            field,
            source: Box::new(source),
        })
    }

    fn parse_trim(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // TRIM
        self.expect(TokenKind::LParen)?;

        let direction = match self.cur.kind {
            TokenKind::KwLeading => {
                self.advance();
                TrimDirection::Leading
            }
            TokenKind::KwTrailing => {
                self.advance();
                TrimDirection::Trailing
            }
            TokenKind::KwBoth => {
                self.advance();
                TrimDirection::Both
            }
            _ => TrimDirection::Both,
        };

        let (chars, expr) = if self.eat(TokenKind::KwFrom) {
            // TRIM(LEADING FROM x)
            (None, self.parse_expr()?)
        } else {
            let first = self.parse_expr()?;
            if self.eat(TokenKind::KwFrom) {
                (Some(first), self.parse_expr()?)
            } else {
                (None, first)
            }
        };

        self.expect(TokenKind::RParen)?;
        Ok(Expr::Trim(Box::new(TrimExpr {
            pos,
            direction,
            chars,
            expr,
        })))
    }

    fn parse_substring(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // SUBSTRING
        self.expect(TokenKind::LParen)?;

        let mut sub = SubstringExpr {
            pos,
            expr: self.parse_expr()?,
            from: None,
            for_length: None,
        };

        if self.eat(TokenKind::KwFrom) || self.eat(TokenKind::Comma) {
            sub.from = Some(self.parse_expr()?);
        }
        if self.eat(TokenKind::KwFor) || self.eat(TokenKind::Comma) {
            sub.for_length = Some(self.parse_expr()?);
        }

        self.expect(TokenKind::RParen)?;
        Ok(Expr::Substring(Box::new(sub)))
    }

    fn parse_position(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // POSITION
        self.expect(TokenKind::LParen)?;
        // Parse above the comparison level so IN stays the separator.
        let needle = self.parse_expr_prec(prec::COMPARISON + 1)?;
        self.expect(TokenKind::KwIn)?;
        let haystack = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Position {
            pos,
            needle: Box::new(needle),
            haystack: Box::new(haystack),
        })
    }

    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur.pos;
        self.advance(); // ARRAY
        self.expect(TokenKind::LBracket)?;

        let mut elements = Vec::new();
        if !self.cur_is(TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::Array { pos, elements })
    }

    // -----------------------------------------------------------------------
    // Postfix and n-ary comparison operators
    // -----------------------------------------------------------------------

    fn parse_subscript(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let pos = left.pos();
        self.advance(); // [
        let index = self.parse_expr()?;
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::Subscript {
            pos,
            expr: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_collate(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let pos = left.pos();
        self.advance(); // COLLATE
        if !matches!(self.cur.kind, TokenKind::Ident | TokenKind::Str) {
            return Err(self.err_expected("collation name"));
        }
        let collation = self.cur.text.to_string();
        self.advance();
        Ok(Expr::Collate {
            pos,
            expr: Box::new(left),
            collation,
        })
    }

    fn parse_is(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let pos = left.pos();
        self.advance(); // IS
        let not = self.eat(TokenKind::KwNot);
        let test = match self.cur.kind {
            TokenKind::KwNull => IsTest::Null,
            TokenKind::KwTrue => IsTest::True,
            TokenKind::KwFalse => IsTest::False,
            TokenKind::KwUnknown => IsTest::Unknown,
            _ => return Err(self.err_expected("NULL, TRUE, FALSE, or UNKNOWN after IS")),
        };
        self.advance();
        Ok(Expr::Is {
            pos,
            expr: Box::new(left),
            not,
            test,
        })
    }

    fn parse_in(&mut self, left: Expr, not: bool) -> Result<Expr, ParseError> {
        let pos = left.pos();
        self.advance(); // IN
        self.expect(TokenKind::LParen)?;

        let set = if matches!(self.cur.kind, TokenKind::KwSelect | TokenKind::KwWith) {
            InSet::Subquery(Box::new(self.parse_select_or_with()?))
        } else {
            let mut values = Vec::new();
            if !self.cur_is(TokenKind::RParen) {
                loop {
                    values.push(self.parse_expr()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            InSet::List(values)
        };

        self.expect(TokenKind::RParen)?;
        Ok(Expr::In(Box::new(InExpr {
            pos,
            expr: left,
            not,
            set,
        })))
    }

    fn parse_between(&mut self, left: Expr, not: bool) -> Result<Expr, ParseError> {
        let pos = left.pos();
        self.advance(); // BETWEEN
        if !self.eat(TokenKind::KwSymmetric) {
            let _ = self.eat(TokenKind::KwAsymmetric);
        }

        // Both bounds parse above the comparison level so the AND between
        // them is the separator, not a conjunction.
        let low = self.parse_expr_prec(prec::COMPARISON + 1)?;
        self.expect(TokenKind::KwAnd)?;
        let high = self.parse_expr_prec(prec::COMPARISON + 1)?;

        Ok(Expr::Between(Box::new(BetweenExpr {
            pos,
            expr: left,
            not,
            low,
            high,
        })))
    }

    fn parse_like(&mut self, left: Expr, not: bool) -> Result<Expr, ParseError> {
        let pos = left.pos();
        let ilike = self.cur_is(TokenKind::KwIlike);
        self.advance(); // LIKE or ILIKE

        let pattern = self.parse_expr_prec(prec::COMPARISON + 1)?;
        let escape = if self.eat(TokenKind::KwEscape) {
            Some(self.parse_expr_prec(prec::COMPARISON + 1)?)
        } else {
            None
        };

        Ok(Expr::Like(Box::new(LikeExpr {
            pos,
            expr: left,
            pattern,
            not,
            ilike,
            escape,
        })))
    }

    /// `SIMILAR TO` normalizes onto the LIKE node.
    fn parse_similar(&mut self, left: Expr, not: bool) -> Result<Expr, ParseError> {
        let pos = left.pos();
        self.advance(); // SIMILAR
        self.expect(TokenKind::KwTo)?;

        let pattern = self.parse_expr_prec(prec::COMPARISON + 1)?;
        let escape = if self.eat(TokenKind::KwEscape) {
            Some(self.parse_expr_prec(prec::COMPARISON + 1)?)
        } else {
            None
        };

        Ok(Expr::Like(Box::new(LikeExpr {
            pos,
            expr: left,
            pattern,
            not,
            ilike: false,
            escape,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(sql: &str) -> Expr {
        let mut p = Parser::new(sql);
        match p.parse_expr() {
            Ok(e) => e,
            Err(err) => panic!("parse error for `{sql}`: {err}"),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        // 1 + 2 * 3 → 1 + (2 * 3)
        let expr = parse("1 + 2 * 3");
        let Expr::Binary {
            op, left, right, ..
        } = &expr
        else {
            panic!("expected binary, got {expr:?}");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(left.as_ref(), Expr::Literal(_)));
        assert!(matches!(
            right.as_ref(),
            Expr::Binary {
                op: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a or b and c");
        let Expr::Binary { op, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Or);
        assert!(matches!(
            right.as_ref(),
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_left_associativity() {
        // a - b - c → (a - b) - c
        let expr = parse("a - b - c");
        let Expr::Binary { op, left, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Subtract);
        assert!(matches!(
            left.as_ref(),
            Expr::Binary {
                op: BinaryOp::Subtract,
                ..
            }
        ));

        // a = b = c → (a = b) = c
        let expr = parse("a = b = c");
        let Expr::Binary { op, left, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Eq);
        assert!(matches!(
            left.as_ref(),
            Expr::Binary {
                op: BinaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn test_not_contains_comparison() {
        // NOT x = y → NOT (x = y)
        let expr = parse("not x = y");
        let Expr::Unary {
            op: UnaryOp::Not,
            operand,
            ..
        } = &expr
        else {
            panic!("expected NOT, got {expr:?}");
        };
        assert!(matches!(
            operand.as_ref(),
            Expr::Binary {
                op: BinaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn test_between_does_not_eat_logical_and() {
        // a between 1 and 2 and b → ((a BETWEEN 1 AND 2) AND b)
        let expr = parse("a between 1 and 2 and b");
        let Expr::Binary { op, left, .. } = &expr else {
            panic!("expected AND, got {expr:?}");
        };
        assert_eq!(*op, BinaryOp::And);
        assert!(matches!(left.as_ref(), Expr::Between(_)));
    }

    #[test]
    fn test_not_in_not_like_not_between() {
        assert!(matches!(parse("a not in (1, 2)"), Expr::In(i) if i.not));
        assert!(matches!(parse("a not like 'x'"), Expr::Like(l) if l.not));
        assert!(matches!(parse("a not between 1 and 2"), Expr::Between(b) if b.not));
    }

    #[test]
    fn test_is_family() {
        assert!(matches!(
            parse("a is null"),
            Expr::Is {
                not: false,
                test: IsTest::Null,
                ..
            }
        ));
        assert!(matches!(
            parse("a is not true"),
            Expr::Is {
                not: true,
                test: IsTest::True,
                ..
            }
        ));
    }

    #[test]
    fn test_like_with_escape_and_ilike() {
        let Expr::Like(like) = parse("a like '%x%' escape '#'") else {
            panic!("expected LIKE");
        };
        assert!(like.escape.is_some());
        assert!(!like.ilike);

        let Expr::Like(like) = parse("a ilike 'x'") else {
            panic!("expected ILIKE");
        };
        assert!(like.ilike);
    }

    #[test]
    fn test_similar_to_normalizes_to_like() {
        let Expr::Like(like) = parse("a similar to 'x'") else {
            panic!("expected LIKE node");
        };
        assert!(!like.ilike && !like.not);
    }

    #[test]
    fn test_in_subquery_and_list() {
        let Expr::In(i) = parse("a in (1, 2, 3)") else {
            panic!("expected IN");
        };
        assert!(matches!(&i.set, InSet::List(v) if v.len() == 3));

        let Expr::In(i) = parse("a in (select b from t)") else {
            panic!("expected IN");
        };
        assert!(matches!(&i.set, InSet::Subquery(_)));
    }

    #[test]
    fn test_qualified_column_parts() {
        let Expr::Column(col) = parse("a.b.c.d") else {
            panic!("expected column");
        };
        assert_eq!(col.parts.len(), 4);
        assert_eq!(col.name(), "d");
        assert_eq!(col.table(), Some("c"));
        assert_eq!(col.schema(), Some("b"));
        assert_eq!(col.catalog(), Some("a"));
    }

    #[test]
    fn test_qualified_star_keeps_immediate_qualifier() {
        let Expr::Star(star) = parse("a.b.*") else {
            panic!("expected star");
        };
        assert_eq!(star.qualifier.as_deref(), Some("b"));
    }

    #[test]
    fn test_case_forms() {
        let Expr::Case(c) = parse("case when a = 1 then 'x' else 'y' end") else {
            panic!("expected CASE");
        };
        assert!(c.operand.is_none());
        assert_eq!(c.whens.len(), 1);
        assert!(c.else_expr.is_some());

        let Expr::Case(c) = parse("case a when 1 then 'x' when 2 then 'y' end") else {
            panic!("expected CASE");
        };
        assert!(c.operand.is_some());
        assert_eq!(c.whens.len(), 2);
    }

    #[test]
    fn test_case_requires_when() {
        let mut p = Parser::new("case a end");
        assert!(p.parse_expr().is_err());
    }

    #[test]
    fn test_cast_and_pg_cast() {
        let Expr::Cast { data_type, .. } = parse("cast(a as varchar(10))") else {
            panic!("expected CAST");
        };
        assert_eq!(data_type.length, Some(10));

        let Expr::Cast { data_type, .. } = parse("a::int") else {
            panic!("expected cast from ::");
        };
        assert_eq!(data_type.name, "int");
    }

    #[test]
    fn test_double_precision_type() {
        let Expr::Cast { data_type, .. } = parse("cast(a as double precision)") else {
            panic!("expected CAST");
        };
        assert_eq!(data_type.name, "double precision");
    }

    #[test]
    fn test_function_calls() {
        let Expr::Func(f) = parse("count(*)") else {
            panic!("expected function");
        };
        assert_eq!(f.name, "count");
        assert!(matches!(f.args[0], Expr::Star(_)));

        let Expr::Func(f) = parse("count(distinct a)") else {
            panic!("expected function");
        };
        assert!(f.distinct);

        let Expr::Func(f) = parse("sum(a) filter (where a > 0)") else {
            panic!("expected function");
        };
        assert!(f.filter.is_some());
    }

    #[test]
    fn test_window_function() {
        let Expr::Func(f) =
            parse("row_number() over (partition by a order by b desc rows unbounded preceding)")
        else {
            panic!("expected function");
        };
        let over = f.over.expect("window spec");
        assert_eq!(over.partition_by.len(), 1);
        assert_eq!(over.order_by.len(), 1);
        let frame = over.frame.expect("frame");
        assert_eq!(frame.kind, FrameKind::Rows);
        assert!(matches!(frame.start, FrameBound::UnboundedPreceding));

        let Expr::Func(f) = parse("rank() over w") else {
            panic!("expected function");
        };
        assert!(f.over.expect("spec").is_named_ref());
    }

    #[test]
    fn test_frame_between_bounds() {
        let Expr::Func(f) =
            parse("sum(x) over (rows between 2 preceding and current row)")
        else {
            panic!("expected function");
        };
        let frame = f.over.expect("spec").frame.expect("frame");
        assert!(matches!(frame.start, FrameBound::Preceding(_)));
        assert!(matches!(frame.end, Some(FrameBound::CurrentRow)));
    }

    #[test]
    fn test_exists_subquery() {
        assert!(matches!(
            parse("exists (select 1 from t)"),
            Expr::Exists { not: false, .. }
        ));
    }

    #[test]
    fn test_special_primaries() {
        assert!(matches!(parse("interval 1 day"), Expr::Interval { unit: Some(_), .. }));
        assert!(matches!(parse("extract(year from d)"), Expr::Extract { .. }));
        assert!(matches!(parse("trim(leading 'x' from a)"), Expr::Trim(_)));
        assert!(matches!(parse("trim(a)"), Expr::Trim(_)));
        assert!(matches!(
            parse("substring(a from 1 for 2)"),
            Expr::Substring(_)
        ));
        assert!(matches!(parse("substring(a, 1, 2)"), Expr::Substring(_)));
        assert!(matches!(parse("position('x' in a)"), Expr::Position { .. }));
    }

    #[test]
    fn test_array_and_subscript() {
        let Expr::Array { elements, .. } = parse("array[ 1, 2, 3 ]") else {
            panic!("expected array");
        };
        assert_eq!(elements.len(), 3);

        let Expr::Subscript { .. } = parse("arr[ 1 ]") else {
            panic!("expected subscript");
        };
    }

    #[test]
    fn test_collate_postfix() {
        let Expr::Collate { collation, .. } = parse("a collate nocase") else {
            panic!("expected COLLATE");
        };
        assert_eq!(collation, "nocase");
    }

    #[test]
    fn test_params() {
        assert!(matches!(
            parse("?"),
            Expr::Param(Param {
                kind: ParamKind::Anonymous,
                ..
            })
        ));
        assert!(matches!(
            parse("$3"),
            Expr::Param(Param {
                kind: ParamKind::Numbered(3),
                ..
            })
        ));
        let Expr::Param(p) = parse(":name") else {
            panic!("expected param");
        };
        assert_eq!(p.kind, ParamKind::Colon("name".to_owned()));
        let Expr::Param(p) = parse("@v") else {
            panic!("expected param");
        };
        assert_eq!(p.kind, ParamKind::At("v".to_owned()));
    }

    #[test]
    fn test_double_unary_minus() {
        let Expr::Unary {
            op: UnaryOp::Negate,
            operand,
            ..
        } = parse("- -1")
        else {
            panic!("expected unary");
        };
        assert!(matches!(
            operand.as_ref(),
            Expr::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
    }

    #[test]
    fn test_keyword_as_column_name() {
        let Expr::Column(col) = parse("count") else {
            panic!("expected column");
        };
        assert_eq!(col.name(), "count");
    }

    #[test]
    fn test_concat_operator() {
        let Expr::Binary { op, .. } = parse("a || b") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Concat);
    }

    #[test]
    fn test_xor_level() {
        // a or b xor c → a OR (b XOR c)
        let Expr::Binary { op, right, .. } = parse("a or b xor c") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(
            right.as_ref(),
            Expr::Binary {
                op: BinaryOp::Xor,
                ..
            }
        ));
    }
}
