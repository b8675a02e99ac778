//! AST traversal and rewriting.
//!
//! [`walk`] visits nodes depth-first in pre-order; the visitor returns
//! `false` to skip a node's children. [`rewrite`] rebuilds the tree in
//! post-order, replacing each node with whatever the [`Rewriter`] returns.

use crate::{
    AlterAction, ColumnConstraintKind, ColumnRef, ConflictAction, Expr, FrameBound, IndexKey,
    InsertSource, InSet, SelectItem, Statement, TableConstraintKind, TableExpr, TableRef,
    WindowSpec,
};

/// A borrowed reference to any visitable node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Statement(&'a Statement),
    SelectItem(&'a SelectItem),
    Expr(&'a Expr),
    TableExpr(&'a TableExpr),
    TableRef(&'a TableRef),
    ColumnRef(&'a ColumnRef),
}

/// Walk a statement tree depth-first in pre-order.
///
/// The visitor is invoked once per node; returning `false` prunes that
/// node's children.
pub fn walk<F>(stmt: &Statement, visit: &mut F)
where
    F: FnMut(Node<'_>) -> bool,
{
    walk_statement(stmt, visit);
}

fn walk_statement<F>(stmt: &Statement, v: &mut F)
where
    F: FnMut(Node<'_>) -> bool,
{
    if !v(Node::Statement(stmt)) {
        return;
    }
    match stmt {
        Statement::Select(s) => {
            if let Some(with) = &s.with {
                for cte in &with.ctes {
                    walk_statement(&cte.query, v);
                }
            }
            for item in &s.columns {
                walk_select_item(item, v);
            }
            if let Some(from) = &s.from {
                walk_table_expr(from, v);
            }
            if let Some(w) = &s.where_clause {
                walk_expr(w, v);
            }
            for e in &s.group_by {
                walk_expr(e, v);
            }
            if let Some(h) = &s.having {
                walk_expr(h, v);
            }
            for def in &s.windows {
                walk_window_spec(&def.spec, v);
            }
            for term in &s.order_by {
                walk_expr(&term.expr, v);
            }
            if let Some(limit) = &s.limit {
                if let Some(c) = &limit.count {
                    walk_expr(c, v);
                }
                if let Some(o) = &limit.offset {
                    walk_expr(o, v);
                }
            }
        }
        Statement::Insert(s) => {
            if let Some(with) = &s.with {
                for cte in &with.ctes {
                    walk_statement(&cte.query, v);
                }
            }
            v(Node::TableRef(&s.table));
            for col in &s.columns {
                v(Node::ColumnRef(col));
            }
            match &s.source {
                InsertSource::Values(rows) => {
                    for row in rows {
                        for val in row {
                            walk_expr(val, v);
                        }
                    }
                }
                InsertSource::Select(q) => walk_statement(q, v),
                InsertSource::DefaultValues => {}
            }
            for a in &s.on_duplicate {
                v(Node::ColumnRef(&a.column));
                walk_expr(&a.value, v);
            }
            if let Some(c) = &s.on_conflict {
                if let Some(w) = &c.where_clause {
                    walk_expr(w, v);
                }
                if let ConflictAction::DoUpdate(assignments) = &c.action {
                    for a in assignments {
                        v(Node::ColumnRef(&a.column));
                        walk_expr(&a.value, v);
                    }
                }
            }
            for item in &s.returning {
                walk_select_item(item, v);
            }
        }
        Statement::Update(s) => {
            if let Some(with) = &s.with {
                for cte in &with.ctes {
                    walk_statement(&cte.query, v);
                }
            }
            walk_table_expr(&s.table, v);
            for a in &s.set {
                v(Node::ColumnRef(&a.column));
                walk_expr(&a.value, v);
            }
            if let Some(from) = &s.from {
                walk_table_expr(from, v);
            }
            if let Some(w) = &s.where_clause {
                walk_expr(w, v);
            }
            for term in &s.order_by {
                walk_expr(&term.expr, v);
            }
            if let Some(limit) = &s.limit {
                if let Some(c) = &limit.count {
                    walk_expr(c, v);
                }
                if let Some(o) = &limit.offset {
                    walk_expr(o, v);
                }
            }
            for item in &s.returning {
                walk_select_item(item, v);
            }
        }
        Statement::Delete(s) => {
            if let Some(with) = &s.with {
                for cte in &with.ctes {
                    walk_statement(&cte.query, v);
                }
            }
            walk_table_expr(&s.table, v);
            if let Some(using) = &s.using {
                walk_table_expr(using, v);
            }
            if let Some(w) = &s.where_clause {
                walk_expr(w, v);
            }
            for term in &s.order_by {
                walk_expr(&term.expr, v);
            }
            for item in &s.returning {
                walk_select_item(item, v);
            }
        }
        Statement::CreateTable(s) => {
            v(Node::TableRef(&s.table));
            for col in &s.columns {
                for cons in &col.constraints {
                    match &cons.kind {
                        ColumnConstraintKind::Default(e) | ColumnConstraintKind::Check(e) => {
                            walk_expr(e, v);
                        }
                        ColumnConstraintKind::Generated { expr, .. } => walk_expr(expr, v),
                        ColumnConstraintKind::References(r) => {
                            v(Node::TableRef(&r.table));
                        }
                        _ => {}
                    }
                }
            }
            for cons in &s.constraints {
                match &cons.kind {
                    TableConstraintKind::Check(e) => walk_expr(e, v),
                    TableConstraintKind::ForeignKey { reference, .. } => {
                        v(Node::TableRef(&reference.table));
                    }
                    _ => {}
                }
            }
            if let Some(q) = &s.as_select {
                walk_statement(q, v);
            }
        }
        Statement::AlterTable(s) => {
            v(Node::TableRef(&s.table));
            for action in &s.actions {
                match action {
                    AlterAction::RenameTable(t) => {
                        v(Node::TableRef(t));
                    }
                    AlterAction::ModifyColumn(m) => {
                        if let Some(e) = &m.set_default {
                            walk_expr(e, v);
                        }
                    }
                    AlterAction::AddConstraint(c) => {
                        if let TableConstraintKind::Check(e) = &c.kind {
                            walk_expr(e, v);
                        }
                    }
                    _ => {}
                }
            }
        }
        Statement::DropTable(s) => {
            for t in &s.tables {
                v(Node::TableRef(t));
            }
        }
        Statement::CreateIndex(s) => {
            v(Node::TableRef(&s.table));
            for col in &s.columns {
                if let IndexKey::Expr(e) = &col.key {
                    walk_expr(e, v);
                }
            }
            if let Some(w) = &s.where_clause {
                walk_expr(w, v);
            }
        }
        Statement::DropIndex(s) => {
            if let Some(t) = &s.table {
                v(Node::TableRef(t));
            }
        }
        Statement::Truncate(s) => {
            for t in &s.tables {
                v(Node::TableRef(t));
            }
        }
        Statement::Explain(s) => walk_statement(&s.stmt, v),
        Statement::SetOp(s) => {
            walk_statement(&s.left, v);
            walk_statement(&s.right, v);
            for term in &s.order_by {
                walk_expr(&term.expr, v);
            }
            if let Some(limit) = &s.limit {
                if let Some(c) = &limit.count {
                    walk_expr(c, v);
                }
                if let Some(o) = &limit.offset {
                    walk_expr(o, v);
                }
            }
        }
        Statement::Values(s) => {
            for row in &s.rows {
                for val in row {
                    walk_expr(val, v);
                }
            }
        }
    }
}

fn walk_select_item<F>(item: &SelectItem, v: &mut F)
where
    F: FnMut(Node<'_>) -> bool,
{
    if !v(Node::SelectItem(item)) {
        return;
    }
    if let SelectItem::Expr(ae) = item {
        walk_expr(&ae.expr, v);
    }
}

fn walk_expr<F>(expr: &Expr, v: &mut F)
where
    F: FnMut(Node<'_>) -> bool,
{
    if !v(Node::Expr(expr)) {
        return;
    }
    match expr {
        Expr::Literal(_) | Expr::Param(_) | Expr::Star(_) => {}
        Expr::Column(c) => {
            v(Node::ColumnRef(c));
        }
        Expr::Binary { left, right, .. } => {
            walk_expr(left, v);
            walk_expr(right, v);
        }
        Expr::Unary { operand, .. } => walk_expr(operand, v),
        Expr::Paren { expr, .. } => walk_expr(expr, v),
        Expr::Func(f) => {
            for arg in &f.args {
                walk_expr(arg, v);
            }
            if let Some(filter) = &f.filter {
                walk_expr(filter, v);
            }
            if let Some(over) = &f.over {
                walk_window_spec(over, v);
            }
        }
        Expr::Case(c) => {
            if let Some(op) = &c.operand {
                walk_expr(op, v);
            }
            for w in &c.whens {
                walk_expr(&w.cond, v);
                walk_expr(&w.result, v);
            }
            if let Some(e) = &c.else_expr {
                walk_expr(e, v);
            }
        }
        Expr::Cast { expr, .. } => walk_expr(expr, v),
        Expr::In(i) => {
            walk_expr(&i.expr, v);
            match &i.set {
                InSet::List(items) => {
                    for item in items {
                        walk_expr(item, v);
                    }
                }
                InSet::Subquery(q) => walk_statement(q, v),
            }
        }
        Expr::Between(b) => {
            walk_expr(&b.expr, v);
            walk_expr(&b.low, v);
            walk_expr(&b.high, v);
        }
        Expr::Like(l) => {
            walk_expr(&l.expr, v);
            walk_expr(&l.pattern, v);
            if let Some(esc) = &l.escape {
                walk_expr(esc, v);
            }
        }
        Expr::Is { expr, .. } => walk_expr(expr, v),
        Expr::Subquery(s) => walk_statement(&s.query, v),
        Expr::Exists { subquery, .. } => walk_statement(&subquery.query, v),
        Expr::Interval { value, .. } => walk_expr(value, v),
        Expr::Extract { source, .. } => walk_expr(source, v),
        Expr::Trim(t) => {
            if let Some(chars) = &t.chars {
                walk_expr(chars, v);
            }
            walk_expr(&t.expr, v);
        }
        Expr::Substring(s) => {
            walk_expr(&s.expr, v);
            if let Some(from) = &s.from {
                walk_expr(from, v);
            }
            if let Some(len) = &s.for_length {
                walk_expr(len, v);
            }
        }
        Expr::Position {
            needle, haystack, ..
        } => {
            walk_expr(needle, v);
            walk_expr(haystack, v);
        }
        Expr::Array { elements, .. } => {
            for e in elements {
                walk_expr(e, v);
            }
        }
        Expr::Subscript { expr, index, .. } => {
            walk_expr(expr, v);
            walk_expr(index, v);
        }
        Expr::Collate { expr, .. } => walk_expr(expr, v),
    }
}

fn walk_table_expr<F>(te: &TableExpr, v: &mut F)
where
    F: FnMut(Node<'_>) -> bool,
{
    if !v(Node::TableExpr(te)) {
        return;
    }
    match te {
        TableExpr::Table(t) => {
            v(Node::TableRef(t));
        }
        TableExpr::Aliased(a) => walk_table_expr(&a.expr, v),
        TableExpr::Join(j) => {
            walk_table_expr(&j.left, v);
            walk_table_expr(&j.right, v);
            if let Some(on) = &j.on {
                walk_expr(on, v);
            }
        }
        TableExpr::Paren(p) => walk_table_expr(&p.expr, v),
        TableExpr::Subquery(s) => walk_statement(&s.query, v),
        TableExpr::Values(vals) => {
            for row in &vals.rows {
                for val in row {
                    walk_expr(val, v);
                }
            }
        }
        TableExpr::List(l) => {
            for t in &l.tables {
                walk_table_expr(t, v);
            }
        }
    }
}

fn walk_window_spec<F>(spec: &WindowSpec, v: &mut F)
where
    F: FnMut(Node<'_>) -> bool,
{
    for e in &spec.partition_by {
        walk_expr(e, v);
    }
    for term in &spec.order_by {
        walk_expr(&term.expr, v);
    }
    if let Some(frame) = &spec.frame {
        if let FrameBound::Preceding(e) | FrameBound::Following(e) = &frame.start {
            walk_expr(e, v);
        }
        if let Some(FrameBound::Preceding(e) | FrameBound::Following(e)) = &frame.end {
            walk_expr(e, v);
        }
    }
}

// ---------------------------------------------------------------------------
// Rewriting
// ---------------------------------------------------------------------------

/// Node replacement hooks for [`rewrite`].
///
/// Every method defaults to the identity, so implementors override only the
/// node categories they care about. Hooks run post-order: a node's children
/// have already been rewritten when its hook fires.
pub trait Rewriter {
    fn rewrite_statement(&mut self, s: Statement) -> Statement {
        s
    }
    fn rewrite_select_item(&mut self, i: SelectItem) -> SelectItem {
        i
    }
    fn rewrite_expr(&mut self, e: Expr) -> Expr {
        e
    }
    fn rewrite_table_expr(&mut self, t: TableExpr) -> TableExpr {
        t
    }
    fn rewrite_table_ref(&mut self, t: TableRef) -> TableRef {
        t
    }
    fn rewrite_column_ref(&mut self, c: ColumnRef) -> ColumnRef {
        c
    }
}

/// Rewrite a statement tree bottom-up.
#[must_use]
pub fn rewrite<R: Rewriter>(stmt: Statement, r: &mut R) -> Statement {
    rewrite_statement(stmt, r)
}

fn rewrite_statement<R: Rewriter>(stmt: Statement, r: &mut R) -> Statement {
    let stmt = match stmt {
        Statement::Select(mut s) => {
            if let Some(with) = &mut s.with {
                for cte in &mut with.ctes {
                    *cte.query = rewrite_statement(std::mem::replace(
                        &mut *cte.query,
                        placeholder_statement(),
                    ), r);
                }
            }
            s.columns = s
                .columns
                .into_iter()
                .map(|i| rewrite_select_item(i, r))
                .collect();
            s.from = s.from.map(|f| rewrite_table_expr(f, r));
            s.where_clause = s.where_clause.map(|e| rewrite_expr(e, r));
            s.group_by = s.group_by.into_iter().map(|e| rewrite_expr(e, r)).collect();
            s.having = s.having.map(|e| rewrite_expr(e, r));
            for def in &mut s.windows {
                rewrite_window_spec(&mut def.spec, r);
            }
            for term in &mut s.order_by {
                term.expr = rewrite_expr(std::mem::replace(&mut term.expr, placeholder_expr()), r);
            }
            if let Some(limit) = &mut s.limit {
                limit.count = limit.count.take().map(|e| rewrite_expr(e, r));
                limit.offset = limit.offset.take().map(|e| rewrite_expr(e, r));
            }
            Statement::Select(s)
        }
        Statement::Insert(mut s) => {
            if let Some(with) = &mut s.with {
                for cte in &mut with.ctes {
                    *cte.query = rewrite_statement(std::mem::replace(
                        &mut *cte.query,
                        placeholder_statement(),
                    ), r);
                }
            }
            s.table = r.rewrite_table_ref(s.table);
            s.columns = s
                .columns
                .into_iter()
                .map(|c| r.rewrite_column_ref(c))
                .collect();
            s.source = match s.source {
                InsertSource::Values(rows) => InsertSource::Values(
                    rows.into_iter()
                        .map(|row| row.into_iter().map(|e| rewrite_expr(e, r)).collect())
                        .collect(),
                ),
                InsertSource::Select(q) => {
                    InsertSource::Select(Box::new(rewrite_statement(*q, r)))
                }
                InsertSource::DefaultValues => InsertSource::DefaultValues,
            };
            for a in &mut s.on_duplicate {
                rewrite_assignment(a, r);
            }
            if let Some(c) = &mut s.on_conflict {
                c.where_clause = c.where_clause.take().map(|e| rewrite_expr(e, r));
                if let ConflictAction::DoUpdate(assignments) = &mut c.action {
                    for a in assignments {
                        rewrite_assignment(a, r);
                    }
                }
            }
            s.returning = s
                .returning
                .into_iter()
                .map(|i| rewrite_select_item(i, r))
                .collect();
            Statement::Insert(s)
        }
        Statement::Update(mut s) => {
            if let Some(with) = &mut s.with {
                for cte in &mut with.ctes {
                    *cte.query = rewrite_statement(std::mem::replace(
                        &mut *cte.query,
                        placeholder_statement(),
                    ), r);
                }
            }
            s.table = rewrite_table_expr(s.table, r);
            for a in &mut s.set {
                rewrite_assignment(a, r);
            }
            s.from = s.from.map(|f| rewrite_table_expr(f, r));
            s.where_clause = s.where_clause.map(|e| rewrite_expr(e, r));
            for term in &mut s.order_by {
                term.expr = rewrite_expr(std::mem::replace(&mut term.expr, placeholder_expr()), r);
            }
            if let Some(limit) = &mut s.limit {
                limit.count = limit.count.take().map(|e| rewrite_expr(e, r));
                limit.offset = limit.offset.take().map(|e| rewrite_expr(e, r));
            }
            s.returning = s
                .returning
                .into_iter()
                .map(|i| rewrite_select_item(i, r))
                .collect();
            Statement::Update(s)
        }
        Statement::Delete(mut s) => {
            if let Some(with) = &mut s.with {
                for cte in &mut with.ctes {
                    *cte.query = rewrite_statement(std::mem::replace(
                        &mut *cte.query,
                        placeholder_statement(),
                    ), r);
                }
            }
            s.table = rewrite_table_expr(s.table, r);
            s.using = s.using.map(|u| rewrite_table_expr(u, r));
            s.where_clause = s.where_clause.map(|e| rewrite_expr(e, r));
            for term in &mut s.order_by {
                term.expr = rewrite_expr(std::mem::replace(&mut term.expr, placeholder_expr()), r);
            }
            s.returning = s
                .returning
                .into_iter()
                .map(|i| rewrite_select_item(i, r))
                .collect();
            Statement::Delete(s)
        }
        Statement::CreateTable(mut s) => {
            s.table = r.rewrite_table_ref(s.table);
            for col in &mut s.columns {
                for cons in &mut col.constraints {
                    match &mut cons.kind {
                        ColumnConstraintKind::Default(e) | ColumnConstraintKind::Check(e) => {
                            *e = rewrite_expr(std::mem::replace(e, placeholder_expr()), r);
                        }
                        ColumnConstraintKind::Generated { expr, .. } => {
                            *expr = rewrite_expr(std::mem::replace(expr, placeholder_expr()), r);
                        }
                        _ => {}
                    }
                }
            }
            for cons in &mut s.constraints {
                if let TableConstraintKind::Check(e) = &mut cons.kind {
                    *e = rewrite_expr(std::mem::replace(e, placeholder_expr()), r);
                }
            }
            s.as_select = s
                .as_select
                .map(|q| Box::new(rewrite_statement(*q, r)));
            Statement::CreateTable(s)
        }
        Statement::AlterTable(mut s) => {
            s.table = r.rewrite_table_ref(s.table);
            for action in &mut s.actions {
                match action {
                    AlterAction::ModifyColumn(m) => {
                        m.set_default = m.set_default.take().map(|e| rewrite_expr(e, r));
                    }
                    AlterAction::AddConstraint(c) => {
                        if let TableConstraintKind::Check(e) = &mut c.kind {
                            *e = rewrite_expr(std::mem::replace(e, placeholder_expr()), r);
                        }
                    }
                    _ => {}
                }
            }
            Statement::AlterTable(s)
        }
        Statement::DropTable(mut s) => {
            s.tables = s
                .tables
                .into_iter()
                .map(|t| r.rewrite_table_ref(t))
                .collect();
            Statement::DropTable(s)
        }
        Statement::CreateIndex(mut s) => {
            s.table = r.rewrite_table_ref(s.table);
            for col in &mut s.columns {
                if let IndexKey::Expr(e) = &mut col.key {
                    *e = rewrite_expr(std::mem::replace(e, placeholder_expr()), r);
                }
            }
            s.where_clause = s.where_clause.take().map(|e| rewrite_expr(e, r));
            Statement::CreateIndex(s)
        }
        Statement::DropIndex(mut s) => {
            s.table = s.table.map(|t| r.rewrite_table_ref(t));
            Statement::DropIndex(s)
        }
        Statement::Truncate(mut s) => {
            s.tables = s
                .tables
                .into_iter()
                .map(|t| r.rewrite_table_ref(t))
                .collect();
            Statement::Truncate(s)
        }
        Statement::Explain(mut s) => {
            s.stmt = rewrite_statement(s.stmt, r);
            Statement::Explain(s)
        }
        Statement::SetOp(mut s) => {
            s.left = rewrite_statement(s.left, r);
            s.right = rewrite_statement(s.right, r);
            for term in &mut s.order_by {
                term.expr = rewrite_expr(std::mem::replace(&mut term.expr, placeholder_expr()), r);
            }
            if let Some(limit) = &mut s.limit {
                limit.count = limit.count.take().map(|e| rewrite_expr(e, r));
                limit.offset = limit.offset.take().map(|e| rewrite_expr(e, r));
            }
            Statement::SetOp(s)
        }
        Statement::Values(mut s) => {
            s.rows = s
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(|e| rewrite_expr(e, r)).collect())
                .collect();
            Statement::Values(s)
        }
    };
    r.rewrite_statement(stmt)
}

fn rewrite_assignment<R: Rewriter>(a: &mut crate::Assignment, r: &mut R) {
    a.column = r.rewrite_column_ref(std::mem::take(&mut a.column));
    a.value = rewrite_expr(std::mem::replace(&mut a.value, placeholder_expr()), r);
}

fn rewrite_select_item<R: Rewriter>(item: SelectItem, r: &mut R) -> SelectItem {
    let item = match item {
        SelectItem::Star(s) => SelectItem::Star(s),
        SelectItem::Expr(mut ae) => {
            ae.expr = rewrite_expr(ae.expr, r);
            SelectItem::Expr(ae)
        }
    };
    r.rewrite_select_item(item)
}

fn rewrite_expr<R: Rewriter>(expr: Expr, r: &mut R) -> Expr {
    let expr = match expr {
        e @ (Expr::Literal(_) | Expr::Param(_) | Expr::Star(_)) => e,
        Expr::Column(c) => Expr::Column(r.rewrite_column_ref(c)),
        Expr::Binary {
            pos,
            op,
            left,
            right,
        } => Expr::Binary {
            pos,
            op,
            left: Box::new(rewrite_expr(*left, r)),
            right: Box::new(rewrite_expr(*right, r)),
        },
        Expr::Unary { pos, op, operand } => Expr::Unary {
            pos,
            op,
            operand: Box::new(rewrite_expr(*operand, r)),
        },
        Expr::Paren { pos, expr } => Expr::Paren {
            pos,
            expr: Box::new(rewrite_expr(*expr, r)),
        },
        Expr::Func(mut f) => {
            f.args = f.args.into_iter().map(|a| rewrite_expr(a, r)).collect();
            f.filter = f.filter.map(|e| rewrite_expr(e, r));
            if let Some(over) = &mut f.over {
                rewrite_window_spec(over, r);
            }
            Expr::Func(f)
        }
        Expr::Case(mut c) => {
            c.operand = c.operand.map(|e| rewrite_expr(e, r));
            for w in &mut c.whens {
                w.cond = rewrite_expr(std::mem::replace(&mut w.cond, placeholder_expr()), r);
                w.result = rewrite_expr(std::mem::replace(&mut w.result, placeholder_expr()), r);
            }
            c.else_expr = c.else_expr.map(|e| rewrite_expr(e, r));
            Expr::Case(c)
        }
        Expr::Cast {
            pos,
            expr,
            data_type,
        } => Expr::Cast {
            pos,
            expr: Box::new(rewrite_expr(*expr, r)),
            data_type,
        },
        Expr::In(mut i) => {
            i.expr = rewrite_expr(i.expr, r);
            i.set = match i.set {
                InSet::List(items) => {
                    InSet::List(items.into_iter().map(|e| rewrite_expr(e, r)).collect())
                }
                InSet::Subquery(q) => InSet::Subquery(Box::new(rewrite_statement(*q, r))),
            };
            Expr::In(i)
        }
        Expr::Between(mut b) => {
            b.expr = rewrite_expr(b.expr, r);
            b.low = rewrite_expr(b.low, r);
            b.high = rewrite_expr(b.high, r);
            Expr::Between(b)
        }
        Expr::Like(mut l) => {
            l.expr = rewrite_expr(l.expr, r);
            l.pattern = rewrite_expr(l.pattern, r);
            l.escape = l.escape.map(|e| rewrite_expr(e, r));
            Expr::Like(l)
        }
        Expr::Is {
            pos,
            expr,
            not,
            test,
        } => Expr::Is {
            pos,
            expr: Box::new(rewrite_expr(*expr, r)),
            not,
            test,
        },
        Expr::Subquery(mut s) => {
            s.query = rewrite_statement(s.query, r);
            Expr::Subquery(s)
        }
        Expr::Exists {
            pos,
            not,
            mut subquery,
        } => {
            subquery.query = rewrite_statement(subquery.query, r);
            Expr::Exists { pos, not, subquery }
        }
        Expr::Interval { pos, value, unit } => Expr::Interval {
            pos,
            value: Box::new(rewrite_expr(*value, r)),
            unit,
        },
        Expr::Extract { pos, field, source } => Expr::Extract {
            pos,
            field,
            source: Box::new(rewrite_expr(*source, r)),
        },
        Expr::Trim(mut t) => {
            t.chars = t.chars.map(|e| rewrite_expr(e, r));
            t.expr = rewrite_expr(t.expr, r);
            Expr::Trim(t)
        }
        Expr::Substring(mut s) => {
            s.expr = rewrite_expr(s.expr, r);
            s.from = s.from.map(|e| rewrite_expr(e, r));
            s.for_length = s.for_length.map(|e| rewrite_expr(e, r));
            Expr::Substring(s)
        }
        Expr::Position {
            pos,
            needle,
            haystack,
        } => Expr::Position {
            pos,
            needle: Box::new(rewrite_expr(*needle, r)),
            haystack: Box::new(rewrite_expr(*haystack, r)),
        },
        Expr::Array { pos, elements } => Expr::Array {
            pos,
            elements: elements.into_iter().map(|e| rewrite_expr(e, r)).collect(),
        },
        Expr::Subscript { pos, expr, index } => Expr::Subscript {
            pos,
            expr: Box::new(rewrite_expr(*expr, r)),
            index: Box::new(rewrite_expr(*index, r)),
        },
        Expr::Collate {
            pos,
            expr,
            collation,
        } => Expr::Collate {
            pos,
            expr: Box::new(rewrite_expr(*expr, r)),
            collation,
        },
    };
    r.rewrite_expr(expr)
}

fn rewrite_table_expr<R: Rewriter>(te: TableExpr, r: &mut R) -> TableExpr {
    let te = match te {
        TableExpr::Table(t) => TableExpr::Table(r.rewrite_table_ref(t)),
        TableExpr::Aliased(mut a) => {
            a.expr = rewrite_table_expr(a.expr, r);
            TableExpr::Aliased(a)
        }
        TableExpr::Join(mut j) => {
            j.left = rewrite_table_expr(j.left, r);
            j.right = rewrite_table_expr(j.right, r);
            j.on = j.on.map(|e| rewrite_expr(e, r));
            TableExpr::Join(j)
        }
        TableExpr::Paren(mut p) => {
            p.expr = rewrite_table_expr(p.expr, r);
            TableExpr::Paren(p)
        }
        TableExpr::Subquery(mut s) => {
            s.query = rewrite_statement(s.query, r);
            TableExpr::Subquery(s)
        }
        TableExpr::Values(mut vals) => {
            vals.rows = vals
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(|e| rewrite_expr(e, r)).collect())
                .collect();
            TableExpr::Values(vals)
        }
        TableExpr::List(mut l) => {
            l.tables = l
                .tables
                .into_iter()
                .map(|t| rewrite_table_expr(t, r))
                .collect();
            TableExpr::List(l)
        }
    };
    r.rewrite_table_expr(te)
}

fn rewrite_window_spec<R: Rewriter>(spec: &mut WindowSpec, r: &mut R) {
    spec.partition_by = std::mem::take(&mut spec.partition_by)
        .into_iter()
        .map(|e| rewrite_expr(e, r))
        .collect();
    for term in &mut spec.order_by {
        term.expr = rewrite_expr(std::mem::replace(&mut term.expr, placeholder_expr()), r);
    }
    if let Some(frame) = &mut spec.frame {
        rewrite_frame_bound(&mut frame.start, r);
        if let Some(end) = &mut frame.end {
            rewrite_frame_bound(end, r);
        }
    }
}

fn rewrite_frame_bound<R: Rewriter>(bound: &mut FrameBound, r: &mut R) {
    if let FrameBound::Preceding(e) | FrameBound::Following(e) = bound {
        *e = rewrite_expr(std::mem::replace(e, placeholder_expr()), r);
    }
}

// Inert stand-ins used while a child is moved out of a `&mut` slot.
fn placeholder_expr() -> Expr {
    Expr::Literal(crate::Literal {
        pos: crate::Pos::NONE,
        kind: crate::LiteralKind::Null,
        text: String::new(),
    })
}

fn placeholder_statement() -> Statement {
    Statement::Values(crate::ValuesStatement {
        pos: crate::Pos::NONE,
        rows: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Literal, LiteralKind, Pos};

    fn lit(n: &str) -> Expr {
        Expr::Literal(Literal {
            pos: Pos::NONE,
            kind: LiteralKind::Int,
            text: n.to_owned(),
        })
    }

    #[test]
    fn test_walk_prunes_children_on_false() {
        let stmt = Statement::Values(crate::ValuesStatement {
            pos: Pos::NONE,
            rows: vec![vec![lit("1"), lit("2")]],
        });
        let mut count = 0;
        walk(&stmt, &mut |node| {
            count += 1;
            // Refuse to descend below the statement.
            !matches!(node, Node::Statement(_))
        });
        assert_eq!(count, 1);

        count = 0;
        walk(&stmt, &mut |_| {
            count += 1;
            true
        });
        assert_eq!(count, 3);
    }

    #[test]
    fn test_rewrite_identity_preserves_tree() {
        struct Identity;
        impl Rewriter for Identity {}

        let stmt = Statement::Values(crate::ValuesStatement {
            pos: Pos::NONE,
            rows: vec![vec![lit("1"), lit("2")], vec![lit("3")]],
        });
        let copy = stmt.clone();
        assert_eq!(rewrite(stmt, &mut Identity), copy);
    }

    #[test]
    fn test_rewrite_replaces_expressions_post_order() {
        struct Bump;
        impl Rewriter for Bump {
            fn rewrite_expr(&mut self, e: Expr) -> Expr {
                match e {
                    Expr::Literal(mut l) => {
                        l.text.push('0');
                        Expr::Literal(l)
                    }
                    other => other,
                }
            }
        }

        let stmt = Statement::Values(crate::ValuesStatement {
            pos: Pos::NONE,
            rows: vec![vec![lit("1")]],
        });
        match rewrite(stmt, &mut Bump) {
            Statement::Values(v) => match &v.rows[0][0] {
                Expr::Literal(l) => assert_eq!(l.text, "10"),
                other => panic!("expected literal, got {other:?}"),
            },
            other => panic!("expected VALUES, got {other:?}"),
        }
    }
}
