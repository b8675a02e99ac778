//! Canonical SQL rendering.
//!
//! Every syntax tree renders to a deterministic single-line form. The form
//! is a fixed point of parse → print: printing a tree, re-parsing the
//! output, and printing again yields byte-identical text. That property
//! drives most of the layout decisions here — notably the space inside
//! `ARRAY[ .. ]` and subscripts (which keeps the lexer out of bracket-
//! identifier mode on re-parse) and the space between stacked unary
//! minuses (which would otherwise fuse into a `--` comment).

use omnisql_ast::{
    AliasedTable, AlterAction, AlterTableStatement, Assignment, BinaryOp, ColumnConstraint,
    ColumnConstraintKind, ColumnDef, ColumnRef, ConflictAction, CreateIndexStatement,
    CreateTableStatement, DataType, DeleteStatement, DropIndexStatement, DropTableStatement,
    Expr, ExplainStatement, ForeignKeyRef, FrameBound, FrameKind, IndexHint, IndexHintKind,
    IndexHintScope, IndexKey, InsertSource, InsertStatement, InSet, IsTest, JoinExpr, JoinKind,
    LikeExpr, LimitClause, Literal, LiteralKind, LockMode, LockWait, OrderingTerm, ParamKind,
    RefAction, SelectInto, SelectItem, SelectStatement, SetOpKind, SetOpStatement, StarExpr,
    Statement, TableConstraint, TableConstraintKind, TableExpr, TableRef, TrimDirection,
    UnaryOp, UpdateStatement, ValuesStatement, WindowSpec, WithClause,
};
use omnisql_parser::keyword;

/// Rendering options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Emit keywords in upper case (lower case otherwise).
    pub uppercase_keywords: bool,
    /// Indentation unit, reserved for multi-line layouts; the canonical
    /// single-line form does not consult it.
    pub indent: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            uppercase_keywords: true,
            indent: "  ".to_owned(),
        }
    }
}

/// Render a statement with default options.
#[must_use]
pub fn to_sql(stmt: &Statement) -> String {
    to_sql_with(stmt, &Options::default())
}

/// Render a statement with the given options.
#[must_use]
pub fn to_sql_with(stmt: &Statement, opts: &Options) -> String {
    let mut f = Formatter::new(opts.clone());
    f.write_statement(stmt);
    f.into_sql()
}

/// Render a single expression with default options.
#[must_use]
pub fn expr_to_sql(expr: &Expr) -> String {
    let mut f = Formatter::new(Options::default());
    f.write_expr(expr);
    f.into_sql()
}

/// Single-pass AST-to-string renderer.
pub struct Formatter {
    buf: String,
    opts: Options,
}

impl Formatter {
    #[must_use]
    pub fn new(opts: Options) -> Self {
        Self {
            buf: String::new(),
            opts,
        }
    }

    /// Consume the formatter and return the rendered SQL.
    #[must_use]
    pub fn into_sql(self) -> String {
        self.buf
    }

    // -----------------------------------------------------------------------
    // Writer primitives
    // -----------------------------------------------------------------------

    fn w(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn kw(&mut self, word: &str) {
        if self.opts.uppercase_keywords {
            for ch in word.chars() {
                self.buf.push(ch.to_ascii_uppercase());
            }
        } else {
            for ch in word.chars() {
                self.buf.push(ch.to_ascii_lowercase());
            }
        }
    }

    fn sp_kw(&mut self, word: &str) {
        self.w(" ");
        self.kw(word);
    }

    /// Identifier in canonical double-quote form. Quoted when empty, when
    /// it starts with anything but a letter or underscore, when it holds a
    /// character outside `[A-Za-z0-9_$]`, or when it collides with a
    /// reserved word.
    fn ident(&mut self, name: &str) {
        if needs_quoting(name) {
            self.quote_ident(name);
        } else {
            self.w(name);
        }
    }

    /// Relaxed identifier rule for function names and collations, which
    /// legitimately collide with keywords (ANY, COUNT, BINARY, ...).
    fn ident_relaxed(&mut self, name: &str) {
        if needs_quoting_non_keyword(name) {
            self.quote_ident(name);
        } else {
            self.w(name);
        }
    }

    fn quote_ident(&mut self, name: &str) {
        self.buf.push('"');
        for ch in name.chars() {
            if ch == '"' {
                self.buf.push('"');
            }
            self.buf.push(ch);
        }
        self.buf.push('"');
    }

    /// String literal: backslashes double first, then quotes.
    fn string_lit(&mut self, value: &str) {
        self.buf.push('\'');
        for ch in value.chars() {
            match ch {
                '\\' => self.buf.push_str("\\\\"),
                '\'' => self.buf.push_str("''"),
                _ => self.buf.push(ch),
            }
        }
        self.buf.push('\'');
    }

    fn comma_idents(&mut self, names: &[String]) {
        for (i, n) in names.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.ident(n);
        }
    }

    fn comma_exprs(&mut self, exprs: &[Expr]) {
        for (i, e) in exprs.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.write_expr(e);
        }
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    pub fn write_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Select(s) => self.select(s),
            Statement::Insert(s) => self.insert(s),
            Statement::Update(s) => self.update(s),
            Statement::Delete(s) => self.delete(s),
            Statement::CreateTable(s) => self.create_table(s),
            Statement::AlterTable(s) => self.alter_table(s),
            Statement::DropTable(s) => self.drop_table(s),
            Statement::CreateIndex(s) => self.create_index(s),
            Statement::DropIndex(s) => self.drop_index(s),
            Statement::Truncate(s) => {
                self.kw("TRUNCATE TABLE");
                self.w(" ");
                self.comma_tables(&s.tables);
                if s.cascade {
                    self.sp_kw("CASCADE");
                }
            }
            Statement::Explain(s) => self.explain(s),
            Statement::SetOp(s) => self.set_op(s),
            Statement::Values(s) => self.values(s),
        }
    }

    fn comma_tables(&mut self, tables: &[TableRef]) {
        for (i, t) in tables.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.table_ref(t);
        }
    }

    fn select(&mut self, s: &SelectStatement) {
        if let Some(with) = &s.with {
            self.with_clause(with);
            self.w(" ");
        }

        self.kw("SELECT");
        if s.distinct {
            self.sp_kw("DISTINCT");
        }
        self.w(" ");

        for (i, item) in s.columns.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.select_item(item);
        }

        if let Some(into) = &s.into {
            self.select_into(into);
        }

        if let Some(from) = &s.from {
            self.sp_kw("FROM");
            self.w(" ");
            self.table_expr(from);
        }

        if let Some(w) = &s.where_clause {
            self.sp_kw("WHERE");
            self.w(" ");
            self.write_expr(w);
        }

        if !s.group_by.is_empty() {
            self.sp_kw("GROUP BY");
            self.w(" ");
            self.comma_exprs(&s.group_by);
        }

        if let Some(h) = &s.having {
            self.sp_kw("HAVING");
            self.w(" ");
            self.write_expr(h);
        }

        if !s.windows.is_empty() {
            self.sp_kw("WINDOW");
            self.w(" ");
            for (i, def) in s.windows.iter().enumerate() {
                if i > 0 {
                    self.w(", ");
                }
                self.ident(&def.name);
                self.sp_kw("AS");
                self.w(" ");
                self.window_body(&def.spec);
            }
        }

        self.order_by(&s.order_by);
        if let Some(limit) = &s.limit {
            self.limit(limit);
        }

        if let Some(lock) = &s.lock {
            self.sp_kw("FOR");
            match lock.mode {
                LockMode::Update => self.sp_kw("UPDATE"),
                LockMode::Share => self.sp_kw("SHARE"),
            }
            match lock.wait {
                LockWait::Default => {}
                LockWait::Nowait => self.sp_kw("NOWAIT"),
                LockWait::SkipLocked => self.sp_kw("SKIP LOCKED"),
            }
        }
    }

    fn select_into(&mut self, into: &SelectInto) {
        self.sp_kw("INTO");
        match into {
            SelectInto::Outfile(f) => {
                self.sp_kw("OUTFILE");
                self.w(" ");
                self.string_lit(f);
            }
            SelectInto::Dumpfile(f) => {
                self.sp_kw("DUMPFILE");
                self.w(" ");
                self.string_lit(f);
            }
            SelectInto::Vars(vars) => {
                self.w(" ");
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        self.w(", ");
                    }
                    self.w(v);
                }
            }
        }
    }

    fn select_item(&mut self, item: &SelectItem) {
        match item {
            SelectItem::Star(star) => self.star(star),
            SelectItem::Expr(ae) => {
                self.write_expr(&ae.expr);
                if let Some(alias) = &ae.alias {
                    self.sp_kw("AS");
                    self.w(" ");
                    self.ident(alias);
                }
            }
        }
    }

    fn star(&mut self, star: &StarExpr) {
        if let Some(q) = &star.qualifier {
            self.ident(q);
            self.w(".");
        }
        self.w("*");
    }

    fn with_clause(&mut self, with: &WithClause) {
        self.kw("WITH");
        if with.recursive {
            self.sp_kw("RECURSIVE");
        }
        self.w(" ");
        for (i, cte) in with.ctes.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.ident(&cte.name);
            if !cte.columns.is_empty() {
                self.w(" (");
                self.comma_idents(&cte.columns);
                self.w(")");
            }
            self.sp_kw("AS");
            self.w(" (");
            self.write_statement(&cte.query);
            self.w(")");
        }
    }

    fn order_by(&mut self, terms: &[OrderingTerm]) {
        if terms.is_empty() {
            return;
        }
        self.sp_kw("ORDER BY");
        self.w(" ");
        for (i, term) in terms.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.write_expr(&term.expr);
            if term.desc {
                self.sp_kw("DESC");
            }
            if let Some(first) = term.nulls_first {
                self.sp_kw("NULLS");
                self.sp_kw(if first { "FIRST" } else { "LAST" });
            }
        }
    }

    fn limit(&mut self, limit: &LimitClause) {
        if let Some(count) = &limit.count {
            self.sp_kw("LIMIT");
            self.w(" ");
            self.write_expr(count);
        }
        if let Some(offset) = &limit.offset {
            self.sp_kw("OFFSET");
            self.w(" ");
            self.write_expr(offset);
        }
    }

    fn set_op(&mut self, s: &SetOpStatement) {
        self.write_statement(&s.left);
        match s.op {
            SetOpKind::Union => self.sp_kw("UNION"),
            SetOpKind::Intersect => self.sp_kw("INTERSECT"),
            SetOpKind::Except => self.sp_kw("EXCEPT"),
        }
        if s.all {
            self.sp_kw("ALL");
        }
        self.w(" ");
        self.write_statement(&s.right);
        self.order_by(&s.order_by);
        if let Some(limit) = &s.limit {
            self.limit(limit);
        }
    }

    fn values(&mut self, s: &ValuesStatement) {
        self.kw("VALUES");
        self.w(" ");
        self.value_rows(&s.rows);
    }

    fn value_rows(&mut self, rows: &[Vec<Expr>]) {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.w("(");
            self.comma_exprs(row);
            self.w(")");
        }
    }

    fn insert(&mut self, s: &InsertStatement) {
        if let Some(with) = &s.with {
            self.with_clause(with);
            self.w(" ");
        }

        self.kw(if s.replace { "REPLACE" } else { "INSERT" });
        if s.ignore {
            self.sp_kw("IGNORE");
        }
        self.sp_kw("INTO");
        self.w(" ");
        self.table_ref(&s.table);

        if !s.columns.is_empty() {
            self.w(" (");
            for (i, col) in s.columns.iter().enumerate() {
                if i > 0 {
                    self.w(", ");
                }
                self.column_ref(col);
            }
            self.w(")");
        }

        match &s.source {
            InsertSource::Values(rows) => {
                self.sp_kw("VALUES");
                self.w(" ");
                self.value_rows(rows);
            }
            InsertSource::Select(q) => {
                self.w(" ");
                self.write_statement(q);
            }
            InsertSource::DefaultValues => self.sp_kw("DEFAULT VALUES"),
        }

        if !s.on_duplicate.is_empty() {
            self.sp_kw("ON DUPLICATE KEY UPDATE");
            self.w(" ");
            self.assignments(&s.on_duplicate);
        }

        if let Some(conflict) = &s.on_conflict {
            self.sp_kw("ON CONFLICT");
            if !conflict.columns.is_empty() {
                self.w(" (");
                self.comma_idents(&conflict.columns);
                self.w(")");
            }
            if let Some(w) = &conflict.where_clause {
                self.sp_kw("WHERE");
                self.w(" ");
                self.write_expr(w);
            }
            self.sp_kw("DO");
            match &conflict.action {
                ConflictAction::DoNothing => self.sp_kw("NOTHING"),
                ConflictAction::DoUpdate(assignments) => {
                    self.sp_kw("UPDATE SET");
                    self.w(" ");
                    self.assignments(assignments);
                }
            }
        }

        self.returning(&s.returning);
    }

    fn assignments(&mut self, assignments: &[Assignment]) {
        for (i, a) in assignments.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.column_ref(&a.column);
            self.w(" = ");
            self.write_expr(&a.value);
        }
    }

    fn returning(&mut self, items: &[SelectItem]) {
        if items.is_empty() {
            return;
        }
        self.sp_kw("RETURNING");
        self.w(" ");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.select_item(item);
        }
    }

    fn update(&mut self, s: &UpdateStatement) {
        if let Some(with) = &s.with {
            self.with_clause(with);
            self.w(" ");
        }

        self.kw("UPDATE");
        self.w(" ");
        self.table_expr(&s.table);
        self.sp_kw("SET");
        self.w(" ");
        self.assignments(&s.set);

        if let Some(from) = &s.from {
            self.sp_kw("FROM");
            self.w(" ");
            self.table_expr(from);
        }
        if let Some(w) = &s.where_clause {
            self.sp_kw("WHERE");
            self.w(" ");
            self.write_expr(w);
        }
        self.order_by(&s.order_by);
        if let Some(limit) = &s.limit {
            self.limit(limit);
        }
        self.returning(&s.returning);
    }

    fn delete(&mut self, s: &DeleteStatement) {
        if let Some(with) = &s.with {
            self.with_clause(with);
            self.w(" ");
        }

        self.kw("DELETE FROM");
        self.w(" ");
        self.table_expr(&s.table);

        if let Some(using) = &s.using {
            self.sp_kw("USING");
            self.w(" ");
            self.table_expr(using);
        }
        if let Some(w) = &s.where_clause {
            self.sp_kw("WHERE");
            self.w(" ");
            self.write_expr(w);
        }
        self.order_by(&s.order_by);
        if let Some(limit) = &s.limit {
            self.limit(limit);
        }
        self.returning(&s.returning);
    }

    // -----------------------------------------------------------------------
    // DDL
    // -----------------------------------------------------------------------

    fn create_table(&mut self, s: &CreateTableStatement) {
        self.kw("CREATE");
        if s.temporary {
            self.sp_kw("TEMPORARY");
        }
        self.sp_kw("TABLE");
        if s.if_not_exists {
            self.sp_kw("IF NOT EXISTS");
        }
        self.w(" ");
        self.table_ref(&s.table);

        if let Some(query) = &s.as_select {
            self.sp_kw("AS");
            self.w(" ");
            self.write_statement(query);
            return;
        }

        self.w(" (");
        let mut first = true;
        for col in &s.columns {
            if !first {
                self.w(", ");
            }
            first = false;
            self.column_def(col);
        }
        for cons in &s.constraints {
            if !first {
                self.w(", ");
            }
            first = false;
            self.table_constraint(cons);
        }
        self.w(")");

        for opt in &s.options {
            self.w(" ");
            self.kw(&opt.name);
            self.w(" = ");
            if opt.value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
                && !opt.value.is_empty()
            {
                self.w(&opt.value);
            } else {
                self.string_lit(&opt.value);
            }
        }
    }

    fn column_def(&mut self, col: &ColumnDef) {
        self.ident(&col.name);
        self.w(" ");
        self.data_type(&col.data_type);
        for cons in &col.constraints {
            self.w(" ");
            self.column_constraint(cons);
        }
    }

    fn data_type(&mut self, dt: &DataType) {
        // Plain and two-word type names render as keywords; anything odd
        // falls back to a quoted identifier.
        if dt
            .name
            .split(' ')
            .all(|word| !word.is_empty() && !needs_quoting_non_keyword(word))
        {
            let mut first = true;
            for word in dt.name.split(' ') {
                if !first {
                    self.w(" ");
                }
                first = false;
                self.kw(word);
            }
        } else {
            self.quote_ident(&dt.name);
        }

        if let Some(length) = dt.length {
            self.w("(");
            self.w(&length.to_string());
            if let Some(scale) = dt.scale {
                self.w(", ");
                self.w(&scale.to_string());
            }
            self.w(")");
        }
        if dt.unsigned {
            self.sp_kw("UNSIGNED");
        }
        if let Some(charset) = &dt.charset {
            self.sp_kw("CHARACTER SET");
            self.w(" ");
            self.ident_relaxed(charset);
        }
        if let Some(collation) = &dt.collation {
            self.sp_kw("COLLATE");
            self.w(" ");
            self.ident_relaxed(collation);
        }
        if dt.array {
            self.w("[]");
        }
    }

    fn column_constraint(&mut self, cons: &ColumnConstraint) {
        if let Some(name) = &cons.name {
            self.kw("CONSTRAINT");
            self.w(" ");
            self.ident(name);
            self.w(" ");
        }
        match &cons.kind {
            ColumnConstraintKind::NotNull => self.kw("NOT NULL"),
            ColumnConstraintKind::PrimaryKey => self.kw("PRIMARY KEY"),
            ColumnConstraintKind::Unique => self.kw("UNIQUE"),
            ColumnConstraintKind::Default(e) => {
                self.kw("DEFAULT");
                self.w(" ");
                self.write_expr(e);
            }
            ColumnConstraintKind::Check(e) => {
                self.kw("CHECK");
                self.w(" (");
                self.write_expr(e);
                self.w(")");
            }
            ColumnConstraintKind::References(fk) => self.fk_ref(fk),
            ColumnConstraintKind::Generated { expr, stored } => {
                self.kw("GENERATED ALWAYS AS");
                self.w(" (");
                self.write_expr(expr);
                self.w(")");
                self.sp_kw(if *stored { "STORED" } else { "VIRTUAL" });
            }
        }
    }

    fn fk_ref(&mut self, fk: &ForeignKeyRef) {
        self.kw("REFERENCES");
        self.w(" ");
        self.table_ref(&fk.table);
        if !fk.columns.is_empty() {
            self.w(" (");
            self.comma_idents(&fk.columns);
            self.w(")");
        }
        if let Some(action) = fk.on_delete {
            self.sp_kw("ON DELETE");
            self.ref_action(action);
        }
        if let Some(action) = fk.on_update {
            self.sp_kw("ON UPDATE");
            self.ref_action(action);
        }
    }

    fn ref_action(&mut self, action: RefAction) {
        self.sp_kw(match action {
            RefAction::NoAction => "NO ACTION",
            RefAction::Cascade => "CASCADE",
            RefAction::SetNull => "SET NULL",
            RefAction::SetDefault => "SET DEFAULT",
            RefAction::Restrict => "RESTRICT",
        });
    }

    fn table_constraint(&mut self, cons: &TableConstraint) {
        if let Some(name) = &cons.name {
            self.kw("CONSTRAINT");
            self.w(" ");
            self.ident(name);
            self.w(" ");
        }
        match &cons.kind {
            TableConstraintKind::PrimaryKey(cols) => {
                self.kw("PRIMARY KEY");
                self.w(" (");
                self.comma_idents(cols);
                self.w(")");
            }
            TableConstraintKind::Unique(cols) => {
                self.kw("UNIQUE");
                self.w(" (");
                self.comma_idents(cols);
                self.w(")");
            }
            TableConstraintKind::ForeignKey { columns, reference } => {
                self.kw("FOREIGN KEY");
                self.w(" (");
                self.comma_idents(columns);
                self.w(") ");
                self.fk_ref(reference);
            }
            TableConstraintKind::Check(e) => {
                self.kw("CHECK");
                self.w(" (");
                self.write_expr(e);
                self.w(")");
            }
        }
    }

    fn alter_table(&mut self, s: &AlterTableStatement) {
        self.kw("ALTER TABLE");
        self.w(" ");
        self.table_ref(&s.table);

        for (i, action) in s.actions.iter().enumerate() {
            if i > 0 {
                self.w(",");
            }
            self.w(" ");
            match action {
                AlterAction::AddColumn(col) => {
                    self.kw("ADD COLUMN");
                    self.w(" ");
                    self.column_def(col);
                }
                AlterAction::DropColumn {
                    name,
                    if_exists,
                    cascade,
                } => {
                    self.kw("DROP COLUMN");
                    if *if_exists {
                        self.sp_kw("IF EXISTS");
                    }
                    self.w(" ");
                    self.ident(name);
                    if *cascade {
                        self.sp_kw("CASCADE");
                    }
                }
                AlterAction::RenameColumn { old_name, new_name } => {
                    self.kw("RENAME COLUMN");
                    self.w(" ");
                    self.ident(old_name);
                    self.sp_kw("TO");
                    self.w(" ");
                    self.ident(new_name);
                }
                AlterAction::RenameTable(t) => {
                    self.kw("RENAME TO");
                    self.w(" ");
                    self.table_ref(t);
                }
                AlterAction::ModifyColumn(m) => {
                    self.kw("MODIFY COLUMN");
                    self.w(" ");
                    if let Some(def) = &m.new_def {
                        self.column_def(def);
                    } else {
                        self.ident(&m.name);
                        if m.set_not_null {
                            self.sp_kw("SET NOT NULL");
                        }
                        if let Some(e) = &m.set_default {
                            self.sp_kw("SET DEFAULT");
                            self.w(" ");
                            self.write_expr(e);
                        }
                        if m.drop_not_null {
                            self.sp_kw("DROP NOT NULL");
                        }
                        if m.drop_default {
                            self.sp_kw("DROP DEFAULT");
                        }
                    }
                }
                AlterAction::AddConstraint(cons) => {
                    self.kw("ADD");
                    self.w(" ");
                    self.table_constraint(cons);
                }
                AlterAction::DropConstraint {
                    name,
                    if_exists,
                    cascade,
                } => {
                    self.kw("DROP CONSTRAINT");
                    if *if_exists {
                        self.sp_kw("IF EXISTS");
                    }
                    self.w(" ");
                    self.ident(name);
                    if *cascade {
                        self.sp_kw("CASCADE");
                    }
                }
            }
        }
    }

    fn drop_table(&mut self, s: &DropTableStatement) {
        self.kw("DROP TABLE");
        if s.if_exists {
            self.sp_kw("IF EXISTS");
        }
        self.w(" ");
        self.comma_tables(&s.tables);
        if s.cascade {
            self.sp_kw("CASCADE");
        }
    }

    fn create_index(&mut self, s: &CreateIndexStatement) {
        self.kw("CREATE");
        if s.unique {
            self.sp_kw("UNIQUE");
        }
        self.sp_kw("INDEX");
        if s.concurrently {
            self.sp_kw("CONCURRENTLY");
        }
        if s.if_not_exists {
            self.sp_kw("IF NOT EXISTS");
        }
        if let Some(name) = &s.name {
            self.w(" ");
            self.ident(name);
        }
        self.sp_kw("ON");
        self.w(" ");
        self.table_ref(&s.table);
        if let Some(method) = &s.using {
            self.sp_kw("USING");
            self.w(" ");
            self.ident_relaxed(method);
        }

        self.w(" (");
        for (i, col) in s.columns.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            match &col.key {
                IndexKey::Named(name) => self.ident(name),
                IndexKey::Expr(e) => self.write_expr(e),
            }
            if col.desc {
                self.sp_kw("DESC");
            }
            if let Some(first) = col.nulls_first {
                self.sp_kw("NULLS");
                self.sp_kw(if first { "FIRST" } else { "LAST" });
            }
        }
        self.w(")");

        if let Some(w) = &s.where_clause {
            self.sp_kw("WHERE");
            self.w(" ");
            self.write_expr(w);
        }
    }

    fn drop_index(&mut self, s: &DropIndexStatement) {
        self.kw("DROP INDEX");
        if s.concurrently {
            self.sp_kw("CONCURRENTLY");
        }
        if s.if_exists {
            self.sp_kw("IF EXISTS");
        }
        self.w(" ");
        self.ident(&s.name);
        if let Some(t) = &s.table {
            self.sp_kw("ON");
            self.w(" ");
            self.table_ref(t);
        }
        if s.cascade {
            self.sp_kw("CASCADE");
        }
    }

    fn explain(&mut self, s: &ExplainStatement) {
        self.kw("EXPLAIN");
        if s.analyze {
            self.sp_kw("ANALYZE");
        }
        if s.verbose {
            self.sp_kw("VERBOSE");
        }
        if let Some(format) = &s.format {
            self.sp_kw("FORMAT");
            self.w(" ");
            self.ident_relaxed(format);
        }
        self.w(" ");
        self.write_statement(&s.stmt);
    }

    // -----------------------------------------------------------------------
    // Table expressions
    // -----------------------------------------------------------------------

    fn table_ref(&mut self, t: &TableRef) {
        for (i, part) in t.parts.iter().enumerate() {
            if i > 0 {
                self.w(".");
            }
            self.ident(part);
        }
    }

    fn column_ref(&mut self, c: &ColumnRef) {
        for (i, part) in c.parts.iter().enumerate() {
            if i > 0 {
                self.w(".");
            }
            self.ident(part);
        }
    }

    pub fn table_expr(&mut self, te: &TableExpr) {
        match te {
            TableExpr::Table(t) => self.table_ref(t),
            TableExpr::Aliased(a) => self.aliased_table(a),
            TableExpr::Join(j) => self.join(j),
            TableExpr::Paren(p) => {
                self.w("(");
                self.table_expr(&p.expr);
                self.w(")");
            }
            TableExpr::Subquery(s) => {
                self.w("(");
                self.write_statement(&s.query);
                self.w(")");
            }
            TableExpr::Values(v) => self.values(v),
            TableExpr::List(list) => {
                for (i, t) in list.tables.iter().enumerate() {
                    if i > 0 {
                        self.w(", ");
                    }
                    self.table_expr(t);
                }
            }
        }
    }

    fn aliased_table(&mut self, a: &AliasedTable) {
        self.table_expr(&a.expr);
        if let Some(alias) = &a.alias {
            self.sp_kw("AS");
            self.w(" ");
            self.ident(alias);
        }
        if !a.column_aliases.is_empty() {
            self.w(" (");
            self.comma_idents(&a.column_aliases);
            self.w(")");
        }
        for hint in &a.hints {
            self.w(" ");
            self.index_hint(hint);
        }
    }

    fn index_hint(&mut self, hint: &IndexHint) {
        self.kw(match hint.kind {
            IndexHintKind::Use => "USE",
            IndexHintKind::Force => "FORCE",
            IndexHintKind::Ignore => "IGNORE",
        });
        self.sp_kw("INDEX");
        match hint.scope {
            IndexHintScope::All => {}
            IndexHintScope::Join => self.sp_kw("FOR JOIN"),
            IndexHintScope::OrderBy => self.sp_kw("FOR ORDER BY"),
            IndexHintScope::GroupBy => self.sp_kw("FOR GROUP BY"),
        }
        self.w(" (");
        self.comma_idents(&hint.indexes);
        self.w(")");
    }

    fn join(&mut self, j: &JoinExpr) {
        self.table_expr(&j.left);
        self.w(" ");
        if j.natural {
            self.kw("NATURAL");
            self.w(" ");
        }
        self.kw(match j.kind {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        });
        if j.lateral {
            self.sp_kw("LATERAL");
        }
        self.w(" ");
        self.table_expr(&j.right);

        if let Some(on) = &j.on {
            self.sp_kw("ON");
            self.w(" ");
            self.write_expr(on);
        }
        if !j.using.is_empty() {
            self.sp_kw("USING");
            self.w(" (");
            self.comma_idents(&j.using);
            self.w(")");
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    pub fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.literal(lit),
            Expr::Column(c) => self.column_ref(c),
            Expr::Param(p) => match &p.kind {
                ParamKind::Anonymous => self.w("?"),
                ParamKind::Numbered(n) => {
                    self.w("$");
                    self.w(&n.to_string());
                }
                ParamKind::Colon(name) => {
                    self.w(":");
                    self.w(name);
                }
                ParamKind::At(name) => {
                    self.w("@");
                    self.w(name);
                }
            },
            Expr::Binary {
                op, left, right, ..
            } => {
                self.write_expr(left);
                self.w(" ");
                self.binary_op(*op);
                self.w(" ");
                self.write_expr(right);
            }
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Not => {
                    self.kw("NOT");
                    self.w(" ");
                    self.write_expr(operand);
                }
                UnaryOp::Negate => {
                    self.w("-");
                    // A second minus directly after would lex as a line
                    // comment.
                    if matches!(
                        operand.as_ref(),
                        Expr::Unary {
                            op: UnaryOp::Negate,
                            ..
                        }
                    ) {
                        self.w(" ");
                    }
                    self.write_expr(operand);
                }
                UnaryOp::BitNot => {
                    self.w("~");
                    self.write_expr(operand);
                }
            },
            Expr::Paren { expr, .. } => {
                self.w("(");
                self.write_expr(expr);
                self.w(")");
            }
            Expr::Func(f) => {
                self.ident_relaxed(&f.name);
                self.w("(");
                if f.distinct {
                    self.kw("DISTINCT");
                    self.w(" ");
                }
                self.comma_exprs(&f.args);
                self.w(")");
                if let Some(filter) = &f.filter {
                    self.sp_kw("FILTER");
                    self.w(" (");
                    self.kw("WHERE");
                    self.w(" ");
                    self.write_expr(filter);
                    self.w(")");
                }
                if let Some(over) = &f.over {
                    self.sp_kw("OVER");
                    self.w(" ");
                    self.window_spec(over);
                }
            }
            Expr::Case(c) => {
                self.kw("CASE");
                if let Some(operand) = &c.operand {
                    self.w(" ");
                    self.write_expr(operand);
                }
                for when in &c.whens {
                    self.sp_kw("WHEN");
                    self.w(" ");
                    self.write_expr(&when.cond);
                    self.sp_kw("THEN");
                    self.w(" ");
                    self.write_expr(&when.result);
                }
                if let Some(else_expr) = &c.else_expr {
                    self.sp_kw("ELSE");
                    self.w(" ");
                    self.write_expr(else_expr);
                }
                self.sp_kw("END");
            }
            Expr::Cast {
                expr, data_type, ..
            } => {
                self.kw("CAST");
                self.w("(");
                self.write_expr(expr);
                self.sp_kw("AS");
                self.w(" ");
                self.data_type(data_type);
                self.w(")");
            }
            Expr::In(i) => {
                self.write_expr(&i.expr);
                if i.not {
                    self.sp_kw("NOT");
                }
                self.sp_kw("IN");
                self.w(" (");
                match &i.set {
                    InSet::List(items) => self.comma_exprs(items),
                    InSet::Subquery(q) => self.write_statement(q),
                }
                self.w(")");
            }
            Expr::Between(b) => {
                self.write_expr(&b.expr);
                if b.not {
                    self.sp_kw("NOT");
                }
                self.sp_kw("BETWEEN");
                self.w(" ");
                self.write_expr(&b.low);
                self.sp_kw("AND");
                self.w(" ");
                self.write_expr(&b.high);
            }
            Expr::Like(like) => self.like(like),
            Expr::Is {
                expr, not, test, ..
            } => {
                self.write_expr(expr);
                self.sp_kw("IS");
                if *not {
                    self.sp_kw("NOT");
                }
                self.sp_kw(match test {
                    IsTest::Null => "NULL",
                    IsTest::True => "TRUE",
                    IsTest::False => "FALSE",
                    IsTest::Unknown => "UNKNOWN",
                });
            }
            Expr::Subquery(s) => {
                self.w("(");
                self.write_statement(&s.query);
                self.w(")");
            }
            Expr::Exists { not, subquery, .. } => {
                if *not {
                    self.kw("NOT");
                    self.w(" ");
                }
                self.kw("EXISTS");
                self.w(" (");
                self.write_statement(&subquery.query);
                self.w(")");
            }
            Expr::Interval { value, unit, .. } => {
                self.kw("INTERVAL");
                self.w(" ");
                self.write_expr(value);
                if let Some(unit) = unit {
                    self.w(" ");
                    self.kw(unit);
                }
            }
            Expr::Extract { field, source, .. } => {
                self.kw("EXTRACT");
                self.w("(");
                if keyword::is_keyword(field) {
                    self.kw(field);
                } else {
                    self.ident(field);
                }
                self.sp_kw("FROM");
                self.w(" ");
                self.write_expr(source);
                self.w(")");
            }
            Expr::Trim(t) => {
                self.kw("TRIM");
                self.w("(");
                self.kw(match t.direction {
                    TrimDirection::Both => "BOTH",
                    TrimDirection::Leading => "LEADING",
                    TrimDirection::Trailing => "TRAILING",
                });
                self.w(" ");
                if let Some(chars) = &t.chars {
                    self.write_expr(chars);
                    self.w(" ");
                }
                self.kw("FROM");
                self.w(" ");
                self.write_expr(&t.expr);
                self.w(")");
            }
            Expr::Substring(sub) => {
                self.kw("SUBSTRING");
                self.w("(");
                self.write_expr(&sub.expr);
                if let Some(from) = &sub.from {
                    self.sp_kw("FROM");
                    self.w(" ");
                    self.write_expr(from);
                }
                if let Some(for_length) = &sub.for_length {
                    self.sp_kw("FOR");
                    self.w(" ");
                    self.write_expr(for_length);
                }
                self.w(")");
            }
            Expr::Position {
                needle, haystack, ..
            } => {
                self.kw("POSITION");
                self.w("(");
                self.write_expr(needle);
                self.sp_kw("IN");
                self.w(" ");
                self.write_expr(haystack);
                self.w(")");
            }
            Expr::Array { elements, .. } => {
                // The space after `[` keeps the lexer out of bracket-
                // identifier mode on re-parse.
                self.kw("ARRAY");
                if elements.is_empty() {
                    self.w("[ ]");
                } else {
                    self.w("[ ");
                    self.comma_exprs(elements);
                    self.w(" ]");
                }
            }
            Expr::Subscript { expr, index, .. } => {
                self.write_expr(expr);
                self.w("[ ");
                self.write_expr(index);
                self.w(" ]");
            }
            Expr::Collate {
                expr, collation, ..
            } => {
                self.write_expr(expr);
                self.sp_kw("COLLATE");
                self.w(" ");
                self.ident_relaxed(collation);
            }
            Expr::Star(star) => self.star(star),
        }
    }

    fn like(&mut self, like: &LikeExpr) {
        self.write_expr(&like.expr);
        if like.not {
            self.sp_kw("NOT");
        }
        self.sp_kw(if like.ilike { "ILIKE" } else { "LIKE" });
        self.w(" ");
        self.write_expr(&like.pattern);
        if let Some(escape) = &like.escape {
            self.sp_kw("ESCAPE");
            self.w(" ");
            self.write_expr(escape);
        }
    }

    fn literal(&mut self, lit: &Literal) {
        match lit.kind {
            LiteralKind::Null | LiteralKind::Bool => self.kw(&lit.text),
            LiteralKind::Str => self.string_lit(&lit.text),
            LiteralKind::Blob => {
                self.w("X'");
                self.w(&lit.text);
                self.w("'");
            }
            LiteralKind::Int | LiteralKind::Float => self.w(&lit.text),
        }
    }

    fn binary_op(&mut self, op: BinaryOp) {
        match op {
            BinaryOp::Or => self.kw("OR"),
            BinaryOp::Xor => self.kw("XOR"),
            BinaryOp::And => self.kw("AND"),
            BinaryOp::Eq => self.w("="),
            BinaryOp::Ne => self.w("<>"),
            BinaryOp::Lt => self.w("<"),
            BinaryOp::Gt => self.w(">"),
            BinaryOp::Le => self.w("<="),
            BinaryOp::Ge => self.w(">="),
            BinaryOp::BitOr => self.w("|"),
            BinaryOp::BitXor => self.w("^"),
            BinaryOp::BitAnd => self.w("&"),
            BinaryOp::ShiftLeft => self.w("<<"),
            BinaryOp::ShiftRight => self.w(">>"),
            BinaryOp::Add => self.w("+"),
            BinaryOp::Subtract => self.w("-"),
            BinaryOp::Concat => self.w("||"),
            BinaryOp::Multiply => self.w("*"),
            BinaryOp::Divide => self.w("/"),
            BinaryOp::Modulo => self.w("%"),
        }
    }

    /// `OVER` target: bare name for a pure named reference, parenthesized
    /// body otherwise.
    fn window_spec(&mut self, spec: &WindowSpec) {
        if spec.is_named_ref() {
            if let Some(name) = &spec.name {
                self.ident(name);
            }
            return;
        }
        self.window_body(spec);
    }

    fn window_body(&mut self, spec: &WindowSpec) {
        self.w("(");
        let mut need_space = false;
        if let Some(name) = &spec.name {
            self.ident(name);
            need_space = true;
        }
        if !spec.partition_by.is_empty() {
            if need_space {
                self.w(" ");
            }
            self.kw("PARTITION BY");
            self.w(" ");
            self.comma_exprs(&spec.partition_by);
            need_space = true;
        }
        if !spec.order_by.is_empty() {
            if need_space {
                self.w(" ");
            }
            self.kw("ORDER BY");
            self.w(" ");
            for (i, term) in spec.order_by.iter().enumerate() {
                if i > 0 {
                    self.w(", ");
                }
                self.write_expr(&term.expr);
                if term.desc {
                    self.sp_kw("DESC");
                }
                if let Some(first) = term.nulls_first {
                    self.sp_kw("NULLS");
                    self.sp_kw(if first { "FIRST" } else { "LAST" });
                }
            }
            need_space = true;
        }
        if let Some(frame) = &spec.frame {
            if need_space {
                self.w(" ");
            }
            self.kw(match frame.kind {
                FrameKind::Rows => "ROWS",
                FrameKind::Range => "RANGE",
                FrameKind::Groups => "GROUPS",
            });
            self.w(" ");
            match &frame.end {
                Some(end) => {
                    self.kw("BETWEEN");
                    self.w(" ");
                    self.frame_bound(&frame.start);
                    self.sp_kw("AND");
                    self.w(" ");
                    self.frame_bound(end);
                }
                None => self.frame_bound(&frame.start),
            }
        }
        self.w(")");
    }

    fn frame_bound(&mut self, bound: &FrameBound) {
        match bound {
            FrameBound::CurrentRow => self.kw("CURRENT ROW"),
            FrameBound::UnboundedPreceding => self.kw("UNBOUNDED PRECEDING"),
            FrameBound::UnboundedFollowing => self.kw("UNBOUNDED FOLLOWING"),
            FrameBound::Preceding(e) => {
                self.write_expr(e);
                self.sp_kw("PRECEDING");
            }
            FrameBound::Following(e) => {
                self.write_expr(e);
                self.sp_kw("FOLLOWING");
            }
        }
    }
}

/// Strict identifier quoting rule: empty, bad first character, any
/// character outside `[A-Za-z0-9_$]`, or a reserved word.
fn needs_quoting(name: &str) -> bool {
    needs_quoting_non_keyword(name) || keyword::is_keyword(name)
}

/// The quoting rule minus the keyword check.
fn needs_quoting_non_keyword(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(&first) = bytes.first() else {
        return true;
    };
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return true;
    }
    bytes
        .iter()
        .any(|&b| !(b.is_ascii_alphanumeric() || b == b'_' || b == b'$'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnisql_parser::Parser;

    fn format(sql: &str) -> String {
        let mut p = Parser::new(sql);
        match p.parse_one() {
            Ok(Some(stmt)) => to_sql(&stmt),
            Ok(None) => panic!("no statement in `{sql}`"),
            Err(e) => panic!("parse error for `{sql}`: {e}"),
        }
    }

    #[test]
    fn test_canonical_scenarios() {
        // The end-to-end shapes the formatter guarantees.
        let cases = [
            ("select 1 from t", "SELECT 1 FROM t"),
            ("select a.b.c.d from a.b.c", "SELECT a.b.c.d FROM a.b.c"),
            (
                "insert into t (a,b) values (1,2),(3,4)",
                "INSERT INTO t (a, b) VALUES (1, 2), (3, 4)",
            ),
            (
                "select * from t where a like '%x%' escape '#'",
                "SELECT * FROM t WHERE a LIKE '%x%' ESCAPE '#'",
            ),
            ("select array[1,2,3]", "SELECT ARRAY[ 1, 2, 3 ]"),
            ("select [col name] from [t]", "SELECT \"col name\" FROM t"),
            (
                "with cte as (select 1) select * from cte",
                "WITH cte AS (SELECT 1) SELECT * FROM cte",
            ),
            (
                "select row_number() over (partition by a order by b) from t",
                "SELECT row_number() OVER (PARTITION BY a ORDER BY b) FROM t",
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(format(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_lowercase_keyword_option() {
        let mut p = Parser::new("SELECT A FROM T WHERE A IS NOT NULL");
        let stmt = p.parse_one().expect("parse").expect("statement");
        let opts = Options {
            uppercase_keywords: false,
            ..Options::default()
        };
        assert_eq!(
            to_sql_with(&stmt, &opts),
            "select A from T where A is not null"
        );
    }

    #[test]
    fn test_keyword_identifiers_are_quoted() {
        assert_eq!(format("select \"select\" from t"), "SELECT \"select\" FROM t");
        assert_eq!(format("select a from \"user\""), "SELECT a FROM \"user\"");
    }

    #[test]
    fn test_function_names_are_not_keyword_quoted() {
        assert_eq!(format("select count(*) from t"), "SELECT count(*) FROM t");
        assert_eq!(format("select any(a) from t"), "SELECT any(a) FROM t");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(format("select 'it''s'"), "SELECT 'it''s'");
        assert_eq!(format(r"select 'a\\b'"), r"SELECT 'a\\b'");
    }

    #[test]
    fn test_double_minus_is_spaced() {
        assert_eq!(format("select - -1"), "SELECT - -1");
    }

    #[test]
    fn test_subscript_spacing() {
        assert_eq!(format("select arr[ 1 ] from t"), "SELECT arr[ 1 ] FROM t");
    }

    #[test]
    fn test_set_op_rendering() {
        assert_eq!(
            format("select 1 from t union all select 2 from t"),
            "SELECT 1 FROM t UNION ALL SELECT 2 FROM t"
        );
        assert_eq!(
            format("(select 1 from t) union (select 2 from t) order by 1"),
            "SELECT 1 FROM t UNION SELECT 2 FROM t ORDER BY 1"
        );
    }

    #[test]
    fn test_case_rendering() {
        assert_eq!(
            format("select case when a=1 then 'x' else 'y' end from t"),
            "SELECT CASE WHEN a = 1 THEN 'x' ELSE 'y' END FROM t"
        );
    }

    #[test]
    fn test_pg_cast_normalizes_to_cast() {
        assert_eq!(format("select a::int from t"), "SELECT CAST(a AS INT) FROM t");
    }

    #[test]
    fn test_join_rendering() {
        assert_eq!(
            format("select * from a inner join b on a.x = b.x"),
            "SELECT * FROM a JOIN b ON a.x = b.x"
        );
        assert_eq!(
            format("select * from a left outer join b using (id)"),
            "SELECT * FROM a LEFT JOIN b USING (id)"
        );
        assert_eq!(
            format("select * from t1, t2"),
            "SELECT * FROM t1 CROSS JOIN t2"
        );
        assert_eq!(
            format("select * from a natural left join b"),
            "SELECT * FROM a NATURAL LEFT JOIN b"
        );
    }

    #[test]
    fn test_index_hints_round_out() {
        assert_eq!(
            format("select * from t use index for join (i1)"),
            "SELECT * FROM t USE INDEX FOR JOIN (i1)"
        );
    }

    #[test]
    fn test_window_defs_are_printed() {
        assert_eq!(
            format("select sum(a) over w from t window w as (partition by b)"),
            "SELECT sum(a) OVER w FROM t WINDOW w AS (PARTITION BY b)"
        );
    }

    #[test]
    fn test_create_table_rendering() {
        assert_eq!(
            format("create table t (id int primary key, name varchar(10) not null)"),
            "CREATE TABLE t (id INT PRIMARY KEY, name VARCHAR(10) NOT NULL)"
        );
        assert_eq!(
            format("create table t (a double precision)"),
            "CREATE TABLE t (a DOUBLE PRECISION)"
        );
    }

    #[test]
    fn test_insert_extensions_render() {
        assert_eq!(
            format("insert into t set a = 1, b = 2"),
            "INSERT INTO t (a, b) VALUES (1, 2)"
        );
        assert_eq!(
            format("insert into t (a) values (1) on conflict (a) do nothing"),
            "INSERT INTO t (a) VALUES (1) ON CONFLICT (a) DO NOTHING"
        );
        assert_eq!(
            format("insert into t (a) values (default)"),
            "INSERT INTO t (a) VALUES (DEFAULT)"
        );
    }

    #[test]
    fn test_limit_normalization() {
        assert_eq!(
            format("select * from t limit 20, 10"),
            "SELECT * FROM t LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            format("select * from t fetch first 5 rows only"),
            "SELECT * FROM t LIMIT 5"
        );
    }

    #[test]
    fn test_empty_qualifier_star_is_preserved() {
        assert_eq!(format("select \"\".* from t"), "SELECT \"\".* FROM t");
    }
}
