//! SQL Abstract Syntax Tree node types for omnisql.
//!
//! omnisql parses a permissive superset of MySQL, PostgreSQL, SQLite,
//! SQL Server, and Oracle syntax. Every statement the parser accepts
//! produces a tree of these nodes, and every node renders back to SQL via
//! `omnisql-format`.
//!
//! Nodes fall into four categories, each a closed sum: [`Statement`],
//! [`Expr`], [`TableExpr`], and [`SelectItem`] (the things that may appear
//! in a SELECT list). A few shapes inhabit two categories — a [`Subquery`]
//! is both an expression and a table expression, a [`StarExpr`] is both an
//! expression (`COUNT(*)`) and a select item — and those share one
//! underlying struct.

pub mod visit;

use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

/// Inline storage for the dotted parts of a qualified name.
///
/// Names have between one and four parts (`catalog.schema.table.column`),
/// so four inline slots cover every well-formed reference without a heap
/// allocation for the spine.
pub type NameParts = SmallVec<[String; 4]>;

// ---------------------------------------------------------------------------
// Pos — source location tracking
// ---------------------------------------------------------------------------

/// A position in the original SQL source text.
///
/// Positions are advisory: they feed error messages and diagnostics, and
/// they deliberately do not participate in node equality — two trees that
/// differ only in where their tokens sat in the source compare equal.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pos {
    /// Byte offset from the start of the input.
    pub offset: u32,
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number (in bytes from the line start).
    pub column: u32,
}

impl Pos {
    /// The invalid placeholder position (line 0).
    pub const NONE: Self = Self {
        offset: 0,
        line: 0,
        column: 0,
    };

    /// Create a position.
    #[must_use]
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Whether this position points at real source text.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.line > 0
    }
}

impl PartialEq for Pos {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Pos {}

impl Hash for Pos {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A single parsed SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Box<SelectStatement>),
    Insert(Box<InsertStatement>),
    Update(Box<UpdateStatement>),
    Delete(Box<DeleteStatement>),
    CreateTable(Box<CreateTableStatement>),
    AlterTable(Box<AlterTableStatement>),
    DropTable(DropTableStatement),
    CreateIndex(Box<CreateIndexStatement>),
    DropIndex(DropIndexStatement),
    Truncate(TruncateStatement),
    Explain(Box<ExplainStatement>),
    SetOp(Box<SetOpStatement>),
    Values(ValuesStatement),
}

impl Statement {
    /// Source position of the statement's first token.
    #[must_use]
    pub fn pos(&self) -> Pos {
        match self {
            Self::Select(s) => s.pos,
            Self::Insert(s) => s.pos,
            Self::Update(s) => s.pos,
            Self::Delete(s) => s.pos,
            Self::CreateTable(s) => s.pos,
            Self::AlterTable(s) => s.pos,
            Self::DropTable(s) => s.pos,
            Self::CreateIndex(s) => s.pos,
            Self::DropIndex(s) => s.pos,
            Self::Truncate(s) => s.pos,
            Self::Explain(s) => s.pos,
            Self::SetOp(s) => s.pos,
            Self::Values(s) => s.pos,
        }
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub pos: Pos,
    /// Leading `WITH` clause, if any.
    pub with: Option<WithClause>,
    pub distinct: bool,
    pub columns: Vec<SelectItem>,
    /// MySQL `INTO OUTFILE/DUMPFILE/@vars`.
    pub into: Option<SelectInto>,
    pub from: Option<TableExpr>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    /// Named `WINDOW` definitions.
    pub windows: Vec<WindowDef>,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
    /// `FOR UPDATE` / `FOR SHARE` row locking.
    pub lock: Option<LockClause>,
}

/// MySQL `SELECT ... INTO` target.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectInto {
    Outfile(String),
    Dumpfile(String),
    /// `INTO @a, @b` variable list; entries keep their source spelling.
    Vars(Vec<String>),
}

/// Row-locking clause on a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockClause {
    pub mode: LockMode,
    pub wait: LockWait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Update,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockWait {
    #[default]
    Default,
    Nowait,
    SkipLocked,
}

/// An INSERT (or MySQL REPLACE) statement.
///
/// Exactly one row source is present, enforced by [`InsertSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub pos: Pos,
    pub with: Option<WithClause>,
    /// `REPLACE INTO` instead of `INSERT INTO`.
    pub replace: bool,
    /// MySQL `INSERT IGNORE`.
    pub ignore: bool,
    pub table: TableRef,
    pub columns: Vec<ColumnRef>,
    pub source: InsertSource,
    /// MySQL `ON DUPLICATE KEY UPDATE` assignments.
    pub on_duplicate: Vec<Assignment>,
    /// PostgreSQL `ON CONFLICT` clause.
    pub on_conflict: Option<OnConflict>,
    pub returning: Vec<SelectItem>,
}

/// Where an INSERT's rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// `VALUES (..), (..)`.
    Values(Vec<Vec<Expr>>),
    /// `INSERT INTO t SELECT ...` (possibly WITH-prefixed or a set op).
    Select(Box<Statement>),
    /// `DEFAULT VALUES`.
    DefaultValues,
}

/// PostgreSQL `ON CONFLICT [(cols)] [WHERE ..] DO NOTHING | DO UPDATE SET ..`.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    pub columns: Vec<String>,
    pub where_clause: Option<Expr>,
    pub action: ConflictAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate(Vec<Assignment>),
}

/// A `column = value` pair in SET / ON DUPLICATE KEY UPDATE / DO UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: ColumnRef,
    pub value: Expr,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub pos: Pos,
    pub with: Option<WithClause>,
    pub table: TableExpr,
    pub set: Vec<Assignment>,
    /// PostgreSQL `UPDATE .. FROM`.
    pub from: Option<TableExpr>,
    pub where_clause: Option<Expr>,
    /// MySQL extension.
    pub order_by: Vec<OrderingTerm>,
    /// MySQL extension.
    pub limit: Option<LimitClause>,
    pub returning: Vec<SelectItem>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub pos: Pos,
    pub with: Option<WithClause>,
    pub table: TableExpr,
    /// PostgreSQL `DELETE .. USING`.
    pub using: Option<TableExpr>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
    pub returning: Vec<SelectItem>,
}

/// A set operation: `UNION` / `INTERSECT` / `EXCEPT`.
///
/// Chains are left-associative: `a UNION b UNION c` is
/// `SetOp(SetOp(a, b), c)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOpStatement {
    pub pos: Pos,
    pub op: SetOpKind,
    pub all: bool,
    pub left: Statement,
    pub right: Statement,
    /// Trailing ORDER BY applying to the whole compound.
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// A `WITH` clause introducing common table expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

/// A single common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub query: Box<Statement>,
}

/// A bare `VALUES (..), (..)` statement (also usable as a table primary).
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesStatement {
    pub pos: Pos,
    pub rows: Vec<Vec<Expr>>,
}

/// CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub pos: Pos,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    /// MySQL table options (`ENGINE=InnoDB`, ...).
    pub options: Vec<TableOption>,
    /// `CREATE TABLE .. AS SELECT`.
    pub as_select: Option<Box<Statement>>,
}

/// A column definition inside CREATE TABLE or ALTER TABLE ADD.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

/// A SQL data type as written, with optional arguments and modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataType {
    /// Type name; two-word forms keep the space (`DOUBLE PRECISION`).
    pub name: String,
    pub length: Option<u32>,
    pub scale: Option<u32>,
    /// MySQL `UNSIGNED`.
    pub unsigned: bool,
    /// PostgreSQL array suffix (`INT[]` or `INT ARRAY`).
    pub array: bool,
    /// MySQL `CHARACTER SET`.
    pub charset: Option<String>,
    pub collation: Option<String>,
}

/// A column-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConstraint {
    pub name: Option<String>,
    pub kind: ColumnConstraintKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraintKind {
    NotNull,
    PrimaryKey,
    Unique,
    Default(Expr),
    Check(Expr),
    References(ForeignKeyRef),
    Generated { expr: Expr, stored: bool },
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    pub name: Option<String>,
    pub kind: TableConstraintKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraintKind {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        reference: ForeignKeyRef,
    },
    Check(Expr),
}

/// The target of a REFERENCES clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyRef {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub on_delete: Option<RefAction>,
    pub on_update: Option<RefAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefAction {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

/// A `NAME = value` table option after CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOption {
    pub name: String,
    pub value: String,
}

/// ALTER TABLE with a comma-separated action list.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub pos: Pos,
    pub table: TableRef,
    pub actions: Vec<AlterAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddColumn(ColumnDef),
    DropColumn {
        name: String,
        if_exists: bool,
        cascade: bool,
    },
    RenameColumn {
        old_name: String,
        new_name: String,
    },
    RenameTable(TableRef),
    ModifyColumn(ModifyColumn),
    AddConstraint(TableConstraint),
    DropConstraint {
        name: String,
        if_exists: bool,
        cascade: bool,
    },
}

/// `MODIFY COLUMN` / `ALTER COLUMN` payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModifyColumn {
    pub name: String,
    /// MySQL `MODIFY COLUMN name <full definition>`.
    pub new_def: Option<ColumnDef>,
    pub set_default: Option<Expr>,
    pub drop_default: bool,
    pub set_not_null: bool,
    pub drop_not_null: bool,
}

/// DROP TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub pos: Pos,
    pub if_exists: bool,
    pub tables: Vec<TableRef>,
    pub cascade: bool,
}

/// CREATE INDEX.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub pos: Pos,
    pub unique: bool,
    /// PostgreSQL `CONCURRENTLY`.
    pub concurrently: bool,
    pub if_not_exists: bool,
    pub name: Option<String>,
    pub table: TableRef,
    /// PostgreSQL access method (`USING btree`).
    pub using: Option<String>,
    pub columns: Vec<IndexColumn>,
    /// Partial index predicate.
    pub where_clause: Option<Expr>,
}

/// One indexed column: a plain name or a parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub key: IndexKey,
    pub desc: bool,
    pub nulls_first: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey {
    Named(String),
    Expr(Expr),
}

/// DROP INDEX.
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStatement {
    pub pos: Pos,
    pub concurrently: bool,
    pub if_exists: bool,
    pub name: String,
    /// MySQL `DROP INDEX name ON table`.
    pub table: Option<TableRef>,
    pub cascade: bool,
}

/// TRUNCATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncateStatement {
    pub pos: Pos,
    pub tables: Vec<TableRef>,
    pub cascade: bool,
}

/// EXPLAIN wrapper around another statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainStatement {
    pub pos: Pos,
    pub analyze: bool,
    pub verbose: bool,
    pub format: Option<String>,
    pub stmt: Statement,
}

// ---------------------------------------------------------------------------
// Select items
// ---------------------------------------------------------------------------

/// An entry in a SELECT list (or RETURNING clause).
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*` or `qualifier.*`.
    Star(StarExpr),
    /// An expression with an optional alias.
    Expr(AliasedExpr),
}

/// An expression with an optional `AS alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedExpr {
    pub pos: Pos,
    pub expr: Expr,
    pub alias: Option<String>,
}

/// `*`, `t.*`, or the `*` inside `COUNT(*)`.
///
/// A qualified star stores only its single immediate qualifier. The
/// qualifier is `Some` whenever a dot preceded the star, so an empty
/// qualifier (`"".*`) is distinguishable from no qualifier at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StarExpr {
    pub pos: Pos,
    pub qualifier: Option<String>,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Column(ColumnRef),
    Param(Param),
    Binary {
        pos: Pos,
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        pos: Pos,
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Paren {
        pos: Pos,
        expr: Box<Expr>,
    },
    Func(Box<FuncExpr>),
    Case(Box<CaseExpr>),
    Cast {
        pos: Pos,
        expr: Box<Expr>,
        data_type: DataType,
    },
    In(Box<InExpr>),
    Between(Box<BetweenExpr>),
    Like(Box<LikeExpr>),
    Is {
        pos: Pos,
        expr: Box<Expr>,
        not: bool,
        test: IsTest,
    },
    Subquery(Box<Subquery>),
    Exists {
        pos: Pos,
        not: bool,
        subquery: Box<Subquery>,
    },
    Interval {
        pos: Pos,
        value: Box<Expr>,
        unit: Option<String>,
    },
    Extract {
        pos: Pos,
        field: String,
        source: Box<Expr>,
    },
    Trim(Box<TrimExpr>),
    Substring(Box<SubstringExpr>),
    Position {
        pos: Pos,
        needle: Box<Expr>,
        haystack: Box<Expr>,
    },
    Array {
        pos: Pos,
        elements: Vec<Expr>,
    },
    Subscript {
        pos: Pos,
        expr: Box<Expr>,
        index: Box<Expr>,
    },
    Collate {
        pos: Pos,
        expr: Box<Expr>,
        collation: String,
    },
    Star(StarExpr),
}

impl Expr {
    /// Source position of the expression's first token.
    #[must_use]
    pub fn pos(&self) -> Pos {
        match self {
            Self::Literal(l) => l.pos,
            Self::Column(c) => c.pos,
            Self::Param(p) => p.pos,
            Self::Binary { pos, .. }
            | Self::Unary { pos, .. }
            | Self::Paren { pos, .. }
            | Self::Cast { pos, .. }
            | Self::Is { pos, .. }
            | Self::Exists { pos, .. }
            | Self::Interval { pos, .. }
            | Self::Extract { pos, .. }
            | Self::Position { pos, .. }
            | Self::Array { pos, .. }
            | Self::Subscript { pos, .. }
            | Self::Collate { pos, .. } => *pos,
            Self::Func(f) => f.pos,
            Self::Case(c) => c.pos,
            Self::In(i) => i.pos,
            Self::Between(b) => b.pos,
            Self::Like(l) => l.pos,
            Self::Subquery(s) => s.pos,
            Self::Trim(t) => t.pos,
            Self::Substring(s) => s.pos,
            Self::Star(s) => s.pos,
        }
    }
}

/// A literal value with its textual form preserved for round-tripping.
///
/// `text` is the raw source spelling for numbers (`0x1F`, `.5`, `1e10`),
/// the decoded content for strings, the hex digits for blobs, and the
/// canonical word (`NULL`, `TRUE`, `FALSE`, `DEFAULT`) otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub pos: Pos,
    pub kind: LiteralKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Null,
    Int,
    Float,
    Str,
    Bool,
    Blob,
}

/// A column reference: one to four dotted parts, column last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnRef {
    pub pos: Pos,
    pub parts: NameParts,
}

impl ColumnRef {
    /// Build a reference from name parts.
    #[must_use]
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            pos: Pos::NONE,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// The column name (last part).
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }

    /// The table qualifier (second-to-last part), if present.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.part_from_end(1)
    }

    /// The schema qualifier (third-to-last part), if present.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.part_from_end(2)
    }

    /// The catalog qualifier (fourth-to-last part), if present.
    #[must_use]
    pub fn catalog(&self) -> Option<&str> {
        self.part_from_end(3)
    }

    fn part_from_end(&self, n: usize) -> Option<&str> {
        self.parts
            .len()
            .checked_sub(n + 1)
            .map(|i| self.parts[i].as_str())
    }
}

/// A table name: one to three dotted parts, table last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRef {
    pub pos: Pos,
    pub parts: NameParts,
}

impl TableRef {
    /// Build a reference from name parts.
    #[must_use]
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            pos: Pos::NONE,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// The table name (last part).
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }

    /// The schema qualifier, if present.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.parts
            .len()
            .checked_sub(2)
            .map(|i| self.parts[i].as_str())
    }

    /// The catalog qualifier, if present.
    #[must_use]
    pub fn catalog(&self) -> Option<&str> {
        self.parts
            .len()
            .checked_sub(3)
            .map(|i| self.parts[i].as_str())
    }
}

/// A bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pos: Pos,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// `?`
    Anonymous,
    /// `$1`
    Numbered(u32),
    /// `:name`
    Colon(String),
    /// `@name`
    At(String),
}

/// Binary operators, lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    Xor,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    BitOr,
    BitXor,
    BitAnd,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Concat,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    BitNot,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncExpr {
    pub pos: Pos,
    /// Name as written; case is preserved.
    pub name: String,
    /// `COUNT(DISTINCT x)`.
    pub distinct: bool,
    /// Arguments; `COUNT(*)` carries a single [`Expr::Star`].
    pub args: Vec<Expr>,
    /// `FILTER (WHERE ..)` predicate.
    pub filter: Option<Expr>,
    /// `OVER ..` window specification.
    pub over: Option<WindowSpec>,
}

/// A CASE expression. `whens` is never empty in parser output.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    pub pos: Pos,
    pub operand: Option<Expr>,
    pub whens: Vec<When>,
    pub else_expr: Option<Expr>,
}

/// One `WHEN cond THEN result` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct When {
    pub cond: Expr,
    pub result: Expr,
}

/// `expr [NOT] IN (list | subquery)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InExpr {
    pub pos: Pos,
    pub expr: Expr,
    pub not: bool,
    pub set: InSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InSet {
    List(Vec<Expr>),
    Subquery(Box<Statement>),
}

/// `expr [NOT] BETWEEN low AND high`.
#[derive(Debug, Clone, PartialEq)]
pub struct BetweenExpr {
    pub pos: Pos,
    pub expr: Expr,
    pub not: bool,
    pub low: Expr,
    pub high: Expr,
}

/// `expr [NOT] LIKE/ILIKE pattern [ESCAPE esc]`.
///
/// `SIMILAR TO` normalizes to the LIKE shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeExpr {
    pub pos: Pos,
    pub expr: Expr,
    pub pattern: Expr,
    pub not: bool,
    pub ilike: bool,
    pub escape: Option<Expr>,
}

/// What an `IS [NOT]` expression tests for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsTest {
    Null,
    True,
    False,
    Unknown,
}

/// A parenthesized query usable as an expression or a table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Subquery {
    pub pos: Pos,
    pub query: Statement,
}

/// `TRIM([LEADING|TRAILING|BOTH] [chars] FROM expr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimExpr {
    pub pos: Pos,
    pub direction: TrimDirection,
    pub chars: Option<Expr>,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimDirection {
    #[default]
    Both,
    Leading,
    Trailing,
}

/// `SUBSTRING(expr [FROM n] [FOR m])`, also accepting the comma form.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstringExpr {
    pub pos: Pos,
    pub expr: Expr,
    pub from: Option<Expr>,
    pub for_length: Option<Expr>,
}

// ---------------------------------------------------------------------------
// Table expressions
// ---------------------------------------------------------------------------

/// A table expression in a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableExpr {
    Table(TableRef),
    Aliased(Box<AliasedTable>),
    Join(Box<JoinExpr>),
    Paren(Box<ParenTable>),
    Subquery(Box<Subquery>),
    Values(ValuesStatement),
    List(TableList),
}

impl TableExpr {
    /// Source position of the table expression's first token.
    #[must_use]
    pub fn pos(&self) -> Pos {
        match self {
            Self::Table(t) => t.pos,
            Self::Aliased(a) => a.pos,
            Self::Join(j) => j.pos,
            Self::Paren(p) => p.pos,
            Self::Subquery(s) => s.pos,
            Self::Values(v) => v.pos,
            Self::List(l) => l.pos,
        }
    }
}

/// A table expression wrapped with an alias, column aliases, or hints.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedTable {
    pub pos: Pos,
    pub expr: TableExpr,
    pub alias: Option<String>,
    /// Column alias list after a derived table: `AS t (c1, c2)`.
    pub column_aliases: Vec<String>,
    /// MySQL index hints.
    pub hints: Vec<IndexHint>,
}

/// A MySQL `USE|FORCE|IGNORE INDEX` hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHint {
    pub kind: IndexHintKind,
    pub scope: IndexHintScope,
    pub indexes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHintKind {
    Use,
    Force,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexHintScope {
    #[default]
    All,
    Join,
    OrderBy,
    GroupBy,
}

/// A join between two table expressions.
///
/// `CROSS` and `NATURAL` joins carry neither `on` nor `using`; other joins
/// carry at most one of the two.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinExpr {
    pub pos: Pos,
    pub kind: JoinKind,
    pub natural: bool,
    /// PostgreSQL `JOIN LATERAL ..`.
    pub lateral: bool,
    pub left: TableExpr,
    pub right: TableExpr,
    pub on: Option<Expr>,
    pub using: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// A parenthesized table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenTable {
    pub pos: Pos,
    pub expr: TableExpr,
}

/// A comma-separated table list (multi-table UPDATE/DELETE targets).
#[derive(Debug, Clone, PartialEq)]
pub struct TableList {
    pub pos: Pos,
    pub tables: Vec<TableExpr>,
}

// ---------------------------------------------------------------------------
// Ordering, limits, windows
// ---------------------------------------------------------------------------

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTerm {
    pub pos: Pos,
    pub expr: Expr,
    pub desc: bool,
    /// `NULLS FIRST` (true) / `NULLS LAST` (false) / unspecified.
    pub nulls_first: Option<bool>,
}

/// LIMIT / OFFSET, after normalizing the MySQL comma form and FETCH.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LimitClause {
    pub pos: Pos,
    pub count: Option<Expr>,
    pub offset: Option<Expr>,
}

/// A named window definition in a WINDOW clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDef {
    pub name: String,
    pub spec: WindowSpec,
}

/// A window specification: named reference or parenthesized body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub pos: Pos,
    /// Base window name (bare `OVER w` or leading name in the body).
    pub name: Option<String>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderingTerm>,
    pub frame: Option<WindowFrame>,
}

impl WindowSpec {
    /// True when this is a bare named-window reference (`OVER w`).
    #[must_use]
    pub fn is_named_ref(&self) -> bool {
        self.name.is_some()
            && self.partition_by.is_empty()
            && self.order_by.is_empty()
            && self.frame.is_none()
    }
}

/// A window frame clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub kind: FrameKind,
    pub start: FrameBound,
    /// Present only for the `BETWEEN .. AND ..` form.
    pub end: Option<FrameBound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Rows,
    Range,
    Groups,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    CurrentRow,
    UnboundedPreceding,
    UnboundedFollowing,
    Preceding(Expr),
    Following(Expr),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref_accessors() {
        let col = ColumnRef::new(["cat", "sch", "tbl", "col"]);
        assert_eq!(col.name(), "col");
        assert_eq!(col.table(), Some("tbl"));
        assert_eq!(col.schema(), Some("sch"));
        assert_eq!(col.catalog(), Some("cat"));

        let bare = ColumnRef::new(["x"]);
        assert_eq!(bare.name(), "x");
        assert_eq!(bare.table(), None);
        assert_eq!(bare.schema(), None);
        assert_eq!(bare.catalog(), None);
    }

    #[test]
    fn test_table_ref_accessors() {
        let t = TableRef::new(["db", "s", "t"]);
        assert_eq!(t.name(), "t");
        assert_eq!(t.schema(), Some("s"));
        assert_eq!(t.catalog(), Some("db"));
    }

    #[test]
    fn test_pos_is_advisory_for_equality() {
        let a = Literal {
            pos: Pos::new(0, 1, 1),
            kind: LiteralKind::Int,
            text: "1".to_owned(),
        };
        let b = Literal {
            pos: Pos::new(40, 3, 7),
            kind: LiteralKind::Int,
            text: "1".to_owned(),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_star_qualifier_distinguishes_empty_from_absent() {
        let bare = StarExpr::default();
        let empty = StarExpr {
            pos: Pos::NONE,
            qualifier: Some(String::new()),
        };
        assert_ne!(bare, empty);
    }
}
