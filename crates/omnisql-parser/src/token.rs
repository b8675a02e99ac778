//! SQL token types.
//!
//! A token is a `(kind, text, position)` triple. `text` is the exact
//! matched substring for operators, numbers, and bare identifiers, and the
//! *decoded* content for quoted strings and quoted identifiers. Keyword
//! tokens keep their source spelling so they can double as identifiers in
//! the many contexts SQL allows that.

use std::borrow::Cow;
use std::fmt;

use omnisql_ast::Pos;

/// A single lexed token.
///
/// Borrows the source text wherever possible; decoding an escape sequence
/// is the only thing that forces an owned copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: Cow<'a, str>,
    pub pos: Pos,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<Cow<'a, str>>, pos: Pos) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
        }
    }
}

/// Token discriminant.
///
/// The variant order is meaningful: literals, then operators, then the
/// keyword block, so the classification predicates reduce to discriminant
/// range checks. Keywords cover the union of the MySQL, PostgreSQL,
/// SQLite, SQL Server, and Oracle reserved-word lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenKind {
    /// Invalid input (unterminated construct or stray byte).
    Illegal,
    /// End of input.
    Eof,
    /// `-- ..`, `# ..`, or `/* .. */` comment; text includes delimiters.
    Comment,

    // === Literals ===
    Ident,
    Int,
    Float,
    Str,
    Blob,
    Param,

    // === Operators and punctuation ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Colon,
    /// `::` (PostgreSQL cast)
    DoubleColon,
    /// `||`
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    ShiftLeft,
    ShiftRight,
    /// `->` (JSON access)
    Arrow,
    /// `->>`
    DoubleArrow,
    /// `#>` (PostgreSQL JSON path)
    HashArrow,
    /// `#>>`
    HashDoubleArrow,
    /// `?|` (PostgreSQL hstore)
    QuestionPipe,
    /// `?&`
    QuestionAmp,
    At,
    /// `@@` (PostgreSQL text search)
    AtAt,

    // === Keywords: DML ===
    KwSelect,
    KwFrom,
    KwWhere,
    KwAnd,
    KwOr,
    KwXor,
    KwNot,
    KwIn,
    KwLike,
    KwIlike,
    KwSimilar,
    KwBetween,
    KwIs,
    KwIsnull,
    KwNotnull,
    KwNull,
    KwTrue,
    KwFalse,
    KwUnknown,
    KwAs,
    KwAll,
    KwDistinct,
    KwUnique,

    // === Keywords: joins ===
    KwJoin,
    KwInner,
    KwLeft,
    KwRight,
    KwFull,
    KwOuter,
    KwCross,
    KwNatural,
    KwOn,
    KwUsing,

    // === Keywords: ordering and grouping ===
    KwOrder,
    KwBy,
    KwAsc,
    KwDesc,
    KwNulls,
    KwFirst,
    KwLast,
    KwGroup,
    KwHaving,

    // === Keywords: limits ===
    KwLimit,
    KwOffset,
    KwFetch,
    KwNext,
    KwRow,
    KwRows,
    KwOnly,
    KwPercent,
    KwWith,
    KwTies,

    // === Keywords: set operations ===
    KwUnion,
    KwIntersect,
    KwExcept,

    // === Keywords: INSERT ===
    KwInsert,
    KwInto,
    KwValues,
    KwDefault,
    KwReturning,
    KwReplace,
    KwIgnore,
    KwDuplicate,
    KwKey,

    // === Keywords: UPDATE / DELETE ===
    KwUpdate,
    KwSet,
    KwDelete,

    // === Keywords: DDL ===
    KwCreate,
    KwAlter,
    KwDrop,
    KwTable,
    KwIndex,
    KwView,
    KwDatabase,
    KwSchema,
    KwIf,
    KwExists,
    KwTemporary,
    KwTemp,
    KwUnlogged,
    KwPrimary,
    KwForeign,
    KwReferences,
    KwConstraint,
    KwCheck,
    KwCascade,
    KwRestrict,
    KwNo,
    KwAction,
    KwDeferrable,
    KwInitially,
    KwDeferred,
    KwImmediate,
    KwColumn,
    KwAdd,
    KwRename,
    KwTo,
    KwModify,
    KwChange,

    // === Keywords: data types ===
    KwInt,
    KwInteger,
    KwSmallint,
    KwBigint,
    KwTinyint,
    KwMediumint,
    KwReal,
    KwDouble,
    KwPrecision,
    KwFloat,
    KwDecimal,
    KwNumeric,
    KwChar,
    KwVarchar,
    KwText,
    KwBlob,
    KwBinary,
    KwVarbinary,
    KwDate,
    KwTime,
    KwDatetime,
    KwTimestamp,
    KwYear,
    KwBoolean,
    KwBool,
    KwJson,
    KwJsonb,
    KwUuid,
    KwSerial,
    KwBigserial,
    KwSmallserial,
    KwArray,
    KwUnsigned,
    KwSigned,
    KwZerofill,
    KwVarying,
    KwZone,

    // === Keywords: expressions ===
    KwCase,
    KwWhen,
    KwThen,
    KwElse,
    KwEnd,
    KwCast,
    KwConvert,
    KwCollate,
    KwOver,
    KwPartition,
    KwWindow,
    KwFilter,
    KwWithin,
    KwRespect,
    KwCurrent,
    KwUnbounded,
    KwPreceding,
    KwFollowing,
    KwRange,
    KwGroups,

    // === Keywords: aggregates ===
    KwCount,
    KwSum,
    KwAvg,
    KwMin,
    KwMax,
    KwCoalesce,
    KwNullif,
    KwGreatest,
    KwLeast,
    KwAny,
    KwSome,
    KwEvery,

    // === Keywords: subqueries ===
    KwLateral,
    KwRecursive,
    KwMaterialized,

    // === Keywords: locking ===
    KwFor,
    KwShare,
    KwNowait,
    KwSkip,
    KwLocked,

    // === Keywords: transactions ===
    KwBegin,
    KwCommit,
    KwRollback,
    KwSavepoint,
    KwRelease,
    KwTransaction,
    KwWork,
    KwIsolation,
    KwLevel,
    KwRead,
    KwWrite,
    KwCommitted,
    KwUncommitted,
    KwRepeatable,
    KwSerializable,
    KwSnapshot,
    KwOrdinality,

    // === Keywords: utility statements ===
    KwAnalyze,
    KwExplain,
    KwVerbose,
    KwFormat,
    KwCosts,
    KwBuffers,
    KwTiming,
    KwTruncate,
    KwVacuum,
    KwGrant,
    KwRevoke,
    KwPrivileges,
    KwPublic,
    KwRole,
    KwUser,
    KwAdmin,
    KwOption,
    KwGranted,

    // === Keywords: date and time ===
    KwInterval,
    KwExtract,
    KwEpoch,
    KwCentury,
    KwDecade,
    KwMillennium,
    KwQuarter,
    KwMonth,
    KwWeek,
    KwDay,
    KwHour,
    KwMinute,
    KwSecond,
    KwMicrosecond,
    KwTimezone,
    KwTimezoneHour,
    KwTimezoneMinute,

    // === Keywords: string functions ===
    KwSubstring,
    KwTrim,
    KwLeading,
    KwTrailing,
    KwBoth,
    KwPosition,
    KwOverlay,
    KwPlacing,

    // === Keywords: predicates ===
    KwSymmetric,
    KwAsymmetric,
    KwEscape,
    KwGlob,
    KwRegexp,
    KwRlike,
    KwMatch,
    KwAgainst,
    KwSounds,

    // === Keywords: SQLite ===
    KwAutoincrement,
    KwRowid,
    KwWithout,

    // === Keywords: MySQL ===
    KwAutoIncrement,
    KwEngine,
    KwCharset,
    KwCharacter,
    KwComment,
    KwStorage,
    KwMemory,
    KwDisk,
    KwTablespace,
    KwData,
    KwDirectory,
    KwConnection,
    KwPartitions,
    KwSubpartition,
    KwSubpartitions,
    KwHash,
    KwLinear,
    KwList,
    KwLess,
    KwThan,
    KwMaxvalue,
    KwAlgorithm,
    KwInplace,
    KwCopy,
    KwLock,
    KwNone,
    KwShared,
    KwExclusive,
    KwForce,
    KwUse,
    KwStraightJoin,
    KwSqlCalcFoundRows,
    KwSqlSmallResult,
    KwSqlBigResult,
    KwSqlBufferResult,
    KwHighPriority,
    KwLowPriority,
    KwDelayed,
    KwQuick,
    KwConcurrent,
    KwLocal,
    KwInfile,
    KwLoad,
    KwOutfile,
    KwTerminated,
    KwEnclosed,
    KwEscaped,
    KwLines,
    KwStarting,
    KwOptionally,
    KwFields,

    // === Keywords: PostgreSQL ===
    KwConflict,
    KwDo,
    KwNothing,
    KwOverriding,
    KwSystem,
    KwValue,
    KwGenerated,
    KwAlways,
    KwIdentity,
    KwStored,
    KwVirtual,
    KwInclude,
    KwBtree,
    KwGin,
    KwGist,
    KwSpgist,
    KwBrin,
    KwConcurrently,
    KwInherit,
    KwInherits,
    KwOf,
    KwOids,
    KwOwner,
    KwOwned,
    KwDepends,
    KwExtension,
    KwSequence,
    KwCycle,
    KwIncrement,
    KwMinvalue,
    KwStart,
    KwCache,
    KwRestart,
    KwContinue,
    KwPreserve,
    KwDispose,

    // === Keywords: SQL Server ===
    KwTop,
    KwNolock,
    KwReaduncommitted,
    KwReadcommitted,
    KwRepeatableread,
    KwRowlock,
    KwPaglock,
    KwTablock,
    KwTablockx,
    KwUpdlock,
    KwXlock,
    KwHoldlock,
    KwPivot,
    KwUnpivot,
    KwApply,
    KwMerge,
    KwInserted,

    // === Keywords: Oracle ===
    KwRownum,
    KwSysdate,
    KwSystimestamp,
    KwDual,
    KwPrior,
    KwNocycle,
    KwSiblings,
    KwSample,
    KwSeed,
    KwFlashback,
    KwScn,
    KwVersions,
    KwKeep,
    KwDenseRank,
    KwModel,
    KwDimension,
    KwMeasures,
    KwRules,
    KwIterate,
    KwUntil,
    KwBulk,
    KwForall,
    KwCollect,
    KwPipelined,
}

impl TokenKind {
    /// True for literal-carrying kinds (identifier, number, string, blob,
    /// parameter).
    #[must_use]
    pub fn is_literal(self) -> bool {
        let d = self as u16;
        (Self::Ident as u16..=Self::Param as u16).contains(&d)
    }

    /// True for operator and punctuation kinds.
    #[must_use]
    pub fn is_operator(self) -> bool {
        let d = self as u16;
        (Self::Plus as u16..=Self::AtAt as u16).contains(&d)
    }

    /// True for reserved-word kinds.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        self as u16 >= Self::KwSelect as u16
    }

    /// True for keywords that can begin a statement; used as error-recovery
    /// sync points by `parse_all`.
    #[must_use]
    pub fn is_statement_start(self) -> bool {
        matches!(
            self,
            Self::KwSelect
                | Self::KwInsert
                | Self::KwReplace
                | Self::KwUpdate
                | Self::KwDelete
                | Self::KwCreate
                | Self::KwAlter
                | Self::KwDrop
                | Self::KwWith
                | Self::KwTruncate
                | Self::KwExplain
                | Self::KwAnalyze
                | Self::KwValues
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
            Self::Comment => "COMMENT",
            Self::Ident => "IDENT",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Str => "STRING",
            Self::Blob => "BLOB",
            Self::Param => "PARAM",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Dot => ".",
            Self::Colon => ":",
            Self::DoubleColon => "::",
            Self::Concat => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitNot => "~",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Arrow => "->",
            Self::DoubleArrow => "->>",
            Self::HashArrow => "#>",
            Self::HashDoubleArrow => "#>>",
            Self::QuestionPipe => "?|",
            Self::QuestionAmp => "?&",
            Self::At => "@",
            Self::AtAt => "@@",
            // Keywords render their Debug name, which is unambiguous in
            // error messages (`KwFrom`, `KwSelect`, ...).
            other => return write!(f, "{other:?}"),
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert!(TokenKind::Ident.is_literal());
        assert!(TokenKind::Param.is_literal());
        assert!(!TokenKind::Plus.is_literal());

        assert!(TokenKind::Plus.is_operator());
        assert!(TokenKind::AtAt.is_operator());
        assert!(!TokenKind::KwSelect.is_operator());

        assert!(TokenKind::KwSelect.is_keyword());
        assert!(TokenKind::KwPipelined.is_keyword());
        assert!(!TokenKind::Eof.is_keyword());
        assert!(!TokenKind::Str.is_keyword());
    }

    #[test]
    fn test_statement_start_keywords() {
        assert!(TokenKind::KwSelect.is_statement_start());
        assert!(TokenKind::KwWith.is_statement_start());
        assert!(!TokenKind::KwFrom.is_statement_start());
    }

    #[test]
    fn test_display_for_operators_and_keywords() {
        assert_eq!(TokenKind::Concat.to_string(), "||");
        assert_eq!(TokenKind::DoubleColon.to_string(), "::");
        assert_eq!(TokenKind::KwFrom.to_string(), "KwFrom");
    }
}
