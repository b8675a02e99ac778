//! Case-insensitive keyword lookup.
//!
//! The table covers the union of reserved words across the supported
//! dialects. Lookup runs for every identifier-shaped run the lexer sees,
//! so it is allocation-free: already-lowercase identifiers (the common
//! case in machine-generated SQL) match directly, mixed-case identifiers
//! are lowered into a stack buffer, and anything longer than the longest
//! keyword is known to be a plain identifier without any comparison.

use crate::token::TokenKind;

/// No keyword is longer than this many bytes.
pub const MAX_KEYWORD_LEN: usize = 32;

/// Map an identifier-shaped run to its token kind.
///
/// Returns the keyword kind for reserved words (in any case mix) and
/// [`TokenKind::Ident`] otherwise.
#[must_use]
pub fn lookup_ident(ident: &str) -> TokenKind {
    if ident.len() > MAX_KEYWORD_LEN {
        return TokenKind::Ident;
    }
    if !ident.bytes().any(|b| b.is_ascii_uppercase()) {
        return find(ident);
    }
    let mut buf = [0u8; MAX_KEYWORD_LEN];
    let bytes = ident.as_bytes();
    for (dst, src) in buf.iter_mut().zip(bytes) {
        *dst = src.to_ascii_lowercase();
    }
    // Lowercasing ASCII bytes cannot break UTF-8 validity.
    match std::str::from_utf8(&buf[..bytes.len()]) {
        Ok(lower) => find(lower),
        Err(_) => TokenKind::Ident,
    }
}

/// True if the identifier is a reserved word in any supported dialect.
///
/// The formatter consults this to decide whether an identifier must be
/// quoted.
#[must_use]
pub fn is_keyword(ident: &str) -> bool {
    lookup_ident(ident) != TokenKind::Ident
}

#[allow(clippy::too_many_lines)]
fn find(lower: &str) -> TokenKind {
    use TokenKind::*;
    match lower {
        // DML
        "select" => KwSelect,
        "from" => KwFrom,
        "where" => KwWhere,
        "and" => KwAnd,
        "or" => KwOr,
        "xor" => KwXor,
        "not" => KwNot,
        "in" => KwIn,
        "like" => KwLike,
        "ilike" => KwIlike,
        "similar" => KwSimilar,
        "between" => KwBetween,
        "is" => KwIs,
        "isnull" => KwIsnull,
        "notnull" => KwNotnull,
        "null" => KwNull,
        "true" => KwTrue,
        "false" => KwFalse,
        "unknown" => KwUnknown,
        "as" => KwAs,
        "all" => KwAll,
        "distinct" => KwDistinct,
        "unique" => KwUnique,

        // Joins
        "join" => KwJoin,
        "inner" => KwInner,
        "left" => KwLeft,
        "right" => KwRight,
        "full" => KwFull,
        "outer" => KwOuter,
        "cross" => KwCross,
        "natural" => KwNatural,
        "on" => KwOn,
        "using" => KwUsing,

        // Ordering and grouping
        "order" => KwOrder,
        "by" => KwBy,
        "asc" => KwAsc,
        "desc" => KwDesc,
        "nulls" => KwNulls,
        "first" => KwFirst,
        "last" => KwLast,
        "group" => KwGroup,
        "having" => KwHaving,

        // Limits
        "limit" => KwLimit,
        "offset" => KwOffset,
        "fetch" => KwFetch,
        "next" => KwNext,
        "row" => KwRow,
        "rows" => KwRows,
        "only" => KwOnly,
        "percent" => KwPercent,
        "with" => KwWith,
        "ties" => KwTies,

        // Set operations
        "union" => KwUnion,
        "intersect" => KwIntersect,
        "except" => KwExcept,

        // INSERT
        "insert" => KwInsert,
        "into" => KwInto,
        "values" => KwValues,
        "default" => KwDefault,
        "returning" => KwReturning,
        "replace" => KwReplace,
        "ignore" => KwIgnore,
        "duplicate" => KwDuplicate,
        "key" => KwKey,

        // UPDATE / DELETE
        "update" => KwUpdate,
        "set" => KwSet,
        "delete" => KwDelete,

        // DDL
        "create" => KwCreate,
        "alter" => KwAlter,
        "drop" => KwDrop,
        "table" => KwTable,
        "index" => KwIndex,
        "view" => KwView,
        "database" => KwDatabase,
        "schema" => KwSchema,
        "if" => KwIf,
        "exists" => KwExists,
        "temporary" => KwTemporary,
        "temp" => KwTemp,
        "unlogged" => KwUnlogged,
        "primary" => KwPrimary,
        "foreign" => KwForeign,
        "references" => KwReferences,
        "constraint" => KwConstraint,
        "check" => KwCheck,
        "cascade" => KwCascade,
        "restrict" => KwRestrict,
        "no" => KwNo,
        "action" => KwAction,
        "deferrable" => KwDeferrable,
        "initially" => KwInitially,
        "deferred" => KwDeferred,
        "immediate" => KwImmediate,
        "column" => KwColumn,
        "add" => KwAdd,
        "rename" => KwRename,
        "to" => KwTo,
        "modify" => KwModify,
        "change" => KwChange,

        // Data types
        "int" => KwInt,
        "integer" => KwInteger,
        "smallint" => KwSmallint,
        "bigint" => KwBigint,
        "tinyint" => KwTinyint,
        "mediumint" => KwMediumint,
        "real" => KwReal,
        "double" => KwDouble,
        "precision" => KwPrecision,
        "float" => KwFloat,
        "decimal" => KwDecimal,
        "numeric" => KwNumeric,
        "char" => KwChar,
        "varchar" => KwVarchar,
        "text" => KwText,
        "blob" => KwBlob,
        "binary" => KwBinary,
        "varbinary" => KwVarbinary,
        "date" => KwDate,
        "time" => KwTime,
        "datetime" => KwDatetime,
        "timestamp" => KwTimestamp,
        "year" => KwYear,
        "boolean" => KwBoolean,
        "bool" => KwBool,
        "json" => KwJson,
        "jsonb" => KwJsonb,
        "uuid" => KwUuid,
        "serial" => KwSerial,
        "bigserial" => KwBigserial,
        "smallserial" => KwSmallserial,
        "array" => KwArray,
        "unsigned" => KwUnsigned,
        "signed" => KwSigned,
        "zerofill" => KwZerofill,
        "varying" => KwVarying,
        "zone" => KwZone,

        // Expressions
        "case" => KwCase,
        "when" => KwWhen,
        "then" => KwThen,
        "else" => KwElse,
        "end" => KwEnd,
        "cast" => KwCast,
        "convert" => KwConvert,
        "collate" => KwCollate,
        "over" => KwOver,
        "partition" => KwPartition,
        "window" => KwWindow,
        "filter" => KwFilter,
        "within" => KwWithin,
        "respect" => KwRespect,
        "current" => KwCurrent,
        "unbounded" => KwUnbounded,
        "preceding" => KwPreceding,
        "following" => KwFollowing,
        "range" => KwRange,
        "groups" => KwGroups,

        // Aggregates
        "count" => KwCount,
        "sum" => KwSum,
        "avg" => KwAvg,
        "min" => KwMin,
        "max" => KwMax,
        "coalesce" => KwCoalesce,
        "nullif" => KwNullif,
        "greatest" => KwGreatest,
        "least" => KwLeast,
        "any" => KwAny,
        "some" => KwSome,
        "every" => KwEvery,

        // Subqueries
        "lateral" => KwLateral,
        "recursive" => KwRecursive,
        "materialized" => KwMaterialized,

        // Locking
        "for" => KwFor,
        "share" => KwShare,
        "nowait" => KwNowait,
        "skip" => KwSkip,
        "locked" => KwLocked,

        // Transactions
        "begin" => KwBegin,
        "commit" => KwCommit,
        "rollback" => KwRollback,
        "savepoint" => KwSavepoint,
        "release" => KwRelease,
        "transaction" => KwTransaction,
        "work" => KwWork,
        "isolation" => KwIsolation,
        "level" => KwLevel,
        "read" => KwRead,
        "write" => KwWrite,
        "committed" => KwCommitted,
        "uncommitted" => KwUncommitted,
        "repeatable" => KwRepeatable,
        "serializable" => KwSerializable,
        "snapshot" => KwSnapshot,
        "ordinality" => KwOrdinality,

        // Utility statements
        "analyze" => KwAnalyze,
        "explain" => KwExplain,
        "verbose" => KwVerbose,
        "format" => KwFormat,
        "costs" => KwCosts,
        "buffers" => KwBuffers,
        "timing" => KwTiming,
        "truncate" => KwTruncate,
        "vacuum" => KwVacuum,
        "grant" => KwGrant,
        "revoke" => KwRevoke,
        "privileges" => KwPrivileges,
        "public" => KwPublic,
        "role" => KwRole,
        "user" => KwUser,
        "admin" => KwAdmin,
        "option" => KwOption,
        "granted" => KwGranted,

        // Date and time
        "interval" => KwInterval,
        "extract" => KwExtract,
        "epoch" => KwEpoch,
        "century" => KwCentury,
        "decade" => KwDecade,
        "millennium" => KwMillennium,
        "quarter" => KwQuarter,
        "month" => KwMonth,
        "week" => KwWeek,
        "day" => KwDay,
        "hour" => KwHour,
        "minute" => KwMinute,
        "second" => KwSecond,
        "microsecond" => KwMicrosecond,
        "timezone" => KwTimezone,
        "timezone_hour" => KwTimezoneHour,
        "timezone_minute" => KwTimezoneMinute,

        // String functions
        "substring" => KwSubstring,
        "trim" => KwTrim,
        "leading" => KwLeading,
        "trailing" => KwTrailing,
        "both" => KwBoth,
        "position" => KwPosition,
        "overlay" => KwOverlay,
        "placing" => KwPlacing,

        // Predicates
        "symmetric" => KwSymmetric,
        "asymmetric" => KwAsymmetric,
        "escape" => KwEscape,
        "glob" => KwGlob,
        "regexp" => KwRegexp,
        "rlike" => KwRlike,
        "match" => KwMatch,
        "against" => KwAgainst,
        "sounds" => KwSounds,

        // SQLite
        "autoincrement" => KwAutoincrement,
        "rowid" => KwRowid,
        "without" => KwWithout,

        // MySQL
        "auto_increment" => KwAutoIncrement,
        "engine" => KwEngine,
        "charset" => KwCharset,
        "character" => KwCharacter,
        "comment" => KwComment,
        "storage" => KwStorage,
        "memory" => KwMemory,
        "disk" => KwDisk,
        "tablespace" => KwTablespace,
        "data" => KwData,
        "directory" => KwDirectory,
        "connection" => KwConnection,
        "partitions" => KwPartitions,
        "subpartition" => KwSubpartition,
        "subpartitions" => KwSubpartitions,
        "hash" => KwHash,
        "linear" => KwLinear,
        "list" => KwList,
        "less" => KwLess,
        "than" => KwThan,
        "maxvalue" => KwMaxvalue,
        "algorithm" => KwAlgorithm,
        "inplace" => KwInplace,
        "copy" => KwCopy,
        "lock" => KwLock,
        "none" => KwNone,
        "shared" => KwShared,
        "exclusive" => KwExclusive,
        "force" => KwForce,
        "use" => KwUse,
        "straight_join" => KwStraightJoin,
        "sql_calc_found_rows" => KwSqlCalcFoundRows,
        "sql_small_result" => KwSqlSmallResult,
        "sql_big_result" => KwSqlBigResult,
        "sql_buffer_result" => KwSqlBufferResult,
        "high_priority" => KwHighPriority,
        "low_priority" => KwLowPriority,
        "delayed" => KwDelayed,
        "quick" => KwQuick,
        "concurrent" => KwConcurrent,
        "local" => KwLocal,
        "infile" => KwInfile,
        "load" => KwLoad,
        "outfile" => KwOutfile,
        "terminated" => KwTerminated,
        "enclosed" => KwEnclosed,
        "escaped" => KwEscaped,
        "lines" => KwLines,
        "starting" => KwStarting,
        "optionally" => KwOptionally,
        "fields" => KwFields,

        // PostgreSQL
        "conflict" => KwConflict,
        "do" => KwDo,
        "nothing" => KwNothing,
        "overriding" => KwOverriding,
        "system" => KwSystem,
        "value" => KwValue,
        "generated" => KwGenerated,
        "always" => KwAlways,
        "identity" => KwIdentity,
        "stored" => KwStored,
        "virtual" => KwVirtual,
        "include" => KwInclude,
        "btree" => KwBtree,
        "gin" => KwGin,
        "gist" => KwGist,
        "spgist" => KwSpgist,
        "brin" => KwBrin,
        "concurrently" => KwConcurrently,
        "inherit" => KwInherit,
        "inherits" => KwInherits,
        "of" => KwOf,
        "oids" => KwOids,
        "owner" => KwOwner,
        "owned" => KwOwned,
        "depends" => KwDepends,
        "extension" => KwExtension,
        "sequence" => KwSequence,
        "cycle" => KwCycle,
        "increment" => KwIncrement,
        "minvalue" => KwMinvalue,
        "start" => KwStart,
        "cache" => KwCache,
        "restart" => KwRestart,
        "continue" => KwContinue,
        "preserve" => KwPreserve,
        "dispose" => KwDispose,

        // SQL Server
        "top" => KwTop,
        "nolock" => KwNolock,
        "readuncommitted" => KwReaduncommitted,
        "readcommitted" => KwReadcommitted,
        "repeatableread" => KwRepeatableread,
        "rowlock" => KwRowlock,
        "paglock" => KwPaglock,
        "tablock" => KwTablock,
        "tablockx" => KwTablockx,
        "updlock" => KwUpdlock,
        "xlock" => KwXlock,
        "holdlock" => KwHoldlock,
        "pivot" => KwPivot,
        "unpivot" => KwUnpivot,
        "apply" => KwApply,
        "merge" => KwMerge,
        "inserted" => KwInserted,

        // Oracle
        "rownum" => KwRownum,
        "sysdate" => KwSysdate,
        "systimestamp" => KwSystimestamp,
        "dual" => KwDual,
        "prior" => KwPrior,
        "nocycle" => KwNocycle,
        "siblings" => KwSiblings,
        "sample" => KwSample,
        "seed" => KwSeed,
        "flashback" => KwFlashback,
        "scn" => KwScn,
        "versions" => KwVersions,
        "keep" => KwKeep,
        "dense_rank" => KwDenseRank,
        "model" => KwModel,
        "dimension" => KwDimension,
        "measures" => KwMeasures,
        "rules" => KwRules,
        "iterate" => KwIterate,
        "until" => KwUntil,
        "bulk" => KwBulk,
        "forall" => KwForall,
        "collect" => KwCollect,
        "pipelined" => KwPipelined,

        _ => Ident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup_ident("select"), TokenKind::KwSelect);
        assert_eq!(lookup_ident("SELECT"), TokenKind::KwSelect);
        assert_eq!(lookup_ident("SeLeCt"), TokenKind::KwSelect);
    }

    #[test]
    fn test_lookup_non_keyword() {
        assert_eq!(lookup_ident("users"), TokenKind::Ident);
        assert_eq!(lookup_ident("SELECTX"), TokenKind::Ident);
        assert_eq!(lookup_ident(""), TokenKind::Ident);
    }

    #[test]
    fn test_long_identifiers_skip_lookup() {
        let long = "a".repeat(MAX_KEYWORD_LEN + 1);
        assert_eq!(lookup_ident(&long), TokenKind::Ident);
    }

    #[test]
    fn test_dialect_union_membership() {
        // One keyword from each dialect family.
        assert_eq!(lookup_ident("straight_join"), TokenKind::KwStraightJoin);
        assert_eq!(lookup_ident("conflict"), TokenKind::KwConflict);
        assert_eq!(lookup_ident("autoincrement"), TokenKind::KwAutoincrement);
        assert_eq!(lookup_ident("holdlock"), TokenKind::KwHoldlock);
        assert_eq!(lookup_ident("rownum"), TokenKind::KwRownum);
    }

    #[test]
    fn test_is_keyword_predicate() {
        assert!(is_keyword("from"));
        assert!(is_keyword("User"));
        assert!(!is_keyword("user_id"));
        assert!(!is_keyword("tbl"));
    }

    #[test]
    fn test_non_ascii_identifier() {
        assert_eq!(lookup_ident("tablé"), TokenKind::Ident);
    }
}
