//! Property tests: totality of the lexer, panic-freedom of the parser,
//! and round-trip idempotence over generated statements.

use omnisql::ast::visit::{rewrite, Rewriter};
use omnisql::{parse, to_sql, Lexer, TokenKind};
use proptest::prelude::*;

/// A small expression grammar rendered straight to SQL text. Identifiers
/// may collide with keywords; the properties below only require that
/// whatever parses also round-trips.
fn arb_expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z][a-z0-9_]{0,6}",
        (0u32..100_000).prop_map(|n| n.to_string()),
        "'[a-z ]{0,8}'",
        Just("null".to_owned()),
        Just("true".to_owned()),
        Just("?".to_owned()),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} + {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} * {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} = {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} and {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} or {b}")),
            inner.clone().prop_map(|a| format!("({a})")),
            inner.clone().prop_map(|a| format!("-{a}")),
            inner.clone().prop_map(|a| format!("not {a}")),
            inner.clone().prop_map(|a| format!("{a} is null")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(a, b, c)| format!("case when {a} then {b} else {c} end")),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(a, b, c)| format!("{a} between {b} and {c}")),
        ]
    })
}

fn arb_statement() -> impl Strategy<Value = String> {
    let ident = "[a-z][a-z0-9_]{0,6}";
    prop_oneof![
        (arb_expr(), ident).prop_map(|(e, t)| format!("select {e} from {t}")),
        (arb_expr(), ident, arb_expr())
            .prop_map(|(e, t, w)| format!("select {e} from {t} where {w}")),
        (ident, ident, arb_expr())
            .prop_map(|(t, c, e)| format!("insert into {t} ({c}) values ({e})")),
        (ident, ident, arb_expr(), arb_expr())
            .prop_map(|(t, c, e, w)| format!("update {t} set {c} = {e} where {w}")),
        (ident, arb_expr()).prop_map(|(t, w)| format!("delete from {t} where {w}")),
        (arb_expr(), arb_expr())
            .prop_map(|(a, b)| format!("select {a} from t union select {b} from u")),
    ]
}

proptest! {
    /// The lexer is total: any input reaches EOF without panicking, and
    /// token offsets never move backwards.
    #[test]
    fn prop_lexer_total_and_monotonic(input in ".*") {
        let tokens = Lexer::tokenize(&input);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        let mut prev = 0u32;
        for tok in &tokens {
            prop_assert!(tok.pos.offset >= prev, "offset moved backwards");
            prev = tok.pos.offset;
        }
    }

    /// The parser never panics; it returns Ok or Err for every input.
    #[test]
    fn prop_parser_never_panics(input in ".*") {
        let _ = parse(&input);
    }

    /// Token-soup inputs built from SQL-ish fragments stress the grammar
    /// corners more than raw bytes do.
    #[test]
    fn prop_parser_never_panics_on_sql_fragments(
        fragments in proptest::collection::vec(
            prop_oneof![
                Just("select"), Just("from"), Just("where"), Just("("), Just(")"),
                Just("["), Just("]"), Just("'a'"), Just("1"), Just("x"), Just(","),
                Just("."), Just("*"), Just("--"), Just("/*"), Just("*/"), Just("$$"),
                Just("not"), Just("in"), Just("between"), Just("and"), Just("case"),
                Just("::"), Just("#"), Just("@"), Just(";"),
            ],
            0..24,
        )
    ) {
        let sql = fragments.join(" ");
        let _ = parse(&sql);
        let _ = omnisql::parse_all(&sql);
    }

    /// Whatever parses must round-trip: print, re-parse, and print again
    /// to byte-identical text.
    #[test]
    fn prop_roundtrip_idempotent(sql in arb_statement()) {
        if let Ok(Some(stmt)) = parse(&sql) {
            let t1 = to_sql(&stmt);
            let stmt2 = parse(&t1)
                .unwrap_or_else(|e| panic!("canonical text failed to re-parse: `{t1}`: {e}"))
                .unwrap_or_else(|| panic!("canonical text lost the statement: `{t1}`"));
            let t2 = to_sql(&stmt2);
            prop_assert_eq!(&t1, &t2, "round-trip diverged");
        }
    }

    /// The identity rewrite never changes the rendered SQL.
    #[test]
    fn prop_identity_rewrite_is_identity(sql in arb_statement()) {
        struct Identity;
        impl Rewriter for Identity {}

        if let Ok(Some(stmt)) = parse(&sql) {
            let before = to_sql(&stmt);
            let after = to_sql(&rewrite(stmt, &mut Identity));
            prop_assert_eq!(before, after);
        }
    }
}
