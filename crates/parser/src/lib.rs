//! Tokenizer and recursive-descent parser for sqlfmt.
//!
//! `tokenize` and `parse` are the only two public entry points; everything
//! else is an implementation detail of turning text into a token stream and
//! the token stream into a typed AST.

pub mod options;
mod parser;
pub mod tokenizer;

use sqlfmt_core::{MaxDepthError, ParseError, Stmt, TokenizeError};
use thiserror::Error;

pub use options::{ParseOptions, RecoveredSpan, TokenizeOptions};
pub use tokenizer::tokenize;

/// Unifies the three error kinds `parse` can raise: a
/// tokenize error propagated unchanged, a strict-mode syntax error, or a
/// depth-guard trip. Kept as one enum here (rather than three separate
/// `Result`s) purely so the public function signature stays a single
/// `Result`; callers that care which kind fired match on the variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Depth(#[from] MaxDepthError),
}

/// Parse `text` into a list of top-level statements.
///
/// In strict mode (`options.recover == false`) the first syntax error
/// aborts the whole call. In recovery mode, syntax errors become `raw`
/// AST nodes and parsing resumes at the next statement boundary — only a
/// tokenize error or a depth-guard trip can still escape.
pub fn parse(text: &str, options: &ParseOptions) -> Result<Vec<Stmt>, ParseFailure> {
    let tokens = tokenize(text, &options.tokenize_options())?;
    parser::Parser::new(text, &tokens, options).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfmt_core::ast::{RawReason, StmtKind};

    fn strict(src: &str) -> Result<Vec<Stmt>, ParseFailure> {
        parse(src, &ParseOptions::default())
    }

    fn recover(src: &str) -> Vec<Stmt> {
        let opts = ParseOptions {
            recover: true,
            ..ParseOptions::default()
        };
        parse(src, &opts).expect("recovery mode never throws on syntax errors")
    }

    #[test]
    fn select_parses_in_strict_mode() {
        let stmts = strict("SELECT 1;").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0].kind, StmtKind::Select(_)));
    }

    #[test]
    fn semicolon_is_optional_on_last_statement() {
        let stmts = strict("SELECT 1; SELECT 2").unwrap();
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn empty_statements_yield_empty_list_in_recovery_mode() {
        // `parse(";;;", { recover: true })` should yield an empty statement list.
        let opts = ParseOptions {
            recover: true,
            ..ParseOptions::default()
        };
        let stmts = parse(";;;", &opts).unwrap();
        assert!(stmts.is_empty());
    }

    #[test]
    fn empty_statements_yield_empty_list_in_strict_mode_too() {
        let stmts = strict(";;;").unwrap();
        assert!(stmts.is_empty());
    }

    #[test]
    fn strict_mode_reports_expected_token_and_position() {
        // Unbalanced parens surface a ParseError on the `;` token
        // (expected `)`).
        let err = strict("SELECT (1 + 2;").unwrap_err();
        match err {
            ParseFailure::Parse(e) => {
                assert_eq!(e.token_text, ";");
                assert!(e.message.contains(')'));
            }
            other => panic!("expected a ParseError, got {other:?}"),
        }
    }

    #[test]
    fn strict_mode_rejects_insert_int_typo() {
        // `INSERT INT foo` where the next token is not `INTO` must
        // error, never silently proceed.
        let err = strict("INSERT INT foo VALUES (1);").unwrap_err();
        assert!(matches!(err, ParseFailure::Parse(_)));
    }

    #[test]
    fn recovery_mode_wraps_unparsable_statement_in_raw_node() {
        let stmts = recover("SELECT (1 + 2; SELECT 3;");
        assert_eq!(stmts.len(), 2);
        match &stmts[0].kind {
            StmtKind::Raw(r) => assert_eq!(r.reason, RawReason::Unsupported),
            other => panic!("expected a raw node, got {other:?}"),
        }
        assert!(matches!(stmts[1].kind, StmtKind::Select(_)));
    }

    #[test]
    fn recovery_preserves_verbatim_bytes_of_the_skipped_region() {
        let stmts = recover("SELECT (((broken; SELECT 1;");
        let StmtKind::Raw(r) = &stmts[0].kind else {
            panic!("expected a raw node");
        };
        assert_eq!(r.text, "SELECT (((broken");
    }

    #[test]
    fn recovery_resyncs_on_balanced_parens_not_an_inner_semicolon() {
        // A `;` inside balanced parens must not end the recovery scan early.
        let stmts = recover("SELECT ((1, 2 FROM; SELECT 9;");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(stmts[1].kind, StmtKind::Select(_)));
    }

    #[test]
    fn leading_comments_survive_recovery() {
        let stmts = recover("-- a broken query\nSELECT ( ;");
        assert_eq!(stmts[0].leading_comments.len(), 1);
        assert_eq!(stmts[0].leading_comments[0].text, "-- a broken query");
    }

    #[test]
    fn depth_guard_trips_before_stack_overflow() {
        // Deep-nested parens at 140 with maxDepth=100 should raise
        // MaxDepthError whose message contains "nesting depth" and "100".
        let mut src = String::from("SELECT ");
        for _ in 0..140 {
            src.push('(');
        }
        src.push('1');
        for _ in 0..140 {
            src.push(')');
        }
        src.push(';');
        let opts = ParseOptions {
            max_depth: 100,
            ..ParseOptions::default()
        };
        let err = parse(&src, &opts).unwrap_err();
        match err {
            ParseFailure::Depth(e) => {
                assert_eq!(e.max_depth, 100);
                assert!(e.to_string().contains("nesting depth"));
                assert!(e.to_string().contains("100"));
            }
            other => panic!("expected a MaxDepthError, got {other:?}"),
        }
    }

    #[test]
    fn depth_guard_even_trips_in_recovery_mode() {
        // MaxDepthError is always fatal to the call — recovery mode must
        // not swallow it into a raw node.
        let mut src = String::from("SELECT ");
        for _ in 0..140 {
            src.push('(');
        }
        src.push('1');
        for _ in 0..140 {
            src.push(')');
        }
        src.push(';');
        let opts = ParseOptions {
            recover: true,
            max_depth: 100,
            ..ParseOptions::default()
        };
        let err = parse(&src, &opts).unwrap_err();
        assert!(matches!(err, ParseFailure::Depth(_)));
    }

    #[test]
    fn tokenize_errors_propagate_unchanged_through_parse() {
        let err = strict("SELECT 'broken").unwrap_err();
        assert!(matches!(err, ParseFailure::Tokenize(_)));
    }

    #[test]
    fn dispatches_every_statement_kind() {
        let cases: &[(&str, fn(&StmtKind) -> bool)] = &[
            ("SELECT 1;", |k| matches!(k, StmtKind::Select(_))),
            ("WITH x AS (SELECT 1) SELECT * FROM x;", |k| {
                matches!(k, StmtKind::Cte(_))
            }),
            ("INSERT INTO t (a) VALUES (1);", |k| matches!(k, StmtKind::Insert(_))),
            ("REPLACE INTO t (a) VALUES (1);", |k| matches!(k, StmtKind::Insert(_))),
            ("UPDATE t SET a = 1 WHERE b = 2;", |k| matches!(k, StmtKind::Update(_))),
            ("DELETE FROM t WHERE a = 1;", |k| matches!(k, StmtKind::Delete(_))),
            (
                "MERGE INTO t USING s ON t.id = s.id WHEN MATCHED THEN DELETE;",
                |k| matches!(k, StmtKind::Merge(_)),
            ),
            ("CREATE TABLE t (a int);", |k| matches!(k, StmtKind::CreateTable(_))),
            ("CREATE INDEX i ON t (a);", |k| matches!(k, StmtKind::CreateIndex(_))),
            ("CREATE VIEW v AS SELECT 1;", |k| matches!(k, StmtKind::CreateView(_))),
            ("ALTER TABLE t ADD COLUMN a int;", |k| matches!(k, StmtKind::AlterTable(_))),
            ("DROP TABLE t;", |k| matches!(k, StmtKind::DropTable(_))),
            ("TRUNCATE TABLE t;", |k| matches!(k, StmtKind::Truncate(_))),
            ("GRANT SELECT ON t TO u;", |k| matches!(k, StmtKind::Grant(_))),
            ("REVOKE SELECT ON t FROM u;", |k| matches!(k, StmtKind::Revoke(_))),
            ("COMMENT ON TABLE t IS 'hi';", |k| matches!(k, StmtKind::Comment(_))),
            ("EXPLAIN SELECT 1;", |k| matches!(k, StmtKind::Explain(_))),
            ("SELECT a FROM t UNION SELECT b FROM u;", |k| {
                matches!(k, StmtKind::Union(_))
            }),
        ];
        for (src, check) in cases {
            let stmts = strict(src).unwrap_or_else(|e| panic!("failed to parse {src:?}: {e}"));
            assert_eq!(stmts.len(), 1, "for {src:?}");
            assert!(check(&stmts[0].kind), "wrong stmt kind for {src:?}: {:?}", stmts[0].kind);
        }
    }

    #[test]
    fn begin_commit_rollback_set_are_verbatim_raw() {
        for src in ["BEGIN;", "COMMIT;", "ROLLBACK;", "SET search_path = public;"] {
            let stmts = strict(src).unwrap();
            assert!(matches!(stmts[0].kind, StmtKind::Raw(_)), "for {src:?}");
        }
    }

    #[test]
    fn expression_precedence_climb() {
        // `a OR b AND c` must parse as `a OR (b AND c)`.
        let stmts = strict("SELECT a OR b AND c;").unwrap();
        let StmtKind::Select(select) = &stmts[0].kind else {
            panic!("expected select")
        };
        let expr = &select.columns[0].expr;
        match &expr.kind {
            sqlfmt_core::ast::ExprKind::Binary(b) => {
                assert_eq!(b.op, sqlfmt_core::ast::BinaryOp::Or);
                assert!(matches!(
                    b.right.kind,
                    sqlfmt_core::ast::ExprKind::Binary(sqlfmt_core::ast::BinaryExpr {
                        op: sqlfmt_core::ast::BinaryOp::And,
                        ..
                    })
                ));
            }
            other => panic!("expected top-level OR, got {other:?}"),
        }
    }

    #[test]
    fn max_depth_default_is_128() {
        assert_eq!(ParseOptions::default().max_depth, 128);
    }
}
