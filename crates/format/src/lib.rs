//! River-aligned canonical formatter for sqlfmt.
//!
//! [`format`] is the only public entry point: it runs the parser in
//! strict mode (tokenize + parse errors propagate unchanged) and hands
//! the resulting statement list to the writer. Formatting never reads
//! the original source again — everything the writer needs (comments,
//! literal text, operator spelling) already lives on the AST.

mod comments;
mod errors;
mod expr;
mod stmt;
mod writer;

use sqlfmt_core::ast::Stmt;
use sqlfmt_parser::{ParseOptions, TokenizeOptions};

pub use errors::FormatFailure;
use stmt::fmt_top_level;
use writer::Writer;

/// Options accepted by [`format`]. There is deliberately no
/// style knob here beyond what the parser itself exposes — the
/// formatter is zero-config: the only choices that
/// affect its output are which constructs get parsed at all.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub dialect: sqlfmt_core::Dialect,
    pub max_depth: usize,
    pub max_token_count: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            dialect: sqlfmt_core::Dialect::default(),
            max_depth: 128,
            max_token_count: 1_000_000,
        }
    }
}

impl FormatOptions {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            dialect: self.dialect.clone(),
            recover: false,
            max_depth: self.max_depth,
            max_token_count: self.max_token_count,
            allow_meta_commands: true,
            on_recovery: None,
        }
    }
}

/// Turns `text` into canonical, river-aligned text.
///
/// Parses in strict mode: the first syntax error aborts the call with
/// [`FormatFailure::Parse`] rather than silently dropping the offending
/// statement. Callers who want best-effort output over malformed input
/// should `sqlfmt_parser::parse` themselves with `recover: true` and
/// format the resulting statements directly via [`format_statements`].
///
/// Empty, whitespace-only, or comment-only input formats to the empty
/// string; otherwise the result is trimmed and ends
/// with exactly one trailing newline.
pub fn format(text: &str, options: &FormatOptions) -> Result<String, FormatFailure> {
    let stmts = sqlfmt_parser::parse(text, &options.parse_options())?;
    format_statements(&stmts, options)
}

/// Renders an already-parsed statement list. Used directly
/// by callers running the parser in recovery mode, and by [`format`]
/// itself.
pub fn format_statements(
    stmts: &[Stmt],
    options: &FormatOptions,
) -> Result<String, FormatFailure> {
    let mut w = Writer::new(options.max_depth);
    for stmt in stmts {
        fmt_top_level(&mut w, stmt)?;
    }
    let out = w.finish();
    Ok(normalize(&out))
}

/// Trims the buffer and appends exactly one trailing newline, unless
/// the buffer is empty.
fn normalize(buf: &str) -> String {
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        let mut s = String::with_capacity(trimmed.len() + 1);
        s.push_str(trimmed);
        s.push('\n');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(s: &str) -> String {
        format(s, &FormatOptions::default()).expect("format should succeed")
    }

    #[test]
    fn empty_input_formats_to_empty_string() {
        assert_eq!(fmt(""), "");
        assert_eq!(fmt("   \n\t  "), "");
        assert_eq!(fmt("-- just a comment\n"), "");
    }

    #[test]
    fn trivial_select() {
        assert_eq!(fmt("SELECT 1;"), "SELECT 1;\n");
    }

    #[test]
    fn named_and_positional_parameters_format_as_identifiers() {
        for src in [
            "SELECT $1;",
            "SELECT :name;",
            "SELECT :1;",
            "SELECT ?1;",
            "SELECT ?;",
            "SELECT &var;",
            "SELECT &&var;",
            "SELECT @var;",
            "SELECT @@global;",
        ] {
            let out = fmt(src);
            assert_eq!(out, format!("SELECT {}\n", &src[7..]), "for {src:?}");
        }
    }

    #[test]
    fn smart_quotes_normalize_to_ascii() {
        assert_eq!(fmt("SELECT \u{2018}x\u{2019};"), "SELECT 'x';\n");
    }

    #[test]
    fn river_aligned_select() {
        let out = fmt("select a,b from t where x=1;");
        assert_eq!(
            out,
            "SELECT a,\n       b\n  FROM t\n WHERE x = 1;\n"
        );
    }

    #[test]
    fn join_on_own_line() {
        let out = fmt("SELECT * FROM a JOIN b ON a.id=b.id;");
        assert!(out.contains("\n  FROM a\n"));
        assert!(out.contains("JOIN b"));
        assert!(out.contains("ON a.id = b.id"));
    }

    #[test]
    fn idempotence_over_a_batch_of_statements() {
        let cases = [
            "SELECT 1;",
            "select a,b from t where x=1;",
            "SELECT * FROM a JOIN b ON a.id=b.id;",
            "insert into t (a, b) values (1, 2);",
            "update t set a = 1 where b = 2;",
            "delete from t where a = 1;",
            "with x as (select 1) select * from x;",
            "select a from t union select b from u;",
        ];
        for src in cases {
            let once = fmt(src);
            let twice = format(&once, &FormatOptions::default()).expect("reformat should succeed");
            assert_eq!(once, twice, "not idempotent for {src:?}");
        }
    }

    #[test]
    fn keywords_upper_cased_identifiers_preserved() {
        let out = fmt("select Foo.\"Bar\" from MyTable;");
        assert!(out.starts_with("SELECT"));
        assert!(out.contains("Foo.\"Bar\""));
        assert!(out.contains("MyTable"));
    }

    #[test]
    fn leading_line_comment_preserved_before_statement() {
        let out = fmt("-- a helpful comment\nSELECT 1;");
        assert_eq!(out, "-- a helpful comment\nSELECT 1;\n");
    }

    #[test]
    fn block_comment_preserved_in_its_original_form() {
        let out = fmt("/* note */ SELECT 1;");
        assert!(out.starts_with("/* note */"));
    }

    #[test]
    fn ddl_statements_format_without_error() {
        let cases = [
            "create table t (a int, b text);",
            "create index i on t (a);",
            "create view v as select 1;",
            "alter table t add column a int;",
            "drop table t;",
            "truncate table t;",
            "grant select on t to u;",
            "revoke select on t from u;",
            "comment on table t is 'hi';",
            "explain select 1;",
        ];
        for src in cases {
            let out = fmt(src);
            assert!(!out.is_empty(), "expected output for {src:?}");
            assert!(out.ends_with(";\n"), "expected trailing ';' for {src:?}: {out:?}");
        }
    }

    #[test]
    fn pivot_clause_is_preserved_verbatim() {
        let out = fmt(
            "select * from sales pivot (sum(amount) for quarter in ('Q1', 'Q2')) as p;",
        );
        assert!(
            out.contains("pivot (sum(amount) for quarter in ('Q1', 'Q2')) as p"),
            "got {out:?}"
        );
    }

    #[test]
    fn cast_type_name_is_lower_cased() {
        let out = fmt("select cast(a as INT);");
        assert!(out.contains("CAST(a AS int)"), "got {out:?}");
    }

    #[test]
    fn recovery_mode_raw_node_renders_verbatim() {
        use sqlfmt_parser::ParseOptions;
        let opts = ParseOptions {
            recover: true,
            ..ParseOptions::default()
        };
        let stmts = sqlfmt_parser::parse("SELECT (1 + 2; SELECT 3;", &opts).unwrap();
        let out = format_statements(&stmts, &FormatOptions::default()).unwrap();
        assert!(out.contains("SELECT (1 + 2"));
        assert!(out.contains("SELECT 3;"));
    }

    #[test]
    fn format_preserves_semantics_at_ast_level_for_a_batch() {
        // Reformatting should preserve AST shape modulo cosmetic fields:
        // checked here via statement-kind equality after a round trip
        // through the formatter.
        use sqlfmt_parser::ParseOptions;
        let cases = [
            "SELECT a, b FROM t WHERE x = 1 AND y = 2;",
            "INSERT INTO t (a, b) VALUES (1, 2);",
            "UPDATE t SET a = 1 WHERE b = 2;",
            "DELETE FROM t WHERE a = 1;",
            "SELECT a FROM t JOIN u ON t.id = u.id WHERE a > 1 ORDER BY a LIMIT 10;",
        ];
        for src in cases {
            let original = sqlfmt_parser::parse(src, &ParseOptions::default()).unwrap();
            let formatted = fmt(src);
            let reparsed = sqlfmt_parser::parse(&formatted, &ParseOptions::default()).unwrap();
            assert_eq!(
                original.len(),
                reparsed.len(),
                "statement count changed for {src:?}"
            );
            for (o, r) in original.iter().zip(reparsed.iter()) {
                assert_eq!(
                    std::mem::discriminant(&o.kind),
                    std::mem::discriminant(&r.kind),
                    "stmt kind changed for {src:?}"
                );
            }
        }
    }

    #[test]
    fn deep_nesting_trips_depth_guard_not_stack_overflow() {
        let mut src = String::from("SELECT ");
        for _ in 0..200 {
            src.push('(');
        }
        src.push('1');
        for _ in 0..200 {
            src.push(')');
        }
        src.push(';');
        let opts = FormatOptions {
            max_depth: 100,
            ..FormatOptions::default()
        };
        let err = format(&src, &opts).unwrap_err();
        match err {
            FormatFailure::Depth(e) => assert_eq!(e.max_depth, 100),
            other => panic!("expected a depth error, got {other:?}"),
        }
    }
}
