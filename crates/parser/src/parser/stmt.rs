//! Top-level statement dispatch plus identifier/object-name
//! helpers shared by every other grammar module.

use sqlfmt_core::ast::{
    CommentObject, CommentOnStmt, Ident, ObjectName, Raw, RawReason, Stmt, StmtKind,
};
use sqlfmt_core::TokenKind;

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    /// Dispatch on the first keyword of a statement via a small table,
    /// attaching whatever comments preceded it.
    pub(crate) fn parse_one_statement(&mut self) -> PResult<Stmt> {
        let leading = self.take_leading_here();

        if self.allow_meta_commands_line() {
            let tok = self.bump();
            return Ok(Stmt::new(StmtKind::Raw(Raw {
                text: tok.text.to_string(),
                reason: RawReason::Verbatim,
            }))
            .with_comments(leading));
        }

        let kind = if self.at_any_keyword(&["SELECT", "WITH"]) {
            self.parse_query_statement()?
        } else if self.at_keyword("INSERT") || self.at_keyword("REPLACE") {
            self.parse_insert()?
        } else if self.at_keyword("UPDATE") {
            self.parse_update()?
        } else if self.at_keyword("DELETE") {
            self.parse_delete()?
        } else if self.at_keyword("MERGE") {
            self.parse_merge()?
        } else if self.at_keyword("CREATE") {
            self.parse_create()?
        } else if self.at_keyword("ALTER") {
            self.parse_alter_table()?
        } else if self.at_keyword("DROP") {
            self.parse_drop()?
        } else if self.at_keyword("TRUNCATE") {
            self.parse_truncate()?
        } else if self.at_keyword("GRANT") {
            self.parse_grant_revoke(true)?
        } else if self.at_keyword("REVOKE") {
            self.parse_grant_revoke(false)?
        } else if self.at_keyword("COMMENT") {
            self.parse_comment_on()?
        } else if self.at_keyword("EXPLAIN") {
            self.parse_explain()?
        } else if self.at_any_keyword(&["BEGIN", "COMMIT", "ROLLBACK", "SAVEPOINT", "SET"]) {
            self.parse_verbatim_simple_statement()?
        } else {
            return Err(self.err("unrecognized statement"));
        };

        Ok(Stmt::new(kind).with_comments(leading))
    }

    /// psql backslash meta-commands arrive from the tokenizer as a single
    /// `LineComment`-shaped token only when `allowMetaCommands` was set and
    /// the tokenizer recognized a leading `\`; at the parser level they
    /// still show up as ordinary `Operator`/`Punctuation` tokens starting
    /// with `\` since the tokenizer only special-cases them as comments.
    /// This checks for a stray backslash at statement-start and swallows
    /// the rest of the line verbatim, which is the only sane thing to do
    /// with a construct outside the grammar entirely.
    fn allow_meta_commands_line(&self) -> bool {
        self.cur().kind == TokenKind::Operator && self.cur().text == "\\"
    }

    /// `SET ...`, `BEGIN`, `COMMIT`, `ROLLBACK [TO SAVEPOINT ...]`,
    /// `SAVEPOINT ...` — recognized by the dispatch table but modeled as
    /// verbatim raw statements: their grammar is a short, vendor-varying
    /// tail not worth a bespoke AST node.
    fn parse_verbatim_simple_statement(&mut self) -> PResult<StmtKind> {
        let start = self.checkpoint();
        self.skip_to_statement_end();
        let text = self.span_text(start, self.checkpoint());
        Ok(StmtKind::Raw(Raw {
            text,
            reason: RawReason::Verbatim,
        }))
    }

    /// Advances the cursor to just before the next top-level `;` (or EOF),
    /// honoring balanced parens so a `;` inside a subquery doesn't end the
    /// statement early.
    pub(crate) fn skip_to_statement_end(&mut self) {
        let mut depth = 0i32;
        loop {
            if self.is_eof() {
                return;
            }
            if depth == 0 && self.at_punct(";") {
                return;
            }
            if self.at_punct("(") {
                depth += 1;
            } else if self.at_punct(")") {
                depth -= 1;
            }
            self.bump();
        }
    }

    /// Reconstructs the verbatim source text spanning significant tokens
    /// `[from, to)`, joining them with a single space. This is a best-effort
    /// re-serialization (original inter-token spacing isn't tracked at this
    /// granularity) used only for raw/verbatim statement bodies where exact
    /// whitespace fidelity isn't part of the contract (unlike `raw` nodes
    /// produced by recovery, which copy the original bytes exactly).
    pub(crate) fn span_text(&self, from: usize, to: usize) -> String {
        self.sig[from..to]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // -----------------------------------------------------------------
    // Identifiers / object names, shared by every statement kind
    // -----------------------------------------------------------------

    pub(crate) fn parse_ident(&mut self) -> PResult<Ident> {
        let tok = self.expect_identifier()?;
        let quote = match tok.text.chars().next() {
            Some(c @ ('"' | '`' | '[')) => Some(c),
            _ => None,
        };
        let value = match quote {
            Some('"') => unquote(&tok.text, '"', '"'),
            Some('`') => unquote(&tok.text, '`', '`'),
            Some('[') => unquote(&tok.text, '[', ']'),
            _ => tok.text.to_string(),
        };
        Ok(match quote {
            Some(q) => Ident::quoted(value, q),
            None => Ident::new(value),
        })
    }

    pub(crate) fn parse_object_name(&mut self) -> PResult<ObjectName> {
        let mut parts = vec![self.parse_ident()?];
        while self.eat_punct(".") {
            if self.at_operator("*") {
                // `schema.table.*` inside e.g. GRANT — stop before the star,
                // caller decides what to do with it.
                break;
            }
            parts.push(self.parse_ident()?);
        }
        Ok(ObjectName(parts))
    }

    pub(crate) fn parse_ident_list_parens(&mut self) -> PResult<Vec<Ident>> {
        self.expect_punct("(")?;
        let mut items = Vec::new();
        if !self.at_punct(")") {
            items.push(self.parse_ident()?);
            while self.eat_punct(",") {
                items.push(self.parse_ident()?);
            }
        }
        self.expect_punct(")")?;
        Ok(items)
    }
}

fn unquote(text: &str, open: char, close: char) -> String {
    let inner = text
        .strip_prefix(open)
        .and_then(|s| s.strip_suffix(close))
        .unwrap_or(text);
    let doubled = format!("{close}{close}");
    if open == close {
        inner.replace(&doubled, &close.to_string())
    } else {
        inner.to_string()
    }
}

impl<'a> Parser<'a> {
    fn parse_explain(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("EXPLAIN")?;
        let mut analyze = false;
        let mut verbose = false;
        let mut options = Vec::new();
        if self.eat_punct("(") {
            if !self.at_punct(")") {
                loop {
                    let tok = self.bump();
                    let mut opt = tok.text.to_string();
                    if !self.at_punct(",") && !self.at_punct(")") {
                        opt.push(' ');
                        opt.push_str(&self.bump().text);
                    }
                    options.push(opt);
                    if !self.eat_punct(",") {
                        break;
                    }
                }
            }
            self.expect_punct(")")?;
        } else {
            loop {
                if self.eat_keyword("ANALYZE") || self.eat_keyword("ANALYSE") {
                    analyze = true;
                } else if self.eat_keyword("VERBOSE") {
                    verbose = true;
                } else {
                    break;
                }
            }
        }
        let statement = Box::new(self.parse_one_statement()?);
        Ok(StmtKind::Explain(Box::new(sqlfmt_core::ast::Explain {
            analyze,
            verbose,
            options,
            statement,
        })))
    }

    fn parse_comment_on(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("COMMENT")?;
        self.expect_keyword("ON")?;
        let object = if self.eat_keyword("TABLE") {
            CommentObject::Table(self.parse_object_name()?)
        } else if self.eat_keyword("COLUMN") {
            CommentObject::Column(self.parse_object_name()?)
        } else {
            let kind = self.bump().text.to_string();
            CommentObject::Other {
                kind,
                name: self.parse_object_name()?,
            }
        };
        self.expect_keyword("IS")?;
        let text = if self.eat_keyword("NULL") {
            None
        } else {
            Some(self.bump().text.to_string())
        };
        Ok(StmtKind::Comment(Box::new(CommentOnStmt { object, text })))
    }
}
