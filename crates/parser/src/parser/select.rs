//! `SELECT`, set operators, and `WITH`.

use sqlfmt_core::ast::*;

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    /// Entry point for a top-level query statement: `WITH ...`, `SELECT
    /// ...`, or a chain of those joined by `UNION`/`INTERSECT`/`EXCEPT`.
    pub(crate) fn parse_query_statement(&mut self) -> PResult<StmtKind> {
        let stmt = self.parse_query_body()?;
        Ok(stmt.kind)
    }

    /// Used wherever a subquery appears inside an expression (`EXISTS
    /// (...)`, `IN (...)`, scalar subquery, quantified comparison).
    pub(crate) fn parse_query_body_for_subquery(&mut self) -> PResult<Stmt> {
        self.parse_query_body()
    }

    fn parse_query_body(&mut self) -> PResult<Stmt> {
        self.enter_depth()?;
        let result = self.parse_query_body_inner();
        self.exit_depth();
        result
    }

    fn parse_query_body_inner(&mut self) -> PResult<Stmt> {
        let leading = self.take_leading_here();
        let stmt = if self.at_keyword("WITH") {
            self.parse_cte()?
        } else {
            self.parse_set_op_chain()?
        };
        Ok(stmt.with_comments(leading))
    }

    fn parse_cte(&mut self) -> PResult<Stmt> {
        self.expect_keyword("WITH")?;
        let recursive = self.eat_keyword("RECURSIVE");
        let mut ctes = vec![self.parse_cte_entry()?];
        while self.eat_punct(",") {
            ctes.push(self.parse_cte_entry()?);
        }
        let body = self.parse_set_op_chain()?;
        Ok(Stmt::new(StmtKind::Cte(Box::new(CteStmt {
            recursive,
            ctes,
            body,
        }))))
    }

    fn parse_cte_entry(&mut self) -> PResult<CteEntry> {
        let name = self.parse_ident()?;
        let column_aliases = if self.at_punct("(") {
            self.parse_ident_list_parens()?
        } else {
            Vec::new()
        };
        self.expect_keyword("AS")?;
        let materialized = if self.eat_keyword("MATERIALIZED") {
            Some(true)
        } else if self.eat_keyword_seq(&["NOT", "MATERIALIZED"]) {
            Some(false)
        } else {
            None
        };
        self.expect_punct("(")?;
        let query = self.parse_query_body()?;
        self.expect_punct(")")?;
        Ok(CteEntry {
            name,
            column_aliases,
            materialized,
            query,
        })
    }

    /// `select_core ((UNION|INTERSECT|EXCEPT) [ALL|DISTINCT] select_core)*`
    /// followed by the trailing `ORDER BY`/`LIMIT`/`OFFSET` that binds to
    /// the whole chain rather than to any one arm.
    fn parse_set_op_chain(&mut self) -> PResult<Stmt> {
        let left = self.parse_select_core_or_paren()?;
        let mut rest = Vec::new();
        loop {
            let op = if self.at_keyword("UNION") {
                SetOp::Union
            } else if self.at_keyword("INTERSECT") {
                SetOp::Intersect
            } else if self.at_keyword("EXCEPT") {
                SetOp::Except
            } else {
                break;
            };
            self.bump();
            let quantifier = if self.eat_keyword("ALL") {
                SetQuantifier::All
            } else {
                self.eat_keyword("DISTINCT");
                SetQuantifier::Distinct
            };
            let right = self.parse_select_core_or_paren()?;
            rest.push(SetOperation {
                op,
                quantifier,
                right,
            });
        }

        if rest.is_empty() {
            return Ok(left);
        }

        let order_by = if self.eat_keyword_seq(&["ORDER", "BY"]) {
            let mut items = vec![self.parse_ordered_expr()?];
            while self.eat_punct(",") {
                items.push(self.parse_ordered_expr()?);
            }
            items
        } else {
            Vec::new()
        };
        let (limit, offset) = self.parse_limit_offset()?;

        Ok(Stmt::new(StmtKind::Union(Box::new(UnionStmt {
            left,
            rest,
            order_by,
            limit,
            offset,
        }))))
    }

    /// One arm of a set-operator chain: either a parenthesized query or a
    /// bare `SELECT ...` core (its own `ORDER BY`/`LIMIT` are parsed as
    /// part of the core so `(SELECT ... ORDER BY x) UNION ...` and
    /// `SELECT ... UNION SELECT ... ORDER BY x` both work).
    fn parse_select_core_or_paren(&mut self) -> PResult<Stmt> {
        if self.at_punct("(") {
            self.bump();
            let inner = self.parse_query_body()?;
            self.expect_punct(")")?;
            return Ok(inner);
        }
        self.parse_select_core()
    }

    fn parse_select_core(&mut self) -> PResult<Stmt> {
        self.expect_keyword("SELECT")?;

        let distinct = if self.eat_keyword("DISTINCT") {
            if self.eat_keyword("ON") {
                self.expect_punct("(")?;
                let mut on = vec![self.parse_expr()?];
                while self.eat_punct(",") {
                    on.push(self.parse_expr()?);
                }
                self.expect_punct(")")?;
                Some(DistinctClause { on })
            } else {
                Some(DistinctClause::default())
            }
        } else {
            self.eat_keyword("ALL");
            None
        };

        let top = if self.eat_keyword("TOP") {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut columns = vec![self.parse_select_item()?];
        while self.eat_punct(",") {
            columns.push(self.parse_select_item()?);
        }

        let from = if self.eat_keyword("FROM") {
            let mut items = vec![self.parse_from_item()?];
            while self.eat_punct(",") {
                items.push(self.parse_from_item()?);
            }
            items
        } else {
            Vec::new()
        };

        let where_clause = if self.eat_keyword("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let group_by = if self.eat_keyword_seq(&["GROUP", "BY"]) {
            Some(self.parse_group_by()?)
        } else {
            None
        };

        let having = if self.eat_keyword("HAVING") {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let windows = if self.eat_keyword("WINDOW") {
            let mut items = vec![self.parse_named_window()?];
            while self.eat_punct(",") {
                items.push(self.parse_named_window()?);
            }
            items
        } else {
            Vec::new()
        };

        let qualify = if self.eat_keyword("QUALIFY") {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let order_by = if self.eat_keyword_seq(&["ORDER", "BY"]) {
            let mut items = vec![self.parse_ordered_expr()?];
            while self.eat_punct(",") {
                items.push(self.parse_ordered_expr()?);
            }
            items
        } else {
            Vec::new()
        };

        let (limit, offset) = self.parse_limit_offset()?;

        let fetch = if self.eat_keyword("FETCH") {
            let _ = self.eat_keyword("FIRST") || self.eat_keyword("NEXT");
            let count = self.parse_expr()?;
            let _ = self.eat_keyword("ROW") || self.eat_keyword("ROWS");
            let with_ties = if self.eat_keyword("ONLY") {
                false
            } else {
                self.eat_keyword_seq(&["WITH", "TIES"])
            };
            Some(FetchClause { count, with_ties })
        } else {
            None
        };

        let mut locking = Vec::new();
        while self.eat_keyword("FOR") {
            let strength = if self.eat_keyword("UPDATE") {
                LockStrength::Update
            } else {
                self.expect_keyword("SHARE")?;
                LockStrength::Share
            };
            let of = if self.eat_keyword("OF") {
                let mut names = vec![self.parse_object_name()?];
                while self.eat_punct(",") {
                    names.push(self.parse_object_name()?);
                }
                names
            } else {
                Vec::new()
            };
            let nowait = self.eat_keyword("NOWAIT");
            let skip_locked = !nowait && self.eat_keyword_seq(&["SKIP", "LOCKED"]);
            locking.push(LockingClause {
                strength,
                of,
                nowait,
                skip_locked,
            });
        }

        let for_clause = if self.eat_keyword("FOR") {
            let start = self.checkpoint();
            self.skip_to_statement_end();
            Some(self.span_text(start, self.checkpoint()))
        } else {
            None
        };

        Ok(Stmt::new(StmtKind::Select(Box::new(SelectStmt {
            distinct,
            top,
            columns,
            from,
            where_clause,
            group_by,
            having,
            windows,
            qualify,
            order_by,
            limit,
            offset,
            fetch,
            locking,
            for_clause,
        }))))
    }

    fn parse_limit_offset(&mut self) -> PResult<(Option<Expr>, Option<Expr>)> {
        let mut limit = None;
        let mut offset = None;
        // MySQL's `LIMIT a, b` means `LIMIT b OFFSET a`; handled after the
        // fact since we don't know which form it is until the comma (or
        // its absence) shows up.
        if self.eat_keyword("LIMIT") {
            let first = self.parse_expr()?;
            if self.eat_punct(",") {
                let second = self.parse_expr()?;
                offset = Some(first);
                limit = Some(second);
            } else {
                limit = Some(first);
            }
        }
        if self.eat_keyword("OFFSET") {
            offset = Some(self.parse_expr()?);
            let _ = self.eat_keyword("ROW") || self.eat_keyword("ROWS");
        }
        Ok((limit, offset))
    }

    fn parse_select_item(&mut self) -> PResult<SelectItem> {
        let expr = self.parse_expr()?;
        let alias = if self.eat_keyword("AS") {
            Some(self.parse_ident()?)
        } else if self.is_bare_alias_start() {
            Some(self.parse_ident()?)
        } else {
            None
        };
        Ok(SelectItem { expr, alias })
    }

    /// A bare alias (no `AS`) is only plausible when the next token is an
    /// identifier or unreserved keyword that can't itself start a new
    /// clause — callers higher up the chain (`FROM`, `,`, `)`, `;`, EOF)
    /// always take priority.
    fn is_bare_alias_start(&self) -> bool {
        use sqlfmt_core::TokenKind;
        let tok = self.cur();
        if tok.kind == TokenKind::Identifier {
            return true;
        }
        if tok.kind != TokenKind::Keyword {
            return false;
        }
        !sqlfmt_core::keywords::is_reserved(&tok.upper)
    }

    fn parse_group_by(&mut self) -> PResult<GroupByClause> {
        let kind = if self.eat_keyword("ROLLUP") {
            GroupByKind::Rollup
        } else if self.eat_keyword("CUBE") {
            GroupByKind::Cube
        } else if self.eat_keyword_seq(&["GROUPING", "SETS"]) {
            GroupByKind::GroupingSets
        } else {
            GroupByKind::Simple
        };
        if kind == GroupByKind::Simple {
            let mut items = vec![self.parse_expr()?];
            while self.eat_punct(",") {
                items.push(self.parse_expr()?);
            }
            return Ok(GroupByClause { kind, items });
        }
        self.expect_punct("(")?;
        let mut items = Vec::new();
        if !self.at_punct(")") {
            items.push(self.parse_expr()?);
            while self.eat_punct(",") {
                items.push(self.parse_expr()?);
            }
        }
        self.expect_punct(")")?;
        Ok(GroupByClause { kind, items })
    }

    fn parse_named_window(&mut self) -> PResult<NamedWindow> {
        let name = self.parse_ident()?;
        self.expect_keyword("AS")?;
        self.expect_punct("(")?;
        let spec = self.parse_window_spec_body()?;
        self.expect_punct(")")?;
        Ok(NamedWindow { name, spec })
    }

    // -----------------------------------------------------------------
    // FROM / JOIN
    // -----------------------------------------------------------------

    pub(super) fn parse_from_item(&mut self) -> PResult<FromItem> {
        let factor = self.parse_table_factor()?;
        let mut joins = Vec::new();
        loop {
            let Some(kind) = self.try_join_kind() else {
                break;
            };
            let join_factor = self.parse_table_factor()?;
            let condition = if matches!(kind, JoinKind::Cross | JoinKind::CrossApply | JoinKind::OuterApply) {
                JoinCondition::None
            } else if self.eat_keyword("ON") {
                JoinCondition::On(self.parse_expr()?)
            } else if self.eat_keyword("USING") {
                JoinCondition::Using(self.parse_ident_list_parens()?)
            } else if kind == JoinKind::Natural {
                JoinCondition::None
            } else {
                return Err(self.err("expected ON or USING for join"));
            };
            joins.push(Join {
                kind,
                factor: join_factor,
                condition,
            });
        }
        let pivot = self.parse_pivot_clause()?;
        Ok(FromItem { factor, joins, pivot })
    }

    /// Captures a trailing `PIVOT (...)`/`UNPIVOT (...)` clause verbatim:
    /// the aggregate-expression-list-for-column-list grammar varies enough
    /// across T-SQL/Oracle that modeling it fully isn't worth it next to
    /// just preserving the source span.
    fn parse_pivot_clause(&mut self) -> PResult<Option<Raw>> {
        if !self.at_any_keyword(&["PIVOT", "UNPIVOT"]) {
            return Ok(None);
        }
        let start = self.checkpoint();
        self.bump();
        self.expect_punct("(")?;
        let mut depth = 1i32;
        while depth > 0 {
            if self.is_eof() {
                return Err(self.err("unterminated PIVOT clause"));
            }
            if self.at_punct("(") {
                depth += 1;
            } else if self.at_punct(")") {
                depth -= 1;
            }
            self.bump();
        }
        if self.eat_keyword("AS") {
            self.parse_ident()?;
        } else if self.is_bare_alias_start() {
            self.parse_ident()?;
        }
        let end = self.checkpoint();
        let text = self.span_text(start, end);
        Ok(Some(Raw {
            text,
            reason: RawReason::Verbatim,
        }))
    }

    fn try_join_kind(&mut self) -> Option<JoinKind> {
        let natural = self.eat_keyword("NATURAL");
        if self.eat_keyword("JOIN") {
            return Some(if natural { JoinKind::Natural } else { JoinKind::Inner });
        }
        if self.eat_keyword("INNER") {
            self.expect_keyword("JOIN").ok()?;
            return Some(JoinKind::Inner);
        }
        if self.eat_keyword("LEFT") {
            self.eat_keyword("OUTER");
            self.expect_keyword("JOIN").ok()?;
            return Some(JoinKind::Left);
        }
        if self.eat_keyword("RIGHT") {
            self.eat_keyword("OUTER");
            self.expect_keyword("JOIN").ok()?;
            return Some(JoinKind::Right);
        }
        if self.eat_keyword("FULL") {
            self.eat_keyword("OUTER");
            self.expect_keyword("JOIN").ok()?;
            return Some(JoinKind::Full);
        }
        if self.eat_keyword("CROSS") {
            if self.eat_keyword("APPLY") {
                return Some(JoinKind::CrossApply);
            }
            self.expect_keyword("JOIN").ok()?;
            return Some(JoinKind::Cross);
        }
        if self.eat_keyword("OUTER") {
            self.expect_keyword("APPLY").ok()?;
            return Some(JoinKind::OuterApply);
        }
        if natural {
            // `NATURAL` matched but nothing recognizable followed; since
            // we already consumed it, this is an error the caller should
            // see rather than silently losing the keyword.
            return Some(JoinKind::Natural);
        }
        None
    }

    pub(super) fn parse_table_factor(&mut self) -> PResult<TableFactor> {
        let lateral = self.eat_keyword("LATERAL");
        let kind = if self.at_punct("(") {
            self.bump();
            if self.at_any_keyword(&["SELECT", "WITH"]) {
                let query = self.parse_query_body()?;
                self.expect_punct(")")?;
                TableFactorKind::Subquery(Box::new(query))
            } else {
                // Parenthesized join (`(a JOIN b ON ...)`): not its own
                // factor kind in this AST, so it's captured verbatim.
                let start = self.checkpoint();
                let mut depth = 1i32;
                while depth > 0 {
                    if self.is_eof() {
                        return Err(self.err("unterminated parenthesized FROM item"));
                    }
                    if self.at_punct("(") {
                        depth += 1;
                    } else if self.at_punct(")") {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    self.bump();
                }
                let text = self.span_text(start, self.checkpoint());
                self.expect_punct(")")?;
                TableFactorKind::Raw(Raw {
                    text,
                    reason: RawReason::Verbatim,
                })
            }
        } else {
            let name = self.parse_object_name()?;
            if self.at_punct("(") {
                TableFactorKind::FunctionCall(self.parse_table_function_args(name)?)
            } else {
                TableFactorKind::Table(name)
            }
        };

        let alias = if self.eat_keyword("AS") {
            Some(self.parse_ident()?)
        } else if self.is_bare_alias_start() {
            Some(self.parse_ident()?)
        } else {
            None
        };
        let column_aliases = if alias.is_some() && self.at_punct("(") {
            self.parse_ident_list_parens()?
        } else {
            Vec::new()
        };

        Ok(TableFactor {
            kind,
            alias,
            column_aliases,
            lateral,
        })
    }

    /// `UNNEST(...)`, `generate_series(...)`, and friends used directly as
    /// a `FROM` source. Shares argument parsing with ordinary function
    /// calls in `expr.rs`, but is entered from `parse_table_factor` rather
    /// than expression context, so it's spelled out here against the
    /// `FunctionCall` struct directly.
    fn parse_table_function_args(&mut self, name: ObjectName) -> PResult<FunctionCall> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.at_punct(")") {
            args.push(FunctionArg {
                name: None,
                expr: self.parse_expr()?,
            });
            while self.eat_punct(",") {
                args.push(FunctionArg {
                    name: None,
                    expr: self.parse_expr()?,
                });
            }
        }
        self.expect_punct(")")?;
        Ok(FunctionCall {
            name,
            args,
            ..Default::default()
        })
    }
}
