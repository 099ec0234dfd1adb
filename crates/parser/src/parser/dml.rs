//! `INSERT`, `UPDATE`, `DELETE`, `MERGE`.

use sqlfmt_core::ast::*;

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    /// `INSERT INTO ... (...) VALUES (...) | SELECT ... | DEFAULT VALUES`
    /// plus `ON CONFLICT`/`ON DUPLICATE KEY UPDATE`/`RETURNING`.
    ///
    /// `INSERT INT foo` (a missing `O`) is the canonical "this should
    /// fail" example: `INTO` is required and not optional, so a bare
    /// `INSERT foo ...` with neither `INTO` nor a recognizable alternative
    /// keyword falls straight
    /// through to `expect_keyword("INTO")`'s error.
    pub(crate) fn parse_insert(&mut self) -> PResult<StmtKind> {
        let or_action = if self.eat_keyword("REPLACE") {
            Some(InsertOrAction::Replace)
        } else {
            self.expect_keyword("INSERT")?;
            if self.eat_keyword_seq(&["OR", "REPLACE"]) {
                Some(InsertOrAction::Replace)
            } else if self.eat_keyword_seq(&["OR", "IGNORE"]) {
                Some(InsertOrAction::Ignore)
            } else if self.eat_keyword_seq(&["OR", "ABORT"]) {
                Some(InsertOrAction::Abort)
            } else if self.eat_keyword_seq(&["OR", "FAIL"]) {
                Some(InsertOrAction::Fail)
            } else if self.eat_keyword_seq(&["OR", "ROLLBACK"]) {
                Some(InsertOrAction::Rollback)
            } else {
                None
            }
        };
        self.eat_keyword("IGNORE");
        self.expect_keyword("INTO")?;

        let table = self.parse_object_name()?;
        let alias = if self.eat_keyword("AS") {
            Some(self.parse_ident()?)
        } else {
            None
        };

        let columns = if self.at_punct("(") {
            self.parse_ident_list_parens()?
        } else {
            Vec::new()
        };

        let source = if self.eat_keyword_seq(&["DEFAULT", "VALUES"]) {
            Some(InsertSource::DefaultValues)
        } else if self.eat_keyword("VALUES") {
            let mut rows = vec![self.parse_values_row()?];
            while self.eat_punct(",") {
                rows.push(self.parse_values_row()?);
            }
            Some(InsertSource::Values(rows))
        } else if self.at_any_keyword(&["SELECT", "WITH"]) {
            Some(InsertSource::Query(Box::new(self.parse_query_body_for_subquery()?)))
        } else {
            None
        };

        let on_conflict = if self.eat_keyword_seq(&["ON", "CONFLICT"]) {
            Some(self.parse_on_conflict()?)
        } else {
            None
        };

        let on_duplicate_key_update = if self.eat_keyword_seq(&["ON", "DUPLICATE"]) {
            self.expect_keyword("KEY")?;
            self.expect_keyword("UPDATE")?;
            let mut items = vec![self.parse_assignment()?];
            while self.eat_punct(",") {
                items.push(self.parse_assignment()?);
            }
            items
        } else {
            Vec::new()
        };

        let returning = self.parse_returning()?;

        Ok(StmtKind::Insert(Box::new(Insert {
            table,
            alias,
            or_action,
            columns,
            source,
            on_conflict,
            on_duplicate_key_update,
            returning,
        })))
    }

    fn parse_values_row(&mut self) -> PResult<Vec<Expr>> {
        self.expect_punct("(")?;
        let mut items = Vec::new();
        if !self.at_punct(")") {
            items.push(self.parse_expr()?);
            while self.eat_punct(",") {
                items.push(self.parse_expr()?);
            }
        }
        self.expect_punct(")")?;
        Ok(items)
    }

    fn parse_on_conflict(&mut self) -> PResult<OnConflict> {
        let mut target_columns = Vec::new();
        let mut target_constraint = None;
        if self.eat_keyword("ON") {
            self.expect_keyword("CONSTRAINT")?;
            target_constraint = Some(self.parse_ident()?);
        } else if self.at_punct("(") {
            target_columns = self.parse_ident_list_parens()?;
        }
        let (do_nothing, do_update, where_clause) = if self.eat_keyword("DO") {
            if self.eat_keyword("NOTHING") {
                (true, Vec::new(), None)
            } else {
                self.expect_keyword("UPDATE")?;
                self.expect_keyword("SET")?;
                let mut assignments = vec![self.parse_assignment()?];
                while self.eat_punct(",") {
                    assignments.push(self.parse_assignment()?);
                }
                let where_clause = if self.eat_keyword("WHERE") {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                (false, assignments, where_clause)
            }
        } else {
            (false, Vec::new(), None)
        };
        Ok(OnConflict {
            target_columns,
            target_constraint,
            do_nothing,
            do_update,
            where_clause,
        })
    }

    fn parse_assignment(&mut self) -> PResult<Assignment> {
        let target = self.parse_object_name()?;
        self.expect_operator("=")?;
        let value = self.parse_expr()?;
        Ok(Assignment { target, value })
    }

    pub(crate) fn parse_returning(&mut self) -> PResult<Vec<SelectItem>> {
        if !self.eat_keyword("RETURNING") {
            return Ok(Vec::new());
        }
        let mut items = vec![self.parse_returning_item()?];
        while self.eat_punct(",") {
            items.push(self.parse_returning_item()?);
        }
        Ok(items)
    }

    fn parse_returning_item(&mut self) -> PResult<SelectItem> {
        let expr = self.parse_expr()?;
        let alias = if self.eat_keyword("AS") {
            Some(self.parse_ident()?)
        } else {
            None
        };
        Ok(SelectItem { expr, alias })
    }

    pub(crate) fn parse_update(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("UPDATE")?;
        let table = self.parse_object_name()?;
        let alias = if self.eat_keyword("AS") {
            Some(self.parse_ident()?)
        } else if self.at_identifier_alias() {
            Some(self.parse_ident()?)
        } else {
            None
        };
        self.expect_keyword("SET")?;
        let mut assignments = vec![self.parse_assignment()?];
        while self.eat_punct(",") {
            assignments.push(self.parse_assignment()?);
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
        let returning = self.parse_returning()?;
        Ok(StmtKind::Update(Box::new(Update {
            table,
            alias,
            assignments,
            from,
            where_clause,
            returning,
        })))
    }

    pub(crate) fn parse_delete(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("DELETE")?;
        self.expect_keyword("FROM")?;
        let table = self.parse_object_name()?;
        let alias = if self.eat_keyword("AS") {
            Some(self.parse_ident()?)
        } else if self.at_identifier_alias() {
            Some(self.parse_ident()?)
        } else {
            None
        };
        let using = if self.eat_keyword("USING") {
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
        let returning = self.parse_returning()?;
        Ok(StmtKind::Delete(Box::new(Delete {
            table,
            alias,
            using,
            where_clause,
            returning,
        })))
    }

    pub(crate) fn parse_merge(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("MERGE")?;
        self.eat_keyword("INTO");
        let target = self.parse_object_name()?;
        let target_alias = if self.eat_keyword("AS") {
            Some(self.parse_ident()?)
        } else if self.at_identifier_alias() {
            Some(self.parse_ident()?)
        } else {
            None
        };
        self.expect_keyword("USING")?;
        let source = self.parse_merge_source()?;
        self.expect_keyword("ON")?;
        let on = self.parse_expr()?;

        let mut clauses = Vec::new();
        while self.eat_keyword("WHEN") {
            let action = if self.eat_keyword("NOT") {
                self.expect_keyword("MATCHED")?;
                if self.eat_keyword_seq(&["BY", "SOURCE"]) {
                    MergeAction::NotMatchedBySource
                } else {
                    self.eat_keyword_seq(&["BY", "TARGET"]);
                    MergeAction::NotMatched
                }
            } else {
                self.expect_keyword("MATCHED")?;
                MergeAction::Matched
            };
            let condition = if self.eat_keyword("AND") {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect_keyword("THEN")?;
            let operation = if self.eat_keyword("UPDATE") {
                self.expect_keyword("SET")?;
                let mut assignments = vec![self.parse_assignment()?];
                while self.eat_punct(",") {
                    assignments.push(self.parse_assignment()?);
                }
                MergeOperation::Update(assignments)
            } else if self.eat_keyword("DELETE") {
                MergeOperation::Delete
            } else {
                self.expect_keyword("INSERT")?;
                let columns = if self.at_punct("(") {
                    self.parse_ident_list_parens()?
                } else {
                    Vec::new()
                };
                self.expect_keyword("VALUES")?;
                let values = self.parse_values_row()?;
                MergeOperation::Insert { columns, values }
            };
            clauses.push(MergeClause {
                action,
                condition,
                operation,
            });
        }

        Ok(StmtKind::Merge(Box::new(Merge {
            target,
            target_alias,
            source,
            on,
            clauses,
        })))
    }

    fn parse_merge_source(&mut self) -> PResult<TableFactor> {
        self.parse_table_factor()
    }

    /// Whether the current identifier-ish token can be a bare table alias
    /// (no `AS`) in `UPDATE`/`DELETE`/`MERGE` — same rule as `SELECT`
    /// item aliases, just named for this call site's readability.
    fn at_identifier_alias(&self) -> bool {
        use sqlfmt_core::TokenKind;
        let tok = self.cur();
        if tok.kind == TokenKind::Identifier {
            return true;
        }
        tok.kind == TokenKind::Keyword && !sqlfmt_core::keywords::is_reserved(&tok.upper)
    }

    fn expect_operator(&mut self, op: &str) -> PResult<()> {
        if self.at_operator(op) {
            self.bump();
            Ok(())
        } else {
            Err(self.err(format!("expected '{op}'")))
        }
    }
}
