//! `CREATE TABLE/INDEX/VIEW/POLICY`, `ALTER TABLE`, `DROP`, `TRUNCATE`,
//! `GRANT`/`REVOKE`.

use sqlfmt_core::ast::*;

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_create(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("CREATE")?;
        let or_replace = self.eat_keyword_seq(&["OR", "REPLACE"]);
        let unique = self.eat_keyword("UNIQUE");
        self.eat_keyword("TEMP");
        self.eat_keyword("TEMPORARY");
        let materialized = self.eat_keyword("MATERIALIZED");

        if self.eat_keyword("TABLE") {
            self.parse_create_table()
        } else if unique || self.eat_keyword("INDEX") || self.at_keyword("INDEX") {
            self.parse_create_index(unique)
        } else if materialized || self.eat_keyword("VIEW") {
            self.parse_create_view(materialized, or_replace)
        } else if self.eat_keyword("POLICY") {
            self.parse_create_policy()
        } else {
            Err(self.err("expected TABLE, INDEX, VIEW, MATERIALIZED VIEW or POLICY after CREATE"))
        }
    }

    fn parse_create_table(&mut self) -> PResult<StmtKind> {
        let if_not_exists = self.eat_keyword_seq(&["IF", "NOT", "EXISTS"]);
        let name = self.parse_object_name()?;

        let (elements, as_query) = if self.eat_keyword("AS") {
            (Vec::new(), Some(Box::new(self.parse_query_body_for_subquery()?)))
        } else {
            self.expect_punct("(")?;
            let mut elements = Vec::new();
            if !self.at_punct(")") {
                elements.push(self.parse_table_element()?);
                while self.eat_punct(",") {
                    elements.push(self.parse_table_element()?);
                }
            }
            self.expect_punct(")")?;
            (elements, None)
        };

        let options = self.parse_trailing_raw_options();

        Ok(StmtKind::CreateTable(Box::new(CreateTable {
            if_not_exists,
            name,
            elements,
            as_query,
            options,
        })))
    }

    fn parse_table_element(&mut self) -> PResult<TableElement> {
        if self.at_any_keyword(&[
            "PRIMARY", "FOREIGN", "UNIQUE", "CHECK", "CONSTRAINT", "EXCLUDE",
        ]) {
            let start = self.checkpoint();
            self.skip_table_element_tail();
            return Ok(TableElement::Constraint(self.span_text(start, self.checkpoint())));
        }
        let name = self.parse_ident()?;
        let data_type = self.parse_data_type()?;
        let start = self.checkpoint();
        self.skip_table_element_tail();
        let tail = self.span_text(start, self.checkpoint());
        let constraints = if tail.is_empty() {
            Vec::new()
        } else {
            vec![tail]
        };
        Ok(TableElement::Column(ColumnDef {
            name,
            data_type,
            constraints,
        }))
    }

    /// Column constraints (`NOT NULL`, `DEFAULT ...`, `REFERENCES ...`,
    /// `GENERATED ALWAYS AS (...) STORED`, ...) and table-level
    /// constraints are both a long, vendor-varying tail; rather than model
    /// every form, this scans (honoring parens) to the element's end —
    /// the next top-level `,` or the closing `)` — and the caller keeps
    /// the span as a raw string.
    fn skip_table_element_tail(&mut self) {
        let mut depth = 0i32;
        loop {
            if self.is_eof() {
                return;
            }
            if depth == 0 && (self.at_punct(",") || self.at_punct(")")) {
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

    /// Trailing storage/engine options after the table body
    /// (`WITH (fillfactor = 70)`, MySQL `ENGINE=InnoDB`, `INHERITS (...)`,
    /// ...), kept as a flat list of raw tokens-as-text up to the
    /// statement end.
    fn parse_trailing_raw_options(&mut self) -> Vec<String> {
        let mut options = Vec::new();
        while !self.at_punct(";") && !self.is_eof() {
            let start = self.checkpoint();
            self.bump();
            if self.at_punct("(") {
                let mut depth = 0i32;
                loop {
                    if self.at_punct("(") {
                        depth += 1;
                    } else if self.at_punct(")") {
                        depth -= 1;
                    }
                    if self.is_eof() {
                        break;
                    }
                    self.bump();
                    if depth == 0 {
                        break;
                    }
                }
            }
            options.push(self.span_text(start, self.checkpoint()));
        }
        options
    }

    fn parse_create_index(&mut self, unique: bool) -> PResult<StmtKind> {
        self.eat_keyword("INDEX");
        let concurrently = self.eat_keyword("CONCURRENTLY");
        let if_not_exists = self.eat_keyword_seq(&["IF", "NOT", "EXISTS"]);
        let name = if self.at_keyword("ON") {
            None
        } else {
            Some(self.parse_ident()?)
        };
        self.expect_keyword("ON")?;
        let table = self.parse_object_name()?;
        let using = if self.eat_keyword("USING") {
            Some(self.parse_ident()?)
        } else {
            None
        };
        self.expect_punct("(")?;
        let mut columns = vec![self.parse_index_column()?];
        while self.eat_punct(",") {
            columns.push(self.parse_index_column()?);
        }
        self.expect_punct(")")?;
        let where_clause = if self.eat_keyword("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(StmtKind::CreateIndex(Box::new(CreateIndex {
            unique,
            concurrently,
            if_not_exists,
            name,
            table,
            using,
            columns,
            where_clause,
        })))
    }

    fn parse_index_column(&mut self) -> PResult<IndexColumn> {
        let expr = self.parse_expr()?;
        let asc = if self.eat_keyword("ASC") {
            Some(true)
        } else if self.eat_keyword("DESC") {
            Some(false)
        } else {
            None
        };
        Ok(IndexColumn { expr, asc })
    }

    fn parse_create_view(&mut self, materialized: bool, or_replace: bool) -> PResult<StmtKind> {
        self.eat_keyword("VIEW");
        let name = self.parse_object_name()?;
        let column_aliases = if self.at_punct("(") {
            self.parse_ident_list_parens()?
        } else {
            Vec::new()
        };
        self.expect_keyword("AS")?;
        let query = Box::new(self.parse_query_body_for_subquery()?);
        Ok(StmtKind::CreateView(Box::new(CreateView {
            or_replace,
            materialized,
            name,
            column_aliases,
            query,
        })))
    }

    fn parse_create_policy(&mut self) -> PResult<StmtKind> {
        let name = self.parse_ident()?;
        self.expect_keyword("ON")?;
        let table = self.parse_object_name()?;
        let start = self.checkpoint();
        self.skip_to_statement_end();
        let tail = self.span_text(start, self.checkpoint());
        let clauses = if tail.is_empty() { Vec::new() } else { vec![tail] };
        Ok(StmtKind::CreatePolicy(Box::new(CreatePolicy {
            name,
            table,
            clauses,
        })))
    }

    pub(crate) fn parse_alter_table(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("ALTER")?;
        self.expect_keyword("TABLE")?;
        let if_exists = self.eat_keyword_seq(&["IF", "EXISTS"]);
        let name = self.parse_object_name()?;
        let mut actions = vec![self.parse_alter_action()?];
        while self.eat_punct(",") {
            actions.push(self.parse_alter_action()?);
        }
        Ok(StmtKind::AlterTable(Box::new(AlterTable {
            if_exists,
            name,
            actions,
        })))
    }

    fn parse_alter_action(&mut self) -> PResult<AlterAction> {
        if self.eat_keyword("ADD") {
            self.eat_keyword("COLUMN");
            self.eat_keyword_seq(&["IF", "NOT", "EXISTS"]);
            let name = self.parse_ident()?;
            let data_type = self.parse_data_type()?;
            let start = self.checkpoint();
            self.skip_table_element_tail();
            let tail = self.span_text(start, self.checkpoint());
            let constraints = if tail.is_empty() { Vec::new() } else { vec![tail] };
            return Ok(AlterAction::AddColumn(ColumnDef {
                name,
                data_type,
                constraints,
            }));
        }
        if self.eat_keyword("DROP") {
            self.eat_keyword("COLUMN");
            let if_exists = self.eat_keyword_seq(&["IF", "EXISTS"]);
            let name = self.parse_ident()?;
            return Ok(AlterAction::DropColumn { name, if_exists });
        }
        if self.eat_keyword("RENAME") {
            if self.eat_keyword("TO") {
                return Ok(AlterAction::RenameTable(self.parse_object_name()?));
            }
            self.eat_keyword("COLUMN");
            let from = self.parse_ident()?;
            self.expect_keyword("TO")?;
            let to = self.parse_ident()?;
            return Ok(AlterAction::RenameColumn { from, to });
        }
        if self.eat_keyword("ALTER") {
            self.eat_keyword("COLUMN");
            let name = self.parse_ident()?;
            self.eat_keyword("TYPE");
            if self.eat_keyword_seq(&["SET", "DATA"]) {
                self.expect_keyword("TYPE")?;
            }
            let data_type = self.parse_data_type()?;
            return Ok(AlterAction::AlterColumnType { name, data_type });
        }
        let start = self.checkpoint();
        self.skip_table_element_tail();
        Ok(AlterAction::Raw(self.span_text(start, self.checkpoint())))
    }

    pub(crate) fn parse_drop(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("DROP")?;
        self.expect_keyword("TABLE")?;
        let if_exists = self.eat_keyword_seq(&["IF", "EXISTS"]);
        let mut names = vec![self.parse_object_name()?];
        while self.eat_punct(",") {
            names.push(self.parse_object_name()?);
        }
        let cascade = self.eat_keyword("CASCADE");
        self.eat_keyword("RESTRICT");
        Ok(StmtKind::DropTable(Box::new(DropTable {
            if_exists,
            names,
            cascade,
        })))
    }

    pub(crate) fn parse_truncate(&mut self) -> PResult<StmtKind> {
        self.expect_keyword("TRUNCATE")?;
        self.eat_keyword("TABLE");
        let mut names = vec![self.parse_object_name()?];
        while self.eat_punct(",") {
            names.push(self.parse_object_name()?);
        }
        let cascade = self.eat_keyword("CASCADE");
        self.eat_keyword("RESTRICT");
        Ok(StmtKind::Truncate(Box::new(Truncate { names, cascade })))
    }

    pub(crate) fn parse_grant_revoke(&mut self, is_grant: bool) -> PResult<StmtKind> {
        self.expect_keyword(if is_grant { "GRANT" } else { "REVOKE" })?;

        let mut privileges = vec![self.parse_privilege()?];
        while self.eat_punct(",") {
            privileges.push(self.parse_privilege()?);
        }

        self.expect_keyword("ON")?;
        let object_kind = if self.eat_keyword("TABLE") {
            Some(GrantRevokeObject::Table)
        } else if self.eat_keyword("SCHEMA") {
            Some(GrantRevokeObject::Schema)
        } else if self.eat_keyword("DATABASE") {
            Some(GrantRevokeObject::Database)
        } else if self.eat_keyword("SEQUENCE") {
            Some(GrantRevokeObject::Sequence)
        } else if self.eat_keyword("FUNCTION") {
            Some(GrantRevokeObject::Function)
        } else {
            None
        };

        let mut objects = vec![self.parse_grant_object_name()?];
        while self.eat_punct(",") {
            objects.push(self.parse_grant_object_name()?);
        }

        self.expect_keyword(if is_grant { "TO" } else { "FROM" })?;
        let mut grantees = vec![self.parse_ident()?];
        while self.eat_punct(",") {
            grantees.push(self.parse_ident()?);
        }

        let with_grant_option = is_grant && self.eat_keyword_seq(&["WITH", "GRANT", "OPTION"]);
        self.eat_keyword("CASCADE");

        let kind = GrantOrRevoke {
            privileges,
            object_kind,
            objects,
            grantees,
            with_grant_option,
        };
        Ok(if is_grant {
            StmtKind::Grant(Box::new(kind))
        } else {
            StmtKind::Revoke(Box::new(kind))
        })
    }

    fn parse_privilege(&mut self) -> PResult<String> {
        let mut text = self.bump().text.to_string();
        if text.eq_ignore_ascii_case("ALL") {
            self.eat_keyword("PRIVILEGES");
            return Ok(text);
        }
        if (text.eq_ignore_ascii_case("REFERENCES") || text.eq_ignore_ascii_case("INSERT"))
            && self.at_punct("(")
        {
            let cols = self.parse_ident_list_parens()?;
            let names: Vec<_> = cols.into_iter().map(|i| i.value).collect();
            text.push_str(&format!(" ({})", names.join(", ")));
        }
        Ok(text)
    }

    fn parse_grant_object_name(&mut self) -> PResult<ObjectName> {
        let name = self.parse_object_name()?;
        if self.eat_punct(".") {
            self.expect_operator("*")?;
        }
        Ok(name)
    }
}
