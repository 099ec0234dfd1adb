//! Expression grammar: a precedence climb from `primary` up through `OR`.
//! The ladder's shape — in particular, `NOT`/unary `-`/`+`
//! binding at the *tightest* level, right above `primary` — is kept
//! literal rather than standard SQL's looser-binding `NOT`.

use sqlfmt_core::ast::*;
use sqlfmt_core::TokenKind;

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("OR") {
            let right = self.parse_and()?;
            left = bin(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat_keyword("AND") {
            let right = self.parse_comparison()?;
            left = bin(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut left = self.parse_bitwise()?;
        loop {
            if let Some(next) = self.try_comparison_tail(left)? {
                left = next;
            } else {
                return Ok(left);
            }
        }
    }

    /// Tries every comparison-family construct in the grammar; returns
    /// `Ok(None)` (handing `left` back unconsumed) when none match.
    fn try_comparison_tail(&mut self, left: Expr) -> PResult<Option<Expr>> {
        const CMP_OPS: &[(&str, BinaryOp)] = &[
            ("=", BinaryOp::Eq),
            ("<>", BinaryOp::NotEq),
            ("!=", BinaryOp::NotEq),
            ("<=", BinaryOp::LtEq),
            (">=", BinaryOp::GtEq),
            ("<", BinaryOp::Lt),
            (">", BinaryOp::Gt),
        ];
        for (lexeme, op) in CMP_OPS {
            if self.at_operator(lexeme) {
                if let Some(quantified) = self.try_quantified_comparison(&left, *op)? {
                    return Ok(Some(quantified));
                }
                self.bump();
                let right = self.parse_bitwise()?;
                return Ok(Some(bin(left, *op, right)));
            }
        }

        for (lexeme, negated, ci) in [
            ("~", false, false),
            ("!~", true, false),
            ("~*", false, true),
            ("!~*", true, true),
        ] {
            if self.eat_operator(lexeme) {
                let pattern = self.parse_bitwise()?;
                return Ok(Some(Expr::new(ExprKind::RegexMatch(RegexMatchExpr {
                    expr: Box::new(left),
                    negated,
                    case_insensitive: ci,
                    pattern: Box::new(pattern),
                }))));
            }
        }

        if self.eat_keyword("ISNULL") {
            return Ok(Some(is_expr(left, false, IsPredicate::Null)));
        }
        if self.eat_keyword("NOTNULL") {
            return Ok(Some(is_expr(left, true, IsPredicate::Null)));
        }

        let negated = if self.at_keyword("NOT") && self.nth_is_predicate_keyword(1) {
            self.bump();
            true
        } else {
            false
        };

        if self.eat_keyword("BETWEEN") {
            let low = self.parse_bitwise()?;
            self.expect_keyword("AND")?;
            let high = self.parse_bitwise()?;
            return Ok(Some(Expr::new(ExprKind::Between(BetweenExpr {
                expr: Box::new(left),
                negated,
                low: Box::new(low),
                high: Box::new(high),
            }))));
        }

        if self.at_keyword("IN") {
            self.bump();
            let list = self.parse_in_list()?;
            return Ok(Some(Expr::new(ExprKind::In(InExpr {
                expr: Box::new(left),
                negated,
                list,
            }))));
        }

        if let Some(kind) = self.eat_like_keyword() {
            let pattern = self.parse_bitwise()?;
            let escape = if self.eat_keyword("ESCAPE") {
                Some(Box::new(self.parse_bitwise()?))
            } else {
                None
            };
            return Ok(Some(Expr::new(ExprKind::Like(LikeExpr {
                kind,
                negated,
                expr: Box::new(left),
                pattern: Box::new(pattern),
                escape,
            }))));
        }

        if self.at_any_keyword(&["RLIKE", "REGEXP"]) {
            self.bump();
            let pattern = self.parse_bitwise()?;
            return Ok(Some(Expr::new(ExprKind::RegexMatch(RegexMatchExpr {
                expr: Box::new(left),
                negated,
                case_insensitive: false,
                pattern: Box::new(pattern),
            }))));
        }

        if negated {
            // Consumed a `NOT` that turned out not to start any predicate
            // we recognize after all (shouldn't happen given
            // `nth_is_predicate_keyword`'s guard, but fail safe rather
            // than silently dropping the `NOT`).
            return Err(self.err("expected a predicate after 'NOT'"));
        }

        if self.eat_keyword("IS") {
            let negated = self.eat_keyword("NOT");
            if self.eat_keyword("DISTINCT") {
                self.expect_keyword("FROM")?;
                let right = self.parse_bitwise()?;
                return Ok(Some(Expr::new(ExprKind::IsDistinctFrom(
                    IsDistinctFromExpr {
                        left: Box::new(left),
                        negated,
                        right: Box::new(right),
                    },
                ))));
            }
            let predicate = if self.eat_keyword("NULL") {
                IsPredicate::Null
            } else if self.eat_keyword("TRUE") {
                IsPredicate::True
            } else if self.eat_keyword("FALSE") {
                IsPredicate::False
            } else if self.eat_keyword("UNKNOWN") {
                IsPredicate::Unknown
            } else {
                return Err(self.err("expected NULL, TRUE, FALSE, UNKNOWN or DISTINCT FROM after IS"));
            };
            return Ok(Some(is_expr(left, negated, predicate)));
        }

        Ok(None)
    }

    /// `expr op ANY (subquery)` / `op ALL (...)` / `op SOME (...)` — only
    /// valid right after a comparison operator, so this is tried before
    /// falling back to the plain binary form.
    fn try_quantified_comparison(&mut self, left: &Expr, op: BinaryOp) -> PResult<Option<Expr>> {
        let cp = self.checkpoint();
        self.bump(); // the comparison operator itself
        let quantifier = if self.eat_keyword("ANY") {
            Quantifier::Any
        } else if self.eat_keyword("ALL") {
            Quantifier::All
        } else if self.eat_keyword("SOME") {
            Quantifier::Some
        } else {
            self.restore(cp);
            return Ok(None);
        };
        self.expect_punct("(")?;
        let query = self.parse_query_body_for_subquery()?;
        self.expect_punct(")")?;
        Ok(Some(Expr::new(ExprKind::QuantifiedComparison(
            QuantifiedComparisonExpr {
                left: Box::new(left.clone()),
                op,
                quantifier,
                query: Box::new(query),
            },
        ))))
    }

    fn nth_is_predicate_keyword(&self, n: usize) -> bool {
        let t = self.nth(n);
        t.kind == TokenKind::Keyword
            && matches!(
                t.upper.as_str(),
                "BETWEEN" | "IN" | "LIKE" | "ILIKE" | "SIMILAR" | "RLIKE" | "REGEXP"
            )
    }

    fn eat_like_keyword(&mut self) -> Option<LikeKind> {
        if self.eat_keyword("LIKE") {
            Some(LikeKind::Like)
        } else if self.eat_keyword("ILIKE") {
            Some(LikeKind::ILike)
        } else if self.eat_keyword_seq(&["SIMILAR", "TO"]) {
            Some(LikeKind::SimilarTo)
        } else {
            None
        }
    }

    fn parse_in_list(&mut self) -> PResult<InList> {
        self.expect_punct("(")?;
        if self.at_any_keyword(&["SELECT", "WITH"]) {
            let query = self.parse_query_body_for_subquery()?;
            self.expect_punct(")")?;
            return Ok(InList::Subquery(Box::new(query)));
        }
        let mut items = Vec::new();
        if !self.at_punct(")") {
            items.push(self.parse_expr()?);
            while self.eat_punct(",") {
                items.push(self.parse_expr()?);
            }
        }
        self.expect_punct(")")?;
        Ok(InList::Exprs(items))
    }

    fn parse_bitwise(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            const OPS: &[(&str, BinaryOp)] = &[
                ("<<", BinaryOp::ShiftLeft),
                (">>", BinaryOp::ShiftRight),
                ("&", BinaryOp::BitAnd),
                ("^", BinaryOp::BitXor),
                ("|", BinaryOp::BitOr),
            ];
            const CUSTOM_OPS: &[(&str, CustomOp)] = &[
                ("->>", CustomOp::JsonArrowText),
                ("->", CustomOp::JsonArrow),
                ("#>>", CustomOp::JsonHashArrowText),
                ("#>", CustomOp::JsonHashArrow),
                ("@>", CustomOp::Contains),
                ("<@", CustomOp::ContainedBy),
                ("?|", CustomOp::HasAnyKey),
                ("?&", CustomOp::HasAllKeys),
                ("&&", CustomOp::Overlap),
                ("?", CustomOp::HasKey),
            ];
            let mut matched = false;
            for (lexeme, op) in OPS {
                if self.eat_operator(lexeme) {
                    let right = self.parse_additive()?;
                    left = bin(left, *op, right);
                    matched = true;
                    break;
                }
            }
            if matched {
                continue;
            }
            for (lexeme, op) in CUSTOM_OPS {
                if self.eat_operator(lexeme) {
                    let right = self.parse_additive()?;
                    left = bin(left, BinaryOp::Custom(*op), right);
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Ok(left);
            }
        }
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            if self.eat_operator("+") {
                let right = self.parse_multiplicative()?;
                left = bin(left, BinaryOp::Add, right);
            } else if self.eat_operator("-") {
                let right = self.parse_multiplicative()?;
                left = bin(left, BinaryOp::Sub, right);
            } else if self.eat_operator("||") {
                let right = self.parse_multiplicative()?;
                left = bin(left, BinaryOp::Concat, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            if self.eat_operator("*") {
                let right = self.parse_unary()?;
                left = bin(left, BinaryOp::Mul, right);
            } else if self.eat_operator("/") {
                let right = self.parse_unary()?;
                left = bin(left, BinaryOp::Div, right);
            } else if self.eat_operator("%") {
                let right = self.parse_unary()?;
                left = bin(left, BinaryOp::Mod, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.eat_keyword("NOT") {
            let expr = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Unary(UnaryExpr {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            })));
        }
        if self.eat_operator("-") {
            let expr = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Unary(UnaryExpr {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            })));
        }
        if self.eat_operator("+") {
            let expr = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Unary(UnaryExpr {
                op: UnaryOp::Pos,
                expr: Box::new(expr),
            })));
        }
        if self.eat_operator("~") {
            let expr = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Unary(UnaryExpr {
                op: UnaryOp::BitNot,
                expr: Box::new(expr),
            })));
        }
        self.parse_postfix()
    }

    /// Primary plus any trailing `::type` casts, which chain
    /// (`x::int::text`) and bind tighter than anything but the literal
    /// primary itself.
    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_operator("::") {
                let data_type = self.parse_data_type()?;
                expr = Expr::new(ExprKind::Cast(CastExpr {
                    expr: Box::new(expr),
                    data_type,
                    shorthand: true,
                }));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        self.enter_depth()?;
        let result = self.parse_primary_inner();
        self.exit_depth();
        result
    }

    fn parse_primary_inner(&mut self) -> PResult<Expr> {
        let leading = self.take_leading_here();
        let mut expr = self.parse_primary_bare()?;
        expr.leading_comments = leading;

        if expr.kind.is_string_literal() {
            while self.cur().kind == TokenKind::String {
                let tok = self.bump();
                let right = Expr::new(ExprKind::Literal(Literal {
                    kind: LiteralKind::String,
                    raw_text: tok.text.to_string(),
                }));
                expr = bin(expr, BinaryOp::Concat, right);
            }
        }
        Ok(expr)
    }

    fn parse_primary_bare(&mut self) -> PResult<Expr> {
        if self.at_punct("(") {
            return self.parse_paren_or_subquery_or_tuple();
        }
        if self.at_operator("*") {
            self.bump();
            return Ok(Expr::new(ExprKind::Star));
        }
        if self.eat_keyword("NULL") {
            return Ok(Expr::new(ExprKind::Null));
        }
        if self.eat_keyword("CASE") {
            return self.parse_case();
        }
        if self.eat_keyword("CAST") {
            return self.parse_cast();
        }
        if self.eat_keyword("EXTRACT") {
            return self.parse_extract();
        }
        if self.at_keyword("INTERVAL") {
            return self.parse_interval();
        }
        if self.eat_keyword("EXISTS") {
            self.expect_punct("(")?;
            let query = self.parse_query_body_for_subquery()?;
            self.expect_punct(")")?;
            return Ok(Expr::new(ExprKind::Exists(Box::new(query))));
        }
        if self.at_keyword("ARRAY") && self.nth(1).is_punct("[") {
            self.bump();
            return self.parse_array_constructor();
        }
        if self.at_any_keyword(&["POSITION", "SUBSTRING", "OVERLAY", "TRIM"]) && self.nth(1).is_punct("(") {
            return self.parse_sql_standard_function_call();
        }
        if let Some(expr) = self.try_typed_string_literal()? {
            return Ok(expr);
        }
        if self.cur().kind == TokenKind::Number {
            let tok = self.bump();
            return Ok(Expr::new(ExprKind::Literal(Literal {
                kind: LiteralKind::Number,
                raw_text: tok.text.to_string(),
            })));
        }
        if self.cur().kind == TokenKind::String {
            let tok = self.bump();
            return Ok(Expr::new(ExprKind::Literal(Literal {
                kind: LiteralKind::String,
                raw_text: tok.text.to_string(),
            })));
        }
        if self.cur().kind == TokenKind::Parameter {
            let tok = self.bump();
            return Ok(Expr::new(ExprKind::Identifier(ObjectName::single(
                Ident::new(tok.text.to_string()),
            ))));
        }
        if self.cur().kind == TokenKind::Identifier || self.cur().kind == TokenKind::Keyword {
            return self.parse_identifier_function_or_keyword_literal();
        }
        Err(self.err("expected an expression"))
    }

    fn parse_paren_or_subquery_or_tuple(&mut self) -> PResult<Expr> {
        self.expect_punct("(")?;
        if self.at_any_keyword(&["SELECT", "WITH"]) {
            let query = self.parse_query_body_for_subquery()?;
            self.expect_punct(")")?;
            return Ok(Expr::new(ExprKind::Subquery(Box::new(query))));
        }
        let mut items = vec![self.parse_expr()?];
        while self.eat_punct(",") {
            items.push(self.parse_expr()?);
        }
        self.expect_punct(")")?;
        if items.len() == 1 {
            Ok(Expr::new(ExprKind::Paren(Box::new(
                items.into_iter().next().unwrap(),
            ))))
        } else {
            Ok(Expr::new(ExprKind::Tuple(items)))
        }
    }

    fn parse_array_constructor(&mut self) -> PResult<Expr> {
        self.expect_punct("[")?;
        let mut items = Vec::new();
        if !self.at_punct("]") {
            items.push(self.parse_expr()?);
            while self.eat_punct(",") {
                items.push(self.parse_expr()?);
            }
        }
        self.expect_punct("]")?;
        Ok(Expr::new(ExprKind::ArrayConstructor(items)))
    }

    fn parse_case(&mut self) -> PResult<Expr> {
        let operand = if self.at_keyword("WHEN") {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut whens = Vec::new();
        while self.eat_keyword("WHEN") {
            let condition = self.parse_expr()?;
            self.expect_keyword("THEN")?;
            let result = self.parse_expr()?;
            whens.push(CaseWhen { condition, result });
        }
        let else_result = if self.eat_keyword("ELSE") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword("END")?;
        Ok(Expr::new(ExprKind::Case(CaseExpr {
            operand,
            whens,
            else_result,
        })))
    }

    fn parse_cast(&mut self) -> PResult<Expr> {
        self.expect_punct("(")?;
        let expr = self.parse_expr()?;
        self.expect_keyword("AS")?;
        let data_type = self.parse_data_type()?;
        self.expect_punct(")")?;
        Ok(Expr::new(ExprKind::Cast(CastExpr {
            expr: Box::new(expr),
            data_type,
            shorthand: false,
        })))
    }

    fn parse_extract(&mut self) -> PResult<Expr> {
        self.expect_punct("(")?;
        let field = self.bump().text.to_string();
        self.expect_keyword("FROM")?;
        let expr = self.parse_expr()?;
        self.expect_punct(")")?;
        Ok(Expr::new(ExprKind::Extract(ExtractExpr {
            field,
            expr: Box::new(expr),
        })))
    }

    fn parse_interval(&mut self) -> PResult<Expr> {
        self.expect_keyword("INTERVAL")?;
        let value = self.bump().text.to_string();
        let leading_field = if self.cur().kind == TokenKind::Identifier || self.cur().kind == TokenKind::Keyword
        {
            if self.at_keyword("TO") {
                None
            } else {
                Some(self.bump().text.to_string())
            }
        } else {
            None
        };
        let trailing_field = if self.eat_keyword("TO") {
            Some(self.bump().text.to_string())
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Interval(IntervalExpr {
            value,
            leading_field,
            trailing_field,
        })))
    }

    /// `POSITION(a IN b)`, `SUBSTRING(a FROM n FOR m)`, `OVERLAY(a PLACING
    /// b FROM n FOR m)`, `TRIM([LEADING|TRAILING|BOTH] [chars] FROM a)` —
    /// SQL-standard "keyword-argument" function syntax. Their argument
    /// grammars are all slightly different long tails, so rather than
    /// model each one exactly the arguments are captured as a single raw
    /// span: every construct the parser cannot fully model lands in a
    /// `raw` node instead — never dropped, never guessed.
    fn parse_sql_standard_function_call(&mut self) -> PResult<Expr> {
        let name_tok = self.bump();
        self.expect_punct("(")?;
        let start = self.checkpoint();
        let mut depth = 0i32;
        loop {
            if depth == 0 && self.at_punct(")") {
                break;
            }
            if self.at_punct("(") {
                depth += 1;
            } else if self.at_punct(")") {
                depth -= 1;
            }
            if self.is_eof() {
                return Err(self.err("unterminated function call"));
            }
            self.bump();
        }
        let args_text = self.span_text(start, self.checkpoint());
        self.expect_punct(")")?;
        let arg = Expr::new(ExprKind::Raw(Raw {
            text: args_text,
            reason: RawReason::Verbatim,
        }));
        Ok(Expr::new(ExprKind::FunctionCall(FunctionCall {
            name: ObjectName::single(Ident::new(name_tok.text.to_string())),
            args: vec![FunctionArg { name: None, expr: arg }],
            ..Default::default()
        })))
    }

    /// `DATE 'x'`, `TIME 'x'`, `TIMESTAMP 'x'`, `TIMESTAMP WITH TIME ZONE
    /// 'x'`, etc — recognized here (not the tokenizer) since they need
    /// grammar context the lexer doesn't have.
    fn try_typed_string_literal(&mut self) -> PResult<Option<Expr>> {
        if !self.at_any_keyword(&["DATE", "TIME", "TIMESTAMP"]) {
            return Ok(None);
        }
        let cp = self.checkpoint();
        let mut data_type = self.bump().text.to_string();
        if self.eat_keyword_seq(&["WITH", "LOCAL", "TIME", "ZONE"]) {
            data_type.push_str(" WITH LOCAL TIME ZONE");
        } else if self.eat_keyword_seq(&["WITH", "TIME", "ZONE"]) {
            data_type.push_str(" WITH TIME ZONE");
        } else if self.eat_keyword_seq(&["WITHOUT", "TIME", "ZONE"]) {
            data_type.push_str(" WITHOUT TIME ZONE");
        }
        if self.cur().kind != TokenKind::String {
            self.restore(cp);
            return Ok(None);
        }
        let value = self.bump().text.to_string();
        Ok(Some(Expr::new(ExprKind::TypedString(TypedStringExpr {
            data_type,
            value,
        }))))
    }

    /// The catch-all primary form: a dotted identifier chain (optionally
    /// ending in `.*`), a function call, or one of the zero-argument
    /// "keyword literals" (`CURRENT_DATE`, `TRUE`, …) — none of which have
    /// a dedicated `ExprKind` variant in this AST, so they're represented
    /// as a plain identifier carrying their original spelling.
    fn parse_identifier_function_or_keyword_literal(&mut self) -> PResult<Expr> {
        let first = self.parse_ident()?;
        let mut parts = vec![first];
        loop {
            if self.eat_punct(".") {
                if self.eat_operator("*") {
                    parts.push(Ident::new("*"));
                    break;
                }
                parts.push(self.parse_ident()?);
            } else {
                break;
            }
        }

        if self.at_punct("(") {
            return self.parse_function_call(ObjectName(parts));
        }

        if parts.len() == 1 && self.is_current_time_keyword(&parts[0].value) && self.at_punct("(") {
            return self.parse_function_call(ObjectName(parts));
        }

        Ok(Expr::new(ExprKind::Identifier(ObjectName(parts))))
    }

    fn is_current_time_keyword(&self, name: &str) -> bool {
        matches!(
            name.to_ascii_uppercase().as_str(),
            "CURRENT_DATE" | "CURRENT_TIME" | "CURRENT_TIMESTAMP"
        )
    }

    fn parse_function_call(&mut self, name: ObjectName) -> PResult<Expr> {
        self.expect_punct("(")?;
        let distinct = self.eat_keyword("DISTINCT");
        let mut star_arg = false;
        let mut args = Vec::new();
        let mut order_by = Vec::new();
        if self.at_operator("*") && self.nth(1).is_punct(")") {
            self.bump();
            star_arg = true;
        } else if !self.at_punct(")") {
            args.push(self.parse_function_arg()?);
            while self.eat_punct(",") {
                args.push(self.parse_function_arg()?);
            }
            if self.eat_keyword_seq(&["ORDER", "BY"]) {
                order_by.push(self.parse_ordered_expr()?);
                while self.eat_punct(",") {
                    order_by.push(self.parse_ordered_expr()?);
                }
            }
        }
        self.expect_punct(")")?;

        let within_group = if self.eat_keyword_seq(&["WITHIN", "GROUP"]) {
            self.expect_punct("(")?;
            self.expect_keyword_seq_err(&["ORDER", "BY"])?;
            let mut items = vec![self.parse_ordered_expr()?];
            while self.eat_punct(",") {
                items.push(self.parse_ordered_expr()?);
            }
            self.expect_punct(")")?;
            items
        } else {
            Vec::new()
        };

        let null_handling = if self.eat_keyword_seq(&["RESPECT", "NULLS"]) {
            Some(NullHandling::RespectNulls)
        } else if self.eat_keyword_seq(&["IGNORE", "NULLS"]) {
            Some(NullHandling::IgnoreNulls)
        } else {
            None
        };

        let filter = if self.eat_keyword("FILTER") {
            self.expect_punct("(")?;
            self.expect_keyword("WHERE")?;
            let cond = self.parse_expr()?;
            self.expect_punct(")")?;
            Some(Box::new(cond))
        } else {
            None
        };

        let over = if self.eat_keyword("OVER") {
            Some(self.parse_window_ref()?)
        } else {
            None
        };

        Ok(Expr::new(ExprKind::FunctionCall(FunctionCall {
            name,
            distinct,
            args,
            star_arg,
            order_by,
            within_group,
            filter,
            null_handling,
            over,
        })))
    }

    fn expect_keyword_seq_err(&mut self, kws: &[&str]) -> PResult<()> {
        if self.eat_keyword_seq(kws) {
            Ok(())
        } else {
            Err(self.err(format!("expected '{}'", kws.join(" "))))
        }
    }

    fn parse_function_arg(&mut self) -> PResult<FunctionArg> {
        let cp = self.checkpoint();
        if (self.cur().kind == TokenKind::Identifier || self.cur().kind == TokenKind::Keyword)
            && self.nth(1).is_operator("=")
            && self.nth(2).is_operator(">")
        {
            let name = self.parse_ident()?;
            self.bump();
            self.bump();
            let expr = self.parse_expr()?;
            return Ok(FunctionArg {
                name: Some(name),
                expr,
            });
        }
        self.restore(cp);
        Ok(FunctionArg {
            name: None,
            expr: self.parse_expr()?,
        })
    }

    pub(crate) fn parse_ordered_expr(&mut self) -> PResult<OrderedExpr> {
        let expr = self.parse_expr()?;
        let asc = if self.eat_keyword("ASC") {
            Some(true)
        } else if self.eat_keyword("DESC") {
            Some(false)
        } else {
            None
        };
        let nulls_first = if self.eat_keyword_seq(&["NULLS", "FIRST"]) {
            Some(true)
        } else if self.eat_keyword_seq(&["NULLS", "LAST"]) {
            Some(false)
        } else {
            None
        };
        Ok(OrderedExpr {
            expr: Box::new(expr),
            asc,
            nulls_first,
        })
    }

    pub(crate) fn parse_window_ref(&mut self) -> PResult<WindowRef> {
        if self.at_punct("(") {
            self.bump();
            let spec = self.parse_window_spec_body()?;
            self.expect_punct(")")?;
            Ok(WindowRef::Inline(Box::new(spec)))
        } else {
            Ok(WindowRef::Named(self.parse_ident()?))
        }
    }

    pub(crate) fn parse_window_spec_body(&mut self) -> PResult<WindowSpec> {
        let partition_by = if self.eat_keyword_seq(&["PARTITION", "BY"]) {
            let mut items = vec![self.parse_expr()?];
            while self.eat_punct(",") {
                items.push(self.parse_expr()?);
            }
            items
        } else {
            Vec::new()
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
        let frame = if self.at_any_keyword(&["ROWS", "RANGE", "GROUPS"]) {
            let start = self.checkpoint();
            while !self.at_punct(")") && !self.is_eof() {
                self.bump();
            }
            Some(self.span_text(start, self.checkpoint()))
        } else {
            None
        };
        Ok(WindowSpec {
            partition_by,
            order_by,
            frame,
        })
    }

    pub(crate) fn parse_data_type(&mut self) -> PResult<DataType> {
        let mut name = self.bump().text.to_string();
        loop {
            if self.at_any_keyword(&["PRECISION", "VARYING"]) {
                name.push(' ');
                name.push_str(&self.bump().text);
            } else if self.eat_keyword_seq(&["WITH", "LOCAL", "TIME", "ZONE"]) {
                name.push_str(" WITH LOCAL TIME ZONE");
            } else if self.eat_keyword_seq(&["WITH", "TIME", "ZONE"]) {
                name.push_str(" WITH TIME ZONE");
            } else if self.eat_keyword_seq(&["WITHOUT", "TIME", "ZONE"]) {
                name.push_str(" WITHOUT TIME ZONE");
            } else {
                break;
            }
        }
        let mut args = Vec::new();
        if self.eat_punct("(") {
            loop {
                args.push(self.bump().text.to_string());
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct(")")?;
        }
        while self.at_punct("[") && self.nth(1).is_punct("]") {
            self.bump();
            self.bump();
            name.push_str("[]");
        }
        Ok(DataType { name, args })
    }
}

fn bin(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::new(ExprKind::Binary(BinaryExpr {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }))
}

fn is_expr(left: Expr, negated: bool, predicate: IsPredicate) -> Expr {
    Expr::new(ExprKind::Is(IsExpr {
        expr: Box::new(left),
        negated,
        predicate,
    }))
}

trait ExprKindExt {
    fn is_string_literal(&self) -> bool;
}

impl ExprKindExt for ExprKind {
    fn is_string_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Literal(Literal {
                kind: LiteralKind::String,
                ..
            })
        )
    }
}
