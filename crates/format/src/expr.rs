//! Expression rendering: single space around binary operators
//! except `.`, `::`, unary prefixes, the `(` after a function name, and
//! `,`. Expressions are never line-wrapped by this formatter — only the
//! clause-level river layout spans multiple lines.

use itertools::Itertools;
use sqlfmt_core::ast::*;
use sqlfmt_core::FormatterError;

use crate::comments::place_inline;
use crate::writer::Writer;

type FResult<T> = Result<T, FormatterError>;

pub(crate) fn fmt_expr(w: &mut Writer, expr: &Expr) -> FResult<()> {
    w.enter_depth()?;
    place_inline(w, w.margin(), &expr.leading_comments);
    let result = fmt_expr_inner(w, expr);
    w.exit_depth();
    result
}

fn fmt_expr_inner(w: &mut Writer, expr: &Expr) -> FResult<()> {
    match &expr.kind {
        ExprKind::Literal(lit) => match lit.kind {
            LiteralKind::String => w.raw(&normalize_smart_quotes(&lit.raw_text)),
            LiteralKind::Number => w.raw(&lit.raw_text),
        },
        ExprKind::Null => w.raw("NULL"),
        ExprKind::Star => w.raw("*"),
        ExprKind::Identifier(name) => fmt_object_name(w, name),
        ExprKind::FunctionCall(fc) => fmt_function_call(w, fc)?,
        ExprKind::Binary(b) => fmt_binary(w, b)?,
        ExprKind::Unary(u) => fmt_unary(w, u)?,
        ExprKind::Paren(inner) => {
            w.raw("(");
            fmt_expr(w, inner)?;
            w.raw(")");
        }
        ExprKind::Tuple(items) => {
            w.raw("(");
            fmt_expr_list(w, items)?;
            w.raw(")");
        }
        ExprKind::Case(c) => fmt_case(w, c)?,
        ExprKind::Cast(c) => fmt_cast(w, c)?,
        ExprKind::Extract(e) => {
            w.raw("EXTRACT(");
            w.raw(&e.field);
            w.raw(" FROM ");
            fmt_expr(w, &e.expr)?;
            w.raw(")");
        }
        ExprKind::Interval(i) => {
            w.raw("INTERVAL ");
            w.raw(&i.value);
            if let Some(lf) = &i.leading_field {
                w.space();
                w.raw(&lf.to_uppercase());
            }
            if let Some(tf) = &i.trailing_field {
                w.raw(" TO ");
                w.raw(&tf.to_uppercase());
            }
        }
        ExprKind::TypedString(t) => {
            w.raw(&t.data_type.to_uppercase());
            w.space();
            w.raw(&t.value);
        }
        ExprKind::Exists(stmt) => {
            w.raw("EXISTS (");
            crate::stmt::fmt_subquery_body(w, stmt)?;
            w.raw(")");
        }
        ExprKind::Subquery(stmt) => {
            w.raw("(");
            crate::stmt::fmt_subquery_body(w, stmt)?;
            w.raw(")");
        }
        ExprKind::In(i) => fmt_in(w, i)?,
        ExprKind::Between(b) => {
            fmt_expr(w, &b.expr)?;
            w.raw(if b.negated { " NOT BETWEEN " } else { " BETWEEN " });
            fmt_expr(w, &b.low)?;
            w.raw(" AND ");
            fmt_expr(w, &b.high)?;
        }
        ExprKind::Like(l) => fmt_like(w, l)?,
        ExprKind::Is(i) => fmt_is(w, i)?,
        ExprKind::IsDistinctFrom(i) => {
            fmt_expr(w, &i.left)?;
            w.raw(if i.negated {
                " IS NOT DISTINCT FROM "
            } else {
                " IS DISTINCT FROM "
            });
            fmt_expr(w, &i.right)?;
        }
        ExprKind::RegexMatch(r) => {
            fmt_expr(w, &r.expr)?;
            let op = match (r.negated, r.case_insensitive) {
                (false, false) => " ~ ",
                (true, false) => " !~ ",
                (false, true) => " ~* ",
                (true, true) => " !~* ",
            };
            w.raw(op);
            fmt_expr(w, &r.pattern)?;
        }
        ExprKind::QuantifiedComparison(q) => {
            fmt_expr(w, &q.left)?;
            w.space();
            w.raw(binop_text(q.op));
            w.space();
            w.raw(match q.quantifier {
                Quantifier::Any => "ANY",
                Quantifier::Some => "SOME",
                Quantifier::All => "ALL",
            });
            w.raw(" (");
            crate::stmt::fmt_subquery_body(w, &q.query)?;
            w.raw(")");
        }
        ExprKind::ArrayConstructor(items) => {
            w.raw("ARRAY[");
            fmt_expr_list(w, items)?;
            w.raw("]");
        }
        ExprKind::OrderedExpr(o) => fmt_ordered_expr(w, o)?,
        ExprKind::Raw(r) => w.raw(&r.text),
    }
    Ok(())
}

/// Writes a comma-separated expression list with `, ` between items — no
/// space before the comma.
pub(crate) fn fmt_expr_list(w: &mut Writer, items: &[Expr]) -> FResult<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.raw(", ");
        }
        fmt_expr(w, item)?;
    }
    Ok(())
}

pub(crate) fn fmt_ordered_expr(w: &mut Writer, o: &OrderedExpr) -> FResult<()> {
    fmt_expr(w, &o.expr)?;
    match o.asc {
        Some(true) => w.raw(" ASC"),
        Some(false) => w.raw(" DESC"),
        None => {}
    }
    match o.nulls_first {
        Some(true) => w.raw(" NULLS FIRST"),
        Some(false) => w.raw(" NULLS LAST"),
        None => {}
    }
    Ok(())
}

pub(crate) fn fmt_ordered_expr_list(w: &mut Writer, items: &[OrderedExpr]) -> FResult<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.raw(", ");
        }
        fmt_ordered_expr(w, item)?;
    }
    Ok(())
}

pub(crate) fn fmt_object_name(w: &mut Writer, name: &ObjectName) {
    w.raw(&name.0.iter().map(fmt_ident_string).join("."));
}

pub(crate) fn fmt_ident(w: &mut Writer, ident: &Ident) {
    w.raw(&fmt_ident_string(ident));
}

pub(crate) fn fmt_ident_string(ident: &Ident) -> String {
    match ident.quote {
        Some('"') => format!("\"{}\"", ident.value.replace('"', "\"\"")),
        Some('`') => format!("`{}`", ident.value.replace('`', "``")),
        Some('[') => format!("[{}]", ident.value),
        _ => ident.value.clone(),
    }
}

fn fmt_binary(w: &mut Writer, b: &BinaryExpr) -> FResult<()> {
    fmt_expr(w, &b.left)?;
    w.space();
    w.raw(binop_text(b.op));
    w.space();
    fmt_expr(w, &b.right)?;
    Ok(())
}

fn binop_text(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Concat => "||",
        BinaryOp::And => "AND",
        BinaryOp::Or => "OR",
        BinaryOp::Eq => "=",
        BinaryOp::NotEq => "<>",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::ShiftLeft => "<<",
        BinaryOp::ShiftRight => ">>",
        BinaryOp::Custom(c) => match c {
            CustomOp::JsonArrow => "->",
            CustomOp::JsonArrowText => "->>",
            CustomOp::JsonHashArrow => "#>",
            CustomOp::JsonHashArrowText => "#>>",
            CustomOp::Contains => "@>",
            CustomOp::ContainedBy => "<@",
            CustomOp::HasKey => "?",
            CustomOp::HasAnyKey => "?|",
            CustomOp::HasAllKeys => "?&",
            CustomOp::Overlap => "&&",
        },
    }
}

fn fmt_unary(w: &mut Writer, u: &UnaryExpr) -> FResult<()> {
    match u.op {
        UnaryOp::Not => {
            w.raw("NOT ");
            fmt_expr(w, &u.expr)?;
        }
        UnaryOp::Neg => {
            w.raw("-");
            fmt_expr(w, &u.expr)?;
        }
        UnaryOp::Pos => {
            w.raw("+");
            fmt_expr(w, &u.expr)?;
        }
        UnaryOp::BitNot => {
            w.raw("~");
            fmt_expr(w, &u.expr)?;
        }
    }
    Ok(())
}

/// `CASE` renders on one line: the formatter wraps at clause boundaries,
/// not inside expressions, and never re-wraps content by line length.
fn fmt_case(w: &mut Writer, c: &CaseExpr) -> FResult<()> {
    w.raw("CASE");
    if let Some(operand) = &c.operand {
        w.space();
        fmt_expr(w, operand)?;
    }
    for when in &c.whens {
        w.raw(" WHEN ");
        fmt_expr(w, &when.condition)?;
        w.raw(" THEN ");
        fmt_expr(w, &when.result)?;
    }
    if let Some(else_result) = &c.else_result {
        w.raw(" ELSE ");
        fmt_expr(w, else_result)?;
    }
    w.raw(" END");
    Ok(())
}

fn fmt_cast(w: &mut Writer, c: &CastExpr) -> FResult<()> {
    if c.shorthand {
        fmt_expr(w, &c.expr)?;
        w.raw("::");
        fmt_data_type(w, &c.data_type);
    } else {
        w.raw("CAST(");
        fmt_expr(w, &c.expr)?;
        w.raw(" AS ");
        fmt_data_type(w, &c.data_type);
        w.raw(")");
    }
    Ok(())
}

pub(crate) fn fmt_data_type(w: &mut Writer, dt: &DataType) {
    let mut parts = dt.name.splitn(2, ' ');
    let base = parts.next().unwrap_or_default();
    w.raw(&base.to_lowercase());
    if let Some(rest) = parts.next() {
        w.space();
        w.raw(&rest.to_uppercase());
    }
    if !dt.args.is_empty() {
        w.raw("(");
        w.raw(&dt.args.join(", "));
        w.raw(")");
    }
}

fn fmt_in(w: &mut Writer, i: &InExpr) -> FResult<()> {
    fmt_expr(w, &i.expr)?;
    w.raw(if i.negated { " NOT IN (" } else { " IN (" });
    match &i.list {
        InList::Exprs(items) => fmt_expr_list(w, items)?,
        InList::Subquery(stmt) => crate::stmt::fmt_subquery_body(w, stmt)?,
    }
    w.raw(")");
    Ok(())
}

fn fmt_like(w: &mut Writer, l: &LikeExpr) -> FResult<()> {
    fmt_expr(w, &l.expr)?;
    let kw = match l.kind {
        LikeKind::Like => "LIKE",
        LikeKind::ILike => "ILIKE",
        LikeKind::SimilarTo => "SIMILAR TO",
    };
    w.space();
    if l.negated {
        w.raw("NOT ");
    }
    w.raw(kw);
    w.space();
    fmt_expr(w, &l.pattern)?;
    if let Some(escape) = &l.escape {
        w.raw(" ESCAPE ");
        fmt_expr(w, escape)?;
    }
    Ok(())
}

fn fmt_is(w: &mut Writer, i: &IsExpr) -> FResult<()> {
    fmt_expr(w, &i.expr)?;
    w.raw(" IS ");
    if i.negated {
        w.raw("NOT ");
    }
    w.raw(match i.predicate {
        IsPredicate::Null => "NULL",
        IsPredicate::True => "TRUE",
        IsPredicate::False => "FALSE",
        IsPredicate::Unknown => "UNKNOWN",
    });
    Ok(())
}

pub(crate) fn fmt_function_call(w: &mut Writer, fc: &FunctionCall) -> FResult<()> {
    fmt_object_name(w, &fc.name);
    w.raw("(");
    if fc.star_arg {
        w.raw("*");
    } else {
        if fc.distinct {
            w.raw("DISTINCT ");
        }
        for (i, arg) in fc.args.iter().enumerate() {
            if i > 0 {
                w.raw(", ");
            }
            fmt_function_arg(w, arg)?;
        }
        if !fc.order_by.is_empty() {
            w.raw(" ORDER BY ");
            fmt_ordered_expr_list(w, &fc.order_by)?;
        }
    }
    w.raw(")");
    if !fc.within_group.is_empty() {
        w.raw(" WITHIN GROUP (ORDER BY ");
        fmt_ordered_expr_list(w, &fc.within_group)?;
        w.raw(")");
    }
    match fc.null_handling {
        Some(NullHandling::RespectNulls) => w.raw(" RESPECT NULLS"),
        Some(NullHandling::IgnoreNulls) => w.raw(" IGNORE NULLS"),
        None => {}
    }
    if let Some(filter) = &fc.filter {
        w.raw(" FILTER (WHERE ");
        fmt_expr(w, filter)?;
        w.raw(")");
    }
    if let Some(over) = &fc.over {
        w.raw(" OVER ");
        match over {
            WindowRef::Named(name) => fmt_ident(w, name),
            WindowRef::Inline(spec) => {
                w.raw("(");
                fmt_window_spec(w, spec)?;
                w.raw(")");
            }
        }
    }
    Ok(())
}

/// Smart (rich-text-paste) quotes — U+2018/U+2019 — delimit a string
/// literal exactly like `'`/`'` but must never reach formatted output:
/// rewritten to the ASCII apostrophe here, leaving escaped-quote doubling
/// and any prefix (`E`, `N`, `X`, `B`, `U&`) untouched.
fn normalize_smart_quotes(raw_text: &str) -> String {
    raw_text.replace(['\u{2018}', '\u{2019}'], "'")
}

fn fmt_function_arg(w: &mut Writer, arg: &FunctionArg) -> FResult<()> {
    if let Some(name) = &arg.name {
        fmt_ident(w, name);
        w.raw(" => ");
    }
    fmt_expr(w, &arg.expr)
}

pub(crate) fn fmt_window_spec(w: &mut Writer, spec: &WindowSpec) -> FResult<()> {
    let mut wrote = false;
    if !spec.partition_by.is_empty() {
        w.raw("PARTITION BY ");
        fmt_expr_list(w, &spec.partition_by)?;
        wrote = true;
    }
    if !spec.order_by.is_empty() {
        if wrote {
            w.space();
        }
        w.raw("ORDER BY ");
        fmt_ordered_expr_list(w, &spec.order_by)?;
        wrote = true;
    }
    if let Some(frame) = &spec.frame {
        if wrote {
            w.space();
        }
        w.raw(frame);
    }
    Ok(())
}
