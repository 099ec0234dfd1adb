//! Statement rendering: top-level statement dispatch plus
//! every clause-level layout (`SELECT`, DML, DDL, set operations, CTEs).
//!
//! River width is computed per statement from the widest top-level
//! clause keyword actually used — every other clause keyword in that
//! statement is right-padded to that width.

use itertools::Itertools;
use sqlfmt_core::ast::*;
use sqlfmt_core::FormatterError;

use crate::comments::{place_fresh, place_inline};
use crate::expr::{
    fmt_data_type, fmt_expr, fmt_expr_list, fmt_function_call, fmt_ident, fmt_object_name,
    fmt_ordered_expr_list,
};
use crate::writer::Writer;

type FResult<T> = Result<T, FormatterError>;

/// Formats one top-level statement: its own leading comments, a fresh
/// line, the statement body, and a trailing `;` (psql meta-commands are
/// the only statement kind that never gets one).
pub(crate) fn fmt_top_level(w: &mut Writer, stmt: &Stmt) -> FResult<()> {
    place_fresh(w, 0, &stmt.leading_comments);
    fmt_stmt_kind(w, &stmt.kind)?;
    if !is_meta_command(&stmt.kind) {
        w.raw(";");
    }
    Ok(())
}

fn is_meta_command(kind: &StmtKind) -> bool {
    matches!(kind, StmtKind::Raw(r) if r.reason == RawReason::Verbatim && r.text.starts_with('\\'))
}

/// Formats a subquery's body at the cursor's current position (right
/// after the `(` the caller already wrote): its own leading comments
/// inline, then the statement with its first clause starting on the
/// same line, nested one indent level past the enclosing margin.
pub(crate) fn fmt_subquery_body(w: &mut Writer, stmt: &Stmt) -> FResult<()> {
    w.enter_depth()?;
    let col = w.column();
    place_inline(w, col, &stmt.leading_comments);
    w.push_margin(w.column());
    let result = fmt_stmt_kind(w, &stmt.kind);
    w.pop_margin();
    w.exit_depth();
    result
}

fn fmt_stmt_kind(w: &mut Writer, kind: &StmtKind) -> FResult<()> {
    match kind {
        StmtKind::Select(s) => fmt_select(w, s),
        StmtKind::Insert(s) => fmt_insert(w, s),
        StmtKind::Update(s) => fmt_update(w, s),
        StmtKind::Delete(s) => fmt_delete(w, s),
        StmtKind::Merge(s) => fmt_merge(w, s),
        StmtKind::Cte(s) => fmt_cte(w, s),
        StmtKind::Union(s) => fmt_union(w, s),
        StmtKind::CreateTable(s) => fmt_create_table(w, s),
        StmtKind::CreateIndex(s) => fmt_create_index(w, s),
        StmtKind::CreateView(s) => fmt_create_view(w, s),
        StmtKind::CreatePolicy(s) => fmt_create_policy(w, s),
        StmtKind::AlterTable(s) => fmt_alter_table(w, s),
        StmtKind::DropTable(s) => fmt_drop_table(w, s),
        StmtKind::Grant(s) => fmt_grant_revoke(w, s, true),
        StmtKind::Revoke(s) => fmt_grant_revoke(w, s, false),
        StmtKind::Truncate(s) => fmt_truncate(w, s),
        StmtKind::Explain(s) => fmt_explain(w, s),
        StmtKind::Comment(s) => fmt_comment_on(w, s),
        StmtKind::Raw(r) => {
            w.raw(&r.text);
            Ok(())
        }
    }
}

fn river_of(keywords: &[&str]) -> usize {
    keywords.iter().map(|k| k.chars().count()).max().unwrap_or(0)
}

// ---------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------

fn lock_kw(strength: LockStrength) -> &'static str {
    match strength {
        LockStrength::Update => "FOR UPDATE",
        LockStrength::Share => "FOR SHARE",
    }
}

fn select_keywords(sel: &SelectStmt) -> Vec<&'static str> {
    let mut kws = vec!["SELECT"];
    if !sel.from.is_empty() {
        kws.push("FROM");
    }
    if sel.where_clause.is_some() {
        kws.push("WHERE");
    }
    if sel.group_by.is_some() {
        kws.push("GROUP BY");
    }
    if sel.having.is_some() {
        kws.push("HAVING");
    }
    if !sel.windows.is_empty() {
        kws.push("WINDOW");
    }
    if sel.qualify.is_some() {
        kws.push("QUALIFY");
    }
    if !sel.order_by.is_empty() {
        kws.push("ORDER BY");
    }
    if sel.limit.is_some() {
        kws.push("LIMIT");
    }
    if sel.offset.is_some() {
        kws.push("OFFSET");
    }
    if sel.fetch.is_some() {
        kws.push("FETCH");
    }
    for lock in &sel.locking {
        kws.push(lock_kw(lock.strength));
    }
    kws
}

fn fmt_select(w: &mut Writer, sel: &SelectStmt) -> FResult<()> {
    w.enter_depth()?;
    let result = fmt_select_inner(w, sel);
    w.exit_depth();
    result
}

fn fmt_select_inner(w: &mut Writer, sel: &SelectStmt) -> FResult<()> {
    let river = river_of(&select_keywords(sel));
    let margin = w.margin();

    w.clause(river, "SELECT");
    w.space();
    if let Some(distinct) = &sel.distinct {
        w.raw("DISTINCT");
        if !distinct.on.is_empty() {
            w.raw(" ON (");
            fmt_expr_list(w, &distinct.on)?;
            w.raw(")");
        }
        w.space();
    }
    if let Some(top) = &sel.top {
        w.raw("TOP ");
        fmt_expr(w, top)?;
        w.space();
    }
    let col_col = w.continuation_col(river);
    for (i, item) in sel.columns.iter().enumerate() {
        if i > 0 {
            w.raw(",");
            w.newline(col_col);
        }
        fmt_select_item(w, item)?;
    }

    if !sel.from.is_empty() {
        w.newline(margin);
        fmt_from_clause(w, river, "FROM", &sel.from)?;
    }

    if let Some(where_clause) = &sel.where_clause {
        w.newline(margin);
        w.clause(river, "WHERE");
        w.space();
        fmt_expr(w, where_clause)?;
    }

    if let Some(group_by) = &sel.group_by {
        w.newline(margin);
        w.clause(river, "GROUP BY");
        w.space();
        fmt_group_by(w, group_by)?;
    }

    if let Some(having) = &sel.having {
        w.newline(margin);
        w.clause(river, "HAVING");
        w.space();
        fmt_expr(w, having)?;
    }

    if !sel.windows.is_empty() {
        w.newline(margin);
        w.clause(river, "WINDOW");
        w.space();
        let win_col = w.continuation_col(river);
        for (i, win) in sel.windows.iter().enumerate() {
            if i > 0 {
                w.raw(",");
                w.newline(win_col);
            }
            fmt_ident(w, &win.name);
            w.raw(" AS (");
            crate::expr::fmt_window_spec(w, &win.spec)?;
            w.raw(")");
        }
    }

    if let Some(qualify) = &sel.qualify {
        w.newline(margin);
        w.clause(river, "QUALIFY");
        w.space();
        fmt_expr(w, qualify)?;
    }

    if !sel.order_by.is_empty() {
        w.newline(margin);
        w.clause(river, "ORDER BY");
        w.space();
        fmt_ordered_expr_list(w, &sel.order_by)?;
    }

    if let Some(limit) = &sel.limit {
        w.newline(margin);
        w.clause(river, "LIMIT");
        w.space();
        fmt_expr(w, limit)?;
    }

    if let Some(offset) = &sel.offset {
        w.newline(margin);
        w.clause(river, "OFFSET");
        w.space();
        fmt_expr(w, offset)?;
    }

    if let Some(fetch) = &sel.fetch {
        w.newline(margin);
        w.clause(river, "FETCH");
        w.space();
        w.raw("FIRST ");
        fmt_expr(w, &fetch.count)?;
        w.raw(if fetch.with_ties {
            " ROWS WITH TIES"
        } else {
            " ROWS ONLY"
        });
    }

    for lock in &sel.locking {
        w.newline(margin);
        let kw = lock_kw(lock.strength);
        w.clause(river, kw);
        if !lock.of.is_empty() {
            w.raw(" OF ");
            w.raw(&lock.of.iter().map(object_name_string).join(", "));
        }
        if lock.nowait {
            w.raw(" NOWAIT");
        }
        if lock.skip_locked {
            w.raw(" SKIP LOCKED");
        }
    }

    if let Some(for_clause) = &sel.for_clause {
        w.newline(margin);
        w.raw(for_clause);
    }

    Ok(())
}

fn fmt_select_item(w: &mut Writer, item: &SelectItem) -> FResult<()> {
    fmt_expr(w, &item.expr)?;
    if let Some(alias) = &item.alias {
        w.raw(" AS ");
        fmt_ident(w, alias);
    }
    Ok(())
}

fn fmt_group_by(w: &mut Writer, gb: &GroupByClause) -> FResult<()> {
    match gb.kind {
        GroupByKind::Simple => fmt_expr_list(w, &gb.items),
        GroupByKind::Rollup => {
            w.raw("ROLLUP (");
            fmt_expr_list(w, &gb.items)?;
            w.raw(")");
            Ok(())
        }
        GroupByKind::Cube => {
            w.raw("CUBE (");
            fmt_expr_list(w, &gb.items)?;
            w.raw(")");
            Ok(())
        }
        GroupByKind::GroupingSets => {
            w.raw("GROUPING SETS (");
            fmt_expr_list(w, &gb.items)?;
            w.raw(")");
            Ok(())
        }
    }
}

fn object_name_string(name: &ObjectName) -> String {
    name.0.iter().map(ident_string).join(".")
}

fn ident_string(ident: &Ident) -> String {
    match ident.quote {
        Some('"') => format!("\"{}\"", ident.value.replace('"', "\"\"")),
        Some('`') => format!("`{}`", ident.value.replace('`', "``")),
        Some('[') => format!("[{}]", ident.value),
        _ => ident.value.clone(),
    }
}

// ---------------------------------------------------------------------
// FROM / JOIN / table factors — shared by SELECT, UPDATE, DELETE, MERGE
// ---------------------------------------------------------------------

fn fmt_from_clause(w: &mut Writer, river: usize, keyword: &str, items: &[FromItem]) -> FResult<()> {
    w.clause(river, keyword);
    w.space();
    let col = w.continuation_col(river);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.raw(",");
            w.newline(col);
        }
        fmt_from_item(w, col, item)?;
    }
    Ok(())
}

fn fmt_from_item(w: &mut Writer, col: usize, item: &FromItem) -> FResult<()> {
    fmt_table_factor(w, &item.factor)?;
    for join in &item.joins {
        w.newline(col);
        fmt_join(w, col, join)?;
    }
    if let Some(pivot) = &item.pivot {
        w.space();
        w.raw(&pivot.text);
    }
    Ok(())
}

fn join_kw(kind: JoinKind) -> &'static str {
    match kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::Left => "LEFT JOIN",
        JoinKind::Right => "RIGHT JOIN",
        JoinKind::Full => "FULL JOIN",
        JoinKind::Cross => "CROSS JOIN",
        JoinKind::Natural => "NATURAL JOIN",
        JoinKind::CrossApply => "CROSS APPLY",
        JoinKind::OuterApply => "OUTER APPLY",
    }
}

fn fmt_join(w: &mut Writer, col: usize, join: &Join) -> FResult<()> {
    w.raw(join_kw(join.kind));
    w.space();
    fmt_table_factor(w, &join.factor)?;
    match &join.condition {
        JoinCondition::On(expr) => {
            w.newline(col);
            w.raw("ON ");
            fmt_expr(w, expr)?;
        }
        JoinCondition::Using(cols) => {
            w.newline(col);
            w.raw("USING (");
            w.raw(&cols.iter().map(ident_string).join(", "));
            w.raw(")");
        }
        JoinCondition::None => {}
    }
    Ok(())
}

fn fmt_table_factor(w: &mut Writer, factor: &TableFactor) -> FResult<()> {
    if factor.lateral {
        w.raw("LATERAL ");
    }
    match &factor.kind {
        TableFactorKind::Table(name) => fmt_object_name(w, name),
        TableFactorKind::Subquery(stmt) => {
            w.raw("(");
            fmt_subquery_body(w, stmt)?;
            w.raw(")");
        }
        TableFactorKind::FunctionCall(fc) => fmt_function_call(w, fc)?,
        TableFactorKind::Raw(r) => w.raw(&r.text),
    }
    if let Some(alias) = &factor.alias {
        w.raw(" AS ");
        fmt_ident(w, alias);
        if !factor.column_aliases.is_empty() {
            w.raw(" (");
            w.raw(&factor.column_aliases.iter().map(ident_string).join(", "));
            w.raw(")");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------
// INSERT / UPDATE / DELETE / MERGE
// ---------------------------------------------------------------------

fn insert_keyword(act: Option<InsertOrAction>) -> &'static str {
    match act {
        None => "INSERT INTO",
        Some(InsertOrAction::Replace) => "REPLACE INTO",
        Some(InsertOrAction::Ignore) => "INSERT OR IGNORE INTO",
        Some(InsertOrAction::Abort) => "INSERT OR ABORT INTO",
        Some(InsertOrAction::Fail) => "INSERT OR FAIL INTO",
        Some(InsertOrAction::Rollback) => "INSERT OR ROLLBACK INTO",
    }
}

fn fmt_insert(w: &mut Writer, ins: &Insert) -> FResult<()> {
    w.enter_depth()?;
    let result = fmt_insert_inner(w, ins);
    w.exit_depth();
    result
}

fn fmt_insert_inner(w: &mut Writer, ins: &Insert) -> FResult<()> {
    let kw = insert_keyword(ins.or_action);
    let mut kws = vec![kw, "VALUES"];
    if ins.on_conflict.is_some() {
        kws.push("ON CONFLICT");
    }
    if !ins.returning.is_empty() {
        kws.push("RETURNING");
    }
    let river = river_of(&kws);
    let margin = w.margin();

    w.clause(river, kw);
    w.space();
    fmt_object_name(w, &ins.table);
    if let Some(alias) = &ins.alias {
        w.raw(" AS ");
        fmt_ident(w, alias);
    }
    if !ins.columns.is_empty() {
        w.raw(" (");
        w.raw(&ins.columns.iter().map(ident_string).join(", "));
        w.raw(")");
    }

    match &ins.source {
        None | Some(InsertSource::DefaultValues) => {
            w.newline(margin);
            w.clause(river, "VALUES");
            w.space();
            w.raw("DEFAULT VALUES");
        }
        Some(InsertSource::Values(rows)) => {
            w.newline(margin);
            w.clause(river, "VALUES");
            w.space();
            let col = w.continuation_col(river);
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    w.raw(",");
                    w.newline(col);
                }
                w.raw("(");
                fmt_expr_list(w, row)?;
                w.raw(")");
            }
        }
        Some(InsertSource::Query(stmt)) => {
            w.newline(margin);
            fmt_stmt_kind(w, &stmt.kind)?;
        }
    }

    if let Some(oc) = &ins.on_conflict {
        w.newline(margin);
        w.clause(river, "ON CONFLICT");
        if !oc.target_columns.is_empty() {
            w.raw(" (");
            w.raw(&oc.target_columns.iter().map(ident_string).join(", "));
            w.raw(")");
        }
        if let Some(constraint) = &oc.target_constraint {
            w.raw(" ON CONSTRAINT ");
            fmt_ident(w, constraint);
        }
        if oc.do_nothing {
            w.raw(" DO NOTHING");
        } else if !oc.do_update.is_empty() {
            w.raw(" DO UPDATE SET ");
            fmt_assignments(w, &oc.do_update)?;
            if let Some(wc) = &oc.where_clause {
                w.raw(" WHERE ");
                fmt_expr(w, wc)?;
            }
        }
    }

    if !ins.on_duplicate_key_update.is_empty() {
        w.newline(margin);
        w.raw("ON DUPLICATE KEY UPDATE ");
        fmt_assignments(w, &ins.on_duplicate_key_update)?;
    }

    if !ins.returning.is_empty() {
        w.newline(margin);
        w.clause(river, "RETURNING");
        w.space();
        for (i, item) in ins.returning.iter().enumerate() {
            if i > 0 {
                w.raw(", ");
            }
            fmt_select_item(w, item)?;
        }
    }

    Ok(())
}

fn fmt_assignments(w: &mut Writer, assignments: &[Assignment]) -> FResult<()> {
    for (i, a) in assignments.iter().enumerate() {
        if i > 0 {
            w.raw(", ");
        }
        fmt_object_name(w, &a.target);
        w.raw(" = ");
        fmt_expr(w, &a.value)?;
    }
    Ok(())
}

fn fmt_update(w: &mut Writer, upd: &Update) -> FResult<()> {
    w.enter_depth()?;
    let result = fmt_update_inner(w, upd);
    w.exit_depth();
    result
}

fn fmt_update_inner(w: &mut Writer, upd: &Update) -> FResult<()> {
    let mut kws = vec!["UPDATE", "SET"];
    if !upd.from.is_empty() {
        kws.push("FROM");
    }
    if upd.where_clause.is_some() {
        kws.push("WHERE");
    }
    if !upd.returning.is_empty() {
        kws.push("RETURNING");
    }
    let river = river_of(&kws);
    let margin = w.margin();

    w.clause(river, "UPDATE");
    w.space();
    fmt_object_name(w, &upd.table);
    if let Some(alias) = &upd.alias {
        w.raw(" AS ");
        fmt_ident(w, alias);
    }

    w.newline(margin);
    w.clause(river, "SET");
    w.space();
    let col = w.continuation_col(river);
    for (i, a) in upd.assignments.iter().enumerate() {
        if i > 0 {
            w.raw(",");
            w.newline(col);
        }
        fmt_object_name(w, &a.target);
        w.raw(" = ");
        fmt_expr(w, &a.value)?;
    }

    if !upd.from.is_empty() {
        w.newline(margin);
        fmt_from_clause(w, river, "FROM", &upd.from)?;
    }

    if let Some(wc) = &upd.where_clause {
        w.newline(margin);
        w.clause(river, "WHERE");
        w.space();
        fmt_expr(w, wc)?;
    }

    if !upd.returning.is_empty() {
        w.newline(margin);
        w.clause(river, "RETURNING");
        w.space();
        for (i, item) in upd.returning.iter().enumerate() {
            if i > 0 {
                w.raw(", ");
            }
            fmt_select_item(w, item)?;
        }
    }

    Ok(())
}

fn fmt_delete(w: &mut Writer, del: &Delete) -> FResult<()> {
    w.enter_depth()?;
    let result = fmt_delete_inner(w, del);
    w.exit_depth();
    result
}

fn fmt_delete_inner(w: &mut Writer, del: &Delete) -> FResult<()> {
    let mut kws = vec!["DELETE FROM"];
    if !del.using.is_empty() {
        kws.push("USING");
    }
    if del.where_clause.is_some() {
        kws.push("WHERE");
    }
    if !del.returning.is_empty() {
        kws.push("RETURNING");
    }
    let river = river_of(&kws);
    let margin = w.margin();

    w.clause(river, "DELETE FROM");
    w.space();
    fmt_object_name(w, &del.table);
    if let Some(alias) = &del.alias {
        w.raw(" AS ");
        fmt_ident(w, alias);
    }

    if !del.using.is_empty() {
        w.newline(margin);
        fmt_from_clause(w, river, "USING", &del.using)?;
    }

    if let Some(wc) = &del.where_clause {
        w.newline(margin);
        w.clause(river, "WHERE");
        w.space();
        fmt_expr(w, wc)?;
    }

    if !del.returning.is_empty() {
        w.newline(margin);
        w.clause(river, "RETURNING");
        w.space();
        for (i, item) in del.returning.iter().enumerate() {
            if i > 0 {
                w.raw(", ");
            }
            fmt_select_item(w, item)?;
        }
    }

    Ok(())
}

fn fmt_merge(w: &mut Writer, merge: &Merge) -> FResult<()> {
    w.enter_depth()?;
    let result = fmt_merge_inner(w, merge);
    w.exit_depth();
    result
}

fn fmt_merge_inner(w: &mut Writer, merge: &Merge) -> FResult<()> {
    let mut kws = vec!["MERGE INTO", "USING", "ON"];
    kws.extend(merge.clauses.iter().map(|c| match c.action {
        MergeAction::Matched => "WHEN MATCHED",
        MergeAction::NotMatched => "WHEN NOT MATCHED",
        MergeAction::NotMatchedBySource => "WHEN NOT MATCHED BY SOURCE",
    }));
    let river = river_of(&kws);
    let margin = w.margin();

    w.clause(river, "MERGE INTO");
    w.space();
    fmt_object_name(w, &merge.target);
    if let Some(alias) = &merge.target_alias {
        w.raw(" AS ");
        fmt_ident(w, alias);
    }

    w.newline(margin);
    w.clause(river, "USING");
    w.space();
    fmt_table_factor(w, &merge.source)?;

    w.newline(margin);
    w.clause(river, "ON");
    w.space();
    fmt_expr(w, &merge.on)?;

    for clause in &merge.clauses {
        w.newline(margin);
        let kw = match clause.action {
            MergeAction::Matched => "WHEN MATCHED",
            MergeAction::NotMatched => "WHEN NOT MATCHED",
            MergeAction::NotMatchedBySource => "WHEN NOT MATCHED BY SOURCE",
        };
        w.clause(river, kw);
        if let Some(cond) = &clause.condition {
            w.raw(" AND ");
            fmt_expr(w, cond)?;
        }
        w.raw(" THEN ");
        fmt_merge_operation(w, &clause.operation)?;
    }

    Ok(())
}

fn fmt_merge_operation(w: &mut Writer, op: &MergeOperation) -> FResult<()> {
    match op {
        MergeOperation::Update(assignments) => {
            w.raw("UPDATE SET ");
            fmt_assignments(w, assignments)
        }
        MergeOperation::Insert { columns, values } => {
            w.raw("INSERT");
            if !columns.is_empty() {
                w.raw(" (");
                w.raw(&columns.iter().map(ident_string).join(", "));
                w.raw(")");
            }
            w.raw(" VALUES (");
            fmt_expr_list(w, values)?;
            w.raw(")");
            Ok(())
        }
        MergeOperation::Delete => {
            w.raw("DELETE");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------
// CTE / set operations
// ---------------------------------------------------------------------

fn fmt_cte(w: &mut Writer, cte: &CteStmt) -> FResult<()> {
    w.enter_depth()?;
    let result = fmt_cte_inner(w, cte);
    w.exit_depth();
    result
}

fn fmt_cte_inner(w: &mut Writer, cte: &CteStmt) -> FResult<()> {
    let margin = w.margin();
    w.raw("WITH");
    if cte.recursive {
        w.raw(" RECURSIVE");
    }
    w.space();
    for (i, entry) in cte.ctes.iter().enumerate() {
        if i > 0 {
            w.raw(",");
            w.newline(margin + 2);
        }
        fmt_cte_entry(w, entry)?;
    }
    place_fresh(w, margin, &cte.body.leading_comments);
    fmt_stmt_kind(w, &cte.body.kind)
}

fn fmt_cte_entry(w: &mut Writer, entry: &CteEntry) -> FResult<()> {
    fmt_ident(w, &entry.name);
    if !entry.column_aliases.is_empty() {
        w.raw(" (");
        w.raw(&entry.column_aliases.iter().map(ident_string).join(", "));
        w.raw(")");
    }
    w.raw(" AS ");
    match entry.materialized {
        Some(true) => w.raw("MATERIALIZED "),
        Some(false) => w.raw("NOT MATERIALIZED "),
        None => {}
    }
    w.raw("(");
    fmt_subquery_body(w, &entry.query)?;
    w.raw(")");
    Ok(())
}

fn set_op_kw(op: SetOp, quantifier: SetQuantifier) -> String {
    let base = match op {
        SetOp::Union => "UNION",
        SetOp::Intersect => "INTERSECT",
        SetOp::Except => "EXCEPT",
    };
    match quantifier {
        SetQuantifier::All => format!("{base} ALL"),
        SetQuantifier::Distinct => base.to_string(),
    }
}

fn fmt_union(w: &mut Writer, u: &UnionStmt) -> FResult<()> {
    w.enter_depth()?;
    let result = fmt_union_inner(w, u);
    w.exit_depth();
    result
}

fn fmt_union_inner(w: &mut Writer, u: &UnionStmt) -> FResult<()> {
    let margin = w.margin();
    fmt_stmt_kind(w, &u.left.kind)?;
    for set_op in &u.rest {
        w.newline(margin);
        w.raw(&set_op_kw(set_op.op, set_op.quantifier));
        w.newline(margin);
        fmt_stmt_kind(w, &set_op.right.kind)?;
    }
    if !u.order_by.is_empty() {
        w.newline(margin);
        w.raw("ORDER BY ");
        fmt_ordered_expr_list(w, &u.order_by)?;
    }
    if let Some(limit) = &u.limit {
        w.newline(margin);
        w.raw("LIMIT ");
        fmt_expr(w, limit)?;
    }
    if let Some(offset) = &u.offset {
        w.newline(margin);
        w.raw("OFFSET ");
        fmt_expr(w, offset)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------

fn fmt_create_table(w: &mut Writer, ct: &CreateTable) -> FResult<()> {
    w.raw("CREATE TABLE ");
    if ct.if_not_exists {
        w.raw("IF NOT EXISTS ");
    }
    fmt_object_name(w, &ct.name);
    if !ct.elements.is_empty() {
        w.raw(" (");
        let margin = w.margin();
        let col = margin + 2;
        for (i, el) in ct.elements.iter().enumerate() {
            if i == 0 {
                w.newline(col);
            } else {
                w.raw(",");
                w.newline(col);
            }
            fmt_table_element(w, el)?;
        }
        w.newline(margin);
        w.raw(")");
    }
    if let Some(query) = &ct.as_query {
        w.raw(" AS ");
        fmt_stmt_kind(w, &query.kind)?;
    }
    if !ct.options.is_empty() {
        w.space();
        w.raw(&ct.options.join(" "));
    }
    Ok(())
}

fn fmt_table_element(w: &mut Writer, el: &TableElement) -> FResult<()> {
    match el {
        TableElement::Column(col) => {
            fmt_ident(w, &col.name);
            w.space();
            fmt_data_type(w, &col.data_type);
            if !col.constraints.is_empty() {
                w.space();
                w.raw(&col.constraints.join(" "));
            }
        }
        TableElement::Constraint(text) => w.raw(text),
    }
    Ok(())
}

fn fmt_create_index(w: &mut Writer, ci: &CreateIndex) -> FResult<()> {
    w.raw("CREATE ");
    if ci.unique {
        w.raw("UNIQUE ");
    }
    w.raw("INDEX ");
    if ci.concurrently {
        w.raw("CONCURRENTLY ");
    }
    if ci.if_not_exists {
        w.raw("IF NOT EXISTS ");
    }
    if let Some(name) = &ci.name {
        fmt_ident(w, name);
        w.space();
    }
    w.raw("ON ");
    fmt_object_name(w, &ci.table);
    if let Some(using) = &ci.using {
        w.raw(" USING ");
        fmt_ident(w, using);
    }
    w.raw(" (");
    for (i, col) in ci.columns.iter().enumerate() {
        if i > 0 {
            w.raw(", ");
        }
        fmt_expr(w, &col.expr)?;
        match col.asc {
            Some(true) => w.raw(" ASC"),
            Some(false) => w.raw(" DESC"),
            None => {}
        }
    }
    w.raw(")");
    if let Some(wc) = &ci.where_clause {
        w.raw(" WHERE ");
        fmt_expr(w, wc)?;
    }
    Ok(())
}

fn fmt_create_view(w: &mut Writer, cv: &CreateView) -> FResult<()> {
    w.raw("CREATE ");
    if cv.or_replace {
        w.raw("OR REPLACE ");
    }
    if cv.materialized {
        w.raw("MATERIALIZED ");
    }
    w.raw("VIEW ");
    fmt_object_name(w, &cv.name);
    if !cv.column_aliases.is_empty() {
        w.raw(" (");
        w.raw(&cv.column_aliases.iter().map(ident_string).join(", "));
        w.raw(")");
    }
    w.raw(" AS");
    w.newline(w.margin());
    fmt_stmt_kind(w, &cv.query.kind)
}

fn fmt_create_policy(w: &mut Writer, cp: &CreatePolicy) -> FResult<()> {
    w.raw("CREATE POLICY ");
    fmt_ident(w, &cp.name);
    w.raw(" ON ");
    fmt_object_name(w, &cp.table);
    if !cp.clauses.is_empty() {
        w.space();
        w.raw(&cp.clauses.join(" "));
    }
    Ok(())
}

fn fmt_alter_table(w: &mut Writer, at: &AlterTable) -> FResult<()> {
    w.raw("ALTER TABLE ");
    if at.if_exists {
        w.raw("IF EXISTS ");
    }
    fmt_object_name(w, &at.name);
    let margin = w.margin();
    let col = margin + 2;
    for (i, action) in at.actions.iter().enumerate() {
        if i > 0 {
            w.raw(",");
        }
        w.newline(col);
        fmt_alter_action(w, action)?;
    }
    Ok(())
}

fn fmt_alter_action(w: &mut Writer, action: &AlterAction) -> FResult<()> {
    match action {
        AlterAction::AddColumn(col) => {
            w.raw("ADD COLUMN ");
            fmt_ident(w, &col.name);
            w.space();
            fmt_data_type(w, &col.data_type);
            if !col.constraints.is_empty() {
                w.space();
                w.raw(&col.constraints.join(" "));
            }
        }
        AlterAction::DropColumn { name, if_exists } => {
            w.raw("DROP COLUMN ");
            if *if_exists {
                w.raw("IF EXISTS ");
            }
            fmt_ident(w, name);
        }
        AlterAction::RenameColumn { from, to } => {
            w.raw("RENAME COLUMN ");
            fmt_ident(w, from);
            w.raw(" TO ");
            fmt_ident(w, to);
        }
        AlterAction::RenameTable(name) => {
            w.raw("RENAME TO ");
            fmt_object_name(w, name);
        }
        AlterAction::AlterColumnType { name, data_type } => {
            w.raw("ALTER COLUMN ");
            fmt_ident(w, name);
            w.raw(" TYPE ");
            fmt_data_type(w, data_type);
        }
        AlterAction::Raw(text) => w.raw(text),
    }
    Ok(())
}

fn fmt_drop_table(w: &mut Writer, dt: &DropTable) -> FResult<()> {
    w.raw("DROP TABLE ");
    if dt.if_exists {
        w.raw("IF EXISTS ");
    }
    w.raw(&dt.names.iter().map(object_name_string).join(", "));
    if dt.cascade {
        w.raw(" CASCADE");
    }
    Ok(())
}

fn fmt_truncate(w: &mut Writer, t: &Truncate) -> FResult<()> {
    w.raw("TRUNCATE ");
    w.raw(&t.names.iter().map(object_name_string).join(", "));
    if t.cascade {
        w.raw(" CASCADE");
    }
    Ok(())
}

fn grant_object_kw(kind: GrantRevokeObject) -> &'static str {
    match kind {
        GrantRevokeObject::Table => "TABLE",
        GrantRevokeObject::Schema => "SCHEMA",
        GrantRevokeObject::Database => "DATABASE",
        GrantRevokeObject::Sequence => "SEQUENCE",
        GrantRevokeObject::Function => "FUNCTION",
    }
}

fn fmt_grant_revoke(w: &mut Writer, gr: &GrantOrRevoke, is_grant: bool) -> FResult<()> {
    w.raw(if is_grant { "GRANT " } else { "REVOKE " });
    w.raw(&gr.privileges.join(", "));
    w.raw(if is_grant { " ON " } else { " ON " });
    if let Some(kind) = gr.object_kind {
        w.raw(grant_object_kw(kind));
        w.space();
    }
    w.raw(&gr.objects.iter().map(object_name_string).join(", "));
    w.raw(if is_grant { " TO " } else { " FROM " });
    w.raw(&gr.grantees.iter().map(ident_string).join(", "));
    if is_grant && gr.with_grant_option {
        w.raw(" WITH GRANT OPTION");
    }
    Ok(())
}

fn fmt_explain(w: &mut Writer, ex: &Explain) -> FResult<()> {
    w.raw("EXPLAIN");
    if !ex.options.is_empty() {
        w.raw(" (");
        w.raw(&ex.options.join(", "));
        w.raw(")");
    } else {
        if ex.analyze {
            w.raw(" ANALYZE");
        }
        if ex.verbose {
            w.raw(" VERBOSE");
        }
    }
    w.space();
    fmt_stmt_kind(w, &ex.statement.kind)
}

fn fmt_comment_on(w: &mut Writer, c: &CommentOnStmt) -> FResult<()> {
    w.raw("COMMENT ON ");
    match &c.object {
        CommentObject::Table(name) => {
            w.raw("TABLE ");
            fmt_object_name(w, name);
        }
        CommentObject::Column(name) => {
            w.raw("COLUMN ");
            fmt_object_name(w, name);
        }
        CommentObject::Other { kind, name } => {
            w.raw(kind);
            w.space();
            fmt_object_name(w, name);
        }
    }
    w.raw(" IS ");
    match &c.text {
        Some(text) => w.raw(text),
        None => w.raw("NULL"),
    }
    Ok(())
}
