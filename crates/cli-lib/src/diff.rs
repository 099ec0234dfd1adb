//! Unified-diff rendering: an LCS line diff plus the
//! conventional `--- input` / `+++ formatted` / `@@ -a,b +c,d @@` header.
//! A plain O(n·m) dynamic-programming table is enough since diffs here
//! are per-file and small.

use crate::color::{green, red};

/// Renders a unified diff of `before` against `after`, labeled with
/// `label` (the file path, or the `--stdin-filepath` override).
pub(crate) fn unified(label: &str, before: &str, after: &str) -> String {
    let before_lines: Vec<&str> = split_lines(before);
    let after_lines: Vec<&str> = split_lines(after);
    let ops = diff_ops(&before_lines, &after_lines);

    let mut out = String::new();
    out.push_str(&format!("--- {label}\n"));
    out.push_str(&format!("+++ {label}\n"));
    for hunk in group_into_hunks(&ops, 3) {
        out.push_str(&render_hunk(&hunk, &before_lines, &after_lines));
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Longest-common-subsequence line diff, backtracked into a flat op
/// list over `(before_index, after_index)` pairs.
fn diff_ops(before: &[&str], after: &[&str]) -> Vec<Op> {
    let (n, m) = (before.len(), after.len());
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if before[i] == after[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if before[i] == after[j] {
            ops.push(Op::Equal(i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(Op::Delete(i));
            i += 1;
        } else {
            ops.push(Op::Insert(j));
            j += 1;
        }
    }
    while i < n {
        ops.push(Op::Delete(i));
        i += 1;
    }
    while j < m {
        ops.push(Op::Insert(j));
        j += 1;
    }
    ops
}

struct Hunk {
    ops: Vec<Op>,
}

/// Groups the flat op list into hunks, each padded with up to
/// `context` lines of unchanged content on either side, merging hunks
/// whose context windows overlap.
fn group_into_hunks(ops: &[Op], context: usize) -> Vec<Hunk> {
    let mut changed_at = Vec::new();
    for (idx, op) in ops.iter().enumerate() {
        if !matches!(op, Op::Equal(..)) {
            changed_at.push(idx);
        }
    }
    if changed_at.is_empty() {
        return Vec::new();
    }

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in changed_at {
        let start = idx.saturating_sub(context);
        let end = (idx + context + 1).min(ops.len());
        match ranges.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = end,
            _ => ranges.push((start, end)),
        }
    }

    ranges
        .into_iter()
        .map(|(s, e)| Hunk {
            ops: ops[s..e].to_vec(),
        })
        .collect()
}

fn render_hunk(hunk: &Hunk, before: &[&str], after: &[&str]) -> String {
    let before_start = hunk.ops.iter().find_map(|op| match op {
        Op::Equal(i, _) => Some(*i),
        Op::Delete(i) => Some(*i),
        Op::Insert(_) => None,
    });
    let after_start = hunk.ops.iter().find_map(|op| match op {
        Op::Equal(_, j) => Some(*j),
        Op::Insert(j) => Some(*j),
        Op::Delete(_) => None,
    });
    let before_count = hunk
        .ops
        .iter()
        .filter(|op| matches!(op, Op::Equal(..) | Op::Delete(_)))
        .count();
    let after_count = hunk
        .ops
        .iter()
        .filter(|op| matches!(op, Op::Equal(..) | Op::Insert(_)))
        .count();
    let before_start = before_start.unwrap_or(0);
    let after_start = after_start.unwrap_or(0);

    let mut out = format!(
        "@@ -{},{} +{},{} @@\n",
        before_start + 1,
        before_count,
        after_start + 1,
        after_count
    );
    for op in &hunk.ops {
        match op {
            Op::Equal(i, _) => out.push_str(&format!(" {}\n", before[*i])),
            Op::Delete(i) => out.push_str(&format!("{}\n", red(&format!("-{}", before[*i])))),
            Op::Insert(j) => out.push_str(&format!("{}\n", green(&format!("+{}", after[*j])))),
        }
    }
    out
}

fn split_lines(s: &str) -> Vec<&str> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.lines().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::reset_for_test;
    use crate::commands::ColorMode;

    fn plain_unified(label: &str, before: &str, after: &str) -> String {
        reset_for_test();
        crate::color::init(ColorMode::Never);
        unified(label, before, after)
    }

    #[test]
    fn no_diff_for_identical_text() {
        let out = plain_unified("x.sql", "SELECT 1;\n", "SELECT 1;\n");
        assert_eq!(out, "--- x.sql\n+++ x.sql\n");
    }

    #[test]
    fn single_line_change_produces_one_hunk() {
        let out = plain_unified(
            "x.sql",
            "SELECT a,\n       b\n  FROM t;\n",
            "SELECT a,\n       c\n  FROM t;\n",
        );
        assert!(out.contains("@@ -1,3 +1,3 @@"));
        assert!(out.contains("-       b"));
        assert!(out.contains("+       c"));
        assert!(out.contains(" SELECT a,"));
    }
}
