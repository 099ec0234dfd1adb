//! Shell-style glob expansion of file arguments: `*`,
//! `?`, `**`, and character classes, in case the invoking shell didn't
//! already expand them (quoted globs, Windows `cmd.exe`). A literal
//! argument with no glob metacharacters passes through unchanged even
//! if nothing on disk matches it — the driver surfaces the resulting
//! "file not found" itself rather than silently dropping it.

use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use ignore::WalkBuilder;

use crate::ignore::IgnoreSet;

/// Hard cap on the number of files a single invocation will process.
const MAX_EXPANDED_FILES: usize = 10_000;

const GLOB_METACHARS: &[char] = &['*', '?', '[', '{'];

pub(crate) fn expand(
    args: &[PathBuf],
    root: &Path,
    ignore: &IgnoreSet,
) -> Result<Vec<PathBuf>, String> {
    let mut out = Vec::new();
    for arg in args {
        let text = arg.to_string_lossy();
        if text.chars().any(|c| GLOB_METACHARS.contains(&c)) {
            expand_one_glob(&text, root, ignore, &mut out)?;
        } else if !ignore.is_ignored(arg) {
            out.push(arg.clone());
        }
        if out.len() > MAX_EXPANDED_FILES {
            return Err(format!(
                "too many files matched (limit is {MAX_EXPANDED_FILES})"
            ));
        }
    }
    Ok(out)
}

fn expand_one_glob(
    pattern: &str,
    root: &Path,
    ignore: &IgnoreSet,
    out: &mut Vec<PathBuf>,
) -> Result<(), String> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(!pattern.contains("**"))
        .build()
        .map_err(|e| e.to_string())?
        .compile_matcher();

    let walk_root = glob_base_dir(pattern).unwrap_or_else(|| root.to_path_buf());
    for entry in WalkBuilder::new(&walk_root)
        .hidden(false)
        .git_ignore(false)
        .build()
    {
        let entry = entry.map_err(|e| e.to_string())?;
        if entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }
        let path = entry.path();
        if ignore.is_ignored(path) {
            continue;
        }
        let match_target = path.strip_prefix(root).unwrap_or(path);
        if glob.is_match(match_target) || glob.is_match(path) {
            out.push(path.to_path_buf());
        }
    }
    Ok(())
}

/// The longest path prefix of `pattern` before its first glob
/// metacharacter, used as the walk root so `src/**/*.sql` doesn't force
/// a walk of the whole tree.
fn glob_base_dir(pattern: &str) -> Option<PathBuf> {
    let idx = pattern.find(GLOB_METACHARS)?;
    let prefix = &pattern[..idx];
    let cut = prefix.rfind('/').map(|i| i + 1).unwrap_or(0);
    let dir = &prefix[..cut];
    if dir.is_empty() {
        None
    } else {
        Some(PathBuf::from(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_stops_at_first_metachar() {
        assert_eq!(
            glob_base_dir("src/**/*.sql"),
            Some(PathBuf::from("src/"))
        );
        assert_eq!(glob_base_dir("*.sql"), None);
        assert_eq!(glob_base_dir("a/b/c.sql"), None);
    }
}
