//! File exclusion: `.sqlfmtignore` plus repeatable
//! `--ignore <glob>` flags, layered on top of the always-excluded
//! segments (`.git/`, `node_modules/`, dotfiles).

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

const IGNORE_FILE_NAME: &str = ".sqlfmtignore";

const ALWAYS_EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

pub(crate) struct IgnoreSet {
    gitignore: Gitignore,
}

impl IgnoreSet {
    /// Builds the combined ignore set from `.sqlfmtignore` in `root` (if
    /// present) plus any `--ignore` globs passed on the command line.
    pub(crate) fn build(root: &Path, cli_globs: &[String]) -> Result<Self, String> {
        let mut builder = GitignoreBuilder::new(root);

        let ignore_file = root.join(IGNORE_FILE_NAME);
        if ignore_file.is_file() {
            if let Some(err) = builder.add(&ignore_file) {
                return Err(err.to_string());
            }
        }

        for glob in cli_globs {
            builder.add_line(None, glob).map_err(|e| e.to_string())?;
        }

        let gitignore = builder.build().map_err(|e| e.to_string())?;
        Ok(Self { gitignore })
    }

    /// True if `path` should be skipped: an always-excluded segment
    /// (`.git/`, `node_modules/`, any dotfile/dotdir component), or a
    /// match against `.sqlfmtignore`/`--ignore`.
    pub(crate) fn is_ignored(&self, path: &Path) -> bool {
        if has_always_excluded_segment(path) {
            return true;
        }
        let is_dir = path.is_dir();
        self.gitignore.matched(path, is_dir).is_ignore()
    }
}

fn has_always_excluded_segment(path: &Path) -> bool {
    path.components().any(|c| {
        let Some(s) = c.as_os_str().to_str() else {
            return false;
        };
        ALWAYS_EXCLUDED_DIRS.contains(&s) || (s.starts_with('.') && s != "." && s != "..")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn always_excludes_git_and_node_modules() {
        assert!(has_always_excluded_segment(&PathBuf::from(
            "repo/.git/HEAD"
        )));
        assert!(has_always_excluded_segment(&PathBuf::from(
            "repo/node_modules/x.sql"
        )));
        assert!(has_always_excluded_segment(&PathBuf::from(
            "repo/.hidden/x.sql"
        )));
        assert!(!has_always_excluded_segment(&PathBuf::from(
            "repo/src/x.sql"
        )));
    }
}
