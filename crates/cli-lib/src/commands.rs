//! Command-line surface. `sqlfmt [options] [file ...]`; no
//! subcommands — this binary does exactly one thing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "sqlfmt")]
#[command(about = "An opinionated, river-aligned SQL formatter", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Files to format. Directories are not expanded; pass a glob the
    /// shell expands, or rely on `--ignore`/`.sqlfmtignore` to narrow an
    /// already-expanded list. With no files, reads stdin and writes
    /// stdout.
    pub paths: Vec<PathBuf>,

    /// Exit 1 if any input is not already formatted; writes nothing.
    #[arg(long)]
    pub check: bool,

    /// With `--check`, emit a unified diff of the changes that would be
    /// made instead of just the pass/fail summary.
    #[arg(long, requires = "check")]
    pub diff: bool,

    /// Overwrite each file atomically (temp file + rename) with its
    /// formatted contents.
    #[arg(short, long, conflicts_with_all = ["check", "list_different"])]
    pub write: bool,

    /// Print the names of files that would change, one per line.
    #[arg(short, long = "list-different")]
    pub list_different: bool,

    /// Exclude files matching this glob. Repeatable.
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Label used in diagnostics when formatting stdin.
    #[arg(long, value_name = "PATH")]
    pub stdin_filepath: Option<PathBuf>,

    /// Control ANSI color in diagnostics and diffs.
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorMode,

    /// Shorthand for `--color never`.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print each file as it is processed.
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress output.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl Cli {
    /// Resolves `--color`/`--no-color` into the single mode the rest of
    /// the driver cares about.
    pub fn effective_color(&self) -> ColorMode {
        if self.no_color {
            ColorMode::Never
        } else {
            self.color
        }
    }

    /// Constraint validation clap's derive attributes can't express:
    /// flags whose legality depends on whether any file arguments were
    /// given.
    pub fn validate(&self) -> Result<(), String> {
        if (self.write || self.list_different) && self.paths.is_empty() {
            return Err(format!(
                "{} requires at least one file argument",
                if self.write { "--write" } else { "--list-different" }
            ));
        }
        Ok(())
    }
}
