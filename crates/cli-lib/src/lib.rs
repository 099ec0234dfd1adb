//! The `sqlfmt` driver: argument parsing, file
//! discovery, the check/write/diff/list workflow, and exit-code
//! mapping. Everything here is a thin collaborator around the
//! `sqlfmt-parser`/`sqlfmt-format` pipeline — no tokenizing,
//! parsing, or AST walking happens in this crate.

mod color;
mod commands;
mod diff;
mod glob;
mod ignore;
mod logger;

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser as _;

use color::{cyan, red};
use commands::Cli;
use ignore::IgnoreSet;
use sqlfmt_format::{FormatFailure, FormatOptions, format};

const STDIN_LABEL: &str = "<stdin>";

pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let _ = logger::init();

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { 1 } else { 0 };
        }
    };

    if let Err(message) = cli.validate() {
        eprintln!("{}", red(&message));
        return 1;
    }

    color::init(cli.effective_color());

    match run(&cli) {
        Ok(code) => code,
        Err(message) => {
            // Every `Err(String)` `run` returns today is already a
            // classified I/O or usage failure (missing file, EISDIR, bad
            // glob, atomic-write failure) worded for direct display.
            eprintln!("{}", red(&message));
            1
        }
    }
}

/// One formatting job: either a real file on disk, or stdin labeled by
/// `--stdin-filepath`.
struct Job {
    label: String,
    path: Option<PathBuf>,
    source: String,
}

fn run(cli: &Cli) -> Result<i32, String> {
    let jobs = collect_jobs(cli)?;

    let options = FormatOptions::default();
    let mut any_changed = false;
    let mut saw_tokenize_or_parse_error = false;
    let mut had_io_error = false;

    for job in &jobs {
        if cli.verbose {
            eprintln!("{}", job.label);
        }

        let formatted = match format(&job.source, &options) {
            Ok(text) => text,
            Err(err) => {
                saw_tokenize_or_parse_error = true;
                eprintln!("{}", render_error(&job.label, &job.source, &err));
                continue;
            }
        };

        let changed = formatted != job.source;
        any_changed |= changed;

        if cli.write {
            if let Some(path) = &job.path {
                if changed {
                    if let Err(e) = atomic_write(path, &formatted) {
                        had_io_error = true;
                        eprintln!("{}", red(&format!("{}: {e}", job.label)));
                    } else if !cli.quiet {
                        println!("{}", job.label);
                    }
                }
            }
        } else if cli.list_different {
            if changed {
                println!("{}", job.label);
            }
        } else if cli.check {
            if changed {
                println!("{}", cyan(&format!("would reformat {}", job.label)));
                if cli.diff {
                    print!("{}", diff::unified(&job.label, &job.source, &formatted));
                }
            }
        } else {
            print!("{formatted}");
        }
    }

    if saw_tokenize_or_parse_error {
        return Ok(2);
    }
    if had_io_error {
        return Ok(1);
    }
    if (cli.check || cli.list_different) && any_changed {
        return Ok(1);
    }
    Ok(0)
}

fn collect_jobs(cli: &Cli) -> Result<Vec<Job>, String> {
    if cli.paths.is_empty() {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| e.to_string())?;
        let label = cli
            .stdin_filepath
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| STDIN_LABEL.to_string());
        return Ok(vec![Job {
            label,
            path: None,
            source,
        }]);
    }

    let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
    let ignore_set = IgnoreSet::build(&cwd, &cli.ignore)?;
    let files = glob::expand(&cli.paths, &cwd, &ignore_set)?;

    let mut jobs = Vec::with_capacity(files.len());
    for path in files {
        let source = std::fs::read_to_string(&path)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        jobs.push(Job {
            label: path.display().to_string(),
            path: Some(path),
            source,
        });
    }
    Ok(jobs)
}

/// Renders a tokenize/parse/depth failure: a source excerpt (offending
/// line, caret under the column, message)
/// when the failing position is known, a single-line form otherwise.
fn render_error(label: &str, source: &str, err: &FormatFailure) -> String {
    match err {
        FormatFailure::Tokenize(e) => excerpt(label, source, e.line, e.column, &e.message),
        FormatFailure::Parse(e) => excerpt(label, source, e.line, e.column, &e.message),
        FormatFailure::Depth(e) => format!(
            "{label}: exceeded maximum nesting depth ({}) while parsing",
            e.max_depth
        ),
        FormatFailure::Formatter(e) => format!(
            "{label}: exceeded maximum nesting depth ({}) while formatting",
            e.max_depth
        ),
    }
}

fn excerpt(label: &str, source: &str, line: u32, column: u32, message: &str) -> String {
    let Some(text) = source.lines().nth((line.saturating_sub(1)) as usize) else {
        return format!("{label}:{line}:{column}: {message}");
    };
    let caret_offset = (column.saturating_sub(1)) as usize;
    let caret = format!("{}^", " ".repeat(caret_offset));
    format!("{label}:{line}:{column}: {message}\n{text}\n{caret}")
}

/// Atomic file write: write to a sibling temp file with a
/// random suffix, rename on top of `path`, unlink the temp file on any
/// error. Refuses a relative path that resolves outside the current
/// working directory (absolute paths are trusted).
fn atomic_write(path: &Path, contents: &str) -> Result<(), String> {
    if path.is_relative() {
        let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
        let resolved = normalize(&cwd.join(path));
        if !resolved.starts_with(&cwd) {
            return Err("refusing to write outside the current working directory".to_string());
        }
    }

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = path
        .file_name()
        .ok_or_else(|| "path has no file name".to_string())?
        .to_string_lossy();
    let suffix = random_suffix();
    let tmp_name = format!(".{file_name}.{suffix}.tmp");
    let tmp_path = match dir {
        Some(dir) => dir.join(tmp_name),
        None => PathBuf::from(tmp_name),
    };

    let result = (|| -> std::io::Result<()> {
        let mut f = std::fs::File::create(&tmp_path)?;
        f.write_all(contents.as_bytes())?;
        f.sync_all()?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if let Err(e) = &result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.to_string());
    }
    Ok(())
}

/// Lexically collapses `.`/`..` components without touching the
/// filesystem (the path may not exist yet — this runs before the
/// atomic write creates it).
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn random_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{:x}{:x}", std::process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_parent_segments() {
        assert_eq!(
            normalize(Path::new("/a/b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize(Path::new("/a/./b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn excerpt_points_at_the_offending_column() {
        let out = excerpt("x.sql", "SELECT 'broken", 1, 9, "unterminated string literal");
        assert!(out.contains("SELECT 'broken"));
        assert!(out.ends_with("        ^"));
    }
}
