//! ANSI color toggling.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

use anstyle::{AnsiColor, Style};

use crate::commands::ColorMode;

static COLOR_ENABLED: AtomicBool = AtomicBool::new(false);

/// Resolves `mode` against whether stdout looks like a terminal and
/// stores the result in the process-wide flag every other function in
/// this module reads.
pub(crate) fn init(mode: ColorMode) {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    };
    COLOR_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Resets the flag to its default (off). Exposed for the test harness
/// so tests that run in-process don't leak color state into one
/// another.
#[cfg(test)]
pub(crate) fn reset_for_test() {
    COLOR_ENABLED.store(false, Ordering::Relaxed);
}

fn enabled() -> bool {
    COLOR_ENABLED.load(Ordering::Relaxed)
}

pub(crate) fn red(s: &str) -> String {
    paint(s, AnsiColor::Red.on_default())
}

pub(crate) fn green(s: &str) -> String {
    paint(s, AnsiColor::Green.on_default())
}

pub(crate) fn cyan(s: &str) -> String {
    paint(s, AnsiColor::Cyan.on_default())
}

fn paint(s: &str, style: Style) -> String {
    if enabled() {
        format!("{style}{s}{style:#}")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_when_disabled() {
        reset_for_test();
        init(ColorMode::Never);
        assert_eq!(red("x"), "x");
    }

    #[test]
    fn wraps_in_ansi_when_always() {
        reset_for_test();
        init(ColorMode::Always);
        let out = red("x");
        assert_ne!(out, "x");
        assert!(out.contains('x'));
        reset_for_test();
    }
}
