//! Log subscriber installation. Only the binary installs a global
//! logger — `sqlfmt-parser`/`sqlfmt-format` only ever call the `log`
//! facade macros, never initialize a backend.

pub(crate) fn init() -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(
            std::env::var("SQLFMT_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(log::LevelFilter::Off),
        )
        .chain(std::io::stderr())
        .apply()
}
