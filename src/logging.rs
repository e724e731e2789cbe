//! Logger setup shared by the binaries.

use std::io::Write;
use log::LevelFilter;

/// `true` when the variable is set to anything but empty or `0`.
pub fn env_flag(name: &str) -> bool {
    match std::env::var_os(name) {
        Some(value) => !value.is_empty() && value != "0",
        None => false,
    }
}

/// Logs to stderr as `program: level: message`.
pub fn init(program: &'static str, level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(move |buf, record| {
            writeln!(buf, "{}: {}: {}", program, record.level().as_str().to_lowercase(), record.args())
        })
        .try_init();
    if result.is_err() {
        log::debug!("logger was already initialized");
    }
}

/// Joins the error with all of its sources.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(error) = source {
        message.push_str(": ");
        message.push_str(&error.to_string());
        source = error.source();
    }
    message
}

pub fn report_error(error: &dyn std::error::Error) {
    log::error!("{}", error_chain(error));
}
