// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Normal as u8);

pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn log_level() -> LogLevel {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Quiet,
        2 => LogLevel::Verbose,
        _ => LogLevel::Normal,
    }
}

/// Level selected by the `-q` / `-v` flags; `-q` wins.
pub fn level_from_flags(quiet: bool, verbose: bool) -> LogLevel {
    if quiet {
        LogLevel::Quiet
    } else if verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    }
}

pub const LOG_PREFIX: &str = "[flatctl]";

/// Always printed: command results.
#[macro_export]
macro_rules! log_normal {
    ($($arg:tt)*) => {
        println!("{}", format_args!($($arg)*));
    };
}

/// Progress notes, hidden by `-q`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if $crate::utils::log_level() != $crate::utils::LogLevel::Quiet {
            println!(
                "{} {}",
                colored::Colorize::cyan($crate::utils::LOG_PREFIX),
                format_args!($($arg)*)
            );
        }
    };
}

/// Detail shown only with `-v`.
#[macro_export]
macro_rules! log_verbose {
    ($($arg:tt)*) => {
        if $crate::utils::log_level() == $crate::utils::LogLevel::Verbose {
            println!(
                "{} {}",
                colored::Colorize::dimmed($crate::utils::LOG_PREFIX),
                format_args!($($arg)*)
            );
        }
    };
}

/// Failures, always printed to stderr.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        eprintln!(
            "{} {}",
            colored::Colorize::red($crate::utils::LOG_PREFIX),
            format_args!($($arg)*)
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_roundtrip_and_flags() {
        assert_eq!(level_from_flags(true, true), LogLevel::Quiet);
        assert_eq!(level_from_flags(false, true), LogLevel::Verbose);
        assert_eq!(level_from_flags(false, false), LogLevel::Normal);

        set_log_level(LogLevel::Verbose);
        assert_eq!(log_level(), LogLevel::Verbose);
        set_log_level(LogLevel::Normal);
        assert_eq!(log_level(), LogLevel::Normal);
    }
}
