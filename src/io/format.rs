//! Formatting of user-facing output sent to the `doci-output` logger.

use std::fmt;

use log;

/// The log target of user-facing output.
pub const DOCI_OUTPUT_TARGET: &str = "doci-output";

const DOCI_BANNER_LENGTH: usize = 80;

/// Logs an error to both the root logger and the `doci-output` logger.
macro_rules! doci_error {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::error!($fmt, $($($arg)*)?);
        log::error!(target: "doci-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a warning to the `doci-output` logger.
macro_rules! doci_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::warn!(target: "doci-output", $fmt, $($($arg)*)?); }
}

/// Logs a main output line to the `doci-output` logger.
macro_rules! doci_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "doci-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {doci_error, doci_output, doci_warn};

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted section title to the `doci-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(DOCI_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    doci_output!("┌──{bar}──┐");
    doci_output!("│§ {title:^length$} §│");
    doci_output!("└──{bar}──┘");
}

/// Logs a nicely formatted subtitle to the `doci-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    doci_output!("{}", subtitle);
    doci_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging outputs nicely.
pub(crate) trait DociOutput: fmt::Display {
    /// Logs display output line by line.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            doci_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> DociOutput for T where T: fmt::Display {}
