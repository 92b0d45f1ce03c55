//! Configuration of `log4rs` loggers.
//!
//! Diagnostics go to standard error through the root logger, while user-facing output sent to the
//! `doci-output` target goes, unadorned, to a dedicated output file.

use std::path::Path;

use anyhow::{self, Context};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;

use crate::io::format::DOCI_OUTPUT_TARGET;

/// Builds a `log4rs` configuration that writes `doci-output` records to the file at `output` and
/// every other record at or above `level` to standard error.
pub fn output_logger_config<P: AsRef<Path>>(
    output: P,
    level: LevelFilter,
) -> Result<Config, anyhow::Error> {
    let output = output.as_ref();
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {M} - {m}{n}",
        )))
        .build();
    let output_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .append(false)
        .build(output)
        .with_context(|| format!("Unable to create the output file `{}`", output.display()))?;

    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .appender(Appender::builder().build("output", Box::new(output_file)))
        .logger(
            Logger::builder()
                .appender("output")
                .additive(false)
                .build(DOCI_OUTPUT_TARGET, LevelFilter::Info),
        )
        .build(Root::builder().appender("stderr").build(level))
        .context("Unable to build the logger configuration")
}

/// Installs the configuration of [`output_logger_config`] as the global logger.
///
/// # Errors
///
/// Fails if the output file cannot be created or a global logger has already been installed.
pub fn init_output_logger<P: AsRef<Path>>(
    output: P,
    level: LevelFilter,
) -> Result<Handle, anyhow::Error> {
    let config = output_logger_config(output, level)?;
    log4rs::init_config(config).context("Unable to install the global logger")
}
