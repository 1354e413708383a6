//! Subcommand implementations.
//!
//! Each command writes its human-readable output to the given writer so it
//! can be exercised in tests without a terminal.

use std::io::Write;
use std::sync::Arc;

use claw_logs::{ConsoleSink, Dispatcher, FileSink, NameTemplate, caller};
use tracing::debug;

use crate::cli::{SinkArgs, WriteArgs};
use crate::error::CliError;

/// Logs one message through a file sink and prints the file it landed in.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or output fails.
pub fn write<W: Write>(out: &mut W, args: &WriteArgs) -> Result<(), CliError> {
    let config = args.sink.to_config()?;
    debug!(location = %config.location.display(), "writing log entry");

    let dispatcher = Dispatcher::new();
    let sink = Arc::new(FileSink::new(config));
    dispatcher.add_sink(Arc::clone(&sink));
    if args.echo {
        dispatcher.add_sink(Arc::new(ConsoleSink::new()));
    }
    dispatcher.enable();

    dispatcher.log(
        args.message.clone(),
        args.severity.into(),
        args.kind.into(),
        &caller!(),
    );

    match sink.active_file() {
        Some(path) => writeln!(out, "{}", path.display())?,
        None => {
            return Err(CliError::InvalidArgument(format!(
                "no log file could be created in {}",
                sink.config().location.display()
            )));
        }
    }
    Ok(())
}

/// Runs a retention sweep and prints what was deleted.
///
/// # Errors
///
/// Returns an error if auto delete is not enabled or the directory cannot
/// be listed.
pub fn sweep<W: Write>(out: &mut W, args: &SinkArgs) -> Result<(), CliError> {
    let sink = FileSink::new(args.to_config()?);
    let dispatcher = Dispatcher::new();
    dispatcher.add_sink(Arc::new(ConsoleSink::new()));
    dispatcher.enable();

    let report = sink.delete_logs(&dispatcher)?;
    writeln!(
        out,
        "deleted {} file(s): {} by count, {} by age, {} failed",
        report.deleted(),
        report.by_count,
        report.by_age,
        report.failed
    )?;
    Ok(())
}

/// Prints `count` names generated from `template`.
///
/// # Errors
///
/// Returns an error if `count` is zero or output fails.
pub fn generate<W: Write>(out: &mut W, template: &str, count: usize) -> Result<(), CliError> {
    if count == 0 {
        return Err(CliError::InvalidArgument(
            "count must be at least 1".to_string(),
        ));
    }
    let template = NameTemplate::compile(template);
    for _ in 0..count {
        writeln!(out, "{}", template.generate_now())?;
    }
    Ok(())
}

/// Prints whether each name matches `template`.
///
/// Returns true if every name matched.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn matches<W: Write>(out: &mut W, template: &str, names: &[String]) -> Result<bool, CliError> {
    let template = NameTemplate::compile(template);
    let mut all = true;
    for name in names {
        let matched = template.matches(name);
        all &= matched;
        writeln!(out, "{name}\t{}", if matched { "match" } else { "no match" })?;
    }
    Ok(all)
}
