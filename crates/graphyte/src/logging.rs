//! Tracing setup.
//!
//! Terminal output is filtered by `--verbose` or `RUST_LOG`. A build log, when
//! requested, receives every `info` record of one build through its own
//! dispatcher, so nothing outlives the build that created it.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn terminal_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Run `f` with terminal logging and, if `log_file` is given, a plain-text
/// build log at that path.
///
/// The log file is created before `f` runs so it exists even when `f` fails
/// early.
pub(crate) fn with_logging<T>(
    verbose: bool,
    log_file: Option<&Path>,
    f: impl FnOnce() -> T,
) -> std::io::Result<T> {
    let terminal = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(terminal_filter(verbose));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new("info")),
            )
        }
        None => None,
    };

    let dispatch = Dispatch::new(tracing_subscriber::registry().with(terminal).with(file_layer));
    Ok(tracing::dispatcher::with_default(&dispatch, f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_log_receives_info() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("graphyte.log");

        with_logging(false, Some(&log), || {
            tracing::info!(module = "Core", "Building module");
            tracing::debug!("not recorded");
        })
        .unwrap();

        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.contains("Building module"));
        assert!(content.contains("module=\"Core\""));
        assert!(!content.contains("not recorded"));
        assert!(!content.contains("\u{1b}["));
    }

    #[test]
    fn test_log_file_created_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("early.log");
        let existed = with_logging(false, Some(&log), || log.exists()).unwrap();
        assert!(existed);
    }

    #[test]
    fn test_log_file_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = with_logging(false, Some(&dir.path().join("nope/x.log")), || ());
        assert!(result.is_err());
    }
}
