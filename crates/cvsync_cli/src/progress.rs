//! Progress reporting for sync passes.
//!
//! - Interactive mode (TTY): one styled line per resource on stderr
//! - Logging mode (non-TTY): structured logging using tracing

use console::{Term, style};
use cvsync::SyncProgress;
use cvsync::sync::ProgressCallback;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::RunStarted { local_time } => {
                tracing::info!(local_time = %local_time, "Sync pass started");
            }

            SyncProgress::OutsideWindow {
                hour,
                start_hour,
                end_hour,
            } => {
                tracing::info!(hour, start_hour, end_hour, "Outside operating window");
            }

            SyncProgress::SchemaEnsured => {
                tracing::debug!("Schema is up to date");
            }

            SyncProgress::ResourceStarted { resource, cap } => {
                tracing::debug!(resource = %resource, cap, "Fetching");
            }

            SyncProgress::PageFetched {
                resource,
                page,
                count,
            } => {
                tracing::debug!(resource = %resource, page, count, "Fetched page");
            }

            SyncProgress::PageWritten {
                resource,
                page,
                written,
                total_so_far,
            } => {
                tracing::info!(resource = %resource, page, written, total_so_far, "Saved page");
            }

            SyncProgress::RetryBackoff {
                resource,
                page,
                attempt,
                retry_after_ms,
                error,
            } => {
                tracing::warn!(
                    resource = %resource,
                    page,
                    attempt,
                    retry_after_ms,
                    error = %error,
                    "Retrying after transient failure"
                );
            }

            SyncProgress::RateLimited {
                resource,
                page,
                cooldown_ms,
            } => {
                tracing::warn!(resource = %resource, page, cooldown_ms, "Rate limited");
            }

            SyncProgress::ResourceComplete {
                resource,
                fetched,
                written,
                pages,
                capped,
            } => {
                tracing::debug!(
                    resource = %resource,
                    fetched,
                    written,
                    pages,
                    capped,
                    "Resource done"
                );
            }

            SyncProgress::ResourceFailed {
                resource,
                page,
                records_written,
                error,
                required,
            } => {
                if required {
                    tracing::error!(
                        resource = %resource,
                        page,
                        records_written,
                        error = %error,
                        "Resource failed"
                    );
                } else {
                    tracing::warn!(
                        resource = %resource,
                        page,
                        records_written,
                        error = %error,
                        "Resource failed, continuing"
                    );
                }
            }

            SyncProgress::RunComplete {
                written,
                degraded,
                duration_ms,
            } => {
                tracing::info!(written, degraded, duration_ms, "Sync pass complete");
            }

            _ => {}
        }
    }
}

/// Console reporter for interactive terminals.
pub struct InteractiveReporter {
    term: Term,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let line = match event {
            SyncProgress::OutsideWindow {
                hour,
                start_hour,
                end_hour,
            } => format!(
                "{} {hour}h is outside {start_hour}h-{end_hour}h, nothing to do",
                style("skip").yellow()
            ),
            SyncProgress::ResourceStarted { resource, .. } => {
                format!("{} {resource}", style("sync").cyan())
            }
            SyncProgress::RetryBackoff {
                resource,
                page,
                attempt,
                retry_after_ms,
                error,
            } => format!(
                "{} {resource} page {page} attempt {attempt} failed ({error}), retrying in {}s",
                style("retry").yellow(),
                retry_after_ms / 1000
            ),
            SyncProgress::RateLimited {
                resource,
                page,
                cooldown_ms,
            } => format!(
                "{} {resource} page {page}, cooling down {}s",
                style("throttled").yellow(),
                cooldown_ms / 1000
            ),
            SyncProgress::ResourceComplete {
                resource,
                written,
                pages,
                capped,
                ..
            } => format!(
                "{} {resource}: {written} rows from {pages} pages{}",
                style("done").green(),
                if capped { " (cap reached)" } else { "" }
            ),
            SyncProgress::ResourceFailed {
                resource,
                page,
                records_written,
                error,
                required,
            } => format!(
                "{} {resource} page {page} after {records_written} rows: {error}",
                if required {
                    style("failed").red().bold()
                } else {
                    style("failed").red()
                }
            ),
            _ => return,
        };
        let _ = self.term.write_line(&line);
    }
}

/// Pick a reporter for the current stdout and wrap it as a callback.
pub fn callback() -> ProgressCallback {
    if Term::stdout().is_term() {
        let reporter = InteractiveReporter::new();
        Box::new(move |event| reporter.handle(event))
    } else {
        let reporter = LoggingReporter::new();
        Box::new(move |event| reporter.handle(event))
    }
}
