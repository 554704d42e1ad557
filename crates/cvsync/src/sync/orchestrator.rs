//! Full sync pass: gate, schema, required phase, secondary phase, report.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::cvcrm::Resource;
use crate::db::ensure_schema;
use crate::notify::{LogNotifier, Notification, Notifier};

use super::error::{ResourceSyncError, RunError};
use super::pager::{PageSource, PageWriter, failure_message, sync_resource};
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{ResourceReport, ResourceStats, SyncOptions, SyncOutcome, SyncSummary};
use super::window::OperatingWindow;

/// Drives complete sync passes over every resource.
///
/// Resources run strictly in sequence. Development, Unit, Sale and
/// Commission must succeed; the rest are isolated from one another.
pub struct SyncEngine<S, W> {
    db: Arc<DatabaseConnection>,
    source: S,
    writer: W,
    notifier: Arc<dyn Notifier>,
    window: OperatingWindow,
    options: SyncOptions,
    on_progress: Option<ProgressCallback>,
}

impl<S, W> SyncEngine<S, W>
where
    S: PageSource,
    W: PageWriter,
{
    /// Engine with an always-open window, default options and log notifications.
    pub fn new(db: Arc<DatabaseConnection>, source: S, writer: W) -> Self {
        Self {
            db,
            source,
            writer,
            notifier: Arc::new(LogNotifier),
            window: OperatingWindow::always_open(),
            options: SyncOptions::default(),
            on_progress: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_window(mut self, window: OperatingWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn window(&self) -> &OperatingWindow {
        &self.window
    }

    /// Run one pass now.
    pub async fn run_full_sync(&self) -> Result<SyncOutcome, RunError> {
        self.run_full_sync_at(Utc::now()).await
    }

    /// Run one pass, evaluating the operating window at `now`.
    pub async fn run_full_sync_at(&self, now: DateTime<Utc>) -> Result<SyncOutcome, RunError> {
        let on_progress = self.on_progress.as_ref();

        if !self.window.is_open(now) {
            let hour = self.window.local_hour(now);
            emit(
                on_progress,
                SyncProgress::OutsideWindow {
                    hour,
                    start_hour: self.window.start_hour,
                    end_hour: self.window.end_hour,
                },
            );
            info!(
                hour,
                start = self.window.start_hour,
                end = self.window.end_hour,
                "Outside operating window, skipping sync"
            );
            return Ok(SyncOutcome::Skipped { local_hour: hour });
        }

        let started = Instant::now();
        let started_at = now.with_timezone(&self.window.timezone).fixed_offset();
        emit(
            on_progress,
            SyncProgress::RunStarted {
                local_time: started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            },
        );
        info!(started_at = %started_at, "Starting full sync");

        if let Err(e) = ensure_schema(&self.db).await {
            let err = RunError::Schema(e);
            return Err(self.abort(err).await);
        }
        emit(on_progress, SyncProgress::SchemaEnsured);

        let mut reports = Vec::with_capacity(Resource::ALL.len());

        for resource in Resource::REQUIRED {
            match self.sync_one(resource).await {
                Ok(stats) => reports.push(ResourceReport {
                    resource: resource.name(),
                    stats,
                    error: None,
                }),
                Err(e) => {
                    self.report_failure(&e);
                    return Err(self.abort(e.into()).await);
                }
            }
        }

        for resource in Resource::SECONDARY {
            match self.sync_one(resource).await {
                Ok(stats) => reports.push(ResourceReport {
                    resource: resource.name(),
                    stats,
                    error: None,
                }),
                Err(e) => {
                    self.report_failure(&e);
                    reports.push(ResourceReport {
                        resource: resource.name(),
                        stats: e.partial_stats(),
                        error: Some(failure_message(&e)),
                    });
                }
            }
        }

        let summary = SyncSummary {
            started_at,
            duration: started.elapsed(),
            resources: reports,
        };

        let degraded = summary.degraded().count();
        emit(
            on_progress,
            SyncProgress::RunComplete {
                written: summary.total_written(),
                degraded,
                duration_ms: summary.duration.as_millis() as u64,
            },
        );
        info!(
            written = summary.total_written(),
            degraded,
            duration = ?summary.duration,
            "Full sync complete"
        );

        self.send(Notification::Success(summary.clone())).await;
        Ok(SyncOutcome::Completed(summary))
    }

    async fn sync_one(&self, resource: Resource) -> Result<ResourceStats, ResourceSyncError> {
        sync_resource(
            &self.source,
            &self.writer,
            self.options.plan(resource),
            self.options.since,
            self.on_progress.as_ref(),
        )
        .await
    }

    fn report_failure(&self, err: &ResourceSyncError) {
        let required = err.resource.is_required();
        emit(
            self.on_progress.as_ref(),
            SyncProgress::ResourceFailed {
                resource: err.resource,
                page: err.page,
                records_written: err.records_written,
                error: failure_message(err),
                required,
            },
        );
        if required {
            error!(
                resource = %err.resource,
                page = err.page,
                error = %err,
                "Required resource failed"
            );
        } else {
            warn!(
                resource = %err.resource,
                page = err.page,
                written = err.records_written,
                transient = err.is_transient(),
                error = %err,
                "Secondary resource failed, continuing"
            );
        }
    }

    /// Send the failure notification and hand the error back.
    async fn abort(&self, err: RunError) -> RunError {
        error!(error = %err, "Sync aborted");
        self.send(Notification::Failure {
            error: err.to_string(),
            at: Utc::now().with_timezone(&self.window.timezone).fixed_offset(),
        })
        .await;
        err
    }

    async fn send(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!(error = %e, subject = notification.subject(), "Failed to send notification");
        }
    }
}
