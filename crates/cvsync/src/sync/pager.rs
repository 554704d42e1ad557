//! The paging pipeline shared by every resource.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cvcrm::{FetchError, Resource, short_error_message};
use crate::store::StoreError;

use super::error::{ResourceFailure, ResourceSyncError};
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{PageRequest, ResourcePlan, ResourceStats};

/// Source of raw record pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        request: PageRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Value>, FetchError>;
}

/// Sink that persists one page atomically.
#[async_trait]
pub trait PageWriter: Send + Sync {
    /// Returns the number of rows written from the page.
    async fn write_page(&self, resource: Resource, records: Vec<Value>)
    -> Result<usize, StoreError>;
}

/// Page through `plan.resource` until an empty page or the cap.
///
/// Each page is committed before the next one is requested.
pub async fn sync_resource<S, W>(
    source: &S,
    writer: &W,
    plan: ResourcePlan,
    since: Option<chrono::NaiveDate>,
    on_progress: Option<&ProgressCallback>,
) -> Result<ResourceStats, ResourceSyncError>
where
    S: PageSource + ?Sized,
    W: PageWriter + ?Sized,
{
    let resource = plan.resource;
    let mut stats = ResourceStats::default();
    let mut page: u32 = 1;

    emit(
        on_progress,
        SyncProgress::ResourceStarted {
            resource,
            cap: plan.cap,
        },
    );
    info!(resource = %resource, cap = plan.cap, "Syncing resource");

    let fail = |page: u32, stats: &ResourceStats, source: ResourceFailure| ResourceSyncError {
        resource,
        page,
        records_written: stats.written,
        records_fetched: stats.fetched,
        pages_fetched: stats.pages,
        source,
    };

    while stats.fetched < plan.cap {
        let request = PageRequest {
            resource,
            page,
            page_size: plan.page_size,
            since,
        };

        let records = source
            .fetch_page(request, on_progress)
            .await
            .map_err(|e| fail(page, &stats, e.into()))?;

        if records.is_empty() {
            debug!(resource = %resource, page, "Empty page, done");
            break;
        }

        let count = records.len();
        stats.fetched += count;
        stats.pages += 1;
        emit(
            on_progress,
            SyncProgress::PageFetched {
                resource,
                page,
                count,
            },
        );

        let written = writer.write_page(resource, records).await.map_err(|e| {
            warn!(
                resource = %resource,
                page,
                transient = e.is_transient(),
                error = %e,
                "Page write rolled back"
            );
            fail(page, &stats, e.into())
        })?;
        stats.written += written;
        emit(
            on_progress,
            SyncProgress::PageWritten {
                resource,
                page,
                written,
                total_so_far: stats.written,
            },
        );

        page += 1;
    }

    if stats.fetched >= plan.cap {
        stats.capped = true;
        info!(resource = %resource, cap = plan.cap, "Reached record cap");
    }

    emit(
        on_progress,
        SyncProgress::ResourceComplete {
            resource,
            fetched: stats.fetched,
            written: stats.written,
            pages: stats.pages,
            capped: stats.capped,
        },
    );
    info!(
        resource = %resource,
        fetched = stats.fetched,
        written = stats.written,
        pages = stats.pages,
        "Resource synced"
    );

    Ok(stats)
}

/// Short display form of a resource failure.
pub(crate) fn failure_message(err: &ResourceSyncError) -> String {
    match &err.source {
        ResourceFailure::Fetch(e) => short_error_message(e),
        ResourceFailure::Store(e) => e.to_string(),
    }
}
