//! Errors raised while syncing.

use sea_orm::DbErr;
use thiserror::Error;

use crate::cvcrm::{FetchError, Resource};
use crate::store::StoreError;

use super::types::ResourceStats;

/// What went wrong inside a resource sync.
#[derive(Debug, Error)]
pub enum ResourceFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A resource stopped part way through.
///
/// Pages committed before `page` stay committed; `records_written` counts them.
/// `records_fetched` and `pages_fetched` include the page that failed to write.
#[derive(Debug, Error)]
#[error("{resource} failed on page {page} after {records_written} rows: {source}")]
pub struct ResourceSyncError {
    pub resource: Resource,
    pub page: u32,
    pub records_written: usize,
    pub records_fetched: usize,
    pub pages_fetched: u32,
    #[source]
    pub source: ResourceFailure,
}

impl ResourceSyncError {
    /// Whether a later pass might succeed without intervention.
    pub fn is_transient(&self) -> bool {
        match &self.source {
            ResourceFailure::Fetch(e) => e.is_transient() || crate::cvcrm::is_rate_limit_error(e),
            ResourceFailure::Store(e) => e.is_transient(),
        }
    }

    /// Progress made before the failure.
    pub fn partial_stats(&self) -> ResourceStats {
        ResourceStats {
            fetched: self.records_fetched,
            written: self.records_written,
            pages: self.pages_fetched,
            capped: false,
        }
    }
}

/// A pass aborted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to ensure schema: {0}")]
    Schema(#[source] DbErr),

    #[error("required resource failed: {0}")]
    Resource(#[from] ResourceSyncError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_resource_page_and_partial_count() {
        let err = ResourceSyncError {
            resource: Resource::Unit,
            page: 3,
            records_written: 100,
            records_fetched: 150,
            pages_fetched: 3,
            source: FetchError::Status {
                status: 500,
                message: "boom".to_string(),
            }
            .into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("units"), "{msg}");
        assert!(msg.contains("page 3"), "{msg}");
        assert!(msg.contains("100 rows"), "{msg}");
        assert!(err.is_transient());

        let partial = err.partial_stats();
        assert_eq!(partial.fetched, 150);
        assert_eq!(partial.written, 100);
        assert_eq!(partial.pages, 3);
    }

    #[test]
    fn run_error_wraps_resource_error() {
        let err: RunError = ResourceSyncError {
            resource: Resource::Sale,
            page: 1,
            records_written: 0,
            records_fetched: 0,
            pages_fetched: 0,
            source: FetchError::Malformed("eof".to_string()).into(),
        }
        .into();
        assert!(err.to_string().starts_with("required resource failed: sales"));
    }
}
