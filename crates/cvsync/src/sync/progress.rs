//! Progress events emitted during a sync pass.
//!
//! The engine never prints; callers observe a pass by installing a
//! [`ProgressCallback`] and rendering these events however they like.

use crate::cvcrm::Resource;

/// Progress events emitted during a sync pass.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// A pass started inside the operating window.
    RunStarted {
        /// Local time the pass started, formatted for display.
        local_time: String,
    },

    /// The pass was skipped because the current hour is outside the window.
    OutsideWindow {
        /// Local hour that was checked.
        hour: u32,
        /// First allowed hour.
        start_hour: u32,
        /// Last allowed hour.
        end_hour: u32,
    },

    /// All tables and views exist.
    SchemaEnsured,

    /// Starting to page through a resource.
    ResourceStarted {
        resource: Resource,
        /// Record cap for this pass.
        cap: usize,
    },

    /// A page arrived from the API.
    PageFetched {
        resource: Resource,
        /// Page number (1-indexed).
        page: u32,
        /// Records on this page.
        count: usize,
    },

    /// A page was committed.
    PageWritten {
        resource: Resource,
        page: u32,
        /// Rows written from this page.
        written: usize,
        /// Rows written for this resource so far.
        total_so_far: usize,
    },

    /// A transient failure is being retried.
    RetryBackoff {
        resource: Resource,
        page: u32,
        /// Attempt that just failed (1-indexed).
        attempt: u32,
        /// Delay before the next attempt.
        retry_after_ms: u64,
        error: String,
    },

    /// The API answered 429; waiting out the cooldown.
    RateLimited {
        resource: Resource,
        page: u32,
        cooldown_ms: u64,
    },

    /// A resource finished without error.
    ResourceComplete {
        resource: Resource,
        /// Records fetched across all pages.
        fetched: usize,
        /// Rows written across all pages.
        written: usize,
        /// Non-empty pages fetched.
        pages: u32,
        /// True if paging stopped because the cap was reached.
        capped: bool,
    },

    /// A resource failed part way through.
    ResourceFailed {
        resource: Resource,
        /// Page that failed.
        page: u32,
        /// Rows committed before the failure.
        records_written: usize,
        error: String,
        /// Whether the failure aborts the pass.
        required: bool,
    },

    /// The pass completed.
    RunComplete {
        /// Rows written across every resource.
        written: usize,
        /// Resources that failed without aborting the pass.
        degraded: usize,
        duration_ms: u64,
    },
}

/// Callback type for receiving progress updates.
///
/// Must be `Send + Sync` because it is shared across the daemon's scheduled
/// runs.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_invokes_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(Some(&callback), SyncProgress::SchemaEnsured);
        emit(
            Some(&callback),
            SyncProgress::PageFetched {
                resource: Resource::Sale,
                page: 1,
                count: 50,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn emit_without_callback_is_a_no_op() {
        emit(None, SyncProgress::SchemaEnsured);
    }
}
