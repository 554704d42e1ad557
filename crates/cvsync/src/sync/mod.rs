//! Incremental sync of CVDW resources into the store.
//!
//! - `pager` - the single page-fetch/page-write pipeline
//! - `orchestrator` - phase ordering, failure isolation and reporting
//! - `window` - the production operating-hours gate

mod error;
mod orchestrator;
mod pager;
mod progress;
mod types;
mod window;

pub use error::{ResourceFailure, ResourceSyncError, RunError};
pub use orchestrator::SyncEngine;
pub use pager::{PageSource, PageWriter, sync_resource};
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use types::{
    DEFAULT_PAGE_SIZE, PageRequest, ResourcePlan, ResourceReport, ResourceStats, SyncOptions,
    SyncOutcome, SyncSummary,
};
pub use window::{DEFAULT_END_HOUR, DEFAULT_START_HOUR, DEFAULT_TIMEZONE, OperatingWindow};
