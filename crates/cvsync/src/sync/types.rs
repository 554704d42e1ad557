//! Shared sync types and defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::cvcrm::Resource;

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// One page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub resource: Resource,
    /// 1-indexed page number.
    pub page: u32,
    pub page_size: u32,
    /// Only records changed on or after this date, where supported.
    pub since: Option<NaiveDate>,
}

/// How to page through one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePlan {
    pub resource: Resource,
    pub page_size: u32,
    /// Stop once this many records have been fetched.
    pub cap: usize,
}

impl ResourcePlan {
    /// Plan with the resource's default cap and the default page size.
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            page_size: DEFAULT_PAGE_SIZE,
            cap: resource.default_cap(),
        }
    }
}

/// Options for a full sync pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub page_size: u32,
    /// Per-resource cap overrides; missing entries use [`Resource::default_cap`].
    pub caps: BTreeMap<Resource, usize>,
    /// Incremental lower bound sent to resources that accept it.
    pub since: Option<NaiveDate>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            caps: BTreeMap::new(),
            since: None,
        }
    }
}

impl SyncOptions {
    /// Paging plan for `resource` under these options.
    pub fn plan(&self, resource: Resource) -> ResourcePlan {
        ResourcePlan {
            resource,
            page_size: self.page_size.max(1),
            cap: self
                .caps
                .get(&resource)
                .copied()
                .unwrap_or_else(|| resource.default_cap()),
        }
    }
}

/// Counts from paging one resource to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceStats {
    /// Records returned by the API.
    pub fetched: usize,
    /// Rows written (or enrichment records applied).
    pub written: usize,
    /// Non-empty pages fetched.
    pub pages: u32,
    /// Paging stopped because the cap was reached.
    pub capped: bool,
}

/// Outcome of one resource within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub resource: &'static str,
    pub stats: ResourceStats,
    /// Set when a secondary resource failed; `stats.written` is then partial.
    pub error: Option<String>,
}

impl ResourceReport {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary of a completed pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub started_at: DateTime<FixedOffset>,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    /// Reports in sync order.
    pub resources: Vec<ResourceReport>,
}

impl SyncSummary {
    /// Rows written across every resource.
    pub fn total_written(&self) -> usize {
        self.resources.iter().map(|r| r.stats.written).sum()
    }

    /// Secondary resources that failed.
    pub fn degraded(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources.iter().filter(|r| r.is_degraded())
    }

    /// Rows written for one resource, zero if it did not run.
    pub fn written(&self, resource: Resource) -> usize {
        self.resources
            .iter()
            .find(|r| r.resource == resource.name())
            .map_or(0, |r| r.stats.written)
    }
}

/// Result of [`SyncEngine::run_full_sync`](super::SyncEngine::run_full_sync).
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Outside the operating window; nothing was fetched.
    Skipped { local_hour: u32 },
    Completed(SyncSummary),
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
