//! cvsync - incremental sync of CVCRM sales data into a relational store.
//!
//! Pages are pulled from the CVCRM data-warehouse API (CVDW) at a fixed,
//! polite pace and upserted table by table, one transaction per page. A
//! pass runs the base and sales resources first (all required), then the
//! secondary resources, each isolated from the others' failures.
//!
//! # Features
//!
//! - `postgres` / `sqlite` - database backends (both on by default).
//! - `smtp` - e-mail notifications through [`notify::SmtpNotifier`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use cvsync::{CvcrmClient, Credentials, FetchPolicy, Store, SyncEngine, connect_and_migrate};
//! use cvsync::cvcrm::DEFAULT_BASE_URL;
//!
//! let db = Arc::new(connect_and_migrate("sqlite://cvsync.db?mode=rwc").await?);
//! let client = CvcrmClient::new(
//!     DEFAULT_BASE_URL,
//!     Credentials { email, token },
//!     FetchPolicy::default(),
//! )?;
//! let engine = SyncEngine::new(Arc::clone(&db), client, Store::new(db));
//! let outcome = engine.run_full_sync().await?;
//! ```

pub mod cvcrm;
pub mod db;
pub mod entity;
pub mod http;
pub mod migration;
pub mod notify;
pub mod retry;
pub mod store;
pub mod sync;

pub use cvcrm::{Credentials, CvcrmClient, FetchError, FetchPolicy, Resource};
pub use db::{connect, connect_and_migrate, ensure_schema};
pub use entity::prelude::*;
pub use notify::{LogNotifier, Notification, Notifier, NotifyError};
pub use store::{Store, StoreError, TableCount};
pub use sync::{
    OperatingWindow, ResourceSyncError, RunError, SyncEngine, SyncOptions, SyncOutcome,
    SyncProgress, SyncSummary,
};
