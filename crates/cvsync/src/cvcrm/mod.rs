//! CVCRM data-warehouse (CVDW) integration.
//!
//! - [`client`] - paced, retrying page fetcher
//! - [`records`] - typed views of the raw records
//! - [`resource`] - the logical resources and their paging defaults

pub mod client;
pub mod decode;
pub mod error;
pub mod records;
pub mod resource;

pub use client::{
    Credentials, CvcrmClient, DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT_COOLDOWN,
    DEFAULT_REQUEST_DELAY, FetchPolicy,
};
pub use error::{FetchError, is_rate_limit_error, short_error_message};
pub use resource::Resource;
