pub(crate) mod daemon;
pub(crate) mod migrate;
pub(crate) mod run;
pub(crate) mod shared;
pub(crate) mod stats;
