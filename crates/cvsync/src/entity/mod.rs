//! SeaORM entity definitions for the sales warehouse schema.

pub mod attendance;
pub mod development;
pub mod payout;
pub mod prelude;
pub mod prosoluto;
pub mod reservation;
pub mod sale;
pub mod typology;
pub mod unit;
