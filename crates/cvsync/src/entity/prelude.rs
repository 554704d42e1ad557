//! Common re-exports for convenient entity usage.

pub use super::attendance::{
    ActiveModel as AttendanceActiveModel, Column as AttendanceColumn, Entity as Attendance,
    Model as AttendanceModel,
};
pub use super::development::{
    ActiveModel as DevelopmentActiveModel, Column as DevelopmentColumn, Entity as Development,
    Model as DevelopmentModel,
};
pub use super::payout::{
    ActiveModel as PayoutActiveModel, Column as PayoutColumn, Entity as Payout,
    Model as PayoutModel,
};
pub use super::prosoluto::{
    ActiveModel as ProsolutoActiveModel, Column as ProsolutoColumn, Entity as Prosoluto,
    Model as ProsolutoModel,
};
pub use super::reservation::{
    ActiveModel as ReservationActiveModel, Column as ReservationColumn, Entity as Reservation,
    Model as ReservationModel,
};
pub use super::sale::{
    ActiveModel as SaleActiveModel, Column as SaleColumn, Entity as Sale, Model as SaleModel,
};
pub use super::typology::{
    ActiveModel as TypologyActiveModel, Column as TypologyColumn, Entity as Typology,
    Model as TypologyModel,
};
pub use super::unit::{
    ActiveModel as UnitActiveModel, Column as UnitColumn, Entity as Unit, Model as UnitModel,
};
