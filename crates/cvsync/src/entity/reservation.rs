//! Reservation entity - every reservation, sold or not.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub cvcrm_id: i64,

    // ─── Soft References ─────────────────────────────────────────────────────
    pub development_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub broker_id: Option<i64>,

    pub broker_name: Option<String>,
    pub customer_name: Option<String>,
    pub reserved_on: Option<Date>,
    pub expires_on: Option<Date>,
    pub status: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
