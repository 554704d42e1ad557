//! Attendance entity - broker/customer service history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub cvcrm_id: i64,

    // ─── Broker ──────────────────────────────────────────────────────────────
    pub broker_id: Option<i64>,
    pub broker_name: Option<String>,
    pub broker_group: Option<String>,
    pub broker_team: Option<String>,

    // ─── Customer ────────────────────────────────────────────────────────────
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,

    // ─── Visit ───────────────────────────────────────────────────────────────
    pub development_id: Option<i64>,
    pub attended_on: Option<Date>,
    pub kind: Option<String>,
    pub status: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
