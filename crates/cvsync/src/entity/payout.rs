//! Payout entity - a commission transfer ("repasse") to a broker.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payouts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub cvcrm_id: i64,
    /// Upstream id of the sale (not enforced).
    pub sale_id: Option<i64>,
    pub broker_id: Option<i64>,
    pub broker_name: Option<String>,
    pub amount: Option<f64>,
    pub percent: Option<f64>,
    pub payout_date: Option<Date>,
    pub paid_date: Option<Date>,
    pub status: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
