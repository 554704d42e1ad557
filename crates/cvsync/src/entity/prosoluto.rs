//! Prosoluto entity - supplementary commission calculation tied to a sale.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prosoluto")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub cvcrm_id: i64,
    pub sale_id: Option<i64>,
    pub development_id: Option<i64>,
    pub broker_id: Option<i64>,
    pub amount: Option<f64>,
    pub percent: Option<f64>,
    pub calculated_on: Option<Date>,
    pub paid_on: Option<Date>,
    pub status: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
