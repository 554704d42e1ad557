//! Unit entity - a sellable unit within a development.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub cvcrm_id: i64,

    // ─── Soft References ─────────────────────────────────────────────────────
    /// Upstream id of the owning development (not enforced).
    pub development_id: Option<i64>,
    /// Upstream id of the typology (not enforced).
    pub typology_id: Option<i64>,

    // ─── Placement ───────────────────────────────────────────────────────────
    pub number: Option<String>,
    pub block: Option<String>,
    pub floor: Option<i32>,

    // ─── Areas & Prices ──────────────────────────────────────────────────────
    pub private_area: Option<f64>,
    pub total_area: Option<f64>,
    pub list_price: Option<f64>,
    pub sale_price: Option<f64>,

    pub status: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
