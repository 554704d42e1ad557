//! Development entity - a real-estate project.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "developments")]
pub struct Model {
    /// Internal surrogate key.
    #[sea_orm(primary_key)]
    pub id: i32,

    // ─── Upstream Identity ───────────────────────────────────────────────────
    /// CVCRM identifier; the conflict key for upserts.
    #[sea_orm(unique)]
    pub cvcrm_id: i64,

    // ─── Project ─────────────────────────────────────────────────────────────
    pub name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub status: Option<String>,
    /// Total sales value (VGV) of the project.
    pub vgv: Option<f64>,
    pub launch_date: Option<Date>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// Set on first insert, never overwritten.
    pub created_at: DateTimeWithTimeZone,
    /// Refreshed on every write.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
