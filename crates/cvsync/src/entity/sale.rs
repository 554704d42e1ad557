//! Sale entity - a confirmed transaction derived from a reservation.
//!
//! Rows are only created for reservations that are active and carry a sale
//! date. Commission and financing columns are owned by later passes and are
//! never touched by the sale upsert itself.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // ─── Upstream Identity ───────────────────────────────────────────────────
    /// CVCRM identifier of the reservation record that became this sale.
    #[sea_orm(unique)]
    pub cvcrm_id: i64,
    /// Source reservation id, used by commission matching.
    pub reservation_id: Option<i64>,

    // ─── Soft References ─────────────────────────────────────────────────────
    /// Development referenced by name, as CVDW reports it on reservations.
    pub development_name: Option<String>,
    pub unit_id: Option<i64>,

    // ─── Parties ─────────────────────────────────────────────────────────────
    pub broker: Option<String>,
    pub broker_team: Option<String>,
    pub customer: Option<String>,

    // ─── Transaction ─────────────────────────────────────────────────────────
    pub amount: Option<f64>,
    pub sale_date: Option<Date>,
    /// Upstream `ativo` flag (`S`/`N`).
    pub active_flag: Option<String>,
    pub status: Option<String>,
    pub vgv: Option<f64>,

    // ─── Commission (from `comissoes`) ───────────────────────────────────────
    pub commission_amount: Option<f64>,
    pub commission_percent: Option<f64>,

    // ─── Financing (from `reservas/condicoes`) ───────────────────────────────
    pub financing_amount: Option<f64>,
    pub down_payment: Option<f64>,
    pub installments: Option<i32>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
