//! Persistence of fetched pages.
//!
//! Every page is written inside its own transaction, so a page is either
//! fully applied or not at all, and earlier pages survive a later failure.

mod error;
mod tables;
mod targeted;

pub use error::{Result, StoreError};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cvcrm::Resource;
use crate::cvcrm::records::{CommissionRecord, ReservationRecord, SaleConditionRecord};
use crate::entity::prelude::*;
use crate::sync::PageWriter;

use tables::{
    Attendances, Developments, Payouts, ProsolutoTable, Reservations, Sales, Typologies, Units,
    upsert_page,
};
use targeted::{apply_commissions, apply_sale_conditions};

/// Row count of one synchronized table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: u64,
}

/// Writes decoded pages into the relational store.
#[derive(Debug, Clone)]
pub struct Store {
    db: Arc<DatabaseConnection>,
}

impl Store {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Decode and persist one page of `resource`.
    ///
    /// Records that fail to decode are logged and skipped. Returns the number
    /// of rows inserted, updated, or (for enrichment resources) processed.
    pub async fn write_records(&self, resource: Resource, records: Vec<Value>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        let written = match resource {
            Resource::Development => {
                upsert_page::<Developments, _>(&txn, &decode_all(resource, records), now).await?
            }
            Resource::Unit => {
                upsert_page::<Units, _>(&txn, &decode_all(resource, records), now).await?
            }
            Resource::Typology => {
                upsert_page::<Typologies, _>(&txn, &decode_all(resource, records), now).await?
            }
            Resource::Sale => {
                let confirmed: Vec<ReservationRecord> = decode_all(resource, records)
                    .into_iter()
                    .filter(|r: &ReservationRecord| r.is_confirmed_sale())
                    .collect();
                upsert_page::<Sales, _>(&txn, &confirmed, now).await?
            }
            Resource::Reservation => {
                upsert_page::<Reservations, _>(&txn, &decode_all(resource, records), now).await?
            }
            Resource::Payout => {
                upsert_page::<Payouts, _>(&txn, &decode_all(resource, records), now).await?
            }
            Resource::Prosoluto => {
                upsert_page::<ProsolutoTable, _>(&txn, &decode_all(resource, records), now).await?
            }
            Resource::Attendance => {
                upsert_page::<Attendances, _>(&txn, &decode_all(resource, records), now).await?
            }
            Resource::Commission => {
                let commissions: Vec<CommissionRecord> = decode_all(resource, records);
                apply_commissions(&txn, &commissions, now).await?
            }
            Resource::SaleCondition => {
                let conditions: Vec<SaleConditionRecord> = decode_all(resource, records);
                apply_sale_conditions(&txn, &conditions, now).await?
            }
        };

        txn.commit().await?;
        debug!(resource = %resource, written, "Page committed");
        Ok(written)
    }

    /// Row counts for every synchronized table.
    pub async fn table_counts(&self) -> Result<Vec<TableCount>> {
        Ok(vec![
            count::<Development>(&self.db, "developments").await?,
            count::<Unit>(&self.db, "units").await?,
            count::<Typology>(&self.db, "typologies").await?,
            count::<Sale>(&self.db, "sales").await?,
            count::<Reservation>(&self.db, "reservations").await?,
            count::<Payout>(&self.db, "payouts").await?,
            count::<Prosoluto>(&self.db, "prosoluto").await?,
            count::<Attendance>(&self.db, "attendances").await?,
        ])
    }
}

async fn count<E: EntityTrait>(
    db: &DatabaseConnection,
    table: &'static str,
) -> Result<TableCount>
where
    E::Model: Sync,
{
    let rows = E::find().count(db).await?;
    Ok(TableCount { table, rows })
}

fn decode_all<R: DeserializeOwned>(resource: Resource, records: Vec<Value>) -> Vec<R> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(resource = %resource, index = idx, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PageWriter for Store {
    async fn write_page(&self, resource: Resource, records: Vec<Value>) -> Result<usize> {
        self.write_records(resource, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_and_migrate;
    use sea_orm::{ColumnTrait, QueryFilter};
    use serde_json::json;

    async fn store() -> Store {
        Store::new(Arc::new(
            connect_and_migrate("sqlite::memory:")
                .await
                .expect("in-memory sqlite should migrate"),
        ))
    }

    #[tokio::test]
    async fn sales_page_keeps_only_confirmed_reservations() {
        let store = store().await;
        let written = store
            .write_records(
                Resource::Sale,
                vec![
                    json!({"id": 1, "ativo": "S", "data_venda": "2025-01-02", "valor": 100}),
                    json!({"id": 2, "ativo": "N", "data_venda": "2025-01-02"}),
                    json!({"id": 3, "ativo": "S", "data_venda": ""}),
                    json!({"nome": "no id"}),
                ],
            )
            .await
            .expect("page should be written");
        assert_eq!(written, 1);

        let rows = Sale::find().all(store.connection()).await.expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cvcrm_id, 1);
        assert_eq!(rows[0].status.as_deref(), Some("Vendido"));
        assert_eq!(rows[0].vgv, Some(100.0));
    }

    #[tokio::test]
    async fn rewriting_a_page_updates_in_place_and_keeps_created_at() {
        let store = store().await;
        store
            .write_records(Resource::Development, vec![json!({"id": 5, "nome": "Aurora"})])
            .await
            .expect("first write");
        let first = Development::find()
            .one(store.connection())
            .await
            .expect("query")
            .expect("row");

        store
            .write_records(Resource::Development, vec![json!({"id": 5, "nome": "Aurora II"})])
            .await
            .expect("second write");
        let rows = Development::find().all(store.connection()).await.expect("query");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("Aurora II"));
        assert_eq!(rows[0].created_at, first.created_at);
        assert!(rows[0].updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn commission_enriches_existing_sale_without_inserting() {
        let store = store().await;
        store
            .write_records(
                Resource::Sale,
                vec![json!({"id": 10, "reserva_id": 77, "ativo": "S", "data_venda": "2025-03-01"})],
            )
            .await
            .expect("sale");

        let processed = store
            .write_records(
                Resource::Commission,
                vec![
                    json!({"reserva_id": 77, "valor_comissao": 4200, "percentual_comissao": 4}),
                    json!({"reserva_id": 999, "valor_comissao": 1}),
                ],
            )
            .await
            .expect("commissions");
        assert_eq!(processed, 2);

        let rows = Sale::find().all(store.connection()).await.expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].commission_amount, Some(4200.0));
        assert_eq!(rows[0].commission_percent, Some(4.0));
    }

    #[tokio::test]
    async fn resale_does_not_clear_commission() {
        let store = store().await;
        let sale = json!({"id": 10, "reserva_id": 77, "ativo": "S", "data_venda": "2025-03-01"});
        store.write_records(Resource::Sale, vec![sale.clone()]).await.expect("sale");
        store
            .write_records(
                Resource::Commission,
                vec![json!({"venda_id": 10, "valor_comissao": 900})],
            )
            .await
            .expect("commission");
        store.write_records(Resource::Sale, vec![sale]).await.expect("resale");

        let row = Sale::find()
            .filter(SaleColumn::CvcrmId.eq(10))
            .one(store.connection())
            .await
            .expect("query")
            .expect("row");
        assert_eq!(row.commission_amount, Some(900.0));
    }

    #[tokio::test]
    async fn empty_page_writes_nothing() {
        let store = store().await;
        assert_eq!(store.write_records(Resource::Unit, vec![]).await.expect("empty"), 0);
    }

    #[tokio::test]
    async fn table_counts_cover_every_table() {
        let store = store().await;
        store
            .write_records(Resource::Unit, vec![json!({"id": 1}), json!({"id": 2})])
            .await
            .expect("units");
        let counts = store.table_counts().await.expect("counts");
        assert_eq!(counts.len(), 8);
        let units = counts.iter().find(|c| c.table == "units").expect("units row");
        assert_eq!(units.rows, 2);
    }
}
