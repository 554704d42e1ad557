//! Updates that enrich existing sale rows instead of inserting their own.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, UpdateMany,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use tracing::{debug, warn};

use crate::cvcrm::records::{CommissionRecord, SaleConditionRecord};
use crate::entity::sale;

use super::error::Result;

/// Copy commission amounts onto matching sales.
///
/// A sale matches when its `reservation_id` equals the record's `reserva_id`
/// or its `cvcrm_id` equals the record's `venda_id`. Records carrying
/// neither key are skipped. Returns how many records were applied,
/// matched or not.
pub(crate) async fn apply_commissions<C: ConnectionTrait>(
    conn: &C,
    records: &[CommissionRecord],
    now: DateTimeWithTimeZone,
) -> Result<usize> {
    let mut processed = 0;

    for record in records {
        let Some(update) = commission_update(record, now) else {
            warn!("Skipping commission without reserva_id or venda_id");
            continue;
        };

        let result = update.exec(conn).await?;
        if result.rows_affected == 0 {
            debug!(
                reservation_id = ?record.reservation_id,
                sale_id = ?record.sale_id,
                "Commission matched no sale"
            );
        }
        processed += 1;
    }

    Ok(processed)
}

/// Copy financing terms onto the sale created from the same reservation.
///
/// Only supplied fields are written. Records without `reserva_id`, or with
/// nothing to write, are skipped.
pub(crate) async fn apply_sale_conditions<C: ConnectionTrait>(
    conn: &C,
    records: &[SaleConditionRecord],
    now: DateTimeWithTimeZone,
) -> Result<usize> {
    let mut processed = 0;

    for record in records {
        if record.reservation_id.is_none() {
            warn!("Skipping sale condition without reserva_id");
            continue;
        }
        let Some(update) = sale_condition_update(record, now) else {
            continue;
        };

        update.exec(conn).await?;
        processed += 1;
    }

    Ok(processed)
}

fn commission_update(
    record: &CommissionRecord,
    now: DateTimeWithTimeZone,
) -> Option<UpdateMany<sale::Entity>> {
    let mut condition = Condition::any();
    if let Some(reservation_id) = record.reservation_id {
        condition = condition.add(sale::Column::ReservationId.eq(reservation_id));
    }
    if let Some(sale_id) = record.sale_id {
        condition = condition.add(sale::Column::CvcrmId.eq(sale_id));
    }
    if condition.is_empty() {
        return None;
    }

    let mut update = sale::Entity::update_many()
        .col_expr(sale::Column::CommissionAmount, Expr::value(record.amount))
        .col_expr(sale::Column::UpdatedAt, Expr::value(now));
    if let Some(percent) = record.percent {
        update = update.col_expr(sale::Column::CommissionPercent, Expr::value(percent));
    }
    Some(update.filter(condition))
}

/// `None` when the record has no key or nothing to write.
fn sale_condition_update(
    record: &SaleConditionRecord,
    now: DateTimeWithTimeZone,
) -> Option<UpdateMany<sale::Entity>> {
    let reservation_id = record.reservation_id?;
    if record.financing_amount.is_none()
        && record.down_payment.is_none()
        && record.installments.is_none()
    {
        return None;
    }

    let mut update =
        sale::Entity::update_many().col_expr(sale::Column::UpdatedAt, Expr::value(now));
    if let Some(amount) = record.financing_amount {
        update = update.col_expr(sale::Column::FinancingAmount, Expr::value(amount));
    }
    if let Some(down_payment) = record.down_payment {
        update = update.col_expr(sale::Column::DownPayment, Expr::value(down_payment));
    }
    if let Some(installments) = record.installments {
        update = update.col_expr(sale::Column::Installments, Expr::value(installments));
    }
    Some(
        update.filter(
            Condition::any()
                .add(sale::Column::ReservationId.eq(reservation_id))
                .add(sale::Column::CvcrmId.eq(reservation_id)),
        ),
    )
}
