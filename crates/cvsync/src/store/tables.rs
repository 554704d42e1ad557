//! Per-table upsert definitions.
//!
//! Each table names its record type, how a record becomes a row, and which
//! columns a conflicting write may overwrite. `cvcrm_id` and `created_at` are
//! never in an update list.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, EntityTrait, IntoActiveModel, Set,
    prelude::DateTimeWithTimeZone, sea_query::OnConflict,
};

use crate::cvcrm::records::{
    AttendanceRecord, DevelopmentRecord, PayoutRecord, ProsolutoRecord, ReservationRecord,
    SOLD_STATUS, TypologyRecord, UnitRecord,
};
use crate::entity::{attendance, development, payout, prosoluto, reservation, sale, typology, unit};

use super::error::Result;

type EntityOf<A> = <A as ActiveModelTrait>::Entity;
type ModelOf<A> = <EntityOf<A> as EntityTrait>::Model;

/// A table written by natural-key upsert.
pub(crate) trait UpsertTable {
    type Record: Send + Sync;
    type ActiveModel: ActiveModelTrait + Send;

    fn upstream_id(record: &Self::Record) -> i64;
    fn active_model(record: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel;
    fn on_conflict() -> OnConflict;
}

/// Upsert `records` in one statement, keeping the last occurrence of each id.
///
/// Returns the number of distinct rows written.
pub(crate) async fn upsert_page<T, C>(
    conn: &C,
    records: &[T::Record],
    now: DateTimeWithTimeZone,
) -> Result<usize>
where
    T: UpsertTable,
    C: ConnectionTrait,
    ModelOf<T::ActiveModel>: IntoActiveModel<T::ActiveModel>,
{
    let unique = dedupe_last_wins(records, T::upstream_id);
    if unique.is_empty() {
        return Ok(0);
    }

    let count = unique.len();
    let models: Vec<T::ActiveModel> = unique
        .into_iter()
        .map(|record| T::active_model(record, now))
        .collect();

    <EntityOf<T::ActiveModel> as EntityTrait>::insert_many(models)
        .on_conflict(T::on_conflict())
        .exec_without_returning(conn)
        .await?;

    Ok(count)
}

/// Keep the last record for each key, in first-seen order.
pub(crate) fn dedupe_last_wins<R>(records: &[R], key: impl Fn(&R) -> i64) -> Vec<&R> {
    let mut positions: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<&R> = Vec::with_capacity(records.len());

    for record in records {
        match positions.get(&key(record)) {
            Some(&idx) => unique[idx] = record,
            None => {
                positions.insert(key(record), unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

// ─── Developments ────────────────────────────────────────────────────────────

pub(crate) struct Developments;

impl UpsertTable for Developments {
    type Record = DevelopmentRecord;
    type ActiveModel = development::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        development::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            name: Set(r.name.clone()),
            address: Set(r.address.clone()),
            city: Set(r.city.clone()),
            state: Set(r.state.clone()),
            postal_code: Set(r.postal_code.clone()),
            status: Set(r.status.clone()),
            vgv: Set(r.vgv),
            launch_date: Set(r.launch_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use development::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::Name,
                Column::Address,
                Column::City,
                Column::State,
                Column::PostalCode,
                Column::Status,
                Column::Vgv,
                Column::LaunchDate,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}

// ─── Units ───────────────────────────────────────────────────────────────────

pub(crate) struct Units;

impl UpsertTable for Units {
    type Record = UnitRecord;
    type ActiveModel = unit::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        unit::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            development_id: Set(r.development_id),
            typology_id: Set(r.typology_id),
            number: Set(r.number.clone()),
            block: Set(r.block.clone()),
            floor: Set(r.floor),
            private_area: Set(r.private_area),
            total_area: Set(r.total_area),
            list_price: Set(r.list_price),
            sale_price: Set(r.sale_price),
            status: Set(r.status.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use unit::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::DevelopmentId,
                Column::TypologyId,
                Column::Number,
                Column::Block,
                Column::Floor,
                Column::PrivateArea,
                Column::TotalArea,
                Column::ListPrice,
                Column::SalePrice,
                Column::Status,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}

// ─── Typologies ──────────────────────────────────────────────────────────────

pub(crate) struct Typologies;

impl UpsertTable for Typologies {
    type Record = TypologyRecord;
    type ActiveModel = typology::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        typology::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            name: Set(r.name.clone()),
            bedrooms: Set(r.bedrooms),
            suites: Set(r.suites),
            bathrooms: Set(r.bathrooms),
            parking_spaces: Set(r.parking_spaces),
            min_area: Set(r.min_area),
            max_area: Set(r.max_area),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use typology::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::Name,
                Column::Bedrooms,
                Column::Suites,
                Column::Bathrooms,
                Column::ParkingSpaces,
                Column::MinArea,
                Column::MaxArea,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}

// ─── Sales ───────────────────────────────────────────────────────────────────

/// Confirmed reservations. Callers filter with
/// [`ReservationRecord::is_confirmed_sale`] first.
pub(crate) struct Sales;

impl UpsertTable for Sales {
    type Record = ReservationRecord;
    type ActiveModel = sale::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        sale::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            reservation_id: Set(r.reservation_id),
            development_name: Set(r.development_name.clone()),
            unit_id: Set(r.unit_id),
            broker: Set(r.broker.clone()),
            broker_team: Set(r.broker_team.clone()),
            customer: Set(r.customer.clone()),
            amount: Set(r.amount),
            sale_date: Set(r.sale_date()),
            active_flag: Set(r.active_flag.clone()),
            status: Set(Some(SOLD_STATUS.to_string())),
            vgv: Set(r.amount),
            // Owned by the commission and sale-condition passes.
            commission_amount: NotSet,
            commission_percent: NotSet,
            financing_amount: NotSet,
            down_payment: NotSet,
            installments: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use sale::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::DevelopmentName,
                Column::Broker,
                Column::BrokerTeam,
                Column::Customer,
                Column::Amount,
                Column::SaleDate,
                Column::ActiveFlag,
                Column::Vgv,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}

// ─── Reservations ────────────────────────────────────────────────────────────

pub(crate) struct Reservations;

impl UpsertTable for Reservations {
    type Record = ReservationRecord;
    type ActiveModel = reservation::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        reservation::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            development_id: Set(r.development_id),
            unit_id: Set(r.unit_id),
            broker_id: Set(r.broker_id),
            broker_name: Set(r.broker_name.clone()),
            customer_name: Set(r.customer_name.clone()),
            reserved_on: Set(r.reserved_on),
            expires_on: Set(r.expires_on),
            status: Set(r.status.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use reservation::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::DevelopmentId,
                Column::UnitId,
                Column::BrokerName,
                Column::CustomerName,
                Column::ReservedOn,
                Column::ExpiresOn,
                Column::Status,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}

// ─── Payouts ─────────────────────────────────────────────────────────────────

pub(crate) struct Payouts;

impl UpsertTable for Payouts {
    type Record = PayoutRecord;
    type ActiveModel = payout::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        payout::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            sale_id: Set(r.sale_id),
            broker_id: Set(r.broker_id),
            broker_name: Set(r.broker_name.clone()),
            amount: Set(r.amount),
            percent: Set(r.percent),
            payout_date: Set(r.payout_date),
            paid_date: Set(r.paid_date),
            status: Set(r.status.clone()),
            notes: Set(r.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use payout::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::Amount,
                Column::Percent,
                Column::PayoutDate,
                Column::PaidDate,
                Column::Status,
                Column::Notes,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}

// ─── Prosoluto ───────────────────────────────────────────────────────────────

pub(crate) struct ProsolutoTable;

impl UpsertTable for ProsolutoTable {
    type Record = ProsolutoRecord;
    type ActiveModel = prosoluto::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        prosoluto::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            sale_id: Set(r.sale_id),
            development_id: Set(r.development_id),
            broker_id: Set(r.broker_id),
            amount: Set(r.amount),
            percent: Set(r.percent),
            calculated_on: Set(r.calculated_on),
            paid_on: Set(r.paid_on),
            status: Set(r.status.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use prosoluto::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::Amount,
                Column::Percent,
                Column::CalculatedOn,
                Column::PaidOn,
                Column::Status,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}

// ─── Attendances ─────────────────────────────────────────────────────────────

pub(crate) struct Attendances;

impl UpsertTable for Attendances {
    type Record = AttendanceRecord;
    type ActiveModel = attendance::ActiveModel;

    fn upstream_id(record: &Self::Record) -> i64 {
        record.id
    }

    fn active_model(r: &Self::Record, now: DateTimeWithTimeZone) -> Self::ActiveModel {
        attendance::ActiveModel {
            id: NotSet,
            cvcrm_id: Set(r.id),
            broker_id: Set(r.broker_id),
            broker_name: Set(r.broker_name.clone()),
            broker_group: Set(r.broker_group.clone()),
            broker_team: Set(r.broker_team.clone()),
            customer_name: Set(r.customer_name.clone()),
            customer_email: Set(r.customer_email.clone()),
            customer_phone: Set(r.customer_phone.clone()),
            development_id: Set(r.development_id),
            attended_on: Set(r.attended_on),
            kind: Set(r.kind.clone()),
            status: Set(r.status.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn on_conflict() -> OnConflict {
        use attendance::Column;
        OnConflict::column(Column::CvcrmId)
            .update_columns([
                Column::BrokerName,
                Column::BrokerGroup,
                Column::BrokerTeam,
                Column::CustomerName,
                Column::CustomerEmail,
                Column::CustomerPhone,
                Column::AttendedOn,
                Column::Kind,
                Column::Status,
                Column::UpdatedAt,
            ])
            .to_owned()
    }
}
