//! Initial migration: the eight warehouse tables.
//!
//! References between tables hold upstream ids and carry no foreign keys, so
//! resources can land in any order without violating constraints.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_developments(manager).await?;
        self.create_units(manager).await?;
        self.create_typologies(manager).await?;
        self.create_sales(manager).await?;
        self.create_payouts(manager).await?;
        self.create_reservations(manager).await?;
        self.create_prosoluto(manager).await?;
        self.create_attendances(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Attendances::Table.into_iden(),
            Prosoluto::Table.into_iden(),
            Reservations::Table.into_iden(),
            Payouts::Table.into_iden(),
            Sales::Table.into_iden(),
            Typologies::Table.into_iden(),
            Units::Table.into_iden(),
            Developments::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

/// Auto-increment surrogate key.
fn surrogate_key<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

/// Unique upstream identifier; the upsert conflict target.
fn upstream_id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .unique_key()
        .to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

impl Migration {
    async fn create_index(
        &self,
        manager: &SchemaManager<'_>,
        name: &str,
        table: impl IntoIden + 'static,
        col: impl IntoIden + 'static,
    ) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(name)
                    .table(table)
                    .col(col)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn create_developments(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Developments::Table)
                    .if_not_exists()
                    .col(surrogate_key(Developments::Id))
                    .col(upstream_id(Developments::CvcrmId))
                    .col(ColumnDef::new(Developments::Name).string().null())
                    .col(ColumnDef::new(Developments::Address).text().null())
                    .col(ColumnDef::new(Developments::City).string_len(100).null())
                    .col(ColumnDef::new(Developments::State).string_len(2).null())
                    .col(ColumnDef::new(Developments::PostalCode).string_len(10).null())
                    .col(ColumnDef::new(Developments::Status).string_len(50).null())
                    .col(ColumnDef::new(Developments::Vgv).double().null())
                    .col(ColumnDef::new(Developments::LaunchDate).date().null())
                    .col(timestamp(Developments::CreatedAt))
                    .col(timestamp(Developments::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Sales join developments by name.
        self.create_index(
            manager,
            "idx_developments_name",
            Developments::Table,
            Developments::Name,
        )
        .await
    }

    async fn create_units(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(surrogate_key(Units::Id))
                    .col(upstream_id(Units::CvcrmId))
                    .col(ColumnDef::new(Units::DevelopmentId).big_integer().null())
                    .col(ColumnDef::new(Units::TypologyId).big_integer().null())
                    .col(ColumnDef::new(Units::Number).string_len(50).null())
                    .col(ColumnDef::new(Units::Block).string_len(50).null())
                    .col(ColumnDef::new(Units::Floor).integer().null())
                    .col(ColumnDef::new(Units::PrivateArea).double().null())
                    .col(ColumnDef::new(Units::TotalArea).double().null())
                    .col(ColumnDef::new(Units::ListPrice).double().null())
                    .col(ColumnDef::new(Units::SalePrice).double().null())
                    .col(ColumnDef::new(Units::Status).string_len(50).null())
                    .col(timestamp(Units::CreatedAt))
                    .col(timestamp(Units::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        self.create_index(
            manager,
            "idx_units_development",
            Units::Table,
            Units::DevelopmentId,
        )
        .await
    }

    async fn create_typologies(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Typologies::Table)
                    .if_not_exists()
                    .col(surrogate_key(Typologies::Id))
                    .col(upstream_id(Typologies::CvcrmId))
                    .col(ColumnDef::new(Typologies::Name).string_len(100).null())
                    .col(ColumnDef::new(Typologies::Bedrooms).integer().null())
                    .col(ColumnDef::new(Typologies::Suites).integer().null())
                    .col(ColumnDef::new(Typologies::Bathrooms).integer().null())
                    .col(ColumnDef::new(Typologies::ParkingSpaces).integer().null())
                    .col(ColumnDef::new(Typologies::MinArea).double().null())
                    .col(ColumnDef::new(Typologies::MaxArea).double().null())
                    .col(timestamp(Typologies::CreatedAt))
                    .col(timestamp(Typologies::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn create_sales(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(surrogate_key(Sales::Id))
                    .col(upstream_id(Sales::CvcrmId))
                    .col(ColumnDef::new(Sales::ReservationId).big_integer().null())
                    // References
                    .col(ColumnDef::new(Sales::DevelopmentName).string().null())
                    .col(ColumnDef::new(Sales::UnitId).big_integer().null())
                    // Parties
                    .col(ColumnDef::new(Sales::Broker).string().null())
                    .col(ColumnDef::new(Sales::BrokerTeam).string_len(100).null())
                    .col(ColumnDef::new(Sales::Customer).string().null())
                    // Transaction
                    .col(ColumnDef::new(Sales::Amount).double().null())
                    .col(ColumnDef::new(Sales::SaleDate).date().null())
                    .col(ColumnDef::new(Sales::ActiveFlag).string_len(1).null())
                    .col(ColumnDef::new(Sales::Status).string_len(50).null())
                    .col(ColumnDef::new(Sales::Vgv).double().null())
                    // Commission
                    .col(ColumnDef::new(Sales::CommissionAmount).double().null())
                    .col(ColumnDef::new(Sales::CommissionPercent).double().null())
                    // Financing
                    .col(ColumnDef::new(Sales::FinancingAmount).double().null())
                    .col(ColumnDef::new(Sales::DownPayment).double().null())
                    .col(ColumnDef::new(Sales::Installments).integer().null())
                    // Tracking
                    .col(timestamp(Sales::CreatedAt))
                    .col(timestamp(Sales::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        self.create_index(
            manager,
            "idx_sales_reservation",
            Sales::Table,
            Sales::ReservationId,
        )
        .await?;
        self.create_index(manager, "idx_sales_sale_date", Sales::Table, Sales::SaleDate)
            .await?;
        self.create_index(
            manager,
            "idx_sales_development_name",
            Sales::Table,
            Sales::DevelopmentName,
        )
        .await
    }

    async fn create_payouts(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payouts::Table)
                    .if_not_exists()
                    .col(surrogate_key(Payouts::Id))
                    .col(upstream_id(Payouts::CvcrmId))
                    .col(ColumnDef::new(Payouts::SaleId).big_integer().null())
                    .col(ColumnDef::new(Payouts::BrokerId).big_integer().null())
                    .col(ColumnDef::new(Payouts::BrokerName).string().null())
                    .col(ColumnDef::new(Payouts::Amount).double().null())
                    .col(ColumnDef::new(Payouts::Percent).double().null())
                    .col(ColumnDef::new(Payouts::PayoutDate).date().null())
                    .col(ColumnDef::new(Payouts::PaidDate).date().null())
                    .col(ColumnDef::new(Payouts::Status).string_len(50).null())
                    .col(ColumnDef::new(Payouts::Notes).text().null())
                    .col(timestamp(Payouts::CreatedAt))
                    .col(timestamp(Payouts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        self.create_index(manager, "idx_payouts_sale", Payouts::Table, Payouts::SaleId)
            .await
    }

    async fn create_reservations(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(surrogate_key(Reservations::Id))
                    .col(upstream_id(Reservations::CvcrmId))
                    .col(ColumnDef::new(Reservations::DevelopmentId).big_integer().null())
                    .col(ColumnDef::new(Reservations::UnitId).big_integer().null())
                    .col(ColumnDef::new(Reservations::BrokerId).big_integer().null())
                    .col(ColumnDef::new(Reservations::BrokerName).string().null())
                    .col(ColumnDef::new(Reservations::CustomerName).string().null())
                    .col(ColumnDef::new(Reservations::ReservedOn).date().null())
                    .col(ColumnDef::new(Reservations::ExpiresOn).date().null())
                    .col(ColumnDef::new(Reservations::Status).string_len(50).null())
                    .col(timestamp(Reservations::CreatedAt))
                    .col(timestamp(Reservations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        self.create_index(
            manager,
            "idx_reservations_development",
            Reservations::Table,
            Reservations::DevelopmentId,
        )
        .await
    }

    async fn create_prosoluto(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prosoluto::Table)
                    .if_not_exists()
                    .col(surrogate_key(Prosoluto::Id))
                    .col(upstream_id(Prosoluto::CvcrmId))
                    .col(ColumnDef::new(Prosoluto::SaleId).big_integer().null())
                    .col(ColumnDef::new(Prosoluto::DevelopmentId).big_integer().null())
                    .col(ColumnDef::new(Prosoluto::BrokerId).big_integer().null())
                    .col(ColumnDef::new(Prosoluto::Amount).double().null())
                    .col(ColumnDef::new(Prosoluto::Percent).double().null())
                    .col(ColumnDef::new(Prosoluto::CalculatedOn).date().null())
                    .col(ColumnDef::new(Prosoluto::PaidOn).date().null())
                    .col(ColumnDef::new(Prosoluto::Status).string_len(50).null())
                    .col(timestamp(Prosoluto::CreatedAt))
                    .col(timestamp(Prosoluto::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        self.create_index(
            manager,
            "idx_prosoluto_sale",
            Prosoluto::Table,
            Prosoluto::SaleId,
        )
        .await
    }

    async fn create_attendances(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendances::Table)
                    .if_not_exists()
                    .col(surrogate_key(Attendances::Id))
                    .col(upstream_id(Attendances::CvcrmId))
                    .col(ColumnDef::new(Attendances::BrokerId).big_integer().null())
                    .col(ColumnDef::new(Attendances::BrokerName).string().null())
                    .col(ColumnDef::new(Attendances::BrokerGroup).string_len(100).null())
                    .col(ColumnDef::new(Attendances::BrokerTeam).string_len(100).null())
                    .col(ColumnDef::new(Attendances::CustomerName).string().null())
                    .col(ColumnDef::new(Attendances::CustomerEmail).string().null())
                    .col(ColumnDef::new(Attendances::CustomerPhone).string_len(50).null())
                    .col(ColumnDef::new(Attendances::DevelopmentId).big_integer().null())
                    .col(ColumnDef::new(Attendances::AttendedOn).date().null())
                    .col(ColumnDef::new(Attendances::Kind).string_len(100).null())
                    .col(ColumnDef::new(Attendances::Status).string_len(50).null())
                    .col(timestamp(Attendances::CreatedAt))
                    .col(timestamp(Attendances::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Developments {
    Table,
    Id,
    CvcrmId,
    Name,
    Address,
    City,
    State,
    PostalCode,
    Status,
    Vgv,
    LaunchDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Units {
    Table,
    Id,
    CvcrmId,
    DevelopmentId,
    TypologyId,
    Number,
    Block,
    Floor,
    PrivateArea,
    TotalArea,
    ListPrice,
    SalePrice,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Typologies {
    Table,
    Id,
    CvcrmId,
    Name,
    Bedrooms,
    Suites,
    Bathrooms,
    ParkingSpaces,
    MinArea,
    MaxArea,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    CvcrmId,
    ReservationId,
    DevelopmentName,
    UnitId,
    Broker,
    BrokerTeam,
    Customer,
    Amount,
    SaleDate,
    ActiveFlag,
    Status,
    Vgv,
    CommissionAmount,
    CommissionPercent,
    FinancingAmount,
    DownPayment,
    Installments,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payouts {
    Table,
    Id,
    CvcrmId,
    SaleId,
    BrokerId,
    BrokerName,
    Amount,
    Percent,
    PayoutDate,
    PaidDate,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reservations {
    Table,
    Id,
    CvcrmId,
    DevelopmentId,
    UnitId,
    BrokerId,
    BrokerName,
    CustomerName,
    ReservedOn,
    ExpiresOn,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "prosoluto")]
enum Prosoluto {
    Table,
    Id,
    CvcrmId,
    SaleId,
    DevelopmentId,
    BrokerId,
    Amount,
    Percent,
    CalculatedOn,
    PaidOn,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Attendances {
    Table,
    Id,
    CvcrmId,
    BrokerId,
    BrokerName,
    BrokerGroup,
    BrokerTeam,
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    DevelopmentId,
    AttendedOn,
    Kind,
    Status,
    CreatedAt,
    UpdatedAt,
}
