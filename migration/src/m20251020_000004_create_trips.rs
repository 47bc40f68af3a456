use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251020_000002_create_users::User;
use super::m20251020_000003_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(TripStage::Enum)
                    .values([TripStage::Planned, TripStage::InProgress, TripStage::Finished])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(uuid(Trip::Id).primary_key())
                    .col(ColumnDef::new(Trip::Stage).custom(TripStage::Enum).not_null())
                    .col(uuid(Trip::DriverId).not_null())
                    .col(uuid(Trip::VehicleId).not_null())
                    .col(string_len(Trip::Origin, 255).not_null())
                    .col(string_len(Trip::Destination, 255).not_null())
                    .col(timestamp_with_time_zone(Trip::DepartureAt).not_null())
                    .col(integer(Trip::DurationMinutes).not_null())
                    .col(integer_null(Trip::Price))
                    .col(integer_null(Trip::SeatCount))
                    .col(
                        timestamp_with_time_zone(Trip::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_driver")
                            .from(Trip::Table, Trip::DriverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_vehicle")
                            .from(Trip::Table, Trip::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_stage")
                    .table(Trip::Table)
                    .col(Trip::Stage)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TripStage::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trip {
    Table,
    Id,
    Stage,
    DriverId,
    VehicleId,
    Origin,
    Destination,
    DepartureAt,
    DurationMinutes,
    Price,
    SeatCount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum TripStage {
    #[sea_orm(iden = "trip_stage")]
    Enum,
    #[sea_orm(iden = "planned")]
    Planned,
    #[sea_orm(iden = "in_progress")]
    InProgress,
    #[sea_orm(iden = "finished")]
    Finished,
}
