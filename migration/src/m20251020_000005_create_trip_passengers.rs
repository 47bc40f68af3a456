use sea_orm_migration::{prelude::*, schema::*};

use super::m20251020_000002_create_users::User;
use super::m20251020_000004_create_trips::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TripPassenger::Table)
                    .if_not_exists()
                    .col(uuid(TripPassenger::TripId).not_null())
                    .col(uuid(TripPassenger::UserId).not_null())
                    .col(
                        timestamp_with_time_zone(TripPassenger::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(TripPassenger::TripId)
                            .col(TripPassenger::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_passenger_trip")
                            .from(TripPassenger::Table, TripPassenger::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_passenger_user")
                            .from(TripPassenger::Table, TripPassenger::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TripPassenger::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TripPassenger {
    Table,
    TripId,
    UserId,
    JoinedAt,
}
