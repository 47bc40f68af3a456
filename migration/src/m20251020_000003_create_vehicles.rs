use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(string_len(Vehicle::Plate, 32).not_null().unique_key())
                    .col(string_len(Vehicle::Brand, 255).not_null())
                    .col(string_len(Vehicle::Model, 255).not_null())
                    .col(string_len(Vehicle::Color, 255).not_null())
                    .col(integer(Vehicle::SeatCount).not_null())
                    .col(boolean(Vehicle::Smoker).not_null().default(false))
                    .col(boolean(Vehicle::PetsAllowed).not_null().default(false))
                    .col(date(Vehicle::RegisteredOn).not_null())
                    .col(ColumnDef::new(Vehicle::Image).blob().null())
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    Plate,
    Brand,
    Model,
    Color,
    SeatCount,
    Smoker,
    PetsAllowed,
    RegisteredOn,
    Image,
    CreatedAt,
}
