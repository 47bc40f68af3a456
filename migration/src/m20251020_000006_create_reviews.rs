use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251020_000004_create_trips::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(ReviewKind::Enum)
                    .values([ReviewKind::Feedback, ReviewKind::Validation])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(uuid(Review::Id).primary_key())
                    .col(ColumnDef::new(Review::Kind).custom(ReviewKind::Enum).not_null())
                    .col(string_len(Review::AuthorName, 255).not_null())
                    .col(integer_null(Review::Rating))
                    .col(text(Review::Comment).not_null())
                    .col(uuid_null(Review::TripId))
                    .col(
                        timestamp_with_time_zone(Review::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_trip")
                            .from(Review::Table, Review::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ReviewKind::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Review {
    Table,
    Id,
    Kind,
    AuthorName,
    Rating,
    Comment,
    TripId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ReviewKind {
    #[sea_orm(iden = "review_kind")]
    Enum,
    #[sea_orm(iden = "feedback")]
    Feedback,
    #[sea_orm(iden = "validation")]
    Validation,
}
