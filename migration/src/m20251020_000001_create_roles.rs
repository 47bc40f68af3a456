use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Role::Table)
                    .if_not_exists()
                    .col(pk_auto(Role::Id))
                    .col(string_len(Role::Title, 255).not_null().unique_key())
                    .col(text_null(Role::Description))
                    .to_owned(),
            )
            .await?;

        // Seed the roles the credit grant table knows about
        let insert = Query::insert()
            .into_table(Role::Table)
            .columns([Role::Title, Role::Description])
            .values_panic(["ROLE_ADMIN".into(), "Platform administrator".into()])
            .values_panic(["ROLE_PREMIUM".into(), "Premium member".into()])
            .values_panic(["ROLE_USER".into(), "Standard member".into()])
            .values_panic(["ROLE_SUSPENDED".into(), "Suspended account".into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Role::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Role {
    Table,
    Id,
    Title,
    Description,
}
