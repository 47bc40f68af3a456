pub use sea_orm_migration::prelude::*;

mod m20251020_000001_create_roles;
mod m20251020_000002_create_users;
mod m20251020_000003_create_vehicles;
mod m20251020_000004_create_trips;
mod m20251020_000005_create_trip_passengers;
mod m20251020_000006_create_reviews;
mod m20251020_000007_create_contact_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251020_000001_create_roles::Migration),
            Box::new(m20251020_000002_create_users::Migration),
            Box::new(m20251020_000003_create_vehicles::Migration),
            Box::new(m20251020_000004_create_trips::Migration),
            Box::new(m20251020_000005_create_trip_passengers::Migration),
            Box::new(m20251020_000006_create_reviews::Migration),
            Box::new(m20251020_000007_create_contact_messages::Migration),
        ]
    }
}
