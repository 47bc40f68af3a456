pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod usecase;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use db::{DbAccountRepository, DbReviewRepository, DbRoleRepository, DbTripRepository};

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Config,
}

impl AppState {
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn account_repo(&self) -> DbAccountRepository<'_> {
        DbAccountRepository { db: &self.db }
    }

    pub fn trip_repo(&self) -> DbTripRepository<'_> {
        DbTripRepository { db: &self.db }
    }

    pub fn role_repo(&self) -> DbRoleRepository<'_> {
        DbRoleRepository { db: &self.db }
    }

    pub fn review_repo(&self) -> DbReviewRepository<'_> {
        DbReviewRepository { db: &self.db }
    }
}
