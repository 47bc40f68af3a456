#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    Account, NewReview, ReviewChanges, ReviewFilter, RoleMember, RoleRecord, TransferReceipt,
    Trip, TripChanges, TripStage,
};
use crate::entities::review;
use crate::error::AppResult;

/// Credit balances. Mutations are atomic: implementations lock the touched
/// rows, apply [`crate::domain::ledger`] to them and commit, or change nothing.
pub trait AccountRepository: Send + Sync {
    async fn find_account(&self, id: Uuid) -> AppResult<Option<Account>>;

    async fn set_balance(&self, id: Uuid, new_balance: i32) -> AppResult<Account>;

    async fn transfer(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        amount: i32,
    ) -> AppResult<TransferReceipt>;
}

/// Trips of every stage. Every mutating call runs in one transaction with the
/// trip row locked, so seat checks always see the latest passenger count.
pub trait TripRepository: Send + Sync {
    async fn find_trip(&self, stage: TripStage, id: Uuid) -> AppResult<Option<Trip>>;

    async fn list_trips(&self, stage: Option<TripStage>) -> AppResult<Vec<Trip>>;

    /// Trips of any stage driven with this vehicle.
    async fn list_vehicle_trips(&self, vehicle_id: Uuid) -> AppResult<Vec<Trip>>;

    async fn insert_planned(&self, trip: &Trip) -> AppResult<()>;

    async fn update_planned(&self, id: Uuid, changes: TripChanges) -> AppResult<Trip>;

    async fn add_passenger(&self, trip_id: Uuid, user_id: Uuid) -> AppResult<Trip>;

    async fn remove_passenger(&self, trip_id: Uuid, user_id: Uuid) -> AppResult<Trip>;

    /// Migrate the trip to its next stage under a fresh id and delete the old
    /// record. Readers see the trip in exactly one stage at any time.
    async fn advance(&self, stage: TripStage, id: Uuid) -> AppResult<Trip>;

    /// Returns `false` when no trip of that stage has this id.
    async fn delete_trip(&self, stage: TripStage, id: Uuid) -> AppResult<bool>;

    async fn vehicle_exists(&self, id: Uuid) -> AppResult<bool>;
}

/// Roles and user-role assignments.
pub trait RoleRepository: Send + Sync {
    async fn find_role(&self, id: i32) -> AppResult<Option<RoleRecord>>;

    async fn find_role_by_title(&self, title: &str) -> AppResult<Option<RoleRecord>>;

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>>;

    async fn list_role_members(&self, id: i32) -> AppResult<Vec<RoleMember>>;

    async fn create_role(&self, title: &str, description: Option<&str>) -> AppResult<RoleRecord>;

    async fn update_role(
        &self,
        id: i32,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<RoleRecord>;

    /// Fails with `RoleInUse` while any user still references the role.
    async fn delete_role(&self, id: i32) -> AppResult<()>;

    /// Returns `false` when the user does not exist.
    async fn assign_role(&self, user_id: Uuid, role_id: i32) -> AppResult<bool>;
}

/// Feedback and validation reviews.
pub trait ReviewRepository: Send + Sync {
    async fn list_reviews(&self, filter: ReviewFilter) -> AppResult<Vec<review::Model>>;

    async fn find_review(&self, id: Uuid) -> AppResult<Option<review::Model>>;

    async fn create_review(&self, review: NewReview) -> AppResult<review::Model>;

    /// Returns `None` when no review has this id.
    async fn update_review(
        &self,
        id: Uuid,
        changes: ReviewChanges,
    ) -> AppResult<Option<review::Model>>;

    async fn delete_review(&self, id: Uuid) -> AppResult<bool>;
}
