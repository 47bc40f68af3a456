use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::policy::RoleKind;

pub use crate::entities::review::ReviewKind;
pub use crate::entities::trip::TripStage;

/// How many entries the "recent" listings return.
pub const RECENT_LIMIT: u64 = 10;

/// The slice of a user the ledger and the access policy care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub role: RoleKind,
    pub credits: i32,
}

/// Outcome of a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: i32,
    pub sender_balance: i32,
    pub receiver_balance: i32,
}

/// Identity resolved from the bearer token by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role_title: String,
    pub role: RoleKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub users_count: u64,
}

/// A user holding a given role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMember {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A trip at any stage. `seat_count` is only set while planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: Uuid,
    pub stage: TripStage,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub price: Option<i32>,
    pub seat_count: Option<i32>,
    pub passengers: BTreeSet<Uuid>,
}

/// Unvalidated input for a new planned trip.
#[derive(Debug, Clone, Default)]
pub struct TripDraft {
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub price: Option<i32>,
    pub seat_count: Option<i32>,
    pub passenger_ids: Vec<Uuid>,
}

/// Partial update of a planned trip. `passenger_ids` replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct TripChanges {
    pub vehicle_id: Option<Uuid>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub price: Option<i32>,
    pub seat_count: Option<i32>,
    pub passenger_ids: Option<Vec<Uuid>>,
}

/// A review as submitted. `trip_id` must name a finished trip.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub kind: ReviewKind,
    pub author_name: String,
    pub rating: Option<i32>,
    pub comment: String,
    pub trip_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub author_name: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilter {
    pub kind: Option<ReviewKind>,
    /// Only reviews carrying a positive rating.
    pub rated_only: bool,
    pub trip_id: Option<Uuid>,
    /// Newest first, at most this many.
    pub limit: Option<u64>,
}
