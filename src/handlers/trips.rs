use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::seats::remaining_seats;
use crate::domain::types::{CurrentUser, Trip, TripChanges, TripDraft, TripStage};
use crate::error::{AppError, AppResult};
use crate::usecase::trips::{
    AdvanceTripUseCase, DeleteTripUseCase, FindTripUseCase, JoinTripUseCase, LeaveTripUseCase,
    ListTripsUseCase, PlanTripUseCase, UpdatePlannedTripUseCase,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TripListQuery {
    pub stage: Option<TripStage>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub price: Option<i32>,
    pub seat_count: Option<i32>,
    #[serde(default)]
    pub passenger_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTripRequest {
    pub vehicle_id: Option<Uuid>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub price: Option<i32>,
    pub seat_count: Option<i32>,
    pub passenger_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinTripRequest {
    /// Defaults to the caller.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
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
    pub remaining_seats: Option<i32>,
    pub passenger_ids: Vec<Uuid>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        let remaining = (trip.stage == TripStage::Planned).then(|| remaining_seats(&trip));
        Self {
            id: trip.id,
            stage: trip.stage,
            driver_id: trip.driver_id,
            vehicle_id: trip.vehicle_id,
            origin: trip.origin,
            destination: trip.destination,
            departure_at: trip.departure_at,
            duration_minutes: trip.duration_minutes,
            price: trip.price,
            seat_count: trip.seat_count,
            remaining_seats: remaining,
            passenger_ids: trip.passengers.into_iter().collect(),
        }
    }
}

// ============ Browsing ============

/// List trips, optionally of one stage
pub async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripListQuery>,
) -> AppResult<Json<Vec<TripResponse>>> {
    let usecase = ListTripsUseCase {
        trips: state.trip_repo(),
    };
    let trips = usecase.execute(query.stage).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

pub async fn get_trip(
    State(state): State<AppState>,
    Path((stage, id)): Path<(TripStage, Uuid)>,
) -> AppResult<Json<TripResponse>> {
    let usecase = FindTripUseCase {
        trips: state.trip_repo(),
    };
    Ok(Json(usecase.execute(stage, id).await?.into()))
}

// ============ Planning ============

pub async fn create_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Json(payload): Json<CreateTripRequest>,
) -> AppResult<Json<TripResponse>> {
    let usecase = PlanTripUseCase {
        trips: state.trip_repo(),
        accounts: state.account_repo(),
    };
    let draft = TripDraft {
        driver_id: payload.driver_id,
        vehicle_id: payload.vehicle_id,
        origin: payload.origin,
        destination: payload.destination,
        departure_at: payload.departure_at,
        duration_minutes: payload.duration_minutes,
        price: payload.price,
        seat_count: payload.seat_count,
        passenger_ids: payload.passenger_ids,
    };

    Ok(Json(usecase.execute(&caller, draft).await?.into()))
}

/// Edit a trip. Only planned trips accept changes.
pub async fn update_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path((stage, id)): Path<(TripStage, Uuid)>,
    Json(payload): Json<UpdateTripRequest>,
) -> AppResult<Json<TripResponse>> {
    if stage != TripStage::Planned {
        return Err(AppError::Validation(
            "Only planned trips can be edited".to_string(),
        ));
    }

    let usecase = UpdatePlannedTripUseCase {
        trips: state.trip_repo(),
        accounts: state.account_repo(),
    };
    let changes = TripChanges {
        vehicle_id: payload.vehicle_id,
        origin: payload.origin,
        destination: payload.destination,
        departure_at: payload.departure_at,
        duration_minutes: payload.duration_minutes,
        price: payload.price,
        seat_count: payload.seat_count,
        passenger_ids: payload.passenger_ids,
    };

    Ok(Json(usecase.execute(&caller, id, changes).await?.into()))
}

pub async fn delete_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path((stage, id)): Path<(TripStage, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    let usecase = DeleteTripUseCase {
        trips: state.trip_repo(),
    };
    usecase.execute(&caller, stage, id).await?;

    Ok(Json(serde_json::json!({"message": "Trip deleted successfully"})))
}

// ============ Passengers ============

/// Book a seat for the caller, or for `user_id` when an admin asks
pub async fn join_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    payload: Option<Json<JoinTripRequest>>,
) -> AppResult<Json<TripResponse>> {
    let passenger_id = payload
        .and_then(|Json(p)| p.user_id)
        .unwrap_or(caller.id);

    let usecase = JoinTripUseCase {
        trips: state.trip_repo(),
        accounts: state.account_repo(),
    };
    Ok(Json(usecase.execute(&caller, id, passenger_id).await?.into()))
}

pub async fn leave_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<TripResponse>> {
    let usecase = LeaveTripUseCase {
        trips: state.trip_repo(),
    };
    Ok(Json(usecase.execute(&caller, id, user_id).await?.into()))
}

// ============ Lifecycle ============

/// Planned → in progress
pub async fn begin_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TripResponse>> {
    let usecase = AdvanceTripUseCase {
        trips: state.trip_repo(),
    };
    Ok(Json(
        usecase.execute(&caller, TripStage::Planned, id).await?.into(),
    ))
}

/// In progress → finished
pub async fn finish_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TripResponse>> {
    let usecase = AdvanceTripUseCase {
        trips: state.trip_repo(),
    };
    Ok(Json(
        usecase.execute(&caller, TripStage::InProgress, id).await?.into(),
    ))
}
