use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{trip, vehicle};
use crate::error::{AppError, AppResult};
use crate::handlers::trips::TripResponse;
use crate::usecase::trips::ListVehicleTripsUseCase;
use crate::AppState;

/// Largest accepted vehicle picture.
const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub seat_count: i32,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub pets_allowed: bool,
    pub registered_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub seat_count: Option<i32>,
    pub smoker: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub registered_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct BrandQuery {
    pub brand: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeatRangeQuery {
    pub min_seats: Option<i32>,
    pub max_seats: Option<i32>,
}

pub async fn list_vehicles(State(state): State<AppState>) -> AppResult<Json<Vec<vehicle::Model>>> {
    let vehicles = vehicle::Entity::find()
        .order_by_asc(vehicle::Column::Plate)
        .all(state.db())
        .await?;
    Ok(Json(vehicles))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<vehicle::Model>> {
    Ok(Json(find_vehicle(&state, id).await?))
}

// ============ Search ============

pub async fn search_by_brand(
    State(state): State<AppState>,
    Query(query): Query<BrandQuery>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let brand = query
        .brand
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("brand is required".to_string()))?;

    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::Brand.eq(brand))
        .order_by_asc(vehicle::Column::Plate)
        .all(state.db())
        .await?;
    Ok(Json(vehicles))
}

/// Vehicles whose seat count falls in an inclusive range; either bound may be omitted
pub async fn search_by_seats(
    State(state): State<AppState>,
    Query(query): Query<SeatRangeQuery>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let vehicles = vehicle::Entity::find()
        .filter(seat_range(query.min_seats, query.max_seats)?)
        .order_by_asc(vehicle::Column::SeatCount)
        .all(state.db())
        .await?;
    Ok(Json(vehicles))
}

/// Every trip driven with the vehicle, whatever its stage
pub async fn list_vehicle_trips(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<TripResponse>>> {
    let usecase = ListVehicleTripsUseCase {
        trips: state.trip_repo(),
    };
    let trips = usecase.execute(id).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

// ============ Management ============

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    let plate = normalize_plate(&payload.plate)?;
    ensure_plate_free(&state, &plate, None).await?;
    validate_seats(payload.seat_count)?;

    let created = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        plate: Set(plate),
        brand: Set(payload.brand.trim().to_string()),
        model: Set(payload.model.trim().to_string()),
        color: Set(payload.color.trim().to_string()),
        seat_count: Set(payload.seat_count),
        smoker: Set(payload.smoker),
        pets_allowed: Set(payload.pets_allowed),
        registered_on: Set(payload.registered_on),
        image: Set(None),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!(vehicle_id = %created.id, plate = %created.plate, "Vehicle registered");
    Ok(Json(created))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    let existing = find_vehicle(&state, id).await?;
    let mut active: vehicle::ActiveModel = existing.into();

    if let Some(plate) = payload.plate {
        let plate = normalize_plate(&plate)?;
        ensure_plate_free(&state, &plate, Some(id)).await?;
        active.plate = Set(plate);
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(brand.trim().to_string());
    }
    if let Some(model) = payload.model {
        active.model = Set(model.trim().to_string());
    }
    if let Some(color) = payload.color {
        active.color = Set(color.trim().to_string());
    }
    if let Some(seat_count) = payload.seat_count {
        validate_seats(seat_count)?;
        active.seat_count = Set(seat_count);
    }
    if let Some(smoker) = payload.smoker {
        active.smoker = Set(smoker);
    }
    if let Some(pets_allowed) = payload.pets_allowed {
        active.pets_allowed = Set(pets_allowed);
    }
    if let Some(registered_on) = payload.registered_on {
        active.registered_on = Set(registered_on);
    }

    Ok(Json(active.update(state.db()).await?))
}

/// Refused while any trip still uses the vehicle
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    find_vehicle(&state, id).await?;

    let trips = trip::Entity::find()
        .filter(trip::Column::VehicleId.eq(id))
        .count(state.db())
        .await?;
    if trips > 0 {
        return Err(AppError::Conflict(format!(
            "Vehicle is used by {} trip(s)",
            trips
        )));
    }

    vehicle::Entity::delete_by_id(id).exec(state.db()).await?;
    Ok(Json(serde_json::json!({"message": "Vehicle deleted successfully"})))
}

// ============ Image ============

pub async fn get_vehicle_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let image = find_vehicle(&state, id)
        .await?
        .image
        .ok_or_else(|| AppError::NotFound("Vehicle has no image".to_string()))?;

    Ok(([(header::CONTENT_TYPE, sniff_image_type(&image))], image))
}

/// Replace the picture with the raw request body
pub async fn put_vehicle_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    if body.is_empty() {
        return Err(AppError::Validation("Image body is empty".to_string()));
    }
    if body.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "Image exceeds {} bytes",
            MAX_IMAGE_BYTES
        )));
    }

    let existing = find_vehicle(&state, id).await?;
    let mut active: vehicle::ActiveModel = existing.into();
    active.image = Set(Some(body.to_vec()));
    active.update(state.db()).await?;

    Ok(Json(serde_json::json!({"message": "Image updated successfully"})))
}

async fn find_vehicle(state: &AppState, id: Uuid) -> AppResult<vehicle::Model> {
    vehicle::Entity::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found", id)))
}

async fn ensure_plate_free(state: &AppState, plate: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut query = vehicle::Entity::find().filter(vehicle::Column::Plate.eq(plate));
    if let Some(id) = except {
        query = query.filter(vehicle::Column::Id.ne(id));
    }
    if query.one(state.db()).await?.is_some() {
        return Err(AppError::Conflict(format!("Plate {} already registered", plate)));
    }
    Ok(())
}

fn normalize_plate(plate: &str) -> AppResult<String> {
    let plate = plate.trim().to_uppercase();
    if plate.is_empty() {
        return Err(AppError::Validation("plate is required".to_string()));
    }
    Ok(plate)
}

fn validate_seats(seats: i32) -> AppResult<()> {
    if seats <= 0 {
        return Err(AppError::Validation(
            "seat_count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn seat_range(min: Option<i32>, max: Option<i32>) -> AppResult<Condition> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::Validation(
                "min_seats cannot exceed max_seats".to_string(),
            ));
        }
    }
    Ok(Condition::all()
        .add_option(min.map(|m| vehicle::Column::SeatCount.gte(m)))
        .add_option(max.map(|m| vehicle::Column::SeatCount.lte(m))))
}

fn sniff_image_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}
