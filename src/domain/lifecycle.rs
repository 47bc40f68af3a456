use std::collections::BTreeSet;

use uuid::Uuid;

use crate::domain::seats;
use crate::domain::types::{Trip, TripChanges, TripDraft, TripStage};
use crate::error::{AppError, AppResult};

/// The stage a trip moves to next, if any.
pub fn next_stage(stage: TripStage) -> Option<TripStage> {
    match stage {
        TripStage::Planned => Some(TripStage::InProgress),
        TripStage::InProgress => Some(TripStage::Finished),
        TripStage::Finished => None,
    }
}

/// Validate a draft into a new planned trip.
pub fn plan(id: Uuid, draft: TripDraft) -> AppResult<Trip> {
    let mut missing = Vec::new();
    if draft.driver_id.is_none() {
        missing.push("driver_id");
    }
    if draft.vehicle_id.is_none() {
        missing.push("vehicle_id");
    }
    if is_blank(draft.origin.as_deref()) {
        missing.push("origin");
    }
    if is_blank(draft.destination.as_deref()) {
        missing.push("destination");
    }
    if draft.departure_at.is_none() {
        missing.push("departure_at");
    }
    if draft.duration_minutes.is_none() {
        missing.push("duration_minutes");
    }
    if draft.price.is_none() {
        missing.push("price");
    }
    if draft.seat_count.is_none() {
        missing.push("seat_count");
    }
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }

    let (
        Some(driver_id),
        Some(vehicle_id),
        Some(origin),
        Some(destination),
        Some(departure_at),
        Some(duration_minutes),
        Some(price),
        Some(seat_count),
    ) = (
        draft.driver_id,
        draft.vehicle_id,
        draft.origin,
        draft.destination,
        draft.departure_at,
        draft.duration_minutes,
        draft.price,
        draft.seat_count,
    )
    else {
        return Err(AppError::Validation("Incomplete trip".to_string()));
    };

    validate_duration(duration_minutes)?;
    validate_price(price)?;
    validate_seat_count(seat_count)?;

    let mut trip = Trip {
        id,
        stage: TripStage::Planned,
        driver_id,
        vehicle_id,
        origin: origin.trim().to_string(),
        destination: destination.trim().to_string(),
        departure_at,
        duration_minutes,
        price: Some(price),
        seat_count: Some(seat_count),
        passengers: BTreeSet::new(),
    };
    seats::replace_passengers(&mut trip, &draft.passenger_ids)?;

    Ok(trip)
}

/// Apply a partial update to a planned trip. The seat limit holds on
/// the returned trip or the update is refused.
pub fn apply_changes(trip: &Trip, changes: TripChanges) -> AppResult<Trip> {
    if trip.stage != TripStage::Planned {
        return Err(AppError::Validation(
            "Only planned trips can be edited".to_string(),
        ));
    }

    let mut next = trip.clone();
    if let Some(vehicle_id) = changes.vehicle_id {
        next.vehicle_id = vehicle_id;
    }
    if let Some(origin) = changes.origin {
        if is_blank(Some(&origin)) {
            return Err(missing_fields(&["origin"]));
        }
        next.origin = origin.trim().to_string();
    }
    if let Some(destination) = changes.destination {
        if is_blank(Some(&destination)) {
            return Err(missing_fields(&["destination"]));
        }
        next.destination = destination.trim().to_string();
    }
    if let Some(departure_at) = changes.departure_at {
        next.departure_at = departure_at;
    }
    if let Some(duration) = changes.duration_minutes {
        validate_duration(duration)?;
        next.duration_minutes = duration;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
        next.price = Some(price);
    }
    if let Some(seat_count) = changes.seat_count {
        validate_seat_count(seat_count)?;
        next.seat_count = Some(seat_count);
    }
    if let Some(passenger_ids) = changes.passenger_ids {
        seats::replace_passengers(&mut next, &passenger_ids)?;
    }
    if seats::remaining_seats(&next) < 0 {
        return Err(AppError::Validation(format!(
            "Seat count cannot drop below the {} passengers already on board",
            next.passengers.len()
        )));
    }

    Ok(next)
}

/// Planned → in progress. The returned trip carries a fresh id; the caller
/// retires the planned record in the same transaction.
pub fn begin(planned: &Trip, new_id: Uuid) -> AppResult<Trip> {
    expect_stage(planned, TripStage::Planned)?;

    let mut missing = Vec::new();
    if is_blank(Some(&planned.origin)) {
        missing.push("origin");
    }
    if is_blank(Some(&planned.destination)) {
        missing.push("destination");
    }
    if planned.duration_minutes <= 0 {
        missing.push("duration_minutes");
    }
    if planned.price.is_none() {
        missing.push("price");
    }
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }

    Ok(Trip {
        id: new_id,
        stage: TripStage::InProgress,
        seat_count: None,
        ..planned.clone()
    })
}

/// In progress → finished. Price and passengers carry over; no credits move.
pub fn finish(in_progress: &Trip, new_id: Uuid) -> AppResult<Trip> {
    expect_stage(in_progress, TripStage::InProgress)?;

    Ok(Trip {
        id: new_id,
        stage: TripStage::Finished,
        seat_count: None,
        ..in_progress.clone()
    })
}

/// Move a trip one stage forward.
pub fn advance(trip: &Trip, new_id: Uuid) -> AppResult<Trip> {
    match next_stage(trip.stage) {
        Some(TripStage::InProgress) => begin(trip, new_id),
        Some(TripStage::Finished) => finish(trip, new_id),
        _ => Err(AppError::Validation(
            "A finished trip cannot move further".to_string(),
        )),
    }
}

fn expect_stage(trip: &Trip, stage: TripStage) -> AppResult<()> {
    if trip.stage != stage {
        return Err(AppError::Validation(format!(
            "Trip {} is {:?}, expected {:?}",
            trip.id, trip.stage, stage
        )));
    }
    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn missing_fields(fields: &[&str]) -> AppError {
    AppError::Validation(format!(
        "The following fields are required: {}",
        fields.join(", ")
    ))
}

fn validate_duration(minutes: i32) -> AppResult<()> {
    if minutes <= 0 {
        return Err(AppError::Validation(
            "duration_minutes must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: i32) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::Validation("price cannot be negative".to_string()));
    }
    Ok(())
}

fn validate_seat_count(seats: i32) -> AppResult<()> {
    if seats <= 0 {
        return Err(AppError::Validation(
            "seat_count must be at least 1".to_string(),
        ));
    }
    Ok(())
}
