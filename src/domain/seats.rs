use std::collections::BTreeSet;

use uuid::Uuid;

use crate::domain::types::{Trip, TripStage};
use crate::error::{AppError, AppResult};

/// Seats left on a planned trip. Trips past the planned stage record no
/// capacity and report zero.
pub fn remaining_seats(trip: &Trip) -> i32 {
    trip.seat_count.unwrap_or(0) - trip.passengers.len() as i32
}

pub fn has_available_seat(trip: &Trip) -> bool {
    remaining_seats(trip) > 0
}

/// Attach `user_id` to a planned trip.
///
/// Returns `Ok(false)` when the user was already on board; capacity is only
/// checked for genuinely new passengers.
pub fn add_passenger(trip: &mut Trip, user_id: Uuid) -> AppResult<bool> {
    if trip.passengers.contains(&user_id) {
        return Ok(false);
    }
    ensure_planned(trip)?;
    if !has_available_seat(trip) {
        return Err(AppError::NoSeatAvailable(trip.id));
    }
    trip.passengers.insert(user_id);
    Ok(true)
}

/// Detach `user_id`. Returns `false` when the user was not on board.
pub fn remove_passenger(trip: &mut Trip, user_id: Uuid) -> bool {
    trip.passengers.remove(&user_id)
}

/// Passengers added and removed by [`replace_passengers`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassengerDiff {
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
}

/// Make the passenger set equal to `wanted`.
///
/// Departing passengers leave before new ones are seated, so swapping one
/// rider for another on a full trip succeeds. On error `trip` is unchanged.
pub fn replace_passengers(trip: &mut Trip, wanted: &[Uuid]) -> AppResult<PassengerDiff> {
    let wanted: BTreeSet<Uuid> = wanted.iter().copied().collect();
    let mut next = trip.clone();
    let mut diff = PassengerDiff::default();

    for user_id in trip.passengers.difference(&wanted) {
        remove_passenger(&mut next, *user_id);
        diff.removed.push(*user_id);
    }
    for user_id in wanted.difference(&trip.passengers) {
        add_passenger(&mut next, *user_id)?;
        diff.added.push(*user_id);
    }

    *trip = next;
    Ok(diff)
}

fn ensure_planned(trip: &Trip) -> AppResult<()> {
    if trip.stage != TripStage::Planned {
        return Err(AppError::Validation(
            "Passengers can only join a planned trip".to_string(),
        ));
    }
    Ok(())
}
