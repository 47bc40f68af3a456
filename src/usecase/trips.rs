use uuid::Uuid;

use crate::domain::lifecycle;
use crate::domain::policy::{can_manage_trip, can_ride_as, ensure};
use crate::domain::repository::{AccountRepository, TripRepository};
use crate::domain::types::{CurrentUser, Trip, TripChanges, TripDraft, TripStage};
use crate::error::{AppError, AppResult};

// ── FindTrip ─────────────────────────────────────────────────────────────────

pub struct FindTripUseCase<T: TripRepository> {
    pub trips: T,
}

impl<T: TripRepository> FindTripUseCase<T> {
    pub async fn execute(&self, stage: TripStage, id: Uuid) -> AppResult<Trip> {
        find_trip(&self.trips, stage, id).await
    }
}

// ── ListTrips ────────────────────────────────────────────────────────────────

pub struct ListTripsUseCase<T: TripRepository> {
    pub trips: T,
}

impl<T: TripRepository> ListTripsUseCase<T> {
    pub async fn execute(&self, stage: Option<TripStage>) -> AppResult<Vec<Trip>> {
        self.trips.list_trips(stage).await
    }
}

// ── ListVehicleTrips ─────────────────────────────────────────────────────────

pub struct ListVehicleTripsUseCase<T: TripRepository> {
    pub trips: T,
}

impl<T: TripRepository> ListVehicleTripsUseCase<T> {
    pub async fn execute(&self, vehicle_id: Uuid) -> AppResult<Vec<Trip>> {
        if !self.trips.vehicle_exists(vehicle_id).await? {
            return Err(AppError::NotFound(format!(
                "Vehicle {} not found",
                vehicle_id
            )));
        }
        self.trips.list_vehicle_trips(vehicle_id).await
    }
}

// ── PlanTrip ─────────────────────────────────────────────────────────────────

pub struct PlanTripUseCase<T: TripRepository, A: AccountRepository> {
    pub trips: T,
    pub accounts: A,
}

impl<T: TripRepository, A: AccountRepository> PlanTripUseCase<T, A> {
    /// The caller drives unless the draft names someone else.
    pub async fn execute(&self, caller: &CurrentUser, mut draft: TripDraft) -> AppResult<Trip> {
        draft.driver_id.get_or_insert(caller.id);

        let trip = lifecycle::plan(Uuid::new_v4(), draft)?;
        ensure(
            can_manage_trip(caller, &trip),
            "You can only plan trips you drive",
        )?;

        ensure_user_exists(&self.accounts, trip.driver_id).await?;
        ensure_vehicle_exists(&self.trips, trip.vehicle_id).await?;
        for passenger_id in &trip.passengers {
            ensure_user_exists(&self.accounts, *passenger_id).await?;
        }

        self.trips.insert_planned(&trip).await?;

        tracing::info!(
            trip_id = %trip.id,
            driver_id = %trip.driver_id,
            seats = ?trip.seat_count,
            passengers = trip.passengers.len(),
            "Trip planned"
        );
        Ok(trip)
    }
}

// ── UpdatePlannedTrip ────────────────────────────────────────────────────────

pub struct UpdatePlannedTripUseCase<T: TripRepository, A: AccountRepository> {
    pub trips: T,
    pub accounts: A,
}

impl<T: TripRepository, A: AccountRepository> UpdatePlannedTripUseCase<T, A> {
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        id: Uuid,
        changes: TripChanges,
    ) -> AppResult<Trip> {
        let trip = find_trip(&self.trips, TripStage::Planned, id).await?;
        ensure(
            can_manage_trip(caller, &trip),
            "Only the driver can edit this trip",
        )?;

        if let Some(vehicle_id) = changes.vehicle_id {
            ensure_vehicle_exists(&self.trips, vehicle_id).await?;
        }
        if let Some(passenger_ids) = &changes.passenger_ids {
            for passenger_id in passenger_ids {
                ensure_user_exists(&self.accounts, *passenger_id).await?;
            }
        }

        let updated = self.trips.update_planned(id, changes).await?;
        tracing::info!(trip_id = %id, by = %caller.id, "Planned trip updated");
        Ok(updated)
    }
}

// ── JoinTrip ─────────────────────────────────────────────────────────────────

pub struct JoinTripUseCase<T: TripRepository, A: AccountRepository> {
    pub trips: T,
    pub accounts: A,
}

impl<T: TripRepository, A: AccountRepository> JoinTripUseCase<T, A> {
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        trip_id: Uuid,
        passenger_id: Uuid,
    ) -> AppResult<Trip> {
        ensure(
            can_ride_as(caller, passenger_id),
            "You can only book a seat for yourself",
        )?;
        ensure_user_exists(&self.accounts, passenger_id).await?;

        let trip = self
            .trips
            .add_passenger(trip_id, passenger_id)
            .await
            .inspect_err(|e| {
                if matches!(e, AppError::NoSeatAvailable(_)) {
                    tracing::warn!(trip_id = %trip_id, passenger_id = %passenger_id, "Trip is full");
                }
            })?;

        tracing::info!(trip_id = %trip_id, passenger_id = %passenger_id, "Passenger joined");
        Ok(trip)
    }
}

// ── LeaveTrip ────────────────────────────────────────────────────────────────

pub struct LeaveTripUseCase<T: TripRepository> {
    pub trips: T,
}

impl<T: TripRepository> LeaveTripUseCase<T> {
    /// Passengers leave on their own; the driver may also drop them.
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        trip_id: Uuid,
        passenger_id: Uuid,
    ) -> AppResult<Trip> {
        let trip = find_trip(&self.trips, TripStage::Planned, trip_id).await?;
        ensure(
            can_ride_as(caller, passenger_id) || can_manage_trip(caller, &trip),
            "You can only cancel your own seat",
        )?;

        let trip = self.trips.remove_passenger(trip_id, passenger_id).await?;
        tracing::info!(trip_id = %trip_id, passenger_id = %passenger_id, "Passenger left");
        Ok(trip)
    }
}

// ── AdvanceTrip ──────────────────────────────────────────────────────────────

/// Begin a planned trip or finish one in progress.
pub struct AdvanceTripUseCase<T: TripRepository> {
    pub trips: T,
}

impl<T: TripRepository> AdvanceTripUseCase<T> {
    pub async fn execute(&self, caller: &CurrentUser, stage: TripStage, id: Uuid) -> AppResult<Trip> {
        let trip = find_trip(&self.trips, stage, id).await?;
        ensure(
            can_manage_trip(caller, &trip),
            "Only the driver can move this trip forward",
        )?;

        let next = self.trips.advance(stage, id).await?;
        tracing::info!(
            from_id = %id,
            to_id = %next.id,
            from = ?stage,
            to = ?next.stage,
            "Trip advanced"
        );
        Ok(next)
    }
}

// ── DeleteTrip ───────────────────────────────────────────────────────────────

pub struct DeleteTripUseCase<T: TripRepository> {
    pub trips: T,
}

impl<T: TripRepository> DeleteTripUseCase<T> {
    pub async fn execute(&self, caller: &CurrentUser, stage: TripStage, id: Uuid) -> AppResult<()> {
        let trip = find_trip(&self.trips, stage, id).await?;
        ensure(
            can_manage_trip(caller, &trip),
            "Only the driver can delete this trip",
        )?;

        if !self.trips.delete_trip(stage, id).await? {
            return Err(not_found(stage, id));
        }
        tracing::info!(trip_id = %id, stage = ?stage, by = %caller.id, "Trip deleted");
        Ok(())
    }
}

pub(crate) async fn find_trip<T: TripRepository>(
    trips: &T,
    stage: TripStage,
    id: Uuid,
) -> AppResult<Trip> {
    trips
        .find_trip(stage, id)
        .await?
        .ok_or_else(|| not_found(stage, id))
}

fn not_found(stage: TripStage, id: Uuid) -> AppError {
    let label = match stage {
        TripStage::Planned => "Planned trip",
        TripStage::InProgress => "Trip in progress",
        TripStage::Finished => "Finished trip",
    };
    AppError::NotFound(format!("{} {} not found", label, id))
}

async fn ensure_user_exists<A: AccountRepository>(accounts: &A, id: Uuid) -> AppResult<()> {
    match accounts.find_account(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}

async fn ensure_vehicle_exists<T: TripRepository>(trips: &T, id: Uuid) -> AppResult<()> {
    if trips.vehicle_exists(id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Vehicle {} not found", id)))
    }
}
