use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::repository::TripRepository;
use crate::domain::types::{Trip, TripChanges, TripStage};
use crate::domain::{lifecycle, seats};
use crate::entities::{trip, trip_passenger, vehicle};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct DbTripRepository<'a> {
    pub db: &'a DatabaseConnection,
}

impl TripRepository for DbTripRepository<'_> {
    async fn find_trip(&self, stage: TripStage, id: Uuid) -> AppResult<Option<Trip>> {
        load_trip(self.db, stage, id, false).await
    }

    async fn list_trips(&self, stage: Option<TripStage>) -> AppResult<Vec<Trip>> {
        let condition = Condition::all().add_option(stage.map(|s| trip::Column::Stage.eq(s)));
        list_where(self.db, condition).await
    }

    async fn list_vehicle_trips(&self, vehicle_id: Uuid) -> AppResult<Vec<Trip>> {
        let condition = Condition::all().add(trip::Column::VehicleId.eq(vehicle_id));
        list_where(self.db, condition).await
    }

    async fn insert_planned(&self, trip: &Trip) -> AppResult<()> {
        let trip = trip.clone();
        self.db
            .transaction::<_, (), AppError>(|txn| {
                Box::pin(async move {
                    insert_trip(txn, &trip).await?;
                    sync_passengers(txn, trip.id, &BTreeSet::new(), &trip.passengers).await
                })
            })
            .await?;
        Ok(())
    }

    async fn update_planned(&self, id: Uuid, changes: TripChanges) -> AppResult<Trip> {
        let updated = self
            .db
            .transaction::<_, Trip, AppError>(|txn| {
                Box::pin(async move {
                    let current = load_trip(txn, TripStage::Planned, id, true)
                        .await?
                        .ok_or_else(|| not_found(TripStage::Planned, id))?;
                    let next = lifecycle::apply_changes(&current, changes)?;

                    trip::ActiveModel {
                        id: Set(next.id),
                        vehicle_id: Set(next.vehicle_id),
                        origin: Set(next.origin.clone()),
                        destination: Set(next.destination.clone()),
                        departure_at: Set(next.departure_at.into()),
                        duration_minutes: Set(next.duration_minutes),
                        price: Set(next.price),
                        seat_count: Set(next.seat_count),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    sync_passengers(txn, id, &current.passengers, &next.passengers).await?;

                    Ok(next)
                })
            })
            .await?;
        Ok(updated)
    }

    async fn add_passenger(&self, trip_id: Uuid, user_id: Uuid) -> AppResult<Trip> {
        let trip = self
            .db
            .transaction::<_, Trip, AppError>(|txn| {
                Box::pin(async move {
                    let mut trip = load_trip(txn, TripStage::Planned, trip_id, true)
                        .await?
                        .ok_or_else(|| not_found(TripStage::Planned, trip_id))?;

                    if seats::add_passenger(&mut trip, user_id)? {
                        insert_passenger(txn, trip_id, user_id).await?;
                    }
                    Ok(trip)
                })
            })
            .await?;
        Ok(trip)
    }

    async fn remove_passenger(&self, trip_id: Uuid, user_id: Uuid) -> AppResult<Trip> {
        let trip = self
            .db
            .transaction::<_, Trip, AppError>(|txn| {
                Box::pin(async move {
                    let mut trip = load_trip(txn, TripStage::Planned, trip_id, true)
                        .await?
                        .ok_or_else(|| not_found(TripStage::Planned, trip_id))?;

                    if seats::remove_passenger(&mut trip, user_id) {
                        trip_passenger::Entity::delete_many()
                            .filter(trip_passenger::Column::TripId.eq(trip_id))
                            .filter(trip_passenger::Column::UserId.eq(user_id))
                            .exec(txn)
                            .await?;
                    }
                    Ok(trip)
                })
            })
            .await?;
        Ok(trip)
    }

    async fn advance(&self, stage: TripStage, id: Uuid) -> AppResult<Trip> {
        let next = self
            .db
            .transaction::<_, Trip, AppError>(|txn| {
                Box::pin(async move {
                    let current = load_trip(txn, stage, id, true)
                        .await?
                        .ok_or_else(|| not_found(stage, id))?;
                    let next = lifecycle::advance(&current, Uuid::new_v4())?;

                    insert_trip(txn, &next).await?;
                    sync_passengers(txn, next.id, &BTreeSet::new(), &next.passengers).await?;
                    // Passenger rows of the retired record go with it
                    trip::Entity::delete_by_id(current.id).exec(txn).await?;

                    Ok(next)
                })
            })
            .await?;
        Ok(next)
    }

    async fn delete_trip(&self, stage: TripStage, id: Uuid) -> AppResult<bool> {
        let result = trip::Entity::delete_many()
            .filter(trip::Column::Id.eq(id))
            .filter(trip::Column::Stage.eq(stage))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn vehicle_exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(vehicle::Entity::find_by_id(id)
            .select_only()
            .column(vehicle::Column::Id)
            .into_tuple::<Uuid>()
            .one(self.db)
            .await?
            .is_some())
    }
}

/// Trips matching `condition` by departure, each with its passenger set.
async fn list_where<C: ConnectionTrait>(conn: &C, condition: Condition) -> AppResult<Vec<Trip>> {
    let trips = trip::Entity::find()
        .filter(condition)
        .order_by_asc(trip::Column::DepartureAt)
        .all(conn)
        .await?;

    let ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
    let mut passengers: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
    if !ids.is_empty() {
        for row in trip_passenger::Entity::find()
            .filter(trip_passenger::Column::TripId.is_in(ids))
            .all(conn)
            .await?
        {
            passengers.entry(row.trip_id).or_default().insert(row.user_id);
        }
    }

    Ok(trips
        .into_iter()
        .map(|t| {
            let riders = passengers.remove(&t.id).unwrap_or_default();
            trip_from_model(t, riders)
        })
        .collect())
}

async fn load_trip<C: ConnectionTrait>(
    conn: &C,
    stage: TripStage,
    id: Uuid,
    lock: bool,
) -> AppResult<Option<Trip>> {
    let mut query = trip::Entity::find_by_id(id).filter(trip::Column::Stage.eq(stage));
    if lock {
        query = query.lock_exclusive();
    }
    let Some(model) = query.one(conn).await? else {
        return Ok(None);
    };

    let passengers = trip_passenger::Entity::find()
        .filter(trip_passenger::Column::TripId.eq(id))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| p.user_id)
        .collect();

    Ok(Some(trip_from_model(model, passengers)))
}

async fn insert_trip<C: ConnectionTrait>(conn: &C, trip: &Trip) -> AppResult<()> {
    trip::ActiveModel {
        id: Set(trip.id),
        stage: Set(trip.stage),
        driver_id: Set(trip.driver_id),
        vehicle_id: Set(trip.vehicle_id),
        origin: Set(trip.origin.clone()),
        destination: Set(trip.destination.clone()),
        departure_at: Set(trip.departure_at.into()),
        duration_minutes: Set(trip.duration_minutes),
        price: Set(trip.price),
        seat_count: Set(trip.seat_count),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

async fn insert_passenger<C: ConnectionTrait>(conn: &C, trip_id: Uuid, user_id: Uuid) -> AppResult<()> {
    trip_passenger::ActiveModel {
        trip_id: Set(trip_id),
        user_id: Set(user_id),
        joined_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Bring the join table from `before` to `after` for one trip.
async fn sync_passengers<C: ConnectionTrait>(
    conn: &C,
    trip_id: Uuid,
    before: &BTreeSet<Uuid>,
    after: &BTreeSet<Uuid>,
) -> AppResult<()> {
    let removed: Vec<Uuid> = before.difference(after).copied().collect();
    if !removed.is_empty() {
        trip_passenger::Entity::delete_many()
            .filter(trip_passenger::Column::TripId.eq(trip_id))
            .filter(trip_passenger::Column::UserId.is_in(removed))
            .exec(conn)
            .await?;
    }
    for user_id in after.difference(before) {
        insert_passenger(conn, trip_id, *user_id).await?;
    }
    Ok(())
}

fn trip_from_model(model: trip::Model, passengers: BTreeSet<Uuid>) -> Trip {
    Trip {
        id: model.id,
        stage: model.stage,
        driver_id: model.driver_id,
        vehicle_id: model.vehicle_id,
        origin: model.origin,
        destination: model.destination,
        departure_at: model.departure_at.with_timezone(&Utc),
        duration_minutes: model.duration_minutes,
        price: model.price,
        seat_count: model.seat_count,
        passengers,
    }
}

fn not_found(stage: TripStage, id: Uuid) -> AppError {
    AppError::NotFound(format!("No {:?} trip with id {}", stage, id))
}
