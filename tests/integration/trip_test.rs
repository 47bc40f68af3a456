use uuid::Uuid;

use carpool_backend::domain::policy::RoleKind;
use carpool_backend::domain::types::{TripChanges, TripStage};
use carpool_backend::error::AppError;
use carpool_backend::usecase::trips::{
    AdvanceTripUseCase, DeleteTripUseCase, FindTripUseCase, JoinTripUseCase, LeaveTripUseCase,
    ListTripsUseCase, ListVehicleTripsUseCase, PlanTripUseCase, UpdatePlannedTripUseCase,
};

use crate::helpers::{MockAccountRepo, MockTripRepo, account, caller, draft, riders};

struct World {
    trips: MockTripRepo,
    accounts: MockAccountRepo,
    driver: Uuid,
    vehicle: Uuid,
    riders: Vec<Uuid>,
}

/// One driver, one vehicle and five would-be passengers.
fn world() -> World {
    let driver = account(100, RoleKind::Standard);
    let passengers: Vec<_> = (0..5).map(|_| account(100, RoleKind::Standard)).collect();
    let vehicle = Uuid::new_v4();

    let mut all = vec![driver.clone()];
    all.extend(passengers.iter().cloned());

    World {
        trips: MockTripRepo::new(vec![vehicle]),
        accounts: MockAccountRepo::new(all),
        driver: driver.id,
        vehicle,
        riders: passengers.iter().map(|p| p.id).collect(),
    }
}

async fn plan(w: &World, seats: i32) -> Uuid {
    let usecase = PlanTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    };
    usecase
        .execute(
            &caller(w.driver, RoleKind::Standard),
            draft(w.driver, w.vehicle, seats),
        )
        .await
        .unwrap()
        .id
}

async fn join(w: &World, trip_id: Uuid, rider: Uuid) -> Result<usize, AppError> {
    let usecase = JoinTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    };
    usecase
        .execute(&caller(rider, RoleKind::Standard), trip_id, rider)
        .await
        .map(|t| t.passengers.len())
}

// ── PlanTripUseCase ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_plan_trip_driven_by_caller() {
    let w = world();
    let trip_id = plan(&w, 3).await;

    let found = FindTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(TripStage::Planned, trip_id)
    .await
    .unwrap();

    assert_eq!(found.driver_id, w.driver);
    assert_eq!(found.seat_count, Some(3));
    assert!(found.passengers.is_empty());
}

#[tokio::test]
async fn should_reject_unknown_vehicle() {
    let w = world();
    let usecase = PlanTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    };

    let result = usecase
        .execute(
            &caller(w.driver, RoleKind::Standard),
            draft(w.driver, Uuid::new_v4(), 3),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(m)) if m.contains("Vehicle")));
    assert_eq!(w.trips.count(), 0);
}

#[tokio::test]
async fn should_reject_unknown_passenger() {
    let w = world();
    let usecase = PlanTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    };
    let mut d = draft(w.driver, w.vehicle, 3);
    d.passenger_ids = vec![w.riders[0], Uuid::new_v4()];

    let result = usecase
        .execute(&caller(w.driver, RoleKind::Standard), d)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(w.trips.count(), 0);
}

#[tokio::test]
async fn should_forbid_planning_for_another_driver() {
    let w = world();
    let usecase = PlanTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    };

    let result = usecase
        .execute(
            &caller(w.riders[0], RoleKind::Standard),
            draft(w.driver, w.vehicle, 3),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

// ── ListVehicleTripsUseCase ──────────────────────────────────────────────────

#[tokio::test]
async fn should_list_trips_of_one_vehicle_across_stages() {
    let w = world();
    let first = plan(&w, 2).await;
    let second = plan(&w, 3).await;
    AdvanceTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(&caller(w.driver, RoleKind::Standard), TripStage::Planned, first)
    .await
    .unwrap();

    let usecase = ListVehicleTripsUseCase {
        trips: w.trips.clone(),
    };
    let trips = usecase.execute(w.vehicle).await.unwrap();

    assert_eq!(trips.len(), 2);
    assert!(trips.iter().all(|t| t.vehicle_id == w.vehicle));
    assert!(trips.iter().any(|t| t.stage == TripStage::InProgress));
    assert!(trips.iter().any(|t| t.id == second));
}

#[tokio::test]
async fn should_refuse_trips_of_unknown_vehicle() {
    let w = world();
    plan(&w, 2).await;
    let usecase = ListVehicleTripsUseCase {
        trips: w.trips.clone(),
    };

    assert!(matches!(
        usecase.execute(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

// ── JoinTripUseCase / LeaveTripUseCase ───────────────────────────────────────

#[tokio::test]
async fn should_refuse_fifth_passenger_on_four_seat_trip() {
    let w = world();
    let trip_id = plan(&w, 4).await;

    for (i, rider) in w.riders.iter().take(4).enumerate() {
        assert_eq!(join(&w, trip_id, *rider).await.unwrap(), i + 1);
    }
    let result = join(&w, trip_id, w.riders[4]).await;

    assert!(
        matches!(result, Err(AppError::NoSeatAvailable(id)) if id == trip_id),
        "expected NoSeatAvailable, got {result:?}"
    );
    let trip = FindTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(TripStage::Planned, trip_id)
    .await
    .unwrap();
    assert_eq!(trip.passengers.len(), 4);
}

#[tokio::test]
async fn should_keep_joining_idempotent() {
    let w = world();
    let trip_id = plan(&w, 1).await;

    assert_eq!(join(&w, trip_id, w.riders[0]).await.unwrap(), 1);
    assert_eq!(join(&w, trip_id, w.riders[0]).await.unwrap(), 1);
}

#[tokio::test]
async fn should_forbid_booking_for_someone_else() {
    let w = world();
    let trip_id = plan(&w, 2).await;
    let usecase = JoinTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    };

    let result = usecase
        .execute(&caller(w.riders[0], RoleKind::Standard), trip_id, w.riders[1])
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let admin = caller(Uuid::new_v4(), RoleKind::Admin);
    let trip = usecase.execute(&admin, trip_id, w.riders[1]).await.unwrap();
    assert_eq!(trip.passengers, riders(&[w.riders[1]]));
}

#[tokio::test]
async fn should_let_passenger_leave_and_driver_drop_passengers() {
    let w = world();
    let trip_id = plan(&w, 3).await;
    join(&w, trip_id, w.riders[0]).await.unwrap();
    join(&w, trip_id, w.riders[1]).await.unwrap();
    let usecase = LeaveTripUseCase {
        trips: w.trips.clone(),
    };

    let trip = usecase
        .execute(&caller(w.riders[0], RoleKind::Standard), trip_id, w.riders[0])
        .await
        .unwrap();
    assert_eq!(trip.passengers, riders(&[w.riders[1]]));

    let trip = usecase
        .execute(&caller(w.driver, RoleKind::Standard), trip_id, w.riders[1])
        .await
        .unwrap();
    assert!(trip.passengers.is_empty());

    // Leaving twice is harmless
    usecase
        .execute(&caller(w.riders[0], RoleKind::Standard), trip_id, w.riders[0])
        .await
        .unwrap();
}

#[tokio::test]
async fn should_forbid_removing_another_passenger() {
    let w = world();
    let trip_id = plan(&w, 3).await;
    join(&w, trip_id, w.riders[0]).await.unwrap();

    let result = LeaveTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(&caller(w.riders[1], RoleKind::Standard), trip_id, w.riders[0])
    .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

// ── UpdatePlannedTripUseCase ─────────────────────────────────────────────────

#[tokio::test]
async fn should_swap_passengers_on_full_trip() {
    let w = world();
    let trip_id = plan(&w, 2).await;
    join(&w, trip_id, w.riders[0]).await.unwrap();
    join(&w, trip_id, w.riders[1]).await.unwrap();

    let usecase = UpdatePlannedTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    };
    let trip = usecase
        .execute(
            &caller(w.driver, RoleKind::Standard),
            trip_id,
            TripChanges {
                passenger_ids: Some(vec![w.riders[1], w.riders[2]]),
                price: Some(18),
                ..TripChanges::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(trip.passengers, riders(&[w.riders[1], w.riders[2]]));
    assert_eq!(trip.price, Some(18));
}

#[tokio::test]
async fn should_refuse_update_over_capacity() {
    let w = world();
    let trip_id = plan(&w, 2).await;

    let result = UpdatePlannedTripUseCase {
        trips: w.trips.clone(),
        accounts: w.accounts.clone(),
    }
    .execute(
        &caller(w.driver, RoleKind::Standard),
        trip_id,
        TripChanges {
            passenger_ids: Some(w.riders[..3].to_vec()),
            ..TripChanges::default()
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::NoSeatAvailable(_))));
}

// ── AdvanceTripUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_begin_trip_under_new_id_and_scope_lookups_by_stage() {
    let w = world();
    let planned_id = plan(&w, 3).await;
    join(&w, planned_id, w.riders[0]).await.unwrap();
    join(&w, planned_id, w.riders[1]).await.unwrap();

    let started = AdvanceTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(&caller(w.driver, RoleKind::Standard), TripStage::Planned, planned_id)
    .await
    .unwrap();

    assert_ne!(started.id, planned_id);
    assert_eq!(started.stage, TripStage::InProgress);
    assert_eq!(started.seat_count, None);
    assert_eq!(started.passengers, riders(&w.riders[..2]));

    let find = FindTripUseCase {
        trips: w.trips.clone(),
    };
    assert!(matches!(
        find.execute(TripStage::Planned, planned_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        find.execute(TripStage::Planned, started.id).await,
        Err(AppError::NotFound(_))
    ));
    let found = find.execute(TripStage::InProgress, started.id).await.unwrap();
    assert_eq!(found.driver_id, w.driver);
    assert_eq!(found.origin, "Nantes");
    assert_eq!(found.passengers.len(), 2);
}

#[tokio::test]
async fn should_finish_trip_keeping_price_and_passengers() {
    let w = world();
    let planned_id = plan(&w, 3).await;
    join(&w, planned_id, w.riders[0]).await.unwrap();
    let driver = caller(w.driver, RoleKind::Standard);
    let usecase = AdvanceTripUseCase {
        trips: w.trips.clone(),
    };

    let started = usecase
        .execute(&driver, TripStage::Planned, planned_id)
        .await
        .unwrap();
    let finished = usecase
        .execute(&driver, TripStage::InProgress, started.id)
        .await
        .unwrap();

    assert_eq!(finished.stage, TripStage::Finished);
    assert_eq!(finished.price, Some(15));
    assert_eq!(finished.passengers, riders(&[w.riders[0]]));
    assert_eq!(w.trips.count(), 1);

    let all = ListTripsUseCase {
        trips: w.trips.clone(),
    }
    .execute(Some(TripStage::Finished))
    .await
    .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn should_not_move_credits_when_finishing() {
    let w = world();
    let planned_id = plan(&w, 3).await;
    join(&w, planned_id, w.riders[0]).await.unwrap();
    let total = w.accounts.total();
    let driver = caller(w.driver, RoleKind::Standard);
    let usecase = AdvanceTripUseCase {
        trips: w.trips.clone(),
    };

    let started = usecase
        .execute(&driver, TripStage::Planned, planned_id)
        .await
        .unwrap();
    usecase
        .execute(&driver, TripStage::InProgress, started.id)
        .await
        .unwrap();

    assert_eq!(w.accounts.total(), total);
    assert_eq!(w.accounts.balance(w.riders[0]), 100);
}

#[tokio::test]
async fn should_forbid_passenger_beginning_the_trip() {
    let w = world();
    let planned_id = plan(&w, 3).await;

    let result = AdvanceTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(
        &caller(w.riders[0], RoleKind::Standard),
        TripStage::Planned,
        planned_id,
    )
    .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn should_refuse_joining_after_trip_began() {
    let w = world();
    let planned_id = plan(&w, 3).await;
    let started = AdvanceTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(&caller(w.driver, RoleKind::Standard), TripStage::Planned, planned_id)
    .await
    .unwrap();

    assert!(matches!(
        join(&w, started.id, w.riders[0]).await,
        Err(AppError::NotFound(_))
    ));
}

// ── DeleteTripUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_trip_at_any_stage() {
    let w = world();
    let driver = caller(w.driver, RoleKind::Standard);
    let delete = DeleteTripUseCase {
        trips: w.trips.clone(),
    };

    let planned_id = plan(&w, 2).await;
    delete
        .execute(&driver, TripStage::Planned, planned_id)
        .await
        .unwrap();

    let planned_id = plan(&w, 2).await;
    let started = AdvanceTripUseCase {
        trips: w.trips.clone(),
    }
    .execute(&driver, TripStage::Planned, planned_id)
    .await
    .unwrap();
    assert!(matches!(
        delete.execute(&driver, TripStage::Planned, started.id).await,
        Err(AppError::NotFound(_))
    ));
    delete
        .execute(&driver, TripStage::InProgress, started.id)
        .await
        .unwrap();

    assert_eq!(w.trips.count(), 0);
}
