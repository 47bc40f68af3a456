use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{auth, contact, reviews, roles, trips, users, vehicles};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::rate_limit::create_user_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // One limiter shared by every authenticated route, keyed by user id
    let user_governor = create_user_governor();

    // Public routes (IP rate limit applied globally)
    let public_routes = Router::new()
        .route("/public/roles", get(roles::public_roles))
        .route("/registration", post(auth::register))
        .route("/login", post(auth::login))
        // Trips
        .route("/trips", get(trips::list_trips))
        .route("/trips/{stage}/{id}", get(trips::get_trip))
        // Vehicles
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/{id}", get(vehicles::get_vehicle))
        .route("/vehicles/{id}/image", get(vehicles::get_vehicle_image))
        .route("/vehicles/{id}/trips", get(vehicles::list_vehicle_trips))
        .route("/vehicles/search/by-brand", get(vehicles::search_by_brand))
        .route("/vehicles/search/by-seats", get(vehicles::search_by_seats))
        // Reviews
        .route("/reviews", get(reviews::list_reviews))
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/rated", get(reviews::list_rated_reviews))
        .route("/reviews/recent", get(reviews::list_recent_reviews))
        .route("/reviews/by-trip/{trip_id}", get(reviews::list_trip_reviews))
        .route("/reviews/{id}", get(reviews::get_review))
        // Contact form
        .route("/contact", post(contact::submit_message));

    // Authenticated routes
    let user_routes = Router::new()
        // Own account
        .route("/account/me", get(auth::me))
        .route("/account/edit", put(auth::edit_account))
        .route("/account/regenerate-token", post(auth::regenerate_token))
        // Users and credits
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/credits", put(users::update_credits))
        .route("/users/{id}/transfer-credits", post(users::transfer_credits))
        // Roles
        .route("/roles", get(roles::list_roles))
        .route("/roles/{id}", get(roles::get_role))
        .route("/roles/{id}/users", get(roles::get_role_users))
        // Trips
        .route("/trips", post(trips::create_trip))
        .route("/trips/{stage}/{id}", put(trips::update_trip))
        .route("/trips/{stage}/{id}", delete(trips::delete_trip))
        .route("/trips/planned/{id}/passengers", post(trips::join_trip))
        .route(
            "/trips/planned/{id}/passengers/{user_id}",
            delete(trips::leave_trip),
        )
        .route("/trips/planned/{id}/begin", post(trips::begin_trip))
        .route("/trips/in_progress/{id}/finish", post(trips::finish_trip))
        // Vehicles
        .route("/vehicles", post(vehicles::create_vehicle))
        .route("/vehicles/{id}", put(vehicles::update_vehicle))
        .route("/vehicles/{id}", delete(vehicles::delete_vehicle))
        .route("/vehicles/{id}/image", put(vehicles::put_vehicle_image))
        // Reviews
        .route("/reviews/{id}", put(reviews::update_review))
        .route("/reviews/{id}", delete(reviews::delete_review))
        .layer(user_governor.clone())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        .route("/admin/users/search", post(users::search_users))
        .route("/users/{id}/role", put(users::update_role))
        .route("/roles", post(roles::create_role))
        .route("/roles/{id}", put(roles::update_role))
        .route("/roles/{id}", delete(roles::delete_role))
        .route("/contact", get(contact::list_messages))
        .route("/contact/recent", get(contact::list_recent_messages))
        .route("/contact/{id}", get(contact::get_message))
        .route("/contact/{id}", put(contact::update_message))
        .route("/contact/{id}", delete(contact::delete_message))
        .layer(user_governor)
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest(
            "/api",
            public_routes.merge(user_routes).merge(admin_routes),
        )
        .with_state(state)
}
