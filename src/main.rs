use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use carpool_backend::{
    config::Config,
    db,
    domain::{ledger::signup_credits, policy::RoleKind},
    entities::{role, user},
    middleware::rate_limit::{create_ip_governor, log_request},
    routes,
    utils::{password::hash_password, token::generate_api_token},
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carpool_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Also seeds the built-in roles
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    if let Some((email, password)) = config.admin_seed() {
        seed_admin(&db, email, password).await;
    }

    let state = AppState {
        db: Arc::new(db),
        config: config.clone(),
    };

    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(create_ip_governor());

    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Peer addresses feed the IP rate limiter and request logging
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Create the configured admin account unless the email is already taken.
async fn seed_admin(db: &DatabaseConnection, email: &str, password: &str) {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .expect("Failed to check for admin");
    if existing.is_some() {
        return;
    }

    let admin_role = role::Entity::find()
        .filter(role::Column::Title.eq("ROLE_ADMIN"))
        .one(db)
        .await
        .expect("Failed to load admin role")
        .expect("ROLE_ADMIN missing; migrations did not seed roles");

    let admin = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password).expect("Failed to hash admin password")),
        first_name: Set("Admin".to_string()),
        last_name: Set("Admin".to_string()),
        role_id: Set(admin_role.id),
        credits: Set(signup_credits(RoleKind::Admin, None)),
        api_token: Set(Some(generate_api_token())),
        ..Default::default()
    };

    admin.insert(db).await.expect("Failed to create admin");
    tracing::info!("Admin account created: {}", email);
}
