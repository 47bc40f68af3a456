use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{self, StatusCode},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor},
    GovernorError, GovernorLayer,
};
use uuid::Uuid;

use crate::domain::types::CurrentUser;

type Middleware = governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>;

/// Per client IP, applied to every route.
pub type IpGovernorLayer = GovernorLayer<PeerIpKeyExtractor, Middleware, Body>;

/// Per authenticated user, applied behind the auth middleware.
pub type UserGovernorLayer = GovernorLayer<UserIdExtractor, Middleware, Body>;

/// Keys the limiter on the user resolved by the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct UserIdExtractor;

impl KeyExtractor for UserIdExtractor {
    type Key = Uuid;

    fn extract<T>(&self, req: &http::Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<CurrentUser>()
            .map(|user| user.id)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// 1000 requests per minute per IP, bursting to 1000.
pub fn create_ip_governor() -> IpGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(60)
            .burst_size(1000)
            .finish()
            .expect("Invalid IP rate limit configuration"),
    );

    GovernorLayer::new(config)
}

/// 200 requests per minute per user, bursting to 100.
pub fn create_user_governor() -> UserGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(300)
            .burst_size(100)
            .key_extractor(UserIdExtractor)
            .finish()
            .expect("Invalid user rate limit configuration"),
    );

    GovernorLayer::new(config)
}

/// Log every request with the client address and outcome.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(client_ip = %addr.ip(), method = %method, uri = %uri, "Incoming request");

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}
