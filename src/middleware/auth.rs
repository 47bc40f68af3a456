use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::domain::policy::RoleKind;
use crate::domain::types::CurrentUser;
use crate::entities::{role, user};
use crate::error::{AppError, AppResult};
use crate::utils::token::is_well_formed;
use crate::AppState;

/// Resolve the bearer API token to a [`CurrentUser`] in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(auth) =
        auth.ok_or_else(|| AppError::Unauthenticated("Missing API token".to_string()))?;
    let token = auth.token();
    if !is_well_formed(token) {
        return Err(AppError::Unauthenticated("Invalid API token".to_string()));
    }

    let (found, role) = user::Entity::find()
        .filter(user::Column::ApiToken.eq(token))
        .find_also_related(role::Entity)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Invalid API token".to_string()))?;

    let role_title = role.map(|r| r.title).unwrap_or_default();
    request.extensions_mut().insert(CurrentUser {
        id: found.id,
        email: found.email,
        role: RoleKind::from_title(&role_title),
        role_title,
    });

    Ok(next.run(request).await)
}

/// Require an admin caller. Runs after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    let caller = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::Unauthenticated("No authentication found".to_string()))?;

    if caller.role != RoleKind::Admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}
