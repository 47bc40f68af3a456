use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::policy::{can_search_users, can_view_user, ensure, normalize_role_title};
use crate::domain::types::{CurrentUser, TransferReceipt};
use crate::entities::{role, user};
use crate::error::{AppError, AppResult};
use crate::usecase::ledger::{SetBalanceUseCase, TransferCreditsInput, TransferCreditsUseCase};
use crate::usecase::roles::AssignRoleUseCase;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(model: user::Model, role_title: String) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role: role_title,
            credits: model.credits,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

pub async fn load_user_response<C: ConnectionTrait>(
    conn: &C,
    model: user::Model,
) -> AppResult<UserResponse> {
    let title = role::Entity::find_by_id(model.role_id)
        .one(conn)
        .await?
        .map(|r| r.title)
        .unwrap_or_default();
    Ok(UserResponse::new(model, title))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCreditsRequest {
    pub credits: i64,
}

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub id: Uuid,
    pub credits: i32,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub receiver_id: Uuid,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role_id: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchUsersRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Show a user (self or admin)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    ensure(can_view_user(&caller, id), "You can only view your own account")?;

    let found = user::Entity::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    Ok(Json(load_user_response(state.db(), found).await?))
}

// ============ Credits ============

/// Overwrite a balance (self or admin)
pub async fn update_credits(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCreditsRequest>,
) -> AppResult<Json<CreditsResponse>> {
    let usecase = SetBalanceUseCase {
        accounts: state.account_repo(),
    };
    let account = usecase.execute(&caller, id, payload.credits).await?;

    Ok(Json(CreditsResponse {
        id: account.id,
        credits: account.credits,
    }))
}

/// Send credits from `id` to another user (sender or admin)
pub async fn transfer_credits(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferRequest>,
) -> AppResult<Json<TransferReceipt>> {
    let usecase = TransferCreditsUseCase {
        accounts: state.account_repo(),
    };
    let receipt = usecase
        .execute(
            &caller,
            id,
            TransferCreditsInput {
                receiver_id: payload.receiver_id,
                amount: payload.amount,
            },
        )
        .await?;

    Ok(Json(receipt))
}

// ============ Administration ============

/// Move a user to another role (admin)
pub async fn update_role(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let usecase = AssignRoleUseCase {
        roles: state.role_repo(),
    };
    let role = usecase.execute(&caller, id, payload.role_id).await?;

    let found = user::Entity::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    Ok(Json(UserResponse::new(found, role.title)))
}

/// Search users by name, email fragment or exact role (admin)
pub async fn search_users(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Json(payload): Json<SearchUsersRequest>,
) -> AppResult<Json<Vec<UserResponse>>> {
    ensure(can_search_users(&caller), "Admin access required")?;

    let mut query = user::Entity::find().order_by_asc(user::Column::LastName);
    if let Some(first_name) = fragment(&payload.first_name) {
        query = query.filter(user::Column::FirstName.contains(first_name));
    }
    if let Some(last_name) = fragment(&payload.last_name) {
        query = query.filter(user::Column::LastName.contains(last_name));
    }
    if let Some(email) = fragment(&payload.email) {
        query = query.filter(user::Column::Email.contains(email));
    }
    if let Some(title) = fragment(&payload.role) {
        let Some(found) = role::Entity::find()
            .filter(role::Column::Title.eq(normalize_role_title(title)))
            .one(state.db())
            .await?
        else {
            return Ok(Json(Vec::new()));
        };
        query = query.filter(user::Column::RoleId.eq(found.id));
    }

    let roles = role::Entity::find().all(state.db()).await?;
    let users = query
        .all(state.db())
        .await?
        .into_iter()
        .map(|u| {
            let title = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.title.clone())
                .unwrap_or_default();
            UserResponse::new(u, title)
        })
        .collect();

    Ok(Json(users))
}

fn fragment(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
