use axum::{extract::State, Extension, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ledger::signup_credits;
use crate::domain::policy::RoleKind;
use crate::domain::repository::RoleRepository;
use crate::domain::types::CurrentUser;
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::handlers::users::{load_user_response, UserResponse};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::token::generate_api_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_title: Option<String>,
    /// Any JSON number or numeric string, truncated and capped on signup.
    pub credits: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EditAccountRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub api_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub api_token: String,
}

// ============ Registration & Login ============

/// Register a new account. The credit grant follows the chosen role unless an
/// explicit amount is requested.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let mut missing = Vec::new();
    let email = required(payload.email, "email", &mut missing);
    let password = required(payload.password, "password", &mut missing);
    let first_name = required(payload.first_name, "first_name", &mut missing);
    let last_name = required(payload.last_name, "last_name", &mut missing);
    let role_title = required(payload.role_title, "role_title", &mut missing);
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "The following fields are required: {}",
            missing.join(", ")
        )));
    }
    validate_email(&email)?;

    let role = state
        .role_repo()
        .find_role_by_title(&role_title)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown role {}", role_title)))?;
    let kind = RoleKind::from_title(&role.title);

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(state.db())
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let api_token = generate_api_token();
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        first_name: Set(first_name),
        last_name: Set(last_name),
        role_id: Set(role.id),
        credits: Set(signup_credits(kind, requested_credits(payload.credits.as_ref()))),
        api_token: Set(Some(api_token.clone())),
        ..Default::default()
    };
    let created = new_user.insert(state.db()).await?;

    tracing::info!(
        user_id = %created.id,
        role = %role.title,
        credits = created.credits,
        "Account registered"
    );

    Ok(Json(AuthResponse {
        api_token,
        user: UserResponse::new(created, role.title),
    }))
}

/// Exchange email and password for the account's API token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Unauthenticated("Invalid email or password".to_string());

    let found = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim()))
        .one(state.db())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &found.password_hash)? {
        tracing::warn!(user_id = %found.id, "Failed login");
        return Err(invalid());
    }

    let (api_token, found) = match found.api_token.clone() {
        Some(token) => (token, found),
        None => {
            let token = generate_api_token();
            let mut active: user::ActiveModel = found.into();
            active.api_token = Set(Some(token.clone()));
            (token, active.update(state.db()).await?)
        }
    };

    Ok(Json(AuthResponse {
        api_token,
        user: load_user_response(state.db(), found).await?,
    }))
}

// ============ Own account ============

pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let found = find_caller(&state, &caller).await?;
    Ok(Json(UserResponse::new(found, caller.role_title)))
}

pub async fn edit_account(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Json(payload): Json<EditAccountRequest>,
) -> AppResult<Json<UserResponse>> {
    let found = find_caller(&state, &caller).await?;
    let mut active: user::ActiveModel = found.into();

    if let Some(email) = payload.email {
        let email = email.trim().to_string();
        validate_email(&email)?;
        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .filter(user::Column::Id.ne(caller.id))
            .one(state.db())
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        if password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(first_name) = non_blank(payload.first_name, "first_name")? {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = non_blank(payload.last_name, "last_name")? {
        active.last_name = Set(last_name);
    }

    let updated = active.update(state.db()).await?;
    Ok(Json(UserResponse::new(updated, caller.role_title)))
}

/// Replace the caller's API token. The old token stops working immediately.
pub async fn regenerate_token(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> AppResult<Json<TokenResponse>> {
    let found = find_caller(&state, &caller).await?;

    let api_token = generate_api_token();
    let mut active: user::ActiveModel = found.into();
    active.api_token = Set(Some(api_token.clone()));
    active.update(state.db()).await?;

    tracing::info!(user_id = %caller.id, "API token regenerated");
    Ok(Json(TokenResponse { api_token }))
}

async fn find_caller(state: &AppState, caller: &CurrentUser) -> AppResult<user::Model> {
    user::Entity::find_by_id(caller.id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Account no longer exists".to_string()))
}

fn required(value: Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

/// Numeric credit request, truncated toward zero. Values beyond `i64` saturate
/// and are capped by the ledger; anything non-numeric counts as no request.
fn requested_credits(value: Option<&Value>) -> Option<i64> {
    let truncate = |f: f64| f.is_finite().then(|| f.trunc() as i64);
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
}

fn non_blank(value: Option<String>, field: &str) -> AppResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(AppError::Validation(format!("{} cannot be blank", field))),
        other => Ok(other),
    }
}

pub(crate) fn validate_email(email: &str) -> AppResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::Validation(format!("Invalid email address: {}", email))),
    }
}
