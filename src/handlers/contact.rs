use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::policy::{can_read_contact_messages, ensure};
use crate::domain::types::{CurrentUser, RECENT_LIMIT};
use crate::entities::contact_message;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::validate_email;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub body: Option<String>,
}

/// Store a message from the public contact form
pub async fn submit_message(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<Json<contact_message::Model>> {
    let mut missing = Vec::new();
    for (field, value) in [
        ("name", &payload.name),
        ("email", &payload.email),
        ("body", &payload.body),
    ] {
        if value.trim().is_empty() {
            missing.push(field);
        }
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "The following fields are required: {}",
            missing.join(", ")
        )));
    }

    let message = contact_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        body: Set(payload.body),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!(message_id = %message.id, "Contact message received");
    Ok(Json(message))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> AppResult<Json<Vec<contact_message::Model>>> {
    ensure(can_read_contact_messages(&caller), "Admin access required")?;

    let messages = contact_message::Entity::find()
        .order_by_desc(contact_message::Column::CreatedAt)
        .all(state.db())
        .await?;
    Ok(Json(messages))
}

pub async fn list_recent_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> AppResult<Json<Vec<contact_message::Model>>> {
    ensure(can_read_contact_messages(&caller), "Admin access required")?;

    let messages = contact_message::Entity::find()
        .order_by_desc(contact_message::Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(state.db())
        .await?;
    Ok(Json(messages))
}

pub async fn get_message(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<contact_message::Model>> {
    ensure(can_read_contact_messages(&caller), "Admin access required")?;

    let message = contact_message::Entity::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;
    Ok(Json(message))
}

/// Correct a stored message; absent fields keep their value
pub async fn update_message(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactRequest>,
) -> AppResult<Json<contact_message::Model>> {
    ensure(can_read_contact_messages(&caller), "Admin access required")?;

    let existing = contact_message::Entity::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;
    let mut active: contact_message::ActiveModel = existing.into();

    if let Some(name) = filled(payload.name, "name")? {
        active.name = Set(name);
    }
    if let Some(email) = filled(payload.email, "email")? {
        validate_email(&email)?;
        active.email = Set(email);
    }
    if let Some(body) = filled(payload.body, "body")? {
        active.body = Set(body);
    }

    Ok(Json(active.update(state.db()).await?))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    ensure(can_read_contact_messages(&caller), "Admin access required")?;

    let result = contact_message::Entity::delete_by_id(id)
        .exec(state.db())
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Message not found".to_string()));
    }
    Ok(Json(serde_json::json!({"message": "Message deleted successfully"})))
}

fn filled(value: Option<String>, field: &str) -> AppResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(AppError::Validation(format!("{} cannot be blank", field))),
        other => Ok(other),
    }
}
