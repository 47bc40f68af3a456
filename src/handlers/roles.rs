use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::policy::normalize_role_title;
use crate::domain::types::{CurrentUser, RoleMember, RoleRecord};
use crate::error::AppResult;
use crate::usecase::roles::{
    CreateRoleUseCase, DeleteRoleUseCase, FindRoleUseCase, ListRoleMembersUseCase,
    ListRolesUseCase, UpdateRoleUseCase,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublicRole {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct RoleMembersResponse {
    pub role: PublicRole,
    pub users: Vec<RoleMember>,
    pub total_users: usize,
}

/// Role titles offered at registration
pub async fn public_roles(State(state): State<AppState>) -> AppResult<Json<Vec<PublicRole>>> {
    let usecase = ListRolesUseCase {
        roles: state.role_repo(),
    };
    let roles = usecase
        .execute()
        .await?
        .into_iter()
        .map(|r| PublicRole {
            id: r.id,
            title: normalize_role_title(&r.title),
        })
        .collect();

    Ok(Json(roles))
}

pub async fn list_roles(State(state): State<AppState>) -> AppResult<Json<Vec<RoleRecord>>> {
    let usecase = ListRolesUseCase {
        roles: state.role_repo(),
    };
    Ok(Json(usecase.execute().await?))
}

pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<RoleRecord>> {
    let usecase = FindRoleUseCase {
        roles: state.role_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

/// Users currently holding a role
pub async fn get_role_users(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<RoleMembersResponse>> {
    let usecase = ListRoleMembersUseCase {
        roles: state.role_repo(),
    };
    let (role, users) = usecase.execute(id).await?;

    Ok(Json(RoleMembersResponse {
        role: PublicRole {
            id: role.id,
            title: role.title,
        },
        total_users: users.len(),
        users,
    }))
}

pub async fn create_role(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Json(payload): Json<CreateRoleRequest>,
) -> AppResult<Json<RoleRecord>> {
    let usecase = CreateRoleUseCase {
        roles: state.role_repo(),
    };
    let role = usecase
        .execute(&caller, &payload.title, payload.description.as_deref())
        .await?;
    Ok(Json(role))
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<RoleRecord>> {
    let usecase = UpdateRoleUseCase {
        roles: state.role_repo(),
    };
    let role = usecase
        .execute(
            &caller,
            id,
            payload.title.as_deref(),
            payload.description.as_deref(),
        )
        .await?;
    Ok(Json(role))
}

/// Delete a role nobody holds any more
pub async fn delete_role(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let usecase = DeleteRoleUseCase {
        roles: state.role_repo(),
    };
    usecase.execute(&caller, id).await?;

    Ok(Json(serde_json::json!({"message": "Role deleted successfully"})))
}
