use uuid::Uuid;

use crate::domain::policy::{can_manage_roles, ensure};
use crate::domain::repository::RoleRepository;
use crate::domain::types::{CurrentUser, RoleMember, RoleRecord};
use crate::error::{AppError, AppResult};

const ADMIN_ONLY: &str = "Only administrators can manage roles";

// ── ListRoles / FindRole ─────────────────────────────────────────────────────

pub struct ListRolesUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> ListRolesUseCase<R> {
    pub async fn execute(&self) -> AppResult<Vec<RoleRecord>> {
        self.roles.list_roles().await
    }
}

pub struct FindRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> FindRoleUseCase<R> {
    pub async fn execute(&self, id: i32) -> AppResult<RoleRecord> {
        find_role(&self.roles, id).await
    }
}

/// A role together with the users holding it.
pub struct ListRoleMembersUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> ListRoleMembersUseCase<R> {
    pub async fn execute(&self, id: i32) -> AppResult<(RoleRecord, Vec<RoleMember>)> {
        let role = find_role(&self.roles, id).await?;
        let members = self.roles.list_role_members(id).await?;
        Ok((role, members))
    }
}

// ── CreateRole ───────────────────────────────────────────────────────────────

pub struct CreateRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> CreateRoleUseCase<R> {
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        title: &str,
        description: Option<&str>,
    ) -> AppResult<RoleRecord> {
        ensure(can_manage_roles(caller), ADMIN_ONLY)?;
        if title.trim().is_empty() {
            return Err(AppError::Validation("Role title is required".to_string()));
        }

        let role = self.roles.create_role(title, description).await?;
        tracing::info!(role_id = role.id, title = %role.title, "Role created");
        Ok(role)
    }
}

// ── UpdateRole ───────────────────────────────────────────────────────────────

pub struct UpdateRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> UpdateRoleUseCase<R> {
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        id: i32,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<RoleRecord> {
        ensure(can_manage_roles(caller), ADMIN_ONLY)?;
        if title.is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::Validation("Role title cannot be blank".to_string()));
        }

        let role = self.roles.update_role(id, title, description).await?;
        tracing::info!(role_id = role.id, title = %role.title, "Role updated");
        Ok(role)
    }
}

// ── DeleteRole ───────────────────────────────────────────────────────────────

pub struct DeleteRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> DeleteRoleUseCase<R> {
    pub async fn execute(&self, caller: &CurrentUser, id: i32) -> AppResult<()> {
        ensure(can_manage_roles(caller), ADMIN_ONLY)?;

        self.roles.delete_role(id).await.inspect_err(|e| {
            if let AppError::RoleInUse { title, users } = e {
                tracing::warn!(role_id = id, %title, users, "Role still assigned");
            }
        })?;
        tracing::info!(role_id = id, "Role deleted");
        Ok(())
    }
}

// ── AssignRole ───────────────────────────────────────────────────────────────

pub struct AssignRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> AssignRoleUseCase<R> {
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        user_id: Uuid,
        role_id: i32,
    ) -> AppResult<RoleRecord> {
        ensure(can_manage_roles(caller), ADMIN_ONLY)?;
        find_role(&self.roles, role_id).await?;

        if !self.roles.assign_role(user_id, role_id).await? {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        tracing::info!(user_id = %user_id, role_id, by = %caller.id, "Role assigned");

        // Re-read so the user count reflects the assignment
        find_role(&self.roles, role_id).await
    }
}

async fn find_role<R: RoleRepository>(roles: &R, id: i32) -> AppResult<RoleRecord> {
    roles
        .find_role(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {} not found", id)))
}
