use serde::Serialize;
use uuid::Uuid;

use crate::domain::types::{CurrentUser, Trip};
use crate::error::{AppError, AppResult};

const ROLE_PREFIX: &str = "ROLE_";

/// Closed set of roles the platform understands. Stored role titles that do
/// not match a known one map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Admin,
    Premium,
    Standard,
    Suspended,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewAnyUser,
    MutateAnyCredits,
    SearchUsers,
    ManageRoles,
    ManageAnyTrip,
    RideForOthers,
    ReadContactMessages,
}

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ViewAnyUser,
    Capability::MutateAnyCredits,
    Capability::SearchUsers,
    Capability::ManageRoles,
    Capability::ManageAnyTrip,
    Capability::RideForOthers,
    Capability::ReadContactMessages,
];

impl RoleKind {
    pub fn from_title(title: &str) -> Self {
        match normalize_role_title(title).as_str() {
            "ROLE_ADMIN" => RoleKind::Admin,
            "ROLE_PREMIUM" => RoleKind::Premium,
            "ROLE_USER" => RoleKind::Standard,
            "ROLE_SUSPENDED" => RoleKind::Suspended,
            _ => RoleKind::Other,
        }
    }

    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            RoleKind::Admin => ADMIN_CAPABILITIES,
            RoleKind::Premium | RoleKind::Standard | RoleKind::Suspended | RoleKind::Other => &[],
        }
    }

    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// `ROLE_`-prefixed, upper-case form of a role title. Titles that already
/// carry the prefix are kept as they are.
pub fn normalize_role_title(title: &str) -> String {
    let title = title.trim();
    if title.starts_with(ROLE_PREFIX) {
        title.to_string()
    } else {
        format!("{}{}", ROLE_PREFIX, title.to_uppercase())
    }
}

pub fn can_view_user(caller: &CurrentUser, target_id: Uuid) -> bool {
    caller.id == target_id || caller.role.has(Capability::ViewAnyUser)
}

pub fn can_mutate_credits(caller: &CurrentUser, target_id: Uuid) -> bool {
    caller.id == target_id || caller.role.has(Capability::MutateAnyCredits)
}

pub fn can_search_users(caller: &CurrentUser) -> bool {
    caller.role.has(Capability::SearchUsers)
}

pub fn can_manage_roles(caller: &CurrentUser) -> bool {
    caller.role.has(Capability::ManageRoles)
}

/// The driver of a trip, or an admin.
pub fn can_manage_trip(caller: &CurrentUser, trip: &Trip) -> bool {
    caller.id == trip.driver_id || caller.role.has(Capability::ManageAnyTrip)
}

/// Join or leave a trip on behalf of `passenger_id`.
pub fn can_ride_as(caller: &CurrentUser, passenger_id: Uuid) -> bool {
    caller.id == passenger_id || caller.role.has(Capability::RideForOthers)
}

pub fn can_read_contact_messages(caller: &CurrentUser) -> bool {
    caller.role.has(Capability::ReadContactMessages)
}

/// Turn a policy decision into `Forbidden`.
pub fn ensure(allowed: bool, message: &str) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

/// A role may only be deleted once no user references it.
pub fn ensure_role_deletable(title: &str, users_referencing: u64) -> AppResult<()> {
    if users_referencing > 0 {
        return Err(AppError::RoleInUse {
            title: title.to_string(),
            users: users_referencing,
        });
    }
    Ok(())
}
