use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    api::ApiState,
    error::{AppError, AppResult},
    models::{Capability, PermissionSet, Principal, Role},
};

/// Access
///
/// What a principal may manage. Admins are unrestricted and carry no
/// [`PermissionSet`]; sub-admins are scoped to the set the server returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, ToSchema)]
#[serde(tag = "kind", content = "permissions", rename_all = "lowercase")]
#[ts(export)]
pub enum Access {
    Full,
    Scoped(PermissionSet),
}

impl Access {
    /// `None` marks an admin-only area.
    pub fn allows(&self, capability: Option<Capability>) -> bool {
        match (self, capability) {
            (Access::Full, _) => true,
            (Access::Scoped(set), Some(capability)) => set.allows(capability),
            (Access::Scoped(_), None) => false,
        }
    }

    pub fn permissions(&self) -> Option<&PermissionSet> {
        match self {
            Access::Full => None,
            Access::Scoped(set) => Some(set),
        }
    }
}

/// PermissionDescriptor
///
/// Resolves the capability set of the active sub-admin with a single round
/// trip to `GET /api/subadmin/me`.
#[derive(Clone)]
pub struct PermissionDescriptor {
    api: ApiState,
}

impl PermissionDescriptor {
    pub fn new(api: ApiState) -> Self {
        Self { api }
    }

    /// Any non-2xx comes back as `Unauthorized`; the caller sends the user
    /// to the login page.
    pub async fn fetch_permissions(&self, token: &str) -> AppResult<PermissionSet> {
        let permissions = self.api.fetch_permissions(token).await?;
        tracing::debug!(granted = %permissions.summary(), "sub-admin permissions resolved");
        Ok(permissions)
    }

    /// Maps a principal to its [`Access`]. Admins need no round trip.
    pub async fn resolve(&self, principal: &Principal) -> AppResult<Access> {
        let Some(token) = principal.token.as_deref() else {
            return Err(AppError::Unauthorized("no session".to_string()));
        };
        match principal.role {
            Role::Admin => Ok(Access::Full),
            Role::SubAdmin => self.fetch_permissions(token).await.map(Access::Scoped),
            Role::Anonymous => Err(AppError::Unauthorized("no session".to_string())),
        }
    }
}
