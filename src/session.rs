use crate::{
    error::{AppError, AppResult},
    models::{AdminProfile, Principal, Role},
    storage::StoreState,
};

/// Storage keys shared with the browser shell.
pub mod keys {
    /// Generic credential written on every login.
    pub const TOKEN: &str = "token";
    /// Credential of an admin session.
    pub const ADMIN_TOKEN: &str = "adminToken";
    /// Credential of a sub-admin session.
    pub const SUB_ADMIN_TOKEN: &str = "subAdminToken";
    /// Serialized `{ name, role }` of the logged-in principal.
    pub const PROFILE: &str = "admin";
    /// Set to `"true"` once the visitor accepts the disclaimer.
    pub const DISCLAIMER_AGREED: &str = "disclaimerAgreed";
}

/// SessionStore
///
/// Holds the current [`Principal`] across page views. It is a thin typed
/// view over the durable [`StoreState`]; there is no in-memory copy, so a
/// principal written by `set_principal` is what the next `get_principal`
/// (and therefore the next guarded navigation) sees.
///
/// Tokens never expire here. A token the server has since rejected stays
/// "valid" until `clear` runs.
#[derive(Clone)]
pub struct SessionStore {
    store: StoreState,
}

impl SessionStore {
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }

    /// Persists `role` and `token`. The token lands under the role-specific
    /// key and under the generic `token` key.
    pub fn set_principal(&self, role: Role, token: &str) -> AppResult<()> {
        let role_key = token_key(role).ok_or_else(|| {
            AppError::Validation("cannot store a token for an anonymous principal".to_string())
        })?;

        self.store.set(role_key, token)?;
        self.store.set(keys::TOKEN, token)?;

        // Keep the display name of an earlier `set_profile` for the same role.
        let name = self
            .profile()
            .ok()
            .flatten()
            .filter(|p| Role::parse(&p.role) == Some(role))
            .map(|p| p.name)
            .unwrap_or_default();
        self.set_profile(&AdminProfile {
            name,
            role: role.as_str().to_string(),
        })?;

        tracing::info!(role = role.as_str(), "session principal stored");
        Ok(())
    }

    /// Returns the stored principal, or the anonymous sentinel when nothing
    /// (or nothing readable) is stored.
    pub fn get_principal(&self) -> Principal {
        match self.read_principal() {
            Ok(Some(principal)) => principal,
            Ok(None) => Principal::anonymous(),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable session, treating as anonymous");
                Principal::anonymous()
            }
        }
    }

    fn read_principal(&self) -> AppResult<Option<Principal>> {
        let Some(profile) = self.profile()? else {
            return Ok(None);
        };
        let Some(role) = Role::parse(&profile.role) else {
            return Ok(None);
        };
        let Some(role_key) = token_key(role) else {
            return Ok(None);
        };

        let token = match self.store.get(role_key)? {
            Some(token) => Some(token),
            None => self.store.get(keys::TOKEN)?,
        };

        Ok(token
            .filter(|t| !t.is_empty())
            .map(|token| Principal::new(role, token)))
    }

    /// Removes every credential and the profile. Used on logout.
    pub fn clear(&self) -> AppResult<()> {
        for key in [
            keys::TOKEN,
            keys::ADMIN_TOKEN,
            keys::SUB_ADMIN_TOKEN,
            keys::PROFILE,
        ] {
            self.store.remove(key)?;
        }
        tracing::info!("session cleared");
        Ok(())
    }

    pub fn set_profile(&self, profile: &AdminProfile) -> AppResult<()> {
        let raw = serde_json::to_string(profile).map_err(|e| AppError::Storage(e.to_string()))?;
        self.store.set(keys::PROFILE, &raw)
    }

    pub fn profile(&self) -> AppResult<Option<AdminProfile>> {
        match self.store.get(keys::PROFILE)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("corrupt profile entry: {}", e))),
            None => Ok(None),
        }
    }
}

fn token_key(role: Role) -> Option<&'static str> {
    match role {
        Role::Admin => Some(keys::ADMIN_TOKEN),
        Role::SubAdmin => Some(keys::SUB_ADMIN_TOKEN),
        Role::Anonymous => None,
    }
}
