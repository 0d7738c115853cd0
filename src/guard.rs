use crate::{
    models::{PermissionSet, Principal, Role},
    permissions::PermissionDescriptor,
    session::SessionStore,
};

/// Requirement
///
/// What a navigation target demands of the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    /// Any stored token will do.
    Authenticated,
    SubAdmin,
    Admin,
}

/// Destination
///
/// Where a redirect sends the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    Home,
    Dashboard(Role),
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/admin/login",
            Destination::Home => "/",
            Destination::Dashboard(Role::SubAdmin) => "/subadmin/dashboard",
            Destination::Dashboard(Role::Admin) => "/admin",
            Destination::Dashboard(Role::Anonymous) => "/",
        }
    }
}

/// Decision
///
/// Outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Destination),
}

/// Flow
///
/// What a component asks the shell to do after an action: stay on the
/// current view or navigate elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Stay,
    Redirect(Destination),
}

/// authorize
///
/// Pure route gate, evaluated in order:
/// 1. any non-public target without a token goes to the login page;
/// 2. a sub-admin target reached by anyone else goes home;
/// 3. an admin target reached by anyone else goes home;
/// 4. everything else is allowed.
///
/// The token itself is never checked against the server here.
pub fn authorize(requirement: Requirement, principal: &Principal) -> Decision {
    if requirement != Requirement::Public && !principal.is_authenticated() {
        return Decision::Redirect(Destination::Login);
    }
    match requirement {
        Requirement::SubAdmin if principal.role != Role::SubAdmin => {
            Decision::Redirect(Destination::Home)
        }
        Requirement::Admin if principal.role != Role::Admin => Decision::Redirect(Destination::Home),
        _ => Decision::Allow,
    }
}

/// Verified
///
/// Permission set the gate confirmed with the API for the current request.
/// Stored in the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified(pub PermissionSet);

/// RouteGuard
///
/// [`authorize`] bound to the session store, with optional server-side
/// revalidation of sub-admin tokens on every protected entry. Without
/// revalidation a stale or forged token passes and only fails on the next
/// dependent fetch.
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
    permissions: PermissionDescriptor,
    revalidate: bool,
}

impl RouteGuard {
    pub fn new(session: SessionStore, permissions: PermissionDescriptor, revalidate: bool) -> Self {
        Self {
            session,
            permissions,
            revalidate,
        }
    }

    /// Gate for `requirement` using the currently stored principal.
    pub async fn check(&self, requirement: Requirement) -> Decision {
        self.check_verified(requirement).await.0
    }

    /// Like [`RouteGuard::check`], also returning the permission set when
    /// revalidation confirmed one, so the handler need not fetch it again.
    pub async fn check_verified(&self, requirement: Requirement) -> (Decision, Option<Verified>) {
        let principal = self.session.get_principal();
        self.revalidate(requirement, &principal).await
    }

    /// Runs [`authorize`] and, when revalidation is on, confirms a sub-admin
    /// token with the server. Only a rejected token clears the session; an
    /// unreachable API keeps it and falls back to the offline decision.
    ///
    /// Admin tokens have no lookup endpoint and are not revalidated.
    pub async fn authorize_revalidated(
        &self,
        requirement: Requirement,
        principal: &Principal,
    ) -> Decision {
        self.revalidate(requirement, principal).await.0
    }

    async fn revalidate(
        &self,
        requirement: Requirement,
        principal: &Principal,
    ) -> (Decision, Option<Verified>) {
        let decision = authorize(requirement, principal);
        if decision != Decision::Allow
            || !self.revalidate
            || requirement == Requirement::Public
            || principal.role != Role::SubAdmin
        {
            return (decision, None);
        }

        let Some(token) = principal.token.as_deref() else {
            return (Decision::Redirect(Destination::Login), None);
        };
        match self.permissions.fetch_permissions(token).await {
            Ok(permissions) => (Decision::Allow, Some(Verified(permissions))),
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "stored token failed revalidation");
                if let Err(e) = self.session.clear() {
                    tracing::error!(error = %e, "could not clear rejected session");
                }
                (Decision::Redirect(Destination::Login), None)
            }
            Err(e) => {
                tracing::error!(error = %e, "revalidation unavailable, keeping session");
                (decision, None)
            }
        }
    }
}
