use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Sub-Admin Router Module
///
/// Wrapped in the sub-admin gate. The handler additionally fetches the
/// permission set; a rejected token sends the user back to login.
pub fn subadmin_routes() -> Router<AppState> {
    Router::new()
        // GET /subadmin/dashboard
        // Opens a shell scoped to the sub-admin's permissions.
        .route("/subadmin/dashboard", get(handlers::get_subadmin_dashboard))
}
