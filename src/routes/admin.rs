use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Wrapped in the admin gate: no token redirects to the login page, any
/// role other than admin goes home.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Opens the unrestricted dashboard shell and returns its overview.
        .route("/admin", get(handlers::get_admin_dashboard))
}
