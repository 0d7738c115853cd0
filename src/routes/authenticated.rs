use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// The dashboard API shared by both roles. The session gate only checks
/// that a token is stored; each handler resolves the principal's access
/// and refuses resources outside it.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // POST /dashboard/section
        // Moves the open shell to another section, if reachable.
        .route("/dashboard/section", post(handlers::select_section))
        // GET/PUT /dashboard/settings
        // Site section toggles (admin, or sub-admin with canManageSettings).
        .route(
            "/dashboard/settings",
            get(handlers::get_settings).put(handlers::update_setting),
        )
        // GET/POST /dashboard/{resource}
        // List and create through the generic CRUD module.
        .route(
            "/dashboard/{resource}",
            get(handlers::list_items).post(handlers::create_item),
        )
        // PUT/DELETE /dashboard/{resource}/{id}
        .route(
            "/dashboard/{resource}/{id}",
            put(handlers::update_item).delete(handlers::delete_item),
        )
}
