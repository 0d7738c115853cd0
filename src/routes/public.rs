use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Unguarded routes: the public site, the disclaimer, and the session
/// endpoints the login page talks to.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // GET /site/home
        // Home page composition, filtered by the site settings.
        .route("/site/home", get(handlers::get_home))
        // POST /site/disclaimer
        // Records that the visitor accepted the disclaimer.
        .route("/site/disclaimer", post(handlers::agree_disclaimer))
        // GET /site/case-studies?index=N
        // Case-study carousel window starting at N.
        .route("/site/case-studies", get(handlers::get_case_studies))
        // GET /site/{resource} and /site/{resource}/{id}
        // Public listings and detail pages (news, lawyers, posts, services).
        .route("/site/{resource}", get(handlers::list_public))
        .route("/site/{resource}/{id}", get(handlers::get_public_detail))
        // GET /admin/login
        // Empty login form; where every guard redirect lands.
        .route("/admin/login", get(handlers::get_login_page))
        // Session lifecycle.
        .route("/session", get(handlers::get_session))
        .route("/session/login", post(handlers::login))
        .route("/session/logout", post(handlers::logout))
}
