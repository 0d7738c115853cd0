use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use tokio::sync::Mutex;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core.
pub mod guard;
pub mod permissions;
pub mod session;
pub mod storage;

// Dashboard, resources and public site.
pub mod api;
pub mod crud;
pub mod dashboard;
pub mod login;
pub mod site;

// Shared types and plumbing.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod validate;

// Portal routers, one per guard level.
pub mod routes;
use routes::{admin, authenticated, public, subadmin};

// --- Public Re-exports ---

pub use api::{ApiState, HttpApiClient};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use storage::{FileStore, MemoryStore, StoreState};

use dashboard::DashboardShell;
use guard::{Decision, Requirement, RouteGuard};
use permissions::PermissionDescriptor;
use session::SessionStore;
use site::DisclaimerGate;

/// ApiDoc
///
/// OpenAPI description of the portal, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_home, handlers::agree_disclaimer, handlers::get_case_studies,
        handlers::list_public, handlers::get_public_detail, handlers::get_login_page,
        handlers::get_session, handlers::login, handlers::logout,
        handlers::get_admin_dashboard, handlers::get_subadmin_dashboard,
        handlers::select_section, handlers::get_settings, handlers::update_setting,
        handlers::list_items, handlers::create_item, handlers::update_item,
        handlers::delete_item,
    ),
    components(
        schemas(
            models::Role, models::PermissionSet, models::SiteSettings, models::SettingKey,
            models::AdminProfile, models::Capability, api::ResourceKind,
            dashboard::Section, dashboard::NavEntry, dashboard::Overview,
            login::LoginForm, site::HomePage, site::HomeSection, site::NavLink,
            site::PostCard, site::CaseStudies,
            handlers::SessionView, handlers::LoginView, handlers::DashboardView,
            handlers::SectionRequest, handlers::SettingToggle, handlers::SettingsView,
            handlers::CrudView,
        )
    ),
    tags(
        (name = "lawfirm-portal", description = "Law firm site and content-management portal")
    )
)]
struct ApiDoc;

/// ShellState
///
/// The one dashboard shell of this portal process. `None` until a
/// dashboard is opened; reset on logout.
pub type ShellState = Arc<Mutex<Option<DashboardShell>>>;

/// AppState
///
/// Single container for every service the handlers use. Cheap to clone;
/// all members are shared handles.
#[derive(Clone)]
pub struct AppState {
    /// The collaborating REST API.
    pub api: ApiState,
    /// Durable client storage (session, disclaimer flag).
    pub store: StoreState,
    /// Loaded, immutable configuration.
    pub config: AppConfig,
    /// Active dashboard navigation.
    pub shell: ShellState,
}

impl AppState {
    pub fn new(api: ApiState, store: StoreState, config: AppConfig) -> Self {
        Self {
            api,
            store,
            config,
            shell: Arc::new(Mutex::new(None)),
        }
    }

    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.store.clone())
    }

    pub fn permissions(&self) -> PermissionDescriptor {
        PermissionDescriptor::new(self.api.clone())
    }

    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(
            self.session(),
            self.permissions(),
            self.config.revalidate_sessions,
        )
    }

    pub fn disclaimer(&self) -> DisclaimerGate {
        DisclaimerGate::new(self.store.clone())
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for ApiState {
    fn from_ref(app_state: &AppState) -> ApiState {
        app_state.api.clone()
    }
}

impl FromRef<AppState> for StoreState {
    fn from_ref(app_state: &AppState) -> StoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// Runs the route guard for `requirement` before the handler. A redirect
/// decision short-circuits with `303 See Other`; a permission set confirmed
/// by revalidation travels to the handler as a [`guard::Verified`] extension.
async fn enforce(state: AppState, requirement: Requirement, mut request: Request, next: Next) -> Response {
    let (decision, verified) = state.guard().check_verified(requirement).await;
    match decision {
        Decision::Allow => {
            if let Some(verified) = verified {
                request.extensions_mut().insert(verified);
            }
            next.run(request).await
        }
        Decision::Redirect(destination) => {
            tracing::info!(
                uri = %request.uri(),
                to = destination.path(),
                ?requirement,
                "navigation redirected by route guard"
            );
            Redirect::to(destination.path()).into_response()
        }
    }
}

async fn session_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(state, Requirement::Authenticated, request, next).await
}

async fn admin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(state, Requirement::Admin, request, next).await
}

async fn subadmin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(state, Requirement::SubAdmin, request, next).await
}

/// create_router
///
/// Assembles the portal: public pages, the two role-gated dashboards and
/// the shared dashboard API, each behind its guard, then the observability
/// and CORS layers.
pub fn create_router(state: AppState) -> Router {
    // The portal acts with the stored credential, so only the configured
    // front-end origin may call it from a browser.
    let cors = match state.config.allowed_origin.clone() {
        Some(origin) => CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(origin),
        None => CorsLayer::new(),
    };

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_gate)),
        )
        .merge(
            subadmin::subadmin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), subadmin_gate)),
        )
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), session_gate)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span for one portal request, tagged with its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
