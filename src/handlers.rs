use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    AppConfig, AppState,
    api::{ApiState, ResourceKind},
    crud::{CrudModule, Resource, resources},
    dashboard::{DashboardShell, NavEntry, Overview, Section},
    error::{AppError, AppResult},
    guard::{Destination, Flow, Verified},
    login::LoginForm,
    models::{AdminProfile, Capability, PermissionSet, Principal, Role, SettingKey, SiteSettings},
    permissions::Access,
    site::{self, CaseStudies, DisclaimerGate, HomePage, SettingsPanel},
    storage::StoreState,
};

// --- Request & View Structs ---

/// CarouselQuery
///
/// Query parameters of `GET /site/case-studies`.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarouselQuery {
    /// First visible case study.
    pub index: Option<usize>,
}

/// SessionView
///
/// What the browser shell knows about the stored session. The token itself
/// is never echoed back.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionView {
    pub role: Role,
    pub authenticated: bool,
    pub profile: Option<AdminProfile>,
}

/// LoginView
///
/// The login form after a submit, with the password cleared, plus where to
/// go next on success.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginView {
    pub form: LoginForm,
    pub redirect: Option<String>,
}

/// DashboardView
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardView {
    pub role: Role,
    pub profile: Option<AdminProfile>,
    pub active: Section,
    pub nav: Vec<NavEntry>,
    pub overview: Overview,
    pub permissions: Option<PermissionSet>,
}

/// SectionRequest
///
/// Body of `POST /dashboard/section`.
#[derive(Debug, Clone, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SectionRequest {
    pub section: Section,
}

/// SettingToggle
///
/// Body of `PUT /dashboard/settings`.
#[derive(Debug, Clone, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SettingToggle {
    pub key: SettingKey,
    pub value: bool,
}

/// SettingsView
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct SettingsView {
    pub settings: SiteSettings,
    pub error: Option<String>,
}

/// CrudView
///
/// State of a CRUD module after an action.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct CrudView {
    pub resource: ResourceKind,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
    pub loading: bool,
    pub error: Option<String>,
}

// --- Helpers ---

fn redirect(destination: Destination) -> Response {
    Redirect::to(destination.path()).into_response()
}

fn resource_from_path(raw: &str) -> AppResult<ResourceKind> {
    ResourceKind::parse(raw).ok_or_else(|| AppError::NotFound(format!("unknown resource '{}'", raw)))
}

fn token_of(principal: &Principal) -> AppResult<&str> {
    principal
        .token
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("no session".to_string()))
}

/// Resolves the stored principal's access. `Err` carries the response to
/// send instead: a login redirect for rejected sessions, an error otherwise.
/// With revalidation on, a token the API rejects is also cleared.
async fn resolve_access(
    state: &AppState,
    verified: Option<Extension<Verified>>,
) -> Result<(Principal, Access), Response> {
    let session = state.session();
    let principal = session.get_principal();
    if let (Role::SubAdmin, Some(Extension(Verified(permissions)))) = (principal.role, verified) {
        return Ok((principal, Access::Scoped(permissions)));
    }
    match state.permissions().resolve(&principal).await {
        Ok(access) => Ok((principal, access)),
        Err(e) if e.is_unauthorized() => {
            if state.config.revalidate_sessions && principal.is_authenticated() {
                if let Err(e) = session.clear() {
                    tracing::error!(error = %e, "could not clear rejected session");
                }
            }
            Err(redirect(Destination::Login))
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Opens (or keeps) the shell for `access` and renders it.
async fn open_dashboard(state: &AppState, principal: &Principal, access: Access) -> AppResult<DashboardView> {
    let token = token_of(principal)?;

    let mut guard = state.shell.lock().await;
    let shell = match guard.take() {
        Some(shell) if *shell.access() == access => shell,
        _ => DashboardShell::new(access),
    };
    let overview = shell.overview(&state.api, token).await;
    let view = DashboardView {
        role: principal.role,
        profile: state.session().profile().ok().flatten(),
        active: shell.active(),
        nav: shell.nav_entries(),
        overview,
        permissions: access.permissions().copied(),
    };
    *guard = Some(shell);
    Ok(view)
}

enum CrudAction {
    List,
    Create(Value),
    Update(String, Value),
    Delete(String),
}

async fn perform<R: Resource>(api: ApiState, token: &str, action: CrudAction) -> AppResult<(Flow, CrudView)> {
    let mut module = CrudModule::<R>::new(api, token);
    let flow = match action {
        CrudAction::List => module.refresh().await,
        CrudAction::Create(body) => {
            let draft: R::Draft = serde_json::from_value(body)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            module.create(&draft).await
        }
        CrudAction::Update(id, body) => {
            let draft: R::Draft = serde_json::from_value(body)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            module.update(&id, &draft).await
        }
        CrudAction::Delete(id) => module.delete(&id).await,
    };

    let items = module
        .items()
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Network(e.to_string()))?;
    Ok((
        flow,
        CrudView {
            resource: module.kind(),
            items,
            loading: module.loading(),
            error: module.error().map(str::to_string),
        },
    ))
}

/// Checks the principal may manage `raw_kind`, then runs `action` through
/// the matching CRUD module.
async fn run_crud(
    state: &AppState,
    verified: Option<Extension<Verified>>,
    raw_kind: &str,
    action: CrudAction,
) -> Response {
    let kind = match resource_from_path(raw_kind) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };
    let (principal, access) = match resolve_access(state, verified).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };
    if !access.allows(kind.capability()) {
        return AppError::Forbidden(format!("{} is not available to this account", kind.name()))
            .into_response();
    }
    let token = match token_of(&principal) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let api = state.api.clone();
    let result = match kind {
        ResourceKind::News => perform::<resources::News>(api, token, action).await,
        ResourceKind::Lawyers => perform::<resources::Lawyers>(api, token, action).await,
        ResourceKind::Posts => perform::<resources::Posts>(api, token, action).await,
        ResourceKind::Services => perform::<resources::Services>(api, token, action).await,
        ResourceKind::Enquiries => perform::<resources::Enquiries>(api, token, action).await,
        ResourceKind::SubAdmins => perform::<resources::SubAdmins>(api, token, action).await,
    };

    match result {
        Ok((Flow::Redirect(destination), _)) => redirect(destination),
        Ok((Flow::Stay, view)) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn public_value<R: Resource>(api: &ApiState, id: Option<&str>) -> AppResult<Value> {
    let value = match id {
        Some(id) => serde_json::to_value(site::fetch_detail::<R>(api, id).await?),
        None => serde_json::to_value(site::fetch_list::<R>(api).await?),
    };
    value.map_err(|e| AppError::Network(e.to_string()))
}

async fn public_resource(api: &ApiState, raw_kind: &str, id: Option<&str>) -> AppResult<Value> {
    let kind = resource_from_path(raw_kind)?;
    match kind {
        ResourceKind::News => public_value::<resources::News>(api, id).await,
        ResourceKind::Lawyers => public_value::<resources::Lawyers>(api, id).await,
        ResourceKind::Posts => public_value::<resources::Posts>(api, id).await,
        ResourceKind::Services => public_value::<resources::Services>(api, id).await,
        ResourceKind::Enquiries | ResourceKind::SubAdmins => Err(AppError::NotFound(format!(
            "unknown resource '{}'",
            raw_kind
        ))),
    }
}

// --- Public Handlers ---

/// get_home
///
/// [Public Route] Home page sections and navbar links. A failed settings
/// fetch shows every section.
#[utoipa::path(
    get,
    path = "/site/home",
    responses((status = 200, description = "Home page", body = HomePage))
)]
pub async fn get_home(State(state): State<AppState>) -> Json<HomePage> {
    Json(site::home_page(&state.api, &state.disclaimer()).await)
}

/// agree_disclaimer
///
/// [Public Route] Persists the disclaimer flag.
#[utoipa::path(
    post,
    path = "/site/disclaimer",
    responses((status = 204, description = "Agreed"))
)]
pub async fn agree_disclaimer(State(store): State<StoreState>) -> AppResult<StatusCode> {
    DisclaimerGate::new(store).agree()?;
    Ok(StatusCode::NO_CONTENT)
}

/// get_case_studies
///
/// [Public Route] Visible window of the case-study carousel.
#[utoipa::path(
    get,
    path = "/site/case-studies",
    params(CarouselQuery),
    responses((status = 200, description = "Carousel window", body = CaseStudies))
)]
pub async fn get_case_studies(
    State(api): State<ApiState>,
    State(config): State<AppConfig>,
    Query(query): Query<CarouselQuery>,
) -> Json<CaseStudies> {
    Json(site::case_studies(&api, &config.api_base_url, query.index.unwrap_or(0)).await)
}

/// list_public
///
/// [Public Route] Listing page of news, lawyers, posts or services.
#[utoipa::path(
    get,
    path = "/site/{resource}",
    params(("resource" = String, Path, description = "news | lawyers | posts | services")),
    responses(
        (status = 200, description = "Items"),
        (status = 404, description = "Unknown resource")
    )
)]
pub async fn list_public(
    State(api): State<ApiState>,
    Path(resource): Path<String>,
) -> AppResult<Json<Value>> {
    public_resource(&api, &resource, None).await.map(Json)
}

/// get_public_detail
///
/// [Public Route] Detail page; posts are addressed by slug.
#[utoipa::path(
    get,
    path = "/site/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "news | lawyers | posts | services"),
        ("id" = String, Path, description = "Item id or post slug")
    ),
    responses(
        (status = 200, description = "Item"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_public_detail(
    State(api): State<ApiState>,
    Path((resource, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    public_resource(&api, &resource, Some(&id)).await.map(Json)
}

/// get_login_page
///
/// [Public Route] Empty login form, sub-admin selected.
#[utoipa::path(
    get,
    path = "/admin/login",
    responses((status = 200, description = "Login form", body = LoginForm))
)]
pub async fn get_login_page() -> Json<LoginForm> {
    Json(LoginForm::default())
}

/// get_session
///
/// [Public Route] Role and profile of the stored session.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Session", body = SessionView))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session();
    let principal = session.get_principal();
    Json(SessionView {
        role: principal.role,
        authenticated: principal.is_authenticated(),
        profile: if principal.is_authenticated() {
            session.profile().ok().flatten()
        } else {
            None
        },
    })
}

/// login
///
/// [Public Route] Submits the login form. Failures come back in
/// `form.error`; success carries the dashboard to open.
#[utoipa::path(
    post,
    path = "/session/login",
    request_body = LoginForm,
    responses((status = 200, description = "Form state after submit", body = LoginView))
)]
pub async fn login(State(state): State<AppState>, Json(mut form): Json<LoginForm>) -> Json<LoginView> {
    let flow = form.submit(&state.api, &state.session()).await;
    form.password.clear();
    if let Flow::Redirect(_) = flow {
        // A new principal never inherits the previous dashboard.
        state.shell.lock().await.take();
    }
    let redirect = match flow {
        Flow::Redirect(destination) => Some(destination.path().to_string()),
        Flow::Stay => None,
    };
    Json(LoginView { form, redirect })
}

/// logout
///
/// [Public Route] Clears the session and closes the dashboard.
#[utoipa::path(
    post,
    path = "/session/logout",
    responses((status = 303, description = "To the login page"))
)]
pub async fn logout(State(state): State<AppState>) -> AppResult<Redirect> {
    state.session().clear()?;
    state.shell.lock().await.take();
    Ok(Redirect::to(Destination::Login.path()))
}

// --- Dashboard Handlers ---

/// get_admin_dashboard
///
/// [Admin Route] Unrestricted shell with counts for every resource.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 303, description = "Redirected by the route guard")
    )
)]
pub async fn get_admin_dashboard(State(state): State<AppState>) -> Response {
    let principal = state.session().get_principal();
    match open_dashboard(&state, &principal, Access::Full).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

/// get_subadmin_dashboard
///
/// [Sub-Admin Route] Fetches the permission set and opens a shell scoped
/// to it. A rejected token sends the user to the login page; an unreachable
/// API is reported as such and the session is kept.
#[utoipa::path(
    get,
    path = "/subadmin/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 303, description = "Redirected to login"),
        (status = 502, description = "Permission lookup unavailable")
    )
)]
pub async fn get_subadmin_dashboard(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
) -> Response {
    let principal = state.session().get_principal();
    let Some(token) = principal.token.as_deref() else {
        return redirect(Destination::Login);
    };
    let fetched = match verified {
        Some(Extension(Verified(permissions))) => Ok(permissions),
        None => state.permissions().fetch_permissions(token).await,
    };
    let permissions = match fetched {
        Ok(permissions) => permissions,
        Err(e) if e.is_unauthorized() => {
            tracing::warn!(error = %e, "sub-admin permissions rejected");
            return redirect(Destination::Login);
        }
        Err(e) => {
            tracing::error!(error = %e, "sub-admin permissions unavailable");
            return e.into_response();
        }
    };
    match open_dashboard(&state, &principal, Access::Scoped(permissions)).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

/// select_section
///
/// [Authenticated Route] Changes the active section of the open shell. The
/// shell is first checked against the current principal's access; a shell
/// opened under another access level is rebuilt before selecting.
#[utoipa::path(
    post,
    path = "/dashboard/section",
    request_body = SectionRequest,
    responses(
        (status = 200, description = "Navigation", body = [NavEntry]),
        (status = 403, description = "Section not reachable")
    )
)]
pub async fn select_section(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
    Json(request): Json<SectionRequest>,
) -> Response {
    let (_, access) = match resolve_access(&state, verified).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    let mut guard = state.shell.lock().await;
    let Some(shell) = guard.as_mut() else {
        return AppError::Forbidden("no dashboard is open".to_string()).into_response();
    };
    if *shell.access() != access {
        tracing::warn!("dashboard shell opened under another access level, rebuilding");
        *shell = DashboardShell::new(access);
    }
    match shell.select(request.section) {
        Ok(_) => Json(shell.nav_entries()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// get_settings
///
/// [Authenticated Route] Current site toggles.
#[utoipa::path(
    get,
    path = "/dashboard/settings",
    responses((status = 200, description = "Settings", body = SettingsView))
)]
pub async fn get_settings(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
) -> Response {
    let (_, access) = match resolve_access(&state, verified).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };
    if !access.allows(Some(Capability::Settings)) {
        return AppError::Forbidden("site settings are not available to this account".to_string())
            .into_response();
    }
    Json(SettingsView {
        settings: site::load_settings(&state.api).await,
        error: None,
    })
    .into_response()
}

/// update_setting
///
/// [Authenticated Route] Flips one toggle and saves the whole object.
#[utoipa::path(
    put,
    path = "/dashboard/settings",
    request_body = SettingToggle,
    responses(
        (status = 200, description = "Settings after the toggle", body = SettingsView),
        (status = 403, description = "Not permitted")
    )
)]
pub async fn update_setting(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
    Json(toggle): Json<SettingToggle>,
) -> Response {
    let (principal, access) = match resolve_access(&state, verified).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };
    if !access.allows(Some(Capability::Settings)) {
        return AppError::Forbidden("site settings are not available to this account".to_string())
            .into_response();
    }
    let token = match token_of(&principal) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let mut panel = SettingsPanel::load(state.api.clone(), token).await;
    match panel.toggle(toggle.key, toggle.value).await {
        Flow::Redirect(destination) => redirect(destination),
        Flow::Stay => Json(SettingsView {
            settings: panel.settings(),
            error: panel.error().map(str::to_string),
        })
        .into_response(),
    }
}

/// list_items
///
/// [Authenticated Route] Lists a resource the principal may manage.
#[utoipa::path(
    get,
    path = "/dashboard/{resource}",
    params(("resource" = String, Path, description = "Resource name")),
    responses(
        (status = 200, description = "Module state", body = CrudView),
        (status = 403, description = "Not permitted")
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
    Path(resource): Path<String>,
) -> Response {
    run_crud(&state, verified, &resource, CrudAction::List).await
}

/// create_item
#[utoipa::path(
    post,
    path = "/dashboard/{resource}",
    params(("resource" = String, Path, description = "Resource name")),
    request_body = Value,
    responses(
        (status = 200, description = "Module state", body = CrudView),
        (status = 422, description = "Invalid draft")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    run_crud(&state, verified, &resource, CrudAction::Create(body)).await
}

/// update_item
#[utoipa::path(
    put,
    path = "/dashboard/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource name"),
        ("id" = String, Path, description = "Item id")
    ),
    request_body = Value,
    responses((status = 200, description = "Module state", body = CrudView))
)]
pub async fn update_item(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    run_crud(&state, verified, &resource, CrudAction::Update(id, body)).await
}

/// delete_item
#[utoipa::path(
    delete,
    path = "/dashboard/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource name"),
        ("id" = String, Path, description = "Item id")
    ),
    responses((status = 200, description = "Module state", body = CrudView))
)]
pub async fn delete_item(
    State(state): State<AppState>,
    verified: Option<Extension<Verified>>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    run_crud(&state, verified, &resource, CrudAction::Delete(id)).await
}
