#![allow(dead_code)]

use async_trait::async_trait;
use lawfirm_portal::{
    AppConfig, AppError, AppResult, AppState, MemoryStore,
    api::{ApiClient, ApiState, ResourceKind},
    models::{Credentials, LoginResponse, PermissionSet, Role, SiteSettings},
    storage::StoreState,
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

// --- MOCK API IMPLEMENTATION ---

// Central control point for tests: pre-canned results plus call counters,
// so tests can assert both what came back and whether a request was sent.
pub struct MockApi {
    pub settings: Mutex<SiteSettings>,
    pub settings_fail: bool,
    pub update_settings_result: Option<AppError>,

    pub login_result: Mutex<Option<AppResult<LoginResponse>>>,
    pub permissions_result: Option<PermissionSet>,
    pub permissions_error: Option<AppError>,

    pub lists: HashMap<ResourceKind, Vec<Value>>,
    pub list_fail: Vec<ResourceKind>,
    pub write_error: Option<AppError>,

    pub login_calls: AtomicUsize,
    pub permission_calls: AtomicUsize,
    pub update_settings_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub last_write: Mutex<Option<Value>>,
}

impl Default for MockApi {
    fn default() -> Self {
        MockApi {
            settings: Mutex::new(SiteSettings::default()),
            settings_fail: false,
            update_settings_result: None,
            login_result: Mutex::new(None),
            permissions_result: Some(PermissionSet::all()),
            permissions_error: None,
            lists: HashMap::new(),
            list_fail: vec![],
            write_error: None,
            login_calls: AtomicUsize::new(0),
            permission_calls: AtomicUsize::new(0),
            update_settings_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            last_write: Mutex::new(None),
        }
    }
}

impl MockApi {
    pub fn with_login(self, result: AppResult<LoginResponse>) -> Self {
        *self.login_result.lock().unwrap() = Some(result);
        self
    }

    pub fn with_list(mut self, kind: ResourceKind, items: Vec<Value>) -> Self {
        self.lists.insert(kind, items);
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

fn clone_error(error: &AppError) -> AppError {
    match error {
        AppError::Network(m) => AppError::Network(m.clone()),
        AppError::Unauthorized(m) => AppError::Unauthorized(m.clone()),
        AppError::Validation(m) => AppError::Validation(m.clone()),
        AppError::NotFound(m) => AppError::NotFound(m.clone()),
        AppError::Forbidden(m) => AppError::Forbidden(m.clone()),
        AppError::Upstream(m) => AppError::Upstream(m.clone()),
        AppError::Storage(m) => AppError::Storage(m.clone()),
        AppError::Config(m) => AppError::Config(m.clone()),
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn fetch_settings(&self) -> AppResult<SiteSettings> {
        if self.settings_fail {
            return Err(AppError::Network("connection refused".to_string()));
        }
        Ok(*self.settings.lock().unwrap())
    }

    async fn update_settings(&self, _token: &str, settings: &SiteSettings) -> AppResult<()> {
        bump(&self.update_settings_calls);
        if let Some(error) = &self.update_settings_result {
            return Err(clone_error(error));
        }
        *self.settings.lock().unwrap() = *settings;
        Ok(())
    }

    async fn login(&self, _role: Role, _credentials: &Credentials) -> AppResult<LoginResponse> {
        bump(&self.login_calls);
        match &*self.login_result.lock().unwrap() {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(error)) => Err(clone_error(error)),
            None => Err(AppError::Unauthorized("Incorrect email/password".to_string())),
        }
    }

    async fn fetch_permissions(&self, _token: &str) -> AppResult<PermissionSet> {
        bump(&self.permission_calls);
        if let Some(error) = &self.permissions_error {
            return Err(clone_error(error));
        }
        self.permissions_result
            .ok_or_else(|| AppError::Unauthorized("token rejected".to_string()))
    }

    async fn list(&self, kind: ResourceKind, _token: Option<&str>) -> AppResult<Vec<Value>> {
        if self.list_fail.contains(&kind) {
            return Err(AppError::Network("connection reset".to_string()));
        }
        Ok(self.lists.get(&kind).cloned().unwrap_or_default())
    }

    async fn fetch_one(&self, kind: ResourceKind, id: &str) -> AppResult<Value> {
        self.lists
            .get(&kind)
            .and_then(|items| {
                items
                    .iter()
                    .find(|item| item["_id"] == id || item["id"] == id || item["slug"] == id)
                    .cloned()
            })
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))
    }

    async fn create(&self, _kind: ResourceKind, _token: &str, body: Value) -> AppResult<Value> {
        self.record_write(body)
    }

    async fn update(&self, _kind: ResourceKind, _token: &str, _id: &str, body: Value) -> AppResult<Value> {
        self.record_write(body)
    }

    async fn delete(&self, _kind: ResourceKind, _token: &str, id: &str) -> AppResult<()> {
        self.record_write(json!({ "deleted": id })).map(|_| ())
    }
}

impl MockApi {
    fn record_write(&self, body: Value) -> AppResult<Value> {
        bump(&self.write_calls);
        if let Some(error) = &self.write_error {
            return Err(clone_error(error));
        }
        *self.last_write.lock().unwrap() = Some(body.clone());
        Ok(body)
    }
}

// --- STATE HELPERS ---

pub fn api(mock: MockApi) -> (Arc<MockApi>, ApiState) {
    let mock = Arc::new(mock);
    let state = mock.clone() as ApiState;
    (mock, state)
}

pub fn memory_store() -> StoreState {
    Arc::new(MemoryStore::new()) as StoreState
}

pub fn app_state(api: ApiState, store: StoreState) -> AppState {
    AppState::new(api, store, AppConfig::default())
}

pub fn app_state_with(api: ApiState, store: StoreState, config: AppConfig) -> AppState {
    AppState::new(api, store, config)
}

pub fn news(id: &str, title: &str) -> Value {
    json!({ "_id": id, "title": title, "content": "Body" })
}

pub fn post(id: &str, slug: &str) -> Value {
    json!({
        "_id": id,
        "title": format!("Post {}", id),
        "content": "Case summary",
        "slug": slug,
        "createdAt": "2025-10-05T09:30:00Z"
    })
}
