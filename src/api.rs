use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{ApiEnvelope, Capability, Credentials, LoginResponse, PermissionSet, Role, SiteSettings},
};

/// Message shown when the login endpoint rejects credentials without saying why.
pub const INCORRECT_CREDENTIALS: &str = "Incorrect email/password";

/// ResourceKind
///
/// The REST resources the dashboards manage. Knows its endpoint layout and
/// the capability a sub-admin needs to manage it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ResourceKind {
    News,
    Lawyers,
    Posts,
    Services,
    Enquiries,
    SubAdmins,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::News => "news",
            ResourceKind::Lawyers => "lawyers",
            ResourceKind::Posts => "posts",
            ResourceKind::Services => "services",
            ResourceKind::Enquiries => "enquiries",
            ResourceKind::SubAdmins => "subadmins",
        }
    }

    pub fn parse(raw: &str) -> Option<ResourceKind> {
        match raw {
            "news" => Some(ResourceKind::News),
            "lawyers" => Some(ResourceKind::Lawyers),
            "posts" => Some(ResourceKind::Posts),
            "services" => Some(ResourceKind::Services),
            "enquiries" => Some(ResourceKind::Enquiries),
            "subadmins" => Some(ResourceKind::SubAdmins),
            _ => None,
        }
    }

    /// Collection path, e.g. `/api/news`.
    pub fn collection_path(&self) -> &'static str {
        match self {
            ResourceKind::News => "/api/news",
            ResourceKind::Lawyers => "/api/lawyers",
            ResourceKind::Posts => "/api/posts",
            ResourceKind::Services => "/api/services",
            ResourceKind::Enquiries => "/api/admin/enquiries",
            ResourceKind::SubAdmins => "/api/subadmin",
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection_path(), id)
    }

    /// Sub-admin accounts are created through a dedicated endpoint.
    pub fn create_path(&self) -> String {
        match self {
            ResourceKind::SubAdmins => format!("{}/create", self.collection_path()),
            _ => self.collection_path().to_string(),
        }
    }

    /// Whether listing needs a bearer token.
    pub fn list_requires_token(&self) -> bool {
        matches!(self, ResourceKind::Enquiries | ResourceKind::SubAdmins)
    }

    /// Capability a sub-admin needs. `None` means admin only.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            ResourceKind::News => Some(Capability::News),
            ResourceKind::Lawyers => Some(Capability::Lawyers),
            ResourceKind::Posts => Some(Capability::Posts),
            ResourceKind::Services => Some(Capability::Services),
            ResourceKind::Enquiries => Some(Capability::Enquiries),
            ResourceKind::SubAdmins => None,
        }
    }
}

/// ApiClient Trait
///
/// The contract with the collaborating REST API. Resource bodies travel as
/// raw JSON so one object-safe trait serves every resource; the typed layer
/// lives in [`crate::crud`].
///
/// No call retries and none carries a timeout.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// `GET /api/settings`.
    async fn fetch_settings(&self) -> AppResult<SiteSettings>;
    /// `PUT /api/settings` with the full object.
    async fn update_settings(&self, token: &str, settings: &SiteSettings) -> AppResult<()>;

    /// `POST /api/{admin,subadmin}/auth/login`.
    async fn login(&self, role: Role, credentials: &Credentials) -> AppResult<LoginResponse>;
    /// `GET /api/subadmin/me`. Any non-2xx is `Unauthorized`.
    async fn fetch_permissions(&self, token: &str) -> AppResult<PermissionSet>;

    async fn list(&self, kind: ResourceKind, token: Option<&str>) -> AppResult<Vec<Value>>;
    async fn fetch_one(&self, kind: ResourceKind, id: &str) -> AppResult<Value>;
    async fn create(&self, kind: ResourceKind, token: &str, body: Value) -> AppResult<Value>;
    async fn update(&self, kind: ResourceKind, token: &str, id: &str, body: Value) -> AppResult<Value>;
    async fn delete(&self, kind: ResourceKind, token: &str, id: &str) -> AppResult<()>;
}

/// ApiState
///
/// The shared handle to the REST client held in the application state.
pub type ApiState = Arc<dyn ApiClient>;

/// HttpApiClient
///
/// The `reqwest` implementation of [`ApiClient`].
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    enquiry_limit: u32,
}

impl HttpApiClient {
    pub fn new(base_url: &str, enquiry_limit: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            enquiry_limit,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, authenticated = token.is_some(), "api request");
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and maps transport failures and non-2xx statuses.
    /// On an authenticated call every non-2xx except 404 is `Unauthorized`.
    async fn send(&self, builder: RequestBuilder, authenticated: bool) -> AppResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        tracing::warn!(%status, %message, "api call rejected");
        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
            _ if authenticated => AppError::Unauthorized(message),
            _ => AppError::Upstream(message),
        })
    }

    async fn envelope<T: DeserializeOwned>(&self, response: Response) -> AppResult<T> {
        let envelope: ApiEnvelope<T> = decode(response).await?;
        if !envelope.success {
            return Err(AppError::Upstream(
                envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| AppError::Upstream("response carried no data".to_string()))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch_settings(&self) -> AppResult<SiteSettings> {
        let response = self
            .send(self.request(Method::GET, "/api/settings", None), false)
            .await?;
        decode(response).await
    }

    async fn update_settings(&self, token: &str, settings: &SiteSettings) -> AppResult<()> {
        let builder = self
            .request(Method::PUT, "/api/settings", Some(token))
            .json(settings);
        self.send(builder, true).await?;
        Ok(())
    }

    async fn login(&self, role: Role, credentials: &Credentials) -> AppResult<LoginResponse> {
        let path = match role {
            Role::Admin => "/api/admin/auth/login",
            Role::SubAdmin => "/api/subadmin/auth/login",
            Role::Anonymous => {
                return Err(AppError::Validation("choose a role to log in as".to_string()));
            }
        };
        let builder = self.request(Method::POST, path, None).json(credentials);
        let response = builder.send().await?;

        if !response.status().is_success() {
            let message = match response.json::<Value>().await {
                Ok(body) => body
                    .get("error")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
                Err(_) => None,
            };
            return Err(AppError::Unauthorized(
                message.unwrap_or_else(|| INCORRECT_CREDENTIALS.to_string()),
            ));
        }

        decode(response).await
    }

    async fn fetch_permissions(&self, token: &str) -> AppResult<PermissionSet> {
        let builder = self.request(Method::GET, "/api/subadmin/me", Some(token));
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "permission lookup rejected with {}",
                response.status()
            )));
        }
        decode(response).await
    }

    async fn list(&self, kind: ResourceKind, token: Option<&str>) -> AppResult<Vec<Value>> {
        let path = match kind {
            ResourceKind::Enquiries => {
                format!("{}?limit={}", kind.collection_path(), self.enquiry_limit)
            }
            _ => kind.collection_path().to_string(),
        };
        let response = self
            .send(self.request(Method::GET, &path, token), token.is_some())
            .await?;
        self.envelope(response).await
    }

    async fn fetch_one(&self, kind: ResourceKind, id: &str) -> AppResult<Value> {
        let response = self
            .send(self.request(Method::GET, &kind.item_path(id), None), false)
            .await?;
        self.envelope(response).await
    }

    async fn create(&self, kind: ResourceKind, token: &str, body: Value) -> AppResult<Value> {
        let builder = self
            .request(Method::POST, &kind.create_path(), Some(token))
            .json(&body);
        let response = self.send(builder, true).await?;
        self.envelope(response).await
    }

    async fn update(&self, kind: ResourceKind, token: &str, id: &str, body: Value) -> AppResult<Value> {
        let builder = self
            .request(Method::PUT, &kind.item_path(id), Some(token))
            .json(&body);
        let response = self.send(builder, true).await?;
        self.envelope(response).await
    }

    async fn delete(&self, kind: ResourceKind, token: &str, id: &str) -> AppResult<()> {
        let builder = self.request(Method::DELETE, &kind.item_path(id), Some(token));
        self.send(builder, true).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Network(format!("malformed response body: {}", e)))
}

/// Pulls `error` or `message` out of a JSON error body, falling back to the
/// status line.
async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    }
}
