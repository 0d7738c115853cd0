use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Identity ---

/// Role
///
/// The role tag carried by a [`Principal`]. `Anonymous` is the sentinel used
/// when nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Anonymous,
    Admin,
    #[serde(alias = "subAdmin", alias = "sub-admin")]
    SubAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Admin => "admin",
            Role::SubAdmin => "subadmin",
        }
    }

    /// Lenient parse of a stored or server-provided role tag.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "anonymous" => Some(Role::Anonymous),
            "admin" => Some(Role::Admin),
            "subadmin" | "sub-admin" | "sub_admin" => Some(Role::SubAdmin),
            _ => None,
        }
    }
}

/// Principal
///
/// The authenticated identity for the current session. Created on a
/// successful login, destroyed on logout. A token is trusted locally until
/// it is cleared; nothing here checks expiry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Principal {
    pub role: Role,
    pub token: Option<String>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(role: Role, token: impl Into<String>) -> Self {
        Self {
            role,
            token: Some(token.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// AdminProfile
///
/// Display data persisted next to the token (storage key `admin`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminProfile {
    pub name: String,
    pub role: String,
}

// --- Capabilities ---

/// Capability
///
/// One manageable area of the site. Replaces looking up `canManage*`
/// fields by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Capability {
    Enquiries,
    Lawyers,
    Services,
    Posts,
    News,
    Settings,
}

impl Capability {
    /// Every capability, in the order the sub-admin form lists them.
    pub const ALL: [Capability; 6] = [
        Capability::Enquiries,
        Capability::Lawyers,
        Capability::Services,
        Capability::Posts,
        Capability::News,
        Capability::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Capability::Enquiries => "Enquiries",
            Capability::Lawyers => "Lawyers",
            Capability::Services => "Services",
            Capability::Posts => "Posts",
            Capability::News => "News",
            Capability::Settings => "Settings",
        }
    }
}

/// PermissionSet
///
/// Capability flags of one sub-admin, as returned by `GET /api/subadmin/me`.
/// The server is authoritative; the client only reads it. Absent flags
/// deserialize as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct PermissionSet {
    pub can_manage_news: bool,
    pub can_manage_lawyers: bool,
    pub can_manage_posts: bool,
    pub can_manage_services: bool,
    pub can_manage_enquiries: bool,
    pub can_manage_settings: bool,
}

impl PermissionSet {
    /// Grants every capability.
    pub fn all() -> Self {
        Self {
            can_manage_news: true,
            can_manage_lawyers: true,
            can_manage_posts: true,
            can_manage_services: true,
            can_manage_enquiries: true,
            can_manage_settings: true,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::News => self.can_manage_news,
            Capability::Lawyers => self.can_manage_lawyers,
            Capability::Posts => self.can_manage_posts,
            Capability::Services => self.can_manage_services,
            Capability::Enquiries => self.can_manage_enquiries,
            Capability::Settings => self.can_manage_settings,
        }
    }

    pub fn set(&mut self, capability: Capability, value: bool) {
        let flag = match capability {
            Capability::News => &mut self.can_manage_news,
            Capability::Lawyers => &mut self.can_manage_lawyers,
            Capability::Posts => &mut self.can_manage_posts,
            Capability::Services => &mut self.can_manage_services,
            Capability::Enquiries => &mut self.can_manage_enquiries,
            Capability::Settings => &mut self.can_manage_settings,
        };
        *flag = value;
    }

    /// Granted capabilities in [`Capability::ALL`] order.
    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.allows(*c))
    }

    /// Human summary used in the sub-admin table, e.g. `"Lawyers, News"`.
    pub fn summary(&self) -> String {
        let labels: Vec<&str> = self.granted().map(|c| c.label()).collect();
        if labels.is_empty() {
            "No Permissions".to_string()
        } else {
            labels.join(", ")
        }
    }
}

// --- Site Settings ---

/// SiteSettings
///
/// Global visibility toggles for public-page sections. Every flag defaults
/// to `true`, both for a missing field and for a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SiteSettings {
    pub show_team: bool,
    pub show_news: bool,
    pub show_services: bool,
    pub show_blog: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            show_team: true,
            show_news: true,
            show_services: true,
            show_blog: true,
        }
    }
}

/// SettingKey
///
/// Addresses one toggle of [`SiteSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum SettingKey {
    ShowTeam,
    ShowNews,
    ShowServices,
    ShowBlog,
}

impl SiteSettings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::ShowTeam => self.show_team,
            SettingKey::ShowNews => self.show_news,
            SettingKey::ShowServices => self.show_services,
            SettingKey::ShowBlog => self.show_blog,
        }
    }

    pub fn with(mut self, key: SettingKey, value: bool) -> Self {
        match key {
            SettingKey::ShowTeam => self.show_team = value,
            SettingKey::ShowNews => self.show_news = value,
            SettingKey::ShowServices => self.show_services = value,
            SettingKey::ShowBlog => self.show_blog = value,
        }
        self
    }
}

// --- Auth Payloads ---

/// Credentials
///
/// Body of `POST /api/{admin,subadmin}/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// Successful login answer. The API may omit `name` and `role`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// ApiEnvelope
///
/// The `{ success, data }` wrapper around resource responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

// --- Resources ---

/// NewsItem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Post
///
/// A blog article or case study. Detail pages address posts by `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDraft {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Lawyer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Lawyer {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct LawyerDraft {
    pub name: String,
    pub designation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Enquiry
///
/// A consultation request left by a visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryDraft {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
}

/// SubAdmin
///
/// A sub-admin account as listed by `GET /api/subadmin`; the
/// `canManage*` flags sit at the top level of the JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubAdmin {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub permissions: PermissionSet,
}

/// SubAdminDraft
///
/// Body of `POST /api/subadmin/create`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubAdminDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub permissions: PermissionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}
