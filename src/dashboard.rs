use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    api::{ApiState, ResourceKind},
    error::{AppError, AppResult},
    models::Capability,
    permissions::Access,
};

/// Section
///
/// The fixed set of dashboard sections, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Section {
    #[default]
    Dashboard,
    Enquiries,
    Lawyers,
    Services,
    Posts,
    News,
    SubAdmins,
    Settings,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Dashboard,
        Section::Enquiries,
        Section::Lawyers,
        Section::Services,
        Section::Posts,
        Section::News,
        Section::SubAdmins,
        Section::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Enquiries => "Enquiries",
            Section::Lawyers => "Lawyers",
            Section::Services => "Services",
            Section::Posts => "Blogs & Articles",
            Section::News => "News",
            Section::SubAdmins => "Sub-Admins",
            Section::Settings => "Site Settings",
        }
    }

    /// The CRUD resource mounted for this section, if any.
    pub fn resource(&self) -> Option<ResourceKind> {
        match self {
            Section::Enquiries => Some(ResourceKind::Enquiries),
            Section::Lawyers => Some(ResourceKind::Lawyers),
            Section::Services => Some(ResourceKind::Services),
            Section::Posts => Some(ResourceKind::Posts),
            Section::News => Some(ResourceKind::News),
            Section::SubAdmins => Some(ResourceKind::SubAdmins),
            Section::Dashboard | Section::Settings => None,
        }
    }

    fn reachable(&self, access: &Access) -> bool {
        match self {
            Section::Dashboard => true,
            Section::Settings => access.allows(Some(Capability::Settings)),
            other => other
                .resource()
                .is_some_and(|kind| access.allows(kind.capability())),
        }
    }
}

/// NavEntry
///
/// One sidebar button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct NavEntry {
    pub section: Section,
    pub label: String,
    pub active: bool,
}

/// Overview
///
/// Item counts shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Overview {
    pub counts: BTreeMap<Section, usize>,
}

/// DashboardShell
///
/// Navigation state of one dashboard. Exactly one section is active at a
/// time; selecting another replaces it. Only sections the [`Access`]
/// reaches appear in the menu or can become active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardShell {
    access: Access,
    active: Section,
}

impl DashboardShell {
    pub fn new(access: Access) -> Self {
        Self {
            access,
            active: Section::Dashboard,
        }
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    pub fn active(&self) -> Section {
        self.active
    }

    pub fn can_reach(&self, section: Section) -> bool {
        section.reachable(&self.access)
    }

    pub fn nav_entries(&self) -> Vec<NavEntry> {
        Section::ALL
            .into_iter()
            .filter(|s| self.can_reach(*s))
            .map(|section| NavEntry {
                section,
                label: section.label().to_string(),
                active: section == self.active,
            })
            .collect()
    }

    /// Makes `section` active. Unreachable sections are refused and the
    /// current selection stays.
    pub fn select(&mut self, section: Section) -> AppResult<Section> {
        if !self.can_reach(section) {
            tracing::warn!(?section, "refused navigation to unreachable section");
            return Err(AppError::Forbidden(format!(
                "{} is not available to this account",
                section.label()
            )));
        }
        tracing::debug!(from = ?self.active, to = ?section, "dashboard section changed");
        self.active = section;
        Ok(section)
    }

    /// Counts every reachable resource section. The five lookups run
    /// concurrently; any that fails reads as zero.
    pub async fn overview(&self, api: &ApiState, token: &str) -> Overview {
        let (news, lawyers, posts, services, enquiries) = tokio::join!(
            self.count(api, token, Section::News),
            self.count(api, token, Section::Lawyers),
            self.count(api, token, Section::Posts),
            self.count(api, token, Section::Services),
            self.count(api, token, Section::Enquiries),
        );

        let counts = [news, lawyers, posts, services, enquiries]
            .into_iter()
            .flatten()
            .collect();
        Overview { counts }
    }

    async fn count(&self, api: &ApiState, token: &str, section: Section) -> Option<(Section, usize)> {
        if !self.can_reach(section) {
            return None;
        }
        let kind = section.resource()?;
        let token = kind.list_requires_token().then_some(token);
        match api.list(kind, token).await {
            Ok(items) => Some((section, items.len())),
            Err(e) => {
                tracing::error!(error = %e, resource = kind.name(), "count fetch failed");
                Some((section, 0))
            }
        }
    }
}
