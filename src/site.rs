use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    api::ApiState,
    crud::{Resource, decode_item, resources},
    error::{AppError, AppResult},
    guard::{Destination, Flow},
    models::{Post, SettingKey, SiteSettings},
    session::keys,
    storage::StoreState,
};

/// Number of case studies visible at once on the home page.
pub const CAROUSEL_WINDOW: usize = 4;

pub const CASE_STUDIES_FAILED: &str = "Failed to fetch case studies";
pub const CASE_STUDIES_EMPTY: &str = "No case studies available at the moment.";

// --- Settings ---

/// Fetches the public-section toggles. Any failure falls back to
/// everything visible; the page never waits on a retry.
pub async fn load_settings(api: &ApiState) -> SiteSettings {
    match api.fetch_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "error fetching settings, showing every section");
            SiteSettings::default()
        }
    }
}

/// SettingsPanel
///
/// The admin "Site Settings" section. Toggles apply locally first and are
/// then persisted with the full object; a failed save keeps the local value.
pub struct SettingsPanel {
    api: ApiState,
    token: String,
    settings: SiteSettings,
    error: Option<String>,
}

impl SettingsPanel {
    pub async fn load(api: ApiState, token: impl Into<String>) -> Self {
        let settings = load_settings(&api).await;
        Self {
            api,
            token: token.into(),
            settings,
            error: None,
        }
    }

    pub fn settings(&self) -> SiteSettings {
        self.settings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn toggle(&mut self, key: SettingKey, value: bool) -> Flow {
        self.settings = self.settings.with(key, value);
        self.error = None;

        match self.api.update_settings(&self.token, &self.settings).await {
            Ok(()) => {
                tracing::info!(?key, value, "site setting updated");
                Flow::Stay
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "settings update rejected");
                Flow::Redirect(Destination::Login)
            }
            Err(e) => {
                tracing::error!(error = %e, "error updating settings");
                self.error = Some(e.user_message());
                Flow::Stay
            }
        }
    }
}

// --- Disclaimer ---

/// DisclaimerGate
///
/// The first-visit disclaimer. Once agreed, the flag lives in the durable
/// store and the modal never shows again for that store.
#[derive(Clone)]
pub struct DisclaimerGate {
    store: StoreState,
}

impl DisclaimerGate {
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }

    pub fn should_show(&self) -> bool {
        match self.store.get(keys::DISCLAIMER_AGREED) {
            Ok(flag) => flag.as_deref() != Some("true"),
            Err(e) => {
                tracing::warn!(error = %e, "disclaimer flag unreadable");
                true
            }
        }
    }

    pub fn agree(&self) -> AppResult<()> {
        self.store.set(keys::DISCLAIMER_AGREED, "true")
    }
}

// --- Home Page ---

/// HomeSection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum HomeSection {
    Hero,
    About,
    Services,
    Team,
    Stats,
    Testimonials,
    CaseStudies,
    Consultation,
}

/// Sections of the home page, top to bottom. The consultation form only
/// appears once the disclaimer has been accepted.
pub fn home_sections(settings: &SiteSettings, disclaimer_agreed: bool) -> Vec<HomeSection> {
    let mut sections = vec![HomeSection::Hero, HomeSection::About];
    if settings.show_services {
        sections.push(HomeSection::Services);
    }
    if settings.show_team {
        sections.push(HomeSection::Team);
    }
    sections.push(HomeSection::Stats);
    sections.push(HomeSection::Testimonials);
    if settings.show_news {
        sections.push(HomeSection::CaseStudies);
    }
    if disclaimer_agreed {
        sections.push(HomeSection::Consultation);
    }
    sections
}

/// NavLink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

fn link(label: &str, path: &str) -> NavLink {
    NavLink {
        label: label.to_string(),
        path: path.to_string(),
    }
}

/// Navbar links, hiding pages whose section is switched off.
pub fn nav_links(settings: &SiteSettings) -> Vec<NavLink> {
    let mut links = vec![link("Home", "/"), link("About", "/about")];
    if settings.show_services {
        links.push(link("Services", "/services"));
    }
    if settings.show_team {
        links.push(link("Lawyers", "/lawyers"));
    }
    if settings.show_blog {
        links.push(link("Blog", "/blog"));
    }
    if settings.show_news {
        links.push(link("News", "/news"));
    }
    links.push(link("Contact", "/contact"));
    links
}

/// HomePage
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HomePage {
    pub settings: SiteSettings,
    pub sections: Vec<HomeSection>,
    pub nav: Vec<NavLink>,
    pub show_disclaimer: bool,
}

pub async fn home_page(api: &ApiState, disclaimer: &DisclaimerGate) -> HomePage {
    let settings = load_settings(api).await;
    let show_disclaimer = disclaimer.should_show();
    HomePage {
        sections: home_sections(&settings, !show_disclaimer),
        nav: nav_links(&settings),
        settings,
        show_disclaimer,
    }
}

// --- Carousel ---

/// Carousel
///
/// Case-study slider over `len` items. The window always holds
/// [`CAROUSEL_WINDOW`] positions and wraps to the start, repeating items
/// when there are fewer than that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn at(len: usize, index: usize) -> Self {
        let index = if len == 0 { 0 } else { index % len };
        Self { index, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// Item positions currently visible; empty when there are no items.
    pub fn window(&self) -> Vec<usize> {
        if self.len == 0 {
            return Vec::new();
        }
        (0..CAROUSEL_WINDOW)
            .map(|offset| (self.index + offset) % self.len)
            .collect()
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.window()
            .into_iter()
            .filter_map(|i| items.get(i))
            .collect()
    }
}

/// CaseStudies
///
/// What the home-page case-study block shows.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
#[ts(export)]
pub enum CaseStudies {
    Loaded { index: usize, cards: Vec<PostCard> },
    Empty { message: String },
    Failed { message: String },
}

pub async fn case_studies(api: &ApiState, asset_base: &str, index: usize) -> CaseStudies {
    match fetch_list::<resources::Posts>(api).await {
        Ok(posts) if posts.is_empty() => CaseStudies::Empty {
            message: CASE_STUDIES_EMPTY.to_string(),
        },
        Ok(posts) => {
            let carousel = Carousel::at(posts.len(), index);
            CaseStudies::Loaded {
                index: carousel.index(),
                cards: carousel
                    .visible(&posts)
                    .into_iter()
                    .map(|p| PostCard::from_post(p, asset_base))
                    .collect(),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "case studies unavailable");
            CaseStudies::Failed {
                message: CASE_STUDIES_FAILED.to_string(),
            }
        }
    }
}

// --- Scroll Progress ---

/// PageMetrics
///
/// Browser measurements the navbar progress bar needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageMetrics {
    pub scroll_y: f64,
    /// Footer top relative to the viewport, when a footer exists.
    pub footer_top: Option<f64>,
    pub scroll_height: f64,
    pub inner_height: f64,
}

impl PageMetrics {
    /// Scroll offset at which the bar is full: the footer's top in document
    /// coordinates, else the bottom of the page. Never below 1.
    pub fn end_target(&self) -> f64 {
        let end = match self.footer_top {
            Some(top) => top + self.scroll_y,
            None => self.scroll_height - self.inner_height,
        };
        end.max(1.0)
    }

    pub fn progress(&self) -> f64 {
        scroll_progress(self.scroll_y, self.end_target())
    }
}

/// Fraction of the page scrolled, clamped to `[0, 1]`.
pub fn scroll_progress(scroll_y: f64, end_target: f64) -> f64 {
    let ratio = scroll_y / end_target.max(1.0);
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

// --- Cards & Pages ---

/// PostCard
///
/// A blog card: title, display date like `Oct 5, 2025`, and an absolute
/// image URL (`None` renders the "No Image" placeholder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostCard {
    pub title: String,
    pub slug: String,
    pub category: Option<String>,
    pub date: Option<String>,
    pub image_url: Option<String>,
    pub excerpt: String,
}

impl PostCard {
    pub fn from_post(post: &Post, asset_base: &str) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            category: post.category.clone(),
            date: post
                .created_at
                .map(|at| at.format("%b %-d, %Y").to_string()),
            image_url: post
                .image_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .map(|url| asset_url(asset_base, url)),
            excerpt: excerpt(&post.content, 160),
        }
    }
}

/// Joins a server-relative asset path to the API base.
pub fn asset_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn excerpt(content: &str, max_chars: usize) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// Public listing of one resource, no token.
pub async fn fetch_list<R: Resource>(api: &ApiState) -> AppResult<Vec<R::Item>> {
    api.list(R::KIND, None)
        .await?
        .into_iter()
        .map(decode_item::<R>)
        .collect()
}

/// Public detail page. An absent item is `NotFound`.
pub async fn fetch_detail<R: Resource>(api: &ApiState, id: &str) -> AppResult<R::Item> {
    match api.fetch_one(R::KIND, id).await {
        Ok(raw) => decode_item::<R>(raw),
        Err(AppError::NotFound(_)) => Err(AppError::NotFound(format!(
            "{} '{}' does not exist",
            R::KIND.name(),
            id
        ))),
        Err(e) => Err(e),
    }
}
