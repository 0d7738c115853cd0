mod common;

use common::{MockApi, api, memory_store, post};
use lawfirm_portal::{
    AppError, MemoryStore,
    api::ResourceKind,
    crud::resources,
    guard::{Destination, Flow},
    models::{Post, SettingKey, SiteSettings},
    site::{
        self, CASE_STUDIES_EMPTY, CASE_STUDIES_FAILED, CaseStudies, Carousel, DisclaimerGate,
        HomeSection, PageMetrics, PostCard, SettingsPanel, scroll_progress,
    },
    storage::StoreState,
};
use std::sync::Arc;

// --- Settings ---

#[tokio::test]
async fn test_settings_fetch_failure_shows_everything() {
    let (_, api) = api(MockApi {
        settings_fail: true,
        ..MockApi::default()
    });
    assert_eq!(site::load_settings(&api).await, SiteSettings::default());
    assert!(SiteSettings::default().show_team);
    assert!(SiteSettings::default().show_blog);
}

#[test]
fn test_missing_settings_fields_default_to_visible() {
    let settings: SiteSettings = serde_json::from_str(r#"{"showTeam": false}"#).unwrap();
    assert!(!settings.show_team);
    assert!(settings.show_news);
    assert!(settings.show_services);
    assert!(settings.show_blog);
}

#[tokio::test]
async fn test_toggle_twice_is_idempotent() {
    let (mock, api) = api(MockApi::default());
    let mut panel = SettingsPanel::load(api, "admin").await;

    assert_eq!(panel.toggle(SettingKey::ShowTeam, false).await, Flow::Stay);
    let after_first = *mock.settings.lock().unwrap();
    assert_eq!(panel.toggle(SettingKey::ShowTeam, false).await, Flow::Stay);
    let after_second = *mock.settings.lock().unwrap();

    assert_eq!(after_first, after_second);
    assert!(!after_second.show_team);
    assert!(!panel.settings().get(SettingKey::ShowTeam));
    assert_eq!(MockApi::calls(&mock.update_settings_calls), 2);
}

#[tokio::test]
async fn test_failed_toggle_keeps_local_value_and_shows_error() {
    let (_, api) = api(MockApi {
        update_settings_result: Some(AppError::Upstream("Failed to update settings".to_string())),
        ..MockApi::default()
    });
    let mut panel = SettingsPanel::load(api, "admin").await;

    assert_eq!(panel.toggle(SettingKey::ShowNews, false).await, Flow::Stay);
    assert!(!panel.settings().show_news);
    assert_eq!(panel.error(), Some("Failed to update settings"));
}

#[tokio::test]
async fn test_rejected_toggle_redirects_to_login() {
    let (_, api) = api(MockApi {
        update_settings_result: Some(AppError::Unauthorized("expired".to_string())),
        ..MockApi::default()
    });
    let mut panel = SettingsPanel::load(api, "stale").await;

    assert_eq!(
        panel.toggle(SettingKey::ShowBlog, false).await,
        Flow::Redirect(Destination::Login)
    );
}

// --- Disclaimer & home page ---

#[test]
fn test_disclaimer_shows_until_agreed() {
    let gate = DisclaimerGate::new(memory_store());
    assert!(gate.should_show());
    gate.agree().unwrap();
    assert!(!gate.should_show());
}

#[test]
fn test_unreadable_disclaimer_flag_shows_modal() {
    let gate = DisclaimerGate::new(Arc::new(MemoryStore::new_failing()) as StoreState);
    assert!(gate.should_show());
}

#[test]
fn test_home_sections_follow_settings() {
    let all = site::home_sections(&SiteSettings::default(), true);
    assert_eq!(
        all,
        vec![
            HomeSection::Hero,
            HomeSection::About,
            HomeSection::Services,
            HomeSection::Team,
            HomeSection::Stats,
            HomeSection::Testimonials,
            HomeSection::CaseStudies,
            HomeSection::Consultation,
        ]
    );

    let trimmed = SiteSettings::default()
        .with(SettingKey::ShowTeam, false)
        .with(SettingKey::ShowNews, false);
    let sections = site::home_sections(&trimmed, false);
    assert!(!sections.contains(&HomeSection::Team));
    assert!(!sections.contains(&HomeSection::CaseStudies));
    assert!(!sections.contains(&HomeSection::Consultation));
}

#[test]
fn test_nav_links_hide_disabled_pages() {
    let settings = SiteSettings::default().with(SettingKey::ShowBlog, false);
    let labels: Vec<String> = site::nav_links(&settings)
        .into_iter()
        .map(|l| l.label)
        .collect();
    assert_eq!(
        labels,
        vec!["Home", "About", "Services", "Lawyers", "News", "Contact"]
    );
}

#[tokio::test]
async fn test_home_page_combines_settings_and_disclaimer() {
    let (_, api) = api(MockApi::default());
    let store = memory_store();
    let gate = DisclaimerGate::new(store);

    let page = site::home_page(&api, &gate).await;
    assert!(page.show_disclaimer);
    assert!(!page.sections.contains(&HomeSection::Consultation));

    gate.agree().unwrap();
    let page = site::home_page(&api, &gate).await;
    assert!(!page.show_disclaimer);
    assert!(page.sections.contains(&HomeSection::Consultation));
}

// --- Carousel ---

#[test]
fn test_carousel_wraps_in_both_directions() {
    let mut carousel = Carousel::new(6);
    carousel.prev();
    assert_eq!(carousel.index(), 5);
    assert_eq!(carousel.window(), vec![5, 0, 1, 2]);
    carousel.next();
    carousel.next();
    assert_eq!(carousel.index(), 1);
}

#[test]
fn test_carousel_repeats_items_when_short() {
    let carousel = Carousel::new(2);
    assert_eq!(carousel.window(), vec![0, 1, 0, 1]);
    assert_eq!(carousel.visible(&["a", "b"]), vec![&"a", &"b", &"a", &"b"]);
}

#[test]
fn test_empty_carousel_is_inert() {
    let mut carousel = Carousel::new(0);
    carousel.next();
    carousel.prev();
    assert_eq!(carousel.index(), 0);
    assert!(carousel.window().is_empty());
}

#[tokio::test]
async fn test_case_studies_states() {
    let (_, empty) = api(MockApi::default());
    match site::case_studies(&empty, "http://api", 0).await {
        CaseStudies::Empty { message } => assert_eq!(message, CASE_STUDIES_EMPTY),
        other => panic!("unexpected {:?}", other),
    }

    let (_, failing) = api(MockApi {
        list_fail: vec![ResourceKind::Posts],
        ..MockApi::default()
    });
    match site::case_studies(&failing, "http://api", 0).await {
        CaseStudies::Failed { message } => assert_eq!(message, CASE_STUDIES_FAILED),
        other => panic!("unexpected {:?}", other),
    }

    let (_, loaded) = api(MockApi::default().with_list(
        ResourceKind::Posts,
        vec![post("1", "a"), post("2", "b"), post("3", "c"), post("4", "d"), post("5", "e")],
    ));
    match site::case_studies(&loaded, "http://api", 7).await {
        CaseStudies::Loaded { index, cards } => {
            assert_eq!(index, 2);
            let slugs: Vec<&str> = cards.iter().map(|c| c.slug.as_str()).collect();
            assert_eq!(slugs, vec!["c", "d", "e", "a"]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

// --- Scroll progress ---

#[test]
fn test_scroll_progress_is_clamped() {
    assert_eq!(scroll_progress(0.0, 1000.0), 0.0);
    assert_eq!(scroll_progress(500.0, 1000.0), 0.5);
    assert_eq!(scroll_progress(5000.0, 1000.0), 1.0);
    assert_eq!(scroll_progress(-10.0, 1000.0), 0.0);
    assert_eq!(scroll_progress(f64::NAN, 1000.0), 0.0);
}

#[test]
fn test_end_target_prefers_footer() {
    let with_footer = PageMetrics {
        scroll_y: 200.0,
        footer_top: Some(600.0),
        scroll_height: 3000.0,
        inner_height: 800.0,
    };
    assert_eq!(with_footer.end_target(), 800.0);
    assert_eq!(with_footer.progress(), 0.25);

    let without_footer = PageMetrics {
        footer_top: None,
        ..with_footer
    };
    assert_eq!(without_footer.end_target(), 2200.0);

    let short_page = PageMetrics {
        scroll_y: 0.0,
        footer_top: None,
        scroll_height: 500.0,
        inner_height: 800.0,
    };
    assert_eq!(short_page.end_target(), 1.0);
}

// --- Cards & pages ---

#[test]
fn test_post_card_formats_date_and_image() {
    let post: Post = serde_json::from_value(serde_json::json!({
        "_id": "p1",
        "title": "Landmark ruling",
        "content": "x".repeat(200),
        "slug": "landmark-ruling",
        "imageUrl": "/uploads/ruling.jpg",
        "createdAt": "2025-10-05T09:30:00Z"
    }))
    .unwrap();

    let card = PostCard::from_post(&post, "http://api.example.com/");

    assert_eq!(card.date.as_deref(), Some("Oct 5, 2025"));
    assert_eq!(
        card.image_url.as_deref(),
        Some("http://api.example.com/uploads/ruling.jpg")
    );
    assert!(card.excerpt.ends_with('…'));
    assert_eq!(card.excerpt.chars().count(), 161);
}

#[test]
fn test_absolute_asset_urls_pass_through() {
    assert_eq!(
        site::asset_url("http://api", "https://cdn.example.com/a.png"),
        "https://cdn.example.com/a.png"
    );
}

#[tokio::test]
async fn test_detail_of_missing_item_is_not_found() {
    let (_, api) = api(MockApi::default().with_list(ResourceKind::Posts, vec![post("1", "known")]));

    let found = site::fetch_detail::<resources::Posts>(&api, "known").await.unwrap();
    assert_eq!(found.id, "1");

    match site::fetch_detail::<resources::Posts>(&api, "missing").await {
        Err(AppError::NotFound(message)) => assert_eq!(message, "posts 'missing' does not exist"),
        other => panic!("unexpected {:?}", other),
    }
}
