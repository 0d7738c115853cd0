mod common;

use common::{MockApi, api, memory_store};
use lawfirm_portal::{
    AppError,
    error::NETWORK_ERROR_MESSAGE,
    guard::{Destination, Flow},
    login::{INVALID_EMAIL, LoginForm, MISSING_CREDENTIALS},
    models::{LoginResponse, Principal, Role},
    session::SessionStore,
};

fn token_response(token: &str, name: &str) -> LoginResponse {
    LoginResponse {
        token: token.to_string(),
        name: name.to_string(),
        role: None,
    }
}

#[test]
fn test_default_login_type_is_subadmin() {
    let form = LoginForm::default();
    assert_eq!(form.login_type, Role::SubAdmin);
    assert!(!form.loading);
    assert!(form.error.is_none());
}

#[tokio::test]
async fn test_rejected_credentials_show_server_message() {
    let (mock, api) = api(MockApi::default().with_login(Err(AppError::Unauthorized(
        "Incorrect email/password".to_string(),
    ))));
    let session = SessionStore::new(memory_store());
    let mut form = LoginForm::new("x@y.com", "wrong", Role::Admin);

    let flow = form.submit(&api, &session).await;

    assert_eq!(flow, Flow::Stay);
    assert_eq!(form.error.as_deref(), Some("Incorrect email/password"));
    assert!(!form.loading);
    assert_eq!(MockApi::calls(&mock.login_calls), 1);
    assert_eq!(session.get_principal(), Principal::anonymous());
}

#[tokio::test]
async fn test_missing_fields_never_reach_the_api() {
    let (mock, api) = api(MockApi::default());
    let session = SessionStore::new(memory_store());

    let mut form = LoginForm::new("", "secret", Role::Admin);
    assert_eq!(form.submit(&api, &session).await, Flow::Stay);
    assert_eq!(form.error.as_deref(), Some(MISSING_CREDENTIALS));

    let mut form = LoginForm::new("not-an-email", "secret", Role::Admin);
    assert_eq!(form.submit(&api, &session).await, Flow::Stay);
    assert_eq!(form.error.as_deref(), Some(INVALID_EMAIL));

    assert_eq!(MockApi::calls(&mock.login_calls), 0);
}

#[tokio::test]
async fn test_network_failure_shows_generic_message() {
    let (_, api) = api(
        MockApi::default().with_login(Err(AppError::Network("connection refused".to_string()))),
    );
    let session = SessionStore::new(memory_store());
    let mut form = LoginForm::new("a@b.co", "pw", Role::SubAdmin);

    form.submit(&api, &session).await;

    assert_eq!(form.error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
    assert!(!form.loading);
}

#[tokio::test]
async fn test_empty_token_is_treated_as_rejection() {
    let (_, api) = api(MockApi::default().with_login(Ok(token_response("", "Nobody"))));
    let session = SessionStore::new(memory_store());
    let mut form = LoginForm::new("a@b.co", "pw", Role::Admin);

    assert_eq!(form.submit(&api, &session).await, Flow::Stay);
    assert_eq!(form.error.as_deref(), Some("Incorrect email/password"));
    assert!(!session.get_principal().is_authenticated());
}

#[tokio::test]
async fn test_successful_admin_login_stores_principal_and_profile() {
    let (_, api) = api(MockApi::default().with_login(Ok(token_response("admin-jwt", "Asha"))));
    let session = SessionStore::new(memory_store());
    let mut form = LoginForm::new("asha@firm.com", "pw", Role::Admin);

    let flow = form.submit(&api, &session).await;

    assert_eq!(flow, Flow::Redirect(Destination::Dashboard(Role::Admin)));
    assert!(form.error.is_none());
    assert!(!form.loading);
    assert_eq!(session.get_principal(), Principal::new(Role::Admin, "admin-jwt"));

    let profile = session.profile().unwrap().unwrap();
    assert_eq!(profile.name, "Asha");
    assert_eq!(profile.role, "admin");
}

#[tokio::test]
async fn test_subadmin_login_redirects_to_subadmin_dashboard() {
    let (_, api) = api(MockApi::default().with_login(Ok(LoginResponse {
        token: "sub-jwt".to_string(),
        name: "Ravi".to_string(),
        role: Some("subAdmin".to_string()),
    })));
    let session = SessionStore::new(memory_store());
    let mut form = LoginForm::new("ravi@firm.com", "pw", Role::SubAdmin);

    let flow = form.submit(&api, &session).await;

    assert_eq!(flow, Flow::Redirect(Destination::Dashboard(Role::SubAdmin)));
    assert_eq!(session.get_principal().role, Role::SubAdmin);
}
