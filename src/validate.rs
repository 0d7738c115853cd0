use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::{EnquiryDraft, LawyerDraft, NewsDraft, PostDraft, ServiceDraft, SubAdminDraft},
};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

/// Same loose shape check the login form has always used.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Validate
///
/// Client-side checks a draft must pass before it is sent anywhere.
pub trait Validate {
    fn validate(&self) -> AppResult<()>;
}

fn require(fields: &[&str]) -> AppResult<()> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::Validation("All fields are required.".to_string()));
    }
    Ok(())
}

fn require_email(email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::Validation(
            "Please enter a valid email address.".to_string(),
        ));
    }
    Ok(())
}

impl Validate for NewsDraft {
    fn validate(&self) -> AppResult<()> {
        require(&[self.title.as_str(), self.content.as_str()])
    }
}

impl Validate for PostDraft {
    fn validate(&self) -> AppResult<()> {
        require(&[self.title.as_str(), self.content.as_str(), self.slug.as_str()])
    }
}

impl Validate for ServiceDraft {
    fn validate(&self) -> AppResult<()> {
        require(&[self.title.as_str(), self.description.as_str()])
    }
}

impl Validate for LawyerDraft {
    fn validate(&self) -> AppResult<()> {
        require(&[self.name.as_str(), self.designation.as_str()])
    }
}

impl Validate for EnquiryDraft {
    fn validate(&self) -> AppResult<()> {
        require(&[self.name.as_str(), self.email.as_str(), self.message.as_str()])?;
        require_email(&self.email)
    }
}

impl Validate for SubAdminDraft {
    fn validate(&self) -> AppResult<()> {
        require(&[self.name.as_str(), self.email.as_str(), self.password.as_str()])?;
        require_email(&self.email)
    }
}
