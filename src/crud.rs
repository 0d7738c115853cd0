use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    api::{ApiState, ResourceKind},
    error::{AppError, AppResult},
    guard::{Destination, Flow},
    models::{
        Enquiry, EnquiryDraft, Lawyer, LawyerDraft, NewsDraft, NewsItem, Post, PostDraft, Service,
        ServiceDraft, SubAdmin, SubAdminDraft,
    },
    validate::Validate,
};

/// Resource
///
/// Binds a [`ResourceKind`] (endpoint layout and permission key) to its
/// item and draft types.
pub trait Resource: 'static {
    const KIND: ResourceKind;
    type Item: DeserializeOwned + Serialize + Clone + Send + Sync;
    type Draft: Serialize + DeserializeOwned + Validate + Send + Sync;
}

/// Resource markers.
pub mod resources {
    use super::*;

    pub struct News;
    pub struct Lawyers;
    pub struct Posts;
    pub struct Services;
    pub struct Enquiries;
    pub struct SubAdmins;

    impl Resource for News {
        const KIND: ResourceKind = ResourceKind::News;
        type Item = NewsItem;
        type Draft = NewsDraft;
    }

    impl Resource for Lawyers {
        const KIND: ResourceKind = ResourceKind::Lawyers;
        type Item = Lawyer;
        type Draft = LawyerDraft;
    }

    impl Resource for Posts {
        const KIND: ResourceKind = ResourceKind::Posts;
        type Item = Post;
        type Draft = PostDraft;
    }

    impl Resource for Services {
        const KIND: ResourceKind = ResourceKind::Services;
        type Item = Service;
        type Draft = ServiceDraft;
    }

    impl Resource for Enquiries {
        const KIND: ResourceKind = ResourceKind::Enquiries;
        type Item = Enquiry;
        type Draft = EnquiryDraft;
    }

    impl Resource for SubAdmins {
        const KIND: ResourceKind = ResourceKind::SubAdmins;
        type Item = SubAdmin;
        type Draft = SubAdminDraft;
    }
}

/// Decodes one raw API item into the resource's item type.
pub fn decode_item<R: Resource>(raw: Value) -> AppResult<R::Item> {
    serde_json::from_value(raw).map_err(|e| {
        AppError::Network(format!("malformed {} item: {}", R::KIND.name(), e))
    })
}

/// CrudModule
///
/// List view plus create / update / delete against one resource. Every
/// action ends with the loading flag cleared. Failures never propagate:
/// they become the module's inline error message, except `Unauthorized`,
/// which asks the shell to go to the login page.
pub struct CrudModule<R: Resource> {
    api: ApiState,
    token: String,
    items: Vec<R::Item>,
    loading: bool,
    error: Option<String>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> CrudModule<R> {
    pub fn new(api: ApiState, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
            items: Vec::new(),
            loading: false,
            error: None,
            _resource: PhantomData,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        R::KIND
    }

    pub fn items(&self) -> &[R::Item] {
        &self.items
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reloads the list.
    pub async fn refresh(&mut self) -> Flow {
        self.loading = true;
        self.error = None;
        let result = self.load().await;
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                Flow::Stay
            }
            Err(e) => self.absorb(e),
        }
    }

    pub async fn create(&mut self, draft: &R::Draft) -> Flow {
        let body = match self.prepare(draft) {
            Ok(body) => body,
            Err(e) => return self.absorb(e),
        };
        self.loading = true;
        let result = self.api.create(R::KIND, &self.token, body).await;
        self.after_write(result.map(|_| ()), "created").await
    }

    pub async fn update(&mut self, id: &str, draft: &R::Draft) -> Flow {
        let body = match self.prepare(draft) {
            Ok(body) => body,
            Err(e) => return self.absorb(e),
        };
        self.loading = true;
        let result = self.api.update(R::KIND, &self.token, id, body).await;
        self.after_write(result.map(|_| ()), "updated").await
    }

    pub async fn delete(&mut self, id: &str) -> Flow {
        self.error = None;
        self.loading = true;
        let result = self.api.delete(R::KIND, &self.token, id).await;
        self.after_write(result, "deleted").await
    }

    async fn load(&self) -> AppResult<Vec<R::Item>> {
        let token = R::KIND.list_requires_token().then_some(self.token.as_str());
        self.api
            .list(R::KIND, token)
            .await?
            .into_iter()
            .map(decode_item::<R>)
            .collect()
    }

    fn prepare(&mut self, draft: &R::Draft) -> AppResult<Value> {
        self.error = None;
        draft.validate()?;
        serde_json::to_value(draft).map_err(|e| AppError::Validation(e.to_string()))
    }

    async fn after_write(&mut self, result: AppResult<()>, verb: &str) -> Flow {
        self.loading = false;
        match result {
            Ok(()) => {
                tracing::info!(resource = R::KIND.name(), "{} item", verb);
                self.refresh().await
            }
            Err(e) => self.absorb(e),
        }
    }

    fn absorb(&mut self, error: AppError) -> Flow {
        self.loading = false;
        if error.is_unauthorized() {
            tracing::warn!(resource = R::KIND.name(), error = %error, "session rejected");
            return Flow::Redirect(Destination::Login);
        }
        tracing::error!(resource = R::KIND.name(), error = %error, "crud action failed");
        self.error = Some(error.user_message());
        Flow::Stay
    }
}
