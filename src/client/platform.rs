//! Browser primitives the page-side flow depends on.
//!
//! A host (wasm bindings, a test harness) implements these; the flow itself
//! never touches the browser directly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PushResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The prompt was dismissed without a choice.
    Default,
}

/// A subscription as the push platform hands it out, keys in raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSubscription {
    pub endpoint: String,
    pub p256dh: Vec<u8>,
    pub auth: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Browsers refuse subscriptions that could deliver silent pushes.
    pub user_visible_only: bool,
    pub application_server_key: Vec<u8>,
}

/// The push capability of a registered service worker.
#[async_trait]
pub trait PushManager: Send + Sync {
    async fn get_subscription(&self) -> PushResult<Option<PlatformSubscription>>;
    async fn subscribe(&self, options: SubscribeOptions) -> PushResult<PlatformSubscription>;
    async fn unsubscribe(&self, subscription: &PlatformSubscription) -> PushResult<bool>;
}

pub type Registration = Arc<dyn PushManager>;

/// `navigator.serviceWorker`.
#[async_trait]
pub trait WorkerContainer: Send + Sync {
    /// Service workers with a push manager are available.
    fn supports_push(&self) -> bool;
    async fn register(&self, script_url: &str, scope: &str) -> PushResult<Registration>;
}

/// Page-level services outside the push manager.
#[async_trait]
pub trait PageHost: Send + Sync {
    async fn request_permission(&self) -> Permission;
    /// Value of the `data-vapid-key` attribute, if the page carries one.
    fn vapid_public_key(&self) -> Option<String>;
    fn alert(&self, message: &str);
}

/// Minimal element access for the status affordances.
pub trait Dom: Send + Sync {
    fn has_element(&self, id: &str) -> bool;
    fn set_text(&self, id: &str, text: &str);
    fn add_class(&self, id: &str, class: &str);
    fn remove_class(&self, id: &str, class: &str);
}
