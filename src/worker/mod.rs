//! Service-worker half of the push flow.
//!
//! The platform may kill and respawn the worker between any two events, so
//! every handler works only from its event and from platform queries. A
//! handler that still has work to do returns a [`KeepAlive`]; the host must
//! not tear the worker down before it resolves.

use std::{future::Future, pin::Pin};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PushResult;

pub mod delivery;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;

pub type KeepAlive<'a> = Pin<Box<dyn Future<Output = PushResult<()>> + Send + 'a>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub data: NotificationData,
    pub vibrate: Vec<u32>,
    pub require_interaction: bool,
}

/// The notification carried by a click event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickedNotification {
    pub tag: String,
    pub data: Option<NotificationData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focusable: bool,
}

/// `self`, `self.registration` and `self.clients` inside the worker.
#[async_trait]
pub trait ServiceWorkerGlobal: Send + Sync {
    /// Origin the worker is scoped to, used to resolve relative targets.
    fn origin(&self) -> Option<url::Url>;
    fn skip_waiting(&self);
    async fn claim_clients(&self) -> PushResult<()>;
    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> PushResult<()>;
    fn close_notification(&self, notification: &ClickedNotification);
    /// All window clients, including ones this worker does not control yet.
    async fn match_windows(&self) -> PushResult<Vec<WindowClient>>;
    async fn focus(&self, client: &WindowClient) -> PushResult<()>;
    fn can_open_window(&self) -> bool;
    async fn open_window(&self, url: &str) -> PushResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Install,
    Activate,
    Push { data: Option<Vec<u8>> },
    NotificationClick { notification: ClickedNotification },
}

/// Route one platform event to its handler.
pub fn dispatch(global: &dyn ServiceWorkerGlobal, event: WorkerEvent) -> Option<KeepAlive<'_>> {
    match event {
        WorkerEvent::Install => {
            lifecycle::on_install(global);
            None
        }
        WorkerEvent::Activate => Some(lifecycle::on_activate(global)),
        WorkerEvent::Push { data } => delivery::on_push(global, data.as_deref()),
        WorkerEvent::NotificationClick { notification } => {
            Some(delivery::on_notification_click(global, notification))
        }
    }
}

/// Dispatch and hold the worker alive until the handler's work is done.
pub async fn handle_event(global: &dyn ServiceWorkerGlobal, event: WorkerEvent) -> PushResult<()> {
    match dispatch(global, event) {
        Some(pending) => pending.await,
        None => Ok(()),
    }
}
