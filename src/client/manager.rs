use std::sync::Arc;

use super::{
    controller::ServiceWorkerController,
    platform::{
        Dom, PageHost, Permission, PlatformSubscription, Registration, SubscribeOptions,
        WorkerContainer,
    },
    sync::SubscriptionServer,
    view::{StatusView, SubscriptionStatus},
};
use crate::{
    codec::{decode_vapid_key, encode_key},
    error::{PushError, PushResult},
    notification::model::{PushSubscription, PushSubscriptionKeys, UnsubscribeRequest},
};

const DISABLE_FAILED: &str = "Failed to disable push notifications";

/// Page-side driver of the subscribe/unsubscribe handshake.
///
/// Holds no subscription state of its own: every operation asks the
/// registration for the current subscription.
pub struct PushSubscriptionManager {
    registration: Option<Registration>,
    page: Arc<dyn PageHost>,
    server: Arc<dyn SubscriptionServer>,
    view: StatusView,
}

impl PushSubscriptionManager {
    pub fn new(
        registration: Option<Registration>,
        page: Arc<dyn PageHost>,
        server: Arc<dyn SubscriptionServer>,
        dom: Arc<dyn Dom>,
    ) -> Self {
        Self {
            registration,
            page,
            server,
            view: StatusView::new(dom),
        }
    }

    /// Page-load sequence: register the worker, then show the current status.
    pub async fn bootstrap(
        container: &dyn WorkerContainer,
        page: Arc<dyn PageHost>,
        server: Arc<dyn SubscriptionServer>,
        dom: Arc<dyn Dom>,
    ) -> Self {
        let registration = ServiceWorkerController::register(container).await;
        let manager = Self::new(registration, page, server, dom);
        manager.check_status().await;
        manager
    }

    pub fn is_available(&self) -> bool {
        self.registration.is_some()
    }

    /// Query the platform and render. `None` without a registration or when
    /// the platform query fails.
    pub async fn check_status(&self) -> Option<SubscriptionStatus> {
        let registration = self.registration.as_ref()?;
        let status = match registration.get_subscription().await {
            Ok(subscription) => SubscriptionStatus::from_subscribed(subscription.is_some()),
            Err(err) => {
                log::warn!("[Push] Could not read subscription: {err}");
                return None;
            }
        };
        self.view.render(status);
        Some(status)
    }

    pub async fn enable(&self) -> PushResult<SubscriptionStatus> {
        match self.try_enable().await {
            Ok(status) => Ok(status),
            Err(err) => {
                match &err {
                    PushError::Unsupported => log::info!("[Push] Push not available on this page"),
                    PushError::PermissionDenied => {
                        log::info!("[Push] Notification permission denied")
                    }
                    e if e.is_configuration_defect() => {
                        log::error!("[Push] Configuration error: {e}")
                    }
                    e => log::error!("[Push] Error enabling push notifications: {e}"),
                }
                if let Some(message) = err.user_message() {
                    self.page.alert(message);
                }
                Err(err)
            }
        }
    }

    async fn try_enable(&self) -> PushResult<SubscriptionStatus> {
        let registration = self.registration.as_ref().ok_or(PushError::Unsupported)?;

        if self.page.request_permission().await != Permission::Granted {
            return Err(PushError::PermissionDenied);
        }

        let vapid_key = self
            .page
            .vapid_public_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or(PushError::MissingVapidKey)?;
        let application_server_key = decode_vapid_key(&vapid_key)?;

        let subscription = registration
            .subscribe(SubscribeOptions {
                user_visible_only: true,
                application_server_key,
            })
            .await?;

        if let Err(err) = self.server.subscribe(&wire_subscription(&subscription)).await {
            self.roll_back(registration, &subscription).await;
            return Err(err);
        }

        log::info!("[Push] Subscribed: {}", subscription.endpoint);
        Ok(self
            .check_status()
            .await
            .unwrap_or(SubscriptionStatus::Subscribed))
    }

    /// Undo a platform subscription the server never recorded, so the page
    /// does not report a subscription that will never receive pushes.
    async fn roll_back(&self, registration: &Registration, subscription: &PlatformSubscription) {
        match registration.unsubscribe(subscription).await {
            Ok(_) => log::warn!(
                "[Push] Server rejected subscription, unsubscribed {}",
                subscription.endpoint
            ),
            Err(err) => log::error!("[Push] Rollback of {} failed: {err}", subscription.endpoint),
        }
        self.check_status().await;
    }

    /// Platform first, server second: a failed server call still leaves the
    /// browser unsubscribed.
    pub async fn disable(&self) -> PushResult<SubscriptionStatus> {
        let Some(registration) = self.registration.as_ref() else {
            return Err(PushError::Unsupported);
        };

        let result = self.try_disable(registration).await;
        let status = self.check_status().await;
        match result {
            Ok(()) => Ok(status.unwrap_or(SubscriptionStatus::NotSubscribed)),
            Err(err) => {
                log::error!("[Push] Error disabling push notifications: {err}");
                self.page.alert(DISABLE_FAILED);
                Err(err)
            }
        }
    }

    async fn try_disable(&self, registration: &Registration) -> PushResult<()> {
        let Some(subscription) = registration.get_subscription().await? else {
            return Ok(());
        };
        registration.unsubscribe(&subscription).await?;
        self.server
            .unsubscribe(&UnsubscribeRequest {
                endpoint: subscription.endpoint.clone(),
            })
            .await?;
        log::info!("[Push] Unsubscribed: {}", subscription.endpoint);
        Ok(())
    }
}

fn wire_subscription(subscription: &PlatformSubscription) -> PushSubscription {
    PushSubscription {
        endpoint: subscription.endpoint.clone(),
        keys: PushSubscriptionKeys {
            p256dh: encode_key(&subscription.p256dh),
            auth: encode_key(&subscription.auth),
        },
    }
}
