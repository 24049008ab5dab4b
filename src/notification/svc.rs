use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use request_http_parser::parser::Request as HttpRequest;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

use super::{
    model::{
        DeliveryReport, ErrorBody, PushPayload, PushSubscription, StatusBody, UnsubscribeRequest,
    },
    store::{StoredSubscription, SubscriptionStore, Upsert},
};
use crate::{
    cfg::Config,
    codec::normalize_subscription_key,
    server::{BAD_REQUEST, INTERNAL_ERROR, OK_RESPONSE, SERVICE_UNAVAILABLE},
};

pub type SharedStore = Arc<RwLock<SubscriptionStore>>;

/// One week, matching how long a daily reminder stays relevant.
pub const PUSH_TTL_SECONDS: u32 = 60 * 60 * 24 * 7;
/// A newer reminder replaces an undelivered one with the same topic.
pub const PUSH_TOPIC: &str = "daily-reading";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("endpoint must use HTTPS")]
    InsecureEndpoint,
    #[error("missing encryption keys")]
    MissingKeys,
    #[error("invalid P256DH key encoding")]
    InvalidP256dh,
    #[error("invalid Auth key encoding")]
    InvalidAuth,
}

/// Check an incoming subscription and normalise its keys for storage.
pub fn validate_subscription(
    sub: &PushSubscription,
) -> Result<StoredSubscription, ValidationError> {
    match Url::parse(&sub.endpoint) {
        Ok(url) if url.scheme() == "https" && url.host_str().is_some() => {}
        _ => return Err(ValidationError::InsecureEndpoint),
    }
    if sub.keys.p256dh.is_empty() || sub.keys.auth.is_empty() {
        return Err(ValidationError::MissingKeys);
    }
    let p256dh = normalize_subscription_key(&sub.keys.p256dh)
        .map_err(|_| ValidationError::InvalidP256dh)?;
    let auth =
        normalize_subscription_key(&sub.keys.auth).map_err(|_| ValidationError::InvalidAuth)?;
    Ok(StoredSubscription {
        endpoint: sub.endpoint.clone(),
        p256dh,
        auth,
    })
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The push service no longer knows this subscription.
    Gone,
    Throttled,
}

pub fn classify_push_status(status: u16) -> Option<Delivery> {
    match status {
        200..=299 => Some(Delivery::Delivered),
        404 | 410 => Some(Delivery::Gone),
        429 => Some(Delivery::Throttled),
        _ => None,
    }
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, subscription: &StoredSubscription, payload: &[u8]) -> Result<Delivery>;
}

/// VAPID-signed, aes128gcm-encrypted delivery over reqwest.
pub struct WebPushSender {
    client: reqwest::Client,
    vapid_private_key: String,
    subject: String,
}

impl WebPushSender {
    pub fn new(vapid_private_key: &str, subject: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            vapid_private_key: vapid_private_key.to_string(),
            subject: subject.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Option<Self> {
        config
            .vapid_signing_key()
            .map(|key| Self::new(key, &config.vapid_subject))
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(&self, subscription: &StoredSubscription, payload: &[u8]) -> Result<Delivery> {
        use web_push::{
            ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessageBuilder,
        };

        let sub_info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.p256dh,
            &subscription.auth,
        );
        let mut sig_builder = VapidSignatureBuilder::from_base64(&self.vapid_private_key, &sub_info)
            .context("Failed to build VAPID signature")?;
        sig_builder.add_claim("sub", self.subject.as_str());
        let signature = sig_builder.build().context("Failed to sign VAPID JWT")?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        set_delivery_options(&mut builder);
        let message = builder.build().context("Failed to build web push message")?;

        let mut request = self.client.post(message.endpoint.to_string());
        for (key, value) in delivery_headers(&message) {
            request = request.header(key, value);
        }
        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");
            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }
            request = request.body(push_payload.content);
        }

        let response = request.send().await.context("Web push HTTP request failed")?;
        let status = response.status().as_u16();
        match classify_push_status(status) {
            Some(delivery) => Ok(delivery),
            None => {
                let body = response.text().await.unwrap_or_default();
                Err(anyhow!("Web push send failed (HTTP {status}): {body}"))
            }
        }
    }
}

fn set_delivery_options(builder: &mut web_push::WebPushMessageBuilder<'_>) {
    builder.set_ttl(PUSH_TTL_SECONDS);
    builder.set_urgency(web_push::Urgency::Normal);
    builder.set_topic(PUSH_TOPIC.to_string());
}

/// Headers the push service reads for queueing, before any payload headers.
fn delivery_headers(message: &web_push::WebPushMessage) -> Vec<(&'static str, String)> {
    let mut headers = vec![("TTL", message.ttl.to_string())];
    if let Some(urgency) = &message.urgency {
        headers.push(("Urgency", urgency.to_string()));
    }
    if let Some(topic) = &message.topic {
        headers.push(("Topic", topic.clone()));
    }
    headers
}

/// Request handlers behind the `/push/*` routes.
pub struct Notification {
    store: SharedStore,
    sender: Option<Arc<dyn PushSender>>,
}

impl Notification {
    pub fn new(store: SharedStore, sender: Option<Arc<dyn PushSender>>) -> Self {
        if sender.is_none() {
            log::info!("[Server] VAPID keys not configured, push sending disabled");
        }
        Self { store, sender }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub async fn register_subs(&self, request: &HttpRequest) -> (String, String) {
        let push_subscription = match parse_body::<PushSubscription>(request) {
            Some(sub) => sub,
            None => return error_response(BAD_REQUEST, "invalid request"),
        };
        let stored = match validate_subscription(&push_subscription) {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("[Server] Rejected subscription: {err}");
                return error_response(BAD_REQUEST, &err.to_string());
            }
        };
        let endpoint = stored.endpoint.clone();
        match self.store.write().await.upsert(stored) {
            Upsert::Full => error_response(BAD_REQUEST, "maximum subscriptions reached"),
            outcome => {
                log::info!("[Server] Subscription {outcome:?}: {endpoint}");
                status_response("subscribed")
            }
        }
    }

    pub async fn remove_subs(&self, request: &HttpRequest) -> (String, String) {
        let unsubscribe = match parse_body::<UnsubscribeRequest>(request) {
            Some(req) => req,
            None => return error_response(BAD_REQUEST, "invalid request"),
        };
        if self.store.write().await.remove(&unsubscribe.endpoint) {
            log::info!("[Server] Subscription removed: {}", unsubscribe.endpoint);
        }
        status_response("unsubscribed")
    }

    pub async fn remove_all_subs(&self) -> (String, String) {
        let removed = self.store.write().await.clear();
        log::info!("[Server] Removed all {removed} subscriptions");
        status_response("all unsubscribed")
    }

    pub async fn push_notification(&self, request: &HttpRequest) -> (String, String) {
        let payload = match request.body.as_deref() {
            None | Some("") => PushPayload::default(),
            Some(body) => match serde_json::from_str::<PushPayload>(body) {
                Ok(payload) => payload,
                Err(_) => return error_response(BAD_REQUEST, "invalid request"),
            },
        };
        match self.broadcast(&payload).await {
            Ok(report) => json_response(OK_RESPONSE, &report),
            Err(err) => {
                log::error!("[Server] Broadcast failed: {err:#}");
                error_response(SERVICE_UNAVAILABLE, "push sending is not configured")
            }
        }
    }

    /// Send `payload` to every stored subscription, pruning the ones the
    /// push service reports as gone.
    pub async fn broadcast(&self, payload: &PushPayload) -> Result<DeliveryReport> {
        let sender = self
            .sender
            .as_ref()
            .context("VAPID keys not configured")?;
        let bytes = serde_json::to_vec(payload)?;
        let subscriptions = self.store.read().await.snapshot();

        let mut report = DeliveryReport::default();
        for subscription in &subscriptions {
            match sender.send(subscription, &bytes).await {
                Ok(Delivery::Delivered) => report.sent += 1,
                Ok(Delivery::Throttled) => {
                    log::warn!("[Server] Rate limited by {}", subscription.endpoint);
                    report.failed += 1;
                }
                Ok(Delivery::Gone) => {
                    if self.store.write().await.remove(&subscription.endpoint) {
                        log::info!(
                            "[Server] Deleted stale subscription: {}",
                            subscription.endpoint
                        );
                    }
                    report.removed += 1;
                }
                Err(err) => {
                    log::error!("[Server] Error sending notification: {err:#}");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(request: &HttpRequest) -> Option<T> {
    let body = request.body.as_deref()?;
    serde_json::from_str::<T>(body).ok()
}

fn json_response<T: Serialize>(head: &str, body: &T) -> (String, String) {
    match serde_json::to_string(body) {
        Ok(content) => (head.to_string(), content),
        Err(_) => (INTERNAL_ERROR.to_string(), String::new()),
    }
}

fn status_response(status: &'static str) -> (String, String) {
    json_response(OK_RESPONSE, &StatusBody { status })
}

fn error_response(head: &str, error: &str) -> (String, String) {
    json_response(
        head,
        &ErrorBody {
            error: error.to_string(),
        },
    )
}
