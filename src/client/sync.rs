use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{
    error::{PushError, PushResult},
    notification::model::{PushSubscription, UnsubscribeRequest},
};

pub const SUBSCRIBE_PATH: &str = "/push/subscribe";
pub const UNSUBSCRIBE_PATH: &str = "/push/unsubscribe";

/// The application server's copy of the subscription.
#[async_trait]
pub trait SubscriptionServer: Send + Sync {
    async fn subscribe(&self, subscription: &PushSubscription) -> PushResult<()>;
    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> PushResult<()>;
}

pub struct HttpSubscriptionServer {
    client: Client,
    subscribe_url: Url,
    unsubscribe_url: Url,
}

impl HttpSubscriptionServer {
    pub fn new(origin: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: Client::new(),
            subscribe_url: origin.join(SUBSCRIBE_PATH)?,
            unsubscribe_url: origin.join(UNSUBSCRIBE_PATH)?,
        })
    }

    async fn post_json<T: serde::Serialize + Sync>(&self, url: &Url, body: &T) -> PushResult<()> {
        // `json` sets Content-Type: application/json
        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PushError::Server {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl SubscriptionServer for HttpSubscriptionServer {
    async fn subscribe(&self, subscription: &PushSubscription) -> PushResult<()> {
        self.post_json(&self.subscribe_url, subscription).await
    }

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> PushResult<()> {
        self.post_json(&self.unsubscribe_url, request).await
    }
}
