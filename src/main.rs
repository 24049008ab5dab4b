use std::sync::Arc;

use anyhow::Result;
use readwillbe_push::{
    cfg::init_config,
    notification::{
        store::SubscriptionStore,
        svc::{Notification, PushSender, WebPushSender},
    },
    server::Server,
};
use tokio::sync::{RwLock, oneshot};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = init_config()?;

    let store = Arc::new(RwLock::new(SubscriptionStore::with_capacity_limit(
        config.max_subscriptions,
    )));
    let sender = WebPushSender::from_config(&config).map(|s| Arc::new(s) as Arc<dyn PushSender>);
    let server = Server::new(Arc::new(Notification::new(store, sender)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    server.start(&config.listen_addr, shutdown_rx).await
}
