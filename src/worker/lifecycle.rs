use super::{KeepAlive, ServiceWorkerGlobal};

/// New worker code takes over without waiting for every tab to close.
pub fn on_install(global: &dyn ServiceWorkerGlobal) {
    log::debug!("[Worker] install, skipping waiting");
    global.skip_waiting();
}

/// Take control of already open pages, not only future navigations.
pub fn on_activate(global: &dyn ServiceWorkerGlobal) -> KeepAlive<'_> {
    Box::pin(async move {
        global.claim_clients().await?;
        log::debug!("[Worker] activated, clients claimed");
        Ok(())
    })
}
