use super::platform::{Registration, WorkerContainer};

pub const WORKER_SCRIPT: &str = "/serviceWorker.js";
/// The whole origin, so the worker sees every page.
pub const WORKER_SCOPE: &str = "/";

pub struct ServiceWorkerController {}

impl ServiceWorkerController {
    /// Register the worker script. Missing support or a failed registration
    /// both yield `None`; the feature is then simply unavailable.
    pub async fn register(container: &dyn WorkerContainer) -> Option<Registration> {
        if !container.supports_push() {
            log::info!("[Push] Service Worker not supported");
            return None;
        }
        match container.register(WORKER_SCRIPT, WORKER_SCOPE).await {
            Ok(registration) => {
                log::info!("[Push] Service Worker registered");
                Some(registration)
            }
            Err(err) => {
                log::error!("[Push] Service Worker registration failed: {err}");
                None
            }
        }
    }
}
