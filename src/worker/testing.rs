use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use url::Url;

use super::{ClickedNotification, NotificationOptions, ServiceWorkerGlobal, WindowClient};
use crate::error::PushResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCall {
    Close(String),
    Focus(String),
    Open(String),
}

pub struct FakeWorkerGlobal {
    pub windows: Vec<WindowClient>,
    pub open_supported: bool,
    pub skip_waiting_calls: AtomicUsize,
    pub claim_calls: AtomicUsize,
    shown: Mutex<Vec<(String, NotificationOptions)>>,
    calls: Mutex<Vec<WorkerCall>>,
}

impl FakeWorkerGlobal {
    pub fn new(windows: Vec<WindowClient>) -> Self {
        Self {
            windows,
            open_supported: true,
            skip_waiting_calls: AtomicUsize::new(0),
            claim_calls: AtomicUsize::new(0),
            shown: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<(String, NotificationOptions)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<WorkerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: WorkerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ServiceWorkerGlobal for FakeWorkerGlobal {
    fn origin(&self) -> Option<Url> {
        Url::parse("https://app.example/").ok()
    }

    fn skip_waiting(&self) {
        self.skip_waiting_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn claim_clients(&self) -> PushResult<()> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> PushResult<()> {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), options.clone()));
        Ok(())
    }

    fn close_notification(&self, notification: &ClickedNotification) {
        self.record(WorkerCall::Close(notification.tag.clone()));
    }

    async fn match_windows(&self) -> PushResult<Vec<WindowClient>> {
        Ok(self.windows.clone())
    }

    async fn focus(&self, client: &WindowClient) -> PushResult<()> {
        self.record(WorkerCall::Focus(client.id.clone()));
        Ok(())
    }

    fn can_open_window(&self) -> bool {
        self.open_supported
    }

    async fn open_window(&self, url: &str) -> PushResult<()> {
        self.record(WorkerCall::Open(url.to_string()));
        Ok(())
    }
}
