//! In-memory stand-ins for the browser and the server.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use super::{
    platform::{
        Dom, PageHost, Permission, PlatformSubscription, PushManager, Registration,
        SubscribeOptions, WorkerContainer,
    },
    sync::SubscriptionServer,
    view::{BADGE_ID, DISABLE_BUTTON_ID, ENABLE_BUTTON_ID},
};
use crate::{
    error::{PushError, PushResult},
    notification::model::{PushSubscription, UnsubscribeRequest},
};

#[derive(Default)]
struct Element {
    text: Option<String>,
    classes: BTreeSet<String>,
}

#[derive(Default)]
pub struct FakeDom {
    elements: Mutex<HashMap<String, Element>>,
}

impl FakeDom {
    pub fn new(ids: &[&str]) -> Self {
        let elements = ids
            .iter()
            .map(|id| (id.to_string(), Element::default()))
            .collect();
        Self {
            elements: Mutex::new(elements),
        }
    }

    pub fn with_status_elements() -> Self {
        Self::new(&[ENABLE_BUTTON_ID, DISABLE_BUTTON_ID, BADGE_ID])
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.elements
            .lock()
            .unwrap()
            .get(id)
            .and_then(|e| e.text.clone())
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements
            .lock()
            .unwrap()
            .get(id)
            .is_some_and(|e| e.classes.contains(class))
    }
}

impl Dom for FakeDom {
    fn has_element(&self, id: &str) -> bool {
        self.elements.lock().unwrap().contains_key(id)
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(e) = self.elements.lock().unwrap().get_mut(id) {
            e.text = Some(text.to_string());
        }
    }

    fn add_class(&self, id: &str, class: &str) {
        if let Some(e) = self.elements.lock().unwrap().get_mut(id) {
            e.classes.insert(class.to_string());
        }
    }

    fn remove_class(&self, id: &str, class: &str) {
        if let Some(e) = self.elements.lock().unwrap().get_mut(id) {
            e.classes.remove(class);
        }
    }
}

pub struct FakePushManager {
    current: Mutex<Option<PlatformSubscription>>,
    pub subscribe_options: Mutex<Vec<SubscribeOptions>>,
    pub unsubscribe_calls: AtomicUsize,
    counter: AtomicUsize,
}

impl FakePushManager {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            subscribe_options: Mutex::new(Vec::new()),
            unsubscribe_calls: AtomicUsize::new(0),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn subscribed(endpoint: &str) -> Self {
        let manager = Self::new();
        *manager.current.lock().unwrap() = Some(PlatformSubscription {
            endpoint: endpoint.to_string(),
            p256dh: vec![4, 1, 2],
            auth: vec![9, 9],
        });
        manager
    }

    pub fn current(&self) -> Option<PlatformSubscription> {
        self.current.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushManager for FakePushManager {
    async fn get_subscription(&self) -> PushResult<Option<PlatformSubscription>> {
        Ok(self.current())
    }

    async fn subscribe(&self, options: SubscribeOptions) -> PushResult<PlatformSubscription> {
        if options.application_server_key.is_empty() {
            return Err(PushError::Platform("applicationServerKey is empty".to_string()));
        }
        self.subscribe_options.lock().unwrap().push(options);
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let sub = PlatformSubscription {
            endpoint: format!("https://push.example.com/send/{n}"),
            p256dh: vec![0x04, 0xfb, 0xff],
            auth: vec![0x01, 0x02, 0x03, 0x04],
        };
        *self.current.lock().unwrap() = Some(sub.clone());
        Ok(sub)
    }

    async fn unsubscribe(&self, subscription: &PlatformSubscription) -> PushResult<bool> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        let mut current = self.current.lock().unwrap();
        if current.as_ref().map(|s| &s.endpoint) == Some(&subscription.endpoint) {
            *current = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

pub struct FakeContainer {
    pub supported: bool,
    pub fail: bool,
    pub manager: Arc<FakePushManager>,
    pub registered: Mutex<Vec<(String, String)>>,
}

impl FakeContainer {
    pub fn new(manager: Arc<FakePushManager>) -> Self {
        Self {
            supported: true,
            fail: false,
            manager,
            registered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WorkerContainer for FakeContainer {
    fn supports_push(&self) -> bool {
        self.supported
    }

    async fn register(&self, script_url: &str, scope: &str) -> PushResult<Registration> {
        if self.fail {
            return Err(PushError::Platform("SecurityError".to_string()));
        }
        self.registered
            .lock()
            .unwrap()
            .push((script_url.to_string(), scope.to_string()));
        let registration: Registration = self.manager.clone();
        Ok(registration)
    }
}

pub struct FakePage {
    pub permission: Permission,
    pub vapid_key: Option<String>,
    pub alerts: Mutex<Vec<String>>,
    pub permission_requests: AtomicUsize,
}

impl FakePage {
    pub fn granting(vapid_key: Option<&str>) -> Self {
        Self {
            permission: Permission::Granted,
            vapid_key: vapid_key.map(str::to_string),
            alerts: Mutex::new(Vec::new()),
            permission_requests: AtomicUsize::new(0),
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageHost for FakePage {
    async fn request_permission(&self) -> Permission {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        self.permission
    }

    fn vapid_public_key(&self) -> Option<String> {
        self.vapid_key.clone()
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCall {
    Subscribe(PushSubscription),
    Unsubscribe(UnsubscribeRequest),
}

#[derive(Default)]
pub struct FakeServer {
    pub reject_with: Option<u16>,
    pub calls: Mutex<Vec<ServerCall>>,
}

impl FakeServer {
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ServerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn outcome(&self) -> PushResult<()> {
        match self.reject_with {
            Some(status) => Err(PushError::Server { status }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SubscriptionServer for FakeServer {
    async fn subscribe(&self, subscription: &PushSubscription) -> PushResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ServerCall::Subscribe(subscription.clone()));
        self.outcome()
    }

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> PushResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ServerCall::Unsubscribe(request.clone()));
        self.outcome()
    }
}
