use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Server-side copy of a browser subscription, keys as unpadded base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
    Full,
}

/// Subscriptions keyed by push endpoint.
#[derive(Debug, Default)]
pub struct SubscriptionStore {
    subscriptions: HashMap<String, StoredSubscription>,
    capacity: usize,
}

impl SubscriptionStore {
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            subscriptions: HashMap::new(),
            capacity,
        }
    }

    /// Insert or refresh keys for an endpoint. A known endpoint is always
    /// accepted; a new one only while under the capacity limit.
    pub fn upsert(&mut self, subscription: StoredSubscription) -> Upsert {
        if let Some(existing) = self.subscriptions.get_mut(&subscription.endpoint) {
            *existing = subscription;
            return Upsert::Updated;
        }
        if self.subscriptions.len() >= self.capacity {
            return Upsert::Full;
        }
        self.subscriptions
            .insert(subscription.endpoint.clone(), subscription);
        Upsert::Created
    }

    pub fn remove(&mut self, endpoint: &str) -> bool {
        self.subscriptions.remove(endpoint).is_some()
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.subscriptions.len();
        self.subscriptions.clear();
        removed
    }

    pub fn get(&self, endpoint: &str) -> Option<&StoredSubscription> {
        self.subscriptions.get(endpoint)
    }

    pub fn snapshot(&self) -> Vec<StoredSubscription> {
        self.subscriptions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
