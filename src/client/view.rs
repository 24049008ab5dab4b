use std::sync::Arc;

use super::platform::Dom;

pub const ENABLE_BUTTON_ID: &str = "enable-push-btn";
pub const DISABLE_BUTTON_ID: &str = "disable-push-btn";
pub const BADGE_ID: &str = "subscription-badge";

const HIDDEN: &str = "hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Subscribed,
    NotSubscribed,
}

impl SubscriptionStatus {
    pub fn from_subscribed(subscribed: bool) -> Self {
        if subscribed {
            Self::Subscribed
        } else {
            Self::NotSubscribed
        }
    }
}

/// What the three affordances should look like for a given status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusProjection {
    pub badge_text: &'static str,
    pub badge_remove: &'static [&'static str],
    pub badge_add: &'static str,
    pub enable_visible: bool,
    pub disable_visible: bool,
}

pub fn project(status: SubscriptionStatus) -> StatusProjection {
    match status {
        SubscriptionStatus::Subscribed => StatusProjection {
            badge_text: "Subscribed",
            badge_remove: &["badge-neutral"],
            badge_add: "badge-success",
            enable_visible: false,
            disable_visible: true,
        },
        SubscriptionStatus::NotSubscribed => StatusProjection {
            badge_text: "Not subscribed",
            badge_remove: &["badge-neutral", "badge-success"],
            badge_add: "badge-ghost",
            enable_visible: true,
            disable_visible: false,
        },
    }
}

/// The only writer of the enable button, disable button and badge.
pub struct StatusView {
    dom: Arc<dyn Dom>,
}

impl StatusView {
    pub fn new(dom: Arc<dyn Dom>) -> Self {
        Self { dom }
    }

    /// Returns false when the page lacks one of the elements.
    pub fn render(&self, status: SubscriptionStatus) -> bool {
        let present = [ENABLE_BUTTON_ID, DISABLE_BUTTON_ID, BADGE_ID]
            .iter()
            .all(|id| self.dom.has_element(id));
        if !present {
            return false;
        }

        let projection = project(status);
        self.dom.set_text(BADGE_ID, projection.badge_text);
        for class in projection.badge_remove {
            self.dom.remove_class(BADGE_ID, class);
        }
        self.dom.add_class(BADGE_ID, projection.badge_add);
        self.set_visible(ENABLE_BUTTON_ID, projection.enable_visible);
        self.set_visible(DISABLE_BUTTON_ID, projection.disable_visible);
        true
    }

    fn set_visible(&self, id: &str, visible: bool) {
        if visible {
            self.dom.remove_class(id, HIDDEN);
        } else {
            self.dom.add_class(id, HIDDEN);
        }
    }
}
