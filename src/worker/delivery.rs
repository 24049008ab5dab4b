use serde_json::Value;

use super::{
    ClickedNotification, KeepAlive, NotificationData, NotificationOptions, ServiceWorkerGlobal,
};
use crate::notification::model::{PushData, PushPayload};

pub const DEFAULT_TITLE: &str = "ReadWillBe";
pub const DEFAULT_ICON: &str = "/static/icon-192.png";
pub const DEFAULT_BADGE: &str = "/static/badge-128.png";
pub const DEFAULT_URL: &str = "/";
const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl NotificationOptions {
    /// Fill in everything the payload left out or left empty.
    pub fn from_payload(payload: PushPayload) -> (String, Self) {
        let url = or_default(payload.data.and_then(|data| data.url), DEFAULT_URL);
        let options = Self {
            body: payload.body.unwrap_or_default(),
            icon: or_default(payload.icon, DEFAULT_ICON),
            badge: or_default(payload.badge, DEFAULT_BADGE),
            data: NotificationData { url },
            vibrate: VIBRATE_PATTERN.to_vec(),
            require_interaction: false,
        };
        (or_default(payload.title, DEFAULT_TITLE), options)
    }
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Parse push data field by field. A field of the wrong type falls back to
/// its default on its own; only bytes that are not JSON at all become a
/// plain-text body.
pub fn parse_payload(data: &[u8]) -> PushPayload {
    match serde_json::from_slice::<Value>(data) {
        Ok(value) => PushPayload {
            title: string_field(&value, "title"),
            body: string_field(&value, "body"),
            icon: string_field(&value, "icon"),
            badge: string_field(&value, "badge"),
            data: value.get("data").map(|data| PushData {
                url: string_field(data, "url"),
            }),
        },
        Err(err) => {
            log::warn!("[Worker] push data is not JSON: {err}");
            let text = String::from_utf8_lossy(data).trim().to_string();
            PushPayload {
                body: (!text.is_empty()).then_some(text),
                ..PushPayload::default()
            }
        }
    }
}

/// An empty push is a valid ping and shows nothing.
pub fn on_push<'a>(
    global: &'a dyn ServiceWorkerGlobal,
    data: Option<&[u8]>,
) -> Option<KeepAlive<'a>> {
    let data = data?;
    let (title, options) = NotificationOptions::from_payload(parse_payload(data));
    Some(Box::pin(async move {
        global.show_notification(&title, &options).await
    }))
}

pub fn on_notification_click(
    global: &dyn ServiceWorkerGlobal,
    notification: ClickedNotification,
) -> KeepAlive<'_> {
    global.close_notification(&notification);
    let target = notification
        .data
        .map(|data| data.url)
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    Box::pin(async move {
        let absolute = global
            .origin()
            .and_then(|origin| origin.join(&target).ok())
            .map(|url| url.to_string());
        let windows = global.match_windows().await?;
        let existing = windows.iter().find(|client| {
            client.focusable
                && (client.url == target || absolute.as_deref() == Some(client.url.as_str()))
        });
        match existing {
            Some(client) => global.focus(client).await,
            None if global.can_open_window() => global.open_window(&target).await,
            None => {
                log::warn!("[Worker] cannot open a window for {target}");
                Ok(())
            }
        }
    })
}
