use thiserror::Error;

/// Failures of the page-side push flow.
///
/// None of these break the page; the worst outcome is that push
/// notifications stay unavailable.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("push-capable service workers are not supported")]
    Unsupported,

    #[error("notification permission denied")]
    PermissionDenied,

    #[error("VAPID public key is not configured on this page")]
    MissingVapidKey,

    #[error("VAPID public key is malformed: {0}")]
    InvalidVapidKey(#[from] base64::DecodeError),

    #[error("push platform error: {0}")]
    Platform(String),

    #[error("server rejected the request with HTTP {status}")]
    Server { status: u16 },

    #[error("request to the server failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PushError {
    /// Short message shown to the user when the flow aborts.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Unsupported => None,
            Self::PermissionDenied => Some("Notification permission denied"),
            Self::MissingVapidKey | Self::InvalidVapidKey(_) => Some("VAPID key not configured"),
            Self::Server { .. } => Some("Failed to save subscription"),
            Self::Platform(_) | Self::Transport(_) => Some("Failed to enable push notifications"),
        }
    }

    /// Deployment defects as opposed to user choices or transient faults.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(self, Self::MissingVapidKey | Self::InvalidVapidKey(_))
    }
}

pub type PushResult<T> = Result<T, PushError>;
