//! Text and control capabilities injected into the handlers.

use std::sync::Arc;
use std::time::Duration;

use teloxide::types::UserId;

use super::gateway::Control;

/// Prefix of the verification control's callback payload.
pub const UNMUTE_PREFIX: &str = "unmute.";

/// Renders user-facing templates by key.
pub trait TextProvider: Send + Sync {
    /// Render `key`, substituting each `{name}` with its value.
    fn render(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Builds the inline controls attached to challenge messages.
pub trait ControlBuilder: Send + Sync {
    fn verification_control(&self, member: UserId) -> Control;
}

/// Control builder producing `unmute.<id>` buttons labelled via the text provider.
#[derive(Clone)]
pub struct UnmuteControls {
    text: Arc<dyn TextProvider>,
}

impl UnmuteControls {
    pub fn new(text: Arc<dyn TextProvider>) -> Self {
        Self { text }
    }
}

impl ControlBuilder for UnmuteControls {
    fn verification_control(&self, member: UserId) -> Control {
        Control {
            label: self.text.render("not_a_bot", &[]),
            payload: format!("{}{}", UNMUTE_PREFIX, member.0),
        }
    }
}

/// Human-readable length of a window, e.g. "1 hour" or "90 seconds".
pub fn describe_window(window: Duration) -> String {
    let secs = window.as_secs();
    let (n, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };

    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Extract the pending member from an `unmute.<id>` payload.
///
/// Anything other than the prefix followed by decimal digits is rejected.
pub fn parse_unmute_payload(payload: &str) -> Option<UserId> {
    let digits = payload.strip_prefix(UNMUTE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(UserId)
}
