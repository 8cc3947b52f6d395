//! Notification capability
//!
//! The engine hands a finished plain-text message to a [`Notifier`] and
//! treats delivery failure as transient: logged, reported in the run
//! summary, never fatal, and never a reason to roll back the observed
//! status (re-notifying on every transport outage would storm the
//! recipient).

mod telegram;

pub use telegram::TelegramNotifier;

use thiserror::Error;

/// Errors from delivering one notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Network-level failure reaching the transport
    #[error("notification request failed: {source}")]
    Http { source: reqwest::Error },

    /// The transport answered but refused the message
    #[error("notification rejected: {description}")]
    Rejected { description: String },
}

/// Capability interface: deliver one plain-text message
pub trait Notifier {
    fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

/// Build the human-readable message for one status observation
///
/// Carries everything the recipient needs to act: the tracking number, the
/// courier, the fresh status, and the last checkpoint when there is one.
pub fn format_status_message(
    number: &str,
    courier: &str,
    status: &str,
    checkpoint: &str,
) -> String {
    let mut message = format!("📦 *{number}* ({courier})\nStatus: _{status}_");
    if !checkpoint.is_empty() {
        message.push('\n');
        message.push_str(checkpoint);
    }
    message
}
