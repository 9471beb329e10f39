//! Terminal-outcome notifications.
//!
//! The coordinator reports each enrichment attempt to a sink exactly once,
//! after its final grid mutation is published. Sinks are fire-and-forget: a
//! sink whose consumer has gone away drops the message.
use serde::Serialize;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient, human-readable report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Consumer of notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that forwards into an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Notification>,
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::debug!("notification receiver dropped");
        }
    }
}

/// Create a channel sink and the receiver its notifications arrive on.
pub fn channel() -> (ChannelSink, Receiver<Notification>) {
    let (sender, receiver) = mpsc::channel();
    (ChannelSink { sender }, receiver)
}

impl<S: NotificationSink + ?Sized> NotificationSink for &S {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_delivers_in_order() {
        let (sink, receiver) = channel();
        sink.notify(Notification::info("first"));
        sink.notify(Notification::success("second"));
        let received: Vec<_> = receiver.try_iter().collect();
        assert_eq!(
            received,
            vec![Notification::info("first"), Notification::success("second")]
        );
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (sink, receiver) = channel();
        drop(receiver);
        sink.notify(Notification::error("nobody listening"));
    }

    #[test]
    fn display_prefixes_kind() {
        assert_eq!(
            Notification::error("Enrichment failed").to_string(),
            "[error] Enrichment failed"
        );
    }
}
