//! Process-wide notification bus for transient user-facing messages.
//!
//! Built on `tokio::sync::broadcast`: every subscriber gets its own cursor,
//! and a subscriber only sees events emitted after it subscribed. Dropping a
//! [`NotificationFeed`] unsubscribes it without touching the bus.
//!
//! ```text
//! controller ──▶ NotificationBus::show() ──▶ broadcast ──▶ toast view
//!                                                      ──▶ log sink
//! ```

use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// How long a view keeps an event on screen unless told otherwise.
pub const DEFAULT_DISPLAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => f.write_str("success"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub message: String,
    pub severity: Severity,
}

impl NotificationEvent {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Multicast channel of [`NotificationEvent`]s.
///
/// Cheap to clone; all clones share the same channel.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<NotificationEvent>,
    display_for: Duration,
}

impl NotificationBus {
    /// `capacity` bounds how far a subscriber may fall behind before it
    /// starts skipping events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            display_for: DEFAULT_DISPLAY,
        }
    }

    /// Sets how long views should show each event before it expires.
    pub fn with_display_for(mut self, display_for: Duration) -> Self {
        self.display_for = display_for;
        self
    }

    pub fn display_for(&self) -> Duration {
        self.display_for
    }

    /// Broadcasts one event. Never fails; with no subscribers it is dropped.
    pub fn show(&self, message: impl Into<String>, severity: Severity) {
        self.publish(NotificationEvent {
            message: message.into(),
            severity,
        });
    }

    pub fn publish(&self, event: NotificationEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> NotificationFeed {
        NotificationFeed {
            receiver: self.sender.subscribe(),
            display_for: self.display_for,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// One subscriber's live view of the bus.
#[derive(Debug)]
pub struct NotificationFeed {
    receiver: broadcast::Receiver<NotificationEvent>,
    display_for: Duration,
}

impl NotificationFeed {
    /// Display window of the bus this feed was taken from.
    pub fn display_for(&self) -> Duration {
        self.display_for
    }

    /// Waits for the next event. Returns `None` once every bus handle is gone.
    pub async fn next(&mut self) -> Option<NotificationEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber fell behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns an already delivered event without waiting.
    pub fn try_next(&mut self) -> Option<NotificationEvent> {
        use broadcast::error::TryRecvError;
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber fell behind");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drains everything delivered so far.
    pub fn drain(&mut self) -> Vec<NotificationEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
