//! Header alert store
//!
//! Two slots, one for the latest error and one for the latest success
//! message. Raising one kind clears the other. Each alert removes itself
//! after a TTL unless a newer alert of the same kind replaced it first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use relaychat_domain::constants::HEADER_ALERT_TTL_SECS;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Which slot an alert occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Error,
    Success,
}

/// One visible alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderAlert {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Identifies this alert for its expiry timer
    pub stamp: u64,
}

#[derive(Debug, Default)]
struct Slots {
    error: Option<HeaderAlert>,
    success: Option<HeaderAlert>,
}

impl Slots {
    fn slot_mut(&mut self, kind: AlertKind) -> &mut Option<HeaderAlert> {
        match kind {
            AlertKind::Error => &mut self.error,
            AlertKind::Success => &mut self.success,
        }
    }
}

#[derive(Debug)]
struct Inner {
    slots: Mutex<Slots>,
    next_stamp: AtomicU64,
    ttl: Duration,
}

impl Inner {
    fn clear_if_current(&self, kind: AlertKind, stamp: u64) {
        let mut slots = self.slots.lock();
        let slot = slots.slot_mut(kind);
        if slot.as_ref().is_some_and(|alert| alert.stamp == stamp) {
            *slot = None;
            debug!(?kind, stamp, "Header alert expired");
        }
    }
}

/// Shared error/success banner state
///
/// Clones share the same slots.
#[derive(Debug, Clone)]
pub struct HeaderAlertStore {
    inner: Arc<Inner>,
}

impl Default for HeaderAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderAlertStore {
    /// Store with the default 10 second TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(HEADER_ALERT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Slots::default()),
                next_stamp: AtomicU64::new(1),
                ttl,
            }),
        }
    }

    /// Show an error, replacing any success message
    ///
    /// Returns the stamp of the new alert.
    pub fn set_error(&self, message: impl Into<String>) -> u64 {
        self.raise(AlertKind::Error, message.into(), None)
    }

    /// Show a success message with optional payload, replacing any error
    ///
    /// Returns the stamp of the new alert.
    pub fn set_success(&self, message: impl Into<String>, data: Option<Value>) -> u64 {
        self.raise(AlertKind::Success, message.into(), data)
    }

    /// Currently visible error, if any
    pub fn error(&self) -> Option<HeaderAlert> {
        self.inner.slots.lock().error.clone()
    }

    /// Currently visible success message, if any
    pub fn success(&self) -> Option<HeaderAlert> {
        self.inner.slots.lock().success.clone()
    }

    /// Drop both alerts immediately
    pub fn dismiss_all(&self) {
        let mut slots = self.inner.slots.lock();
        slots.error = None;
        slots.success = None;
    }

    fn raise(&self, kind: AlertKind, message: String, data: Option<Value>) -> u64 {
        let stamp = self.inner.next_stamp.fetch_add(1, Ordering::Relaxed);
        {
            let mut slots = self.inner.slots.lock();
            let other = match kind {
                AlertKind::Error => AlertKind::Success,
                AlertKind::Success => AlertKind::Error,
            };
            *slots.slot_mut(other) = None;
            *slots.slot_mut(kind) = Some(HeaderAlert { message, data, stamp });
        }
        debug!(?kind, stamp, "Header alert raised");
        self.schedule_clear(kind, stamp);
        stamp
    }

    fn schedule_clear(&self, kind: AlertKind, stamp: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(?kind, stamp, "No runtime; header alert stays until replaced");
            return;
        };

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let deadline = tokio::time::Instant::now() + self.inner.ttl;
        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = inner.upgrade() {
                inner.clear_if_current(kind, stamp);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Paused clock: sleeping lets every earlier expiry timer run first.
    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    #[tokio::test(start_paused = true)]
    async fn error_clears_after_ttl() {
        let store = HeaderAlertStore::new();
        store.set_error("boom");
        assert_eq!(store.error().map(|a| a.message), Some("boom".to_string()));

        advance(Duration::from_secs(9)).await;
        assert!(store.error().is_some());

        advance(Duration::from_secs(2)).await;
        assert!(store.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn older_timer_never_clears_newer_alert() {
        let store = HeaderAlertStore::new();
        store.set_error("first");

        advance(Duration::from_secs(6)).await;
        let second = store.set_error("second");

        advance(Duration::from_secs(5)).await;
        let visible = store.error().unwrap();
        assert_eq!(visible.stamp, second);
        assert_eq!(visible.message, "second");

        advance(Duration::from_secs(6)).await;
        assert!(store.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn raising_one_kind_clears_the_other() {
        let store = HeaderAlertStore::new();
        store.set_error("failed");
        store.set_success("saved", Some(serde_json::json!({"id": "u1"})));

        assert!(store.error().is_none());
        let success = store.success().unwrap();
        assert_eq!(success.data, Some(serde_json::json!({"id": "u1"})));

        store.set_error("failed again");
        assert!(store.success().is_none());
    }

    #[test]
    fn works_without_runtime() {
        let store = HeaderAlertStore::with_ttl(Duration::from_millis(1));
        let stamp = store.set_error("offline");
        assert_eq!(store.error().map(|a| a.stamp), Some(stamp));

        store.dismiss_all();
        assert!(store.error().is_none());
    }
}
