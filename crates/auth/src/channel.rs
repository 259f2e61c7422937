//! Process-wide session-change channel.
//!
//! The auth client publishes every sign-in, sign-out and token refresh here
//! exactly once; screens never subscribe to the auth client themselves. The
//! session guard is normally the only listener.
//!
//! - No IO / no async
//! - Listeners run synchronously on the publishing thread, in subscription order

use std::sync::{Arc, Mutex, Weak};

use crate::session::Session;

/// What caused a session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The first session lookup after startup finished.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    /// The session expired without being refreshed.
    Expired,
}

/// A published change: the event and the session that is now current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }
}

type Listener = Arc<dyn Fn(&SessionChange) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Fan-out of session changes to registered listeners.
///
/// Cloning the channel yields another handle to the same listener set.
#[derive(Clone, Default)]
pub struct SessionChannel {
    inner: Arc<Mutex<Listeners>>,
}

impl SessionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it stays registered until the returned
    /// subscription is dropped or [`SessionSubscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> SessionSubscription
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        // If the lock is poisoned, we still return a subscription;
        // it just won't receive changes.
        let id = match self.inner.lock() {
            Ok(mut listeners) => {
                let id = listeners.next_id;
                listeners.next_id += 1;
                listeners.entries.push((id, Arc::new(listener)));
                id
            }
            Err(_) => u64::MAX,
        };

        SessionSubscription {
            channel: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver `change` to every current listener.
    pub fn publish(&self, change: &SessionChange) {
        // Snapshot so listeners may subscribe/unsubscribe while being notified.
        let snapshot: Vec<Listener> = match self.inner.lock() {
            Ok(listeners) => listeners.entries.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };

        tracing::debug!(event = ?change.event, listeners = snapshot.len(), "session change");
        for listener in snapshot {
            listener(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|l| l.entries.len()).unwrap_or(0)
    }
}

impl core::fmt::Debug for SessionChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Unsubscribe handle returned by [`SessionChannel::subscribe`].
#[must_use = "dropping the subscription unsubscribes the listener"]
#[derive(Debug)]
pub struct SessionSubscription {
    channel: Weak<Mutex<Listeners>>,
    id: u64,
}

impl SessionSubscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    fn remove(&self) {
        if let Some(inner) = self.channel.upgrade() {
            if let Ok(mut listeners) = inner.lock() {
                listeners.entries.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publishes_to_all_listeners() {
        let channel = SessionChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h1 = Arc::clone(&hits);
        let _s1 = channel.subscribe(move |_| {
            h1.fetch_add(1, Ordering::SeqCst);
        });
        let h2 = Arc::clone(&hits);
        let _s2 = channel.subscribe(move |_| {
            h2.fetch_add(1, Ordering::SeqCst);
        });

        channel.publish(&SessionChange::new(AuthEvent::SignedOut, None));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let channel = SessionChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = channel.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(channel.listener_count(), 1);

        sub.unsubscribe();
        assert_eq!(channel.listener_count(), 0);

        channel.publish(&SessionChange::new(AuthEvent::SignedOut, None));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_outliving_channel_is_harmless() {
        let channel = SessionChannel::new();
        let sub = channel.subscribe(|_| {});
        drop(channel);
        drop(sub);
    }
}
