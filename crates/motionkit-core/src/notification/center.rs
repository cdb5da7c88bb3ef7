//! Notification center implementation.
//!
//! Provides the [`NotificationCenter`] registry, its match predicate and the
//! process-wide instance.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::events::{Notification, UserInfo};
use crate::error::{Error, ObserverError, Result};
use crate::identity::ObjectId;

/// Type alias for observer callbacks
pub type ObserverCallback =
    Arc<dyn Fn(&Notification) -> std::result::Result<(), ObserverError> + Send + Sync>;

/// Identity fields of a subscription, used for matching
///
/// Absent name or object act as wildcards; the observer is always compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverKey {
    /// The subscribing observer
    pub observer: ObjectId,
    /// Event name, if scoped to one
    pub notification_name: Option<String>,
    /// Notifying object, if scoped to one
    pub observed_object: Option<ObjectId>,
}

impl ObserverKey {
    /// Build a key from its parts
    pub fn new(
        observer: ObjectId,
        notification_name: Option<String>,
        observed_object: Option<ObjectId>,
    ) -> Self {
        Self {
            observer,
            notification_name,
            observed_object,
        }
    }

    /// Partial-match predicate shared by duplicate suppression and removal
    pub fn matches(&self, other: &ObserverKey) -> bool {
        if let (Some(a), Some(b)) = (&self.notification_name, &other.notification_name) {
            if a != b {
                return false;
            }
        }
        if let (Some(a), Some(b)) = (self.observed_object, other.observed_object) {
            if a != b {
                return false;
            }
        }
        self.observer == other.observer
    }

    /// Whether a notification posted by `object` should reach this subscription
    pub fn accepts(&self, object: Option<ObjectId>) -> bool {
        match self.observed_object {
            None => true,
            Some(filter) => object == Some(filter),
        }
    }
}

/// One subscription: identity fields plus the callback to invoke
#[derive(Clone)]
pub struct ObserverRegistration {
    key: ObserverKey,
    callback: ObserverCallback,
}

impl ObserverRegistration {
    /// The identity fields of this registration
    pub fn key(&self) -> &ObserverKey {
        &self.key
    }

    fn invoke(&self, notification: &Notification) -> std::result::Result<(), ObserverError> {
        (self.callback)(notification)
    }
}

impl std::fmt::Debug for ObserverRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistration")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Registry mapping event names to the observers interested in them
///
/// Dispatch is synchronous: [`post_notification`](Self::post_notification)
/// runs every matching callback on the caller's thread before returning.
/// Callbacks run without the registry lock held, so they may add or remove
/// observers and post further notifications.
#[derive(Default)]
pub struct NotificationCenter {
    observers: RwLock<HashMap<String, Vec<Arc<ObserverRegistration>>>>,
}

impl NotificationCenter {
    /// Create an empty notification center
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `notification_name`, optionally scoped to one object
    ///
    /// Nothing is added when an existing registration for that name already
    /// matches, which makes repeated registration idempotent.
    pub fn add_observer<F>(
        &self,
        observer: ObjectId,
        callback: F,
        notification_name: impl Into<String>,
        observed_object: Option<ObjectId>,
    ) where
        F: Fn(&Notification) -> std::result::Result<(), ObserverError> + Send + Sync + 'static,
    {
        let name = notification_name.into();
        let key = ObserverKey::new(observer, Some(name.clone()), observed_object);

        let mut observers = self.observers.write();
        let registrations = observers.entry(name).or_default();
        if registrations.iter().any(|r| r.key.matches(&key)) {
            tracing::trace!(
                "Observer {} already registered for '{}'",
                observer,
                key.notification_name.as_deref().unwrap_or_default()
            );
            return;
        }

        tracing::debug!(
            "Observer {} added for '{}' (object: {:?})",
            observer,
            key.notification_name.as_deref().unwrap_or_default(),
            observed_object
        );
        registrations.push(Arc::new(ObserverRegistration {
            key,
            callback: Arc::new(callback),
        }));
    }

    /// Remove every registration of `observer` matching the optional filters
    ///
    /// Without a name, all of the observer's subscriptions are considered.
    /// Returns the number of registrations removed.
    pub fn remove_observer(
        &self,
        observer: ObjectId,
        notification_name: Option<&str>,
        observed_object: Option<ObjectId>,
    ) -> usize {
        let filter = ObserverKey::new(
            observer,
            notification_name.map(str::to_string),
            observed_object,
        );

        let mut observers = self.observers.write();
        let mut removed = 0;
        let mut prune = |registrations: &mut Vec<Arc<ObserverRegistration>>| {
            let before = registrations.len();
            registrations.retain(|r| !r.key.matches(&filter));
            removed += before - registrations.len();
        };

        match notification_name {
            Some(name) => {
                if let Some(registrations) = observers.get_mut(name) {
                    prune(registrations);
                }
            }
            None => observers.values_mut().for_each(&mut prune),
        }
        observers.retain(|_, registrations| !registrations.is_empty());

        if removed > 0 {
            tracing::debug!("Observer {} removed from {} registration(s)", observer, removed);
        }
        removed
    }

    /// Deliver a notification to every matching observer, in registration order
    ///
    /// Returns the number of callbacks invoked. The first callback error stops
    /// dispatch and is returned as [`Error::Observer`].
    pub fn post_notification(
        &self,
        notification_name: &str,
        object: Option<ObjectId>,
        user_info: Option<UserInfo>,
    ) -> Result<usize> {
        let snapshot: Vec<Arc<ObserverRegistration>> =
            match self.observers.read().get(notification_name) {
                Some(registrations) => registrations.clone(),
                None => return Ok(0),
            };

        let notification = Notification::new(notification_name, object, user_info);
        let mut delivered = 0;
        for registration in snapshot.iter().filter(|r| r.key.accepts(object)) {
            tracing::trace!(
                "Dispatching '{}' to {}",
                notification_name,
                registration.key.observer
            );
            registration
                .invoke(&notification)
                .map_err(|source| Error::Observer {
                    notification: notification_name.to_string(),
                    source,
                })?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Total number of registrations across all events
    pub fn observers_count(&self) -> usize {
        self.observers.read().values().map(Vec::len).sum()
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.observers.write().clear();
        tracing::debug!("Notification center cleared");
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("observers", &self.observers_count())
            .finish()
    }
}

/// Process-wide notification center
static NOTIFICATION_CENTER: OnceLock<Arc<NotificationCenter>> = OnceLock::new();

/// Get or initialize the process-wide notification center
///
/// Devices created without an explicit center post here.
pub fn notification_center() -> &'static Arc<NotificationCenter> {
    NOTIFICATION_CENTER.get_or_init(|| Arc::new(NotificationCenter::new()))
}
