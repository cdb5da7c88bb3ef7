//! Notification value types.
//!
//! A [`Notification`] is the transient message handed to observer callbacks.
//! [`DeviceNotification`] names the events motion devices post.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::identity::ObjectId;

/// Optional key/value payload carried by a notification
pub type UserInfo = serde_json::Map<String, Value>;

/// One occurrence of a named event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    name: String,
    object: Option<ObjectId>,
    user_info: Option<UserInfo>,
}

impl Notification {
    /// Create a notification
    pub fn new(
        name: impl Into<String>,
        object: Option<ObjectId>,
        user_info: Option<UserInfo>,
    ) -> Self {
        Self {
            name: name.into(),
            object,
            user_info,
        }
    }

    /// Event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the object that posted the notification
    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    /// Payload, if any
    pub fn user_info(&self) -> Option<&UserInfo> {
        self.user_info.as_ref()
    }

    /// Look up one payload entry
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.user_info.as_ref().and_then(|info| info.get(key))
    }
}

/// Events posted by motion devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceNotification {
    /// Posted before a move (including homing) is applied
    WillMove,
    /// Posted after a move (including homing) has been applied
    DidMove,
    /// Posted after the position has been read
    DidGetPosition,
    /// Posted before the device is initialized
    WillInitializeDevice,
    /// Posted after the device became ready
    DidInitializeDevice,
    /// Posted before the device is shut down
    WillShutdownDevice,
    /// Posted after the device was shut down
    DidShutdownDevice,
}

impl DeviceNotification {
    /// All device notifications
    pub const ALL: [DeviceNotification; 7] = [
        DeviceNotification::WillMove,
        DeviceNotification::DidMove,
        DeviceNotification::DidGetPosition,
        DeviceNotification::WillInitializeDevice,
        DeviceNotification::DidInitializeDevice,
        DeviceNotification::WillShutdownDevice,
        DeviceNotification::DidShutdownDevice,
    ];

    /// Event name as registered with the notification center
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceNotification::WillMove => "willMove",
            DeviceNotification::DidMove => "didMove",
            DeviceNotification::DidGetPosition => "didGetPosition",
            DeviceNotification::WillInitializeDevice => "willInitializeDevice",
            DeviceNotification::DidInitializeDevice => "didInitializeDevice",
            DeviceNotification::WillShutdownDevice => "willShutdownDevice",
            DeviceNotification::DidShutdownDevice => "didShutdownDevice",
        }
    }
}

impl std::fmt::Display for DeviceNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceNotification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceNotification::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("Unknown device notification: {}", s))
    }
}

impl From<DeviceNotification> for String {
    fn from(notification: DeviceNotification) -> Self {
        notification.as_str().to_string()
    }
}
