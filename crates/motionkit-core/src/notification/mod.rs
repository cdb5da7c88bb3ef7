//! # Notification Module
//!
//! In-process publish/subscribe hub connecting motion devices to the code
//! observing them.
//!
//! ## Overview
//!
//! - Observers register a callback for an event name, optionally scoped to
//!   the one object they care about
//! - Devices post notifications around every state transition
//! - Dispatch is synchronous and happens in registration order
//!
//! ## Usage
//!
//! ```rust
//! use motionkit_core::notification::{NotificationCenter, DeviceNotification};
//! use motionkit_core::ObjectId;
//!
//! let center = NotificationCenter::new();
//! let observer = ObjectId::new();
//!
//! center.add_observer(
//!     observer,
//!     |notification| {
//!         println!("{} from {:?}", notification.name(), notification.object());
//!         Ok(())
//!     },
//!     DeviceNotification::DidMove,
//!     None,
//! );
//!
//! center.post_notification("didMove", Some(ObjectId::new()), None).unwrap();
//!
//! // Drop every subscription of this observer
//! center.remove_observer(observer, None, None);
//! ```

mod center;
mod events;

pub use center::*;
pub use events::*;
