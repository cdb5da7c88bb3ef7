//! Motion device contract
//!
//! [`LinearMotionDevice`] wraps a [`MotionDriver`] and guarantees the event
//! contract shared by every variant:
//! - `willMove`/`didMove` around moves and homing
//! - `didGetPosition` after every position read
//! - `will…`/`did…` pairs around initialization and shutdown
//! - every motion operation fails with `DeviceNotReady` outside the ready window
//!
//! Drivers only implement the raw primitives; they never post notifications.

mod debug;

pub use debug::DebugMotionDriver;

use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

use crate::error::{DeviceError, Result};
use crate::identity::ObjectId;
use crate::notification::{notification_center, DeviceNotification, NotificationCenter, UserInfo};
use crate::units::{Calibration, MicronPosition, StepPosition};

/// Lifecycle state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    /// Created but not yet initialized
    #[default]
    Unconfigured,
    /// Initialized and accepting operations
    Ready,
    /// Shut down; may be initialized again
    ShutDown,
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceState::Unconfigured => write!(f, "Unconfigured"),
            DeviceState::Ready => write!(f, "Ready"),
            DeviceState::ShutDown => write!(f, "ShutDown"),
        }
    }
}

/// Hardware primitives of one motion device variant
///
/// All positions are in native steps. Implementations perform the operation
/// and nothing else.
pub trait MotionDriver: Send {
    /// Short name used in logs
    fn name(&self) -> String;

    /// Native resolution of the hardware
    fn steps_per_micron(&self) -> f64;

    /// Acquire the hardware (resolve and open ports, handshake)
    fn do_initialize_device(&mut self) -> Result<()>;

    /// Release the hardware
    fn do_shutdown_device(&mut self) -> Result<()>;

    /// Read the current position
    fn do_get_position(&mut self) -> Result<StepPosition>;

    /// Move to an absolute position
    fn do_move_to(&mut self, position: StepPosition) -> Result<()>;

    /// Move by a relative displacement
    fn do_move_by(&mut self, displacement: StepPosition) -> Result<()> {
        let current = self.do_get_position()?;
        let destination = current.checked_add(&displacement)?;
        self.do_move_to(destination)
    }

    /// Return to the origin
    fn do_home(&mut self) -> Result<()> {
        self.do_move_to(StepPosition::ORIGIN)
    }
}

/// Lifecycle state and the driver, guarded together
struct Inner {
    state: DeviceState,
    driver: Box<dyn MotionDriver>,
}

/// A three-axis linear stage reporting its state changes through a notification center
///
/// The lifecycle check and the driver primitive run under one lock, so an
/// operation racing a shutdown either completes before it or fails with
/// `DeviceNotReady`. The lock is never held while posting.
pub struct LinearMotionDevice {
    id: ObjectId,
    center: Arc<NotificationCenter>,
    calibration: Calibration,
    inner: Mutex<Inner>,
}

impl LinearMotionDevice {
    /// Create a device around `driver`, calibrated at the driver's native resolution
    ///
    /// Notifications go to the process-wide center unless
    /// [`with_center`](Self::with_center) is used.
    pub fn new(driver: Box<dyn MotionDriver>) -> Result<Self> {
        let calibration = Calibration::new(driver.steps_per_micron())?;
        Ok(Self::with_driver(driver, calibration))
    }

    /// Create a device backed by the in-memory debug driver
    pub fn debug() -> Self {
        Self::with_driver(
            Box::new(DebugMotionDriver::new()),
            Calibration::SIXTEEN_MICROSTEPS,
        )
    }

    fn with_driver(driver: Box<dyn MotionDriver>, calibration: Calibration) -> Self {
        Self {
            id: ObjectId::new(),
            center: notification_center().clone(),
            calibration,
            inner: Mutex::new(Inner {
                state: DeviceState::Unconfigured,
                driver,
            }),
        }
    }

    /// Post notifications to `center` instead of the process-wide one
    pub fn with_center(mut self, center: Arc<NotificationCenter>) -> Self {
        self.center = center;
        self
    }

    /// Replace the driver's native calibration
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Identity used as the object of every notification this device posts
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    /// The notification center this device posts to
    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    /// Steps-per-micron calibration
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Current lifecycle state
    pub fn state(&self) -> DeviceState {
        self.inner.lock().state
    }

    /// Driver name
    pub fn name(&self) -> String {
        self.inner.lock().driver.name()
    }

    /// Bring the device into the ready state
    ///
    /// Does nothing if the device is already ready. When several threads
    /// initialize at once, the driver is initialized exactly once.
    pub fn initialize_device(&self) -> Result<()> {
        if self.state() == DeviceState::Ready {
            return Ok(());
        }

        self.post(DeviceNotification::WillInitializeDevice, None)?;
        {
            let mut inner = self.inner.lock();
            if inner.state == DeviceState::Ready {
                return Ok(());
            }
            if let Err(e) = inner.driver.do_initialize_device() {
                tracing::warn!("Failed to initialize {}: {}", self.id, e);
                return Err(e);
            }
            inner.state = DeviceState::Ready;
            tracing::info!("Device {} ({}) initialized", self.id, inner.driver.name());
        }
        self.post(DeviceNotification::DidInitializeDevice, None)?;
        Ok(())
    }

    /// Release the hardware
    ///
    /// Does nothing unless the device is ready. The device is considered shut
    /// down even if the driver reports an error while releasing.
    pub fn shutdown_device(&self) -> Result<()> {
        if self.state() != DeviceState::Ready {
            return Ok(());
        }

        self.post(DeviceNotification::WillShutdownDevice, None)?;
        {
            let mut inner = self.inner.lock();
            if inner.state != DeviceState::Ready {
                return Ok(());
            }
            let result = inner.driver.do_shutdown_device();
            inner.state = DeviceState::ShutDown;
            result?;
        }
        tracing::info!("Device {} shut down", self.id);
        self.post(DeviceNotification::DidShutdownDevice, None)?;
        Ok(())
    }

    /// Current position in steps
    pub fn position(&self) -> Result<StepPosition> {
        let position = self.with_ready_driver("position", |driver| driver.do_get_position())?;
        tracing::trace!("Device {} at {}", self.id, position);
        self.post(
            DeviceNotification::DidGetPosition,
            Some(coordinates("position", &position)),
        )?;
        Ok(position)
    }

    /// Current position in microns
    ///
    /// Reads through [`position`](Self::position), so observers see a single
    /// `didGetPosition` carrying the step position.
    pub fn position_in_microns(&self) -> Result<MicronPosition> {
        self.ensure_ready("position_in_microns")?;
        let steps = self.position()?;
        Ok(self.calibration.to_microns(&steps))
    }

    /// Move to an absolute position in steps
    pub fn move_to(&self, destination: StepPosition) -> Result<()> {
        self.ensure_ready("move_to")?;
        let info = coordinates("position", &destination);

        self.post(DeviceNotification::WillMove, Some(info.clone()))?;
        tracing::debug!("Device {} moving to {}", self.id, destination);
        self.with_ready_driver("move_to", |driver| driver.do_move_to(destination))?;
        self.post(DeviceNotification::DidMove, Some(info))?;
        Ok(())
    }

    /// Move by a displacement in steps
    pub fn move_by(&self, displacement: StepPosition) -> Result<()> {
        self.ensure_ready("move_by")?;
        let info = coordinates("displacement", &displacement);

        self.post(DeviceNotification::WillMove, Some(info.clone()))?;
        tracing::debug!("Device {} moving by {}", self.id, displacement);
        self.with_ready_driver("move_by", |driver| driver.do_move_by(displacement))?;
        self.post(DeviceNotification::DidMove, Some(info))?;
        Ok(())
    }

    /// Move to an absolute position in microns
    pub fn move_in_microns_to(&self, destination: MicronPosition) -> Result<()> {
        self.ensure_ready("move_in_microns_to")?;
        let steps = self.calibration.to_steps(&destination)?;
        self.move_to(steps)
    }

    /// Move by a displacement in microns
    pub fn move_in_microns_by(&self, displacement: MicronPosition) -> Result<()> {
        self.ensure_ready("move_in_microns_by")?;
        let steps = self.calibration.to_steps(&displacement)?;
        self.move_by(steps)
    }

    /// Return to the origin
    pub fn home(&self) -> Result<()> {
        self.ensure_ready("home")?;
        let info = coordinates("position", &StepPosition::ORIGIN);

        self.post(DeviceNotification::WillMove, Some(info.clone()))?;
        tracing::debug!("Device {} homing", self.id);
        self.with_ready_driver("home", |driver| driver.do_home())?;
        self.post(DeviceNotification::DidMove, Some(info))?;
        Ok(())
    }

    fn ensure_ready(&self, operation: &str) -> Result<()> {
        require_ready(operation, self.state())
    }

    /// Run a driver primitive, checking readiness under the same lock
    fn with_ready_driver<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut dyn MotionDriver) -> Result<T>,
    ) -> Result<T> {
        let mut inner = self.inner.lock();
        require_ready(operation, inner.state)?;
        f(inner.driver.as_mut())
    }

    fn post(&self, notification: DeviceNotification, user_info: Option<UserInfo>) -> Result<()> {
        self.center
            .post_notification(notification.as_str(), Some(self.id), user_info)?;
        Ok(())
    }
}

fn require_ready(operation: &str, state: DeviceState) -> Result<()> {
    if state != DeviceState::Ready {
        return Err(DeviceError::NotReady {
            operation: operation.to_string(),
            state: state.to_string(),
        }
        .into());
    }
    Ok(())
}

impl std::fmt::Debug for LinearMotionDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearMotionDevice")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("calibration", &self.calibration)
            .finish_non_exhaustive()
    }
}

fn coordinates(key: &str, position: &StepPosition) -> UserInfo {
    let mut info = UserInfo::new();
    info.insert(key.to_string(), json!(position.to_array()));
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ready_device() -> LinearMotionDevice {
        let device = LinearMotionDevice::debug().with_center(Arc::new(NotificationCenter::new()));
        device.initialize_device().unwrap();
        device
    }

    #[test]
    fn test_operations_before_initialization_fail() {
        let device = LinearMotionDevice::debug().with_center(Arc::new(NotificationCenter::new()));
        assert_eq!(device.state(), DeviceState::Unconfigured);

        assert!(device.position().unwrap_err().is_not_ready());
        assert!(device.move_to(StepPosition::new(1, 2, 3)).unwrap_err().is_not_ready());
        assert!(device.home().unwrap_err().is_not_ready());
        assert!(device
            .move_in_microns_by(MicronPosition::new(1.0, 1.0, 1.0))
            .unwrap_err()
            .is_not_ready());
    }

    #[test]
    fn test_operations_after_shutdown_fail() {
        let device = ready_device();
        device.move_to(StepPosition::new(4000, 5000, 6000)).unwrap();
        device.shutdown_device().unwrap();
        assert_eq!(device.state(), DeviceState::ShutDown);

        let err = device.position().unwrap_err();
        assert!(err.is_not_ready());
        assert!(err.to_string().contains("ShutDown"));
    }

    #[test]
    fn test_reinitialize_after_shutdown() {
        let device = ready_device();
        device.shutdown_device().unwrap();
        device.initialize_device().unwrap();
        assert_eq!(device.state(), DeviceState::Ready);
        assert!(device.position().is_ok());
    }

    #[test]
    fn test_lifecycle_notifications() {
        let center = Arc::new(NotificationCenter::new());
        let device = LinearMotionDevice::debug().with_center(center.clone());
        let observer = ObjectId::new();
        let count = Arc::new(AtomicUsize::new(0));

        for n in [
            DeviceNotification::WillInitializeDevice,
            DeviceNotification::DidInitializeDevice,
            DeviceNotification::WillShutdownDevice,
            DeviceNotification::DidShutdownDevice,
        ] {
            let c = count.clone();
            center.add_observer(
                observer,
                move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                n,
                Some(device.object_id()),
            );
        }

        device.initialize_device().unwrap();
        device.initialize_device().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        device.shutdown_device().unwrap();
        device.shutdown_device().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_calibration_is_fixed() {
        let device = ready_device();
        let before = device.calibration();
        device
            .move_in_microns_to(MicronPosition::new(10.0, 20.0, 30.0))
            .unwrap();
        device.position_in_microns().unwrap();
        assert_eq!(device.calibration(), before);
    }
}
