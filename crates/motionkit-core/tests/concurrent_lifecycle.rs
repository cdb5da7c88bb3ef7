//! Lifecycle transitions racing other operations on the same device

use motionkit_core::{
    DeviceNotification, DeviceState, LinearMotionDevice, MotionDriver, NotificationCenter,
    ObjectId, Result, StepPosition,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type DriverLog = Arc<Mutex<Vec<&'static str>>>;

/// Driver whose initialization and shutdown take a while, like opening a port
struct SlowDriver {
    log: DriverLog,
    open: bool,
}

impl MotionDriver for SlowDriver {
    fn name(&self) -> String {
        "slow".to_string()
    }

    fn steps_per_micron(&self) -> f64 {
        16.0
    }

    fn do_initialize_device(&mut self) -> Result<()> {
        thread::sleep(Duration::from_millis(100));
        if self.open {
            return Err(motionkit_core::ConnectionError::AlreadyOpen {
                port: "slow".to_string(),
            }
            .into());
        }
        self.open = true;
        self.log.lock().push("init");
        Ok(())
    }

    fn do_shutdown_device(&mut self) -> Result<()> {
        thread::sleep(Duration::from_millis(100));
        self.open = false;
        self.log.lock().push("shutdown");
        Ok(())
    }

    fn do_get_position(&mut self) -> Result<StepPosition> {
        Ok(StepPosition::ORIGIN)
    }

    fn do_move_to(&mut self, _position: StepPosition) -> Result<()> {
        self.log.lock().push("move");
        Ok(())
    }
}

fn slow_device() -> (Arc<LinearMotionDevice>, DriverLog, Arc<NotificationCenter>) {
    let log = DriverLog::default();
    let center = Arc::new(NotificationCenter::new());
    let driver = SlowDriver {
        log: log.clone(),
        open: false,
    };
    let device = LinearMotionDevice::new(Box::new(driver))
        .unwrap()
        .with_center(center.clone());
    (Arc::new(device), log, center)
}

#[test]
fn test_concurrent_initialization_runs_driver_once() {
    let (device, log, center) = slow_device();
    let initialized = Arc::new(AtomicUsize::new(0));
    let count = initialized.clone();
    center.add_observer(
        ObjectId::new(),
        move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        DeviceNotification::DidInitializeDevice,
        Some(device.object_id()),
    );

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let device = device.clone();
            thread::spawn(move || device.initialize_device())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(device.state(), DeviceState::Ready);
    assert_eq!(*log.lock(), vec!["init"]);
    assert_eq!(initialized.load(Ordering::SeqCst), 1);
}

#[test]
fn test_move_racing_shutdown_never_reaches_closed_driver() {
    let (device, log, _center) = slow_device();
    device.initialize_device().unwrap();

    let shutdown = {
        let device = device.clone();
        thread::spawn(move || device.shutdown_device())
    };
    thread::sleep(Duration::from_millis(20));
    let moved = device.move_to(StepPosition::new(1, 2, 3));
    shutdown.join().unwrap().unwrap();

    assert_eq!(device.state(), DeviceState::ShutDown);
    match moved {
        Ok(()) => assert_eq!(*log.lock(), vec!["init", "move", "shutdown"]),
        Err(e) => {
            assert!(e.is_not_ready());
            assert_eq!(*log.lock(), vec!["init", "shutdown"]);
        }
    }
}
