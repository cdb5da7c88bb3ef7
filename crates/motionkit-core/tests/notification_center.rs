//! Behaviour of the notification center as seen by observers

use motionkit_core::{Notification, NotificationCenter, ObjectId, ObserverError, UserInfo};
use serde_json::json;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(
    log: &Log,
    tag: &str,
) -> impl Fn(&Notification) -> Result<(), ObserverError> + Send + Sync + 'static {
    let log = log.clone();
    let tag = tag.to_string();
    move |n: &Notification| {
        log.lock().unwrap().push(format!("{}:{}", tag, n.name()));
        Ok(())
    }
}

#[test]
fn test_repeated_registration_dispatches_once() {
    let center = NotificationCenter::new();
    let log: Log = Arc::default();
    let observer = ObjectId::new();

    center.add_observer(observer, recorder(&log, "a"), "didMove", None);
    center.add_observer(observer, recorder(&log, "a"), "didMove", None);

    let delivered = center.post_notification("didMove", None, None).unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(*log.lock().unwrap(), vec!["a:didMove"]);
}

#[test]
fn test_filter_wildcard_law() {
    let center = NotificationCenter::new();
    let log: Log = Arc::default();
    let device_a = ObjectId::new();
    let device_b = ObjectId::new();

    center.add_observer(ObjectId::new(), recorder(&log, "any"), "didMove", None);
    center.add_observer(ObjectId::new(), recorder(&log, "a-only"), "didMove", Some(device_a));

    center.post_notification("didMove", Some(device_a), None).unwrap();
    center.post_notification("didMove", Some(device_b), None).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["any:didMove", "a-only:didMove", "any:didMove"]
    );
}

#[test]
fn test_removal_scoping() {
    let center = NotificationCenter::new();
    let log: Log = Arc::default();
    let observer = ObjectId::new();
    let bystander = ObjectId::new();

    center.add_observer(observer, recorder(&log, "obs"), "willMove", None);
    center.add_observer(observer, recorder(&log, "obs"), "didMove", None);
    center.add_observer(bystander, recorder(&log, "other"), "willMove", None);
    assert_eq!(center.observers_count(), 3);

    assert_eq!(center.remove_observer(observer, Some("willMove"), None), 1);
    center.post_notification("willMove", None, None).unwrap();
    center.post_notification("didMove", None, None).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["other:willMove", "obs:didMove"]);

    assert_eq!(center.remove_observer(observer, None, None), 1);
    assert_eq!(center.observers_count(), 1);
}

#[test]
fn test_removal_narrowed_by_object() {
    let center = NotificationCenter::new();
    let observer = ObjectId::new();
    let device_a = ObjectId::new();
    let device_b = ObjectId::new();

    center.add_observer(observer, |_| Ok(()), "didMove", Some(device_a));
    center.add_observer(observer, |_| Ok(()), "didMove", Some(device_b));
    center.add_observer(observer, |_| Ok(()), "willMove", Some(device_a));

    assert_eq!(center.remove_observer(observer, None, Some(device_a)), 2);
    assert_eq!(center.observers_count(), 1);
}

#[test]
fn test_dispatch_follows_registration_order() {
    let center = NotificationCenter::new();
    let log: Log = Arc::default();

    for tag in ["first", "second", "third"] {
        center.add_observer(ObjectId::new(), recorder(&log, tag), "didGetPosition", None);
    }
    center.post_notification("didGetPosition", None, None).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "first:didGetPosition",
            "second:didGetPosition",
            "third:didGetPosition"
        ]
    );
}

#[test]
fn test_payload_reaches_observer() {
    let center = NotificationCenter::new();
    let seen = Arc::new(Mutex::new(None));
    let source = ObjectId::new();

    let s = seen.clone();
    center.add_observer(
        ObjectId::new(),
        move |n: &Notification| {
            *s.lock().unwrap() = Some((n.object(), n.get("position").cloned()));
            Ok(())
        },
        "didMove",
        None,
    );

    let mut info = UserInfo::new();
    info.insert("position".to_string(), json!([4000, 5000, 6000]));
    center
        .post_notification("didMove", Some(source), Some(info))
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        Some((Some(source), Some(json!([4000, 5000, 6000]))))
    );
}

#[test]
fn test_callbacks_may_mutate_registrations_during_dispatch() {
    let center = Arc::new(NotificationCenter::new());
    let log: Log = Arc::default();
    let late = ObjectId::new();
    let victim = ObjectId::new();

    // First observer removes the second and registers a third mid-dispatch.
    let c = Arc::downgrade(&center);
    let l = log.clone();
    center.add_observer(
        ObjectId::new(),
        move |n: &Notification| {
            l.lock().unwrap().push(format!("mutator:{}", n.name()));
            if let Some(center) = c.upgrade() {
                center.remove_observer(victim, None, None);
                center.add_observer(late, recorder(&l, "late"), "didMove", None);
            }
            Ok(())
        },
        "didMove",
        None,
    );
    center.add_observer(victim, recorder(&log, "victim"), "didMove", None);

    center.post_notification("didMove", None, None).unwrap();
    // The snapshot taken before dispatch still includes the victim, and not the late arrival.
    assert_eq!(
        *log.lock().unwrap(),
        vec!["mutator:didMove", "victim:didMove"]
    );

    log.lock().unwrap().clear();
    center.post_notification("didMove", None, None).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["mutator:didMove", "late:didMove"]
    );
}

#[test]
fn test_reentrant_post() {
    let center = Arc::new(NotificationCenter::new());
    let log: Log = Arc::default();

    let c = Arc::downgrade(&center);
    center.add_observer(
        ObjectId::new(),
        move |_: &Notification| {
            if let Some(center) = c.upgrade() {
                center.post_notification("didGetPosition", None, None)?;
            }
            Ok(())
        },
        "didMove",
        None,
    );
    center.add_observer(ObjectId::new(), recorder(&log, "reader"), "didGetPosition", None);

    center.post_notification("didMove", None, None).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["reader:didGetPosition"]);
}

#[test]
fn test_clear_resets_count() {
    let center = NotificationCenter::new();
    let observer = ObjectId::new();
    center.add_observer(observer, |_| Ok(()), "willMove", None);
    center.add_observer(observer, |_| Ok(()), "didMove", None);
    assert_eq!(center.observers_count(), 2);

    center.clear();
    assert_eq!(center.observers_count(), 0);
    assert_eq!(center.post_notification("didMove", None, None).unwrap(), 0);
}

#[test]
fn test_concurrent_registration_and_dispatch() {
    let center = Arc::new(NotificationCenter::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let center = center.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let observer = ObjectId::new();
                    center.add_observer(observer, |_| Ok(()), "didMove", None);
                    center.post_notification("didMove", None, None).unwrap();
                    center.remove_observer(observer, None, None);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(center.observers_count(), 0);
}
