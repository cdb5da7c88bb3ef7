use criterion::{black_box, criterion_group, criterion_main, Criterion};
use motionkit_core::{LinearMotionDevice, NotificationCenter, ObjectId, StepPosition};
use std::sync::Arc;

fn bench_post_notification(c: &mut Criterion) {
    let center = NotificationCenter::new();
    let source = ObjectId::new();
    for i in 0..32 {
        let filter = if i % 2 == 0 { Some(source) } else { None };
        center.add_observer(ObjectId::new(), |n| {
            black_box(n.name());
            Ok(())
        }, "didMove", filter);
    }

    c.bench_function("post_notification_32_observers", |b| {
        b.iter(|| center.post_notification(black_box("didMove"), Some(source), None))
    });
}

fn bench_add_remove(c: &mut Criterion) {
    let center = NotificationCenter::new();
    c.bench_function("add_remove_observer", |b| {
        b.iter(|| {
            let observer = ObjectId::new();
            center.add_observer(observer, |_| Ok(()), "willMove", None);
            center.remove_observer(observer, None, None)
        })
    });
}

fn bench_debug_move(c: &mut Criterion) {
    let center = Arc::new(NotificationCenter::new());
    center.add_observer(ObjectId::new(), |_| Ok(()), "didMove", None);
    let device = LinearMotionDevice::debug().with_center(center);
    device.initialize_device().expect("debug device initializes");

    c.bench_function("debug_move_by", |b| {
        b.iter(|| device.move_by(black_box(StepPosition::new(1, -1, 0))))
    });
}

criterion_group!(benches, bench_post_notification, bench_add_remove, bench_debug_move);
criterion_main!(benches);
