//! Benchmarks of pointers.
//!
//! Each group runs the same workload against `std::rc::Rc` as a control, and
//! against `SharedPtr` / `WeakPtr`.

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pointers::SharedPtr;

criterion_main!(lifecycle, weak);

// Number of handles created per iteration.
const HANDLES: usize = 1024;

criterion_group!(lifecycle, new_drop, clone_drop);

// Time to create and destroy a resource.
//
// `SharedPtr` allocates the control block separately from the resource, so
// this is two allocations against one for `Rc`.
fn new_drop(c: &mut Criterion) {
    c.bench_function("control new/drop", |b| b.iter(|| black_box(Rc::new(black_box(42u64)))));

    c.bench_function("shared new/drop", |b| b.iter(|| black_box(SharedPtr::new(black_box(42u64)))));
}

// Time to clone a handle HANDLES times, then drop all the clones.
fn clone_drop(c: &mut Criterion) {
    let name = format!("control clone/drop ({HANDLES})");
    let rc = Rc::new(42u64);

    c.bench_function(&name, |b| {
        b.iter(|| {
            let clones: Vec<_> = (0..HANDLES).map(|_| rc.clone()).collect();
            black_box(clones)
        })
    });

    let name = format!("shared clone/drop ({HANDLES})");
    let shared = SharedPtr::new(42u64);

    c.bench_function(&name, |b| {
        b.iter(|| {
            let clones: Vec<_> = (0..HANDLES).map(|_| shared.clone()).collect();
            black_box(clones)
        })
    });
}

criterion_group!(weak, downgrade_lock);

// Time to downgrade a handle, then lock it back, HANDLES times.
fn downgrade_lock(c: &mut Criterion) {
    let name = format!("control downgrade/upgrade ({HANDLES})");
    let rc = Rc::new(42u64);

    c.bench_function(&name, |b| {
        b.iter(|| {
            for _ in 0..HANDLES {
                let weak = Rc::downgrade(&rc);
                black_box(weak.upgrade());
            }
        })
    });

    let name = format!("shared downgrade/lock ({HANDLES})");
    let shared = SharedPtr::new(42u64);

    c.bench_function(&name, |b| {
        b.iter(|| {
            for _ in 0..HANDLES {
                let weak = SharedPtr::downgrade(&shared);
                black_box(weak.lock());
            }
        })
    });
}
