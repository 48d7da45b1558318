//! The process-wide descriptor cache.

use std::sync::Barrier;
use std::thread;

use graft::{Bean, Graft, registry};

#[derive(Bean, Clone, Debug, Default)]
struct Cached {
    id: Option<i64>,
}

#[test]
fn describe_is_idempotent_and_cached() {
    let first = registry::describe::<Cached>();
    let second = registry::describe::<Cached>();
    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(first, Cached::descriptor()));

    let looked_up = registry::lookup(first.type_id()).unwrap();
    assert!(std::ptr::eq(first, looked_up));

    // clearing forgets the index; re-describing restores it unchanged
    registry::clear();
    assert!(registry::lookup(first.type_id()).is_none());
    let again = registry::describe::<Cached>();
    assert!(std::ptr::eq(first, again));
}

#[test]
fn concurrent_first_describe_yields_one_descriptor() {
    #[derive(Bean, Clone, Debug, Default)]
    struct Raced {
        id: Option<i64>,
    }

    const THREADS: usize = 8;
    let barrier = Barrier::new(THREADS);
    let descriptors: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    registry::describe::<Raced>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for descriptor in &descriptors {
        assert!(std::ptr::eq(*descriptor, descriptors[0]));
    }
}
