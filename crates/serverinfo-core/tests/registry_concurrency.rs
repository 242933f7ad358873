//! Concurrent accumulation through shared registry handles.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use serverinfo_core::metrics::{export, Registry, SampleValue};

const THREADS: usize = 8;
const PER_THREAD: usize = 5_000;

#[test]
fn concurrent_increments_are_not_lost() {
    let reg = Arc::new(Registry::new());
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                // every thread registers on its own; all must alias one family
                let c = reg
                    .register_counter("requests_total", "", &["method", "path"])
                    .unwrap();
                for _ in 0..PER_THREAD {
                    reg.increment(&c, &["GET", "/"]).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let c = reg
        .register_counter("requests_total", "", &["method", "path"])
        .unwrap();
    assert_eq!(c.get(&["GET", "/"]), Some((THREADS * PER_THREAD) as u64));
}

#[test]
fn concurrent_observations_stay_consistent() {
    let reg = Arc::new(Registry::new());
    let h = reg
        .register_histogram("latency_seconds", "", &["path"], &[0.1, 0.5, 1.0])
        .unwrap();

    let writers: Vec<_> = (0..THREADS)
        .map(|i| {
            let h = h.clone();
            thread::spawn(move || {
                let value = if i % 2 == 0 { 0.05 } else { 0.75 };
                for _ in 0..PER_THREAD {
                    h.observe(&["/"], value).unwrap();
                }
            })
        })
        .collect();

    // snapshots taken mid-flight must never show a torn accumulator
    let reader = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || {
            for _ in 0..200 {
                for family in reg.snapshot() {
                    for sample in family.samples {
                        if let SampleValue::Histogram(hist) = sample.value {
                            let last = hist.buckets.last().map(|(_, c)| *c).unwrap_or(0);
                            assert_eq!(last, hist.count);
                            assert!(hist.buckets.windows(2).all(|w| w[0].1 <= w[1].1));
                        }
                    }
                }
                let _ = export(&reg);
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();

    let snap = h.get(&["/"]).unwrap();
    let total = (THREADS * PER_THREAD) as u64;
    assert_eq!(snap.count, total);
    assert_eq!(snap.buckets[0].1, total / 2);
    assert_eq!(snap.buckets[2].1, total);
}

#[test]
fn independent_registries_do_not_interfere() {
    let a = Registry::new();
    let b = Registry::new();
    let ca = a.register_counter("requests_total", "", &["path"]).unwrap();
    let cb = b.register_counter("requests_total", "", &["path"]).unwrap();
    ca.inc(&["/"]).unwrap();
    ca.inc(&["/"]).unwrap();
    cb.inc(&["/"]).unwrap();
    assert!(!ca.same_family(&cb));
    assert_eq!(ca.get(&["/"]), Some(2));
    assert_eq!(cb.get(&["/"]), Some(1));
}
