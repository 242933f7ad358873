//! Golden exposition vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serverinfo_core::metrics::{export, export_with_gauges, Registry};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn counter_lines_differ_only_by_method() {
    let reg = Registry::new();
    let requests = reg
        .register_counter("requests_total", "Total requests.", &["method", "path"])
        .unwrap();
    // registration order and increment order do not affect output
    reg.increment(&requests, &["POST", "/"]).unwrap();
    reg.increment(&requests, &["GET", "/"]).unwrap();

    assert_eq!(export(&reg), load("requests_by_method.prom"));
}

#[test]
fn histogram_single_observation() {
    let reg = Registry::new();
    let latency = reg
        .register_histogram("latency_seconds", "Request latency.", &["path"], &[0.1, 0.5, 1.0])
        .unwrap();
    reg.observe(&latency, &["/"], 0.3).unwrap();

    assert_eq!(export(&reg), load("latency_single_observation.prom"));
}

#[test]
fn families_sorted_by_name_then_labels() {
    let reg = Registry::new();
    let requests = reg
        .register_counter("requests_total", "Total requests.", &["method", "path"])
        .unwrap();
    let latency = reg
        .register_histogram("latency_seconds", "Request latency.", &["path"], &[0.1, 0.5, 1.0])
        .unwrap();

    requests.inc(&["GET", "/health"]).unwrap();
    latency.observe(&["/health"], 2.0).unwrap();
    requests.inc(&["GET", "/"]).unwrap();
    latency.observe(&["/"], 0.05).unwrap();

    assert_eq!(
        export_with_gauges(&reg, &[("uptime_seconds", 7)]),
        load("mixed_families.prom")
    );
}

#[test]
fn fresh_registry_export_is_well_formed() {
    let reg = Registry::new();
    let out = export(&reg);
    assert!(out.is_empty());

    // with families declared but no traffic, every line is a comment
    reg.register_counter("requests_total", "Total requests.", &["method", "path"])
        .unwrap();
    reg.register_histogram("latency_seconds", "Request latency.", &["path"], &[0.1])
        .unwrap();
    let out = export(&reg);
    assert!(!out.is_empty());
    assert!(out.ends_with('\n'));
    assert!(out.lines().all(|l| l.starts_with("# HELP ") || l.starts_with("# TYPE ")));
}
