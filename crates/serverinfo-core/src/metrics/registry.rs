//! Metrics registry for request instrumentation.
//!
//! Families are stored by name in a `DashMap`; each family keeps its own
//! `DashMap` of accumulators keyed by [`LabelSet`]. Counters are single
//! atomics. Histogram state (buckets, count, sum) is mutated and copied under
//! the same shard lock, so a snapshot never observes a half-applied
//! observation.
//!
//! Registration is idempotent for an identical schema and returns a handle to
//! the existing family; any other clash is a configuration error and leaves
//! the registry untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{Result, ServerInfoError};
use crate::metrics::labels::{validate_label_names, validate_metric_name, LabelSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Histogram,
}

impl MetricKind {
    /// Type name used in `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
        }
    }
}

fn same_labels(registered: &[String], requested: &[&str]) -> bool {
    registered.iter().map(String::as_str).eq(requested.iter().copied())
}

// --------------------
// Counter family
// --------------------
#[derive(Debug)]
struct CounterFamily {
    registry_id: u64,
    name: String,
    help: String,
    label_names: Vec<String>,
    values: DashMap<LabelSet, AtomicU64>,
}

impl CounterFamily {
    fn inc(&self, label_values: &[&str]) -> Result<()> {
        let key = LabelSet::new(&self.label_names, label_values)?;
        // Fast path under the shard read lock once the accumulator exists.
        if let Some(counter) = self.values.get(&key) {
            counter.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        self.values
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn snapshot(&self) -> FamilySnapshot {
        let mut samples: Vec<SampleSnapshot> = self
            .values
            .iter()
            .map(|r| SampleSnapshot {
                labels: r.key().clone(),
                value: SampleValue::Counter(r.value().load(Ordering::Relaxed)),
            })
            .collect();
        samples.sort_by(|a, b| a.labels.cmp(&b.labels));
        FamilySnapshot {
            name: self.name.clone(),
            help: self.help.clone(),
            kind: MetricKind::Counter,
            label_names: self.label_names.clone(),
            samples,
        }
    }
}

/// Cheap, cloneable handle to a counter family.
#[derive(Debug, Clone)]
pub struct CounterHandle(Arc<CounterFamily>);

impl CounterHandle {
    /// Increment the accumulator for `label_values` by 1.
    pub fn inc(&self, label_values: &[&str]) -> Result<()> {
        self.0.inc(label_values)
    }

    /// Current value, or `None` if the label combination was never incremented.
    pub fn get(&self, label_values: &[&str]) -> Option<u64> {
        let key = LabelSet::new(&self.0.label_names, label_values).ok()?;
        self.0.values.get(&key).map(|c| c.load(Ordering::Relaxed))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Whether both handles point at the same family.
    pub fn same_family(&self, other: &CounterHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// --------------------
// Histogram family
// --------------------
#[derive(Debug, Clone)]
struct HistogramState {
    /// Cumulative counts, one per bound.
    buckets: Vec<u64>,
    count: u64,
    sum: f64,
}

impl HistogramState {
    fn new(n_bounds: usize) -> Self {
        Self {
            buckets: vec![0; n_bounds],
            count: 0,
            sum: 0.0,
        }
    }

    fn record(&mut self, bounds: &[f64], value: f64) {
        self.count += 1;
        self.sum += value;
        for (bucket, &le) in self.buckets.iter_mut().zip(bounds) {
            if value <= le {
                *bucket += 1;
            }
        }
    }

    fn to_snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: bounds.iter().copied().zip(self.buckets.iter().copied()).collect(),
            count: self.count,
            sum: self.sum,
        }
    }
}

#[derive(Debug)]
struct HistogramFamily {
    registry_id: u64,
    name: String,
    help: String,
    label_names: Vec<String>,
    bounds: Vec<f64>,
    values: DashMap<LabelSet, HistogramState>,
}

impl HistogramFamily {
    fn observe(&self, label_values: &[&str], value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(ServerInfoError::InvalidArgument(format!(
                "histogram {} cannot observe {value}",
                self.name
            )));
        }
        let key = LabelSet::new(&self.label_names, label_values)?;
        let mut state = self
            .values
            .entry(key)
            .or_insert_with(|| HistogramState::new(self.bounds.len()));
        state.record(&self.bounds, value);
        Ok(())
    }

    fn snapshot(&self) -> FamilySnapshot {
        let mut samples: Vec<SampleSnapshot> = self
            .values
            .iter()
            .map(|r| SampleSnapshot {
                labels: r.key().clone(),
                value: SampleValue::Histogram(r.value().to_snapshot(&self.bounds)),
            })
            .collect();
        samples.sort_by(|a, b| a.labels.cmp(&b.labels));
        FamilySnapshot {
            name: self.name.clone(),
            help: self.help.clone(),
            kind: MetricKind::Histogram,
            label_names: self.label_names.clone(),
            samples,
        }
    }
}

/// Cheap, cloneable handle to a histogram family.
#[derive(Debug, Clone)]
pub struct HistogramHandle(Arc<HistogramFamily>);

impl HistogramHandle {
    /// Record `value` (must be finite and >= 0).
    pub fn observe(&self, label_values: &[&str], value: f64) -> Result<()> {
        self.0.observe(label_values, value)
    }

    /// Copy of one accumulator, or `None` if nothing was observed for it.
    pub fn get(&self, label_values: &[&str]) -> Option<HistogramSnapshot> {
        let key = LabelSet::new(&self.0.label_names, label_values).ok()?;
        self.0
            .values
            .get(&key)
            .map(|s| s.to_snapshot(&self.0.bounds))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn bounds(&self) -> &[f64] {
        &self.0.bounds
    }
}

// --------------------
// Snapshots
// --------------------
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` pairs, excluding `+Inf`.
    pub buckets: Vec<(f64, u64)>,
    pub count: u64,
    pub sum: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Counter(u64),
    Histogram(HistogramSnapshot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSnapshot {
    pub labels: LabelSet,
    pub value: SampleValue,
}

/// Point-in-time copy of one family. Samples are sorted by label values.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    pub samples: Vec<SampleSnapshot>,
}

// --------------------
// Registry
// --------------------
#[derive(Debug, Clone)]
enum Family {
    Counter(Arc<CounterFamily>),
    Histogram(Arc<HistogramFamily>),
}

impl Family {
    fn describe(&self) -> String {
        match self {
            Family::Counter(c) => format!("counter [{}]", c.label_names.join(",")),
            Family::Histogram(h) => format!("histogram [{}]", h.label_names.join(",")),
        }
    }

    fn name(&self) -> &str {
        match self {
            Family::Counter(c) => &c.name,
            Family::Histogram(h) => &h.name,
        }
    }

    fn snapshot(&self) -> FamilySnapshot {
        match self {
            Family::Counter(c) => c.snapshot(),
            Family::Histogram(h) => h.snapshot(),
        }
    }
}

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Owner of all metric families. Share it behind an `Arc`.
///
/// Each registry carries a process-unique id stamped on its families, so a
/// handle from one registry is refused by another.
#[derive(Debug)]
pub struct Registry {
    id: u64,
    families: DashMap<String, Family>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            families: DashMap::new(),
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a counter family (idempotent for an identical schema).
    pub fn register_counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<CounterHandle> {
        validate_metric_name(name)?;
        validate_label_names(label_names, false)?;

        match self.families.entry(name.to_string()) {
            Entry::Occupied(e) => match e.get() {
                Family::Counter(c) if same_labels(&c.label_names, label_names) => {
                    Ok(CounterHandle(Arc::clone(c)))
                }
                other => Err(ServerInfoError::Configuration(format!(
                    "metric {name} already registered as {}",
                    other.describe()
                ))),
            },
            Entry::Vacant(e) => {
                let family = Arc::new(CounterFamily {
                    registry_id: self.id,
                    name: name.to_string(),
                    help: help.to_string(),
                    label_names: label_names.iter().map(|s| s.to_string()).collect(),
                    values: DashMap::new(),
                });
                e.insert(Family::Counter(Arc::clone(&family)));
                Ok(CounterHandle(family))
            }
        }
    }

    /// Declare a histogram family. `bounds` must be non-empty, finite, positive
    /// and strictly increasing; `+Inf` is implicit.
    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        bounds: &[f64],
    ) -> Result<HistogramHandle> {
        validate_metric_name(name)?;
        validate_label_names(label_names, true)?;
        validate_bounds(bounds)?;

        match self.families.entry(name.to_string()) {
            Entry::Occupied(e) => match e.get() {
                Family::Histogram(h)
                    if same_labels(&h.label_names, label_names) && h.bounds == bounds =>
                {
                    Ok(HistogramHandle(Arc::clone(h)))
                }
                other => Err(ServerInfoError::Configuration(format!(
                    "metric {name} already registered as {}",
                    other.describe()
                ))),
            },
            Entry::Vacant(e) => {
                let family = Arc::new(HistogramFamily {
                    registry_id: self.id,
                    name: name.to_string(),
                    help: help.to_string(),
                    label_names: label_names.iter().map(|s| s.to_string()).collect(),
                    bounds: bounds.to_vec(),
                    values: DashMap::new(),
                });
                e.insert(Family::Histogram(Arc::clone(&family)));
                Ok(HistogramHandle(family))
            }
        }
    }

    /// Increment a counter accumulator by 1.
    pub fn increment(&self, handle: &CounterHandle, label_values: &[&str]) -> Result<()> {
        self.check_owner(handle.0.registry_id, &handle.0.name)?;
        handle.inc(label_values)
    }

    /// Record one histogram observation.
    pub fn observe(
        &self,
        handle: &HistogramHandle,
        label_values: &[&str],
        value: f64,
    ) -> Result<()> {
        self.check_owner(handle.0.registry_id, &handle.0.name)?;
        handle.observe(label_values, value)
    }

    fn check_owner(&self, registry_id: u64, name: &str) -> Result<()> {
        if registry_id != self.id {
            return Err(ServerInfoError::InvalidArgument(format!(
                "handle for {name} belongs to another registry"
            )));
        }
        Ok(())
    }

    /// Copy every family, ordered by name.
    ///
    /// Family handles are collected first so the name map is not held while
    /// accumulators are copied.
    pub fn snapshot(&self) -> Vec<FamilySnapshot> {
        let mut families: Vec<Family> = self.families.iter().map(|r| r.value().clone()).collect();
        families.sort_by(|a, b| a.name().cmp(b.name()));
        families.iter().map(Family::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Bucket bounds must be non-empty, finite, positive and strictly increasing.
pub fn validate_bounds(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(ServerInfoError::Configuration(
            "histogram bucket bounds must not be empty".into(),
        ));
    }
    if bounds.iter().any(|b| !b.is_finite() || *b <= 0.0) {
        return Err(ServerInfoError::Configuration(
            "histogram bucket bounds must be finite and positive".into(),
        ));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ServerInfoError::Configuration(
            "histogram bucket bounds must be strictly increasing".into(),
        ));
    }
    Ok(())
}
