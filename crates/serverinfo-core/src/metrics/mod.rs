//! In-process request metrics.
//!
//! A [`Registry`] owns counter and histogram families keyed by label values.
//! The [`exporter`] renders a registry snapshot in the Prometheus text
//! exposition format for the `/metrics` handler.

pub mod exporter;
pub mod labels;
pub mod registry;

pub use exporter::{export, export_with_gauges, CONTENT_TYPE};
pub use labels::LabelSet;
pub use registry::{
    validate_bounds, CounterHandle, FamilySnapshot, HistogramHandle, HistogramSnapshot,
    MetricKind, Registry, SampleSnapshot, SampleValue,
};
