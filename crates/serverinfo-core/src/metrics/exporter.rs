//! Prometheus text exposition (format 0.0.4).
//!
//! Output is fully determined by the snapshot: families by name, samples by
//! label values, histogram buckets in bound order followed by `+Inf`, `_sum`
//! and `_count`.

use std::fmt::Write;

use crate::metrics::labels::{escape_help, escape_label};
use crate::metrics::registry::{FamilySnapshot, Registry, SampleValue};

/// Content type served with the exposition body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render every family in `registry`.
pub fn export(registry: &Registry) -> String {
    render(&registry.snapshot(), &[])
}

/// Render every family, then one gauge per `(name, value)`.
pub fn export_with_gauges(registry: &Registry, gauges: &[(&str, u64)]) -> String {
    render(&registry.snapshot(), gauges)
}

/// Render a snapshot taken earlier.
pub fn render(families: &[FamilySnapshot], gauges: &[(&str, u64)]) -> String {
    let mut out = String::new();
    for family in families {
        render_family(family, &mut out);
    }
    for (name, value) in gauges {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        let _ = writeln!(out, "{} {}", name, value);
    }
    out
}

fn render_family(family: &FamilySnapshot, out: &mut String) {
    let name = &family.name;
    if !family.help.is_empty() {
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.help));
    }
    let _ = writeln!(out, "# TYPE {} {}", name, family.kind.as_str());

    for sample in &family.samples {
        let pairs: Vec<String> = family
            .label_names
            .iter()
            .zip(sample.labels.values())
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect();

        match &sample.value {
            SampleValue::Counter(v) => {
                let _ = writeln!(out, "{}{} {}", name, braces(&pairs), v);
            }
            SampleValue::Histogram(h) => {
                for (le, count) in &h.buckets {
                    let _ = writeln!(
                        out,
                        "{}_bucket{} {}",
                        name,
                        braces_with_le(&pairs, &format_float(*le)),
                        count
                    );
                }
                let _ = writeln!(out, "{}_bucket{} {}", name, braces_with_le(&pairs, "+Inf"), h.count);
                let _ = writeln!(out, "{}_sum{} {}", name, braces(&pairs), format_float(h.sum));
                let _ = writeln!(out, "{}_count{} {}", name, braces(&pairs), h.count);
            }
        }
    }
}

fn braces(pairs: &[String]) -> String {
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", pairs.join(","))
    }
}

fn braces_with_le(pairs: &[String], le: &str) -> String {
    if pairs.is_empty() {
        format!("{{le=\"{}\"}}", le)
    } else {
        format!("{{{},le=\"{}\"}}", pairs.join(","), le)
    }
}

fn format_float(v: f64) -> String {
    if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else if v.is_nan() {
        "NaN".into()
    } else {
        v.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_exports_nothing() {
        assert_eq!(export(&Registry::new()), "");
    }

    #[test]
    fn registered_family_without_samples_has_header_only() {
        let reg = Registry::new();
        reg.register_counter("requests_total", "Requests.", &["method"]).unwrap();
        assert_eq!(
            export(&reg),
            "# HELP requests_total Requests.\n# TYPE requests_total counter\n"
        );
    }

    #[test]
    fn unlabelled_families_omit_braces() {
        let reg = Registry::new();
        let c = reg.register_counter("boots_total", "", &[]).unwrap();
        c.inc(&[]).unwrap();
        let h = reg.register_histogram("work_seconds", "", &[], &[1.0]).unwrap();
        h.observe(&[], 0.5).unwrap();

        let out = export(&reg);
        assert!(out.contains("\nboots_total 1\n"));
        assert!(out.contains("work_seconds_bucket{le=\"1\"} 1\n"));
        assert!(out.contains("work_seconds_bucket{le=\"+Inf\"} 1\n"));
        assert!(out.contains("work_seconds_sum 0.5\n"));
        assert!(out.contains("work_seconds_count 1\n"));
    }

    #[test]
    fn label_values_are_escaped() {
        let reg = Registry::new();
        let c = reg.register_counter("requests_total", "", &["path"]).unwrap();
        c.inc(&["/a\"b"]).unwrap();
        assert!(export(&reg).contains("requests_total{path=\"/a\\\"b\"} 1\n"));
    }

    #[test]
    fn gauges_follow_families() {
        let reg = Registry::new();
        reg.register_counter("requests_total", "", &[]).unwrap();
        let out = export_with_gauges(&reg, &[("uptime_seconds", 42)]);
        assert!(out.ends_with("# TYPE uptime_seconds gauge\nuptime_seconds 42\n"));
    }

    #[test]
    fn floats() {
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(f64::INFINITY), "+Inf");
    }
}
