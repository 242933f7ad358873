//! Label sets and name validation.

use crate::error::{Result, ServerInfoError};

/// Ordered label values identifying one accumulator inside a family.
///
/// Values are stored in the family's label-name order, so two sets compare
/// equal exactly when every dimension matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    /// Build a label set, checking arity against the family schema.
    pub fn new(label_names: &[String], values: &[&str]) -> Result<Self> {
        if label_names.len() != values.len() {
            return Err(ServerInfoError::InvalidArgument(format!(
                "expected {} label values [{}], got {}",
                label_names.len(),
                label_names.join(","),
                values.len()
            )));
        }
        Ok(Self(values.iter().map(|v| v.to_string()).collect()))
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Metric names follow `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn validate_metric_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if !valid {
        return Err(ServerInfoError::Configuration(format!(
            "invalid metric name: {name:?}"
        )));
    }
    Ok(())
}

/// Label names follow `[a-zA-Z_][a-zA-Z0-9_]*`, must be unique, and may not
/// use the reserved `__` prefix. Histograms additionally reserve `le`.
pub fn validate_label_names(names: &[&str], histogram: bool) -> Result<()> {
    for (i, name) in names.iter().enumerate() {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid || name.starts_with("__") {
            return Err(ServerInfoError::Configuration(format!(
                "invalid label name: {name:?}"
            )));
        }
        if histogram && *name == "le" {
            return Err(ServerInfoError::Configuration(
                "label name \"le\" is reserved for histogram buckets".into(),
            ));
        }
        if names[..i].contains(name) {
            return Err(ServerInfoError::Configuration(format!(
                "duplicate label name: {name:?}"
            )));
        }
    }
    Ok(())
}

/// Escape a label value for the text exposition format.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape a HELP docstring (quotes are left alone).
pub(crate) fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}
