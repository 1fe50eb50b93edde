//! Efficiency / purity metrics and the sink they are reported to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::EdgeSet;
use crate::{Error, Result};

/// A ratio metric. `Undefined` stands in for a zero denominator (e.g. a
/// batch with no truth edges); callers check for it instead of catching
/// a division error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    Value(f64),
    Undefined,
}

impl Metric {
    pub fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Metric::Undefined
        } else {
            Metric::Value(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Metric::Value(_))
    }
}

impl From<f32> for Metric {
    fn from(v: f32) -> Self {
        Metric::Value(v as f64)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{v:.6}"),
            Metric::Undefined => write!(f, "undefined"),
        }
    }
}

/// True positives over total truth.
pub fn efficiency(true_positives: usize, total_truth: usize) -> Metric {
    Metric::ratio(true_positives, total_truth)
}

/// True positives over total predicted.
pub fn purity(true_positives: usize, total_predicted: usize) -> Metric {
    Metric::ratio(true_positives, total_predicted)
}

/// True positives over the predicted edges joining different detector
/// modules.
pub fn module_veto_purity(true_positives: usize, edges: &EdgeSet, modules: &[u64]) -> Result<Metric> {
    let mut cross_module = 0usize;
    for e in edges {
        let (a, b) = (module_of(modules, e.src)?, module_of(modules, e.dst)?);
        if a != b {
            cross_module += 1;
        }
    }
    Ok(Metric::ratio(true_positives, cross_module))
}

fn module_of(modules: &[u64], node: u32) -> Result<u64> {
    modules.get(node as usize).copied().ok_or(Error::NodeOutOfBounds {
        node: node as u64,
        bound: modules.len() as u64,
    })
}

// ============================================================================
// Sinks
// ============================================================================

/// Receiver of named scalar metrics (e.g. an experiment logger).
pub trait MetricsSink {
    fn record(&mut self, key: &str, value: Metric);

    fn record_all(&mut self, values: &BTreeMap<String, Metric>) {
        for (key, value) in values {
            self.record(key, *value);
        }
    }
}

/// Keeps the latest value per key.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetricsSink {
    values: BTreeMap<String, Metric>,
}

impl MemoryMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Metric> {
        self.values.get(key).copied()
    }

    pub fn values(&self) -> &BTreeMap<String, Metric> {
        &self.values
    }
}

impl MetricsSink for MemoryMetricsSink {
    fn record(&mut self, key: &str, value: Metric) {
        self.values.insert(key.to_string(), value);
    }
}

/// Emits each metric as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record(&mut self, key: &str, value: Metric) {
        tracing::info!(metric = key, %value, "metric");
    }
}
