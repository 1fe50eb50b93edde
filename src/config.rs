//! Strongly typed hyperparameters.
//!
//! One flat structure enumerates every recognised option. It deserializes
//! from JSON with `#[serde(default)]` for absent keys and rejects unknown
//! keys, then `validate()` checks ranges once before any component is
//! built from it.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::{Error, Result};

/// Which nodes act as queries for pair sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySelection {
    /// Endpoints of the batch's truth edges.
    #[default]
    TruthEndpoints,
    /// Every node of the batch.
    AllNodes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    // Sampling strategies
    pub hard_negative_mining: bool,
    pub random_pairs: bool,
    /// Report purity over cross-module edges only.
    pub module_veto: bool,

    // Loss
    /// Spatial hinge margin (squared before use).
    pub margin: f32,
    /// Topological hinge margin (squared before use); also the mining
    /// radius for the topological subspace.
    pub topo_margin: f32,
    /// Spatial positive-class weight.
    pub weight: f32,
    /// Topological positive-class weight.
    pub topo_weight: f32,

    // Synthesis
    pub target_purity: f64,

    // Mining and query selection
    pub r_train: f32,
    pub knn: usize,
    /// Random pairs per query node.
    pub randomisation: f32,
    pub points_per_batch: usize,
    pub query_selection: QuerySelection,

    // Evaluation graph
    pub knn_radius_eval: f32,
    pub knn_eval: usize,

    /// Round trips for the startup codec check.
    pub self_check_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hard_negative_mining: true,
            random_pairs: true,
            module_veto: false,
            margin: 0.1,
            topo_margin: 0.1,
            weight: 1.0,
            topo_weight: 1.0,
            target_purity: 0.5,
            r_train: 0.1,
            knn: 50,
            randomisation: 2.0,
            points_per_batch: 100_000,
            query_selection: QuerySelection::TruthEndpoints,
            knn_radius_eval: 0.1,
            knn_eval: 50,
            self_check_samples: codec::DEFAULT_SELF_CHECK_SAMPLES,
        }
    }
}

impl Config {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, v: f32) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be positive and finite, got {v}")))
            }
        }
        fn non_negative(name: &str, v: f32) -> Result<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be non-negative and finite, got {v}")))
            }
        }

        positive("margin", self.margin)?;
        positive("topo_margin", self.topo_margin)?;
        non_negative("weight", self.weight)?;
        non_negative("topo_weight", self.topo_weight)?;
        positive("r_train", self.r_train)?;
        positive("knn_radius_eval", self.knn_radius_eval)?;
        non_negative("randomisation", self.randomisation)?;
        validate_purity(self.target_purity)?;

        if self.knn == 0 || self.knn_eval == 0 {
            return Err(Error::InvalidConfig("knn and knn_eval must be at least 1".into()));
        }
        if self.points_per_batch == 0 {
            return Err(Error::InvalidConfig("points_per_batch must be at least 1".into()));
        }
        if !self.hard_negative_mining && !self.random_pairs {
            tracing::warn!("no sampling strategy enabled; training sets hold true pairs only");
        }
        Ok(())
    }

    /// Spatial hinge margin, squared.
    pub fn spatial_margin_sq(&self) -> f32 {
        self.margin * self.margin
    }

    /// Topological hinge margin, squared.
    pub fn topo_margin_sq(&self) -> f32 {
        self.topo_margin * self.topo_margin
    }
}

/// Target purity must lie strictly inside `(0, 1)`.
pub fn validate_purity(p: f64) -> Result<()> {
    if p.is_finite() && p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("target_purity must lie in (0, 1), got {p}")))
    }
}
