//! Compute context: the device choice and RNG a batch runs with.
//!
//! Established once by the caller and passed `&mut` into every randomized
//! operation. Nothing in this crate reads device or randomness from
//! process-wide state, so independent workers each own a context.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Where array work is expected to run. Neighbour-search and model
/// implementations dispatch on it; the core algorithms are CPU code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    #[default]
    Cpu,
    /// Accelerator by ordinal.
    Accelerator(u32),
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Accelerator(i) => write!(f, "accel:{i}"),
        }
    }
}

/// Per-worker execution context.
#[derive(Debug, Clone)]
pub struct ComputeContext {
    device: Device,
    rng: StdRng,
}

impl ComputeContext {
    /// Deterministic context from a seed.
    pub fn new(device: Device, seed: u64) -> Self {
        Self { device, rng: StdRng::seed_from_u64(seed) }
    }

    /// CPU context with a fixed seed.
    pub fn cpu(seed: u64) -> Self {
        Self::new(Device::Cpu, seed)
    }

    /// Context seeded from OS entropy.
    pub fn from_entropy(device: Device) -> Self {
        Self { device, rng: StdRng::from_entropy() }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
