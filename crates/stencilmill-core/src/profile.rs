//! Drill/mill profile consumed by the toolpath emitter

use crate::error::{ensure_positive, Result};
use serde::{Deserialize, Serialize};

/// Machine motion parameters for plunging each placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MillProfile {
    /// Depth below the work surface for each plunge (mm)
    pub mill_depth: f64,
    /// Height above the work surface for travel moves (mm)
    pub safe_height: f64,
    /// Feed rate while plunging (mm/min)
    pub mill_rate: f64,
    /// Feed rate for travel moves (mm/min)
    pub travel_rate: f64,
}

impl Default for MillProfile {
    fn default() -> Self {
        Self {
            mill_depth: 0.1,
            safe_height: 2.0,
            mill_rate: 100.0,
            travel_rate: 1000.0,
        }
    }
}

impl MillProfile {
    /// All four scalars must be positive
    pub fn validate(&self) -> Result<()> {
        ensure_positive("mill_depth", self.mill_depth)?;
        ensure_positive("safe_height", self.safe_height)?;
        ensure_positive("mill_rate", self.mill_rate)?;
        ensure_positive("travel_rate", self.travel_rate)?;
        Ok(())
    }
}
