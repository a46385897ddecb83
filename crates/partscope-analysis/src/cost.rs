//! Material and manufacturing cost estimation.
//!
//! ```text
//! weight        = volume_cm3 × density / 1000
//! material      = weight × cost_per_kg
//! manufacturing = setup + volume_cm3 × rate × complexity + finishing
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::material::Material;
use crate::operations::FINISHING_FACE_THRESHOLD;
use crate::units;

/// Complexity multiplier applied once the operation count exceeds a bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityTier {
    /// Applies when the operation count is strictly greater than this.
    pub above: usize,
    /// Multiplier on the machining term.
    pub factor: f64,
}

/// Shop rates, in rupees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRates {
    /// Fixed setup charge per job.
    pub setup_cost: f64,
    /// Machining charge per cm³ of part volume.
    pub machining_rate_per_cm3: f64,
    /// Finishing charge for ordinary meshes.
    pub finishing_cost: f64,
    /// Finishing charge for detailed meshes.
    pub fine_finishing_cost: f64,
    /// Face count above which `fine_finishing_cost` applies.
    pub finishing_face_threshold: usize,
    /// Tiers in ascending order; the last matching tier wins.
    pub complexity_tiers: Vec<ComplexityTier>,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            setup_cost: 4200.0,
            machining_rate_per_cm3: 42.0,
            finishing_cost: 840.0,
            fine_finishing_cost: 1650.0,
            finishing_face_threshold: FINISHING_FACE_THRESHOLD,
            complexity_tiers: vec![
                ComplexityTier {
                    above: 3,
                    factor: 1.5,
                },
                ComplexityTier {
                    above: 5,
                    factor: 2.0,
                },
            ],
        }
    }
}

impl CostRates {
    /// Multiplier for a job with `operation_count` operations.
    pub fn complexity_factor(&self, operation_count: usize) -> f64 {
        self.complexity_tiers
            .iter()
            .rev()
            .find(|tier| operation_count > tier.above)
            .map_or(1.0, |tier| tier.factor)
    }

    /// Finishing charge for a mesh with `face_count` faces.
    pub fn finishing_for(&self, face_count: usize) -> f64 {
        if face_count > self.finishing_face_threshold {
            self.fine_finishing_cost
        } else {
            self.finishing_cost
        }
    }
}

/// Itemized estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Material the estimate was made for.
    pub material: Material,
    /// Part volume in cm³.
    pub volume_cm3: f64,
    /// Part weight in kg.
    pub weight_kg: f64,
    /// Raw material cost.
    pub material_cost: f64,
    /// Setup, machining and finishing.
    pub manufacturing_cost: f64,
    /// `material_cost + manufacturing_cost`.
    pub total_cost: f64,
    /// Multiplier that was applied to the machining term.
    pub complexity_factor: f64,
}

/// Estimate the cost of making a part.
///
/// `volume_mm3` may be zero (open surfaces), which still costs setup and
/// finishing.
pub fn estimate_cost(
    volume_mm3: f64,
    material: Material,
    operation_count: usize,
    face_count: usize,
    rates: &CostRates,
) -> Result<CostBreakdown> {
    if !volume_mm3.is_finite() {
        return Err(AnalysisError::NonFinite("volume"));
    }
    if volume_mm3 < 0.0 {
        return Err(AnalysisError::Degenerate(format!(
            "negative volume {volume_mm3}"
        )));
    }

    let volume_cm3 = units::volume_cm3(volume_mm3);
    let weight_kg = volume_cm3 * material.density() / 1000.0;
    let material_cost = weight_kg * material.cost_per_kg();

    let complexity_factor = rates.complexity_factor(operation_count);
    let manufacturing_cost = rates.setup_cost
        + volume_cm3 * rates.machining_rate_per_cm3 * complexity_factor
        + rates.finishing_for(face_count);

    Ok(CostBreakdown {
        material,
        volume_cm3,
        weight_kg,
        material_cost,
        manufacturing_cost,
        total_cost: material_cost + manufacturing_cost,
        complexity_factor,
    })
}
