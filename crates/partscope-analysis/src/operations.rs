//! Heuristic mapping from metrics to manufacturing operations.
//!
//! Rules fire independently, in a fixed order, and the output list keeps
//! that order. All magnitudes are in centimetres. The heuristics are coarse
//! on purpose: hole count comes from the Euler characteristic and
//! "turnable" means the X and Y extents are within 30 % of the largest
//! extent.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::{AnalysisError, Result};
use crate::metrics::GeometricMetrics;
use crate::units;

/// Face count above which a surface is treated as finely detailed.
pub const FINISHING_FACE_THRESHOLD: usize = 5000;

/// Face count above which grinding is suggested.
pub const GRINDING_FACE_THRESHOLD: usize = 20_000;

/// Closed vocabulary of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    /// Through-holes.
    Drilling,
    /// Pocketing a non-convex solid out of stock.
    Milling,
    /// Raw stock envelope.
    StockSize,
    /// Surface finishing.
    Finishing,
    /// Fine grinding.
    Grinding,
    /// Lathe work on a roughly round part.
    Turning,
    /// Fallback when nothing else applies.
    Casting,
    /// Metrics could not be interpreted.
    AnalysisRequired,
}

impl OperationKind {
    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Drilling => "Drilling",
            OperationKind::Milling => "Milling",
            OperationKind::StockSize => "Stock Size",
            OperationKind::Finishing => "Finishing",
            OperationKind::Grinding => "Grinding",
            OperationKind::Turning => "Turning",
            OperationKind::Casting => "Casting",
            OperationKind::AnalysisRequired => "Analysis Required",
        }
    }
}

/// One inferred operation with its estimated size.
///
/// Serializes as its display string, e.g. `"Drilling - Ø1.0 cm"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Operation {
    /// What to do.
    pub kind: OperationKind,
    /// Formatted magnitude, e.g. `Ø1.0 cm`. Absent for the sentinel.
    pub magnitude: Option<String>,
}

impl Operation {
    fn new(kind: OperationKind, magnitude: String) -> Self {
        Self {
            kind,
            magnitude: Some(magnitude),
        }
    }

    /// The sentinel returned when analysis fails.
    pub fn analysis_required() -> Self {
        Self {
            kind: OperationKind::AnalysisRequired,
            magnitude: None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.magnitude {
            Some(magnitude) => write!(f, "{} - {}", self.kind.label(), magnitude),
            None => f.write_str(self.kind.label()),
        }
    }
}

impl From<Operation> for String {
    fn from(operation: Operation) -> Self {
        operation.to_string()
    }
}

/// Infer operations, replacing any failure with the
/// [`OperationKind::AnalysisRequired`] sentinel.
pub fn infer_operations(metrics: &GeometricMetrics) -> Vec<Operation> {
    match try_infer_operations(metrics) {
        Ok(operations) => operations,
        Err(e) => {
            warn!(error = %e, "operation inference failed");
            vec![Operation::analysis_required()]
        }
    }
}

/// Infer operations, reporting unusable metrics as an error.
pub fn try_infer_operations(metrics: &GeometricMetrics) -> Result<Vec<Operation>> {
    check_finite(metrics)?;

    let [length, width, height] = metrics.dimensions_cm();
    let genus = metrics.genus();
    let mut operations = Vec::new();

    let holes = metrics.hole_count();
    if holes > 0 {
        let diameter = length.min(width).min(height) * 0.1;
        let magnitude = if holes == 1 {
            format!("Ø{diameter:.1} cm")
        } else {
            format!("{holes} holes, Ø{diameter:.1} cm")
        };
        operations.push(Operation::new(OperationKind::Drilling, magnitude));
    }

    if !metrics.is_convex && metrics.is_watertight && metrics.volume > 0.0 {
        let bbox_volume = metrics.bounding_box_volume;
        if bbox_volume <= 0.0 {
            return Err(AnalysisError::Degenerate(format!(
                "solid of volume {} has bounding box volume {bbox_volume}",
                metrics.volume
            )));
        }
        let removal = (bbox_volume - metrics.volume) / bbox_volume * 100.0;
        operations.push(Operation::new(
            OperationKind::Milling,
            format!("{removal:.1}% material removal"),
        ));
    }

    operations.push(Operation::new(
        OperationKind::StockSize,
        format!("{length:.1} × {width:.1} × {height:.1} cm"),
    ));

    if metrics.face_count > FINISHING_FACE_THRESHOLD {
        let area = units::area_cm2(metrics.surface_area);
        operations.push(Operation::new(
            OperationKind::Finishing,
            format!("{area:.1} cm² area"),
        ));
    }

    if metrics.face_count > GRINDING_FACE_THRESHOLD {
        operations.push(Operation::new(
            OperationKind::Grinding,
            "Fine surface (Ra < 0.8 μm)".to_string(),
        ));
    }

    if metrics.is_convex && genus == 0.0 {
        let max_dim = length.max(width).max(height);
        if (length - width).abs() < max_dim * 0.3 {
            operations.push(Operation::new(
                OperationKind::Turning,
                format!("Ø{:.1} cm × {height:.1} cm", length.max(width)),
            ));
        }
    }

    // Unreachable while Stock Size is unconditional.
    if operations.is_empty() {
        operations.push(Operation::new(
            OperationKind::Casting,
            format!("{length:.1} × {width:.1} × {height:.1} cm"),
        ));
    }

    Ok(operations)
}

fn check_finite(metrics: &GeometricMetrics) -> Result<()> {
    let fields = [
        ("volume", metrics.volume),
        ("surface_area", metrics.surface_area),
        ("bounding_box_volume", metrics.bounding_box_volume),
        ("dimensions.x", metrics.dimensions.x),
        ("dimensions.y", metrics.dimensions.y),
        ("dimensions.z", metrics.dimensions.z),
    ];
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(AnalysisError::NonFinite(name)),
        None => Ok(()),
    }
}
