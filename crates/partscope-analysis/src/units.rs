//! Model units (millimetres) to display units (centimetres).

/// Millimetres per displayed centimetre.
pub const DISPLAY_SCALE: f64 = 10.0;

/// mm → cm.
pub fn length_cm(mm: f64) -> f64 {
    mm / DISPLAY_SCALE
}

/// mm² → cm².
pub fn area_cm2(mm2: f64) -> f64 {
    mm2 / (DISPLAY_SCALE * DISPLAY_SCALE)
}

/// mm³ → cm³.
pub fn volume_cm3(mm3: f64) -> f64 {
    mm3 / (DISPLAY_SCALE * DISPLAY_SCALE * DISPLAY_SCALE)
}
