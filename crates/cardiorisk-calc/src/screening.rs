//! Screening indices: OST (osteoporosis) and METS-IR (insulin resistance).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quantity::{Quantity, Sex};
use crate::renal::bmi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningRisk {
    Low,
    Intermediate,
    High,
}

impl fmt::Display for ScreeningRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScreeningRisk::Low => "Low",
            ScreeningRisk::Intermediate => "Intermediate",
            ScreeningRisk::High => "High",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OstIndex {
    pub points: i64,
    pub risk: ScreeningRisk,
}

/// OST = trunc(0.2 × (weight kg − age)).
///
/// Women: > 1 low, −3..=1 intermediate, below high.
/// Men:   > 3 low, −1..=3 intermediate, below high.
pub fn ost_index(weight: &Quantity, age: u32, sex: Sex) -> OstIndex {
    let points = ((weight.value - age as f64) * 0.2).trunc() as i64;
    let (low_above, intermediate_from) = match sex {
        Sex::Female => (1, -3),
        Sex::Male => (3, -1),
    };
    let risk = if points > low_above {
        ScreeningRisk::Low
    } else if points >= intermediate_from {
        ScreeningRisk::Intermediate
    } else {
        ScreeningRisk::High
    };
    OstIndex { points, risk }
}

/// Cut-off above which METS-IR indicates high type 2 diabetes risk.
pub const METS_IR_THRESHOLD: f64 = 50.39;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetsIr {
    pub value: f64,
    pub risk: ScreeningRisk,
}

/// METS-IR = ln(2 × glucose + TG) × BMI / ln(HDL), all lipids in mg/dL.
pub fn mets_ir(
    glucose: &Quantity,
    triglycerides: &Quantity,
    weight: &Quantity,
    height: &Quantity,
    hdl: &Quantity,
) -> Option<MetsIr> {
    let bmi = bmi(weight, height)?;
    let numerator = (2.0 * glucose.value + triglycerides.value).ln() * bmi;
    let denominator = hdl.value.ln();
    let value = numerator / denominator;
    if !value.is_finite() || denominator <= 0.0 {
        return None;
    }
    let risk = if value <= METS_IR_THRESHOLD { ScreeningRisk::Low } else { ScreeningRisk::High };
    Some(MetsIr { value, risk })
}
