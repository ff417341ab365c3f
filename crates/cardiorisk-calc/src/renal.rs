//! Body-weight estimates and Cockcroft–Gault creatinine clearance.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quantity::{Quantity, Sex};
use crate::NOT_AVAILABLE;

/// Devine ideal body weight and the adjusted body weight derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyWeights {
    pub ideal: f64,
    pub adjusted: f64,
    pub unit: String,
}

/// IBW = 50 kg (men) / 45.5 kg (women) + 2.3 kg per inch over 5 ft.
/// ABW = IBW + 0.4 × (actual − IBW) when actual exceeds IBW, otherwise
/// the actual weight.
pub fn body_weights(sex: Sex, height: &Quantity, weight: &Quantity) -> Option<BodyWeights> {
    let inches_over_five_feet = (height.as_inches() - 60.0).max(0.0);
    let base = if sex.is_female() { 45.5 } else { 50.0 };
    let ideal = base + 2.3 * inches_over_five_feet;

    let adjusted = if weight.value > ideal {
        ideal + 0.4 * (weight.value - ideal)
    } else {
        weight.value
    };

    Some(BodyWeights { ideal, adjusted, unit: weight.unit.clone()? })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    OverweightOrObese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else {
            BmiCategory::OverweightOrObese
        }
    }

    /// Which weight the adjusted clearance is computed with.
    pub fn weight_method(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "actual weight",
            BmiCategory::Normal => "ideal body weight",
            BmiCategory::OverweightOrObese => "adjusted body weight",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::OverweightOrObese => "Overweight / obese",
        })
    }
}

/// BMI from weight in kg and height in cm.
pub fn bmi(weight: &Quantity, height: &Quantity) -> Option<f64> {
    let metres = height.value / 100.0;
    (metres > 0.0).then(|| weight.value / (metres * metres))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatinineClearance {
    /// mL/min using actual body weight.
    pub actual: f64,
    /// mL/min using the weight selected by BMI category.
    pub adjusted: f64,
    pub bmi_category: BmiCategory,
}

impl CreatinineClearance {
    pub fn method(&self) -> &'static str {
        self.bmi_category.weight_method()
    }
}

/// CrCl = (140 − age) × weight × (0.85 if female) / (72 × SCr)
pub fn creatinine_clearance(
    age: u32,
    sex: Sex,
    height: &Quantity,
    weight: &Quantity,
    creatinine: &Quantity,
) -> Option<CreatinineClearance> {
    if creatinine.value <= 0.0 {
        return None;
    }
    let sex_factor = if sex.is_female() { 0.85 } else { 1.0 };
    let cockcroft_gault =
        |wt: f64| (140.0 - age as f64) * wt * sex_factor / (72.0 * creatinine.value);

    let category = BmiCategory::from_bmi(bmi(weight, height)?);
    let weights = body_weights(sex, height, weight)?;
    let dosing_weight = match category {
        BmiCategory::Underweight => weight.value,
        BmiCategory::Normal => weights.ideal,
        BmiCategory::OverweightOrObese => weights.ideal + 0.4 * (weight.value - weights.ideal),
    };

    Some(CreatinineClearance {
        actual: cockcroft_gault(weight.value),
        adjusted: cockcroft_gault(dosing_weight),
        bmi_category: category,
    })
}

/// Display strings `(ideal, adjusted)` for the record page.
pub fn format_body_weights(result: Option<&BodyWeights>) -> (String, String) {
    match result {
        Some(w) => (
            format!("{:.1} {}", w.ideal, w.unit),
            format!("{:.1} {}", w.adjusted, w.unit),
        ),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    }
}

/// Display strings `(actual, adjusted)` for the record page.
pub fn format_clearance(result: Option<&CreatinineClearance>) -> (String, String) {
    match result {
        Some(c) => (format!("{:.2} mL/min", c.actual), format!("{:.2} mL/min", c.adjusted)),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    }
}
