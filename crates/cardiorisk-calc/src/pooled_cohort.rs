//! 10-year risk of a first hard ASCVD event (2013 ACC/AHA Pooled Cohort
//! Equations).
//!
//! risk = 1 − S₀ ^ exp(Σ(coefficient × value) − mean)
//!
//! where S₀ is the group's 10-year baseline survival and `mean` is the
//! group mean of Σ(coefficient × value).

use cardiorisk_common::{CardioRiskError, Result, RiskAnswers};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::quantity::Sex;
use crate::ASCVD_AGE_RANGE;

/// Race × sex cohort the equations are fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationGroup {
    WhiteWomen,
    WhiteMen,
    AfricanAmericanWomen,
    AfricanAmericanMen,
}

/// Per-group coefficients. Zero means the term is absent for the group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub ln_age: f64,
    pub ln_age_squared: f64,
    pub ln_total_cholesterol: f64,
    pub ln_age_x_ln_total_cholesterol: f64,
    pub ln_hdl: f64,
    pub ln_age_x_ln_hdl: f64,
    pub ln_treated_sbp: f64,
    pub ln_age_x_ln_treated_sbp: f64,
    pub ln_untreated_sbp: f64,
    pub ln_age_x_ln_untreated_sbp: f64,
    pub current_smoker: f64,
    pub ln_age_x_current_smoker: f64,
    pub diabetes: f64,
    pub mean_coefficient_value: f64,
    pub baseline_survival: f64,
}

const WHITE_WOMEN: Coefficients = Coefficients {
    ln_age: -29.799,
    ln_age_squared: 4.884,
    ln_total_cholesterol: 13.540,
    ln_age_x_ln_total_cholesterol: -3.114,
    ln_hdl: -13.578,
    ln_age_x_ln_hdl: 3.149,
    ln_treated_sbp: 2.019,
    ln_age_x_ln_treated_sbp: 0.0,
    ln_untreated_sbp: 1.957,
    ln_age_x_ln_untreated_sbp: 0.0,
    current_smoker: 7.574,
    ln_age_x_current_smoker: -1.665,
    diabetes: 0.661,
    mean_coefficient_value: -29.18,
    baseline_survival: 0.9665,
};

const WHITE_MEN: Coefficients = Coefficients {
    ln_age: 12.344,
    ln_age_squared: 0.0,
    ln_total_cholesterol: 11.853,
    ln_age_x_ln_total_cholesterol: -2.664,
    ln_hdl: -7.990,
    ln_age_x_ln_hdl: 1.769,
    ln_treated_sbp: 1.797,
    ln_age_x_ln_treated_sbp: 0.0,
    ln_untreated_sbp: 1.764,
    ln_age_x_ln_untreated_sbp: 0.0,
    current_smoker: 7.837,
    ln_age_x_current_smoker: -1.795,
    diabetes: 0.658,
    mean_coefficient_value: 61.18,
    baseline_survival: 0.9144,
};

const AFRICAN_AMERICAN_WOMEN: Coefficients = Coefficients {
    ln_age: 17.114,
    ln_age_squared: 0.0,
    ln_total_cholesterol: 0.940,
    ln_age_x_ln_total_cholesterol: 0.0,
    ln_hdl: -18.920,
    ln_age_x_ln_hdl: 4.475,
    ln_treated_sbp: 29.291,
    ln_age_x_ln_treated_sbp: -6.432,
    ln_untreated_sbp: 27.820,
    ln_age_x_ln_untreated_sbp: -6.087,
    current_smoker: 0.691,
    ln_age_x_current_smoker: 0.0,
    diabetes: 0.874,
    mean_coefficient_value: 86.61,
    baseline_survival: 0.9533,
};

const AFRICAN_AMERICAN_MEN: Coefficients = Coefficients {
    ln_age: 2.469,
    ln_age_squared: 0.0,
    ln_total_cholesterol: 0.302,
    ln_age_x_ln_total_cholesterol: 0.0,
    ln_hdl: -0.307,
    ln_age_x_ln_hdl: 0.0,
    ln_treated_sbp: 1.916,
    ln_age_x_ln_treated_sbp: 0.0,
    ln_untreated_sbp: 1.809,
    ln_age_x_ln_untreated_sbp: 0.0,
    current_smoker: 0.549,
    ln_age_x_current_smoker: 0.0,
    diabetes: 0.645,
    mean_coefficient_value: 19.54,
    baseline_survival: 0.8954,
};

impl PopulationGroup {
    /// Race text containing "black" maps to the African American cohort;
    /// every other race uses the White cohort equations.
    pub fn determine(race: &str, sex: Sex) -> Self {
        let is_african_american = race.to_lowercase().contains("black");
        match (is_african_american, sex) {
            (false, Sex::Female) => PopulationGroup::WhiteWomen,
            (false, Sex::Male) => PopulationGroup::WhiteMen,
            (true, Sex::Female) => PopulationGroup::AfricanAmericanWomen,
            (true, Sex::Male) => PopulationGroup::AfricanAmericanMen,
        }
    }

    pub fn coefficients(self) -> &'static Coefficients {
        match self {
            PopulationGroup::WhiteWomen => &WHITE_WOMEN,
            PopulationGroup::WhiteMen => &WHITE_MEN,
            PopulationGroup::AfricanAmericanWomen => &AFRICAN_AMERICAN_WOMEN,
            PopulationGroup::AfricanAmericanMen => &AFRICAN_AMERICAN_MEN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PopulationGroup::WhiteWomen => "White & Women",
            PopulationGroup::WhiteMen => "White & Men",
            PopulationGroup::AfricanAmericanWomen => "African American & Women",
            PopulationGroup::AfricanAmericanMen => "African American & Men",
        }
    }
}

/// Inputs to the equations. Lipids in mg/dL, blood pressure in mmHg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PooledCohortInput {
    pub group: PopulationGroup,
    pub age: u32,
    pub total_cholesterol: f64,
    pub hdl: f64,
    pub systolic_bp: f64,
    pub answers: RiskAnswers,
}

impl PooledCohortInput {
    fn validate(&self) -> Result<()> {
        if !ASCVD_AGE_RANGE.contains(&self.age) {
            return Err(CardioRiskError::Calculation(format!(
                "age {} outside {}..={}",
                self.age,
                ASCVD_AGE_RANGE.start(),
                ASCVD_AGE_RANGE.end()
            )));
        }
        for (name, v) in [
            ("total cholesterol", self.total_cholesterol),
            ("HDL", self.hdl),
            ("systolic blood pressure", self.systolic_bp),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(CardioRiskError::Calculation(format!(
                    "{name} must be a positive number, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Σ(coefficient × value) for one individual.
pub fn individual_sum(input: &PooledCohortInput) -> f64 {
    let c = input.group.coefficients();
    let ln_age = (input.age as f64).ln();
    let ln_chol = input.total_cholesterol.ln();
    let ln_hdl = input.hdl.ln();
    let ln_sbp = input.systolic_bp.ln();
    let smoker = if input.answers.is_smoking { 1.0 } else { 0.0 };
    let diabetic = if input.answers.has_diabetes { 1.0 } else { 0.0 };

    let (sbp_coef, age_sbp_coef) = if input.answers.is_treating_hypertension {
        (c.ln_treated_sbp, c.ln_age_x_ln_treated_sbp)
    } else {
        (c.ln_untreated_sbp, c.ln_age_x_ln_untreated_sbp)
    };

    c.ln_age * ln_age
        + c.ln_age_squared * ln_age * ln_age
        + c.ln_total_cholesterol * ln_chol
        + c.ln_age_x_ln_total_cholesterol * ln_age * ln_chol
        + c.ln_hdl * ln_hdl
        + c.ln_age_x_ln_hdl * ln_age * ln_hdl
        + sbp_coef * ln_sbp
        + age_sbp_coef * ln_age * ln_sbp
        + c.current_smoker * smoker
        + c.ln_age_x_current_smoker * ln_age * smoker
        + c.diabetes * diabetic
}

/// ACC/AHA risk bands for the 10-year estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Borderline,
    Intermediate,
    High,
}

impl RiskCategory {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 5.0 {
            RiskCategory::Low
        } else if percent < 7.5 {
            RiskCategory::Borderline
        } else if percent < 20.0 {
            RiskCategory::Intermediate
        } else {
            RiskCategory::High
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskCategory::Low => "Low risk",
            RiskCategory::Borderline => "Borderline risk",
            RiskCategory::Intermediate => "Intermediate risk",
            RiskCategory::High => "High risk",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    /// 10-year risk in percent.
    pub percent: f64,
    pub category: RiskCategory,
}

impl fmt::Display for RiskEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "10-year ASCVD risk: {:.1}% ({})", self.percent, self.category)
    }
}

/// Compute the 10-year ASCVD risk.
pub fn ten_year_risk(input: &PooledCohortInput) -> Result<RiskEstimate> {
    input.validate()?;
    let c = input.group.coefficients();
    let sum = individual_sum(input);
    let exponent = sum - c.mean_coefficient_value;
    let percent = (1.0 - c.baseline_survival.powf(exponent.exp())) * 100.0;
    debug!(group = input.group.label(), sum, percent, "pooled cohort risk computed");
    Ok(RiskEstimate { percent, category: RiskCategory::from_percent(percent) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(group: PopulationGroup) -> PooledCohortInput {
        // 55-year-old, TC 213, HDL 50, untreated SBP 120, non-smoker, no diabetes.
        PooledCohortInput {
            group,
            age: 55,
            total_cholesterol: 213.0,
            hdl: 50.0,
            systolic_bp: 120.0,
            answers: RiskAnswers::default(),
        }
    }

    #[test]
    fn test_published_reference_values() {
        let cases = [
            (PopulationGroup::WhiteWomen, 2.1),
            (PopulationGroup::WhiteMen, 5.4),
            (PopulationGroup::AfricanAmericanWomen, 3.0),
            (PopulationGroup::AfricanAmericanMen, 6.1),
        ];
        for (group, expected) in cases {
            let risk = ten_year_risk(&reference(group)).unwrap();
            assert!(
                (risk.percent - expected).abs() < 0.1,
                "{}: expected ~{expected}, got {}",
                group.label(),
                risk.percent
            );
        }
    }

    #[test]
    fn test_individual_sum_white_women() {
        let sum = individual_sum(&reference(PopulationGroup::WhiteWomen));
        assert!((sum - (-29.6767)).abs() < 1e-3, "got {sum}");
    }

    #[test]
    fn test_risk_factors_increase_risk() {
        let base = ten_year_risk(&reference(PopulationGroup::WhiteMen)).unwrap();
        let mut input = reference(PopulationGroup::WhiteMen);
        input.answers = RiskAnswers {
            has_diabetes: true,
            is_smoking: true,
            is_treating_hypertension: true,
        };
        let worse = ten_year_risk(&input).unwrap();
        assert!(worse.percent > base.percent);
    }

    #[test]
    fn test_determine_group() {
        assert_eq!(
            PopulationGroup::determine("Black or African American", Sex::Female),
            PopulationGroup::AfricanAmericanWomen
        );
        assert_eq!(PopulationGroup::determine("White", Sex::Male), PopulationGroup::WhiteMen);
        assert_eq!(PopulationGroup::determine("Asian", Sex::Male), PopulationGroup::WhiteMen);
    }

    #[test]
    fn test_rejects_out_of_range_age_and_bad_labs() {
        let mut input = reference(PopulationGroup::WhiteMen);
        input.age = 39;
        assert!(ten_year_risk(&input).is_err());
        input.age = 76;
        assert!(ten_year_risk(&input).is_err());
        input.age = 75;
        input.hdl = 0.0;
        assert!(ten_year_risk(&input).is_err());
    }

    #[test]
    fn test_categories_and_display() {
        assert_eq!(RiskCategory::from_percent(4.99), RiskCategory::Low);
        assert_eq!(RiskCategory::from_percent(5.0), RiskCategory::Borderline);
        assert_eq!(RiskCategory::from_percent(7.5), RiskCategory::Intermediate);
        assert_eq!(RiskCategory::from_percent(20.0), RiskCategory::High);
        let est = RiskEstimate { percent: 2.052, category: RiskCategory::Low };
        assert_eq!(est.to_string(), "10-year ASCVD risk: 2.1% (Low risk)");
    }
}
