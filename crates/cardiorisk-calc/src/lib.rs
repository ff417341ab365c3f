//! cardiorisk-calc — clinical risk calculators.
//!
//!   - 10-year ASCVD risk (Pooled Cohort Equations)
//!   - Ideal / adjusted body weight and creatinine clearance
//!   - Osteoporosis Self-assessment Tool (OST) index
//!   - METS-IR insulin resistance score

pub mod pooled_cohort;
pub mod quantity;
pub mod renal;
pub mod screening;

pub use pooled_cohort::{PooledCohortInput, PopulationGroup, RiskCategory, RiskEstimate};
pub use quantity::{Quantity, Sex};

/// Display text used when a calculator lacks usable inputs.
pub const NOT_AVAILABLE: &str = "Not available due to missing required data";

/// Inclusive age range the Pooled Cohort Equations were derived on.
pub const ASCVD_AGE_RANGE: std::ops::RangeInclusive<u32> = 40..=75;

/// Message shown when the patient's age is outside [`ASCVD_AGE_RANGE`].
pub const AGE_RANGE_MESSAGE: &str =
    "The 10-year risk estimation requires an age range of 40 to 75.";
