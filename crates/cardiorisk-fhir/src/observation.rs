//! Observation searches and value extraction.
//!
//! Search results arrive as a `Bundle` (first entry wins) but a bare
//! `Observation` is accepted too. Missing data never fails extraction:
//! a human-readable placeholder is returned instead, which the record
//! page shows verbatim.

use serde_json::Value;

/// Every Observation the record page shows, with its LOINC code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationKind {
    Height,
    Weight,
    Bmi,
    BloodPressure,
    Hdl,
    Ldl,
    Triglycerides,
    Cholesterol,
    Creatinine,
    Glucose,
    SmokingStatus,
}

const SYSTOLIC_CODE: &str = "8480-6";
const DIASTOLIC_CODE: &str = "8462-4";

impl ObservationKind {
    pub const ALL: [ObservationKind; 11] = [
        ObservationKind::Height,
        ObservationKind::Weight,
        ObservationKind::Bmi,
        ObservationKind::BloodPressure,
        ObservationKind::Hdl,
        ObservationKind::Ldl,
        ObservationKind::Triglycerides,
        ObservationKind::Cholesterol,
        ObservationKind::Creatinine,
        ObservationKind::Glucose,
        ObservationKind::SmokingStatus,
    ];

    pub fn loinc(self) -> &'static str {
        match self {
            ObservationKind::Height => "8302-2",
            ObservationKind::Weight => "29463-7",
            ObservationKind::Bmi => "39156-5",
            ObservationKind::BloodPressure => "55284-4",
            ObservationKind::Hdl => "2085-9",
            ObservationKind::Ldl => "18262-6",
            ObservationKind::Triglycerides => "2571-8",
            ObservationKind::Cholesterol => "2093-3",
            ObservationKind::Creatinine => "38483-4",
            ObservationKind::Glucose => "2339-0",
            ObservationKind::SmokingStatus => "72166-2",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            ObservationKind::Height
            | ObservationKind::Weight
            | ObservationKind::Bmi
            | ObservationKind::BloodPressure => "vital-signs",
            ObservationKind::SmokingStatus => "survey",
            _ => "laboratory",
        }
    }

    /// Noun used in placeholder messages.
    pub fn noun(self) -> &'static str {
        match self {
            ObservationKind::Height => "height",
            ObservationKind::Weight => "weight",
            ObservationKind::Bmi => "Body Mass Index (BMI)",
            ObservationKind::BloodPressure => "blood pressure",
            ObservationKind::Hdl => "HDL",
            ObservationKind::Ldl => "LDL",
            ObservationKind::Triglycerides => "triglycerides",
            ObservationKind::Cholesterol => "cholesterol",
            ObservationKind::Creatinine => "creatinine",
            ObservationKind::Glucose => "glucose",
            ObservationKind::SmokingStatus => "smoking status",
        }
    }
}

/// Locates the Observation resource inside a search response.
enum Located<'a> {
    Found(&'a Value),
    OperationOutcome,
    Empty,
}

fn locate(json: &Value) -> Located<'_> {
    match json["resourceType"].as_str() {
        Some("OperationOutcome") => Located::OperationOutcome,
        Some("Bundle") => match json["entry"].as_array().and_then(|e| e.first()) {
            Some(entry) if json["total"].as_u64() != Some(0) => Located::Found(&entry["resource"]),
            _ => Located::Empty,
        },
        Some("Observation") => Located::Found(json),
        _ => Located::Empty,
    }
}

fn format_quantity(quantity: &Value) -> Option<String> {
    let value = quantity["value"].as_f64()?;
    let unit = quantity["unit"].as_str()?;
    Some(format!("{:.1} {}", value, unit))
}

fn outcome_message(noun: &str) -> String {
    format!("No {noun} data available due to OperationOutcome error")
}

fn empty_message(noun: &str) -> String {
    format!("No {noun} data available due to empty bundle")
}

/// `"<value> <unit>"` for a single-valued Observation.
pub fn extract_quantity(json: &Value, kind: ObservationKind) -> String {
    let noun = kind.noun();
    match locate(json) {
        Located::OperationOutcome => outcome_message(noun),
        Located::Empty => empty_message(noun),
        Located::Found(resource) => format_quantity(&resource["valueQuantity"]).unwrap_or_else(
            || format!("No valid {noun} data available. Either there isn't a value or a unit."),
        ),
    }
}

/// `(systolic, diastolic)` from a blood pressure panel.
///
/// Components are matched by LOINC code; unlabelled panels fall back to
/// the conventional order (systolic first).
pub fn extract_blood_pressure(json: &Value) -> (String, String) {
    let resource = match locate(json) {
        Located::OperationOutcome => {
            return (
                "No systolic blood pressure available due to OperationOutcome error".into(),
                "No diastolic blood pressure available due to OperationOutcome error".into(),
            )
        }
        Located::Empty => {
            return (
                "No systolic blood pressure available due to empty bundle".into(),
                "No diastolic blood pressure available due to empty bundle".into(),
            )
        }
        Located::Found(resource) => resource,
    };

    let components = resource["component"].as_array().cloned().unwrap_or_default();
    let by_code = |code: &str, fallback: usize| -> Option<String> {
        components
            .iter()
            .find(|c| {
                c["code"]["coding"]
                    .as_array()
                    .is_some_and(|codings| codings.iter().any(|cd| cd["code"] == code))
            })
            .or_else(|| components.get(fallback))
            .and_then(|c| format_quantity(&c["valueQuantity"]))
    };

    (
        by_code(SYSTOLIC_CODE, 0).unwrap_or_else(|| {
            "No valid systolic blood pressure available. Either there wasn't a value or a unit."
                .into()
        }),
        by_code(DIASTOLIC_CODE, 1).unwrap_or_else(|| {
            "No valid diastolic blood pressure available. Either there wasn't a value or a unit."
                .into()
        }),
    )
}

/// Tobacco smoking status text (coded answer display).
pub fn extract_smoking_status(json: &Value) -> String {
    let noun = ObservationKind::SmokingStatus.noun();
    match locate(json) {
        Located::OperationOutcome => outcome_message(noun),
        Located::Empty => empty_message(noun),
        Located::Found(resource) => {
            let concept = &resource["valueCodeableConcept"];
            concept["text"]
                .as_str()
                .or_else(|| concept["coding"][0]["display"].as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("No valid {noun} data available."))
        }
    }
}
