//! Demographics from a FHIR Patient resource.

use cardiorisk_common::{CardioRiskError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

const US_CORE_RACE: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race";
const US_CORE_ETHNICITY: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-ethnicity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub given_name: String,
    pub family_name: String,
    pub birth_date: String,
    /// Whole years, `None` when the birth date is absent or malformed.
    pub age: Option<u32>,
    pub gender: String,
    pub race: String,
    pub ethnicity: String,
}

impl PatientInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name).trim().to_string()
    }

    pub fn age_display(&self) -> String {
        match self.age {
            Some(age) => age.to_string(),
            None => "No birth date specified in FHIR data".to_string(),
        }
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn extract_name(json: &Value) -> (String, String) {
    let name = &json["name"][0];
    if let Some(text) = name["text"].as_str() {
        let mut words = text.split_whitespace();
        if let (Some(given), Some(family)) = (words.next(), words.next()) {
            return (title_case(given), title_case(family));
        }
    }
    match (name["given"][0].as_str(), name["family"].as_str()) {
        (Some(given), Some(family)) => (title_case(given), title_case(family)),
        (given, family) => {
            warn!("Patient has either a missing given name or a missing family name");
            (
                given.map(title_case).unwrap_or_default(),
                family.map(title_case).unwrap_or_default(),
            )
        }
    }
}

/// US Core race/ethnicity text, by extension URL with a positional
/// fallback for servers that omit URLs.
fn extract_us_core_text(json: &Value, url: &str, position: usize) -> Option<String> {
    let extensions = json["extension"].as_array()?;
    let ext = extensions
        .iter()
        .find(|e| e["url"] == url)
        .or_else(|| extensions.get(position))?;
    let inner = ext["extension"].as_array()?;
    inner
        .iter()
        .find(|e| e["url"] == "text")
        .or_else(|| inner.get(1))
        .and_then(|e| e["valueString"].as_str())
        .map(str::to_string)
}

/// Current year minus birth year.
fn age_in_years(birth_date: &str, current_year: i32) -> Option<u32> {
    let birth_year: i32 = birth_date.split('-').next()?.parse().ok()?;
    u32::try_from(current_year - birth_year).ok()
}

/// Extract demographics. `current_year` anchors the age calculation.
pub fn extract_patient_info(json: &Value, current_year: i32) -> Result<PatientInfo> {
    match json["resourceType"].as_str() {
        Some("Patient") => {}
        Some("OperationOutcome") => {
            error!("Patient resource request returned an OperationOutcome");
            return Err(CardioRiskError::Fhir(
                "The patient you selected does not have patient data available".into(),
            ));
        }
        other => {
            return Err(CardioRiskError::Fhir(format!(
                "Expected a Patient resource, got {}",
                other.unwrap_or("nothing")
            )))
        }
    }

    let (given_name, family_name) = extract_name(json);
    let birth_date = json["birthDate"].as_str().map(str::to_string);
    let age = birth_date.as_deref().and_then(|d| age_in_years(d, current_year));

    Ok(PatientInfo {
        given_name,
        family_name,
        birth_date: birth_date
            .unwrap_or_else(|| "No birth date specified in FHIR data".to_string()),
        age,
        gender: json["gender"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| "No gender specified in FHIR data".to_string()),
        race: extract_us_core_text(json, US_CORE_RACE, 0)
            .unwrap_or_else(|| "No race specified in FHIR data".to_string()),
        ethnicity: extract_us_core_text(json, US_CORE_ETHNICITY, 1)
            .unwrap_or_else(|| "No ethnicity specified in FHIR data".to_string()),
    })
}
