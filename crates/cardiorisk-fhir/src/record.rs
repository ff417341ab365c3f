//! Everything the record page shows for one patient.

use cardiorisk_common::{RecordTable, Result};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::client::{FhirClient, FhirQuery};
use crate::observation::{
    extract_blood_pressure, extract_quantity, extract_smoking_status, ObservationKind,
};
use crate::patient::{extract_patient_info, PatientInfo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub height: String,
    pub weight: String,
    pub bmi: String,
    pub systolic_bp: String,
    pub diastolic_bp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labs {
    pub hdl: String,
    pub ldl: String,
    pub triglycerides: String,
    pub cholesterol: String,
    pub creatinine: String,
    pub glucose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient: PatientInfo,
    pub vitals: Vitals,
    pub labs: Labs,
    pub smoking_status: String,
}

impl PatientRecord {
    /// Fetch the Patient and all Observations concurrently. Any failed
    /// request fails the whole record.
    #[instrument(skip(client))]
    pub async fn fetch(client: &FhirClient, patient_id: &str, current_year: i32) -> Result<Self> {
        let patient_query = FhirQuery::Patient { id: patient_id.to_string() };
        let observation_queries: Vec<FhirQuery> = ObservationKind::ALL
            .iter()
            .map(|kind| FhirQuery::observation(patient_id, kind.category(), kind.loinc()))
            .collect();

        let (patient_json, observations) = futures_util::try_join!(
            client.get_json(&patient_query),
            try_join_all(observation_queries.iter().map(|q| client.get_json(q))),
        )?;

        let patient = extract_patient_info(&patient_json, current_year)?;
        let by_kind = |kind: ObservationKind| {
            let idx = ObservationKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
            &observations[idx]
        };

        let (systolic_bp, diastolic_bp) = extract_blood_pressure(by_kind(ObservationKind::BloodPressure));
        let record = PatientRecord {
            vitals: Vitals {
                height: extract_quantity(by_kind(ObservationKind::Height), ObservationKind::Height),
                weight: extract_quantity(by_kind(ObservationKind::Weight), ObservationKind::Weight),
                bmi: extract_quantity(by_kind(ObservationKind::Bmi), ObservationKind::Bmi),
                systolic_bp,
                diastolic_bp,
            },
            labs: Labs {
                hdl: extract_quantity(by_kind(ObservationKind::Hdl), ObservationKind::Hdl),
                ldl: extract_quantity(by_kind(ObservationKind::Ldl), ObservationKind::Ldl),
                triglycerides: extract_quantity(
                    by_kind(ObservationKind::Triglycerides),
                    ObservationKind::Triglycerides,
                ),
                cholesterol: extract_quantity(
                    by_kind(ObservationKind::Cholesterol),
                    ObservationKind::Cholesterol,
                ),
                creatinine: extract_quantity(
                    by_kind(ObservationKind::Creatinine),
                    ObservationKind::Creatinine,
                ),
                glucose: extract_quantity(by_kind(ObservationKind::Glucose), ObservationKind::Glucose),
            },
            smoking_status: extract_smoking_status(by_kind(ObservationKind::SmokingStatus)),
            patient,
        };
        info!(patient = %patient_id, "Patient record assembled");
        Ok(record)
    }

    /// Rows in display order.
    pub fn to_table(&self) -> RecordTable {
        let p = &self.patient;
        [
            ("Name", p.full_name()),
            ("Gender", p.gender.clone()),
            ("Race", p.race.clone()),
            ("Ethnicity", p.ethnicity.clone()),
            ("Date of Birth", p.birth_date.clone()),
            ("Age", p.age_display()),
            ("Height", self.vitals.height.clone()),
            ("Weight", self.vitals.weight.clone()),
            ("BMI", self.vitals.bmi.clone()),
            ("Systolic BP", self.vitals.systolic_bp.clone()),
            ("Diastolic BP", self.vitals.diastolic_bp.clone()),
            ("HDL", self.labs.hdl.clone()),
            ("LDL", self.labs.ldl.clone()),
            ("Triglycerides", self.labs.triglycerides.clone()),
            ("Cholesterol", self.labs.cholesterol.clone()),
            ("Creatinine", self.labs.creatinine.clone()),
            ("Glucose (blood sugar)", self.labs.glucose.clone()),
            ("Tobacco Smoking Status", self.smoking_status.clone()),
        ]
        .into_iter()
        .collect()
    }
}
