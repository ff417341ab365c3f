#![allow(dead_code)]

use std::sync::Arc;

use cardiorisk_config::Config;
use cardiorisk_fhir::patient::PatientInfo;
use cardiorisk_fhir::record::{Labs, Vitals};
use cardiorisk_fhir::PatientRecord;
use cardiorisk_web::form::FormController;
use cardiorisk_web::risk::LocalRiskService;
use cardiorisk_web::session::{Session, SessionStore};
use cardiorisk_web::state::AppState;
use uuid::Uuid;

/// 55-year-old white woman, TC 213, HDL 50, SBP 120.
pub fn record() -> PatientRecord {
    PatientRecord {
        patient: PatientInfo {
            given_name: "Anna".into(),
            family_name: "Lee".into(),
            birth_date: "1969-01-01".into(),
            age: Some(55),
            gender: "female".into(),
            race: "White".into(),
            ethnicity: "Not Hispanic or Latino".into(),
        },
        vitals: Vitals {
            height: "165.0 cm".into(),
            weight: "62.0 kg".into(),
            bmi: "22.8 kg/m2".into(),
            systolic_bp: "120.0 mm[Hg]".into(),
            diastolic_bp: "80.0 mm[Hg]".into(),
        },
        labs: Labs {
            hdl: "50.0 mg/dL".into(),
            ldl: "130.0 mg/dL".into(),
            triglycerides: "110.0 mg/dL".into(),
            cholesterol: "213.0 mg/dL".into(),
            creatinine: "0.9 mg/dL".into(),
            glucose: "95.0 mg/dL".into(),
        },
        smoking_status: "Never smoker".into(),
    }
}

pub fn state() -> (AppState, SessionStore) {
    state_with(Config::default())
}

pub fn state_with(config: Config) -> (AppState, SessionStore) {
    let state = AppState::new(config).unwrap();
    let sessions = state.sessions.clone();
    (state, sessions)
}

/// Session that has already been through launch and record fetch.
pub async fn session_with_record(sessions: &SessionStore, record: PatientRecord) -> Uuid {
    let record = Arc::new(record);
    let form = Arc::new(FormController::new(Arc::new(LocalRiskService::new(Arc::clone(&record)))));
    sessions
        .create(Session { record: Some(record), form: Some(form), ..Session::default() })
        .await
}

pub fn cookie(id: Uuid) -> String {
    format!("cardiorisk_session={id}")
}
