//! cardiorisk-fhir — SMART on FHIR launch and FHIR R4 resource access.
//!
//! API docs: https://hl7.org/fhir/smart-app-launch/app-launch.html
//!
//!   - `smart`      : discovery, authorization URL, code → token exchange
//!   - `client`     : bearer-authenticated, host-allowlisted FHIR reads
//!   - `patient`    : demographics from a Patient resource
//!   - `observation`: vital signs / labs / smoking status from Observations
//!   - `record`     : concurrent fetch of everything the record page shows

pub mod client;
pub mod observation;
pub mod patient;
pub mod record;
pub mod smart;

pub use client::{FhirClient, FhirQuery};
pub use observation::ObservationKind;
pub use patient::PatientInfo;
pub use record::PatientRecord;
pub use smart::{SmartConfiguration, TokenResponse};
