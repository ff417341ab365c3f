//! cardiorisk-web — SMART on FHIR app for 10-year ASCVD risk.
//! Provides:
//!   - EHR launch and OAuth2 authorization code flow
//!   - Patient record page with derived bedside calculators
//!   - Risk factor form with validation and a single in-flight request
//!   - `POST /calculate_ascvd_risk` JSON endpoint

pub mod derived;
pub mod error;
pub mod form;
pub mod handlers;
pub mod render;
pub mod risk;
pub mod router;
pub mod session;
pub mod state;
