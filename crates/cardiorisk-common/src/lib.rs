//! cardiorisk-common — Shared types, errors, and the HTTP allowlist client
//! used across all cardiorisk crates.

pub mod error;
pub mod questions;
pub mod records;
pub mod sandbox;
pub mod wire;

// Re-export commonly used types
pub use error::{CardioRiskError, Result};
pub use questions::{Answer, Question, RiskAnswers, Selections};
pub use records::RecordTable;
pub use wire::{RiskRequest, RiskResponse};
