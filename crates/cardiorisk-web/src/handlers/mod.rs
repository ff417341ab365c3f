//! HTTP handlers for all web routes.

pub mod calculate;
pub mod launch;
pub mod record;
pub mod system;
