//! Profile completion scoring and reward issuance for CosmicBeats.

pub mod config;
pub mod error;
pub mod profiles;
pub mod telemetry;
