//! Test module for integration and determinism tests.
//!
//! - `helpers.rs`: configuration factories and scripted brains
//! - `integration.rs`: end-to-end scenarios through the public surface
//! - `determinism.rs`: same-seed runs must agree event for event

mod determinism;
mod helpers;
