//! Shared library surface for the SkySim engine and its tests.

pub mod backoff;
pub mod broadcast;
pub mod config;
pub mod errors;
pub mod loops;
pub mod persistence;
pub mod recorder;
pub mod state;
pub mod zones;
