//! Ferrous Relay Application Layer
//!
//! Authority selection, the per-question answer cache and the assembly of
//! per-question answers into one reply.
pub mod ports;
pub mod services;
pub mod use_cases;
