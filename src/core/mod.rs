//! Core library components.
//!
//! Reusable logic for key management, encryption, the secrets file model,
//! and cross-environment analysis.

pub mod analyze;
pub mod constants;
pub mod crypto;
pub mod keyfile;
pub mod secrets;
