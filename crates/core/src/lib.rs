//! Domain logic for the advlink attribution backend.
//!
//! This crate has no internal dependencies so the database layer, the API
//! server, and any future CLI tooling can all share the same types, error
//! taxonomy, and pure attribution arithmetic.

pub mod attribution;
pub mod audit;
pub mod error;
pub mod hashing;
pub mod secrets;
pub mod status;
pub mod types;
