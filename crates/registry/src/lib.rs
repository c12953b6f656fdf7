//! HTTP client for the external advisor registry.
//!
//! The reconciliation scheduler asks the registry whether a candidate CRD is
//! currently affiliated with the monitored firm. The [`AdvisorLookup`] trait
//! is the seam: production uses [`RegistryClient`] over HTTP, tests
//! substitute a stub.

pub mod client;

pub use client::{AdvisorLookup, AdvisorRecord, RegistryClient, RegistryError};
