//! HTTP handlers, grouped by resource.

pub mod audit;
pub mod hires;
pub mod introductions;
pub mod partners;
pub mod placements;
pub mod reconciliation;
pub mod stats;
