//! Entity models and DTOs for the attribution ledger tables.

pub mod audit;
pub mod hire;
pub mod introduction;
pub mod partner;
pub mod placement;
