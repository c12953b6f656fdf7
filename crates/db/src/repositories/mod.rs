//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod hire_repo;
pub mod introduction_repo;
pub mod partner_repo;
pub mod placement_repo;

pub use audit_repo::AuditRepo;
pub use hire_repo::HireRepo;
pub use introduction_repo::IntroductionRepo;
pub use partner_repo::PartnerRepo;
pub use placement_repo::PlacementRepo;
