//! The attribution engine: matching hires to open introductions and
//! creating placements.

pub mod attribution;
