//! Advlink API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! attribution engine, background reconciliation) so integration tests and
//! the binary entrypoint can both access them.

pub mod audit;
pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
