//! Outbound partner notification dispatch.
//!
//! The core only consumes the success/failure outcome of a notification
//! attempt (to decide `pending_notify` vs `notified`); everything about the
//! transport lives here, behind the [`Notifier`] trait.

pub mod notify;

pub use notify::{NotifyError, Notifier, NotifyOutcome, PlacementSummary, WebhookNotifier};
