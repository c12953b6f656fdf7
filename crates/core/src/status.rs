//! Status enums for introductions, placements, and hire sources.
//!
//! Stored as lowercase text in the database; `as_str` values match the
//! CHECK constraints in the migrations.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// IntroductionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an introduction.
///
/// `Open` is the only initial state. `Placed` is terminal and is reached
/// exclusively through the attribution engine. `Expired` and `Cancelled`
/// are terminal states set by explicit external update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroductionStatus {
    Open,
    Placed,
    Expired,
    Cancelled,
}

impl IntroductionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Placed => "placed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether this status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl FromStr for IntroductionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "placed" => Ok(Self::Placed),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown introduction status: {other}"
            ))),
        }
    }
}

impl fmt::Display for IntroductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PlacementStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a placement.
///
/// Created as `PendingNotify`; advances to `Notified` once the partner
/// notification succeeds. Later stages (`Invoiced`, `Paid`, `Disputed`) are
/// driven by explicit administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStatus {
    PendingNotify,
    Notified,
    Invoiced,
    Paid,
    Disputed,
}

impl PlacementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingNotify => "pending_notify",
            Self::Notified => "notified",
            Self::Invoiced => "invoiced",
            Self::Paid => "paid",
            Self::Disputed => "disputed",
        }
    }
}

impl FromStr for PlacementStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_notify" => Ok(Self::PendingNotify),
            "notified" => Ok(Self::Notified),
            "invoiced" => Ok(Self::Invoiced),
            "paid" => Ok(Self::Paid),
            "disputed" => Ok(Self::Disputed),
            other => Err(CoreError::Validation(format!(
                "Unknown placement status: {other}"
            ))),
        }
    }
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HireSource
// ---------------------------------------------------------------------------

/// Where a hire record came from.
///
/// All sources funnel through the same hire ledger and the same attribution
/// engine; the tag exists for traceability and reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HireSource {
    /// Reported by internal onboarding.
    Onboarding,
    /// Detected by the periodic registry reconciliation job.
    RegistrySync,
    /// Entered manually by an administrator.
    Manual,
}

impl HireSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::RegistrySync => "registry_sync",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for HireSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onboarding" => Ok(Self::Onboarding),
            "registry_sync" => Ok(Self::RegistrySync),
            "manual" => Ok(Self::Manual),
            other => Err(CoreError::Validation(format!(
                "Unknown hire source: {other}"
            ))),
        }
    }
}

impl fmt::Display for HireSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
