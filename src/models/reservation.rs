use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Held,
    Locked,
    Confirmed,
    Expired,
    Released,
}

impl ReservationStatus {
    /// Statuses that can claim a seat (subject to `expires_at`).
    pub const ACTIVE: [ReservationStatus; 3] = [
        ReservationStatus::Held,
        ReservationStatus::Locked,
        ReservationStatus::Confirmed,
    ];

    /// Statuses that lapse into `Expired` once their TTL passes.
    pub const EXPIRABLE: [ReservationStatus; 2] =
        [ReservationStatus::Held, ReservationStatus::Locked];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Held => "held",
            ReservationStatus::Locked => "locked",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Expired => "expired",
            ReservationStatus::Released => "released",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Transitions reachable through an explicit promote call.
    /// Expiry is not one of them: it only happens through a sweep.
    pub fn can_transition_to(&self, to: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, to),
            (Held, Locked) | (Held, Confirmed) | (Locked, Confirmed) | (Held, Released) | (Locked, Released)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "held" => Ok(ReservationStatus::Held),
            "locked" => Ok(ReservationStatus::Locked),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "expired" => Ok(ReservationStatus::Expired),
            "released" => Ok(ReservationStatus::Released),
            other => Err(format!("unknown reservation status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: Uuid,
    pub seat_id: i64,
    pub event_id: i64,
    pub holder_ref: String,
    pub status: ReservationStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRecord {
    /// Whether this reservation claims its seat at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && self.expires_at.map_or(true, |at| at > now)
    }

    pub fn is_due_for_expiry(&self, now: DateTime<Utc>) -> bool {
        ReservationStatus::EXPIRABLE.contains(&self.status)
            && self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Input for a hold attempt.
#[derive(Debug, Clone)]
pub struct NewHold {
    pub id: Uuid,
    pub seat_id: i64,
    pub holder_ref: String,
    pub expires_at: DateTime<Utc>,
}
