//! Government invite domain model and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::models::gov::GovRole;
use shared::pagination::PageQuery;

/// Stored invite state.
///
/// `Sent` is the only non-terminal state. A `Sent` invite past its
/// `expires_at` behaves as expired; expiry is computed on read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Sent,
    Accepted,
    Rejected,
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InviteStatus::Sent => "sent",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for InviteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(InviteStatus::Sent),
            "accepted" => Ok(InviteStatus::Accepted),
            "rejected" => Ok(InviteStatus::Rejected),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Answer to an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteAnswer {
    Accept,
    Reject,
}

impl InviteAnswer {
    /// Terminal status this answer moves the invite to.
    pub fn resulting_status(&self) -> InviteStatus {
        match self {
            InviteAnswer::Accept => InviteStatus::Accepted,
            InviteAnswer::Reject => InviteStatus::Rejected,
        }
    }
}

/// Government invite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invite {
    pub id: Uuid,
    pub city_id: Uuid,
    pub role: GovRole,
    pub status: InviteStatus,
    /// Grant holder who issued the invite; absent for system-issued mayor
    /// invites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator_id: Option<Uuid>,
    /// User who answered; set together with `answered_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Whether a `Sent` invite has lapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Sent && now > self.expires_at
    }

    /// Checks that this invite can be answered with a token naming
    /// `token_city_id`, in the order the workflow prescribes: answered-once,
    /// then expiry, then token/row city agreement.
    pub fn ensure_answerable(&self, token_city_id: Uuid, now: DateTime<Utc>) -> Result<(), Error> {
        if self.status != InviteStatus::Sent {
            return Err(Error::InviteAlreadyAnswered(self.id));
        }
        if now > self.expires_at {
            return Err(Error::InviteExpired {
                id: self.id,
                expires_at: self.expires_at,
            });
        }
        // A token naming a different city than the row was either tampered
        // with or outlived a re-created invite with the same id.
        if token_city_id != self.city_id {
            return Err(Error::InvalidInviteToken);
        }
        Ok(())
    }
}

/// Query parameters for listing invites.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitesQuery {
    pub city_id: Option<Uuid>,
    pub status: Option<InviteStatus>,

    #[serde(flatten)]
    pub page: PageQuery,
}
