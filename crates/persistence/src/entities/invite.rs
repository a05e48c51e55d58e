//! Government invite entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entities::city_gov::GovRoleDb;
use domain::models::InviteStatus;

/// Database enum for invite_status.
///
/// "Expired" is not a stored state; a sent invite past its expiry simply
/// fails at answer time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invite_status", rename_all = "lowercase")]
pub enum InviteStatusDb {
    Sent,
    Accepted,
    Rejected,
}

impl From<InviteStatusDb> for InviteStatus {
    fn from(db: InviteStatusDb) -> Self {
        match db {
            InviteStatusDb::Sent => Self::Sent,
            InviteStatusDb::Accepted => Self::Accepted,
            InviteStatusDb::Rejected => Self::Rejected,
        }
    }
}

impl From<InviteStatus> for InviteStatusDb {
    fn from(status: InviteStatus) -> Self {
        match status {
            InviteStatus::Sent => Self::Sent,
            InviteStatus::Accepted => Self::Accepted,
            InviteStatus::Rejected => Self::Rejected,
        }
    }
}

/// Database row mapping for the invites table.
#[derive(Debug, Clone, FromRow)]
pub struct InviteEntity {
    pub id: Uuid,
    pub city_id: Uuid,
    pub role: GovRoleDb,
    pub status: InviteStatusDb,
    pub initiator_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<InviteEntity> for domain::models::Invite {
    fn from(entity: InviteEntity) -> Self {
        Self {
            id: entity.id,
            city_id: entity.city_id,
            role: entity.role.into(),
            status: entity.status.into(),
            initiator_id: entity.initiator_id,
            user_id: entity.user_id,
            expires_at: entity.expires_at,
            answered_at: entity.answered_at,
            created_at: entity.created_at,
        }
    }
}
