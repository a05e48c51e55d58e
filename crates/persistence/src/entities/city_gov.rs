//! City government grant entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::GovRole;

/// Database enum for gov_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "gov_role", rename_all = "lowercase")]
pub enum GovRoleDb {
    Moderator,
    Advisor,
    Mayor,
}

impl From<GovRoleDb> for GovRole {
    fn from(db: GovRoleDb) -> Self {
        match db {
            GovRoleDb::Moderator => Self::Moderator,
            GovRoleDb::Advisor => Self::Advisor,
            GovRoleDb::Mayor => Self::Mayor,
        }
    }
}

impl From<GovRole> for GovRoleDb {
    fn from(role: GovRole) -> Self {
        match role {
            GovRole::Moderator => Self::Moderator,
            GovRole::Advisor => Self::Advisor,
            GovRole::Mayor => Self::Mayor,
        }
    }
}

/// Database row mapping for the city_govs table.
#[derive(Debug, Clone, FromRow)]
pub struct CityGovEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city_id: Uuid,
    pub role: GovRoleDb,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CityGovEntity> for domain::models::CityGov {
    fn from(entity: CityGovEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            city_id: entity.city_id,
            role: entity.role.into(),
            label: entity.label,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
