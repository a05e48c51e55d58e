//! City entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{CityStatus, Point};

/// Database enum for city_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "city_status", rename_all = "lowercase")]
pub enum CityStatusDb {
    Community,
    Official,
    Deprecated,
}

impl From<CityStatusDb> for CityStatus {
    fn from(db: CityStatusDb) -> Self {
        match db {
            CityStatusDb::Community => Self::Community,
            CityStatusDb::Official => Self::Official,
            CityStatusDb::Deprecated => Self::Deprecated,
        }
    }
}

impl From<CityStatus> for CityStatusDb {
    fn from(status: CityStatus) -> Self {
        match status {
            CityStatus::Community => Self::Community,
            CityStatus::Official => Self::Official,
            CityStatus::Deprecated => Self::Deprecated,
        }
    }
}

/// Database row mapping for the cities table.
#[derive(Debug, Clone, FromRow)]
pub struct CityEntity {
    pub id: Uuid,
    pub country_id: Uuid,
    pub name: String,
    pub status: CityStatusDb,
    pub longitude: f64,
    pub latitude: f64,
    pub timezone: String,
    pub icon: Option<String>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CityEntity> for domain::models::City {
    fn from(entity: CityEntity) -> Self {
        Self {
            id: entity.id,
            country_id: entity.country_id,
            name: entity.name,
            status: entity.status.into(),
            point: Point {
                longitude: entity.longitude,
                latitude: entity.latitude,
            },
            timezone: entity.timezone,
            icon: entity.icon,
            slug: entity.slug,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
