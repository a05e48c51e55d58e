//! Country entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::CountryStatus;

/// Database enum for country_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "country_status", rename_all = "lowercase")]
pub enum CountryStatusDb {
    Unsupported,
    Supported,
    Deprecated,
    Suspended,
}

impl From<CountryStatusDb> for CountryStatus {
    fn from(db: CountryStatusDb) -> Self {
        match db {
            CountryStatusDb::Unsupported => Self::Unsupported,
            CountryStatusDb::Supported => Self::Supported,
            CountryStatusDb::Deprecated => Self::Deprecated,
            CountryStatusDb::Suspended => Self::Suspended,
        }
    }
}

impl From<CountryStatus> for CountryStatusDb {
    fn from(status: CountryStatus) -> Self {
        match status {
            CountryStatus::Unsupported => Self::Unsupported,
            CountryStatus::Supported => Self::Supported,
            CountryStatus::Deprecated => Self::Deprecated,
            CountryStatus::Suspended => Self::Suspended,
        }
    }
}

/// Database row mapping for the countries table.
#[derive(Debug, Clone, FromRow)]
pub struct CountryEntity {
    pub id: Uuid,
    pub name: String,
    pub status: CountryStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CountryEntity> for domain::models::Country {
    fn from(entity: CountryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_roundtrip() {
        for status in [
            CountryStatus::Unsupported,
            CountryStatus::Supported,
            CountryStatus::Deprecated,
            CountryStatus::Suspended,
        ] {
            let db: CountryStatusDb = status.into();
            assert_eq!(CountryStatus::from(db), status);
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let entity = CountryEntity {
            id: Uuid::new_v4(),
            name: "Ukraine".to_string(),
            status: CountryStatusDb::Supported,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let country: domain::models::Country = entity.clone().into();
        assert_eq!(country.id, entity.id);
        assert_eq!(country.name, "Ukraine");
        assert_eq!(country.status, CountryStatus::Supported);
    }
}
