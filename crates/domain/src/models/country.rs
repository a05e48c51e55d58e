//! Country domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::Error;
use crate::models::city::CityStatus;
use shared::pagination::PageQuery;

/// Support status of a country.
///
/// Countries are created `Unsupported`; every later transition goes through
/// the status cascade, never a bare field write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryStatus {
    Unsupported,
    Supported,
    Deprecated,
    Suspended,
}

impl CountryStatus {
    pub fn is_supported(&self) -> bool {
        matches!(self, CountryStatus::Supported)
    }

    /// City status forced onto child cities when a country takes this status.
    ///
    /// Demotion cascades; promotion does not. `Suspended` and `Deprecated`
    /// both park cities at `Deprecated`, the single demoted city status.
    pub fn cascaded_city_status(&self) -> Option<CityStatus> {
        match self {
            CountryStatus::Deprecated | CountryStatus::Suspended => Some(CityStatus::Deprecated),
            CountryStatus::Unsupported | CountryStatus::Supported => None,
        }
    }
}

impl fmt::Display for CountryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CountryStatus::Unsupported => "unsupported",
            CountryStatus::Supported => "supported",
            CountryStatus::Deprecated => "deprecated",
            CountryStatus::Suspended => "suspended",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CountryStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsupported" => Ok(CountryStatus::Unsupported),
            "supported" => Ok(CountryStatus::Supported),
            "deprecated" => Ok(CountryStatus::Deprecated),
            "suspended" => Ok(CountryStatus::Suspended),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Country domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub status: CountryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a country.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateCountryRequest {
    #[validate(custom(function = "shared::validation::validate_country_name"))]
    pub name: String,
}

/// Partial update of a country. Status is not settable here; it has its own
/// cascading operation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCountryRequest {
    #[validate(custom(function = "shared::validation::validate_country_name"))]
    pub name: Option<String>,
}

/// Query parameters for listing countries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListCountriesQuery {
    /// Substring match on name (case-insensitive).
    pub name: Option<String>,

    /// Filter by status.
    pub status: Option<CountryStatus>,

    #[serde(flatten)]
    pub page: PageQuery,
}
