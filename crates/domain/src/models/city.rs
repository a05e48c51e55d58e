//! City domain model.

use chrono::{DateTime, Utc};
use geo::{point, HaversineDistance};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::Error;
use shared::pagination::PageQuery;

/// Status of a city.
///
/// Only `Official` cities carry a government; demoting a city out of
/// `Official` revokes every grant it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CityStatus {
    Community,
    Official,
    Deprecated,
}

impl CityStatus {
    /// Whether the city may hold government grants and open invites.
    pub fn allows_governance(&self) -> bool {
        matches!(self, CityStatus::Official)
    }
}

impl fmt::Display for CityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CityStatus::Community => "community",
            CityStatus::Official => "official",
            CityStatus::Deprecated => "deprecated",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CityStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "community" => Ok(CityStatus::Community),
            "official" => Ok(CityStatus::Official),
            "deprecated" => Ok(CityStatus::Deprecated),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Geographic point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

impl Point {
    /// Great-circle distance to another point, in meters.
    pub fn distance_meters(&self, other: &Point) -> f64 {
        let a = point!(x: self.longitude, y: self.latitude);
        let b = point!(x: other.longitude, y: other.latitude);
        a.haversine_distance(&b)
    }
}

/// City domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct City {
    pub id: Uuid,
    pub country_id: Uuid,
    pub name: String,
    pub status: CityStatus,
    pub point: Point,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a city. New cities start as `community`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateCityRequest {
    pub country_id: Uuid,

    #[validate(custom(function = "shared::validation::validate_city_name"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_timezone"))]
    pub timezone: String,

    #[validate(length(max = 255, message = "Icon must be at most 255 characters"))]
    pub icon: Option<String>,

    #[validate(custom(function = "shared::validation::validate_slug"))]
    pub slug: Option<String>,
}

/// Partial update of a city. Status is not settable here; it has its own
/// cascading operation. Longitude and latitude move together.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_point_pair"))]
pub struct UpdateCityRequest {
    #[validate(custom(function = "shared::validation::validate_city_name"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_optional_longitude"))]
    pub longitude: Option<f64>,

    #[validate(custom(function = "validate_optional_latitude"))]
    pub latitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_timezone"))]
    pub timezone: Option<String>,

    #[validate(length(max = 255, message = "Icon must be at most 255 characters"))]
    pub icon: Option<String>,

    #[validate(custom(function = "shared::validation::validate_slug"))]
    pub slug: Option<String>,
}

impl UpdateCityRequest {
    /// The updated point, when both coordinates were provided.
    pub fn point(&self) -> Option<Point> {
        match (self.longitude, self.latitude) {
            (Some(longitude), Some(latitude)) => Some(Point {
                longitude,
                latitude,
            }),
            _ => None,
        }
    }
}

fn validate_optional_longitude(lon: f64) -> Result<(), ValidationError> {
    shared::validation::validate_longitude(lon)
}

fn validate_optional_latitude(lat: f64) -> Result<(), ValidationError> {
    shared::validation::validate_latitude(lat)
}

fn validate_point_pair(req: &UpdateCityRequest) -> Result<(), ValidationError> {
    if req.longitude.is_some() != req.latitude.is_some() {
        let mut err = ValidationError::new("point_pair");
        err.message = Some("Longitude and latitude must be provided together".into());
        return Err(err);
    }
    Ok(())
}

/// Geo-radius filter for city listings.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct NearFilter {
    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(range(min = 0.001, max = 20000.0, message = "Radius must be between 0.001 and 20000 km"))]
    pub radius_km: f64,
}

impl NearFilter {
    pub fn contains(&self, point: &Point) -> bool {
        let center = Point {
            longitude: self.longitude,
            latitude: self.latitude,
        };
        center.distance_meters(point) <= self.radius_km * 1000.0
    }
}

/// Query parameters for listing cities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListCitiesQuery {
    pub country_id: Option<Uuid>,

    /// Substring match on name (case-insensitive).
    pub name: Option<String>,

    pub status: Option<CityStatus>,

    /// Radius filter; applied after the SQL filters.
    #[serde(flatten)]
    pub near: Option<NearFilter>,

    #[serde(flatten)]
    pub page: PageQuery,
}
