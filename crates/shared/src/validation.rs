//! Field validators for geographic and naming rules.

use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use validator::ValidationError;

lazy_static! {
    /// City names: latin letters, spaces and hyphens.
    static ref CITY_NAME_RE: Regex = Regex::new(r"^[A-Za-z -]+$").unwrap();

    /// Slugs: lowercase words joined by single hyphens.
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z]+(-[a-z]+)*$").unwrap();
}

/// Maximum length for country and city names.
const MAX_NAME_LEN: usize = 120;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates a city name: non-blank, letters/spaces/hyphens only.
pub fn validate_city_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }
    if name.len() > MAX_NAME_LEN {
        let mut err = ValidationError::new("name_length");
        err.message = Some("Name must be at most 120 characters".into());
        return Err(err);
    }
    if !CITY_NAME_RE.is_match(name) {
        let mut err = ValidationError::new("name_charset");
        err.message = Some("Name may contain only letters, spaces and hyphens".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a country name: non-blank, bounded length.
pub fn validate_country_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }
    if name.len() > MAX_NAME_LEN {
        let mut err = ValidationError::new("name_length");
        err.message = Some("Name must be at most 120 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a slug: lowercase words joined by single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug_format");
        err.message = Some("Slug must be lowercase words joined by hyphens".into());
        Err(err)
    }
}

/// Validates that a timezone resolves to a known IANA zone.
pub fn validate_timezone(tz: &str) -> Result<(), ValidationError> {
    match chrono_tz::Tz::from_str(tz) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("timezone_unknown");
            err.message = Some("Timezone is not a known IANA zone".into());
            Err(err)
        }
    }
}
