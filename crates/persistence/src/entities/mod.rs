//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod city;
pub mod city_gov;
pub mod country;
pub mod invite;

pub use city::{CityEntity, CityStatusDb};
pub use city_gov::{CityGovEntity, GovRoleDb};
pub use country::{CountryEntity, CountryStatusDb};
pub use invite::{InviteEntity, InviteStatusDb};
