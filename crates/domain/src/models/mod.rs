//! Domain models for the Atlas directory.

pub mod city;
pub mod country;
pub mod gov;
pub mod invite;

pub use city::{City, CityStatus, CreateCityRequest, ListCitiesQuery, NearFilter, Point, UpdateCityRequest};
pub use country::{Country, CountryStatus, CreateCountryRequest, ListCountriesQuery, UpdateCountryRequest};
pub use gov::{CityGov, GovRole, GrantGovRequest, ListGovsQuery};
pub use invite::{Invite, InviteAnswer, InviteStatus, ListInvitesQuery};
