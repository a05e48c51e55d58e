//! Repository implementations for database operations.
//!
//! Read methods run against the pool. Write methods take a
//! `&mut PgConnection` so the caller decides the transaction boundary; the
//! services layer opens one transaction per operation and threads it through
//! every write it makes.

pub mod city;
pub mod city_gov;
pub mod country;
pub mod invite;

pub use city::CityRepository;
pub use city_gov::CityGovRepository;
pub use country::CountryRepository;
pub use invite::InviteRepository;
