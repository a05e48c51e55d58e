//! Domain layer for the Atlas backend.
//!
//! This crate contains:
//! - Domain models (Country, City, CityGov, Invite)
//! - The role-authority rules and invite state machine
//! - The domain error taxonomy

pub mod error;
pub mod models;
pub mod services;

pub use error::{Error, ErrorKind, Result};
