//! Application services for the Atlas backend.
//!
//! Each service exposes the operations of one part of the directory as plain
//! async methods returning `Result<T, domain::Error>`; transport adapters map
//! those to their own status codes. Every write operation owns exactly one
//! database transaction, opened here and threaded through the repository
//! calls it makes.

pub mod cascade;
pub mod cities;
pub mod config;
pub mod countries;
pub mod government;
pub mod invites;
pub mod logging;

pub use cascade::CascadeService;
pub use cities::CityService;
pub use countries::CountryService;
pub use government::GovService;
pub use invites::{AnsweredInvite, InviteService, IssuedInvite};
