//! Pure domain services.

pub mod authority;
