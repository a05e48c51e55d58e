//! Role-authority checks.
//!
//! The rules every governance mutation goes through. Acting on another
//! user's grant requires strictly greater authority; equal ranks can never
//! modify each other, and nothing outranks the mayor, so only the status
//! cascade removes one.

use std::cmp::Ordering;

use crate::error::Error;
use crate::models::gov::GovRole;

/// Compares two roles by authority.
pub fn compare(a: GovRole, b: GovRole) -> Ordering {
    a.cmp(&b)
}

/// Fails unless `initiator` strictly outranks `target`.
pub fn ensure_outranks(initiator: GovRole, target: GovRole) -> Result<(), Error> {
    if initiator.outranks(target) {
        Ok(())
    } else {
        Err(Error::InsufficientAuthority { initiator, target })
    }
}

/// Fails unless `initiator` may issue an invite for `invited`.
pub fn ensure_may_invite(initiator: GovRole, invited: GovRole) -> Result<(), Error> {
    if initiator.may_invite(invited) {
        Ok(())
    } else {
        Err(Error::InsufficientAuthority {
            initiator,
            target: invited,
        })
    }
}
