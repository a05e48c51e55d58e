//! Domain error taxonomy.
//!
//! One closed enum for every failure the directory and governance operations
//! can produce. Each variant carries the identifiers a caller needs to render
//! a precise message; `kind()` projects onto the coarse taxonomy transport
//! adapters map to status codes.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CityStatus, CountryStatus, GovRole};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Not found
    #[error("Country {0} not found")]
    CountryNotFound(Uuid),

    #[error("Country named \"{0}\" not found")]
    CountryNameNotFound(String),

    #[error("City {0} not found")]
    CityNotFound(Uuid),

    #[error("City with slug \"{0}\" not found")]
    CitySlugNotFound(String),

    #[error("User {user_id} holds no government role in city {city_id}")]
    CityGovNotFound { city_id: Uuid, user_id: Uuid },

    #[error("City {0} has no mayor")]
    MayorNotFound(Uuid),

    #[error("Invite {0} not found")]
    InviteNotFound(Uuid),

    // Already exists
    #[error("Country named \"{0}\" already exists")]
    CountryAlreadyExists(String),

    #[error("City slug \"{0}\" is already taken")]
    CitySlugAlreadyExists(String),

    #[error("City {city_id} already has an active mayor")]
    GovAlreadyExists { city_id: Uuid },

    #[error("User {user_id} already holds a government role in city {city_id}")]
    GovAlreadyGranted { city_id: Uuid, user_id: Uuid },

    // Invalid argument
    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Unknown government role \"{0}\"")]
    UnknownRole(String),

    #[error("Unknown status \"{0}\"")]
    UnknownStatus(String),

    // Permission denied
    #[error("Initiator {user_id} holds no government role in city {city_id}")]
    InitiatorNotCityGov { city_id: Uuid, user_id: Uuid },

    #[error("Role {initiator} does not outrank {target}")]
    InsufficientAuthority { initiator: GovRole, target: GovRole },

    #[error("The mayor must transfer the role before leaving")]
    CannotRefuseMayor,

    // Failed precondition
    #[error("Country {country_id} is {status}; it must be supported")]
    CountryNotSupported {
        country_id: Uuid,
        status: CountryStatus,
    },

    #[error("City {city_id} is {status}; governance requires an official city")]
    CityNotOfficial { city_id: Uuid, status: CityStatus },

    #[error("City {city_id} no longer accepts governance changes")]
    InviteCityInactive { city_id: Uuid },

    // Invite-specific
    #[error("Invite token is invalid")]
    InvalidInviteToken,

    #[error("Invite {0} has already been answered")]
    InviteAlreadyAnswered(Uuid),

    #[error("Invite {id} expired at {expires_at}")]
    InviteExpired {
        id: Uuid,
        expires_at: DateTime<Utc>,
    },

    // Internal
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to sign invite token: {0}")]
    TokenSigning(String),
}

/// Coarse error classification for transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    PermissionDenied,
    FailedPrecondition,
    InvalidToken,
    Expired,
    AlreadyAnswered,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CountryNotFound(_)
            | Error::CountryNameNotFound(_)
            | Error::CityNotFound(_)
            | Error::CitySlugNotFound(_)
            | Error::CityGovNotFound { .. }
            | Error::MayorNotFound(_)
            | Error::InviteNotFound(_) => ErrorKind::NotFound,

            Error::CountryAlreadyExists(_)
            | Error::CitySlugAlreadyExists(_)
            | Error::GovAlreadyExists { .. }
            | Error::GovAlreadyGranted { .. } => ErrorKind::AlreadyExists,

            Error::InvalidField { .. } | Error::UnknownRole(_) | Error::UnknownStatus(_) => {
                ErrorKind::InvalidArgument
            }

            Error::InitiatorNotCityGov { .. }
            | Error::InsufficientAuthority { .. }
            | Error::CannotRefuseMayor => ErrorKind::PermissionDenied,

            Error::CountryNotSupported { .. }
            | Error::CityNotOfficial { .. }
            | Error::InviteCityInactive { .. } => ErrorKind::FailedPrecondition,

            Error::InvalidInviteToken => ErrorKind::InvalidToken,
            Error::InviteAlreadyAnswered(_) => ErrorKind::AlreadyAnswered,
            Error::InviteExpired { .. } => ErrorKind::Expired,

            Error::Database(_) | Error::TokenSigning(_) => ErrorKind::Internal,
        }
    }

    /// Converts validator output into the first failing field's error.
    ///
    /// Validation short-circuits per field; the first offending field (in
    /// stable field-name order) names itself in the error.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        if let Some((field, errs)) = fields.into_iter().next() {
            let message = errs
                .first()
                .and_then(|e| e.message.clone())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string());
            return Error::InvalidField {
                field: field.to_string(),
                message,
            };
        }

        Error::InvalidField {
            field: "request".to_string(),
            message: "invalid request".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_kind_not_found() {
        assert_eq!(
            Error::CountryNotFound(Uuid::new_v4()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::CityGovNotFound {
                city_id: Uuid::new_v4(),
                user_id: Uuid::new_v4()
            }
            .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_kind_already_exists() {
        assert_eq!(
            Error::CountryAlreadyExists("Ukraine".into()).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            Error::GovAlreadyExists {
                city_id: Uuid::new_v4()
            }
            .kind(),
            ErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_kind_permission() {
        assert_eq!(
            Error::InsufficientAuthority {
                initiator: GovRole::Moderator,
                target: GovRole::Mayor
            }
            .kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(Error::CannotRefuseMayor.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_kind_invite_errors() {
        assert_eq!(Error::InvalidInviteToken.kind(), ErrorKind::InvalidToken);
        assert_eq!(
            Error::InviteAlreadyAnswered(Uuid::new_v4()).kind(),
            ErrorKind::AlreadyAnswered
        );
        assert_eq!(
            Error::InviteExpired {
                id: Uuid::new_v4(),
                expires_at: Utc::now()
            }
            .kind(),
            ErrorKind::Expired
        );
    }

    #[test]
    fn test_kind_internal() {
        assert_eq!(
            Error::Database(sqlx::Error::PoolClosed).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_from_validation_names_field() {
        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1, message = "Name must not be blank"))]
            name: String,
        }

        let probe = Probe {
            name: String::new(),
        };
        let err = Error::from_validation(probe.validate().unwrap_err());
        match err {
            Error::InvalidField { field, message } => {
                assert_eq!(field, "name");
                assert_eq!(message, "Name must not be blank");
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_display_carries_identifiers() {
        let id = Uuid::new_v4();
        let msg = format!("{}", Error::CountryNotFound(id));
        assert!(msg.contains(&id.to_string()));
    }
}
