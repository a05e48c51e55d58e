//! City government domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::Error;
use shared::pagination::PageQuery;

/// Government role within a city.
///
/// The one canonical ordered role set. Authority comparisons use the power
/// table below; a role may act on another's grant only when it strictly
/// outranks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovRole {
    Moderator,
    Advisor,
    Mayor,
}

impl GovRole {
    /// All roles, weakest first.
    pub const ALL: [GovRole; 3] = [GovRole::Moderator, GovRole::Advisor, GovRole::Mayor];

    fn power(&self) -> u8 {
        match self {
            GovRole::Moderator => 10,
            GovRole::Advisor => 20,
            GovRole::Mayor => 30,
        }
    }

    /// Strictly-greater authority. Equal ranks never outrank each other.
    pub fn outranks(&self, other: GovRole) -> bool {
        self.power() > other.power()
    }

    /// Whether a holder of this role may issue an invite for `invited`.
    ///
    /// Strictly subordinate roles only, except the mayor, who may invite any
    /// role including a mayor-successor (the mayor-transfer flow).
    pub fn may_invite(&self, invited: GovRole) -> bool {
        matches!(self, GovRole::Mayor) || self.outranks(invited)
    }
}

impl PartialOrd for GovRole {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GovRole {
    fn cmp(&self, other: &Self) -> Ordering {
        self.power().cmp(&other.power())
    }
}

impl fmt::Display for GovRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GovRole::Moderator => "moderator",
            GovRole::Advisor => "advisor",
            GovRole::Mayor => "mayor",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GovRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moderator" => Ok(GovRole::Moderator),
            "advisor" => Ok(GovRole::Advisor),
            "mayor" => Ok(GovRole::Mayor),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// A government grant: one user holding one role in one city.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CityGov {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city_id: Uuid,
    pub role: GovRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for a direct grant (sysadmin bootstrap path).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct GrantGovRequest {
    pub user_id: Uuid,
    pub city_id: Uuid,
    pub role: GovRole,

    #[validate(length(max = 255, message = "Label must be at most 255 characters"))]
    pub label: Option<String>,
}

/// Query parameters for listing grants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGovsQuery {
    pub city_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub role: Option<GovRole>,

    #[serde(flatten)]
    pub page: PageQuery,
}
