//! Government invite workflow.
//!
//! An invite is a bearer credential: the signed token issued at creation is
//! what lets its holder claim the role, and the stored row is what makes the
//! claim single-use. Answering runs as one transaction over the locked
//! invite row, so a second answer, a concurrent mayor replacement, or a city
//! demoted mid-flight all resolve cleanly.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::{
    City, CityGov, CityStatus, GovRole, Invite, InviteAnswer, ListInvitesQuery,
};
use domain::services::authority;
use domain::{Error, Result};
use persistence::db::is_unique_violation;
use persistence::repositories::{CityGovRepository, CityRepository, InviteRepository};
use shared::invite_token::InviteTokenConfig;
use shared::pagination::Page;

/// A freshly issued invite with its bearer token.
///
/// The token is returned exactly once; it is not reconstructible later.
#[derive(Debug, Clone)]
pub struct IssuedInvite {
    pub invite: Invite,
    pub token: String,
}

/// Outcome of answering an invite.
#[derive(Debug, Clone)]
pub struct AnsweredInvite {
    pub invite: Invite,
    /// The grant created on acceptance; None on rejection.
    pub grant: Option<CityGov>,
}

/// The invite issuance and answering workflow.
#[derive(Clone)]
pub struct InviteService {
    pool: PgPool,
    invites: InviteRepository,
    govs: CityGovRepository,
    cities: CityRepository,
    token: InviteTokenConfig,
    ttl: chrono::Duration,
}

impl InviteService {
    pub fn new(pool: PgPool, token: InviteTokenConfig, ttl: chrono::Duration) -> Self {
        Self {
            invites: InviteRepository::new(pool.clone()),
            govs: CityGovRepository::new(pool.clone()),
            cities: CityRepository::new(pool.clone()),
            pool,
            token,
            ttl,
        }
    }

    /// Issues an invite on behalf of a sitting grant holder.
    ///
    /// The initiator may invite strictly subordinate roles; the mayor may
    /// invite any role, including a successor mayor (the transfer flow).
    pub async fn create_invite(
        &self,
        initiator_id: Uuid,
        city_id: Uuid,
        role: GovRole,
    ) -> Result<IssuedInvite> {
        let city = self.governable_city(city_id).await?;

        let initiator = self
            .govs
            .find(city_id, initiator_id)
            .await?
            .ok_or(Error::InitiatorNotCityGov {
                city_id,
                user_id: initiator_id,
            })?;
        authority::ensure_may_invite(initiator.role.into(), role)?;

        self.issue(city, role, Some(initiator_id)).await
    }

    /// Issues a mayor invite with no initiator check. This is the
    /// system-issued bootstrap path for a city without a government yet.
    pub async fn create_mayor_invite(&self, city_id: Uuid) -> Result<IssuedInvite> {
        let city = self.governable_city(city_id).await?;
        self.issue(city, GovRole::Mayor, None).await
    }

    /// Answers an invite with its bearer token.
    pub async fn answer(
        &self,
        user_id: Uuid,
        token: &str,
        answer: InviteAnswer,
    ) -> Result<AnsweredInvite> {
        // Signature/format failures only; expiry is checked against the row.
        let claims = self
            .token
            .verify(token)
            .map_err(|_| Error::InvalidInviteToken)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // The row lock serializes concurrent answers to the same invite.
        let entity = self
            .invites
            .find_by_id_for_update(&mut tx, claims.invite_id)
            .await?
            .ok_or(Error::InviteNotFound(claims.invite_id))?;
        let invite: Invite = entity.into();

        invite.ensure_answerable(claims.city_id, now)?;

        let grant = match answer {
            InviteAnswer::Reject => None,
            InviteAnswer::Accept => {
                // The city may have been demoted after issuance; the grant
                // must not be created, and the whole answer rolls back.
                let city = self
                    .cities
                    .find_by_id_for_update(&mut tx, invite.city_id)
                    .await?
                    .ok_or(Error::CityNotFound(invite.city_id))?;
                let city_status: CityStatus = city.status.into();
                if !city_status.allows_governance() {
                    warn!(
                        invite_id = %invite.id,
                        city_id = %invite.city_id,
                        status = %city_status,
                        "Invite answered for a city that no longer accepts governance"
                    );
                    return Err(Error::InviteCityInactive {
                        city_id: invite.city_id,
                    });
                }

                // Mayor replacement: remove the sitting mayor in the same
                // transaction as the new grant, so there is never a window
                // with two mayors, nor one with none.
                if invite.role == GovRole::Mayor {
                    let replaced = self.govs.delete_mayor(&mut tx, invite.city_id).await?;
                    if replaced {
                        info!(
                            city_id = %invite.city_id,
                            "Sitting mayor replaced by accepted invite"
                        );
                    }
                }

                let grant = self
                    .govs
                    .insert(&mut tx, user_id, invite.city_id, invite.role.into(), None)
                    .await
                    .map_err(|e| translate_grant_violation(e, invite.city_id, user_id))?;
                Some(CityGov::from(grant))
            }
        };

        let answered = self
            .invites
            .mark_answered(
                &mut tx,
                invite.id,
                answer.resulting_status().into(),
                user_id,
                now,
            )
            .await?;
        if !answered {
            // Another answer won the race.
            return Err(Error::InviteAlreadyAnswered(invite.id));
        }

        tx.commit().await?;

        info!(
            invite_id = %invite.id,
            city_id = %invite.city_id,
            user_id = %user_id,
            answer = ?answer,
            "Invite answered"
        );

        Ok(AnsweredInvite {
            invite: Invite {
                status: answer.resulting_status(),
                user_id: Some(user_id),
                answered_at: Some(now),
                ..invite
            },
            grant,
        })
    }

    /// Lists invites with city/status filters and pagination.
    pub async fn list(&self, query: ListInvitesQuery) -> Result<Page<Invite>> {
        let status = query.status.map(Into::into);

        let entities = self
            .invites
            .list(
                query.city_id,
                status,
                query.page.size(),
                query.page.offset(),
            )
            .await?;
        let total = self.invites.count(query.city_id, status).await?;

        let items = entities.into_iter().map(Into::into).collect();
        Ok(Page::new(items, &query.page, total))
    }

    /// Fetches an invite by ID.
    pub async fn get(&self, id: Uuid) -> Result<Invite> {
        let entity = self
            .invites
            .find_by_id(id)
            .await?
            .ok_or(Error::InviteNotFound(id))?;
        Ok(entity.into())
    }

    async fn governable_city(&self, city_id: Uuid) -> Result<City> {
        let city = self
            .cities
            .find_by_id(city_id)
            .await?
            .ok_or(Error::CityNotFound(city_id))?;
        let city: City = city.into();
        if !city.status.allows_governance() {
            return Err(Error::CityNotOfficial {
                city_id: city.id,
                status: city.status,
            });
        }
        Ok(city)
    }

    /// Persists the invite row, then signs the token from the stored id so
    /// that any later read is linearizable with the row write.
    async fn issue(
        &self,
        city: City,
        role: GovRole,
        initiator_id: Option<Uuid>,
    ) -> Result<IssuedInvite> {
        let expires_at = Utc::now() + self.ttl;

        let mut tx = self.pool.begin().await?;
        let entity = self
            .invites
            .insert(&mut tx, city.id, role.into(), initiator_id, expires_at)
            .await?;

        let token = self
            .token
            .sign(
                entity.id,
                city.id,
                &role.to_string(),
                initiator_id,
                entity.expires_at,
            )
            .map_err(|e| Error::TokenSigning(e.to_string()))?;
        tx.commit().await?;

        info!(
            invite_id = %entity.id,
            city_id = %city.id,
            role = %role,
            system_issued = initiator_id.is_none(),
            "Issued government invite"
        );

        Ok(IssuedInvite {
            invite: entity.into(),
            token,
        })
    }
}

fn translate_grant_violation(err: sqlx::Error, city_id: Uuid, user_id: Uuid) -> Error {
    if is_unique_violation(&err, Some("city_govs_single_mayor_key")) {
        Error::GovAlreadyExists { city_id }
    } else if is_unique_violation(&err, Some("city_govs_city_user_key")) {
        Error::GovAlreadyGranted { city_id, user_id }
    } else {
        err.into()
    }
}
