//! City government operations.
//!
//! Every mutation of someone else's grant goes through the strict authority
//! rule: the initiator must hold a grant in the same city that strictly
//! outranks the target's. Peers cannot touch each other, and nothing
//! outranks the mayor, so a mayor leaves only via transfer or cascade.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::{CityGov, CityStatus, GovRole, GrantGovRequest, ListGovsQuery};
use domain::services::authority;
use domain::{Error, Result};
use persistence::db::is_unique_violation;
use persistence::repositories::{CityGovRepository, CityRepository};
use shared::pagination::Page;

/// Operations on government grants.
#[derive(Clone)]
pub struct GovService {
    pool: PgPool,
    govs: CityGovRepository,
    cities: CityRepository,
}

impl GovService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            govs: CityGovRepository::new(pool.clone()),
            cities: CityRepository::new(pool.clone()),
            pool,
        }
    }

    /// Grants a role directly, without an invite. This is the sysadmin
    /// bootstrap path; regular grants come from accepted invites.
    pub async fn grant(&self, request: GrantGovRequest) -> Result<CityGov> {
        request.validate().map_err(Error::from_validation)?;

        let city = self
            .cities
            .find_by_id(request.city_id)
            .await?
            .ok_or(Error::CityNotFound(request.city_id))?;
        let city_status: CityStatus = city.status.into();
        if !city_status.allows_governance() {
            return Err(Error::CityNotOfficial {
                city_id: city.id,
                status: city_status,
            });
        }

        let mut tx = self.pool.begin().await?;

        // Check-then-insert stays inside the transaction; the partial unique
        // index rejects whoever loses a concurrent race.
        if request.role == GovRole::Mayor
            && self
                .govs
                .find_mayor_for_update(&mut tx, request.city_id)
                .await?
                .is_some()
        {
            return Err(Error::GovAlreadyExists {
                city_id: request.city_id,
            });
        }

        let entity = self
            .govs
            .insert(
                &mut tx,
                request.user_id,
                request.city_id,
                request.role.into(),
                request.label.as_deref(),
            )
            .await
            .map_err(|e| translate_gov_violation(e, request.city_id, request.user_id))?;
        tx.commit().await?;

        info!(
            city_id = %entity.city_id,
            user_id = %entity.user_id,
            role = %GovRole::from(entity.role),
            "Granted government role"
        );
        Ok(entity.into())
    }

    /// Fetches a user's grant in a city.
    pub async fn get(&self, city_id: Uuid, user_id: Uuid) -> Result<CityGov> {
        let entity = self
            .govs
            .find(city_id, user_id)
            .await?
            .ok_or(Error::CityGovNotFound { city_id, user_id })?;
        Ok(entity.into())
    }

    /// Fetches the city's mayor grant.
    pub async fn get_mayor(&self, city_id: Uuid) -> Result<CityGov> {
        let entity = self
            .govs
            .find_mayor(city_id)
            .await?
            .ok_or(Error::MayorNotFound(city_id))?;
        Ok(entity.into())
    }

    /// Lists grants with city/user/role filters and pagination.
    pub async fn list(&self, query: ListGovsQuery) -> Result<Page<CityGov>> {
        let role = query.role.map(Into::into);

        let entities = self
            .govs
            .list(
                query.city_id,
                query.user_id,
                role,
                query.page.size(),
                query.page.offset(),
            )
            .await?;
        let total = self.govs.count(query.city_id, query.user_id, role).await?;

        let items = entities.into_iter().map(Into::into).collect();
        Ok(Page::new(items, &query.page, total))
    }

    /// Changes the role on another user's grant.
    pub async fn update_role(
        &self,
        initiator_id: Uuid,
        target_user_id: Uuid,
        city_id: Uuid,
        new_role: GovRole,
    ) -> Result<CityGov> {
        let mut tx = self.pool.begin().await?;

        let initiator = self
            .govs
            .find_for_update(&mut tx, city_id, initiator_id)
            .await?
            .ok_or(Error::InitiatorNotCityGov {
                city_id,
                user_id: initiator_id,
            })?;
        let target = self
            .govs
            .find_for_update(&mut tx, city_id, target_user_id)
            .await?
            .ok_or(Error::CityGovNotFound {
                city_id,
                user_id: target_user_id,
            })?;

        let initiator_role: GovRole = initiator.role.into();
        authority::ensure_outranks(initiator_role, target.role.into())?;
        // Granting a rank at or above one's own would be an escalation.
        authority::ensure_outranks(initiator_role, new_role)?;

        let entity = self
            .govs
            .update_role(&mut tx, city_id, target_user_id, new_role.into())
            .await?
            .ok_or(Error::CityGovNotFound {
                city_id,
                user_id: target_user_id,
            })?;
        tx.commit().await?;

        info!(
            city_id = %city_id,
            initiator_id = %initiator_id,
            user_id = %target_user_id,
            role = %new_role,
            "Changed government role"
        );
        Ok(entity.into())
    }

    /// Removes another user's grant.
    pub async fn delete(
        &self,
        initiator_id: Uuid,
        target_user_id: Uuid,
        city_id: Uuid,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let initiator = self
            .govs
            .find_for_update(&mut tx, city_id, initiator_id)
            .await?
            .ok_or(Error::InitiatorNotCityGov {
                city_id,
                user_id: initiator_id,
            })?;
        let target = self
            .govs
            .find_for_update(&mut tx, city_id, target_user_id)
            .await?
            .ok_or(Error::CityGovNotFound {
                city_id,
                user_id: target_user_id,
            })?;

        authority::ensure_outranks(initiator.role.into(), target.role.into())?;

        self.govs.delete(&mut tx, city_id, target_user_id).await?;
        tx.commit().await?;

        info!(
            city_id = %city_id,
            initiator_id = %initiator_id,
            user_id = %target_user_id,
            "Revoked government role"
        );
        Ok(())
    }

    /// Removes the caller's own grant. The mayor must transfer the role
    /// first.
    pub async fn refuse_own(&self, user_id: Uuid, city_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let own = self
            .govs
            .find_for_update(&mut tx, city_id, user_id)
            .await?
            .ok_or(Error::CityGovNotFound { city_id, user_id })?;

        if GovRole::from(own.role) == GovRole::Mayor {
            return Err(Error::CannotRefuseMayor);
        }

        self.govs.delete(&mut tx, city_id, user_id).await?;
        tx.commit().await?;

        info!(city_id = %city_id, user_id = %user_id, "Government role refused by holder");
        Ok(())
    }
}

fn translate_gov_violation(err: sqlx::Error, city_id: Uuid, user_id: Uuid) -> Error {
    if is_unique_violation(&err, Some("city_govs_single_mayor_key")) {
        Error::GovAlreadyExists { city_id }
    } else if is_unique_violation(&err, Some("city_govs_city_user_key")) {
        Error::GovAlreadyGranted { city_id, user_id }
    } else {
        err.into()
    }
}
