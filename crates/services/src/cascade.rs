//! Status cascade.
//!
//! The only place country and city statuses are written. Demotions propagate
//! downward in one transaction: country status first, then the child cities,
//! then the grants that can no longer exist. If any step fails the whole
//! cascade rolls back and no partially-demoted state is observable.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use domain::models::{City, CityStatus, Country, CountryStatus};
use domain::{Error, Result};
use persistence::repositories::{CityGovRepository, CityRepository, CountryRepository};

/// Transactional status changes for countries and cities.
#[derive(Clone)]
pub struct CascadeService {
    pool: PgPool,
    countries: CountryRepository,
    cities: CityRepository,
    govs: CityGovRepository,
}

impl CascadeService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            countries: CountryRepository::new(pool.clone()),
            cities: CityRepository::new(pool.clone()),
            govs: CityGovRepository::new(pool.clone()),
            pool,
        }
    }

    /// Sets a country's status.
    ///
    /// Demoting to deprecated or suspended parks every official/community
    /// child city at deprecated and revokes all their grants. Promoting to
    /// supported touches nothing below the country: demotion cascades,
    /// promotion does not.
    pub async fn set_country_status(
        &self,
        country_id: Uuid,
        new_status: CountryStatus,
    ) -> Result<Country> {
        let mut tx = self.pool.begin().await?;

        self.countries
            .find_by_id_for_update(&mut tx, country_id)
            .await?
            .ok_or(Error::CountryNotFound(country_id))?;

        let entity = self
            .countries
            .set_status(&mut tx, country_id, new_status.into())
            .await?
            .ok_or(Error::CountryNotFound(country_id))?;

        let mut demoted_cities = 0;
        let mut revoked_grants = 0;
        if let Some(city_status) = new_status.cascaded_city_status() {
            demoted_cities = self
                .cities
                .demote_for_country(&mut tx, country_id, city_status.into())
                .await?;
            revoked_grants = self.govs.delete_for_country(&mut tx, country_id).await?;
        }

        tx.commit().await?;

        info!(
            country_id = %country_id,
            status = %new_status,
            demoted_cities,
            revoked_grants,
            "Set country status"
        );
        Ok(entity.into())
    }

    /// Sets a city's status.
    ///
    /// Leaving official revokes every grant the city holds; governance does
    /// not outlive an official city. Promoting to official requires the
    /// owning country to be supported.
    pub async fn set_city_status(&self, city_id: Uuid, new_status: CityStatus) -> Result<City> {
        let mut tx = self.pool.begin().await?;

        let city = self
            .cities
            .find_by_id_for_update(&mut tx, city_id)
            .await?
            .ok_or(Error::CityNotFound(city_id))?;

        if new_status == CityStatus::Official {
            let country = self
                .countries
                .find_by_id(city.country_id)
                .await?
                .ok_or(Error::CountryNotFound(city.country_id))?;
            let country_status: CountryStatus = country.status.into();
            if !country_status.is_supported() {
                return Err(Error::CountryNotSupported {
                    country_id: country.id,
                    status: country_status,
                });
            }
        }

        let entity = self
            .cities
            .set_status(&mut tx, city_id, new_status.into())
            .await?
            .ok_or(Error::CityNotFound(city_id))?;

        let mut revoked_grants = 0;
        if !new_status.allows_governance() {
            revoked_grants = self.govs.delete_for_city(&mut tx, city_id).await?;
        }

        tx.commit().await?;

        info!(
            city_id = %city_id,
            status = %new_status,
            revoked_grants,
            "Set city status"
        );
        Ok(entity.into())
    }
}
