//! Country directory operations.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    Country, CreateCountryRequest, ListCountriesQuery, UpdateCountryRequest,
};
use domain::{Error, Result};
use persistence::db::is_unique_violation;
use persistence::repositories::CountryRepository;
use shared::pagination::Page;

/// Directory operations on countries.
///
/// Status is deliberately absent here: changing it cascades onto cities and
/// grants, so it lives on [`crate::CascadeService`].
#[derive(Clone)]
pub struct CountryService {
    pool: PgPool,
    countries: CountryRepository,
}

impl CountryService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            countries: CountryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Creates a country. New countries start unsupported.
    pub async fn create(&self, request: CreateCountryRequest) -> Result<Country> {
        request.validate().map_err(Error::from_validation)?;

        // Fast path; the unique index on LOWER(name) is the safety net.
        if self.countries.find_by_name(&request.name).await?.is_some() {
            return Err(Error::CountryAlreadyExists(request.name));
        }

        let mut tx = self.pool.begin().await?;
        let entity = self
            .countries
            .insert(&mut tx, &request.name)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, Some("countries_name_ci_key")) {
                    Error::CountryAlreadyExists(request.name.clone())
                } else {
                    e.into()
                }
            })?;
        tx.commit().await?;

        info!(country_id = %entity.id, name = %entity.name, "Created country");
        Ok(entity.into())
    }

    /// Fetches a country by ID.
    pub async fn get(&self, id: Uuid) -> Result<Country> {
        let entity = self
            .countries
            .find_by_id(id)
            .await?
            .ok_or(Error::CountryNotFound(id))?;
        Ok(entity.into())
    }

    /// Fetches a country by name, case-insensitively.
    pub async fn get_by_name(&self, name: &str) -> Result<Country> {
        let entity = self
            .countries
            .find_by_name(name)
            .await?
            .ok_or_else(|| Error::CountryNameNotFound(name.to_string()))?;
        Ok(entity.into())
    }

    /// Lists countries with name/status filters and pagination.
    pub async fn list(&self, query: ListCountriesQuery) -> Result<Page<Country>> {
        let status = query.status.map(Into::into);
        let name = query.name.as_deref();

        let entities = self
            .countries
            .list(name, status, query.page.size(), query.page.offset())
            .await?;
        let total = self.countries.count(name, status).await?;

        let items = entities.into_iter().map(Into::into).collect();
        Ok(Page::new(items, &query.page, total))
    }

    /// Applies a partial update. Name changes re-check uniqueness.
    pub async fn update(&self, id: Uuid, request: UpdateCountryRequest) -> Result<Country> {
        request.validate().map_err(Error::from_validation)?;

        let Some(name) = request.name else {
            // Nothing to change; behave as a read.
            return self.get(id).await;
        };

        if let Some(existing) = self.countries.find_by_name(&name).await? {
            if existing.id != id {
                return Err(Error::CountryAlreadyExists(name));
            }
        }

        let mut tx = self.pool.begin().await?;
        let entity = self
            .countries
            .update_name(&mut tx, id, &name)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, Some("countries_name_ci_key")) {
                    Error::CountryAlreadyExists(name.clone())
                } else {
                    e.into()
                }
            })?
            .ok_or(Error::CountryNotFound(id))?;
        tx.commit().await?;

        info!(country_id = %entity.id, name = %entity.name, "Updated country");
        Ok(entity.into())
    }
}
