//! City directory operations.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::{City, CreateCityRequest, ListCitiesQuery, UpdateCityRequest};
use domain::{Error, Result};
use persistence::db::is_unique_violation;
use persistence::repositories::{CityRepository, CountryRepository};
use shared::pagination::Page;

/// Directory operations on cities.
///
/// Status is deliberately absent here: changing it revokes grants, so it
/// lives on [`crate::CascadeService`].
#[derive(Clone)]
pub struct CityService {
    pool: PgPool,
    cities: CityRepository,
    countries: CountryRepository,
}

impl CityService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            cities: CityRepository::new(pool.clone()),
            countries: CountryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Creates a city under a supported country. New cities start as
    /// community.
    pub async fn create(&self, request: CreateCityRequest) -> Result<City> {
        request.validate().map_err(Error::from_validation)?;

        let country = self
            .countries
            .find_by_id(request.country_id)
            .await?
            .ok_or(Error::CountryNotFound(request.country_id))?;

        let country_status: domain::models::CountryStatus = country.status.into();
        if !country_status.is_supported() {
            return Err(Error::CountryNotSupported {
                country_id: country.id,
                status: country_status,
            });
        }

        if let Some(slug) = request.slug.as_deref() {
            if self.cities.find_by_slug(slug).await?.is_some() {
                return Err(Error::CitySlugAlreadyExists(slug.to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;
        let entity = self
            .cities
            .insert(
                &mut tx,
                request.country_id,
                &request.name,
                request.longitude,
                request.latitude,
                &request.timezone,
                request.icon.as_deref(),
                request.slug.as_deref(),
            )
            .await
            .map_err(|e| translate_slug_violation(e, request.slug.as_deref()))?;
        tx.commit().await?;

        info!(
            city_id = %entity.id,
            country_id = %entity.country_id,
            name = %entity.name,
            "Created city"
        );
        Ok(entity.into())
    }

    /// Fetches a city by ID.
    pub async fn get(&self, id: Uuid) -> Result<City> {
        let entity = self
            .cities
            .find_by_id(id)
            .await?
            .ok_or(Error::CityNotFound(id))?;
        Ok(entity.into())
    }

    /// Fetches a city by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<City> {
        let entity = self
            .cities
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| Error::CitySlugNotFound(slug.to_string()))?;
        Ok(entity.into())
    }

    /// Lists cities with country/name/status filters, an optional geo-radius
    /// filter, and pagination.
    ///
    /// The radius predicate cannot be pushed into SQL, so when it is present
    /// the SQL-filtered rows are refined and paginated in memory.
    pub async fn list(&self, query: ListCitiesQuery) -> Result<Page<City>> {
        if let Some(near) = &query.near {
            near.validate().map_err(Error::from_validation)?;
        }

        let status = query.status.map(Into::into);
        let name = query.name.as_deref();

        match &query.near {
            None => {
                let entities = self
                    .cities
                    .list(
                        query.country_id,
                        name,
                        status,
                        query.page.size(),
                        query.page.offset(),
                    )
                    .await?;
                let total = self.cities.count(query.country_id, name, status).await?;
                let items = entities.into_iter().map(Into::into).collect();
                Ok(Page::new(items, &query.page, total))
            }
            Some(near) => {
                let entities = self
                    .cities
                    .list_unpaged(query.country_id, name, status)
                    .await?;
                let matching: Vec<City> = entities
                    .into_iter()
                    .map(City::from)
                    .filter(|city| near.contains(&city.point))
                    .collect();
                Ok(Page::from_full_set(matching, &query.page))
            }
        }
    }

    /// Applies a partial update. Slug changes re-check uniqueness.
    pub async fn update(&self, id: Uuid, request: UpdateCityRequest) -> Result<City> {
        request.validate().map_err(Error::from_validation)?;

        if let Some(slug) = request.slug.as_deref() {
            if let Some(existing) = self.cities.find_by_slug(slug).await? {
                if existing.id != id {
                    return Err(Error::CitySlugAlreadyExists(slug.to_string()));
                }
            }
        }

        let mut tx = self.pool.begin().await?;
        let entity = self
            .cities
            .update_partial(
                &mut tx,
                id,
                request.name.as_deref(),
                request.longitude,
                request.latitude,
                request.timezone.as_deref(),
                request.icon.as_deref(),
                request.slug.as_deref(),
            )
            .await
            .map_err(|e| translate_slug_violation(e, request.slug.as_deref()))?
            .ok_or(Error::CityNotFound(id))?;
        tx.commit().await?;

        info!(city_id = %entity.id, name = %entity.name, "Updated city");
        Ok(entity.into())
    }
}

fn translate_slug_violation(err: sqlx::Error, slug: Option<&str>) -> Error {
    if is_unique_violation(&err, Some("cities_slug_key")) {
        Error::CitySlugAlreadyExists(slug.unwrap_or_default().to_string())
    } else {
        err.into()
    }
}
