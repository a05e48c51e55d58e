//! Repository for city database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{CityEntity, CityStatusDb};
use crate::metrics::QueryTimer;

/// Repository for city-related database operations.
#[derive(Clone)]
pub struct CityRepository {
    pool: PgPool,
}

impl CityRepository {
    /// Creates a new city repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a city by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CityEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_city_by_id");
        sqlx::query_as::<_, CityEntity>(
            r#"
            SELECT id, country_id, name, status, longitude, latitude, timezone,
                   icon, slug, created_at, updated_at
            FROM cities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Finds a city by ID, locking the row for the current transaction.
    pub async fn find_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<CityEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_city_for_update");
        sqlx::query_as::<_, CityEntity>(
            r#"
            SELECT id, country_id, name, status, longitude, latitude, timezone,
                   icon, slug, created_at, updated_at
            FROM cities
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Finds a city by slug.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<CityEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_city_by_slug");
        sqlx::query_as::<_, CityEntity>(
            r#"
            SELECT id, country_id, name, status, longitude, latitude, timezone,
                   icon, slug, created_at, updated_at
            FROM cities
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }

    /// Lists cities with optional country/name/status filters.
    pub async fn list(
        &self,
        country_id: Option<Uuid>,
        name: Option<&str>,
        status: Option<CityStatusDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CityEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("list_cities");
        sqlx::query_as::<_, CityEntity>(
            r#"
            SELECT id, country_id, name, status, longitude, latitude, timezone,
                   icon, slug, created_at, updated_at
            FROM cities
            WHERE ($1::uuid IS NULL OR country_id = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::city_status IS NULL OR status = $3)
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(country_id)
        .bind(name)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Lists every city matching the filters, without pagination. Used when a
    /// geo-radius filter must be applied after the SQL filters.
    pub async fn list_unpaged(
        &self,
        country_id: Option<Uuid>,
        name: Option<&str>,
        status: Option<CityStatusDb>,
    ) -> Result<Vec<CityEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("list_cities_unpaged");
        sqlx::query_as::<_, CityEntity>(
            r#"
            SELECT id, country_id, name, status, longitude, latitude, timezone,
                   icon, slug, created_at, updated_at
            FROM cities
            WHERE ($1::uuid IS NULL OR country_id = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::city_status IS NULL OR status = $3)
            ORDER BY name ASC
            "#,
        )
        .bind(country_id)
        .bind(name)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    /// Counts cities matching the list filters.
    pub async fn count(
        &self,
        country_id: Option<Uuid>,
        name: Option<&str>,
        status: Option<CityStatusDb>,
    ) -> Result<i64, sqlx::Error> {
        let _timer = QueryTimer::new("count_cities");
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM cities
            WHERE ($1::uuid IS NULL OR country_id = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::city_status IS NULL OR status = $3)
            "#,
        )
        .bind(country_id)
        .bind(name)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Inserts a city. New cities start as community.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        country_id: Uuid,
        name: &str,
        longitude: f64,
        latitude: f64,
        timezone: &str,
        icon: Option<&str>,
        slug: Option<&str>,
    ) -> Result<CityEntity, sqlx::Error> {
        let _timer = QueryTimer::new("insert_city");
        sqlx::query_as::<_, CityEntity>(
            r#"
            INSERT INTO cities (country_id, name, longitude, latitude, timezone, icon, slug)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, country_id, name, status, longitude, latitude, timezone,
                      icon, slug, created_at, updated_at
            "#,
        )
        .bind(country_id)
        .bind(name)
        .bind(longitude)
        .bind(latitude)
        .bind(timezone)
        .bind(icon)
        .bind(slug)
        .fetch_one(&mut *conn)
        .await
    }

    /// Applies a partial update; absent fields keep their value.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_partial(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        name: Option<&str>,
        longitude: Option<f64>,
        latitude: Option<f64>,
        timezone: Option<&str>,
        icon: Option<&str>,
        slug: Option<&str>,
    ) -> Result<Option<CityEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("update_city");
        sqlx::query_as::<_, CityEntity>(
            r#"
            UPDATE cities
            SET name = COALESCE($2, name),
                longitude = COALESCE($3, longitude),
                latitude = COALESCE($4, latitude),
                timezone = COALESCE($5, timezone),
                icon = COALESCE($6, icon),
                slug = COALESCE($7, slug),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, country_id, name, status, longitude, latitude, timezone,
                      icon, slug, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(longitude)
        .bind(latitude)
        .bind(timezone)
        .bind(icon)
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Writes a city's status. Only the cascade service calls this.
    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: CityStatusDb,
    ) -> Result<Option<CityEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("set_city_status");
        sqlx::query_as::<_, CityEntity>(
            r#"
            UPDATE cities
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, country_id, name, status, longitude, latitude, timezone,
                      icon, slug, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Demotes every official/community city of a country to the given
    /// status. Returns the number of cities demoted.
    pub async fn demote_for_country(
        &self,
        conn: &mut PgConnection,
        country_id: Uuid,
        status: CityStatusDb,
    ) -> Result<u64, sqlx::Error> {
        let _timer = QueryTimer::new("demote_cities_for_country");
        let result = sqlx::query(
            r#"
            UPDATE cities
            SET status = $2, updated_at = NOW()
            WHERE country_id = $1 AND status IN ('official', 'community')
            "#,
        )
        .bind(country_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
