//! Repository for country database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{CountryEntity, CountryStatusDb};
use crate::metrics::QueryTimer;

/// Repository for country-related database operations.
#[derive(Clone)]
pub struct CountryRepository {
    pool: PgPool,
}

impl CountryRepository {
    /// Creates a new country repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a country by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CountryEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_country_by_id");
        sqlx::query_as::<_, CountryEntity>(
            r#"
            SELECT id, name, status, created_at, updated_at
            FROM countries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Finds a country by ID, locking the row for the current transaction.
    pub async fn find_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<CountryEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_country_for_update");
        sqlx::query_as::<_, CountryEntity>(
            r#"
            SELECT id, name, status, created_at, updated_at
            FROM countries
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Finds a country by name, case-insensitively.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CountryEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_country_by_name");
        sqlx::query_as::<_, CountryEntity>(
            r#"
            SELECT id, name, status, created_at, updated_at
            FROM countries
            WHERE LOWER(name) = LOWER($1)
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    /// Lists countries with optional name/status filters.
    pub async fn list(
        &self,
        name: Option<&str>,
        status: Option<CountryStatusDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CountryEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("list_countries");
        sqlx::query_as::<_, CountryEntity>(
            r#"
            SELECT id, name, status, created_at, updated_at
            FROM countries
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::country_status IS NULL OR status = $2)
            ORDER BY name ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(name)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Counts countries matching the list filters.
    pub async fn count(
        &self,
        name: Option<&str>,
        status: Option<CountryStatusDb>,
    ) -> Result<i64, sqlx::Error> {
        let _timer = QueryTimer::new("count_countries");
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM countries
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::country_status IS NULL OR status = $2)
            "#,
        )
        .bind(name)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Inserts a country. New countries start unsupported.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<CountryEntity, sqlx::Error> {
        let _timer = QueryTimer::new("insert_country");
        sqlx::query_as::<_, CountryEntity>(
            r#"
            INSERT INTO countries (name)
            VALUES ($1)
            RETURNING id, name, status, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await
    }

    /// Updates a country's name. Returns the updated row, or None if absent.
    pub async fn update_name(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        name: &str,
    ) -> Result<Option<CountryEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("update_country_name");
        sqlx::query_as::<_, CountryEntity>(
            r#"
            UPDATE countries
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Writes a country's status. Only the cascade service calls this.
    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: CountryStatusDb,
    ) -> Result<Option<CountryEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("set_country_status");
        sqlx::query_as::<_, CountryEntity>(
            r#"
            UPDATE countries
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await
    }
}
