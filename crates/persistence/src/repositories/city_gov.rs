//! Repository for city government grant database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{CityGovEntity, GovRoleDb};
use crate::metrics::QueryTimer;

/// Repository for government grant database operations.
#[derive(Clone)]
pub struct CityGovRepository {
    pool: PgPool,
}

impl CityGovRepository {
    /// Creates a new grant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a user's grant in a city.
    pub async fn find(
        &self,
        city_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CityGovEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_city_gov");
        sqlx::query_as::<_, CityGovEntity>(
            r#"
            SELECT id, user_id, city_id, role, label, created_at, updated_at
            FROM city_govs
            WHERE city_id = $1 AND user_id = $2
            "#,
        )
        .bind(city_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Finds a user's grant in a city, locking the row for the current
    /// transaction.
    pub async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        city_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CityGovEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_city_gov_for_update");
        sqlx::query_as::<_, CityGovEntity>(
            r#"
            SELECT id, user_id, city_id, role, label, created_at, updated_at
            FROM city_govs
            WHERE city_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(city_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Finds the city's mayor grant.
    pub async fn find_mayor(&self, city_id: Uuid) -> Result<Option<CityGovEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_mayor");
        sqlx::query_as::<_, CityGovEntity>(
            r#"
            SELECT id, user_id, city_id, role, label, created_at, updated_at
            FROM city_govs
            WHERE city_id = $1 AND role = 'mayor'
            "#,
        )
        .bind(city_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Finds the city's mayor grant, locking the row for the current
    /// transaction.
    pub async fn find_mayor_for_update(
        &self,
        conn: &mut PgConnection,
        city_id: Uuid,
    ) -> Result<Option<CityGovEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_mayor_for_update");
        sqlx::query_as::<_, CityGovEntity>(
            r#"
            SELECT id, user_id, city_id, role, label, created_at, updated_at
            FROM city_govs
            WHERE city_id = $1 AND role = 'mayor'
            FOR UPDATE
            "#,
        )
        .bind(city_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Lists grants with optional city/user/role filters.
    pub async fn list(
        &self,
        city_id: Option<Uuid>,
        user_id: Option<Uuid>,
        role: Option<GovRoleDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CityGovEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("list_city_govs");
        sqlx::query_as::<_, CityGovEntity>(
            r#"
            SELECT id, user_id, city_id, role, label, created_at, updated_at
            FROM city_govs
            WHERE ($1::uuid IS NULL OR city_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::gov_role IS NULL OR role = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(city_id)
        .bind(user_id)
        .bind(role)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Counts grants matching the list filters.
    pub async fn count(
        &self,
        city_id: Option<Uuid>,
        user_id: Option<Uuid>,
        role: Option<GovRoleDb>,
    ) -> Result<i64, sqlx::Error> {
        let _timer = QueryTimer::new("count_city_govs");
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM city_govs
            WHERE ($1::uuid IS NULL OR city_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::gov_role IS NULL OR role = $3)
            "#,
        )
        .bind(city_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Inserts a grant. Unique violations on the mayor or per-user indexes
    /// surface as database errors for the caller to translate.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        city_id: Uuid,
        role: GovRoleDb,
        label: Option<&str>,
    ) -> Result<CityGovEntity, sqlx::Error> {
        let _timer = QueryTimer::new("insert_city_gov");
        sqlx::query_as::<_, CityGovEntity>(
            r#"
            INSERT INTO city_govs (user_id, city_id, role, label)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, city_id, role, label, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(city_id)
        .bind(role)
        .bind(label)
        .fetch_one(&mut *conn)
        .await
    }

    /// Changes the role on an existing grant.
    pub async fn update_role(
        &self,
        conn: &mut PgConnection,
        city_id: Uuid,
        user_id: Uuid,
        role: GovRoleDb,
    ) -> Result<Option<CityGovEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("update_city_gov_role");
        sqlx::query_as::<_, CityGovEntity>(
            r#"
            UPDATE city_govs
            SET role = $3, updated_at = NOW()
            WHERE city_id = $1 AND user_id = $2
            RETURNING id, user_id, city_id, role, label, created_at, updated_at
            "#,
        )
        .bind(city_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Deletes a user's grant in a city. Returns true if a row was deleted.
    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        city_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let _timer = QueryTimer::new("delete_city_gov");
        let result = sqlx::query(
            r#"
            DELETE FROM city_govs
            WHERE city_id = $1 AND user_id = $2
            "#,
        )
        .bind(city_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes the city's mayor grant, if any. Returns true if one existed.
    pub async fn delete_mayor(
        &self,
        conn: &mut PgConnection,
        city_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let _timer = QueryTimer::new("delete_mayor");
        let result = sqlx::query(
            r#"
            DELETE FROM city_govs
            WHERE city_id = $1 AND role = 'mayor'
            "#,
        )
        .bind(city_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes every grant for one city. Returns the number deleted.
    pub async fn delete_for_city(
        &self,
        conn: &mut PgConnection,
        city_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let _timer = QueryTimer::new("delete_city_govs_for_city");
        let result = sqlx::query(
            r#"
            DELETE FROM city_govs
            WHERE city_id = $1
            "#,
        )
        .bind(city_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Deletes every grant under a country's cities. Returns the number
    /// deleted.
    pub async fn delete_for_country(
        &self,
        conn: &mut PgConnection,
        country_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let _timer = QueryTimer::new("delete_city_govs_for_country");
        let result = sqlx::query(
            r#"
            DELETE FROM city_govs
            WHERE city_id IN (SELECT id FROM cities WHERE country_id = $1)
            "#,
        )
        .bind(country_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
