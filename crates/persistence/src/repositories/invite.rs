//! Repository for government invite database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{GovRoleDb, InviteEntity, InviteStatusDb};
use crate::metrics::QueryTimer;

/// Repository for invite database operations.
#[derive(Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Creates a new invite repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds an invite by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InviteEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_invite_by_id");
        sqlx::query_as::<_, InviteEntity>(
            r#"
            SELECT id, city_id, role, status, initiator_id, user_id,
                   expires_at, answered_at, created_at
            FROM invites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Finds an invite by ID, locking the row for the current transaction.
    /// The lock is what makes answering single-use under concurrency.
    pub async fn find_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<InviteEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("find_invite_for_update");
        sqlx::query_as::<_, InviteEntity>(
            r#"
            SELECT id, city_id, role, status, initiator_id, user_id,
                   expires_at, answered_at, created_at
            FROM invites
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Lists invites with optional city/status filters.
    pub async fn list(
        &self,
        city_id: Option<Uuid>,
        status: Option<InviteStatusDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InviteEntity>, sqlx::Error> {
        let _timer = QueryTimer::new("list_invites");
        sqlx::query_as::<_, InviteEntity>(
            r#"
            SELECT id, city_id, role, status, initiator_id, user_id,
                   expires_at, answered_at, created_at
            FROM invites
            WHERE ($1::uuid IS NULL OR city_id = $1)
              AND ($2::invite_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(city_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Counts invites matching the list filters.
    pub async fn count(
        &self,
        city_id: Option<Uuid>,
        status: Option<InviteStatusDb>,
    ) -> Result<i64, sqlx::Error> {
        let _timer = QueryTimer::new("count_invites");
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM invites
            WHERE ($1::uuid IS NULL OR city_id = $1)
              AND ($2::invite_status IS NULL OR status = $2)
            "#,
        )
        .bind(city_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Inserts a sent invite and returns the stored row.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        city_id: Uuid,
        role: GovRoleDb,
        initiator_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Result<InviteEntity, sqlx::Error> {
        let _timer = QueryTimer::new("insert_invite");
        sqlx::query_as::<_, InviteEntity>(
            r#"
            INSERT INTO invites (city_id, role, initiator_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, city_id, role, status, initiator_id, user_id,
                      expires_at, answered_at, created_at
            "#,
        )
        .bind(city_id)
        .bind(role)
        .bind(initiator_id)
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await
    }

    /// Moves a sent invite to its terminal status.
    ///
    /// The `status = 'sent'` guard makes the write race-safe even without the
    /// row lock; zero rows affected means another answer won.
    pub async fn mark_answered(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: InviteStatusDb,
        user_id: Uuid,
        answered_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let _timer = QueryTimer::new("mark_invite_answered");
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET status = $2, user_id = $3, answered_at = $4
            WHERE id = $1 AND status = 'sent'
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(user_id)
        .bind(answered_at)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
