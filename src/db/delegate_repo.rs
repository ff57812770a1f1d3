// src/db/delegate_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::delegates::{Delegate, DelegateRating, RateDelegatePayload},
};

#[derive(Clone)]
pub struct DelegateRepository {
    pool: PgPool,
}

impl DelegateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Delegate>, AppError> {
        let delegate = sqlx::query_as::<_, Delegate>("SELECT * FROM delegates WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(delegate)
    }

    /// Credita uma entrega concluída: +1 solicitação e a comissão gravada.
    pub async fn credit_completion<'e, E>(
        &self,
        executor: E,
        delegate_id: Uuid,
        earnings: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE delegates
            SET total_requests = total_requests + 1,
                total_earnings = total_earnings + $2
            WHERE id = $1
            "#,
        )
        .bind(delegate_id)
        .bind(earnings)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn insert_rating(
        &self,
        request_id: Uuid,
        delegate_id: Uuid,
        user_id: Uuid,
        input: &RateDelegatePayload,
    ) -> Result<DelegateRating, AppError> {
        sqlx::query_as::<_, DelegateRating>(
            r#"
            INSERT INTO delegate_ratings (
                request_id, delegate_id, user_id,
                overall_rating, speed_rating, quality_rating, communication_rating, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(delegate_id)
        .bind(user_id)
        .bind(input.overall_rating)
        .bind(input.speed_rating)
        .bind(input.quality_rating)
        .bind(input.communication_rating)
        .bind(input.comment.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // UNIQUE(request_id): uma avaliação por solicitação
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::RatingAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }
}
