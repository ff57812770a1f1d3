// src/db/request_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        catalog::{DocumentType, ServiceType},
        requests::{LifecycleUpdate, NewRequest, Request, RequestStatus, RequestWithDelegateRow},
    },
};

// Qualificadas: as mesmas colunas servem com e sem o JOIN em delegates
const REQUEST_COLUMNS: &str = r#"
    requests.id, requests.user_id, requests.delegate_id, requests.document_type,
    requests.service_type, requests.city, requests.copies,
    requests.total_amount, requests.delegate_earnings, requests.status, requests.form_data,
    requests.created_at, requests.estimated_completion, requests.completed_at
"#;

const DELEGATE_SUMMARY_COLUMNS: &str = r#"
    d.name AS delegate_name, d.city AS delegate_city, d.rating AS delegate_rating
"#;

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewRequest) -> Result<Request, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // status sempre nasce 'new'; id e created_at vêm do banco
        let sql = format!(
            r#"
            INSERT INTO requests (
                user_id, document_type, service_type, city, copies,
                total_amount, delegate_earnings, form_data, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'new')
            RETURNING {REQUEST_COLUMNS}
            "#
        );

        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(new.user_id)
            .bind(new.document_type)
            .bind(new.service_type)
            .bind(&new.city)
            .bind(new.copies)
            .bind(new.total_amount)
            .bind(new.delegate_earnings)
            .bind(Json(&new.form_data))
            .fetch_one(executor)
            .await?;

        Ok(request)
    }

    /// Leitura do solicitante: já traz o resumo do delegado atribuído.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Request>, AppError> {
        let sql = format!(
            r#"
            SELECT {REQUEST_COLUMNS}, {DELEGATE_SUMMARY_COLUMNS}
            FROM requests
            LEFT JOIN delegates d ON d.id = requests.delegate_id
            WHERE requests.id = $1
            "#
        );

        let row = sqlx::query_as::<_, RequestWithDelegateRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Request::from))
    }

    // Trava a linha até o fim da transação (transições concorrentes)
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Request, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE requests.id = $1 FOR UPDATE");

        sqlx::query_as::<_, Request>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::RequestNotFound)
    }

    /// Solicitações do usuário, da mais recente para a mais antiga, com o delegado.
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<RequestStatus>,
        document_type: Option<DocumentType>,
        limit: Option<i64>,
    ) -> Result<Vec<Request>, AppError> {
        let sql = format!(
            r#"
            SELECT {REQUEST_COLUMNS}, {DELEGATE_SUMMARY_COLUMNS}
            FROM requests
            LEFT JOIN delegates d ON d.id = requests.delegate_id
            WHERE requests.user_id = $1
              AND ($2::request_status IS NULL OR requests.status = $2)
              AND ($3::document_type IS NULL OR requests.document_type = $3)
            ORDER BY requests.created_at DESC
            LIMIT $4
            "#
        );

        let rows = sqlx::query_as::<_, RequestWithDelegateRow>(&sql)
            .bind(user_id)
            .bind(status)
            .bind(document_type)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Request::from).collect())
    }

    pub async fn count_by_status(&self, user_id: Uuid) -> Result<Vec<(RequestStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (RequestStatus, i64)>(
            r#"
            SELECT status, COUNT(*)::BIGINT
            FROM requests
            WHERE user_id = $1
            GROUP BY status
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Fila do delegado: as suas e as novas que ele pode pegar.
    pub async fn list_for_delegate(
        &self,
        delegate_id: Uuid,
        services: &[ServiceType],
    ) -> Result<Vec<Request>, AppError> {
        let sql = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM requests
            WHERE requests.delegate_id = $1
               OR (requests.status = 'new' AND requests.service_type = ANY($2))
            ORDER BY requests.created_at DESC
            "#
        );

        let requests = sqlx::query_as::<_, Request>(&sql)
            .bind(delegate_id)
            .bind(services)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    pub async fn update_lifecycle<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        update: &LifecycleUpdate,
    ) -> Result<Request, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE requests
            SET status = $2,
                delegate_id = $3,
                estimated_completion = $4,
                completed_at = $5
            WHERE requests.id = $1
            RETURNING {REQUEST_COLUMNS}
            "#
        );

        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(id)
            .bind(update.status)
            .bind(update.delegate_id)
            .bind(update.estimated_completion)
            .bind(update.completed_at)
            .fetch_one(executor)
            .await?;

        Ok(request)
    }
}
