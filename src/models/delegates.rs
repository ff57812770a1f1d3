// src/models/delegates.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::ServiceType;

// Agente de campo que retira o documento e recebe a comissão
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Delegate {
    pub id: Uuid,
    /// Conta de usuário com a qual o delegado se autentica.
    pub user_id: Uuid,
    #[schema(example = "Koffi N'Guessan")]
    pub name: String,
    #[schema(example = "Bouaké")]
    pub city: String,
    pub services: Vec<ServiceType>,
    pub is_active: bool,
    #[schema(example = 4.5)]
    pub rating: f64,
    pub total_requests: i64,
    pub total_earnings: i64,
}

// O que o solicitante vê de quem está cuidando do pedido
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DelegateSummary {
    #[schema(example = "Koffi N'Guessan")]
    pub name: String,
    #[schema(example = "Bouaké")]
    pub city: String,
    #[schema(example = 4.5)]
    pub rating: f64,
}

impl Delegate {
    pub fn serves(&self, service: ServiceType) -> bool {
        self.is_active && self.services.contains(&service)
    }
}

// Notas brutas: nenhuma agregação é feita sobre elas.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DelegateRating {
    pub id: Uuid,
    pub request_id: Uuid,
    pub delegate_id: Uuid,
    pub user_id: Uuid,
    pub overall_rating: i16,
    pub speed_rating: i16,
    pub quality_rating: i16,
    pub communication_rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateDelegatePayload {
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    #[schema(example = 5)]
    pub overall_rating: i16,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub speed_rating: i16,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub quality_rating: i16,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub communication_rating: i16,
    #[validate(length(max = 1000, message = "comment_too_long"))]
    pub comment: Option<String>,
}
