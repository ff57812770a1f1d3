// src/models/requests.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        catalog::{DocumentConfig, DocumentType, FormField, ServiceType},
        delegates::DelegateSummary,
    },
    services::catalog,
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    New,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::New,
        RequestStatus::Assigned,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::Assigned => "assigned",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// new -> assigned -> in_progress -> completed; cancelled a partir de qualquer estado não terminal.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        match (self, next) {
            (New, Assigned) | (Assigned, InProgress) | (InProgress, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Valores do formulário, indexados pelos campos fechados do catálogo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(pub BTreeMap<FormField, String>);

impl FormData {
    /// Valida a submissão contra `required_fields`.
    ///
    /// Todos os campos exigidos precisam estar presentes e não vazios; chaves
    /// fora da lista do documento são rejeitadas. Valores são gravados sem
    /// espaços nas pontas.
    pub fn from_submission(
        config: &DocumentConfig,
        raw: &HashMap<String, String>,
    ) -> Result<Self, AppError> {
        let mut unexpected: Vec<String> = raw
            .keys()
            .filter(|key| !FormField::parse(key).is_some_and(|field| config.requires(field)))
            .cloned()
            .collect();

        if !unexpected.is_empty() {
            unexpected.sort();
            return Err(AppError::UnexpectedFormFields(unexpected));
        }

        let mut values = BTreeMap::new();
        let mut missing = Vec::new();

        for &field in config.required_fields {
            match raw.get(field.as_str()).map(|value| value.trim()) {
                Some(value) if !value.is_empty() => {
                    values.insert(field, value.to_string());
                }
                _ => missing.push(field),
            }
        }

        if !missing.is_empty() {
            return Err(AppError::MissingRequiredFields(missing));
        }

        Ok(FormData(values))
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }
}

// --- Structs Principais ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub user_id: Uuid,
    pub delegate_id: Option<Uuid>,
    pub document_type: DocumentType,
    /// Snapshot do órgão no momento da criação; não é recalculado.
    pub service_type: ServiceType,
    #[schema(example = "Abidjan")]
    pub city: String,
    #[schema(example = 1)]
    pub copies: i32,
    #[schema(example = 3000)]
    pub total_amount: i64,
    #[schema(example = 1800)]
    pub delegate_earnings: i64,
    pub status: RequestStatus,
    #[sqlx(json)]
    #[schema(value_type = Object)]
    pub form_data: FormData,
    pub created_at: DateTime<Utc>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Quem está cuidando da solicitação. Só preenchido nas leituras do solicitante.
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate: Option<DelegateSummary>,
}

/// Linha da solicitação com `LEFT JOIN delegates`: colunas do delegado são
/// nulas enquanto ninguém pegou o pedido.
#[derive(Debug, Clone, FromRow)]
pub struct RequestWithDelegateRow {
    #[sqlx(flatten)]
    pub request: Request,
    pub delegate_name: Option<String>,
    pub delegate_city: Option<String>,
    pub delegate_rating: Option<f64>,
}

impl From<RequestWithDelegateRow> for Request {
    fn from(row: RequestWithDelegateRow) -> Self {
        let delegate = match (row.delegate_name, row.delegate_city) {
            (Some(name), Some(city)) => Some(DelegateSummary {
                name,
                city,
                rating: row.delegate_rating.unwrap_or_default(),
            }),
            _ => None,
        };

        Request { delegate, ..row.request }
    }
}

impl Request {
    pub fn document_name(&self) -> &'static str {
        catalog::get_config(self.document_type).name
    }

    // Busca livre pelo nome do documento ou pela cidade, sem diferenciar maiúsculas
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.document_name().to_lowercase().contains(&term)
            || self.city.to_lowercase().contains(&term)
    }
}

/// Linha pronta para inserção (o banco atribui `id` e `created_at`).
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub user_id: Uuid,
    pub document_type: DocumentType,
    pub service_type: ServiceType,
    pub city: String,
    pub copies: i32,
    pub total_amount: i64,
    pub delegate_earnings: i64,
    pub form_data: FormData,
}

/// Estado do ciclo de vida após uma transição.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleUpdate {
    pub status: RequestStatus,
    pub delegate_id: Option<Uuid>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LifecycleUpdate {
    pub fn from_request(request: &Request) -> Self {
        Self {
            status: request.status,
            delegate_id: request.delegate_id,
            estimated_completion: request.estimated_completion,
            completed_at: request.completed_at,
        }
    }
}

/// Ações que movem uma solicitação no ciclo de vida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Assign { delegate_id: Uuid, estimated_completion: DateTime<Utc> },
    Start,
    Complete { at: DateTime<Utc> },
    Cancel,
}

impl LifecycleAction {
    pub fn target(self) -> RequestStatus {
        match self {
            LifecycleAction::Assign { .. } => RequestStatus::Assigned,
            LifecycleAction::Start => RequestStatus::InProgress,
            LifecycleAction::Complete { .. } => RequestStatus::Completed,
            LifecycleAction::Cancel => RequestStatus::Cancelled,
        }
    }
}

impl Request {
    /// Calcula o novo estado sem tocar no banco.
    pub fn apply(&self, action: LifecycleAction) -> Result<LifecycleUpdate, AppError> {
        let target = action.target();
        if !self.status.can_transition_to(target) {
            return Err(AppError::InvalidStatusTransition { from: self.status, to: target });
        }

        let mut update = LifecycleUpdate::from_request(self);
        update.status = target;

        match action {
            LifecycleAction::Assign { delegate_id, estimated_completion } => {
                update.delegate_id = Some(delegate_id);
                update.estimated_completion = Some(estimated_completion);
            }
            LifecycleAction::Complete { at } => update.completed_at = Some(at),
            LifecycleAction::Start | LifecycleAction::Cancel => {}
        }

        Ok(update)
    }
}

// --- Filtros e Painel ---

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub document_type: Option<DocumentType>,
    /// Busca no nome do documento ou na cidade.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub all: i64,
    pub new: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

impl StatusCounts {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (RequestStatus, i64)>,
    {
        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.all += count;
            match status {
                RequestStatus::New => counts.new += count,
                RequestStatus::Assigned => counts.assigned += count,
                RequestStatus::InProgress => counts.in_progress += count,
                RequestStatus::Completed => counts.completed += count,
                RequestStatus::Cancelled => counts.cancelled += count,
            }
        }
        counts
    }

    pub fn pending(&self) -> i64 {
        self.new + self.assigned + self.in_progress
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_requests: i64,
    pub pending_requests: i64,
    pub completed_requests: i64,
    pub cancelled_requests: i64,
}

impl From<StatusCounts> for DashboardStats {
    fn from(counts: StatusCounts) -> Self {
        Self {
            total_requests: counts.all,
            pending_requests: counts.pending(),
            completed_requests: counts.completed,
            cancelled_requests: counts.cancelled,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub status_counts: StatusCounts,
    pub recent_requests: Vec<Request>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn submission(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn sample_request(status: RequestStatus) -> Request {
        Request {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            delegate_id: None,
            document_type: DocumentType::ActeNaissance,
            service_type: ServiceType::Mairie,
            city: "Bouaké".to_string(),
            copies: 2,
            total_amount: 5900,
            delegate_earnings: 3540,
            status,
            form_data: FormData::default(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap(),
            estimated_completion: None,
            completed_at: None,
            delegate: None,
        }
    }

    #[test]
    fn form_data_accepts_exactly_the_required_fields() {
        let config = catalog::get_config(DocumentType::ActeNaissance);
        let raw = submission(&[
            ("nom", " Kouassi "),
            ("prenoms", "Aya Marie"),
            ("date_naissance", "1990-04-12"),
            ("lieu_naissance", "Abidjan"),
        ]);

        let form = FormData::from_submission(config, &raw).unwrap();

        assert_eq!(form.0.len(), 4);
        assert_eq!(form.get(FormField::Nom), Some("Kouassi"));
        assert_eq!(form.get(FormField::LieuNaissance), Some("Abidjan"));
    }

    #[test]
    fn form_data_reports_every_missing_or_blank_field() {
        let config = catalog::get_config(DocumentType::CasierJudiciaire);
        let raw = submission(&[
            ("nom", "Traoré"),
            ("prenoms", "   "),
            ("date_naissance", "1985-09-01"),
        ]);

        match FormData::from_submission(config, &raw) {
            Err(AppError::MissingRequiredFields(fields)) => assert_eq!(
                fields,
                vec![FormField::Prenoms, FormField::LieuNaissance, FormField::Profession]
            ),
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn form_data_rejects_fields_of_other_documents() {
        let config = catalog::get_config(DocumentType::ActeMariage);
        let raw = submission(&[
            ("nom_epoux", "Koné"),
            ("prenoms_epoux", "Ibrahim"),
            ("nom_epouse", "Yao"),
            ("prenoms_epouse", "Akissi"),
            ("date_mariage", "2019-12-21"),
            ("profession", "Enseignant"),
            ("couleur_preferee", "vert"),
        ]);

        match FormData::from_submission(config, &raw) {
            Err(AppError::UnexpectedFormFields(keys)) => {
                assert_eq!(keys, vec!["couleur_preferee".to_string(), "profession".to_string()])
            }
            other => panic!("expected unexpected fields, got {other:?}"),
        }
    }

    #[test]
    fn form_data_serializes_as_a_flat_object() {
        let config = catalog::get_config(DocumentType::CertificatNationalite);
        let raw = submission(&[
            ("nom", "Bamba"),
            ("prenoms", "Seydou"),
            ("date_naissance", "2000-02-29"),
            ("lieu_naissance", "Korhogo"),
            ("filiation", "Fils de Bamba Lassina"),
        ]);
        let form = FormData::from_submission(config, &raw).unwrap();

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["filiation"], "Fils de Bamba Lassina");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn status_machine_follows_the_happy_path() {
        use RequestStatus::*;
        assert!(New.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));

        assert!(!New.can_transition_to(InProgress));
        assert!(!New.can_transition_to(Completed));
        assert!(!Assigned.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Assigned));
    }

    #[test]
    fn cancel_is_allowed_only_from_non_terminal_states() {
        use RequestStatus::*;
        for status in [New, Assigned, InProgress] {
            assert!(status.can_transition_to(Cancelled), "{status:?}");
        }
        for status in [Completed, Cancelled] {
            assert!(status.is_terminal());
            for next in RequestStatus::ALL {
                assert!(!status.can_transition_to(next), "{status:?} -> {next:?}");
            }
        }
    }

    #[test]
    fn assign_sets_delegate_and_estimate() {
        let request = sample_request(RequestStatus::New);
        let delegate_id = Uuid::new_v4();
        let estimate = request.created_at + Duration::hours(28);

        let update = request
            .apply(LifecycleAction::Assign { delegate_id, estimated_completion: estimate })
            .unwrap();

        assert_eq!(update.status, RequestStatus::Assigned);
        assert_eq!(update.delegate_id, Some(delegate_id));
        assert_eq!(update.estimated_completion, Some(estimate));
        assert_eq!(update.completed_at, None);
    }

    #[test]
    fn complete_sets_completed_at_and_keeps_assignment() {
        let mut request = sample_request(RequestStatus::InProgress);
        let delegate_id = Uuid::new_v4();
        request.delegate_id = Some(delegate_id);
        let at = request.created_at + Duration::hours(30);

        let update = request.apply(LifecycleAction::Complete { at }).unwrap();

        assert_eq!(update.status, RequestStatus::Completed);
        assert_eq!(update.delegate_id, Some(delegate_id));
        assert_eq!(update.completed_at, Some(at));
    }

    #[test]
    fn invalid_transition_is_reported_with_both_states() {
        let request = sample_request(RequestStatus::Completed);

        match request.apply(LifecycleAction::Cancel) {
            Err(AppError::InvalidStatusTransition { from, to }) => {
                assert_eq!(from, RequestStatus::Completed);
                assert_eq!(to, RequestStatus::Cancelled);
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
    }

    #[test]
    fn search_matches_document_name_or_city() {
        let request = sample_request(RequestStatus::New);
        assert!(request.matches_search("naissance"));
        assert!(request.matches_search("BOUAK"));
        assert!(request.matches_search("  "));
        assert!(!request.matches_search("casier"));
    }

    #[test]
    fn status_counts_aggregate_rows() {
        let counts = StatusCounts::from_rows([
            (RequestStatus::New, 2),
            (RequestStatus::InProgress, 1),
            (RequestStatus::Completed, 4),
            (RequestStatus::Cancelled, 1),
        ]);

        assert_eq!(counts.all, 8);
        assert_eq!(counts.pending(), 3);

        let stats = DashboardStats::from(counts);
        assert_eq!(stats.total_requests, 8);
        assert_eq!(stats.pending_requests, 3);
        assert_eq!(stats.completed_requests, 4);
        assert_eq!(stats.cancelled_requests, 1);
    }

    #[test]
    fn joined_row_carries_the_assigned_delegate() {
        let delegate_id = Uuid::new_v4();
        let mut request = sample_request(RequestStatus::Assigned);
        request.delegate_id = Some(delegate_id);

        let row = RequestWithDelegateRow {
            request,
            delegate_name: Some("Koffi N'Guessan".into()),
            delegate_city: Some("Bouaké".into()),
            delegate_rating: Some(4.5),
        };
        let request = Request::from(row);

        assert_eq!(request.delegate_id, Some(delegate_id));
        assert_eq!(
            request.delegate,
            Some(DelegateSummary {
                name: "Koffi N'Guessan".into(),
                city: "Bouaké".into(),
                rating: 4.5,
            })
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["delegate"]["name"], "Koffi N'Guessan");
        assert_eq!(json["delegate"]["rating"], 4.5);
    }

    #[test]
    fn joined_row_without_delegate_has_no_summary() {
        let row = RequestWithDelegateRow {
            request: sample_request(RequestStatus::New),
            delegate_name: None,
            delegate_city: None,
            delegate_rating: None,
        };
        let request = Request::from(row);

        assert_eq!(request.delegate, None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("delegate").is_none());
        assert!(json["delegateId"].is_null());
    }
}
