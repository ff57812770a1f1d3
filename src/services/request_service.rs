// src/services/request_service.rs

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DelegateRepository, RequestRepository, UserRepository},
    models::{
        catalog::ServiceType,
        delegates::{Delegate, DelegateRating, RateDelegatePayload},
        requests::{
            Dashboard, FormData, LifecycleAction, NewRequest, Request, RequestFilter,
            RequestStatus, StatusCounts,
        },
    },
    services::{catalog, pricing::PricingEngine},
};

/// Quantas solicitações recentes o painel mostra.
const DASHBOARD_RECENT_LIMIT: i64 = 10;

/// Monta a linha de uma nova solicitação, sem I/O.
///
/// Preço e comissão são calculados aqui, uma única vez; o órgão emissor é
/// copiado do catálogo e não muda depois. `copies` já chega validado pelo payload.
pub fn prepare_request(
    pricing: &PricingEngine,
    user_id: Uuid,
    document_type: &str,
    city: &str,
    copies: i32,
    raw_form: &HashMap<String, String>,
) -> Result<NewRequest, AppError> {
    let config = catalog::lookup(document_type)?;
    let form_data = FormData::from_submission(config, raw_form)?;

    let total_amount = pricing.calculate_price(config.document_type, city, i64::from(copies))?;
    // Comissão sobre o total com frete (regra do fluxo de criação)
    let delegate_earnings = pricing.calculate_delegate_earnings(total_amount);

    Ok(NewRequest {
        user_id,
        document_type: config.document_type,
        service_type: config.service,
        city: catalog::normalize_city(city).to_string(),
        copies,
        total_amount,
        delegate_earnings,
        form_data,
    })
}

// Só o delegado gravado na solicitação pode movê-la depois da atribuição
fn ensure_assigned_to(request: &Request, delegate: &Delegate) -> Result<(), AppError> {
    if request.delegate_id == Some(delegate.id) {
        Ok(())
    } else {
        Err(AppError::NotAssignedDelegate)
    }
}

// Serviços cujas solicitações novas o delegado pode pegar; inativo não pega nenhuma
fn claimable_services(delegate: &Delegate) -> &[ServiceType] {
    if delegate.is_active {
        &delegate.services
    } else {
        &[]
    }
}

fn ensure_owner(request: &Request, user_id: Uuid) -> Result<(), AppError> {
    // 404 em vez de 403: não revela a existência da solicitação de outro usuário
    if request.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::RequestNotFound)
    }
}

#[derive(Clone)]
pub struct RequestService {
    repo: RequestRepository,
    user_repo: UserRepository,
    delegate_repo: DelegateRepository,
    pricing: PricingEngine,
    pool: PgPool,
}

impl RequestService {
    pub fn new(
        repo: RequestRepository,
        user_repo: UserRepository,
        delegate_repo: DelegateRepository,
        pricing: PricingEngine,
        pool: PgPool,
    ) -> Self {
        Self { repo, user_repo, delegate_repo, pricing, pool }
    }

    // --- LADO DO SOLICITANTE ---

    pub async fn create_request(
        &self,
        user_id: Uuid,
        document_type: &str,
        city: &str,
        copies: i32,
        raw_form: &HashMap<String, String>,
    ) -> Result<Request, AppError> {
        let new_request = prepare_request(&self.pricing, user_id, document_type, city, copies, raw_form)?;

        // Inserção e contador do usuário na mesma transação
        let mut tx = self.pool.begin().await?;
        let request = self.repo.insert(&mut *tx, &new_request).await?;
        self.user_repo.increment_total_requests(&mut *tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            %user_id,
            document_type = %request.document_type,
            city = %request.city,
            total_amount = request.total_amount,
            "solicitação criada"
        );

        Ok(request)
    }

    pub async fn list_requests(&self, user_id: Uuid, filter: &RequestFilter) -> Result<Vec<Request>, AppError> {
        let requests = self.repo
            .list_by_user(user_id, filter.status, filter.document_type, None)
            .await?;

        // O nome do documento vem do catálogo, então a busca livre é feita aqui
        let requests = match filter.search.as_deref() {
            Some(term) => requests.into_iter().filter(|r| r.matches_search(term)).collect(),
            None => requests,
        };

        Ok(requests)
    }

    pub async fn get_request(&self, user_id: Uuid, request_id: Uuid) -> Result<Request, AppError> {
        let request = self.repo
            .find_by_id(request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        ensure_owner(&request, user_id)?;
        Ok(request)
    }

    pub async fn cancel_by_owner(&self, user_id: Uuid, request_id: Uuid) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.repo.find_for_update(&mut *tx, request_id).await?;
        ensure_owner(&request, user_id)?;

        let update = request.apply(LifecycleAction::Cancel)?;
        self.repo.update_lifecycle(&mut *tx, request_id, &update).await?;

        tx.commit().await?;

        tracing::info!(%request_id, %user_id, from = request.status.as_str(), "solicitação cancelada pelo solicitante");

        // Relê com o resumo do delegado, como nas demais respostas do solicitante
        self.get_request(user_id, request_id).await
    }

    pub async fn dashboard(&self, user_id: Uuid) -> Result<Dashboard, AppError> {
        let status_counts = StatusCounts::from_rows(self.repo.count_by_status(user_id).await?);
        let recent_requests = self.repo
            .list_by_user(user_id, None, None, Some(DASHBOARD_RECENT_LIMIT))
            .await?;

        Ok(Dashboard {
            stats: status_counts.into(),
            status_counts,
            recent_requests,
        })
    }

    pub async fn rate_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        payload: &RateDelegatePayload,
    ) -> Result<DelegateRating, AppError> {
        let request = self.get_request(user_id, request_id).await?;

        if request.status != RequestStatus::Completed {
            return Err(AppError::RequestNotCompleted);
        }
        // Concluída implica delegado atribuído
        let delegate_id = request.delegate_id.ok_or(AppError::RequestNotCompleted)?;

        self.delegate_repo
            .insert_rating(request.id, delegate_id, user_id, payload)
            .await
    }

    // --- LADO DO DELEGADO ---

    pub async fn delegate_queue(&self, delegate: &Delegate) -> Result<Vec<Request>, AppError> {
        self.repo.list_for_delegate(delegate.id, claimable_services(delegate)).await
    }

    pub async fn assign(&self, delegate: &Delegate, request_id: Uuid) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.repo.find_for_update(&mut *tx, request_id).await?;
        if !delegate.serves(request.service_type) {
            return Err(AppError::DelegateCannotServe);
        }

        // Estimativa calculada no momento da atribuição, não na criação
        let estimated_completion = self.pricing
            .estimate_completion_time(request.document_type, &request.city)?;

        let update = request.apply(LifecycleAction::Assign {
            delegate_id: delegate.id,
            estimated_completion,
        })?;
        let updated = self.repo.update_lifecycle(&mut *tx, request_id, &update).await?;

        tx.commit().await?;

        tracing::info!(%request_id, delegate_id = %delegate.id, %estimated_completion, "solicitação atribuída");
        Ok(updated)
    }

    pub async fn start(&self, delegate: &Delegate, request_id: Uuid) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.repo.find_for_update(&mut *tx, request_id).await?;
        ensure_assigned_to(&request, delegate)?;

        let update = request.apply(LifecycleAction::Start)?;
        let updated = self.repo.update_lifecycle(&mut *tx, request_id, &update).await?;

        tx.commit().await?;

        tracing::info!(%request_id, delegate_id = %delegate.id, "solicitação em andamento");
        Ok(updated)
    }

    pub async fn complete(&self, delegate: &Delegate, request_id: Uuid) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.repo.find_for_update(&mut *tx, request_id).await?;
        ensure_assigned_to(&request, delegate)?;

        let update = request.apply(LifecycleAction::Complete { at: Utc::now() })?;
        let updated = self.repo.update_lifecycle(&mut *tx, request_id, &update).await?;

        // Credita a comissão gravada na criação, sem recalcular
        self.delegate_repo
            .credit_completion(&mut *tx, delegate.id, request.delegate_earnings)
            .await?;

        tx.commit().await?;

        tracing::info!(
            %request_id,
            delegate_id = %delegate.id,
            earnings = request.delegate_earnings,
            "solicitação concluída"
        );
        Ok(updated)
    }

    pub async fn cancel_by_delegate(&self, delegate: &Delegate, request_id: Uuid) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.repo.find_for_update(&mut *tx, request_id).await?;
        ensure_assigned_to(&request, delegate)?;

        let update = request.apply(LifecycleAction::Cancel)?;
        let updated = self.repo.update_lifecycle(&mut *tx, request_id, &update).await?;

        tx.commit().await?;

        tracing::info!(%request_id, delegate_id = %delegate.id, "solicitação cancelada pelo delegado");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::pricing::QuotePayload;
    use crate::models::catalog::{DocumentType, FormField};
    use validator::Validate;
    use crate::services::pricing::tests::{reference_instant, FixedClock};
    use std::sync::Arc;

    fn engine() -> PricingEngine {
        PricingEngine::new(Arc::new(FixedClock::at(reference_instant())))
    }

    fn casier_form() -> HashMap<String, String> {
        [
            ("nom", "Ouattara"),
            ("prenoms", "Mariam"),
            ("date_naissance", "1992-07-03"),
            ("lieu_naissance", "Man"),
            ("profession", "Commerçante"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn delegate_serving(services: Vec<ServiceType>) -> Delegate {
        Delegate {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Koffi N'Guessan".into(),
            city: "Man".into(),
            services,
            is_active: true,
            rating: 0.0,
            total_requests: 0,
            total_earnings: 0,
        }
    }

    fn stored(new: NewRequest, status: RequestStatus) -> Request {
        Request {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            delegate_id: None,
            document_type: new.document_type,
            service_type: new.service_type,
            city: new.city,
            copies: new.copies,
            total_amount: new.total_amount,
            delegate_earnings: new.delegate_earnings,
            status,
            form_data: new.form_data,
            created_at: reference_instant(),
            estimated_completion: None,
            completed_at: None,
            delegate: None,
        }
    }

    #[test]
    fn prepare_prices_and_snapshots_the_service() {
        let user_id = Uuid::new_v4();

        let new = prepare_request(&engine(), user_id, "casier_judiciaire", "Man", 1, &casier_form()).unwrap();

        assert_eq!(new.user_id, user_id);
        assert_eq!(new.document_type, DocumentType::CasierJudiciaire);
        assert_eq!(new.service_type, ServiceType::Justice);
        assert_eq!(new.total_amount, 7500);
        assert_eq!(new.delegate_earnings, 4500);
        assert_eq!(new.form_data.get(FormField::Profession), Some("Commerçante"));
    }

    #[test]
    fn commission_base_includes_shipping() {
        let new = prepare_request(&engine(), Uuid::new_v4(), "casier_judiciaire", "Man", 2, &casier_form()).unwrap();

        // 3000 * 1.5 * 2 + 3000 = 12000 ; 60% do total, frete incluso
        assert_eq!(new.total_amount, 12000);
        assert_eq!(new.delegate_earnings, 7200);
    }

    #[test]
    fn prepare_rejects_unknown_document_type_before_anything_else() {
        let result = prepare_request(&engine(), Uuid::new_v4(), "passeport", "Abidjan", 1, &HashMap::new());
        assert!(matches!(result, Err(AppError::UnknownDocumentType(t)) if t == "passeport"));
    }

    #[test]
    fn prepare_reports_missing_fields() {
        let mut form = casier_form();
        form.remove("profession");

        let result = prepare_request(&engine(), Uuid::new_v4(), "casier_judiciaire", "Man", 1, &form);

        match result {
            Err(AppError::MissingRequiredFields(fields)) => assert_eq!(fields, vec![FormField::Profession]),
            other => panic!("expected missing profession, got {other:?}"),
        }
    }

    #[test]
    fn prepare_accepts_unlisted_cities_with_default_pricing() {
        let new = prepare_request(&engine(), Uuid::new_v4(), "casier_judiciaire", "Odienné", 1, &casier_form()).unwrap();

        // 3000 * 1.2 + 2000
        assert_eq!(new.total_amount, 5600);
        assert_eq!(new.city, "Odienné");
    }

    #[test]
    fn only_the_assigned_delegate_may_move_a_request() {
        let delegate = delegate_serving(vec![ServiceType::Justice]);
        let other = delegate_serving(vec![ServiceType::Justice]);
        let new = prepare_request(&engine(), Uuid::new_v4(), "casier_judiciaire", "Man", 1, &casier_form()).unwrap();
        let mut request = stored(new, RequestStatus::Assigned);
        request.delegate_id = Some(delegate.id);

        assert!(ensure_assigned_to(&request, &delegate).is_ok());
        assert!(matches!(ensure_assigned_to(&request, &other), Err(AppError::NotAssignedDelegate)));
    }

    #[test]
    fn other_users_see_not_found() {
        let new = prepare_request(&engine(), Uuid::new_v4(), "casier_judiciaire", "Man", 1, &casier_form()).unwrap();
        let request = stored(new, RequestStatus::New);

        assert!(ensure_owner(&request, request.user_id).is_ok());
        assert!(matches!(ensure_owner(&request, Uuid::new_v4()), Err(AppError::RequestNotFound)));
    }

    #[test]
    fn assignment_estimate_comes_from_the_engine_clock() {
        let pricing = engine();
        let delegate = delegate_serving(vec![ServiceType::Justice]);
        let new = prepare_request(&pricing, Uuid::new_v4(), "casier_judiciaire", "Korhogo", 1, &casier_form()).unwrap();
        let request = stored(new, RequestStatus::New);

        let estimate = pricing
            .estimate_completion_time(request.document_type, &request.city)
            .unwrap();
        let update = request
            .apply(LifecycleAction::Assign { delegate_id: delegate.id, estimated_completion: estimate })
            .unwrap();

        assert_eq!(update.estimated_completion, Some(reference_instant() + chrono::Duration::hours(108)));
        assert_eq!(request.estimated_completion, None);
    }

    #[test]
    fn quote_and_creation_charge_the_same_for_padded_cities() {
        let pricing = engine();

        for raw_city in [" Man", "Man  ", "\tKorhogo ", " Odienné "] {
            let quote = pricing.quote(DocumentType::CasierJudiciaire, raw_city, 1).unwrap();
            let new = prepare_request(&pricing, Uuid::new_v4(), "casier_judiciaire", raw_city, 1, &casier_form()).unwrap();

            assert_eq!(quote.total_amount, new.total_amount, "city {raw_city:?}");
            assert_eq!(quote.delegate_earnings, new.delegate_earnings);
            assert_eq!(quote.city, new.city);
            assert_eq!(new.city, raw_city.trim());
        }

        let new = prepare_request(&pricing, Uuid::new_v4(), "casier_judiciaire", " Man", 1, &casier_form()).unwrap();
        assert_eq!(new.total_amount, 7500);
    }

    #[test]
    fn blank_city_is_rejected_before_pricing() {
        let payload = QuotePayload {
            document_type: "acte_naissance".into(),
            city: "   ".into(),
            copies: 1,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.field_errors()["city"][0].code, "required");
    }

    #[test]
    fn inactive_delegates_cannot_claim_new_requests() {
        let mut delegate = delegate_serving(vec![ServiceType::Justice, ServiceType::Mairie]);
        assert_eq!(claimable_services(&delegate), &[ServiceType::Justice, ServiceType::Mairie]);

        delegate.is_active = false;
        assert!(claimable_services(&delegate).is_empty());
        assert!(!delegate.serves(ServiceType::Justice));
    }
}
