// src/services/pricing.rs

//! Cálculo de preço, comissão do delegado e prazo estimado.
//!
//! Tudo aqui é puro e síncrono. A única dependência externa é o relógio,
//! injetado via [`Clock`] para que os testes fixem o "agora".

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::catalog::{DocumentType, ServiceType},
    services::catalog,
};

/// Fração do total repassada ao delegado (frete incluído na base).
const COMMISSION_RATE_TENTHS: i128 = 6;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// Arredondamento "half-up" único, aplicado só no final: floor(x + 0.5)
fn round_half_up(value: Decimal) -> Result<i64, AppError> {
    let rounded = (value + Decimal::new(5, 1)).floor();
    i64::try_from(rounded)
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("valor fora do intervalo: {}", e)))
}

fn overflow(what: &str) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("overflow ao calcular {}", what))
}

/// Preço total: base x multiplicador da cidade x cópias + frete, arredondado uma vez.
///
/// `copies <= 0` não é rejeitado aqui; quem limita é a validação do payload.
pub fn calculate_price(doc_type: DocumentType, city: &str, copies: i64) -> Result<i64, AppError> {
    let config = catalog::get_config(doc_type);
    let coefficients = catalog::coefficients(city);

    let scaled_unit_price = Decimal::from(config.base_price)
        .checked_mul(coefficients.price_multiplier)
        .ok_or_else(|| overflow("preço unitário"))?;

    let total = scaled_unit_price
        .checked_mul(Decimal::from(copies))
        .and_then(|subtotal| subtotal.checked_add(Decimal::from(coefficients.shipping_cost)))
        .ok_or_else(|| overflow("preço total"))?;

    round_half_up(total)
}

/// Comissão do delegado: round(total * 0.6), sobre o total com frete.
pub fn calculate_delegate_earnings(total_amount: i64) -> i64 {
    // floor((total * 6 + 5) / 10) == floor(total * 0.6 + 0.5), sem ponto flutuante
    let scaled = i128::from(total_amount) * COMMISSION_RATE_TENTHS + 5;
    scaled.div_euclid(10) as i64
}

/// Horas de processamento ajustadas pela cidade, truncadas para horas inteiras.
pub fn estimated_processing_hours(doc_type: DocumentType, city: &str) -> Result<i64, AppError> {
    let config = catalog::get_config(doc_type);
    let coefficients = catalog::coefficients(city);

    let hours = Decimal::from(config.processing_time)
        .checked_mul(coefficients.delay_multiplier)
        .ok_or_else(|| overflow("prazo"))?
        .trunc();

    i64::try_from(hours)
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("prazo fora do intervalo: {}", e)))
}

/// `now + horas ajustadas`. Base da estimativa recalculada a cada chamada.
pub fn estimate_completion_from(
    now: DateTime<Utc>,
    doc_type: DocumentType,
    city: &str,
) -> Result<DateTime<Utc>, AppError> {
    let hours = estimated_processing_hours(doc_type, city)?;
    let offset = Duration::try_hours(hours).ok_or_else(|| overflow("prazo"))?;

    now.checked_add_signed(offset)
        .ok_or_else(|| overflow("data de conclusão"))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub document_type: DocumentType,
    pub service: ServiceType,
    #[schema(example = "Abidjan")]
    pub city: String,
    #[schema(example = 1)]
    pub copies: i64,
    #[schema(example = 1000)]
    pub shipping_cost: i64,
    #[schema(example = 3000)]
    pub total_amount: i64,
    #[schema(example = 1800)]
    pub delegate_earnings: i64,
    #[schema(example = 24)]
    pub estimated_hours: i64,
    pub estimated_completion: DateTime<Utc>,
}

/// Motor de preços com relógio injetado. Clonar é barato (só um `Arc`).
#[derive(Clone)]
pub struct PricingEngine {
    clock: Arc<dyn Clock>,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl PricingEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn calculate_price(&self, doc_type: DocumentType, city: &str, copies: i64) -> Result<i64, AppError> {
        calculate_price(doc_type, city, copies)
    }

    pub fn calculate_delegate_earnings(&self, total_amount: i64) -> i64 {
        calculate_delegate_earnings(total_amount)
    }

    // Lê o relógio a cada chamada; não memorizar.
    pub fn estimate_completion_time(&self, doc_type: DocumentType, city: &str) -> Result<DateTime<Utc>, AppError> {
        estimate_completion_from(self.clock.now(), doc_type, city)
    }

    pub fn quote(&self, doc_type: DocumentType, city: &str, copies: i64) -> Result<Quote, AppError> {
        let city = catalog::normalize_city(city);
        let config = catalog::get_config(doc_type);
        let total_amount = self.calculate_price(doc_type, city, copies)?;

        Ok(Quote {
            document_type: doc_type,
            service: config.service,
            city: city.to_string(),
            copies,
            shipping_cost: catalog::coefficients(city).shipping_cost,
            total_amount,
            delegate_earnings: self.calculate_delegate_earnings(total_amount),
            estimated_hours: estimated_processing_hours(doc_type, city)?,
            estimated_completion: self.estimate_completion_time(doc_type, city)?,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::catalog::City;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Relógio controlado pelos testes.
    pub(crate) struct FixedClock(pub Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub(crate) fn at(instant: DateTime<Utc>) -> Self {
            Self(Mutex::new(instant))
        }

        pub(crate) fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    pub(crate) fn reference_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn abidjan_single_copy_is_base_plus_shipping() {
        for doc_type in DocumentType::ALL {
            let base = catalog::get_config(doc_type).base_price;
            assert_eq!(calculate_price(doc_type, "Abidjan", 1).unwrap(), base + 1000);
        }
        assert_eq!(calculate_price(DocumentType::ActeNaissance, "Abidjan", 1).unwrap(), 3000);
    }

    #[test]
    fn casier_judiciaire_in_man() {
        // round(3000 * 1.5) + 3000
        assert_eq!(calculate_price(DocumentType::CasierJudiciaire, "Man", 1).unwrap(), 7500);
    }

    #[test]
    fn unknown_city_uses_default_multiplier_and_shipping() {
        // round(2500 * 1.2) + 2000
        assert_eq!(calculate_price(DocumentType::ActeMariage, "Unknown City", 1).unwrap(), 5000);
    }

    #[test]
    fn copies_multiply_before_shipping() {
        // 5000 * 1.4 * 3 + 2500
        assert_eq!(calculate_price(DocumentType::CertificatNationalite, "Korhogo", 3).unwrap(), 23500);
    }

    #[test]
    fn city_multiplier_applies_to_every_copy() {
        // 2000 * 1.1 * 7 + 1500
        assert_eq!(calculate_price(DocumentType::ActeNaissance, "Bouaké", 7).unwrap(), 16900);
        assert_eq!(calculate_price(DocumentType::ActeMariage, "Yamoussoukro", 1).unwrap(), 4250);
    }

    #[test]
    fn price_is_monotonic_in_copies_for_every_city() {
        let cities: Vec<&str> = City::ALL.iter().map(|city| city.name()).collect();
        for doc_type in DocumentType::ALL {
            for city in &cities {
                let mut previous = calculate_price(doc_type, city, 1).unwrap();
                for copies in 2..=10 {
                    let current = calculate_price(doc_type, city, copies).unwrap();
                    assert!(current >= previous, "{doc_type} in {city}: {current} < {previous}");
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn non_positive_copies_are_not_rejected() {
        // Só o frete sobra com zero cópias; o motor não valida.
        assert_eq!(calculate_price(DocumentType::ActeNaissance, "Abidjan", 0).unwrap(), 1000);
        assert_eq!(calculate_price(DocumentType::ActeNaissance, "Abidjan", -1).unwrap(), -1000);
    }

    #[test]
    fn price_is_idempotent() {
        let first = calculate_price(DocumentType::CasierJudiciaire, "Daloa", 4).unwrap();
        let second = calculate_price(DocumentType::CasierJudiciaire, "Daloa", 4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn absurd_copy_counts_fail_instead_of_wrapping() {
        assert!(matches!(
            calculate_price(DocumentType::CertificatNationalite, "Man", i64::MAX),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn delegate_earnings_are_sixty_percent_of_total() {
        assert_eq!(calculate_delegate_earnings(7500), 4500);
        assert_eq!(calculate_delegate_earnings(3000), 1800);
        // 0.6 * 2501 = 1500.6
        assert_eq!(calculate_delegate_earnings(2501), 1501);
        // 0.6 * 2504 = 1502.4
        assert_eq!(calculate_delegate_earnings(2504), 1502);
        assert_eq!(calculate_delegate_earnings(0), 0);
    }

    #[test]
    fn delegate_earnings_round_half_up() {
        // Confere contra floor(total * 0.6 + 0.5) em Decimal, negativos inclusos.
        for total in [-17_i64, -1, 1, 7, 123, 4999, 12_345] {
            let expected = (Decimal::from(total) * Decimal::new(6, 1) + Decimal::new(5, 1)).floor();
            assert_eq!(Decimal::from(calculate_delegate_earnings(total)), expected, "total {total}");
        }
    }

    #[test]
    fn estimate_adds_adjusted_hours_to_now() {
        let clock = Arc::new(FixedClock::at(reference_instant()));
        let engine = PricingEngine::new(clock);

        let estimate = engine
            .estimate_completion_time(DocumentType::CasierJudiciaire, "Korhogo")
            .unwrap();

        assert_eq!(estimate - reference_instant(), Duration::hours(108));
    }

    #[test]
    fn estimate_truncates_fractional_hours() {
        // 24 * 1.3 = 31.2 horas
        assert_eq!(estimated_processing_hours(DocumentType::ActeNaissance, "Unknown City").unwrap(), 31);
        // 48 * 1.6 = 76.8 horas
        assert_eq!(estimated_processing_hours(DocumentType::CertificatNationalite, "Man").unwrap(), 76);
        assert_eq!(estimated_processing_hours(DocumentType::ActeMariage, "Abidjan").unwrap(), 24);
    }

    #[test]
    fn estimate_reads_the_clock_on_every_call() {
        let clock = Arc::new(FixedClock::at(reference_instant()));
        let engine = PricingEngine::new(clock.clone());

        let first = engine.estimate_completion_time(DocumentType::ActeNaissance, "Abidjan").unwrap();
        clock.advance(Duration::seconds(1));
        let second = engine.estimate_completion_time(DocumentType::ActeNaissance, "Abidjan").unwrap();

        assert_eq!(second - first, Duration::seconds(1));
    }

    #[test]
    fn quote_bundles_price_commission_and_estimate() {
        let engine = PricingEngine::new(Arc::new(FixedClock::at(reference_instant())));

        let quote = engine.quote(DocumentType::CasierJudiciaire, "Man", 1).unwrap();

        assert_eq!(quote.total_amount, 7500);
        assert_eq!(quote.delegate_earnings, 4500);
        assert_eq!(quote.shipping_cost, 3000);
        assert_eq!(quote.service, ServiceType::Justice);
        // 72 * 1.6 = 115.2
        assert_eq!(quote.estimated_hours, 115);
        assert_eq!(quote.estimated_completion, reference_instant() + Duration::hours(115));
    }
}
