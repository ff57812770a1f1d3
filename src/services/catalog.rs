// src/services/catalog.rs

//! Catálogo estático de documentos e cidades.
//!
//! As tabelas são constantes do processo: montadas em tempo de compilação,
//! nunca alteradas, seguras para leitura concorrente sem sincronização.

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::catalog::{
        City, CityCoefficients, CityEntry, DocumentConfig, DocumentType, FormField, ServiceEntry,
        ServiceType,
    },
};

// A ordem segue a declaração de DocumentType
static DOCUMENT_CONFIGS: [DocumentConfig; 4] = [
    DocumentConfig {
        document_type: DocumentType::ActeNaissance,
        name: "Extrait d'acte de naissance",
        service: ServiceType::Mairie,
        base_price: 2000,
        processing_time: 24,
        required_fields: &[
            FormField::Nom,
            FormField::Prenoms,
            FormField::DateNaissance,
            FormField::LieuNaissance,
        ],
    },
    DocumentConfig {
        document_type: DocumentType::ActeMariage,
        name: "Extrait d'acte de mariage",
        service: ServiceType::Mairie,
        base_price: 2500,
        processing_time: 24,
        required_fields: &[
            FormField::NomEpoux,
            FormField::PrenomsEpoux,
            FormField::NomEpouse,
            FormField::PrenomsEpouse,
            FormField::DateMariage,
        ],
    },
    DocumentConfig {
        document_type: DocumentType::CasierJudiciaire,
        name: "Casier judiciaire",
        service: ServiceType::Justice,
        base_price: 3000,
        processing_time: 72,
        required_fields: &[
            FormField::Nom,
            FormField::Prenoms,
            FormField::DateNaissance,
            FormField::LieuNaissance,
            FormField::Profession,
        ],
    },
    DocumentConfig {
        document_type: DocumentType::CertificatNationalite,
        name: "Certificat de nationalité",
        service: ServiceType::SousPrefecture,
        base_price: 5000,
        processing_time: 48,
        required_fields: &[
            FormField::Nom,
            FormField::Prenoms,
            FormField::DateNaissance,
            FormField::LieuNaissance,
            FormField::Filiation,
        ],
    },
];

/// Coeficientes aplicados a cidades fora da lista (ainda não atendidas).
pub const DEFAULT_COEFFICIENTS: CityCoefficients = CityCoefficients {
    price_multiplier: Decimal::from_parts(12, 0, 0, false, 1),
    shipping_cost: 2000,
    delay_multiplier: Decimal::from_parts(13, 0, 0, false, 1),
};

// Multiplicadores em décimos: (preço x10, frete, prazo x10)
const fn coefficients_of(price_tenths: u32, shipping_cost: i64, delay_tenths: u32) -> CityCoefficients {
    CityCoefficients {
        price_multiplier: Decimal::from_parts(price_tenths, 0, 0, false, 1),
        shipping_cost,
        delay_multiplier: Decimal::from_parts(delay_tenths, 0, 0, false, 1),
    }
}

pub fn get_config(doc_type: DocumentType) -> &'static DocumentConfig {
    match doc_type {
        DocumentType::ActeNaissance => &DOCUMENT_CONFIGS[0],
        DocumentType::ActeMariage => &DOCUMENT_CONFIGS[1],
        DocumentType::CasierJudiciaire => &DOCUMENT_CONFIGS[2],
        DocumentType::CertificatNationalite => &DOCUMENT_CONFIGS[3],
    }
}

/// Busca pela tag textual. Falha com `UnknownDocumentType` fora das quatro tags.
pub fn lookup(code: &str) -> Result<&'static DocumentConfig, AppError> {
    let doc_type: DocumentType = code.parse()?;
    Ok(get_config(doc_type))
}

pub fn list_all() -> &'static [DocumentConfig] {
    &DOCUMENT_CONFIGS
}

pub fn service_label(service: ServiceType) -> &'static str {
    match service {
        ServiceType::Mairie => "Mairie",
        ServiceType::SousPrefecture => "Sous-préfecture",
        ServiceType::Justice => "Tribunal",
    }
}

pub fn list_services() -> Vec<ServiceEntry> {
    ServiceType::ALL
        .into_iter()
        .map(|service| ServiceEntry { service, label: service_label(service) })
        .collect()
}

pub fn city_coefficients(city: City) -> CityCoefficients {
    match city {
        City::Abidjan => coefficients_of(10, 1000, 10),
        City::Bouake => coefficients_of(11, 1500, 12),
        City::SanPedro => coefficients_of(12, 2000, 13),
        City::Yamoussoukro => coefficients_of(11, 1500, 11),
        City::Daloa => coefficients_of(13, 2000, 14),
        City::Korhogo => coefficients_of(14, 2500, 15),
        City::Man => coefficients_of(15, 3000, 16),
        City::Divo => coefficients_of(12, 1500, 13),
        City::Gagnoa => coefficients_of(12, 1500, 13),
        City::Abengourou => coefficients_of(13, 2000, 14),
    }
}

/// Forma canônica do nome digitado: sem espaços nas pontas. Cotação e
/// criação passam por aqui, então cobram o mesmo valor.
pub fn normalize_city(raw: &str) -> &str {
    raw.trim()
}

/// Nunca falha: cidade desconhecida recebe `DEFAULT_COEFFICIENTS`.
pub fn coefficients(city: &str) -> CityCoefficients {
    let city = normalize_city(city);
    match City::from_name(city) {
        Some(known) => city_coefficients(known),
        None => {
            tracing::debug!(city, "cidade fora do catálogo, usando coeficientes padrão");
            DEFAULT_COEFFICIENTS
        }
    }
}

pub fn list_cities() -> Vec<CityEntry> {
    City::ALL
        .into_iter()
        .map(|city| CityEntry { name: city.name(), coefficients: city_coefficients(city) })
        .collect()
}
