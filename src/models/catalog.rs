// src/models/catalog.rs

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

// --- Enums ---

/// Tipos de documento oferecidos. A ordem de declaração é a ordem de exibição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ActeNaissance,
    ActeMariage,
    CasierJudiciaire,
    CertificatNationalite,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::ActeNaissance,
        DocumentType::ActeMariage,
        DocumentType::CasierJudiciaire,
        DocumentType::CertificatNationalite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::ActeNaissance => "acte_naissance",
            DocumentType::ActeMariage => "acte_mariage",
            DocumentType::CasierJudiciaire => "casier_judiciaire",
            DocumentType::CertificatNationalite => "certificat_nationalite",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Um tipo fora do enum é erro de programação do chamador, nunca um default.
impl FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|doc_type| doc_type.as_str() == s)
            .ok_or_else(|| AppError::UnknownDocumentType(s.to_string()))
    }
}

/// Órgão emissor do documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Mairie,
    SousPrefecture,
    Justice,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::Mairie,
        ServiceType::SousPrefecture,
        ServiceType::Justice,
    ];
}

/// Campos que o solicitante pode ter de preencher, conforme o documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Nom,
    Prenoms,
    DateNaissance,
    LieuNaissance,
    NomEpoux,
    PrenomsEpoux,
    NomEpouse,
    PrenomsEpouse,
    DateMariage,
    Profession,
    Filiation,
}

impl FormField {
    pub const ALL: [FormField; 11] = [
        FormField::Nom,
        FormField::Prenoms,
        FormField::DateNaissance,
        FormField::LieuNaissance,
        FormField::NomEpoux,
        FormField::PrenomsEpoux,
        FormField::NomEpouse,
        FormField::PrenomsEpouse,
        FormField::DateMariage,
        FormField::Profession,
        FormField::Filiation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Nom => "nom",
            FormField::Prenoms => "prenoms",
            FormField::DateNaissance => "date_naissance",
            FormField::LieuNaissance => "lieu_naissance",
            FormField::NomEpoux => "nom_epoux",
            FormField::PrenomsEpoux => "prenoms_epoux",
            FormField::NomEpouse => "nom_epouse",
            FormField::PrenomsEpouse => "prenoms_epouse",
            FormField::DateMariage => "date_mariage",
            FormField::Profession => "profession",
            FormField::Filiation => "filiation",
        }
    }

    pub fn parse(s: &str) -> Option<FormField> {
        FormField::ALL.into_iter().find(|field| field.as_str() == s)
    }

    /// Rótulo exibido ao usuário ("date_naissance" -> "date naissance").
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// As dez cidades atendidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum City {
    Abidjan,
    #[serde(rename = "Bouaké")]
    Bouake,
    #[serde(rename = "San-Pédro")]
    SanPedro,
    Yamoussoukro,
    Daloa,
    Korhogo,
    Man,
    Divo,
    Gagnoa,
    Abengourou,
}

impl City {
    pub const ALL: [City; 10] = [
        City::Abidjan,
        City::Bouake,
        City::SanPedro,
        City::Yamoussoukro,
        City::Daloa,
        City::Korhogo,
        City::Man,
        City::Divo,
        City::Gagnoa,
        City::Abengourou,
    ];

    pub fn name(self) -> &'static str {
        match self {
            City::Abidjan => "Abidjan",
            City::Bouake => "Bouaké",
            City::SanPedro => "San-Pédro",
            City::Yamoussoukro => "Yamoussoukro",
            City::Daloa => "Daloa",
            City::Korhogo => "Korhogo",
            City::Man => "Man",
            City::Divo => "Divo",
            City::Gagnoa => "Gagnoa",
            City::Abengourou => "Abengourou",
        }
    }

    // Comparação exata com o nome cadastrado
    pub fn from_name(name: &str) -> Option<City> {
        City::ALL.into_iter().find(|city| city.name() == name)
    }
}

// --- Structs de Configuração ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    pub document_type: DocumentType,
    #[schema(value_type = String, example = "Extrait d'acte de naissance")]
    pub name: &'static str,
    pub service: ServiceType,
    /// Preço de uma cópia na cidade de referência (FCFA).
    #[schema(example = 2000)]
    pub base_price: i64,
    /// Prazo nominal em horas na cidade de referência.
    #[schema(example = 24)]
    pub processing_time: i64,
    #[schema(value_type = Vec<FormField>)]
    pub required_fields: &'static [FormField],
}

impl DocumentConfig {
    pub fn requires(&self, field: FormField) -> bool {
        self.required_fields.contains(&field)
    }
}

/// Coeficientes de uma cidade (ou o default para cidades não cadastradas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityCoefficients {
    #[schema(value_type = f64, example = 1.2)]
    pub price_multiplier: Decimal,
    #[schema(example = 2000)]
    pub shipping_cost: i64,
    #[schema(value_type = f64, example = 1.3)]
    pub delay_multiplier: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityEntry {
    #[schema(value_type = String, example = "Abidjan")]
    pub name: &'static str,
    #[serde(flatten)]
    pub coefficients: CityCoefficients,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub service: ServiceType,
    #[schema(value_type = String, example = "Mairie")]
    pub label: &'static str,
}
