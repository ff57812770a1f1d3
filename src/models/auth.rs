// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_not_blank, validate_phone};

// Modo de entrega preferido pelo usuário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPreference {
    #[default]
    Standard,
    Express,
}

/// Preferências do perfil, gravadas como JSON na coluna `preferences`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub notifications: bool,
    #[schema(example = "Abidjan")]
    pub default_city: Option<String>,
    pub preferred_shipping: ShippingPreference,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            notifications: true,
            default_city: None,
            preferred_shipping: ShippingPreference::Standard,
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "aya.kouassi@example.ci")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Aya Kouassi")]
    pub name: String,
    #[schema(example = "+225 07 00 00 00 00")]
    pub phone: String,

    #[sqlx(json)]
    pub preferences: UserPreferences,

    #[schema(example = 3)]
    pub total_requests: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

/// Atualização parcial do perfil: campos ausentes ficam como estão.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub preferences: Option<UserPreferences>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_default_when_fields_are_missing() {
        let prefs: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UserPreferences::default());
        assert!(prefs.notifications);
        assert_eq!(prefs.preferred_shipping, ShippingPreference::Standard);
    }

    #[test]
    fn preferences_use_camel_case_keys() {
        let prefs: UserPreferences = serde_json::from_str(
            r#"{"notifications":false,"defaultCity":"Daloa","preferredShipping":"express"}"#,
        )
        .unwrap();
        assert!(!prefs.notifications);
        assert_eq!(prefs.default_city.as_deref(), Some("Daloa"));
        assert_eq!(prefs.preferred_shipping, ShippingPreference::Express);
    }

    #[test]
    fn register_payload_validation() {
        let payload = RegisterUserPayload {
            email: "not-an-email".into(),
            password: "123".into(),
            name: String::new(),
            phone: "0700000000".into(),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("phone"));
    }

    #[test]
    fn whitespace_only_name_and_phone_are_rejected() {
        let payload = RegisterUserPayload {
            email: "aya@example.ci".into(),
            password: "segredo123".into(),
            name: "   ".into(),
            phone: "  0701   ".into(),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["name"][0].code, "required");
        assert_eq!(fields["phone"][0].code, "invalid_phone");
    }

    #[test]
    fn profile_update_checks_only_present_fields() {
        let untouched = UpdateProfilePayload { name: None, phone: None, preferences: None };
        assert!(untouched.validate().is_ok());

        let blank = UpdateProfilePayload { name: Some(" \t".into()), phone: None, preferences: None };
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
