use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    middleware::i18n::Locale,
    models::{catalog::FormField, requests::RequestStatus},
};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Tipo de documento desconhecido: {0}")]
    UnknownDocumentType(String),

    #[error("Campos obrigatórios ausentes: {0:?}")]
    MissingRequiredFields(Vec<FormField>),

    #[error("Campos não esperados: {0:?}")]
    UnexpectedFormFields(Vec<String>),

    #[error("Transição inválida de {from:?} para {to:?}")]
    InvalidStatusTransition { from: RequestStatus, to: RequestStatus },

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Solicitação não encontrada")]
    RequestNotFound,

    #[error("Usuário não é um delegado")]
    NotADelegate,

    #[error("Delegado não atende este serviço")]
    DelegateCannotServe,

    #[error("Ação reservada ao delegado atribuído")]
    NotAssignedDelegate,

    #[error("Solicitação ainda não concluída")]
    RequestNotCompleted,

    #[error("Solicitação já avaliada")]
    RatingAlreadyExists,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Erro pronto para a resposta HTTP, já traduzido.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    fn simple(status: StatusCode, message: &str) -> Self {
        Self { status, error: message.to_string(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

// Mensagens de validação vêm como códigos ("required", "invalid_email"...)
fn validation_message(code: &str, locale: &Locale) -> String {
    let text = match code {
        "required" => locale.pick("Ce champ est requis.", "This field is required."),
        "invalid_email" => locale.pick("L'adresse e-mail est invalide.", "The e-mail address is invalid."),
        "password_too_short" => locale.pick(
            "Le mot de passe doit contenir au moins 6 caractères.",
            "The password must be at least 6 characters long.",
        ),
        "invalid_phone" => locale.pick("Le numéro de téléphone est invalide.", "The phone number is invalid."),
        "copies_range" => locale.pick(
            "Le nombre de copies doit être compris entre 1 et 10.",
            "The number of copies must be between 1 and 10.",
        ),
        "rating_range" => locale.pick("La note doit être comprise entre 1 et 5.", "Ratings must be between 1 and 5."),
        "comment_too_long" => locale.pick("Le commentaire est trop long.", "The comment is too long."),
        other => other,
    };
    text.to_string()
}

impl AppError {
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(code) => validation_message(code, locale),
                            None => validation_message(&e.code, locale),
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: locale
                        .pick("Un ou plusieurs champs sont invalides.", "One or more fields are invalid.")
                        .to_string(),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::UnknownDocumentType(value) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: locale
                    .pick("Type de document inconnu.", "Unknown document type.")
                    .to_string(),
                details: Some(json!({ "documentType": value })),
            },
            // Um item por campo, para o usuário corrigir cada um
            AppError::MissingRequiredFields(fields) => {
                let details: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|field| {
                        let message = if locale.is_english() {
                            format!("The field \"{}\" is required", field.label())
                        } else {
                            format!("Le champ \"{}\" est requis", field.label())
                        };
                        (field.as_str().to_string(), json!([message]))
                    })
                    .collect();
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: locale
                        .pick("Des champs obligatoires sont manquants.", "Required fields are missing.")
                        .to_string(),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::UnexpectedFormFields(keys) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: locale
                    .pick(
                        "Le formulaire contient des champs non attendus pour ce document.",
                        "The form contains fields not expected for this document.",
                    )
                    .to_string(),
                details: Some(json!({ "fields": keys })),
            },
            AppError::InvalidStatusTransition { from, to } => ApiError {
                status: StatusCode::CONFLICT,
                error: locale
                    .pick(
                        "Cette action n'est pas possible dans l'état actuel de la demande.",
                        "This action is not allowed in the request's current state.",
                    )
                    .to_string(),
                details: Some(json!({ "from": from, "to": to })),
            },
            AppError::EmailAlreadyExists => ApiError::simple(
                StatusCode::CONFLICT,
                locale.pick("Cette adresse e-mail est déjà utilisée.", "This e-mail is already in use."),
            ),
            AppError::InvalidCredentials => ApiError::simple(
                StatusCode::UNAUTHORIZED,
                locale.pick("E-mail ou mot de passe invalide.", "Invalid e-mail or password."),
            ),
            AppError::InvalidToken => ApiError::simple(
                StatusCode::UNAUTHORIZED,
                locale.pick(
                    "Jeton d'authentification invalide ou absent.",
                    "Invalid or missing authentication token.",
                ),
            ),
            AppError::UserNotFound => ApiError::simple(
                StatusCode::NOT_FOUND,
                locale.pick("Utilisateur introuvable.", "User not found."),
            ),
            AppError::RequestNotFound => ApiError::simple(
                StatusCode::NOT_FOUND,
                locale.pick("Demande introuvable.", "Request not found."),
            ),
            AppError::NotADelegate => ApiError::simple(
                StatusCode::FORBIDDEN,
                locale.pick("Accès réservé aux délégués.", "Delegates only."),
            ),
            AppError::DelegateCannotServe => ApiError::simple(
                StatusCode::FORBIDDEN,
                locale.pick(
                    "Ce délégué ne traite pas ce service.",
                    "This delegate does not handle this service.",
                ),
            ),
            AppError::NotAssignedDelegate => ApiError::simple(
                StatusCode::FORBIDDEN,
                locale.pick(
                    "Seul le délégué assigné peut effectuer cette action.",
                    "Only the assigned delegate can perform this action.",
                ),
            ),
            AppError::RequestNotCompleted => ApiError::simple(
                StatusCode::CONFLICT,
                locale.pick(
                    "Seules les demandes terminées peuvent être évaluées.",
                    "Only completed requests can be rated.",
                ),
            ),
            AppError::RatingAlreadyExists => ApiError::simple(
                StatusCode::CONFLICT,
                locale.pick("Cette demande a déjà été évaluée.", "This request has already been rated."),
            ),

            // Todos os outros erros (banco, bcrypt, jwt, interno) viram 500.
            // O detalhe vai para o log, nunca para o cliente.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::simple(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    locale.pick("Une erreur inattendue est survenue.", "An unexpected error occurred."),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_reported_per_field() {
        let err = AppError::MissingRequiredFields(vec![FormField::Nom, FormField::DateNaissance]);

        let api = err.to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["nom"][0], "Le champ \"nom\" est requis");
        assert_eq!(details["date_naissance"][0], "Le champ \"date naissance\" est requis");
    }

    #[test]
    fn messages_follow_the_locale() {
        let err = AppError::RequestNotFound;
        assert_eq!(err.to_api_error(&Locale("en".into())).error, "Request not found.");
        assert_eq!(err.to_api_error(&Locale::default()).error, "Demande introuvable.");
    }

    #[test]
    fn unknown_document_type_is_a_client_error() {
        let api = AppError::UnknownDocumentType("passeport".into()).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["documentType"], "passeport");
    }

    #[test]
    fn invalid_transition_is_a_conflict() {
        let api = AppError::InvalidStatusTransition {
            from: RequestStatus::Completed,
            to: RequestStatus::Cancelled,
        }
        .to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::CONFLICT);
        let details = api.details.unwrap();
        assert_eq!(details["from"], "completed");
        assert_eq!(details["to"], "cancelled");
    }

    #[test]
    fn internal_errors_are_masked() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo do banco"))
            .to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
        assert!(api.details.is_none());
    }
}
