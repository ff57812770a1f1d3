// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "fr";
const SUPPORTED_LANGS: [&str; 2] = ["fr", "en"];

// Extrator de idioma. Só "fr" e "en" têm mensagens; o resto cai no francês.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(header_str: &str) -> Self {
        // Lista já vem ordenada por q; fica o primeiro idioma suportado
        accept_language::parse(header_str)
            .iter()
            .map(|tag| {
                // "en-US" -> "en"
                tag.split('-').next().unwrap_or(tag).to_lowercase()
            })
            .find(|lang| SUPPORTED_LANGS.contains(&lang.as_str()))
            .map(Locale)
            .unwrap_or_default()
    }

    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }

    /// Escolhe entre a mensagem em francês e a em inglês.
    pub fn pick<'a>(&self, fr: &'a str, en: &'a str) -> &'a str {
        if self.is_english() { en } else { fr }
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(lang)
    }
}
