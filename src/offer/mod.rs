//! Offer text generation.
//!
//! All prose comes from the external completion service. When it cannot be
//! reached the caller gets a clearly marked placeholder instead of an error.

mod client;
mod draft;
mod prompt;

pub use client::CompletionClient;
pub use draft::render_draft;

use prompt::build_offer_messages;

use crate::config::Config;
use crate::models::OfferRequest;

/// Returned when no API key is configured.
pub const MISSING_KEY_PLACEHOLDER: &str = "(OPENAI_API_KEY ontbreekt op de server)";
/// Returned when the service answered without any text.
pub const NO_REPLY_PLACEHOLDER: &str = "(geen antwoord)";
/// Returned when the call itself failed.
pub const FAILED_PLACEHOLDER: &str = "(offertetekst kon niet worden gegenereerd)";

/// Builds prompts and delegates generation to the completion service.
#[derive(Clone)]
pub struct OfferGenerator {
    client: Option<CompletionClient>,
}

impl OfferGenerator {
    pub fn new(client: Option<CompletionClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Self {
        let client = config.openai_api_key.as_ref().map(|key| {
            CompletionClient::new(
                key.clone(),
                config.openai_model.clone(),
                config.openai_api_url.clone(),
            )
        });
        Self::new(client)
    }

    /// Whether a completion credential is configured.
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Generate offer text, never failing.
    pub async fn generate(&self, request: &OfferRequest) -> String {
        let Some(client) = &self.client else {
            return MISSING_KEY_PLACEHOLDER.to_string();
        };

        let messages = build_offer_messages(request);
        match client.complete(&messages).await {
            Ok(Some(text)) => text,
            Ok(None) => NO_REPLY_PLACEHOLDER.to_string(),
            Err(e) => {
                tracing::warn!("Offer text generation failed: {}", e);
                FAILED_PLACEHOLDER.to_string()
            }
        }
    }
}
