//! Offer, draft and mail payloads exchanged with the frontend.

use serde::{Deserialize, Serialize};

use super::{Lead, LineItem};

/// Writing tone selected in the frontend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Informal, upbeat
    #[serde(alias = "casual")]
    Vlot,
    /// Formal, "u"-form
    #[serde(alias = "formal")]
    Formeel,
    #[default]
    #[serde(other)]
    Standaard,
}

fn default_industry() -> String {
    "anders".to_string()
}

fn default_lang() -> String {
    "nl".to_string()
}

/// Request body for AI offer text generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    #[serde(default, alias = "clientName", alias = "companyName")]
    pub name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Fill blank fields from this stored lead
    #[serde(default)]
    pub lead_id: Option<String>,
}

impl Default for OfferRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            contact_name: String::new(),
            email: String::new(),
            phone: String::new(),
            industry: default_industry(),
            description: String::new(),
            lang: default_lang(),
            tone: Tone::default(),
            items: Vec::new(),
            lead_id: None,
        }
    }
}

fn fill(target: &mut String, source: &str) {
    if target.trim().is_empty() {
        *target = source.to_string();
    }
}

impl OfferRequest {
    /// Fill blank fields from a stored lead. Explicit request values win.
    pub fn fill_from_lead(&mut self, lead: &Lead) {
        fill(&mut self.name, &lead.company_name);
        fill(&mut self.contact_name, &lead.contact_name);
        fill(&mut self.email, &lead.email);
        fill(&mut self.phone, &lead.phone);
        fill(&mut self.description, &lead.notes);
        if self.items.is_empty() {
            self.items = lead.items.clone();
        }
    }
}

/// `POST /api/offer` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct OfferReply {
    pub reply: String,
}

/// Response carrying a generated or templated text.
#[derive(Debug, Serialize, Deserialize)]
pub struct OfferText {
    pub text: String,
}

/// Request body for the quote draft template.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub benefits: String,
}

/// Request body for the demo mail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MailRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: String,
}
