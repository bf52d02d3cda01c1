//! Quote draft template.
//!
//! Pure text assembly, no completion service involved.

use crate::models::{DraftRequest, Tone};

/// Price line fallback when no price was entered.
const PRICE_FALLBACK: &str = "in overleg";

fn intro(tone: Tone, service: &str) -> String {
    match tone {
        Tone::Vlot => format!("Thanks voor de aanvraag voor {}!", service),
        Tone::Formeel => format!("Dank voor uw interesse in {}.", service),
        Tone::Standaard => format!("Bedankt voor uw aanvraag voor {}.", service),
    }
}

/// Render the draft quote text.
pub fn render_draft(request: &DraftRequest, sender_name: &str) -> String {
    let price = match request.price.trim() {
        "" => PRICE_FALLBACK,
        price => price,
    };

    format!(
        "{intro}\n\n\
         Hierbij sturen wij een eerste voorstel.\n\n\
         Indicatieve investering: {price}.\n\n\
         Pluspunten / garanties:\n\
         {benefits}\n\n\
         Laat het gerust weten als er vragen zijn.\n\n\
         Met vriendelijke groet,\n\
         {sender_name}\n",
        intro = intro(request.tone, request.service.trim()),
        benefits = request.benefits.trim(),
    )
}
