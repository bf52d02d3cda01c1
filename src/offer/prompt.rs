//! Deterministic prompt construction for offer texts.

use std::fmt::Write;

use super::client::ChatMessage;
use crate::models::{LineItem, OfferRequest, Tone};

/// Word limit passed to the model.
const MAX_WORDS: u32 = 220;

fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Vlot => "Schrijf vlot en enthousiast, spreek de lezer aan met je/jij.",
        Tone::Formeel => "Schrijf formeel en zakelijk, spreek de lezer aan met u.",
        Tone::Standaard => "Houd het professioneel maar toegankelijk.",
    }
}

fn format_amount(value: f64) -> String {
    format!("€ {:.2}", value)
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

fn write_items(out: &mut String, items: &[LineItem]) {
    if items.is_empty() {
        return;
    }

    out.push_str("Posten:\n");
    let mut subtotal = 0.0;
    let mut priced = false;
    for item in items {
        let qty = format_quantity(item.quantity);
        match item.unit_price {
            Some(price) => {
                priced = true;
                subtotal += price * item.quantity;
                let _ = writeln!(
                    out,
                    "- {} x {} à {}",
                    qty,
                    item.description,
                    format_amount(price)
                );
            }
            None => {
                let _ = writeln!(out, "- {} x {}", qty, item.description);
            }
        }
    }
    if priced {
        let _ = writeln!(out, "Subtotaal (excl. btw): {}", format_amount(subtotal));
    }
}

/// Build the system and user messages for an offer request.
///
/// Tone and language only change the framing in the system message.
pub fn build_offer_messages(request: &OfferRequest) -> Vec<ChatMessage> {
    let system = format!(
        "Je bent een commerciële assistent. Schrijf een korte, duidelijke offerte-tekst in {}.\n\
         Gebruik kopjes: Probleem, Oplossing, Planning, Prijsindicatie (bandbreedte), Geldigheid, Call-to-action.\n\
         {}",
        request.lang,
        tone_instruction(request.tone)
    );

    let mut user = String::from("Lead:\n");
    let _ = writeln!(user, "- Naam: {}", request.name);
    if !request.contact_name.is_empty() {
        let _ = writeln!(user, "- Contactpersoon: {}", request.contact_name);
    }
    let _ = writeln!(user, "- E-mail: {}", request.email);
    let _ = writeln!(user, "- Telefoon: {}", request.phone);
    let _ = writeln!(user, "- Branche: {}", request.industry);
    let _ = writeln!(user, "- Omschrijving: {}", request.description);
    write_items(&mut user, &request.items);
    let _ = write!(user, "Schrijf max {} woorden.", MAX_WORDS);

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}
