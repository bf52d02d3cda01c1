//! Offer text endpoints.

use axum::{extract::State, Json};

use super::{ApiResult, AppJson};
use crate::errors::AppError;
use crate::models::{DraftRequest, OfferReply, OfferRequest, OfferText};
use crate::offer::render_draft;
use crate::AppState;

/// Resolve `leadId` against the store, then ask the generator.
async fn generate_text(state: &AppState, mut request: OfferRequest) -> ApiResult<String> {
    if let Some(lead_id) = request.lead_id.clone() {
        let lead = state
            .store
            .get_lead(&lead_id)
            .await?
            .ok_or_else(|| AppError::lead_not_found(&lead_id))?;
        request.fill_from_lead(&lead);
    }

    Ok(state.generator.generate(&request).await)
}

/// POST /api/offer - Generate offer text, answered as `{reply}`.
pub async fn generate_offer(
    State(state): State<AppState>,
    AppJson(request): AppJson<OfferRequest>,
) -> ApiResult<Json<OfferReply>> {
    let reply = generate_text(&state, request).await?;
    Ok(Json(OfferReply { reply }))
}

/// POST /api/ai/offer-text - Generate offer text, answered as `{text}`.
pub async fn generate_offer_text(
    State(state): State<AppState>,
    AppJson(request): AppJson<OfferRequest>,
) -> ApiResult<Json<OfferText>> {
    let text = generate_text(&state, request).await?;
    Ok(Json(OfferText { text }))
}

/// POST /api/offer/draft - Render the quote template.
pub async fn draft_offer(
    State(state): State<AppState>,
    AppJson(request): AppJson<DraftRequest>,
) -> Json<OfferText> {
    Json(OfferText {
        text: render_draft(&request, &state.config.sender_name),
    })
}
