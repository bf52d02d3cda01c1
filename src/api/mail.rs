//! Demo mail endpoint. Logs instead of sending.

use axum::Json;

use super::{Ack, ApiResult, AppJson};
use crate::errors::AppError;
use crate::models::MailRequest;

/// POST /api/mail - Accept a mail and log it.
pub async fn send_mail(AppJson(request): AppJson<MailRequest>) -> ApiResult<Json<Ack>> {
    if request.to.trim().is_empty() || request.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Recipient (to) and text are required".to_string(),
        ));
    }

    tracing::info!(
        to = %request.to,
        subject = %request.subject,
        length = request.text.len(),
        "Demo mail accepted (not sent)"
    );

    Ok(Json(Ack::ok()))
}
