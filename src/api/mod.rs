//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod leads;
mod mail;
mod offer;

pub use leads::*;
pub use mail::*;
pub use offer::*;

use axum::extract::FromRequest;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Handler result; errors render as `{error, code}` with their status.
pub type ApiResult<T> = Result<T, AppError>;

/// JSON request body. Unreadable bodies are rejected as validation errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
