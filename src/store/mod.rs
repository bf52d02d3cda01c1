//! Lead Store: durable storage of lead records.
//!
//! One interface, two backends: an embedded SQLite database and a single JSON
//! array file. The backend is picked at start-up from configuration.

mod json_file;
mod sqlite;

pub use json_file::JsonFileLeadStore;
pub use sqlite::{init_database, SqliteLeadStore};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StorageBackend};
use crate::errors::AppError;
use crate::models::{CreateLeadRequest, Lead, UpdateLeadRequest};

/// Storage contract shared by all backends.
///
/// Every mutating call has fully persisted by the time it returns `Ok`.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// All leads, newest first.
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError>;

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, AppError>;

    /// Validate, assign id and timestamps, persist.
    async fn create_lead(&self, request: CreateLeadRequest) -> Result<Lead, AppError>;

    /// Merge supplied fields over the stored record and refresh `updatedAt`.
    async fn update_lead(&self, id: &str, request: &UpdateLeadRequest) -> Result<Lead, AppError>;

    /// Remove the record and hand it back.
    async fn delete_lead(&self, id: &str) -> Result<Lead, AppError>;
}

/// Open the configured backend.
pub async fn open_store(config: &Config) -> Result<Arc<dyn LeadStore>, AppError> {
    match config.storage {
        StorageBackend::Sqlite => {
            let pool = init_database(&config.db_path).await?;
            Ok(Arc::new(SqliteLeadStore::new(pool)))
        }
        StorageBackend::JsonFile => Ok(Arc::new(JsonFileLeadStore::open(&config.leads_file).await?)),
    }
}
