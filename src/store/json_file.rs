//! JSON-file-backed Lead Store.
//!
//! The whole store is one JSON array on disk. Every operation holds a single
//! async mutex for its full read-modify-write, and writes land through a
//! temp file that is synced and renamed over the target.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::LeadStore;
use crate::errors::AppError;
use crate::models::{timestamp_now, CreateLeadRequest, Lead, UpdateLeadRequest};

/// Lead Store over a single JSON file.
pub struct JsonFileLeadStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileLeadStore {
    /// Open the store, creating the parent directory if needed.
    ///
    /// A missing file is an empty store; it is created on the first write.
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let store = Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        };

        // Fail at start-up rather than on the first request if the file is corrupt
        let count = store.load().await?.len();
        tracing::info!("Opened leads file {:?} with {} leads", store.path, count);

        Ok(store)
    }

    /// Read all leads in insertion order. Caller holds the lock.
    async fn load(&self) -> Result<Vec<Lead>, AppError> {
        match fs::read(&self.path).await {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically replace the file contents. Caller holds the lock.
    async fn save(&self, leads: &[Lead]) -> Result<(), AppError> {
        let data = serde_json::to_vec_pretty(leads)?;
        let temp_path = self.path.with_extension("json.tmp");

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        tracing::debug!("Persisted {} leads to {:?}", leads.len(), self.path);

        Ok(())
    }
}

#[async_trait]
impl LeadStore for JsonFileLeadStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        let _guard = self.lock.lock().await;
        let mut leads = self.load().await?;
        leads.reverse();
        Ok(leads)
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|l| l.id == id))
    }

    async fn create_lead(&self, request: CreateLeadRequest) -> Result<Lead, AppError> {
        // Stamp under the lock so insertion order matches created_at
        let _guard = self.lock.lock().await;
        let lead = Lead::create(request, timestamp_now())?;
        let mut leads = self.load().await?;
        leads.push(lead.clone());
        self.save(&leads).await?;

        tracing::debug!(lead_id = %lead.id, "Lead created");
        Ok(lead)
    }

    async fn update_lead(&self, id: &str, request: &UpdateLeadRequest) -> Result<Lead, AppError> {
        let _guard = self.lock.lock().await;
        let mut leads = self.load().await?;

        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::lead_not_found(id))?;
        lead.apply(request, timestamp_now())?;
        let updated = lead.clone();

        self.save(&leads).await?;
        Ok(updated)
    }

    async fn delete_lead(&self, id: &str) -> Result<Lead, AppError> {
        let _guard = self.lock.lock().await;
        let mut leads = self.load().await?;

        let index = leads
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| AppError::lead_not_found(id))?;
        let removed = leads.remove(index);

        self.save(&leads).await?;
        Ok(removed)
    }
}
