//! SQLite-backed Lead Store.
//!
//! Uses prepared statements and a version column to guard read-modify-write.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::LeadStore;
use crate::errors::AppError;
use crate::models::{
    timestamp_now, CreateLeadRequest, Lead, LeadStatus, LineItem, UpdateLeadRequest,
};

/// Attempts before a contended update gives up with a conflict.
const MAX_UPDATE_ATTEMPTS: usize = 3;

const LEAD_COLUMNS: &str = "id, company_name, contact_name, email, phone, notes, status, \
                            amount, vat, total, items, created_at, updated_at, version";

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            company_name TEXT NOT NULL,
            contact_name TEXT NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'new',
            amount REAL,
            vat REAL,
            total REAL,
            items TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads(created_at);")
        .execute(pool)
        .await?;

    Ok(())
}

/// Lead Store over an SQLite pool.
#[derive(Clone)]
pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a lead together with its row version.
    async fn fetch(&self, id: &str) -> Result<Option<(Lead, i64)>, AppError> {
        let row = sqlx::query(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(lead_from_row).transpose()
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| lead_from_row(row).map(|(lead, _)| lead))
            .collect()
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, AppError> {
        Ok(self.fetch(id).await?.map(|(lead, _)| lead))
    }

    async fn create_lead(&self, request: CreateLeadRequest) -> Result<Lead, AppError> {
        let lead = Lead::create(request, timestamp_now())?;
        let items_json = items_to_json(&lead.items)?;

        sqlx::query(
            "INSERT INTO leads (id, company_name, contact_name, email, phone, notes, status, amount, vat, total, items, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&lead.id)
        .bind(&lead.company_name)
        .bind(&lead.contact_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.notes)
        .bind(lead.status.as_str())
        .bind(lead.amount)
        .bind(lead.vat)
        .bind(lead.total)
        .bind(&items_json)
        .bind(format_timestamp(&lead.created_at))
        .bind(format_timestamp(&lead.updated_at))
        .execute(&self.pool)
        .await?;

        tracing::debug!(lead_id = %lead.id, "Lead created");
        Ok(lead)
    }

    async fn update_lead(&self, id: &str, request: &UpdateLeadRequest) -> Result<Lead, AppError> {
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let (mut lead, version) = self
                .fetch(id)
                .await?
                .ok_or_else(|| AppError::lead_not_found(id))?;

            lead.apply(request, timestamp_now())?;
            let items_json = items_to_json(&lead.items)?;

            // Conditional UPDATE: only lands if nobody wrote since our read
            let result = sqlx::query(
                "UPDATE leads SET company_name = ?, contact_name = ?, email = ?, phone = ?, notes = ?, status = ?, amount = ?, vat = ?, total = ?, items = ?, updated_at = ?, version = version + 1 WHERE id = ? AND version = ?"
            )
            .bind(&lead.company_name)
            .bind(&lead.contact_name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.notes)
            .bind(lead.status.as_str())
            .bind(lead.amount)
            .bind(lead.vat)
            .bind(lead.total)
            .bind(&items_json)
            .bind(format_timestamp(&lead.updated_at))
            .bind(id)
            .bind(version)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                return Ok(lead);
            }

            tracing::debug!(lead_id = id, "Concurrent lead modification, retrying update");
        }

        Err(AppError::Conflict(format!(
            "Lead {} was modified concurrently, try again",
            id
        )))
    }

    async fn delete_lead(&self, id: &str) -> Result<Lead, AppError> {
        let row = sqlx::query(&format!(
            "DELETE FROM leads WHERE id = ? RETURNING {LEAD_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(lead_from_row(&row)?.0),
            None => Err(AppError::lead_not_found(id)),
        }
    }
}

// Helper functions for row conversion

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Storage(format!("Invalid stored timestamp '{}': {}", s, e)))
}

fn items_to_json(items: &[LineItem]) -> Result<Option<String>, AppError> {
    if items.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(items)?))
}

fn lead_from_row(row: &SqliteRow) -> Result<(Lead, i64), AppError> {
    let status: String = row.try_get("status")?;
    let items: Option<String> = row.try_get("items")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let lead = Lead {
        id: row.try_get("id")?,
        company_name: row.try_get("company_name")?,
        contact_name: row.try_get("contact_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        notes: row.try_get("notes")?,
        status: LeadStatus::parse(&status),
        amount: row.try_get("amount")?,
        vat: row.try_get("vat")?,
        total: row.try_get("total")?,
        items: items
            .map(|s| serde_json::from_str(&s))
            .transpose()?
            .unwrap_or_default(),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    };

    Ok((lead, row.try_get("version")?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::contract;
    use tempfile::TempDir;

    async fn store() -> (SqliteLeadStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("leads.sqlite")).await.unwrap();
        (SqliteLeadStore::new(pool), dir)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (store, _dir) = store().await;
        contract::create_and_list(&store).await;
    }

    #[tokio::test]
    async fn test_rejects_missing_fields() {
        let (store, _dir) = store().await;
        contract::rejects_missing_fields(&store).await;
    }

    #[tokio::test]
    async fn test_ids_unique_newest_first() {
        let (store, _dir) = store().await;
        contract::ids_are_unique_and_newest_first(&store).await;
    }

    #[tokio::test]
    async fn test_update_merges() {
        let (store, _dir) = store().await;
        contract::update_merges(&store).await;
    }

    #[tokio::test]
    async fn test_update_missing() {
        let (store, _dir) = store().await;
        contract::update_missing_leaves_store_unchanged(&store).await;
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _dir) = store().await;
        contract::delete_removes_exactly_one(&store).await;
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let (store, _dir) = store().await;
        let lead = store.create_lead(contract::acme()).await.unwrap();

        let update = UpdateLeadRequest {
            notes: Some("tweede gesprek".into()),
            ..Default::default()
        };
        store.update_lead(&lead.id, &update).await.unwrap();
        store.update_lead(&lead.id, &update).await.unwrap();

        let (_, version) = store.fetch(&lead.id).await.unwrap().unwrap();
        assert_eq!(version, 3);
    }

    #[tokio::test]
    async fn test_items_round_trip() {
        let (store, _dir) = store().await;
        let mut request = contract::acme();
        request.items = vec![LineItem {
            description: "Workshop".into(),
            quantity: 2.0,
            unit_price: Some(450.0),
        }];
        request.amount = Some(900.0);
        request.vat = Some(189.0);

        let created = store.create_lead(request).await.unwrap();
        let stored = store.get_lead(&created.id).await.unwrap().unwrap();

        assert_eq!(stored.items, created.items);
        assert_eq!(stored.vat, Some(189.0));
    }

    #[tokio::test]
    async fn test_corrupt_items_surface_as_storage_error() {
        let (store, _dir) = store().await;
        let lead = store.create_lead(contract::acme()).await.unwrap();

        sqlx::query("UPDATE leads SET items = 'garbage' WHERE id = ?")
            .bind(&lead.id)
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(matches!(
            store.get_lead(&lead.id).await,
            Err(AppError::Storage(_))
        ));

        // The column is not overwritten by a later update
        let update = UpdateLeadRequest {
            notes: Some("x".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_lead(&lead.id, &update).await,
            Err(AppError::Storage(_))
        ));
        let items: Option<String> = sqlx::query_scalar("SELECT items FROM leads WHERE id = ?")
            .bind(&lead.id)
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(items.as_deref(), Some("garbage"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_succeed_or_conflict() {
        let (store, _dir) = store().await;
        let store = Arc::new(store);
        let lead = store.create_lead(contract::acme()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let id = lead.id.clone();
            handles.push(tokio::spawn(async move {
                let update = UpdateLeadRequest {
                    notes: Some(format!("notitie {i}")),
                    ..Default::default()
                };
                store.update_lead(&id, &update).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(updated) => {
                    assert!(updated.updated_at >= lead.updated_at);
                    successes += 1;
                }
                Err(AppError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert!(successes >= 1);

        let (stored, version) = store.fetch(&lead.id).await.unwrap().unwrap();
        assert_eq!(version, 1 + successes);
        assert!(stored.updated_at >= lead.updated_at);
        assert!(stored.notes.starts_with("notitie "));
    }

    #[tokio::test]
    async fn test_lost_race_exhausts_retries_with_conflict() {
        let (store, _dir) = store().await;
        let lead = store.create_lead(contract::acme()).await.unwrap();

        // The guarded UPDATE never lands, as if another writer always won
        sqlx::query(
            "CREATE TRIGGER hold_lead BEFORE UPDATE ON leads BEGIN SELECT RAISE(IGNORE); END",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let update = UpdateLeadRequest {
            contact_name: Some("An".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_lead(&lead.id, &update).await,
            Err(AppError::Conflict(_))
        ));
        let stored = store.get_lead(&lead.id).await.unwrap().unwrap();
        assert_eq!(stored.contact_name, "Jo");
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.sqlite");

        let created = {
            let store = SqliteLeadStore::new(init_database(&path).await.unwrap());
            let lead = store.create_lead(contract::acme()).await.unwrap();
            store.pool.close().await;
            lead
        };

        let store = SqliteLeadStore::new(init_database(&path).await.unwrap());
        assert_eq!(store.list_leads().await.unwrap(), vec![created]);
    }
}
