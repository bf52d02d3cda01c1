//! Lead model matching the frontend lead record.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    #[serde(alias = "nieuw")]
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Proposal => "proposal",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }

    /// Parse a stored status; unknown values read back as `New`.
    pub fn parse(s: &str) -> Self {
        match s {
            "contacted" => LeadStatus::Contacted,
            "qualified" => LeadStatus::Qualified,
            "proposal" => LeadStatus::Proposal,
            "won" => LeadStatus::Won,
            "lost" => LeadStatus::Lost,
            _ => LeadStatus::New,
        }
    }
}

/// A line item on a lead or an offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

fn default_quantity() -> f64 {
    1.0
}

/// A prospective customer record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nested client reference used by the richer frontend variant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientRef {
    #[serde(default)]
    pub name: String,
}

/// Request body for creating a new lead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub client: Option<ClientRef>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub vat: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl CreateLeadRequest {
    /// Company name, falling back to `client.name`.
    pub fn resolved_company_name(&self) -> &str {
        match self.company_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self
                .client
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or_default(),
        }
    }
}

/// Request body for updating an existing lead. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub vat: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

/// Current time truncated to the microsecond resolution the stores persist.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Non-blank check. Accepted values are stored as sent.
fn required(value: &str, message: &str) -> Result<String, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(value.to_string())
}

impl Lead {
    /// Build a new record from a create request, assigning id and timestamps.
    pub fn create(request: CreateLeadRequest, now: DateTime<Utc>) -> Result<Self, AppError> {
        let company_name = required(request.resolved_company_name(), "Company name is required")?;
        let contact_name = required(
            request.contact_name.as_deref().unwrap_or_default(),
            "Contact name is required",
        )?;

        Ok(Lead {
            id: uuid::Uuid::new_v4().to_string(),
            company_name,
            contact_name,
            email: request.email.unwrap_or_default(),
            phone: request.phone.unwrap_or_default(),
            notes: request.notes.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            amount: request.amount,
            vat: request.vat,
            total: request.total,
            items: request.items,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge an update over this record.
    ///
    /// Validation happens before any field is touched, so a rejected update
    /// leaves the record as it was. `updated_at` never moves backwards.
    pub fn apply(&mut self, update: &UpdateLeadRequest, now: DateTime<Utc>) -> Result<(), AppError> {
        let company_name = update
            .company_name
            .as_deref()
            .map(|v| required(v, "Company name cannot be empty"))
            .transpose()?;
        let contact_name = update
            .contact_name
            .as_deref()
            .map(|v| required(v, "Contact name cannot be empty"))
            .transpose()?;

        if let Some(v) = company_name {
            self.company_name = v;
        }
        if let Some(v) = contact_name {
            self.contact_name = v;
        }
        if let Some(v) = &update.email {
            self.email = v.clone();
        }
        if let Some(v) = &update.phone {
            self.phone = v.clone();
        }
        if let Some(v) = &update.notes {
            self.notes = v.clone();
        }
        if let Some(v) = update.status {
            self.status = v;
        }
        self.amount = update.amount.or(self.amount);
        self.vat = update.vat.or(self.vat);
        self.total = update.total.or(self.total);
        if let Some(items) = &update.items {
            self.items = items.clone();
        }
        self.updated_at = now.max(self.updated_at);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn acme() -> CreateLeadRequest {
        CreateLeadRequest {
            company_name: Some("Acme".into()),
            contact_name: Some("Jo".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_defaults() {
        let now = timestamp_now();
        let lead = Lead::create(acme(), now).unwrap();

        assert_eq!(lead.company_name, "Acme");
        assert_eq!(lead.contact_name, "Jo");
        assert_eq!(lead.email, "");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.created_at, lead.updated_at);
        assert!(uuid::Uuid::parse_str(&lead.id).is_ok());
    }

    #[test]
    fn test_create_serializes_minimal_shape() {
        let lead = Lead::create(acme(), timestamp_now()).unwrap();
        let value = serde_json::to_value(&lead).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

        for key in [
            "id",
            "companyName",
            "contactName",
            "email",
            "phone",
            "notes",
            "status",
            "createdAt",
            "updatedAt",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(keys.len(), 9);
        assert_eq!(value["status"], "new");
    }

    #[test]
    fn test_create_requires_company_and_contact() {
        let mut no_company = acme();
        no_company.company_name = Some("  ".into());
        assert!(matches!(
            Lead::create(no_company, timestamp_now()),
            Err(AppError::Validation(_))
        ));

        let mut no_contact = acme();
        no_contact.contact_name = None;
        assert!(matches!(
            Lead::create(no_contact, timestamp_now()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_client_name_fallback() {
        let request: CreateLeadRequest = serde_json::from_value(json!({
            "client": { "name": "Beta BV" },
            "contactName": "An"
        }))
        .unwrap();
        let lead = Lead::create(request, timestamp_now()).unwrap();
        assert_eq!(lead.company_name, "Beta BV");
    }

    #[test]
    fn test_null_contact_is_validation_error() {
        let request: CreateLeadRequest = serde_json::from_value(json!({
            "companyName": "Acme",
            "contactName": null
        }))
        .unwrap();
        assert!(matches!(
            Lead::create(request, timestamp_now()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_names_kept_as_sent() {
        let mut request = acme();
        request.company_name = Some(" Acme ".into());
        request.contact_name = Some("Jo ".into());
        let lead = Lead::create(request, timestamp_now()).unwrap();
        assert_eq!(lead.company_name, " Acme ");
        assert_eq!(lead.contact_name, "Jo ");
    }

    #[test]
    fn test_dutch_status_alias() {
        let request: CreateLeadRequest = serde_json::from_value(json!({
            "companyName": "Acme",
            "contactName": "Jo",
            "status": "nieuw"
        }))
        .unwrap();
        assert_eq!(request.status, Some(LeadStatus::New));
    }

    #[test]
    fn test_apply_merges_and_keeps_absent_fields() {
        let created = timestamp_now();
        let mut lead = Lead::create(acme(), created).unwrap();
        lead.email = "jo@acme.test".into();

        let update = UpdateLeadRequest {
            notes: Some("Wil een offerte".into()),
            status: Some(LeadStatus::Contacted),
            ..Default::default()
        };
        lead.apply(&update, created + Duration::seconds(5)).unwrap();

        assert_eq!(lead.email, "jo@acme.test");
        assert_eq!(lead.notes, "Wil een offerte");
        assert_eq!(lead.status, LeadStatus::Contacted);
        assert!(lead.updated_at > lead.created_at);
    }

    #[test]
    fn test_apply_never_moves_updated_at_back() {
        let created = timestamp_now();
        let mut lead = Lead::create(acme(), created).unwrap();

        lead.apply(&UpdateLeadRequest::default(), created - Duration::seconds(30))
            .unwrap();
        assert_eq!(lead.updated_at, created);
    }

    #[test]
    fn test_apply_rejects_blank_required_field_without_changes() {
        let mut lead = Lead::create(acme(), timestamp_now()).unwrap();
        let before = lead.clone();

        let update = UpdateLeadRequest {
            company_name: Some("".into()),
            notes: Some("should not land".into()),
            ..Default::default()
        };
        assert!(lead.apply(&update, timestamp_now()).is_err());
        assert_eq!(lead, before);
    }

    #[test]
    fn test_status_parse_unknown_is_new() {
        assert_eq!(LeadStatus::parse("won"), LeadStatus::Won);
        assert_eq!(LeadStatus::parse("archived"), LeadStatus::New);
        assert_eq!(LeadStatus::Proposal.as_str(), "proposal");
    }
}
