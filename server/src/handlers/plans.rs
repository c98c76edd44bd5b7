//! Plan handlers - validate documents and drive the versioned store.

use crate::error::{AppError, Result};
use plan_engine::{
    ChangeToken, ConsistencyValidator, DeleteOutcome, Error, InsertOutcome, Metadata, ReadOutcome,
    Record, RecordSummary, VersionedStore, WriteReceipt,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body for a create.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
    pub version: u64,
    pub timestamp: DateTime<Utc>,
}

/// A stored plan as returned to clients.
#[derive(Debug, Serialize)]
pub struct PlanBody {
    #[serde(flatten)]
    pub record: Record,
    pub metadata: Metadata,
}

/// Query parameters for listing plans.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Only plans whose `_org` equals this
    pub org: Option<String>,
}

/// Response for listing plans.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<RecordSummary>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a read, before it is mapped to HTTP.
#[derive(Debug)]
pub enum PlanRead {
    Found {
        body: PlanBody,
        change_token: ChangeToken,
    },
    NotModified(ChangeToken),
}

fn validate(document: Value) -> Result<Record> {
    ConsistencyValidator::new()
        .validate_document(document)
        .map_err(|errors| Error::Validation(errors).into())
}

/// Create a plan keyed by its `objectId`; an existing key is a conflict.
pub fn handle_create(store: &VersionedStore, document: Value) -> Result<(String, WriteReceipt)> {
    let record = validate(document)?;
    let id = record.object_id.clone();

    match store.insert_if_absent(id.clone(), record)? {
        InsertOutcome::Created(receipt) => {
            tracing::info!(id = %id, version = receipt.version, "Plan created");
            Ok((id, receipt))
        }
        InsertOutcome::AlreadyExists { version, .. } => {
            tracing::warn!(id = %id, version, "Plan already exists");
            Err(Error::Conflict(id).into())
        }
    }
}

/// Create or fully replace the plan stored under `id`.
pub fn handle_replace(store: &VersionedStore, id: &str, document: Value) -> Result<WriteReceipt> {
    let record = validate(document)?;
    if record.object_id != id {
        return Err(AppError::BadRequest(format!(
            "objectId '{}' does not match path id '{}'",
            record.object_id, id
        )));
    }

    let receipt = store.put(id, record)?;
    tracing::info!(id = %id, version = receipt.version, "Plan written");
    Ok(receipt)
}

/// Read a plan, honouring the client's change token.
pub fn handle_read(
    store: &VersionedStore,
    id: &str,
    if_none_match: Option<&ChangeToken>,
) -> Result<PlanRead> {
    match store.get(id, if_none_match) {
        ReadOutcome::Found { value, metadata } => Ok(PlanRead::Found {
            change_token: metadata.change_token.clone(),
            body: PlanBody {
                record: value,
                metadata,
            },
        }),
        ReadOutcome::NotModified { change_token } => Ok(PlanRead::NotModified(change_token)),
        ReadOutcome::NotFound => Err(Error::NotFound(id.to_string()).into()),
    }
}

/// Delete a plan.
pub fn handle_delete(store: &VersionedStore, id: &str) -> Result<()> {
    match store.delete(id) {
        DeleteOutcome::Deleted => {
            tracing::info!(id = %id, "Plan deleted");
            Ok(())
        }
        DeleteOutcome::NotFound => Err(Error::NotFound(id.to_string()).into()),
    }
}

/// List plan summaries, optionally filtered by organization.
pub fn handle_list(store: &VersionedStore, query: ListQuery) -> ListResponse {
    let data: Vec<_> = store
        .list()
        .into_iter()
        .filter(|summary| query.org.as_ref().map_or(true, |org| &summary.org == org))
        .collect();

    ListResponse {
        count: data.len(),
        data,
        timestamp: Utc::now(),
    }
}
