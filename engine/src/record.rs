//! Typed plan records and their store metadata.
//!
//! Incoming documents are checked against [`crate::schema::plan_schema`] and
//! then deserialized into these types, so nothing untyped reaches the store.
//! Fields the types do not name are kept in `extra` and written back out
//! verbatim.

use crate::error::{FieldError, FieldErrorKind, Result};
use crate::{schema, ChangeToken, Error, Timestamp, Version};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which reads attach [`Metadata`] to a record body.
pub const METADATA_FIELD: &str = "metadata";

/// Deductible and copay parameters of a plan or of a single linked service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostShare {
    pub object_id: String,
    #[serde(rename = "_org")]
    pub org: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    pub deductible: f64,
    pub copay: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CostShare {
    pub fn new(
        object_id: impl Into<String>,
        org: impl Into<String>,
        deductible: f64,
        copay: f64,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            org: org.into(),
            object_type: None,
            deductible,
            copay,
            extra: Map::new(),
        }
    }
}

/// Identity of the service a linked-service entry refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIdentity {
    pub object_id: String,
    #[serde(rename = "_org")]
    pub org: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceIdentity {
    pub fn new(object_id: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            org: org.into(),
            object_type: None,
            name: None,
            extra: Map::new(),
        }
    }

    /// Builder-style method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A service attached to a plan, optionally overriding its cost share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedService {
    pub object_id: String,
    #[serde(rename = "_org")]
    pub org: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    pub linked_service: ServiceIdentity,
    pub cost_share: CostShare,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LinkedService {
    pub fn new(
        object_id: impl Into<String>,
        org: impl Into<String>,
        linked_service: ServiceIdentity,
        cost_share: CostShare,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            org: org.into(),
            object_type: None,
            linked_service,
            cost_share,
            extra: Map::new(),
        }
    }
}

/// A plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Root identifier, also used as the store key by the HTTP adapter
    pub object_id: String,
    /// Organizational tag every sub-object must repeat
    #[serde(rename = "_org")]
    pub org: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    /// `MM-DD-YYYY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    /// Default cost share for every service of the plan
    pub cost_share: CostShare,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_services: Vec<LinkedService>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a record with no linked services.
    pub fn new(object_id: impl Into<String>, org: impl Into<String>, cost_share: CostShare) -> Self {
        Self {
            object_id: object_id.into(),
            org: org.into(),
            object_type: None,
            name: None,
            record_type: None,
            creation_date: None,
            cost_share,
            linked_services: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style method to append a linked service.
    pub fn with_linked_service(mut self, service: LinkedService) -> Self {
        self.linked_services.push(service);
        self
    }

    /// Builder-style method to set the creation date.
    pub fn with_creation_date(mut self, date: impl Into<String>) -> Self {
        self.creation_date = Some(date.into());
        self
    }

    /// Builder-style method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check an untyped document against the plan schema and convert it.
    ///
    /// A top-level `metadata` object is owned by the store and is dropped
    /// before checking, so a body read from the server can be written back.
    /// Every shape problem is reported at once as [`Error::Validation`].
    /// Domain consistency is not checked here, see
    /// [`crate::ConsistencyValidator`].
    pub fn from_document(mut document: Value) -> Result<Self> {
        if let Value::Object(fields) = &mut document {
            fields.remove(METADATA_FIELD);
        }

        let errors = schema::plan_schema().check(&document);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        serde_json::from_value(document).map_err(|e| {
            Error::Validation(vec![FieldError::new("/", FieldErrorKind::Schema, e.to_string())])
        })
    }
}

/// Store bookkeeping for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// When the key was first written (milliseconds since epoch)
    pub created_at: Timestamp,
    /// When the key was last written (milliseconds since epoch)
    pub updated_at: Timestamp,
    /// Starts at 1, incremented on every overwrite
    pub version: Version,
    pub change_token: ChangeToken,
}

impl Metadata {
    /// Metadata for the first write of a key.
    pub fn initial(timestamp: Timestamp, change_token: ChangeToken) -> Self {
        Self {
            created_at: timestamp,
            updated_at: timestamp,
            version: 1,
            change_token,
        }
    }

    /// Metadata for the write following this one. Keeps `created_at`.
    pub fn successor(&self, timestamp: Timestamp, change_token: ChangeToken) -> Self {
        Self {
            created_at: self.created_at,
            updated_at: timestamp,
            version: self.version + 1,
            change_token,
        }
    }
}
