//! # Plan Engine
//!
//! Core logic for a small plan-record API: a versioned store with change
//! tokens, consistency validation of nested plan documents, and the cost
//! split between patient and insurer.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or HTTP
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Typed**: Documents are checked and typed before they reach the store
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is a plan: a root `objectId` and `_org`, a default
//! [`CostShare`], and optional [`LinkedService`] entries that may override the
//! cost share for one service.
//!
//! ### Versioned store
//!
//! [`VersionedStore`] keeps one entry per key with [`Metadata`]: creation and
//! update timestamps, a version starting at 1, and a [`ChangeToken`] used for
//! conditional reads. [`VersionedStore::insert_if_absent`] is the atomic
//! create-or-conflict primitive.
//!
//! ### Validation
//!
//! [`schema::plan_schema`] checks document shape. [`ConsistencyValidator`]
//! checks that all `_org` tags agree, that every `objectId` is unique within
//! the document and that `creationDate` is a real `MM-DD-YYYY` date.
//!
//! ### Cost sharing
//!
//! [`resolve_cost_share`] picks the cost share for a service and
//! [`compute_cost`] splits a claim amount.
//!
//! ## Quick Start
//!
//! ```rust
//! use plan_engine::{
//!     compute_cost, resolve_cost_share, ConsistencyValidator, ReadOutcome, VersionedStore,
//! };
//! use serde_json::json;
//!
//! // 1. Validate an incoming document into a typed record
//! let record = ConsistencyValidator::new()
//!     .validate_document(json!({
//!         "objectId": "plan-1",
//!         "_org": "example.com",
//!         "costShare": {"objectId": "cs-1", "_org": "example.com", "deductible": 100, "copay": 20}
//!     }))
//!     .unwrap();
//!
//! // 2. Store it
//! let store = VersionedStore::new();
//! let receipt = store.put("plan-1", record).unwrap();
//! assert_eq!(receipt.version, 1);
//!
//! // 3. Conditional read with the token
//! let outcome = store.get("plan-1", Some(&receipt.change_token));
//! assert!(matches!(outcome, ReadOutcome::NotModified { .. }));
//!
//! // 4. Cost for a claim
//! if let ReadOutcome::Found { value, .. } = store.get("plan-1", None) {
//!     let breakdown = compute_cost(500.0, resolve_cost_share(&value, "any")).unwrap();
//!     assert_eq!(breakdown.insurer_pays, 380.0);
//! }
//! ```

pub mod cost;
pub mod error;
pub mod record;
pub mod schema;
pub mod store;
pub mod token;
pub mod validate;

// Re-export main types at crate root
pub use cost::{compute_cost, resolve_cost_share, CostBreakdown};
pub use error::{Error, FieldError, FieldErrorKind};
pub use record::{CostShare, LinkedService, Metadata, Record, ServiceIdentity};
pub use store::{
    DeleteOutcome, InsertOutcome, ReadOutcome, RecordSummary, VersionedStore, WriteReceipt,
};
pub use token::ChangeToken;
pub use validate::ConsistencyValidator;

/// Type aliases for clarity
pub type Key = String;
pub type Version = u64;
pub type Timestamp = u64;
