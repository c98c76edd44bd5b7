//! Consistency checks over a plan's object graph.
//!
//! The graph is walked once, depth first, in a fixed order: the root, its
//! cost share, then every linked service entry followed by its service
//! identity and its cost share. Errors are reported grouped by check
//! (organization tags, then identifiers, then the date) and within a group in
//! walk order, so the same document always yields the same list.

use crate::error::{FieldError, FieldErrorKind};
use crate::{Error, Record};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;

/// A `_org`/`objectId` carrying object found during the walk.
struct Node<'a> {
    path: String,
    object_id: &'a str,
    org: &'a str,
}

fn walk(record: &Record) -> Vec<Node<'_>> {
    let mut nodes = Vec::with_capacity(2 + record.linked_services.len() * 3);
    nodes.push(Node {
        path: String::new(),
        object_id: &record.object_id,
        org: &record.org,
    });
    nodes.push(Node {
        path: "/costShare".to_string(),
        object_id: &record.cost_share.object_id,
        org: &record.cost_share.org,
    });

    for (index, entry) in record.linked_services.iter().enumerate() {
        let base = format!("/linkedServices/{index}");
        nodes.push(Node {
            path: base.clone(),
            object_id: &entry.object_id,
            org: &entry.org,
        });
        nodes.push(Node {
            path: format!("{base}/linkedService"),
            object_id: &entry.linked_service.object_id,
            org: &entry.linked_service.org,
        });
        nodes.push(Node {
            path: format!("{base}/costShare"),
            object_id: &entry.cost_share.object_id,
            org: &entry.cost_share.org,
        });
    }

    nodes
}

/// Stateless validator for organization, identifier and date consistency.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a typed record, collecting every failure.
    pub fn validate(&self, record: &Record) -> Result<(), Vec<FieldError>> {
        let mut org_errors = Vec::new();
        let mut id_errors = Vec::new();
        let mut seen = HashSet::new();

        for node in walk(record) {
            if node.org != record.org {
                org_errors.push(FieldError::new(
                    format!("{}/_org", node.path),
                    FieldErrorKind::OrgMismatch,
                    format!(
                        "organization '{}' does not match root organization '{}'",
                        node.org, record.org
                    ),
                ));
            }
            if !seen.insert(node.object_id) {
                id_errors.push(FieldError::new(
                    format!("{}/objectId", node.path),
                    FieldErrorKind::DuplicateId,
                    format!("duplicate objectId '{}'", node.object_id),
                ));
            }
        }

        let mut errors = org_errors;
        errors.append(&mut id_errors);
        if let Some(date) = &record.creation_date {
            if let Err(err) = check_date(date) {
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Schema check, typing and consistency check in one step.
    ///
    /// Shape failures are returned alone; consistency is only checked on a
    /// document that could be typed.
    pub fn validate_document(&self, document: Value) -> Result<Record, Vec<FieldError>> {
        let record = match Record::from_document(document) {
            Ok(record) => record,
            Err(Error::Validation(errors)) => return Err(errors),
            Err(e) => {
                return Err(vec![FieldError::new("/", FieldErrorKind::Schema, e.to_string())])
            }
        };
        self.validate(&record)?;
        Ok(record)
    }
}

/// Check a `MM-DD-YYYY` date string.
pub fn check_date(value: &str) -> Result<NaiveDate, FieldError> {
    const FIELD: &str = "/creationDate";

    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(FieldError::new(
            FIELD,
            FieldErrorKind::DateFormat,
            format!("'{value}' does not match MM-DD-YYYY"),
        ));
    }

    // All digits, so these parses cannot fail.
    let month: u32 = value[0..2].parse().unwrap_or(0);
    let day: u32 = value[3..5].parse().unwrap_or(0);
    let year: i32 = value[6..10].parse().unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        FieldError::new(
            FIELD,
            FieldErrorKind::InvalidDate,
            format!("'{value}' is not a valid calendar date"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CostShare, LinkedService, ServiceIdentity};
    use serde_json::json;

    const ORG: &str = "example.com";

    fn service(index: usize, org: &str) -> LinkedService {
        LinkedService::new(
            format!("ls-{index}"),
            org,
            ServiceIdentity::new(format!("svc-{index}"), org),
            CostShare::new(format!("ls-cs-{index}"), org, 10.0, 0.0),
        )
    }

    fn plan() -> Record {
        Record::new("plan-1", ORG, CostShare::new("cs-1", ORG, 2000.0, 23.0))
            .with_linked_service(service(0, ORG))
            .with_linked_service(service(1, ORG))
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn walk_order() {
        let record = plan();
        let paths: Vec<_> = walk(&record).into_iter().map(|n| n.path).collect();
        assert_eq!(
            paths,
            vec![
                "",
                "/costShare",
                "/linkedServices/0",
                "/linkedServices/0/linkedService",
                "/linkedServices/0/costShare",
                "/linkedServices/1",
                "/linkedServices/1/linkedService",
                "/linkedServices/1/costShare",
            ]
        );
    }

    #[test]
    fn consistent_record_passes() {
        assert!(ConsistencyValidator::new().validate(&plan()).is_ok());
    }

    #[test]
    fn linked_service_org_mismatch() {
        let mut record = plan();
        record.linked_services[1].org = "other.org".into();

        let errors = ConsistencyValidator::new().validate(&record).unwrap_err();
        assert_eq!(fields(&errors), vec!["/linkedServices/1/_org"]);
        assert_eq!(errors[0].kind, FieldErrorKind::OrgMismatch);
    }

    #[test]
    fn all_org_mismatches_in_walk_order() {
        let mut record = plan();
        record.cost_share.org = "a".into();
        record.linked_services[0].cost_share.org = "b".into();
        record.linked_services[0].linked_service.org = "c".into();

        let errors = ConsistencyValidator::new().validate(&record).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec![
                "/costShare/_org",
                "/linkedServices/0/linkedService/_org",
                "/linkedServices/0/costShare/_org",
            ]
        );
    }

    #[test]
    fn duplicate_object_id() {
        let mut record = plan();
        record.linked_services[1].cost_share.object_id = "cs-1".into();

        let errors = ConsistencyValidator::new().validate(&record).unwrap_err();
        assert_eq!(fields(&errors), vec!["/linkedServices/1/costShare/objectId"]);
        assert_eq!(errors[0].kind, FieldErrorKind::DuplicateId);
        assert_eq!(errors[0].message, "duplicate objectId 'cs-1'");
    }

    #[test]
    fn root_id_reused_by_child() {
        let mut record = plan();
        record.linked_services[0].linked_service.object_id = "plan-1".into();

        let errors = ConsistencyValidator::new().validate(&record).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["/linkedServices/0/linkedService/objectId"]
        );
    }

    #[test]
    fn org_errors_precede_id_errors_and_date() {
        let mut record = plan().with_creation_date("13-01-2024");
        record.linked_services[1].linked_service.object_id = "svc-0".into();
        record.linked_services[1].org = "other.org".into();

        let errors = ConsistencyValidator::new().validate(&record).unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldErrorKind::OrgMismatch,
                FieldErrorKind::DuplicateId,
                FieldErrorKind::InvalidDate,
            ]
        );
    }

    #[test]
    fn date_checks() {
        assert!(check_date("02-29-2024").is_ok());
        assert!(check_date("12-12-2017").is_ok());

        let err = check_date("02-30-2024").unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::InvalidDate);

        let err = check_date("02-29-2023").unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::InvalidDate);

        let err = check_date("2024-02-29").unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::DateFormat);

        for bad in ["2-29-2024", "02-29-24", "02/29/2024", "0a-29-2024", "02-29-2024 "] {
            assert_eq!(
                check_date(bad).unwrap_err().kind,
                FieldErrorKind::DateFormat,
                "{bad}"
            );
        }
        assert_eq!(
            check_date("00-10-2024").unwrap_err().kind,
            FieldErrorKind::InvalidDate
        );
    }

    #[test]
    fn date_field_on_record() {
        let validator = ConsistencyValidator::new();
        assert!(validator.validate(&plan().with_creation_date("02-29-2024")).is_ok());

        let errors = validator
            .validate(&plan().with_creation_date("02-30-2024"))
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["/creationDate"]);
    }

    #[test]
    fn validate_document_returns_typed_record() {
        let record = ConsistencyValidator::new()
            .validate_document(json!({
                "objectId": "plan-1",
                "_org": ORG,
                "costShare": {"objectId": "cs-1", "_org": ORG, "deductible": 1, "copay": 2}
            }))
            .unwrap();
        assert_eq!(record.object_id, "plan-1");
    }

    #[test]
    fn validate_document_stops_at_shape_errors() {
        let errors = ConsistencyValidator::new()
            .validate_document(json!({"objectId": "plan-1", "_org": ORG}))
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["/costShare"]);
    }
}
