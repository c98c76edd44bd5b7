//! Edge case tests for plan-engine
//!
//! These tests cover boundary conditions and unusual inputs across the
//! store, the validators and the cost calculator.

use plan_engine::{
    compute_cost, resolve_cost_share, ChangeToken, ConsistencyValidator, CostShare, DeleteOutcome,
    Error, FieldErrorKind, InsertOutcome, LinkedService, ReadOutcome, Record, ServiceIdentity,
    VersionedStore,
};
use serde_json::{json, Value};

const ORG: &str = "example.com";

fn plan_document(id: &str) -> Value {
    json!({
        "objectId": id,
        "_org": ORG,
        "objectType": "plan",
        "creationDate": "12-12-2017",
        "costShare": {
            "objectId": format!("{id}-cs"),
            "_org": ORG,
            "deductible": 2000,
            "copay": 23
        },
        "linkedServices": [
            {
                "objectId": format!("{id}-ls-0"),
                "_org": ORG,
                "linkedService": {"objectId": "svc-physical", "_org": ORG, "name": "Yearly physical"},
                "costShare": {"objectId": format!("{id}-ls-0-cs"), "_org": ORG, "deductible": 10, "copay": 0}
            },
            {
                "objectId": format!("{id}-ls-1"),
                "_org": ORG,
                "linkedService": {"objectId": "svc-vaccine", "_org": ORG, "name": "Well baby"},
                "costShare": {"objectId": format!("{id}-ls-1-cs"), "_org": ORG, "deductible": 175, "copay": 40}
            }
        ]
    })
}

fn validated(document: Value) -> Record {
    ConsistencyValidator::new()
        .validate_document(document)
        .expect("document should be valid")
}

// ============================================================================
// Store Edge Cases
// ============================================================================

#[test]
fn empty_and_unicode_keys() {
    let store = VersionedStore::new();
    let keys = ["", "日本語テスト", "🎉🚀", "with space", "Null\0Test"];

    for key in keys {
        let receipt = store.put(key, validated(plan_document("plan-1"))).unwrap();
        assert_eq!(receipt.version, 1, "key {key:?}");
    }

    assert_eq!(store.len(), keys.len());
    for key in keys {
        assert!(store.exists(key), "key {key:?}");
    }
}

#[test]
fn long_values_get_short_tokens() {
    let store: VersionedStore<Value> = VersionedStore::new();
    let long_string = "x".repeat(1024 * 1024);

    let receipt = store.put("big", json!({"blob": long_string})).unwrap();
    assert!(receipt.change_token.as_str().len() <= 8);

    match store.get("big", None) {
        ReadOutcome::Found { value, .. } => {
            assert_eq!(value["blob"].as_str().unwrap().len(), 1024 * 1024)
        }
        other => panic!("expected Found, got {other:?}"),
    }
}

#[test]
fn many_overwrites() {
    let store = VersionedStore::new();
    let record = validated(plan_document("plan-1"));

    let mut last = None;
    for _ in 0..1000 {
        last = Some(store.put("plan-1", record.clone()).unwrap());
    }
    assert_eq!(last.unwrap().version, 1000);
}

#[test]
fn empty_token_is_just_another_token() {
    let store = VersionedStore::new();
    store.put("plan-1", validated(plan_document("plan-1"))).unwrap();

    let empty = ChangeToken::from("");
    assert!(matches!(
        store.get("plan-1", Some(&empty)),
        ReadOutcome::Found { .. }
    ));
}

#[test]
fn delete_missing_key() {
    let store: VersionedStore = VersionedStore::new();
    assert_eq!(store.delete("never-written"), DeleteOutcome::NotFound);
    assert_eq!(store.delete("never-written"), DeleteOutcome::NotFound);
}

#[test]
fn insert_if_absent_after_delete() {
    let store = VersionedStore::new();
    let record = validated(plan_document("plan-1"));
    store.put("plan-1", record.clone()).unwrap();
    store.put("plan-1", record.clone()).unwrap();
    store.delete("plan-1");

    let outcome = store.insert_if_absent("plan-1", record).unwrap();
    assert!(matches!(outcome, InsertOutcome::Created(r) if r.version == 1));
}

#[test]
fn full_document_roundtrip_through_store() {
    let document = plan_document("plan-1");
    let store = VersionedStore::new();
    store.put("plan-1", validated(document.clone())).unwrap();

    let ReadOutcome::Found { value, .. } = store.get("plan-1", None) else {
        panic!("expected Found");
    };
    let mut written = serde_json::to_value(&value).unwrap();

    // Integers come back as floats for the two amount fields only.
    written["costShare"]["deductible"] = json!(2000);
    written["costShare"]["copay"] = json!(23);
    for (i, (d, c)) in [(10, 0), (175, 40)].into_iter().enumerate() {
        written["linkedServices"][i]["costShare"]["deductible"] = json!(d);
        written["linkedServices"][i]["costShare"]["copay"] = json!(c);
    }
    assert_eq!(written, document);
}

// ============================================================================
// Validation Edge Cases
// ============================================================================

#[test]
fn many_linked_services() {
    let mut document = plan_document("plan-1");
    let services: Vec<Value> = (0..500)
        .map(|i| {
            json!({
                "objectId": format!("ls-{i}"),
                "_org": ORG,
                "linkedService": {"objectId": format!("svc-{i}"), "_org": ORG},
                "costShare": {"objectId": format!("cs-{i}"), "_org": ORG, "deductible": i, "copay": 1}
            })
        })
        .collect();
    document["linkedServices"] = Value::Array(services);

    let record = validated(document);
    assert_eq!(record.linked_services.len(), 500);
}

#[test]
fn empty_linked_services() {
    let mut document = plan_document("plan-1");
    document["linkedServices"] = json!([]);
    assert!(validated(document).linked_services.is_empty());
}

#[test]
fn org_case_matters() {
    let mut document = plan_document("plan-1");
    document["costShare"]["_org"] = json!("Example.com");

    let errors = ConsistencyValidator::new()
        .validate_document(document)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "/costShare/_org");
}

#[test]
fn every_error_is_reported() {
    let mut document = plan_document("plan-1");
    document["linkedServices"][0]["_org"] = json!("other.org");
    document["linkedServices"][1]["costShare"]["_org"] = json!("other.org");
    document["linkedServices"][1]["linkedService"]["objectId"] = json!("svc-physical");
    document["creationDate"] = json!("2017-12-12");

    let errors = ConsistencyValidator::new()
        .validate_document(document)
        .unwrap_err();
    let summary: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.kind)).collect();
    assert_eq!(
        summary,
        vec![
            ("/linkedServices/0/_org", FieldErrorKind::OrgMismatch),
            ("/linkedServices/1/costShare/_org", FieldErrorKind::OrgMismatch),
            ("/linkedServices/1/linkedService/objectId", FieldErrorKind::DuplicateId),
            ("/creationDate", FieldErrorKind::DateFormat),
        ]
    );
}

#[test]
fn validation_is_repeatable() {
    let mut document = plan_document("plan-1");
    document["linkedServices"][1]["objectId"] = json!("plan-1");
    let record: Record = serde_json::from_value(document).unwrap();

    let validator = ConsistencyValidator::new();
    let first = validator.validate(&record).unwrap_err();
    for _ in 0..10 {
        assert_eq!(validator.validate(&record).unwrap_err(), first);
    }
}

#[test]
fn leap_day_boundaries() {
    let validator = ConsistencyValidator::new();
    let base = Record::new("plan-1", ORG, CostShare::new("cs-1", ORG, 1.0, 1.0));

    for ok in ["02-29-2000", "02-29-2024", "12-31-9999", "01-01-0001"] {
        assert!(
            validator.validate(&base.clone().with_creation_date(ok)).is_ok(),
            "{ok}"
        );
    }
    for bad in ["02-29-1900", "02-29-2023", "04-31-2024", "00-01-2024", "01-00-2024"] {
        let errors = validator
            .validate(&base.clone().with_creation_date(bad))
            .unwrap_err();
        assert_eq!(errors[0].kind, FieldErrorKind::InvalidDate, "{bad}");
    }
}

#[test]
fn typed_conversion_reports_shape_errors() {
    let result = Record::from_document(json!({
        "objectId": 42,
        "_org": ORG,
        "costShare": {"objectId": "cs-1", "_org": ORG, "deductible": "a lot", "copay": 1}
    }));
    let Err(Error::Validation(errors)) = result else {
        panic!("expected validation failure");
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["/objectId", "/costShare/deductible"]);
}

// ============================================================================
// Cost Edge Cases
// ============================================================================

#[test]
fn fractional_amounts() {
    let share = CostShare::new("cs", ORG, 0.5, 0.25);
    let result = compute_cost(1.0, &share).unwrap();
    assert_eq!(result.patient_total, 0.75);
    assert_eq!(result.insurer_pays, 0.25);
}

#[test]
fn zero_deductible_zero_copay() {
    let share = CostShare::new("cs", ORG, 0.0, 0.0);
    let result = compute_cost(250.0, &share).unwrap();
    assert_eq!(result.patient_total, 0.0);
    assert_eq!(result.insurer_pays, 250.0);
}

#[test]
fn override_from_stored_plan() {
    let store = VersionedStore::new();
    store.put("plan-1", validated(plan_document("plan-1"))).unwrap();

    let ReadOutcome::Found { value, .. } = store.get("plan-1", None) else {
        panic!("expected Found");
    };

    let vaccine = resolve_cost_share(&value, "svc-vaccine");
    assert_eq!(vaccine.object_id, "plan-1-ls-1-cs");
    let result = compute_cost(1000.0, vaccine).unwrap();
    assert_eq!(result.patient_total, 215.0);
    assert_eq!(result.insurer_pays, 785.0);

    let other = resolve_cost_share(&value, "svc-unknown");
    assert_eq!(other.object_id, "plan-1-cs");
    let result = compute_cost(1000.0, other).unwrap();
    assert_eq!(result.patient_total, 1000.0);
    assert_eq!(result.insurer_pays, 0.0);
}

#[test]
fn override_with_linked_service_builder() {
    let record = Record::new("plan-1", ORG, CostShare::new("cs-1", ORG, 100.0, 20.0))
        .with_linked_service(LinkedService::new(
            "ls-1",
            ORG,
            ServiceIdentity::new("svc-1", ORG).with_name("Lab work"),
            CostShare::new("cs-2", ORG, 0.0, 0.0),
        ));

    let result = compute_cost(80.0, resolve_cost_share(&record, "svc-1")).unwrap();
    assert_eq!(result.insurer_pays, 80.0);
}
