//! Patient/insurer cost split for a claim.

use crate::{error::Result, CostShare, Error, Record};
use serde::{Deserialize, Serialize};

/// How a claim amount is split between patient and insurer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub patient_total: f64,
    pub deductible_portion: f64,
    pub copay_portion: f64,
    pub insurer_pays: f64,
}

/// Split `claim_amount` according to `cost_share`.
///
/// A claim at or below the deductible is paid entirely by the patient and
/// the copay is waived. Above it the patient pays deductible plus copay and
/// the insurer the rest, never less than zero.
pub fn compute_cost(claim_amount: f64, cost_share: &CostShare) -> Result<CostBreakdown> {
    if !claim_amount.is_finite() || claim_amount < 0.0 {
        return Err(Error::InvalidClaimAmount(claim_amount));
    }

    if claim_amount <= cost_share.deductible {
        return Ok(CostBreakdown {
            patient_total: claim_amount,
            deductible_portion: claim_amount,
            copay_portion: 0.0,
            insurer_pays: 0.0,
        });
    }

    let patient_total = cost_share.deductible + cost_share.copay;
    Ok(CostBreakdown {
        patient_total,
        deductible_portion: cost_share.deductible,
        copay_portion: cost_share.copay,
        insurer_pays: (claim_amount - patient_total).max(0.0),
    })
}

/// Pick the cost share that applies to `service_id`.
///
/// The first linked service whose identity has this `objectId` overrides the
/// plan's cost share; otherwise the plan's own cost share applies.
pub fn resolve_cost_share<'a>(record: &'a Record, service_id: &str) -> &'a CostShare {
    record
        .linked_services
        .iter()
        .find(|entry| entry.linked_service.object_id == service_id)
        .map(|entry| &entry.cost_share)
        .unwrap_or(&record.cost_share)
}
