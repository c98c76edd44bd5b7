//! Cost handler - splits a claim using a stored plan's cost shares.

use crate::error::{AppError, Result};
use plan_engine::{
    compute_cost, resolve_cost_share, CostBreakdown, CostShare, Error, ReadOutcome, VersionedStore,
};
use serde::{Deserialize, Serialize};

/// Query parameters for a cost calculation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostQuery {
    pub service_id: Option<String>,
    pub claim_amount: Option<f64>,
}

/// Response for a cost calculation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResponse {
    pub plan_id: String,
    pub service_id: String,
    pub claim_amount: f64,
    /// Whether a linked service replaced the plan's cost share
    pub overridden: bool,
    pub cost_share: CostShare,
    pub breakdown: CostBreakdown,
}

/// Compute the cost split for one service of a stored plan.
pub fn handle_cost(store: &VersionedStore, plan_id: &str, query: CostQuery) -> Result<CostResponse> {
    let service_id = query
        .service_id
        .ok_or_else(|| AppError::BadRequest("serviceId query parameter is required".to_string()))?;
    let claim_amount = query
        .claim_amount
        .ok_or_else(|| AppError::BadRequest("claimAmount query parameter is required".to_string()))?;

    let record = match store.get(plan_id, None) {
        ReadOutcome::Found { value, .. } => value,
        _ => return Err(Error::NotFound(plan_id.to_string()).into()),
    };

    let cost_share = resolve_cost_share(&record, &service_id);
    let breakdown = compute_cost(claim_amount, cost_share)?;

    tracing::debug!(
        plan_id = %plan_id,
        service_id = %service_id,
        claim_amount,
        insurer_pays = breakdown.insurer_pays,
        "Computed cost"
    );

    Ok(CostResponse {
        plan_id: plan_id.to_string(),
        overridden: !std::ptr::eq(cost_share, &record.cost_share),
        cost_share: cost_share.clone(),
        service_id,
        claim_amount,
        breakdown,
    })
}
