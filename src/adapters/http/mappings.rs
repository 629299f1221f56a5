//! Mapping submission (which triggers propagation) and mapping reads.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::headers;
use super::AppState;
use crate::domain::models::{EntityId, MappingBatch, MappingRecord, TierTransition};
use crate::services::PropagationRequest;

/// `{lo_id, data: [{ac_id, priority}]}`
#[derive(Debug, Deserialize)]
pub struct LoAcMappingRequest {
    pub lo_id: i64,
    pub data: Vec<AcPriority>,
}

#[derive(Debug, Deserialize)]
pub struct AcPriority {
    pub ac_id: i64,
    pub priority: String,
}

/// `{ro_id, data: [{lo_id, priority}]}`
#[derive(Debug, Deserialize)]
pub struct RoLoMappingRequest {
    pub ro_id: i64,
    pub data: Vec<LoPriority>,
}

#[derive(Debug, Deserialize)]
pub struct LoPriority {
    pub lo_id: i64,
    pub priority: String,
}

#[derive(Debug, Serialize)]
pub struct PropagationResponse {
    pub message: String,
    pub students_processed: usize,
}

#[derive(Debug, Serialize)]
pub struct MappingRow {
    pub parent_id: i64,
    pub child_id: i64,
    pub weight: f64,
    pub updated_at: String,
}

impl From<MappingRecord> for MappingRow {
    fn from(r: MappingRecord) -> Self {
        Self {
            parent_id: r.parent_id.0,
            child_id: r.child_id.0,
            weight: r.weight,
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MappingsResponse {
    pub mappings: Vec<MappingRow>,
}

async fn propagate(
    state: &AppState,
    headers: &HeaderMap,
    transition: TierTransition,
    batch: MappingBatch,
    message: &str,
) -> ApiResult<(StatusCode, Json<PropagationResponse>)> {
    let (term, cohort) = headers::mapping_scope(headers)?;
    let outcome = state
        .engine
        .propagate(PropagationRequest {
            transition,
            batch,
            term,
            cohort,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PropagationResponse {
            message: message.to_string(),
            students_processed: outcome.students_processed,
        }),
    ))
}

pub(super) async fn map_criteria(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LoAcMappingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PropagationResponse>)> {
    let Json(req) = payload?;
    let batch = MappingBatch::parse(
        EntityId(req.lo_id),
        req.data.into_iter().map(|d| (EntityId(d.ac_id), d.priority)),
    )?;
    propagate(
        &state,
        &headers,
        TierTransition::CriteriaToLearningOutcome,
        batch,
        "LO and AC mapping with weights saved successfully",
    )
    .await
}

pub(super) async fn map_learning_outcomes(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RoLoMappingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PropagationResponse>)> {
    let Json(req) = payload?;
    let batch = MappingBatch::parse(
        EntityId(req.ro_id),
        req.data.into_iter().map(|d| (EntityId(d.lo_id), d.priority)),
    )?;
    propagate(
        &state,
        &headers,
        TierTransition::LearningOutcomesToReportOutcome,
        batch,
        "RO and LO mapping with weights saved successfully",
    )
    .await
}

async fn read_mappings(
    state: &AppState,
    headers: &HeaderMap,
    transition: TierTransition,
) -> ApiResult<Json<MappingsResponse>> {
    let parent_id = headers::required_entity(headers, transition.parent().id_column())?;
    let rows = state.catalog.mappings_for(transition, parent_id).await?;
    Ok(Json(MappingsResponse {
        mappings: rows.into_iter().map(MappingRow::from).collect(),
    }))
}

pub(super) async fn get_lo_ac_mappings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<MappingsResponse>> {
    read_mappings(&state, &headers, TierTransition::CriteriaToLearningOutcome).await
}

pub(super) async fn get_ro_lo_mappings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<MappingsResponse>> {
    read_mappings(&state, &headers, TierTransition::LearningOutcomesToReportOutcome).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shapes() {
        let req: LoAcMappingRequest = serde_json::from_str(
            r#"{"lo_id": 1, "data": [{"ac_id": 2, "priority": "h"}, {"ac_id": 3, "priority": "l"}]}"#,
        )
        .unwrap();
        assert_eq!(req.data.len(), 2);

        let not_a_list: Result<RoLoMappingRequest, _> =
            serde_json::from_str(r#"{"ro_id": 1, "data": {"lo_id": 2, "priority": "h"}}"#);
        assert!(not_a_list.is_err());

        let no_parent: Result<LoAcMappingRequest, _> =
            serde_json::from_str(r#"{"data": [{"ac_id": 2, "priority": "h"}]}"#);
        assert!(no_parent.is_err());
    }
}
