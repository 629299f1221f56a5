//! Criterion mark submission and per-tier score reads.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ApiResult;
use super::headers;
use super::AppState;
use crate::domain::models::{EntityId, MarkSubmission, ScoreRecord, StudentId, Tier};

/// Request to record a criterion mark.
#[derive(Debug, Deserialize)]
pub struct SubmitMarkRequest {
    pub student_id: i64,
    pub ac_id: i64,
    pub obtained_marks: f64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub(super) async fn submit_mark(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitMarkRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let scope = headers::academic_scope(&headers)?;
    let Json(req) = payload?;

    state
        .normalizer
        .record(MarkSubmission {
            student_id: StudentId(req.student_id),
            criterion_id: EntityId(req.ac_id),
            obtained_marks: req.obtained_marks,
            scope,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Normalized score saved successfully".to_string(),
        }),
    ))
}

/// One score row keyed the way its tier names ids (`ac_id`, `lo_id`, `ro_id`).
fn score_row(tier: Tier, record: &ScoreRecord) -> Value {
    let mut row = Map::new();
    row.insert("student_id".to_string(), Value::from(record.student_id.0));
    row.insert(tier.id_column().to_string(), Value::from(record.entity_id.0));
    row.insert("value".to_string(), Value::from(record.value));
    Value::Object(row)
}

async fn read_scores(state: &AppState, headers: &HeaderMap, tier: Tier) -> ApiResult<Vec<Value>> {
    let student_id = headers::student_id(headers)?;
    let entity_id = headers::optional_entity(headers, tier.id_column())?;
    let scores = state.reader.scores_for(tier, student_id, entity_id).await?;
    Ok(scores.iter().map(|s| score_row(tier, s)).collect())
}

pub(super) async fn get_ac_scores(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let scores = read_scores(&state, &headers, Tier::Criterion).await?;
    Ok(Json(serde_json::json!({
        "message": "Score(s) fetched successfully.",
        "scores": scores,
    })))
}

pub(super) async fn get_lo_scores(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let scores = read_scores(&state, &headers, Tier::LearningOutcome).await?;
    Ok(Json(serde_json::json!({ "lo_scores": scores })))
}

pub(super) async fn get_ro_scores(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let scores = read_scores(&state, &headers, Tier::ReportOutcome).await?;
    Ok(Json(serde_json::json!({ "ro_scores": scores })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_score_row_uses_tier_id_column() {
        let record = ScoreRecord {
            student_id: StudentId(3),
            entity_id: EntityId(9),
            value: 0.25,
            updated_at: Utc::now(),
        };
        let row = score_row(Tier::LearningOutcome, &record);
        assert_eq!(row["student_id"], 3);
        assert_eq!(row["lo_id"], 9);
        assert_eq!(row["value"], 0.25);
        assert!(row.get("ac_id").is_none());
    }

    #[test]
    fn test_submit_request_requires_all_fields() {
        let ok: Result<SubmitMarkRequest, _> =
            serde_json::from_str(r#"{"student_id": 1, "ac_id": 2, "obtained_marks": 40}"#);
        assert!(ok.is_ok());

        let missing: Result<SubmitMarkRequest, _> = serde_json::from_str(r#"{"student_id": 1, "ac_id": 2}"#);
        assert!(missing.is_err());
    }
}
