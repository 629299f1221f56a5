//! Administrative endpoints for students and scored entities.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::headers;
use super::AppState;
use crate::domain::models::{AssessmentCriterion, LearningOutcome, ReportOutcome, Student};

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    #[serde(rename = "studentName")]
    pub student_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCriterionRequest {
    pub name: String,
    pub max_marks: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateNamedRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    #[serde(rename = "insertedId")]
    pub inserted_id: i64,
}

impl CreatedResponse {
    fn new(message: &str, inserted_id: i64) -> (StatusCode, Json<Self>) {
        (
            StatusCode::CREATED,
            Json(Self {
                message: message.to_string(),
                inserted_id,
            }),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct StudentsResponse {
    #[serde(rename = "Students")]
    pub students: Vec<Student>,
}

#[derive(Debug, Serialize)]
pub struct CriteriaResponse {
    pub message: String,
    pub assessments: Vec<AssessmentCriterion>,
}

pub(super) async fn list_students(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<StudentsResponse>> {
    let cohort = headers::cohort(&headers)?;
    let students = state.catalog.students_in(&cohort).await?;
    Ok(Json(StudentsResponse { students }))
}

pub(super) async fn create_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let cohort = headers::cohort(&headers)?;
    let Json(req) = payload?;
    let student = state.catalog.register_student(&req.student_name, &cohort).await?;
    Ok(CreatedResponse::new("Student and record inserted successfully", student.id.0))
}

pub(super) async fn list_criteria(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<CriteriaResponse>> {
    let scope = headers::academic_scope(&headers)?;
    let assessments = state.catalog.criteria_in(&scope).await?;
    Ok(Json(CriteriaResponse {
        message: "Assessment criterias retrieved successfully".to_string(),
        assessments,
    }))
}

pub(super) async fn create_criterion(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateCriterionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let scope = headers::academic_scope(&headers)?;
    let Json(req) = payload?;
    let criterion = state
        .catalog
        .define_criterion(&req.name, req.max_marks, &scope)
        .await?;
    Ok(CreatedResponse::new("Assessment criterion added successfully", criterion.id.0))
}

pub(super) async fn list_learning_outcomes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<LearningOutcome>>> {
    let scope = headers::academic_scope(&headers)?;
    Ok(Json(state.catalog.learning_outcomes_in(&scope).await?))
}

pub(super) async fn create_learning_outcome(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateNamedRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let scope = headers::academic_scope(&headers)?;
    let Json(req) = payload?;
    let outcome = state.catalog.define_learning_outcome(&req.name, &scope).await?;
    Ok(CreatedResponse::new("Learning outcome added successfully", outcome.id.0))
}

pub(super) async fn list_report_outcomes(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ReportOutcome>>> {
    Ok(Json(state.catalog.report_outcomes().await?))
}

pub(super) async fn create_report_outcome(
    State(state): State<AppState>,
    payload: Result<Json<CreateNamedRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(req) = payload?;
    let outcome = state.catalog.define_report_outcome(&req.name).await?;
    Ok(CreatedResponse::new("Report outcome added successfully", outcome.id.0))
}
