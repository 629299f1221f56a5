//! Scope values travel as request headers. These helpers read and validate them.

use axum::http::HeaderMap;

use super::error::{ApiError, ApiResult};
use crate::domain::models::{AcademicScope, Cohort, EntityId, StudentId, TermScope};

fn raw<'a>(headers: &'a HeaderMap, name: &str) -> ApiResult<Option<&'a str>> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .map_err(|_| ApiError::invalid(format!("Header '{name}' is not valid text"))),
    }
}

pub fn required_str(headers: &HeaderMap, name: &str) -> ApiResult<String> {
    raw(headers, name)?
        .map(str::to_string)
        .ok_or_else(|| ApiError::invalid(format!("Missing required header: {name}")))
}

pub fn optional_i64(headers: &HeaderMap, name: &str) -> ApiResult<Option<i64>> {
    raw(headers, name)?
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ApiError::invalid(format!("Header '{name}' must be an integer, got '{s}'")))
        })
        .transpose()
}

pub fn required_i64(headers: &HeaderMap, name: &str) -> ApiResult<i64> {
    optional_i64(headers, name)?
        .ok_or_else(|| ApiError::invalid(format!("Missing required header: {name}")))
}

/// `subject`, `year` and `quarter`.
pub fn academic_scope(headers: &HeaderMap) -> ApiResult<AcademicScope> {
    Ok(AcademicScope::new(
        required_str(headers, "subject")?,
        required_i64(headers, "year")?,
        required_str(headers, "quarter")?,
    ))
}

/// `year`, `class` and `section`.
pub fn cohort(headers: &HeaderMap) -> ApiResult<Cohort> {
    Ok(Cohort::new(
        required_i64(headers, "year")?,
        required_i64(headers, "class")?,
        required_str(headers, "section")?,
    ))
}

/// `subject` and `quarter`, plus the cohort headers.
pub fn mapping_scope(headers: &HeaderMap) -> ApiResult<(TermScope, Cohort)> {
    let term = TermScope::new(required_str(headers, "subject")?, required_str(headers, "quarter")?);
    Ok((term, cohort(headers)?))
}

pub fn student_id(headers: &HeaderMap) -> ApiResult<StudentId> {
    required_i64(headers, "student_id").map(StudentId)
}

pub fn optional_entity(headers: &HeaderMap, name: &str) -> ApiResult<Option<EntityId>> {
    Ok(optional_i64(headers, name)?.map(EntityId))
}

pub fn required_entity(headers: &HeaderMap, name: &str) -> ApiResult<EntityId> {
    required_i64(headers, name).map(EntityId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn test_academic_scope() {
        let h = headers(&[("subject", "math"), ("year", "2024"), ("quarter", "Q1")]);
        assert_eq!(academic_scope(&h).unwrap(), AcademicScope::new("math", 2024, "Q1"));
    }

    #[test]
    fn test_missing_and_blank_headers() {
        let h = headers(&[("subject", "math"), ("year", "2024")]);
        assert!(academic_scope(&h).is_err());

        let h = headers(&[("subject", "  "), ("year", "2024"), ("quarter", "Q1")]);
        assert!(academic_scope(&h).is_err());
    }

    #[test]
    fn test_malformed_integer() {
        let h = headers(&[("year", "twenty"), ("class", "5"), ("section", "A")]);
        let err = cohort(&h).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_optional_entity() {
        assert_eq!(optional_entity(&HeaderMap::new(), "ac_id").unwrap(), None);
        let h = headers(&[("ac_id", "7")]);
        assert_eq!(optional_entity(&h, "ac_id").unwrap(), Some(EntityId(7)));
    }
}
