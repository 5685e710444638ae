use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use super::metrics::record_query_error;
use crate::analytics::QueryError;

/// Every variant is the caller's fault and maps to `400 Bad Request`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{source}")]
    Query {
        parameter: &'static str,
        source: QueryError,
    },

    #[error("Malformed query string: {0}")]
    MalformedQuery(String),
}

impl ApiError {
    /// Reports `source` against a request parameter other than the one the
    /// engine knows it by.
    pub fn for_parameter(parameter: &'static str, source: QueryError) -> ApiError {
        ApiError::Query { parameter, source }
    }

    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            ApiError::Query { parameter, .. } => Some(parameter),
            ApiError::MalformedQuery(_) => None,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(source: QueryError) -> Self {
        ApiError::Query {
            parameter: source.parameter(),
            source,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedQuery(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    error: String,
    parameter: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let parameter = self.parameter();
        record_query_error(parameter.unwrap_or("query_string"));

        let body = ErrorBody {
            status: "error",
            error: self.to_string(),
            parameter,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
