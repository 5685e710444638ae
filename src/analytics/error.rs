use thiserror::Error;

/// Errors caused by request parameters. They never indicate a data problem,
/// so a serving layer can always map them to a client error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid metric {0:?}, expected one of: protein, carbs, fat")]
    InvalidMetric(String),

    #[error("Invalid limit {0}, must be a positive integer")]
    InvalidLimit(String),

    #[error("Invalid {parameter} {value}, must be at least 1")]
    InvalidPagination {
        parameter: &'static str,
        value: String,
    },
}

impl QueryError {
    /// Name of the offending request parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            QueryError::InvalidMetric(_) => "metric",
            QueryError::InvalidLimit(_) => "limit",
            QueryError::InvalidPagination { parameter, .. } => parameter,
        }
    }
}
