//! Nutrition API routes

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;

use super::error::ApiError;
use super::http_cache;
use super::state::{GuardedEngine, ServerState};
use super::ServerConfig;
use crate::analytics::{
    DietClusters, DietSummary, Insights, NutritionEngine, Page, QueryError, RankedRecipe,
    RecipeStatistics, DEFAULT_TOP_LIMIT, DEFAULT_TOP_PER_DIET,
};
use crate::dataset::{Metric, RecipeRecord};

const SUCCESS: &str = "success";

/// Recipes returned by `/recipes` when `limit` is not given.
pub const DEFAULT_RECIPES_LIMIT: i64 = 100;

// Numeric parameters stay text until a handler parses them under their own
// name.

#[derive(Deserialize, Debug)]
struct LimitQuery {
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TopQuery {
    pub metric: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RecipesQuery {
    pub diet_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Deserialize, Debug)]
struct InsightsQuery {
    pub per_diet: Option<String>,
}

#[derive(Serialize)]
struct SummaryResponse<'a> {
    status: &'static str,
    total_records: usize,
    valid_records: usize,
    skipped_rows: usize,
    diet_types: usize,
    data: &'a [DietSummary],
}

#[derive(Serialize)]
struct TopResponse<'a> {
    status: &'static str,
    metric: Metric,
    count: usize,
    data: Vec<RankedRecipe<'a>>,
}

#[derive(Serialize)]
struct RecipesResponse<'a> {
    status: &'static str,
    count: usize,
    recipes: Vec<&'a RecipeRecord>,
    statistics: RecipeStatistics,
}

#[derive(Serialize)]
struct ClustersResponse {
    status: &'static str,
    clusters_identified: usize,
    #[serde(flatten)]
    clusters: DietClusters,
}

#[derive(Serialize)]
struct PageResponse<'a> {
    status: &'static str,
    #[serde(flatten)]
    page: Page<'a>,
}

#[derive(Serialize)]
struct InsightsResponse<'a> {
    status: &'static str,
    #[serde(flatten)]
    insights: Insights<'a>,
}

fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    Ok(query?.0)
}

/// Integers outside the `i64` range saturate instead of failing.
fn parse_integer(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn limit_param(raw: Option<&str>, default: i64) -> Result<i64, QueryError> {
    match raw {
        None => Ok(default),
        Some(raw) => parse_integer(raw).ok_or_else(|| QueryError::InvalidLimit(raw.to_owned())),
    }
}

fn page_param(
    parameter: &'static str,
    raw: Option<&str>,
    default: i64,
) -> Result<i64, QueryError> {
    match raw {
        None => Ok(default),
        Some(raw) => parse_integer(raw).ok_or_else(|| QueryError::InvalidPagination {
            parameter,
            value: raw.to_owned(),
        }),
    }
}

fn top_response(
    engine: &NutritionEngine,
    metric: Metric,
    limit: Option<&str>,
) -> Result<Response, ApiError> {
    let limit = limit_param(limit, DEFAULT_TOP_LIMIT)?;
    let data = engine.top_by_metric(metric, limit)?;
    Ok(Json(TopResponse {
        status: SUCCESS,
        metric,
        count: data.len(),
        data,
    })
    .into_response())
}

async fn get_summary(State(engine): State<GuardedEngine>) -> Response {
    let report = engine.report();
    let data = engine.summarize();
    Json(SummaryResponse {
        status: SUCCESS,
        total_records: report.total_rows,
        valid_records: report.valid_rows,
        skipped_rows: report.skipped_rows(),
        diet_types: data.len(),
        data,
    })
    .into_response()
}

async fn get_top_protein(
    State(engine): State<GuardedEngine>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    top_response(&engine, Metric::Protein, query.limit.as_deref())
}

async fn get_top_recipes(
    State(engine): State<GuardedEngine>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    let metric = match query.metric.as_deref() {
        Some(raw) => raw.parse::<Metric>()?,
        None => Metric::default(),
    };
    top_response(&engine, metric, query.limit.as_deref())
}

async fn get_recipes(
    State(engine): State<GuardedEngine>,
    query: Result<Query<RecipesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    let limit = limit_param(query.limit.as_deref(), DEFAULT_RECIPES_LIMIT)?;
    let take = usize::try_from(limit)
        .ok()
        .filter(|l| *l >= 1)
        .ok_or_else(|| QueryError::InvalidLimit(limit.to_string()))?;

    let matching = engine.filter(query.diet_type.as_deref(), query.search.as_deref());
    let statistics = engine.statistics(matching.iter().copied());
    let recipes: Vec<&RecipeRecord> = matching.into_iter().take(take).collect();

    Ok(Json(RecipesResponse {
        status: SUCCESS,
        count: recipes.len(),
        recipes,
        statistics,
    })
    .into_response())
}

async fn get_clusters(State(engine): State<GuardedEngine>) -> Response {
    let clusters = engine.cluster_diets();
    Json(ClustersResponse {
        status: SUCCESS,
        clusters_identified: clusters.clusters.len(),
        clusters,
    })
    .into_response()
}

async fn get_all_records(
    State(engine): State<GuardedEngine>,
    State(config): State<ServerConfig>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    let page = page_param("page", query.page.as_deref(), 1)?;
    let per_page = page_param(
        "per_page",
        query.per_page.as_deref(),
        config.default_page_size,
    )?;
    let page = engine.paginate(page, per_page)?;
    Ok(Json(PageResponse {
        status: SUCCESS,
        page,
    })
    .into_response())
}

async fn get_insights(
    State(engine): State<GuardedEngine>,
    query: Result<Query<InsightsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    let insights = limit_param(query.per_diet.as_deref(), DEFAULT_TOP_PER_DIET)
        .and_then(|per_diet| engine.insights(per_diet))
        .map_err(|e| ApiError::for_parameter("per_diet", e))?;
    Ok(Json(InsightsResponse {
        status: SUCCESS,
        insights,
    })
    .into_response())
}

/// Routes over the loaded dataset, all of them cacheable since the data
/// never changes while the server runs.
pub fn make_nutrition_routes(state: ServerState) -> Router {
    let max_age_sec = state.config.content_cache_age_sec;
    Router::new()
        .route("/nutrition/summary", get(get_summary))
        .route("/nutrition/all", get(get_all_records))
        .route("/nutrition/insights", get(get_insights))
        .route("/recipes", get(get_recipes))
        .route("/recipes/top", get(get_top_recipes))
        .route("/recipes/top-protein", get(get_top_protein))
        .route("/clusters", get(get_clusters))
        .layer(middleware::from_fn_with_state(max_age_sec, http_cache))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_parameters() {
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer(" -3 "), Some(-3));
        assert_eq!(parse_integer("100000000000000000000"), Some(i64::MAX));
        assert_eq!(parse_integer("-100000000000000000000"), Some(i64::MIN));
        assert_eq!(parse_integer("1.5"), None);
        assert_eq!(parse_integer("lots"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn unparsable_values_name_their_parameter() {
        assert_eq!(limit_param(None, 5), Ok(5));
        assert_eq!(
            limit_param(Some("abc"), 5),
            Err(QueryError::InvalidLimit("abc".to_owned()))
        );

        let err = page_param("per_page", Some("x"), 50).unwrap_err();
        assert_eq!(err.parameter(), "per_page");
        assert_eq!(err.to_string(), "Invalid per_page x, must be at least 1");
    }
}
