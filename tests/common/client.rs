//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all nutrition API endpoints.
//!
//! When API routes or query parameters change, update only this file.
#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET `path` with the given query parameters
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Service Endpoints
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.get("/", &[]).await
    }

    pub async fn get_health(&self) -> Response {
        self.get("/api/health", &[]).await
    }

    // ========================================================================
    // Nutrition Endpoints
    // ========================================================================

    pub async fn get_summary(&self) -> Response {
        self.get("/api/nutrition/summary", &[]).await
    }

    pub async fn get_all_records(&self, page: Option<&str>, per_page: Option<&str>) -> Response {
        let mut query = Vec::new();
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(per_page) = per_page {
            query.push(("per_page", per_page));
        }
        self.get("/api/nutrition/all", &query).await
    }

    pub async fn get_insights(&self, per_diet: Option<&str>) -> Response {
        let query: Vec<(&str, &str)> = per_diet.map(|n| ("per_diet", n)).into_iter().collect();
        self.get("/api/nutrition/insights", &query).await
    }

    // ========================================================================
    // Recipe Endpoints
    // ========================================================================

    pub async fn get_top_protein(&self, limit: Option<&str>) -> Response {
        let query: Vec<(&str, &str)> = limit.map(|l| ("limit", l)).into_iter().collect();
        self.get("/api/recipes/top-protein", &query).await
    }

    pub async fn get_top(&self, metric: Option<&str>, limit: Option<&str>) -> Response {
        let mut query = Vec::new();
        if let Some(metric) = metric {
            query.push(("metric", metric));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        self.get("/api/recipes/top", &query).await
    }

    pub async fn get_recipes(
        &self,
        diet_type: Option<&str>,
        search: Option<&str>,
        limit: Option<&str>,
    ) -> Response {
        let mut query = Vec::new();
        if let Some(diet_type) = diet_type {
            query.push(("diet_type", diet_type));
        }
        if let Some(search) = search {
            query.push(("search", search));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        self.get("/api/recipes", &query).await
    }

    pub async fn get_clusters(&self) -> Response {
        self.get("/api/clusters", &[]).await
    }
}
