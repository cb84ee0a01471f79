// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase REST (PostgREST) client.
//!
//! Handles:
//! - Filtered selects rendered from [`Query`]
//! - Inserts and merge-on-conflict upserts returning the stored rows
//! - Filtered partial updates

use crate::db::query::Query;
use crate::error::AppError;
use serde_json::Value;

/// PostgREST client for one Supabase project.
#[derive(Clone)]
pub struct PostgrestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    /// Create a client for the project at `project_url` (e.g.
    /// `https://xyz.supabase.co`).
    pub fn new(project_url: &str, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key,
        }
    }

    fn table_url(&self, table: &str, params: &[String]) -> String {
        if params.is_empty() {
            format!("{}/{}", self.base_url, table)
        } else {
            format!("{}/{}?{}", self.base_url, table, params.join("&"))
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Select rows matching `query`.
    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, AppError> {
        let mut params = vec!["select=*".to_string()];
        params.extend(query.to_params());
        let url = self.table_url(table, &params);

        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Insert one row and return it as stored.
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Vec<Value>, AppError> {
        let url = self.table_url(table, &[]);

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Insert or merge into the row sharing the `on_conflict` key.
    pub async fn upsert(
        &self,
        table: &str,
        row: &Value,
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, AppError> {
        let params = [format!("on_conflict={}", on_conflict.join(","))];
        let url = self.table_url(table, &params);

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Patch every row matching `query`.
    pub async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: &Value,
    ) -> Result<Vec<Value>, AppError> {
        let url = self.table_url(table, &query.to_params());

        let response = self
            .request(reqwest::Method::PATCH, &url)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON row array.
    async fn check_response_json(&self, response: reqwest::Response) -> Result<Vec<Value>, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if matches!(status.as_u16(), 401 | 403) {
                tracing::warn!(status = status.as_u16(), "Supabase rejected API key");
                return Err(AppError::Backend("Backend rejected credentials".to_string()));
            }

            return Err(AppError::Backend(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::Direction;

    #[test]
    fn test_table_url() {
        let client = PostgrestClient::new("https://demo.supabase.co/", "anon".to_string());
        let params = Query::new()
            .eq("is_active", true)
            .order_by("id", Direction::Ascending)
            .to_params();

        assert_eq!(
            client.table_url("products", &params),
            "https://demo.supabase.co/rest/v1/products?is_active=eq.true&order=id.asc"
        );
        assert_eq!(
            client.table_url("orders", &[]),
            "https://demo.supabase.co/rest/v1/orders"
        );
    }
}
