//! External search API client
//!
//! Thin reqwest wrapper over the repository search endpoint plus the two
//! optional enrichment lookups (language breakdown, contributors). The
//! response's rate-limit headers are surfaced so the limiter can reconcile
//! with the true remaining quota.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{RepoOwner, Repository, SortKey, SortOrder};

const USER_AGENT: &str = concat!("repoforge/", env!("CARGO_PKG_VERSION"));

/// Errors from the external search API
#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("search API request failed: {0}")]
    Transport(String),
    #[error("search API returned status {0}")]
    Status(StatusCode),
    #[error("search API returned a malformed response: {0}")]
    Malformed(String),
}

/// Quota as reported by the API's rate-limit response headers
#[derive(Debug, Clone, Copy)]
pub struct ReportedQuota {
    pub remaining: u32,
    pub reset_time: i64,
}

/// One raw page of search results, already converted to the engine's model
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub total_count: u64,
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    total_count: u64,
    items: Vec<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLicense {
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    id: u64,
    full_name: String,
    html_url: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    stargazers_count: u32,
    forks_count: u32,
    open_issues_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner: RawOwner,
    #[serde(default)]
    license: Option<RawLicense>,
}

#[derive(Debug, Deserialize)]
struct RawContributor {
    #[allow(dead_code)]
    login: String,
}

/// HTTP client for the external search API
#[derive(Debug, Clone)]
pub struct SearchApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SearchApiClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SearchApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SearchApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Issue one paginated search call
    pub async fn search(
        &self,
        query: &str,
        sort: Option<SortKey>,
        order: Option<SortOrder>,
        per_page: u32,
        page: u32,
    ) -> Result<(SearchPage, Option<ReportedQuota>), SearchApiError> {
        let url = format!("{}/search/repositories", self.base_url);
        let per_page = per_page.to_string();
        let page = page.to_string();

        let mut params: Vec<(&str, String)> = vec![("q", query.to_string())];
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }
        if let Some(order) = order {
            params.push(("order", order.to_string()));
        }
        params.push(("per_page", per_page));
        params.push(("page", page));

        let mut request = self
            .client
            .get(&url)
            .query(&params)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchApiError::Transport(e.to_string()))?;

        let quota = parse_quota(
            header_str(&response, "x-ratelimit-remaining"),
            header_str(&response, "x-ratelimit-reset"),
        );

        let status = response.status();
        if !status.is_success() {
            return Err(SearchApiError::Status(status));
        }

        let raw: RawSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchApiError::Malformed(e.to_string()))?;

        debug!(
            total_count = raw.total_count,
            items = raw.items.len(),
            "search page fetched"
        );

        let repositories = raw.items.into_iter().map(convert_repository).collect();
        Ok((
            SearchPage {
                total_count: raw.total_count,
                repositories,
            },
            quota,
        ))
    }

    /// Language breakdown for one repository (bytes per language)
    pub async fn get_languages(
        &self,
        full_name: &str,
    ) -> Result<HashMap<String, u64>, SearchApiError> {
        let url = format!("{}/repos/{}/languages", self.base_url, full_name);
        self.get_json(&url).await
    }

    /// Approximate contributor count from the first contributors page
    pub async fn get_contributor_count(&self, full_name: &str) -> Result<u32, SearchApiError> {
        let url = format!(
            "{}/repos/{}/contributors?per_page=100",
            self.base_url, full_name
        );
        let contributors: Vec<RawContributor> = self.get_json(&url).await?;
        Ok(contributors.len() as u32)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, SearchApiError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchApiError::Status(status));
        }

        response
            .json()
            .await
            .map_err(|e| SearchApiError::Malformed(e.to_string()))
    }
}

fn header_str<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Both headers must parse for the quota to be usable
fn parse_quota(remaining: Option<&str>, reset: Option<&str>) -> Option<ReportedQuota> {
    let remaining = remaining?.parse().ok()?;
    let reset_time = reset?.parse().ok()?;
    Some(ReportedQuota {
        remaining,
        reset_time,
    })
}

fn convert_repository(raw: RawRepository) -> Repository {
    Repository {
        id: raw.id,
        full_name: raw.full_name,
        url: raw.html_url,
        description: raw.description,
        language: raw.language,
        topics: dedup_preserving_order(raw.topics),
        stars: raw.stargazers_count,
        forks: raw.forks_count,
        open_issues: raw.open_issues_count,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        owner: RepoOwner {
            login: raw.owner.login,
            avatar_url: raw.owner.avatar_url,
        },
        quality_score: None,
        enrichment: raw.license.and_then(|l| l.spdx_id).map(|spdx| {
            crate::models::RepositoryEnrichment {
                license: Some(spdx),
                ..Default::default()
            }
        }),
    }
}

fn dedup_preserving_order(topics: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    topics
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quota_requires_both_headers() {
        assert!(parse_quota(Some("4999"), None).is_none());
        assert!(parse_quota(None, Some("1700000000")).is_none());

        let quota = parse_quota(Some("4999"), Some("1700000000")).unwrap();
        assert_eq!(quota.remaining, 4999);
        assert_eq!(quota.reset_time, 1_700_000_000);
    }

    #[test]
    fn test_parse_quota_rejects_garbage() {
        assert!(parse_quota(Some("many"), Some("soon")).is_none());
    }

    #[test]
    fn test_topics_deduplicated_in_order() {
        let topics = vec![
            "web".to_string(),
            "cli".to_string(),
            "web".to_string(),
            "tui".to_string(),
        ];
        assert_eq!(dedup_preserving_order(topics), vec!["web", "cli", "tui"]);
    }
}
