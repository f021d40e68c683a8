//! LLM-backed repository insight collaborator
//!
//! The engine consumes an opaque text-analysis service through the
//! `RepoAnalyzer` trait. The collaborator may be absent, fail, or return
//! unparsable output; in every such case the engine substitutes a fixed
//! fallback record and records which path was taken, so degradation stays
//! observable instead of silent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::Repository;

/// Compact repository summary handed to the analysis collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub stars: u32,
}

impl From<&Repository> for RepoSummary {
    fn from(repo: &Repository) -> Self {
        Self {
            full_name: repo.full_name.clone(),
            description: repo.description.clone(),
            language: repo.language.clone(),
            topics: repo.topics.clone(),
            stars: repo.stars,
        }
    }
}

/// Structured result of an analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInsight {
    pub overall_quality: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub security_score: u8,
    pub maintainability_score: u8,
}

/// Errors from the analysis collaborator
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("analysis backend unavailable: {0}")]
    Unavailable(String),
    #[error("analysis backend returned malformed output: {0}")]
    Malformed(String),
}

/// Opaque analysis collaborator
#[async_trait]
pub trait RepoAnalyzer: Send + Sync {
    async fn analyze(&self, summary: &RepoSummary) -> Result<RepoInsight, InsightError>;
}

/// Result of an enrichment step that may have fallen back to defaults
///
/// `Degraded` carries the substituted value and the reason, so callers and
/// tests can assert which path ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Enriched<T> {
    Full(T),
    Degraded { value: T, reason: String },
}

impl<T> Enriched<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Full(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Full(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// The fixed record substituted when analysis is unavailable
pub fn fallback_insight() -> RepoInsight {
    RepoInsight {
        overall_quality: 50,
        issues: vec![],
        suggestions: vec!["Automated analysis was unavailable for this repository".to_string()],
        security_score: 50,
        maintainability_score: 50,
    }
}

/// Run the collaborator, degrading to the fallback record on any failure
pub async fn analyze_or_fallback(
    analyzer: &dyn RepoAnalyzer,
    summary: &RepoSummary,
) -> Enriched<RepoInsight> {
    match analyzer.analyze(summary).await {
        Ok(insight) => Enriched::Full(insight),
        Err(e) => {
            warn!(repo = %summary.full_name, error = %e, "analysis degraded to fallback");
            Enriched::Degraded {
                value: fallback_insight(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticAnalyzer(RepoInsight);

    #[async_trait]
    impl RepoAnalyzer for StaticAnalyzer {
        async fn analyze(&self, _summary: &RepoSummary) -> Result<RepoInsight, InsightError> {
            Ok(self.0.clone())
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl RepoAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _summary: &RepoSummary) -> Result<RepoInsight, InsightError> {
            Err(InsightError::Malformed("not json".to_string()))
        }
    }

    fn summary() -> RepoSummary {
        RepoSummary {
            full_name: "octo/widget".to_string(),
            description: None,
            language: None,
            topics: vec![],
            stars: 0,
        }
    }

    #[tokio::test]
    async fn test_successful_analysis_is_full() {
        let insight = RepoInsight {
            overall_quality: 88,
            issues: vec!["no tests".to_string()],
            suggestions: vec![],
            security_score: 70,
            maintainability_score: 90,
        };
        let analyzer = StaticAnalyzer(insight.clone());

        let result = analyze_or_fallback(&analyzer, &summary()).await;
        assert!(!result.is_degraded());
        assert_eq!(result.value(), &insight);
    }

    #[tokio::test]
    async fn test_failed_analysis_degrades_to_fallback() {
        let result = analyze_or_fallback(&FailingAnalyzer, &summary()).await;
        assert!(result.is_degraded());
        assert_eq!(result.value(), &fallback_insight());
        match result {
            Enriched::Degraded { reason, .. } => {
                assert!(reason.contains("malformed"));
            }
            Enriched::Full(_) => panic!("expected degraded"),
        }
    }
}
