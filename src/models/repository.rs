//! Repository model and search types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Repository owner as reported by the external search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Optional per-repository enrichment data
///
/// Populated by the enrichment step (language breakdown and contributor
/// lookups); each field degrades independently when its lookup fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEnrichment {
    /// Language name mapped to bytes of code in that language
    #[serde(default)]
    pub languages: HashMap<String, u64>,
    #[serde(default)]
    pub contributor_count: Option<u32>,
    #[serde(default)]
    pub license: Option<String>,
}

/// Repository entity
///
/// The numeric id is the sole identity key for deduplication. The quality
/// score is always recomputed by the engine and never trusted from input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: u64,
    /// `owner/name`
    pub full_name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Unordered, deduplicated topic list
    #[serde(default)]
    pub topics: Vec<String>,
    pub stars: u32,
    pub forks: u32,
    pub open_issues: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: RepoOwner,
    #[serde(default)]
    pub quality_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<RepositoryEnrichment>,
}

/// Repository size bucket mapped to a fixed size term in the query dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl FromStr for SizeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(format!(
                "Invalid size bucket: {s}. Valid values are: small, medium, large"
            )),
        }
    }
}

/// Activity recency bucket; each maps to a pushed-date term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityBucket {
    /// Pushed within the last 30 days
    Active,
    /// Pushed within the last 90 days
    Maintained,
    /// No push for over a year
    Stale,
}

impl FromStr for ActivityBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "maintained" => Ok(Self::Maintained),
            "stale" => Ok(Self::Stale),
            _ => Err(format!(
                "Invalid activity bucket: {s}. Valid values are: active, maintained, stale"
            )),
        }
    }
}

/// Sort key passed through to the external search API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Stars,
    Forks,
    Updated,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stars => write!(f, "stars"),
            Self::Forks => write!(f, "forks"),
            Self::Updated => write!(f, "updated"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stars" => Ok(Self::Stars),
            "forks" => Ok(Self::Forks),
            "updated" => Ok(Self::Updated),
            _ => Err(format!(
                "Invalid sort key: {s}. Valid values are: stars, forks, updated"
            )),
        }
    }
}

/// Sort order passed through to the external search API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!(
                "Invalid sort order: {s}. Valid values are: asc, desc"
            )),
        }
    }
}

/// Structured search constraints; absence of a field means unconstrained
///
/// Serialization order is the declaration order, which makes the serialized
/// form usable as a deterministic cache-key component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub min_stars: Option<u32>,
    #[serde(default)]
    pub max_stars: Option<u32>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub has_issues: Option<bool>,
    #[serde(default)]
    pub has_wiki: Option<bool>,
    #[serde(default)]
    pub has_pages: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub fork: Option<bool>,
    #[serde(default)]
    pub size: Option<SizeBucket>,
    #[serde(default)]
    pub activity: Option<ActivityBucket>,
    /// Minimum recomputed quality score; the query dialect cannot express
    /// this, so it is applied as a post-filter after scoring
    #[serde(default)]
    pub min_quality: Option<u8>,
    #[serde(default)]
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

/// One page of scored search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub repositories: Vec<Repository>,
    pub total_count: u64,
    /// True iff the external page came back full; approximate at exact
    /// result-count boundaries, which is accepted
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
}

/// Trending time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingTimeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for TrendingTimeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for TrendingTimeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!(
                "Invalid timeframe: {s}. Valid values are: daily, weekly, monthly"
            )),
        }
    }
}

impl TrendingTimeframe {
    /// Lookback window in days for the created-date cutoff
    pub fn days(&self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }
}

/// Query parameters for the trending endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingQuery {
    /// Time window for trending lookback (default: daily)
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_round_trip() {
        for raw in ["daily", "weekly", "monthly"] {
            let parsed: TrendingTimeframe = raw.parse().unwrap();
            assert_eq!(parsed.to_string(), raw);
        }
        assert!("yearly".parse::<TrendingTimeframe>().is_err());
    }

    #[test]
    fn test_filters_serialize_deterministically() {
        let filters = SearchFilters {
            language: Some("rust".to_string()),
            min_stars: Some(100),
            topics: vec!["cli".to_string()],
            ..Default::default()
        };
        let a = serde_json::to_string(&filters).unwrap();
        let b = serde_json::to_string(&filters.clone()).unwrap();
        assert_eq!(a, b);
    }
}
