//! Repository quality scoring
//!
//! Pure functions from repository metadata to a bounded 0-100 score. The
//! capped sub-scores carry the relative weights (stars 30, forks 20, recency
//! 20, documentation 20, issue health 10); their sum is clamped to 100. The
//! only time-dependent input is the age of the last update, so a repository
//! that receives no updates drifts monotonically downward between runs.

use chrono::{DateTime, Utc};

use crate::models::{Repository, RepositoryEnrichment};

/// Description length above which the documentation sub-score applies
const DESCRIPTION_THRESHOLD: usize = 50;

/// Standard quality score from raw metadata
pub fn quality_score(repo: &Repository) -> u8 {
    quality_score_at(repo, Utc::now())
}

pub(crate) fn quality_score_at(repo: &Repository, now: DateTime<Utc>) -> u8 {
    let stars = (log10_plus_one(repo.stars) * 10.0).min(30.0);
    let forks = (log10_plus_one(repo.forks) * 10.0).min(20.0);
    let recency = (20.0 - days_since(repo.updated_at, now) / 30.0).max(0.0);
    let docs = documentation_score(repo);
    let issues = issue_health(repo.open_issues, repo.stars);

    clamp_score(stars + forks + recency + docs + issues)
}

/// Enhanced variant used when language and contributor enrichment is present
///
/// Caps: stars 25, recency 20, contributors 15, forks bonus 5, language
/// diversity 10, issue health 10. Raw capped components are summed directly
/// and clamped to 100.
pub fn enhanced_quality_score(repo: &Repository, enrichment: &RepositoryEnrichment) -> u8 {
    enhanced_quality_score_at(repo, enrichment, Utc::now())
}

pub(crate) fn enhanced_quality_score_at(
    repo: &Repository,
    enrichment: &RepositoryEnrichment,
    now: DateTime<Utc>,
) -> u8 {
    let stars = (log10_plus_one(repo.stars) * 10.0).min(25.0);
    let recency = (20.0 - days_since(repo.updated_at, now) / 30.0).max(0.0);
    let contributors =
        (log10_plus_one(enrichment.contributor_count.unwrap_or(0)) * 7.5).min(15.0);
    let forks_bonus = (log10_plus_one(repo.forks) * 2.5).min(5.0);
    let diversity = (enrichment.languages.len() as f64 * 2.5).min(10.0);
    let issues = issue_health(repo.open_issues, repo.stars);

    clamp_score(stars + recency + contributors + forks_bonus + diversity + issues)
}

fn log10_plus_one(count: u32) -> f64 {
    f64::log10(f64::from(count) + 1.0)
}

fn days_since(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - updated_at).num_seconds() as f64 / 86_400.0).max(0.0)
}

fn documentation_score(repo: &Repository) -> f64 {
    let description_len = repo.description.as_deref().map_or(0, str::len);
    let mut score = 0.0;
    if description_len > DESCRIPTION_THRESHOLD {
        score += 15.0;
    }
    if !repo.topics.is_empty() {
        score += 5.0;
    }
    score
}

/// Open issues relative to popularity; the denominator always adds one so a
/// zero-star repository cannot divide by zero
fn issue_health(open_issues: u32, stars: u32) -> f64 {
    (10.0 - f64::from(open_issues) / (f64::from(stars) + 1.0) * 50.0).max(0.0)
}

fn clamp_score(total: f64) -> u8 {
    total.min(100.0).max(0.0).round() as u8
}
