//! Search query construction
//!
//! Turns a free-text query plus structured filters into the external API's
//! query-string dialect. The output must be a pure function of its inputs:
//! the serialized string doubles as the cache-key component, so the same
//! logical filters must always serialize identically.

use chrono::{DateTime, Duration, Utc};

use crate::models::{ActivityBucket, SearchFilters, SizeBucket};

/// Builds query strings with a persistent exclusion list applied
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    excluded_users: Vec<String>,
}

impl QueryBuilder {
    pub fn new(excluded_users: Vec<String>) -> Self {
        Self { excluded_users }
    }

    /// Serialize the query and filters into one search-dialect string
    pub fn build(&self, query: &str, filters: &SearchFilters) -> String {
        self.build_at(query, filters, Utc::now())
    }

    /// Term order is fixed for readability; the API treats terms as an
    /// unordered conjunction. The activity cutoffs are the only
    /// time-dependent input.
    pub(crate) fn build_at(
        &self,
        query: &str,
        filters: &SearchFilters,
        now: DateTime<Utc>,
    ) -> String {
        let mut terms: Vec<String> = Vec::new();

        let query = query.trim();
        if !query.is_empty() {
            terms.push(query.to_string());
        }

        for user in &self.excluded_users {
            terms.push(format!("-user:{user}"));
        }

        if let Some(language) = &filters.language {
            terms.push(format!("language:{language}"));
        }
        if let Some(min) = filters.min_stars {
            terms.push(format!("stars:>={min}"));
        }
        if let Some(max) = filters.max_stars {
            terms.push(format!("stars:<={max}"));
        }
        for topic in &filters.topics {
            terms.push(format!("topic:{topic}"));
        }

        push_tristate(&mut terms, "issues", filters.has_issues);
        push_tristate(&mut terms, "wiki", filters.has_wiki);
        push_tristate(&mut terms, "pages", filters.has_pages);

        if let Some(archived) = filters.archived {
            terms.push(format!("archived:{archived}"));
        }
        if let Some(fork) = filters.fork {
            terms.push(format!("fork:{fork}"));
        }
        if let Some(size) = filters.size {
            terms.push(size_term(size).to_string());
        }
        if let Some(activity) = filters.activity {
            terms.push(activity_term(activity, now));
        }

        terms.join(" ")
    }
}

/// Tri-state presence term: set-true emits `has:X`, set-false `-has:X`,
/// unset emits nothing
fn push_tristate(terms: &mut Vec<String>, name: &str, flag: Option<bool>) {
    match flag {
        Some(true) => terms.push(format!("has:{name}")),
        Some(false) => terms.push(format!("-has:{name}")),
        None => {}
    }
}

fn size_term(size: SizeBucket) -> &'static str {
    match size {
        SizeBucket::Small => "size:<1000",
        SizeBucket::Medium => "size:1000..10000",
        SizeBucket::Large => "size:>10000",
    }
}

fn activity_term(bucket: ActivityBucket, now: DateTime<Utc>) -> String {
    match bucket {
        ActivityBucket::Active => {
            format!("pushed:>{}", (now - Duration::days(30)).format("%Y-%m-%d"))
        }
        ActivityBucket::Maintained => {
            format!("pushed:>{}", (now - Duration::days(90)).format("%Y-%m-%d"))
        }
        ActivityBucket::Stale => {
            format!("pushed:<{}", (now - Duration::days(365)).format("%Y-%m-%d"))
        }
    }
}
