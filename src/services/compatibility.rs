//! Compatibility Analysis Service
//!
//! Infers each repository's framework, components, dependencies, and
//! features from metadata alone (no source code is fetched), then scores how
//! well a set of repositories can be combined. Detection is keyword-based
//! and deliberately heuristic: a repository merely mentioning a framework in
//! prose will match. Downstream behavior is defined against these exact
//! tables.

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{
    CompatibilityConflict, CompatibilityReport, ConflictKind, Framework, ProjectStructure,
    Repository, RepositoryAnalysis,
};
use crate::services::insight::{analyze_or_fallback, RepoAnalyzer, RepoSummary};
use crate::services::scoring::quality_score;

/// Relative weights of the three compatibility sub-scores
const FRAMEWORK_WEIGHT: f64 = 0.5;
const DEPENDENCY_WEIGHT: f64 = 0.3;
const ARCHITECTURE_WEIGHT: f64 = 0.2;

/// Penalty per additional distinct framework beyond the first
const FRAMEWORK_PENALTY: f64 = 40.0;

/// Penalty per known-incompatible dependency pair in the union
const DEPENDENCY_PENALTY: f64 = 25.0;

/// Average structural overlap below which an architecture conflict is raised
const ARCHITECTURE_CONFLICT_THRESHOLD: f64 = 40.0;

/// Detection keywords per framework, matched in priority order
fn framework_keywords(framework: Framework) -> &'static [&'static str] {
    match framework {
        Framework::Nextjs => &["nextjs", "next.js", "next"],
        Framework::Remix => &["remix"],
        Framework::React => &["react"],
        Framework::Vue => &["vue"],
        Framework::Angular => &["angular"],
        Framework::Express => &["express"],
        Framework::Fastapi => &["fastapi"],
        Framework::Django => &["django"],
        Framework::Unknown => &[],
    }
}

/// Component tags tested by membership against the metadata text
const COMPONENT_KEYWORDS: &[&str] = &[
    "auth", "dashboard", "api", "database", "ui", "admin", "blog", "chat", "payments", "search",
    "analytics", "cms", "ecommerce", "forms", "charts",
];

/// Topic keyword to extra dependency
const TOPIC_DEPENDENCIES: &[(&str, &str)] = &[
    ("typescript", "typescript"),
    ("tailwind", "tailwindcss"),
    ("tailwindcss", "tailwindcss"),
    ("graphql", "graphql"),
    ("prisma", "prisma"),
    ("mongodb", "mongoose"),
    ("postgres", "pg"),
    ("redux", "redux"),
    ("websocket", "socket.io"),
];

/// Metadata keyword to feature label
const FEATURE_KEYWORDS: &[(&str, &str)] = &[
    ("auth", "authentication"),
    ("oauth", "authentication"),
    ("login", "authentication"),
    ("realtime", "realtime"),
    ("websocket", "realtime"),
    ("i18n", "internationalization"),
    ("dark", "dark-mode"),
    ("responsive", "responsive-ui"),
    ("pwa", "offline-support"),
    ("seo", "seo"),
    ("test", "testing"),
];

/// Known-incompatible dependency pairs: UI frameworks and server stacks
/// that cannot share one project
const INCOMPATIBLE_DEPENDENCIES: &[(&str, &str)] = &[
    ("react", "vue"),
    ("react", "@angular/core"),
    ("vue", "@angular/core"),
    ("express", "fastapi"),
    ("express", "django"),
    ("fastapi", "django"),
];

/// Base dependencies implied by a detected framework
pub(crate) fn framework_dependencies(framework: Framework) -> &'static [&'static str] {
    match framework {
        Framework::Nextjs => &["next", "react", "react-dom"],
        Framework::Remix => &["@remix-run/react", "react", "react-dom"],
        Framework::React => &["react", "react-dom"],
        Framework::Vue => &["vue"],
        Framework::Angular => &["@angular/core", "rxjs"],
        Framework::Express => &["express"],
        Framework::Fastapi => &["fastapi", "uvicorn"],
        Framework::Django => &["django"],
        Framework::Unknown => &[],
    }
}

/// Canonical structural layout per framework
pub(crate) fn framework_structure(framework: Framework) -> ProjectStructure {
    let (folders, entry_points, config_files): (&[&str], &[&str], &[&str]) = match framework {
        Framework::Nextjs => (
            &["app", "components", "lib", "public"],
            &["app/page.tsx", "app/layout.tsx"],
            &["next.config.js", "package.json", "tsconfig.json"],
        ),
        Framework::Remix => (
            &["app", "app/routes", "public"],
            &["app/root.tsx", "app/entry.server.tsx"],
            &["remix.config.js", "package.json"],
        ),
        Framework::React => (
            &["src", "src/components", "public"],
            &["src/index.tsx", "src/App.tsx"],
            &["package.json", "tsconfig.json"],
        ),
        Framework::Vue => (
            &["src", "src/components", "public"],
            &["src/main.ts", "src/App.vue"],
            &["vite.config.ts", "package.json"],
        ),
        Framework::Angular => (
            &["src", "src/app"],
            &["src/main.ts"],
            &["angular.json", "package.json", "tsconfig.json"],
        ),
        Framework::Express => (
            &["src", "src/routes", "src/middleware"],
            &["src/index.js"],
            &["package.json"],
        ),
        Framework::Fastapi => (
            &["app", "app/routers", "tests"],
            &["app/main.py"],
            &["requirements.txt", "pyproject.toml"],
        ),
        Framework::Django => (
            &["project", "apps", "templates", "static"],
            &["manage.py"],
            &["settings.py", "requirements.txt"],
        ),
        Framework::Unknown => (&["src"], &["src/index.js"], &["package.json"]),
    };
    ProjectStructure {
        folders: folders.iter().map(|s| s.to_string()).collect(),
        entry_points: entry_points.iter().map(|s| s.to_string()).collect(),
        config_files: config_files.iter().map(|s| s.to_string()).collect(),
    }
}

/// Service for multi-repository compatibility analysis
///
/// The optional analysis collaborator contributes extra suggestions; its
/// absence or failure never fails a request.
#[derive(Clone, Default)]
pub struct CompatibilityService {
    analyzer: Option<Arc<dyn RepoAnalyzer>>,
}

impl CompatibilityService {
    pub fn new() -> Self {
        Self { analyzer: None }
    }

    pub fn with_analyzer(analyzer: Arc<dyn RepoAnalyzer>) -> Self {
        Self {
            analyzer: Some(analyzer),
        }
    }

    /// Analyze one repository from its metadata
    pub fn analyze_repository(&self, repo: &Repository) -> RepositoryAnalysis {
        analyze_repository(repo)
    }

    /// Compatibility across all supplied repositories
    ///
    /// Fewer than two repositories always yields the neutral score of 100
    /// with a guidance suggestion, never an analyzed score.
    pub async fn analyze_compatibility(&self, repos: &[Repository]) -> CompatibilityReport {
        if repos.len() < 2 {
            return CompatibilityReport {
                score: 100,
                conflicts: vec![],
                suggestions: vec![
                    "Add at least two repositories to get a meaningful compatibility analysis"
                        .to_string(),
                ],
            };
        }

        let analyses: Vec<RepositoryAnalysis> =
            repos.iter().map(analyze_repository).collect();

        let mut conflicts = Vec::new();
        let mut suggestions = Vec::new();

        let framework_score = framework_score(&analyses, &mut conflicts, &mut suggestions);
        let dependency_score = dependency_score(&analyses, &mut conflicts);
        let architecture_score = architecture_score(&analyses, &mut conflicts);

        let score = (framework_score * FRAMEWORK_WEIGHT
            + dependency_score * DEPENDENCY_WEIGHT
            + architecture_score * ARCHITECTURE_WEIGHT)
            .round()
            .clamp(0.0, 100.0) as u8;

        if score >= 80 {
            suggestions
                .push("Repositories look compatible; a smart merge should apply cleanly".to_string());
        }

        if let Some(analyzer) = &self.analyzer {
            for repo in repos {
                let summary = RepoSummary::from(repo);
                let insight = analyze_or_fallback(analyzer.as_ref(), &summary).await;
                for suggestion in &insight.value().suggestions {
                    if !suggestions.contains(suggestion) {
                        suggestions.push(suggestion.clone());
                    }
                }
            }
        }

        CompatibilityReport {
            score,
            conflicts,
            suggestions,
        }
    }
}

/// Pure metadata analysis of one repository
pub(crate) fn analyze_repository(repo: &Repository) -> RepositoryAnalysis {
    let haystack = metadata_text(repo);
    let framework = detect_framework(&haystack);

    let components: Vec<String> = COMPONENT_KEYWORDS
        .iter()
        .filter(|kw| haystack.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    let mut dependencies: Vec<String> = framework_dependencies(framework)
        .iter()
        .map(|d| d.to_string())
        .collect();
    for (topic, dependency) in TOPIC_DEPENDENCIES {
        let triggered = repo
            .topics
            .iter()
            .any(|t| t.eq_ignore_ascii_case(topic));
        if triggered && !dependencies.iter().any(|d| d == dependency) {
            dependencies.push(dependency.to_string());
        }
    }

    let mut features: Vec<String> = Vec::new();
    for (keyword, feature) in FEATURE_KEYWORDS {
        if haystack.contains(keyword) && !features.iter().any(|f| f == feature) {
            features.push(feature.to_string());
        }
    }

    RepositoryAnalysis {
        framework,
        components,
        dependencies,
        features,
        structure: framework_structure(framework),
        quality_score: quality_score(repo),
    }
}

/// Lowercased concatenation of name, description, and topics
fn metadata_text(repo: &Repository) -> String {
    let mut text = repo.full_name.to_lowercase();
    if let Some(description) = &repo.description {
        text.push(' ');
        text.push_str(&description.to_lowercase());
    }
    for topic in &repo.topics {
        text.push(' ');
        text.push_str(&topic.to_lowercase());
    }
    text
}

/// First framework in priority order with a keyword hit wins
fn detect_framework(haystack: &str) -> Framework {
    for framework in Framework::DETECTION_ORDER {
        if framework_keywords(framework)
            .iter()
            .any(|kw| haystack.contains(kw))
        {
            return framework;
        }
    }
    Framework::Unknown
}

/// Fewer distinct frameworks means a higher score
fn framework_score(
    analyses: &[RepositoryAnalysis],
    conflicts: &mut Vec<CompatibilityConflict>,
    suggestions: &mut Vec<String>,
) -> f64 {
    let distinct: Vec<Framework> = {
        let mut seen = Vec::new();
        for analysis in analyses {
            if !seen.contains(&analysis.framework) {
                seen.push(analysis.framework);
            }
        }
        seen
    };

    if distinct.len() <= 1 {
        return 100.0;
    }

    let names: Vec<&str> = distinct.iter().map(Framework::as_str).collect();
    conflicts.push(CompatibilityConflict {
        kind: ConflictKind::Framework,
        description: format!("Multiple frameworks detected: {}", names.join(", ")),
    });

    let preferred = most_frequent_framework(analyses);
    suggestions.push(format!(
        "Pick a single target framework for the merge (most frequent: {preferred})"
    ));

    (100.0 - FRAMEWORK_PENALTY * (distinct.len() as f64 - 1.0)).max(0.0)
}

/// Penalize known-incompatible pairs in the dependency union
fn dependency_score(
    analyses: &[RepositoryAnalysis],
    conflicts: &mut Vec<CompatibilityConflict>,
) -> f64 {
    let union: HashSet<&str> = analyses
        .iter()
        .flat_map(|a| a.dependencies.iter().map(String::as_str))
        .collect();

    let mut score = 100.0;
    for (a, b) in INCOMPATIBLE_DEPENDENCIES {
        if union.contains(a) && union.contains(b) {
            conflicts.push(CompatibilityConflict {
                kind: ConflictKind::Dependency,
                description: format!("Dependencies {a} and {b} are known to conflict"),
            });
            score -= DEPENDENCY_PENALTY;
        }
    }
    score.max(0.0)
}

/// Average pairwise folder overlap across all repository pairs
fn architecture_score(
    analyses: &[RepositoryAnalysis],
    conflicts: &mut Vec<CompatibilityConflict>,
) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0u32;
    for i in 0..analyses.len() {
        for j in (i + 1)..analyses.len() {
            total += folder_overlap(&analyses[i].structure, &analyses[j].structure);
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 100.0;
    }

    let average = total / f64::from(pairs) * 100.0;
    if average < ARCHITECTURE_CONFLICT_THRESHOLD {
        conflicts.push(CompatibilityConflict {
            kind: ConflictKind::Architecture,
            description: "Project layouts differ significantly across repositories".to_string(),
        });
    }
    average
}

/// Jaccard overlap of the two folder sets
fn folder_overlap(a: &ProjectStructure, b: &ProjectStructure) -> f64 {
    let set_a: HashSet<&str> = a.folders.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.folders.iter().map(String::as_str).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 1.0;
    }
    set_a.intersection(&set_b).count() as f64 / union as f64
}

/// Most frequent detected framework, first-seen wins ties
pub(crate) fn most_frequent_framework(analyses: &[RepositoryAnalysis]) -> Framework {
    let mut counts: Vec<(Framework, usize)> = Vec::new();
    for analysis in analyses {
        match counts.iter_mut().find(|(f, _)| *f == analysis.framework) {
            Some((_, count)) => *count += 1,
            None => counts.push((analysis.framework, 1)),
        }
    }
    // Replace only on a strictly greater count so ties keep the
    // first-seen framework
    let mut best: Option<(Framework, usize)> = None;
    for (framework, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((framework, count));
        }
    }
    best.map(|(framework, _)| framework)
        .unwrap_or(Framework::Unknown)
}
