//! Combination Service
//!
//! Turns a set of analyzed repositories into one project skeleton: a merge
//! strategy, a unified dependency list, framework-specific scripts,
//! deployment hints, and ordered setup instructions. Results live in an
//! in-memory map keyed by combination id for the lifetime of the process.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{
    CombinationResult, CombineRequest, ComponentPolicy, ConflictPolicy, DependencyPolicy,
    DeploymentConfig, FileStub, Framework, MergeStrategy, ProjectStructure, RepositoryAnalysis,
};
use crate::services::compatibility::{
    analyze_repository, framework_dependencies, framework_structure, most_frequent_framework,
};

/// Length to which the joined repository ids are truncated in the id
const ID_JOIN_LIMIT: usize = 24;

/// Errors from combination requests
#[derive(Debug, Error)]
pub enum CombineError {
    #[error("at least one repository is required to build a combination")]
    NoRepositories,
}

/// Service for building and retrieving combinations
#[derive(Debug, Clone, Default)]
pub struct CombinationService {
    combinations: Arc<RwLock<HashMap<String, CombinationResult>>>,
}

impl CombinationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a combination and store it
    pub async fn combine(&self, request: CombineRequest) -> Result<CombinationResult, CombineError> {
        self.combine_at(request, Utc::now()).await
    }

    /// Deterministic given a fixed creation time; the id's timestamp
    /// component is the only time-dependent output
    pub(crate) async fn combine_at(
        &self,
        request: CombineRequest,
        now: DateTime<Utc>,
    ) -> Result<CombinationResult, CombineError> {
        if request.repositories.is_empty() {
            return Err(CombineError::NoRepositories);
        }

        let analyses: Vec<RepositoryAnalysis> =
            request.repositories.iter().map(analyze_repository).collect();

        let target = request
            .target_framework
            .unwrap_or_else(|| most_frequent_framework(&analyses));

        let strategy = MergeStrategy {
            target_framework: target,
            conflict_policy: request.conflict_policy.unwrap_or(ConflictPolicy::SmartMerge),
            component_policy: request.component_policy.unwrap_or(ComponentPolicy::Selective),
            dependency_policy: request.dependency_policy.unwrap_or(DependencyPolicy::Unified),
        };

        let dependencies = unified_dependencies(target, &analyses);
        let structure = merged_structure(target, &analyses);
        let source_repos: Vec<String> = request
            .repositories
            .iter()
            .map(|r| r.full_name.clone())
            .collect();

        let id = combination_id(&request.repositories, now);
        let description = build_description(&request, target);
        let instructions = build_instructions(&request.name, target, &structure, &source_repos);

        let result = CombinationResult {
            id: id.clone(),
            name: request.name,
            description,
            strategy,
            file_stubs: file_stubs(target, &structure),
            structure,
            dependencies,
            scripts: framework_scripts(target),
            deployment: deployment_config(target),
            instructions,
            source_repos,
            created_at: now,
        };

        let mut combinations = self.combinations.write().await;
        combinations.insert(id.clone(), result.clone());
        info!(id = %id, repos = result.source_repos.len(), "combination created");

        Ok(result)
    }

    pub async fn get(&self, id: &str) -> Option<CombinationResult> {
        self.combinations.read().await.get(id).cloned()
    }

    /// All stored combinations, newest first
    pub async fn list(&self) -> Vec<CombinationResult> {
        let mut all: Vec<CombinationResult> =
            self.combinations.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        all
    }
}

/// Sorted repository ids joined and truncated, plus the creation timestamp
fn combination_id(repositories: &[crate::models::Repository], now: DateTime<Utc>) -> String {
    let mut ids: Vec<u64> = repositories.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids.dedup();
    let joined: String = ids
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("-");
    let truncated: String = joined.chars().take(ID_JOIN_LIMIT).collect();
    format!("combo-{truncated}-{}", now.timestamp())
}

/// Target framework dependencies first, then every analyzed dependency,
/// deduplicated in first-seen order
fn unified_dependencies(target: Framework, analyses: &[RepositoryAnalysis]) -> Vec<String> {
    let mut dependencies: Vec<String> = framework_dependencies(target)
        .iter()
        .map(|d| d.to_string())
        .collect();
    for analysis in analyses {
        for dependency in &analysis.dependencies {
            if !dependencies.contains(dependency) {
                dependencies.push(dependency.clone());
            }
        }
    }
    dependencies
}

/// Target framework layout extended with every analyzed folder
fn merged_structure(target: Framework, analyses: &[RepositoryAnalysis]) -> ProjectStructure {
    let mut structure = framework_structure(target);
    for analysis in analyses {
        for folder in &analysis.structure.folders {
            if !structure.folders.contains(folder) {
                structure.folders.push(folder.clone());
            }
        }
    }
    structure
}

/// Fixed dev/build/start commands per framework, generic npm set otherwise
fn framework_scripts(framework: Framework) -> BTreeMap<String, String> {
    let entries: &[(&str, &str)] = match framework {
        Framework::Nextjs => &[
            ("dev", "next dev"),
            ("build", "next build"),
            ("start", "next start"),
            ("lint", "next lint"),
        ],
        Framework::Remix => &[
            ("dev", "remix dev"),
            ("build", "remix build"),
            ("start", "remix-serve build"),
        ],
        Framework::React => &[
            ("dev", "vite"),
            ("build", "vite build"),
            ("start", "vite preview"),
        ],
        Framework::Vue => &[
            ("dev", "vite"),
            ("build", "vite build"),
            ("start", "vite preview"),
        ],
        Framework::Angular => &[
            ("dev", "ng serve"),
            ("build", "ng build"),
            ("start", "ng serve --configuration production"),
        ],
        Framework::Express => &[
            ("dev", "nodemon src/index.js"),
            ("build", "echo 'no build step'"),
            ("start", "node src/index.js"),
        ],
        Framework::Fastapi => &[
            ("dev", "uvicorn app.main:app --reload"),
            ("start", "uvicorn app.main:app"),
            ("test", "pytest"),
        ],
        Framework::Django => &[
            ("dev", "python manage.py runserver"),
            ("start", "gunicorn project.wsgi"),
            ("migrate", "python manage.py migrate"),
        ],
        Framework::Unknown => &[
            ("dev", "npm run dev"),
            ("build", "npm run build"),
            ("start", "npm start"),
        ],
    };
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Default platform plus framework-specific build output
fn deployment_config(framework: Framework) -> DeploymentConfig {
    let output_dir = match framework {
        Framework::Nextjs => ".next",
        _ => "build",
    };
    let build_command = framework_scripts(framework)
        .get("build")
        .cloned()
        .unwrap_or_else(|| "npm run build".to_string());
    DeploymentConfig {
        platform: "vercel".to_string(),
        env_vars: vec!["API_BASE_URL".to_string(), "DATABASE_URL".to_string()],
        build_command,
        output_dir: output_dir.to_string(),
    }
}

fn file_stubs(framework: Framework, structure: &ProjectStructure) -> Vec<FileStub> {
    let mut stubs = vec![
        FileStub {
            path: "package.json".to_string(),
            description: "Project manifest with the unified dependency list".to_string(),
        },
        FileStub {
            path: "README.md".to_string(),
            description: "Project overview and setup instructions".to_string(),
        },
        FileStub {
            path: ".env.example".to_string(),
            description: "Required environment variables".to_string(),
        },
    ];
    for entry_point in &structure.entry_points {
        stubs.push(FileStub {
            path: entry_point.clone(),
            description: format!("{framework} entry point"),
        });
    }
    stubs
}

fn build_description(request: &CombineRequest, target: Framework) -> String {
    let mut description = format!(
        "Combination of {} repositories targeting {target}",
        request.repositories.len()
    );
    if !request.features.is_empty() {
        description.push_str(&format!(" with features: {}", request.features.join(", ")));
    }
    description
}

/// Ordered setup steps interpolating the chosen layout and source repos
fn build_instructions(
    name: &str,
    target: Framework,
    structure: &ProjectStructure,
    source_repos: &[String],
) -> Vec<String> {
    vec![
        format!("Create the {name} project skeleton with folders: {}", structure.folders.join(", ")),
        format!(
            "Install the unified dependency list for the {target} target with your package manager"
        ),
        format!("Port source from {} into the matching folders", source_repos.join(", ")),
        format!(
            "Fill in the generated config files: {}",
            structure.config_files.join(", ")
        ),
        "Copy .env.example to .env and set the required values".to_string(),
        "Run the dev script and verify the merged application boots".to_string(),
    ]
}
