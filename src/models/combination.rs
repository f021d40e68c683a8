//! Combination request and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::analysis::{
    ComponentPolicy, ConflictPolicy, DependencyPolicy, Framework, MergeStrategy, ProjectStructure,
};
use super::repository::Repository;

/// Request payload for combining repositories into one project skeleton
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineRequest {
    pub repositories: Vec<Repository>,
    pub name: String,
    /// When absent, the most frequent detected framework is used
    #[serde(default)]
    pub target_framework: Option<Framework>,
    /// Requested feature tags, carried into the result description
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub conflict_policy: Option<ConflictPolicy>,
    #[serde(default)]
    pub component_policy: Option<ComponentPolicy>,
    #[serde(default)]
    pub dependency_policy: Option<DependencyPolicy>,
}

/// A generated file stub in the combined project skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStub {
    pub path: String,
    pub description: String,
}

/// Deployment hints for the combined project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub platform: String,
    pub env_vars: Vec<String>,
    pub build_command: String,
    pub output_dir: String,
}

/// Result of one combination request
///
/// Owned by the request that created it; stored in an in-memory map keyed
/// by id for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationResult {
    pub id: String,
    pub name: String,
    pub description: String,
    pub strategy: MergeStrategy,
    pub structure: ProjectStructure,
    pub file_stubs: Vec<FileStub>,
    /// Unified, deduplicated dependency list
    pub dependencies: Vec<String>,
    /// Script name mapped to command; ordered for stable serialization
    pub scripts: BTreeMap<String, String>,
    pub deployment: DeploymentConfig,
    /// Ordered human-readable setup instructions
    pub instructions: Vec<String>,
    /// Full names of the source repositories
    pub source_repos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for compatibility analysis
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub repositories: Vec<Repository>,
}
