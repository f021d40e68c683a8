//! Per-repository analysis and compatibility types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frameworks the engine can detect, in detection priority order
///
/// Detection is a substring match over name, description, and topics; the
/// first framework in this order whose keyword matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Nextjs,
    Remix,
    React,
    Vue,
    Angular,
    Express,
    Fastapi,
    Django,
    Unknown,
}

impl Framework {
    /// Detection priority; `Unknown` is the fallback and never matched
    pub const DETECTION_ORDER: [Framework; 8] = [
        Framework::Nextjs,
        Framework::Remix,
        Framework::React,
        Framework::Vue,
        Framework::Angular,
        Framework::Express,
        Framework::Fastapi,
        Framework::Django,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nextjs => "nextjs",
            Self::Remix => "remix",
            Self::React => "react",
            Self::Vue => "vue",
            Self::Angular => "angular",
            Self::Express => "express",
            Self::Fastapi => "fastapi",
            Self::Django => "django",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Framework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nextjs" => Ok(Self::Nextjs),
            "remix" => Ok(Self::Remix),
            "react" => Ok(Self::React),
            "vue" => Ok(Self::Vue),
            "angular" => Ok(Self::Angular),
            "express" => Ok(Self::Express),
            "fastapi" => Ok(Self::Fastapi),
            "django" => Ok(Self::Django),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Invalid framework: {s}")),
        }
    }
}

/// Structural layout inferred for a repository or generated for a combination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStructure {
    pub folders: Vec<String>,
    pub entry_points: Vec<String>,
    pub config_files: Vec<String>,
}

/// Analysis derived from repository metadata alone; no source code is fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAnalysis {
    pub framework: Framework,
    pub components: Vec<String>,
    pub dependencies: Vec<String>,
    pub features: Vec<String>,
    pub structure: ProjectStructure,
    pub quality_score: u8,
}

/// Conflict-resolution policy for merged files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    Overwrite,
    Merge,
    #[default]
    SmartMerge,
}

/// Component-merge policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentPolicy {
    All,
    #[default]
    Selective,
    BestOfBreed,
}

/// Dependency unification policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyPolicy {
    #[default]
    Unified,
    Separate,
    MicroFrontend,
}

/// Policy choices governing one combination; chosen once, immutable after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStrategy {
    pub target_framework: Framework,
    pub conflict_policy: ConflictPolicy,
    pub component_policy: ComponentPolicy,
    pub dependency_policy: DependencyPolicy,
}

impl MergeStrategy {
    /// Engine-wide default policies for a chosen target framework
    pub fn defaults_for(target_framework: Framework) -> Self {
        Self {
            target_framework,
            conflict_policy: ConflictPolicy::default(),
            component_policy: ComponentPolicy::default(),
            dependency_policy: DependencyPolicy::default(),
        }
    }
}

/// Kind of compatibility conflict detected across repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Framework,
    Dependency,
    Architecture,
}

/// One detected conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityConflict {
    pub kind: ConflictKind,
    pub description: String,
}

/// Result of a multi-repository compatibility analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    /// Bounded 0-100
    pub score: u8,
    pub conflicts: Vec<CompatibilityConflict>,
    pub suggestions: Vec<String>,
}
