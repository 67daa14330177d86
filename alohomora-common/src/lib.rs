//! Common types shared between alohomora-engine and alohomora-cli

pub mod scope;

use serde::{Deserialize, Serialize};

/// Health of a managed cluster as last reported by its agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Ready,
    Degraded,
    Offline,
    #[default]
    Unknown,
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Degraded => write!(f, "degraded"),
            Self::Offline => write!(f, "offline"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Named grouping of clusters, the top scoping container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSet {
    pub id: String,
    pub name: String,
    /// Member clusters in registration order
    pub cluster_ids: Vec<String>,
}

/// A single managed compute cluster, belonging to exactly one cluster set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub cluster_set_id: String,
    pub status: ClusterStatus,
}

/// A namespace within a single cluster.
///
/// Two projects on different clusters are the same logical project iff their
/// names are equal (case-sensitive). The name is the only cross-cluster join
/// key; ids are opaque and never compared across clusters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub cluster_id: String,
}

/// API error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cluster set not found: {0}")]
    ClusterSetNotFound(String),

    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Incomplete selection: {0}")]
    IncompleteSelection(String),

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
