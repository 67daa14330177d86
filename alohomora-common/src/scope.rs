///! Scope and role-assignment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account visible to the console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub username: String,
}

/// User group visible to the console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub display_name: String,
    pub member_count: u32,
}

/// Reference to the identity receiving a role assignment.
///
/// Exactly one identity is attached to an assignment; the tagged enum makes
/// a user-and-group combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum IdentityRef {
    User(String),
    Group(String),
}

impl IdentityRef {
    pub fn id(&self) -> &str {
        match self {
            Self::User(id) | Self::Group(id) => id,
        }
    }
}

/// Role catalog origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Default,
    Custom,
}

/// Role definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub display_name: String,
    pub technical_name: String,
    pub role_type: RoleType,
    /// Resource kinds the role declares permissions over
    pub resource_kinds: Vec<String>,
    pub permissions: Vec<String>,
}

/// Whether scope applies to everything under the container or to an
/// explicit subset of clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeBreadth {
    /// All current and future resources under the container
    Everything,
    /// An explicit, non-empty set of clusters
    SpecificClusters,
}

/// Whether scope applies to all projects on the selected clusters or to an
/// explicit, name-matched subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeGranularity {
    /// Every current and future project on the selected clusters
    FullAccess,
    /// An explicit, non-empty set of project names
    LimitedToProjects,
}

/// In-progress selections owned by one wizard session.
///
/// Mutated only through the wizard's transition operations and discarded
/// when the session closes; the assignment builder snapshots it into an
/// immutable [`RoleAssignmentIntent`] on completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeSelection {
    pub identity: Option<IdentityRef>,
    pub breadth: Option<ScopeBreadth>,
    /// Ordered, duplicate-free cluster ids; meaningful only while
    /// `breadth` is `SpecificClusters`
    pub cluster_ids: Vec<String>,
    pub granularity: Option<ScopeGranularity>,
    /// Ordered, duplicate-free project names (not ids): selection must be
    /// name-consistent across clusters in the multi-cluster case
    pub project_names: Vec<String>,
    pub role_id: Option<String>,
}

/// A project name selectable under the current cluster selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOption {
    /// Shared project name, the option key
    pub name: String,
    /// Contributing cluster ids, in selection order
    pub cluster_ids: Vec<String>,
    /// Contributing cluster names, for display
    pub cluster_names: Vec<String>,
}

/// Non-empty ordered set of cluster ids.
///
/// Input guard for the common-scope resolver: an empty selection is a
/// programming-contract violation there, so the type rules it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSelection(Vec<String>);

impl ClusterSelection {
    /// Build from an id list, deduplicating while preserving first-seen
    /// order. Returns `None` when no ids remain.
    pub fn new<I, S>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for id in ids {
            let id = id.into();
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        if seen.is_empty() {
            None
        } else {
            Some(Self(seen))
        }
    }

    pub fn single(id: impl Into<String>) -> Self {
        Self(vec![id.into()])
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_single(&self) -> bool {
        self.0.len() == 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|c| c == id)
    }
}

/// The finished, immutable output describing who gets what role over what
/// resource scope. Produced once per wizard run and never mutated; a new
/// wizard run produces a new intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignmentIntent {
    pub id: String,
    pub identity: IdentityRef,
    pub identity_name: String,
    pub breadth: ScopeBreadth,
    /// Resolved cluster ids; for `Everything` this is the container's
    /// cluster list as of the session snapshot
    pub cluster_ids: Vec<String>,
    pub granularity: ScopeGranularity,
    /// Empty under `FullAccess`: all current and future projects
    pub project_names: Vec<String>,
    pub role_id: String,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ref_tagging() {
        let user = IdentityRef::User("u-1".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"kind\":\"user\""));

        let group: IdentityRef = serde_json::from_str(r#"{"kind":"group","id":"g-7"}"#).unwrap();
        assert_eq!(group, IdentityRef::Group("g-7".to_string()));
        assert_eq!(group.id(), "g-7");
    }

    #[test]
    fn test_cluster_selection_rejects_empty() {
        assert!(ClusterSelection::new(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_cluster_selection_dedup_preserves_order() {
        let selection = ClusterSelection::new(["c-2", "c-1", "c-2", "c-3"]).unwrap();
        assert_eq!(selection.ids(), ["c-2", "c-1", "c-3"]);
        assert_eq!(selection.len(), 3);
        assert!(!selection.is_single());
        assert!(selection.contains("c-1"));
        assert!(!selection.contains("c-4"));
    }

    #[test]
    fn test_scope_selection_starts_empty() {
        let selection = ScopeSelection::default();
        assert!(selection.identity.is_none());
        assert!(selection.breadth.is_none());
        assert!(selection.cluster_ids.is_empty());
        assert!(selection.granularity.is_none());
        assert!(selection.project_names.is_empty());
        assert!(selection.role_id.is_none());
    }

    #[test]
    fn test_intent_serialization_round_trip() {
        let intent = RoleAssignmentIntent {
            id: "ra-1".to_string(),
            identity: IdentityRef::User("u-1".to_string()),
            identity_name: "Ada Lovelace".to_string(),
            breadth: ScopeBreadth::SpecificClusters,
            cluster_ids: vec!["c-1".to_string(), "c-2".to_string()],
            granularity: ScopeGranularity::LimitedToProjects,
            project_names: vec!["billing".to_string()],
            role_id: "r-1".to_string(),
            role_name: "Cluster Viewer".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&intent).unwrap();
        let back: RoleAssignmentIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
    }
}
