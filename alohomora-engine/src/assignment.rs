///! Assignment building and submission
///!
///! Snapshots a fully-gated wizard selection into an immutable
///! [`RoleAssignmentIntent`] and hands it to a submission sink. The builder
///! re-checks every completion invariant: it is the last line of defense
///! against a caller bypassing the wizard gates.

use alohomora_common::scope::{
    ClusterSelection, RoleAssignmentIntent, ScopeBreadth, ScopeGranularity, ScopeSelection,
};
use alohomora_common::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::inventory::InventorySnapshot;
use crate::resolver;
use crate::wizard::WizardConfig;

/// Build an immutable intent from a completed selection.
///
/// Every value is copied out of the selection and the snapshot; the intent
/// shares no storage with the session, so resetting or dropping the wizard
/// afterwards cannot touch it.
pub fn build_intent(
    selection: &ScopeSelection,
    inventory: &InventorySnapshot,
    config: &WizardConfig,
) -> Result<RoleAssignmentIntent> {
    let identity = selection
        .identity
        .clone()
        .ok_or_else(|| Error::IncompleteSelection("No identity selected".to_string()))?;
    let identity_name = inventory
        .identity_display_name(&identity)
        .ok_or_else(|| Error::IdentityNotFound(identity.id().to_string()))?;

    let breadth = selection
        .breadth
        .ok_or_else(|| Error::IncompleteSelection("No scope breadth chosen".to_string()))?;

    let (cluster_ids, granularity, project_names) = match breadth {
        ScopeBreadth::Everything => {
            let cluster_ids = resolver::selectable_clusters(
                config.cluster_set.as_deref(),
                &inventory.clusters,
            )
            .into_iter()
            .map(|c| c.id)
            .collect();
            (cluster_ids, ScopeGranularity::FullAccess, Vec::new())
        }
        ScopeBreadth::SpecificClusters => {
            let cluster_selection = ClusterSelection::new(selection.cluster_ids.iter().cloned())
                .ok_or_else(|| {
                    Error::IncompleteSelection("No clusters selected".to_string())
                })?;

            let granularity = selection.granularity.ok_or_else(|| {
                Error::IncompleteSelection("No granularity chosen".to_string())
            })?;

            let project_names = match granularity {
                ScopeGranularity::FullAccess => Vec::new(),
                ScopeGranularity::LimitedToProjects => {
                    if selection.project_names.is_empty() {
                        return Err(Error::IncompleteSelection(
                            "No projects selected".to_string(),
                        ));
                    }
                    let options = resolver::selectable_projects(
                        &cluster_selection,
                        &inventory.projects,
                        &inventory.clusters,
                    );
                    for name in &selection.project_names {
                        if !options.iter().any(|o| &o.name == name) {
                            return Err(Error::IncompleteSelection(format!(
                                "Project {} is not common to the selected clusters",
                                name
                            )));
                        }
                    }
                    selection.project_names.clone()
                }
            };

            (
                cluster_selection.ids().to_vec(),
                granularity,
                project_names,
            )
        }
    };

    let role_id = selection
        .role_id
        .clone()
        .ok_or_else(|| Error::IncompleteSelection("No role selected".to_string()))?;
    let role_name = inventory
        .get_role(&role_id)
        .map(|r| r.display_name.clone())
        .ok_or_else(|| Error::RoleNotFound(role_id.clone()))?;

    let intent = RoleAssignmentIntent {
        id: uuid::Uuid::new_v4().to_string(),
        identity,
        identity_name,
        breadth,
        cluster_ids,
        granularity,
        project_names,
        role_id,
        role_name,
        created_at: chrono::Utc::now(),
    };

    info!(
        intent_id = %intent.id,
        identity = %intent.identity_name,
        role = %intent.role_name,
        clusters = intent.cluster_ids.len(),
        "Role assignment intent built"
    );
    Ok(intent)
}

/// Submission collaborator receiving finished intents
#[async_trait]
pub trait AssignmentSink: Send + Sync {
    async fn submit(&self, intent: &RoleAssignmentIntent) -> Result<()>;
}

/// Sink collecting intents in memory
pub struct InMemorySink {
    submitted: Arc<RwLock<Vec<RoleAssignmentIntent>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self {
            submitted: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// All intents submitted so far, in submission order
    pub async fn submitted(&self) -> Vec<RoleAssignmentIntent> {
        self.submitted.read().await.clone()
    }
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssignmentSink for InMemorySink {
    async fn submit(&self, intent: &RoleAssignmentIntent) -> Result<()> {
        self.submitted.write().await.push(intent.clone());
        Ok(())
    }
}

/// Sink that only records the submission in the log
pub struct LoggingSink;

#[async_trait]
impl AssignmentSink for LoggingSink {
    async fn submit(&self, intent: &RoleAssignmentIntent) -> Result<()> {
        info!(
            intent_id = %intent.id,
            identity = %intent.identity_name,
            role = %intent.role_name,
            breadth = ?intent.breadth,
            granularity = ?intent.granularity,
            "Role assignment submitted"
        );
        Ok(())
    }
}
