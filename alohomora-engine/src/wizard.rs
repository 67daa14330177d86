///! Role-assignment wizard state machine
///!
///! Owns the wizard cursor and the in-progress scope selection. The session
///! is the single authority for step gating: forward navigation runs only
///! when the current step's completion predicate holds, and an illegal
///! transition request is ignored rather than surfaced as an error. There is
///! no error state, only "not yet allowed to advance".

use alohomora_common::scope::{
    ClusterSelection, IdentityRef, ProjectOption, RoleAssignmentIntent, ScopeBreadth,
    ScopeGranularity, ScopeSelection,
};
use alohomora_common::{Cluster, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::assignment;
use crate::inventory::InventorySnapshot;
use crate::resolver;

/// Primary wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryStep {
    Identity,
    Scope,
    Role,
    Review,
}

impl PrimaryStep {
    fn index(&self) -> usize {
        match self {
            Self::Identity => 0,
            Self::Scope => 1,
            Self::Role => 2,
            Self::Review => 3,
        }
    }
}

impl std::fmt::Display for PrimaryStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Scope => write!(f, "scope"),
            Self::Role => write!(f, "role"),
            Self::Review => write!(f, "review"),
        }
    }
}

/// Sub-steps within the Scope step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeSubStep {
    SelectClusters,
    DefineGranularity,
    SelectProjects,
}

/// Read-only wizard position; `sub_step` is set only while on Scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardCursor {
    pub step: PrimaryStep,
    pub sub_step: Option<ScopeSubStep>,
}

/// Per-context wizard configuration.
///
/// The cluster, cluster-set and group entry points of the console are one
/// code path parameterized here: `cluster_set` narrows selectable clusters
/// to one container, `preset_identity` skips the Identity step for wizards
/// opened from an identity page.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Container filter: only clusters of this cluster set are selectable
    pub cluster_set: Option<String>,
    /// Pre-selected identity; the Identity step is skipped when it resolves
    pub preset_identity: Option<IdentityRef>,
    /// Switch granularity back to full access when a cluster change leaves
    /// the common-project set empty; when off, the granularity choice is
    /// cleared instead and must be re-made
    pub auto_full_access_fallback: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            cluster_set: None,
            preset_identity: None,
            auto_full_access_fallback: true,
        }
    }
}

/// Availability of the limited-to-projects choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitedChoice {
    pub enabled: bool,
    pub reason: Option<String>,
}

/// Display strings for the Review step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub identity: String,
    pub scope: String,
    pub role: String,
}

/// One in-progress role-assignment wizard.
///
/// Owns an exclusive [`ScopeSelection`] and an inventory snapshot taken at
/// open; both are discarded when the session is dropped. All operations are
/// synchronous and strictly sequential.
pub struct WizardSession {
    config: WizardConfig,
    inventory: InventorySnapshot,
    cursor: WizardCursor,
    selection: ScopeSelection,
    completed: HashSet<PrimaryStep>,
}

impl WizardSession {
    pub fn new(inventory: InventorySnapshot, config: WizardConfig) -> Self {
        let mut selection = ScopeSelection::default();
        let mut completed = HashSet::new();
        let mut cursor = WizardCursor {
            step: PrimaryStep::Identity,
            sub_step: None,
        };

        if let Some(identity) = &config.preset_identity {
            if inventory.identity_display_name(identity).is_some() {
                selection.identity = Some(identity.clone());
                completed.insert(PrimaryStep::Identity);
                cursor = WizardCursor {
                    step: PrimaryStep::Scope,
                    sub_step: Some(ScopeSubStep::SelectClusters),
                };
            } else {
                warn!(identity = ?identity, "Preset identity not in inventory, starting at identity step");
            }
        }

        Self {
            config,
            inventory,
            cursor,
            selection,
            completed,
        }
    }

    /// Current wizard position
    pub fn cursor(&self) -> WizardCursor {
        self.cursor
    }

    /// Current in-progress selections, for rendering
    pub fn selection(&self) -> &ScopeSelection {
        &self.selection
    }

    /// The session's inventory snapshot
    pub fn inventory(&self) -> &InventorySnapshot {
        &self.inventory
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Clusters selectable under the session's container filter
    pub fn selectable_clusters(&self) -> Vec<Cluster> {
        resolver::selectable_clusters(self.config.cluster_set.as_deref(), &self.inventory.clusters)
    }

    /// Live common-project options for the current cluster selection
    pub fn selectable_projects(&self) -> Vec<ProjectOption> {
        match ClusterSelection::new(self.selection.cluster_ids.iter().cloned()) {
            Some(selection) => resolver::selectable_projects(
                &selection,
                &self.inventory.projects,
                &self.inventory.clusters,
            ),
            None => Vec::new(),
        }
    }

    /// Whether the limited-to-projects choice is currently offered, with a
    /// reason when it is not
    pub fn limited_choice(&self) -> LimitedChoice {
        if self.selection.cluster_ids.is_empty() {
            return LimitedChoice {
                enabled: false,
                reason: Some("Select at least one cluster first".to_string()),
            };
        }
        if self.selectable_projects().is_empty() {
            let reason = if self.selection.cluster_ids.len() == 1 {
                "No projects exist on the selected cluster".to_string()
            } else {
                "No common projects found across the selected clusters".to_string()
            };
            return LimitedChoice {
                enabled: false,
                reason: Some(reason),
            };
        }
        LimitedChoice {
            enabled: true,
            reason: None,
        }
    }

    /// Select the user receiving the assignment
    pub fn select_user(&mut self, user_id: &str) {
        if self.cursor.step != PrimaryStep::Identity {
            debug!(step = %self.cursor.step, "Ignoring user selection outside identity step");
            return;
        }
        if self.inventory.get_user(user_id).is_none() {
            warn!(user_id = user_id, "Ignoring selection of unknown user");
            return;
        }
        self.selection.identity = Some(IdentityRef::User(user_id.to_string()));
    }

    /// Select the group receiving the assignment
    pub fn select_group(&mut self, group_id: &str) {
        if self.cursor.step != PrimaryStep::Identity {
            debug!(step = %self.cursor.step, "Ignoring group selection outside identity step");
            return;
        }
        if self.inventory.get_group(group_id).is_none() {
            warn!(group_id = group_id, "Ignoring selection of unknown group");
            return;
        }
        self.selection.identity = Some(IdentityRef::Group(group_id.to_string()));
    }

    /// Choose between everything-under-container and specific clusters
    pub fn set_breadth(&mut self, breadth: ScopeBreadth) {
        if !self.at_sub_step(ScopeSubStep::SelectClusters) {
            debug!("Ignoring breadth change outside cluster selection");
            return;
        }
        self.selection.breadth = Some(breadth);
    }

    /// Select or deselect a cluster. Recomputes the selectable-project set
    /// and prunes project selections that no longer hold, but never moves
    /// the cursor by itself.
    pub fn toggle_cluster(&mut self, cluster_id: &str) {
        if !self.at_sub_step(ScopeSubStep::SelectClusters) {
            debug!("Ignoring cluster toggle outside cluster selection");
            return;
        }
        if self.selection.breadth != Some(ScopeBreadth::SpecificClusters) {
            debug!("Ignoring cluster toggle while breadth is not specific clusters");
            return;
        }
        if !self.selectable_clusters().iter().any(|c| c.id == cluster_id) {
            warn!(cluster_id = cluster_id, "Ignoring toggle of unselectable cluster");
            return;
        }

        if self.selection.cluster_ids.iter().any(|id| id == cluster_id) {
            self.selection.cluster_ids.retain(|id| id != cluster_id);
        } else {
            self.selection.cluster_ids.push(cluster_id.to_string());
        }

        self.reconcile_projects();
    }

    /// Choose full access vs. limited-to-projects. Attempting the limited
    /// choice while it is disabled is a no-op.
    pub fn choose_granularity(&mut self, granularity: ScopeGranularity) {
        if !self.at_sub_step(ScopeSubStep::DefineGranularity) {
            debug!("Ignoring granularity change outside granularity sub-step");
            return;
        }
        if granularity == ScopeGranularity::LimitedToProjects {
            let choice = self.limited_choice();
            if !choice.enabled {
                debug!(reason = ?choice.reason, "Limited-to-projects choice is disabled");
                return;
            }
        }
        self.selection.granularity = Some(granularity);
    }

    /// Select or deselect a project by name
    pub fn toggle_project(&mut self, name: &str) {
        if !self.at_sub_step(ScopeSubStep::SelectProjects) {
            debug!("Ignoring project toggle outside project selection");
            return;
        }
        if !self.selectable_projects().iter().any(|o| o.name == name) {
            warn!(project = name, "Ignoring toggle of unselectable project");
            return;
        }

        if self.selection.project_names.iter().any(|n| n == name) {
            self.selection.project_names.retain(|n| n != name);
        } else {
            self.selection.project_names.push(name.to_string());
        }
    }

    /// Select the role to assign
    pub fn select_role(&mut self, role_id: &str) {
        if self.cursor.step != PrimaryStep::Role {
            debug!(step = %self.cursor.step, "Ignoring role selection outside role step");
            return;
        }
        if self.inventory.get_role(role_id).is_none() {
            warn!(role_id = role_id, "Ignoring selection of unknown role");
            return;
        }
        self.selection.role_id = Some(role_id.to_string());
    }

    /// Completion predicate for a primary step
    pub fn step_complete(&self, step: PrimaryStep) -> bool {
        match step {
            PrimaryStep::Identity => self.selection.identity.is_some(),
            PrimaryStep::Scope => match self.selection.breadth {
                None => false,
                Some(ScopeBreadth::Everything) => true,
                Some(ScopeBreadth::SpecificClusters) => {
                    !self.selection.cluster_ids.is_empty()
                        && match self.selection.granularity {
                            Some(ScopeGranularity::FullAccess) => true,
                            Some(ScopeGranularity::LimitedToProjects) => {
                                !self.selection.project_names.is_empty()
                            }
                            None => false,
                        }
                }
            },
            PrimaryStep::Role => self.selection.role_id.is_some(),
            PrimaryStep::Review => {
                self.step_complete(PrimaryStep::Identity)
                    && self.step_complete(PrimaryStep::Scope)
                    && self.step_complete(PrimaryStep::Role)
            }
        }
    }

    /// Completion predicate for the current sub-step, gating Next
    fn sub_step_complete(&self, sub_step: ScopeSubStep) -> bool {
        match sub_step {
            ScopeSubStep::SelectClusters => match self.selection.breadth {
                Some(ScopeBreadth::Everything) => true,
                Some(ScopeBreadth::SpecificClusters) => !self.selection.cluster_ids.is_empty(),
                None => false,
            },
            ScopeSubStep::DefineGranularity => self.selection.granularity.is_some(),
            ScopeSubStep::SelectProjects => !self.selection.project_names.is_empty(),
        }
    }

    /// Advance one step or sub-step. A no-op when the current position's
    /// completion predicate does not hold.
    pub fn next(&mut self) {
        match (self.cursor.step, self.cursor.sub_step) {
            (PrimaryStep::Identity, _) => {
                if !self.step_complete(PrimaryStep::Identity) {
                    debug!("Next ignored: no identity selected");
                    return;
                }
                self.completed.insert(PrimaryStep::Identity);
                self.cursor = WizardCursor {
                    step: PrimaryStep::Scope,
                    sub_step: Some(ScopeSubStep::SelectClusters),
                };
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::SelectClusters)) => {
                if !self.sub_step_complete(ScopeSubStep::SelectClusters) {
                    debug!("Next ignored: cluster selection incomplete");
                    return;
                }
                if self.selection.breadth == Some(ScopeBreadth::Everything) {
                    self.enter_role_step();
                } else {
                    self.cursor.sub_step = Some(ScopeSubStep::DefineGranularity);
                }
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::DefineGranularity)) => {
                match self.selection.granularity {
                    None => debug!("Next ignored: no granularity chosen"),
                    Some(ScopeGranularity::FullAccess) => self.enter_role_step(),
                    Some(ScopeGranularity::LimitedToProjects) => {
                        if self.selectable_projects().is_empty() {
                            // Degenerate all-access fallback: nothing left
                            // to limit to
                            info!("No selectable projects remain, falling back to full access");
                            self.selection.granularity = Some(ScopeGranularity::FullAccess);
                            self.selection.project_names.clear();
                            self.enter_role_step();
                        } else {
                            self.cursor.sub_step = Some(ScopeSubStep::SelectProjects);
                        }
                    }
                }
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::SelectProjects)) => {
                if !self.sub_step_complete(ScopeSubStep::SelectProjects) {
                    debug!("Next ignored: no project selected");
                    return;
                }
                self.enter_role_step();
            }
            (PrimaryStep::Scope, None) => {
                // Scope without a sub-step is unreachable through the
                // transition operations; repair the cursor
                self.cursor.sub_step = Some(ScopeSubStep::SelectClusters);
            }
            (PrimaryStep::Role, _) => {
                if !self.step_complete(PrimaryStep::Role) {
                    debug!("Next ignored: no role selected");
                    return;
                }
                self.completed.insert(PrimaryStep::Role);
                self.completed.insert(PrimaryStep::Review);
                self.cursor = WizardCursor {
                    step: PrimaryStep::Review,
                    sub_step: None,
                };
            }
            (PrimaryStep::Review, _) => {
                debug!("Next ignored: review is the final step");
            }
        }
    }

    /// Step backwards without losing any selection
    pub fn back(&mut self) {
        match (self.cursor.step, self.cursor.sub_step) {
            (PrimaryStep::Identity, _) => {
                debug!("Back ignored: already at the first step");
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::SelectClusters)) | (PrimaryStep::Scope, None) => {
                if self.config.preset_identity.is_some() {
                    debug!("Back ignored: identity step not part of this wizard");
                    return;
                }
                self.cursor = WizardCursor {
                    step: PrimaryStep::Identity,
                    sub_step: None,
                };
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::DefineGranularity)) => {
                self.cursor.sub_step = Some(ScopeSubStep::SelectClusters);
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::SelectProjects)) => {
                // Checked projects survive the detour
                self.cursor.sub_step = Some(ScopeSubStep::DefineGranularity);
            }
            (PrimaryStep::Role, _) => {
                self.cursor = WizardCursor {
                    step: PrimaryStep::Scope,
                    sub_step: Some(self.deepest_scope_sub_step()),
                };
            }
            (PrimaryStep::Review, _) => {
                self.cursor = WizardCursor {
                    step: PrimaryStep::Role,
                    sub_step: None,
                };
            }
        }
    }

    /// Jump back into an already-completed earlier step (the Review screen's
    /// "Edit step" action). Returning to Review happens only by running Next
    /// through the remaining steps again.
    pub fn edit_step(&mut self, step: PrimaryStep) {
        if step.index() >= self.cursor.step.index() {
            debug!(step = %step, "Edit ignored: not an earlier step");
            return;
        }
        if !self.completed.contains(&step) {
            debug!(step = %step, "Edit ignored: step never completed");
            return;
        }
        if step == PrimaryStep::Identity && self.config.preset_identity.is_some() {
            debug!("Edit ignored: identity step not part of this wizard");
            return;
        }

        self.cursor = WizardCursor {
            step,
            sub_step: (step == PrimaryStep::Scope).then_some(ScopeSubStep::SelectClusters),
        };
    }

    /// Display strings for the Review step
    pub fn review_summary(&self) -> ReviewSummary {
        let identity = self
            .selection
            .identity
            .as_ref()
            .and_then(|i| self.inventory.identity_display_name(i))
            .unwrap_or_else(|| "(none)".to_string());

        let scope = match self.selection.breadth {
            Some(ScopeBreadth::Everything) => match &self.config.cluster_set {
                Some(set_id) => {
                    let set_name = self
                        .inventory
                        .get_cluster_set(set_id)
                        .map(|cs| cs.name.clone())
                        .unwrap_or_else(|| set_id.clone());
                    format!("Everything in cluster set {}", set_name)
                }
                None => "Everything".to_string(),
            },
            Some(ScopeBreadth::SpecificClusters) => {
                let cluster_names: Vec<String> = self
                    .selection
                    .cluster_ids
                    .iter()
                    .map(|id| {
                        self.inventory
                            .get_cluster(id)
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| id.clone())
                    })
                    .collect();
                match self.selection.granularity {
                    Some(ScopeGranularity::LimitedToProjects) => format!(
                        "Clusters {} limited to projects {}",
                        cluster_names.join(", "),
                        self.selection.project_names.join(", ")
                    ),
                    _ => format!("All projects on clusters {}", cluster_names.join(", ")),
                }
            }
            None => "(none)".to_string(),
        };

        let role = self
            .selection
            .role_id
            .as_deref()
            .and_then(|id| self.inventory.get_role(id))
            .map(|r| r.display_name.clone())
            .unwrap_or_else(|| "(none)".to_string());

        ReviewSummary {
            identity,
            scope,
            role,
        }
    }

    /// Snapshot the session into an immutable role-assignment intent.
    ///
    /// Invocable only at Review with every step gate satisfied; anything
    /// else is a caller contract violation and reported as an error.
    pub fn finish(&self) -> Result<RoleAssignmentIntent> {
        if self.cursor.step != PrimaryStep::Review {
            return Err(alohomora_common::Error::IncompleteSelection(
                "Wizard has not reached the review step".to_string(),
            ));
        }
        assignment::build_intent(&self.selection, &self.inventory, &self.config)
    }

    fn at_sub_step(&self, sub_step: ScopeSubStep) -> bool {
        self.cursor.step == PrimaryStep::Scope && self.cursor.sub_step == Some(sub_step)
    }

    fn enter_role_step(&mut self) {
        self.completed.insert(PrimaryStep::Scope);
        self.cursor = WizardCursor {
            step: PrimaryStep::Role,
            sub_step: None,
        };
    }

    /// The sub-step Back from Role should land on
    fn deepest_scope_sub_step(&self) -> ScopeSubStep {
        match self.selection.breadth {
            Some(ScopeBreadth::SpecificClusters) => match self.selection.granularity {
                Some(ScopeGranularity::LimitedToProjects) if !self.selectable_projects().is_empty() => {
                    ScopeSubStep::SelectProjects
                }
                Some(_) => ScopeSubStep::DefineGranularity,
                None => ScopeSubStep::SelectClusters,
            },
            _ => ScopeSubStep::SelectClusters,
        }
    }

    /// Drop project selections a cluster change invalidated, and re-evaluate
    /// the granularity choice when the option set ran dry
    fn reconcile_projects(&mut self) {
        if self.selection.cluster_ids.is_empty() {
            if !self.selection.project_names.is_empty() {
                debug!("Cluster selection emptied, clearing project selections");
                self.selection.project_names.clear();
            }
            return;
        }

        let options = self.selectable_projects();
        let before = self.selection.project_names.len();
        self.selection
            .project_names
            .retain(|name| options.iter().any(|o| &o.name == name));
        if self.selection.project_names.len() < before {
            debug!(
                pruned = before - self.selection.project_names.len(),
                "Pruned project selections no longer common to the selected clusters"
            );
        }

        if options.is_empty()
            && self.selection.granularity == Some(ScopeGranularity::LimitedToProjects)
        {
            if self.config.auto_full_access_fallback {
                info!("Common-project set is empty, switching granularity to full access");
                self.selection.granularity = Some(ScopeGranularity::FullAccess);
            } else {
                info!("Common-project set is empty, granularity must be chosen again");
                self.selection.granularity = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alohomora_common::scope::RoleType;
    use alohomora_common::{ClusterStatus, Project};

    fn snapshot() -> InventorySnapshot {
        let cluster = |id: &str, name: &str, set: &str| Cluster {
            id: id.to_string(),
            name: name.to_string(),
            cluster_set_id: set.to_string(),
            status: ClusterStatus::Ready,
        };
        let project = |id: &str, name: &str, cluster: &str| Project {
            id: id.to_string(),
            name: name.to_string(),
            cluster_id: cluster.to_string(),
        };

        InventorySnapshot {
            cluster_sets: vec![alohomora_common::ClusterSet {
                id: "cs-1".to_string(),
                name: "production".to_string(),
                cluster_ids: vec!["c-1".to_string(), "c-2".to_string()],
            }],
            clusters: vec![
                cluster("c-1", "east-1", "cs-1"),
                cluster("c-2", "west-1", "cs-1"),
            ],
            projects: vec![
                project("p-1", "p1", "c-1"),
                project("p-2", "p2", "c-1"),
                project("p-3", "p2", "c-2"),
                project("p-4", "p3", "c-2"),
            ],
            users: vec![alohomora_common::scope::User {
                id: "u-1".to_string(),
                display_name: "Ada Lovelace".to_string(),
                username: "ada.lovelace".to_string(),
            }],
            groups: vec![alohomora_common::scope::Group {
                id: "g-1".to_string(),
                display_name: "Platform Operators".to_string(),
                member_count: 12,
            }],
            roles: vec![alohomora_common::scope::Role {
                id: "r-1".to_string(),
                display_name: "Cluster Viewer".to_string(),
                technical_name: "cluster-viewer".to_string(),
                role_type: RoleType::Default,
                resource_kinds: vec!["virtualmachines".to_string()],
                permissions: vec!["get".to_string()],
            }],
        }
    }

    fn session() -> WizardSession {
        WizardSession::new(snapshot(), WizardConfig::default())
    }

    #[test]
    fn test_opens_at_identity_step() {
        let session = session();
        assert_eq!(session.cursor().step, PrimaryStep::Identity);
        assert!(session.cursor().sub_step.is_none());
    }

    #[test]
    fn test_next_without_identity_is_noop() {
        let mut session = session();
        session.next();
        assert_eq!(session.cursor().step, PrimaryStep::Identity);
    }

    #[test]
    fn test_unknown_user_selection_ignored() {
        let mut session = session();
        session.select_user("u-404");
        assert!(session.selection().identity.is_none());
    }

    #[test]
    fn test_identity_advances_to_cluster_selection() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        assert_eq!(session.cursor().step, PrimaryStep::Scope);
        assert_eq!(
            session.cursor().sub_step,
            Some(ScopeSubStep::SelectClusters)
        );
    }

    #[test]
    fn test_everything_breadth_skips_granularity() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::Everything);
        session.next();
        assert_eq!(session.cursor().step, PrimaryStep::Role);
    }

    #[test]
    fn test_specific_clusters_requires_selection() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.next();
        // No cluster selected yet
        assert_eq!(
            session.cursor().sub_step,
            Some(ScopeSubStep::SelectClusters)
        );

        session.toggle_cluster("c-1");
        session.next();
        assert_eq!(
            session.cursor().sub_step,
            Some(ScopeSubStep::DefineGranularity)
        );
    }

    #[test]
    fn test_cluster_toggle_requires_specific_breadth() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.toggle_cluster("c-1");
        assert!(session.selection().cluster_ids.is_empty());
    }

    #[test]
    fn test_limited_choice_disabled_reason() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);

        let choice = session.limited_choice();
        assert!(!choice.enabled);
        assert!(choice.reason.unwrap().contains("at least one cluster"));
    }

    #[test]
    fn test_granularity_gate_blocks_empty_selection() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.next();
        session.next();
        // No granularity chosen yet
        assert_eq!(
            session.cursor().sub_step,
            Some(ScopeSubStep::DefineGranularity)
        );
    }

    #[test]
    fn test_full_access_path_reaches_review() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.next();
        session.choose_granularity(ScopeGranularity::FullAccess);
        session.next();
        session.select_role("r-1");
        session.next();
        assert_eq!(session.cursor().step, PrimaryStep::Review);
    }

    #[test]
    fn test_project_selection_path() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.toggle_cluster("c-2");
        session.next();
        session.choose_granularity(ScopeGranularity::LimitedToProjects);
        session.next();
        assert_eq!(
            session.cursor().sub_step,
            Some(ScopeSubStep::SelectProjects)
        );

        // Only p2 is common to both clusters
        session.toggle_project("p1");
        assert!(session.selection().project_names.is_empty());
        session.toggle_project("p2");
        assert_eq!(session.selection().project_names, ["p2"]);

        session.next();
        assert_eq!(session.cursor().step, PrimaryStep::Role);
    }

    #[test]
    fn test_back_from_projects_preserves_checked_names() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.next();
        session.choose_granularity(ScopeGranularity::LimitedToProjects);
        session.next();
        session.toggle_project("p1");

        session.back();
        assert_eq!(
            session.cursor().sub_step,
            Some(ScopeSubStep::DefineGranularity)
        );
        assert_eq!(session.selection().project_names, ["p1"]);

        session.next();
        assert_eq!(session.selection().project_names, ["p1"]);
    }

    #[test]
    fn test_cluster_change_prunes_stale_projects() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.next();
        session.choose_granularity(ScopeGranularity::LimitedToProjects);
        session.next();
        session.toggle_project("p1");
        session.toggle_project("p2");

        // Go back and widen the selection; p1 is not on c-2
        session.back();
        session.back();
        session.toggle_cluster("c-2");
        assert_eq!(session.selection().project_names, ["p2"]);
    }

    #[test]
    fn test_empty_intersection_falls_back_to_full_access() {
        let mut snapshot = snapshot();
        snapshot.projects = vec![
            Project {
                id: "p-1".to_string(),
                name: "only-east".to_string(),
                cluster_id: "c-1".to_string(),
            },
            Project {
                id: "p-2".to_string(),
                name: "only-west".to_string(),
                cluster_id: "c-2".to_string(),
            },
        ];
        let mut session = WizardSession::new(snapshot, WizardConfig::default());

        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.next();
        session.choose_granularity(ScopeGranularity::LimitedToProjects);
        session.next();
        session.toggle_project("only-east");
        session.back();
        session.back();

        // Adding the second cluster empties the intersection
        session.toggle_cluster("c-2");
        assert!(session.selection().project_names.is_empty());
        assert_eq!(
            session.selection().granularity,
            Some(ScopeGranularity::FullAccess)
        );
        assert!(!session.limited_choice().enabled);
    }

    #[test]
    fn test_fallback_disabled_clears_granularity_instead() {
        let mut snapshot = snapshot();
        snapshot.projects = vec![Project {
            id: "p-1".to_string(),
            name: "only-east".to_string(),
            cluster_id: "c-1".to_string(),
        }];
        let config = WizardConfig {
            auto_full_access_fallback: false,
            ..WizardConfig::default()
        };
        let mut session = WizardSession::new(snapshot, config);

        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.next();
        session.choose_granularity(ScopeGranularity::LimitedToProjects);
        session.next();
        session.toggle_project("only-east");
        session.back();
        session.back();
        session.toggle_cluster("c-2");

        assert_eq!(session.selection().granularity, None);
    }

    #[test]
    fn test_choose_disabled_limited_is_noop() {
        let mut snapshot = snapshot();
        snapshot.projects.clear();
        let mut session = WizardSession::new(snapshot, WizardConfig::default());

        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.next();

        session.choose_granularity(ScopeGranularity::LimitedToProjects);
        assert_eq!(session.selection().granularity, None);
        session.choose_granularity(ScopeGranularity::FullAccess);
        assert_eq!(
            session.selection().granularity,
            Some(ScopeGranularity::FullAccess)
        );
    }

    #[test]
    fn test_preset_identity_skips_identity_step() {
        let config = WizardConfig {
            preset_identity: Some(IdentityRef::Group("g-1".to_string())),
            ..WizardConfig::default()
        };
        let mut session = WizardSession::new(snapshot(), config);

        assert_eq!(session.cursor().step, PrimaryStep::Scope);
        // Back does not expose the identity step either
        session.back();
        assert_eq!(session.cursor().step, PrimaryStep::Scope);
    }

    #[test]
    fn test_unresolvable_preset_identity_falls_back() {
        let config = WizardConfig {
            preset_identity: Some(IdentityRef::User("u-404".to_string())),
            ..WizardConfig::default()
        };
        let session = WizardSession::new(snapshot(), config);
        assert_eq!(session.cursor().step, PrimaryStep::Identity);
    }

    #[test]
    fn test_cluster_set_filter_limits_selectable_clusters() {
        let mut snapshot = snapshot();
        snapshot.clusters.push(Cluster {
            id: "c-9".to_string(),
            name: "edge-1".to_string(),
            cluster_set_id: "cs-2".to_string(),
            status: ClusterStatus::Ready,
        });
        let config = WizardConfig {
            cluster_set: Some("cs-1".to_string()),
            ..WizardConfig::default()
        };
        let mut session = WizardSession::new(snapshot, config);

        assert_eq!(session.selectable_clusters().len(), 2);

        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-9");
        assert!(session.selection().cluster_ids.is_empty());
    }

    #[test]
    fn test_edit_step_from_review() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::Everything);
        session.next();
        session.select_role("r-1");
        session.next();
        assert_eq!(session.cursor().step, PrimaryStep::Review);

        session.edit_step(PrimaryStep::Scope);
        assert_eq!(session.cursor().step, PrimaryStep::Scope);
        assert_eq!(
            session.cursor().sub_step,
            Some(ScopeSubStep::SelectClusters)
        );
        // Other selections survive the jump
        assert!(session.selection().identity.is_some());
        assert_eq!(session.selection().role_id.as_deref(), Some("r-1"));
    }

    #[test]
    fn test_edit_step_rejects_forward_and_uncompleted() {
        let mut session = session();
        session.select_user("u-1");
        // Role was never completed
        session.edit_step(PrimaryStep::Role);
        assert_eq!(session.cursor().step, PrimaryStep::Identity);

        session.next();
        // Forward jump is not an edit
        session.edit_step(PrimaryStep::Review);
        assert_eq!(session.cursor().step, PrimaryStep::Scope);
    }

    #[test]
    fn test_review_summary_strings() {
        let mut session = session();
        session.select_user("u-1");
        session.next();
        session.set_breadth(ScopeBreadth::SpecificClusters);
        session.toggle_cluster("c-1");
        session.toggle_cluster("c-2");
        session.next();
        session.choose_granularity(ScopeGranularity::LimitedToProjects);
        session.next();
        session.toggle_project("p2");
        session.next();
        session.select_role("r-1");
        session.next();

        let summary = session.review_summary();
        assert_eq!(summary.identity, "Ada Lovelace");
        assert!(summary.scope.contains("east-1"));
        assert!(summary.scope.contains("west-1"));
        assert!(summary.scope.contains("p2"));
        assert_eq!(summary.role, "Cluster Viewer");
    }

    #[test]
    fn test_finish_before_review_is_an_error() {
        let mut session = session();
        session.select_user("u-1");
        assert!(session.finish().is_err());
        session.next();
        assert!(session.finish().is_err());
    }
}
