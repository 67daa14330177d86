///! Inventory of scoping resources
///!
///! Holds the materialized cluster sets, clusters, projects, identities and
///! roles the console works against. Wizard sessions never read the live
///! stores; they take an immutable snapshot when they open and keep it for
///! the whole session.

use alohomora_common::scope::{Group, IdentityRef, Role, RoleType, User};
use alohomora_common::{Cluster, ClusterSet, ClusterStatus, Error, Project, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::resolver;
use crate::validation;
use crate::wizard::{WizardConfig, WizardSession};

/// Immutable inventory view held by one wizard session
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    pub cluster_sets: Vec<ClusterSet>,
    pub clusters: Vec<Cluster>,
    pub projects: Vec<Project>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub roles: Vec<Role>,
}

impl InventorySnapshot {
    pub fn list_cluster_sets(&self) -> &[ClusterSet] {
        &self.cluster_sets
    }

    /// Clusters, optionally filtered by owning cluster set
    pub fn list_clusters(&self, cluster_set_id: Option<&str>) -> Vec<Cluster> {
        resolver::selectable_clusters(cluster_set_id, &self.clusters)
    }

    /// Projects, optionally filtered by owning cluster
    pub fn list_projects(&self, cluster_id: Option<&str>) -> Vec<Project> {
        match cluster_id {
            Some(id) => self
                .projects
                .iter()
                .filter(|p| p.cluster_id == id)
                .cloned()
                .collect(),
            None => self.projects.clone(),
        }
    }

    pub fn list_users(&self) -> &[User] {
        &self.users
    }

    pub fn list_groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn list_roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn get_cluster_set(&self, id: &str) -> Option<&ClusterSet> {
        self.cluster_sets.iter().find(|cs| cs.id == id)
    }

    pub fn get_cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn get_group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn get_role(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn find_cluster_set_by_name(&self, name: &str) -> Option<&ClusterSet> {
        self.cluster_sets.iter().find(|cs| cs.name == name)
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn find_group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.display_name == name)
    }

    /// Display name for an identity reference, if it resolves
    pub fn identity_display_name(&self, identity: &IdentityRef) -> Option<String> {
        match identity {
            IdentityRef::User(id) => self.get_user(id).map(|u| u.display_name.clone()),
            IdentityRef::Group(id) => self.get_group(id).map(|g| g.display_name.clone()),
        }
    }
}

/// Inventory fixture file (TOML). References between records are by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFixture {
    #[serde(default)]
    pub cluster_sets: Vec<FixtureClusterSet>,
    #[serde(default)]
    pub clusters: Vec<FixtureCluster>,
    #[serde(default)]
    pub projects: Vec<FixtureProject>,
    #[serde(default)]
    pub users: Vec<FixtureUser>,
    #[serde(default)]
    pub groups: Vec<FixtureGroup>,
    #[serde(default)]
    pub roles: Vec<FixtureRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureClusterSet {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureCluster {
    pub name: String,
    pub cluster_set: String,
    #[serde(default)]
    pub status: ClusterStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureProject {
    pub name: String,
    pub cluster: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureUser {
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureGroup {
    pub display_name: String,
    #[serde(default)]
    pub member_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRole {
    pub display_name: String,
    pub technical_name: String,
    #[serde(default)]
    pub resource_kinds: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Inventory manager
pub struct InventoryManager {
    cluster_sets: Arc<RwLock<Vec<ClusterSet>>>,
    clusters: Arc<RwLock<Vec<Cluster>>>,
    projects: Arc<RwLock<Vec<Project>>>,
    users: Arc<RwLock<Vec<User>>>,
    groups: Arc<RwLock<Vec<Group>>>,
    roles: Arc<RwLock<Vec<Role>>>,
}

impl InventoryManager {
    pub fn new() -> Self {
        Self {
            cluster_sets: Arc::new(RwLock::new(Vec::new())),
            clusters: Arc::new(RwLock::new(Vec::new())),
            projects: Arc::new(RwLock::new(Vec::new())),
            users: Arc::new(RwLock::new(Vec::new())),
            groups: Arc::new(RwLock::new(Vec::new())),
            roles: Arc::new(RwLock::new(builtin_roles())),
        }
    }

    /// Add a cluster set
    pub async fn add_cluster_set(&self, name: &str) -> Result<ClusterSet> {
        validation::validate_resource_name("Cluster set", name)?;

        let mut sets = self.cluster_sets.write().await;
        if sets.iter().any(|cs| cs.name == name) {
            return Err(Error::Validation(format!(
                "Cluster set {} already exists",
                name
            )));
        }

        let set = ClusterSet {
            id: new_id(),
            name: name.to_string(),
            cluster_ids: Vec::new(),
        };
        sets.push(set.clone());

        info!(cluster_set = %set.name, id = %set.id, "Cluster set added");
        Ok(set)
    }

    /// Add a cluster to an existing cluster set
    pub async fn add_cluster(
        &self,
        name: &str,
        cluster_set_id: &str,
        status: ClusterStatus,
    ) -> Result<Cluster> {
        validation::validate_resource_name("Cluster", name)?;

        let mut sets = self.cluster_sets.write().await;
        let set = sets
            .iter_mut()
            .find(|cs| cs.id == cluster_set_id)
            .ok_or_else(|| Error::ClusterSetNotFound(cluster_set_id.to_string()))?;

        let mut clusters = self.clusters.write().await;
        if clusters.iter().any(|c| c.name == name) {
            return Err(Error::Validation(format!(
                "Cluster {} already exists",
                name
            )));
        }

        let cluster = Cluster {
            id: new_id(),
            name: name.to_string(),
            cluster_set_id: set.id.clone(),
            status,
        };
        set.cluster_ids.push(cluster.id.clone());
        clusters.push(cluster.clone());

        info!(
            cluster = %cluster.name,
            cluster_set = %set.name,
            "Cluster added"
        );
        Ok(cluster)
    }

    /// Add a project (namespace) to an existing cluster
    pub async fn add_project(&self, name: &str, cluster_id: &str) -> Result<Project> {
        validation::validate_resource_name("Project", name)?;

        let clusters = self.clusters.read().await;
        let cluster = clusters
            .iter()
            .find(|c| c.id == cluster_id)
            .ok_or_else(|| Error::ClusterNotFound(cluster_id.to_string()))?;

        let mut projects = self.projects.write().await;
        // Names recur across clusters (that is the whole point), but must
        // stay unique within one cluster
        if projects
            .iter()
            .any(|p| p.cluster_id == cluster_id && p.name == name)
        {
            return Err(Error::Validation(format!(
                "Project {} already exists on cluster {}",
                name, cluster.name
            )));
        }

        let project = Project {
            id: new_id(),
            name: name.to_string(),
            cluster_id: cluster_id.to_string(),
        };
        projects.push(project.clone());

        debug!(project = %project.name, cluster = %cluster.name, "Project added");
        Ok(project)
    }

    /// Add a user
    pub async fn add_user(&self, username: &str, display_name: &str) -> Result<User> {
        validation::validate_username(username)?;
        validation::validate_display_name(display_name)?;

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(Error::Validation(format!(
                "User {} already exists",
                username
            )));
        }

        let user = User {
            id: new_id(),
            display_name: display_name.to_string(),
            username: username.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    /// Add a group
    pub async fn add_group(&self, display_name: &str, member_count: u32) -> Result<Group> {
        validation::validate_display_name(display_name)?;

        let mut groups = self.groups.write().await;
        if groups.iter().any(|g| g.display_name == display_name) {
            return Err(Error::Validation(format!(
                "Group {} already exists",
                display_name
            )));
        }

        let group = Group {
            id: new_id(),
            display_name: display_name.to_string(),
            member_count,
        };
        groups.push(group.clone());
        Ok(group)
    }

    /// Add a custom role
    pub async fn add_role(
        &self,
        display_name: &str,
        technical_name: &str,
        resource_kinds: Vec<String>,
        permissions: Vec<String>,
    ) -> Result<Role> {
        validation::validate_display_name(display_name)?;
        validation::validate_resource_name("Role", technical_name)?;

        let mut roles = self.roles.write().await;
        if roles.iter().any(|r| r.technical_name == technical_name) {
            return Err(Error::Validation(format!(
                "Role {} already exists",
                technical_name
            )));
        }

        let role = Role {
            id: new_id(),
            display_name: display_name.to_string(),
            technical_name: technical_name.to_string(),
            role_type: RoleType::Custom,
            resource_kinds,
            permissions,
        };
        roles.push(role.clone());

        info!(role = %role.technical_name, "Custom role added");
        Ok(role)
    }

    /// Remove a cluster and every project it owns
    pub async fn remove_cluster(&self, cluster_id: &str) -> Result<()> {
        // Lock order matches add_cluster: sets before clusters
        let mut sets = self.cluster_sets.write().await;
        let mut clusters = self.clusters.write().await;
        let idx = clusters
            .iter()
            .position(|c| c.id == cluster_id)
            .ok_or_else(|| Error::ClusterNotFound(cluster_id.to_string()))?;
        let cluster = clusters.remove(idx);

        if let Some(set) = sets.iter_mut().find(|cs| cs.id == cluster.cluster_set_id) {
            set.cluster_ids.retain(|id| id != cluster_id);
        }

        let mut projects = self.projects.write().await;
        let before = projects.len();
        projects.retain(|p| p.cluster_id != cluster_id);

        info!(
            cluster = %cluster.name,
            removed_projects = before - projects.len(),
            "Cluster removed"
        );
        Ok(())
    }

    /// Remove an empty cluster set
    pub async fn remove_cluster_set(&self, cluster_set_id: &str) -> Result<()> {
        let mut sets = self.cluster_sets.write().await;
        let idx = sets
            .iter()
            .position(|cs| cs.id == cluster_set_id)
            .ok_or_else(|| Error::ClusterSetNotFound(cluster_set_id.to_string()))?;

        if !sets[idx].cluster_ids.is_empty() {
            return Err(Error::Validation(format!(
                "Cluster set {} still contains clusters",
                sets[idx].name
            )));
        }

        let set = sets.remove(idx);
        info!(cluster_set = %set.name, "Cluster set removed");
        Ok(())
    }

    /// Remove a project
    pub async fn remove_project(&self, project_id: &str) -> Result<()> {
        let mut projects = self.projects.write().await;
        let idx = projects
            .iter()
            .position(|p| p.id == project_id)
            .ok_or_else(|| Error::ProjectNotFound(project_id.to_string()))?;
        projects.remove(idx);
        Ok(())
    }

    /// Remove a custom role; built-in roles stay
    pub async fn remove_role(&self, role_id: &str) -> Result<()> {
        let mut roles = self.roles.write().await;
        let idx = roles
            .iter()
            .position(|r| r.id == role_id)
            .ok_or_else(|| Error::RoleNotFound(role_id.to_string()))?;

        if roles[idx].role_type == RoleType::Default {
            return Err(Error::Validation(format!(
                "Cannot remove built-in role {}",
                roles[idx].technical_name
            )));
        }

        roles.remove(idx);
        Ok(())
    }

    /// List all cluster sets
    pub async fn list_cluster_sets(&self) -> Vec<ClusterSet> {
        self.cluster_sets.read().await.clone()
    }

    /// List clusters, optionally filtered by owning cluster set
    pub async fn list_clusters(&self, cluster_set_id: Option<&str>) -> Vec<Cluster> {
        resolver::selectable_clusters(cluster_set_id, &self.clusters.read().await)
    }

    /// List projects, optionally filtered by owning cluster
    pub async fn list_projects(&self, cluster_id: Option<&str>) -> Vec<Project> {
        let projects = self.projects.read().await;
        match cluster_id {
            Some(id) => projects
                .iter()
                .filter(|p| p.cluster_id == id)
                .cloned()
                .collect(),
            None => projects.clone(),
        }
    }

    /// List all users
    pub async fn list_users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// List all groups
    pub async fn list_groups(&self) -> Vec<Group> {
        self.groups.read().await.clone()
    }

    /// List all roles
    pub async fn list_roles(&self) -> Vec<Role> {
        self.roles.read().await.clone()
    }

    /// Take an immutable snapshot of the whole inventory
    pub async fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            cluster_sets: self.cluster_sets.read().await.clone(),
            clusters: self.clusters.read().await.clone(),
            projects: self.projects.read().await.clone(),
            users: self.users.read().await.clone(),
            groups: self.groups.read().await.clone(),
            roles: self.roles.read().await.clone(),
        }
    }

    /// Open a wizard session over a snapshot of the current inventory
    pub async fn open_wizard(&self, config: WizardConfig) -> WizardSession {
        WizardSession::new(self.snapshot().await, config)
    }

    /// Load an inventory fixture from a TOML file
    pub async fn load_fixture(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let fixture: InventoryFixture = toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Invalid inventory fixture: {}", e)))?;
        self.apply_fixture(fixture).await
    }

    /// Apply a fixture, resolving name references to generated ids
    pub async fn apply_fixture(&self, fixture: InventoryFixture) -> Result<()> {
        for set in &fixture.cluster_sets {
            self.add_cluster_set(&set.name).await?;
        }

        for cluster in &fixture.clusters {
            let set_id = self
                .cluster_sets
                .read()
                .await
                .iter()
                .find(|cs| cs.name == cluster.cluster_set)
                .map(|cs| cs.id.clone())
                .ok_or_else(|| Error::ClusterSetNotFound(cluster.cluster_set.clone()))?;
            self.add_cluster(&cluster.name, &set_id, cluster.status.clone())
                .await?;
        }

        for project in &fixture.projects {
            let cluster_id = self
                .clusters
                .read()
                .await
                .iter()
                .find(|c| c.name == project.cluster)
                .map(|c| c.id.clone())
                .ok_or_else(|| Error::ClusterNotFound(project.cluster.clone()))?;
            self.add_project(&project.name, &cluster_id).await?;
        }

        for user in &fixture.users {
            self.add_user(&user.username, &user.display_name).await?;
        }

        for group in &fixture.groups {
            self.add_group(&group.display_name, group.member_count)
                .await?;
        }

        for role in &fixture.roles {
            self.add_role(
                &role.display_name,
                &role.technical_name,
                role.resource_kinds.clone(),
                role.permissions.clone(),
            )
            .await?;
        }

        info!(
            cluster_sets = fixture.cluster_sets.len(),
            clusters = fixture.clusters.len(),
            projects = fixture.projects.len(),
            "Inventory fixture applied"
        );
        Ok(())
    }

    /// Build a manager pre-loaded with the demo inventory
    pub async fn demo() -> Result<Self> {
        let manager = Self::new();

        let production = manager.add_cluster_set("production").await?;
        let staging = manager.add_cluster_set("staging").await?;

        let east = manager
            .add_cluster("east-1", &production.id, ClusterStatus::Ready)
            .await?;
        let west = manager
            .add_cluster("west-1", &production.id, ClusterStatus::Ready)
            .await?;
        let stage = manager
            .add_cluster("stage-1", &staging.id, ClusterStatus::Degraded)
            .await?;

        manager.add_project("billing", &east.id).await?;
        manager.add_project("analytics", &east.id).await?;
        manager.add_project("web-frontend", &east.id).await?;
        manager.add_project("billing", &west.id).await?;
        manager.add_project("web-frontend", &west.id).await?;
        manager.add_project("batch-jobs", &west.id).await?;
        manager.add_project("web-frontend", &stage.id).await?;
        manager.add_project("sandbox", &stage.id).await?;

        manager.add_user("ada.lovelace", "Ada Lovelace").await?;
        manager.add_user("grace.hopper", "Grace Hopper").await?;
        manager.add_user("edsger.dijkstra", "Edsger Dijkstra").await?;

        manager.add_group("Platform Operators", 12).await?;
        manager.add_group("Billing Team", 5).await?;

        manager
            .add_role(
                "Snapshot Administrator",
                "snapshot-admin",
                vec!["virtualmachinesnapshots".to_string()],
                vec![
                    "get".to_string(),
                    "list".to_string(),
                    "create".to_string(),
                    "delete".to_string(),
                ],
            )
            .await?;

        Ok(manager)
    }
}

impl Default for InventoryManager {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Built-in role catalog, seeded at construction
fn builtin_roles() -> Vec<Role> {
    vec![
        Role {
            id: new_id(),
            display_name: "Cluster Administrator".to_string(),
            technical_name: "cluster-admin".to_string(),
            role_type: RoleType::Default,
            resource_kinds: vec!["*".to_string()],
            permissions: vec!["*".to_string()],
        },
        Role {
            id: new_id(),
            display_name: "Cluster Viewer".to_string(),
            technical_name: "cluster-viewer".to_string(),
            role_type: RoleType::Default,
            resource_kinds: vec![
                "virtualmachines".to_string(),
                "datavolumes".to_string(),
                "namespaces".to_string(),
            ],
            permissions: vec!["get".to_string(), "list".to_string(), "watch".to_string()],
        },
        Role {
            id: new_id(),
            display_name: "Project Operator".to_string(),
            technical_name: "project-operator".to_string(),
            role_type: RoleType::Default,
            resource_kinds: vec![
                "virtualmachines".to_string(),
                "virtualmachineinstances".to_string(),
            ],
            permissions: vec![
                "get".to_string(),
                "list".to_string(),
                "create".to_string(),
                "update".to_string(),
                "delete".to_string(),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_roles_seeded() {
        let manager = InventoryManager::new();
        let roles = manager.list_roles().await;

        assert_eq!(roles.len(), 3);
        assert!(roles.iter().all(|r| r.role_type == RoleType::Default));
        assert!(roles.iter().any(|r| r.technical_name == "cluster-admin"));
    }

    #[tokio::test]
    async fn test_add_cluster_requires_cluster_set() {
        let manager = InventoryManager::new();
        let result = manager
            .add_cluster("east-1", "cs-missing", ClusterStatus::Ready)
            .await;

        assert!(matches!(result, Err(Error::ClusterSetNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_cluster_updates_set_membership() {
        let manager = InventoryManager::new();
        let set = manager.add_cluster_set("production").await.unwrap();
        let cluster = manager
            .add_cluster("east-1", &set.id, ClusterStatus::Ready)
            .await
            .unwrap();

        let sets = manager.list_cluster_sets().await;
        assert_eq!(sets[0].cluster_ids, vec![cluster.id]);
    }

    #[tokio::test]
    async fn test_project_name_unique_per_cluster_only() {
        let manager = InventoryManager::new();
        let set = manager.add_cluster_set("production").await.unwrap();
        let east = manager
            .add_cluster("east-1", &set.id, ClusterStatus::Ready)
            .await
            .unwrap();
        let west = manager
            .add_cluster("west-1", &set.id, ClusterStatus::Ready)
            .await
            .unwrap();

        manager.add_project("billing", &east.id).await.unwrap();
        // Same name on another cluster is the common-project case
        manager.add_project("billing", &west.id).await.unwrap();
        // Duplicate on the same cluster is rejected
        assert!(manager.add_project("billing", &east.id).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let manager = InventoryManager::new();
        assert!(manager.add_cluster_set("Prod Cluster").await.is_err());

        let set = manager.add_cluster_set("production").await.unwrap();
        assert!(manager
            .add_cluster("East_1", &set.id, ClusterStatus::Ready)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_remove_cluster_cascades_projects() {
        let manager = InventoryManager::demo().await.unwrap();
        let clusters = manager.list_clusters(None).await;
        let east = clusters.iter().find(|c| c.name == "east-1").unwrap();

        manager.remove_cluster(&east.id).await.unwrap();

        assert!(manager
            .list_projects(None)
            .await
            .iter()
            .all(|p| p.cluster_id != east.id));
        let sets = manager.list_cluster_sets().await;
        let production = sets.iter().find(|cs| cs.name == "production").unwrap();
        assert!(!production.cluster_ids.contains(&east.id));
    }

    #[tokio::test]
    async fn test_remove_cluster_set_refuses_when_populated() {
        let manager = InventoryManager::demo().await.unwrap();
        let sets = manager.list_cluster_sets().await;
        let production = sets.iter().find(|cs| cs.name == "production").unwrap();

        assert!(manager.remove_cluster_set(&production.id).await.is_err());
    }

    #[tokio::test]
    async fn test_builtin_role_cannot_be_removed() {
        let manager = InventoryManager::new();
        let roles = manager.list_roles().await;

        let result = manager.remove_role(&roles[0].id).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_stores() {
        let manager = InventoryManager::demo().await.unwrap();
        let snapshot = manager.snapshot().await;
        let before = snapshot.clusters.len();

        let sets = manager.list_cluster_sets().await;
        let staging = sets.iter().find(|cs| cs.name == "staging").unwrap();
        manager
            .add_cluster("stage-2", &staging.id, ClusterStatus::Ready)
            .await
            .unwrap();

        assert_eq!(snapshot.clusters.len(), before);
    }

    #[tokio::test]
    async fn test_fixture_round_trip() {
        let fixture: InventoryFixture = toml::from_str(
            r#"
            [[cluster_sets]]
            name = "edge"

            [[clusters]]
            name = "edge-1"
            cluster_set = "edge"
            status = "ready"

            [[clusters]]
            name = "edge-2"
            cluster_set = "edge"

            [[projects]]
            name = "telemetry"
            cluster = "edge-1"

            [[users]]
            username = "ops.admin"
            display_name = "Ops Admin"

            [[groups]]
            display_name = "Edge Team"
            member_count = 4

            [[roles]]
            display_name = "Telemetry Reader"
            technical_name = "telemetry-reader"
            resource_kinds = ["pods"]
            permissions = ["get", "list"]
            "#,
        )
        .unwrap();

        let manager = InventoryManager::new();
        manager.apply_fixture(fixture).await.unwrap();

        let snapshot = manager.snapshot().await;
        assert_eq!(snapshot.cluster_sets.len(), 1);
        assert_eq!(snapshot.clusters.len(), 2);
        // Unset status defaults to unknown
        let edge2 = snapshot
            .clusters
            .iter()
            .find(|c| c.name == "edge-2")
            .unwrap();
        assert_eq!(edge2.status, ClusterStatus::Unknown);
        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.roles.len(), 4);
    }

    #[tokio::test]
    async fn test_fixture_with_dangling_reference_fails() {
        let fixture: InventoryFixture = toml::from_str(
            r#"
            [[clusters]]
            name = "orphan-1"
            cluster_set = "missing"
            "#,
        )
        .unwrap();

        let manager = InventoryManager::new();
        assert!(manager.apply_fixture(fixture).await.is_err());
    }
}
