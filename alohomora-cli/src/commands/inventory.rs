use crate::output::{self, OutputFormat};
use crate::InventoryCommands;
use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use alohomora_engine::InventoryManager;

#[derive(Tabled, Serialize)]
struct ClusterSetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CLUSTERS")]
    clusters: usize,
}

#[derive(Tabled, Serialize)]
struct ClusterRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CLUSTER SET")]
    cluster_set: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled, Serialize)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CLUSTER")]
    cluster: String,
}

#[derive(Tabled, Serialize)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "USERNAME")]
    username: String,
    #[tabled(rename = "DISPLAY NAME")]
    display_name: String,
}

#[derive(Tabled, Serialize)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "MEMBERS")]
    members: u32,
}

#[derive(Tabled, Serialize)]
struct RoleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TECHNICAL NAME")]
    technical_name: String,
    #[tabled(rename = "TYPE")]
    role_type: String,
    #[tabled(rename = "PERMISSIONS")]
    permissions: String,
}

pub async fn handle_inventory_command(
    command: InventoryCommands,
    manager: &InventoryManager,
    output_format: &str,
) -> Result<()> {
    let format = OutputFormat::from_str(output_format);

    match command {
        InventoryCommands::ClusterSets => {
            let rows: Vec<ClusterSetRow> = manager
                .list_cluster_sets()
                .await
                .into_iter()
                .map(|cs| ClusterSetRow {
                    id: cs.id,
                    name: cs.name,
                    clusters: cs.cluster_ids.len(),
                })
                .collect();
            output::print_output(rows, format)?;
        }
        InventoryCommands::Clusters { cluster_set } => {
            let set_id = match cluster_set {
                Some(name) => Some(resolve_cluster_set(manager, &name).await?),
                None => None,
            };
            let sets = manager.list_cluster_sets().await;
            let rows: Vec<ClusterRow> = manager
                .list_clusters(set_id.as_deref())
                .await
                .into_iter()
                .map(|c| ClusterRow {
                    id: c.id,
                    name: c.name,
                    cluster_set: sets
                        .iter()
                        .find(|cs| cs.id == c.cluster_set_id)
                        .map(|cs| cs.name.clone())
                        .unwrap_or_else(|| c.cluster_set_id.clone()),
                    status: c.status.to_string(),
                })
                .collect();
            output::print_output(rows, format)?;
        }
        InventoryCommands::Projects { cluster } => {
            let clusters = manager.list_clusters(None).await;
            let cluster_id = match cluster {
                Some(name) => Some(
                    clusters
                        .iter()
                        .find(|c| c.name == name)
                        .map(|c| c.id.clone())
                        .ok_or_else(|| anyhow::anyhow!("Cluster '{}' not found", name))?,
                ),
                None => None,
            };
            let rows: Vec<ProjectRow> = manager
                .list_projects(cluster_id.as_deref())
                .await
                .into_iter()
                .map(|p| ProjectRow {
                    id: p.id,
                    name: p.name,
                    cluster: clusters
                        .iter()
                        .find(|c| c.id == p.cluster_id)
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| p.cluster_id.clone()),
                })
                .collect();
            output::print_output(rows, format)?;
        }
        InventoryCommands::Users => {
            let rows: Vec<UserRow> = manager
                .list_users()
                .await
                .into_iter()
                .map(|u| UserRow {
                    id: u.id,
                    username: u.username,
                    display_name: u.display_name,
                })
                .collect();
            output::print_output(rows, format)?;
        }
        InventoryCommands::Groups => {
            let rows: Vec<GroupRow> = manager
                .list_groups()
                .await
                .into_iter()
                .map(|g| GroupRow {
                    id: g.id,
                    name: g.display_name,
                    members: g.member_count,
                })
                .collect();
            output::print_output(rows, format)?;
        }
        InventoryCommands::Roles => {
            let rows: Vec<RoleRow> = manager
                .list_roles()
                .await
                .into_iter()
                .map(|r| RoleRow {
                    id: r.id,
                    name: r.display_name,
                    technical_name: r.technical_name,
                    role_type: format!("{:?}", r.role_type).to_lowercase(),
                    permissions: r.permissions.join(", "),
                })
                .collect();
            output::print_output(rows, format)?;
        }
    }
    Ok(())
}

async fn resolve_cluster_set(manager: &InventoryManager, name: &str) -> Result<String> {
    manager
        .list_cluster_sets()
        .await
        .iter()
        .find(|cs| cs.name == name)
        .map(|cs| cs.id.clone())
        .ok_or_else(|| anyhow::anyhow!("Cluster set '{}' not found", name))
}
