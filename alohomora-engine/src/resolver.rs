///! Common-scope resolution
///!
///! Pure, side-effect-free computation of which projects are selectable for
///! a given cluster selection. Safe to re-run on every selection change; the
///! output is a function of the inputs alone and its ordering is stable.

use alohomora_common::scope::{ClusterSelection, ProjectOption};
use alohomora_common::{Cluster, Project};

/// Compute the project names selectable under `selection`.
///
/// With a single selected cluster every project owned by that cluster is
/// selectable. With two or more, a name qualifies only when every selected
/// cluster owns a project with that exact name; a cluster contributing two
/// same-named projects still counts once. Output order is the first-seen
/// order of names in `projects`.
pub fn selectable_projects(
    selection: &ClusterSelection,
    projects: &[Project],
    clusters: &[Cluster],
) -> Vec<ProjectOption> {
    if selection.is_single() {
        let cluster_id = &selection.ids()[0];
        return projects
            .iter()
            .filter(|p| &p.cluster_id == cluster_id)
            .map(|p| ProjectOption {
                name: p.name.clone(),
                cluster_ids: vec![cluster_id.clone()],
                cluster_names: vec![cluster_name(clusters, cluster_id)],
            })
            .collect();
    }

    // Group candidate projects by name, first-seen order, tracking the
    // distinct owning clusters per name.
    let mut names: Vec<String> = Vec::new();
    let mut owners: Vec<Vec<String>> = Vec::new();
    for project in projects {
        if !selection.contains(&project.cluster_id) {
            continue;
        }
        let slot = match names.iter().position(|n| n == &project.name) {
            Some(idx) => idx,
            None => {
                names.push(project.name.clone());
                owners.push(Vec::new());
                names.len() - 1
            }
        };
        if !owners[slot].contains(&project.cluster_id) {
            owners[slot].push(project.cluster_id.clone());
        }
    }

    names
        .into_iter()
        .zip(owners)
        .filter(|(_, owner_ids)| owner_ids.len() == selection.len())
        .map(|(name, _)| ProjectOption {
            name,
            // Report contributors in selection order, not discovery order
            cluster_ids: selection.ids().to_vec(),
            cluster_names: selection
                .ids()
                .iter()
                .map(|id| cluster_name(clusters, id))
                .collect(),
        })
        .collect()
}

/// Filter clusters by owning cluster set. `None` means no container filter
/// is active and all clusters are in scope.
pub fn selectable_clusters(cluster_set_id: Option<&str>, clusters: &[Cluster]) -> Vec<Cluster> {
    match cluster_set_id {
        Some(set_id) => clusters
            .iter()
            .filter(|c| c.cluster_set_id == set_id)
            .cloned()
            .collect(),
        None => clusters.to_vec(),
    }
}

fn cluster_name(clusters: &[Cluster], cluster_id: &str) -> String {
    clusters
        .iter()
        .find(|c| c.id == cluster_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| cluster_id.to_string())
}
