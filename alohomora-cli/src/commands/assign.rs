use crate::output;
use anyhow::Result;
use colored::Colorize;
use dialoguer::{MultiSelect, Select};

use alohomora_common::scope::{IdentityRef, ScopeBreadth, ScopeGranularity};
use alohomora_engine::assignment::AssignmentSink;
use alohomora_engine::config::EngineConfig;
use alohomora_engine::{
    InventoryManager, LoggingSink, PrimaryStep, ScopeSubStep, WizardConfig, WizardSession,
};

const BACK: &str = "← Back";

/// Run the interactive role-assignment wizard
pub async fn handle_assign_command(
    user: Option<&str>,
    group: Option<&str>,
    cluster_set: Option<&str>,
    manager: &InventoryManager,
    engine_config: &EngineConfig,
) -> Result<()> {
    // Resolve command-line names against the current inventory
    let snapshot = manager.snapshot().await;

    let preset_identity = match (user, group) {
        (Some(username), _) => {
            let user = snapshot
                .find_user_by_username(username)
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;
            Some(IdentityRef::User(user.id.clone()))
        }
        (None, Some(name)) => {
            let group = snapshot
                .find_group_by_name(name)
                .ok_or_else(|| anyhow::anyhow!("Group '{}' not found", name))?;
            Some(IdentityRef::Group(group.id.clone()))
        }
        (None, None) => None,
    };

    let cluster_set_id = match cluster_set {
        Some(name) => Some(
            snapshot
                .find_cluster_set_by_name(name)
                .map(|cs| cs.id.clone())
                .ok_or_else(|| anyhow::anyhow!("Cluster set '{}' not found", name))?,
        ),
        None => None,
    };

    let config = WizardConfig {
        cluster_set: cluster_set_id,
        preset_identity,
        auto_full_access_fallback: engine_config.wizard.auto_full_access_fallback,
    };
    let mut session = manager.open_wizard(config).await;

    loop {
        match (session.cursor().step, session.cursor().sub_step) {
            (PrimaryStep::Identity, _) => prompt_identity(&mut session)?,
            (PrimaryStep::Scope, Some(ScopeSubStep::SelectClusters)) => {
                prompt_clusters(&mut session)?
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::DefineGranularity)) => {
                prompt_granularity(&mut session)?
            }
            (PrimaryStep::Scope, Some(ScopeSubStep::SelectProjects)) => {
                prompt_projects(&mut session)?
            }
            (PrimaryStep::Scope, None) => session.next(),
            (PrimaryStep::Role, _) => prompt_role(&mut session)?,
            (PrimaryStep::Review, _) => {
                if prompt_review(&mut session).await? {
                    return Ok(());
                }
            }
        }
    }
}

fn prompt_identity(session: &mut WizardSession) -> Result<()> {
    let users = session.inventory().users.clone();
    let groups = session.inventory().groups.clone();

    if users.is_empty() && groups.is_empty() {
        anyhow::bail!("The inventory holds no users or groups to assign to");
    }

    let kind = Select::new()
        .with_prompt("Assign the role to")
        .items(&["A user", "A group"])
        .default(0)
        .interact()?;

    if kind == 0 {
        if users.is_empty() {
            output::print_warning("No users in the inventory");
            return Ok(());
        }
        let labels: Vec<String> = users
            .iter()
            .map(|u| format!("{} ({})", u.display_name, u.username))
            .collect();
        let idx = Select::new()
            .with_prompt("Select user")
            .items(&labels)
            .default(0)
            .interact()?;
        let id = users[idx].id.clone();
        session.select_user(&id);
    } else {
        if groups.is_empty() {
            output::print_warning("No groups in the inventory");
            return Ok(());
        }
        let labels: Vec<String> = groups
            .iter()
            .map(|g| format!("{} ({} members)", g.display_name, g.member_count))
            .collect();
        let idx = Select::new()
            .with_prompt("Select group")
            .items(&labels)
            .default(0)
            .interact()?;
        let id = groups[idx].id.clone();
        session.select_group(&id);
    }

    session.next();
    Ok(())
}

fn prompt_clusters(session: &mut WizardSession) -> Result<()> {
    let mut items = vec![
        "Everything".to_string(),
        "Specific clusters".to_string(),
    ];
    let can_back = session.config().preset_identity.is_none();
    if can_back {
        items.push(BACK.to_string());
    }

    let pick = Select::new()
        .with_prompt("Scope of the assignment")
        .items(&items)
        .default(0)
        .interact()?;

    if items[pick] == BACK {
        session.back();
        return Ok(());
    }
    if pick == 0 {
        session.set_breadth(ScopeBreadth::Everything);
        session.next();
        return Ok(());
    }

    session.set_breadth(ScopeBreadth::SpecificClusters);
    let clusters = session.selectable_clusters();
    if clusters.is_empty() {
        output::print_warning("No clusters are selectable in this context");
        return Ok(());
    }

    let labels: Vec<String> = clusters
        .iter()
        .map(|c| format!("{} ({})", c.name, c.status))
        .collect();
    let defaults: Vec<bool> = clusters
        .iter()
        .map(|c| session.selection().cluster_ids.contains(&c.id))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt("Select clusters")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    for (idx, cluster) in clusters.iter().enumerate() {
        let want = picked.contains(&idx);
        let have = session.selection().cluster_ids.contains(&cluster.id);
        if want != have {
            session.toggle_cluster(&cluster.id);
        }
    }

    if session.selection().cluster_ids.is_empty() {
        output::print_warning("Select at least one cluster");
    }
    session.next();
    Ok(())
}

fn prompt_granularity(session: &mut WizardSession) -> Result<()> {
    let choice = session.limited_choice();
    let mut items = vec!["Full access to all projects".to_string()];
    if choice.enabled {
        items.push("Limit access to specific projects".to_string());
    } else if let Some(reason) = &choice.reason {
        // The limited choice is disabled, not hidden: say why
        output::print_note(reason);
    }
    items.push(BACK.to_string());

    let pick = Select::new()
        .with_prompt("Project access")
        .items(&items)
        .default(0)
        .interact()?;

    if items[pick] == BACK {
        session.back();
        return Ok(());
    }
    if pick == 0 {
        session.choose_granularity(ScopeGranularity::FullAccess);
    } else {
        session.choose_granularity(ScopeGranularity::LimitedToProjects);
    }
    session.next();
    Ok(())
}

fn prompt_projects(session: &mut WizardSession) -> Result<()> {
    let options = session.selectable_projects();
    let labels: Vec<String> = options
        .iter()
        .map(|o| format!("{} (on {})", o.name, o.cluster_names.join(", ")))
        .collect();
    let defaults: Vec<bool> = options
        .iter()
        .map(|o| session.selection().project_names.contains(&o.name))
        .collect();

    let picked = MultiSelect::new()
        .with_prompt("Select projects")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    for (idx, option) in options.iter().enumerate() {
        let want = picked.contains(&idx);
        let have = session.selection().project_names.contains(&option.name);
        if want != have {
            session.toggle_project(&option.name);
        }
    }

    if session.selection().project_names.is_empty() {
        output::print_note("No project selected, stepping back");
        session.back();
    } else {
        session.next();
    }
    Ok(())
}

fn prompt_role(session: &mut WizardSession) -> Result<()> {
    let roles = session.inventory().roles.clone();
    let mut labels: Vec<String> = roles
        .iter()
        .map(|r| format!("{} ({})", r.display_name, r.technical_name))
        .collect();
    labels.push(BACK.to_string());

    let pick = Select::new()
        .with_prompt("Select role")
        .items(&labels)
        .default(0)
        .interact()?;

    if labels[pick] == BACK {
        session.back();
        return Ok(());
    }
    let id = roles[pick].id.clone();
    session.select_role(&id);
    session.next();
    Ok(())
}

/// Returns true when the wizard is done (created or cancelled)
async fn prompt_review(session: &mut WizardSession) -> Result<bool> {
    let summary = session.review_summary();
    println!();
    println!("{}", "Review".bold());
    println!("  {:<10} {}", "Identity:", summary.identity);
    println!("  {:<10} {}", "Scope:", summary.scope);
    println!("  {:<10} {}", "Role:", summary.role);
    println!();

    let mut items = vec!["Create assignment".to_string()];
    if session.config().preset_identity.is_none() {
        items.push("Edit identity".to_string());
    }
    items.push("Edit scope".to_string());
    items.push("Edit role".to_string());
    items.push("Cancel".to_string());

    let pick = Select::new()
        .with_prompt("Confirm")
        .items(&items)
        .default(0)
        .interact()?;

    match items[pick].as_str() {
        "Create assignment" => {
            let intent = session.finish()?;
            LoggingSink.submit(&intent).await?;
            output::print_json(&intent)?;
            output::print_success(&format!(
                "Role assignment created for {}",
                intent.identity_name
            ));
            Ok(true)
        }
        "Edit identity" => {
            session.edit_step(PrimaryStep::Identity);
            Ok(false)
        }
        "Edit scope" => {
            session.edit_step(PrimaryStep::Scope);
            Ok(false)
        }
        "Edit role" => {
            session.edit_step(PrimaryStep::Role);
            Ok(false)
        }
        _ => {
            output::print_note("Assignment discarded");
            Ok(true)
        }
    }
}
