//! Role and permission command implementations.

use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::cli::commands::filter::flag_choice;
use crate::cli::commands::load_dataset;
use crate::cli::RoleCommands;
use crate::error::{Error, Result};
use crate::filter::{apply, set_of, sort_records, FilterSpec, FilterUpdate, SortKey, SortOrder};
use crate::model::{group_by_resource, EntityKind, Enumeration, PermissionGroups, Role, RoleStatus};
use crate::store::find_index;
use crate::validate::{canonical_status, find_similar_ids};

#[derive(Serialize)]
struct RoleListOutput<'a> {
    count: usize,
    total: usize,
    roles: Vec<&'a Role>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupView<'a> {
    resource: &'a str,
    granted: usize,
    total: usize,
    permissions: Vec<PermissionView<'a>>,
}

#[derive(Serialize)]
struct PermissionView<'a> {
    id: &'a str,
    name: &'a str,
    granted: bool,
}

#[derive(Serialize)]
struct RoleShowOutput<'a> {
    role: &'a Role,
    groups: Vec<GroupView<'a>>,
}

#[derive(Serialize)]
struct GrantOutput<'a> {
    id: &'a str,
    changed: Vec<String>,
    permissions: &'a [String],
    dry_run: bool,
}

/// Execute role commands.
///
/// # Errors
///
/// Returns an error if the data cannot be loaded, a flag is invalid, or a
/// role or permission does not exist.
pub fn execute(command: &RoleCommands, data_dir: Option<&Path>, json: bool) -> Result<()> {
    match command {
        RoleCommands::List {
            query,
            status,
            system,
            custom,
        } => list(query.as_deref(), status, flag_choice(*system, *custom), data_dir, json),
        RoleCommands::Show { id } => show(id, data_dir, json),
        RoleCommands::Grant {
            id,
            permissions,
            resource,
            revoke,
        } => grant(id, permissions, resource.as_deref(), *revoke, data_dir, json),
    }
}

fn list(
    query: Option<&str>,
    statuses: &[String],
    system: Option<bool>,
    data_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let data = load_dataset(data_dir)?;

    let mut spec = FilterSpec::new().with(FilterUpdate::Flag(system));
    if let Some(q) = query {
        spec.update(FilterUpdate::Query(q.to_string()));
    }
    if !statuses.is_empty() {
        let canonical = statuses
            .iter()
            .map(|s| canonical_status(EntityKind::Role, s))
            .collect::<Result<Vec<_>>>()?;
        spec.update(FilterUpdate::Statuses(set_of(canonical)));
    }

    let mut roles = apply(&data.roles, &spec);
    sort_records(&mut roles, SortKey::Title, SortOrder::Asc);

    if crate::is_csv() {
        println!("id,name,status,system,permissions,users");
        for role in &roles {
            println!(
                "{},{},{},{},{},{}",
                crate::csv_escape(&role.id),
                crate::csv_escape(&role.name),
                role.status.as_str(),
                role.is_system,
                role.permissions.len(),
                role.user_count
            );
        }
    } else if json {
        let output = RoleListOutput {
            count: roles.len(),
            total: data.roles.len(),
            roles,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if roles.is_empty() {
        println!("No roles found.");
    } else {
        println!("{}", format!("Roles ({} of {})", roles.len(), data.roles.len()).bold());
        println!();
        for role in &roles {
            let marker = if role.is_system { "system".cyan() } else { "custom".normal() };
            let name = if role.status == RoleStatus::Inactive {
                role.name.dimmed()
            } else {
                role.name.normal()
            };
            println!(
                "{} {} {} {}",
                format!("[{}]", role.id).dimmed(),
                name,
                marker,
                format!("{} permissions, {} users", role.permissions.len(), role.user_count).dimmed()
            );
        }
    }

    Ok(())
}

fn group_views<'a>(groups: &'a PermissionGroups, role: &Role) -> Vec<GroupView<'a>> {
    groups
        .iter()
        .map(|group| GroupView {
            resource: &group.resource,
            granted: groups.granted_count(&group.resource, role),
            total: group.permissions.len(),
            permissions: group
                .permissions
                .iter()
                .map(|p| PermissionView {
                    id: &p.id,
                    name: if p.name.is_empty() { &p.id } else { &p.name },
                    granted: role.has_permission(&p.id),
                })
                .collect(),
        })
        .collect()
}

fn show(id: &str, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let data = load_dataset(data_dir)?;
    let role = &data.roles[find_index(&data.roles, id)?];
    let groups = group_by_resource(&data.permissions);
    let views = group_views(&groups, role);

    if json {
        let output = RoleShowOutput { role, groups: views };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {}", format!("[{}]", role.id).dimmed(), role.name.bold());
    if let Some(ref desc) = role.description {
        println!("{desc}");
    }
    println!();
    for view in &views {
        println!(
            "{} {}",
            view.resource.bold(),
            format!("({}/{})", view.granted, view.total).dimmed()
        );
        for permission in &view.permissions {
            let check = if permission.granted { "[x]".green() } else { "[ ]".normal() };
            println!("  {check} {}", permission.name);
        }
    }

    Ok(())
}

fn grant(
    id: &str,
    permission_ids: &[String],
    resource: Option<&str>,
    revoke: bool,
    data_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    if permission_ids.is_empty() && resource.is_none() {
        return Err(Error::InvalidArgument(
            "give permission IDs or --resource".to_string(),
        ));
    }

    let mut data = load_dataset(data_dir)?;
    let index = find_index(&data.roles, id)?;
    let groups = group_by_resource(&data.permissions);

    for permission_id in permission_ids {
        if !data.permissions.iter().any(|p| &p.id == permission_id) {
            let similar = find_similar_ids(permission_id, data.permissions.iter().map(|p| p.id.as_str()), 3);
            return Err(if similar.is_empty() {
                Error::RecordNotFound { kind: "permission", id: permission_id.clone() }
            } else {
                Error::RecordNotFoundSimilar { kind: "permission", id: permission_id.clone(), similar }
            });
        }
    }

    let mut role = data.roles[index].clone();
    let before = role.permissions.clone();

    for permission_id in permission_ids {
        if revoke {
            role.revoke(permission_id);
        } else {
            role.grant(permission_id);
        }
    }
    if let Some(resource) = resource {
        let group = groups.get(resource).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unknown resource '{resource}' (known: {})",
                groups.resources().join(", ")
            ))
        })?;
        role.toggle_resource(group);
    }

    let mut changed: Vec<String> = role
        .permissions
        .iter()
        .filter(|p| !before.contains(p))
        .map(|p| format!("+{p}"))
        .collect();
    changed.extend(
        before
            .iter()
            .filter(|p| !role.permissions.contains(p))
            .map(|p| format!("-{p}")),
    );

    let dry_run = crate::is_dry_run();
    if !dry_run && !changed.is_empty() {
        role.updated_at = Utc::now();
        data.roles[index] = role.clone();
        data.save_roles()?;
    }

    if crate::is_silent() {
        println!("{}", role.id);
    } else if json {
        let output = GrantOutput {
            id: &role.id,
            changed,
            permissions: &role.permissions,
            dry_run,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if changed.is_empty() {
        println!("No change to role {}", role.id);
    } else {
        let verb = if dry_run { "Would update" } else { "Updated" };
        println!("{verb} role {}: {}", role.id, changed.join(" "));
    }

    Ok(())
}
