//! Roles, permissions, and the section-by-section permission view.
//!
//! The role editor lists permissions grouped by the resource they guard.
//! [`group_by_resource`] builds those sections; group order is the order
//! in which resources are first seen, and permissions keep their input
//! order inside each group.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::{DateField, EntityKind, Enumeration, Record, TextField, Unranked};
use super::time::{lenient, now};

/// A single grantable permission, e.g. `tasks:write`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,

    /// Resource category the permission guards (`tasks`, `roles`, `billing`, ...)
    pub resource: String,

    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Permission {
    pub fn new(id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource: resource.into(),
            action: String::new(),
            name: String::new(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    #[default]
    Active,
    Inactive,
}

impl RoleStatus {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "enabled" => Some(Self::Active),
            "inactive" | "disabled" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl Enumeration for RoleStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::Inactive];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: RoleStatus,

    /// Granted permission IDs, in grant order
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Built-in roles cannot be deleted from the editor
    #[serde(default)]
    pub is_system: bool,

    #[serde(default)]
    pub user_count: u32,

    #[serde(default = "now", with = "lenient")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "now", with = "lenient")]
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("role_{}", &uuid::Uuid::new_v4().to_string()[..12]),
            name: name.into(),
            description: None,
            status: RoleStatus::Active,
            permissions: Vec::new(),
            is_system: false,
            user_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn has_permission(&self, permission_id: &str) -> bool {
        self.permissions.iter().any(|p| p == permission_id)
    }

    /// Grant a permission. Returns `false` if it was already granted.
    pub fn grant(&mut self, permission_id: &str) -> bool {
        if self.has_permission(permission_id) {
            return false;
        }
        self.permissions.push(permission_id.to_string());
        true
    }

    /// Revoke a permission. Returns `false` if it was not granted.
    pub fn revoke(&mut self, permission_id: &str) -> bool {
        let before = self.permissions.len();
        self.permissions.retain(|p| p != permission_id);
        self.permissions.len() != before
    }

    /// Section checkbox: grant everything in the group if anything is
    /// missing, otherwise revoke the whole group.
    pub fn toggle_resource(&mut self, group: &PermissionGroup) {
        let all_granted = group.permissions.iter().all(|p| self.has_permission(&p.id));
        for permission in &group.permissions {
            if all_granted {
                self.revoke(&permission.id);
            } else {
                self.grant(&permission.id);
            }
        }
    }
}

impl Record for Role {
    type Status = RoleStatus;
    type Priority = Unranked;

    const KIND: EntityKind = EntityKind::Role;

    fn id(&self) -> &str {
        &self.id
    }

    fn text_fields(&self) -> Vec<(TextField, &str)> {
        let mut fields = vec![(TextField::Title, self.name.as_str())];
        if let Some(ref desc) = self.description {
            fields.push((TextField::Description, desc.as_str()));
        }
        fields
    }

    fn status(&self) -> Option<RoleStatus> {
        Some(self.status)
    }

    fn date(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Created => Some(self.created_at.date_naive()),
            DateField::Start | DateField::Due | DateField::Completed => None,
        }
    }

    fn flag(&self) -> Option<bool> {
        Some(self.is_system)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

/// Permissions sharing one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionGroup {
    pub resource: String,
    pub permissions: Vec<Permission>,
}

/// Permissions grouped by resource, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionGroups(Vec<PermissionGroup>);

impl PermissionGroups {
    /// Resource names in group order.
    #[must_use]
    pub fn resources(&self) -> Vec<&str> {
        self.0.iter().map(|g| g.resource.as_str()).collect()
    }

    #[must_use]
    pub fn get(&self, resource: &str) -> Option<&PermissionGroup> {
        self.0.iter().find(|g| g.resource == resource)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PermissionGroup> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How many permissions of `resource` the role holds.
    #[must_use]
    pub fn granted_count(&self, resource: &str, role: &Role) -> usize {
        self.get(resource).map_or(0, |g| {
            g.permissions
                .iter()
                .filter(|p| role.has_permission(&p.id))
                .count()
        })
    }
}

impl<'a> IntoIterator for &'a PermissionGroups {
    type Item = &'a PermissionGroup;
    type IntoIter = std::slice::Iter<'a, PermissionGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Group a flat permission list by resource.
#[must_use]
pub fn group_by_resource(permissions: &[Permission]) -> PermissionGroups {
    let mut groups: Vec<PermissionGroup> = Vec::new();
    let mut index: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

    for permission in permissions {
        if let Some(&slot) = index.get(permission.resource.as_str()) {
            groups[slot].permissions.push(permission.clone());
        } else {
            index.insert(permission.resource.as_str(), groups.len());
            groups.push(PermissionGroup {
                resource: permission.resource.clone(),
                permissions: vec![permission.clone()],
            });
        }
    }

    PermissionGroups(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms() -> Vec<Permission> {
        vec![
            Permission::new("p1", "tasks"),
            Permission::new("p2", "roles"),
            Permission::new("p3", "tasks"),
        ]
    }

    #[test]
    fn test_group_by_resource_order() {
        let groups = group_by_resource(&perms());

        assert_eq!(groups.resources(), vec!["tasks", "roles"]);
        let tasks: Vec<_> = groups.get("tasks").unwrap().permissions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(tasks, vec!["p1", "p3"]);
        let roles: Vec<_> = groups.get("roles").unwrap().permissions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(roles, vec!["p2"]);
    }

    #[test]
    fn test_group_by_resource_empty() {
        assert!(group_by_resource(&[]).is_empty());
    }

    #[test]
    fn test_groups_serialize_as_list() {
        let json = serde_json::to_value(group_by_resource(&perms())).unwrap();
        assert_eq!(json[0]["resource"], "tasks");
        assert_eq!(json[1]["permissions"][0]["id"], "p2");
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut role = Role::new("Coordinator");
        assert!(role.grant("p1"));
        assert!(!role.grant("p1"));
        assert!(role.has_permission("p1"));
        assert!(role.revoke("p1"));
        assert!(!role.revoke("p1"));
    }

    #[test]
    fn test_toggle_resource() {
        let groups = group_by_resource(&perms());
        let tasks = groups.get("tasks").unwrap();
        let mut role = Role::new("Lead");
        role.grant("p1");

        // Partially granted -> grant the rest
        role.toggle_resource(tasks);
        assert_eq!(groups.granted_count("tasks", &role), 2);

        // Fully granted -> revoke all
        role.toggle_resource(tasks);
        assert_eq!(groups.granted_count("tasks", &role), 0);
        assert!(role.permissions.is_empty());
    }
}
