//! Role-filtered navigation tree.
//!
//! Three levels: groups hold items, items hold optional sub-items. Any level
//! may carry an allowed-roles set. An absent set means unrestricted. An
//! empty set is shown to anonymous callers only: it admits no role.

use serde::{Deserialize, Serialize};

use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavGroup {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<NavSubItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSubItem {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

fn visible(roles: &Option<Vec<Role>>, role: Option<Role>) -> bool {
    match roles.as_deref() {
        None => true,
        Some([]) => role.is_none(),
        Some(allowed) => role.is_some_and(|r| allowed.contains(&r)),
    }
}

/// Keep only the nodes `role` may see.
///
/// With no role only unrestricted nodes survive. A group left without items
/// is dropped.
pub fn filter(tree: &[NavGroup], role: Option<Role>) -> Vec<NavGroup> {
    tree.iter()
        .filter(|group| visible(&group.roles, role))
        .map(|group| NavGroup {
            label: group.label.clone(),
            roles: group.roles.clone(),
            items: group
                .items
                .iter()
                .filter(|item| visible(&item.roles, role))
                .map(|item| NavItem {
                    items: item
                        .items
                        .iter()
                        .filter(|sub| visible(&sub.roles, role))
                        .cloned()
                        .collect(),
                    ..item.clone()
                })
                .collect(),
        })
        .filter(|group| !group.items.is_empty())
        .collect()
}

fn item(title: &str, url: &str, icon: &str, roles: Option<Vec<Role>>, items: Vec<NavSubItem>) -> NavItem {
    NavItem {
        title: title.to_string(),
        url: url.to_string(),
        icon: Some(icon.to_string()),
        roles,
        items,
    }
}

fn sub(title: &str, url: &str, icon: Option<&str>, roles: Option<Vec<Role>>) -> NavSubItem {
    NavSubItem {
        title: title.to_string(),
        url: url.to_string(),
        icon: icon.map(str::to_string),
        roles,
    }
}

/// The product sidebar.
pub fn default_navigation() -> Vec<NavGroup> {
    let admin_manager = || Some(vec![Role::Admin, Role::Manager]);
    let admin_only = || Some(vec![Role::Admin]);

    vec![
        NavGroup {
            label: "Platform".into(),
            roles: None,
            items: vec![
                item("Dashboard", "/dashboard", "layout-dashboard", None, vec![]),
                item(
                    "Analytics",
                    "/dashboard/analytics",
                    "bar-chart-3",
                    admin_manager(),
                    vec![],
                ),
                item(
                    "Reports",
                    "/dashboard/reports",
                    "file-text",
                    None,
                    vec![
                        sub("Overview", "/dashboard/reports/overview", None, None),
                        sub("Detailed", "/dashboard/reports/detailed", None, admin_manager()),
                    ],
                ),
            ],
        },
        NavGroup {
            label: "Management".into(),
            roles: admin_manager(),
            items: vec![
                item(
                    "Users",
                    "/dashboard/users",
                    "users",
                    admin_only(),
                    vec![
                        sub("All Users", "/dashboard/users", None, None),
                        sub("Roles", "/dashboard/users/roles", None, None),
                    ],
                ),
                item(
                    "Settings",
                    "/dashboard/settings",
                    "settings-2",
                    None,
                    vec![
                        sub("General", "/dashboard/settings/general", None, None),
                        sub(
                            "Security",
                            "/dashboard/settings/security",
                            Some("shield"),
                            admin_only(),
                        ),
                        sub(
                            "Notifications",
                            "/dashboard/settings/notifications",
                            Some("bell"),
                            None,
                        ),
                    ],
                ),
            ],
        },
    ]
}
