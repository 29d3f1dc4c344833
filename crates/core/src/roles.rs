//! Role and permission model.
//!
//! Roles are stored by name in the `roles` table; the names here must match
//! the seed data in `20260301000001_create_roles_and_users.sql`. Permissions
//! are static: each role maps to a fixed set of `(resource, action)` grants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_OPERATOR: &str = "operator";
pub const ROLE_USER: &str = "user";

/// Role assigned to every new account (the very first account is promoted
/// to [`Role::Admin`] instead).
pub const DEFAULT_ROLE: Role = Role::User;

/// A named permission bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Operator,
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Operator, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Operator => ROLE_OPERATOR,
            Role::User => ROLE_USER,
        }
    }

    /// Human-readable name shown in the user management table.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::Operator => "Operator",
            Role::User => "User",
        }
    }

    /// Every `(resource, action)` pair granted to this role.
    pub fn grants(self) -> &'static [(Resource, &'static [Action])] {
        match self {
            Role::Admin => ADMIN_GRANTS,
            Role::Manager => MANAGER_GRANTS,
            Role::Operator => OPERATOR_GRANTS,
            Role::User => USER_GRANTS,
        }
    }

    pub fn has_permission(self, resource: Resource, action: Action) -> bool {
        self.grants()
            .iter()
            .any(|(r, actions)| *r == resource && actions.contains(&action))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MANAGER => Ok(Role::Manager),
            ROLE_OPERATOR => Ok(Role::Operator),
            ROLE_USER => Ok(Role::User),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Resources and actions
// ---------------------------------------------------------------------------

/// Protected resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Dashboard,
    Analytics,
    Reports,
    Settings,
    /// User administration (list, role changes, bans).
    User,
}

/// Actions on a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    View,
    Customize,
    Export,
    Create,
    Edit,
    List,
    SetRole,
    Ban,
    Delete,
    SetPassword,
}

const ADMIN_GRANTS: &[(Resource, &[Action])] = &[
    (Resource::Dashboard, &[Action::View, Action::Customize]),
    (Resource::Analytics, &[Action::View, Action::Export]),
    (Resource::Reports, &[Action::View, Action::Create, Action::Export]),
    (Resource::Settings, &[Action::View, Action::Edit]),
    (
        Resource::User,
        &[
            Action::Create,
            Action::List,
            Action::SetRole,
            Action::Ban,
            Action::Delete,
            Action::SetPassword,
        ],
    ),
];

const MANAGER_GRANTS: &[(Resource, &[Action])] = &[
    (Resource::Dashboard, &[Action::View, Action::Customize]),
    (Resource::Analytics, &[Action::View, Action::Export]),
    (Resource::Reports, &[Action::View, Action::Create, Action::Export]),
    (Resource::Settings, &[Action::View]),
];

const OPERATOR_GRANTS: &[(Resource, &[Action])] = &[
    (Resource::Dashboard, &[Action::View]),
    (Resource::Analytics, &[Action::View]),
    (Resource::Reports, &[Action::View]),
];

const USER_GRANTS: &[(Resource, &[Action])] = &[(Resource::Dashboard, &[Action::View])];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn admin_can_manage_users() {
        assert!(Role::Admin.has_permission(Resource::User, Action::List));
        assert!(Role::Admin.has_permission(Resource::User, Action::Ban));
        assert!(Role::Admin.has_permission(Resource::Settings, Action::Edit));
    }

    #[test]
    fn manager_cannot_manage_users_or_edit_settings() {
        assert!(!Role::Manager.has_permission(Resource::User, Action::List));
        assert!(Role::Manager.has_permission(Resource::Settings, Action::View));
        assert!(!Role::Manager.has_permission(Resource::Settings, Action::Edit));
        assert!(Role::Manager.has_permission(Resource::Dashboard, Action::Customize));
    }

    #[test]
    fn operator_is_read_only() {
        assert!(Role::Operator.has_permission(Resource::Reports, Action::View));
        assert!(!Role::Operator.has_permission(Resource::Reports, Action::Create));
        assert!(!Role::Operator.has_permission(Resource::Dashboard, Action::Customize));
    }

    #[test]
    fn user_only_views_dashboard() {
        assert!(Role::User.has_permission(Resource::Dashboard, Action::View));
        assert!(!Role::User.has_permission(Resource::Analytics, Action::View));
        assert_eq!(DEFAULT_ROLE, Role::User);
    }

    #[test]
    fn display_names() {
        assert_eq!(Role::Admin.display_name(), "Administrator");
        assert_eq!(Role::User.to_string(), "user");
    }
}
