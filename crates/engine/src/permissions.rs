//! Role based access control.
//!
//! Roles and permissions are closed enums and the role→permission table is a
//! set of `'static` slices fixed at compile time. There is no runtime
//! mutation path: a deploy is the only way to change what a role can do.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// User roles in the system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }

    /// Returns the fixed permission set for this role.
    ///
    /// `moderator` exists in the role enum but the table grants it nothing;
    /// every permission check for a moderator fails closed.
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Self::User => USER_PERMISSIONS,
            Self::Admin => ADMIN_PERMISSIONS,
            Self::Moderator => &[],
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            other => Err(EngineError::InvalidField(format!("invalid role: {other}"))),
        }
    }
}

/// System permissions, one `{resource}:{action}` pair per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    UserRead,
    UserWrite,
    UserDelete,
    DashboardRead,
    DashboardWrite,
    DashboardDelete,
    ExpenseRead,
    ExpenseWrite,
    ExpenseDelete,
    IncomeRead,
    IncomeWrite,
    IncomeDelete,
    SavingsRead,
    SavingsWrite,
    SavingsDelete,
    AdminRead,
    AdminWrite,
    AdminDelete,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserRead => "user:read",
            Self::UserWrite => "user:write",
            Self::UserDelete => "user:delete",
            Self::DashboardRead => "dashboard:read",
            Self::DashboardWrite => "dashboard:write",
            Self::DashboardDelete => "dashboard:delete",
            Self::ExpenseRead => "expense:read",
            Self::ExpenseWrite => "expense:write",
            Self::ExpenseDelete => "expense:delete",
            Self::IncomeRead => "income:read",
            Self::IncomeWrite => "income:write",
            Self::IncomeDelete => "income:delete",
            Self::SavingsRead => "savings:read",
            Self::SavingsWrite => "savings:write",
            Self::SavingsDelete => "savings:delete",
            Self::AdminRead => "admin:read",
            Self::AdminWrite => "admin:write",
            Self::AdminDelete => "admin:delete",
        }
    }
}

/// Users can manage their own data.
const USER_PERMISSIONS: &[Permission] = &[
    Permission::UserRead,
    Permission::UserWrite,
    Permission::DashboardRead,
    Permission::DashboardWrite,
    Permission::DashboardDelete,
    Permission::ExpenseRead,
    Permission::ExpenseWrite,
    Permission::ExpenseDelete,
    Permission::IncomeRead,
    Permission::IncomeWrite,
    Permission::IncomeDelete,
    Permission::SavingsRead,
    Permission::SavingsWrite,
    Permission::SavingsDelete,
];

/// Admins have all permissions.
const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::UserRead,
    Permission::UserWrite,
    Permission::UserDelete,
    Permission::DashboardRead,
    Permission::DashboardWrite,
    Permission::DashboardDelete,
    Permission::ExpenseRead,
    Permission::ExpenseWrite,
    Permission::ExpenseDelete,
    Permission::IncomeRead,
    Permission::IncomeWrite,
    Permission::IncomeDelete,
    Permission::SavingsRead,
    Permission::SavingsWrite,
    Permission::SavingsDelete,
    Permission::AdminRead,
    Permission::AdminWrite,
    Permission::AdminDelete,
];

/// Check if a role holds a specific permission.
pub fn has_permission(role: Role, permission: Permission) -> bool {
    role.permissions().contains(&permission)
}

/// The authenticated actor making a request.
///
/// Built by the server's auth layer after credential/token verification; the
/// engine only ever consumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Resource-scoped check: owner or admin.
    pub fn is_owner_or_admin(&self, owner_id: i32) -> bool {
        self.id == owner_id || self.is_admin()
    }

    /// Pure set-membership test against the static role table.
    ///
    /// Denial never reveals whether a resource exists, only that the action
    /// class is not granted.
    pub fn require(&self, permission: Permission) -> ResultEngine<()> {
        if has_permission(self.role, permission) {
            Ok(())
        } else {
            Err(EngineError::Forbidden(permission.as_str().to_string()))
        }
    }
}
