use super::Role;

/// Role-set a route requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedRoles {
    /// Any signed-in role.
    Any,
    Only(Vec<Role>),
}

impl AllowedRoles {
    pub fn only(roles: &[Role]) -> Self {
        let mut v: Vec<Role> = Vec::with_capacity(roles.len());
        for r in roles {
            if !v.contains(r) { v.push(*r); }
        }
        if Role::ALL.iter().all(|r| v.contains(r)) { AllowedRoles::Any } else { AllowedRoles::Only(v) }
    }

    pub fn allows(&self, role: Role) -> bool {
        match self {
            AllowedRoles::Any => true,
            AllowedRoles::Only(v) => v.contains(&role),
        }
    }
}

/// Static mapping from role to the route prefixes that role may enter.
/// Defined once; not editable at runtime.
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    per_role: &'static [(Role, &'static [&'static str])],
    shared: &'static [&'static str],
}

pub const DEFAULT_POLICY: RoutePolicy = RoutePolicy {
    per_role: &[
        (Role::Admin, &["/admin"]),
        (Role::Faculty, &["/faculty"]),
        (Role::Student, &["/student"]),
    ],
    shared: &["/profile"],
};

impl Default for RoutePolicy {
    fn default() -> Self { DEFAULT_POLICY }
}

impl RoutePolicy {
    pub fn prefixes_for(&self, role: Role) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = self
            .per_role
            .iter()
            .filter(|(r, _)| *r == role)
            .flat_map(|(_, p)| p.iter().copied())
            .collect();
        out.extend(self.shared.iter().copied());
        out
    }

    pub fn allows(&self, role: Role, path: &str) -> bool {
        self.prefixes_for(role).iter().any(|p| prefix_matches(p, path))
    }

    /// Roles permitted on `path`; empty when no prefix covers it.
    pub fn allowed_roles(&self, path: &str) -> AllowedRoles {
        let roles: Vec<Role> = Role::ALL.iter().copied().filter(|r| self.allows(*r, path)).collect();
        AllowedRoles::only(&roles)
    }
}

/// `/admin` covers `/admin` and `/admin/...` but not `/administrator`.
pub fn prefix_matches(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Check a role against the built-in policy.
pub fn check_route_allowed(role: Role, path: &str) -> bool {
    DEFAULT_POLICY.allows(role, path)
}
