//! Static route table: each entry pairs a path pattern with its access rule.
//! Protected entries take their role-set from the route authorization policy, so
//! the table and the policy cannot drift apart.

use crate::identity::{AllowedRoles, Role, RoutePolicy};

use super::location::Location;

pub const LOGIN_PATH: &str = "/login";
pub const FORGET_PASSWORD_PATH: &str = "/forget-password";
pub const PROFILE_PATH: &str = "/profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    ForgetPassword,
    /// `/:type/update-password/:resetId`; `role` is `None` when `:type` is not a role.
    UpdatePassword { role: Option<Role>, reset_id: String },
    /// A role's layout. `page` is the sub-path segment (`/admin/branch`), if any.
    Shell { role: Role, page: Option<String> },
    Profile,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected(AllowedRoles),
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Exact(&'static str),
    /// `/:type/update-password/:resetId`
    ResetLink,
    /// Prefix owned by a role (`/admin`, `/admin/...`).
    RoleArea(Role),
}

#[derive(Debug, Clone, Copy)]
struct RouteDecl {
    pattern: Pattern,
    protected: bool,
}

const ROUTES: &[RouteDecl] = &[
    RouteDecl { pattern: Pattern::Exact("/"), protected: false },
    RouteDecl { pattern: Pattern::Exact(LOGIN_PATH), protected: false },
    RouteDecl { pattern: Pattern::Exact(FORGET_PASSWORD_PATH), protected: false },
    RouteDecl { pattern: Pattern::ResetLink, protected: false },
    RouteDecl { pattern: Pattern::RoleArea(Role::Admin), protected: true },
    RouteDecl { pattern: Pattern::RoleArea(Role::Faculty), protected: true },
    RouteDecl { pattern: Pattern::RoleArea(Role::Student), protected: true },
    RouteDecl { pattern: Pattern::Exact(PROFILE_PATH), protected: true },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,
    pub access: Access,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTable {
    policy: RoutePolicy,
}

impl RouteTable {
    pub fn new(policy: RoutePolicy) -> Self { Self { policy } }

    pub fn policy(&self) -> &RoutePolicy { &self.policy }

    /// First matching declaration wins. Anything unmatched is a public `NotFound`.
    pub fn resolve(&self, location: &Location) -> ResolvedRoute {
        let segments = location.segments();
        for decl in ROUTES {
            let Some(route) = match_pattern(decl.pattern, &location.path, &segments) else { continue };
            let access = if decl.protected {
                Access::Protected(self.policy.allowed_roles(&location.path))
            } else {
                Access::Public
            };
            return ResolvedRoute { route, access };
        }
        ResolvedRoute { route: Route::NotFound, access: Access::Public }
    }
}

fn match_pattern(pattern: Pattern, path: &str, segments: &[&str]) -> Option<Route> {
    match pattern {
        Pattern::Exact("/") if path == "/" => Some(Route::Login),
        Pattern::Exact(LOGIN_PATH) if path == LOGIN_PATH => Some(Route::Login),
        Pattern::Exact(FORGET_PASSWORD_PATH) if path == FORGET_PASSWORD_PATH => Some(Route::ForgetPassword),
        Pattern::Exact(PROFILE_PATH) if path == PROFILE_PATH => Some(Route::Profile),
        Pattern::Exact(_) => None,
        Pattern::ResetLink => match segments {
            [kind, "update-password", reset_id] => Some(Route::UpdatePassword {
                role: kind.parse::<Role>().ok(),
                reset_id: urlencoding::decode(reset_id).map(|c| c.into_owned()).unwrap_or_else(|_| reset_id.to_string()),
            }),
            _ => None,
        },
        Pattern::RoleArea(role) => match segments {
            [first] if *first == role.slug() => Some(Route::Shell { role, page: None }),
            [first, page] if *first == role.slug() => Some(Route::Shell { role, page: Some(page.to_string()) }),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(p: &str) -> ResolvedRoute {
        RouteTable::default().resolve(&Location::parse(p))
    }

    #[test]
    fn public_routes() {
        assert_eq!(resolve("/").route, Route::Login);
        assert_eq!(resolve("/login?type=faculty").route, Route::Login);
        assert_eq!(resolve("/forget-password").access, Access::Public);
        assert_eq!(
            resolve("/admin/update-password/r-123").route,
            Route::UpdatePassword { role: Some(Role::Admin), reset_id: "r-123".into() }
        );
        assert_eq!(
            resolve("/janitor/update-password/r").route,
            Route::UpdatePassword { role: None, reset_id: "r".into() }
        );
    }

    #[test]
    fn role_areas_are_protected_by_policy() {
        let r = resolve("/faculty");
        assert_eq!(r.route, Route::Shell { role: Role::Faculty, page: None });
        assert_eq!(r.access, Access::Protected(AllowedRoles::Only(vec![Role::Faculty])));

        let r = resolve("/admin/branch");
        assert_eq!(r.route, Route::Shell { role: Role::Admin, page: Some("branch".into()) });
        assert_eq!(r.access, Access::Protected(AllowedRoles::Only(vec![Role::Admin])));

        assert_eq!(resolve("/profile").access, Access::Protected(AllowedRoles::Any));
    }

    #[test]
    fn unknown_paths() {
        assert_eq!(resolve("/administrator").route, Route::NotFound);
        assert_eq!(resolve("/admin/a/b").route, Route::NotFound);
        assert_eq!(resolve("/dashboard").route, Route::NotFound);
    }
}
