//! The navigation guard: the only authorization checkpoint in the client.
//!
//! `evaluate` is a pure decision over the current session and the route's
//! role-set. It keeps no state and must run on every navigation, because the
//! session can vanish between two renders (a logout elsewhere, a rejected token).

use tracing::debug;

use crate::identity::{AllowedRoles, RequestContext, Role, SessionStore};

use super::location::Location;
use super::routes::LOGIN_PATH;

/// Outcome class of one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    AuthorizedForRoute,
    UnauthorizedForRoute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// No session. `from` is the originally requested location.
    RedirectToLogin { from: Location },
    /// Signed in, but the role may not enter this route; go to the role's home.
    RedirectToHome { role: Role, from: Location },
    Render(RequestContext),
}

impl Decision {
    pub fn state(&self) -> GuardState {
        match self {
            Decision::RedirectToLogin { .. } => GuardState::Unauthenticated,
            Decision::RedirectToHome { .. } => GuardState::UnauthorizedForRoute,
            Decision::Render(_) => GuardState::AuthorizedForRoute,
        }
    }

    /// Where a redirect points, or `None` for a render.
    pub fn redirect_target(&self) -> Option<Location> {
        match self {
            Decision::RedirectToLogin { .. } => Some(Location::new(LOGIN_PATH)),
            Decision::RedirectToHome { role, .. } => Some(Location::new(role.home_path())),
            Decision::Render(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct NavigationGuard {
    sessions: SessionStore,
}

impl NavigationGuard {
    pub fn new(sessions: SessionStore) -> Self { Self { sessions } }

    pub fn evaluate(&self, location: &Location, allowed: &AllowedRoles) -> Decision {
        let Some(session) = self.sessions.current_session() else {
            debug!(target: "campusgate::guard", "guard {} -> login (no session)", location);
            return Decision::RedirectToLogin { from: location.clone() };
        };
        if !allowed.allows(session.role) {
            debug!(target: "campusgate::guard", "guard {} -> {} (role {} not allowed)", location, session.role.home_path(), session.role);
            return Decision::RedirectToHome { role: session.role, from: location.clone() };
        }
        debug!(target: "campusgate::guard", "guard {} -> render as {}", location, session.role);
        Decision::Render(RequestContext::new(session, location.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_with(role: Option<Role>) -> NavigationGuard {
        let store = SessionStore::in_memory();
        if let Some(r) = role {
            store.login(r, "abc", None);
        }
        NavigationGuard::new(store)
    }

    #[test]
    fn student_on_admin_route_goes_home() {
        let d = guard_with(Some(Role::Student)).evaluate(&Location::new("/admin"), &AllowedRoles::only(&[Role::Admin]));
        assert_eq!(d.state(), GuardState::UnauthorizedForRoute);
        assert_eq!(d.redirect_target(), Some(Location::new("/student")));
    }

    #[test]
    fn no_session_on_faculty_route_goes_to_login() {
        let d = guard_with(None).evaluate(&Location::new("/faculty?page=marks"), &AllowedRoles::only(&[Role::Faculty]));
        assert_eq!(d, Decision::RedirectToLogin { from: Location::new("/faculty?page=marks") });
        assert_eq!(d.redirect_target(), Some(Location::new("/login")));
    }

    #[test]
    fn admin_on_shared_route_renders() {
        let d = guard_with(Some(Role::Admin)).evaluate(&Location::new("/profile"), &AllowedRoles::only(&Role::ALL));
        match d {
            Decision::Render(ctx) => {
                assert_eq!(ctx.role, Role::Admin);
                assert_eq!(ctx.token, "abc");
                assert_eq!(ctx.location.path, "/profile");
            }
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn decision_follows_session_changes() {
        let store = SessionStore::in_memory();
        let guard = NavigationGuard::new(store.clone());
        let loc = Location::new("/student");
        let allowed = AllowedRoles::only(&[Role::Student]);

        store.login(Role::Student, "t", None);
        assert_eq!(guard.evaluate(&loc, &allowed).state(), GuardState::AuthorizedForRoute);
        store.logout();
        assert_eq!(guard.evaluate(&loc, &allowed).state(), GuardState::Unauthenticated);
    }
}
