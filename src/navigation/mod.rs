//! Role-scoped navigation: locations, the static route table, the guard that
//! admits or redirects each navigation, and the per-role shells and menus.

pub mod guard;
pub mod location;
pub mod menu;
pub mod routes;

pub use guard::{Decision, GuardState, NavigationGuard};
pub use location::Location;
pub use menu::{AdminPage, FacultyPage, MenuEntry, Shell, StudentPage};
pub use routes::{Access, ResolvedRoute, Route, RouteTable, FORGET_PASSWORD_PATH, LOGIN_PATH, PROFILE_PATH};
