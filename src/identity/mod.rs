//! Client-side identity: who is signed in, as which role, and what the portal
//! may show them. Keep the public surface thin and split implementation across sub-modules.

mod authorizer;
mod profile;
mod provider;
mod request_context;
mod role;
mod session;
pub mod storage;

pub use authorizer::{check_route_allowed, prefix_matches, AllowedRoles, RoutePolicy, DEFAULT_POLICY};
pub use profile::{format_date, EmergencyContact, Profile};
pub use provider::{AuthProvider, HttpAuthProvider, LoginRequest, LoginResponse};
pub use request_context::RequestContext;
pub use role::Role;
pub use session::{Session, SessionStore, SessionToken, PROFILE_KEY, ROLE_KEY, TOKEN_KEY};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
