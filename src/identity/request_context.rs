use crate::navigation::Location;

use super::profile::Profile;
use super::role::Role;
use super::session::{Session, SessionToken};

/// What an admitted screen receives from the guard: the identity to attach to
/// its API calls and the location it was opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub role: Role,
    pub token: SessionToken,
    pub profile: Option<Profile>,
    pub location: Location,
}

impl RequestContext {
    pub fn new(session: Session, location: Location) -> Self {
        Self { role: session.role, token: session.token, profile: session.profile, location }
    }
}
