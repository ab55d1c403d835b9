//! Composition root: wires the session store, guard, route table and auth
//! provider together and exposes the portal's user flows (login, open a
//! location, load the profile, logout, password recovery).
//!
//! Every failure resolves either to a redirect (`Navigation`) or to an
//! `AppError` the caller shows as a dismissible `Notification`.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::config::PortalConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{
    AuthProvider, FileStorage, HttpAuthProvider, LoginRequest, Profile, RequestContext, Role, SessionStorage,
    SessionStore, MemoryStorage,
};
use crate::navigation::{Access, Decision, Location, NavigationGuard, Route, RouteTable, Shell, LOGIN_PATH};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// Redirect chains are at most login → home; anything longer is a routing bug.
const MAX_REDIRECTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A dismissible user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

impl From<&AppError> for Notification {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Transport { .. } => Notification::error("Unable to reach the server. Please try again."),
            other => Notification::error(other.message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// `role` is the preselected login role; `from` is set when the guard sent the user here.
    Login { role: Role, from: Option<Location> },
    ForgetPassword { role: Role },
    UpdatePassword { role: Option<Role>, reset_id: String },
    Shell { shell: Shell, context: RequestContext },
    Profile { context: RequestContext },
    NotFound { location: Location },
}

/// Result of opening a location: the screen to show and where the user ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub screen: Screen,
    pub location: Location,
    /// The location originally asked for, when a redirect happened.
    pub redirected_from: Option<Location>,
}

pub struct Portal<P: AuthProvider = HttpAuthProvider> {
    sessions: SessionStore,
    guard: NavigationGuard,
    routes: RouteTable,
    provider: P,
    media_url: String,
}

impl Portal<HttpAuthProvider> {
    /// Build the HTTP-backed portal. Sessions go to `<state_dir>/session.json`,
    /// or stay in memory when no state directory is configured.
    pub fn from_config(cfg: &PortalConfig) -> AppResult<Self> {
        let storage: Arc<dyn SessionStorage> = match &cfg.state_dir {
            Some(dir) => {
                let file = FileStorage::open(dir)?;
                info!(target: "campusgate::portal", "session file {}", file.path().display());
                Arc::new(file)
            }
            None => Arc::new(MemoryStorage::new()),
        };
        let api = ApiClient::new(&cfg.api_url, cfg.http_timeout)?;
        info!(target: "campusgate::portal", "portal api={} state_dir={:?}", cfg.api_url, cfg.state_dir);
        Ok(Self::new(SessionStore::new(storage), HttpAuthProvider::new(api), cfg.media_url.clone()))
    }
}

impl<P: AuthProvider> Portal<P> {
    pub fn new(sessions: SessionStore, provider: P, media_url: impl Into<String>) -> Self {
        let guard = NavigationGuard::new(sessions.clone());
        Self { sessions, guard, routes: RouteTable::default(), provider, media_url: media_url.into() }
    }

    pub fn sessions(&self) -> &SessionStore { &self.sessions }

    pub fn provider(&self) -> &P { &self.provider }

    pub fn media_url(&self) -> &str { &self.media_url }

    /// Resolve `location` to a screen, following guard redirects.
    pub fn open(&self, location: &Location) -> Navigation {
        let mut current = location.clone();
        let mut redirected_from: Option<Location> = None;
        for _ in 0..MAX_REDIRECTS {
            match self.resolve_once(&current) {
                // The guard's login redirect keeps the refused location in `from`.
                Ok(screen @ Screen::Login { from: Some(_), .. }) => {
                    return Navigation {
                        screen,
                        location: Location::new(LOGIN_PATH),
                        redirected_from: redirected_from.or_else(|| Some(location.clone())),
                    };
                }
                Ok(screen) => return Navigation { screen, location: current, redirected_from },
                Err(next) => {
                    if redirected_from.is_none() {
                        redirected_from = Some(location.clone());
                    }
                    current = next;
                }
            }
        }
        warn!(target: "campusgate::portal", "redirect limit hit opening {}", location);
        Navigation {
            screen: Screen::Login { role: Role::Student, from: Some(location.clone()) },
            location: Location::new(LOGIN_PATH),
            redirected_from: Some(location.clone()),
        }
    }

    /// `Ok(screen)` to render, `Err(location)` to redirect.
    fn resolve_once(&self, location: &Location) -> Result<Screen, Location> {
        let resolved = self.routes.resolve(location);
        let allowed = match resolved.access {
            Access::Public => return self.public_screen(resolved.route, location),
            Access::Protected(allowed) => allowed,
        };
        let ctx = match self.guard.evaluate(location, &allowed) {
            Decision::Render(ctx) => ctx,
            Decision::RedirectToLogin { from } => {
                return Ok(Screen::Login { role: login_role(location), from: Some(from) });
            }
            redirect @ Decision::RedirectToHome { .. } => {
                return Err(redirect.redirect_target().unwrap_or_else(|| Location::new(LOGIN_PATH)));
            }
        };
        match resolved.route {
            Route::Shell { role, page } => {
                let page = ctx.location.param("page").map(|s| s.to_string()).or(page);
                let shell = Shell::for_role(role, page.as_deref());
                debug!(target: "campusgate::portal", "render shell {:?}", shell);
                Ok(Screen::Shell { shell, context: ctx })
            }
            Route::Profile => Ok(Screen::Profile { context: ctx }),
            other => {
                warn!(target: "campusgate::portal", "protected access on non-protected route {:?}", other);
                Ok(Screen::NotFound { location: location.clone() })
            }
        }
    }

    /// Login and recovery screens bounce an existing session to its home.
    fn public_screen(&self, route: Route, location: &Location) -> Result<Screen, Location> {
        match route {
            Route::Login | Route::ForgetPassword => {
                if let Some(s) = self.sessions.current_session() {
                    return Err(Location::new(s.role.home_path()));
                }
                let role = login_role(location);
                Ok(match route {
                    Route::Login => Screen::Login { role, from: None },
                    _ => Screen::ForgetPassword { role },
                })
            }
            Route::UpdatePassword { role, reset_id } => Ok(Screen::UpdatePassword { role, reset_id }),
            Route::NotFound | Route::Shell { .. } | Route::Profile => Ok(Screen::NotFound { location: location.clone() }),
        }
    }

    /// Authenticate and persist `{role, token}`; lands on the role's home.
    /// An auth failure leaves no session behind; a transport failure leaves the
    /// existing session untouched.
    pub async fn login(&self, role: Role, email: &str, password: &str) -> AppResult<Navigation> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::user("empty_fields", "Please fill in all fields"));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(AppError::user("invalid_email", "Please enter a valid email"));
        }
        let req = LoginRequest { role, email: email.to_string(), password: password.to_string() };
        match self.provider.login(&req).await {
            Ok(resp) => {
                self.sessions.login(resp.role, resp.token, None);
                info!(target: "campusgate::portal", "signed in as {}", resp.role);
                Ok(self.open(&Location::new(resp.role.home_path())))
            }
            Err(e) => {
                if e.is_auth() {
                    self.sessions.logout();
                }
                warn!(target: "campusgate::portal", "login failed role={}: {}", role, e);
                Err(e)
            }
        }
    }

    /// Fetch `my-details` for the signed-in role and cache it on the session.
    /// A rejected token clears the session; use `recover` to get the login redirect.
    pub async fn load_profile(&self) -> AppResult<Profile> {
        let session = self
            .sessions
            .current_session()
            .ok_or_else(|| AppError::auth("no_session", "Please log in to continue"))?;
        let env = match self.provider.my_details(session.role, &session.token).await {
            Ok(env) => env,
            Err(e) => {
                if e.is_auth() {
                    info!(target: "campusgate::portal", "token rejected while loading profile; clearing session");
                    self.sessions.logout();
                }
                return Err(e);
            }
        };
        if !env.success {
            return Err(AppError::remote("profile_failed".to_string(), env.message_or("Error fetching user details")));
        }
        let profile = env
            .data
            .ok_or_else(|| AppError::remote("profile_missing", "Error fetching user details"))?;
        self.sessions.set_profile(profile.clone());
        Ok(profile)
    }

    /// Turn an error from any backend call into the navigation it implies:
    /// auth failures clear the session and go to login, everything else stays put.
    pub fn recover(&self, err: &AppError) -> Option<Navigation> {
        if !err.is_auth() {
            return None;
        }
        Some(self.logout())
    }

    /// Clear the session and land on the login screen. Idempotent.
    pub fn logout(&self) -> Navigation {
        self.sessions.logout();
        self.open(&Location::new(LOGIN_PATH))
    }

    /// Open another page of the current shell.
    pub fn select_page(&self, shell: &Shell, page: &str) -> Navigation {
        self.open(&shell.select(page).location())
    }

    pub async fn forget_password(&self, role: Role, email: &str) -> AppResult<Notification> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::user("empty_email", "Please enter your email"));
        }
        let env = self.provider.forget_password(role, email).await?;
        if env.success {
            Ok(Notification::success(env.message_or("Reset mail sent")))
        } else {
            Err(AppError::remote("reset_mail_failed".to_string(), env.message_or("Error sending reset mail")))
        }
    }

    pub async fn update_password(
        &self,
        role: Option<Role>,
        reset_id: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<Notification> {
        let reset_id = reset_id.trim();
        if reset_id.is_empty() {
            return Err(AppError::user("invalid_reset_link", "Invalid or expired reset link."));
        }
        if new_password.is_empty() {
            return Err(AppError::user("empty_fields", "Please fill in all fields"));
        }
        if new_password != confirm_password {
            return Err(AppError::user("password_mismatch", "Passwords do not match."));
        }
        let Some(role) = role else {
            return Err(AppError::user("invalid_reset_link", "Invalid Reset Password Link."));
        };
        let env = self.provider.update_password(role, reset_id, new_password).await?;
        if env.success {
            Ok(Notification::success("Password reset successfully."))
        } else {
            Err(AppError::remote("reset_failed".to_string(), env.message_or("Error resetting password.")))
        }
    }
}

/// `?type=faculty` preselects the login role; default is Student.
fn login_role(location: &Location) -> Role {
    location.param("type").and_then(|t| t.parse::<Role>().ok()).unwrap_or(Role::Student)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Envelope;
    use crate::identity::LoginResponse;
    use parking_lot::Mutex;
    use serde_json::Value;

    /// Scripted provider: answers from fixed results and records calls.
    #[derive(Default)]
    struct FakeProvider {
        login_result: Mutex<Option<AppResult<LoginResponse>>>,
        details_result: Mutex<Option<AppResult<Envelope<Profile>>>>,
        calls: Mutex<Vec<String>>,
    }

    impl AuthProvider for FakeProvider {
        async fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
            self.calls.lock().push(format!("login {} {}", req.role.slug(), req.email));
            self.login_result.lock().take().unwrap_or_else(|| Err(AppError::transport("transport", "unscripted")))
        }

        async fn my_details(&self, role: Role, token: &str) -> AppResult<Envelope<Profile>> {
            self.calls.lock().push(format!("details {} {}", role.slug(), token));
            self.details_result.lock().take().unwrap_or_else(|| Err(AppError::transport("transport", "unscripted")))
        }

        async fn forget_password(&self, role: Role, email: &str) -> AppResult<Envelope<Value>> {
            self.calls.lock().push(format!("forget {} {}", role.slug(), email));
            Ok(Envelope { success: true, message: "Reset mail sent".into(), data: None })
        }

        async fn update_password(&self, role: Role, reset_id: &str, _password: &str) -> AppResult<Envelope<Value>> {
            self.calls.lock().push(format!("update {} {}", role.slug(), reset_id));
            Ok(Envelope { success: true, message: String::new(), data: None })
        }
    }

    fn portal() -> Portal<FakeProvider> {
        Portal::new(SessionStore::in_memory(), FakeProvider::default(), "http://media")
    }

    #[tokio::test]
    async fn login_validates_before_calling_backend() {
        let p = portal();
        let e = p.login(Role::Admin, " ", "pw").await.unwrap_err();
        assert_eq!(e.message(), "Please fill in all fields");
        let e = p.login(Role::Admin, "not-an-email", "pw").await.unwrap_err();
        assert_eq!(e.code_str(), "invalid_email");
        assert!(p.provider().calls.lock().is_empty());
    }

    #[tokio::test]
    async fn successful_login_lands_on_role_home() {
        let p = portal();
        *p.provider().login_result.lock() = Some(Ok(LoginResponse { role: Role::Faculty, token: "tok".into(), message: String::new() }));
        let nav = p.login(Role::Faculty, "f@college.edu", "pw").await.unwrap();
        assert_eq!(nav.location.path, "/faculty");
        match nav.screen {
            Screen::Shell { shell, context } => {
                assert_eq!(shell, Shell::Faculty(crate::navigation::FacultyPage::Home));
                assert_eq!(context.token, "tok");
            }
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejected_login_clears_session_but_transport_failure_keeps_it() {
        let p = portal();
        p.sessions().login(Role::Student, "old", None);
        *p.provider().login_result.lock() = Some(Err(AppError::transport("transport", "connection refused")));
        let e = p.login(Role::Student, "s@college.edu", "pw").await.unwrap_err();
        assert_eq!(Notification::from(&e).message, "Unable to reach the server. Please try again.");
        assert_eq!(p.sessions().current_session().unwrap().token, "old");

        *p.provider().login_result.lock() = Some(Err(AppError::auth("login_failed", "Invalid credentials")));
        let e = p.login(Role::Student, "s@college.edu", "bad").await.unwrap_err();
        assert_eq!(Notification::from(&e), Notification::error("Invalid credentials"));
        assert!(p.sessions().current_session().is_none());
    }

    #[tokio::test]
    async fn expired_token_on_profile_load_forces_login() {
        let p = portal();
        p.sessions().login(Role::Admin, "stale", None);
        *p.provider().details_result.lock() = Some(Err(AppError::from_status(401, "jwt expired".into())));
        let e = p.load_profile().await.unwrap_err();
        assert!(p.sessions().current_session().is_none());
        let nav = p.recover(&e).unwrap();
        assert_eq!(nav.location.path, "/login");
        assert!(matches!(nav.screen, Screen::Login { from: None, .. }));
    }

    #[tokio::test]
    async fn forbidden_answers_end_the_session() {
        let p = portal();
        p.sessions().login(Role::Faculty, "old", None);
        *p.provider().login_result.lock() = Some(Err(AppError::from_status(403, "Account blocked".into())));
        let e = p.login(Role::Faculty, "f@college.edu", "pw").await.unwrap_err();
        assert_eq!(e.message(), "Account blocked");
        assert!(p.sessions().current_session().is_none());

        p.sessions().login(Role::Faculty, "old", None);
        *p.provider().details_result.lock() = Some(Err(AppError::from_status(403, "Forbidden".into())));
        let e = p.load_profile().await.unwrap_err();
        assert!(p.sessions().current_session().is_none());
        let nav = p.recover(&e).unwrap();
        assert_eq!(nav.location.path, "/login");
    }

    #[tokio::test]
    async fn soft_profile_failure_keeps_session() {
        let p = portal();
        p.sessions().login(Role::Student, "tok", None);
        *p.provider().details_result.lock() = Some(Ok(Envelope::failed("Student not found")));
        let e = p.load_profile().await.unwrap_err();
        assert_eq!(e.message(), "Student not found");
        assert!(p.recover(&e).is_none());
        assert!(p.sessions().current_session().is_some());
    }

    #[tokio::test]
    async fn profile_is_cached_on_session() {
        let p = portal();
        p.sessions().login(Role::Student, "tok", None);
        let prof = Profile { first_name: Some("Asha".into()), ..Default::default() };
        *p.provider().details_result.lock() = Some(Ok(Envelope::ok("", prof.clone())));
        assert_eq!(p.load_profile().await.unwrap(), prof);
        assert_eq!(p.sessions().current_session().unwrap().profile, Some(prof));
        assert_eq!(p.provider().calls.lock().last().unwrap(), "details student tok");
    }

    #[test]
    fn open_applies_guard_and_public_rules() {
        let p = portal();
        let nav = p.open(&Location::new("/admin?page=branch"));
        assert_eq!(nav.screen, Screen::Login { role: Role::Student, from: Some(Location::new("/admin?page=branch")) });
        assert_eq!(nav.location.path, "/login");
        assert_eq!(nav.redirected_from, Some(Location::new("/admin?page=branch")));

        p.sessions().login(Role::Student, "t", None);
        let nav = p.open(&Location::new("/admin"));
        assert_eq!(nav.location.path, "/student");
        assert_eq!(nav.redirected_from, Some(Location::new("/admin")));

        let nav = p.open(&Location::new("/login"));
        assert_eq!(nav.location.path, "/student");
        assert!(matches!(nav.screen, Screen::Shell { .. }));

        let nav = p.open(&Location::new("/student?page=marks"));
        match nav.screen {
            Screen::Shell { shell, .. } => assert_eq!(shell.page_id(), "marks"),
            other => panic!("unexpected screen {:?}", other),
        }
        assert!(matches!(p.open(&Location::new("/profile")).screen, Screen::Profile { .. }));
        assert!(matches!(p.open(&Location::new("/nope")).screen, Screen::NotFound { .. }));
    }

    #[test]
    fn login_screen_preselects_role_from_query() {
        let p = portal();
        assert_eq!(p.open(&Location::new("/login?type=faculty")).screen, Screen::Login { role: Role::Faculty, from: None });
        assert_eq!(p.open(&Location::new("/forget-password?type=admin")).screen, Screen::ForgetPassword { role: Role::Admin });
    }

    #[tokio::test]
    async fn password_recovery_validation() {
        let p = portal();
        assert_eq!(p.forget_password(Role::Admin, "").await.unwrap_err().message(), "Please enter your email");
        assert_eq!(p.forget_password(Role::Admin, "a@b.co").await.unwrap().message, "Reset mail sent");

        let e = p.update_password(Some(Role::Admin), "r1", "a", "b").await.unwrap_err();
        assert_eq!(e.message(), "Passwords do not match.");
        let e = p.update_password(Some(Role::Admin), "", "a", "a").await.unwrap_err();
        assert_eq!(e.message(), "Invalid or expired reset link.");
        let e = p.update_password(None, "r1", "a", "a").await.unwrap_err();
        assert_eq!(e.message(), "Invalid Reset Password Link.");
        let ok = p.update_password(Some(Role::Faculty), "r1", "a", "a").await.unwrap();
        assert_eq!(ok, Notification::success("Password reset successfully."));
        assert_eq!(p.provider().calls.lock().last().unwrap(), "update faculty r1");
    }
}
