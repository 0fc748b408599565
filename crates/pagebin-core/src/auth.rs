//! Admission decisions from session and cookie authentication state.
//!
//! A request carries two independently-settable views of one logical fact:
//! the server-side session and the client-side auth cookie. The cookie
//! exists so that losing the session (store eviction, restart) does not
//! force a re-login; whenever only the cookie proves authentication, the
//! session is synchronized from it before any role check runs. The
//! synchronization is idempotent: an already-promoted session is left
//! untouched.
//!
//! Guards never fail with errors. Every call produces exactly one
//! [`Admission`]: pass the request through, redirect it to the login page,
//! or reject it with a structured response the caller renders. Which
//! rejection shape a request gets depends on whether it looks like an API
//! call (path prefix or `Accept` header) or a page navigation.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Location page requests are redirected to when unauthenticated.
pub const LOGIN_PATH: &str = "/login";

/// Recognized user roles, least privileged last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including the admin surface.
    Admin,
    /// Ordinary authenticated user.
    User,
}

impl Role {
    /// Parses a cookie value into a role. Unrecognized values are `None`;
    /// callers default those to the least-privileged role.
    #[must_use]
    pub fn from_cookie(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// The cookie/session string for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// Server-side session view of the caller, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Whether this session has proven authentication.
    pub authenticated: bool,
    /// Role attached to the session, if any.
    pub role: Option<Role>,
}

/// Client-side cookie view of the caller.
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    /// The auth flag cookie; authentication requires the literal `"true"`.
    pub auth: Option<String>,
    /// The role cookie, parsed leniently via [`Role::from_cookie`].
    pub role: Option<String>,
}

impl Cookies {
    fn authenticated(&self) -> bool {
        self.auth.as_deref() == Some("true")
    }
}

/// The request attributes admission decisions depend on.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Request path, used both for the API prefix check and log context.
    pub path: String,
    /// The `Accept` header, if the caller sent one.
    pub accept: Option<String>,
}

impl RequestInfo {
    /// Whether a rejection should be a structured error rather than a
    /// redirect: API-prefixed paths and callers asking for JSON.
    #[must_use]
    pub fn wants_structured(&self) -> bool {
        self.path.starts_with("/api")
            || self
                .accept
                .as_deref()
                .is_some_and(|accept| accept.contains("application/json"))
    }
}

/// A structured rejection, rendered by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// HTTP-style status: 401 unauthenticated, 403 unauthorized.
    pub status: u16,
    /// Human-readable reason.
    pub error: String,
}

impl Rejection {
    fn unauthenticated() -> Self {
        Self {
            status: 401,
            error: "authentication required".to_string(),
        }
    }

    fn forbidden() -> Self {
        Self {
            status: 403,
            error: "insufficient privileges".to_string(),
        }
    }

    /// The response body shape consumed by API callers.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        json!({ "success": false, "error": self.error })
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Let the request through.
    Granted,
    /// Send the caller to the given location instead.
    Redirect(String),
    /// Reject with a structured response.
    Denied(Rejection),
}

/// Request guard reconciling session and cookie authentication.
///
/// The enforcement flag is injected at construction and read-only
/// afterwards; the guard never consults ambient state.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    auth_enabled: bool,
}

impl Gate {
    /// Creates a gate. With `auth_enabled` false every check admits
    /// unconditionally.
    #[must_use]
    pub const fn new(auth_enabled: bool) -> Self {
        Self { auth_enabled }
    }

    /// Admits any authenticated caller.
    ///
    /// Session authentication wins outright; otherwise a `"true"` auth
    /// cookie admits and promotes the session as a side effect. Anonymous
    /// API requests are denied with 401, anonymous page requests are
    /// redirected to [`LOGIN_PATH`].
    pub fn admit_authenticated(
        &self,
        request: &RequestInfo,
        session: &mut Session,
        cookies: &Cookies,
    ) -> Admission {
        if !self.auth_enabled {
            return Admission::Granted;
        }

        if session.authenticated {
            debug!(path = %request.path, "admitted via session");
            return Admission::Granted;
        }

        if cookies.authenticated() {
            promote_session(session, cookies);
            debug!(path = %request.path, role = ?session.role, "admitted via cookie");
            return Admission::Granted;
        }

        reject_unauthenticated(request)
    }

    /// Admits only authenticated callers holding the admin role.
    ///
    /// Applies the same session/cookie reconciliation first, so a
    /// cookie-only admin is recognized. An authenticated caller without the
    /// admin role is denied with 403 — never redirected, since sending an
    /// authenticated user to the login page would be useless.
    pub fn admit_admin(
        &self,
        request: &RequestInfo,
        session: &mut Session,
        cookies: &Cookies,
    ) -> Admission {
        if !self.auth_enabled {
            return Admission::Granted;
        }

        if !session.authenticated {
            if cookies.authenticated() {
                promote_session(session, cookies);
                debug!(path = %request.path, role = ?session.role, "session restored from cookie");
            } else {
                return reject_unauthenticated(request);
            }
        }

        if session.role == Some(Role::Admin) {
            debug!(path = %request.path, "admin admitted");
            return Admission::Granted;
        }

        debug!(path = %request.path, role = ?session.role, "admin check failed");
        Admission::Denied(Rejection::forbidden())
    }
}

/// Copies authentication from the cookie into the session. The cookie role
/// is honored when recognized; anything else becomes the ordinary user
/// role.
fn promote_session(session: &mut Session, cookies: &Cookies) {
    session.authenticated = true;
    session.role = Some(
        cookies
            .role
            .as_deref()
            .and_then(Role::from_cookie)
            .unwrap_or(Role::User),
    );
}

fn reject_unauthenticated(request: &RequestInfo) -> Admission {
    debug!(path = %request.path, "unauthenticated request rejected");
    if request.wants_structured() {
        Admission::Denied(Rejection::unauthenticated())
    } else {
        Admission::Redirect(LOGIN_PATH.to_string())
    }
}
