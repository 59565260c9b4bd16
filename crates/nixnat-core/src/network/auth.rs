//! Request authentication: a session cookie or HTTP basic credentials.

use crate::config::XnatConfig;
use std::fmt;

/// How a request authenticates against the archive.
///
/// Exactly one mechanism is carried per request; the choice between cookie
/// and credentials is made once, when the value is built.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Full cookie string, e.g. `JSESSIONID=0123ABCD`.
    Cookie(String),
    Basic { username: String, password: String },
}

impl Auth {
    /// Wrap a raw session token as a `JSESSIONID=<token>` cookie.
    pub fn session_cookie(token: &str) -> Self {
        Auth::Cookie(session_cookie_string(token))
    }

    /// Split a `user:pass` string. A missing colon means an empty password.
    pub fn from_userpass(userpass: &str) -> Self {
        let (username, password) = userpass.split_once(':').unwrap_or((userpass, ""));
        Auth::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn is_cookie(&self) -> bool {
        matches!(self, Auth::Cookie(_))
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Cookie(_) => f.write_str("Auth::Cookie(<redacted>)"),
            Auth::Basic { username, .. } => f
                .debug_struct("Auth::Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Format a raw session token as `JSESSIONID=<token>`; an already prefixed
/// token is returned trimmed but otherwise unchanged.
pub fn session_cookie_string(token: &str) -> String {
    let token = token.trim();
    let prefix = format!("{}=", XnatConfig::SESSION_COOKIE);
    if token.starts_with(&prefix) {
        token.to_string()
    } else {
        format!("{prefix}{token}")
    }
}
