//! Session issuance and reuse.
//!
//! A session is obtained once with basic credentials and then reused for
//! every later call as a `JSESSIONID` cookie. There is no refresh: when the
//! server starts rejecting the cookie, the caller authenticates again.

use crate::config::XnatConfig;
use crate::credentials::Credentials;
use crate::error::{NixnatError, Result};
use crate::network::{session_cookie_string, Auth, Transport};
use tracing::{debug, info};

/// Markers that identify a failed login in the session-issuance body.
/// A 401 or 403 from the endpoint counts as a failed login too.
const FAILURE_MARKERS: [&str; 2] = ["error", "failed"];

/// Credentials plus the cookie issued for them.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    cookie: String,
}

impl Session {
    /// POST an empty body to the session endpoint and return the cookie
    /// string (`JSESSIONID=<token>`).
    pub async fn authenticate(transport: &dyn Transport, credentials: &Credentials) -> Result<String> {
        let auth = credentials.basic_auth()?;
        let url = format!("{}{}", credentials.server_url, XnatConfig::SESSION_PATH);

        debug!("Requesting session token from {}", url);
        let body = match transport.post(&url, "", &auth).await {
            Ok(body) => body,
            Err(e) if matches!(e.status(), Some(401 | 403)) => {
                return Err(NixnatError::Authentication {
                    url,
                    message: format!("Login rejected: {}", e),
                });
            }
            Err(e) => return Err(e),
        };
        let token = body.trim();

        let lowered = token.to_lowercase();
        if token.is_empty() || FAILURE_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Err(NixnatError::Authentication {
                url,
                message: if token.is_empty() {
                    "empty session token".to_string()
                } else {
                    "Login failed".to_string()
                },
            });
        }

        Ok(session_cookie_string(token))
    }

    /// Authenticate and keep the cookie for later calls.
    pub async fn establish(transport: &dyn Transport, credentials: Credentials) -> Result<Self> {
        let cookie = Self::authenticate(transport, &credentials).await?;
        info!(
            "Established XNAT session for project {} on {}",
            credentials.project, credentials.server_url
        );
        Ok(Self { credentials, cookie })
    }

    /// Reuse a cookie obtained earlier.
    pub fn resume(credentials: Credentials, cookie: impl Into<String>) -> Result<Self> {
        let cookie = cookie.into();
        if cookie.trim().is_empty() {
            return Err(NixnatError::config("Cannot resume a session without a cookie"));
        }
        Ok(Self {
            credentials,
            cookie: cookie.trim().to_string(),
        })
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn auth(&self) -> Auth {
        Auth::Cookie(self.cookie.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_rejects_empty_cookie() {
        let creds = Credentials::new("P", "https://x.org", "u", "p");
        assert!(matches!(
            Session::resume(creds.clone(), "  "),
            Err(NixnatError::Config { .. })
        ));
        let session = Session::resume(creds, "JSESSIONID=abc").unwrap();
        assert_eq!(session.cookie(), "JSESSIONID=abc");
        assert!(session.auth().is_cookie());
    }
}
