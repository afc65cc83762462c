//! HTTP session against the site: cookies, header profile, sign-in state.
//!
//! Interior state sits behind `std::sync::Mutex`. Every lock is taken and
//! released inside a synchronous statement, never across an `.await`.

mod auth;
mod challenge;
mod cookies;
mod profile;
mod transport;

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use auth::{AuthState, AuthenticationStatus};
pub use challenge::detect_challenge;
pub use cookies::{AUTH_COOKIE_KEYWORDS, CookieJar};
pub use profile::{RequestKind, request_headers};
pub use transport::{Headers, HttpResponse, ReqwestTransport, Transport};

use crate::config::{API_ENDPOINT, HeaderProfile};
use crate::error::{ClientError, Result};
use auth::{LoginOutcome, evaluate_login};

/// Decoded body of a `catalogapi.php` call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    /// Section id to HTML. The site sends `[]` instead of `{}` when empty.
    #[serde(default)]
    pub html_fill_sections: Value,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl ApiResponse {
    pub fn section(&self, id: &str) -> Option<&str> {
        self.html_fill_sections.get(id)?.as_str()
    }
}

pub struct Session<T: Transport = ReqwestTransport> {
    transport: T,
    profile: HeaderProfile,
    cookies: Mutex<CookieJar>,
    auth: Mutex<AuthState>,
    navigation: Mutex<Option<String>>,
}

pub(crate) fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, profile: HeaderProfile) -> Self {
        Self {
            transport,
            profile,
            cookies: Mutex::new(CookieJar::with_defaults()),
            auth: Mutex::new(AuthState::Anonymous),
            navigation: Mutex::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn profile(&self) -> HeaderProfile {
        self.profile
    }

    pub fn cookies(&self) -> CookieJar {
        lock(&self.cookies).clone()
    }

    fn headers(&self, kind: RequestKind, referer: Option<&str>) -> Vec<(String, String)> {
        let navigation = self.navigation_context();
        let referer = referer.or(navigation.as_deref());
        let mut headers = request_headers(self.profile, kind, referer);
        if let Some(cookie) = lock(&self.cookies).header_value() {
            headers.push(("Cookie".to_string(), cookie));
        }
        headers
    }

    /// Merges cookies, then rejects non-2xx statuses and challenge pages.
    fn accept(&self, url: &str, response: HttpResponse) -> Result<HttpResponse> {
        lock(&self.cookies).absorb(&response);

        if !response.is_success() {
            return Err(ClientError::status(url, response.status));
        }
        if let Some(marker) = detect_challenge(&response.body) {
            warn!("Anti-bot challenge at {} ({})", url, marker);
            return Err(ClientError::AntiBotChallenge {
                url: url.to_string(),
                marker: marker.to_string(),
            });
        }
        Ok(response)
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {}", url);
        let headers = self.headers(RequestKind::Document, None);
        let response = self.transport.get(url, &headers).await?;
        self.accept(url, response)
    }

    pub async fn post(
        &self,
        url: &str,
        form: &[(String, String)],
        kind: RequestKind,
        referer: Option<&str>,
    ) -> Result<HttpResponse> {
        debug!("POST {}", url);
        let headers = self.headers(kind, referer);
        let response = self.transport.post(url, form, &headers).await?;
        self.accept(url, response)
    }

    /// Calls `func` on the AJAX endpoint with a JSON `payload`.
    pub async fn api_request(&self, func: &str, payload: &Value) -> Result<ApiResponse> {
        let payload = payload.to_string();
        let fields = form(&[
            ("func", func),
            ("payload", payload.as_str()),
            ("api_json_request", "1"),
            ("sctchecked", "1"),
            ("scbeenloaded", "false"),
            ("curCartGroupID", ""),
        ]);

        let response = self
            .post(API_ENDPOINT, &fields, RequestKind::Ajax, None)
            .await?;

        serde_json::from_str(&response.body).map_err(|e| ClientError::UnexpectedResponse {
            url: API_ENDPOINT.to_string(),
            message: format!("{func}: {e}"),
        })
    }

    /// Signs in. `Ok(false)` means the site declined the credentials.
    pub async fn login(&self, identity: &str, secret: &str, keep_alive: bool) -> Result<bool> {
        let identity = identity.trim();
        if identity.is_empty() || secret.is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }

        let fields = form(&[
            ("loginaction", "login"),
            ("accountemail", identity),
            ("captchacode", ""),
            ("passworddecoy", ""),
            ("password", secret),
            ("passwordconfirmdecoy", ""),
            ("passwordconfirm", ""),
            ("keepsignin", if keep_alive { "true" } else { "false" }),
            ("async", "1"),
            ("accountlogin_php", "1"),
        ]);

        let response = match self
            .post(API_ENDPOINT, &fields, RequestKind::Ajax, None)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.set_auth(AuthState::Anonymous);
                return Err(e);
            }
        };

        match evaluate_login(&response.body, identity) {
            LoginOutcome::Success => {
                info!("Signed in as {}", identity);
                self.set_auth(AuthState::SignedIn {
                    identity: identity.to_string(),
                });
                Ok(true)
            }
            LoginOutcome::Rejected(reason) => {
                info!("Login rejected: {}", reason);
                self.set_auth(AuthState::Anonymous);
                Ok(false)
            }
            LoginOutcome::Captcha => {
                warn!("Login requires a security code");
                self.set_auth(AuthState::Anonymous);
                Err(ClientError::AntiBotChallenge {
                    url: API_ENDPOINT.to_string(),
                    marker: "accountcaptchaerror".to_string(),
                })
            }
        }
    }

    /// Local sign-in state is cleared even when the request fails.
    pub async fn logout(&self) -> Result<bool> {
        let fields = form(&[
            ("loginaction", "logout"),
            ("async", "1"),
            ("accountlogin_php", "1"),
        ]);
        let result = self
            .post(API_ENDPOINT, &fields, RequestKind::Ajax, None)
            .await;

        self.set_auth(AuthState::Anonymous);
        let removed = lock(&self.cookies).remove_matching(AUTH_COOKIE_KEYWORDS);
        debug!("Logout removed {} session cookies", removed);

        result.map(|_| true)
    }

    fn set_auth(&self, state: AuthState) {
        *lock(&self.auth) = state;
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.auth).is_authenticated()
    }

    pub fn authentication_status(&self) -> AuthenticationStatus {
        let auth = lock(&self.auth).clone();
        AuthenticationStatus {
            is_authenticated: auth.is_authenticated(),
            identity: auth.identity().map(str::to_string),
            has_session_cookies: lock(&self.cookies).has_matching(AUTH_COOKIE_KEYWORDS),
        }
    }

    /// Fails with `AuthenticationRequired` unless signed in.
    pub fn require_auth(&self, operation: &str) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::AuthenticationRequired(format!(
                "{operation} requires login"
            )))
        }
    }

    pub fn navigation_context(&self) -> Option<String> {
        lock(&self.navigation).clone()
    }

    pub fn set_navigation_context(&self, url: impl Into<String>) {
        *lock(&self.navigation) = Some(url.into());
    }

    pub async fn close(&self) {
        self.transport.close().await;
    }
}
