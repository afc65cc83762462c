use std::collections::BTreeMap;

use chrono::Utc;
use cookie::Cookie;

use super::transport::HttpResponse;

const DEFAULT_COOKIES: &[(&str, &str)] = &[
    ("idlist", "0"),
    ("mkt_CA", "false"),
    ("mkt_MX", "false"),
    ("year_2005", "true"),
    ("ck", "1"),
    ("mkt_US", "true"),
];

/// Name fragments that mark a cookie as part of the signed-in session.
pub const AUTH_COOKIE_KEYWORDS: &[&str] = &["session", "login", "auth", "user"];

/// Cookies sent with every request of one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    /// The fixed market cookies plus a fresh `session_id`.
    pub fn with_defaults() -> Self {
        let mut cookies: BTreeMap<String, String> = DEFAULT_COOKIES
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        cookies.insert(
            "session_id".to_string(),
            format!("{:x}", md5::compute(seed.to_string())),
        );

        Self { cookies }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Merges one `Set-Cookie` value.
    ///
    /// An empty value, a non-positive `Max-Age` or an `Expires` date in the
    /// past deletes the cookie. Unparseable headers are skipped.
    pub fn merge_set_cookie(&mut self, header: &str) {
        let Ok(cookie) = Cookie::parse(header) else {
            return;
        };
        let name = cookie.name().trim();
        if name.is_empty() {
            return;
        }

        let now = Utc::now().timestamp();
        let expired = cookie.max_age().is_some_and(|age| age.whole_seconds() <= 0)
            || cookie
                .expires_datetime()
                .is_some_and(|at| at.unix_timestamp() <= now);

        let value = cookie.value_trimmed();
        if value.is_empty() || expired {
            self.cookies.remove(name);
        } else {
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }

    pub fn absorb(&mut self, response: &HttpResponse) {
        for header in response.header_values("set-cookie") {
            self.merge_set_cookie(header);
        }
    }

    /// Value for a `Cookie` request header, or `None` when the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Removes cookies whose lower-cased name contains any keyword.
    pub fn remove_matching(&mut self, keywords: &[&str]) -> usize {
        let before = self.cookies.len();
        self.cookies.retain(|name, _| {
            let name = name.to_lowercase();
            !keywords.iter().any(|k| name.contains(k))
        });
        before - self.cookies.len()
    }

    pub fn has_matching(&self, keywords: &[&str]) -> bool {
        self.cookies.keys().any(|name| {
            let name = name.to_lowercase();
            keywords.iter().any(|k| name.contains(k))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_market_cookies_and_session() {
        let jar = CookieJar::with_defaults();
        assert_eq!(jar.get("mkt_US"), Some("true"));
        assert_eq!(jar.get("year_2005"), Some("true"));
        assert_eq!(jar.get("session_id").map(str::len), Some(32));
        assert_eq!(jar.len(), 7);
    }

    #[test]
    fn set_cookie_merges_and_deletes() {
        let mut jar = CookieJar::default();
        jar.merge_set_cookie("PHPSESSID=abc123; path=/; HttpOnly");
        assert_eq!(jar.get("PHPSESSID"), Some("abc123"));

        jar.merge_set_cookie("PHPSESSID=xyz; Max-Age=0; path=/");
        assert_eq!(jar.get("PHPSESSID"), None);

        jar.merge_set_cookie("garbage without equals");
        assert!(jar.is_empty());
    }

    #[test]
    fn past_expires_deletes_and_future_expires_keeps() {
        let mut jar = CookieJar::default();
        jar.merge_set_cookie("PHPSESSID=abc123; path=/");
        jar.merge_set_cookie("PHPSESSID=deleted; Expires=Thu, 01 Jan 1970 00:00:01 GMT; path=/");
        assert_eq!(jar.get("PHPSESSID"), None);

        jar.merge_set_cookie("cart=\"42\"; Expires=Thu, 31 Dec 2099 23:59:59 GMT; Max-Age=3600");
        assert_eq!(jar.get("cart"), Some("42"));
    }

    #[test]
    fn logout_keywords_remove_only_auth_cookies() {
        let mut jar = CookieJar::with_defaults();
        jar.set("UserToken", "t");
        jar.set("rauth", "r");
        jar.set("LoginKey", "k");

        let removed = jar.remove_matching(AUTH_COOKIE_KEYWORDS);
        assert_eq!(removed, 4);
        assert_eq!(jar.get("mkt_US"), Some("true"));
        assert!(!jar.has_matching(AUTH_COOKIE_KEYWORDS));
    }

    #[test]
    fn header_value_is_semicolon_joined() {
        let mut jar = CookieJar::default();
        assert_eq!(jar.header_value(), None);
        jar.set("b", "2");
        jar.set("a", "1");
        assert_eq!(jar.header_value().as_deref(), Some("a=1; b=2"));
    }
}
