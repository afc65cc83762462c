use crate::config::{BASE_URL, HeaderProfile};

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
const SEC_CH_UA: &str = r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#;

/// Whether a request is a page load or an in-page AJAX call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Document,
    Ajax,
}

fn identity_headers(profile: HeaderProfile) -> [(&'static str, &'static str); 4] {
    match profile {
        HeaderProfile::Desktop => [
            ("User-Agent", DESKTOP_USER_AGENT),
            ("Sec-Ch-Ua", SEC_CH_UA),
            ("Sec-Ch-Ua-Mobile", "?0"),
            ("Sec-Ch-Ua-Platform", r#""Windows""#),
        ],
        HeaderProfile::Mobile => [
            ("User-Agent", MOBILE_USER_AGENT),
            ("Sec-Ch-Ua", SEC_CH_UA),
            ("Sec-Ch-Ua-Mobile", "?1"),
            ("Sec-Ch-Ua-Platform", r#""Android""#),
        ],
    }
}

/// Full header set for one request, without cookies.
pub fn request_headers(
    profile: HeaderProfile,
    kind: RequestKind,
    referer: Option<&str>,
) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = identity_headers(profile)
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();

    let fetch: &[(&str, &str)] = match kind {
        RequestKind::Document => &[
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "same-origin"),
            ("Sec-Fetch-User", "?1"),
            ("Upgrade-Insecure-Requests", "1"),
        ],
        RequestKind::Ajax => &[
            ("Accept", "application/json, text/javascript, */*; q=0.01"),
            ("X-Requested-With", "XMLHttpRequest"),
            ("Origin", BASE_URL),
            ("Sec-Fetch-Dest", "empty"),
            ("Sec-Fetch-Mode", "cors"),
            ("Sec-Fetch-Site", "same-origin"),
        ],
    };
    headers.extend(fetch.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

    headers.push(("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()));
    headers.push(("Cache-Control".to_string(), "no-cache".to_string()));
    headers.push(("Pragma".to_string(), "no-cache".to_string()));
    headers.push((
        "Referer".to_string(),
        referer.map_or_else(|| format!("{BASE_URL}/"), str::to_string),
    ));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn profile_only_changes_identity_headers() {
        let desktop = request_headers(HeaderProfile::Desktop, RequestKind::Ajax, None);
        let mobile = request_headers(HeaderProfile::Mobile, RequestKind::Ajax, None);

        assert_eq!(value(&mobile, "Sec-Ch-Ua-Mobile"), Some("?1"));
        assert!(value(&mobile, "User-Agent").unwrap().contains("Mobile"));

        let differing: Vec<&str> = desktop
            .iter()
            .zip(&mobile)
            .filter(|(a, b)| a != b)
            .map(|(a, _)| a.0.as_str())
            .collect();
        assert_eq!(differing, vec!["User-Agent", "Sec-Ch-Ua-Mobile", "Sec-Ch-Ua-Platform"]);
    }

    #[test]
    fn kind_sets_fetch_metadata() {
        let doc = request_headers(HeaderProfile::Desktop, RequestKind::Document, None);
        let ajax = request_headers(
            HeaderProfile::Desktop,
            RequestKind::Ajax,
            Some("https://www.rockauto.com/en/catalog/honda,2015,civic"),
        );

        assert_eq!(value(&doc, "Sec-Fetch-Mode"), Some("navigate"));
        assert_eq!(value(&doc, "Referer"), Some("https://www.rockauto.com/"));
        assert_eq!(value(&ajax, "X-Requested-With"), Some("XMLHttpRequest"));
        assert_eq!(
            value(&ajax, "Referer"),
            Some("https://www.rockauto.com/en/catalog/honda,2015,civic")
        );
    }
}
