//! HTTP client for short-link resolution and HTML fetching.
//!
//! Two inner `reqwest` clients: a *probe* client with redirects disabled;
//! short-link resolution reads the `Location` header of the first response
//! rather than following it; and a *fetch* client that follows redirects for
//! plain body downloads.

use std::time::Duration;

use regex::Regex;

use crate::error::NetError;

/// How a short link is probed for its long form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    /// `HEAD`; the redirect `Location` header carries the long URL.
    Head,
    /// `GET`; some shorteners only redirect (or reveal a canonical URL in
    /// the body) on a full request.
    Get,
}

/// Construction parameters, kept separate so hosts can hydrate them from
/// their own configuration layer.
#[derive(Debug, Clone)]
pub struct UrlClientConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for UrlClientConfig {
    fn default() -> Self {
        UrlClientConfig {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: "geolink/0.1 (link-conversion)".to_owned(),
        }
    }
}

pub struct UrlClient {
    probe: reqwest::Client,
    fetch: reqwest::Client,
    /// When set, every outgoing request is re-rooted onto this
    /// `scheme://host`; used to point at a mock server in tests.
    base_override: Option<String>,
}

impl UrlClient {
    /// Build a client pair from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Build`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &UrlClientConfig) -> Result<Self, NetError> {
        Self::build(config, None)
    }

    /// Build a client whose requests all land on `base_url` regardless of
    /// the requested host (for testing with wiremock). Path and query are
    /// preserved.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Build`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(config: &UrlClientConfig, base_url: &str) -> Result<Self, NetError> {
        Self::build(config, Some(base_url.trim_end_matches('/').to_owned()))
    }

    fn build(config: &UrlClientConfig, base_override: Option<String>) -> Result<Self, NetError> {
        let base = || {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .user_agent(config.user_agent.clone())
        };
        let probe = base()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(NetError::Build)?;
        let fetch = base().build().map_err(NetError::Build)?;
        Ok(UrlClient {
            probe,
            fetch,
            base_override,
        })
    }

    fn effective_url(&self, url: &str) -> String {
        let Some(base) = &self.base_override else {
            return url.to_owned();
        };
        let after_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
        let path_and_query = after_scheme.find('/').map_or("/", |i| &after_scheme[i..]);
        format!("{base}{path_and_query}")
    }

    /// Probe `url` and return the redirect target, if any.
    ///
    /// A 3xx `Location` header wins; a 2xx `GET` body is scanned for a
    /// canonical/og:url/meta-refresh target as a fallback. `Ok(None)` means
    /// the server answered but revealed no long-form URL.
    ///
    /// # Errors
    ///
    /// [`NetError::Recoverable`] on timeout-class transport failures,
    /// [`NetError::Unrecoverable`] on other failures or non-2xx/3xx status.
    pub async fn request_location_header(
        &self,
        url: &str,
        method: ProbeMethod,
    ) -> Result<Option<String>, NetError> {
        let target = self.effective_url(url);
        let request = match method {
            ProbeMethod::Head => self.probe.head(&target),
            ProbeMethod::Get => self.probe.get(&target),
        };
        let response = request
            .send()
            .await
            .map_err(|e| NetError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(NetError::Unrecoverable {
                url: url.to_owned(),
                status: Some(status.as_u16()),
                timeout_cause: false,
                source: None,
            });
        }

        if let Some(location) = response.headers().get(reqwest::header::LOCATION) {
            let target = location
                .to_str()
                .map_err(|_| NetError::Unrecoverable {
                    url: url.to_owned(),
                    status: Some(status.as_u16()),
                    timeout_cause: false,
                    source: None,
                })?
                .to_owned();
            tracing::debug!(url, target = %target, "short link resolved via Location header");
            return Ok(Some(target));
        }

        if method == ProbeMethod::Get && status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| NetError::from_reqwest(url, e))?;
            let target = extract_canonical_url(&body);
            if let Some(target) = &target {
                tracing::debug!(url, target = %target, "short link resolved via page body");
            }
            return Ok(target);
        }

        Ok(None)
    }

    /// Fetch a text body, following redirects.
    ///
    /// # Errors
    ///
    /// [`NetError::Recoverable`] on timeout-class transport failures,
    /// [`NetError::Unrecoverable`] on other failures or non-success status.
    pub async fn get_text(&self, url: &str) -> Result<String, NetError> {
        let target = self.effective_url(url);
        let response = self
            .fetch
            .get(&target)
            .send()
            .await
            .map_err(|e| NetError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetError::Unrecoverable {
                url: url.to_owned(),
                status: Some(status.as_u16()),
                timeout_cause: false,
                source: None,
            });
        }

        response
            .text()
            .await
            .map_err(|e| NetError::from_reqwest(url, e))
    }
}

/// Pull a long-form URL out of a shortener's 200 response body.
///
/// Recognises, in order: `<link rel="canonical">`, `<meta property="og:url">`,
/// and `<meta http-equiv="refresh" content="0;url=...">`.
fn extract_canonical_url(body: &str) -> Option<String> {
    let patterns = [
        r#"<link[^>]+rel=["']canonical["'][^>]+href=["']([^"']+)["']"#,
        r#"<link[^>]+href=["']([^"']+)["'][^>]+rel=["']canonical["']"#,
        r#"<meta[^>]+property=["']og:url["'][^>]+content=["']([^"']+)["']"#,
        r#"<meta[^>]+http-equiv=["']refresh["'][^>]+content=["'][^"']*url=([^"']+)["']"#,
    ];
    for pattern in &patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(body) {
            if let Some(m) = cap.get(1) {
                return Some(m.as_str().to_owned());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{extract_canonical_url, UrlClient, UrlClientConfig};

    #[test]
    fn base_override_rewrites_host_and_keeps_path() {
        let client =
            UrlClient::with_base_url(&UrlClientConfig::default(), "http://127.0.0.1:9000/")
                .unwrap();
        assert_eq!(
            client.effective_url("https://maps.app.goo.gl/Tmbe?x=1"),
            "http://127.0.0.1:9000/Tmbe?x=1"
        );
        assert_eq!(
            client.effective_url("https://goo.gl"),
            "http://127.0.0.1:9000/"
        );
    }

    #[test]
    fn no_override_passes_url_through() {
        let client = UrlClient::new(&UrlClientConfig::default()).unwrap();
        assert_eq!(
            client.effective_url("https://example.com/a"),
            "https://example.com/a"
        );
    }

    #[test]
    fn extracts_canonical_link() {
        let html = r#"<head><link rel="canonical" href="https://mapy.com/en/zakladni?x=14.4&y=50.07&z=15"/></head>"#;
        assert_eq!(
            extract_canonical_url(html).as_deref(),
            Some("https://mapy.com/en/zakladni?x=14.4&y=50.07&z=15")
        );
    }

    #[test]
    fn extracts_og_url_meta() {
        let html = r#"<meta property="og:url" content="https://example.com/place/1"/>"#;
        assert_eq!(
            extract_canonical_url(html).as_deref(),
            Some("https://example.com/place/1")
        );
    }

    #[test]
    fn extracts_meta_refresh_target() {
        let html = r#"<meta http-equiv="refresh" content="0;url=https://example.com/long"/>"#;
        assert_eq!(
            extract_canonical_url(html).as_deref(),
            Some("https://example.com/long")
        );
    }

    #[test]
    fn returns_none_without_signals() {
        assert_eq!(extract_canonical_url("<html><body>hi</body></html>"), None);
    }
}
