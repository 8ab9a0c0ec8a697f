//! Tolerant URI model.
//!
//! Shared map links arrive in every shape imaginable: full `https://` URLs,
//! scheme-only forms (`geo:44.1,26.0`), bare `host/path` fragments pasted out
//! of a message, relative redirect targets, query-only strings. [`Uri::parse`]
//! accepts all of them without erroring; what it cannot place it simply leaves
//! empty. A parsed [`Uri`] is immutable; resolving a redirect produces a new
//! value via [`Uri::to_absolute_url`].

use crate::text::{decode_component, decode_query_component, encode_component, encode_path};

/// Ordered query parameters with last-wins duplicate handling.
///
/// Insertion order of first occurrence is preserved; a repeated key replaces
/// the stored value in place. Names and values are stored percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a raw (already `?`-stripped) query string.
    ///
    /// `&`-delimited; a pair without `=` yields an empty value; an empty pair
    /// (`&&`, leading `&`) yields an empty key and value; the last occurrence
    /// of a duplicate key wins.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut params = QueryParams::default();
        if raw.is_empty() {
            return params;
        }
        for pair in raw.split('&') {
            let (name, value) = match pair.split_once('=') {
                Some((name, value)) => (name, value),
                None => (pair, ""),
            };
            params.insert(
                decode_query_component(name),
                decode_query_component(value),
            );
        }
        params
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.pairs.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            self.pairs.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for QueryParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, value) in &self.pairs {
            if !first {
                f.write_str("&")?;
            }
            first = false;
            write!(f, "{}={}", encode_component(name), encode_component(value))?;
        }
        Ok(())
    }
}

/// A parsed URI: `scheme:[//]host/path?query#fragment`, every part optional.
///
/// `slashes` records whether `//` introduced the authority, so that
/// non-hierarchical forms like `geo:44.1,26.0` re-emit byte-identically
/// instead of growing a spurious `//`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Uri {
    scheme: Option<String>,
    host: Option<String>,
    slashes: bool,
    path: String,
    query: QueryParams,
    fragment: Option<String>,
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn looks_like_host(segment: &str) -> bool {
    !segment.is_empty() && segment.contains('.') && !segment.contains(' ')
}

impl Uri {
    /// Parse a raw string into a `Uri`. Never fails; unplaceable input ends
    /// up in `path`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut rest = raw.trim();
        let mut uri = Uri::default();

        if let Some(idx) = rest.find('#') {
            uri.fragment = Some(rest[idx + 1..].to_owned());
            rest = &rest[..idx];
        }
        if let Some(idx) = rest.find('?') {
            uri.query = QueryParams::parse(&rest[idx + 1..]);
            rest = &rest[..idx];
        }
        if let Some(idx) = rest.find(':') {
            let candidate = &rest[..idx];
            // A colon inside the first path segment ("10:30am walk") is not a
            // scheme; scheme chars are a strict subset.
            if is_scheme(candidate) {
                uri.scheme = Some(candidate.to_ascii_lowercase());
                rest = &rest[idx + 1..];
            }
        }

        if let Some(after) = rest.strip_prefix("//") {
            uri.slashes = true;
            let host_end = after.find('/').unwrap_or(after.len());
            uri.host = Some(after[..host_end].to_owned());
            uri.path = decode_component(&after[host_end..]);
        } else if uri.scheme.is_some() {
            // Non-hierarchical form: `geo:44.1,26.0?q=`; the opaque part up
            // to the first slash acts as the host.
            if rest.starts_with('/') || rest.is_empty() {
                uri.path = decode_component(rest);
            } else {
                let host_end = rest.find('/').unwrap_or(rest.len());
                uri.host = Some(rest[..host_end].to_owned());
                uri.path = decode_component(&rest[host_end..]);
            }
        } else if !rest.starts_with('/') && looks_like_host(rest.split('/').next().unwrap_or("")) {
            // Bare `host/path` with the scheme left off.
            let host_end = rest.find('/').unwrap_or(rest.len());
            uri.host = Some(rest[..host_end].to_owned());
            uri.path = decode_component(&rest[host_end..]);
        } else {
            uri.path = decode_component(rest);
        }

        uri
    }

    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// The host, `None` when absent *or* empty (a `magicearth://?q=` form has
    /// an empty authority which callers should treat as missing).
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().filter(|h| !h.is_empty())
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name)
    }

    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Resolve this (possibly relative) URI into an absolute URL.
    ///
    /// A URI that already carries a host is returned unchanged apart from
    /// defaulting a missing scheme. Otherwise `default_scheme://default_host`
    /// is synthesized and the path is resolved absolute-or-relative against
    /// `default_path_prefix`.
    #[must_use]
    pub fn to_absolute_url(
        &self,
        default_scheme: &str,
        default_host: &str,
        default_path_prefix: &str,
    ) -> Uri {
        let mut resolved = self.clone();
        if self.host().is_some() {
            if resolved.scheme.is_none() {
                resolved.scheme = Some(default_scheme.to_owned());
                resolved.slashes = true;
            }
            return resolved;
        }

        resolved.scheme = Some(
            self.scheme
                .clone()
                .unwrap_or_else(|| default_scheme.to_owned()),
        );
        resolved.host = Some(default_host.to_owned());
        resolved.slashes = true;
        if !self.path.starts_with('/') {
            let prefix = default_path_prefix.trim_end_matches('/');
            resolved.path = format!("{prefix}/{}", self.path);
        }
        resolved
    }
}

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        if self.slashes {
            f.write_str("//")?;
        }
        if let Some(host) = &self.host {
            f.write_str(host)?;
        }
        f.write_str(&encode_path(&self.path))?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "uri_test.rs"]
mod tests;
