//! Normalized slash-delimited routes.
//!
//! A [`Route`] identifies a piece of content by its path segments. Routes are
//! normalized on construction: empty segments (duplicate, leading or trailing
//! slashes) and `.` segments are dropped, so two spellings of the same path
//! compare equal.
//!
//! ```
//! use folio_repo::Route;
//!
//! let route = Route::combine("/docs//guide/", "setup").unwrap();
//! assert_eq!(route.value(), "docs/guide/setup");
//! assert_eq!(route.url(), "/docs/guide/setup");
//! ```

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Serialize, Serializer};

/// Characters escaped when a segment is written into a URL path.
///
/// `:` is included so a relative reference never reads as a scheme.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode one route segment for use in a link.
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Error returned when a path cannot be parsed as a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The input is not a valid slash-delimited path.
    #[error("Invalid route {path:?}: {reason}")]
    Invalid {
        /// The rejected input.
        path: String,
        /// Why the input was rejected.
        reason: &'static str,
    },
}

impl RouteError {
    fn invalid(path: &str, reason: &'static str) -> Self {
        Self::Invalid {
            path: path.to_owned(),
            reason,
        }
    }
}

/// Normalized content route.
///
/// The root route has no segments. A valid route never contains empty
/// segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route {
    segments: Vec<String>,
}

impl Route {
    /// The root route.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path.
    ///
    /// Rejects parent references (`..`), backslashes and control characters.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        if path.contains('\\') {
            return Err(RouteError::invalid(path, "backslash in path"));
        }
        if path.chars().any(char::is_control) {
            return Err(RouteError::invalid(path, "control character in path"));
        }

        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(RouteError::invalid(path, "parent reference in path")),
                _ => segments.push(segment.to_owned()),
            }
        }

        Ok(Self { segments })
    }

    /// Parse a percent-encoded request path.
    pub fn from_request(path: &str) -> Result<Self, RouteError> {
        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map_err(|_| RouteError::invalid(path, "path is not valid UTF-8"))?;
        Self::parse(&decoded)
    }

    /// Combine a base path with a relative path.
    ///
    /// Both inputs are normalized before concatenation. Combining with an
    /// empty relative path yields the base.
    pub fn combine(base: &str, relative: &str) -> Result<Self, RouteError> {
        let base = Self::parse(base)?;
        let relative = Self::parse(relative)?;
        Ok(base.join(&relative))
    }

    /// Append another route to this one.
    #[must_use]
    pub fn join(&self, other: &Route) -> Route {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend(self.segments.iter().cloned());
        segments.extend(other.segments.iter().cloned());
        Route { segments }
    }

    /// Append a single segment.
    ///
    /// Empty segments are ignored; the segment is not split on slashes.
    #[must_use]
    pub fn child(&self, segment: &str) -> Route {
        let mut route = self.clone();
        if !segment.is_empty() {
            route.segments.push(segment.to_owned());
        }
        route
    }

    /// Path segments in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root route.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn level(&self) -> usize {
        self.segments.len()
    }

    /// Route value without leading slash (`""` for root).
    #[must_use]
    pub fn value(&self) -> String {
        self.segments.join("/")
    }

    /// Route as URL path with leading slash (`"/"` for root).
    #[must_use]
    pub fn url(&self) -> String {
        format!("/{}", self.value())
    }

    /// Percent-encoded URL path, the inverse of [`Route::from_request`].
    #[must_use]
    pub fn href(&self) -> String {
        let encoded: Vec<String> = self.segments.iter().map(|s| encode_segment(s)).collect();
        format!("/{}", encoded.join("/"))
    }

    /// Name of the last segment (`""` for root).
    #[must_use]
    pub fn last_component_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Parent route, `None` for root.
    #[must_use]
    pub fn parent(&self) -> Option<Route> {
        let (_, parent) = self.segments.split_last()?;
        Some(Route {
            segments: parent.to_vec(),
        })
    }

    /// Whether `prefix` equals this route or is one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &Route) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Remove `prefix` from the front of this route.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Route) -> Option<Route> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| Route {
                segments: rest.to_vec(),
            })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
