//! Link resolution for rendered output.
//!
//! A [`Pather`] turns routes into link targets for one request. Relative
//! pathers produce RFC 3986 relative references from the requested item, so
//! rendered pages keep working under any mount point. Absolute pathers
//! prepend a URL prefix and are used where links leave the page (feeds,
//! sitemaps).

use folio_repo::{Route, encode_segment};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Mode {
    Relative { base: Route },
    Absolute { prefix: String },
}

/// Resolves routes into link targets.
///
/// Resolution is a pure function of the target and the pather's base; it
/// never consults or mutates the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pather {
    mode: Mode,
}

impl Pather {
    /// Pather producing links relative to the page at `base`.
    #[must_use]
    pub fn relative(base: Route) -> Self {
        Self {
            mode: Mode::Relative { base },
        }
    }

    /// Pather producing absolute URLs below `prefix` (e.g. `http://host:8080`).
    #[must_use]
    pub fn absolute(prefix: &str) -> Self {
        Self {
            mode: Mode::Absolute {
                prefix: prefix.trim_end_matches('/').to_owned(),
            },
        }
    }

    /// Route that relative targets are resolved against.
    #[must_use]
    pub fn base(&self) -> Route {
        match &self.mode {
            Mode::Relative { base } => base.clone(),
            Mode::Absolute { .. } => Route::root(),
        }
    }

    /// Link to a route, with each segment percent-encoded.
    #[must_use]
    pub fn route_path(&self, target: &Route) -> String {
        match &self.mode {
            Mode::Relative { base } => relative_path(base, target),
            Mode::Absolute { prefix } => format!("{prefix}{}", target.href()),
        }
    }

    /// Link to a path as written in content.
    ///
    /// External links and pure fragments are returned unchanged. Paths with a
    /// leading slash are taken from the repository root; other paths are
    /// relative to the base route. Targets are read as percent-encoded URL
    /// paths. Query and fragment suffixes are preserved.
    /// Unparsable paths are returned as written.
    #[must_use]
    pub fn path(&self, target: &str) -> String {
        if target.is_empty() || target.starts_with('#') || is_external(target) {
            return target.to_owned();
        }

        let split = target.find(['?', '#']).unwrap_or(target.len());
        let (path, suffix) = target.split_at(split);

        let route = if path.starts_with('/') {
            Route::from_request(path)
        } else {
            Route::from_request(path).map(|relative| self.base().join(&relative))
        };

        match route {
            Ok(route) => format!("{}{suffix}", self.route_path(&route)),
            Err(e) => {
                tracing::debug!(target, error = %e, "Leaving unresolvable link unchanged");
                target.to_owned()
            }
        }
    }
}

/// Whether a link points outside the repository.
fn is_external(target: &str) -> bool {
    target.starts_with("//")
        || target.starts_with("mailto:")
        || target
            .split_once("://")
            .is_some_and(|(scheme, _)| !scheme.is_empty() && scheme.chars().all(char::is_alphanumeric))
}

/// Compute a relative reference from the page at `from` to the page at `to`.
///
/// Per RFC 3986 the last segment of `from` is the current document and the
/// base directory is everything before it. The result never ends on a bare
/// directory for non-root targets, so `a/b` → `a` yields `../a` rather than
/// `./`.
fn relative_path(from: &Route, to: &Route) -> String {
    let from_dir = from.segments().split_last().map_or(&[][..], |(_, dir)| dir);
    let to = to.segments();

    let mut common = from_dir
        .iter()
        .zip(to)
        .take_while(|(a, b)| a == b)
        .count();
    if common == to.len() && !to.is_empty() {
        common -= 1;
    }

    let ups = from_dir.len() - common;
    let rest: Vec<String> = to[common..].iter().map(|s| encode_segment(s)).collect();
    let result = format!("{}{}", "../".repeat(ups), rest.join("/"));
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}
