//! Request path dispatch.
//!
//! Every request that is not a static theme asset goes through one ordered
//! table. Exact paths are checked first, then suffix patterns, then the
//! catch-all item view; the first match wins.

/// What a request path resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Tags,
    SitemapHtml,
    SitemapXml,
    Rss,
    Robots,
    Debug,
    Search,
    OpenSearch,
    SearchJson,
    TitlesJson,
    Print,
    Json,
    Rtf,
    LiveUpdate,
    Item,
}

/// How a table entry matches a path.
#[derive(Clone, Copy, Debug)]
enum Matcher {
    /// The whole path.
    Exact(&'static str),
    /// `/<route>.<suffix>` or the bare `/<suffix>` for the root route.
    Suffix(&'static str),
}

impl Matcher {
    /// Route part of `path` if it matches.
    fn matches<'a>(&self, path: &'a str) -> Option<&'a str> {
        match self {
            Self::Exact(exact) => (path == *exact).then_some("/"),
            Self::Suffix(suffix) => {
                let stem = path.strip_suffix(suffix)?.strip_suffix('.').or_else(|| {
                    // Bare `/<suffix>` addresses the root item.
                    (path.len() == suffix.len() + 1 && path.starts_with('/')).then_some("/")
                })?;
                if stem.is_empty() || (stem.len() > 1 && stem.ends_with('/')) {
                    return None;
                }
                Some(stem)
            }
        }
    }
}

const TABLE: &[(Matcher, Endpoint)] = &[
    (Matcher::Exact("/tags.html"), Endpoint::Tags),
    (Matcher::Exact("/sitemap.html"), Endpoint::SitemapHtml),
    (Matcher::Exact("/sitemap.xml"), Endpoint::SitemapXml),
    (Matcher::Exact("/feed.rss"), Endpoint::Rss),
    (Matcher::Exact("/robots.txt"), Endpoint::Robots),
    (Matcher::Exact("/debug/index"), Endpoint::Debug),
    (Matcher::Exact("/search"), Endpoint::Search),
    (Matcher::Exact("/opensearch.xml"), Endpoint::OpenSearch),
    (Matcher::Exact("/search.json"), Endpoint::SearchJson),
    (Matcher::Exact("/titles.json"), Endpoint::TitlesJson),
    (Matcher::Suffix("print"), Endpoint::Print),
    (Matcher::Suffix("json"), Endpoint::Json),
    (Matcher::Suffix("rtf"), Endpoint::Rtf),
    (Matcher::Suffix("ws"), Endpoint::LiveUpdate),
];

/// Result of dispatching a request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Dispatch<'a> {
    /// Selected endpoint.
    pub endpoint: Endpoint,
    /// Raw (still percent-encoded) path of the addressed route.
    pub route_path: &'a str,
}

/// Select the endpoint for a request path.
///
/// Never fails: a path matching no pattern goes to the item view.
pub(crate) fn dispatch(path: &str) -> Dispatch<'_> {
    TABLE
        .iter()
        .find_map(|(matcher, endpoint)| {
            matcher.matches(path).map(|route_path| Dispatch {
                endpoint: *endpoint,
                route_path,
            })
        })
        .unwrap_or(Dispatch {
            endpoint: Endpoint::Item,
            route_path: path,
        })
}

/// Live-update socket path for an item URL (`/` → `/ws`, `/a/b` → `/a/b.ws`).
pub(crate) fn ws_path(url: &str) -> String {
    if url == "/" {
        "/ws".to_owned()
    } else {
        format!("{url}.ws")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn endpoint(path: &str) -> (Endpoint, &str) {
        let d = dispatch(path);
        (d.endpoint, d.route_path)
    }

    #[test]
    fn test_exact_paths() {
        assert_eq!(endpoint("/tags.html").0, Endpoint::Tags);
        assert_eq!(endpoint("/sitemap.html").0, Endpoint::SitemapHtml);
        assert_eq!(endpoint("/sitemap.xml").0, Endpoint::SitemapXml);
        assert_eq!(endpoint("/feed.rss").0, Endpoint::Rss);
        assert_eq!(endpoint("/robots.txt").0, Endpoint::Robots);
        assert_eq!(endpoint("/debug/index").0, Endpoint::Debug);
        assert_eq!(endpoint("/search").0, Endpoint::Search);
        assert_eq!(endpoint("/opensearch.xml").0, Endpoint::OpenSearch);
        assert_eq!(endpoint("/titles.json").0, Endpoint::TitlesJson);
    }

    #[test]
    fn test_exact_path_wins_over_suffix() {
        assert_eq!(endpoint("/search.json"), (Endpoint::SearchJson, "/"));
    }

    #[test]
    fn test_suffix_patterns() {
        assert_eq!(endpoint("/page.json"), (Endpoint::Json, "/page"));
        assert_eq!(endpoint("/a/b.print"), (Endpoint::Print, "/a/b"));
        assert_eq!(endpoint("/a/b.rtf"), (Endpoint::Rtf, "/a/b"));
        assert_eq!(endpoint("/a/b.ws"), (Endpoint::LiveUpdate, "/a/b"));
    }

    #[test]
    fn test_bare_suffix_is_root() {
        assert_eq!(endpoint("/json"), (Endpoint::Json, "/"));
        assert_eq!(endpoint("/ws"), (Endpoint::LiveUpdate, "/"));
    }

    #[test]
    fn test_suffix_needs_separator() {
        // `/sub/pagejson` is an item named `pagejson`, not a JSON view.
        assert_eq!(endpoint("/sub/pagejson"), (Endpoint::Item, "/sub/pagejson"));
        assert_eq!(endpoint("/a/.json"), (Endpoint::Item, "/a/.json"));
    }

    #[test]
    fn test_catch_all() {
        assert_eq!(endpoint("/arbitrary/path"), (Endpoint::Item, "/arbitrary/path"));
        assert_eq!(endpoint("/"), (Endpoint::Item, "/"));
        assert_eq!(endpoint("/tags.htm"), (Endpoint::Item, "/tags.htm"));
    }

    #[test]
    fn test_ws_path() {
        assert_eq!(ws_path("/"), "/ws");
        assert_eq!(ws_path("/a/b"), "/a/b.ws");
    }
}
