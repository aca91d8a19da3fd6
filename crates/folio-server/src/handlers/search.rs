//! Search views.

use axum::Json;
use axum::extract::Query;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use folio_render::Pather;
use folio_render::page::search_body;
use folio_repo::{Route, SearchHit};

use super::{html, page};
use crate::state::AppState;

/// Hits on the search page.
const PAGE_LIMIT: usize = 50;
/// Hits in the typeahead JSON.
const TYPEAHEAD_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Entry of `/titles.json`.
#[derive(Debug, Serialize)]
struct TitleEntry<'a> {
    title: &'a str,
    route: &'a Route,
}

fn query(uri: &Uri) -> String {
    Query::<SearchParams>::try_from_uri(uri)
        .map(|Query(params)| params.q)
        .unwrap_or_default()
}

fn run(state: &AppState, query: &str, limit: usize) -> Vec<SearchHit> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let index = state.content.snapshot();
    state.searcher.search(&index, query, limit)
}

pub(crate) fn search_page(state: &AppState, uri: &Uri) -> Response {
    let query = query(uri);
    let hits = run(state, &query, PAGE_LIMIT);
    tracing::debug!(query = %query, hits = hits.len(), "Search");

    let pather = Pather::relative(Route::root().child("search"));
    let body = search_body(&query, &hits, &pather);
    html(page(state, &pather, "Search").render(&body))
}

/// Typeahead hits as a JSON array.
pub(crate) fn search_json(state: &AppState, uri: &Uri) -> Response {
    let query = query(uri);
    Json(run(state, &query, TYPEAHEAD_LIMIT)).into_response()
}

/// Title and route of every item.
pub(crate) fn titles_json(state: &AppState) -> Response {
    let index = state.content.snapshot();
    let titles: Vec<TitleEntry<'_>> = index
        .items()
        .into_iter()
        .map(|item| TitleEntry {
            title: &item.title,
            route: &item.route,
        })
        .collect();
    Json(titles).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_uri() {
        let uri: Uri = "/search?q=rust%20web".parse().unwrap();
        assert_eq!(query(&uri), "rust web");
    }

    #[test]
    fn test_missing_query_is_empty() {
        let uri: Uri = "/search".parse().unwrap();
        assert_eq!(query(&uri), "");
    }
}
