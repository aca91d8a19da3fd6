//! HTTP request handlers.
//!
//! Everything except `/theme` arrives at [`dispatch_request`], which picks
//! the endpoint from the dispatch table and calls the matching handler.

pub(crate) mod item;
pub(crate) mod search;
pub(crate) mod site;

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use md5::{Digest, Md5};

use folio_render::{Page, Pather, escape_html, map};
use folio_repo::{Item, Route, ViewModel};

use crate::dispatch::{Endpoint, dispatch};
use crate::error::ServerError;
use crate::live_reload;
use crate::state::AppState;

/// Route every non-theme request through the dispatch table.
pub(crate) async fn dispatch_request(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    let (mut parts, _body) = request.into_parts();
    if parts.method != Method::GET && parts.method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = parts.uri.path().to_owned();
    let target = dispatch(&path);
    tracing::debug!(path = %path, endpoint = ?target.endpoint, "Dispatching request");

    let result = match target.endpoint {
        Endpoint::Tags => Ok(site::tags(&state)),
        Endpoint::SitemapHtml => Ok(site::sitemap_html(&state)),
        Endpoint::SitemapXml => Ok(site::sitemap_xml(&state)),
        Endpoint::Rss => Ok(site::rss(&state)),
        Endpoint::Robots => Ok(site::robots(&state)),
        Endpoint::Debug => Ok(site::debug(&state)),
        Endpoint::OpenSearch => Ok(site::opensearch(&state)),
        Endpoint::Search => Ok(search::search_page(&state, &parts.uri)),
        Endpoint::SearchJson => Ok(search::search_json(&state, &parts.uri)),
        Endpoint::TitlesJson => Ok(search::titles_json(&state)),
        Endpoint::Print => item::print(&state, target.route_path, &path, &parts.headers).await,
        Endpoint::Json => item::json(&state, target.route_path, &path, &parts.headers).await,
        Endpoint::Rtf => item::rtf(&state, target.route_path, &path, &parts.headers).await,
        Endpoint::Item => item::view(&state, &path, parts.uri.query(), &parts.headers).await,
        Endpoint::LiveUpdate => live_update(&state, &mut parts, target.route_path, &path).await,
    };

    result.unwrap_or_else(|e| {
        if !matches!(e, ServerError::NotFound(_) | ServerError::InvalidRoute(_)) {
            tracing::error!(path = %path, error = %e, "Request failed");
        }
        e.into_response()
    })
}

/// Upgrade to a live-update socket for the addressed route.
///
/// Plain requests, and every request while live updates are off, are served
/// the attachment whose name ends in `.ws`.
async fn live_update(
    state: &Arc<AppState>,
    parts: &mut Parts,
    route_path: &str,
    path: &str,
) -> Result<Response, ServerError> {
    let Some(hub) = state.hub.clone().filter(|_| is_websocket_upgrade(&parts.headers)) else {
        return item::attachment(state, path).await;
    };
    let route = Route::from_request(route_path)?;

    match WebSocketUpgrade::from_request_parts(parts, state).await {
        Ok(ws) => Ok(live_reload::upgrade(ws, hub, route)),
        Err(rejection) => Ok(rejection.into_response()),
    }
}

fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"websocket"))
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars).
pub(crate) fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

/// Respond with `body`, or 304 when the client already has it.
pub(crate) fn conditional(
    state: &AppState,
    headers: &HeaderMap,
    content_type: &'static str,
    body: String,
) -> Response {
    let etag = compute_etag(&state.version, &body);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (
        [
            (header::ETAG, etag),
            (header::CONTENT_TYPE, content_type.to_owned()),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        body,
    )
        .into_response()
}

/// Page skeleton shared by all HTML views.
pub(crate) fn page(state: &AppState, pather: &Pather, title: &str) -> Page {
    let title = if title.is_empty() {
        state.site.title.clone()
    } else {
        format!("{title} | {}", state.site.title)
    };
    let site_title = escape_html(&state.site.title);

    let mut page = Page::new(title)
        .with_head(format!(
            r#"<link rel="alternate" type="application/rss+xml" title="{site_title}" href="{}">"#,
            escape_html(&pather.path("/feed.rss"))
        ))
        .with_head(format!(
            r#"<link rel="search" type="application/opensearchdescription+xml" title="{site_title}" href="{}">"#,
            escape_html(&pather.path("/opensearch.xml"))
        ));
    if state.theme {
        page = page.with_stylesheet(pather.path("/theme/style.css"));
    }
    page
}

/// HTML response for pages that are not cached conditionally.
pub(crate) fn html(body: String) -> Response {
    Html(body).into_response()
}

/// View model of an item, mapped once per content generation.
pub(crate) fn view_model(state: &AppState, item: &Item) -> Arc<ViewModel> {
    item.cached_model().unwrap_or_else(|| {
        let converter = Arc::clone(&state.converter);
        map(item, &|i: &Item| converter.convert(i))
    })
}
