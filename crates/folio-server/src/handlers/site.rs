//! Site-wide views.

use axum::http::header;
use axum::response::{IntoResponse, Response};

use folio_render::feed::{self, Channel};
use folio_render::page::{debug_body, sitemap_body, tags_body};
use folio_render::Pather;
use folio_repo::Route;

use super::{html, page, view_model};
use crate::state::AppState;

/// Items in the RSS feed.
pub(crate) const RSS_LIMIT: usize = 20;

pub(crate) fn tags(state: &AppState) -> Response {
    let index = state.content.snapshot();
    let pather = Pather::relative(Route::root());
    let body = tags_body(&index, &pather);
    html(page(state, &pather, "Tags").render(&body))
}

pub(crate) fn sitemap_html(state: &AppState) -> Response {
    let index = state.content.snapshot();
    let pather = Pather::relative(Route::root());
    let root = view_model(state, index.root());
    let body = sitemap_body(&root, &pather);
    html(page(state, &pather, "Sitemap").render(&body))
}

pub(crate) fn sitemap_xml(state: &AppState) -> Response {
    let index = state.content.snapshot();
    let xml = feed::sitemap_xml(&index.items(), &absolute(state));
    xml_response("application/xml", xml)
}

/// RSS feed of the newest dated items.
pub(crate) fn rss(state: &AppState) -> Response {
    let index = state.content.snapshot();
    let xml = feed::rss(&channel(state), &index.items(), &absolute(state), RSS_LIMIT);
    xml_response("application/rss+xml", xml)
}

pub(crate) fn robots(state: &AppState) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        feed::robots_txt(&absolute(state)),
    )
        .into_response()
}

/// Dump of the current index.
pub(crate) fn debug(state: &AppState) -> Response {
    let index = state.content.snapshot();
    let pather = Pather::relative(Route::root().child("debug").child("index"));
    html(page(state, &pather, "Index").render(&debug_body(&index)))
}

pub(crate) fn opensearch(state: &AppState) -> Response {
    xml_response(
        "application/opensearchdescription+xml",
        feed::opensearch(&channel(state), &absolute(state)),
    )
}

fn absolute(state: &AppState) -> Pather {
    Pather::absolute(&state.site.base_url)
}

fn channel(state: &AppState) -> Channel<'_> {
    Channel {
        title: &state.site.title,
        description: &state.site.description,
    }
}

fn xml_response(content_type: &'static str, xml: String) -> Response {
    ([(header::CONTENT_TYPE, content_type)], xml).into_response()
}
