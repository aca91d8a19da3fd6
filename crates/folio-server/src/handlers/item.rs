//! Item views: page, print, JSON, RTF and attached files.

use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Redirect, Response};

use folio_render::page::{item_body, print_body};
use folio_render::{FileTreeRenderer, Pather, to_rtf};
use folio_repo::{FILES_FOLDER, File, Index, Item, Route};

use super::{conditional, page, view_model};
use crate::dispatch::ws_path;
use crate::error::ServerError;
use crate::state::AppState;

const HTML: &str = "text/html; charset=utf-8";

/// Item page, or the attached file at `path`.
pub(crate) async fn view(
    state: &AppState,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    // Canonical item URLs have no trailing slash.
    if path.len() > 1 && path.ends_with('/') {
        let mut target = path.trim_end_matches('/').to_owned();
        if target.is_empty() {
            target.push('/');
        }
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        return Ok(Redirect::permanent(&target).into_response());
    }

    let route = Route::from_request(path)?;
    let index = state.content.snapshot();

    if let Some(item) = index.get(&route) {
        return Ok(item_page(state, item, headers));
    }
    serve_file(&index, &route, path).await
}

/// Printer-friendly page.
pub(crate) async fn print(
    state: &AppState,
    route_path: &str,
    path: &str,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let route = Route::from_request(route_path)?;
    let index = state.content.snapshot();
    let Some(item) = index.get(&route) else {
        return file_fallback(&index, path).await;
    };

    let model = view_model(state, item);
    let pather = Pather::relative(route);
    let html = page(state, &pather, &model.title)
        .with_language(model.language_tag.as_str())
        .render(&print_body(&model));
    Ok(conditional(state, headers, HTML, html))
}

/// View model as JSON.
pub(crate) async fn json(
    state: &AppState,
    route_path: &str,
    path: &str,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let route = Route::from_request(route_path)?;
    let index = state.content.snapshot();
    let Some(item) = index.get(&route) else {
        return file_fallback(&index, path).await;
    };

    let model = view_model(state, item);
    let body = serde_json::to_string(&*model).map_err(std::io::Error::from)?;
    Ok(conditional(state, headers, "application/json", body))
}

/// RTF download.
pub(crate) async fn rtf(
    state: &AppState,
    route_path: &str,
    path: &str,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let route = Route::from_request(route_path)?;
    let index = state.content.snapshot();
    let Some(item) = index.get(&route) else {
        return file_fallback(&index, path).await;
    };

    let name = match route.last_component_name() {
        "" => "index",
        name => name,
    };
    let disposition = format!(
        "attachment; filename=\"{}.rtf\"",
        name.replace(['"', '\\'], "_")
    );
    let mut response = conditional(state, headers, "application/rtf", to_rtf(item));
    if let Ok(value) = disposition.parse() {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

fn item_page(state: &AppState, item: &Item, headers: &HeaderMap) -> Response {
    let model = view_model(state, item);
    let pather = Pather::relative(item.route.clone());

    let files_section = if item.files.is_empty() {
        String::new()
    } else {
        let files = item.files.iter().cloned();
        match FileTreeRenderer::new(pather.clone(), item.route.clone(), files) {
            Ok(renderer) => renderer.render("Files", "files", FILES_FOLDER),
            Err(e) => {
                tracing::warn!(route = %item.route, error = %e, "Skipping file tree");
                String::new()
            }
        }
    };

    let mut page = page(state, &pather, &model.title).with_language(model.language_tag.as_str());
    if state.hub.is_some() {
        page = page.with_live_reload(ws_path(&item.route.href()));
    }
    let html = page.render(&item_body(&model, &pather, &files_section));
    conditional(state, headers, HTML, html)
}

/// Attached file at `path`.
pub(crate) async fn attachment(state: &AppState, path: &str) -> Result<Response, ServerError> {
    file_fallback(&state.content.snapshot(), path).await
}

/// Suffix views fall back to attachments whose names carry the suffix.
async fn file_fallback(index: &Index, path: &str) -> Result<Response, ServerError> {
    let route = Route::from_request(path)?;
    serve_file(index, &route, path).await
}

async fn serve_file(index: &Index, route: &Route, path: &str) -> Result<Response, ServerError> {
    let Some(file) = index.file(route) else {
        return Err(ServerError::NotFound(path.to_owned()));
    };
    read_file(file, path).await
}

async fn read_file(file: &File, path: &str) -> Result<Response, ServerError> {
    let bytes = match tokio::fs::read(file.path()).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotFound(path.to_owned()));
        }
        Err(e) => return Err(e.into()),
    };
    let mime = mime_guess::from_path(file.path()).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}
