//! Discovery handler

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use aci_discovery::DiscoveryEntry;
use axum::{
    extract::{RawQuery, State},
    http::Uri,
    response::Html,
};
use url::form_urlencoded;

/// Query parameter marking a request as a discovery request
pub const DISCOVERY_PARAM: &str = "ac-discovery";

/// Serve the discovery document for the image named by the last path segment
pub async fn discover(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> ApiResult<Html<Vec<u8>>> {
    if !is_discovery_request(query.as_deref()) {
        tracing::debug!(path = %uri.path(), "Not a discovery request");
        return Err(ApiError::NotFound);
    }

    tracing::info!(path = %uri.path(), "Discovery request");

    let name = image_name(uri.path()).ok_or(ApiError::NotFound)?;
    let entry = resolve(&state, &name).await?;

    let body = state.renderer.render_to_vec(&entry).map_err(|e| {
        tracing::error!(error = %e, "Failed serving metadata");
        ApiError::from(e)
    })?;

    Ok(Html(body))
}

/// Resolve `name` against the configured repositories
pub async fn resolve(state: &AppState, name: &str) -> ApiResult<DiscoveryEntry> {
    let known = state.images.contains(name).await.map_err(|e| {
        tracing::error!(image = %name, error = %e, "Failed resolving image");
        ApiError::from(e)
    })?;
    if !known {
        return Err(ApiError::NotFound);
    }

    Ok(DiscoveryEntry::new(
        &state.domain,
        name,
        state.images.url(name),
        state.keys.url(),
    ))
}

/// True when the first `ac-discovery` value is exactly `1`
pub fn is_discovery_request(query: Option<&str>) -> bool {
    query
        .and_then(|q| {
            form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == DISCOVERY_PARAM)
                .map(|(_, value)| value == "1")
        })
        .unwrap_or(false)
}

/// Final segment of a request path, percent-decoded.
///
/// Trailing slashes are ignored. Returns `None` when there is no usable
/// segment.
pub fn image_name(path: &str) -> Option<String> {
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let name = urlencoding::decode(segment).ok()?;

    if matches!(name.as_ref(), "" | "." | "..") || name.contains('/') {
        return None;
    }
    Some(name.into_owned())
}
