//! Reqwest helpers shared by the HTTP adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

const USER_AGENT: &str = concat!("parallel-connect/", env!("CARGO_PKG_VERSION"));

/// Build a client with an optional whole-request timeout.
///
/// No timeout is applied unless one is configured.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let builder = Client::builder().user_agent(USER_AGENT);
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder.build()
}

/// Append `path` to the base URL's own path, dropping any query.
///
/// Returns `None` for URLs that cannot carry a path, such as `mailto:`.
pub(crate) fn join_path(base: &Url, path: &str) -> Option<Url> {
    if base.cannot_be_a_base() {
        return None;
    }
    let mut url = base.clone();
    let base_path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{base_path}/{}", path.trim_start_matches('/')));
    url.set_query(None);
    Some(url)
}

/// `status N` or `status N: <body preview>`.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}

/// Whitespace-collapsed, length-limited rendering of an error body.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
