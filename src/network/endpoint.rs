//! Endpoint derivation from the dashboard page location

use reqwest::Url;

use crate::constants::{CATALOG_ENDPOINT, EXPORT_ENDPOINT, SYNC_ENDPOINT};

/// Addresses of every server resource the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub sync: String,
    pub export: String,
    pub catalog: String,
}

impl Endpoints {
    pub fn from_page(page: &Url) -> Self {
        let secure = page.scheme() == "https";
        let (ws, http) = if secure { ("wss", "https") } else { ("ws", "http") };
        Endpoints {
            sync: relative_endpoint(page, ws, SYNC_ENDPOINT),
            export: relative_endpoint(page, http, EXPORT_ENDPOINT),
            catalog: relative_endpoint(page, http, CATALOG_ENDPOINT),
        }
    }
}

/// `<scheme>://<host><page path>/<segment>` with repeated separators collapsed
pub fn relative_endpoint(page: &Url, scheme: &str, segment: &str) -> String {
    let host = page.host_str().unwrap_or_default();
    let authority = match page.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let path = collapse_separators(&format!("{}/{}", page.path(), segment));
    format!("{}://{}{}", scheme, authority, path)
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
