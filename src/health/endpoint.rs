// src/health/endpoint.rs

use url::Url;

const CLASSIFY_SUFFIX: &str = "/classify";
const HEALTH_PATH: &str = "/health";

/// Derive the backend health endpoint from its classify endpoint.
///
/// `…/classify` becomes `…/health`. Any other path is replaced by `/health`
/// on the same origin. Query and fragment are always dropped.
pub fn derive_health_url(classify_url: &Url) -> Url {
    let mut url = classify_url.clone();

    let new_path = match classify_url.path().strip_suffix(CLASSIFY_SUFFIX) {
        Some(prefix) => format!("{prefix}{HEALTH_PATH}"),
        None => HEALTH_PATH.to_string(),
    };

    url.set_path(&new_path);
    url.set_query(None);
    url.set_fragment(None);
    url
}
