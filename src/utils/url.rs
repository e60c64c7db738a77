//! URL utilities for consistent endpoint construction
//!
//! The backend base URL is user-configurable and frequently arrives with a
//! trailing slash; these helpers normalize it before endpoints are appended.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use roadwatch::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000"), "http://127.0.0.1:5000");
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000/"), "http://127.0.0.1:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use roadwatch::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://127.0.0.1:5000", "list_models"),
///     "http://127.0.0.1:5000/list_models"
/// );
/// assert_eq!(
///     construct_api_url("http://127.0.0.1:5000/", "/upload"),
///     "http://127.0.0.1:5000/upload"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Derive the push-event channel URL from the backend base URL
///
/// Swaps the scheme to its WebSocket counterpart and appends the `events`
/// endpoint. A base URL without a recognized scheme is passed through with
/// `ws://` prepended.
///
/// # Examples
///
/// ```
/// use roadwatch::utils::url::websocket_url;
///
/// assert_eq!(websocket_url("http://127.0.0.1:5000"), "ws://127.0.0.1:5000/events");
/// assert_eq!(websocket_url("https://demo.example.com/"), "wss://demo.example.com/events");
/// ```
pub fn websocket_url(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    let ws_base = if let Some(rest) = normalized.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = normalized.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if normalized.starts_with("ws://") || normalized.starts_with("wss://") {
        normalized
    } else {
        format!("ws://{normalized}")
    };
    construct_api_url(&ws_base, "events")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:5000"),
            "http://127.0.0.1:5000"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:5000/"),
            "http://127.0.0.1:5000"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:5000///"),
            "http://127.0.0.1:5000"
        );
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("http://127.0.0.1:5000", "start_process"),
            "http://127.0.0.1:5000/start_process"
        );
        assert_eq!(
            construct_api_url("http://127.0.0.1:5000/", "start_process"),
            "http://127.0.0.1:5000/start_process"
        );
        assert_eq!(
            construct_api_url("http://127.0.0.1:5000", "/set_model"),
            "http://127.0.0.1:5000/set_model"
        );
        assert_eq!(
            construct_api_url("https://api.groq.com/openai/v1/", "chat/completions"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_websocket_url_schemes() {
        assert_eq!(
            websocket_url("http://127.0.0.1:5000"),
            "ws://127.0.0.1:5000/events"
        );
        assert_eq!(
            websocket_url("https://demo.example.com"),
            "wss://demo.example.com/events"
        );
        assert_eq!(
            websocket_url("ws://127.0.0.1:5000"),
            "ws://127.0.0.1:5000/events"
        );
        assert_eq!(websocket_url("127.0.0.1:5000"), "ws://127.0.0.1:5000/events");
    }
}
