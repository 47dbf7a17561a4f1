//! Endpoint URL helpers.

/// Strip trailing slashes so endpoints can be appended with a single `/`.
///
/// ```
/// use matrix_chat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.openai.com/v1///"), "https://api.openai.com/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use matrix_chat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.openai.com/v1/", "/chat/completions"),
///     "https://api.openai.com/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}
