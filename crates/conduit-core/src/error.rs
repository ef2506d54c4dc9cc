use http::StatusCode;

/// Error that knows how it is rendered to an HTTP client
///
/// Domain crates implement this for their error enums so the response
/// shape is decided in one place and the errors themselves stay free of
/// framework types.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}
