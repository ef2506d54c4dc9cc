use std::fmt::Display;
use std::str::FromStr;

use conduit_config::{AnyOrArray, CorsConfig};
use http::header::HeaderName;
use http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = match &config.origins {
        AnyOrArray::Any => AllowOrigin::any(),
        AnyOrArray::List(origins) => AllowOrigin::list(parse_all::<HeaderValue>("origin", origins)),
    };

    let methods = match &config.methods {
        AnyOrArray::Any => AllowMethods::any(),
        AnyOrArray::List(methods) => AllowMethods::list(parse_all::<Method>("method", methods)),
    };

    let headers = match &config.headers {
        AnyOrArray::Any => AllowHeaders::any(),
        AnyOrArray::List(headers) => AllowHeaders::list(parse_all::<HeaderName>("header", headers)),
    };

    let layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers);

    match config.max_age_duration() {
        Some(max_age) => layer.max_age(max_age),
        None => layer,
    }
}

/// Parse every entry, skipping and logging the ones that are invalid
fn parse_all<T>(kind: &str, values: &[String]) -> Vec<T>
where
    T: FromStr,
    T::Err: Display,
{
    values
        .iter()
        .filter_map(|value| match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(kind, value = %value, error = %e, "ignoring invalid CORS entry");
                None
            }
        })
        .collect()
}
