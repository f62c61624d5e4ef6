use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use serde::de::DeserializeOwned;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

pub mod environments;
pub mod health;
pub mod tenants;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(tenants::router())
        .merge(environments::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(build_cors_layer(&config.cors_allow_origins))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .max_age(Duration::from_secs(3600));

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any).allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer
        .allow_origin(AllowOrigin::list(allowed))
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Parses an optional JSON body. An empty body yields `T::default()`.
pub(crate) fn parse_optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Body {
        #[serde(default)]
        items: Option<Vec<String>>,
    }

    #[test]
    fn test_parse_optional_body() {
        let empty: Body = parse_optional_body(&Bytes::from_static(b"")).unwrap();
        assert_eq!(empty, Body::default());

        let blank: Body = parse_optional_body(&Bytes::from_static(b" \n")).unwrap();
        assert_eq!(blank, Body::default());

        let given: Body = parse_optional_body(&Bytes::from_static(br#"{"items":["a"]}"#)).unwrap();
        assert_eq!(given.items, Some(vec!["a".to_string()]));

        let err = parse_optional_body::<Body>(&Bytes::from_static(b"{")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
