//! Cross-origin policy

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{AllowedOrigins, RelayError, Result};

/// Static CORS layer: configured origins, any method, any header.
///
/// With an allow-list, requests from other origins get no
/// `Access-Control-Allow-Origin` header and the browser blocks the read.
pub fn cors_layer(origins: &AllowedOrigins) -> Result<CorsLayer> {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(list) => {
            let values = list
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin)
                        .map_err(|_| RelayError::InvalidOrigin(origin.clone()))
                })
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(values)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}
