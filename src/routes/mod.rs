//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each bot binary serves exactly one of these routers. They share the
//! permissive CORS policy, HTTP request tracing, and the health payload shape.

pub mod assistant;
pub mod email;
pub mod voice;

use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use assistant::assistant_app;
pub use email::email_app;
pub use voice::voice_app;

/// Wrap a bot's routes with the layers every bot carries.
fn with_common_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Body of every `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voices_available: Option<usize>,
}

impl Health {
    #[must_use]
    pub fn healthy(service: &'static str) -> Self {
        Self { status: "healthy", timestamp: Utc::now(), service, voices_available: None }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, Response, header};

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }
}
