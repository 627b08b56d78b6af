//! Business service.
//!
//! Stateless unary calls; the interceptor is the only thing that cares
//! about them.

use axum::{routing::post, Json, Router};

use crate::auth::{intercepted, InterceptorState};
use crate::telemetry::Empty;

pub async fn check(Json(_): Json<Empty>) -> Json<Empty> {
    Json(Empty {})
}

pub async fn add(Json(_): Json<Empty>) -> Json<Empty> {
    Json(Empty {})
}

pub async fn test(Json(_): Json<Empty>) -> Json<Empty> {
    Json(Empty {})
}

pub fn setup_biz_router(interceptor: &InterceptorState) -> Router {
    Router::new()
        .route("/biz/Check", intercepted(post(check), interceptor))
        .route("/biz/Add", intercepted(post(add), interceptor))
        .route("/biz/Test", intercepted(post(test), interceptor))
}
