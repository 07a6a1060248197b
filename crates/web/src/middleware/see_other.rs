use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const SEE_OTHER_DETAIL: &str = "Recursos movido ou apagado!";

/// Replace the body of every `303 See Other` response with a fixed JSON
/// message. Status and `Location` are preserved.
pub async fn rewrite_see_other(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() != StatusCode::SEE_OTHER {
        return response;
    }

    let location = response.headers().get(header::LOCATION).cloned();

    let mut rewritten = (
        StatusCode::SEE_OTHER,
        Json(json!({ "detail": SEE_OTHER_DETAIL })),
    )
        .into_response();

    if let Some(location) = location {
        rewritten.headers_mut().insert(header::LOCATION, location);
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, response::Redirect, routing::get};
    use tower::ServiceExt;

    fn get_request(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn app() -> Router {
        Router::new()
            .route("/moved", get(|| async { Redirect::to("/new-home") }))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(rewrite_see_other))
    }

    #[tokio::test]
    async fn test_see_other_body_is_replaced() {
        let response = app()
            .oneshot(get_request("/moved"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/new-home");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], SEE_OTHER_DETAIL);
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through() {
        let response = app()
            .oneshot(get_request("/ok"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"fine");
    }
}
