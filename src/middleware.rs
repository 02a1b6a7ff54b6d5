use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::handlers::SharedState;
use crate::response::{ApiResponse, RequestContext};

/// Attaches a [`RequestContext`] to the request, logs it, and renders any
/// [`ApiError`] produced further down into the response envelope.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::from_request(&request);
    request.extensions_mut().insert(ctx.clone());

    info!(
        target: "bookmanager::middleware",
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
        client_ip = %ctx.client_ip,
        "Incoming request"
    );

    let response = render_error(&ctx, next.run(request).await);

    info!(
        target: "bookmanager::middleware",
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
        status = %response.status(),
        "Request completed"
    );

    response
}

/// Rejects requests from clients still inside their cooldown window.
pub async fn throttle(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let client = match request.extensions().get::<RequestContext>() {
        Some(ctx) => ctx.client_ip.clone(),
        None => crate::client_key::client_key(request.headers(), request.extensions()),
    };

    let limited = state.throttle.is_limited(&client);
    state.metrics.record_request(!limited);

    if limited {
        return ApiError::RequestLimitExceeded.into_response();
    }

    next.run(request).await
}

fn render_error(ctx: &RequestContext, mut response: Response) -> Response {
    let Some(err) = response.extensions_mut().remove::<ApiError>() else {
        return response;
    };

    if err.is_server_error() {
        error!(
            target: "bookmanager::middleware",
            request_id = %ctx.request_id,
            error = %err,
            "Request failed"
        );
    } else {
        warn!(
            target: "bookmanager::middleware",
            request_id = %ctx.request_id,
            client_ip = %ctx.client_ip,
            error = %err,
            "Request rejected"
        );
    }

    (response.status(), Json(ApiResponse::failure(ctx, &err))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, StatusCode};

    fn context() -> RequestContext {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/books/1")
            .body(Body::empty())
            .unwrap();
        RequestContext::from_request(&request)
    }

    #[test]
    fn test_render_error_builds_envelope() {
        let response = render_error(&context(), ApiError::RequestLimitExceeded.into_response());

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.extensions().get::<ApiError>().is_none());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_render_error_leaves_success_alone() {
        let response = render_error(&context(), StatusCode::NO_CONTENT.into_response());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get("content-type").is_none());
    }
}
