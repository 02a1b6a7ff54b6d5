use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Method, Request, Uri};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::client_key::client_key;
use crate::error::ApiError;

/// Details of the request being served, echoed back in every envelope.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub client_ip: String,
    pub method: Method,
    pub path: String,
}

impl RequestContext {
    pub fn new(method: &Method, uri: &Uri, headers: &HeaderMap, extensions: &Extensions) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
            client_ip: client_key(headers, extensions),
            method: method.clone(),
            path: uri.path().to_string(),
        }
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(
            request.method(),
            request.uri(),
            request.headers(),
            request.extensions(),
        )
    }
}

/// Handlers get the context stored by the request context middleware, or a
/// fresh one when they run without it.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(ctx.clone());
        }

        Ok(Self::new(
            &parts.method,
            &parts.uri,
            &parts.headers,
            &parts.extensions,
        ))
    }
}

/// The uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_messages: Vec<String>,
}

impl<T> ApiResponse<T> {
    fn new(ctx: &RequestContext, status: String, data: Option<T>, error_messages: Vec<String>) -> Self {
        Self {
            timestamp: ctx.timestamp,
            request_id: ctx.request_id.clone(),
            client_ip: ctx.client_ip.clone(),
            method: ctx.method.to_string(),
            path: ctx.path.clone(),
            status,
            data,
            error_messages,
        }
    }

    pub fn success(ctx: &RequestContext, data: T) -> Self {
        Self::new(ctx, "Success".to_string(), Some(data), Vec::new())
    }
}

impl ApiResponse<()> {
    pub fn failure(ctx: &RequestContext, error: &ApiError) -> Self {
        Self::new(ctx, error.status_text(), None, error.error_messages())
    }
}
