use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use std::time::Instant;

use crate::book::{Book, BookDto};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::health::{HealthChecker, HealthStatus};
use crate::metrics::MetricsCollector;
use crate::pagination::Page;
use crate::response::{ApiResponse, RequestContext};
use crate::service::BookService;
use crate::throttle::RequestThrottle;
use crate::validation::{PageParams, RequestValidator};

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Everything a handler needs, built once at startup
pub struct AppState {
    pub books: BookService,
    pub throttle: RequestThrottle,
    pub metrics: MetricsCollector,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, books: BookService, throttle: RequestThrottle) -> Self {
        Self {
            books,
            throttle,
            metrics: MetricsCollector::new(),
            config,
            started_at: Instant::now(),
        }
    }
}

/// List books one page at a time
pub async fn list_books(
    State(state): State<SharedState>,
    ctx: RequestContext,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Page<Book>>>> {
    let Query(params) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let request = RequestValidator::validate_page_params(
        &params,
        state.config.default_page_size,
        state.config.max_page_size,
    )?;

    let page = state.books.find_all_paged(request)?;
    Ok(Json(ApiResponse::success(&ctx, page)))
}

/// Fetch a single book
pub async fn get_book(
    State(state): State<SharedState>,
    ctx: RequestContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<Book>>> {
    let Path(id) = id.map_err(|_| ApiError::ResourceNotFound)?;

    match state.books.find_by_id(id)? {
        Some(book) => Ok(Json(ApiResponse::success(&ctx, book))),
        None => Err(ApiError::NotFound),
    }
}

/// Create one or more books
pub async fn create_books(
    State(state): State<SharedState>,
    ctx: RequestContext,
    payload: Result<Json<Vec<BookDto>>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<Book>>>)> {
    let Json(dtos) = payload.map_err(|e| ApiError::UnreadableBody(e.body_text()))?;

    let books = RequestValidator::validate_books(dtos)?;
    let saved = state.books.save_all(books)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(&ctx, saved))))
}

/// Delete a book; deleting an unknown id still succeeds
pub async fn delete_book(
    State(state): State<SharedState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id.map_err(|_| ApiError::ResourceNotFound)?;

    state.books.delete_by_id(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unknown paths
pub async fn not_found() -> ApiError {
    ApiError::ResourceNotFound
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> ApiResult<Json<HealthStatus>> {
    Ok(Json(HealthChecker::new(&state).check_health()?))
}
