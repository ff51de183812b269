use crate::{AppState, BookId, BookInfo, RecommendError, RecommendationResponse, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    title: String,
    count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
        }
    }
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn status_for(err: &RecommendError) -> StatusCode {
    match err {
        RecommendError::UnknownItem(_) => StatusCode::NOT_FOUND,
        RecommendError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        RecommendError::InsufficientData { .. } | RecommendError::DataUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RecommendError::MissingMetadata(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T>(result: Result<T>) -> ApiResult<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("Request failed: {}", e);
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

async fn health_check(
    State(state): State<AppState>,
) -> Json<ApiResponse<HashMap<String, String>>> {
    let model = state.recommendation_service.model();
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "bookrec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());
    status.insert("books".to_string(), model.similarity().len().to_string());

    Json(ApiResponse::success(status))
}

async fn list_titles(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    respond(Ok(state.recommendation_service.selectable_titles()))
}

async fn resolve_title(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> ApiResult<BookId> {
    respond(
        state
            .recommendation_service
            .resolve_identifier_for_title(&params.title),
    )
}

async fn recommend_by_title(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> ApiResult<Vec<String>> {
    respond(
        state
            .recommendation_service
            .recommend_by_title(&params.title, params.count),
    )
}

async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> ApiResult<BookInfo> {
    respond(state.recommendation_service.book_info(&book_id))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    Query(params): Query<CountQuery>,
) -> ApiResult<RecommendationResponse> {
    respond(
        state
            .recommendation_service
            .recommend_with_metadata(&book_id, params.count),
    )
}

async fn rebuild(State(state): State<AppState>) -> ApiResult<String> {
    let result = state
        .recommendation_service
        .rebuild()
        .await
        .map(|_| "Model rebuilt".to_string());
    respond(result)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/titles", get(list_titles))
        .route("/titles/resolve", get(resolve_title))
        .route("/titles/recommendations", get(recommend_by_title))
        .route("/books/:book_id", get(get_book))
        .route("/books/:book_id/recommendations", get(get_recommendations))
        .route("/admin/rebuild", post(rebuild))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
