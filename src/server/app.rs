use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, AUTHORIZATION, CONTENT_TYPE,
};
use axum::http::{header, HeaderValue, Method};
use axum::response::Response;
use axum::{extract::FromRef, http::StatusCode, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use routes::{category_router, questions_router, quizzes_router};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::error::{ApiError, ApiResponse};
use super::routes;
use crate::config::Settings;

const ALLOWED_HEADERS: &str = "Content-Type, Authorization, true";
const ALLOWED_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";

/// Splits a 1-indexed page number into a row window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub per_page: i64,
}

impl Pagination {
    /// `(offset, limit)` for `page`; pages before the first have no window.
    pub fn window(&self, page: i64) -> Option<(i64, i64)> {
        if page < 1 || self.per_page < 1 {
            return None;
        }
        let start = (page - 1).checked_mul(self.per_page)?;
        Some((start, self.per_page))
    }
}

#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
    pagination: Pagination,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: &Settings) -> Self {
        Self {
            pool,
            pagination: Pagination {
                per_page: settings.questions_per_page,
            },
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quizzes_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::NotFound
        })
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(pool: SqlitePool, settings: &Settings) -> anyhow::Result<()> {
    let addr = settings.server.addr();
    let state = AppState::new(pool, settings);

    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn metrics() -> ApiResponse<Response> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf).map_err(|e| {
        tracing::error!("Failed to encode metrics: {e}");
        ApiError::ServerError
    })?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(Body::from(buf))
        .map_err(|_| ApiError::ServerError)
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn window_for_pages() {
        let pagination = Pagination { per_page: 10 };
        assert_eq!(pagination.window(1), Some((0, 10)));
        assert_eq!(pagination.window(3), Some((20, 10)));
        assert_eq!(pagination.window(0), None);
        assert_eq!(pagination.window(-2), None);
    }

    #[test]
    fn no_window_without_a_positive_page_size() {
        assert_eq!(Pagination { per_page: -1 }.window(1), None);
        assert_eq!(Pagination { per_page: 0 }.window(1), None);
    }
}
