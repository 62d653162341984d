use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        Category, NewQuestion, Question,
    },
    server::{
        app::{AppState, Pagination},
        deserializers::{page_number, IntField},
        error::{ApiError, ApiResponse},
    },
};

use super::{success, Envelope};

#[derive(Deserialize)]
struct PageQuery {
    page: Option<String>,
}

#[derive(Deserialize)]
struct CreateQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    difficulty: IntField,
    #[serde(default)]
    category: IntField,
}

impl CreateQuestion {
    fn has_empty_field(&self) -> bool {
        self.question.is_empty()
            || self.answer.is_empty()
            || self.difficulty.is_empty()
            || self.category.is_empty()
    }

    fn into_new_question(self) -> Result<NewQuestion, String> {
        Ok(NewQuestion {
            difficulty: self.difficulty.to_i64()?,
            category: self.category.to_i64()?,
            question: self.question,
            answer: self.answer,
        })
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default, rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    total_questions: i64,
    categories: Vec<Category>,
    questions: Vec<Question>,
}

#[derive(Serialize)]
struct SearchResults {
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    State(pagination): State<Pagination>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<Envelope<QuestionsPage>>> {
    let page = page_number(query.ok().and_then(|Query(q)| q.page).as_deref());

    let total_questions = questions::count_questions(&pool).await?;
    let categories = get_all_categories(&pool).await?;
    let current = match pagination.window(page) {
        Some((offset, limit)) => questions::get_questions_window(&pool, offset, limit).await?,
        None => Vec::new(),
    };

    if current.is_empty() {
        tracing::debug!("Page {page} is out of range");
        return Err(ApiError::NotFound);
    }

    Ok(success(QuestionsPage {
        total_questions,
        categories,
        questions: current,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Envelope<Message>>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    // deleting an id that does not exist is unprocessable, not not found
    questions::delete_question(&pool, id).await.map_err(|e| {
        tracing::warn!("Failed to delete question {id}: {e}");
        ApiError::Unprocessable
    })?;

    tracing::info!("Deleted question {id}");
    Ok(success(Message {
        message: "Question successfully deleted",
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<CreateQuestion>, JsonRejection>,
) -> ApiResponse<(StatusCode, Json<Envelope<Message>>)> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!("Rejected question body: {e}");
        ApiError::Unprocessable
    })?;
    if body.has_empty_field() {
        return Err(ApiError::Unprocessable);
    }
    let new_question = body.into_new_question().map_err(|e| {
        tracing::debug!("{e}");
        ApiError::Unprocessable
    })?;

    let id = questions::create_question(&pool, &new_question)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to create question: {e}");
            ApiError::Unprocessable
        })?;

    tracing::info!("Created question {id}");
    Ok((
        StatusCode::CREATED,
        success(Message {
            message: "Question successfully created!",
        }),
    ))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchQuery>, JsonRejection>,
) -> ApiResponse<Json<Envelope<SearchResults>>> {
    let Json(SearchQuery { search_term }) = body.map_err(|_| ApiError::Unprocessable)?;
    if search_term.is_empty() {
        return Err(ApiError::Unprocessable);
    }

    // store failures are reported the same way as an empty result
    let not_found = |e: sqlx::Error| {
        tracing::warn!("Search for {search_term:?} failed: {e}");
        ApiError::NotFound
    };
    let found = questions::search_questions(&pool, &search_term)
        .await
        .map_err(not_found)?;
    if found.is_empty() {
        return Err(ApiError::NotFound);
    }
    let total_questions = questions::count_questions(&pool)
        .await
        .map_err(not_found)?;

    Ok(success(SearchResults {
        questions: found,
        total_questions,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search_questions))
        .with_state(state)
}
