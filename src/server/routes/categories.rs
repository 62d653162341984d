use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::get_questions_for_category,
        },
        Category, Question,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResponse},
    },
};

use super::{success, Envelope};

#[derive(Serialize)]
struct CategoriesBody {
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

async fn get_categories(
    State(pool): State<SqlitePool>,
) -> ApiResponse<Json<Envelope<CategoriesBody>>> {
    let categories = get_all_categories(&pool).await?;
    Ok(success(CategoriesBody { categories }))
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Envelope<CategoryQuestionsBody>>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    // an unknown category is reported as unprocessable, not as not found
    let category = get_category(&pool, id)
        .await?
        .ok_or(ApiError::Unprocessable)?;
    let questions = get_questions_for_category(&pool, id).await?;

    Ok(success(CategoryQuestionsBody {
        total_questions: questions.len(),
        questions,
        current_category: category.name,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
