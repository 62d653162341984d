use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category, questions::random_question},
        Question,
    },
    server::{
        app::AppState,
        deserializers::IntField,
        error::{ApiError, ApiResponse},
    },
    telemetry::QUIZ_DRAWS_CNTR,
};

use super::{success, Envelope};

/// The front end sends the whole category object; a bare id works too.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuizCategory {
    Object { id: IntField },
    Id(IntField),
}

impl QuizCategory {
    fn id(&self) -> &IntField {
        match self {
            QuizCategory::Object { id } | QuizCategory::Id(id) => id,
        }
    }
}

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<i64>,
    #[serde(default)]
    quiz_category: Option<QuizCategory>,
}

#[derive(Serialize)]
struct QuizQuestion {
    question: Option<Question>,
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<Envelope<QuizQuestion>>> {
    let Json(request) = body.map_err(|_| ApiError::Unprocessable)?;

    // 0 and a missing category both mean "all categories"
    let category = match &request.quiz_category {
        Some(category) if !category.id().is_empty() => {
            Some(category.id().to_i64().map_err(|_| ApiError::Unprocessable)?)
        }
        _ => None,
    }
    .filter(|id| *id != 0);

    if let Some(id) = category {
        get_category(&pool, id)
            .await?
            .ok_or(ApiError::Unprocessable)?;
    }

    let question = random_question(&pool, category, &request.previous_questions).await?;
    if let Some(question) = &question {
        let label = question.category.to_string();
        QUIZ_DRAWS_CNTR.with_label_values(&[label.as_str()]).inc();
    } else {
        tracing::debug!("Quiz exhausted after {} questions", request.previous_questions.len());
    }

    Ok(success(QuizQuestion { question }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
