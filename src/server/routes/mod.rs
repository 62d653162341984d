mod categories;
mod questions;
mod quizzes;

use axum::Json;
use serde::Serialize;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

/// Successful responses: the endpoint's fields next to `success: true`.
#[derive(Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub fn success<T: Serialize>(body: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        body,
    })
}
