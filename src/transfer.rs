//! CSV fixtures for seeding and backing up the trivia tables.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, Question};

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Bad record in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    tracing::info!(
        "Exporting {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        dir.display()
    );
    write_to(&dir.join(CATEGORIES_FILE), categories)?;
    write_to(&dir.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    tracing::info!(
        "Importing {} categories and {} questions from {}",
        categories.len(),
        questions.len(),
        dir.display()
    );
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::db::queries::categories::upsert_category;
    use crate::db::queries::questions::upsert_question;

    #[tokio::test]
    async fn exported_files_import_into_empty_store() {
        let source = memory_pool().await;
        let category = Category {
            id: 1,
            name: "Science".to_owned(),
        };
        let question = Question {
            id: 7,
            question: "Hematology is a branch of medicine involving the study of what?".to_owned(),
            answer: "Blood".to_owned(),
            category: 1,
            difficulty: 4,
        };
        upsert_category(&source, &category).await.unwrap();
        upsert_question(&source, &question).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        export_data(&source, dir.path()).await.unwrap();

        let header = std::fs::read_to_string(dir.path().join(CATEGORIES_FILE)).unwrap();
        assert!(header.starts_with("id,type"));

        let target = memory_pool().await;
        import_data(&target, dir.path()).await.unwrap();
        assert_eq!(get_all_categories(&target).await.unwrap(), vec![category]);
        assert_eq!(get_all_questions(&target).await.unwrap(), vec![question]);
    }

    #[tokio::test]
    async fn import_fails_without_files() {
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().unwrap();
        assert!(import_data(&pool, dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn bundled_fixtures_load() {
        let pool = memory_pool().await;
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        import_data(&pool, &fixtures).await.unwrap();
        assert_eq!(get_all_categories(&pool).await.unwrap().len(), 6);
        assert!(!get_all_questions(&pool).await.unwrap().is_empty());
    }
}
