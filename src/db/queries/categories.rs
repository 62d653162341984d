use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub name: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn upsert_category(pool: &SqlitePool, category: &Category) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, type) VALUES (?1, ?2)
        ON CONFLICT(id) DO UPDATE SET type = excluded.type
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_category(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        DELETE FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Makes the table hold exactly `categories`: unknown ids are removed, the rest upserted.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_categories(pool)
        .await?
        .iter()
        .map(|c| c.id)
        .collect();
    let new_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_category(pool, *id).await?;
    }
    for category in &categories {
        upsert_category(pool, category).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn categories_are_listed_in_id_order() {
        let pool = memory_pool().await;
        upsert_category(&pool, &category(3, "Geography")).await.unwrap();
        upsert_category(&pool, &category(1, "Science")).await.unwrap();

        let categories = get_all_categories(&pool).await.unwrap();
        assert_eq!(
            categories,
            vec![category(1, "Science"), category(3, "Geography")]
        );
    }

    #[tokio::test]
    async fn missing_category_is_none() {
        let pool = memory_pool().await;
        assert_eq!(get_category(&pool, 42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn import_replaces_renames_and_removes() {
        let pool = memory_pool().await;
        upsert_category(&pool, &category(1, "Science")).await.unwrap();
        upsert_category(&pool, &category(2, "Art")).await.unwrap();

        import_categories(&pool, vec![category(2, "Fine Art"), category(4, "History")])
            .await
            .unwrap();

        let categories = get_all_categories(&pool).await.unwrap();
        assert_eq!(
            categories,
            vec![category(2, "Fine Art"), category(4, "History")]
        );
    }

    #[test]
    fn serializes_name_as_type() {
        let json = serde_json::to_value(category(1, "Science")).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "type": "Science"}));
    }
}
