use shared::error::{AppError, ErrorCode};
use shared::models::Restaurant;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

use super::RepoResult;

pub async fn create(conn: &mut SqliteConnection, name: &str, location: &str) -> RepoResult<Restaurant> {
    let restaurant = sqlx::query_as(
        "INSERT INTO restaurants (name, location, created_at) VALUES (?, ?, ?)
         RETURNING id, name, location, num_categories, created_at",
    )
    .bind(name)
    .bind(location)
    .bind(now_millis())
    .fetch_one(&mut *conn)
    .await?;
    Ok(restaurant)
}

pub async fn find(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as(
        "SELECT id, name, location, num_categories, created_at FROM restaurants WHERE id = ?",
    )
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

pub async fn get(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Restaurant> {
    find(pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound).into())
}

/// Look a restaurant up by exact name and location. Oldest match wins.
pub async fn find_by_name_location(
    pool: &SqlitePool,
    name: &str,
    location: &str,
) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as(
        "SELECT id, name, location, num_categories, created_at FROM restaurants
         WHERE name = ? AND location = ? ORDER BY id LIMIT 1",
    )
    .bind(name)
    .bind(location)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let created = create(&mut conn, "Mamma Mia", "Sydney").await.unwrap();
        drop(conn);

        assert_eq!(created.num_categories, 0);
        let found = find_by_name_location(&pool, "Mamma Mia", "Sydney")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert!(
            find_by_name_location(&pool, "Mamma Mia", "Melbourne")
                .await
                .unwrap()
                .is_none()
        );
        assert!(get(&pool, created.id + 1).await.is_err());
    }
}
