use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryPosition};
use sqlx::SqlitePool;

use super::{RepoResult, begin_write};
use super::ordering::CATEGORIES;

fn not_found(category_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::CategoryNotFound,
        format!("Category {category_id} not found"),
    )
    .with_detail("category_id", category_id)
}

/// Append a category to the end of the restaurant's list.
pub async fn create(pool: &SqlitePool, restaurant_id: i64, name: &str) -> RepoResult<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "Category name is required").into());
    }

    let mut tx = begin_write(pool).await?;
    let position = CATEGORIES.append(&mut tx, restaurant_id).await?;
    let category: Category = sqlx::query_as(
        "INSERT INTO categories (restaurant_id, name, position) VALUES (?, ?, ?)
         RETURNING id, restaurant_id, name, position, num_menu_items",
    )
    .bind(restaurant_id)
    .bind(name)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(restaurant_id, category_id = category.id, position, "Category created");
    Ok(category)
}

pub async fn find(pool: &SqlitePool, restaurant_id: i64, category_id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as(
        "SELECT id, restaurant_id, name, position, num_menu_items FROM categories
         WHERE id = ? AND restaurant_id = ?",
    )
    .bind(category_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

/// Like [`find`], failing with `CategoryNotFound`.
pub async fn get(pool: &SqlitePool, restaurant_id: i64, category_id: i64) -> RepoResult<Category> {
    find(pool, restaurant_id, category_id)
        .await?
        .ok_or_else(|| not_found(category_id).into())
}

/// All categories of a restaurant in position order
pub async fn list(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as(
        "SELECT id, restaurant_id, name, position, num_menu_items FROM categories
         WHERE restaurant_id = ? ORDER BY position",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn rename(
    pool: &SqlitePool,
    restaurant_id: i64,
    category_id: i64,
    name: &str,
) -> RepoResult<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "Category name is required").into());
    }
    let category: Option<Category> = sqlx::query_as(
        "UPDATE categories SET name = ? WHERE id = ? AND restaurant_id = ?
         RETURNING id, restaurant_id, name, position, num_menu_items",
    )
    .bind(name)
    .bind(category_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    category.ok_or_else(|| not_found(category_id).into())
}

/// Delete a category and its menu items, closing the gap it leaves.
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, category_id: i64) -> RepoResult<()> {
    let mut tx = begin_write(pool).await?;
    CATEGORIES.remove(&mut tx, restaurant_id, category_id).await?;
    tx.commit().await?;
    tracing::info!(restaurant_id, category_id, "Category deleted");
    Ok(())
}

/// Apply a complete new ordering of the restaurant's categories.
pub async fn reposition(
    pool: &SqlitePool,
    restaurant_id: i64,
    moves: &[CategoryPosition],
) -> RepoResult<()> {
    let moves: Vec<(i64, i64)> = moves
        .iter()
        .map(|m| (m.category_id, m.new_position))
        .collect();
    let mut tx = begin_write(pool).await?;
    CATEGORIES.reorder(&mut tx, restaurant_id, &moves).await?;
    tx.commit().await?;
    Ok(())
}
