use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{DietaryRequirement, MenuItem, MenuItemCreate, MenuItemPosition, MenuItemUpdate};
use shared::util::{from_cents, to_cents};
use sqlx::SqlitePool;

use super::ordering::MENU_ITEMS;
use super::{RepoResult, begin_write, categories};

/// Row as stored: price in cents, dietary code as text
#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    restaurant_id: i64,
    category_id: i64,
    name: String,
    description: String,
    price_cents: i64,
    dietary_requirements: String,
    preparation_time: i64,
    popular: bool,
    image: Option<String>,
    position: i64,
}

impl MenuItemRow {
    fn into_model(self) -> MenuItem {
        MenuItem {
            id: self.id,
            restaurant_id: self.restaurant_id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price: from_cents(self.price_cents),
            dietary_requirements: DietaryRequirement::from_db(&self.dietary_requirements)
                .unwrap_or_default(),
            preparation_time: self.preparation_time,
            popular: self.popular,
            image: self.image,
            position: self.position,
        }
    }
}

const COLUMNS: &str = "id, restaurant_id, category_id, name, description, price_cents, \
     dietary_requirements, preparation_time, popular, image, position";

fn not_found(menu_item_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::MenuItemNotFound,
        format!("Menu item {menu_item_id} not found"),
    )
    .with_detail("menu_item_id", menu_item_id)
}

fn validate_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "Menu item name is required"));
    }
    Ok(name)
}

fn validate_price(price: Decimal) -> Result<i64, AppError> {
    if price.is_sign_negative() {
        return Err(AppError::with_message(
            ErrorCode::MenuItemInvalidPrice,
            format!("Price must not be negative, got {price}"),
        ));
    }
    to_cents(price).ok_or_else(|| {
        AppError::with_message(ErrorCode::MenuItemInvalidPrice, format!("Price {price} is out of range"))
    })
}

fn validate_preparation_time(minutes: i64) -> Result<i64, AppError> {
    if minutes < 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Preparation time must not be negative",
        ));
    }
    Ok(minutes)
}

/// Append a menu item to the end of its category.
pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: &MenuItemCreate) -> RepoResult<MenuItem> {
    let name = validate_name(&data.name)?;
    let price_cents = validate_price(data.price)?;
    let preparation_time = validate_preparation_time(data.preparation_time)?;
    categories::get(pool, restaurant_id, data.category_id).await?;

    let mut tx = begin_write(pool).await?;
    let position = MENU_ITEMS.append(&mut tx, data.category_id).await?;
    let sql = format!(
        "INSERT INTO menu_items (restaurant_id, category_id, name, description, price_cents,
             dietary_requirements, preparation_time, popular, image, position)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    );
    let row: MenuItemRow = sqlx::query_as(&sql)
        .bind(restaurant_id)
        .bind(data.category_id)
        .bind(name)
        .bind(&data.description)
        .bind(price_cents)
        .bind(data.dietary_requirements.as_db())
        .bind(preparation_time)
        .bind(data.popular)
        .bind(&data.image)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(
        restaurant_id,
        category_id = data.category_id,
        menu_item_id = row.id,
        position,
        "Menu item created"
    );
    Ok(row.into_model())
}

pub async fn find(pool: &SqlitePool, restaurant_id: i64, menu_item_id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("SELECT {COLUMNS} FROM menu_items WHERE id = ? AND restaurant_id = ?");
    let row: Option<MenuItemRow> = sqlx::query_as(&sql)
        .bind(menu_item_id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(MenuItemRow::into_model))
}

/// Like [`find`], failing with `MenuItemNotFound`.
pub async fn get(pool: &SqlitePool, restaurant_id: i64, menu_item_id: i64) -> RepoResult<MenuItem> {
    find(pool, restaurant_id, menu_item_id)
        .await?
        .ok_or_else(|| not_found(menu_item_id).into())
}

/// Menu items of a restaurant, optionally one category, in position order
pub async fn list(
    pool: &SqlitePool,
    restaurant_id: i64,
    category_id: Option<i64>,
) -> RepoResult<Vec<MenuItem>> {
    let rows: Vec<MenuItemRow> = match category_id {
        Some(category_id) => {
            let sql = format!(
                "SELECT {COLUMNS} FROM menu_items WHERE restaurant_id = ? AND category_id = ?
                 ORDER BY position"
            );
            sqlx::query_as(&sql)
                .bind(restaurant_id)
                .bind(category_id)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as(
                "SELECT m.id, m.restaurant_id, m.category_id, m.name, m.description, m.price_cents,
                        m.dietary_requirements, m.preparation_time, m.popular, m.image, m.position
                 FROM menu_items m JOIN categories c ON c.id = m.category_id
                 WHERE m.restaurant_id = ? ORDER BY c.position, m.position",
            )
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.into_iter().map(MenuItemRow::into_model).collect())
}

/// Apply a partial update. A new `category_id` moves the item to the end
/// of that category and closes the gap it leaves behind.
pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    menu_item_id: i64,
    data: &MenuItemUpdate,
) -> RepoResult<MenuItem> {
    let current = get(pool, restaurant_id, menu_item_id).await?;

    let name = match &data.name {
        Some(name) => validate_name(name)?.to_string(),
        None => current.name,
    };
    let price_cents = validate_price(data.price.unwrap_or(current.price))?;
    let preparation_time =
        validate_preparation_time(data.preparation_time.unwrap_or(current.preparation_time))?;
    let target_category = data
        .category_id
        .filter(|&c| c != current.category_id);
    if let Some(category_id) = target_category {
        categories::get(pool, restaurant_id, category_id).await?;
    }

    let mut tx = begin_write(pool).await?;
    if let Some(category_id) = target_category {
        let position = MENU_ITEMS
            .move_to(&mut tx, current.category_id, category_id, menu_item_id)
            .await?;
        tracing::info!(
            menu_item_id,
            from = current.category_id,
            to = category_id,
            position,
            "Menu item moved"
        );
    }
    sqlx::query(
        "UPDATE menu_items SET name = ?, description = ?, price_cents = ?,
             dietary_requirements = ?, preparation_time = ?, popular = ?, image = ?
         WHERE id = ?",
    )
    .bind(&name)
    .bind(data.description.as_deref().unwrap_or(&current.description))
    .bind(price_cents)
    .bind(
        data.dietary_requirements
            .unwrap_or(current.dietary_requirements)
            .as_db(),
    )
    .bind(preparation_time)
    .bind(data.popular.unwrap_or(current.popular))
    .bind(data.image.as_ref().or(current.image.as_ref()))
    .bind(menu_item_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    get(pool, restaurant_id, menu_item_id).await
}

/// Delete a menu item and close the gap in its category.
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, menu_item_id: i64) -> RepoResult<()> {
    let item = get(pool, restaurant_id, menu_item_id).await?;
    let mut tx = begin_write(pool).await?;
    MENU_ITEMS.remove(&mut tx, item.category_id, menu_item_id).await?;
    tx.commit().await?;
    tracing::info!(restaurant_id, menu_item_id, category_id = item.category_id, "Menu item deleted");
    Ok(())
}

/// Apply a complete new ordering of one category's menu items.
pub async fn reposition(
    pool: &SqlitePool,
    restaurant_id: i64,
    category_id: i64,
    moves: &[MenuItemPosition],
) -> RepoResult<()> {
    categories::get(pool, restaurant_id, category_id).await?;
    let moves: Vec<(i64, i64)> = moves
        .iter()
        .map(|m| (m.menu_item_id, m.new_position))
        .collect();
    let mut tx = begin_write(pool).await?;
    MENU_ITEMS.reorder(&mut tx, category_id, &moves).await?;
    tx.commit().await?;
    Ok(())
}
