//! Dense 1..N position sequences
//!
//! Categories are ordered within their restaurant and menu items within
//! their category. Both sequences are kept contiguous by the same three
//! moves: append at `counter + 1`, close the gap with one range update on
//! removal, and apply a validated bijective reorder. The owning row carries
//! the counter (`restaurants.num_categories`, `categories.num_menu_items`),
//! which always equals the number of children and the highest position.
//!
//! Every function here takes a `&mut SqliteConnection` so callers compose
//! them inside a single transaction.

use std::collections::HashSet;

use shared::error::{AppError, ErrorCode};
use sqlx::{SqliteConnection, SqlitePool};

use super::RepoResult;

/// One kind of sibling group: which table holds the children, which column
/// names the parent, and where the parent's counter lives.
#[derive(Debug, Clone, Copy)]
pub struct OrderedGroup {
    pub entity: &'static str,
    pub table: &'static str,
    pub parent_column: &'static str,
    pub counter_table: &'static str,
    pub counter_column: &'static str,
    pub not_found: ErrorCode,
    pub parent_not_found: ErrorCode,
}

/// Categories within a restaurant
pub const CATEGORIES: OrderedGroup = OrderedGroup {
    entity: "Category",
    table: "categories",
    parent_column: "restaurant_id",
    counter_table: "restaurants",
    counter_column: "num_categories",
    not_found: ErrorCode::CategoryNotFound,
    parent_not_found: ErrorCode::RestaurantNotFound,
};

/// Menu items within a category
pub const MENU_ITEMS: OrderedGroup = OrderedGroup {
    entity: "Menu item",
    table: "menu_items",
    parent_column: "category_id",
    counter_table: "categories",
    counter_column: "num_menu_items",
    not_found: ErrorCode::MenuItemNotFound,
    parent_not_found: ErrorCode::CategoryNotFound,
};

impl OrderedGroup {
    fn not_found(&self, id: i64) -> AppError {
        AppError::with_message(self.not_found, format!("{} {id} not found", self.entity))
            .with_detail("id", id)
    }

    /// Bump the parent's counter and return the position a new child takes.
    pub async fn append(&self, conn: &mut SqliteConnection, parent_id: i64) -> RepoResult<i64> {
        let sql = format!(
            "UPDATE {t} SET {c} = {c} + 1 WHERE id = ? RETURNING {c}",
            t = self.counter_table,
            c = self.counter_column,
        );
        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(parent_id)
            .fetch_optional(&mut *conn)
            .await?;
        let (position,) = row.ok_or_else(|| AppError::new(self.parent_not_found))?;
        Ok(position)
    }

    /// Take `id` out of its parent's sequence without deleting the row.
    ///
    /// Every sibling after it moves down by one in a single statement and
    /// the counter is decremented. Returns the position the child held.
    pub async fn detach(
        &self,
        conn: &mut SqliteConnection,
        parent_id: i64,
        id: i64,
    ) -> RepoResult<i64> {
        let sql = format!(
            "SELECT position FROM {t} WHERE id = ? AND {p} = ?",
            t = self.table,
            p = self.parent_column,
        );
        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(id)
            .bind(parent_id)
            .fetch_optional(&mut *conn)
            .await?;
        let (position,) = row.ok_or_else(|| self.not_found(id))?;

        let shift = format!(
            "UPDATE {t} SET position = position - 1 WHERE {p} = ? AND position > ?",
            t = self.table,
            p = self.parent_column,
        );
        let shifted = sqlx::query(&shift)
            .bind(parent_id)
            .bind(position)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        let counter = format!(
            "UPDATE {t} SET {c} = {c} - 1 WHERE id = ?",
            t = self.counter_table,
            c = self.counter_column,
        );
        sqlx::query(&counter)
            .bind(parent_id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(
            entity = self.entity,
            parent_id,
            id,
            position,
            shifted,
            "Closed position gap"
        );
        Ok(position)
    }

    /// Detach and delete `id`. Dependent rows go with it via FK cascade.
    pub async fn remove(&self, conn: &mut SqliteConnection, parent_id: i64, id: i64) -> RepoResult<()> {
        self.detach(conn, parent_id, id).await?;
        let sql = format!("DELETE FROM {t} WHERE id = ?", t = self.table);
        sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
        Ok(())
    }

    /// Move `id` from one parent to the end of another.
    pub async fn move_to(
        &self,
        conn: &mut SqliteConnection,
        from_parent: i64,
        to_parent: i64,
        id: i64,
    ) -> RepoResult<i64> {
        if from_parent == to_parent {
            return Err(AppError::validation(format!(
                "{} {id} is already in that group",
                self.entity
            ))
            .into());
        }
        self.detach(conn, from_parent, id).await?;
        let position = self.append(conn, to_parent).await?;
        let sql = format!(
            "UPDATE {t} SET {p} = ?, position = ? WHERE id = ?",
            t = self.table,
            p = self.parent_column,
        );
        sqlx::query(&sql)
            .bind(to_parent)
            .bind(position)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(position)
    }

    /// Overwrite positions of `parent_id`'s children with `moves`.
    ///
    /// `moves` must name every child exactly once and its positions must be
    /// exactly `1..=count`; nothing is written otherwise.
    pub async fn reorder(
        &self,
        conn: &mut SqliteConnection,
        parent_id: i64,
        moves: &[(i64, i64)],
    ) -> RepoResult<()> {
        let sql = format!(
            "SELECT id FROM {t} WHERE {p} = ?",
            t = self.table,
            p = self.parent_column,
        );
        let siblings: Vec<i64> = sqlx::query_as::<_, (i64,)>(&sql)
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(|(id,)| id)
            .collect();

        self.validate_reorder(&siblings, moves)?;

        let update = format!(
            "UPDATE {t} SET position = ? WHERE id = ? AND {p} = ?",
            t = self.table,
            p = self.parent_column,
        );
        for &(id, position) in moves {
            sqlx::query(&update)
                .bind(position)
                .bind(id)
                .bind(parent_id)
                .execute(&mut *conn)
                .await?;
        }
        tracing::info!(entity = self.entity, parent_id, count = moves.len(), "Reordered");
        Ok(())
    }

    /// Check that `moves` is a bijection from `siblings` onto `1..=siblings.len()`.
    pub fn validate_reorder(&self, siblings: &[i64], moves: &[(i64, i64)]) -> Result<(), AppError> {
        let known: HashSet<i64> = siblings.iter().copied().collect();
        if let Some(&(id, _)) = moves.iter().find(|(id, _)| !known.contains(id)) {
            return Err(self.not_found(id));
        }

        let mut seen_ids = HashSet::with_capacity(moves.len());
        if let Some(&(id, _)) = moves.iter().find(|(id, _)| !seen_ids.insert(*id)) {
            return Err(AppError::with_message(
                ErrorCode::InvalidPositions,
                format!("{} {id} is listed more than once", self.entity),
            ));
        }

        let count = siblings.len() as i64;
        if moves.len() as i64 != count {
            return Err(AppError::with_message(
                ErrorCode::InvalidPositions,
                format!("Reorder must list all {count} entries, got {}", moves.len()),
            )
            .with_detail("expected", count));
        }

        let mut seen_positions = HashSet::with_capacity(moves.len());
        for &(_, position) in moves {
            if !(1..=count).contains(&position) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidPositions,
                    format!("Position {position} is outside 1..={count}"),
                ));
            }
            if !seen_positions.insert(position) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidPositions,
                    format!("Position {position} is assigned more than once"),
                ));
            }
        }
        Ok(())
    }

    /// `(id, position)` of every child, in position order
    pub async fn positions(&self, pool: &SqlitePool, parent_id: i64) -> RepoResult<Vec<(i64, i64)>> {
        let sql = format!(
            "SELECT id, position FROM {t} WHERE {p} = ? ORDER BY position, id",
            t = self.table,
            p = self.parent_column,
        );
        let rows = sqlx::query_as(&sql).bind(parent_id).fetch_all(pool).await?;
        Ok(rows)
    }

    /// Current value of the parent's counter
    pub async fn counter(&self, pool: &SqlitePool, parent_id: i64) -> RepoResult<i64> {
        let sql = format!(
            "SELECT {c} FROM {t} WHERE id = ?",
            t = self.counter_table,
            c = self.counter_column,
        );
        let row: Option<(i64,)> = sqlx::query_as(&sql).bind(parent_id).fetch_optional(pool).await?;
        let (count,) = row.ok_or_else(|| AppError::new(self.parent_not_found))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RepoError;
    use crate::db::test_support::{seed_restaurant, test_pool};

    async fn add_category(pool: &SqlitePool, restaurant_id: i64, name: &str) -> i64 {
        let mut tx = pool.begin().await.unwrap();
        let position = CATEGORIES.append(&mut tx, restaurant_id).await.unwrap();
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO categories (restaurant_id, name, position) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(restaurant_id)
        .bind(name)
        .bind(position)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
        tx.commit().await.unwrap();
        id
    }

    fn app_code(err: RepoError) -> ErrorCode {
        match err {
            RepoError::App(e) => e.code,
            RepoError::Db(e) => panic!("unexpected database error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_next_position() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 0).await;
        let a = add_category(&pool, r, "A").await;
        let b = add_category(&pool, r, "B").await;
        let c = add_category(&pool, r, "C").await;

        assert_eq!(
            CATEGORIES.positions(&pool, r).await.unwrap(),
            vec![(a, 1), (b, 2), (c, 3)]
        );
        assert_eq!(CATEGORIES.counter(&pool, r).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_remove_shifts_only_later_siblings() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 0).await;
        let ids: Vec<i64> = add_categories(&pool, r, 4).await;

        let mut conn = pool.acquire().await.unwrap();
        CATEGORIES.remove(&mut conn, r, ids[1]).await.unwrap();
        drop(conn);

        assert_eq!(
            CATEGORIES.positions(&pool, r).await.unwrap(),
            vec![(ids[0], 1), (ids[2], 2), (ids[3], 3)]
        );
        assert_eq!(CATEGORIES.counter(&pool, r).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_remove_from_other_parent_is_not_found() {
        let pool = test_pool().await;
        let r1 = seed_restaurant(&pool, 0).await;
        let r2 = seed_restaurant(&pool, 0).await;
        let foreign = add_category(&pool, r2, "Theirs").await;
        add_category(&pool, r1, "Ours").await;

        let mut conn = pool.acquire().await.unwrap();
        let err = CATEGORIES.remove(&mut conn, r1, foreign).await.unwrap_err();
        drop(conn);

        assert_eq!(app_code(err), ErrorCode::CategoryNotFound);
        assert_eq!(CATEGORIES.counter(&pool, r1).await.unwrap(), 1);
        assert_eq!(CATEGORIES.counter(&pool, r2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_append_to_missing_parent() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = CATEGORIES.append(&mut conn, 42).await.unwrap_err();
        assert_eq!(app_code(err), ErrorCode::RestaurantNotFound);
    }

    #[tokio::test]
    async fn test_reorder_applies_permutation() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 0).await;
        let ids = add_categories(&pool, r, 3).await;

        let mut conn = pool.acquire().await.unwrap();
        CATEGORIES
            .reorder(&mut conn, r, &[(ids[0], 3), (ids[1], 1), (ids[2], 2)])
            .await
            .unwrap();
        drop(conn);

        assert_eq!(
            CATEGORIES.positions(&pool, r).await.unwrap(),
            vec![(ids[1], 1), (ids[2], 2), (ids[0], 3)]
        );
    }

    #[tokio::test]
    async fn test_rejected_reorder_writes_nothing() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 0).await;
        let ids = add_categories(&pool, r, 3).await;

        let mut conn = pool.acquire().await.unwrap();
        let err = CATEGORIES
            .reorder(&mut conn, r, &[(ids[0], 2), (ids[1], 2), (ids[2], 3)])
            .await
            .unwrap_err();
        drop(conn);

        assert_eq!(app_code(err), ErrorCode::InvalidPositions);
        assert_eq!(
            CATEGORIES.positions(&pool, r).await.unwrap(),
            vec![(ids[0], 1), (ids[1], 2), (ids[2], 3)]
        );
    }

    #[test]
    fn test_validate_reorder_cases() {
        let siblings = [10, 11, 12];
        let ok = CATEGORIES.validate_reorder(&siblings, &[(12, 1), (10, 2), (11, 3)]);
        assert!(ok.is_ok());

        // unknown / cross-parent id
        let err = CATEGORIES
            .validate_reorder(&siblings, &[(10, 1), (11, 2), (99, 3)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryNotFound);

        // partial
        let err = CATEGORIES
            .validate_reorder(&siblings, &[(10, 2), (11, 1)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPositions);

        // duplicate id
        let err = CATEGORIES
            .validate_reorder(&siblings, &[(10, 1), (10, 2), (11, 3)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPositions);

        // out of range
        let err = CATEGORIES
            .validate_reorder(&siblings, &[(10, 1), (11, 2), (12, 4)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPositions);

        // zero is not a position
        let err = CATEGORIES
            .validate_reorder(&siblings, &[(10, 0), (11, 1), (12, 2)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPositions);

        // empty group, empty reorder
        assert!(MENU_ITEMS.validate_reorder(&[], &[]).is_ok());
    }

    async fn add_menu_item(pool: &SqlitePool, restaurant_id: i64, category_id: i64) -> i64 {
        let mut tx = pool.begin().await.unwrap();
        let position = MENU_ITEMS.append(&mut tx, category_id).await.unwrap();
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO menu_items (restaurant_id, category_id, name, price_cents, position)
             VALUES (?, ?, 'Dish', 100, ?) RETURNING id",
        )
        .bind(restaurant_id)
        .bind(category_id)
        .bind(position)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
        tx.commit().await.unwrap();
        id
    }

    /// positions are exactly 1..=counter and the children are `expected`
    async fn assert_dense(pool: &SqlitePool, group: OrderedGroup, parent_id: i64, expected: &[i64]) {
        let rows = group.positions(pool, parent_id).await.unwrap();
        let counter = group.counter(pool, parent_id).await.unwrap();

        let positions: Vec<i64> = rows.iter().map(|&(_, p)| p).collect();
        assert_eq!(positions, (1..=counter).collect::<Vec<_>>());

        let mut ids: Vec<i64> = rows.iter().map(|&(id, _)| id).collect();
        let mut expected = expected.to_vec();
        ids.sort_unstable();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_interleaved_operations_stay_dense() {
        use rand::seq::SliceRandom;
        use rand::{Rng, SeedableRng};

        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 0).await;
        let mut rng = rand::rngs::StdRng::seed_from_u64(17);

        // two fixed categories hold the menu items; the rest come and go
        let holders = [add_category(&pool, r, "Mains").await, add_category(&pool, r, "Drinks").await];
        let mut categories: Vec<i64> = holders.to_vec();
        let mut items: [Vec<i64>; 2] = [Vec::new(), Vec::new()];

        for step in 0..150 {
            match rng.gen_range(0..6) {
                0 => {
                    categories.push(add_category(&pool, r, &format!("S{step}")).await);
                }
                1 => {
                    let removable: Vec<i64> = categories
                        .iter()
                        .copied()
                        .filter(|id| !holders.contains(id))
                        .collect();
                    if let Some(&id) = removable.choose(&mut rng) {
                        let mut conn = pool.acquire().await.unwrap();
                        CATEGORIES.remove(&mut conn, r, id).await.unwrap();
                        categories.retain(|&c| c != id);
                    }
                }
                2 => {
                    let h = rng.gen_range(0..2);
                    items[h].push(add_menu_item(&pool, r, holders[h]).await);
                }
                3 => {
                    let h = rng.gen_range(0..2);
                    if let Some(&id) = items[h].choose(&mut rng) {
                        let mut conn = pool.acquire().await.unwrap();
                        MENU_ITEMS.remove(&mut conn, holders[h], id).await.unwrap();
                        items[h].retain(|&i| i != id);
                    }
                }
                4 => {
                    let h = rng.gen_range(0..2);
                    if let Some(&id) = items[h].choose(&mut rng) {
                        let mut conn = pool.acquire().await.unwrap();
                        let position = MENU_ITEMS
                            .move_to(&mut conn, holders[h], holders[1 - h], id)
                            .await
                            .unwrap();
                        items[h].retain(|&i| i != id);
                        items[1 - h].push(id);
                        assert_eq!(position, items[1 - h].len() as i64);
                    }
                }
                _ => {
                    let mut shuffled = categories.clone();
                    shuffled.shuffle(&mut rng);
                    let moves: Vec<(i64, i64)> =
                        shuffled.iter().zip(1..).map(|(&id, p)| (id, p)).collect();
                    let mut conn = pool.acquire().await.unwrap();
                    CATEGORIES.reorder(&mut conn, r, &moves).await.unwrap();
                }
            }

            assert_dense(&pool, CATEGORIES, r, &categories).await;
            assert_dense(&pool, MENU_ITEMS, holders[0], &items[0]).await;
            assert_dense(&pool, MENU_ITEMS, holders[1], &items[1]).await;
        }
    }

    async fn add_categories(pool: &SqlitePool, restaurant_id: i64, n: usize) -> Vec<i64> {
        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            ids.push(add_category(pool, restaurant_id, &format!("C{i}")).await);
        }
        ids
    }
}
