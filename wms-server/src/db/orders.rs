//! Orders, order items and bills
//!
//! An order is a batch placed by one customer session. Each requested unit
//! becomes its own order item so that kitchen status is tracked per unit.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Bill, CustomerSession, Order, OrderItem, OrderItemStatus, OrderLine};
use shared::util::{from_cents, now_millis};
use sqlx::SqlitePool;

use super::{RepoResult, begin_write};

/// Most units of one menu item a single order line may request
pub const MAX_LINE_QUANTITY: i64 = 50;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    session_id: i64,
    table_number: i64,
    order_time: i64,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    menu_item_id: i64,
    menu_item_name: String,
    price_cents: i64,
    status: String,
    table_number: i64,
}

impl OrderItemRow {
    fn into_model(self) -> OrderItem {
        OrderItem {
            id: self.id,
            order_id: self.order_id,
            menu_item_id: self.menu_item_id,
            menu_item_name: self.menu_item_name,
            price: from_cents(self.price_cents),
            status: OrderItemStatus::from_db(&self.status).unwrap_or(OrderItemStatus::OrderSent),
            table_number: self.table_number,
        }
    }
}

const ITEM_SELECT: &str = "SELECT oi.id, oi.order_id, oi.menu_item_id, m.name AS menu_item_name,
        m.price_cents, oi.status, s.table_number
     FROM order_items oi
     JOIN orders o ON o.id = oi.order_id
     JOIN customer_sessions s ON s.id = o.session_id
     JOIN menu_items m ON m.id = oi.menu_item_id";

const ORDER_SELECT: &str = "SELECT o.id, o.session_id, s.table_number, o.order_time
     FROM orders o JOIN customer_sessions s ON s.id = o.session_id";

/// Which orders to list
#[derive(Debug, Clone, Copy)]
pub enum OrderScope {
    Session(i64),
    Table { restaurant_id: i64, table_number: i64 },
    Restaurant(i64),
}

impl OrderScope {
    fn filter(&self) -> &'static str {
        match self {
            Self::Session(_) => "s.id = ?",
            Self::Table { .. } => "s.restaurant_id = ? AND s.table_number = ?",
            Self::Restaurant(_) => "s.restaurant_id = ?",
        }
    }
}

fn validate_lines(lines: &[OrderLine]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if let Some(line) = lines
        .iter()
        .find(|l| !(1..=MAX_LINE_QUANTITY).contains(&l.quantity))
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!(
                "Quantity must be between 1 and {MAX_LINE_QUANTITY}, got {}",
                line.quantity
            ),
        )
        .with_detail("menu_item_id", line.menu_item_id));
    }
    Ok(())
}

/// Place an order under `session`: one item row per requested unit.
pub async fn place(pool: &SqlitePool, session: &CustomerSession, lines: &[OrderLine]) -> RepoResult<Order> {
    validate_lines(lines)?;

    let mut tx = begin_write(pool).await?;
    let requested: HashSet<i64> = lines.iter().map(|l| l.menu_item_id).collect();
    for menu_item_id in &requested {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM menu_items WHERE id = ? AND restaurant_id = ?")
                .bind(menu_item_id)
                .bind(session.restaurant_id)
                .fetch_optional(&mut *tx)
                .await?;
        if found.is_none() {
            return Err(AppError::with_message(
                ErrorCode::MenuItemNotFound,
                format!("Menu item {menu_item_id} not found"),
            )
            .with_detail("menu_item_id", *menu_item_id)
            .into());
        }
    }

    let order_time = now_millis();
    let (order_id,): (i64,) =
        sqlx::query_as("INSERT INTO orders (session_id, order_time) VALUES (?, ?) RETURNING id")
            .bind(session.id)
            .bind(order_time)
            .fetch_one(&mut *tx)
            .await?;

    let mut units: i64 = 0;
    for line in lines {
        for _ in 0..line.quantity {
            sqlx::query("INSERT INTO order_items (order_id, menu_item_id, status) VALUES (?, ?, ?)")
                .bind(order_id)
                .bind(line.menu_item_id)
                .bind(OrderItemStatus::OrderSent.as_db())
                .execute(&mut *tx)
                .await?;
            units += 1;
        }
    }
    tx.commit().await?;

    tracing::info!(
        restaurant_id = session.restaurant_id,
        table_number = session.table_number,
        order_id,
        units,
        "Order placed"
    );

    let items = items_of_order(pool, order_id).await?;
    Ok(Order {
        id: order_id,
        session_id: session.id,
        table_number: session.table_number,
        order_time,
        items,
    })
}

async fn items_of_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ITEM_SELECT} WHERE oi.order_id = ? ORDER BY oi.id");
    let rows: Vec<OrderItemRow> = sqlx::query_as(&sql).bind(order_id).fetch_all(pool).await?;
    Ok(rows.into_iter().map(OrderItemRow::into_model).collect())
}

/// Orders in `scope` with their items, oldest first
pub async fn list(pool: &SqlitePool, scope: OrderScope) -> RepoResult<Vec<Order>> {
    let order_sql = format!("{ORDER_SELECT} WHERE {} ORDER BY o.order_time, o.id", scope.filter());
    let item_sql = format!("{ITEM_SELECT} WHERE {} ORDER BY oi.id", scope.filter());

    let (orders, items): (Vec<OrderRow>, Vec<OrderItemRow>) = match scope {
        OrderScope::Session(id) | OrderScope::Restaurant(id) => (
            sqlx::query_as(&order_sql).bind(id).fetch_all(pool).await?,
            sqlx::query_as(&item_sql).bind(id).fetch_all(pool).await?,
        ),
        OrderScope::Table {
            restaurant_id,
            table_number,
        } => (
            sqlx::query_as(&order_sql)
                .bind(restaurant_id)
                .bind(table_number)
                .fetch_all(pool)
                .await?,
            sqlx::query_as(&item_sql)
                .bind(restaurant_id)
                .bind(table_number)
                .fetch_all(pool)
                .await?,
        ),
    };

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for row in items {
        by_order.entry(row.order_id).or_default().push(row.into_model());
    }
    Ok(orders
        .into_iter()
        .map(|o| Order {
            items: by_order.remove(&o.id).unwrap_or_default(),
            id: o.id,
            session_id: o.session_id,
            table_number: o.table_number,
            order_time: o.order_time,
        })
        .collect())
}

/// Order items of a restaurant, optionally narrowed to one session and/or status
pub async fn list_items(
    pool: &SqlitePool,
    restaurant_id: i64,
    session_id: Option<i64>,
    status: Option<OrderItemStatus>,
) -> RepoResult<Vec<OrderItem>> {
    let mut sql = format!("{ITEM_SELECT} WHERE s.restaurant_id = ?");
    if session_id.is_some() {
        sql.push_str(" AND s.id = ?");
    }
    if status.is_some() {
        sql.push_str(" AND oi.status = ?");
    }
    sql.push_str(" ORDER BY o.order_time, oi.id");

    let mut query = sqlx::query_as::<_, OrderItemRow>(&sql).bind(restaurant_id);
    if let Some(session_id) = session_id {
        query = query.bind(session_id);
    }
    if let Some(status) = status {
        query = query.bind(status.as_db());
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows.into_iter().map(OrderItemRow::into_model).collect())
}

/// Advance one order item by exactly one status step.
pub async fn update_item_status(
    pool: &SqlitePool,
    restaurant_id: i64,
    order_item_id: i64,
    to: OrderItemStatus,
) -> RepoResult<OrderItem> {
    let sql = format!("{ITEM_SELECT} WHERE oi.id = ? AND s.restaurant_id = ?");
    let row: Option<OrderItemRow> = sqlx::query_as(&sql)
        .bind(order_item_id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await?;
    let mut item = row
        .map(OrderItemRow::into_model)
        .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound).with_detail("order_item_id", order_item_id))?;

    let from = item.status;
    let transition_error = || {
        AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot move order item from {} to {}", from.as_db(), to.as_db()),
        )
    };
    if !from.can_advance_to(to) {
        return Err(transition_error().into());
    }

    // conditional on the status we read, so concurrent updates cannot skip a step
    let result = sqlx::query("UPDATE order_items SET status = ? WHERE id = ? AND status = ?")
        .bind(to.as_db())
        .bind(order_item_id)
        .bind(from.as_db())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(transition_error().into());
    }

    tracing::info!(order_item_id, from = from.as_db(), to = to.as_db(), "Order item status updated");
    item.status = to;
    Ok(item)
}

/// Bill for the live session at a table: items sorted by name, summed.
pub async fn bill(pool: &SqlitePool, restaurant_id: i64, table_number: i64) -> RepoResult<Bill> {
    let sql = format!(
        "{ITEM_SELECT} WHERE s.restaurant_id = ? AND s.table_number = ? ORDER BY m.name, oi.id"
    );
    let rows: Vec<OrderItemRow> = sqlx::query_as(&sql)
        .bind(restaurant_id)
        .bind(table_number)
        .fetch_all(pool)
        .await?;
    if rows.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::NoOrdersForTable,
            format!("No orders for table {table_number}"),
        )
        .into());
    }

    let items: Vec<OrderItem> = rows.into_iter().map(OrderItemRow::into_model).collect();
    let total: Decimal = items.iter().map(|i| i.price).sum();
    Ok(Bill {
        table_number,
        items,
        total,
    })
}
