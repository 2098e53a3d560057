//! Restaurant payouts through Stripe Connect

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderItem;
use shared::util::to_cents;

use crate::auth::{Principal, StaffContext};
use crate::db;
use crate::state::AppState;
use crate::stripe::CheckoutLine;

use super::{ApiResult, customer_session};

#[derive(Debug, Serialize)]
pub struct PayoutAccount {
    pub account_id: String,
}

#[derive(Debug, Serialize)]
pub struct PayoutAccountStatus {
    pub account_id: String,
    pub details_submitted: bool,
}

#[derive(Debug, Serialize)]
pub struct RedirectUrl {
    pub url: String,
}

fn provider_error(context: &str, e: crate::BoxError) -> AppError {
    tracing::error!(error = %e, "{context} failed");
    AppError::with_message(ErrorCode::PaymentProviderError, format!("{context} failed"))
}

async fn stored_account(state: &AppState, manager: &StaffContext) -> Result<String, AppError> {
    db::payout_accounts::find(&state.pool, manager.staff_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PayoutAccountNotFound))
}

/// Group billed units into one checkout line per menu item.
pub fn checkout_lines(items: &[OrderItem]) -> Result<Vec<CheckoutLine>, AppError> {
    let mut lines: BTreeMap<i64, CheckoutLine> = BTreeMap::new();
    for item in items {
        let unit_amount = to_cents(item.price)
            .ok_or_else(|| AppError::with_message(ErrorCode::MenuItemInvalidPrice, "Price out of range"))?;
        lines
            .entry(item.menu_item_id)
            .or_insert_with(|| CheckoutLine {
                name: item.menu_item_name.clone(),
                unit_amount,
                quantity: 0,
            })
            .quantity += 1;
    }
    Ok(lines.into_values().collect())
}

/// POST /api/payouts/account (manager)
///
/// Returns the existing account when one is already stored.
pub async fn create_account(State(state): State<AppState>, principal: Principal) -> ApiResult<PayoutAccount> {
    let manager = principal.require_manager()?;
    if let Some(account_id) = db::payout_accounts::find(&state.pool, manager.staff_id).await? {
        return Ok(Json(PayoutAccount { account_id }));
    }

    let record = db::staff::find(&state.pool, manager.staff_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StaffNotFound))?;
    let created = state
        .payments
        .create_account(&record.email)
        .await
        .map_err(|e| provider_error("Creating payout account", e))?;
    let account_id =
        db::payout_accounts::insert_if_absent(&state.pool, manager.staff_id, &created).await?;

    tracing::info!(staff_id = manager.staff_id, account_id = %account_id, "Payout account created");
    Ok(Json(PayoutAccount { account_id }))
}

/// GET /api/payouts/account (manager)
pub async fn account_status(State(state): State<AppState>, principal: Principal) -> ApiResult<PayoutAccountStatus> {
    let manager = principal.require_manager()?;
    let account_id = stored_account(&state, manager).await?;
    let details_submitted = state
        .payments
        .details_submitted(&account_id)
        .await
        .map_err(|e| provider_error("Fetching payout account", e))?;
    Ok(Json(PayoutAccountStatus {
        account_id,
        details_submitted,
    }))
}

/// POST /api/payouts/onboarding (manager)
pub async fn onboarding_link(State(state): State<AppState>, principal: Principal) -> ApiResult<RedirectUrl> {
    let manager = principal.require_manager()?;
    let account_id = stored_account(&state, manager).await?;
    let url = state
        .payments
        .onboarding_link(&account_id)
        .await
        .map_err(|e| provider_error("Creating onboarding link", e))?;
    Ok(Json(RedirectUrl { url }))
}

/// POST /api/payouts/checkout (customer): pay the table's bill
pub async fn checkout(State(state): State<AppState>, principal: Principal) -> ApiResult<RedirectUrl> {
    let token = principal.require_customer()?;
    let session = customer_session(&state, token).await?;

    let account_id = db::payout_accounts::find_for_restaurant(&state.pool, session.restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PayoutAccountNotFound))?;
    let bill = db::orders::bill(&state.pool, session.restaurant_id, session.table_number).await?;
    let lines = checkout_lines(&bill.items)?;

    let url = state
        .payments
        .create_checkout(&account_id, &lines)
        .await
        .map_err(|e| provider_error("Creating checkout session", e))?;

    tracing::info!(
        restaurant_id = session.restaurant_id,
        table_number = session.table_number,
        lines = lines.len(),
        "Checkout session created"
    );
    Ok(Json(RedirectUrl { url }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::OrderItemStatus;
    use std::str::FromStr;

    fn unit(id: i64, menu_item_id: i64, name: &str, price: &str) -> OrderItem {
        OrderItem {
            id,
            order_id: 1,
            menu_item_id,
            menu_item_name: name.to_string(),
            price: Decimal::from_str(price).unwrap(),
            status: OrderItemStatus::Served,
            table_number: 1,
        }
    }

    #[test]
    fn test_checkout_lines_count_units() {
        let items = vec![
            unit(1, 5, "Soup", "8.50"),
            unit(2, 2, "Bread", "3.25"),
            unit(3, 5, "Soup", "8.50"),
        ];
        let lines = checkout_lines(&items).unwrap();
        assert_eq!(
            lines,
            vec![
                CheckoutLine {
                    name: "Bread".to_string(),
                    unit_amount: 325,
                    quantity: 1
                },
                CheckoutLine {
                    name: "Soup".to_string(),
                    unit_amount: 850,
                    quantity: 2
                },
            ]
        );
    }
}
