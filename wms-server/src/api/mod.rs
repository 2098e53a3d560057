//! HTTP API
//!
//! Every handler resolves a [`Principal`] from the request and scopes its
//! work to the caller's restaurant: a staff member's own restaurant, or the
//! restaurant of the customer's live session.

pub mod assistance;
pub mod auth;
pub mod billing;
pub mod categories;
pub mod health;
pub mod menu_items;
pub mod orders;
pub mod payouts;
pub mod restaurant;
pub mod sessions;
pub mod staff;
pub mod tables;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use shared::error::AppError;
use shared::models::CustomerSession;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::rate_limit::{login_rate_limit, password_reset_rate_limit, register_rate_limit};
use crate::auth::{Principal, SessionToken};
use crate::db;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// The live session behind a customer token
pub(crate) async fn customer_session(state: &AppState, token: &SessionToken) -> Result<CustomerSession, AppError> {
    Ok(db::sessions::get_by_token(&state.pool, token.as_str()).await?)
}

/// Restaurant the caller acts within
pub(crate) async fn restaurant_scope(state: &AppState, principal: &Principal) -> Result<i64, AppError> {
    match principal {
        Principal::Staff(staff) => Ok(staff.restaurant_id),
        Principal::Customer(token) => Ok(customer_session(state, token).await?.restaurant_id),
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let login = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let register = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route_layer(middleware::from_fn_with_state(state.clone(), register_rate_limit));

    let password_reset = Router::new()
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            password_reset_rate_limit,
        ));

    let api = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        // Restaurant and staff
        .route("/api/restaurants/lookup", get(restaurant::lookup))
        .route("/api/restaurant", get(restaurant::details))
        .route("/api/staff", post(staff::create).get(staff::list))
        // Tables
        .route("/api/tables", get(tables::list).post(tables::add))
        .route("/api/tables/{number}", delete(tables::remove))
        // Menu
        .route("/api/categories", get(categories::list).post(categories::create))
        .route("/api/categories/positions", put(categories::reposition))
        .route(
            "/api/categories/{id}",
            get(categories::get_one)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/api/menu-items", get(menu_items::list).post(menu_items::create))
        .route("/api/menu-items/positions", put(menu_items::reposition))
        .route(
            "/api/menu-items/{id}",
            get(menu_items::get_one)
                .put(menu_items::update)
                .delete(menu_items::remove),
        )
        // Sessions and assistance
        .route(
            "/api/session",
            post(sessions::claim)
                .get(sessions::status)
                .delete(sessions::release),
        )
        .route("/api/sessions/{table}", delete(sessions::force_release))
        .route(
            "/api/assistance",
            post(assistance::request).get(assistance::list),
        )
        .route("/api/assistance/{table}/toggle", post(assistance::toggle))
        .route("/api/assistance/{table}", delete(assistance::clear))
        // Orders and billing
        .route("/api/orders", post(orders::place).get(orders::list))
        .route("/api/orders/all", get(orders::list_all))
        .route("/api/order-items", get(orders::list_items))
        .route("/api/order-items/{id}/status", put(orders::update_status))
        .route("/api/bill", get(billing::bill))
        .route("/api/bill/{table}", get(billing::staff_bill))
        // Payouts
        .route(
            "/api/payouts/account",
            post(payouts::create_account).get(payouts::account_status),
        )
        .route("/api/payouts/onboarding", post(payouts::onboarding_link))
        .route("/api/payouts/checkout", post(payouts::checkout));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(login)
        .merge(register)
        .merge(password_reset)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
