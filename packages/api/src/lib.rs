// ABOUTME: HTTP API layer for Storefront providing REST endpoints and routing
// ABOUTME: Integration layer over the catalog, order and identity packages

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod body;
pub mod health;
pub mod orders_handlers;
pub mod pagination;
pub mod products_handlers;
pub mod response;
pub mod state;
pub mod users_handlers;

pub use state::{ApiSettings, AppState};

/// Creates the orders API router (nested under /api/orders)
pub fn create_orders_router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders_handlers::list_orders))
        .route("/", post(orders_handlers::create_order))
        .route("/mine", get(orders_handlers::my_orders))
        .route("/link", post(orders_handlers::link_my_orders))
        .route("/{order_id}", get(orders_handlers::get_order))
        .route("/{order_id}", put(orders_handlers::update_order_status))
        .route(
            "/{order_id}/payment",
            put(orders_handlers::update_payment_status),
        )
}

/// Creates the products API router (nested under /api/products)
pub fn create_products_router() -> Router<AppState> {
    Router::new()
        .route("/", get(products_handlers::list_products))
        .route("/", post(products_handlers::create_product))
        .route("/{product_id}", get(products_handlers::get_product))
        .route("/{product_id}", put(products_handlers::update_product))
}

/// Creates the users API router (nested under /api/users)
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(users_handlers::create_user))
        .route("/{user_id}", get(users_handlers::get_user))
}

/// Full application router with state attached
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/orders", create_orders_router())
        .nest("/api/products", create_products_router())
        .nest("/api/users", create_users_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
