// ABOUTME: HTTP request handlers for order operations
// ABOUTME: Checkout submission with a time bound, history, linking, listing and status updates

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::{Deserialize, Serialize};
use storefront_core::{OrderStatus, OrderSubmission, PaymentStatus};
use storefront_orders::{OrderError, OrderFilter, OrderReceipt};
use tracing::{info, warn};

use crate::auth::SessionIdentity;
use crate::body::JsonBody;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::response::{error_response, ok, ApiOrderError};
use crate::state::AppState;

/// Body returned to the checkout UI after a successful submission
#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    #[serde(flatten)]
    pub receipt: OrderReceipt,
}

/// Create an order from a checkout submission
pub async fn create_order(
    State(state): State<AppState>,
    SessionIdentity(identity): SessionIdentity,
    JsonBody(submission): JsonBody<OrderSubmission>,
) -> Response {
    info!(
        "Creating order (token: {:?}, {} item(s))",
        submission.order_id,
        submission.items.len()
    );

    // Dropping the submission future on timeout rolls back its open transaction
    let result = match tokio::time::timeout(
        state.submit_timeout,
        state.order_writer.submit(&submission, &identity),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "Order submission timed out after {:?} (token: {:?})",
                state.submit_timeout, submission.order_id
            );
            Err(OrderError::RequestTimeout)
        }
    };

    match result {
        Ok(receipt) => (
            StatusCode::OK,
            ResponseJson(CreateOrderResponse {
                success: true,
                receipt,
            }),
        )
            .into_response(),
        Err(e) => ApiOrderError(e).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List orders for the admin and history views
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Response {
    info!("Listing orders: {:?}", query);

    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<OrderStatus>() {
            Ok(status) => Some(status),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
        None => None,
    };

    let filter = OrderFilter {
        user_id: query.user_id,
        email: query.email,
        status,
        search: query.search,
    };
    let params = PaginationParams::new(query.page, query.limit);

    match state
        .order_storage
        .list_orders(&filter, Some(params.limit()), Some(params.offset()))
        .await
    {
        Ok((orders, total)) => ok(PaginatedResponse::new(orders, &params, total)),
        Err(e) => ApiOrderError(e).into_response(),
    }
}

/// Order history for the signed-in customer or guest session
pub async fn my_orders(
    State(state): State<AppState>,
    SessionIdentity(identity): SessionIdentity,
) -> Response {
    if identity.is_anonymous() {
        return error_response(StatusCode::UNAUTHORIZED, "Sign in to view your orders");
    }
    info!(
        "Fetching order history (user: {:?}, email: {:?})",
        identity.user_id, identity.email
    );

    match state.status_machine.get_orders_for_user(&identity).await {
        Ok(orders) => ok(orders),
        Err(e) => ApiOrderError(e).into_response(),
    }
}

#[derive(Serialize)]
pub struct LinkOrdersResponse {
    pub linked: u64,
}

/// Attach guest orders placed under the account's email to the signed-in user
pub async fn link_my_orders(
    State(state): State<AppState>,
    SessionIdentity(identity): SessionIdentity,
) -> Response {
    let Some(user_id) = identity.user_id else {
        return error_response(StatusCode::UNAUTHORIZED, "Sign in to link your orders");
    };
    info!("Linking guest orders for user {}", user_id);

    match state.order_storage.link_orders_to_user(&user_id).await {
        Ok(linked) => ok(LinkOrdersResponse { linked }),
        Err(e) => ApiOrderError(e).into_response(),
    }
}

/// Get a single order with its items
pub async fn get_order(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    info!("Getting order: {}", order_id);

    match state.order_storage.get_order(&order_id).await {
        Ok(order) => ok(order),
        Err(e) => ApiOrderError(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Move an order through its lifecycle
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    JsonBody(request): JsonBody<UpdateStatusRequest>,
) -> Response {
    info!("Updating order {} status to {}", order_id, request.status);

    let target = match request.status.parse::<OrderStatus>() {
        Ok(status) => status,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.status_machine.transition(&order_id, target).await {
        Ok(order) => ok(order),
        Err(e) => ApiOrderError(e).into_response(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub payment_status: String,
}

/// Record a payment confirmation outcome
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    JsonBody(request): JsonBody<UpdatePaymentRequest>,
) -> Response {
    info!(
        "Updating order {} payment status to {}",
        order_id, request.payment_status
    );

    let payment_status = match request.payment_status.parse::<PaymentStatus>() {
        Ok(status) => status,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state
        .status_machine
        .update_payment_status(&order_id, payment_status)
        .await
    {
        Ok(order) => ok(order),
        Err(e) => ApiOrderError(e).into_response(),
    }
}
