// ABOUTME: HTTP request handlers for catalog products
// ABOUTME: Product listing and lookup for the storefront, plus create/update for seeding

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Deserialize;
use storefront_catalog::{ProductCreateInput, ProductUpdateInput};
use tracing::info;

use crate::body::JsonBody;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::response::{ok, ApiResponse, ApiStorageError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    #[serde(default)]
    pub include_inactive: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List products, active only unless asked otherwise
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Response {
    info!("Listing products: {:?}", query);

    let params = PaginationParams::new(query.page, query.limit);
    match state
        .product_storage
        .list_products_paginated(
            query.include_inactive,
            Some(params.limit()),
            Some(params.offset()),
        )
        .await
    {
        Ok((products, total)) => ok(PaginatedResponse::new(products, &params, total)),
        Err(e) => ApiStorageError(e).into_response(),
    }
}

/// Get a single product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Response {
    info!("Getting product: {}", product_id);

    match state.product_storage.get_product(&product_id).await {
        Ok(product) => ok(product),
        Err(e) => ApiStorageError(e).into_response(),
    }
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProductCreateInput>,
) -> Response {
    info!("Creating product: {}", input.name);

    match state.product_storage.create_product(input).await {
        Ok(product) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(product)),
        )
            .into_response(),
        Err(e) => ApiStorageError(e).into_response(),
    }
}

/// Update a product's price, stock, availability or description
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    JsonBody(input): JsonBody<ProductUpdateInput>,
) -> Response {
    info!("Updating product: {}", product_id);

    match state.product_storage.update_product(&product_id, input).await {
        Ok(product) => ok(product),
        Err(e) => ApiStorageError(e).into_response(),
    }
}
