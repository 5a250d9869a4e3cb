use axum::{
    extract::{Path, State},
    Json,
};
use merx_catalog::pricing::price_with_vat;
use merx_core::cache::CacheRegion;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub region: String,
    pub base_price: Decimal,
    pub vat_percentage: Decimal,
    pub vat_amount: Decimal,
    pub final_price: Decimal,
}

/// GET /v1/products/{id}/price
/// VAT-inclusive price for one unit, served read-through from the price
/// cache. The reported VAT amount is derived from the rounded final price,
/// so `base_price + vat_amount == final_price` holds in every response.
pub async fn get_price(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<PriceResponse>, AppError> {
    let cache_key = product_id.to_string();

    if let Ok(Some(cached)) = state.cache.get(CacheRegion::ProductPrice, &cache_key).await {
        if let Ok(response) = serde_json::from_str::<PriceResponse>(&cached) {
            return Ok(Json(response));
        }
    }

    let product = state
        .products
        .get_product(product_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            AppError::not_found("PRODUCT_NOT_FOUND", format!("product not found: {product_id}"))
        })?;

    let vat_percentage = state
        .region_pricing
        .vat_rate(&product.region)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            AppError::not_found(
                "REGION_PRICING_CONFIG_NOT_FOUND",
                format!("pricing configuration not found for region: {}", product.region),
            )
        })?;

    let quote = price_with_vat(product.price, vat_percentage)
        .map_err(|e| AppError::bad_request("INVALID_PRICING_INPUT", e.to_string()))?;

    let response = PriceResponse {
        product_id: product.id,
        product_name: product.name,
        region: product.region,
        base_price: product.price,
        vat_percentage,
        vat_amount: quote.vat_amount,
        final_price: quote.final_price,
    };

    if let Ok(serialized) = serde_json::to_string(&response) {
        let _ = state
            .cache
            .put(CacheRegion::ProductPrice, &cache_key, &serialized)
            .await;
    }

    Ok(Json(response))
}
