use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::pricing::{QuoteRequest, QuoteResponse, ShippingRateList},
    error::AppResult,
    middleware::auth::OptionalAuthUser,
    response::ApiResponse,
    services::pricing_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(quote))
        .route("/shipping-rates", get(list_shipping_rates))
}

#[utoipa::path(
    post,
    path = "/api/pricing/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Price breakdown for the cart", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Invalid cart or coupon"),
    ),
    tag = "Pricing"
)]
pub async fn quote(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<ApiResponse<QuoteResponse>>> {
    let response = pricing_service::quote(&state, user.as_ref(), payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/pricing/shipping-rates",
    responses(
        (status = 200, description = "Active shipping rates by state", body = ApiResponse<ShippingRateList>),
    ),
    tag = "Pricing"
)]
pub async fn list_shipping_rates(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ShippingRateList>>> {
    let response = pricing_service::list_shipping_rates(&state).await?;
    Ok(Json(response))
}
