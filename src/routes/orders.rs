use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CheckoutRequest, CheckoutResponse, ConfirmPaymentRequest, OrderList, OrderPlaced,
    },
    error::AppResult,
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/payment/confirm", post(confirm_payment))
        .route("/{id}", get(get_order))
}

#[utoipa::path(get, path = "/api/orders", security(("bearer_auth" = [])), tag = "Orders")]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let response = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Gateway order opened for the payable total", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart, invalid address or coupon"),
        (status = 502, description = "Payment initiation failed"),
    ),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let response = order_service::checkout(&state, user.as_ref(), payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/orders/payment/confirm",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Order recorded", body = ApiResponse<OrderPlaced>),
        (status = 402, description = "Payment not confirmed"),
        (status = 500, description = "Payment received but order not recorded"),
    ),
    tag = "Orders"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<ApiResponse<OrderPlaced>>> {
    let response = order_service::confirm_payment(&state, user.as_ref(), payload).await?;
    Ok(Json(response))
}

#[utoipa::path(get, path = "/api/orders/{id}", security(("bearer_auth" = [])), tag = "Orders")]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let response = order_service::get_order(&state, &user, id).await?;
    Ok(Json(response))
}
