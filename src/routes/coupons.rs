use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::coupons::{ApplyCouponRequest, ApplyCouponResponse},
    error::AppResult,
    middleware::auth::OptionalAuthUser,
    response::ApiResponse,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/apply", post(apply_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons/apply",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Coupon applied", body = ApiResponse<ApplyCouponResponse>),
        (status = 400, description = "Unknown code or minimum order not met"),
        (status = 409, description = "Coupon already used"),
    ),
    tag = "Coupons"
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<ApiResponse<ApplyCouponResponse>>> {
    let response = coupon_service::apply_coupon(&state, user.as_ref(), payload).await?;
    Ok(Json(response))
}
