use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cart::CartLine;
use crate::dto::pricing::AppliedCoupon;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyCouponRequest {
    pub code: String,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyCouponResponse {
    pub coupon: AppliedCoupon,
    pub discount: i64,
    /// Success message naming the coupon's effective reduction.
    pub message: String,
}
