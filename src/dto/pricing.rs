use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::CartLine;
use crate::models::ShippingRate;
use crate::pricing::Quote;

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub items: Vec<CartLine>,
    /// Destination state; unknown or empty falls back to the default charge.
    pub state: Option<String>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppliedCoupon {
    pub id: Uuid,
    pub code: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShippingRateList {
    pub items: Vec<ShippingRate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: Quote,
    pub applied_coupon: Option<AppliedCoupon>,
}
