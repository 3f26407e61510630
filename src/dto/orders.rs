use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cart::CartLine;
use crate::dto::addresses::AddressInput;
use crate::models::Order;
use crate::pricing::Quote;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub address: AddressInput,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    /// Reference the client uses to open the payment widget.
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub breakdown: Quote,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    pub gateway_order_id: String,
    pub payment_reference: String,
    /// The same checkout payload; totals are recomputed server-side and
    /// checked against what the gateway confirmed.
    pub items: Vec<CartLine>,
    pub address: AddressInput,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub save_address: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderPlaced {
    pub order: Order,
    /// False when the address was not saved, e.g. the saved-address cap
    /// was reached.
    pub address_saved: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
