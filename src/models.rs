use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl std::str::FromStr for DiscountType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(anyhow::anyhow!("unknown discount type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    /// Stored upper-case; entered codes are normalized before lookup.
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_order_value: i64,
    /// Only honored for percentage coupons.
    pub max_discount_value: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingRate {
    pub id: Uuid,
    pub state: String,
    pub charge: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    /// None for guest checkouts.
    pub user_id: Option<Uuid>,
    pub order_reference: String,
    pub total_amount: i64,
    pub status: String,
    pub payment_status: String,
    pub payment_reference: String,
    /// Snapshot of the shipping address at the time the order was placed.
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
    pub coupon_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
