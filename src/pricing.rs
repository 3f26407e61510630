//! Checkout pricing rules: subtotal, shipping resolution, coupon discounts
//! and the grand total. Everything here is a pure function of its inputs so
//! the rules stay unit-testable away from the database and the HTTP layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::Cart,
    error::{AppError, AppResult},
    models::{Coupon, DiscountType},
};

/// Flat charge applied when the destination state is unknown or has no
/// active shipping rate.
pub const DEFAULT_SHIPPING_CHARGE: i64 = 150;

/// Upper bounds on client-supplied cart lines. Together with the request
/// body limit they keep every subtotal far inside `i64` range.
pub const MAX_ITEM_PRICE: i64 = 1_000_000;
pub const MAX_ITEM_QUANTITY: i32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Quote {
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub discount: i64,
    pub total: i64,
}

/// Reject carts with out-of-range lines before any price is computed.
pub fn validate_cart(cart: &Cart) -> AppResult<()> {
    for line in cart.items() {
        if line.quantity <= 0 || line.quantity > MAX_ITEM_QUANTITY {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if line.price <= 0 || line.price > MAX_ITEM_PRICE {
            return Err(AppError::BadRequest("Cart has invalid price".into()));
        }
    }
    Ok(())
}

/// Shipping for an empty cart is always zero: nothing ships. Otherwise the
/// matched rate applies, falling back to the flat default charge.
pub fn shipping_cost(cart: &Cart, matched_rate: Option<i64>) -> i64 {
    if cart.is_empty() {
        return 0;
    }
    matched_rate.unwrap_or(DEFAULT_SHIPPING_CHARGE)
}

/// Discount for a resolved coupon against the current subtotal.
///
/// Fails with `MinOrderNotMet` below the coupon's minimum order value.
/// The discount never exceeds the subtotal; percentage coupons are further
/// capped at their configured maximum discount when one is set.
pub fn compute_discount(coupon: &Coupon, subtotal: i64) -> AppResult<i64> {
    if subtotal < coupon.min_order_value {
        return Err(AppError::MinOrderNotMet {
            min_order_value: coupon.min_order_value,
        });
    }

    let raw = match coupon.discount_type {
        // The product is widened so no subtotal within i64 can overflow it;
        // the subtotal cap brings the result back into range.
        DiscountType::Percentage => {
            (subtotal as i128 * coupon.discount_value as i128 / 100).min(subtotal as i128) as i64
        }
        DiscountType::Fixed => coupon.discount_value,
    };

    let mut discount = raw.min(subtotal);
    if coupon.discount_type == DiscountType::Percentage {
        if let Some(max) = coupon.max_discount_value {
            discount = discount.min(max);
        }
    }

    Ok(discount)
}

/// Grand total, never negative. Saturating, for the same reason the cart
/// subtotal is.
pub fn compute_total(subtotal: i64, shipping_cost: i64, discount: i64) -> i64 {
    subtotal
        .saturating_add(shipping_cost)
        .saturating_sub(discount)
        .max(0)
}

pub fn quote(subtotal: i64, shipping_cost: i64, discount: i64) -> Quote {
    Quote {
        subtotal,
        shipping_cost,
        discount,
        total: compute_total(subtotal, shipping_cost, discount),
    }
}

/// User-facing description of what a coupon takes off, e.g. "10% Off" or
/// "₹50 Off".
pub fn discount_label(coupon: &Coupon) -> String {
    match coupon.discount_type {
        DiscountType::Percentage => format!("{}% Off", coupon.discount_value),
        DiscountType::Fixed => format!("₹{} Off", coupon.discount_value),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::cart::CartLine;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "TEST".into(),
            discount_type,
            discount_value: value,
            min_order_value: 0,
            max_discount_value: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn cart_of(price: i64, quantity: i32) -> Cart {
        Cart::with_items(vec![CartLine {
            product_id: Uuid::new_v4(),
            name: "Kesar Box".into(),
            price,
            quantity,
            image_url: None,
        }])
    }

    #[test]
    fn shipping_is_zero_for_empty_cart() {
        assert_eq!(shipping_cost(&Cart::new(), Some(80)), 0);
        assert_eq!(shipping_cost(&Cart::new(), None), 0);
    }

    #[test]
    fn shipping_falls_back_to_default_without_a_match() {
        assert_eq!(shipping_cost(&cart_of(500, 1), None), DEFAULT_SHIPPING_CHARGE);
    }

    #[test]
    fn shipping_uses_matched_rate() {
        // Tamil Nadu carries an active rate of 80.
        assert_eq!(shipping_cost(&cart_of(500, 1), Some(80)), 80);
    }

    #[test]
    fn percentage_discount_capped_at_max() {
        let mut c = coupon(DiscountType::Percentage, 10);
        c.max_discount_value = Some(40);
        // 10% of 500 is 50, capped to 40.
        assert_eq!(compute_discount(&c, 500).unwrap(), 40);
    }

    #[test]
    fn percentage_discount_without_max() {
        let c = coupon(DiscountType::Percentage, 10);
        assert_eq!(compute_discount(&c, 500).unwrap(), 50);
    }

    #[test]
    fn fixed_discount_capped_at_subtotal() {
        let c = coupon(DiscountType::Fixed, 400);
        assert_eq!(compute_discount(&c, 300).unwrap(), 300);
    }

    #[test]
    fn fixed_discount_below_subtotal_is_flat() {
        let c = coupon(DiscountType::Fixed, 50);
        assert_eq!(compute_discount(&c, 300).unwrap(), 50);
    }

    #[test]
    fn min_order_not_met_is_rejected() {
        let mut c = coupon(DiscountType::Percentage, 10);
        c.min_order_value = 100;
        let err = compute_discount(&c, 80).unwrap_err();
        assert!(matches!(
            err,
            AppError::MinOrderNotMet { min_order_value: 100 }
        ));
    }

    #[test]
    fn min_order_exactly_met_is_accepted() {
        let mut c = coupon(DiscountType::Fixed, 20);
        c.min_order_value = 100;
        assert_eq!(compute_discount(&c, 100).unwrap(), 20);
    }

    #[test]
    fn carts_with_out_of_range_lines_are_rejected() {
        let too_expensive = cart_of(MAX_ITEM_PRICE + 1, 1);
        assert!(matches!(
            validate_cart(&too_expensive),
            Err(AppError::BadRequest(_))
        ));

        let too_many = cart_of(500, MAX_ITEM_QUANTITY + 1);
        assert!(matches!(
            validate_cart(&too_many),
            Err(AppError::BadRequest(_))
        ));

        let negative = cart_of(-1, 1);
        assert!(matches!(validate_cart(&negative), Err(AppError::BadRequest(_))));

        assert!(validate_cart(&cart_of(MAX_ITEM_PRICE, MAX_ITEM_QUANTITY)).is_ok());
        assert!(validate_cart(&Cart::new()).is_ok());
    }

    #[test]
    fn percentage_discount_on_huge_subtotal_does_not_overflow() {
        let c = coupon(DiscountType::Percentage, 100);
        let subtotal = i64::MAX / 2;
        assert_eq!(compute_discount(&c, subtotal).unwrap(), subtotal);
    }

    #[test]
    fn total_is_subtotal_plus_shipping_minus_discount() {
        assert_eq!(compute_total(500, 150, 40), 610);
        assert_eq!(compute_total(500, 0, 0), 500);
    }

    #[test]
    fn total_never_goes_negative() {
        assert_eq!(compute_total(100, 0, 400), 0);
    }

    #[test]
    fn total_saturates_on_extreme_inputs() {
        assert_eq!(compute_total(i64::MAX, i64::MAX, 0), i64::MAX);
        assert_eq!(compute_total(0, 0, i64::MAX), 0);
    }

    #[test]
    fn removing_a_coupon_restores_the_pre_coupon_total() {
        let with_coupon = compute_total(500, 80, 40);
        let without = compute_total(500, 80, 0);
        assert_eq!(with_coupon, 540);
        assert_eq!(without, 580);
        assert_eq!(without, 500 + 80);
    }

    #[test]
    fn quote_bundles_the_breakdown() {
        let q = quote(500, 150, 40);
        assert_eq!(
            q,
            Quote {
                subtotal: 500,
                shipping_cost: 150,
                discount: 40,
                total: 610,
            }
        );
    }

    #[test]
    fn labels_for_both_discount_types() {
        assert_eq!(
            discount_label(&coupon(DiscountType::Percentage, 10)),
            "10% Off"
        );
        assert_eq!(discount_label(&coupon(DiscountType::Fixed, 50)), "₹50 Off");
    }
}
