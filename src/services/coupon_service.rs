use std::str::FromStr;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::{
    audit::record_event,
    cart::Cart,
    dto::coupons::{ApplyCouponRequest, ApplyCouponResponse},
    dto::pricing::AppliedCoupon,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Coupon, DiscountType},
    pricing,
    response::{ApiResponse, Meta},
    state::AppState,
    entity::{
        coupons::{Column as CouponCol, Entity as Coupons, Model as CouponModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
};

/// Resolve an entered code against the active coupons and compute the
/// discount it yields for the given subtotal.
///
/// Checks run in the order the user sees them: unknown code, minimum order
/// value, then prior use. Guests skip the prior-use check.
pub async fn validate_coupon(
    state: &AppState,
    code: &str,
    subtotal: i64,
    user: Option<&AuthUser>,
) -> AppResult<(Coupon, i64)> {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(AppError::CouponNotFound);
    }

    let coupon = Coupons::find()
        .filter(CouponCol::Code.eq(normalized))
        .filter(CouponCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::CouponNotFound)?;
    let coupon = coupon_from_entity(coupon)?;

    let discount = pricing::compute_discount(&coupon, subtotal)?;

    if let Some(user) = user {
        let prior_uses = Orders::find()
            .filter(OrderCol::UserId.eq(user.user_id))
            .filter(OrderCol::CouponId.eq(coupon.id))
            .count(&state.orm)
            .await?;
        if prior_uses > 0 {
            return Err(AppError::CouponAlreadyUsed);
        }
    }

    Ok((coupon, discount))
}

/// The explicit "apply" action from the checkout page.
pub async fn apply_coupon(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<ApplyCouponResponse>> {
    let cart = Cart::with_items(payload.items);
    let (coupon, discount) = validate_coupon(state, &payload.code, cart.subtotal(), user).await?;

    let label = pricing::discount_label(&coupon);
    let message = format!("Coupon applied: {label}");

    if let Err(err) = record_event(
        &state.pool,
        user.map(|u| u.user_id),
        "coupon_applied",
        Some(serde_json::json!({ "coupon_id": coupon.id, "discount": discount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon applied",
        ApplyCouponResponse {
            coupon: AppliedCoupon {
                id: coupon.id,
                code: coupon.code,
                label,
            },
            discount,
            message,
        },
        Some(Meta::empty()),
    ))
}

pub fn coupon_from_entity(model: CouponModel) -> AppResult<Coupon> {
    let discount_type = DiscountType::from_str(&model.discount_type)?;
    Ok(Coupon {
        id: model.id,
        code: model.code,
        discount_type,
        discount_value: model.discount_value,
        min_order_value: model.min_order_value,
        max_discount_value: model.max_discount_value,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    })
}
