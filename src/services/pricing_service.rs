use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    cart::Cart,
    dto::pricing::{AppliedCoupon, QuoteRequest, QuoteResponse, ShippingRateList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Coupon, ShippingRate},
    pricing,
    response::{ApiResponse, Meta},
    services::coupon_service,
    state::AppState,
    entity::shipping_rates::{
        Column as RateCol, Entity as ShippingRates, Model as RateModel,
    },
};

pub struct QuoteOutcome {
    pub quote: pricing::Quote,
    pub coupon: Option<Coupon>,
}

/// Compute the full price breakdown for a cart, destination state and
/// optional coupon code. This is the one place the three inputs meet; any
/// of them changing means the caller re-quotes.
pub async fn build_quote(
    state: &AppState,
    cart: &Cart,
    destination_state: Option<&str>,
    coupon_code: Option<&str>,
    user: Option<&AuthUser>,
) -> AppResult<QuoteOutcome> {
    pricing::validate_cart(cart)?;

    let subtotal = cart.subtotal();

    let matched_rate = if cart.is_empty() {
        None
    } else {
        resolve_shipping_rate(state, destination_state).await?
    };
    let shipping_cost = pricing::shipping_cost(cart, matched_rate);

    let (coupon, discount) = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => {
            let (coupon, discount) =
                coupon_service::validate_coupon(state, code, subtotal, user).await?;
            (Some(coupon), discount)
        }
        None => (None, 0),
    };

    Ok(QuoteOutcome {
        quote: pricing::quote(subtotal, shipping_cost, discount),
        coupon,
    })
}

/// Charge of the active rate matching the destination state exactly, if any.
/// The match is case-sensitive, as the rate table is keyed.
async fn resolve_shipping_rate(
    state: &AppState,
    destination_state: Option<&str>,
) -> AppResult<Option<i64>> {
    let destination = match destination_state.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => return Ok(None),
    };

    let rate = ShippingRates::find()
        .filter(RateCol::State.eq(destination))
        .filter(RateCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;

    Ok(rate.map(|r| r.charge))
}

/// Active rates, for the destination-state picker on the checkout page.
pub async fn list_shipping_rates(state: &AppState) -> AppResult<ApiResponse<ShippingRateList>> {
    let items = ShippingRates::find()
        .filter(RateCol::IsActive.eq(true))
        .order_by_asc(RateCol::State)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(rate_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        ShippingRateList { items },
        Some(Meta::empty()),
    ))
}

fn rate_from_entity(model: RateModel) -> ShippingRate {
    ShippingRate {
        id: model.id,
        state: model.state,
        charge: model.charge,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub async fn quote(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: QuoteRequest,
) -> AppResult<ApiResponse<QuoteResponse>> {
    let cart = Cart::with_items(payload.items);
    let outcome = build_quote(
        state,
        &cart,
        payload.state.as_deref(),
        payload.coupon_code.as_deref(),
        user,
    )
    .await?;

    let applied_coupon = outcome.coupon.map(|coupon| AppliedCoupon {
        label: pricing::discount_label(&coupon),
        id: coupon.id,
        code: coupon.code,
    });

    Ok(ApiResponse::success(
        "OK",
        QuoteResponse {
            quote: outcome.quote,
            applied_coupon,
        },
        Some(Meta::empty()),
    ))
}
