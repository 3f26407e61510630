use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::record_event,
    cart::Cart,
    dto::orders::{
        CheckoutRequest, CheckoutResponse, ConfirmPaymentRequest, OrderList, OrderPlaced,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{address_service, pricing_service},
    state::AppState,
    entity::orders::{
        ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
    },
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Validate the payload, recompute the quote server-side and open a gateway
/// order for the payable total. No order row is written here; that only
/// happens once the payment is confirmed.
pub async fn checkout(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let cart = Cart::with_items(payload.items);
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    address_service::validate_address(&payload.address)?;

    let outcome = pricing_service::build_quote(
        state,
        &cart,
        Some(payload.address.state.as_str()),
        payload.coupon_code.as_deref(),
        user,
    )
    .await?;

    let gateway_order = state
        .gateway
        .create_order(outcome.quote.total, &state.currency)
        .await
        .map_err(|err| AppError::PaymentInitiationFailed(err.to_string()))?;

    if let Err(err) = record_event(
        &state.pool,
        user.map(|u| u.user_id),
        "checkout_initiated",
        Some(serde_json::json!({
            "gateway_order_id": gateway_order.id,
            "amount": gateway_order.amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout initiated",
        CheckoutResponse {
            gateway_order_id: gateway_order.id,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            breakdown: outcome.quote,
        },
        Some(Meta::empty()),
    ))
}

/// Handle the payment-success callback: verify the payment with the gateway,
/// then persist the order. The coupon-usage check and the insert run in one
/// transaction, and the orders table carries a unique (user, coupon) index,
/// so a coupon cannot be used twice even under concurrent checkouts.
pub async fn confirm_payment(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: ConfirmPaymentRequest,
) -> AppResult<ApiResponse<OrderPlaced>> {
    let cart = Cart::with_items(payload.items.clone());
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    address_service::validate_address(&payload.address)?;

    let confirmation = state
        .gateway
        .confirm_payment(&payload.gateway_order_id, &payload.payment_reference)
        .await
        .map_err(|err| AppError::PaymentNotConfirmed(err.to_string()))?;

    // Money has moved past this point. Failures below must surface the
    // support-contact condition, never a coupon error: a coupon that was
    // claimed or deactivated since the widget took payment is still an
    // unrecorded paid order.
    let outcome = pricing_service::build_quote(
        state,
        &cart,
        Some(payload.address.state.as_str()),
        payload.coupon_code.as_deref(),
        user,
    )
    .await
    .map_err(|err| fail_after_payment(err, &confirmation.payment_reference))?;

    if confirmation.amount != outcome.quote.total {
        return Err(AppError::PaymentNotConfirmed(format!(
            "confirmed amount {} does not match order total {}",
            confirmation.amount, outcome.quote.total
        )));
    }

    let order = persist_order(state, user, &payload, &outcome, &confirmation.payment_reference)
        .await
        .map_err(|err| fail_after_payment(err, &confirmation.payment_reference))?;

    let mut address_saved = false;
    if payload.save_address {
        if let Some(user) = user {
            match address_service::save_address(state, user, payload.address.clone()).await {
                Ok(_) => address_saved = true,
                Err(err) => {
                    // The order is already placed; a failed save must not
                    // undo it. Surface the outcome instead of hiding it.
                    tracing::warn!(error = %err, "address not saved during checkout");
                }
            }
        }
    }

    if let Err(err) = record_event(
        &state.pool,
        user.map(|u| u.user_id),
        "order_created",
        Some(serde_json::json!({
            "order_id": order.id,
            "total_amount": order.total_amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderPlaced {
            order,
            address_saved,
        },
        Some(Meta::empty()),
    ))
}

/// Everything that goes wrong between a confirmed payment and a committed
/// order row collapses into `OrderPersistenceFailed`, with the payment
/// reference logged for support.
fn fail_after_payment(err: AppError, payment_reference: &str) -> AppError {
    tracing::error!(
        error = %err,
        payment_reference = %payment_reference,
        "order could not be recorded after confirmed payment"
    );
    AppError::OrderPersistenceFailed
}

async fn persist_order(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: &ConfirmPaymentRequest,
    outcome: &pricing_service::QuoteOutcome,
    payment_reference: &str,
) -> AppResult<Order> {
    let txn = state.orm.begin().await?;

    // Recheck inside the transaction; the unique index is the backstop.
    if let (Some(user), Some(coupon)) = (user, outcome.coupon.as_ref()) {
        let prior_uses = Orders::find()
            .filter(OrderCol::UserId.eq(user.user_id))
            .filter(OrderCol::CouponId.eq(coupon.id))
            .count(&txn)
            .await?;
        if prior_uses > 0 {
            return Err(AppError::CouponAlreadyUsed);
        }
    }

    let order_id = Uuid::new_v4();
    let order_reference = build_order_reference(order_id);

    let inserted = OrderActive {
        id: Set(order_id),
        user_id: Set(user.map(|u| u.user_id)),
        order_reference: Set(order_reference),
        total_amount: Set(outcome.quote.total),
        status: Set("placed".into()),
        payment_status: Set("paid".into()),
        payment_reference: Set(payment_reference.to_string()),
        shipping_address: Set(serde_json::to_value(&payload.address)
            .map_err(|err| AppError::Internal(err.into()))?),
        coupon_id: Set(outcome.coupon.as_ref().map(|c| c.id)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            AppError::CouponAlreadyUsed
        } else {
            AppError::OrmError(err)
        }
    })?;

    txn.commit().await?;

    Ok(order_from_entity(inserted))
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        order_reference: model.order_reference,
        total_amount: model.total_amount,
        status: model.status,
        payment_status: model.payment_status,
        payment_reference: model.payment_reference,
        shipping_address: model.shipping_address,
        coupon_id: model.coupon_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn build_order_reference(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("ORD-{}-{}", date, short)
}
