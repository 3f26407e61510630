use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::record_event,
    dto::addresses::{AddressInput, AddressList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
    entity::addresses::{
        ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses,
        Model as AddressModel,
    },
};

/// Saved addresses are capped per user; the 5th save is rejected.
pub const MAX_SAVED_ADDRESSES: u64 = 4;

/// Reject an address missing any required field. Runs before payment is
/// initiated so a bad address never reaches the gateway.
pub fn validate_address(input: &AddressInput) -> AppResult<()> {
    let required = [
        ("full_name", &input.full_name),
        ("phone", &input.phone),
        ("line1", &input.line1),
        ("city", &input.city),
        ("state", &input.state),
        ("pincode", &input.pincode),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::AddressValidationFailed(format!(
            "missing {}",
            missing.join(", ")
        )))
    }
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(address_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        AddressList { items },
        Some(Meta::empty()),
    ))
}

/// Persist a new address for the user, enforcing the saved-address cap.
pub async fn save_address(
    state: &AppState,
    user: &AuthUser,
    input: AddressInput,
) -> AppResult<Address> {
    validate_address(&input)?;

    let saved = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    if saved >= MAX_SAVED_ADDRESSES {
        return Err(AppError::AddressLimitExceeded(MAX_SAVED_ADDRESSES as usize));
    }

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        full_name: Set(input.full_name),
        phone: Set(input.phone),
        line1: Set(input.line1),
        line2: Set(input.line2),
        city: Set(input.city),
        state: Set(input.state),
        pincode: Set(input.pincode),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = record_event(
        &state.pool,
        Some(user.user_id),
        "address_saved",
        Some(serde_json::json!({ "address_id": address.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(address_from_entity(address))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    input: AddressInput,
) -> AppResult<ApiResponse<Address>> {
    let address = save_address(state, user, input).await?;
    Ok(ApiResponse::success(
        "Address saved",
        address,
        Some(Meta::empty()),
    ))
}

/// Editing an existing address bypasses the cap: the count does not grow.
pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    input: AddressInput,
) -> AppResult<ApiResponse<Address>> {
    validate_address(&input)?;

    let existing = Addresses::find()
        .filter(AddressCol::Id.eq(id))
        .filter(AddressCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: AddressActive = existing.into();
    active.full_name = Set(input.full_name);
    active.phone = Set(input.phone);
    active.line1 = Set(input.line1);
    active.line2 = Set(input.line2);
    active.city = Set(input.city);
    active.state = Set(input.state);
    active.pincode = Set(input.pincode);
    let address = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Address updated",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        user_id: model.user_id,
        full_name: model.full_name,
        phone: model.phone,
        line1: model.line1,
        line2: model.line2,
        city: model.city,
        state: model.state,
        pincode: model.pincode,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
