use axum::Router;

use crate::state::AppState;

pub mod addresses;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod pricing;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/pricing", pricing::router())
        .nest("/coupons", coupons::router())
        .nest("/addresses", addresses::router())
        .nest("/orders", orders::router())
}
